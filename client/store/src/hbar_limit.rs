// SPDX-License-Identifier: GPL-3.0-or-later WITH Classpath-exception-2.0
// This file is part of Hiero.
//
// Copyright (c) 2026 Hiero contributors.
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE. See the
// GNU General Public License for more details.
//
// You should have received a copy of the GNU General Public License
// along with this program. If not, see <https://www.gnu.org/licenses/>.

//! The HBAR spending governor. Every chargeable consensus-node operation
//! is checked against the caller's daily spending plan before it runs and
//! charged with the observed cost afterwards. `amount_spent` lives under
//! its own key whose TTL ends at the next UTC midnight, so the daily
//! reset costs nothing.

use std::{
	sync::Arc,
	time::{SystemTime, UNIX_EPOCH},
};

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::{CacheClient, StoreError};

const DAY_MS: u64 = 86_400_000;

/// Milliseconds remaining until the next UTC midnight.
pub fn ms_until_end_of_day(now_ms: u64) -> u64 {
	DAY_MS - now_ms % DAY_MS
}

fn now_ms() -> u64 {
	SystemTime::now()
		.duration_since(UNIX_EPOCH)
		.map(|elapsed| elapsed.as_millis() as u64)
		.unwrap_or_default()
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum SpendingTier {
	Basic,
	Extended,
	Privileged,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SpendingPlan {
	pub id: String,
	pub tier: SpendingTier,
	pub active: bool,
	pub created_at: u64,
	pub amount_spent: u64,
}

#[derive(Clone, Debug)]
pub struct HbarLimitConfig {
	/// Daily caps in tinybars per tier.
	pub basic_cap: u64,
	pub extended_cap: u64,
	pub privileged_cap: u64,
	pub enabled: bool,
}

impl Default for HbarLimitConfig {
	fn default() -> Self {
		Self {
			basic_cap: 1_120_000_000,
			extended_cap: 3_200_000_000,
			privileged_cap: 10_000_000_000,
			enabled: true,
		}
	}
}

pub struct HbarLimitService {
	store: Arc<dyn CacheClient>,
	config: HbarLimitConfig,
}

impl HbarLimitService {
	pub fn new(store: Arc<dyn CacheClient>, config: HbarLimitConfig) -> Self {
		Self { store, config }
	}

	fn cap(&self, tier: SpendingTier) -> u64 {
		match tier {
			SpendingTier::Basic => self.config.basic_cap,
			SpendingTier::Extended => self.config.extended_cap,
			SpendingTier::Privileged => self.config.privileged_cap,
		}
	}

	fn plan_key(plan_id: &str) -> String {
		format!("hbar-limit:plan:{}", plan_id)
	}

	fn spent_key(plan_id: &str) -> String {
		format!("hbar-limit:spent:{}", plan_id)
	}

	fn history_key(plan_id: &str) -> String {
		format!("hbar-limit:history:{}", plan_id)
	}

	async fn association(&self, kind: &str, key: &str) -> Option<String> {
		let key = format!("hbar-limit:{}:{}", kind, key);
		match self.store.get(&key, "hbarLimit").await {
			Ok(Some(Value::String(plan_id))) => Some(plan_id),
			Ok(_) => None,
			Err(err) => {
				log::warn!(target: "store", "spending plan association lookup failed: {}", err);
				None
			}
		}
	}

	/// Resolve the caller to a spending plan: evm address first, ip
	/// second, otherwise a synthesized per-address basic plan valid until
	/// end of day.
	pub async fn resolve_plan(&self, sender: &str, ip: &str) -> Result<SpendingPlan, StoreError> {
		let plan_id = match self.association("eth", sender).await {
			Some(plan_id) => Some(plan_id),
			None => self.association("ip", ip).await,
		};
		if let Some(plan_id) = plan_id {
			if let Some(raw) = self.store.get(&Self::plan_key(&plan_id), "hbarLimit").await? {
				if let Ok(plan) = serde_json::from_value::<SpendingPlan>(raw) {
					return Ok(plan);
				}
			}
		}

		let plan = SpendingPlan {
			id: if sender.is_empty() { ip.to_owned() } else { sender.to_owned() },
			tier: SpendingTier::Basic,
			active: true,
			created_at: now_ms(),
			amount_spent: 0,
		};
		let ttl = ms_until_end_of_day(plan.created_at);
		self.store
			.set(
				&Self::plan_key(&plan.id),
				&serde_json::to_value(&plan)?,
				"hbarLimit",
				Some(ttl),
			)
			.await?;
		self.store
			.set(
				&format!("hbar-limit:eth:{}", sender),
				&json!(plan.id),
				"hbarLimit",
				Some(ttl),
			)
			.await?;
		self.store
			.set(
				&format!("hbar-limit:ip:{}", ip),
				&json!(plan.id),
				"hbarLimit",
				Some(ttl),
			)
			.await?;
		Ok(plan)
	}

	async fn amount_spent(&self, plan_id: &str) -> u64 {
		match self.store.get(&Self::spent_key(plan_id), "hbarLimit").await {
			Ok(Some(value)) => value.as_i64().unwrap_or(0).max(0) as u64,
			_ => 0,
		}
	}

	/// `true` iff the operation would push the plan past its daily cap.
	pub async fn should_limit(
		&self,
		mode: &str,
		method: &str,
		sender: &str,
		ip: &str,
		request_id: &str,
		estimated_cost: u64,
	) -> bool {
		if !self.config.enabled {
			return false;
		}
		let plan = match self.resolve_plan(sender, ip).await {
			Ok(plan) => plan,
			Err(err) => {
				log::warn!(
					target: "store",
					"[{}] spending plan resolution failed open for {}: {}",
					request_id,
					sender,
					err,
				);
				return false;
			}
		};
		if !plan.active {
			return false;
		}
		let spent = self.amount_spent(&plan.id).await;
		let cap = self.cap(plan.tier);
		let limited = spent.saturating_add(estimated_cost) > cap;
		if limited {
			log::info!(
				target: "store",
				"[{}] {} {} denied for plan {}: spent {} + estimated {} exceeds cap {}",
				request_id,
				mode,
				method,
				plan.id,
				spent,
				estimated_cost,
				cap,
			);
		}
		limited
	}

	/// Charge the observed cost of a completed operation to the caller's
	/// plan and append it to the plan's audit trail.
	pub async fn add_expense(&self, sender: &str, ip: &str, method: &str, cost: u64) {
		if !self.config.enabled || cost == 0 {
			return;
		}
		let plan = match self.resolve_plan(sender, ip).await {
			Ok(plan) => plan,
			Err(err) => {
				log::warn!(target: "store", "expense for {} dropped: {}", sender, err);
				return;
			}
		};
		let ttl = ms_until_end_of_day(now_ms());
		if let Err(err) = self
			.store
			.incr_by(&Self::spent_key(&plan.id), cost as i64, "hbarLimit", Some(ttl))
			.await
		{
			log::warn!(target: "store", "expense increment for plan {} failed: {}", plan.id, err);
		}
		let record = json!({
			"timestamp": now_ms(),
			"method": method,
			"cost": cost,
		});
		if let Err(err) = self
			.store
			.r_push(&Self::history_key(&plan.id), &record, "hbarLimit")
			.await
		{
			log::warn!(target: "store", "expense history append for plan {} failed: {}", plan.id, err);
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::LocalCacheClient;
	use std::time::Duration;

	fn service(basic_cap: u64) -> HbarLimitService {
		HbarLimitService::new(
			Arc::new(LocalCacheClient::new(64, Duration::from_secs(60))),
			HbarLimitConfig {
				basic_cap,
				..HbarLimitConfig::default()
			},
		)
	}

	#[tokio::test]
	async fn denies_only_past_the_daily_cap() {
		let governor = service(1_000);
		assert!(
			!governor
				.should_limit("preemptive", "eth_sendRawTransaction", "0xaaa", "1.1.1.1", "r1", 900)
				.await
		);
		governor.add_expense("0xaaa", "1.1.1.1", "eth_sendRawTransaction", 900).await;
		assert!(
			governor
				.should_limit("preemptive", "eth_sendRawTransaction", "0xaaa", "1.1.1.1", "r2", 200)
				.await
		);
		assert!(
			!governor
				.should_limit("preemptive", "eth_sendRawTransaction", "0xaaa", "1.1.1.1", "r3", 100)
				.await
		);
	}

	#[tokio::test]
	async fn expenses_accumulate_into_history() {
		let store = Arc::new(LocalCacheClient::new(64, Duration::from_secs(60)));
		let governor = HbarLimitService::new(store.clone(), HbarLimitConfig::default());
		governor.add_expense("0xbbb", "1.1.1.1", "eth_sendRawTransaction", 10).await;
		governor.add_expense("0xbbb", "1.1.1.1", "eth_sendRawTransaction", 20).await;

		let history = store
			.l_range("hbar-limit:history:0xbbb", 0, -1, "test")
			.await
			.unwrap();
		assert_eq!(history.len(), 2);
		assert_eq!(history[0]["cost"], 10);
		assert_eq!(history[1]["cost"], 20);
	}

	#[tokio::test]
	async fn plans_resolve_through_existing_associations() {
		let store = Arc::new(LocalCacheClient::new(64, Duration::from_secs(60)));
		let plan = SpendingPlan {
			id: "team-plan".to_owned(),
			tier: SpendingTier::Privileged,
			active: true,
			created_at: 0,
			amount_spent: 0,
		};
		store
			.set(
				"hbar-limit:plan:team-plan",
				&serde_json::to_value(&plan).unwrap(),
				"test",
				None,
			)
			.await
			.unwrap();
		store
			.set("hbar-limit:eth:0xccc", &json!("team-plan"), "test", None)
			.await
			.unwrap();

		let governor = HbarLimitService::new(store, HbarLimitConfig::default());
		let resolved = governor.resolve_plan("0xccc", "9.9.9.9").await.unwrap();
		assert_eq!(resolved.id, "team-plan");
		assert_eq!(resolved.tier, SpendingTier::Privileged);
	}

	#[test]
	fn end_of_day_ttl_never_exceeds_a_day() {
		assert_eq!(ms_until_end_of_day(0), DAY_MS);
		assert_eq!(ms_until_end_of_day(DAY_MS - 1), 1);
		assert_eq!(ms_until_end_of_day(DAY_MS + 5), DAY_MS - 5);
	}
}
