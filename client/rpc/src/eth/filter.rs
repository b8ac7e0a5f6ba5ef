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

//! Polling filters, stored through the cache fabric under the `filter:`
//! scope so any relay instance can answer a poll. The TTL refreshes on
//! every poll; an unpolled filter simply ages out.

use ethereum_types::{H256, U256};
use jsonrpsee::core::{async_trait, RpcResult};
use serde::{Deserialize, Serialize};

use hc_rpc_core::{
	types::{BlockNumber, Filter, FilterChanges, Index, Log, RequestContext},
	EthFilterApiServer,
};

use crate::{format::h256_from_long_hex, mirror_err, predefined};

use super::Eth;

#[derive(Clone, Debug, Serialize, Deserialize)]
enum StoredFilterKind {
	Log,
	Block,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
struct StoredFilter {
	kind: StoredFilterKind,
	criteria: Option<Filter>,
	last_block_polled: u64,
}

/// Filter endpoints; shares the Eth service's clients and caches.
#[derive(Clone)]
pub struct EthFilter {
	eth: Eth,
}

impl EthFilter {
	pub fn new(eth: Eth) -> Self {
		Self { eth }
	}

	/// Bind a clone of the filter surface to one client connection.
	pub fn for_client(&self, ip_address: impl Into<String>, connection_id: Option<String>) -> Self {
		Self {
			eth: self.eth.for_client(ip_address, connection_id),
		}
	}

	fn key(id: u64) -> String {
		format!("filter:{:x}", id)
	}

	async fn store_filter(&self, filter: StoredFilter) -> RpcResult<U256> {
		let id: u64 = rand::random();
		let encoded = serde_json::to_value(&filter)
			.map_err(|err| crate::internal_err(format!("filter encoding failed: {}", err)))?;
		self.eth
			.cache
			.set(
				&Self::key(id),
				&encoded,
				"newFilter",
				Some(self.eth.config.filter_ttl_ms),
			)
			.await
			.map_err(|err| crate::internal_err(format!("filter store failed: {}", err)))?;
		Ok(U256::from(id))
	}

	async fn load_filter(&self, index: Index) -> RpcResult<StoredFilter> {
		let cached = self
			.eth
			.cache
			.get(&Self::key(index.value()), "getFilter")
			.await
			.map_err(|err| crate::internal_err(format!("filter load failed: {}", err)))?
			.ok_or_else(predefined::filter_not_found)?;
		serde_json::from_value(cached).map_err(|_| predefined::filter_not_found())
	}

	async fn refresh_filter(&self, index: Index, filter: &StoredFilter) {
		if let Ok(encoded) = serde_json::to_value(filter) {
			let _ = self
				.eth
				.cache
				.set(
					&Self::key(index.value()),
					&encoded,
					"getFilterChanges",
					Some(self.eth.config.filter_ttl_ms),
				)
				.await;
		}
	}

	async fn block_hashes_since(
		&self,
		from: u64,
		to: u64,
		_ctx: &RequestContext,
	) -> RpcResult<Vec<H256>> {
		let mut hashes = Vec::new();
		for number in from..=to {
			let block = self
				.eth
				.mirror
				.get_block(&number.to_string())
				.await
				.map_err(mirror_err)?;
			if let Some(block) = block {
				if let Some(hash) = h256_from_long_hex(&block.hash) {
					hashes.push(hash);
				}
			}
		}
		Ok(hashes)
	}
}

#[async_trait]
impl EthFilterApiServer for EthFilter {
	async fn new_filter(&self, filter: Filter) -> RpcResult<U256> {
		let ctx = self.eth.guard("eth_newFilter").await?;
		let latest = self.eth.get_latest_block_number(&ctx).await?;
		self.store_filter(StoredFilter {
			kind: StoredFilterKind::Log,
			criteria: Some(filter),
			last_block_polled: latest,
		})
		.await
	}

	async fn new_block_filter(&self) -> RpcResult<U256> {
		let ctx = self.eth.guard("eth_newBlockFilter").await?;
		let latest = self.eth.get_latest_block_number(&ctx).await?;
		self.store_filter(StoredFilter {
			kind: StoredFilterKind::Block,
			criteria: None,
			last_block_polled: latest,
		})
		.await
	}

	async fn new_pending_transaction_filter(&self) -> RpcResult<U256> {
		self.eth.guard("eth_newPendingTransactionFilter").await?;
		Err(predefined::unsupported_method())
	}

	async fn filter_changes(&self, index: Index) -> RpcResult<FilterChanges> {
		let ctx = self.eth.guard("eth_getFilterChanges").await?;
		let mut stored = self.load_filter(index).await?;
		let latest = self.eth.get_latest_block_number(&ctx).await?;

		let changes = match stored.kind {
			StoredFilterKind::Block => {
				if latest <= stored.last_block_polled {
					FilterChanges::Hashes(Vec::new())
				} else {
					FilterChanges::Hashes(
						self.block_hashes_since(stored.last_block_polled + 1, latest, &ctx)
							.await?,
					)
				}
			}
			StoredFilterKind::Log => {
				let mut criteria = stored.criteria.clone().unwrap_or_default();
				let lower = stored.last_block_polled + 1;
				let from = criteria
					.from_block
					.and_then(|from| from.to_min_block_num())
					.map(|from| from.max(lower))
					.unwrap_or(lower);
				if from > latest {
					FilterChanges::Logs(Vec::new())
				} else {
					criteria.from_block = Some(BlockNumber::Num(from));
					criteria.to_block = Some(BlockNumber::Num(latest));
					FilterChanges::Logs(self.eth.get_logs_impl(&criteria, &ctx).await?)
				}
			}
		};

		stored.last_block_polled = latest;
		self.refresh_filter(index, &stored).await;
		Ok(changes)
	}

	async fn filter_logs(&self, index: Index) -> RpcResult<Vec<Log>> {
		let ctx = self.eth.guard("eth_getFilterLogs").await?;
		let stored = self.load_filter(index).await?;
		let criteria = match (&stored.kind, &stored.criteria) {
			(StoredFilterKind::Log, Some(criteria)) => criteria.clone(),
			_ => return Err(predefined::filter_not_found()),
		};
		self.refresh_filter(index, &stored).await;
		self.eth.get_logs_impl(&criteria, &ctx).await
	}

	async fn uninstall_filter(&self, index: Index) -> RpcResult<bool> {
		self.eth.guard("eth_uninstallFilter").await?;
		let existed = self
			.eth
			.cache
			.get(&Self::key(index.value()), "uninstallFilter")
			.await
			.map(|entry| entry.is_some())
			.unwrap_or(false);
		let _ = self
			.eth
			.cache
			.delete(&Self::key(index.value()), "uninstallFilter")
			.await;
		Ok(existed)
	}
}
