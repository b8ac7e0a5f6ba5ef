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

use std::{collections::HashMap, sync::Arc};

use crate::CacheClient;

// Subscription and filter lifecycle is governed by per-connection caps
// instead of the per-ip window.
const EXEMPT_METHODS: &[&str] = &[
	"eth_subscribe",
	"eth_unsubscribe",
	"eth_newFilter",
	"eth_newBlockFilter",
	"eth_newPendingTransactionFilter",
	"eth_uninstallFilter",
];

#[derive(Clone, Debug)]
pub struct RateLimiterConfig {
	pub window_ms: u64,
	pub default_limit: i64,
	pub method_limits: HashMap<String, i64>,
}

impl Default for RateLimiterConfig {
	fn default() -> Self {
		Self {
			window_ms: 60_000,
			default_limit: 200,
			method_limits: HashMap::new(),
		}
	}
}

/// Fixed-window counter per `(ip, method)`, stored through the cache
/// fabric so multi-instance deployments share quotas when the shared
/// tier is selected.
pub struct RateLimiter {
	store: Arc<dyn CacheClient>,
	config: RateLimiterConfig,
}

impl RateLimiter {
	pub fn new(store: Arc<dyn CacheClient>, config: RateLimiterConfig) -> Self {
		Self { store, config }
	}

	fn limit_for(&self, method: &str) -> i64 {
		self.config
			.method_limits
			.get(method)
			.copied()
			.unwrap_or(self.config.default_limit)
	}

	/// `true` iff the caller exceeded its quota for the current window.
	/// Store failures never limit: the relay keeps serving.
	pub async fn should_rate_limit(&self, ip: &str, method: &str, request_id: &str) -> bool {
		if EXEMPT_METHODS.contains(&method) {
			return false;
		}
		let key = format!("ratelimit:{}:{}", ip, method);
		let count = match self
			.store
			.incr_by(&key, 1, "rateLimit", Some(self.config.window_ms))
			.await
		{
			Ok(count) => count,
			Err(err) => {
				log::warn!(
					target: "store",
					"[{}] rate limit check for {} failed open: {}",
					request_id,
					method,
					err,
				);
				return false;
			}
		};
		let limited = count > self.limit_for(method);
		if limited {
			log::info!(
				target: "store",
				"[{}] ip {} exceeded {} calls to {} in the current window",
				request_id,
				ip,
				self.limit_for(method),
				method,
			);
		}
		limited
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::LocalCacheClient;
	use std::time::Duration;

	fn limiter(limit: i64) -> RateLimiter {
		RateLimiter::new(
			Arc::new(LocalCacheClient::new(64, Duration::from_secs(60))),
			RateLimiterConfig {
				window_ms: 60_000,
				default_limit: limit,
				method_limits: HashMap::from([("eth_call".to_owned(), 1)]),
			},
		)
	}

	#[tokio::test]
	async fn limits_after_the_configured_count() {
		let limiter = limiter(2);
		assert!(!limiter.should_rate_limit("1.2.3.4", "eth_blockNumber", "r1").await);
		assert!(!limiter.should_rate_limit("1.2.3.4", "eth_blockNumber", "r2").await);
		assert!(limiter.should_rate_limit("1.2.3.4", "eth_blockNumber", "r3").await);
		// A different ip has its own window.
		assert!(!limiter.should_rate_limit("5.6.7.8", "eth_blockNumber", "r4").await);
	}

	#[tokio::test]
	async fn per_method_limits_override_the_default() {
		let limiter = limiter(100);
		assert!(!limiter.should_rate_limit("1.2.3.4", "eth_call", "r1").await);
		assert!(limiter.should_rate_limit("1.2.3.4", "eth_call", "r2").await);
	}

	#[tokio::test]
	async fn lifecycle_methods_are_exempt() {
		let limiter = limiter(0);
		assert!(!limiter.should_rate_limit("1.2.3.4", "eth_subscribe", "r1").await);
		assert!(!limiter.should_rate_limit("1.2.3.4", "eth_unsubscribe", "r2").await);
		assert!(!limiter.should_rate_limit("1.2.3.4", "eth_newFilter", "r3").await);
		assert!(!limiter.should_rate_limit("1.2.3.4", "eth_uninstallFilter", "r4").await);
	}
}
