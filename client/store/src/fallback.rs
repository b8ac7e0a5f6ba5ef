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

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;

use crate::{CacheClient, StoreError};

/// Decorator that survives shared-store outages by replaying the failed
/// call against the in-process tier. Successful primary writes are never
/// mirrored to the secondary, so a primary outage stays observable
/// instead of being papered over by stale local state.
pub struct FallbackCache {
	primary: Arc<dyn CacheClient>,
	secondary: Arc<dyn CacheClient>,
}

impl FallbackCache {
	pub fn new(primary: Arc<dyn CacheClient>, secondary: Arc<dyn CacheClient>) -> Self {
		Self { primary, secondary }
	}
}

macro_rules! with_fallback {
	($self:ident, $op:expr, $call:ident ( $($arg:expr),* )) => {
		match $self.primary.$call($($arg),*).await {
			Ok(value) => Ok(value),
			Err(err) => {
				log::warn!(
					target: "store",
					"{}: primary cache failed ({}), falling back to local tier",
					$op,
					err,
				);
				$self.secondary.$call($($arg),*).await
			}
		}
	};
}

#[async_trait]
impl CacheClient for FallbackCache {
	async fn get(&self, key: &str, op: &str) -> Result<Option<Value>, StoreError> {
		with_fallback!(self, op, get(key, op))
	}

	async fn set(
		&self,
		key: &str,
		value: &Value,
		op: &str,
		ttl_ms: Option<u64>,
	) -> Result<(), StoreError> {
		with_fallback!(self, op, set(key, value, op, ttl_ms))
	}

	async fn multi_set(&self, entries: &[(String, Value)], op: &str) -> Result<(), StoreError> {
		with_fallback!(self, op, multi_set(entries, op))
	}

	async fn pipeline_set(
		&self,
		entries: &[(String, Value)],
		op: &str,
		ttl_ms: Option<u64>,
	) -> Result<(), StoreError> {
		with_fallback!(self, op, pipeline_set(entries, op, ttl_ms))
	}

	async fn delete(&self, key: &str, op: &str) -> Result<(), StoreError> {
		with_fallback!(self, op, delete(key, op))
	}

	async fn clear(&self) -> Result<(), StoreError> {
		with_fallback!(self, "clear", clear())
	}

	async fn keys(&self, pattern: &str, op: &str) -> Result<Vec<String>, StoreError> {
		with_fallback!(self, op, keys(pattern, op))
	}

	async fn incr_by(
		&self,
		key: &str,
		amount: i64,
		op: &str,
		ttl_on_create_ms: Option<u64>,
	) -> Result<i64, StoreError> {
		with_fallback!(self, op, incr_by(key, amount, op, ttl_on_create_ms))
	}

	async fn r_push(&self, key: &str, value: &Value, op: &str) -> Result<u64, StoreError> {
		with_fallback!(self, op, r_push(key, value, op))
	}

	async fn l_range(
		&self,
		key: &str,
		start: i64,
		end: i64,
		op: &str,
	) -> Result<Vec<Value>, StoreError> {
		with_fallback!(self, op, l_range(key, start, end, op))
	}

	fn is_connected(&self) -> bool {
		self.primary.is_connected()
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::LocalCacheClient;
	use serde_json::json;
	use std::{
		sync::atomic::{AtomicUsize, Ordering},
		time::Duration,
	};

	/// Primary that fails every call, counting them.
	struct DeadPrimary {
		calls: AtomicUsize,
	}

	#[async_trait]
	impl CacheClient for DeadPrimary {
		async fn get(&self, _: &str, _: &str) -> Result<Option<Value>, StoreError> {
			self.calls.fetch_add(1, Ordering::SeqCst);
			Err(StoreError::NotConnected)
		}
		async fn set(
			&self,
			_: &str,
			_: &Value,
			_: &str,
			_: Option<u64>,
		) -> Result<(), StoreError> {
			self.calls.fetch_add(1, Ordering::SeqCst);
			Err(StoreError::NotConnected)
		}
		async fn multi_set(&self, _: &[(String, Value)], _: &str) -> Result<(), StoreError> {
			Err(StoreError::NotConnected)
		}
		async fn pipeline_set(
			&self,
			_: &[(String, Value)],
			_: &str,
			_: Option<u64>,
		) -> Result<(), StoreError> {
			Err(StoreError::NotConnected)
		}
		async fn delete(&self, _: &str, _: &str) -> Result<(), StoreError> {
			Err(StoreError::NotConnected)
		}
		async fn clear(&self) -> Result<(), StoreError> {
			Err(StoreError::NotConnected)
		}
		async fn keys(&self, _: &str, _: &str) -> Result<Vec<String>, StoreError> {
			Err(StoreError::NotConnected)
		}
		async fn incr_by(
			&self,
			_: &str,
			_: i64,
			_: &str,
			_: Option<u64>,
		) -> Result<i64, StoreError> {
			Err(StoreError::NotConnected)
		}
		async fn r_push(&self, _: &str, _: &Value, _: &str) -> Result<u64, StoreError> {
			Err(StoreError::NotConnected)
		}
		async fn l_range(&self, _: &str, _: i64, _: i64, _: &str) -> Result<Vec<Value>, StoreError> {
			Err(StoreError::NotConnected)
		}
		fn is_connected(&self) -> bool {
			false
		}
	}

	#[tokio::test]
	async fn failed_primary_calls_are_replayed_on_the_secondary() {
		let primary = Arc::new(DeadPrimary {
			calls: AtomicUsize::new(0),
		});
		let secondary = Arc::new(LocalCacheClient::new(16, Duration::from_secs(60)));
		let cache = FallbackCache::new(primary.clone(), secondary.clone());

		cache.set("cache:k", &json!("v"), "test", None).await.unwrap();
		assert_eq!(cache.get("cache:k", "test").await.unwrap(), Some(json!("v")));
		assert_eq!(primary.calls.load(Ordering::SeqCst), 2);
		assert!(!cache.is_connected());
	}

	#[tokio::test]
	async fn healthy_primary_is_not_mirrored_to_the_secondary() {
		let primary = Arc::new(LocalCacheClient::new(16, Duration::from_secs(60)));
		let secondary = Arc::new(LocalCacheClient::new(16, Duration::from_secs(60)));
		let cache = FallbackCache::new(primary.clone(), secondary.clone());

		cache.set("cache:k", &json!(7), "test", None).await.unwrap();
		assert_eq!(primary.get("cache:k", "test").await.unwrap(), Some(json!(7)));
		assert_eq!(secondary.get("cache:k", "test").await.unwrap(), None);
	}
}
