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

use std::{
	collections::VecDeque,
	num::NonZeroUsize,
	time::{Duration, Instant},
};

use async_trait::async_trait;
use lru::LruCache;
use parking_lot::Mutex;
use serde_json::Value;

use crate::{StoreError, CACHE_PREFIX};

/// Build a namespaced cache key: `cache:<scope>:<args...>`.
pub fn cache_key(scope: &str, args: &[&str]) -> String {
	let mut key = String::with_capacity(CACHE_PREFIX.len() + scope.len() + 16 * args.len());
	key.push_str(CACHE_PREFIX);
	key.push_str(scope);
	for arg in args {
		key.push(':');
		key.push_str(arg);
	}
	key
}

/// The cache contract shared by the local LRU tier and the shared store.
///
/// Values are JSON documents; `get` yields `None` for absent keys, never
/// an empty value. All mutating operations accept the name of the calling
/// operation for log attribution.
#[async_trait]
pub trait CacheClient: Send + Sync {
	async fn get(&self, key: &str, op: &str) -> Result<Option<Value>, StoreError>;

	async fn set(
		&self,
		key: &str,
		value: &Value,
		op: &str,
		ttl_ms: Option<u64>,
	) -> Result<(), StoreError>;

	async fn multi_set(&self, entries: &[(String, Value)], op: &str) -> Result<(), StoreError>;

	async fn pipeline_set(
		&self,
		entries: &[(String, Value)],
		op: &str,
		ttl_ms: Option<u64>,
	) -> Result<(), StoreError>;

	async fn delete(&self, key: &str, op: &str) -> Result<(), StoreError>;

	/// Remove every entry under [`CACHE_PREFIX`]. Keys of other scopes
	/// (locks, rate limits, spending plans) are untouched.
	async fn clear(&self) -> Result<(), StoreError>;

	/// List keys matching `pattern` (glob with a trailing `*`).
	async fn keys(&self, pattern: &str, op: &str) -> Result<Vec<String>, StoreError>;

	/// Atomic increment. When the increment creates the key and
	/// `ttl_on_create_ms` is set, the TTL is attached in the same step.
	async fn incr_by(
		&self,
		key: &str,
		amount: i64,
		op: &str,
		ttl_on_create_ms: Option<u64>,
	) -> Result<i64, StoreError>;

	async fn r_push(&self, key: &str, value: &Value, op: &str) -> Result<u64, StoreError>;

	async fn l_range(
		&self,
		key: &str,
		start: i64,
		end: i64,
		op: &str,
	) -> Result<Vec<Value>, StoreError>;

	/// Whether the backing store is currently reachable. The local tier
	/// always is; the shared tier reports its reconnection state so
	/// health endpoints can surface readiness.
	fn is_connected(&self) -> bool;
}

enum Slot {
	Value(Value),
	Counter(i64),
	List(VecDeque<Value>),
}

struct Entry {
	slot: Slot,
	expires_at: Option<Instant>,
}

impl Entry {
	fn expired(&self, now: Instant) -> bool {
		self.expires_at.is_some_and(|at| at <= now)
	}
}

/// In-process LRU tier of the cache fabric.
pub struct LocalCacheClient {
	entries: Mutex<LruCache<String, Entry>>,
	default_ttl: Duration,
}

impl LocalCacheClient {
	pub fn new(capacity: usize, default_ttl: Duration) -> Self {
		let capacity = NonZeroUsize::new(capacity.max(1)).expect("capacity is at least one; qed");
		Self {
			entries: Mutex::new(LruCache::new(capacity)),
			default_ttl,
		}
	}

	fn ttl(&self, ttl_ms: Option<u64>) -> Option<Instant> {
		let ttl = ttl_ms
			.map(Duration::from_millis)
			.unwrap_or(self.default_ttl);
		Instant::now().checked_add(ttl)
	}

	fn live_slot<R>(&self, key: &str, read: impl FnOnce(&Slot) -> R) -> Option<R> {
		let mut entries = self.entries.lock();
		let now = Instant::now();
		if entries.get(key).is_some_and(|entry| entry.expired(now)) {
			entries.pop(key);
			return None;
		}
		entries.get(key).map(|entry| read(&entry.slot))
	}
}

#[async_trait]
impl CacheClient for LocalCacheClient {
	async fn get(&self, key: &str, _op: &str) -> Result<Option<Value>, StoreError> {
		Ok(self
			.live_slot(key, |slot| match slot {
				Slot::Value(value) => Some(value.clone()),
				Slot::Counter(count) => Some(Value::from(*count)),
				Slot::List(_) => None,
			})
			.flatten())
	}

	async fn set(
		&self,
		key: &str,
		value: &Value,
		_op: &str,
		ttl_ms: Option<u64>,
	) -> Result<(), StoreError> {
		self.entries.lock().put(
			key.to_owned(),
			Entry {
				slot: Slot::Value(value.clone()),
				expires_at: self.ttl(ttl_ms),
			},
		);
		Ok(())
	}

	async fn multi_set(&self, entries: &[(String, Value)], op: &str) -> Result<(), StoreError> {
		for (key, value) in entries {
			self.set(key, value, op, None).await?;
		}
		Ok(())
	}

	async fn pipeline_set(
		&self,
		entries: &[(String, Value)],
		op: &str,
		ttl_ms: Option<u64>,
	) -> Result<(), StoreError> {
		for (key, value) in entries {
			self.set(key, value, op, ttl_ms).await?;
		}
		Ok(())
	}

	async fn delete(&self, key: &str, _op: &str) -> Result<(), StoreError> {
		self.entries.lock().pop(key);
		Ok(())
	}

	async fn clear(&self) -> Result<(), StoreError> {
		let mut entries = self.entries.lock();
		let doomed: Vec<String> = entries
			.iter()
			.filter(|(key, _)| key.starts_with(CACHE_PREFIX))
			.map(|(key, _)| key.clone())
			.collect();
		for key in doomed {
			entries.pop(&key);
		}
		Ok(())
	}

	async fn keys(&self, pattern: &str, _op: &str) -> Result<Vec<String>, StoreError> {
		let prefix = pattern.strip_suffix('*').unwrap_or(pattern);
		let now = Instant::now();
		Ok(self
			.entries
			.lock()
			.iter()
			.filter(|(key, entry)| !entry.expired(now) && key.starts_with(prefix))
			.map(|(key, _)| key.clone())
			.collect())
	}

	async fn incr_by(
		&self,
		key: &str,
		amount: i64,
		_op: &str,
		ttl_on_create_ms: Option<u64>,
	) -> Result<i64, StoreError> {
		let mut entries = self.entries.lock();
		let now = Instant::now();
		if entries.get(key).is_some_and(|entry| entry.expired(now)) {
			entries.pop(key);
		}
		if let Some(entry) = entries.get_mut(key) {
			if let Slot::Counter(count) = &mut entry.slot {
				*count += amount;
				return Ok(*count);
			}
		}
		entries.put(
			key.to_owned(),
			Entry {
				slot: Slot::Counter(amount),
				expires_at: self.ttl(ttl_on_create_ms),
			},
		);
		Ok(amount)
	}

	async fn r_push(&self, key: &str, value: &Value, _op: &str) -> Result<u64, StoreError> {
		let mut entries = self.entries.lock();
		if let Some(entry) = entries.get_mut(key) {
			if let Slot::List(list) = &mut entry.slot {
				list.push_back(value.clone());
				return Ok(list.len() as u64);
			}
		}
		let mut list = VecDeque::new();
		list.push_back(value.clone());
		entries.put(
			key.to_owned(),
			Entry {
				slot: Slot::List(list),
				expires_at: None,
			},
		);
		Ok(1)
	}

	async fn l_range(
		&self,
		key: &str,
		start: i64,
		end: i64,
		_op: &str,
	) -> Result<Vec<Value>, StoreError> {
		Ok(self
			.live_slot(key, |slot| match slot {
				Slot::List(list) => {
					let len = list.len() as i64;
					let clamp = |i: i64| -> usize {
						if i < 0 {
							(len + i).max(0) as usize
						} else {
							i.min(len) as usize
						}
					};
					let (start, end) = (clamp(start), clamp(end));
					list.iter()
						.skip(start)
						.take(end.saturating_sub(start) + 1)
						.cloned()
						.collect()
				}
				_ => Vec::new(),
			})
			.unwrap_or_default())
	}

	fn is_connected(&self) -> bool {
		true
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use serde_json::json;

	fn local() -> LocalCacheClient {
		LocalCacheClient::new(128, Duration::from_secs(60))
	}

	#[tokio::test]
	async fn absent_keys_read_as_none_not_empty() {
		let cache = local();
		assert_eq!(cache.get("cache:missing", "test").await.unwrap(), None);
	}

	#[tokio::test]
	async fn values_round_trip_all_json_shapes() {
		let cache = local();
		for value in [
			json!(42),
			json!(true),
			json!("0xabc"),
			json!(["a", "b"]),
			json!({ "number": "0x10", "hash": null }),
		] {
			cache.set("cache:k", &value, "test", None).await.unwrap();
			assert_eq!(cache.get("cache:k", "test").await.unwrap(), Some(value));
		}
	}

	#[tokio::test]
	async fn entries_expire_by_their_own_ttl() {
		let cache = local();
		cache
			.set("cache:ttl", &json!(1), "test", Some(10))
			.await
			.unwrap();
		std::thread::sleep(Duration::from_millis(25));
		assert_eq!(cache.get("cache:ttl", "test").await.unwrap(), None);
	}

	#[tokio::test]
	async fn clear_only_touches_the_cache_prefix() {
		let cache = local();
		cache.set("cache:a", &json!(1), "test", None).await.unwrap();
		cache
			.set("hbar-limit:plan", &json!(2), "test", None)
			.await
			.unwrap();
		cache.clear().await.unwrap();
		assert_eq!(cache.get("cache:a", "test").await.unwrap(), None);
		assert_eq!(
			cache.get("hbar-limit:plan", "test").await.unwrap(),
			Some(json!(2))
		);
	}

	#[tokio::test]
	async fn multi_and_pipeline_set_store_every_entry() {
		let cache = local();
		let entries = vec![
			("cache:a".to_owned(), json!(1)),
			("cache:b".to_owned(), json!(2)),
		];
		cache.multi_set(&entries, "test").await.unwrap();
		assert_eq!(cache.get("cache:b", "test").await.unwrap(), Some(json!(2)));

		cache
			.pipeline_set(&entries, "test", Some(10))
			.await
			.unwrap();
		std::thread::sleep(Duration::from_millis(25));
		assert_eq!(cache.get("cache:a", "test").await.unwrap(), None);
	}

	#[tokio::test]
	async fn incr_creates_with_ttl_then_counts_up() {
		let cache = local();
		assert_eq!(
			cache
				.incr_by("ratelimit:ip:m", 1, "test", Some(60_000))
				.await
				.unwrap(),
			1
		);
		assert_eq!(
			cache
				.incr_by("ratelimit:ip:m", 1, "test", Some(60_000))
				.await
				.unwrap(),
			2
		);
	}

	#[tokio::test]
	async fn lists_push_and_range() {
		let cache = local();
		cache.r_push("hbar-limit:history:p", &json!("a"), "test").await.unwrap();
		cache.r_push("hbar-limit:history:p", &json!("b"), "test").await.unwrap();
		cache.r_push("hbar-limit:history:p", &json!("c"), "test").await.unwrap();
		assert_eq!(
			cache
				.l_range("hbar-limit:history:p", 0, -1, "test")
				.await
				.unwrap(),
			vec![json!("a"), json!("b"), json!("c")]
		);
		assert_eq!(
			cache
				.l_range("hbar-limit:history:p", 1, 1, "test")
				.await
				.unwrap(),
			vec![json!("b")]
		);
	}

	#[test]
	fn cache_keys_are_namespaced() {
		assert_eq!(
			cache_key("eth_call", &["0xaa", "0xbb", "fe"]),
			"cache:eth_call:0xaa:0xbb:fe"
		);
	}
}
