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

use std::sync::{
	atomic::{AtomicBool, Ordering},
	Arc,
};

use async_trait::async_trait;
use redis::{aio::ConnectionManager, AsyncCommands, Script};
use serde_json::Value;

use crate::{CacheClient, StoreError, CACHE_PREFIX};

// INCRBY that attaches a TTL when the key has none. PTTL yields a
// negative reply for keys without expiry, so a fresh key always takes
// the window.
const INCR_WITH_TTL: &str = r"
local value = redis.call('INCRBY', KEYS[1], ARGV[1])
if tonumber(ARGV[2]) > 0 and redis.call('PTTL', KEYS[1]) < 0 then
	redis.call('PEXPIRE', KEYS[1], ARGV[2])
end
return value
";

/// Shared-store tier of the cache fabric, backed by Redis. A single
/// logical namespace with millisecond TTLs; values are JSON-encoded.
pub struct RedisCacheClient {
	manager: ConnectionManager,
	connected: Arc<AtomicBool>,
}

impl RedisCacheClient {
	pub async fn connect(url: &str) -> Result<Self, StoreError> {
		let client = redis::Client::open(url)?;
		let manager = client.get_connection_manager().await?;
		Ok(Self {
			manager,
			connected: Arc::new(AtomicBool::new(true)),
		})
	}

	fn track<T>(&self, result: Result<T, redis::RedisError>) -> Result<T, StoreError> {
		match result {
			Ok(value) => {
				self.connected.store(true, Ordering::Relaxed);
				Ok(value)
			}
			Err(err) => {
				self.connected
					.store(!err.is_connection_dropped(), Ordering::Relaxed);
				Err(err.into())
			}
		}
	}

	async fn scan(&self, pattern: &str) -> Result<Vec<String>, redis::RedisError> {
		let mut conn = self.manager.clone();
		let mut keys = Vec::new();
		let mut iter: redis::AsyncIter<String> = conn.scan_match(pattern).await?;
		while let Some(key) = iter.next_item().await {
			keys.push(key);
		}
		Ok(keys)
	}
}

#[async_trait]
impl CacheClient for RedisCacheClient {
	async fn get(&self, key: &str, op: &str) -> Result<Option<Value>, StoreError> {
		let mut conn = self.manager.clone();
		let raw: Option<String> = self.track(conn.get(key).await)?;
		match raw {
			Some(raw) => {
				log::trace!(target: "store", "{}: shared-store hit for {}", op, key);
				Ok(Some(serde_json::from_str(&raw)?))
			}
			None => Ok(None),
		}
	}

	async fn set(
		&self,
		key: &str,
		value: &Value,
		_op: &str,
		ttl_ms: Option<u64>,
	) -> Result<(), StoreError> {
		let mut conn = self.manager.clone();
		let encoded = serde_json::to_string(value)?;
		let result = match ttl_ms {
			Some(ttl_ms) => {
				redis::cmd("SET")
					.arg(key)
					.arg(encoded)
					.arg("PX")
					.arg(ttl_ms)
					.query_async(&mut conn)
					.await
			}
			None => conn.set(key, encoded).await,
		};
		self.track::<()>(result)
	}

	async fn multi_set(&self, entries: &[(String, Value)], _op: &str) -> Result<(), StoreError> {
		if entries.is_empty() {
			return Ok(());
		}
		let mut conn = self.manager.clone();
		let mut cmd = redis::cmd("MSET");
		for (key, value) in entries {
			cmd.arg(key).arg(serde_json::to_string(value)?);
		}
		self.track::<()>(cmd.query_async(&mut conn).await)
	}

	async fn pipeline_set(
		&self,
		entries: &[(String, Value)],
		_op: &str,
		ttl_ms: Option<u64>,
	) -> Result<(), StoreError> {
		if entries.is_empty() {
			return Ok(());
		}
		let mut conn = self.manager.clone();
		let mut pipe = redis::pipe();
		for (key, value) in entries {
			let encoded = serde_json::to_string(value)?;
			match ttl_ms {
				Some(ttl_ms) => {
					pipe.cmd("SET").arg(key).arg(encoded).arg("PX").arg(ttl_ms).ignore();
				}
				None => {
					pipe.set(key, encoded).ignore();
				}
			}
		}
		self.track::<()>(pipe.query_async(&mut conn).await)
	}

	async fn delete(&self, key: &str, _op: &str) -> Result<(), StoreError> {
		let mut conn = self.manager.clone();
		self.track::<()>(conn.del(key).await)
	}

	async fn clear(&self) -> Result<(), StoreError> {
		let keys = self.track(self.scan(&format!("{}*", CACHE_PREFIX)).await)?;
		if keys.is_empty() {
			return Ok(());
		}
		let mut conn = self.manager.clone();
		self.track::<()>(conn.del(keys).await)
	}

	async fn keys(&self, pattern: &str, _op: &str) -> Result<Vec<String>, StoreError> {
		self.track(self.scan(pattern).await)
	}

	async fn incr_by(
		&self,
		key: &str,
		amount: i64,
		_op: &str,
		ttl_on_create_ms: Option<u64>,
	) -> Result<i64, StoreError> {
		let mut conn = self.manager.clone();
		let result = Script::new(INCR_WITH_TTL)
			.key(key)
			.arg(amount)
			.arg(ttl_on_create_ms.unwrap_or(0))
			.invoke_async(&mut conn)
			.await;
		self.track(result)
	}

	async fn r_push(&self, key: &str, value: &Value, _op: &str) -> Result<u64, StoreError> {
		let mut conn = self.manager.clone();
		let encoded = serde_json::to_string(value)?;
		self.track(conn.rpush(key, encoded).await)
	}

	async fn l_range(
		&self,
		key: &str,
		start: i64,
		end: i64,
		_op: &str,
	) -> Result<Vec<Value>, StoreError> {
		let mut conn = self.manager.clone();
		let raw: Vec<String> = self.track(conn.lrange(key, start as isize, end as isize).await)?;
		raw.iter()
			.map(|item| serde_json::from_str(item).map_err(StoreError::from))
			.collect()
	}

	fn is_connected(&self) -> bool {
		self.connected.load(Ordering::Relaxed)
	}
}
