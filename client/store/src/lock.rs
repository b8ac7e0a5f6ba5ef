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

//! Per-key exclusive mutex with FIFO fairness. Serializes transactions
//! from one sender so submissions leave the relay in nonce order even
//! under concurrent requests. The TTL is the ultimate liveness
//! guarantee: a holder that never releases is reclaimed, and a release
//! arriving after reclamation is ignored by token comparison.

use std::{
	collections::{HashMap, VecDeque},
	time::{Duration, Instant},
};

use async_trait::async_trait;
use parking_lot::Mutex;
use redis::{aio::ConnectionManager, AsyncCommands, Script};
use tokio::sync::Notify;

#[derive(Clone, Copy, Debug)]
pub struct LockConfig {
	pub ttl_ms: u64,
	pub acquisition_timeout_ms: u64,
	pub poll_interval_ms: u64,
}

impl Default for LockConfig {
	fn default() -> Self {
		Self {
			ttl_ms: 30_000,
			acquisition_timeout_ms: 15_000,
			poll_interval_ms: 100,
		}
	}
}

/// The lock contract. `acquire_lock` yields `None` on timeout or backend
/// failure; callers proceed unlocked in that case, tolerating the rare
/// nonce race rather than refusing service.
#[async_trait]
pub trait LockService: Send + Sync {
	async fn acquire_lock(&self, id: &str) -> Option<String>;
	async fn release_lock(&self, id: &str, session: &str);
}

fn new_session_token() -> String {
	hex::encode(rand::random::<[u8; 16]>())
}

struct Holder {
	token: String,
	expires_at: Instant,
}

#[derive(Default)]
struct LocalState {
	holders: HashMap<String, Holder>,
	queues: HashMap<String, VecDeque<String>>,
}

/// In-process lock backend for single-instance deployments.
pub struct LocalLockService {
	state: Mutex<LocalState>,
	released: Notify,
	config: LockConfig,
}

impl LocalLockService {
	pub fn new(config: LockConfig) -> Self {
		Self {
			state: Mutex::new(LocalState::default()),
			released: Notify::new(),
			config,
		}
	}

	fn try_take(&self, id: &str, token: &str) -> bool {
		let mut state = self.state.lock();
		let now = Instant::now();
		if state
			.holders
			.get(id)
			.is_some_and(|holder| holder.expires_at <= now)
		{
			state.holders.remove(id);
		}
		let at_head = state
			.queues
			.get(id)
			.and_then(|queue| queue.front())
			.is_some_and(|head| head == token);
		if !at_head || state.holders.contains_key(id) {
			return false;
		}
		state.holders.insert(
			id.to_owned(),
			Holder {
				token: token.to_owned(),
				expires_at: now + Duration::from_millis(self.config.ttl_ms),
			},
		);
		if let Some(queue) = state.queues.get_mut(id) {
			queue.pop_front();
		}
		true
	}

	fn leave_queue(&self, id: &str, token: &str) {
		let mut state = self.state.lock();
		if let Some(queue) = state.queues.get_mut(id) {
			queue.retain(|queued| queued != token);
			if queue.is_empty() {
				state.queues.remove(id);
			}
		}
	}
}

#[async_trait]
impl LockService for LocalLockService {
	async fn acquire_lock(&self, id: &str) -> Option<String> {
		let token = new_session_token();
		self.state
			.lock()
			.queues
			.entry(id.to_owned())
			.or_default()
			.push_back(token.clone());

		let deadline =
			Instant::now() + Duration::from_millis(self.config.acquisition_timeout_ms);
		loop {
			if self.try_take(id, &token) {
				return Some(token);
			}
			if Instant::now() >= deadline {
				self.leave_queue(id, &token);
				log::warn!(target: "store", "lock acquisition for {} timed out", id);
				return None;
			}
			tokio::select! {
				_ = self.released.notified() => {}
				_ = tokio::time::sleep(Duration::from_millis(self.config.poll_interval_ms)) => {}
			}
		}
	}

	async fn release_lock(&self, id: &str, session: &str) {
		let mut state = self.state.lock();
		if state
			.holders
			.get(id)
			.is_some_and(|holder| holder.token == session)
		{
			state.holders.remove(id);
			drop(state);
			self.released.notify_waiters();
		}
	}
}

// Compare-and-delete: only the current holder may release. A late
// release after TTL reclamation finds a foreign token and does nothing.
const RELEASE_IF_HELD: &str = r"
if redis.call('GET', KEYS[1]) == ARGV[1] then
	return redis.call('DEL', KEYS[1])
end
return 0
";

/// Shared-store lock backend for multi-instance deployments.
pub struct RedisLockService {
	manager: ConnectionManager,
	config: LockConfig,
}

impl RedisLockService {
	pub fn new(manager: ConnectionManager, config: LockConfig) -> Self {
		Self { manager, config }
	}

	pub async fn connect(url: &str, config: LockConfig) -> Result<Self, crate::StoreError> {
		let client = redis::Client::open(url)?;
		let manager = client.get_connection_manager().await?;
		Ok(Self::new(manager, config))
	}

	fn lock_key(id: &str) -> String {
		format!("lock:{}", id)
	}

	fn queue_key(id: &str) -> String {
		format!("lock:queue:{}", id)
	}

	async fn try_take(
		&self,
		conn: &mut ConnectionManager,
		id: &str,
		token: &str,
	) -> Result<bool, redis::RedisError> {
		let head: Option<String> = conn.lindex(Self::queue_key(id), 0).await?;
		if head.as_deref() != Some(token) {
			return Ok(false);
		}
		let taken: Option<String> = redis::cmd("SET")
			.arg(Self::lock_key(id))
			.arg(token)
			.arg("NX")
			.arg("PX")
			.arg(self.config.ttl_ms)
			.query_async(conn)
			.await?;
		if taken.is_none() {
			return Ok(false);
		}
		let _: i64 = conn.lrem(Self::queue_key(id), 1, token).await?;
		Ok(true)
	}

	async fn leave_queue(&self, conn: &mut ConnectionManager, id: &str, token: &str) {
		if let Err(err) = conn
			.lrem::<_, _, i64>(Self::queue_key(id), 1, token)
			.await
		{
			log::warn!(target: "store", "failed to leave lock queue for {}: {}", id, err);
		}
	}
}

#[async_trait]
impl LockService for RedisLockService {
	async fn acquire_lock(&self, id: &str) -> Option<String> {
		let token = new_session_token();
		let mut conn = self.manager.clone();
		if let Err(err) = conn
			.rpush::<_, _, i64>(Self::queue_key(id), &token)
			.await
		{
			log::warn!(target: "store", "lock queue push for {} failed: {}", id, err);
			return None;
		}

		let deadline =
			Instant::now() + Duration::from_millis(self.config.acquisition_timeout_ms);
		loop {
			match self.try_take(&mut conn, id, &token).await {
				Ok(true) => return Some(token),
				Ok(false) => {}
				Err(err) => {
					log::warn!(target: "store", "lock acquisition for {} failed: {}", id, err);
					self.leave_queue(&mut conn, id, &token).await;
					return None;
				}
			}
			if Instant::now() >= deadline {
				self.leave_queue(&mut conn, id, &token).await;
				log::warn!(target: "store", "lock acquisition for {} timed out", id);
				return None;
			}
			tokio::time::sleep(Duration::from_millis(self.config.poll_interval_ms)).await;
		}
	}

	async fn release_lock(&self, id: &str, session: &str) {
		let mut conn = self.manager.clone();
		let released: Result<i64, _> = Script::new(RELEASE_IF_HELD)
			.key(Self::lock_key(id))
			.arg(session)
			.invoke_async(&mut conn)
			.await;
		if let Err(err) = released {
			// The TTL will reclaim the lock.
			log::warn!(target: "store", "lock release for {} failed: {}", id, err);
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use std::sync::Arc;

	fn quick_config() -> LockConfig {
		LockConfig {
			ttl_ms: 10_000,
			acquisition_timeout_ms: 2_000,
			poll_interval_ms: 5,
		}
	}

	#[tokio::test]
	async fn exclusive_and_fifo() {
		let lock = Arc::new(LocalLockService::new(quick_config()));
		let held = lock.acquire_lock("0xaaa").await.unwrap();

		let (order_tx, mut order_rx) = tokio::sync::mpsc::unbounded_channel::<&'static str>();

		let first = {
			let lock = lock.clone();
			let order_tx = order_tx.clone();
			tokio::spawn(async move {
				let token = lock.acquire_lock("0xaaa").await.unwrap();
				order_tx.send("first").unwrap();
				lock.release_lock("0xaaa", &token).await;
			})
		};
		// Give the first waiter time to join the queue ahead of the second.
		tokio::time::sleep(Duration::from_millis(50)).await;
		let second = {
			let lock = lock.clone();
			let order_tx = order_tx.clone();
			tokio::spawn(async move {
				let token = lock.acquire_lock("0xaaa").await.unwrap();
				order_tx.send("second").unwrap();
				lock.release_lock("0xaaa", &token).await;
			})
		};

		tokio::time::sleep(Duration::from_millis(50)).await;
		lock.release_lock("0xaaa", &held).await;

		first.await.unwrap();
		second.await.unwrap();
		assert_eq!(order_rx.recv().await, Some("first"));
		assert_eq!(order_rx.recv().await, Some("second"));
	}

	#[tokio::test]
	async fn acquisition_times_out_to_none() {
		let lock = LocalLockService::new(LockConfig {
			acquisition_timeout_ms: 50,
			..quick_config()
		});
		let _held = lock.acquire_lock("0xbbb").await.unwrap();
		assert!(lock.acquire_lock("0xbbb").await.is_none());
	}

	#[tokio::test]
	async fn mismatched_release_is_ignored() {
		let lock = LocalLockService::new(LockConfig {
			ttl_ms: 10_000,
			acquisition_timeout_ms: 100,
			poll_interval_ms: 5,
		});
		let held = lock.acquire_lock("0xccc").await.unwrap();
		lock.release_lock("0xccc", "not-the-token").await;
		assert!(lock.acquire_lock("0xccc").await.is_none());
		lock.release_lock("0xccc", &held).await;
		assert!(lock.acquire_lock("0xccc").await.is_some());
	}

	#[tokio::test]
	async fn expired_holder_is_reclaimed() {
		let lock = LocalLockService::new(LockConfig {
			ttl_ms: 20,
			acquisition_timeout_ms: 2_000,
			poll_interval_ms: 5,
		});
		let _stale = lock.acquire_lock("0xddd").await.unwrap();
		tokio::time::sleep(Duration::from_millis(40)).await;
		assert!(lock.acquire_lock("0xddd").await.is_some());
	}
}
