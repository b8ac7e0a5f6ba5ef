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

//! In-flight submissions per sender, stored through the cache fabric so
//! `eth_getTransactionCount(.., "pending")` can account for transactions
//! the mirror node has not indexed yet. Entries expire on their own TTL;
//! the pipeline removes them explicitly on completion.

use std::sync::Arc;

use ethereum_types::{H160, H256};
use serde_json::json;

use hc_store::CacheClient;

pub struct PendingPool {
	cache: Arc<dyn CacheClient>,
	ttl_ms: u64,
}

impl PendingPool {
	pub fn new(cache: Arc<dyn CacheClient>, ttl_ms: u64) -> Self {
		Self { cache, ttl_ms }
	}

	fn key(sender: H160, nonce: u64) -> String {
		format!("txpool:{:x}:{}", sender, nonce)
	}

	pub async fn add(&self, sender: H160, nonce: u64, hash: H256) {
		if let Err(err) = self
			.cache
			.set(
				&Self::key(sender, nonce),
				&json!(format!("0x{:x}", hash)),
				"txPool",
				Some(self.ttl_ms),
			)
			.await
		{
			log::warn!(target: "rpc", "pending pool insert for {:x} failed: {}", sender, err);
		}
	}

	pub async fn remove(&self, sender: H160, nonce: u64) {
		if let Err(err) = self.cache.delete(&Self::key(sender, nonce), "txPool").await {
			log::warn!(target: "rpc", "pending pool removal for {:x} failed: {}", sender, err);
		}
	}

	/// Number of submissions currently in flight for `sender`.
	pub async fn pending_count(&self, sender: H160) -> u64 {
		self.cache
			.keys(&format!("txpool:{:x}:*", sender), "txPool")
			.await
			.map(|keys| keys.len() as u64)
			.unwrap_or(0)
	}
}
