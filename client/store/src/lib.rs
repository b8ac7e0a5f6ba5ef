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

//! Cross-request state for the relay: the two-tier cache fabric, the
//! per-sender distributed lock, the per-IP rate limiter and the HBAR
//! spending governor. The shared Redis store is the only cross-process
//! state in the system; everything else in here is per-process.

mod cache;
mod fallback;
mod hbar_limit;
mod lock;
mod rate_limit;
mod redis_cache;

pub use cache::{cache_key, CacheClient, LocalCacheClient};
pub use fallback::FallbackCache;
pub use hbar_limit::{
	ms_until_end_of_day, HbarLimitConfig, HbarLimitService, SpendingPlan, SpendingTier,
};
pub use lock::{LocalLockService, LockConfig, LockService, RedisLockService};
pub use rate_limit::{RateLimiter, RateLimiterConfig};
pub use redis_cache::RedisCacheClient;

/// Prefix under which cache entries live in the shared store. `clear`
/// must never touch anything outside of it.
pub const CACHE_PREFIX: &str = "cache:";

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
	#[error("shared store error: {0}")]
	Redis(#[from] redis::RedisError),
	#[error("cache value serialization failed: {0}")]
	Serde(#[from] serde_json::Error),
	#[error("shared store is not connected")]
	NotConnected,
}
