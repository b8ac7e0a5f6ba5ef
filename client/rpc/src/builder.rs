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

//! Composition root. The transport layer calls [`build_from_env`] once,
//! mounts the returned services on its JSON-RPC server, and binds one
//! clone per accepted connection via the services' `for_client` so every
//! request is attributed and rate-limited by the caller's address.

use std::{sync::Arc, time::Duration};

use hc_mirror::MirrorNodeClient;
use hc_sdk::SdkClient;
use hc_store::{
	CacheClient, FallbackCache, HbarLimitService, LocalCacheClient, LocalLockService, LockService,
	RateLimiter, RedisCacheClient, RedisLockService, StoreError,
};

use crate::{
	config::{
		self, hbar_limit_config_from_env, lock_config_from_env, mirror_config_from_env,
		rate_limiter_config_from_env, sdk_config_from_env,
	},
	eth::{BlockWorkerHandle, Eth, EthFilter, PendingPool},
	metrics::RelayMetrics,
	net::Net,
	web3::Web3,
	RelayConfig,
};

const LOCAL_CACHE_CAPACITY: usize = 10_000;
const LOCAL_CACHE_DEFAULT_TTL: Duration = Duration::from_secs(3_600);

#[derive(Debug, thiserror::Error)]
pub enum BuildError {
	#[error(transparent)]
	Config(#[from] config::ConfigError),
	#[error("shared store: {0}")]
	Store(#[from] StoreError),
	#[error("mirror client: {0}")]
	Mirror(#[from] hc_mirror::MirrorNodeClientError),
	#[error("sdk client: {0}")]
	Sdk(#[from] hc_sdk::SdkClientError),
	#[error("metrics registration: {0}")]
	Metrics(#[from] prometheus::Error),
}

/// Everything the transport layer mounts. The per-ip quota is enforced
/// inside each service; the shared limiter is exposed for transport-level
/// checks (e.g. refusing a websocket upgrade).
pub struct RelayServices {
	pub eth: Eth,
	pub filter: EthFilter,
	pub net: Net,
	pub web3: Web3,
	pub rate_limiter: Arc<RateLimiter>,
	/// Shared for readiness probes (`is_connected`) and admin cache
	/// flushes.
	pub cache: Arc<dyn CacheClient>,
}

pub async fn build_from_env(
	registry: Option<&prometheus::Registry>,
) -> Result<RelayServices, BuildError> {
	let relay_config = Arc::new(RelayConfig::from_env()?);

	let mirror: Arc<dyn hc_mirror::MirrorApi> =
		Arc::new(MirrorNodeClient::new(mirror_config_from_env()?)?);
	let consensus: Arc<dyn hc_sdk::ConsensusApi> = Arc::new(SdkClient::new(sdk_config_from_env()?)?);

	let local_cache = Arc::new(LocalCacheClient::new(
		LOCAL_CACHE_CAPACITY,
		LOCAL_CACHE_DEFAULT_TTL,
	));
	let redis_enabled = std::env::var("REDIS_ENABLED").as_deref() == Ok("true");
	let redis_url = std::env::var("REDIS_URL").ok();

	let cache: Arc<dyn CacheClient> = match (&redis_enabled, &redis_url) {
		(true, Some(url)) => {
			let shared = Arc::new(RedisCacheClient::connect(url).await?);
			Arc::new(FallbackCache::new(shared, local_cache.clone()))
		}
		_ => local_cache.clone(),
	};

	// Quotas stay process-local when IP_RATE_LIMIT_STORE selects LRU.
	let rate_limit_store: Arc<dyn CacheClient> =
		match std::env::var("IP_RATE_LIMIT_STORE").as_deref() {
			Ok("LRU") => local_cache,
			_ => cache.clone(),
		};

	let lock_config = lock_config_from_env()?;
	let lock: Arc<dyn LockService> = match (&redis_enabled, &redis_url) {
		(true, Some(url)) => Arc::new(RedisLockService::connect(url, lock_config).await?),
		_ => Arc::new(LocalLockService::new(lock_config)),
	};

	let hbar_limit = Arc::new(HbarLimitService::new(
		cache.clone(),
		hbar_limit_config_from_env()?,
	));
	let rate_limiter = Arc::new(RateLimiter::new(
		rate_limit_store,
		rate_limiter_config_from_env()?,
	));
	let pool = Arc::new(PendingPool::new(cache.clone(), relay_config.txpool_ttl_ms));
	let metrics = match registry {
		Some(registry) => Some(Arc::new(RelayMetrics::register(registry)?)),
		None => None,
	};

	// The worker carries its own upstream handle and cache handle.
	let block_worker = BlockWorkerHandle::spawn(mirror.clone(), cache.clone(), relay_config.clone());

	let eth = Eth::new(
		mirror,
		consensus,
		cache.clone(),
		lock,
		hbar_limit,
		rate_limiter.clone(),
		pool,
		block_worker,
		relay_config.clone(),
		metrics,
	);

	Ok(RelayServices {
		filter: EthFilter::new(eth.clone()),
		net: Net::new(relay_config.chain_id, rate_limiter.clone()),
		web3: Web3::new(relay_config.client_version.clone(), rate_limiter.clone()),
		rate_limiter,
		cache,
		eth,
	})
}
