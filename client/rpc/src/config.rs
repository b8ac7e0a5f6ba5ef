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

//! Relay configuration, read from the environment by the process entry
//! point. Components receive typed config structs; nothing below this
//! module touches environment variables.

use std::{collections::HashMap, str::FromStr};

use ethereum_types::H160;

use hc_mirror::MirrorClientConfig;
use hc_sdk::{NodeConfig, SdkClientConfig};
use hc_store::{HbarLimitConfig, LockConfig, RateLimiterConfig};

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
	#[error("missing required environment variable {0}")]
	Missing(&'static str),
	#[error("invalid value for {key}: {value}")]
	Invalid { key: &'static str, value: String },
}

fn env(key: &'static str) -> Option<String> {
	std::env::var(key).ok().filter(|value| !value.is_empty())
}

fn env_parse<T: FromStr>(key: &'static str, default: T) -> Result<T, ConfigError> {
	match env(key) {
		Some(value) => value.parse().map_err(|_| ConfigError::Invalid {
			key,
			value,
		}),
		None => Ok(default),
	}
}

fn env_bool(key: &'static str, default: bool) -> Result<bool, ConfigError> {
	match env(key).as_deref() {
		Some("true") | Some("1") => Ok(true),
		Some("false") | Some("0") => Ok(false),
		Some(other) => Err(ConfigError::Invalid {
			key,
			value: other.to_owned(),
		}),
		None => Ok(default),
	}
}

/// Core relay configuration shared by the rpc services.
#[derive(Clone, Debug)]
pub struct RelayConfig {
	pub chain_id: u64,
	pub network: String,
	pub client_version: String,
	/// Operator account in EVM form, used as the implicit `from` of
	/// value-bearing calls.
	pub operator_evm_address: Option<H160>,

	// eth_call routing
	pub eth_call_default_to_consensus: bool,
	pub eth_call_consensus_selectors: Vec<[u8; 4]>,
	pub eth_call_cache_ttl_ms: u64,

	// block resolution and log queries
	pub eth_block_number_cache_ttl_ms: u64,
	pub eth_get_logs_block_range_limit: u64,
	pub max_block_range: u64,
	pub max_timestamp_range_days: u64,
	pub tx_count_max_block_range: usize,

	// gas and fees
	pub max_gas_per_sec: u64,
	pub max_transaction_fee_threshold: u64,
	pub gas_price_buffer_percent: u64,
	pub gas_price_tinybar_buffer: u64,
	pub gas_price_cache_ttl_ms: u64,
	pub exchange_rate_cache_ttl_ms: u64,

	// estimateGas fallbacks
	pub estimate_contract_call_gas: u64,
	pub estimate_default_gas: u64,

	// submission pipeline
	pub call_data_size_limit: usize,
	pub transaction_size_limit: usize,
	pub file_append_chunk_size: usize,
	pub jumbo_tx_enabled: bool,
	pub use_async_tx_processing: bool,
	pub paymaster_enabled: bool,
	pub paymaster_whitelist: Vec<String>,
	pub paymaster_max_gas_allowance_tinybars: i64,
	pub mirror_poll_count: u32,
	pub mirror_poll_delay_ms: u64,

	// caches with entity scope
	pub get_code_cache_ttl_ms: u64,
	pub filter_ttl_ms: u64,
	pub txpool_ttl_ms: u64,
}

impl Default for RelayConfig {
	fn default() -> Self {
		Self {
			chain_id: 0x12a,
			network: "testnet".to_owned(),
			client_version: format!("relay/{}", env!("CARGO_PKG_VERSION")),
			operator_evm_address: None,
			eth_call_default_to_consensus: false,
			eth_call_consensus_selectors: Vec::new(),
			eth_call_cache_ttl_ms: 200,
			eth_block_number_cache_ttl_ms: 1_000,
			eth_get_logs_block_range_limit: 1_000,
			max_block_range: 5,
			max_timestamp_range_days: 7,
			tx_count_max_block_range: 25_000,
			max_gas_per_sec: 15_000_000,
			max_transaction_fee_threshold: 15_000_000,
			gas_price_buffer_percent: 0,
			gas_price_tinybar_buffer: 10_000_000_000,
			gas_price_cache_ttl_ms: 1_800_000,
			exchange_rate_cache_ttl_ms: 900_000,
			estimate_contract_call_gas: 500_000,
			estimate_default_gas: 400_000,
			call_data_size_limit: 131_072,
			transaction_size_limit: 133_120,
			file_append_chunk_size: 5_120,
			jumbo_tx_enabled: false,
			use_async_tx_processing: false,
			paymaster_enabled: false,
			paymaster_whitelist: Vec::new(),
			paymaster_max_gas_allowance_tinybars: 0,
			mirror_poll_count: 10,
			mirror_poll_delay_ms: 1_000,
			get_code_cache_ttl_ms: 3_600_000,
			filter_ttl_ms: 300_000,
			txpool_ttl_ms: 30_000,
		}
	}
}

impl RelayConfig {
	pub fn from_env() -> Result<Self, ConfigError> {
		let defaults = Self::default();
		let chain_id = match env("CHAIN_ID") {
			Some(value) => {
				let stripped = value.strip_prefix("0x").unwrap_or(&value);
				u64::from_str_radix(stripped, 16).map_err(|_| ConfigError::Invalid {
					key: "CHAIN_ID",
					value,
				})?
			}
			None => return Err(ConfigError::Missing("CHAIN_ID")),
		};
		let selectors = match env("ETH_CALL_CONSENSUS_SELECTORS") {
			Some(raw) => raw
				.split(',')
				.filter(|part| !part.is_empty())
				.map(|part| {
					let stripped = part.trim().trim_start_matches("0x");
					let bytes = hex::decode(stripped).map_err(|_| ConfigError::Invalid {
						key: "ETH_CALL_CONSENSUS_SELECTORS",
						value: part.to_owned(),
					})?;
					<[u8; 4]>::try_from(bytes.as_slice()).map_err(|_| ConfigError::Invalid {
						key: "ETH_CALL_CONSENSUS_SELECTORS",
						value: part.to_owned(),
					})
				})
				.collect::<Result<Vec<_>, _>>()?,
			None => Vec::new(),
		};
		let operator_evm_address = match env("OPERATOR_EVM_ADDRESS") {
			Some(value) => Some(
				value
					.trim_start_matches("0x")
					.parse()
					.map_err(|_| ConfigError::Invalid {
						key: "OPERATOR_EVM_ADDRESS",
						value,
					})?,
			),
			None => None,
		};

		Ok(Self {
			chain_id,
			network: env("HEDERA_NETWORK").unwrap_or(defaults.network),
			operator_evm_address,
			eth_call_default_to_consensus: env_bool(
				"ETH_CALL_DEFAULT_TO_CONSENSUS_NODE",
				defaults.eth_call_default_to_consensus,
			)?,
			eth_call_consensus_selectors: selectors,
			eth_call_cache_ttl_ms: env_parse("ETH_CALL_CACHE_TTL", defaults.eth_call_cache_ttl_ms)?,
			eth_block_number_cache_ttl_ms: env_parse(
				"ETH_BLOCK_NUMBER_CACHE_TTL_MS",
				defaults.eth_block_number_cache_ttl_ms,
			)?,
			eth_get_logs_block_range_limit: env_parse(
				"ETH_GET_LOGS_BLOCK_RANGE_LIMIT",
				defaults.eth_get_logs_block_range_limit,
			)?,
			max_block_range: env_parse("MAX_BLOCK_RANGE", defaults.max_block_range)?,
			max_timestamp_range_days: defaults.max_timestamp_range_days,
			tx_count_max_block_range: env_parse(
				"TX_COUNT_MAX_BLOCK_RANGE",
				defaults.tx_count_max_block_range,
			)?,
			max_gas_per_sec: env_parse("MAX_GAS_PER_SEC", defaults.max_gas_per_sec)?,
			max_transaction_fee_threshold: env_parse(
				"MAX_TRANSACTION_FEE_THRESHOLD",
				defaults.max_transaction_fee_threshold,
			)?,
			gas_price_buffer_percent: env_parse(
				"GAS_PRICE_PERCENTAGE_BUFFER",
				defaults.gas_price_buffer_percent,
			)?,
			gas_price_tinybar_buffer: env_parse(
				"GAS_PRICE_TINY_BAR_BUFFER",
				defaults.gas_price_tinybar_buffer,
			)?,
			gas_price_cache_ttl_ms: defaults.gas_price_cache_ttl_ms,
			exchange_rate_cache_ttl_ms: defaults.exchange_rate_cache_ttl_ms,
			estimate_contract_call_gas: defaults.estimate_contract_call_gas,
			estimate_default_gas: defaults.estimate_default_gas,
			call_data_size_limit: env_parse("CALL_DATA_SIZE_LIMIT", defaults.call_data_size_limit)?,
			transaction_size_limit: env_parse(
				"SEND_RAW_TRANSACTION_SIZE_LIMIT",
				defaults.transaction_size_limit,
			)?,
			file_append_chunk_size: env_parse(
				"FILE_APPEND_CHUNK_SIZE",
				defaults.file_append_chunk_size,
			)?,
			jumbo_tx_enabled: env_bool("JUMBO_TX_ENABLED", defaults.jumbo_tx_enabled)?,
			use_async_tx_processing: env_bool(
				"USE_ASYNC_TX_PROCESSING",
				defaults.use_async_tx_processing,
			)?,
			paymaster_enabled: env_bool("PAYMASTER_ENABLED", defaults.paymaster_enabled)?,
			paymaster_whitelist: env("PAYMASTER_WHITELIST")
				.map(|raw| {
					raw.split(',')
						.map(|part| part.trim().to_ascii_lowercase())
						.filter(|part| !part.is_empty())
						.collect()
				})
				.unwrap_or(defaults.paymaster_whitelist),
			paymaster_max_gas_allowance_tinybars: env_parse(
				"MAX_GAS_ALLOWANCE_TINYBARS",
				defaults.paymaster_max_gas_allowance_tinybars,
			)?,
			mirror_poll_count: env_parse("SEND_RAW_TRANSACTION_POLL_COUNT", defaults.mirror_poll_count)?,
			mirror_poll_delay_ms: env_parse(
				"SEND_RAW_TRANSACTION_POLL_DELAY_MS",
				defaults.mirror_poll_delay_ms,
			)?,
			get_code_cache_ttl_ms: defaults.get_code_cache_ttl_ms,
			filter_ttl_ms: env_parse("FILTER_TTL", defaults.filter_ttl_ms)?,
			txpool_ttl_ms: defaults.txpool_ttl_ms,
			client_version: defaults.client_version,
		})
	}

	/// Whether the paymaster subsidizes transfers to `recipient`.
	pub fn is_paymaster_recipient(&self, recipient: Option<H160>) -> bool {
		if !self.paymaster_enabled {
			return false;
		}
		if self.paymaster_whitelist.iter().any(|entry| entry == "*") {
			return true;
		}
		match recipient {
			Some(recipient) => {
				let hex = format!("0x{:x}", recipient);
				self.paymaster_whitelist.iter().any(|entry| *entry == hex)
			}
			None => false,
		}
	}
}

pub fn mirror_config_from_env() -> Result<MirrorClientConfig, ConfigError> {
	let defaults = MirrorClientConfig::default();
	Ok(MirrorClientConfig {
		base_url: env("MIRROR_NODE_URL").ok_or(ConfigError::Missing("MIRROR_NODE_URL"))?,
		request_timeout_ms: env_parse("MIRROR_NODE_TIMEOUT_MS", defaults.request_timeout_ms)?,
		max_retries: env_parse("MIRROR_NODE_RETRIES", defaults.max_retries)?,
		retry_delay_ms: env_parse("MIRROR_NODE_RETRY_DELAY", defaults.retry_delay_ms)?,
		max_pages: env_parse("MIRROR_NODE_MAX_PAGES", defaults.max_pages)?,
	})
}

pub fn sdk_config_from_env() -> Result<SdkClientConfig, ConfigError> {
	let defaults = SdkClientConfig::default();

	// HEDERA_NETWORK is either a known network name or a JSON node map of
	// `url -> account id`.
	let network = env("HEDERA_NETWORK").ok_or(ConfigError::Missing("HEDERA_NETWORK"))?;
	let nodes = if network.trim_start().starts_with('{') {
		let map: HashMap<String, String> =
			serde_json::from_str(&network).map_err(|_| ConfigError::Invalid {
				key: "HEDERA_NETWORK",
				value: network.clone(),
			})?;
		let mut nodes = Vec::with_capacity(map.len());
		for (url, account) in map {
			let account_num = account
				.rsplit('.')
				.next()
				.and_then(|num| num.parse().ok())
				.ok_or(ConfigError::Invalid {
					key: "HEDERA_NETWORK",
					value: account.clone(),
				})?;
			nodes.push(NodeConfig { url, account_num });
		}
		nodes
	} else {
		Vec::new()
	};

	let grpc_deadline_ms = match env("SDK_GRPC_DEADLINE") {
		Some(value) => value.parse().map_err(|_| ConfigError::Invalid {
			key: "SDK_GRPC_DEADLINE",
			value,
		})?,
		None => match env("CONSENSUS_MAX_EXECUTION_TIME") {
			Some(value) => {
				log::warn!(
					target: "sdk",
					"CONSENSUS_MAX_EXECUTION_TIME is deprecated, use SDK_GRPC_DEADLINE",
				);
				value.parse().map_err(|_| ConfigError::Invalid {
					key: "CONSENSUS_MAX_EXECUTION_TIME",
					value,
				})?
			}
			None => defaults.grpc_deadline_ms,
		},
	};

	Ok(SdkClientConfig {
		nodes,
		operator_shard: 0,
		operator_realm: 0,
		operator_account_num: env("OPERATOR_ID_MAIN")
			.and_then(|id| id.rsplit('.').next().and_then(|num| num.parse().ok()))
			.ok_or(ConfigError::Missing("OPERATOR_ID_MAIN"))?,
		operator_key_hex: env("OPERATOR_KEY_MAIN").ok_or(ConfigError::Missing("OPERATOR_KEY_MAIN"))?,
		request_timeout_ms: env_parse("SDK_REQUEST_TIMEOUT", defaults.request_timeout_ms)?,
		grpc_deadline_ms,
		max_attempts: env_parse("SDK_MAX_ATTEMPTS", defaults.max_attempts)?,
		file_append_chunk_size: env_parse("FILE_APPEND_CHUNK_SIZE", defaults.file_append_chunk_size)?,
		file_append_max_chunks: env_parse("FILE_APPEND_MAX_CHUNKS", defaults.file_append_max_chunks)?,
	})
}

pub fn lock_config_from_env() -> Result<LockConfig, ConfigError> {
	let defaults = LockConfig::default();
	Ok(LockConfig {
		ttl_ms: env_parse("LOCK_TTL_MS", defaults.ttl_ms)?,
		acquisition_timeout_ms: env_parse(
			"LOCK_ACQUISITION_TIMEOUT_MS",
			defaults.acquisition_timeout_ms,
		)?,
		poll_interval_ms: defaults.poll_interval_ms,
	})
}

pub fn rate_limiter_config_from_env() -> Result<RateLimiterConfig, ConfigError> {
	let defaults = RateLimiterConfig::default();
	Ok(RateLimiterConfig {
		window_ms: env_parse("LIMIT_DURATION", defaults.window_ms)?,
		default_limit: env_parse("DEFAULT_RATE_LIMIT", defaults.default_limit)?,
		method_limits: defaults.method_limits,
	})
}

pub fn hbar_limit_config_from_env() -> Result<HbarLimitConfig, ConfigError> {
	let defaults = HbarLimitConfig::default();
	Ok(HbarLimitConfig {
		basic_cap: env_parse("HBAR_RATE_LIMIT_BASIC", defaults.basic_cap)?,
		extended_cap: env_parse("HBAR_RATE_LIMIT_EXTENDED", defaults.extended_cap)?,
		privileged_cap: env_parse("HBAR_RATE_LIMIT_PRIVILEGED", defaults.privileged_cap)?,
		enabled: env_bool("HBAR_RATE_LIMIT_ENABLED", defaults.enabled)?,
	})
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn paymaster_whitelist_matches_exact_and_wildcard() {
		let mut config = RelayConfig {
			paymaster_enabled: true,
			paymaster_whitelist: vec!["0x0000000000000000000000000000000000000aaa".to_owned()],
			..RelayConfig::default()
		};
		assert!(config.is_paymaster_recipient(Some(H160::from_low_u64_be(0xaaa))));
		assert!(!config.is_paymaster_recipient(Some(H160::from_low_u64_be(0xbbb))));
		assert!(!config.is_paymaster_recipient(None));

		config.paymaster_whitelist = vec!["*".to_owned()];
		assert!(config.is_paymaster_recipient(Some(H160::from_low_u64_be(0xbbb))));

		config.paymaster_enabled = false;
		assert!(!config.is_paymaster_recipient(Some(H160::from_low_u64_be(0xbbb))));
	}
}
