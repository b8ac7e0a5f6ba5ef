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

//! Shared read-path plumbing: block-tag resolution, block-range and
//! timestamp validation, log query composition and gas-price retrieval.

use ethereum_types::U256;
use futures::future::join_all;
use jsonrpsee::core::RpcResult;
use serde_json::json;

use hc_mirror::{LogQuery, MirrorBlock, MirrorLog};
use hc_rpc_core::types::{BlockNumber, Bytes, Filter, Log, RequestContext, VariadicValue};
use hc_store::cache_key;
use hp_ethereum::TINYBAR_TO_WEIBAR_COEF;

use crate::{
	format::{bytes_from_hex, h256_from_hex, h256_from_long_hex, strip_leading_zeros},
	mirror_err, predefined,
};

use super::Eth;

const DAY_SECONDS: u128 = 86_400;
const NESTED_TOPIC_CAP: usize = 100;

impl Eth {
	/// Latest block number, read through the short-lived
	/// `eth_blockNumber` cache entry.
	pub(crate) async fn get_latest_block_number(&self, ctx: &RequestContext) -> RpcResult<u64> {
		let key = cache_key("eth_blockNumber", &[]);
		if let Ok(Some(cached)) = self.cache.get(&key, "getLatestBlockNumber").await {
			if let Some(number) = cached.as_u64() {
				return Ok(number);
			}
		}
		let block = self
			.mirror
			.get_latest_block()
			.await
			.map_err(mirror_err)?
			.ok_or_else(|| {
				log::warn!(target: "rpc", "{} mirror node has no blocks", ctx);
				predefined::unknown_block()
			})?;
		let _ = self
			.cache
			.set(
				&key,
				&json!(block.number),
				"getLatestBlockNumber",
				Some(self.config.eth_block_number_cache_ttl_ms),
			)
			.await;
		Ok(block.number)
	}

	/// Resolve a block parameter to a concrete number. `None` when the
	/// block does not exist or lies beyond the future-block tolerance.
	pub(crate) async fn resolve_block_tag(
		&self,
		number: &BlockNumber,
		return_latest: bool,
		ctx: &RequestContext,
	) -> RpcResult<Option<u64>> {
		if !return_latest && number.is_latest() {
			// Contradiction guard: the caller explicitly asked for a
			// historical block.
			return Ok(None);
		}
		match number {
			BlockNumber::Earliest => Ok(Some(0)),
			BlockNumber::Num(number) => {
				let latest = self.get_latest_block_number(ctx).await?;
				if *number > latest + self.config.max_block_range {
					return Ok(None);
				}
				Ok(Some(*number))
			}
			BlockNumber::Hash { hash, .. } => {
				let block = self
					.mirror
					.get_block(&format!("0x{:x}", hash))
					.await
					.map_err(mirror_err)?;
				Ok(block.map(|block| block.number))
			}
			_ => Ok(Some(self.get_latest_block_number(ctx).await?)),
		}
	}

	/// Fetch the mirror block a parameter names, honoring the
	/// contradiction guard and the future-block tolerance.
	pub(crate) async fn get_historical_block(
		&self,
		number: &BlockNumber,
		return_latest: bool,
		ctx: &RequestContext,
	) -> RpcResult<Option<MirrorBlock>> {
		let resolved = match self.resolve_block_tag(number, return_latest, ctx).await? {
			Some(resolved) => resolved,
			None => return Ok(None),
		};
		self.mirror
			.get_block(&resolved.to_string())
			.await
			.map_err(mirror_err)
	}

	/// Resolve a log-query block range to mirror timestamps, enforcing
	/// the ordering, span and size limits. `None` means an empty result.
	pub(crate) async fn validate_block_range_and_timestamps(
		&self,
		from: Option<BlockNumber>,
		to: Option<BlockNumber>,
		single_address: bool,
		ctx: &RequestContext,
	) -> RpcResult<Option<(String, String)>> {
		let to_is_latest = to.map(|to| to.is_latest()).unwrap_or(true);
		if from.is_none() && !to_is_latest {
			return Err(predefined::invalid_parameter(
				"fromBlock",
				"missing while toBlock names a historical block",
			));
		}
		let from = from.unwrap_or(BlockNumber::Latest);
		let to = to.unwrap_or(BlockNumber::Latest);

		let from_block = match self.get_historical_block(&from, true, ctx).await? {
			Some(block) => block,
			None => return Ok(None),
		};
		let to_block = match self.get_historical_block(&to, true, ctx).await? {
			Some(block) => block,
			None => return Ok(None),
		};

		if from_block.number > to_block.number {
			return Err(predefined::invalid_block_range());
		}

		let from_nanos = hc_mirror::timestamp_to_nanos(&from_block.timestamp.from).unwrap_or(0);
		let to_nanos = hc_mirror::timestamp_to_nanos(&to_block.timestamp.to).unwrap_or(0);
		let span_days = self.config.max_timestamp_range_days as u128;
		if to_nanos.saturating_sub(from_nanos) > span_days * DAY_SECONDS * 1_000_000_000 {
			return Err(predefined::timestamp_range_too_large(
				from_block.number,
				to_block.number,
				self.config.max_timestamp_range_days,
			));
		}

		if !single_address
			&& to_block.number - from_block.number > self.config.eth_get_logs_block_range_limit
		{
			return Err(predefined::invalid_parameter(
				"blockRange",
				format!(
					"exceeds maximum of {} blocks",
					self.config.eth_get_logs_block_range_limit
				),
			));
		}

		Ok(Some((
			from_block.timestamp.from.clone(),
			to_block.timestamp.to.clone(),
		)))
	}

	/// Normalize filter topics for the mirror node: strip leading zeros
	/// from every value, cap nested arrays.
	pub(crate) fn normalize_topics(filter: &Filter) -> Vec<Vec<String>> {
		filter
			.topics
			.as_deref()
			.unwrap_or(&[])
			.iter()
			.map(|position| match position {
				Some(VariadicValue::Single(topic)) => vec![strip_leading_zeros(topic)],
				Some(VariadicValue::Multiple(topics)) => topics
					.iter()
					.take(NESTED_TOPIC_CAP)
					.map(strip_leading_zeros)
					.collect(),
				Some(VariadicValue::Null) | None => Vec::new(),
			})
			.collect()
	}

	pub(crate) async fn get_logs_impl(
		&self,
		filter: &Filter,
		ctx: &RequestContext,
	) -> RpcResult<Vec<Log>> {
		if filter.block_hash.is_some() && (filter.from_block.is_some() || filter.to_block.is_some())
		{
			return Err(predefined::invalid_parameter(
				"blockHash",
				"cannot be combined with fromBlock/toBlock",
			));
		}

		let addresses = filter
			.address
			.as_ref()
			.map(|address| address.to_vec())
			.unwrap_or_default();

		let (timestamp_gte, timestamp_lte) = match filter.block_hash {
			Some(hash) => {
				let block = self
					.mirror
					.get_block(&format!("0x{:x}", hash))
					.await
					.map_err(mirror_err)?;
				match block {
					Some(block) => (block.timestamp.from.clone(), block.timestamp.to.clone()),
					None => return Ok(Vec::new()),
				}
			}
			None => {
				match self
					.validate_block_range_and_timestamps(
						filter.from_block,
						filter.to_block,
						addresses.len() == 1,
						ctx,
					)
					.await?
				{
					Some(range) => range,
					None => return Ok(Vec::new()),
				}
			}
		};

		let topics = Self::normalize_topics(filter);
		let base_query = LogQuery {
			address: None,
			timestamp_gte: Some(timestamp_gte),
			timestamp_lte: Some(timestamp_lte),
			topics,
			transaction_hash: None,
		};

		let mut logs = if addresses.is_empty() {
			self.mirror.get_logs(&base_query).await.map_err(mirror_err)?
		} else {
			// Fan out one query per address; merged below.
			let queries = addresses.iter().map(|address| {
				let mut query = base_query.clone();
				query.address = Some(format!("0x{:x}", address));
				async move { self.mirror.get_logs(&query).await }
			});
			let mut merged = Vec::new();
			for result in join_all(queries).await {
				merged.extend(result.map_err(mirror_err)?);
			}
			merged
		};

		logs.sort_by_key(|log| {
			(
				log.timestamp
					.as_deref()
					.and_then(hc_mirror::timestamp_to_nanos)
					.unwrap_or(0),
				log.index,
			)
		});

		Ok(logs.iter().map(mirror_log_to_log).collect())
	}

	/// Network gas price in tinybars, cached.
	pub(crate) async fn gas_price_tinybars(&self, ctx: &RequestContext) -> RpcResult<u64> {
		let key = cache_key("eth_gasPrice", &[]);
		if let Ok(Some(cached)) = self.cache.get(&key, "gasPrice").await {
			if let Some(price) = cached.as_u64() {
				return Ok(price);
			}
		}
		let fees = self
			.mirror
			.get_network_fees()
			.await
			.map_err(mirror_err)?
			.and_then(|fees| fees.ethereum_transaction_gas())
			.ok_or_else(|| {
				log::warn!(target: "rpc", "{} mirror node reports no EthereumTransaction fee", ctx);
				crate::internal_err("network fee unavailable")
			})?;
		let _ = self
			.cache
			.set(&key, &json!(fees), "gasPrice", Some(self.config.gas_price_cache_ttl_ms))
			.await;
		Ok(fees)
	}

	/// Network gas price in weibars with the configured percent buffer.
	pub(crate) async fn gas_price_weibars(&self, ctx: &RequestContext) -> RpcResult<U256> {
		let tinybars = self.gas_price_tinybars(ctx).await?;
		let weibars = U256::from(tinybars) * U256::from(TINYBAR_TO_WEIBAR_COEF);
		Ok(weibars + weibars * self.config.gas_price_buffer_percent / 100)
	}

	/// Current USD-cent per HBAR exchange rate, cached.
	pub(crate) async fn exchange_rate_cents_per_hbar(
		&self,
		_ctx: &RequestContext,
	) -> RpcResult<(u64, u64)> {
		let key = cache_key("currentNetworkExchangeRate", &[]);
		if let Ok(Some(cached)) = self.cache.get(&key, "exchangeRate").await {
			if let (Some(cents), Some(hbars)) =
				(cached["cents"].as_u64(), cached["hbars"].as_u64())
			{
				return Ok((cents, hbars));
			}
		}
		let rate = self
			.mirror
			.get_network_exchange_rate()
			.await
			.map_err(mirror_err)?
			.ok_or_else(|| crate::internal_err("network exchange rate unavailable"))?;
		let cents = rate.current_rate.cent_equivalent.max(1);
		let hbars = rate.current_rate.hbar_equivalent.max(1);
		let _ = self
			.cache
			.set(
				&key,
				&json!({ "cents": cents, "hbars": hbars }),
				"exchangeRate",
				Some(self.config.exchange_rate_cache_ttl_ms),
			)
			.await;
		Ok((cents, hbars))
	}
}

/// Convert a mirror log row to its rpc shape.
pub(crate) fn mirror_log_to_log(log: &MirrorLog) -> Log {
	Log {
		address: log
			.address
			.as_deref()
			.and_then(crate::format::h160_from_hex)
			.unwrap_or_default(),
		topics: log
			.topics
			.iter()
			.filter_map(|topic| h256_from_hex(topic))
			.collect(),
		data: Bytes(
			log.data
				.as_deref()
				.and_then(bytes_from_hex)
				.unwrap_or_default(),
		),
		block_hash: log.block_hash.as_deref().and_then(h256_from_long_hex),
		block_number: log.block_number.map(U256::from),
		block_timestamp: log
			.timestamp
			.as_deref()
			.map(|timestamp| U256::from(crate::format::timestamp_seconds(timestamp))),
		transaction_hash: log.transaction_hash.as_deref().and_then(h256_from_hex),
		transaction_index: log.transaction_index.map(|index| U256::from(index.max(0) as u64)),
		log_index: Some(U256::from(log.index)),
		removed: false,
	}
}
