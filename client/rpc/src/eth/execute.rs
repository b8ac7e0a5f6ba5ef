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

//! `eth_call`, `eth_estimateGas`, `eth_getCode` and `eth_getStorageAt`:
//! routing between the mirror node and the consensus node, request
//! fingerprint caching, and normalization of backend failures into
//! Ethereum-shaped reverts.

use ethereum_types::{H160, H256, U256};
use jsonrpsee::core::RpcResult;
use serde_json::json;

use hc_mirror::{ContractCallRequest, MirrorEntity};
use hc_rpc_core::types::{BlockNumber, Bytes, CallRequest, RequestContext};
use hc_sdk::{ResponseCode, SdkClientError};
use hc_store::cache_key;
use hp_ethereum::{intrinsic_gas, keccak256};

use crate::{
	format::{bytes_from_hex, u256_from_hex},
	mirror_err, predefined,
};

use super::{
	hts_precompile_address, Eth, INVALID_EVM_INSTRUCTION, REDIRECT_BYTECODE_POSTFIX,
	REDIRECT_BYTECODE_PREFIX,
};

/// Gas consumed by the backend when a transfer must materialize a
/// hollow account for its recipient.
const TX_HOLLOW_ACCOUNT_CREATION_GAS: u64 = 587_000;

/// Opcodes that make runtime bytecode context-dependent; code carrying
/// them is served but never cached.
fn contains_context_dependent_opcodes(code: &[u8]) -> bool {
	let mut position = 0;
	while position < code.len() {
		match code[position] {
			0xf2 | 0xf4 | 0xff => return true,
			opcode @ 0x60..=0x7f => position += (opcode - 0x5f) as usize,
			_ => {}
		}
		position += 1;
	}
	false
}

fn call_fingerprint(data: &[u8]) -> String {
	hex::encode(&keccak256(data).as_bytes()[..20])
}

impl Eth {
	/// Block argument for the mirror node's `/contracts/call` body.
	async fn call_block_argument(
		&self,
		number: Option<BlockNumber>,
		ctx: &RequestContext,
	) -> RpcResult<Option<String>> {
		let number = number.unwrap_or_default();
		if number.is_latest() {
			return Ok(Some("latest".to_owned()));
		}
		match self.resolve_block_tag(&number, true, ctx).await? {
			Some(resolved) => Ok(Some(format!("0x{:x}", resolved))),
			None => Err(predefined::unknown_block()),
		}
	}

	fn route_to_consensus(&self, data: &[u8], to: Option<H160>) -> bool {
		if to.is_none() {
			return false;
		}
		if self.config.eth_call_default_to_consensus {
			return true;
		}
		data.len() >= 4
			&& self
				.config
				.eth_call_consensus_selectors
				.iter()
				.any(|selector| selector == &data[..4])
	}

	pub(crate) async fn call_impl(
		&self,
		mut request: CallRequest,
		number: Option<BlockNumber>,
		ctx: &RequestContext,
	) -> RpcResult<Bytes> {
		let data = request.take_data().map(|data| data.into_vec()).unwrap_or_default();
		let block = self.call_block_argument(number, ctx).await?;

		let gas = request
			.gas
			.map(|gas| gas.low_u64().min(self.config.max_gas_per_sec))
			.unwrap_or(self.config.max_gas_per_sec);

		// Value-bearing calls need a payer; fall back to the operator.
		let value = request.value.unwrap_or_default();
		let from = match request.from {
			Some(from) => Some(from),
			None if !value.is_zero() => self.config.operator_evm_address,
			None => None,
		};

		if self.route_to_consensus(&data, request.to) {
			return self.consensus_call(request.to.expect("checked by route; qed"), &data, gas, from, ctx).await;
		}

		let body = ContractCallRequest {
			block,
			data: Some(format!("0x{}", hex::encode(&data))),
			estimate: false,
			from: from.map(|from| format!("0x{:x}", from)),
			gas: Some(gas),
			gas_price: None,
			to: request.to.map(|to| format!("0x{:x}", to)),
			value: Some(value.low_u64()),
		};
		match self.mirror.post_contract_call(&body).await {
			Ok(response) => Ok(Bytes(
				bytes_from_hex(&response.result).unwrap_or_default(),
			)),
			Err(err) if err.is_contract_revert() => {
				Err(predefined::contract_revert(err.detail(), err.data()))
			}
			Err(err) if err.is_fail_invalid() || err.is_invalid_transaction() => {
				log::debug!(target: "rpc", "{} mirror call failed with {}; returning empty", ctx, err.message());
				Ok(Bytes(Vec::new()))
			}
			Err(err) => Err(mirror_err(err)),
		}
	}

	/// Consensus-node execution with request-fingerprint caching.
	async fn consensus_call(
		&self,
		to: H160,
		data: &[u8],
		gas: u64,
		from: Option<H160>,
		ctx: &RequestContext,
	) -> RpcResult<Bytes> {
		let key = cache_key(
			"eth_call",
			&[
				&from.map(|from| format!("{:x}", from)).unwrap_or_default(),
				&format!("{:x}", to),
				&call_fingerprint(data),
			],
		);
		if let Ok(Some(cached)) = self.cache.get(&key, "ethCall").await {
			if let Some(hexed) = cached.as_str() {
				if let Some(metrics) = &self.metrics {
					metrics.cache_hits.with_label_values(&["eth_call"]).inc();
				}
				return Ok(Bytes(bytes_from_hex(hexed).unwrap_or_default()));
			}
		}
		if let Some(metrics) = &self.metrics {
			metrics.cache_misses.with_label_values(&["eth_call"]).inc();
		}

		match self
			.consensus
			.contract_call(to.as_bytes().to_vec(), data.to_vec(), gas as i64)
			.await
		{
			Ok(result) => {
				let _ = self
					.cache
					.set(
						&key,
						&json!(format!("0x{}", hex::encode(&result))),
						"ethCall",
						Some(self.config.eth_call_cache_ttl_ms),
					)
					.await;
				Ok(Bytes(result))
			}
			Err(err) => {
				if err.response_code() == Some(ResponseCode::ContractRevertExecuted) {
					return Err(predefined::contract_revert(None, None));
				}
				log::warn!(target: "rpc", "{} consensus call failed: {}", ctx, err);
				match err {
					SdkClientError::Timeout => Err(predefined::request_timeout()),
					other => Err(crate::internal_err(other)),
				}
			}
		}
	}

	pub(crate) async fn estimate_gas_impl(
		&self,
		mut request: CallRequest,
		number: Option<BlockNumber>,
		ctx: &RequestContext,
	) -> RpcResult<U256> {
		let data = request.take_data().map(|data| data.into_vec()).unwrap_or_default();
		let block = self.call_block_argument(number, ctx).await?;
		let value = request.value.unwrap_or_default();

		let body = ContractCallRequest {
			block,
			data: Some(format!("0x{}", hex::encode(&data))),
			estimate: true,
			from: request.from.map(|from| format!("0x{:x}", from)),
			gas: request.gas.map(|gas| gas.low_u64().min(self.config.max_gas_per_sec)),
			gas_price: None,
			to: request.to.map(|to| format!("0x{:x}", to)),
			value: Some(value.low_u64()),
		};
		match self.mirror.post_contract_call(&body).await {
			Ok(response) => u256_from_hex(&response.result)
				.ok_or_else(|| crate::internal_err("malformed estimate from mirror node")),
			Err(err) if err.is_contract_revert() => {
				Err(predefined::contract_revert(err.detail(), err.data()))
			}
			Err(err) => {
				log::debug!(
					target: "rpc",
					"{} estimate via mirror failed ({}); falling back to static estimate",
					ctx,
					err,
				);
				self.static_estimate(&data, request.to, value, ctx).await
			}
		}
	}

	/// Per-shape fallback when the mirror node cannot produce an
	/// estimate.
	async fn static_estimate(
		&self,
		data: &[u8],
		to: Option<H160>,
		value: U256,
		_ctx: &RequestContext,
	) -> RpcResult<U256> {
		match (data.is_empty(), to) {
			// Simple transfer; hollow-account creation costs more.
			(true, Some(to)) if !value.is_zero() => {
				let recipient = self
					.mirror
					.get_account(&format!("0x{:x}", to))
					.await
					.unwrap_or(None);
				Ok(U256::from(match recipient {
					Some(_) => hp_ethereum::TX_BASE_COST,
					None => TX_HOLLOW_ACCOUNT_CREATION_GAS,
				}))
			}
			// Contract create.
			(false, None) => Ok(U256::from(intrinsic_gas(data))),
			// Contract call.
			(false, Some(_)) => Ok(U256::from(self.config.estimate_contract_call_gas)),
			_ => Ok(U256::from(self.config.estimate_default_gas)),
		}
	}

	pub(crate) async fn get_code_impl(
		&self,
		address: H160,
		number: Option<BlockNumber>,
		ctx: &RequestContext,
	) -> RpcResult<Bytes> {
		if address == hts_precompile_address() {
			return Ok(Bytes(INVALID_EVM_INSTRUCTION.to_vec()));
		}

		let block_label = match number {
			Some(BlockNumber::Num(number)) => format!("0x{:x}", number),
			_ => "latest".to_owned(),
		};
		let key = cache_key("eth_getCode", &[&format!("{:x}", address), &block_label]);
		if let Ok(Some(cached)) = self.cache.get(&key, "getCode").await {
			if let Some(hexed) = cached.as_str() {
				return Ok(Bytes(bytes_from_hex(hexed).unwrap_or_default()));
			}
		}

		// The entity must predate the requested block; without block info
		// there is nothing to serve.
		let block = self
			.get_historical_block(&number.unwrap_or_default(), true, ctx)
			.await?;
		let block = match block {
			Some(block) => block,
			None => return Ok(Bytes(Vec::new())),
		};

		let entity = self
			.mirror
			.resolve_entity(&format!("0x{:x}", address))
			.await
			.map_err(mirror_err)?;
		let entity = match entity {
			Some(entity) => entity,
			None => return Ok(Bytes(Vec::new())),
		};

		let created = entity
			.created_timestamp()
			.and_then(hc_mirror::timestamp_to_nanos);
		let upper = hc_mirror::timestamp_to_nanos(&block.timestamp.to);
		if let (Some(created), Some(upper)) = (created, upper) {
			if created > upper {
				return Ok(Bytes(Vec::new()));
			}
		}

		match entity {
			MirrorEntity::Token(_) => {
				let proxy = format!(
					"{}{:x}{}",
					REDIRECT_BYTECODE_PREFIX, address, REDIRECT_BYTECODE_POSTFIX
				);
				Ok(Bytes(bytes_from_hex(&proxy).unwrap_or_default()))
			}
			MirrorEntity::Contract(contract) => {
				let code = contract
					.runtime_bytecode
					.as_deref()
					.and_then(bytes_from_hex)
					.unwrap_or_default();
				if code.is_empty() {
					return Ok(Bytes(Vec::new()));
				}
				if !contains_context_dependent_opcodes(&code) {
					let _ = self
						.cache
						.set(
							&key,
							&json!(format!("0x{}", hex::encode(&code))),
							"getCode",
							Some(self.config.get_code_cache_ttl_ms),
						)
						.await;
				}
				Ok(Bytes(code))
			}
			MirrorEntity::Account(_) => Ok(Bytes(Vec::new())),
		}
	}

	pub(crate) async fn get_storage_at_impl(
		&self,
		address: H160,
		slot: U256,
		number: Option<BlockNumber>,
		ctx: &RequestContext,
	) -> RpcResult<H256> {
		let block = self
			.get_historical_block(&number.unwrap_or_default(), true, ctx)
			.await?
			.ok_or_else(predefined::unknown_block)?;

		let value = self
			.mirror
			.get_contract_state_slot(
				&format!("0x{:x}", address),
				&format!("0x{:x}", slot),
				Some(&block.timestamp.to),
			)
			.await
			.map_err(mirror_err)?;

		Ok(value
			.as_deref()
			.and_then(u256_from_hex)
			.map(|value| {
				let mut out = H256::zero();
				value.to_big_endian(out.as_bytes_mut());
				out
			})
			.unwrap_or_default())
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn opcode_scan_skips_push_payloads() {
		// PUSH2 0xf4ff carries banned bytes as data only.
		assert!(!contains_context_dependent_opcodes(&[0x61, 0xf4, 0xff, 0x00]));
		// A bare DELEGATECALL trips the scan.
		assert!(contains_context_dependent_opcodes(&[0x60, 0x00, 0xf4]));
		// CALLCODE and SELFDESTRUCT too.
		assert!(contains_context_dependent_opcodes(&[0xf2]));
		assert!(contains_context_dependent_opcodes(&[0xff]));
		assert!(!contains_context_dependent_opcodes(&[0x60, 0x80, 0x60, 0x40, 0x52]));
	}

	#[test]
	fn fingerprints_are_stable_and_short() {
		let a = call_fingerprint(&[0xde, 0xad, 0xbe, 0xef]);
		assert_eq!(a, call_fingerprint(&[0xde, 0xad, 0xbe, 0xef]));
		assert_eq!(a.len(), 40);
		assert_ne!(a, call_fingerprint(&[0xde, 0xad, 0xbe, 0xee]));
	}
}
