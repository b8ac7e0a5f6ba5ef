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

//! Ethereum RPC (web3) compatibility layer over the Hiero consensus and
//! mirror networks: reads are served from the mirror node, writes are
//! submitted to consensus and reconciled against the mirror node.

mod builder;
pub mod config;
mod eth;
mod format;
mod metrics;
mod net;
mod web3;

pub use builder::{build_from_env, BuildError, RelayServices};
pub use config::RelayConfig;
pub use eth::{BlockWorkerHandle, Eth, EthFilter, PendingPool};
pub use metrics::RelayMetrics;
pub use net::Net;
pub use web3::Web3;

use jsonrpsee::types::ErrorObjectOwned;

use hc_rpc_core::types::RequestContext;
use hc_store::RateLimiter;

/// Per-request gate shared by every rpc surface: enforce the per-ip
/// quota before any business logic runs, handing the context back to
/// the handler on success. Callers that never bound a client address
/// arrive here with the shared `unknown` bucket.
pub(crate) async fn guard_request(
	rate_limiter: &RateLimiter,
	ctx: RequestContext,
	method: &'static str,
) -> Result<RequestContext, ErrorObjectOwned> {
	if rate_limiter
		.should_rate_limit(&ctx.ip_address, method, &ctx.request_id)
		.await
	{
		return Err(predefined::ip_rate_limit_exceeded());
	}
	Ok(ctx)
}

/// Stable JSON-RPC error codes of the relay surface.
pub mod error_code {
	pub const INVALID_REQUEST: i32 = -32600;
	pub const UNSUPPORTED_METHOD: i32 = -32601;
	pub const INVALID_PARAMETER: i32 = -32602;
	pub const INTERNAL_ERROR: i32 = -32603;
	pub const SERVER_ERROR: i32 = -32000;
	pub const TRANSACTION_REJECTED: i32 = -32003;
	pub const REQUEST_TIMEOUT: i32 = -32010;
	pub const CONTRACT_REVERT: i32 = -32015;
	pub const MIRROR_NODE_UPSTREAM_FAIL: i32 = -32020;
	pub const IP_RATE_LIMIT_EXCEEDED: i32 = -32605;
	pub const HBAR_RATE_LIMIT_EXCEEDED: i32 = -32606;
}

pub fn err<T: ToString>(code: i32, message: T, data: Option<&[u8]>) -> ErrorObjectOwned {
	ErrorObjectOwned::owned(
		code,
		message.to_string(),
		data.map(|bytes| format!("0x{}", hex::encode(bytes))),
	)
}

pub fn internal_err<T: ToString>(message: T) -> ErrorObjectOwned {
	err(error_code::INTERNAL_ERROR, message, None)
}

/// The relay's predefined error vocabulary. Messages are stable: clients
/// and dashboards match on them.
pub mod predefined {
	use jsonrpsee::types::ErrorObjectOwned;

	use crate::{err, error_code};

	pub fn invalid_parameter(which: impl std::fmt::Display, reason: impl std::fmt::Display) -> ErrorObjectOwned {
		err(
			error_code::INVALID_PARAMETER,
			format!("Invalid parameter {}: {}", which, reason),
			None,
		)
	}

	pub fn unsupported_method() -> ErrorObjectOwned {
		err(error_code::UNSUPPORTED_METHOD, "Unsupported JSON-RPC method", None)
	}

	pub fn unsupported_transaction_type(transaction_type: u8) -> ErrorObjectOwned {
		err(
			error_code::SERVER_ERROR,
			format!("Transaction type {} is not supported", transaction_type),
			None,
		)
	}

	pub fn parse_error(reason: impl std::fmt::Display) -> ErrorObjectOwned {
		err(
			error_code::INVALID_REQUEST,
			format!("Unable to parse transaction: {}", reason),
			None,
		)
	}

	pub fn nonce_too_low(transaction_nonce: u64, account_nonce: u64) -> ErrorObjectOwned {
		err(
			error_code::SERVER_ERROR,
			format!(
				"Nonce too low. Provided nonce: {}, current nonce: {}",
				transaction_nonce, account_nonce
			),
			None,
		)
	}

	pub fn nonce_too_high(transaction_nonce: u64, account_nonce: u64) -> ErrorObjectOwned {
		err(
			error_code::SERVER_ERROR,
			format!(
				"Nonce too high. Provided nonce: {}, current nonce: {}",
				transaction_nonce, account_nonce
			),
			None,
		)
	}

	pub fn gas_price_too_low(provided: u128, network: u128) -> ErrorObjectOwned {
		err(
			error_code::SERVER_ERROR,
			format!(
				"Gas price {} is below the network price {}",
				provided, network
			),
			None,
		)
	}

	pub fn gas_limit_too_low(provided: u64, intrinsic: u64) -> ErrorObjectOwned {
		err(
			error_code::SERVER_ERROR,
			format!(
				"Gas limit {} is below the intrinsic gas {}",
				provided, intrinsic
			),
			None,
		)
	}

	pub fn gas_limit_too_high(provided: u64, maximum: u64) -> ErrorObjectOwned {
		err(
			error_code::SERVER_ERROR,
			format!("Gas limit {} exceeds the block gas limit {}", provided, maximum),
			None,
		)
	}

	pub fn insufficient_account_balance() -> ErrorObjectOwned {
		err(
			error_code::SERVER_ERROR,
			"Insufficient funds for transfer and gas",
			None,
		)
	}

	pub fn value_too_low() -> ErrorObjectOwned {
		err(
			error_code::SERVER_ERROR,
			"Value below 10_000_000_000 wei which is 1 tinybar",
			None,
		)
	}

	pub fn unsupported_chain_id(provided: impl std::fmt::Display, expected: impl std::fmt::Display) -> ErrorObjectOwned {
		err(
			error_code::SERVER_ERROR,
			format!("ChainId {} not supported. The correct chainId is {}", provided, expected),
			None,
		)
	}

	pub fn transaction_size_limit_exceeded(actual: usize, limit: usize) -> ErrorObjectOwned {
		err(
			error_code::SERVER_ERROR,
			format!("Oversized data: transaction size {}, transaction limit {}", actual, limit),
			None,
		)
	}

	pub fn call_data_size_limit_exceeded(actual: usize, limit: usize) -> ErrorObjectOwned {
		err(
			error_code::SERVER_ERROR,
			format!("Oversized data: call data size {}, call data limit {}", actual, limit),
			None,
		)
	}

	pub fn receiver_signature_required() -> ErrorObjectOwned {
		err(
			error_code::SERVER_ERROR,
			"Receiver account requires a signature for incoming transfers",
			None,
		)
	}

	pub fn contract_revert(detail: Option<&str>, data: Option<&str>) -> ErrorObjectOwned {
		let reason = detail
			.filter(|detail| !detail.is_empty())
			.unwrap_or("execution reverted");
		ErrorObjectOwned::owned(
			error_code::CONTRACT_REVERT,
			format!("execution reverted: {}", reason),
			data.map(|data| data.to_owned()),
		)
	}

	pub fn transaction_rejected(status: &str, message: &str) -> ErrorObjectOwned {
		err(
			error_code::TRANSACTION_REJECTED,
			format!("Transaction rejected by the consensus node: {}: {}", status, message),
			None,
		)
	}

	pub fn ip_rate_limit_exceeded() -> ErrorObjectOwned {
		err(error_code::IP_RATE_LIMIT_EXCEEDED, "IP rate limit exceeded", None)
	}

	pub fn hbar_rate_limit_exceeded() -> ErrorObjectOwned {
		err(error_code::HBAR_RATE_LIMIT_EXCEEDED, "HBAR rate limit exceeded", None)
	}

	pub fn mirror_node_upstream_fail(status: u16) -> ErrorObjectOwned {
		err(
			error_code::MIRROR_NODE_UPSTREAM_FAIL,
			format!("Mirror node upstream failure: {}", status),
			None,
		)
	}

	pub fn request_timeout() -> ErrorObjectOwned {
		err(error_code::REQUEST_TIMEOUT, "Request timed out", None)
	}

	pub fn invalid_block_range() -> ErrorObjectOwned {
		err(error_code::SERVER_ERROR, "Invalid block range", None)
	}

	pub fn timestamp_range_too_large(from: u64, to: u64, limit_days: u64) -> ErrorObjectOwned {
		err(
			error_code::SERVER_ERROR,
			format!(
				"The provided block range [{}..{}] spans more than {} days",
				from, to, limit_days
			),
			None,
		)
	}

	pub fn max_block_size_exceeded(count: usize) -> ErrorObjectOwned {
		err(
			error_code::SERVER_ERROR,
			format!("Exceeded maximum block size: {} transactions", count),
			None,
		)
	}

	pub fn unknown_block() -> ErrorObjectOwned {
		err(error_code::SERVER_ERROR, "unknown block", None)
	}

	pub fn filter_not_found() -> ErrorObjectOwned {
		err(error_code::SERVER_ERROR, "filter not found", None)
	}
}

/// Map a mirror-node client error to the rpc edge vocabulary.
pub fn mirror_err(error: hc_mirror::MirrorNodeClientError) -> ErrorObjectOwned {
	match error.status() {
		Some(status) if status >= 500 => predefined::mirror_node_upstream_fail(status),
		Some(_) => internal_err(error),
		None => predefined::request_timeout(),
	}
}
