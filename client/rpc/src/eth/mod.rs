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

mod block;
mod block_worker;
mod common;
mod execute;
mod filter;
mod pool;
mod precheck;
mod submit;
mod transaction;

#[cfg(test)]
mod tests;

pub use block_worker::BlockWorkerHandle;
pub use filter::EthFilter;
pub use pool::PendingPool;

use std::sync::Arc;

use ethereum_types::{H160, H256, U256, U64};
use jsonrpsee::core::{async_trait, RpcResult};

use hc_mirror::MirrorApi;
use hc_rpc_core::{
	types::{
		BlockNumber, Bytes, CallRequest, Filter, Index, Log, Receipt, RequestContext, RichBlock,
		Transaction, TransactionRequest,
	},
	EthApiServer,
};
use hc_sdk::ConsensusApi;
use hc_store::{CacheClient, HbarLimitService, LockService, RateLimiter};
use hp_ethereum::TINYBAR_TO_WEIBAR_COEF;

use crate::{guard_request, mirror_err, predefined, RelayConfig, RelayMetrics};

/// System contract servicing token redirects; `eth_getCode` answers for
/// it without an upstream roundtrip.
pub(crate) fn hts_precompile_address() -> H160 {
	H160::from_low_u64_be(0x167)
}

/// The single invalid-EVM-instruction byte returned as the precompile's
/// "bytecode".
pub(crate) const INVALID_EVM_INSTRUCTION: &[u8] = &[0xfe];

// Deterministic redirect-proxy bytecode surrounding a token address.
pub(crate) const REDIRECT_BYTECODE_PREFIX: &str =
	"6080604052348015600f57600080fd5b506000610167905077618dc65e";
pub(crate) const REDIRECT_BYTECODE_POSTFIX: &str =
	"600052366000602037600080366018016008845af43d806000803e8315605d573d6000fd5b3d6000f3fe";

/// Gas reported for transactions synthesized from orphan logs.
pub(crate) const SYNTHETIC_TX_GAS: u64 = 400_000;
/// Marker gas price of synthesized transactions; one tinybar in weibars,
/// deliberately below any real network price.
pub(crate) const SYNTHETIC_TX_GAS_PRICE: u128 = TINYBAR_TO_WEIBAR_COEF;

/// The eth_* rpc surface: reads through the mirror node, writes through
/// the consensus node. The transport layer binds one clone per client
/// connection via [`Eth::for_client`] so requests carry the caller's
/// address into logging and the per-ip rate limiter.
#[derive(Clone)]
pub struct Eth {
	pub(crate) mirror: Arc<dyn MirrorApi>,
	pub(crate) consensus: Arc<dyn ConsensusApi>,
	pub(crate) cache: Arc<dyn CacheClient>,
	pub(crate) lock: Arc<dyn LockService>,
	pub(crate) hbar_limit: Arc<HbarLimitService>,
	pub(crate) rate_limiter: Arc<RateLimiter>,
	pub(crate) pool: Arc<PendingPool>,
	pub(crate) block_worker: BlockWorkerHandle,
	pub(crate) config: Arc<RelayConfig>,
	pub(crate) metrics: Option<Arc<RelayMetrics>>,
	client_ip: Option<String>,
	connection_id: Option<String>,
}

impl Eth {
	#[allow(clippy::too_many_arguments)]
	pub fn new(
		mirror: Arc<dyn MirrorApi>,
		consensus: Arc<dyn ConsensusApi>,
		cache: Arc<dyn CacheClient>,
		lock: Arc<dyn LockService>,
		hbar_limit: Arc<HbarLimitService>,
		rate_limiter: Arc<RateLimiter>,
		pool: Arc<PendingPool>,
		block_worker: BlockWorkerHandle,
		config: Arc<RelayConfig>,
		metrics: Option<Arc<RelayMetrics>>,
	) -> Self {
		Self {
			mirror,
			consensus,
			cache,
			lock,
			hbar_limit,
			rate_limiter,
			pool,
			block_worker,
			config,
			metrics,
			client_ip: None,
			connection_id: None,
		}
	}

	/// Bind a clone of the service to one client connection. Called by
	/// the transport layer with the resolved peer address; everything a
	/// bound instance does is attributed and rate-limited per that ip.
	pub fn for_client(&self, ip_address: impl Into<String>, connection_id: Option<String>) -> Self {
		let mut bound = self.clone();
		bound.client_ip = Some(ip_address.into());
		bound.connection_id = connection_id;
		bound
	}

	/// Fresh request context for the bound connection. Internal entry
	/// points that bypass the rpc surface (tests, reconciliation tasks)
	/// use this directly; rpc handlers go through [`Eth::guard`].
	pub(crate) fn ctx(&self) -> RequestContext {
		RequestContext::new(
			self.client_ip.clone().unwrap_or_else(|| "unknown".to_owned()),
			self.connection_id.clone(),
		)
	}

	/// Request gate of every handler: per-ip quota first, then the
	/// context the rest of the call threads through.
	pub(crate) async fn guard(&self, method: &'static str) -> RpcResult<RequestContext> {
		guard_request(&self.rate_limiter, self.ctx(), method).await
	}

	pub(crate) fn observe(&self, method: &'static str, failed: bool, started: std::time::Instant) {
		if let Some(metrics) = &self.metrics {
			metrics.rpc_calls.with_label_values(&[method]).inc();
			if failed {
				metrics.rpc_failures.with_label_values(&[method]).inc();
			}
			metrics
				.rpc_latency
				.with_label_values(&[method])
				.observe(started.elapsed().as_secs_f64());
		}
	}

	async fn balance_impl(&self, address: H160, ctx: &RequestContext) -> RpcResult<U256> {
		let account = self
			.mirror
			.get_account(&format!("0x{:x}", address))
			.await
			.map_err(mirror_err)?;
		Ok(account
			.map(|account| U256::from(account.balance.balance) * U256::from(TINYBAR_TO_WEIBAR_COEF))
			.unwrap_or_else(|| {
				log::trace!(target: "rpc", "{} balance for unknown account {:x} is zero", ctx, address);
				U256::zero()
			}))
	}
}

#[async_trait]
impl EthApiServer for Eth {
	async fn chain_id(&self) -> RpcResult<Option<U64>> {
		self.guard("eth_chainId").await?;
		Ok(Some(U64::from(self.config.chain_id)))
	}

	async fn syncing(&self) -> RpcResult<bool> {
		self.guard("eth_syncing").await?;
		Ok(false)
	}

	async fn is_mining(&self) -> RpcResult<bool> {
		self.guard("eth_mining").await?;
		Ok(false)
	}

	async fn hashrate(&self) -> RpcResult<U256> {
		self.guard("eth_hashrate").await?;
		Ok(U256::zero())
	}

	async fn gas_price(&self) -> RpcResult<U256> {
		let started = std::time::Instant::now();
		let ctx = self.guard("eth_gasPrice").await?;
		let result = self.gas_price_weibars(&ctx).await;
		self.observe("eth_gasPrice", result.is_err(), started);
		result
	}

	async fn max_priority_fee_per_gas(&self) -> RpcResult<U256> {
		self.guard("eth_maxPriorityFeePerGas").await?;
		Ok(U256::zero())
	}

	async fn accounts(&self) -> RpcResult<Vec<H160>> {
		self.guard("eth_accounts").await?;
		Ok(Vec::new())
	}

	async fn block_number(&self) -> RpcResult<U256> {
		let ctx = self.guard("eth_blockNumber").await?;
		self.get_latest_block_number(&ctx).await.map(U256::from)
	}

	async fn balance(&self, address: H160, _number: Option<BlockNumber>) -> RpcResult<U256> {
		let ctx = self.guard("eth_getBalance").await?;
		self.balance_impl(address, &ctx).await
	}

	async fn storage_at(
		&self,
		address: H160,
		slot: U256,
		number: Option<BlockNumber>,
	) -> RpcResult<H256> {
		let ctx = self.guard("eth_getStorageAt").await?;
		self.get_storage_at_impl(address, slot, number, &ctx).await
	}

	async fn block_by_hash(&self, hash: H256, full: bool) -> RpcResult<Option<RichBlock>> {
		let started = std::time::Instant::now();
		self.guard("eth_getBlockByHash").await?;
		let result = self.get_block_impl(format!("0x{:x}", hash), full).await;
		self.observe("eth_getBlockByHash", result.is_err(), started);
		result
	}

	async fn block_by_number(
		&self,
		number: BlockNumber,
		full: bool,
	) -> RpcResult<Option<RichBlock>> {
		let started = std::time::Instant::now();
		let ctx = self.guard("eth_getBlockByNumber").await?;
		let result = match self.resolve_block_tag(&number, true, &ctx).await? {
			Some(block_number) => self.get_block_impl(block_number.to_string(), full).await,
			None => Ok(None),
		};
		self.observe("eth_getBlockByNumber", result.is_err(), started);
		result
	}

	async fn block_receipts(&self, number: BlockNumber) -> RpcResult<Option<Vec<Receipt>>> {
		let ctx = self.guard("eth_getBlockReceipts").await?;
		match self.resolve_block_tag(&number, true, &ctx).await? {
			Some(block_number) => self.get_block_receipts_impl(block_number.to_string()).await,
			None => Ok(None),
		}
	}

	async fn transaction_count(
		&self,
		address: H160,
		number: Option<BlockNumber>,
	) -> RpcResult<U256> {
		let ctx = self.guard("eth_getTransactionCount").await?;
		self.transaction_count_impl(address, number, &ctx).await
	}

	async fn block_transaction_count_by_hash(&self, hash: H256) -> RpcResult<Option<U256>> {
		self.guard("eth_getBlockTransactionCountByHash").await?;
		self.block_transaction_count_impl(format!("0x{:x}", hash))
			.await
	}

	async fn block_transaction_count_by_number(
		&self,
		number: BlockNumber,
	) -> RpcResult<Option<U256>> {
		let ctx = self.guard("eth_getBlockTransactionCountByNumber").await?;
		match self.resolve_block_tag(&number, true, &ctx).await? {
			Some(block_number) => {
				self.block_transaction_count_impl(block_number.to_string())
					.await
			}
			None => Ok(None),
		}
	}

	async fn block_uncles_count_by_hash(&self, _: H256) -> RpcResult<U256> {
		self.guard("eth_getUncleCountByBlockHash").await?;
		Ok(U256::zero())
	}

	async fn block_uncles_count_by_number(&self, _: BlockNumber) -> RpcResult<U256> {
		self.guard("eth_getUncleCountByBlockNumber").await?;
		Ok(U256::zero())
	}

	async fn uncle_by_block_hash_and_index(
		&self,
		_: H256,
		_: Index,
	) -> RpcResult<Option<RichBlock>> {
		self.guard("eth_getUncleByBlockHashAndIndex").await?;
		Ok(None)
	}

	async fn uncle_by_block_number_and_index(
		&self,
		_: BlockNumber,
		_: Index,
	) -> RpcResult<Option<RichBlock>> {
		self.guard("eth_getUncleByBlockNumberAndIndex").await?;
		Ok(None)
	}

	async fn code_at(&self, address: H160, number: Option<BlockNumber>) -> RpcResult<Bytes> {
		let started = std::time::Instant::now();
		let ctx = self.guard("eth_getCode").await?;
		let result = self.get_code_impl(address, number, &ctx).await;
		self.observe("eth_getCode", result.is_err(), started);
		result
	}

	async fn send_transaction(&self, _: TransactionRequest) -> RpcResult<H256> {
		self.guard("eth_sendTransaction").await?;
		Err(predefined::unsupported_method())
	}

	async fn send_raw_transaction(&self, bytes: Bytes) -> RpcResult<H256> {
		let started = std::time::Instant::now();
		let ctx = self.guard("eth_sendRawTransaction").await?;
		let result = self.send_raw_transaction_impl(bytes, &ctx).await;
		self.observe("eth_sendRawTransaction", result.is_err(), started);
		result
	}

	async fn call(&self, request: CallRequest, number: Option<BlockNumber>) -> RpcResult<Bytes> {
		let started = std::time::Instant::now();
		let ctx = self.guard("eth_call").await?;
		let result = self.call_impl(request, number, &ctx).await;
		self.observe("eth_call", result.is_err(), started);
		result
	}

	async fn estimate_gas(
		&self,
		request: CallRequest,
		number: Option<BlockNumber>,
	) -> RpcResult<U256> {
		let started = std::time::Instant::now();
		let ctx = self.guard("eth_estimateGas").await?;
		let result = self.estimate_gas_impl(request, number, &ctx).await;
		self.observe("eth_estimateGas", result.is_err(), started);
		result
	}

	async fn transaction_by_hash(&self, hash: H256) -> RpcResult<Option<Transaction>> {
		let ctx = self.guard("eth_getTransactionByHash").await?;
		self.transaction_by_hash_impl(hash, &ctx).await
	}

	async fn transaction_by_block_hash_and_index(
		&self,
		hash: H256,
		index: Index,
	) -> RpcResult<Option<Transaction>> {
		self.guard("eth_getTransactionByBlockHashAndIndex").await?;
		self.transaction_by_block_and_index_impl(format!("0x{:x}", hash), index)
			.await
	}

	async fn transaction_by_block_number_and_index(
		&self,
		number: BlockNumber,
		index: Index,
	) -> RpcResult<Option<Transaction>> {
		let ctx = self.guard("eth_getTransactionByBlockNumberAndIndex").await?;
		match self.resolve_block_tag(&number, true, &ctx).await? {
			Some(block_number) => {
				self.transaction_by_block_and_index_impl(block_number.to_string(), index)
					.await
			}
			None => Ok(None),
		}
	}

	async fn transaction_receipt(&self, hash: H256) -> RpcResult<Option<Receipt>> {
		let started = std::time::Instant::now();
		let ctx = self.guard("eth_getTransactionReceipt").await?;
		let result = self.transaction_receipt_impl(hash, &ctx).await;
		self.observe("eth_getTransactionReceipt", result.is_err(), started);
		result
	}

	async fn logs(&self, filter: Filter) -> RpcResult<Vec<Log>> {
		let started = std::time::Instant::now();
		let ctx = self.guard("eth_getLogs").await?;
		let result = self.get_logs_impl(&filter, &ctx).await;
		self.observe("eth_getLogs", result.is_err(), started);
		result
	}
}
