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

//! Eth rpc interface.

use ethereum_types::{H160, H256, U256, U64};
use jsonrpsee::{core::RpcResult, proc_macros::rpc};

use crate::types::{
	BlockNumber, Bytes, CallRequest, Filter, FilterChanges, Index, Log, Receipt, RichBlock,
	Transaction, TransactionRequest,
};

/// Eth rpc interface.
#[rpc(server)]
pub trait EthApi {
	/// Returns the chain id the relay fronts.
	#[method(name = "eth_chainId")]
	async fn chain_id(&self) -> RpcResult<Option<U64>>;

	/// Returns the relay's sync status, which is always `false` on a
	/// linear-finality backend.
	#[method(name = "eth_syncing")]
	async fn syncing(&self) -> RpcResult<bool>;

	/// Returns false: the relay never mines.
	#[method(name = "eth_mining")]
	async fn is_mining(&self) -> RpcResult<bool>;

	/// Returns zero: the relay never mines.
	#[method(name = "eth_hashrate")]
	async fn hashrate(&self) -> RpcResult<U256>;

	/// Returns current gas price in weibars.
	#[method(name = "eth_gasPrice")]
	async fn gas_price(&self) -> RpcResult<U256>;

	/// Returns zero: fees on this backend carry no tip.
	#[method(name = "eth_maxPriorityFeePerGas")]
	async fn max_priority_fee_per_gas(&self) -> RpcResult<U256>;

	/// Returns the empty list: the relay holds no keys.
	#[method(name = "eth_accounts")]
	async fn accounts(&self) -> RpcResult<Vec<H160>>;

	/// Returns highest block number known to the mirror node.
	#[method(name = "eth_blockNumber")]
	async fn block_number(&self) -> RpcResult<U256>;

	/// Returns balance of the given account.
	#[method(name = "eth_getBalance")]
	async fn balance(&self, address: H160, number: Option<BlockNumber>) -> RpcResult<U256>;

	/// Returns content of the storage at given address and slot.
	#[method(name = "eth_getStorageAt")]
	async fn storage_at(
		&self,
		address: H160,
		slot: U256,
		number: Option<BlockNumber>,
	) -> RpcResult<H256>;

	/// Returns block with given hash.
	#[method(name = "eth_getBlockByHash")]
	async fn block_by_hash(&self, hash: H256, full: bool) -> RpcResult<Option<RichBlock>>;

	/// Returns block with given number.
	#[method(name = "eth_getBlockByNumber")]
	async fn block_by_number(
		&self,
		number: BlockNumber,
		full: bool,
	) -> RpcResult<Option<RichBlock>>;

	/// Returns every receipt of the given block.
	#[method(name = "eth_getBlockReceipts")]
	async fn block_receipts(&self, number: BlockNumber) -> RpcResult<Option<Vec<Receipt>>>;

	/// Returns the number of transactions sent from the given address.
	#[method(name = "eth_getTransactionCount")]
	async fn transaction_count(
		&self,
		address: H160,
		number: Option<BlockNumber>,
	) -> RpcResult<U256>;

	/// Returns the number of transactions in a block with given hash.
	#[method(name = "eth_getBlockTransactionCountByHash")]
	async fn block_transaction_count_by_hash(&self, hash: H256) -> RpcResult<Option<U256>>;

	/// Returns the number of transactions in a block with given number.
	#[method(name = "eth_getBlockTransactionCountByNumber")]
	async fn block_transaction_count_by_number(
		&self,
		number: BlockNumber,
	) -> RpcResult<Option<U256>>;

	/// Returns the number of uncles in a block: always zero.
	#[method(name = "eth_getUncleCountByBlockHash")]
	async fn block_uncles_count_by_hash(&self, hash: H256) -> RpcResult<U256>;

	/// Returns the number of uncles in a block: always zero.
	#[method(name = "eth_getUncleCountByBlockNumber")]
	async fn block_uncles_count_by_number(&self, number: BlockNumber) -> RpcResult<U256>;

	/// Returns an uncle block: always null.
	#[method(name = "eth_getUncleByBlockHashAndIndex")]
	async fn uncle_by_block_hash_and_index(
		&self,
		hash: H256,
		index: Index,
	) -> RpcResult<Option<RichBlock>>;

	/// Returns an uncle block: always null.
	#[method(name = "eth_getUncleByBlockNumberAndIndex")]
	async fn uncle_by_block_number_and_index(
		&self,
		number: BlockNumber,
		index: Index,
	) -> RpcResult<Option<RichBlock>>;

	/// Returns the runtime bytecode at the given address.
	#[method(name = "eth_getCode")]
	async fn code_at(&self, address: H160, number: Option<BlockNumber>) -> RpcResult<Bytes>;

	/// Unsupported: the relay holds no keys to sign with.
	#[method(name = "eth_sendTransaction")]
	async fn send_transaction(&self, request: TransactionRequest) -> RpcResult<H256>;

	/// Decodes, validates and submits a signed transaction, returning its
	/// hash.
	#[method(name = "eth_sendRawTransaction")]
	async fn send_raw_transaction(&self, bytes: Bytes) -> RpcResult<H256>;

	/// Executes a read-only contract call.
	#[method(name = "eth_call")]
	async fn call(&self, request: CallRequest, number: Option<BlockNumber>) -> RpcResult<Bytes>;

	/// Estimates gas needed for the given call.
	#[method(name = "eth_estimateGas")]
	async fn estimate_gas(
		&self,
		request: CallRequest,
		number: Option<BlockNumber>,
	) -> RpcResult<U256>;

	/// Get transaction by its hash.
	#[method(name = "eth_getTransactionByHash")]
	async fn transaction_by_hash(&self, hash: H256) -> RpcResult<Option<Transaction>>;

	/// Returns transaction at given block hash and index.
	#[method(name = "eth_getTransactionByBlockHashAndIndex")]
	async fn transaction_by_block_hash_and_index(
		&self,
		hash: H256,
		index: Index,
	) -> RpcResult<Option<Transaction>>;

	/// Returns transaction at given block number and index.
	#[method(name = "eth_getTransactionByBlockNumberAndIndex")]
	async fn transaction_by_block_number_and_index(
		&self,
		number: BlockNumber,
		index: Index,
	) -> RpcResult<Option<Transaction>>;

	/// Returns transaction receipt by transaction hash.
	#[method(name = "eth_getTransactionReceipt")]
	async fn transaction_receipt(&self, hash: H256) -> RpcResult<Option<Receipt>>;

	/// Returns logs matching given filter object.
	#[method(name = "eth_getLogs")]
	async fn logs(&self, filter: Filter) -> RpcResult<Vec<Log>>;
}

/// Eth filters rpc api (polling).
#[rpc(server)]
pub trait EthFilterApi {
	/// Returns id of new log filter.
	#[method(name = "eth_newFilter")]
	async fn new_filter(&self, filter: Filter) -> RpcResult<U256>;

	/// Returns id of new block filter.
	#[method(name = "eth_newBlockFilter")]
	async fn new_block_filter(&self) -> RpcResult<U256>;

	/// Unsupported on this backend.
	#[method(name = "eth_newPendingTransactionFilter")]
	async fn new_pending_transaction_filter(&self) -> RpcResult<U256>;

	/// Returns filter changes since last poll.
	#[method(name = "eth_getFilterChanges")]
	async fn filter_changes(&self, index: Index) -> RpcResult<FilterChanges>;

	/// Returns all logs matching the installed filter's criteria.
	#[method(name = "eth_getFilterLogs")]
	async fn filter_logs(&self, index: Index) -> RpcResult<Vec<Log>>;

	/// Uninstalls filter.
	#[method(name = "eth_uninstallFilter")]
	async fn uninstall_filter(&self, index: Index) -> RpcResult<bool>;
}
