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

//! The block assembly worker. Runs on its own thread with its own
//! runtime, upstream handle and cache handle, so reconstructing a block
//! from hundreds of contract results and logs never starves the request
//! path. Requests arrive over an mpsc channel and answer over oneshots.

use std::{collections::HashSet, sync::Arc};

use ethereum_types::{Bloom, H160, H256, U256, U64};
use futures::future::join_all;
use jsonrpsee::{core::RpcResult, types::ErrorObjectOwned};
use serde_json::json;
use tokio::sync::{mpsc, oneshot};

use hc_mirror::{ContractResult, LogQuery, MirrorApi, MirrorBlock, MirrorEntity, MirrorLog};
use hc_rpc_core::types::{BlockTransactions, Bytes, Receipt, RichBlock, Transaction};
use hc_store::{cache_key, CacheClient};
use hp_ethereum::{
	log_bloom, receipts_root, RootOrStatus, TrieLog, TrieReceipt, DEFAULT_ROOT_HASH,
	EMPTY_ARRAY_HASH, TINYBAR_TO_WEIBAR_COEF,
};

use crate::{
	format::{
		bloom_from_hex, bytes_from_hex, h160_from_hex, h256_from_hex, h256_from_long_hex,
		timestamp_seconds, u256_from_hex,
	},
	mirror_err, predefined, RelayConfig,
};

use super::{SYNTHETIC_TX_GAS, SYNTHETIC_TX_GAS_PRICE};

enum WorkerRequest {
	GetBlock {
		hash_or_number: String,
		show_details: bool,
		response: oneshot::Sender<RpcResult<Option<RichBlock>>>,
	},
	GetBlockReceipts {
		hash_or_number: String,
		response: oneshot::Sender<RpcResult<Option<Vec<Receipt>>>>,
	},
}

/// Handle to the block assembly worker; cheap to clone.
#[derive(Clone)]
pub struct BlockWorkerHandle {
	sender: mpsc::Sender<WorkerRequest>,
}

impl BlockWorkerHandle {
	/// Spawn the worker on a dedicated thread with its own single-thread
	/// runtime and upstream clients.
	pub fn spawn(
		mirror: Arc<dyn MirrorApi>,
		cache: Arc<dyn CacheClient>,
		config: Arc<RelayConfig>,
	) -> Self {
		let (sender, mut receiver) = mpsc::channel::<WorkerRequest>(64);
		std::thread::Builder::new()
			.name("block-worker".into())
			.spawn(move || {
				let runtime = tokio::runtime::Builder::new_current_thread()
					.enable_all()
					.build()
					.expect("building the worker runtime only fails on exhausted resources; qed");
				runtime.block_on(async move {
					let worker = BlockWorker {
						mirror,
						cache,
						config,
					};
					while let Some(request) = receiver.recv().await {
						match request {
							WorkerRequest::GetBlock {
								hash_or_number,
								show_details,
								response,
							} => {
								let _ = response
									.send(worker.get_block(&hash_or_number, show_details).await);
							}
							WorkerRequest::GetBlockReceipts {
								hash_or_number,
								response,
							} => {
								let _ = response
									.send(worker.get_block_receipts(&hash_or_number).await);
							}
						}
					}
				});
			})
			.expect("spawning the block worker thread only fails on exhausted resources; qed");
		Self { sender }
	}

	pub async fn get_block(
		&self,
		hash_or_number: String,
		show_details: bool,
	) -> RpcResult<Option<RichBlock>> {
		let (response, receiver) = oneshot::channel();
		self.sender
			.send(WorkerRequest::GetBlock {
				hash_or_number,
				show_details,
				response,
			})
			.await
			.map_err(|_| worker_gone())?;
		receiver.await.map_err(|_| worker_gone())?
	}

	pub async fn get_block_receipts(
		&self,
		hash_or_number: String,
	) -> RpcResult<Option<Vec<Receipt>>> {
		let (response, receiver) = oneshot::channel();
		self.sender
			.send(WorkerRequest::GetBlockReceipts {
				hash_or_number,
				response,
			})
			.await
			.map_err(|_| worker_gone())?;
		receiver.await.map_err(|_| worker_gone())?
	}
}

fn worker_gone() -> ErrorObjectOwned {
	crate::internal_err("block worker is not running")
}

struct BlockWorker {
	mirror: Arc<dyn MirrorApi>,
	cache: Arc<dyn CacheClient>,
	config: Arc<RelayConfig>,
}

impl BlockWorker {
	async fn network_gas_price_weibars(&self) -> U256 {
		let key = cache_key("eth_gasPrice", &[]);
		let tinybars = match self.cache.get(&key, "blockWorker").await {
			Ok(Some(cached)) if cached.as_u64().is_some() => cached.as_u64().unwrap_or_default(),
			_ => match self.mirror.get_network_fees().await {
				Ok(Some(fees)) => {
					let gas = fees.ethereum_transaction_gas().unwrap_or_default();
					let _ = self
						.cache
						.set(
							&key,
							&json!(gas),
							"blockWorker",
							Some(self.config.gas_price_cache_ttl_ms),
						)
						.await;
					gas
				}
				_ => 0,
			},
		};
		U256::from(tinybars) * U256::from(TINYBAR_TO_WEIBAR_COEF)
	}

	async fn fetch_block_data(
		&self,
		hash_or_number: &str,
	) -> RpcResult<Option<(MirrorBlock, Vec<ContractResult>, Vec<MirrorLog>)>> {
		let block = match self
			.mirror
			.get_block(hash_or_number)
			.await
			.map_err(mirror_err)?
		{
			Some(block) => block,
			None => return Ok(None),
		};

		let results = self.mirror.get_contract_results_in_range(
			&block.timestamp.from,
			&block.timestamp.to,
			None,
		);
		let log_query = LogQuery {
			address: None,
			timestamp_gte: Some(block.timestamp.from.clone()),
			timestamp_lte: Some(block.timestamp.to.clone()),
			topics: Vec::new(),
			transaction_hash: None,
		};
		let logs = self.mirror.get_logs(&log_query);
		let (results, logs) = tokio::join!(results, logs);
		Ok(Some((
			block,
			results.map_err(mirror_err)?,
			logs.map_err(mirror_err)?,
		)))
	}

	async fn get_block(
		&self,
		hash_or_number: &str,
		show_details: bool,
	) -> RpcResult<Option<RichBlock>> {
		let (block, results, logs) = match self.fetch_block_data(hash_or_number).await? {
			Some(data) => data,
			None => return Ok(None),
		};

		if show_details && results.len() >= self.config.tx_count_max_block_range {
			return Err(predefined::max_block_size_exceeded(results.len()));
		}

		// Resolve every sender and recipient concurrently before
		// assembling.
		let executed: Vec<&ContractResult> = results
			.iter()
			.filter(|result| !result.is_reverted_due_to_hedera_specific_validation())
			.collect();
		let resolved = join_all(
			executed
				.iter()
				.map(|result| resolve_contract_result_addresses(self.mirror.as_ref(), result)),
		)
		.await;

		let gas_price = self.network_gas_price_weibars().await;
		Ok(Some(assemble_block(
			&self.config,
			&block,
			&executed,
			&resolved,
			&logs,
			gas_price,
			show_details,
		)))
	}

	async fn get_block_receipts(&self, hash_or_number: &str) -> RpcResult<Option<Vec<Receipt>>> {
		let (block, results, logs) = match self.fetch_block_data(hash_or_number).await? {
			Some(data) => data,
			None => return Ok(None),
		};

		let executed: Vec<&ContractResult> = results
			.iter()
			.filter(|result| !result.is_reverted_due_to_hedera_specific_validation())
			.collect();
		let resolved = join_all(
			executed
				.iter()
				.map(|result| resolve_contract_result_addresses(self.mirror.as_ref(), result)),
		)
		.await;
		let effective_gas_price = self.network_gas_price_weibars().await;

		let block_hash = h256_from_long_hex(&block.hash).unwrap_or_default();
		let mut receipts = Vec::with_capacity(executed.len());
		let mut seen = HashSet::new();
		for (result, (from, to)) in executed.iter().zip(resolved) {
			if let Some(hash) = result.hash.as_deref().and_then(h256_from_hex) {
				seen.insert(hash);
				receipts.push(regular_receipt(
					result,
					from,
					to,
					block_hash,
					block.number,
					effective_gas_price,
				));
			}
		}

		// Orphan-log groups become synthetic receipts.
		for log in &logs {
			let hash = match log.transaction_hash.as_deref().and_then(h256_from_hex) {
				Some(hash) => hash,
				None => continue,
			};
			if !seen.insert(hash) {
				continue;
			}
			let group: Vec<&MirrorLog> = logs
				.iter()
				.filter(|candidate| {
					candidate.transaction_hash.as_deref().and_then(h256_from_hex) == Some(hash)
				})
				.collect();
			receipts.push(synthetic_receipt(&group, hash, block_hash, block.number));
		}

		Ok(Some(receipts))
	}
}

/// Resolve the `from` (account) and `to` (any entity) of a contract
/// result to their EVM addresses, in parallel.
pub(crate) async fn resolve_contract_result_addresses(
	mirror: &dyn MirrorApi,
	result: &ContractResult,
) -> (H160, Option<H160>) {
	let from = resolve_evm_address(mirror, result.from.as_deref(), true);
	let to = resolve_evm_address(mirror, result.to.as_deref(), false);
	let (from, to) = tokio::join!(from, to);
	(from.unwrap_or_default(), to)
}

/// Long-zero addresses encode an entity number; everything else is
/// already an EVM address.
async fn resolve_evm_address(
	mirror: &dyn MirrorApi,
	address: Option<&str>,
	account_only: bool,
) -> Option<H160> {
	let address = address?;
	let parsed = h160_from_hex(address)?;
	if !parsed.as_bytes()[..12].iter().all(|byte| *byte == 0) {
		return Some(parsed);
	}
	if account_only {
		if let Ok(Some(account)) = mirror.get_account(address).await {
			if let Some(evm) = account.evm_address.as_deref().and_then(h160_from_hex) {
				return Some(evm);
			}
		}
		return Some(parsed);
	}
	match mirror.resolve_entity(address).await {
		Ok(Some(MirrorEntity::Contract(contract))) => contract
			.evm_address
			.as_deref()
			.and_then(h160_from_hex)
			.or(Some(parsed)),
		Ok(Some(MirrorEntity::Account(account))) => account
			.evm_address
			.as_deref()
			.and_then(h160_from_hex)
			.or(Some(parsed)),
		_ => Some(parsed),
	}
}

/// Format a contract result as an Ethereum-shaped transaction.
pub(crate) fn contract_result_to_transaction(
	chain_id: u64,
	result: &ContractResult,
	from: H160,
	to: Option<H160>,
) -> Option<Transaction> {
	let hash = result.hash.as_deref().and_then(h256_from_hex)?;
	let transaction_type = result.transaction_type.unwrap_or(0).max(0) as u64;
	let gas_price = result
		.gas_price
		.as_deref()
		.and_then(u256_from_hex)
		.unwrap_or_default();
	let max_fee = result.max_fee_per_gas.as_deref().and_then(u256_from_hex);
	let max_priority = result
		.max_priority_fee_per_gas
		.as_deref()
		.and_then(u256_from_hex);

	Some(Transaction {
		block_hash: result.block_hash.as_deref().and_then(h256_from_long_hex),
		block_number: result.block_number.map(U256::from),
		from,
		gas: U256::from(result.gas_limit.unwrap_or_default()),
		gas_price: if gas_price.is_zero() {
			max_fee.unwrap_or_default()
		} else {
			gas_price
		},
		max_fee_per_gas: (transaction_type == 2).then(|| max_fee.unwrap_or_default()),
		max_priority_fee_per_gas: (transaction_type == 2).then(|| max_priority.unwrap_or_default()),
		hash,
		input: Bytes(
			result
				.function_parameters
				.as_deref()
				.and_then(bytes_from_hex)
				.unwrap_or_default(),
		),
		nonce: U256::from(result.nonce.unwrap_or_default()),
		to,
		transaction_index: result
			.transaction_index
			.map(|index| U256::from(index.max(0) as u64)),
		value: U256::from(result.amount.unwrap_or_default().max(0) as u64)
			* U256::from(TINYBAR_TO_WEIBAR_COEF),
		transaction_type: U64::from(transaction_type),
		chain_id: Some(U64::from(chain_id)),
		v: U256::from(result.v.unwrap_or_default().max(0) as u64),
		r: result.r.as_deref().and_then(u256_from_hex).unwrap_or_default(),
		s: result.s.as_deref().and_then(u256_from_hex).unwrap_or_default(),
	})
}

/// A pseudo-transaction materialized from a log whose backend operation
/// had no Ethereum-compatible contract result.
pub(crate) fn synthetic_transaction(
	chain_id: u64,
	log: &MirrorLog,
	hash: H256,
	block_hash: H256,
	block_number: u64,
	index: usize,
) -> Transaction {
	let address = log
		.address
		.as_deref()
		.and_then(h160_from_hex)
		.unwrap_or_default();
	Transaction {
		block_hash: Some(block_hash),
		block_number: Some(U256::from(block_number)),
		from: address,
		gas: U256::from(SYNTHETIC_TX_GAS),
		gas_price: U256::from(SYNTHETIC_TX_GAS_PRICE),
		max_fee_per_gas: Some(U256::zero()),
		max_priority_fee_per_gas: Some(U256::zero()),
		hash,
		input: Bytes(Vec::new()),
		nonce: U256::zero(),
		to: Some(address),
		transaction_index: Some(U256::from(index)),
		value: U256::zero(),
		transaction_type: U64::from(2),
		chain_id: Some(U64::from(chain_id)),
		v: U256::zero(),
		r: U256::zero(),
		s: U256::zero(),
	}
}

fn receipt_logs(logs: &[&MirrorLog], block_hash: H256, block_number: u64) -> Vec<hc_rpc_core::types::Log> {
	logs.iter()
		.map(|log| {
			let mut converted = super::common::mirror_log_to_log(log);
			converted.block_hash = Some(block_hash);
			converted.block_number = Some(U256::from(block_number));
			converted
		})
		.collect()
}

fn result_bloom(result: &ContractResult) -> Bloom {
	result
		.bloom
		.as_deref()
		.and_then(bloom_from_hex)
		.unwrap_or_else(|| {
			// Rebuild from the logs when the record carries none.
			let mut bloom = Bloom::zero();
			for log in &result.logs {
				let address = log.address.as_deref().and_then(h160_from_hex).unwrap_or_default();
				let topics: Vec<H256> = log
					.topics
					.iter()
					.filter_map(|topic| h256_from_hex(topic))
					.collect();
				bloom.accrue_bloom(&log_bloom(address, &topics));
			}
			bloom
		})
}

pub(crate) fn regular_receipt(
	result: &ContractResult,
	from: H160,
	to: Option<H160>,
	block_hash: H256,
	block_number: u64,
	effective_gas_price: U256,
) -> Receipt {
	let logs: Vec<&MirrorLog> = result.logs.iter().collect();
	let gas_price = result
		.gas_price
		.as_deref()
		.and_then(u256_from_hex)
		.filter(|price| !price.is_zero())
		.unwrap_or(effective_gas_price);
	Receipt {
		transaction_hash: result.hash.as_deref().and_then(h256_from_hex).unwrap_or_default(),
		transaction_index: result
			.transaction_index
			.map(|index| U256::from(index.max(0) as u64)),
		block_hash: Some(block_hash),
		block_number: Some(U256::from(block_number)),
		from,
		to,
		cumulative_gas_used: U256::from(result.block_gas_used.unwrap_or_default()),
		gas_used: U256::from(result.gas_used.unwrap_or_default()),
		contract_address: result
			.created_contract_ids
			.as_ref()
			.filter(|created| !created.is_empty())
			.and_then(|_| result.address.as_deref().and_then(h160_from_hex)),
		logs: receipt_logs(&logs, block_hash, block_number),
		logs_bloom: result_bloom(result),
		status: Some(U64::from(u64::from(result.is_success()))),
		effective_gas_price: Some(gas_price),
		transaction_type: U64::from(result.transaction_type.unwrap_or(0).max(0) as u64),
		root: None,
	}
}

pub(crate) fn synthetic_receipt(
	group: &[&MirrorLog],
	hash: H256,
	block_hash: H256,
	block_number: u64,
) -> Receipt {
	let mut bloom = Bloom::zero();
	for log in group {
		let address = log.address.as_deref().and_then(h160_from_hex).unwrap_or_default();
		let topics: Vec<H256> = log
			.topics
			.iter()
			.filter_map(|topic| h256_from_hex(topic))
			.collect();
		bloom.accrue_bloom(&log_bloom(address, &topics));
	}
	let address = group
		.first()
		.and_then(|log| log.address.as_deref())
		.and_then(h160_from_hex)
		.unwrap_or_default();
	Receipt {
		transaction_hash: hash,
		transaction_index: group
			.first()
			.and_then(|log| log.transaction_index)
			.map(|index| U256::from(index.max(0) as u64)),
		block_hash: Some(block_hash),
		block_number: Some(U256::from(block_number)),
		from: address,
		to: Some(address),
		cumulative_gas_used: U256::zero(),
		gas_used: U256::zero(),
		contract_address: None,
		logs: receipt_logs(group, block_hash, block_number),
		logs_bloom: bloom,
		status: Some(U64::from(1u64)),
		effective_gas_price: Some(U256::zero()),
		transaction_type: U64::from(2u64),
		root: None,
	}
}

struct TrieEntry {
	transaction_index: u64,
	receipt: TrieReceipt,
}

/// Assemble the Ethereum block from the mirror record and its ordered
/// transaction and log streams.
pub(crate) fn assemble_block(
	config: &RelayConfig,
	block: &MirrorBlock,
	executed: &[&ContractResult],
	resolved: &[(H160, Option<H160>)],
	logs: &[MirrorLog],
	gas_price: U256,
	show_details: bool,
) -> RichBlock {
	let block_hash = h256_from_long_hex(&block.hash).unwrap_or_default();

	let mut hashes = Vec::new();
	let mut full = Vec::new();
	let mut seen = HashSet::new();
	let mut trie_entries = Vec::new();

	for (result, (from, to)) in executed.iter().zip(resolved) {
		let transaction = match contract_result_to_transaction(config.chain_id, result, *from, *to)
		{
			Some(transaction) => transaction,
			None => continue,
		};
		if !seen.insert(transaction.hash) {
			continue;
		}
		let index = result.transaction_index.unwrap_or_default().max(0) as u64;
		trie_entries.push(TrieEntry {
			transaction_index: index,
			receipt: TrieReceipt {
				type_byte: result.transaction_type.unwrap_or(0).max(0) as u8,
				root_or_status: RootOrStatus::Status(u8::from(result.is_success())),
				cumulative_gas_used: U256::from(result.block_gas_used.unwrap_or_default()),
				logs_bloom: result_bloom(result),
				logs: result
					.logs
					.iter()
					.map(|log| TrieLog {
						address: log.address.as_deref().and_then(h160_from_hex).unwrap_or_default(),
						topics: log
							.topics
							.iter()
							.filter_map(|topic| h256_from_hex(topic))
							.collect(),
						data: log.data.as_deref().and_then(bytes_from_hex).unwrap_or_default(),
					})
					.collect(),
			},
		});
		if show_details {
			full.push(transaction);
		} else {
			hashes.push(transaction.hash);
		}
	}

	// Orphan logs materialize as synthetic entries, deduplicated by
	// transaction hash.
	for log in logs {
		let hash = match log.transaction_hash.as_deref().and_then(h256_from_hex) {
			Some(hash) => hash,
			None => continue,
		};
		if !seen.insert(hash) {
			continue;
		}
		let index = log.transaction_index.unwrap_or_default().max(0) as u64;
		let group: Vec<&MirrorLog> = logs
			.iter()
			.filter(|candidate| {
				candidate.transaction_hash.as_deref().and_then(h256_from_hex) == Some(hash)
			})
			.collect();
		let mut bloom = Bloom::zero();
		let mut trie_logs = Vec::with_capacity(group.len());
		for log in &group {
			let address = log.address.as_deref().and_then(h160_from_hex).unwrap_or_default();
			let topics: Vec<H256> = log
				.topics
				.iter()
				.filter_map(|topic| h256_from_hex(topic))
				.collect();
			bloom.accrue_bloom(&log_bloom(address, &topics));
			trie_logs.push(TrieLog {
				address,
				topics,
				data: log.data.as_deref().and_then(bytes_from_hex).unwrap_or_default(),
			});
		}
		trie_entries.push(TrieEntry {
			transaction_index: index,
			receipt: TrieReceipt {
				type_byte: 2,
				root_or_status: RootOrStatus::Status(1),
				cumulative_gas_used: U256::zero(),
				logs_bloom: bloom,
				logs: trie_logs,
			},
		});
		if show_details {
			full.push(synthetic_transaction(
				config.chain_id,
				log,
				hash,
				block_hash,
				block.number,
				index as usize,
			));
		} else {
			hashes.push(hash);
		}
	}

	trie_entries.sort_by_key(|entry| entry.transaction_index);
	let ordered: Vec<TrieReceipt> = trie_entries.into_iter().map(|entry| entry.receipt).collect();
	let receipts_root = receipts_root(&ordered);

	let transactions = if show_details {
		BlockTransactions::Full(full)
	} else {
		BlockTransactions::Hashes(hashes)
	};

	let logs_bloom = block
		.logs_bloom
		.as_deref()
		.and_then(bloom_from_hex)
		.unwrap_or_default();

	RichBlock {
		number: U256::from(block.number),
		hash: block_hash,
		parent_hash: h256_from_long_hex(&block.previous_hash).unwrap_or_default(),
		nonce: Default::default(),
		sha3_uncles: EMPTY_ARRAY_HASH,
		logs_bloom,
		transactions_root: if transactions.is_empty() {
			DEFAULT_ROOT_HASH
		} else {
			block_hash
		},
		state_root: DEFAULT_ROOT_HASH,
		receipts_root,
		miner: H160::zero(),
		difficulty: U256::one(),
		total_difficulty: U256::zero(),
		extra_data: Bytes(Vec::new()),
		size: U256::from(block.size.unwrap_or_default()),
		gas_limit: U256::from(config.max_gas_per_sec),
		gas_used: U256::from(block.gas_used),
		base_fee_per_gas: gas_price,
		mix_hash: H256::zero(),
		timestamp: U256::from(timestamp_seconds(&block.timestamp.from)),
		transactions,
		uncles: Vec::new(),
		withdrawals: Vec::new(),
		withdrawals_root: H256::zero(),
	}
}
