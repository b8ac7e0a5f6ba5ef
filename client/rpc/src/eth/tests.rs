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

//! End-to-end exercises of the rpc services against scripted upstream
//! mocks: no network, no consensus nodes, no shared store.

use std::{
	collections::HashMap,
	sync::{
		atomic::{AtomicUsize, Ordering},
		Arc,
	},
	time::Duration,
};

use async_trait::async_trait;
use ethereum_types::{H160, H256, U256};
use parking_lot::Mutex;

use hc_mirror::{
	ContractCallRequest, ContractCallResponse, ContractResult, LogQuery, MirrorAccount,
	MirrorApi, MirrorBlock, MirrorContract, MirrorEntity, MirrorErrorBody, MirrorLog,
	MirrorNodeClientError, MirrorToken, NetworkExchangeRate, NetworkFee, NetworkFees,
	TimestampRange,
};
use hc_rpc_core::types::{BlockNumber, BlockTransactions, Bytes, CallRequest};
use hc_sdk::{
	proto, ConsensusApi, FileId, FileInfo, SdkClientError, SubmitResult, TransactionId,
	TransactionRecordMetrics,
};
use hc_store::{
	CacheClient, HbarLimitConfig, HbarLimitService, LocalCacheClient, LocalLockService,
	LockConfig, LockService, RateLimiter, RateLimiterConfig,
};
use hp_ethereum::{
	keccak256, LegacyTransaction, TransactionAction, TypedTransaction, DEFAULT_ROOT_HASH,
};

use crate::{error_code, RelayConfig};

use super::{BlockWorkerHandle, Eth, PendingPool};

const NETWORK_GAS_TINYBARS: u64 = 71;

fn fixed_transaction_id() -> TransactionId {
	TransactionId {
		transaction_valid_start: Some(proto::Timestamp {
			seconds: 1_700_000_000,
			nanos: 0,
		}),
		account_id: Some(proto::AccountId {
			shard_num: 0,
			realm_num: 0,
			account_num: 2,
		}),
	}
}

const FIXED_TRANSACTION_ID: &str = "0.0.2-1700000000-000000000";

#[derive(Clone)]
enum CallBehavior {
	Ok(String),
	Revert { detail: String, data: String },
	Upstream(u16),
}

#[derive(Default)]
struct MirrorMock {
	latest: Mutex<Option<MirrorBlock>>,
	blocks: Mutex<HashMap<String, MirrorBlock>>,
	accounts: Mutex<HashMap<String, MirrorAccount>>,
	results_by_id: Mutex<HashMap<String, ContractResult>>,
	range_results: Mutex<Vec<ContractResult>>,
	range_logs: Mutex<Vec<MirrorLog>>,
	call_behavior: Mutex<Option<CallBehavior>>,
	call_count: AtomicUsize,
	fee_count: AtomicUsize,
}

impl MirrorMock {
	fn with_latest(self, block: MirrorBlock) -> Self {
		*self.latest.lock() = Some(block.clone());
		self.blocks.lock().insert(block.number.to_string(), block);
		self
	}

	fn with_account(self, address: H160, nonce: u64, balance_tinybars: u64) -> Self {
		self.accounts.lock().insert(
			format!("0x{:x}", address),
			MirrorAccount {
				ethereum_nonce: nonce,
				balance: hc_mirror::AccountBalance {
					balance: balance_tinybars,
					timestamp: String::new(),
				},
				evm_address: Some(format!("0x{:x}", address)),
				..MirrorAccount::default()
			},
		);
		self
	}
}

#[async_trait]
impl MirrorApi for MirrorMock {
	async fn get_latest_block(&self) -> Result<Option<MirrorBlock>, MirrorNodeClientError> {
		Ok(self.latest.lock().clone())
	}

	async fn get_block(
		&self,
		hash_or_number: &str,
	) -> Result<Option<MirrorBlock>, MirrorNodeClientError> {
		Ok(self.blocks.lock().get(hash_or_number).cloned())
	}

	async fn get_contract_results_in_range(
		&self,
		_from: &str,
		_to: &str,
		transaction_index: Option<i64>,
	) -> Result<Vec<ContractResult>, MirrorNodeClientError> {
		let results = self.range_results.lock().clone();
		Ok(match transaction_index {
			Some(index) => results
				.into_iter()
				.filter(|result| result.transaction_index == Some(index))
				.collect(),
			None => results,
		})
	}

	async fn get_contract_result(
		&self,
		hash_or_id: &str,
	) -> Result<Option<ContractResult>, MirrorNodeClientError> {
		Ok(self.results_by_id.lock().get(hash_or_id).cloned())
	}

	async fn get_logs(&self, query: &LogQuery) -> Result<Vec<MirrorLog>, MirrorNodeClientError> {
		let logs = self.range_logs.lock().clone();
		Ok(match &query.transaction_hash {
			Some(hash) => logs
				.into_iter()
				.filter(|log| log.transaction_hash.as_deref() == Some(hash))
				.collect(),
			None => logs,
		})
	}

	async fn get_account(
		&self,
		address: &str,
	) -> Result<Option<MirrorAccount>, MirrorNodeClientError> {
		Ok(self.accounts.lock().get(address).cloned())
	}

	async fn get_contract(
		&self,
		_address: &str,
	) -> Result<Option<MirrorContract>, MirrorNodeClientError> {
		Ok(None)
	}

	async fn get_token(
		&self,
		_address: &str,
	) -> Result<Option<MirrorToken>, MirrorNodeClientError> {
		Ok(None)
	}

	async fn resolve_entity(
		&self,
		address: &str,
	) -> Result<Option<MirrorEntity>, MirrorNodeClientError> {
		Ok(self
			.accounts
			.lock()
			.get(address)
			.cloned()
			.map(MirrorEntity::Account))
	}

	async fn get_network_fees(&self) -> Result<Option<NetworkFees>, MirrorNodeClientError> {
		self.fee_count.fetch_add(1, Ordering::SeqCst);
		Ok(Some(NetworkFees {
			fees: vec![NetworkFee {
				gas: NETWORK_GAS_TINYBARS,
				transaction_type: "EthereumTransaction".to_owned(),
			}],
			timestamp: None,
		}))
	}

	async fn get_network_exchange_rate(
		&self,
	) -> Result<Option<NetworkExchangeRate>, MirrorNodeClientError> {
		Ok(Some(NetworkExchangeRate {
			current_rate: hc_mirror::ExchangeRate {
				cent_equivalent: 12,
				hbar_equivalent: 1,
				expiration_time: 0,
			},
			..NetworkExchangeRate::default()
		}))
	}

	async fn get_contract_state_slot(
		&self,
		_address: &str,
		_slot: &str,
		_timestamp: Option<&str>,
	) -> Result<Option<String>, MirrorNodeClientError> {
		Ok(None)
	}

	async fn post_contract_call(
		&self,
		_request: &ContractCallRequest,
	) -> Result<ContractCallResponse, MirrorNodeClientError> {
		self.call_count.fetch_add(1, Ordering::SeqCst);
		match self.call_behavior.lock().clone() {
			Some(CallBehavior::Ok(result)) => Ok(ContractCallResponse { result }),
			Some(CallBehavior::Revert { detail, data }) => {
				Err(MirrorNodeClientError::Upstream {
					status: 400,
					message: "CONTRACT_REVERT_EXECUTED".to_owned(),
					detail: Some(detail),
					data: Some(data),
				})
			}
			Some(CallBehavior::Upstream(status)) => Err(MirrorNodeClientError::from_body(
				status,
				MirrorErrorBody::default(),
			)),
			None => Ok(ContractCallResponse::default()),
		}
	}
}

struct ConsensusMock {
	submissions: Mutex<Vec<Vec<u8>>>,
	submit_error: Mutex<Option<SdkClientError>>,
	submit_delay_ms: u64,
	contract_call_result: Vec<u8>,
	contract_call_count: AtomicUsize,
	create_count: AtomicUsize,
	append_count: AtomicUsize,
	info_count: AtomicUsize,
	delete_count: AtomicUsize,
}

impl Default for ConsensusMock {
	fn default() -> Self {
		Self {
			submissions: Mutex::new(Vec::new()),
			submit_error: Mutex::new(None),
			submit_delay_ms: 0,
			contract_call_result: vec![0x01],
			contract_call_count: AtomicUsize::new(0),
			create_count: AtomicUsize::new(0),
			append_count: AtomicUsize::new(0),
			info_count: AtomicUsize::new(0),
			delete_count: AtomicUsize::new(0),
		}
	}
}

#[async_trait]
impl ConsensusApi for ConsensusMock {
	async fn submit_ethereum_transaction(
		&self,
		ethereum_data: Vec<u8>,
		_call_data_file: Option<FileId>,
		_max_gas_allowance_tinybars: i64,
		_max_fee_tinybars: u64,
	) -> SubmitResult {
		if self.submit_delay_ms > 0 {
			tokio::time::sleep(Duration::from_millis(self.submit_delay_ms)).await;
		}
		self.submissions.lock().push(ethereum_data);
		match self.submit_error.lock().clone() {
			Some(error) => SubmitResult {
				transaction_id: None,
				error: Some(error),
			},
			None => SubmitResult {
				transaction_id: Some(fixed_transaction_id()),
				error: None,
			},
		}
	}

	async fn contract_call(
		&self,
		_to_evm_address: Vec<u8>,
		_function_parameters: Vec<u8>,
		_gas: i64,
	) -> Result<Vec<u8>, SdkClientError> {
		self.contract_call_count.fetch_add(1, Ordering::SeqCst);
		Ok(self.contract_call_result.clone())
	}

	async fn create_file(&self, _contents: Vec<u8>) -> Result<FileId, SdkClientError> {
		self.create_count.fetch_add(1, Ordering::SeqCst);
		Ok(FileId {
			shard_num: 0,
			realm_num: 0,
			file_num: 1111,
		})
	}

	async fn append_file(&self, _file: FileId, _contents: Vec<u8>) -> Result<(), SdkClientError> {
		self.append_count.fetch_add(1, Ordering::SeqCst);
		Ok(())
	}

	async fn get_file_info(&self, file: FileId) -> Result<FileInfo, SdkClientError> {
		self.info_count.fetch_add(1, Ordering::SeqCst);
		Ok(FileInfo {
			file_id: file,
			size: 64,
			deleted: false,
		})
	}

	async fn delete_file(&self, _file: FileId) -> Result<(), SdkClientError> {
		self.delete_count.fetch_add(1, Ordering::SeqCst);
		Ok(())
	}

	async fn get_transaction_record(
		&self,
		_transaction_id: &TransactionId,
	) -> Result<TransactionRecordMetrics, SdkClientError> {
		Ok(TransactionRecordMetrics {
			receipt_status: proto::ResponseCode::Success as i32,
			transaction_fee_tinybars: 100,
			..TransactionRecordMetrics::default()
		})
	}
}

fn default_block(number: u64) -> MirrorBlock {
	MirrorBlock {
		count: 0,
		hash: format!("0x{}", "ab".repeat(48)),
		number,
		previous_hash: format!("0x{}", "cd".repeat(48)),
		size: Some(512),
		gas_used: 0,
		logs_bloom: None,
		timestamp: TimestampRange {
			from: "1700000000.000000000".to_owned(),
			to: "1700000002.000000000".to_owned(),
		},
	}
}

fn test_eth(mirror: Arc<MirrorMock>, consensus: Arc<ConsensusMock>, config: RelayConfig) -> Eth {
	test_eth_with_limiter(mirror, consensus, config, RateLimiterConfig::default())
}

fn test_eth_with_limiter(
	mirror: Arc<MirrorMock>,
	consensus: Arc<ConsensusMock>,
	config: RelayConfig,
	limiter_config: RateLimiterConfig,
) -> Eth {
	let cache: Arc<dyn CacheClient> =
		Arc::new(LocalCacheClient::new(512, Duration::from_secs(60)));
	let lock = Arc::new(LocalLockService::new(LockConfig {
		ttl_ms: 10_000,
		acquisition_timeout_ms: 5_000,
		poll_interval_ms: 5,
	}));
	let hbar = Arc::new(HbarLimitService::new(cache.clone(), HbarLimitConfig::default()));
	let rate_limiter = Arc::new(RateLimiter::new(cache.clone(), limiter_config));
	let pool = Arc::new(PendingPool::new(cache.clone(), 30_000));
	let config = Arc::new(config);
	let worker = BlockWorkerHandle::spawn(mirror.clone(), cache.clone(), config.clone());
	Eth::new(
		mirror,
		consensus,
		cache,
		lock,
		hbar,
		rate_limiter,
		pool,
		worker,
		config,
		None,
	)
}

fn signed_transfer(secret: &[u8; 32], nonce: u64, gas_price: u128) -> (TypedTransaction, Vec<u8>) {
	let mut tx = LegacyTransaction {
		nonce: U256::from(nonce),
		gas_price: U256::from(gas_price),
		gas_limit: U256::from(21_000),
		action: TransactionAction::Call(H160::repeat_byte(0x42)),
		value: U256::from(10_000_000_000u64),
		input: vec![],
		v: 0x12a * 2 + 35,
		r: H256::zero(),
		s: H256::zero(),
	};
	sign_legacy(secret, &mut tx);
	let tx = TypedTransaction::Legacy(tx);
	let raw = tx.encode();
	(tx, raw)
}

fn sign_legacy(secret: &[u8; 32], tx: &mut LegacyTransaction) {
	let secret_key = libsecp256k1::SecretKey::parse(secret).unwrap();
	let typed = TypedTransaction::Legacy(tx.clone());
	let message = libsecp256k1::Message::parse(typed.signing_hash().as_fixed_bytes());
	let (signature, recovery) = libsecp256k1::sign(&message, &secret_key);
	let serialized = signature.serialize();
	tx.v = 0x12a * 2 + 35 + recovery.serialize() as u64;
	tx.r = H256::from_slice(&serialized[..32]);
	tx.s = H256::from_slice(&serialized[32..]);
}

fn sender_of(secret: &[u8; 32]) -> H160 {
	let secret_key = libsecp256k1::SecretKey::parse(secret).unwrap();
	let public = libsecp256k1::PublicKey::from_secret_key(&secret_key);
	let mut raw = [0u8; 64];
	raw.copy_from_slice(&public.serialize()[1..65]);
	hp_ethereum::public_key_to_address(&raw)
}

fn network_gas_price_weibar() -> u128 {
	NETWORK_GAS_TINYBARS as u128 * hp_ethereum::TINYBAR_TO_WEIBAR_COEF
}

#[tokio::test(flavor = "multi_thread")]
async fn successful_simple_transfer_returns_the_envelope_hash() {
	let secret = [0x11u8; 32];
	let sender = sender_of(&secret);
	let (tx, raw) = signed_transfer(&secret, 0, network_gas_price_weibar());

	let mirror = Arc::new(
		MirrorMock::default()
			.with_latest(default_block(100))
			.with_account(sender, 0, 1_000_000_000_000_000),
	);
	mirror.results_by_id.lock().insert(
		FIXED_TRANSACTION_ID.to_owned(),
		ContractResult {
			hash: Some(format!("0x{:x}", tx.hash())),
			..ContractResult::default()
		},
	);
	let consensus = Arc::new(ConsensusMock::default());
	let eth = test_eth(mirror, consensus.clone(), RelayConfig::default());

	let ctx = eth.ctx();
	let returned = eth
		.send_raw_transaction_impl(Bytes(raw.clone()), &ctx)
		.await
		.unwrap();
	assert_eq!(returned, tx.hash());
	assert_eq!(returned, keccak256(&raw));
	assert_eq!(*consensus.submissions.lock(), vec![raw]);
	// The pipeline cleaned up its pending-pool entry.
	assert_eq!(eth.pool.pending_count(sender).await, 0);
}

#[tokio::test(flavor = "multi_thread")]
async fn concurrent_sends_from_one_sender_submit_in_nonce_order() {
	let secret = [0x33u8; 32];
	let sender = sender_of(&secret);
	let (tx0, raw0) = signed_transfer(&secret, 0, network_gas_price_weibar());
	let (_tx1, raw1) = signed_transfer(&secret, 1, network_gas_price_weibar());

	let mirror = Arc::new(
		MirrorMock::default()
			.with_latest(default_block(100))
			.with_account(sender, 0, 1_000_000_000_000_000),
	);
	mirror.results_by_id.lock().insert(
		FIXED_TRANSACTION_ID.to_owned(),
		ContractResult {
			hash: Some(format!("0x{:x}", tx0.hash())),
			..ContractResult::default()
		},
	);
	let consensus = Arc::new(ConsensusMock {
		submit_delay_ms: 100,
		..ConsensusMock::default()
	});
	let eth = test_eth(mirror, consensus.clone(), RelayConfig::default());

	let first = {
		let eth = eth.clone();
		tokio::spawn(async move {
			let ctx = eth.ctx();
			eth.send_raw_transaction_impl(Bytes(raw0), &ctx).await
		})
	};
	// The second send arrives while the first still holds the lock.
	tokio::time::sleep(Duration::from_millis(30)).await;
	let second = {
		let eth = eth.clone();
		tokio::spawn(async move {
			let ctx = eth.ctx();
			eth.send_raw_transaction_impl(Bytes(raw1), &ctx).await
		})
	};

	first.await.unwrap().unwrap();
	second.await.unwrap().unwrap();

	let submissions = consensus.submissions.lock();
	assert_eq!(submissions.len(), 2);
	let nonces: Vec<u64> = submissions
		.iter()
		.map(|raw| TypedTransaction::decode(raw).unwrap().nonce().low_u64())
		.collect();
	assert_eq!(nonces, vec![0, 1]);
}

#[tokio::test(flavor = "multi_thread")]
async fn oversized_call_data_rides_the_file_service_and_is_always_deleted() {
	let secret = [0x44u8; 32];
	let sender = sender_of(&secret);
	let config = RelayConfig::default();

	let mut inner = LegacyTransaction {
		nonce: U256::zero(),
		gas_price: U256::from(network_gas_price_weibar()),
		gas_limit: U256::from(1_500_000),
		action: TransactionAction::Call(H160::repeat_byte(0x42)),
		value: U256::zero(),
		input: vec![0xab; config.file_append_chunk_size * 10],
		v: 0x12a * 2 + 35,
		r: H256::zero(),
		s: H256::zero(),
	};
	sign_legacy(&secret, &mut inner);
	let tx = TypedTransaction::Legacy(inner);
	let raw = tx.encode();

	let mirror = Arc::new(
		MirrorMock::default()
			.with_latest(default_block(100))
			.with_account(sender, 0, u64::MAX / 2),
	);
	mirror.results_by_id.lock().insert(
		FIXED_TRANSACTION_ID.to_owned(),
		ContractResult {
			hash: Some(format!("0x{:x}", tx.hash())),
			..ContractResult::default()
		},
	);
	let consensus = Arc::new(ConsensusMock::default());
	let eth = test_eth(mirror.clone(), consensus.clone(), config);

	let ctx = eth.ctx();
	eth.send_raw_transaction_impl(Bytes(raw), &ctx).await.unwrap();

	assert_eq!(consensus.create_count.load(Ordering::SeqCst), 1);
	assert_eq!(consensus.append_count.load(Ordering::SeqCst), 1);
	assert_eq!(consensus.info_count.load(Ordering::SeqCst), 1);
	// The submitted envelope no longer carries the call data inline.
	let submitted = consensus.submissions.lock()[0].clone();
	assert!(TypedTransaction::decode(&submitted).unwrap().data().is_empty());
	// FileDelete is detached; give it a beat.
	tokio::time::sleep(Duration::from_millis(50)).await;
	assert_eq!(consensus.delete_count.load(Ordering::SeqCst), 1);
}

#[tokio::test(flavor = "multi_thread")]
async fn file_is_deleted_even_when_submission_is_rejected() {
	let secret = [0x55u8; 32];
	let sender = sender_of(&secret);
	let config = RelayConfig::default();

	let mut inner = LegacyTransaction {
		nonce: U256::zero(),
		gas_price: U256::from(network_gas_price_weibar()),
		gas_limit: U256::from(1_500_000),
		action: TransactionAction::Call(H160::repeat_byte(0x42)),
		value: U256::zero(),
		input: vec![0xcd; config.file_append_chunk_size * 3],
		v: 0x12a * 2 + 35,
		r: H256::zero(),
		s: H256::zero(),
	};
	sign_legacy(&secret, &mut inner);
	let raw = TypedTransaction::Legacy(inner).encode();

	let mirror = Arc::new(
		MirrorMock::default()
			.with_latest(default_block(100))
			.with_account(sender, 0, u64::MAX / 2),
	);
	let consensus = Arc::new(ConsensusMock::default());
	*consensus.submit_error.lock() = Some(SdkClientError::Precheck { code: 9 });
	let eth = test_eth(mirror, consensus.clone(), config);

	let ctx = eth.ctx();
	let error = eth
		.send_raw_transaction_impl(Bytes(raw), &ctx)
		.await
		.unwrap_err();
	assert_eq!(error.code(), error_code::TRANSACTION_REJECTED);

	tokio::time::sleep(Duration::from_millis(50)).await;
	assert_eq!(consensus.delete_count.load(Ordering::SeqCst), 1);
}

#[tokio::test(flavor = "multi_thread")]
async fn consensus_routed_calls_hit_the_fingerprint_cache() {
	let mirror = Arc::new(MirrorMock::default().with_latest(default_block(100)));
	let consensus = Arc::new(ConsensusMock::default());
	let config = RelayConfig {
		eth_call_consensus_selectors: vec![[0xde, 0xad, 0xbe, 0xef]],
		..RelayConfig::default()
	};
	let eth = test_eth(mirror, consensus.clone(), config);

	let request = CallRequest {
		from: Some(H160::repeat_byte(0x0a)),
		to: Some(H160::repeat_byte(0x0b)),
		data: Some(Bytes(vec![0xde, 0xad, 0xbe, 0xef])),
		..CallRequest::default()
	};
	let ctx = eth.ctx();
	let first = eth
		.call_impl(request.clone(), None, &ctx)
		.await
		.unwrap();
	let second = eth.call_impl(request, None, &ctx).await.unwrap();

	assert_eq!(first, Bytes(vec![0x01]));
	assert_eq!(first, second);
	assert_eq!(consensus.contract_call_count.load(Ordering::SeqCst), 1);
}

#[tokio::test(flavor = "multi_thread")]
async fn estimates_prefer_the_mirror_node_and_fall_back_per_shape() {
	let mirror = Arc::new(MirrorMock::default().with_latest(default_block(100)));
	*mirror.call_behavior.lock() = Some(CallBehavior::Ok("0x5208".to_owned()));
	let consensus = Arc::new(ConsensusMock::default());
	let eth = test_eth(mirror.clone(), consensus, RelayConfig::default());

	let request = CallRequest {
		to: Some(H160::repeat_byte(0x0b)),
		data: Some(Bytes(vec![0x01, 0x02, 0x03, 0x04])),
		..CallRequest::default()
	};
	let ctx = eth.ctx();
	let estimate = eth
		.estimate_gas_impl(request.clone(), None, &ctx)
		.await
		.unwrap();
	assert_eq!(estimate, U256::from(21_000));

	// Upstream failure: a contract call falls back to the configured
	// average.
	*mirror.call_behavior.lock() = Some(CallBehavior::Upstream(503));
	let fallback = eth.estimate_gas_impl(request, None, &ctx).await.unwrap();
	assert_eq!(
		fallback,
		U256::from(RelayConfig::default().estimate_contract_call_gas)
	);
}

#[tokio::test(flavor = "multi_thread")]
async fn block_assembly_synthesizes_orphan_log_transactions() {
	let h1 = H256::repeat_byte(0x01);
	let h2 = H256::repeat_byte(0x02);
	let h3 = H256::repeat_byte(0x03);

	let mut block = default_block(0x210);
	block.count = 2;
	let mirror = Arc::new(MirrorMock::default().with_latest(block.clone()));

	let result = |hash: H256, index: i64| ContractResult {
		hash: Some(format!("0x{:x}", hash)),
		transaction_index: Some(index),
		from: Some(format!("0x{:x}", H160::repeat_byte(0xaa))),
		to: Some(format!("0x{:x}", H160::repeat_byte(0xbb))),
		result: Some("SUCCESS".to_owned()),
		status: Some("0x1".to_owned()),
		gas_limit: Some(100_000),
		gas_used: Some(60_000),
		block_gas_used: Some(60_000),
		block_number: Some(block.number),
		block_hash: Some(block.hash.clone()),
		..ContractResult::default()
	};
	*mirror.range_results.lock() = vec![result(h1, 0), result(h2, 1)];

	let log = |hash: H256, index: i64, log_index: u64| MirrorLog {
		address: Some(format!("0x{:x}", H160::repeat_byte(0xcc))),
		data: Some("0x".to_owned()),
		index: log_index,
		topics: vec![format!("0x{:x}", H256::repeat_byte(0x77))],
		transaction_hash: Some(format!("0x{:x}", hash)),
		transaction_index: Some(index),
		block_number: Some(block.number),
		block_hash: Some(block.hash.clone()),
		timestamp: Some("1700000001.000000000".to_owned()),
		..MirrorLog::default()
	};
	*mirror.range_logs.lock() = vec![log(h2, 1, 0), log(h3, 2, 1), log(h3, 2, 2)];

	let consensus = Arc::new(ConsensusMock::default());
	let eth = test_eth(mirror, consensus, RelayConfig::default());

	let assembled = eth
		.get_block_impl((0x210u64).to_string(), false)
		.await
		.unwrap()
		.unwrap();

	// Hash mode: executed transactions plus one synthetic entry, deduped.
	match &assembled.transactions {
		BlockTransactions::Hashes(hashes) => {
			similar_asserts::assert_eq!(hashes, &vec![h1, h2, h3]);
		}
		BlockTransactions::Full(_) => panic!("asked for hashes"),
	}
	assert_eq!(assembled.hash, H256::from_slice(&[0xab; 32]));
	assert_eq!(assembled.transactions_root, assembled.hash);
	assert_ne!(assembled.receipts_root, DEFAULT_ROOT_HASH);

	// Receipts cover the synthetic group too.
	let receipts = eth
		.get_block_receipts_impl((0x210u64).to_string())
		.await
		.unwrap()
		.unwrap();
	assert_eq!(receipts.len(), 3);
	let synthetic = receipts
		.iter()
		.find(|receipt| receipt.transaction_hash == h3)
		.unwrap();
	assert_eq!(synthetic.gas_used, U256::zero());
	assert_eq!(synthetic.logs.len(), 2);
}

#[tokio::test(flavor = "multi_thread")]
async fn empty_blocks_carry_the_default_roots() {
	let mirror = Arc::new(MirrorMock::default().with_latest(default_block(7)));
	let consensus = Arc::new(ConsensusMock::default());
	let eth = test_eth(mirror, consensus, RelayConfig::default());

	let assembled = eth
		.get_block_impl(7.to_string(), true)
		.await
		.unwrap()
		.unwrap();
	assert!(assembled.transactions.is_empty());
	assert_eq!(assembled.receipts_root, DEFAULT_ROOT_HASH);
	assert_eq!(assembled.transactions_root, DEFAULT_ROOT_HASH);
	assert_eq!(assembled.state_root, DEFAULT_ROOT_HASH);
}

#[tokio::test(flavor = "multi_thread")]
async fn mirror_reverts_normalize_to_contract_revert_errors() {
	let mirror = Arc::new(MirrorMock::default().with_latest(default_block(100)));
	*mirror.call_behavior.lock() = Some(CallBehavior::Revert {
		detail: "Some revert message".to_owned(),
		data: "0x08c379a0".to_owned(),
	});
	let consensus = Arc::new(ConsensusMock::default());
	let eth = test_eth(mirror, consensus, RelayConfig::default());

	let request = CallRequest {
		to: Some(H160::repeat_byte(0x0b)),
		data: Some(Bytes(vec![0x01, 0x02, 0x03, 0x04])),
		..CallRequest::default()
	};
	let ctx = eth.ctx();
	let error = eth.call_impl(request, None, &ctx).await.unwrap_err();

	assert_eq!(error.code(), error_code::CONTRACT_REVERT);
	assert!(error.message().contains("Some revert message"));
	let data: String =
		serde_json::from_str(error.data().expect("revert carries data").get()).unwrap();
	assert_eq!(data, "0x08c379a0");
}

#[tokio::test(flavor = "multi_thread")]
async fn mirror_5xx_maps_to_the_upstream_failure_code() {
	let mirror = Arc::new(MirrorMock::default().with_latest(default_block(100)));
	*mirror.call_behavior.lock() = Some(CallBehavior::Upstream(503));
	let consensus = Arc::new(ConsensusMock::default());
	let eth = test_eth(mirror, consensus, RelayConfig::default());

	let request = CallRequest {
		to: Some(H160::repeat_byte(0x0b)),
		data: Some(Bytes(vec![0x01])),
		..CallRequest::default()
	};
	let ctx = eth.ctx();
	let error = eth.call_impl(request, None, &ctx).await.unwrap_err();
	assert_eq!(error.code(), error_code::MIRROR_NODE_UPSTREAM_FAIL);
}

#[tokio::test(flavor = "multi_thread")]
async fn gas_price_is_served_from_cache_within_ttl() {
	let mirror = Arc::new(MirrorMock::default().with_latest(default_block(100)));
	let consensus = Arc::new(ConsensusMock::default());
	let eth = test_eth(mirror.clone(), consensus, RelayConfig::default());

	let ctx = eth.ctx();
	let first = eth.gas_price_weibars(&ctx).await.unwrap();
	let second = eth.gas_price_weibars(&ctx).await.unwrap();
	assert_eq!(first, U256::from(network_gas_price_weibar()));
	assert_eq!(first, second);
	assert_eq!(mirror.fee_count.load(Ordering::SeqCst), 1);
}

#[tokio::test(flavor = "multi_thread")]
async fn stale_nonces_fail_precheck_with_nonce_too_low() {
	let secret = [0x66u8; 32];
	let sender = sender_of(&secret);
	let (_tx, raw) = signed_transfer(&secret, 1, network_gas_price_weibar());

	let mirror = Arc::new(
		MirrorMock::default()
			.with_latest(default_block(100))
			.with_account(sender, 5, 1_000_000_000_000_000),
	);
	let consensus = Arc::new(ConsensusMock::default());
	let eth = test_eth(mirror, consensus.clone(), RelayConfig::default());

	let ctx = eth.ctx();
	let error = eth
		.send_raw_transaction_impl(Bytes(raw), &ctx)
		.await
		.unwrap_err();
	assert_eq!(error.code(), error_code::SERVER_ERROR);
	assert!(error.message().contains("Nonce too low"));
	assert!(consensus.submissions.lock().is_empty());
	// Failed prechecks must not leave the sender locked.
	assert!(eth.lock.acquire_lock(&format!("0x{:x}", sender)).await.is_some());
}

#[tokio::test(flavor = "multi_thread")]
async fn log_queries_reject_inverted_and_oversized_ranges() {
	use hc_rpc_core::types::Filter;

	let mut early = default_block(5);
	early.timestamp = TimestampRange {
		from: "1700000000.000000000".to_owned(),
		to: "1700000010.000000000".to_owned(),
	};
	let mut late = default_block(10);
	late.timestamp = TimestampRange {
		from: "1700000100.000000000".to_owned(),
		to: "1700000110.000000000".to_owned(),
	};
	// Far enough from block 5 to blow the seven-day cap.
	let mut distant = default_block(11);
	distant.timestamp = TimestampRange {
		from: "1700700000.000000000".to_owned(),
		to: "1700700010.000000000".to_owned(),
	};

	let mirror = Arc::new(MirrorMock::default().with_latest(default_block(100)));
	for block in [early, late, distant] {
		mirror.blocks.lock().insert(block.number.to_string(), block);
	}
	let consensus = Arc::new(ConsensusMock::default());
	let eth = test_eth(mirror, consensus, RelayConfig::default());
	let ctx = eth.ctx();

	let inverted = Filter {
		from_block: Some(BlockNumber::Num(10)),
		to_block: Some(BlockNumber::Num(5)),
		..Filter::default()
	};
	let error = eth.get_logs_impl(&inverted, &ctx).await.unwrap_err();
	assert!(error.message().contains("Invalid block range"));

	let too_wide = Filter {
		from_block: Some(BlockNumber::Num(5)),
		to_block: Some(BlockNumber::Num(11)),
		..Filter::default()
	};
	let error = eth.get_logs_impl(&too_wide, &ctx).await.unwrap_err();
	assert!(error.message().contains("7 days"));

	let missing_from = Filter {
		to_block: Some(BlockNumber::Num(5)),
		..Filter::default()
	};
	assert!(eth.get_logs_impl(&missing_from, &ctx).await.is_err());
}

#[tokio::test(flavor = "multi_thread")]
async fn block_filters_report_hashes_since_the_last_poll() {
	use hc_rpc_core::EthFilterApiServer;

	let mirror = Arc::new(MirrorMock::default().with_latest(default_block(100)));
	let consensus = Arc::new(ConsensusMock::default());
	let config = RelayConfig {
		// The block-number cache would otherwise pin "latest" across the
		// poll.
		eth_block_number_cache_ttl_ms: 1,
		..RelayConfig::default()
	};
	let eth = test_eth(mirror.clone(), consensus, config);
	let filter = super::EthFilter::new(eth);

	let id = filter.new_block_filter().await.unwrap();

	// Two new blocks land.
	let mut one = default_block(101);
	one.hash = format!("0x{}", "11".repeat(48));
	let mut two = default_block(102);
	two.hash = format!("0x{}", "22".repeat(48));
	for block in [one, two.clone()] {
		mirror.blocks.lock().insert(block.number.to_string(), block);
	}
	*mirror.latest.lock() = Some(two);
	tokio::time::sleep(Duration::from_millis(10)).await;

	let changes = filter
		.filter_changes(hc_rpc_core::types::Index::from(id.low_u64()))
		.await
		.unwrap();
	match changes {
		hc_rpc_core::types::FilterChanges::Hashes(hashes) => {
			assert_eq!(
				hashes,
				vec![H256::from_slice(&[0x11; 32]), H256::from_slice(&[0x22; 32])]
			);
		}
		_ => panic!("block filters yield hashes"),
	}

	// A second poll with no new blocks is empty.
	let changes = filter
		.filter_changes(hc_rpc_core::types::Index::from(id.low_u64()))
		.await
		.unwrap();
	assert!(matches!(
		changes,
		hc_rpc_core::types::FilterChanges::Hashes(hashes) if hashes.is_empty()
	));

	assert!(filter
		.uninstall_filter(hc_rpc_core::types::Index::from(id.low_u64()))
		.await
		.unwrap());
	assert!(filter
		.filter_changes(hc_rpc_core::types::Index::from(id.low_u64()))
		.await
		.is_err());
}

#[tokio::test(flavor = "multi_thread")]
async fn handlers_enforce_the_per_ip_quota() {
	use hc_rpc_core::EthApiServer;

	let mirror = Arc::new(MirrorMock::default().with_latest(default_block(100)));
	let consensus = Arc::new(ConsensusMock::default());
	let eth = test_eth_with_limiter(
		mirror,
		consensus,
		RelayConfig::default(),
		RateLimiterConfig {
			default_limit: 2,
			..RateLimiterConfig::default()
		},
	);

	let bound = eth.for_client("9.9.9.9", None);
	assert!(bound.chain_id().await.is_ok());
	assert!(bound.chain_id().await.is_ok());
	let error = bound.chain_id().await.unwrap_err();
	assert_eq!(error.code(), error_code::IP_RATE_LIMIT_EXCEEDED);

	// The window is per ip: another client is unaffected.
	let other = eth.for_client("8.8.8.8", None);
	assert!(other.chain_id().await.is_ok());
}

#[tokio::test(flavor = "multi_thread")]
async fn bound_connections_thread_their_address_into_the_context() {
	let mirror = Arc::new(MirrorMock::default().with_latest(default_block(100)));
	let consensus = Arc::new(ConsensusMock::default());
	let eth = test_eth(mirror, consensus, RelayConfig::default());

	assert_eq!(eth.ctx().ip_address, "unknown");
	let bound = eth.for_client("10.1.2.3", Some("ws-7".to_owned()));
	let ctx = bound.ctx();
	assert_eq!(ctx.ip_address, "10.1.2.3");
	assert_eq!(ctx.connection_id.as_deref(), Some("ws-7"));
}

#[tokio::test(flavor = "multi_thread")]
async fn pending_transaction_count_includes_the_pool() {
	let sender = H160::repeat_byte(0x77);
	let mirror = Arc::new(
		MirrorMock::default()
			.with_latest(default_block(100))
			.with_account(sender, 4, 0),
	);
	let consensus = Arc::new(ConsensusMock::default());
	let eth = test_eth(mirror, consensus, RelayConfig::default());

	eth.pool.add(sender, 4, H256::repeat_byte(0x01)).await;
	eth.pool.add(sender, 5, H256::repeat_byte(0x02)).await;

	let ctx = eth.ctx();
	let pending = eth
		.transaction_count_impl(sender, Some(BlockNumber::Pending), &ctx)
		.await
		.unwrap();
	assert_eq!(pending, U256::from(6));
	let latest = eth
		.transaction_count_impl(sender, Some(BlockNumber::Latest), &ctx)
		.await
		.unwrap();
	assert_eq!(latest, U256::from(4));
}
