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

//! The consensus-node client. Owns the channel set, the operator
//! signature, and the retry policy: requests rotate across the
//! configured nodes on transport failures and `BUSY` prechecks, each
//! attempt bounded by the per-node gRPC deadline and the whole call by
//! the request timeout.

use std::time::{Duration as StdDuration, SystemTime, UNIX_EPOCH};

use async_trait::async_trait;
use http::uri::PathAndQuery;
use prost::Message;
use tonic::{
	client::Grpc,
	codec::ProstCodec,
	transport::{Channel, ClientTlsConfig},
	Request,
};

use crate::{
	error::{response_code_name, SdkClientError},
	proto::{self, transaction_body::Data, ResponseCode},
	ConsensusApi, FileInfo, SubmitResult, TransactionRecordMetrics,
};

const CALL_ETHEREUM: &str = "/proto.SmartContractService/callEthereum";
const CREATE_FILE: &str = "/proto.FileService/createFile";
const APPEND_CONTENT: &str = "/proto.FileService/appendContent";
const DELETE_FILE: &str = "/proto.FileService/deleteFile";
const GET_FILE_INFO: &str = "/proto.FileService/getFileInfo";
const GET_TX_RECORD: &str = "/proto.CryptoService/getTxRecordByTxID";
const CONTRACT_CALL_LOCAL: &str = "/proto.SmartContractService/contractCallLocalMethod";

// Valid start is backdated so minor clock skew against the network
// cannot expire the transaction before it arrives.
const VALID_START_OFFSET_SECS: i64 = 10;
const VALID_DURATION_SECS: i64 = 120;
const FILE_EXPIRY_SECS: i64 = 90 * 24 * 3600;
// Generous ceiling for file operations paid by the operator.
const FILE_OP_MAX_FEE_TINYBARS: u64 = 500_000_000;

#[derive(Clone, Debug)]
pub struct NodeConfig {
	/// Full endpoint url, e.g. `https://0.testnet.hedera.com:50212`.
	pub url: String,
	pub account_num: i64,
}

#[derive(Clone, Debug)]
pub struct SdkClientConfig {
	pub nodes: Vec<NodeConfig>,
	pub operator_shard: i64,
	pub operator_realm: i64,
	pub operator_account_num: i64,
	/// Hex-encoded 32-byte ECDSA secp256k1 secret.
	pub operator_key_hex: String,
	pub request_timeout_ms: u64,
	pub grpc_deadline_ms: u64,
	pub max_attempts: u32,
	pub file_append_chunk_size: usize,
	pub file_append_max_chunks: usize,
}

impl Default for SdkClientConfig {
	fn default() -> Self {
		Self {
			nodes: Vec::new(),
			operator_shard: 0,
			operator_realm: 0,
			operator_account_num: 0,
			operator_key_hex: String::new(),
			request_timeout_ms: 30_000,
			grpc_deadline_ms: 10_000,
			max_attempts: 10,
			file_append_chunk_size: 5_120,
			file_append_max_chunks: 20,
		}
	}
}

pub struct SdkClient {
	channels: Vec<Channel>,
	nodes: Vec<NodeConfig>,
	operator_account: proto::AccountId,
	operator_key: libsecp256k1::SecretKey,
	operator_public: libsecp256k1::PublicKey,
	config: SdkClientConfig,
}

impl SdkClient {
	pub fn new(config: SdkClientConfig) -> Result<Self, SdkClientError> {
		let raw_key = hex::decode(config.operator_key_hex.trim_start_matches("0x"))
			.map_err(|_| SdkClientError::InvalidOperatorKey)?;
		let operator_key = libsecp256k1::SecretKey::parse_slice(&raw_key)
			.map_err(|_| SdkClientError::InvalidOperatorKey)?;
		let operator_public = libsecp256k1::PublicKey::from_secret_key(&operator_key);

		let mut channels = Vec::with_capacity(config.nodes.len());
		for node in &config.nodes {
			let endpoint = Channel::from_shared(node.url.clone())
				.map_err(|err| SdkClientError::Transport(err.to_string()))?
				.timeout(StdDuration::from_millis(config.grpc_deadline_ms))
				.connect_timeout(StdDuration::from_millis(config.grpc_deadline_ms));
			let endpoint = if node.url.starts_with("https") {
				endpoint
					.tls_config(ClientTlsConfig::new().with_native_roots())
					.map_err(|err| SdkClientError::Transport(err.to_string()))?
			} else {
				endpoint
			};
			channels.push(endpoint.connect_lazy());
		}

		Ok(Self {
			channels,
			nodes: config.nodes.clone(),
			operator_account: proto::AccountId {
				shard_num: config.operator_shard,
				realm_num: config.operator_realm,
				account_num: config.operator_account_num,
			},
			operator_key,
			operator_public,
			config,
		})
	}

	fn generate_transaction_id(&self) -> proto::TransactionId {
		let now = SystemTime::now()
			.duration_since(UNIX_EPOCH)
			.unwrap_or_default();
		proto::TransactionId {
			transaction_valid_start: Some(proto::Timestamp {
				seconds: now.as_secs() as i64 - VALID_START_OFFSET_SECS,
				nanos: now.subsec_nanos() as i32,
			}),
			account_id: Some(self.operator_account),
		}
	}

	fn operator_key_proto(&self) -> proto::Key {
		proto::Key {
			ecdsa_secp256k1: self.operator_public.serialize_compressed().to_vec(),
		}
	}

	fn sign_body(&self, body: &proto::TransactionBody) -> proto::Transaction {
		let body_bytes = body.encode_to_vec();
		let digest = hp_ethereum::keccak256(&body_bytes);
		let message = libsecp256k1::Message::parse(digest.as_fixed_bytes());
		let (signature, _) = libsecp256k1::sign(&message, &self.operator_key);

		let signed = proto::SignedTransaction {
			body_bytes,
			sig_map: Some(proto::SignatureMap {
				sig_pair: vec![proto::SignaturePair {
					pub_key_prefix: self.operator_public.serialize_compressed().to_vec(),
					ecdsa_secp256k1: signature.serialize().to_vec(),
				}],
			}),
		};
		proto::Transaction {
			signed_transaction_bytes: signed.encode_to_vec(),
		}
	}

	async fn unary<M, R>(
		&self,
		node_index: usize,
		path: &'static str,
		request: M,
	) -> Result<R, SdkClientError>
	where
		M: Message + Send + Sync + 'static,
		R: Message + Default + Send + Sync + 'static,
	{
		let channel = self.channels[node_index].clone();
		let call = async move {
			let mut grpc = Grpc::new(channel);
			grpc.ready()
				.await
				.map_err(|err| SdkClientError::Transport(err.to_string()))?;
			let codec: ProstCodec<M, R> = ProstCodec::default();
			grpc.unary(Request::new(request), PathAndQuery::from_static(path), codec)
				.await
				.map(|response| response.into_inner())
				.map_err(|status| SdkClientError::Transport(status.to_string()))
		};
		tokio::time::timeout(
			StdDuration::from_millis(self.config.request_timeout_ms),
			call,
		)
		.await
		.map_err(|_| SdkClientError::Timeout)?
	}

	fn service_path(data: &Data) -> &'static str {
		match data {
			Data::EthereumTransaction(_) => CALL_ETHEREUM,
			Data::FileCreate(_) => CREATE_FILE,
			Data::FileAppend(_) => APPEND_CONTENT,
			Data::FileDelete(_) => DELETE_FILE,
		}
	}

	fn constructor_name(data: &Data) -> &'static str {
		match data {
			Data::EthereumTransaction(_) => "EthereumTransaction",
			Data::FileCreate(_) => "FileCreateTransaction",
			Data::FileAppend(_) => "FileAppendTransaction",
			Data::FileDelete(_) => "FileDeleteTransaction",
		}
	}

	/// Submit one transaction, rotating nodes on retriable failures.
	pub async fn execute_transaction(
		&self,
		data: Data,
		max_fee_tinybars: u64,
	) -> Result<(proto::TransactionId, proto::TransactionResponse), SdkClientError> {
		if self.nodes.is_empty() {
			return Err(SdkClientError::Transport("no consensus nodes configured".into()));
		}
		let constructor = Self::constructor_name(&data);
		let path = Self::service_path(&data);
		let mut last_error = SdkClientError::Timeout;

		for attempt in 0..self.config.max_attempts {
			let node_index = attempt as usize % self.nodes.len();
			let transaction_id = self.generate_transaction_id();
			let body = proto::TransactionBody {
				transaction_id: Some(transaction_id),
				node_account_id: Some(proto::AccountId {
					shard_num: 0,
					realm_num: 0,
					account_num: self.nodes[node_index].account_num,
				}),
				transaction_fee: max_fee_tinybars,
				transaction_valid_duration: Some(proto::Duration {
					seconds: VALID_DURATION_SECS,
				}),
				memo: String::new(),
				data: Some(data.clone()),
			};
			let transaction = self.sign_body(&body);

			match self
				.unary::<proto::Transaction, proto::TransactionResponse>(
					node_index, path, transaction,
				)
				.await
			{
				Ok(response) => {
					let code = response.node_transaction_precheck_code;
					log::info!(
						target: "sdk",
						"execute_transaction constructor={} transactionId={} status={} cost={}",
						constructor,
						super::transaction_id_to_mirror_format(&transaction_id),
						response_code_name(code),
						response.cost,
					);
					match ResponseCode::try_from(code) {
						Ok(ResponseCode::Ok) => return Ok((transaction_id, response)),
						Ok(ResponseCode::Busy) | Ok(ResponseCode::PlatformNotActive) => {
							last_error = SdkClientError::Precheck { code };
						}
						_ => return Err(SdkClientError::Precheck { code }),
					}
				}
				Err(err @ (SdkClientError::Transport(_) | SdkClientError::Timeout)) => {
					log::warn!(
						target: "sdk",
						"execute_transaction constructor={} node={} attempt={} failed: {}",
						constructor,
						self.nodes[node_index].url,
						attempt,
						err,
					);
					last_error = err;
				}
				Err(err) => return Err(err),
			}
		}
		Err(last_error)
	}

	async fn execute_query(
		&self,
		query: proto::query::Query,
		path: &'static str,
		name: &'static str,
	) -> Result<proto::response::Response, SdkClientError> {
		if self.nodes.is_empty() {
			return Err(SdkClientError::Transport("no consensus nodes configured".into()));
		}
		let mut last_error = SdkClientError::Timeout;
		for attempt in 0..self.config.max_attempts {
			let node_index = attempt as usize % self.nodes.len();
			let request = proto::Query {
				query: Some(query.clone()),
			};
			match self
				.unary::<proto::Query, proto::Response>(node_index, path, request)
				.await
			{
				Ok(response) => {
					let response = response
						.response
						.ok_or(SdkClientError::MissingField("response"))?;
					let code = match &response {
						proto::response::Response::ContractCallLocal(inner) => inner
							.header
							.as_ref()
							.map(|header| header.node_transaction_precheck_code)
							.unwrap_or_default(),
						proto::response::Response::FileGetInfo(inner) => inner
							.header
							.as_ref()
							.map(|header| header.node_transaction_precheck_code)
							.unwrap_or_default(),
						proto::response::Response::TransactionGetRecord(inner) => inner
							.header
							.as_ref()
							.map(|header| header.node_transaction_precheck_code)
							.unwrap_or_default(),
					};
					log::info!(
						target: "sdk",
						"execute_query query={} status={}",
						name,
						response_code_name(code),
					);
					match ResponseCode::try_from(code) {
						Ok(ResponseCode::Ok) => return Ok(response),
						Ok(ResponseCode::Busy) | Ok(ResponseCode::PlatformNotActive) => {
							last_error = SdkClientError::Precheck { code };
						}
						_ => return Err(SdkClientError::Precheck { code }),
					}
				}
				Err(err @ (SdkClientError::Transport(_) | SdkClientError::Timeout)) => {
					log::warn!(
						target: "sdk",
						"execute_query query={} attempt={} failed: {}",
						name,
						attempt,
						err,
					);
					last_error = err;
				}
				Err(err) => return Err(err),
			}
		}
		Err(last_error)
	}

	fn answer_only_header() -> Option<proto::QueryHeader> {
		Some(proto::QueryHeader {
			payment: None,
			response_type: proto::ResponseType::AnswerOnly as i32,
		})
	}
}

#[async_trait]
impl ConsensusApi for SdkClient {
	async fn submit_ethereum_transaction(
		&self,
		ethereum_data: Vec<u8>,
		call_data_file: Option<proto::FileId>,
		max_gas_allowance_tinybars: i64,
		max_fee_tinybars: u64,
	) -> SubmitResult {
		let data = Data::EthereumTransaction(proto::EthereumTransactionBody {
			ethereum_data,
			call_data: call_data_file,
			max_gas_allowance: max_gas_allowance_tinybars,
		});
		match self.execute_transaction(data, max_fee_tinybars).await {
			Ok((transaction_id, _)) => {
				// Surface post-execution failures from the record; the
				// caller lets the mirror node have the final word.
				match self.get_transaction_record(&transaction_id).await {
					Ok(record) if record.receipt_status != ResponseCode::Success as i32 => {
						SubmitResult {
							transaction_id: Some(transaction_id),
							error: Some(SdkClientError::Receipt {
								code: record.receipt_status,
							}),
						}
					}
					_ => SubmitResult {
						transaction_id: Some(transaction_id),
						error: None,
					},
				}
			}
			Err(error) => SubmitResult {
				transaction_id: None,
				error: Some(error),
			},
		}
	}

	async fn contract_call(
		&self,
		to_evm_address: Vec<u8>,
		function_parameters: Vec<u8>,
		gas: i64,
	) -> Result<Vec<u8>, SdkClientError> {
		let query = proto::query::Query::ContractCallLocal(proto::ContractCallLocalQuery {
			header: Self::answer_only_header(),
			contract_id: Some(proto::ContractId {
				shard_num: 0,
				realm_num: 0,
				evm_address: to_evm_address,
			}),
			gas,
			function_parameters,
		});
		match self
			.execute_query(query, CONTRACT_CALL_LOCAL, "ContractCallLocal")
			.await?
		{
			proto::response::Response::ContractCallLocal(inner) => {
				let result = inner
					.function_result
					.ok_or(SdkClientError::MissingField("functionResult"))?;
				Ok(result.contract_call_result)
			}
			_ => Err(SdkClientError::MissingField("contractCallLocal")),
		}
	}

	async fn create_file(&self, contents: Vec<u8>) -> Result<proto::FileId, SdkClientError> {
		let now = SystemTime::now()
			.duration_since(UNIX_EPOCH)
			.unwrap_or_default();
		let data = Data::FileCreate(proto::FileCreateTransactionBody {
			expiration_time: Some(proto::Timestamp {
				seconds: now.as_secs() as i64 + FILE_EXPIRY_SECS,
				nanos: 0,
			}),
			keys: Some(proto::KeyList {
				keys: vec![self.operator_key_proto()],
			}),
			contents,
			memo: String::new(),
		});
		let (transaction_id, _) = self.execute_transaction(data, FILE_OP_MAX_FEE_TINYBARS).await?;
		let record = self.get_transaction_record(&transaction_id).await?;
		record
			.file_id
			.ok_or(SdkClientError::MissingField("receipt.fileID"))
	}

	async fn append_file(
		&self,
		file: proto::FileId,
		contents: Vec<u8>,
	) -> Result<(), SdkClientError> {
		let chunk_size = self.config.file_append_chunk_size.max(1);
		let chunks = contents.len().div_ceil(chunk_size);
		if chunks > self.config.file_append_max_chunks {
			return Err(SdkClientError::FileTooLarge {
				chunks,
				max: self.config.file_append_max_chunks,
			});
		}
		for chunk in contents.chunks(chunk_size) {
			let data = Data::FileAppend(proto::FileAppendTransactionBody {
				file_id: Some(file),
				contents: chunk.to_vec(),
			});
			self.execute_transaction(data, FILE_OP_MAX_FEE_TINYBARS).await?;
		}
		Ok(())
	}

	async fn get_file_info(&self, file: proto::FileId) -> Result<FileInfo, SdkClientError> {
		let query = proto::query::Query::FileGetInfo(proto::FileGetInfoQuery {
			header: Self::answer_only_header(),
			file_id: Some(file),
		});
		match self.execute_query(query, GET_FILE_INFO, "FileGetInfo").await? {
			proto::response::Response::FileGetInfo(inner) => {
				let info = inner
					.file_info
					.ok_or(SdkClientError::MissingField("fileInfo"))?;
				Ok(FileInfo {
					file_id: info.file_id.unwrap_or(file),
					size: info.size,
					deleted: info.deleted,
				})
			}
			_ => Err(SdkClientError::MissingField("fileGetInfo")),
		}
	}

	async fn delete_file(&self, file: proto::FileId) -> Result<(), SdkClientError> {
		let data = Data::FileDelete(proto::FileDeleteTransactionBody {
			file_id: Some(file),
		});
		self.execute_transaction(data, FILE_OP_MAX_FEE_TINYBARS)
			.await
			.map(|_| ())
	}

	async fn get_transaction_record(
		&self,
		transaction_id: &proto::TransactionId,
	) -> Result<TransactionRecordMetrics, SdkClientError> {
		let query = proto::query::Query::TransactionGetRecord(proto::TransactionGetRecordQuery {
			header: Self::answer_only_header(),
			transaction_id: Some(*transaction_id),
		});
		match self
			.execute_query(query, GET_TX_RECORD, "TransactionGetRecord")
			.await?
		{
			proto::response::Response::TransactionGetRecord(inner) => {
				let record = inner
					.transaction_record
					.ok_or(SdkClientError::MissingField("transactionRecord"))?;
				let receipt = record
					.receipt
					.ok_or(SdkClientError::MissingField("receipt"))?;
				Ok(TransactionRecordMetrics {
					receipt_status: receipt.status,
					file_id: receipt.file_id,
					transaction_fee_tinybars: record.transaction_fee,
					gas_used: record
						.contract_call_result
						.as_ref()
						.map(|result| result.gas_used)
						.unwrap_or_default(),
					transaction_hash: record.transaction_hash,
				})
			}
			_ => Err(SdkClientError::MissingField("transactionGetRecord")),
		}
	}
}
