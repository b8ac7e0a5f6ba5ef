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

//! Hand-written subset of the HAPI protobuf surface: exactly the
//! messages the relay submits and queries. Field tags follow the
//! upstream `.proto` definitions; oneof groups the relay only ever
//! populates with a single member are flattened to optional fields,
//! which encode identically on the wire.

#[derive(Clone, Copy, PartialEq, ::prost::Message)]
pub struct Timestamp {
	#[prost(int64, tag = "1")]
	pub seconds: i64,
	#[prost(int32, tag = "2")]
	pub nanos: i32,
}

#[derive(Clone, Copy, PartialEq, ::prost::Message)]
pub struct Duration {
	#[prost(int64, tag = "1")]
	pub seconds: i64,
}

#[derive(Clone, Copy, PartialEq, ::prost::Message)]
pub struct AccountId {
	#[prost(int64, tag = "1")]
	pub shard_num: i64,
	#[prost(int64, tag = "2")]
	pub realm_num: i64,
	#[prost(int64, tag = "3")]
	pub account_num: i64,
}

#[derive(Clone, Copy, PartialEq, ::prost::Message)]
pub struct FileId {
	#[prost(int64, tag = "1")]
	pub shard_num: i64,
	#[prost(int64, tag = "2")]
	pub realm_num: i64,
	#[prost(int64, tag = "3")]
	pub file_num: i64,
}

#[derive(Clone, Copy, PartialEq, ::prost::Message)]
pub struct TransactionId {
	#[prost(message, optional, tag = "1")]
	pub transaction_valid_start: Option<Timestamp>,
	#[prost(message, optional, tag = "2")]
	pub account_id: Option<AccountId>,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct Key {
	#[prost(bytes = "vec", tag = "7")]
	pub ecdsa_secp256k1: Vec<u8>,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct KeyList {
	#[prost(message, repeated, tag = "1")]
	pub keys: Vec<Key>,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct SignaturePair {
	#[prost(bytes = "vec", tag = "1")]
	pub pub_key_prefix: Vec<u8>,
	#[prost(bytes = "vec", tag = "6")]
	pub ecdsa_secp256k1: Vec<u8>,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct SignatureMap {
	#[prost(message, repeated, tag = "1")]
	pub sig_pair: Vec<SignaturePair>,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct Transaction {
	#[prost(bytes = "vec", tag = "5")]
	pub signed_transaction_bytes: Vec<u8>,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct SignedTransaction {
	#[prost(bytes = "vec", tag = "1")]
	pub body_bytes: Vec<u8>,
	#[prost(message, optional, tag = "2")]
	pub sig_map: Option<SignatureMap>,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct TransactionBody {
	#[prost(message, optional, tag = "1")]
	pub transaction_id: Option<TransactionId>,
	#[prost(message, optional, tag = "2")]
	pub node_account_id: Option<AccountId>,
	#[prost(uint64, tag = "3")]
	pub transaction_fee: u64,
	#[prost(message, optional, tag = "4")]
	pub transaction_valid_duration: Option<Duration>,
	#[prost(string, tag = "6")]
	pub memo: String,
	#[prost(oneof = "transaction_body::Data", tags = "16, 17, 18, 50")]
	pub data: Option<transaction_body::Data>,
}

pub mod transaction_body {
	#[derive(Clone, PartialEq, ::prost::Oneof)]
	pub enum Data {
		#[prost(message, tag = "16")]
		FileAppend(super::FileAppendTransactionBody),
		#[prost(message, tag = "17")]
		FileCreate(super::FileCreateTransactionBody),
		#[prost(message, tag = "18")]
		FileDelete(super::FileDeleteTransactionBody),
		#[prost(message, tag = "50")]
		EthereumTransaction(super::EthereumTransactionBody),
	}
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct FileCreateTransactionBody {
	#[prost(message, optional, tag = "2")]
	pub expiration_time: Option<Timestamp>,
	#[prost(message, optional, tag = "3")]
	pub keys: Option<KeyList>,
	#[prost(bytes = "vec", tag = "4")]
	pub contents: Vec<u8>,
	#[prost(string, tag = "8")]
	pub memo: String,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct FileAppendTransactionBody {
	#[prost(message, optional, tag = "2")]
	pub file_id: Option<FileId>,
	#[prost(bytes = "vec", tag = "4")]
	pub contents: Vec<u8>,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct FileDeleteTransactionBody {
	#[prost(message, optional, tag = "2")]
	pub file_id: Option<FileId>,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct EthereumTransactionBody {
	#[prost(bytes = "vec", tag = "1")]
	pub ethereum_data: Vec<u8>,
	#[prost(message, optional, tag = "2")]
	pub call_data: Option<FileId>,
	#[prost(int64, tag = "3")]
	pub max_gas_allowance: i64,
}

#[derive(Clone, Copy, PartialEq, ::prost::Message)]
pub struct TransactionResponse {
	#[prost(enumeration = "ResponseCode", tag = "1")]
	pub node_transaction_precheck_code: i32,
	#[prost(uint64, tag = "2")]
	pub cost: u64,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct QueryHeader {
	#[prost(message, optional, tag = "1")]
	pub payment: Option<Transaction>,
	#[prost(enumeration = "ResponseType", tag = "2")]
	pub response_type: i32,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct ResponseHeader {
	#[prost(enumeration = "ResponseCode", tag = "1")]
	pub node_transaction_precheck_code: i32,
	#[prost(enumeration = "ResponseType", tag = "2")]
	pub response_type: i32,
	#[prost(uint64, tag = "3")]
	pub cost: u64,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct Query {
	#[prost(oneof = "query::Query", tags = "3, 13, 15")]
	pub query: Option<query::Query>,
}

pub mod query {
	#[derive(Clone, PartialEq, ::prost::Oneof)]
	pub enum Query {
		#[prost(message, tag = "3")]
		ContractCallLocal(super::ContractCallLocalQuery),
		#[prost(message, tag = "13")]
		FileGetInfo(super::FileGetInfoQuery),
		#[prost(message, tag = "15")]
		TransactionGetRecord(super::TransactionGetRecordQuery),
	}
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct FileGetInfoQuery {
	#[prost(message, optional, tag = "1")]
	pub header: Option<QueryHeader>,
	#[prost(message, optional, tag = "2")]
	pub file_id: Option<FileId>,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct TransactionGetRecordQuery {
	#[prost(message, optional, tag = "1")]
	pub header: Option<QueryHeader>,
	#[prost(message, optional, tag = "2")]
	pub transaction_id: Option<TransactionId>,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct Response {
	#[prost(oneof = "response::Response", tags = "3, 13, 15")]
	pub response: Option<response::Response>,
}

pub mod response {
	#[derive(Clone, PartialEq, ::prost::Oneof)]
	pub enum Response {
		#[prost(message, tag = "3")]
		ContractCallLocal(super::ContractCallLocalResponse),
		#[prost(message, tag = "13")]
		FileGetInfo(super::FileGetInfoResponse),
		#[prost(message, tag = "15")]
		TransactionGetRecord(super::TransactionGetRecordResponse),
	}
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct FileGetInfoResponse {
	#[prost(message, optional, tag = "1")]
	pub header: Option<ResponseHeader>,
	#[prost(message, optional, tag = "2")]
	pub file_info: Option<FileInfoProto>,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct FileInfoProto {
	#[prost(message, optional, tag = "1")]
	pub file_id: Option<FileId>,
	#[prost(int64, tag = "2")]
	pub size: i64,
	#[prost(message, optional, tag = "3")]
	pub expiration_time: Option<Timestamp>,
	#[prost(bool, tag = "4")]
	pub deleted: bool,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct TransactionGetRecordResponse {
	#[prost(message, optional, tag = "1")]
	pub header: Option<ResponseHeader>,
	#[prost(message, optional, tag = "3")]
	pub transaction_record: Option<TransactionRecord>,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct TransactionRecord {
	#[prost(message, optional, tag = "1")]
	pub receipt: Option<TransactionReceipt>,
	#[prost(bytes = "vec", tag = "2")]
	pub transaction_hash: Vec<u8>,
	#[prost(message, optional, tag = "3")]
	pub consensus_timestamp: Option<Timestamp>,
	#[prost(message, optional, tag = "4")]
	pub transaction_id: Option<TransactionId>,
	#[prost(uint64, tag = "6")]
	pub transaction_fee: u64,
	#[prost(message, optional, tag = "7")]
	pub contract_call_result: Option<ContractFunctionResult>,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct TransactionReceipt {
	#[prost(enumeration = "ResponseCode", tag = "1")]
	pub status: i32,
	#[prost(message, optional, tag = "2")]
	pub account_id: Option<AccountId>,
	#[prost(message, optional, tag = "3")]
	pub file_id: Option<FileId>,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct ContractFunctionResult {
	#[prost(bytes = "vec", tag = "2")]
	pub contract_call_result: Vec<u8>,
	#[prost(string, tag = "3")]
	pub error_message: String,
	#[prost(uint64, tag = "5")]
	pub gas_used: u64,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct ContractId {
	#[prost(int64, tag = "1")]
	pub shard_num: i64,
	#[prost(int64, tag = "2")]
	pub realm_num: i64,
	#[prost(bytes = "vec", tag = "4")]
	pub evm_address: Vec<u8>,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct ContractCallLocalQuery {
	#[prost(message, optional, tag = "1")]
	pub header: Option<QueryHeader>,
	#[prost(message, optional, tag = "2")]
	pub contract_id: Option<ContractId>,
	#[prost(int64, tag = "3")]
	pub gas: i64,
	#[prost(bytes = "vec", tag = "4")]
	pub function_parameters: Vec<u8>,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct ContractCallLocalResponse {
	#[prost(message, optional, tag = "1")]
	pub header: Option<ResponseHeader>,
	#[prost(message, optional, tag = "2")]
	pub function_result: Option<ContractFunctionResult>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, ::prost::Enumeration)]
#[repr(i32)]
pub enum ResponseType {
	AnswerOnly = 0,
	AnswerStateProof = 1,
	CostAnswer = 2,
	CostAnswerStateProof = 3,
}

/// The precheck / receipt status subset the relay classifies. Everything
/// else is reported by raw code.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, ::prost::Enumeration)]
#[repr(i32)]
pub enum ResponseCode {
	Ok = 0,
	InvalidTransaction = 1,
	PayerAccountNotFound = 2,
	InvalidNodeAccount = 3,
	TransactionExpired = 4,
	InvalidTransactionStart = 5,
	InvalidTransactionDuration = 6,
	InvalidSignature = 7,
	MemoTooLong = 8,
	InsufficientTxFee = 9,
	InsufficientPayerBalance = 10,
	DuplicateTransaction = 11,
	Busy = 12,
	NotSupported = 13,
	InvalidFileId = 14,
	InvalidAccountId = 15,
	InvalidContractId = 16,
	InvalidTransactionId = 17,
	ReceiptNotFound = 18,
	RecordNotFound = 19,
	InvalidSolidityId = 20,
	Unknown = 21,
	Success = 22,
	FailInvalid = 23,
	FailFee = 24,
	FailBalance = 25,
	KeyRequired = 26,
	BadEncoding = 27,
	InsufficientAccountBalance = 28,
	InvalidSolidityAddress = 29,
	InsufficientGas = 30,
	ContractSizeLimitExceeded = 31,
	LocalCallModificationException = 32,
	ContractRevertExecuted = 33,
	ContractExecutionException = 34,
	PlatformNotActive = 55,
	FileDeleted = 72,
	InvalidAliasKey = 317,
	InvalidEthereumTransaction = 328,
	WrongChainId = 329,
	WrongNonce = 330,
	AccessListUnsupported = 331,
	MaxGasLimitExceeded = 366,
}

#[cfg(test)]
mod tests {
	use super::*;
	use prost::Message;

	#[test]
	fn signed_transaction_round_trips_through_the_wire_format() {
		let body = TransactionBody {
			transaction_id: Some(TransactionId {
				transaction_valid_start: Some(Timestamp {
					seconds: 1_700_000_000,
					nanos: 42,
				}),
				account_id: Some(AccountId {
					shard_num: 0,
					realm_num: 0,
					account_num: 1234,
				}),
			}),
			node_account_id: Some(AccountId {
				shard_num: 0,
				realm_num: 0,
				account_num: 3,
			}),
			transaction_fee: 100_000_000,
			transaction_valid_duration: Some(Duration { seconds: 120 }),
			memo: String::new(),
			data: Some(transaction_body::Data::EthereumTransaction(
				EthereumTransactionBody {
					ethereum_data: vec![0xf8, 0x6c],
					call_data: None,
					max_gas_allowance: 0,
				},
			)),
		};
		let encoded = body.encode_to_vec();
		let decoded = TransactionBody::decode(encoded.as_slice()).unwrap();
		assert_eq!(decoded, body);
		assert!(matches!(
			decoded.data,
			Some(transaction_body::Data::EthereumTransaction(_))
		));
	}

	#[test]
	fn response_codes_decode_from_raw_integers() {
		assert_eq!(ResponseCode::try_from(330), Ok(ResponseCode::WrongNonce));
		assert_eq!(ResponseCode::try_from(12), Ok(ResponseCode::Busy));
		assert!(ResponseCode::try_from(9999).is_err());
	}
}
