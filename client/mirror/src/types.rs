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

//! Typed mirror-node REST models. Timestamps stay in the mirror node's
//! `seconds.nanoseconds` string form; addresses and hashes stay hex
//! strings. The rpc layer converts at its edge.

use serde::{Deserialize, Serialize};

/// Hedera-specific pre-execution failures. A contract result carrying one
/// of these never executed EVM code and is skipped during block assembly.
const HEDERA_VALIDATION_FAILURES: &[&str] = &[
	"WRONG_NONCE",
	"INVALID_ACCOUNT_ID",
	"INVALID_PAYER_SIGNATURE",
	"INSUFFICIENT_PAYER_BALANCE",
	"DUPLICATE_TRANSACTION",
	"INVALID_ETHEREUM_TRANSACTION",
];

/// Parse a mirror `seconds.nanoseconds` timestamp into nanoseconds.
pub fn timestamp_to_nanos(timestamp: &str) -> Option<u128> {
	let (seconds, nanos) = match timestamp.split_once('.') {
		Some((seconds, nanos)) => (seconds, nanos),
		None => (timestamp, "0"),
	};
	let seconds: u128 = seconds.parse().ok()?;
	let nanos: u128 = format!("{:0<9}", nanos).parse().ok()?;
	Some(seconds * 1_000_000_000 + nanos)
}

#[derive(Clone, Debug, Default, Deserialize)]
pub struct TimestampRange {
	#[serde(default)]
	pub from: String,
	#[serde(default)]
	pub to: String,
}

#[derive(Clone, Debug, Default, Deserialize)]
pub struct MirrorBlock {
	#[serde(default)]
	pub count: u64,
	#[serde(default)]
	pub hash: String,
	#[serde(default)]
	pub number: u64,
	#[serde(default)]
	pub previous_hash: String,
	#[serde(default)]
	pub size: Option<u64>,
	#[serde(default)]
	pub gas_used: u64,
	#[serde(default)]
	pub logs_bloom: Option<String>,
	#[serde(default)]
	pub timestamp: TimestampRange,
}

#[derive(Clone, Debug, Default, Deserialize)]
pub struct MirrorBlockList {
	#[serde(default)]
	pub blocks: Vec<MirrorBlock>,
}

#[derive(Clone, Debug, Default, Deserialize)]
pub struct ContractResult {
	pub address: Option<String>,
	pub amount: Option<i64>,
	pub bloom: Option<String>,
	pub call_result: Option<String>,
	pub contract_id: Option<String>,
	pub created_contract_ids: Option<Vec<String>>,
	pub error_message: Option<String>,
	pub from: Option<String>,
	pub function_parameters: Option<String>,
	pub gas_limit: Option<u64>,
	pub gas_used: Option<u64>,
	pub gas_price: Option<String>,
	pub hash: Option<String>,
	pub block_hash: Option<String>,
	pub block_number: Option<u64>,
	pub block_gas_used: Option<u64>,
	pub chain_id: Option<String>,
	pub max_fee_per_gas: Option<String>,
	pub max_priority_fee_per_gas: Option<String>,
	pub nonce: Option<u64>,
	pub r: Option<String>,
	pub s: Option<String>,
	pub v: Option<i64>,
	pub to: Option<String>,
	pub timestamp: Option<String>,
	pub transaction_index: Option<i64>,
	#[serde(rename = "type")]
	pub transaction_type: Option<i64>,
	pub status: Option<String>,
	pub result: Option<String>,
	#[serde(default)]
	pub logs: Vec<MirrorLog>,
}

impl ContractResult {
	/// The transaction failed Hedera validation before any EVM frame ran;
	/// it has no Ethereum-shaped counterpart.
	pub fn is_reverted_due_to_hedera_specific_validation(&self) -> bool {
		self.result
			.as_deref()
			.is_some_and(|result| HEDERA_VALIDATION_FAILURES.contains(&result))
	}

	pub fn is_success(&self) -> bool {
		self.status.as_deref() == Some("0x1") || self.result.as_deref() == Some("SUCCESS")
	}
}

#[derive(Clone, Debug, Default, Deserialize)]
pub struct ContractResultList {
	#[serde(default)]
	pub results: Vec<ContractResult>,
	#[serde(default)]
	pub links: Links,
}

#[derive(Clone, Debug, Default, Deserialize)]
pub struct Links {
	pub next: Option<String>,
}

#[derive(Clone, Debug, Default, Deserialize)]
pub struct MirrorLog {
	pub address: Option<String>,
	pub bloom: Option<String>,
	pub contract_id: Option<String>,
	#[serde(default)]
	pub data: Option<String>,
	#[serde(default)]
	pub index: u64,
	#[serde(default)]
	pub topics: Vec<String>,
	pub block_hash: Option<String>,
	pub block_number: Option<u64>,
	pub root_contract_id: Option<String>,
	pub timestamp: Option<String>,
	pub transaction_hash: Option<String>,
	pub transaction_index: Option<i64>,
}

#[derive(Clone, Debug, Default, Deserialize)]
pub struct MirrorLogList {
	#[serde(default)]
	pub logs: Vec<MirrorLog>,
	#[serde(default)]
	pub links: Links,
}

#[derive(Clone, Debug, Default, Deserialize)]
pub struct AccountBalance {
	#[serde(default)]
	pub balance: u64,
	#[serde(default)]
	pub timestamp: String,
}

#[derive(Clone, Debug, Default, Deserialize)]
pub struct MirrorAccount {
	pub account: Option<String>,
	pub alias: Option<String>,
	#[serde(default)]
	pub balance: AccountBalance,
	#[serde(default)]
	pub ethereum_nonce: u64,
	pub evm_address: Option<String>,
	pub created_timestamp: Option<String>,
	#[serde(default)]
	pub receiver_sig_required: Option<bool>,
}

#[derive(Clone, Debug, Default, Deserialize)]
pub struct MirrorContract {
	pub contract_id: Option<String>,
	pub evm_address: Option<String>,
	pub created_timestamp: Option<String>,
	pub runtime_bytecode: Option<String>,
}

#[derive(Clone, Debug, Default, Deserialize)]
pub struct MirrorToken {
	pub token_id: Option<String>,
	#[serde(rename = "type")]
	pub token_type: Option<String>,
	pub created_timestamp: Option<String>,
}

/// The three entity flavors an EVM address can resolve to.
#[derive(Clone, Debug)]
pub enum MirrorEntity {
	Account(MirrorAccount),
	Contract(MirrorContract),
	Token(MirrorToken),
}

impl MirrorEntity {
	pub fn created_timestamp(&self) -> Option<&str> {
		match self {
			Self::Account(account) => account.created_timestamp.as_deref(),
			Self::Contract(contract) => contract.created_timestamp.as_deref(),
			Self::Token(token) => token.created_timestamp.as_deref(),
		}
	}
}

#[derive(Clone, Debug, Default, Deserialize)]
pub struct NetworkFee {
	#[serde(default)]
	pub gas: u64,
	#[serde(default)]
	pub transaction_type: String,
}

#[derive(Clone, Debug, Default, Deserialize)]
pub struct NetworkFees {
	#[serde(default)]
	pub fees: Vec<NetworkFee>,
	pub timestamp: Option<String>,
}

impl NetworkFees {
	/// Tinybar gas fee of the `EthereumTransaction` row.
	pub fn ethereum_transaction_gas(&self) -> Option<u64> {
		self.fees
			.iter()
			.find(|fee| fee.transaction_type == "EthereumTransaction")
			.map(|fee| fee.gas)
	}
}

#[derive(Clone, Debug, Default, Deserialize)]
pub struct ExchangeRate {
	#[serde(default)]
	pub cent_equivalent: u64,
	#[serde(default)]
	pub hbar_equivalent: u64,
	#[serde(default)]
	pub expiration_time: u64,
}

#[derive(Clone, Debug, Default, Deserialize)]
pub struct NetworkExchangeRate {
	#[serde(default)]
	pub current_rate: ExchangeRate,
	#[serde(default)]
	pub next_rate: ExchangeRate,
	pub timestamp: Option<String>,
}

#[derive(Clone, Debug, Default, Deserialize)]
pub struct ContractStateSlot {
	pub address: Option<String>,
	pub slot: Option<String>,
	pub value: Option<String>,
	pub timestamp: Option<String>,
}

#[derive(Clone, Debug, Default, Deserialize)]
pub struct ContractStateList {
	#[serde(default)]
	pub state: Vec<ContractStateSlot>,
}

/// Body of `POST /contracts/call`.
#[derive(Clone, Debug, Default, Serialize)]
pub struct ContractCallRequest {
	#[serde(skip_serializing_if = "Option::is_none")]
	pub block: Option<String>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub data: Option<String>,
	pub estimate: bool,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub from: Option<String>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub gas: Option<u64>,
	#[serde(rename = "gasPrice", skip_serializing_if = "Option::is_none")]
	pub gas_price: Option<u64>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub to: Option<String>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub value: Option<u64>,
}

#[derive(Clone, Debug, Default, Deserialize)]
pub struct ContractCallResponse {
	#[serde(default)]
	pub result: String,
}

/// Composed query against `GET /contracts/results/logs`. Each topic
/// position may carry several accepted values; an empty position matches
/// anything.
#[derive(Clone, Debug, Default)]
pub struct LogQuery {
	pub address: Option<String>,
	pub timestamp_gte: Option<String>,
	pub timestamp_lte: Option<String>,
	pub topics: Vec<Vec<String>>,
	pub transaction_hash: Option<String>,
}

impl LogQuery {
	pub fn to_query_pairs(&self) -> Vec<(String, String)> {
		let mut pairs = Vec::new();
		if let Some(gte) = &self.timestamp_gte {
			pairs.push(("timestamp".to_owned(), format!("gte:{}", gte)));
		}
		if let Some(lte) = &self.timestamp_lte {
			pairs.push(("timestamp".to_owned(), format!("lte:{}", lte)));
		}
		for (position, values) in self.topics.iter().enumerate() {
			for value in values {
				pairs.push((format!("topic{}", position), value.clone()));
			}
		}
		if let Some(hash) = &self.transaction_hash {
			pairs.push(("transaction.hash".to_owned(), hash.clone()));
		}
		pairs.push(("order".to_owned(), "asc".to_owned()));
		pairs
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn timestamps_parse_to_nanoseconds() {
		assert_eq!(
			timestamp_to_nanos("1586567700.453054000"),
			Some(1_586_567_700_453_054_000)
		);
		assert_eq!(timestamp_to_nanos("10"), Some(10_000_000_000));
		assert_eq!(timestamp_to_nanos("10.5"), Some(10_500_000_000));
		assert_eq!(timestamp_to_nanos("not-a-timestamp"), None);
	}

	#[test]
	fn contract_result_classification() {
		let reverted = ContractResult {
			result: Some("WRONG_NONCE".to_owned()),
			..ContractResult::default()
		};
		assert!(reverted.is_reverted_due_to_hedera_specific_validation());

		let executed_revert = ContractResult {
			result: Some("CONTRACT_REVERT_EXECUTED".to_owned()),
			status: Some("0x0".to_owned()),
			..ContractResult::default()
		};
		assert!(!executed_revert.is_reverted_due_to_hedera_specific_validation());
		assert!(!executed_revert.is_success());
	}

	#[test]
	fn block_record_deserializes_from_mirror_shape() {
		let block: MirrorBlock = serde_json::from_str(
			r#"{
				"count": 2,
				"hapi_version": "0.47.0",
				"hash": "0xabcd",
				"number": 528,
				"previous_hash": "0x1234",
				"size": 512,
				"gas_used": 42000,
				"logs_bloom": "0x00",
				"timestamp": { "from": "1586567700.453054000", "to": "1586567702.000000000" }
			}"#,
		)
		.unwrap();
		assert_eq!(block.number, 528);
		assert_eq!(block.count, 2);
		assert_eq!(block.timestamp.from, "1586567700.453054000");
	}

	#[test]
	fn network_fees_pick_the_ethereum_row() {
		let fees: NetworkFees = serde_json::from_str(
			r#"{"fees":[
				{"gas": 852000, "transaction_type": "ContractCall"},
				{"gas": 71, "transaction_type": "EthereumTransaction"}
			]}"#,
		)
		.unwrap();
		assert_eq!(fees.ethereum_transaction_gas(), Some(71));
	}
}
