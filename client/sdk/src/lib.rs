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

//! gRPC client for the consensus network: ethereum-transaction
//! submission, file create/append/delete for oversized call data, and
//! record/file-info queries, behind the [`ConsensusApi`] capability set.

mod client;
mod error;
pub mod proto;

pub use client::{NodeConfig, SdkClient, SdkClientConfig};
pub use error::{response_code_name, SdkClientError};
pub use proto::{FileId, ResponseCode, TransactionId};

use async_trait::async_trait;

/// Outcome of an ethereum-transaction submission. A populated
/// `transaction_id` with a post-execution `error` means the transaction
/// ran and the mirror node will carry its record.
#[derive(Clone, Debug, Default)]
pub struct SubmitResult {
	pub transaction_id: Option<TransactionId>,
	pub error: Option<SdkClientError>,
}

#[derive(Clone, Copy, Debug)]
pub struct FileInfo {
	pub file_id: FileId,
	pub size: i64,
	pub deleted: bool,
}

#[derive(Clone, Debug, Default)]
pub struct TransactionRecordMetrics {
	pub receipt_status: i32,
	pub file_id: Option<FileId>,
	pub transaction_fee_tinybars: u64,
	pub gas_used: u64,
	pub transaction_hash: Vec<u8>,
}

/// Write-path capability set the relay core depends on; injected so the
/// pipeline is testable without a consensus network.
#[async_trait]
pub trait ConsensusApi: Send + Sync {
	async fn submit_ethereum_transaction(
		&self,
		ethereum_data: Vec<u8>,
		call_data_file: Option<FileId>,
		max_gas_allowance_tinybars: i64,
		max_fee_tinybars: u64,
	) -> SubmitResult;

	/// Read-only contract execution on a consensus node, for calls the
	/// mirror node cannot serve.
	async fn contract_call(
		&self,
		to_evm_address: Vec<u8>,
		function_parameters: Vec<u8>,
		gas: i64,
	) -> Result<Vec<u8>, SdkClientError>;

	async fn create_file(&self, contents: Vec<u8>) -> Result<FileId, SdkClientError>;

	async fn append_file(&self, file: FileId, contents: Vec<u8>) -> Result<(), SdkClientError>;

	async fn get_file_info(&self, file: FileId) -> Result<FileInfo, SdkClientError>;

	async fn delete_file(&self, file: FileId) -> Result<(), SdkClientError>;

	async fn get_transaction_record(
		&self,
		transaction_id: &TransactionId,
	) -> Result<TransactionRecordMetrics, SdkClientError>;
}

/// Render a transaction id the way the mirror node indexes it:
/// `shard.realm.num-seconds-nanoseconds`.
pub fn transaction_id_to_mirror_format(transaction_id: &TransactionId) -> String {
	let account = transaction_id.account_id.unwrap_or_default();
	let start = transaction_id.transaction_valid_start.unwrap_or_default();
	format!(
		"{}.{}.{}-{}-{:09}",
		account.shard_num, account.realm_num, account.account_num, start.seconds, start.nanos,
	)
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn transaction_ids_render_in_mirror_format() {
		let id = TransactionId {
			transaction_valid_start: Some(proto::Timestamp {
				seconds: 1_700_000_000,
				nanos: 12_345,
			}),
			account_id: Some(proto::AccountId {
				shard_num: 0,
				realm_num: 0,
				account_num: 902,
			}),
		};
		assert_eq!(
			transaction_id_to_mirror_format(&id),
			"0.0.902-1700000000-000012345"
		);
	}
}
