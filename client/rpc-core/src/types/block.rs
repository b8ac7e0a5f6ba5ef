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

use ethereum_types::{Bloom, H160, H256, H64, U256};
use serde::{Deserialize, Serialize};

use crate::types::{Bytes, Transaction};

/// Transactions of a block, full objects or hashes only.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum BlockTransactions {
	Hashes(Vec<H256>),
	Full(Vec<Transaction>),
}

impl Default for BlockTransactions {
	fn default() -> Self {
		Self::Hashes(Vec::new())
	}
}

impl BlockTransactions {
	pub fn len(&self) -> usize {
		match self {
			Self::Hashes(hashes) => hashes.len(),
			Self::Full(transactions) => transactions.len(),
		}
	}

	pub fn is_empty(&self) -> bool {
		self.len() == 0
	}
}

/// An Ethereum-shaped block reconstructed from mirror-node records.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RichBlock {
	pub number: U256,
	pub hash: H256,
	pub parent_hash: H256,
	pub nonce: H64,
	pub sha3_uncles: H256,
	pub logs_bloom: Bloom,
	pub transactions_root: H256,
	pub state_root: H256,
	pub receipts_root: H256,
	pub miner: H160,
	pub difficulty: U256,
	pub total_difficulty: U256,
	pub extra_data: Bytes,
	pub size: U256,
	pub gas_limit: U256,
	pub gas_used: U256,
	pub base_fee_per_gas: U256,
	pub mix_hash: H256,
	pub timestamp: U256,
	pub transactions: BlockTransactions,
	pub uncles: Vec<H256>,
	pub withdrawals: Vec<serde_json::Value>,
	pub withdrawals_root: H256,
}
