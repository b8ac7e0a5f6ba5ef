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

use ethereum_types::{H160, H256, U256, U64};
use serde::{Deserialize, Serialize};

use crate::types::Bytes;

/// An Ethereum-shaped transaction, assembled from mirror-node records or
/// synthesized from orphan logs.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Transaction {
	pub block_hash: Option<H256>,
	pub block_number: Option<U256>,
	pub from: H160,
	pub gas: U256,
	pub gas_price: U256,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub max_fee_per_gas: Option<U256>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub max_priority_fee_per_gas: Option<U256>,
	pub hash: H256,
	pub input: Bytes,
	pub nonce: U256,
	pub to: Option<H160>,
	pub transaction_index: Option<U256>,
	pub value: U256,
	#[serde(rename = "type")]
	pub transaction_type: U64,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub chain_id: Option<U64>,
	pub v: U256,
	pub r: U256,
	pub s: U256,
}

/// Parameters of the unsupported `eth_sendTransaction`; accepted on the
/// wire so the rejection is well-formed.
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionRequest {
	pub from: Option<H160>,
	pub to: Option<H160>,
	pub gas_price: Option<U256>,
	pub max_fee_per_gas: Option<U256>,
	pub max_priority_fee_per_gas: Option<U256>,
	pub gas: Option<U256>,
	pub value: Option<U256>,
	pub data: Option<Bytes>,
	pub nonce: Option<U256>,
}
