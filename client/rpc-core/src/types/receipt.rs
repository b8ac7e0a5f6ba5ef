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

use ethereum_types::{Bloom, H160, H256, U256, U64};
use serde::{Deserialize, Serialize};

use crate::types::Log;

/// A transaction receipt; synthetic receipts carry zero gas and describe
/// state changes visible only as emitted logs.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Receipt {
	pub transaction_hash: H256,
	pub transaction_index: Option<U256>,
	pub block_hash: Option<H256>,
	pub block_number: Option<U256>,
	pub from: H160,
	pub to: Option<H160>,
	pub cumulative_gas_used: U256,
	pub gas_used: U256,
	pub contract_address: Option<H160>,
	pub logs: Vec<Log>,
	pub logs_bloom: Bloom,
	pub status: Option<U64>,
	pub effective_gas_price: Option<U256>,
	#[serde(rename = "type")]
	pub transaction_type: U64,
	pub root: Option<H256>,
}
