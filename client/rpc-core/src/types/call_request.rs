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

use ethereum_types::{H160, U256};
use serde::Deserialize;

use crate::types::Bytes;

/// Call request of `eth_call` / `eth_estimateGas`. Carries both `data`
/// and the EIP-1474 `input` alias; `input` wins when both are set.
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CallRequest {
	pub from: Option<H160>,
	pub to: Option<H160>,
	pub gas_price: Option<U256>,
	pub max_fee_per_gas: Option<U256>,
	pub max_priority_fee_per_gas: Option<U256>,
	pub gas: Option<U256>,
	pub value: Option<U256>,
	pub data: Option<Bytes>,
	pub input: Option<Bytes>,
	pub nonce: Option<U256>,
	pub estimate: Option<bool>,
	pub chain_id: Option<U256>,
	pub access_list: Option<serde_json::Value>,
}

impl CallRequest {
	/// Prefer `input` over `data`, discarding `input` after the copy.
	pub fn take_data(&mut self) -> Option<Bytes> {
		match self.input.take() {
			Some(input) => {
				self.data = Some(input.clone());
				Some(input)
			}
			None => self.data.clone(),
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn input_alias_wins_over_data() {
		let mut request: CallRequest = serde_json::from_str(
			r#"{"to": "0x2222222222222222222222222222222222222222", "data": "0x01", "input": "0x02"}"#,
		)
		.unwrap();
		assert_eq!(request.take_data(), Some(Bytes(vec![0x02])));
		assert_eq!(request.data, Some(Bytes(vec![0x02])));
		assert_eq!(request.input, None);
	}
}
