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

use ethereum_types::{H160, H256};
use serde::{Deserialize, Serialize};

use crate::types::{BlockNumber, Log};

/// A single value, a set of values, or null. Filter addresses and topics
/// come in all three shapes.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum VariadicValue<T> {
	Single(T),
	Multiple(Vec<T>),
	Null,
}

impl<T: Clone> VariadicValue<T> {
	pub fn to_vec(&self) -> Vec<T> {
		match self {
			Self::Single(value) => vec![value.clone()],
			Self::Multiple(values) => values.clone(),
			Self::Null => Vec::new(),
		}
	}
}

/// Log filter criteria of `eth_getLogs` and `eth_newFilter`.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Filter {
	#[serde(skip_serializing_if = "Option::is_none")]
	pub from_block: Option<BlockNumber>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub to_block: Option<BlockNumber>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub block_hash: Option<H256>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub address: Option<VariadicValue<H160>>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub topics: Option<Vec<Option<VariadicValue<H256>>>>,
}

/// Result of `eth_getFilterChanges`: hashes for block filters, logs for
/// log filters.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum FilterChanges {
	Hashes(Vec<H256>),
	Logs(Vec<Log>),
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn filters_accept_all_topic_shapes() {
		let filter: Filter = serde_json::from_str(
			r#"{
				"fromBlock": "0x1",
				"toBlock": "latest",
				"address": ["0x1111111111111111111111111111111111111111"],
				"topics": [
					"0x2222222222222222222222222222222222222222222222222222222222222222",
					null,
					["0x3333333333333333333333333333333333333333333333333333333333333333",
					 "0x4444444444444444444444444444444444444444444444444444444444444444"]
				]
			}"#,
		)
		.unwrap();

		assert_eq!(filter.from_block, Some(BlockNumber::Num(1)));
		assert_eq!(
			filter.address,
			Some(VariadicValue::Multiple(vec![H160::repeat_byte(0x11)]))
		);
		let topics = filter.topics.unwrap();
		assert_eq!(topics.len(), 3);
		assert_eq!(
			topics[0],
			Some(VariadicValue::Single(H256::repeat_byte(0x22)))
		);
		assert_eq!(topics[1], None);
		assert_eq!(
			topics[2],
			Some(VariadicValue::Multiple(vec![
				H256::repeat_byte(0x33),
				H256::repeat_byte(0x44),
			]))
		);
	}
}
