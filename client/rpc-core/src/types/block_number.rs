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

use std::fmt;

use ethereum_types::H256;
use serde::{
	de::{Error, MapAccess, Visitor},
	Deserialize, Deserializer, Serialize, Serializer,
};

/// Block parameter of the rpc api: a tag, a number, or the EIP-1898
/// object form.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Default, Hash)]
pub enum BlockNumber {
	/// Block by hash (EIP-1898 object form).
	Hash {
		hash: H256,
		require_canonical: bool,
	},
	/// Block by number.
	Num(u64),
	/// Latest block known to the mirror node.
	#[default]
	Latest,
	/// Genesis.
	Earliest,
	/// The backend has no mempool blocks; resolves to latest.
	Pending,
	/// Finality is immediate on this backend; resolves to latest.
	Safe,
	/// Finality is immediate on this backend; resolves to latest.
	Finalized,
}

impl BlockNumber {
	/// Numeric lower bound, when the parameter names one.
	pub fn to_min_block_num(&self) -> Option<u64> {
		match *self {
			BlockNumber::Num(number) => Some(number),
			BlockNumber::Earliest => Some(0),
			_ => None,
		}
	}

	/// Whether this parameter names the head of the chain.
	pub fn is_latest(&self) -> bool {
		matches!(
			self,
			BlockNumber::Latest | BlockNumber::Pending | BlockNumber::Safe | BlockNumber::Finalized
		)
	}
}

impl Serialize for BlockNumber {
	fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
	where
		S: Serializer,
	{
		match *self {
			BlockNumber::Hash {
				hash,
				require_canonical,
			} => serializer.serialize_str(&format!(
				"{{\"blockHash\": \"{:?}\", \"requireCanonical\": {}}}",
				hash, require_canonical
			)),
			BlockNumber::Num(number) => serializer.serialize_str(&format!("0x{:x}", number)),
			BlockNumber::Latest => serializer.serialize_str("latest"),
			BlockNumber::Earliest => serializer.serialize_str("earliest"),
			BlockNumber::Pending => serializer.serialize_str("pending"),
			BlockNumber::Safe => serializer.serialize_str("safe"),
			BlockNumber::Finalized => serializer.serialize_str("finalized"),
		}
	}
}

impl<'a> Deserialize<'a> for BlockNumber {
	fn deserialize<D>(deserializer: D) -> Result<BlockNumber, D::Error>
	where
		D: Deserializer<'a>,
	{
		deserializer.deserialize_any(BlockNumberVisitor)
	}
}

struct BlockNumberVisitor;

impl<'a> Visitor<'a> for BlockNumberVisitor {
	type Value = BlockNumber;

	fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
		write!(
			formatter,
			"a block number or 'latest', 'safe', 'finalized', 'earliest' or 'pending'"
		)
	}

	fn visit_map<V>(self, mut visitor: V) -> Result<Self::Value, V::Error>
	where
		V: MapAccess<'a>,
	{
		let (mut require_canonical, mut block_number, mut block_hash) =
			(false, None::<u64>, None::<H256>);

		while let Some(key) = visitor.next_key::<String>()? {
			match key.as_str() {
				"blockNumber" => {
					let value: String = visitor.next_value()?;
					let stripped = value.strip_prefix("0x").ok_or_else(|| {
						Error::custom("invalid block number: missing 0x prefix".to_string())
					})?;
					let number = u64::from_str_radix(stripped, 16)
						.map_err(|err| Error::custom(format!("invalid block number: {}", err)))?;
					block_number = Some(number);
				}
				"blockHash" => {
					block_hash = Some(visitor.next_value()?);
				}
				"requireCanonical" => {
					require_canonical = visitor.next_value()?;
				}
				key => return Err(Error::custom(format!("unknown key: {}", key))),
			}
		}

		if let Some(number) = block_number {
			return Ok(BlockNumber::Num(number));
		}
		if let Some(hash) = block_hash {
			return Ok(BlockNumber::Hash {
				hash,
				require_canonical,
			});
		}
		Err(Error::custom("invalid block parameter object"))
	}

	fn visit_str<E>(self, value: &str) -> Result<Self::Value, E>
	where
		E: Error,
	{
		match value {
			"latest" => Ok(BlockNumber::Latest),
			"earliest" => Ok(BlockNumber::Earliest),
			"pending" => Ok(BlockNumber::Pending),
			"safe" => Ok(BlockNumber::Safe),
			"finalized" => Ok(BlockNumber::Finalized),
			_ if value.starts_with("0x") => u64::from_str_radix(&value[2..], 16)
				.map(BlockNumber::Num)
				.map_err(|err| Error::custom(format!("invalid block number: {}", err))),
			_ => value.parse::<u64>().map(BlockNumber::Num).map_err(|_| {
				Error::custom("invalid block number: missing 0x prefix".to_string())
			}),
		}
	}

	fn visit_string<E>(self, value: String) -> Result<Self::Value, E>
	where
		E: Error,
	{
		self.visit_str(value.as_ref())
	}

	fn visit_u64<E>(self, value: u64) -> Result<Self::Value, E>
	where
		E: Error,
	{
		Ok(BlockNumber::Num(value))
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	fn parse(raw: &str) -> BlockNumber {
		serde_json::from_str(raw).unwrap()
	}

	#[test]
	fn tags_numbers_and_eip1898_objects_deserialize() {
		assert_eq!(parse(r#""latest""#), BlockNumber::Latest);
		assert_eq!(parse(r#""safe""#), BlockNumber::Safe);
		assert_eq!(parse(r#""0x10""#), BlockNumber::Num(16));
		assert_eq!(parse(r#"{"blockNumber": "0x10"}"#), BlockNumber::Num(16));
		let by_hash = parse(
			r#"{"blockHash": "0x1111111111111111111111111111111111111111111111111111111111111111", "requireCanonical": true}"#,
		);
		assert_eq!(
			by_hash,
			BlockNumber::Hash {
				hash: H256::repeat_byte(0x11),
				require_canonical: true,
			}
		);
	}

	#[test]
	fn latest_like_tags_are_recognized() {
		assert!(BlockNumber::Latest.is_latest());
		assert!(BlockNumber::Pending.is_latest());
		assert!(BlockNumber::Finalized.is_latest());
		assert!(!BlockNumber::Num(7).is_latest());
		assert_eq!(BlockNumber::Earliest.to_min_block_num(), Some(0));
	}
}
