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

use serde::{
	de::{Error, Visitor},
	Deserialize, Deserializer, Serialize, Serializer,
};

/// A hex-encoded index parameter (transaction index, filter id).
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct Index(u64);

impl Index {
	pub fn value(&self) -> u64 {
		self.0
	}
}

impl From<u64> for Index {
	fn from(value: u64) -> Self {
		Self(value)
	}
}

impl Serialize for Index {
	fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
	where
		S: Serializer,
	{
		serializer.serialize_str(&format!("0x{:x}", self.0))
	}
}

impl<'a> Deserialize<'a> for Index {
	fn deserialize<D>(deserializer: D) -> Result<Index, D::Error>
	where
		D: Deserializer<'a>,
	{
		deserializer.deserialize_any(IndexVisitor)
	}
}

struct IndexVisitor;

impl<'a> Visitor<'a> for IndexVisitor {
	type Value = Index;

	fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
		write!(formatter, "a hex-encoded or decimal index")
	}

	fn visit_str<E>(self, value: &str) -> Result<Self::Value, E>
	where
		E: Error,
	{
		match value.strip_prefix("0x") {
			Some(stripped) => u64::from_str_radix(stripped, 16)
				.map(Index)
				.map_err(|err| Error::custom(format!("invalid index: {}", err))),
			None => value
				.parse::<u64>()
				.map(Index)
				.map_err(|err| Error::custom(format!("invalid index: {}", err))),
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
		Ok(Index(value))
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn hex_and_decimal_forms_deserialize() {
		assert_eq!(serde_json::from_str::<Index>(r#""0x1f""#).unwrap().value(), 31);
		assert_eq!(serde_json::from_str::<Index>(r#""12""#).unwrap().value(), 12);
		assert_eq!(serde_json::from_str::<Index>("7").unwrap().value(), 7);
	}
}
