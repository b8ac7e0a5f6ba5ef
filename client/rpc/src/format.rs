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

//! Conversions between mirror-node hex strings and typed values. The
//! mirror node is lenient about widths (48-byte block hashes, unpadded
//! quantities); the rpc edge is not.

use ethereum_types::{Bloom, H160, H256, U256};

pub fn bytes_from_hex(value: &str) -> Option<Vec<u8>> {
	let stripped = value.strip_prefix("0x").unwrap_or(value);
	if stripped.is_empty() {
		return Some(Vec::new());
	}
	hex::decode(stripped).ok()
}

pub fn h160_from_hex(value: &str) -> Option<H160> {
	let bytes = bytes_from_hex(value)?;
	(bytes.len() == 20).then(|| H160::from_slice(&bytes))
}

pub fn h256_from_hex(value: &str) -> Option<H256> {
	let bytes = bytes_from_hex(value)?;
	(bytes.len() == 32).then(|| H256::from_slice(&bytes))
}

/// First 32 bytes of a longer backend hash (block hashes are 48-byte
/// SHA-384 digests upstream).
pub fn h256_from_long_hex(value: &str) -> Option<H256> {
	let bytes = bytes_from_hex(value)?;
	(bytes.len() >= 32).then(|| H256::from_slice(&bytes[..32]))
}

pub fn u256_from_hex(value: &str) -> Option<U256> {
	let stripped = value.strip_prefix("0x").unwrap_or(value);
	if stripped.is_empty() {
		return Some(U256::zero());
	}
	U256::from_str_radix(stripped, 16).ok()
}

pub fn bloom_from_hex(value: &str) -> Option<Bloom> {
	let bytes = bytes_from_hex(value)?;
	(bytes.len() == 256).then(|| Bloom::from_slice(&bytes))
}

/// Seconds component of a mirror `seconds.nanoseconds` timestamp.
pub fn timestamp_seconds(timestamp: &str) -> u64 {
	timestamp
		.split('.')
		.next()
		.and_then(|seconds| seconds.parse().ok())
		.unwrap_or_default()
}

/// Strip leading zero bytes from a topic so the mirror node matches it
/// regardless of padding.
pub fn strip_leading_zeros(topic: &H256) -> String {
	format!("0x{:x}", U256::from(topic.as_bytes()))
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn long_hashes_truncate_to_32_bytes() {
		let long = format!("0x{}{}", "ab".repeat(32), "cd".repeat(16));
		assert_eq!(
			h256_from_long_hex(&long),
			Some(H256::from_slice(&[0xab; 32]))
		);
		assert_eq!(h256_from_long_hex("0x1234"), None);
	}

	#[test]
	fn quantities_parse_from_unpadded_hex() {
		assert_eq!(u256_from_hex("0x0"), Some(U256::zero()));
		assert_eq!(u256_from_hex("0x10"), Some(U256::from(16)));
		assert_eq!(u256_from_hex(""), Some(U256::zero()));
		assert_eq!(u256_from_hex("0xzz"), None);
	}

	#[test]
	fn topics_lose_their_leading_zeros() {
		let topic = H256::from_low_u64_be(0xdeadbeef);
		assert_eq!(strip_leading_zeros(&topic), "0xdeadbeef");
	}

	#[test]
	fn timestamps_take_the_seconds_component() {
		assert_eq!(timestamp_seconds("1586567700.453054000"), 1_586_567_700);
		assert_eq!(timestamp_seconds("bogus"), 0);
	}
}
