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

//! Ethereum primitives shared across the relay: the typed transaction
//! envelope, keccak hashing, intrinsic gas, logs bloom accrual and the
//! receipts trie.

mod bloom;
mod transaction;
mod trie;

pub use bloom::log_bloom;
pub use transaction::{
	AccessListItem, Authorization, EcdsaSignature, Eip1559Transaction, Eip2930Transaction,
	Eip4844Transaction, Eip7702Transaction, LegacyTransaction, TransactionAction,
	TransactionError, TypedTransaction,
};
pub use trie::{receipts_root, KeccakHasher, RootOrStatus, TrieLog, TrieReceipt};

use ethereum_types::{H160, H256};
use sha3::{Digest, Keccak256};

/// One HBAR tinybar expressed in weibars.
pub const TINYBAR_TO_WEIBAR_COEF: u128 = 10_000_000_000;

/// Base transaction cost in gas.
pub const TX_BASE_COST: u64 = 21_000;
/// Gas charged per zero byte of call data.
pub const TX_DATA_ZERO_COST: u64 = 4;
/// Gas charged per non-zero byte of call data.
pub const TX_DATA_NONZERO_COST: u64 = 16;

/// `keccak256(rlp(""))`, the root hash of an empty Merkle-Patricia trie.
/// Serves as `stateRoot` for every block and as `receiptsRoot` /
/// `transactionsRoot` of empty blocks.
pub const DEFAULT_ROOT_HASH: H256 = H256(hex_literal(
	*b"56e81f171bcc55a6ff8345e692c0f86e5b48e01b996cadc001622fb5e363b421",
));

/// `keccak256(rlp([]))`, the `sha3Uncles` of a block without ommers.
pub const EMPTY_ARRAY_HASH: H256 = H256(hex_literal(
	*b"1dcc4de8dec75d7aab85b567b6ccd41ad312451b948a7413f0a142fd40d49347",
));

/// Compute the keccak-256 digest of `data`.
pub fn keccak256(data: &[u8]) -> H256 {
	H256::from_slice(Keccak256::digest(data).as_slice())
}

/// Derive the Ethereum address of an uncompressed secp256k1 public key
/// (64 bytes, without the 0x04 prefix).
pub fn public_key_to_address(public: &[u8; 64]) -> H160 {
	H160::from(keccak256(public))
}

/// Intrinsic gas of a payload: the flat base cost plus the per-byte call
/// data charge.
pub fn intrinsic_gas(data: &[u8]) -> u64 {
	let zeroes = data.iter().filter(|b| **b == 0).count() as u64;
	let non_zeroes = data.len() as u64 - zeroes;
	TX_BASE_COST + zeroes * TX_DATA_ZERO_COST + non_zeroes * TX_DATA_NONZERO_COST
}

// Decodes a 64-char lowercase hex literal at const time.
const fn hex_literal(chars: [u8; 64]) -> [u8; 32] {
	const fn nibble(c: u8) -> u8 {
		match c {
			b'0'..=b'9' => c - b'0',
			b'a'..=b'f' => c - b'a' + 10,
			_ => panic!("invalid hex digit"),
		}
	}
	let mut out = [0u8; 32];
	let mut i = 0;
	while i < 32 {
		out[i] = (nibble(chars[i * 2]) << 4) | nibble(chars[i * 2 + 1]);
		i += 1;
	}
	out
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn intrinsic_gas_counts_zero_and_nonzero_bytes() {
		assert_eq!(intrinsic_gas(&[]), 21_000);
		assert_eq!(intrinsic_gas(&[0, 0, 0]), 21_000 + 3 * 4);
		assert_eq!(intrinsic_gas(&[1, 0, 0xff]), 21_000 + 2 * 16 + 4);
	}

	#[test]
	fn empty_trie_root_constant_matches_keccak_of_empty_rlp() {
		assert_eq!(keccak256(&rlp::NULL_RLP), DEFAULT_ROOT_HASH);
	}

	#[test]
	fn empty_array_hash_constant_matches_keccak_of_empty_list() {
		let encoded: Vec<u8> = rlp::EMPTY_LIST_RLP.to_vec();
		assert_eq!(keccak256(&encoded), EMPTY_ARRAY_HASH);
	}
}
