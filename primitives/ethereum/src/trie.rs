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

//! The receipts Merkle-Patricia trie. Keys are the rlp of the transaction
//! index, values the (type-prefixed) rlp of the receipt payload.

use ethereum_types::{Bloom, H160, H256, U256};
use hash_db::Hasher;
use plain_hasher::PlainHasher;
use rlp::{Encodable, RlpStream};

use crate::keccak256;

/// Keccak-256 `hash-db` hasher, the hash function of all Ethereum tries.
#[derive(Debug)]
pub struct KeccakHasher;

impl Hasher for KeccakHasher {
	type Out = H256;
	type StdHasher = PlainHasher;
	const LENGTH: usize = 32;

	fn hash(x: &[u8]) -> Self::Out {
		keccak256(x)
	}
}

/// Pre-Byzantium receipts carry a state root, everything after a status
/// byte.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RootOrStatus {
	Root(H256),
	Status(u8),
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TrieLog {
	pub address: H160,
	pub topics: Vec<H256>,
	pub data: Vec<u8>,
}

impl Encodable for TrieLog {
	fn rlp_append(&self, s: &mut RlpStream) {
		s.begin_list(3);
		s.append(&self.address);
		s.append_list(&self.topics);
		s.append(&self.data);
	}
}

/// One receipt as it enters the trie.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TrieReceipt {
	/// EIP-2718 type byte; zero for legacy (no prefix on the trie value).
	pub type_byte: u8,
	pub root_or_status: RootOrStatus,
	pub cumulative_gas_used: U256,
	pub logs_bloom: Bloom,
	pub logs: Vec<TrieLog>,
}

impl TrieReceipt {
	pub fn encode(&self) -> Vec<u8> {
		let mut s = RlpStream::new_list(4);
		match self.root_or_status {
			RootOrStatus::Root(root) => s.append(&root),
			RootOrStatus::Status(status) => s.append(&status),
		};
		s.append(&self.cumulative_gas_used);
		s.append(&self.logs_bloom);
		s.append_list(&self.logs);

		let payload = s.out();
		if self.type_byte == 0 {
			payload.to_vec()
		} else {
			let mut out = Vec::with_capacity(payload.len() + 1);
			out.push(self.type_byte);
			out.extend_from_slice(&payload);
			out
		}
	}
}

/// Root of the receipts trie for a block, receipts ordered by transaction
/// index. The empty input yields [`crate::DEFAULT_ROOT_HASH`].
pub fn receipts_root(receipts: &[TrieReceipt]) -> H256 {
	triehash::ordered_trie_root::<KeccakHasher, _>(receipts.iter().map(TrieReceipt::encode))
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::{log_bloom, DEFAULT_ROOT_HASH};

	fn receipt(type_byte: u8, status: u8, gas: u64, logs: Vec<TrieLog>) -> TrieReceipt {
		let mut bloom = Bloom::zero();
		for log in &logs {
			bloom.accrue_bloom(&log_bloom(log.address, &log.topics));
		}
		TrieReceipt {
			type_byte,
			root_or_status: RootOrStatus::Status(status),
			cumulative_gas_used: U256::from(gas),
			logs_bloom: bloom,
			logs,
		}
	}

	#[test]
	fn empty_block_root_is_the_empty_trie_root() {
		assert_eq!(receipts_root(&[]), DEFAULT_ROOT_HASH);
	}

	#[test]
	fn root_is_deterministic_and_order_sensitive() {
		let a = receipt(0, 1, 21_000, vec![]);
		let b = receipt(
			2,
			1,
			55_000,
			vec![TrieLog {
				address: H160::repeat_byte(0x33),
				topics: vec![H256::repeat_byte(0x01)],
				data: vec![1, 2, 3],
			}],
		);
		let forward = receipts_root(&[a.clone(), b.clone()]);
		assert_eq!(forward, receipts_root(&[a.clone(), b.clone()]));
		assert_ne!(forward, receipts_root(&[b, a]));
		assert_ne!(forward, DEFAULT_ROOT_HASH);
	}

	#[test]
	fn type_byte_prefixes_the_trie_value() {
		let legacy = receipt(0, 1, 21_000, vec![]);
		let typed = TrieReceipt {
			type_byte: 2,
			..legacy.clone()
		};
		assert_eq!(typed.encode()[0], 2);
		assert_eq!(typed.encode()[1..], legacy.encode()[..]);
		assert_ne!(receipts_root(&[legacy]), receipts_root(&[typed]));
	}
}
