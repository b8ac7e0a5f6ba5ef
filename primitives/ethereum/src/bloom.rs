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

use ethereum_types::{Bloom, BloomInput, H160, H256};

/// Bloom of a single log: the accrual of its emitting address and every
/// topic. Used to rebuild `logsBloom` when the backend record lacks one.
pub fn log_bloom(address: H160, topics: &[H256]) -> Bloom {
	let mut bloom = Bloom::zero();
	bloom.accrue(BloomInput::Raw(address.as_bytes()));
	for topic in topics {
		bloom.accrue(BloomInput::Raw(topic.as_bytes()));
	}
	bloom
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn bloom_contains_address_and_topics() {
		let address = H160::repeat_byte(0xaa);
		let topics = vec![H256::repeat_byte(0x01), H256::repeat_byte(0x02)];
		let bloom = log_bloom(address, &topics);

		assert!(bloom.contains_input(BloomInput::Raw(address.as_bytes())));
		for topic in &topics {
			assert!(bloom.contains_input(BloomInput::Raw(topic.as_bytes())));
		}
		assert!(!bloom.contains_input(BloomInput::Raw(H256::repeat_byte(0x03).as_bytes())));
	}
}
