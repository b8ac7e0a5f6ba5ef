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

//! The typed transaction envelope: one tagged variant per wire format,
//! dispatched on the leading byte of the raw payload. Everything the
//! relay knows about a submitted transaction is recovered from these
//! bytes; nothing is taken from the client's word.

use ethereum_types::{H160, H256, U256};
use rlp::{Decodable, DecoderError, Encodable, Rlp, RlpStream};

use crate::{keccak256, public_key_to_address};

#[derive(Debug, thiserror::Error)]
pub enum TransactionError {
	#[error("transaction data is empty")]
	Empty,
	#[error("unknown transaction type {0:#04x}")]
	UnknownType(u8),
	#[error("rlp decode failed: {0}")]
	Rlp(#[from] DecoderError),
	#[error("invalid transaction signature")]
	InvalidSignature,
}

impl From<libsecp256k1::Error> for TransactionError {
	fn from(_: libsecp256k1::Error) -> Self {
		Self::InvalidSignature
	}
}

/// Whether a transaction calls an existing account or creates a new one.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TransactionAction {
	Call(H160),
	Create,
}

impl TransactionAction {
	pub fn to(&self) -> Option<H160> {
		match self {
			Self::Call(address) => Some(*address),
			Self::Create => None,
		}
	}
}

impl Encodable for TransactionAction {
	fn rlp_append(&self, s: &mut RlpStream) {
		match self {
			Self::Call(address) => {
				s.append(address);
			}
			Self::Create => {
				s.append(&"");
			}
		}
	}
}

impl Decodable for TransactionAction {
	fn decode(rlp: &Rlp) -> Result<Self, DecoderError> {
		if rlp.is_empty() {
			if rlp.is_data() {
				Ok(Self::Create)
			} else {
				Err(DecoderError::RlpExpectedToBeData)
			}
		} else {
			Ok(Self::Call(rlp.as_val()?))
		}
	}
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AccessListItem {
	pub address: H160,
	pub storage_keys: Vec<H256>,
}

impl Encodable for AccessListItem {
	fn rlp_append(&self, s: &mut RlpStream) {
		s.begin_list(2);
		s.append(&self.address);
		s.append_list(&self.storage_keys);
	}
}

impl Decodable for AccessListItem {
	fn decode(rlp: &Rlp) -> Result<Self, DecoderError> {
		Ok(Self {
			address: rlp.val_at(0)?,
			storage_keys: rlp.list_at(1)?,
		})
	}
}

/// EIP-7702 authorization tuple.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Authorization {
	pub chain_id: U256,
	pub address: H160,
	pub nonce: u64,
	pub odd_y_parity: bool,
	pub r: H256,
	pub s: H256,
}

impl Encodable for Authorization {
	fn rlp_append(&self, s: &mut RlpStream) {
		s.begin_list(6);
		s.append(&self.chain_id);
		s.append(&self.address);
		s.append(&self.nonce);
		s.append(&(self.odd_y_parity as u8));
		s.append(&U256::from_big_endian(self.r.as_bytes()));
		s.append(&U256::from_big_endian(self.s.as_bytes()));
	}
}

impl Decodable for Authorization {
	fn decode(rlp: &Rlp) -> Result<Self, DecoderError> {
		Ok(Self {
			chain_id: rlp.val_at(0)?,
			address: rlp.val_at(1)?,
			nonce: rlp.val_at(2)?,
			odd_y_parity: rlp.val_at::<u8>(3)? != 0,
			r: u256_to_h256(rlp.val_at(4)?),
			s: u256_to_h256(rlp.val_at(5)?),
		})
	}
}

/// Signature of a typed (EIP-2718) transaction.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EcdsaSignature {
	pub odd_y_parity: bool,
	pub r: H256,
	pub s: H256,
}

impl EcdsaSignature {
	fn append(&self, s: &mut RlpStream) {
		s.append(&(self.odd_y_parity as u8));
		s.append(&U256::from_big_endian(self.r.as_bytes()));
		s.append(&U256::from_big_endian(self.s.as_bytes()));
	}

	fn decode_from(rlp: &Rlp, offset: usize) -> Result<Self, DecoderError> {
		Ok(Self {
			odd_y_parity: rlp.val_at::<u8>(offset)? != 0,
			r: u256_to_h256(rlp.val_at(offset + 1)?),
			s: u256_to_h256(rlp.val_at(offset + 2)?),
		})
	}
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LegacyTransaction {
	pub nonce: U256,
	pub gas_price: U256,
	pub gas_limit: U256,
	pub action: TransactionAction,
	pub value: U256,
	pub input: Vec<u8>,
	pub v: u64,
	pub r: H256,
	pub s: H256,
}

impl LegacyTransaction {
	/// EIP-155 chain id folded into `v`; `None` for pre-155 signatures
	/// (`v` of 27 or 28).
	pub fn chain_id(&self) -> Option<u64> {
		if self.v >= 35 {
			Some((self.v - 35) / 2)
		} else {
			None
		}
	}

	fn signing_hash(&self) -> H256 {
		let mut s = RlpStream::new();
		match self.chain_id() {
			Some(chain_id) => {
				s.begin_list(9);
				s.append(&self.nonce);
				s.append(&self.gas_price);
				s.append(&self.gas_limit);
				s.append(&self.action);
				s.append(&self.value);
				s.append(&self.input);
				s.append(&chain_id);
				s.append(&0u8);
				s.append(&0u8);
			}
			None => {
				s.begin_list(6);
				s.append(&self.nonce);
				s.append(&self.gas_price);
				s.append(&self.gas_limit);
				s.append(&self.action);
				s.append(&self.value);
				s.append(&self.input);
			}
		}
		keccak256(&s.out())
	}

	fn recovery_id(&self) -> Result<u8, TransactionError> {
		match self.v {
			27 | 28 => Ok((self.v - 27) as u8),
			v if v >= 35 => Ok(((v - 35) % 2) as u8),
			_ => Err(TransactionError::InvalidSignature),
		}
	}
}

impl Encodable for LegacyTransaction {
	fn rlp_append(&self, s: &mut RlpStream) {
		s.begin_list(9);
		s.append(&self.nonce);
		s.append(&self.gas_price);
		s.append(&self.gas_limit);
		s.append(&self.action);
		s.append(&self.value);
		s.append(&self.input);
		s.append(&self.v);
		s.append(&U256::from_big_endian(self.r.as_bytes()));
		s.append(&U256::from_big_endian(self.s.as_bytes()));
	}
}

impl Decodable for LegacyTransaction {
	fn decode(rlp: &Rlp) -> Result<Self, DecoderError> {
		if rlp.item_count()? != 9 {
			return Err(DecoderError::RlpIncorrectListLen);
		}
		Ok(Self {
			nonce: rlp.val_at(0)?,
			gas_price: rlp.val_at(1)?,
			gas_limit: rlp.val_at(2)?,
			action: rlp.val_at(3)?,
			value: rlp.val_at(4)?,
			input: rlp.val_at(5)?,
			v: rlp.val_at(6)?,
			r: u256_to_h256(rlp.val_at(7)?),
			s: u256_to_h256(rlp.val_at(8)?),
		})
	}
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Eip2930Transaction {
	pub chain_id: u64,
	pub nonce: U256,
	pub gas_price: U256,
	pub gas_limit: U256,
	pub action: TransactionAction,
	pub value: U256,
	pub input: Vec<u8>,
	pub access_list: Vec<AccessListItem>,
	pub signature: EcdsaSignature,
}

impl Eip2930Transaction {
	fn signing_hash(&self) -> H256 {
		let mut s = RlpStream::new();
		s.begin_list(8);
		s.append(&self.chain_id);
		s.append(&self.nonce);
		s.append(&self.gas_price);
		s.append(&self.gas_limit);
		s.append(&self.action);
		s.append(&self.value);
		s.append(&self.input);
		s.append_list(&self.access_list);
		typed_hash(0x01, &s.out())
	}
}

impl Encodable for Eip2930Transaction {
	fn rlp_append(&self, s: &mut RlpStream) {
		s.begin_list(11);
		s.append(&self.chain_id);
		s.append(&self.nonce);
		s.append(&self.gas_price);
		s.append(&self.gas_limit);
		s.append(&self.action);
		s.append(&self.value);
		s.append(&self.input);
		s.append_list(&self.access_list);
		self.signature.append(s);
	}
}

impl Decodable for Eip2930Transaction {
	fn decode(rlp: &Rlp) -> Result<Self, DecoderError> {
		if rlp.item_count()? != 11 {
			return Err(DecoderError::RlpIncorrectListLen);
		}
		Ok(Self {
			chain_id: rlp.val_at(0)?,
			nonce: rlp.val_at(1)?,
			gas_price: rlp.val_at(2)?,
			gas_limit: rlp.val_at(3)?,
			action: rlp.val_at(4)?,
			value: rlp.val_at(5)?,
			input: rlp.val_at(6)?,
			access_list: rlp.list_at(7)?,
			signature: EcdsaSignature::decode_from(rlp, 8)?,
		})
	}
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Eip1559Transaction {
	pub chain_id: u64,
	pub nonce: U256,
	pub max_priority_fee_per_gas: U256,
	pub max_fee_per_gas: U256,
	pub gas_limit: U256,
	pub action: TransactionAction,
	pub value: U256,
	pub input: Vec<u8>,
	pub access_list: Vec<AccessListItem>,
	pub signature: EcdsaSignature,
}

impl Eip1559Transaction {
	fn signing_hash(&self) -> H256 {
		let mut s = RlpStream::new();
		s.begin_list(9);
		s.append(&self.chain_id);
		s.append(&self.nonce);
		s.append(&self.max_priority_fee_per_gas);
		s.append(&self.max_fee_per_gas);
		s.append(&self.gas_limit);
		s.append(&self.action);
		s.append(&self.value);
		s.append(&self.input);
		s.append_list(&self.access_list);
		typed_hash(0x02, &s.out())
	}
}

impl Encodable for Eip1559Transaction {
	fn rlp_append(&self, s: &mut RlpStream) {
		s.begin_list(12);
		s.append(&self.chain_id);
		s.append(&self.nonce);
		s.append(&self.max_priority_fee_per_gas);
		s.append(&self.max_fee_per_gas);
		s.append(&self.gas_limit);
		s.append(&self.action);
		s.append(&self.value);
		s.append(&self.input);
		s.append_list(&self.access_list);
		self.signature.append(s);
	}
}

impl Decodable for Eip1559Transaction {
	fn decode(rlp: &Rlp) -> Result<Self, DecoderError> {
		if rlp.item_count()? != 12 {
			return Err(DecoderError::RlpIncorrectListLen);
		}
		Ok(Self {
			chain_id: rlp.val_at(0)?,
			nonce: rlp.val_at(1)?,
			max_priority_fee_per_gas: rlp.val_at(2)?,
			max_fee_per_gas: rlp.val_at(3)?,
			gas_limit: rlp.val_at(4)?,
			action: rlp.val_at(5)?,
			value: rlp.val_at(6)?,
			input: rlp.val_at(7)?,
			access_list: rlp.list_at(8)?,
			signature: EcdsaSignature::decode_from(rlp, 9)?,
		})
	}
}

/// EIP-4844 blob transaction. Decoded only far enough for the relay to
/// identify and reject it; blob sidecars are never accepted.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Eip4844Transaction {
	pub chain_id: u64,
	pub nonce: U256,
	pub max_priority_fee_per_gas: U256,
	pub max_fee_per_gas: U256,
	pub gas_limit: U256,
	pub to: H160,
	pub value: U256,
	pub input: Vec<u8>,
	pub access_list: Vec<AccessListItem>,
	pub max_fee_per_blob_gas: U256,
	pub blob_versioned_hashes: Vec<H256>,
	pub signature: EcdsaSignature,
}

impl Eip4844Transaction {
	fn signing_hash(&self) -> H256 {
		let mut s = RlpStream::new();
		s.begin_list(11);
		s.append(&self.chain_id);
		s.append(&self.nonce);
		s.append(&self.max_priority_fee_per_gas);
		s.append(&self.max_fee_per_gas);
		s.append(&self.gas_limit);
		s.append(&self.to);
		s.append(&self.value);
		s.append(&self.input);
		s.append_list(&self.access_list);
		s.append(&self.max_fee_per_blob_gas);
		s.append_list(&self.blob_versioned_hashes);
		typed_hash(0x03, &s.out())
	}
}

impl Encodable for Eip4844Transaction {
	fn rlp_append(&self, s: &mut RlpStream) {
		s.begin_list(14);
		s.append(&self.chain_id);
		s.append(&self.nonce);
		s.append(&self.max_priority_fee_per_gas);
		s.append(&self.max_fee_per_gas);
		s.append(&self.gas_limit);
		s.append(&self.to);
		s.append(&self.value);
		s.append(&self.input);
		s.append_list(&self.access_list);
		s.append(&self.max_fee_per_blob_gas);
		s.append_list(&self.blob_versioned_hashes);
		self.signature.append(s);
	}
}

impl Decodable for Eip4844Transaction {
	fn decode(rlp: &Rlp) -> Result<Self, DecoderError> {
		if rlp.item_count()? != 14 {
			return Err(DecoderError::RlpIncorrectListLen);
		}
		Ok(Self {
			chain_id: rlp.val_at(0)?,
			nonce: rlp.val_at(1)?,
			max_priority_fee_per_gas: rlp.val_at(2)?,
			max_fee_per_gas: rlp.val_at(3)?,
			gas_limit: rlp.val_at(4)?,
			to: rlp.val_at(5)?,
			value: rlp.val_at(6)?,
			input: rlp.val_at(7)?,
			access_list: rlp.list_at(8)?,
			max_fee_per_blob_gas: rlp.val_at(9)?,
			blob_versioned_hashes: rlp.list_at(10)?,
			signature: EcdsaSignature::decode_from(rlp, 11)?,
		})
	}
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Eip7702Transaction {
	pub chain_id: u64,
	pub nonce: U256,
	pub max_priority_fee_per_gas: U256,
	pub max_fee_per_gas: U256,
	pub gas_limit: U256,
	pub to: H160,
	pub value: U256,
	pub input: Vec<u8>,
	pub access_list: Vec<AccessListItem>,
	pub authorization_list: Vec<Authorization>,
	pub signature: EcdsaSignature,
}

impl Eip7702Transaction {
	fn signing_hash(&self) -> H256 {
		let mut s = RlpStream::new();
		s.begin_list(10);
		s.append(&self.chain_id);
		s.append(&self.nonce);
		s.append(&self.max_priority_fee_per_gas);
		s.append(&self.max_fee_per_gas);
		s.append(&self.gas_limit);
		s.append(&self.to);
		s.append(&self.value);
		s.append(&self.input);
		s.append_list(&self.access_list);
		s.append_list(&self.authorization_list);
		typed_hash(0x04, &s.out())
	}
}

impl Encodable for Eip7702Transaction {
	fn rlp_append(&self, s: &mut RlpStream) {
		s.begin_list(13);
		s.append(&self.chain_id);
		s.append(&self.nonce);
		s.append(&self.max_priority_fee_per_gas);
		s.append(&self.max_fee_per_gas);
		s.append(&self.gas_limit);
		s.append(&self.to);
		s.append(&self.value);
		s.append(&self.input);
		s.append_list(&self.access_list);
		s.append_list(&self.authorization_list);
		self.signature.append(s);
	}
}

impl Decodable for Eip7702Transaction {
	fn decode(rlp: &Rlp) -> Result<Self, DecoderError> {
		if rlp.item_count()? != 13 {
			return Err(DecoderError::RlpIncorrectListLen);
		}
		Ok(Self {
			chain_id: rlp.val_at(0)?,
			nonce: rlp.val_at(1)?,
			max_priority_fee_per_gas: rlp.val_at(2)?,
			max_fee_per_gas: rlp.val_at(3)?,
			gas_limit: rlp.val_at(4)?,
			to: rlp.val_at(5)?,
			value: rlp.val_at(6)?,
			input: rlp.val_at(7)?,
			access_list: rlp.list_at(8)?,
			authorization_list: rlp.list_at(9)?,
			signature: EcdsaSignature::decode_from(rlp, 10)?,
		})
	}
}

/// A decoded transaction envelope of any supported wire format.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TypedTransaction {
	Legacy(LegacyTransaction),
	Eip2930(Eip2930Transaction),
	Eip1559(Eip1559Transaction),
	Eip4844(Eip4844Transaction),
	Eip7702(Eip7702Transaction),
}

impl TypedTransaction {
	/// Decode a raw envelope. A leading byte above `0x7f` is the start of
	/// a legacy rlp list; anything below is an EIP-2718 type byte.
	pub fn decode(raw: &[u8]) -> Result<Self, TransactionError> {
		let first = *raw.first().ok_or(TransactionError::Empty)?;
		if first > 0x7f {
			return Ok(Self::Legacy(rlp::decode(raw)?));
		}
		let payload = match raw.get(1..) {
			Some(payload) if !payload.is_empty() => payload,
			_ => return Err(TransactionError::Empty),
		};
		match first {
			0x01 => Ok(Self::Eip2930(rlp::decode(payload)?)),
			0x02 => Ok(Self::Eip1559(rlp::decode(payload)?)),
			0x03 => Ok(Self::Eip4844(rlp::decode(payload)?)),
			0x04 => Ok(Self::Eip7702(rlp::decode(payload)?)),
			other => Err(TransactionError::UnknownType(other)),
		}
	}

	/// Re-encode the envelope, type byte included.
	pub fn encode(&self) -> Vec<u8> {
		match self {
			Self::Legacy(tx) => rlp::encode(tx).to_vec(),
			Self::Eip2930(tx) => typed_envelope(0x01, &rlp::encode(tx)),
			Self::Eip1559(tx) => typed_envelope(0x02, &rlp::encode(tx)),
			Self::Eip4844(tx) => typed_envelope(0x03, &rlp::encode(tx)),
			Self::Eip7702(tx) => typed_envelope(0x04, &rlp::encode(tx)),
		}
	}

	/// The transaction hash: keccak of the raw envelope. Derivable before
	/// any submission.
	pub fn hash(&self) -> H256 {
		keccak256(&self.encode())
	}

	pub fn transaction_type(&self) -> u8 {
		match self {
			Self::Legacy(_) => 0,
			Self::Eip2930(_) => 1,
			Self::Eip1559(_) => 2,
			Self::Eip4844(_) => 3,
			Self::Eip7702(_) => 4,
		}
	}

	pub fn chain_id(&self) -> Option<u64> {
		match self {
			Self::Legacy(tx) => tx.chain_id(),
			Self::Eip2930(tx) => Some(tx.chain_id),
			Self::Eip1559(tx) => Some(tx.chain_id),
			Self::Eip4844(tx) => Some(tx.chain_id),
			Self::Eip7702(tx) => Some(tx.chain_id),
		}
	}

	pub fn nonce(&self) -> U256 {
		match self {
			Self::Legacy(tx) => tx.nonce,
			Self::Eip2930(tx) => tx.nonce,
			Self::Eip1559(tx) => tx.nonce,
			Self::Eip4844(tx) => tx.nonce,
			Self::Eip7702(tx) => tx.nonce,
		}
	}

	pub fn gas_limit(&self) -> U256 {
		match self {
			Self::Legacy(tx) => tx.gas_limit,
			Self::Eip2930(tx) => tx.gas_limit,
			Self::Eip1559(tx) => tx.gas_limit,
			Self::Eip4844(tx) => tx.gas_limit,
			Self::Eip7702(tx) => tx.gas_limit,
		}
	}

	/// The fixed gas price of pre-1559 formats.
	pub fn gas_price(&self) -> Option<U256> {
		match self {
			Self::Legacy(tx) => Some(tx.gas_price),
			Self::Eip2930(tx) => Some(tx.gas_price),
			_ => None,
		}
	}

	pub fn max_fee_per_gas(&self) -> Option<U256> {
		match self {
			Self::Eip1559(tx) => Some(tx.max_fee_per_gas),
			Self::Eip4844(tx) => Some(tx.max_fee_per_gas),
			Self::Eip7702(tx) => Some(tx.max_fee_per_gas),
			_ => None,
		}
	}

	pub fn max_priority_fee_per_gas(&self) -> Option<U256> {
		match self {
			Self::Eip1559(tx) => Some(tx.max_priority_fee_per_gas),
			Self::Eip4844(tx) => Some(tx.max_priority_fee_per_gas),
			Self::Eip7702(tx) => Some(tx.max_priority_fee_per_gas),
			_ => None,
		}
	}

	/// The price the sender is offering, regardless of format.
	pub fn effective_offered_gas_price(&self) -> U256 {
		self.gas_price()
			.or_else(|| self.max_fee_per_gas())
			.unwrap_or_default()
	}

	pub fn to(&self) -> Option<H160> {
		match self {
			Self::Legacy(tx) => tx.action.to(),
			Self::Eip2930(tx) => tx.action.to(),
			Self::Eip1559(tx) => tx.action.to(),
			Self::Eip4844(tx) => Some(tx.to),
			Self::Eip7702(tx) => Some(tx.to),
		}
	}

	pub fn value(&self) -> U256 {
		match self {
			Self::Legacy(tx) => tx.value,
			Self::Eip2930(tx) => tx.value,
			Self::Eip1559(tx) => tx.value,
			Self::Eip4844(tx) => tx.value,
			Self::Eip7702(tx) => tx.value,
		}
	}

	pub fn data(&self) -> &[u8] {
		match self {
			Self::Legacy(tx) => &tx.input,
			Self::Eip2930(tx) => &tx.input,
			Self::Eip1559(tx) => &tx.input,
			Self::Eip4844(tx) => &tx.input,
			Self::Eip7702(tx) => &tx.input,
		}
	}

	pub fn access_list(&self) -> &[AccessListItem] {
		match self {
			Self::Legacy(_) => &[],
			Self::Eip2930(tx) => &tx.access_list,
			Self::Eip1559(tx) => &tx.access_list,
			Self::Eip4844(tx) => &tx.access_list,
			Self::Eip7702(tx) => &tx.access_list,
		}
	}

	pub fn signature_v(&self) -> u64 {
		match self {
			Self::Legacy(tx) => tx.v,
			Self::Eip2930(tx) => tx.signature.odd_y_parity as u64,
			Self::Eip1559(tx) => tx.signature.odd_y_parity as u64,
			Self::Eip4844(tx) => tx.signature.odd_y_parity as u64,
			Self::Eip7702(tx) => tx.signature.odd_y_parity as u64,
		}
	}

	pub fn signature_r(&self) -> H256 {
		match self {
			Self::Legacy(tx) => tx.r,
			Self::Eip2930(tx) => tx.signature.r,
			Self::Eip1559(tx) => tx.signature.r,
			Self::Eip4844(tx) => tx.signature.r,
			Self::Eip7702(tx) => tx.signature.r,
		}
	}

	pub fn signature_s(&self) -> H256 {
		match self {
			Self::Legacy(tx) => tx.s,
			Self::Eip2930(tx) => tx.signature.s,
			Self::Eip1559(tx) => tx.signature.s,
			Self::Eip4844(tx) => tx.signature.s,
			Self::Eip7702(tx) => tx.signature.s,
		}
	}

	pub fn signing_hash(&self) -> H256 {
		match self {
			Self::Legacy(tx) => tx.signing_hash(),
			Self::Eip2930(tx) => tx.signing_hash(),
			Self::Eip1559(tx) => tx.signing_hash(),
			Self::Eip4844(tx) => tx.signing_hash(),
			Self::Eip7702(tx) => tx.signing_hash(),
		}
	}

	/// ECDSA-recover the sender from the signature over the variant's
	/// signing hash.
	pub fn recover_sender(&self) -> Result<H160, TransactionError> {
		let recovery_id = match self {
			Self::Legacy(tx) => tx.recovery_id()?,
			_ => self.signature_v() as u8,
		};
		let mut sig = [0u8; 64];
		sig[..32].copy_from_slice(self.signature_r().as_bytes());
		sig[32..].copy_from_slice(self.signature_s().as_bytes());

		let message = libsecp256k1::Message::parse(self.signing_hash().as_fixed_bytes());
		let signature = libsecp256k1::Signature::parse_standard_slice(&sig)?;
		let recovery_id = libsecp256k1::RecoveryId::parse(recovery_id)?;
		let public = libsecp256k1::recover(&message, &signature, &recovery_id)?;

		let mut raw = [0u8; 64];
		raw.copy_from_slice(&public.serialize()[1..65]);
		Ok(public_key_to_address(&raw))
	}
}

fn typed_envelope(type_byte: u8, payload: &[u8]) -> Vec<u8> {
	let mut out = Vec::with_capacity(payload.len() + 1);
	out.push(type_byte);
	out.extend_from_slice(payload);
	out
}

fn typed_hash(type_byte: u8, payload: &[u8]) -> H256 {
	keccak256(&typed_envelope(type_byte, payload))
}

fn u256_to_h256(value: U256) -> H256 {
	let mut out = H256::zero();
	value.to_big_endian(out.as_bytes_mut());
	out
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::keccak256;

	// The worked example from EIP-155: nonce 9, 20 gwei, 21000 gas, value
	// 1 ether, chain id 1, signed with the all-0x46 private key.
	const EIP155_RAW: &str = "f86c098504a817c800825208943535353535353535353535353535353535353535880de0b6b3a76400008025a028ef61340bd939bc2195fe537567866003e1a15d3c71ff63e1590620aa636276a067cbe9d8997f761aecb703304b3800ccf555c9f3dc64214b297fb1966a3b6d83";

	fn sign(secret: &[u8; 32], hash: H256) -> (bool, H256, H256) {
		let secret = libsecp256k1::SecretKey::parse(secret).unwrap();
		let message = libsecp256k1::Message::parse(hash.as_fixed_bytes());
		let (signature, recovery_id) = libsecp256k1::sign(&message, &secret);
		let serialized = signature.serialize();
		(
			recovery_id.serialize() != 0,
			H256::from_slice(&serialized[..32]),
			H256::from_slice(&serialized[32..]),
		)
	}

	fn address_of(secret: &[u8; 32]) -> H160 {
		let secret = libsecp256k1::SecretKey::parse(secret).unwrap();
		let public = libsecp256k1::PublicKey::from_secret_key(&secret);
		let mut raw = [0u8; 64];
		raw.copy_from_slice(&public.serialize()[1..65]);
		public_key_to_address(&raw)
	}

	#[test]
	fn decodes_the_eip155_example() {
		let raw = hex::decode(EIP155_RAW).unwrap();
		let tx = TypedTransaction::decode(&raw).unwrap();

		assert_eq!(tx.transaction_type(), 0);
		assert_eq!(tx.chain_id(), Some(1));
		assert_eq!(tx.nonce(), U256::from(9));
		assert_eq!(tx.gas_price(), Some(U256::from(20_000_000_000u64)));
		assert_eq!(tx.gas_limit(), U256::from(21_000));
		assert_eq!(
			tx.to(),
			Some(H160::from_slice(&[0x35u8; 20])),
		);
		assert_eq!(tx.value(), U256::from(1_000_000_000_000_000_000u64));
		assert_eq!(
			tx.recover_sender().unwrap(),
			"9d8a62f656a8d1615c1294fd71e9cfb3e4855a4f".parse().unwrap(),
		);
	}

	#[test]
	fn envelope_reencodes_byte_for_byte_and_hashes_the_raw_bytes() {
		let raw = hex::decode(EIP155_RAW).unwrap();
		let tx = TypedTransaction::decode(&raw).unwrap();
		assert_eq!(tx.encode(), raw);
		assert_eq!(tx.hash(), keccak256(&raw));
	}

	#[test]
	fn recovers_sender_of_a_self_signed_eip1559_envelope() {
		let secret = [0x11u8; 32];
		let mut tx = Eip1559Transaction {
			chain_id: 0x12a,
			nonce: U256::from(7),
			max_priority_fee_per_gas: U256::from(1_000_000u64),
			max_fee_per_gas: U256::from(500_000_000_000u64),
			gas_limit: U256::from(100_000),
			action: TransactionAction::Call(H160::repeat_byte(0xab)),
			value: U256::zero(),
			input: vec![0xde, 0xad, 0xbe, 0xef],
			access_list: vec![AccessListItem {
				address: H160::repeat_byte(0x01),
				storage_keys: vec![H256::repeat_byte(0x02)],
			}],
			signature: EcdsaSignature {
				odd_y_parity: false,
				r: H256::zero(),
				s: H256::zero(),
			},
		};
		let (odd, r, s) = sign(&secret, tx.signing_hash());
		tx.signature = EcdsaSignature {
			odd_y_parity: odd,
			r,
			s,
		};
		let tx = TypedTransaction::Eip1559(tx);

		let reparsed = TypedTransaction::decode(&tx.encode()).unwrap();
		similar_asserts::assert_eq!(reparsed, tx);
		assert_eq!(reparsed.recover_sender().unwrap(), address_of(&secret));
	}

	#[test]
	fn recovers_sender_of_a_pre_eip155_legacy_envelope() {
		let secret = [0x22u8; 32];
		let mut tx = LegacyTransaction {
			nonce: U256::zero(),
			gas_price: U256::from(710_000_000_000u64),
			gas_limit: U256::from(21_000),
			action: TransactionAction::Create,
			value: U256::zero(),
			input: vec![],
			v: 27,
			r: H256::zero(),
			s: H256::zero(),
		};
		let (odd, r, s) = sign(&secret, tx.signing_hash());
		tx.v = 27 + odd as u64;
		tx.r = r;
		tx.s = s;

		assert_eq!(tx.chain_id(), None);
		let tx = TypedTransaction::Legacy(tx);
		assert_eq!(tx.recover_sender().unwrap(), address_of(&secret));
	}

	#[test]
	fn rejects_unknown_type_bytes_and_empty_payloads() {
		assert!(matches!(
			TypedTransaction::decode(&[]),
			Err(TransactionError::Empty)
		));
		assert!(matches!(
			TypedTransaction::decode(&[0x05, 0xc0]),
			Err(TransactionError::UnknownType(0x05))
		));
		assert!(matches!(
			TypedTransaction::decode(&[0x02]),
			Err(TransactionError::Empty)
		));
	}

	#[test]
	fn blob_envelopes_decode_far_enough_to_be_identified() {
		let tx = Eip4844Transaction {
			chain_id: 0x12a,
			nonce: U256::one(),
			max_priority_fee_per_gas: U256::one(),
			max_fee_per_gas: U256::from(2),
			gas_limit: U256::from(21_000),
			to: H160::repeat_byte(0x44),
			value: U256::zero(),
			input: vec![],
			access_list: vec![],
			max_fee_per_blob_gas: U256::one(),
			blob_versioned_hashes: vec![H256::repeat_byte(0x99)],
			signature: EcdsaSignature {
				odd_y_parity: false,
				r: H256::repeat_byte(0x01),
				s: H256::repeat_byte(0x01),
			},
		};
		let raw = TypedTransaction::Eip4844(tx).encode();
		let parsed = TypedTransaction::decode(&raw).unwrap();
		assert_eq!(parsed.transaction_type(), 3);
	}
}
