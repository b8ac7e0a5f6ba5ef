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

use crate::proto::ResponseCode;

/// Render a raw response code the way the network names it
/// (`WRONG_NONCE`, `INSUFFICIENT_PAYER_BALANCE`, ...).
pub fn response_code_name(code: i32) -> String {
	match ResponseCode::try_from(code) {
		Ok(known) => {
			let label = format!("{:?}", known);
			let mut out = String::with_capacity(label.len() + 8);
			for (index, ch) in label.chars().enumerate() {
				if ch.is_ascii_uppercase() && index > 0 {
					out.push('_');
				}
				out.push(ch.to_ascii_uppercase());
			}
			out
		}
		Err(_) => format!("UNKNOWN_{}", code),
	}
}

fn code_name(code: &i32) -> String {
	response_code_name(*code)
}

#[derive(Clone, Debug, thiserror::Error)]
pub enum SdkClientError {
	#[error("consensus node transport failure: {0}")]
	Transport(String),
	#[error("consensus node deadline exceeded")]
	Timeout,
	#[error("transaction rejected at precheck: {}", code_name(.code))]
	Precheck { code: i32 },
	#[error("transaction executed with status {}", code_name(.code))]
	Receipt { code: i32 },
	#[error("call data spans {chunks} chunks, exceeding the {max} chunk limit")]
	FileTooLarge { chunks: usize, max: usize },
	#[error("malformed consensus response: missing {0}")]
	MissingField(&'static str),
	#[error("operator key is not a valid ECDSA secp256k1 secret")]
	InvalidOperatorKey,
}

impl SdkClientError {
	pub fn response_code(&self) -> Option<ResponseCode> {
		match self {
			Self::Precheck { code } | Self::Receipt { code } => ResponseCode::try_from(*code).ok(),
			_ => None,
		}
	}

	pub fn status_name(&self) -> Option<String> {
		match self {
			Self::Precheck { code } | Self::Receipt { code } => Some(response_code_name(*code)),
			_ => None,
		}
	}

	pub fn is_wrong_nonce(&self) -> bool {
		self.response_code() == Some(ResponseCode::WrongNonce)
	}

	/// The transaction did execute; its record carries the Ethereum-shaped
	/// hash and the mirror node has the final word.
	pub fn is_post_execution(&self) -> bool {
		matches!(self, Self::Receipt { .. })
	}

	/// Pre-execution rejection by the consensus node.
	pub fn is_pre_execution_reject(&self) -> bool {
		matches!(self, Self::Precheck { .. })
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn code_names_match_network_spelling() {
		assert_eq!(response_code_name(330), "WRONG_NONCE");
		assert_eq!(response_code_name(10), "INSUFFICIENT_PAYER_BALANCE");
		assert_eq!(response_code_name(33), "CONTRACT_REVERT_EXECUTED");
		assert_eq!(response_code_name(424242), "UNKNOWN_424242");
	}

	#[test]
	fn classification_splits_pre_and_post_execution() {
		let precheck = SdkClientError::Precheck { code: 330 };
		assert!(precheck.is_wrong_nonce());
		assert!(precheck.is_pre_execution_reject());
		assert!(!precheck.is_post_execution());

		let receipt = SdkClientError::Receipt { code: 33 };
		assert!(receipt.is_post_execution());
		assert_eq!(
			receipt.response_code(),
			Some(ResponseCode::ContractRevertExecuted)
		);
	}
}
