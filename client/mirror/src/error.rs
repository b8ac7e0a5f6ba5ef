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

use serde::Deserialize;

/// Error body the mirror node attaches to non-2xx responses:
/// `{"_status": {"messages": [{"message", "detail", "data"}]}}`.
#[derive(Clone, Debug, Default, Deserialize)]
pub struct MirrorErrorBody {
	#[serde(default, rename = "_status")]
	pub status: MirrorErrorStatus,
}

#[derive(Clone, Debug, Default, Deserialize)]
pub struct MirrorErrorStatus {
	#[serde(default)]
	pub messages: Vec<MirrorErrorMessage>,
}

#[derive(Clone, Debug, Default, Deserialize)]
pub struct MirrorErrorMessage {
	#[serde(default)]
	pub message: String,
	pub detail: Option<String>,
	pub data: Option<String>,
}

#[derive(Debug, thiserror::Error)]
pub enum MirrorNodeClientError {
	#[error("mirror node returned {status}: {message}")]
	Upstream {
		status: u16,
		message: String,
		detail: Option<String>,
		data: Option<String>,
	},
	#[error("mirror node transport error: {0}")]
	Transport(#[from] reqwest::Error),
}

impl MirrorNodeClientError {
	pub fn from_body(status: u16, body: MirrorErrorBody) -> Self {
		let first = body.status.messages.into_iter().next().unwrap_or_default();
		Self::Upstream {
			status,
			message: first.message,
			detail: first.detail,
			data: first.data,
		}
	}

	pub fn status(&self) -> Option<u16> {
		match self {
			Self::Upstream { status, .. } => Some(*status),
			Self::Transport(err) => err.status().map(|status| status.as_u16()),
		}
	}

	pub fn message(&self) -> &str {
		match self {
			Self::Upstream { message, .. } => message,
			Self::Transport(_) => "",
		}
	}

	pub fn detail(&self) -> Option<&str> {
		match self {
			Self::Upstream { detail, .. } => detail.as_deref(),
			Self::Transport(_) => None,
		}
	}

	pub fn data(&self) -> Option<&str> {
		match self {
			Self::Upstream { data, .. } => data.as_deref(),
			Self::Transport(_) => None,
		}
	}

	pub fn is_not_found(&self) -> bool {
		self.status() == Some(404)
	}

	pub fn is_contract_revert(&self) -> bool {
		self.message() == "CONTRACT_REVERT_EXECUTED"
	}

	pub fn is_fail_invalid(&self) -> bool {
		self.message() == "FAIL_INVALID"
	}

	pub fn is_invalid_transaction(&self) -> bool {
		self.message() == "INVALID_TRANSACTION"
	}

	/// Worth another attempt: transport failures and server-side errors.
	pub fn is_retriable(&self) -> bool {
		match self.status() {
			Some(status) => status >= 500,
			None => true,
		}
	}
}
