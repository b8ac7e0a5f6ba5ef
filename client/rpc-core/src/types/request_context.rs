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

/// Per-request context threaded through every operation for logging.
/// Immutable once built by the transport layer.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RequestContext {
	pub request_id: String,
	pub connection_id: Option<String>,
	pub ip_address: String,
}

impl RequestContext {
	pub fn new(ip_address: impl Into<String>, connection_id: Option<String>) -> Self {
		Self {
			request_id: new_request_id(),
			connection_id,
			ip_address: ip_address.into(),
		}
	}
}

impl fmt::Display for RequestContext {
	fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
		match &self.connection_id {
			Some(connection_id) => {
				write!(f, "[Request ID: {}, Connection ID: {}]", self.request_id, connection_id)
			}
			None => write!(f, "[Request ID: {}]", self.request_id),
		}
	}
}

fn new_request_id() -> String {
	let bytes = rand::random::<[u8; 16]>();
	format!(
		"{}-{}-{}-{}-{}",
		hex::encode(&bytes[0..4]),
		hex::encode(&bytes[4..6]),
		hex::encode(&bytes[6..8]),
		hex::encode(&bytes[8..10]),
		hex::encode(&bytes[10..16]),
	)
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn request_ids_are_uuid_shaped_and_unique() {
		let a = RequestContext::new("127.0.0.1", None);
		let b = RequestContext::new("127.0.0.1", None);
		assert_ne!(a.request_id, b.request_id);
		assert_eq!(a.request_id.len(), 36);
		assert_eq!(a.request_id.matches('-').count(), 4);
		assert!(a.to_string().starts_with("[Request ID: "));
	}
}
