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

//! Net rpc interface.

use jsonrpsee::{core::RpcResult, proc_macros::rpc};

/// Net rpc interface.
#[rpc(server)]
pub trait NetApi {
	/// Returns the chain id in decimal, for protocol version queries.
	#[method(name = "net_version")]
	async fn version(&self) -> RpcResult<String>;

	/// Returns true: the relay front-end is accepting connections.
	#[method(name = "net_listening")]
	async fn is_listening(&self) -> RpcResult<bool>;

	/// Returns the number of connected peers: the relay has none.
	#[method(name = "net_peerCount")]
	async fn peer_count(&self) -> RpcResult<String>;
}
