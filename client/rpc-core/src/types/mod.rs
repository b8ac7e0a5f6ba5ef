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

//! RPC wire types.

mod block;
mod block_number;
mod bytes;
mod call_request;
mod filter;
mod index;
mod log;
mod receipt;
mod request_context;
mod transaction;

pub use block::{BlockTransactions, RichBlock};
pub use block_number::BlockNumber;
pub use bytes::Bytes;
pub use call_request::CallRequest;
pub use filter::{Filter, FilterChanges, VariadicValue};
pub use index::Index;
pub use log::Log;
pub use receipt::Receipt;
pub use request_context::RequestContext;
pub use transaction::{Transaction, TransactionRequest};
