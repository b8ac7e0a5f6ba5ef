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

use std::sync::Arc;

use ethereum_types::H256;
use jsonrpsee::core::{async_trait, RpcResult};

use hc_rpc_core::{
	types::{Bytes, RequestContext},
	Web3ApiServer,
};
use hc_store::RateLimiter;
use hp_ethereum::keccak256;

use crate::guard_request;

#[derive(Clone)]
pub struct Web3 {
	client_version: String,
	rate_limiter: Arc<RateLimiter>,
	client_ip: Option<String>,
}

impl Web3 {
	pub fn new(client_version: String, rate_limiter: Arc<RateLimiter>) -> Self {
		Self {
			client_version,
			rate_limiter,
			client_ip: None,
		}
	}

	/// Bind a clone of the service to one client connection.
	pub fn for_client(&self, ip_address: impl Into<String>) -> Self {
		let mut bound = self.clone();
		bound.client_ip = Some(ip_address.into());
		bound
	}

	async fn guard(&self, method: &'static str) -> RpcResult<()> {
		let ctx = RequestContext::new(
			self.client_ip.clone().unwrap_or_else(|| "unknown".to_owned()),
			None,
		);
		guard_request(&self.rate_limiter, ctx, method).await.map(|_| ())
	}
}

#[async_trait]
impl Web3ApiServer for Web3 {
	async fn client_version(&self) -> RpcResult<String> {
		self.guard("web3_clientVersion").await?;
		Ok(self.client_version.clone())
	}

	async fn sha3(&self, input: Bytes) -> RpcResult<H256> {
		self.guard("web3_sha3").await?;
		Ok(keccak256(input.as_ref()))
	}
}
