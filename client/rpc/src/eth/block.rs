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

//! Block endpoints. Assembly is delegated to the worker so the request
//! path never iterates hundreds of contract results itself.

use ethereum_types::U256;
use jsonrpsee::core::RpcResult;

use hc_rpc_core::types::{Index, Receipt, RichBlock, Transaction};

use crate::mirror_err;

use super::{block_worker::resolve_contract_result_addresses, Eth};

impl Eth {
	pub(crate) async fn get_block_impl(
		&self,
		hash_or_number: String,
		show_details: bool,
	) -> RpcResult<Option<RichBlock>> {
		self.block_worker.get_block(hash_or_number, show_details).await
	}

	pub(crate) async fn get_block_receipts_impl(
		&self,
		hash_or_number: String,
	) -> RpcResult<Option<Vec<Receipt>>> {
		self.block_worker.get_block_receipts(hash_or_number).await
	}

	pub(crate) async fn block_transaction_count_impl(
		&self,
		hash_or_number: String,
	) -> RpcResult<Option<U256>> {
		let block = self
			.mirror
			.get_block(&hash_or_number)
			.await
			.map_err(mirror_err)?;
		Ok(block.map(|block| U256::from(block.count)))
	}

	pub(crate) async fn transaction_by_block_and_index_impl(
		&self,
		hash_or_number: String,
		index: Index,
	) -> RpcResult<Option<Transaction>> {
		let block = match self
			.mirror
			.get_block(&hash_or_number)
			.await
			.map_err(mirror_err)?
		{
			Some(block) => block,
			None => return Ok(None),
		};
		let results = self
			.mirror
			.get_contract_results_in_range(
				&block.timestamp.from,
				&block.timestamp.to,
				Some(index.value() as i64),
			)
			.await
			.map_err(mirror_err)?;

		let result = match results
			.into_iter()
			.find(|result| !result.is_reverted_due_to_hedera_specific_validation())
		{
			Some(result) => result,
			None => return Ok(None),
		};
		let (from, to) = resolve_contract_result_addresses(self.mirror.as_ref(), &result).await;
		Ok(super::block_worker::contract_result_to_transaction(
			self.config.chain_id,
			&result,
			from,
			to,
		))
	}
}
