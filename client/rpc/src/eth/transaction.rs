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

//! Transaction lookups. A hash that has no contract result may still
//! name a backend operation that only surfaced as logs; those are served
//! as synthesized transactions and receipts.

use ethereum_types::{H160, H256, U256};
use jsonrpsee::core::RpcResult;

use hc_mirror::LogQuery;
use hc_rpc_core::types::{BlockNumber, Receipt, RequestContext, Transaction};

use crate::{format::h256_from_long_hex, mirror_err};

use super::{
	block_worker::{
		contract_result_to_transaction, regular_receipt, resolve_contract_result_addresses,
		synthetic_receipt, synthetic_transaction,
	},
	Eth,
};

impl Eth {
	pub(crate) async fn transaction_by_hash_impl(
		&self,
		hash: H256,
		ctx: &RequestContext,
	) -> RpcResult<Option<Transaction>> {
		let hash_hex = format!("0x{:x}", hash);
		let result = self
			.mirror
			.get_contract_result(&hash_hex)
			.await
			.map_err(mirror_err)?;

		if let Some(result) = result {
			if result.is_reverted_due_to_hedera_specific_validation() {
				return Ok(None);
			}
			if result.hash.is_some() {
				let (from, to) =
					resolve_contract_result_addresses(self.mirror.as_ref(), &result).await;
				return Ok(contract_result_to_transaction(
					self.config.chain_id,
					&result,
					from,
					to,
				));
			}
		}

		// No contract result: the hash may name a log-only operation.
		log::debug!(target: "rpc", "{} no contract result for {}, trying logs", ctx, hash_hex);
		let logs = self
			.mirror
			.get_logs(&LogQuery {
				transaction_hash: Some(hash_hex),
				..LogQuery::default()
			})
			.await
			.map_err(mirror_err)?;
		let log = match logs.first() {
			Some(log) => log,
			None => return Ok(None),
		};
		let block_hash = log
			.block_hash
			.as_deref()
			.and_then(h256_from_long_hex)
			.unwrap_or_default();
		let index = log.transaction_index.unwrap_or_default().max(0) as usize;
		Ok(Some(synthetic_transaction(
			self.config.chain_id,
			log,
			hash,
			block_hash,
			log.block_number.unwrap_or_default(),
			index,
		)))
	}

	pub(crate) async fn transaction_receipt_impl(
		&self,
		hash: H256,
		ctx: &RequestContext,
	) -> RpcResult<Option<Receipt>> {
		let hash_hex = format!("0x{:x}", hash);
		let result = self
			.mirror
			.get_contract_result(&hash_hex)
			.await
			.map_err(mirror_err)?;

		if let Some(result) = result {
			if result.is_reverted_due_to_hedera_specific_validation() {
				return Ok(None);
			}
			if result.hash.is_some() && result.block_number.is_some() {
				let (from, to) =
					resolve_contract_result_addresses(self.mirror.as_ref(), &result).await;
				let block_hash = result
					.block_hash
					.as_deref()
					.and_then(h256_from_long_hex)
					.unwrap_or_default();
				let effective_gas_price = self.gas_price_weibars(ctx).await.unwrap_or_default();
				return Ok(Some(regular_receipt(
					&result,
					from,
					to,
					block_hash,
					result.block_number.unwrap_or_default(),
					effective_gas_price,
				)));
			}
		}

		let logs = self
			.mirror
			.get_logs(&LogQuery {
				transaction_hash: Some(hash_hex),
				..LogQuery::default()
			})
			.await
			.map_err(mirror_err)?;
		if logs.is_empty() {
			return Ok(None);
		}
		let group: Vec<&hc_mirror::MirrorLog> = logs.iter().collect();
		let block_hash = group
			.first()
			.and_then(|log| log.block_hash.as_deref())
			.and_then(h256_from_long_hex)
			.unwrap_or_default();
		let block_number = group
			.first()
			.and_then(|log| log.block_number)
			.unwrap_or_default();
		Ok(Some(synthetic_receipt(&group, hash, block_hash, block_number)))
	}

	pub(crate) async fn transaction_count_impl(
		&self,
		address: H160,
		number: Option<BlockNumber>,
		_ctx: &RequestContext,
	) -> RpcResult<U256> {
		if matches!(number, Some(BlockNumber::Earliest)) {
			return Ok(U256::zero());
		}
		let account = self
			.mirror
			.get_account(&format!("0x{:x}", address))
			.await
			.map_err(mirror_err)?;
		let nonce = account.map(|account| account.ethereum_nonce).unwrap_or(0);
		if matches!(number, Some(BlockNumber::Pending)) {
			// In-flight submissions advance the pending nonce before the
			// mirror node sees them.
			return Ok(U256::from(nonce + self.pool.pending_count(address).await));
		}
		Ok(U256::from(nonce))
	}
}
