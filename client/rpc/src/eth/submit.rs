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

//! The submission pipeline of `eth_sendRawTransaction`: parse, precheck,
//! per-sender ordering lock, optional file-service upload for oversized
//! call data, consensus submission, and asynchronous reconciliation
//! against the mirror node. The sender lock is released on every exit
//! path; its TTL is the safety net.

use std::time::Duration;

use ethereum_types::{H160, H256};
use jsonrpsee::{core::RpcResult, types::ErrorObjectOwned};

use hc_rpc_core::types::{Bytes, RequestContext};
use hc_sdk::{transaction_id_to_mirror_format, FileId, SdkClientError, TransactionId};
use hp_ethereum::{TransactionError, TypedTransaction};

use crate::{internal_err, predefined};

use super::Eth;

// USD cents charged by the file service per create or append.
const FILE_OP_USD_CENTS: u64 = 5;
const TINYBARS_PER_HBAR: u64 = 100_000_000;

/// Pre-estimate of the file-service fees for an oversized payload, in
/// tinybars, from the hex length and the current exchange rate.
pub(crate) fn estimate_file_transaction_fee_tinybars(
	call_data_hex_len: usize,
	chunk_size: usize,
	cents_per_hbar: (u64, u64),
) -> u64 {
	let (cents, hbars) = cents_per_hbar;
	let operations = 1 + call_data_hex_len.div_ceil(chunk_size.max(1)) as u64;
	let tinybars_per_cent = hbars.max(1) * TINYBARS_PER_HBAR / cents.max(1);
	operations * FILE_OP_USD_CENTS * tinybars_per_cent
}

/// Re-encode the envelope with its call data removed; the file id
/// carries the payload instead.
fn strip_call_data(tx: &TypedTransaction) -> Vec<u8> {
	let mut stripped = tx.clone();
	match &mut stripped {
		TypedTransaction::Legacy(tx) => tx.input = Vec::new(),
		TypedTransaction::Eip2930(tx) => tx.input = Vec::new(),
		TypedTransaction::Eip1559(tx) => tx.input = Vec::new(),
		TypedTransaction::Eip4844(tx) => tx.input = Vec::new(),
		TypedTransaction::Eip7702(tx) => tx.input = Vec::new(),
	}
	stripped.encode()
}

impl Eth {
	pub(crate) async fn send_raw_transaction_impl(
		&self,
		bytes: Bytes,
		ctx: &RequestContext,
	) -> RpcResult<H256> {
		let raw = bytes.into_vec();

		// S1: parse and recover the sender from the signature.
		let tx = TypedTransaction::decode(&raw).map_err(|err| match err {
			TransactionError::UnknownType(transaction_type) => {
				predefined::unsupported_transaction_type(transaction_type)
			}
			other => predefined::parse_error(other),
		})?;
		let hash = tx.hash();
		let sender = tx
			.recover_sender()
			.map_err(|err| predefined::parse_error(err))?;
		let nonce = tx.nonce().low_u64();
		self.pool.add(sender, nonce, hash).await;

		// S2: serialize against other submissions from the same sender.
		let sender_hex = format!("0x{:x}", sender);
		let session = self.lock.acquire_lock(&sender_hex).await;
		if session.is_none() {
			log::warn!(
				target: "rpc",
				"{} proceeding without sender lock for {}; nonce races possible",
				ctx,
				sender_hex,
			);
		}

		// S3: current network price, then the full precheck ladder.
		let prepared = async {
			let network_gas_price = self.gas_price_tinybars(ctx).await?;
			self.precheck_transaction(&tx, &raw, sender, network_gas_price, ctx)
				.await?;
			Ok::<_, ErrorObjectOwned>(network_gas_price)
		}
		.await;
		let network_gas_price = match prepared {
			Ok(network_gas_price) => network_gas_price,
			Err(err) => {
				self.finish_submission(sender, nonce, &sender_hex, session).await;
				return Err(err);
			}
		};

		if self.config.use_async_tx_processing {
			// S4 is terminal for the caller; the rest of the pipeline is
			// detached and observable only via logs and receipts.
			let this = self.clone();
			let ctx = ctx.clone();
			tokio::spawn(async move {
				let sender_hex = format!("0x{:x}", sender);
				if let Err(err) = this
					.submit_and_reconcile(&tx, &raw, sender, nonce, &sender_hex, session, network_gas_price, &ctx)
					.await
				{
					log::warn!(
						target: "rpc",
						"{} detached submission {:x} failed: {}",
						ctx,
						hash,
						err.message(),
					);
				}
			});
			return Ok(hash);
		}

		self.submit_and_reconcile(
			&tx,
			&raw,
			sender,
			nonce,
			&sender_hex,
			session,
			network_gas_price,
			ctx,
		)
		.await
	}

	/// Steps S4 through S7: submit, release the lock, classify, and let
	/// the mirror node have the final word.
	#[allow(clippy::too_many_arguments)]
	async fn submit_and_reconcile(
		&self,
		tx: &TypedTransaction,
		raw: &[u8],
		sender: H160,
		nonce: u64,
		sender_hex: &str,
		session: Option<String>,
		network_gas_price_tinybars: u64,
		ctx: &RequestContext,
	) -> RpcResult<H256> {
		let submission = self
			.submit_to_consensus(tx, raw, sender, network_gas_price_tinybars, ctx)
			.await;
		// The consensus node has the transaction (or definitively refused
		// it); later submissions from this sender may proceed.
		self.finish_submission(sender, nonce, sender_hex, session).await;

		let (transaction_id, submit_error) = submission?;
		self.classify_and_reconcile(transaction_id, submit_error, tx, sender, ctx)
			.await
	}

	async fn finish_submission(
		&self,
		sender: H160,
		nonce: u64,
		sender_hex: &str,
		session: Option<String>,
	) {
		if let Some(session) = session {
			self.lock.release_lock(sender_hex, &session).await;
		}
		self.pool.remove(sender, nonce).await;
	}

	/// S4: inline submission, or the file-service sequence for oversized
	/// call data. The created file is deleted in a detached stage no
	/// matter how submission went.
	async fn submit_to_consensus(
		&self,
		tx: &TypedTransaction,
		raw: &[u8],
		sender: H160,
		network_gas_price_tinybars: u64,
		ctx: &RequestContext,
	) -> RpcResult<(Option<TransactionId>, Option<SdkClientError>)> {
		let use_file = tx.data().len() > self.config.file_append_chunk_size
			&& !self.config.jumbo_tx_enabled;

		let (ethereum_data, call_data_file) = if use_file {
			let file_id = self
				.upload_call_data(tx, sender, ctx)
				.await?;
			(strip_call_data(tx), Some(file_id))
		} else {
			(raw.to_vec(), None)
		};

		let max_fee_tinybars =
			network_gas_price_tinybars.saturating_mul(self.config.max_transaction_fee_threshold);
		let max_gas_allowance = if self.config.is_paymaster_recipient(tx.to()) {
			self.config.paymaster_max_gas_allowance_tinybars
		} else {
			0
		};

		let result = self
			.consensus
			.submit_ethereum_transaction(
				ethereum_data,
				call_data_file,
				max_gas_allowance,
				max_fee_tinybars,
			)
			.await;

		if let Some(file_id) = call_data_file {
			self.schedule_file_delete(file_id, ctx);
		}

		if let (Some(transaction_id), None) = (&result.transaction_id, &result.error) {
			if let Ok(record) = self.consensus.get_transaction_record(transaction_id).await {
				self.hbar_limit
					.add_expense(
						&format!("0x{:x}", sender),
						&ctx.ip_address,
						"eth_sendRawTransaction",
						record.transaction_fee_tinybars,
					)
					.await;
			}
		}

		Ok((result.transaction_id, result.error))
	}

	/// The HFS sequence: governor pre-check, create with the first
	/// chunk, append the rest, verify the file landed non-empty.
	async fn upload_call_data(
		&self,
		tx: &TypedTransaction,
		sender: H160,
		ctx: &RequestContext,
	) -> RpcResult<FileId> {
		let data = tx.data();
		let chunk_size = self.config.file_append_chunk_size.max(1);

		let rate = self.exchange_rate_cents_per_hbar(ctx).await?;
		let estimated_fee =
			estimate_file_transaction_fee_tinybars(data.len() * 2, chunk_size, rate);
		if self
			.hbar_limit
			.should_limit(
				"preemptive",
				"eth_sendRawTransaction",
				&format!("0x{:x}", sender),
				&ctx.ip_address,
				&ctx.request_id,
				estimated_fee,
			)
			.await
		{
			return Err(predefined::hbar_rate_limit_exceeded());
		}

		let first = data[..chunk_size.min(data.len())].to_vec();
		let rest = data[chunk_size.min(data.len())..].to_vec();

		let file_id = self
			.consensus
			.create_file(first)
			.await
			.map_err(|err| internal_err(format!("call data upload failed: {}", err)))?;

		let upload = async {
			if !rest.is_empty() {
				self.consensus
					.append_file(file_id, rest)
					.await
					.map_err(|err| internal_err(format!("call data append failed: {}", err)))?;
			}
			let info = self
				.consensus
				.get_file_info(file_id)
				.await
				.map_err(|err| internal_err(format!("call data verification failed: {}", err)))?;
			if info.size <= 0 || info.deleted {
				return Err(internal_err("uploaded call data file is empty"));
			}
			Ok(())
		}
		.await;

		if let Err(err) = upload {
			self.schedule_file_delete(file_id, ctx);
			return Err(err);
		}
		Ok(file_id)
	}

	/// Best-effort, detached from the request lifetime. Failures are
	/// logged; the file expiry is the backstop.
	fn schedule_file_delete(&self, file_id: FileId, ctx: &RequestContext) {
		let consensus = self.consensus.clone();
		let request_id = ctx.request_id.clone();
		tokio::spawn(async move {
			if let Err(err) = consensus.delete_file(file_id).await {
				log::warn!(
					target: "rpc",
					"[Request ID: {}] failed to delete call data file {}.{}.{}: {}",
					request_id,
					file_id.shard_num,
					file_id.realm_num,
					file_id.file_num,
					err,
				);
			}
		});
	}

	/// S5/S6: three-way classification of the submission outcome, then
	/// bounded polling of the mirror node for the materialized record.
	async fn classify_and_reconcile(
		&self,
		transaction_id: Option<TransactionId>,
		submit_error: Option<SdkClientError>,
		tx: &TypedTransaction,
		sender: H160,
		ctx: &RequestContext,
	) -> RpcResult<H256> {
		if let Some(error) = &submit_error {
			if !error.is_post_execution() {
				if error.is_wrong_nonce() {
					return Err(self.disambiguate_wrong_nonce(tx, sender, ctx).await);
				}
				if error.is_pre_execution_reject() {
					let status = error.status_name().unwrap_or_default();
					return Err(predefined::transaction_rejected(&status, &error.to_string()));
				}
				return Err(match error {
					SdkClientError::Timeout => predefined::request_timeout(),
					other => internal_err(other),
				});
			}
			// Post-execution failures executed on chain; the mirror node
			// carries their Ethereum-shaped record.
			log::debug!(
				target: "rpc",
				"{} submission executed with status {:?}, reconciling via mirror node",
				ctx,
				error.status_name(),
			);
		}

		let transaction_id = transaction_id
			.ok_or_else(|| internal_err("submission yielded no transaction id"))?;
		let formatted = transaction_id_to_mirror_format(&transaction_id);

		for attempt in 0..self.config.mirror_poll_count {
			match self.mirror.get_contract_result(&formatted).await {
				Ok(Some(result)) => {
					if let Some(hash) = result
						.hash
						.as_deref()
						.and_then(crate::format::h256_from_hex)
					{
						return Ok(hash);
					}
				}
				Ok(None) => {}
				Err(err) if err.is_not_found() => {}
				Err(err) => {
					log::debug!(
						target: "rpc",
						"{} reconcile poll {} failed: {}",
						ctx,
						attempt,
						err,
					);
				}
			}
			let backoff = self.config.mirror_poll_delay_ms << attempt.min(5);
			tokio::time::sleep(Duration::from_millis(backoff)).await;
		}

		match submit_error {
			Some(error) => {
				let status = error.status_name().unwrap_or_default();
				Err(predefined::transaction_rejected(&status, &error.to_string()))
			}
			None => Err(internal_err(
				"transaction record not available from the mirror node",
			)),
		}
	}

	/// A consensus `WRONG_NONCE` is turned into the specific client error
	/// by comparing against the mirror-node account state.
	async fn disambiguate_wrong_nonce(
		&self,
		tx: &TypedTransaction,
		sender: H160,
		_ctx: &RequestContext,
	) -> ErrorObjectOwned {
		let tx_nonce = tx.nonce().low_u64();
		match self.mirror.get_account(&format!("0x{:x}", sender)).await {
			Ok(Some(account)) if account.ethereum_nonce > tx_nonce => {
				predefined::nonce_too_low(tx_nonce, account.ethereum_nonce)
			}
			Ok(Some(account)) => predefined::nonce_too_high(tx_nonce, account.ethereum_nonce),
			Ok(None) => predefined::nonce_too_high(tx_nonce, 0),
			Err(err) => {
				log::warn!(target: "rpc", "nonce disambiguation failed: {}", err);
				predefined::transaction_rejected("WRONG_NONCE", "wrong nonce")
			}
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use hp_ethereum::{LegacyTransaction, TransactionAction};

	#[test]
	fn file_fee_estimate_scales_with_chunk_count() {
		// 1 hbar == 20 cents: 5 cents is a quarter hbar.
		let rate = (20, 1);
		let one_op = estimate_file_transaction_fee_tinybars(1, 5_120, rate);
		assert_eq!(one_op, 2 * 5 * (100_000_000 / 20));

		let many = estimate_file_transaction_fee_tinybars(10 * 5_120, 5_120, rate);
		assert_eq!(many, 11 * 5 * (100_000_000 / 20));
	}

	#[test]
	fn stripping_call_data_keeps_the_rest_of_the_envelope() {
		let tx = TypedTransaction::Legacy(LegacyTransaction {
			nonce: 7.into(),
			gas_price: 100.into(),
			gas_limit: 21_000.into(),
			action: TransactionAction::Call(H160::repeat_byte(0x42)),
			value: 0.into(),
			input: vec![0xde; 6_000],
			v: 37,
			r: H256::repeat_byte(1),
			s: H256::repeat_byte(1),
		});
		let stripped = TypedTransaction::decode(&strip_call_data(&tx)).unwrap();
		assert!(stripped.data().is_empty());
		assert_eq!(stripped.nonce(), tx.nonce());
		assert_eq!(stripped.to(), tx.to());
		assert_ne!(stripped.hash(), tx.hash());
	}
}
