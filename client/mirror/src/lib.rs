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

//! HTTP client for the mirror node, the read path of the relay. Serves
//! historical blocks, contract results, logs, accounts, fees and state
//! slots, with bounded retry on transient upstream failures. 404s are
//! lookups that found nothing, not errors.

mod error;
mod types;

pub use error::{MirrorErrorBody, MirrorNodeClientError};
pub use types::*;

use std::time::Duration;

use async_trait::async_trait;
use serde::de::DeserializeOwned;

#[derive(Clone, Debug)]
pub struct MirrorClientConfig {
	/// Origin of the mirror node, without the `/api/v1` suffix.
	pub base_url: String,
	pub request_timeout_ms: u64,
	pub max_retries: u32,
	pub retry_delay_ms: u64,
	/// Page cap when chasing `links.next`.
	pub max_pages: u32,
}

impl Default for MirrorClientConfig {
	fn default() -> Self {
		Self {
			base_url: "http://127.0.0.1:5551".to_owned(),
			request_timeout_ms: 10_000,
			max_retries: 3,
			retry_delay_ms: 250,
			max_pages: 20,
		}
	}
}

/// The capability set the relay core reads through. Injected so tests and
/// the block-assembly worker can carry their own implementations.
#[async_trait]
pub trait MirrorApi: Send + Sync {
	async fn get_latest_block(&self) -> Result<Option<MirrorBlock>, MirrorNodeClientError>;

	async fn get_block(
		&self,
		hash_or_number: &str,
	) -> Result<Option<MirrorBlock>, MirrorNodeClientError>;

	/// Contract results whose consensus timestamp falls in
	/// `[from, to]`, optionally narrowed to one transaction index.
	async fn get_contract_results_in_range(
		&self,
		from: &str,
		to: &str,
		transaction_index: Option<i64>,
	) -> Result<Vec<ContractResult>, MirrorNodeClientError>;

	async fn get_contract_result(
		&self,
		hash_or_id: &str,
	) -> Result<Option<ContractResult>, MirrorNodeClientError>;

	async fn get_logs(&self, query: &LogQuery) -> Result<Vec<MirrorLog>, MirrorNodeClientError>;

	async fn get_account(
		&self,
		address: &str,
	) -> Result<Option<MirrorAccount>, MirrorNodeClientError>;

	async fn get_contract(
		&self,
		address: &str,
	) -> Result<Option<MirrorContract>, MirrorNodeClientError>;

	async fn get_token(&self, address: &str)
		-> Result<Option<MirrorToken>, MirrorNodeClientError>;

	/// Resolve an EVM address to whichever entity flavor it names.
	async fn resolve_entity(
		&self,
		address: &str,
	) -> Result<Option<MirrorEntity>, MirrorNodeClientError>;

	async fn get_network_fees(&self) -> Result<Option<NetworkFees>, MirrorNodeClientError>;

	async fn get_network_exchange_rate(
		&self,
	) -> Result<Option<NetworkExchangeRate>, MirrorNodeClientError>;

	async fn get_contract_state_slot(
		&self,
		address: &str,
		slot: &str,
		timestamp: Option<&str>,
	) -> Result<Option<String>, MirrorNodeClientError>;

	async fn post_contract_call(
		&self,
		request: &ContractCallRequest,
	) -> Result<ContractCallResponse, MirrorNodeClientError>;
}

pub struct MirrorNodeClient {
	http: reqwest::Client,
	config: MirrorClientConfig,
}

impl MirrorNodeClient {
	pub fn new(config: MirrorClientConfig) -> Result<Self, MirrorNodeClientError> {
		let http = reqwest::Client::builder()
			.timeout(Duration::from_millis(config.request_timeout_ms))
			.build()?;
		Ok(Self { http, config })
	}

	fn url(&self, path: &str) -> String {
		format!(
			"{}/api/v1/{}",
			self.config.base_url.trim_end_matches('/'),
			path
		)
	}

	fn next_url(&self, next: &str) -> String {
		format!("{}{}", self.config.base_url.trim_end_matches('/'), next)
	}

	async fn request_once<T: DeserializeOwned>(
		&self,
		url: &str,
		query: &[(String, String)],
	) -> Result<Option<T>, MirrorNodeClientError> {
		let response = self.http.get(url).query(query).send().await?;
		let status = response.status();
		if status.as_u16() == 404 {
			return Ok(None);
		}
		if !status.is_success() {
			let body = response.json::<MirrorErrorBody>().await.unwrap_or_default();
			return Err(MirrorNodeClientError::from_body(status.as_u16(), body));
		}
		Ok(Some(response.json::<T>().await?))
	}

	async fn get_json<T: DeserializeOwned>(
		&self,
		url: &str,
		query: &[(String, String)],
		op: &str,
	) -> Result<Option<T>, MirrorNodeClientError> {
		let mut attempt = 0u32;
		loop {
			match self.request_once(url, query).await {
				Ok(value) => return Ok(value),
				Err(err) if err.is_retriable() && attempt < self.config.max_retries => {
					let delay = self.config.retry_delay_ms << attempt;
					log::debug!(
						target: "mirror",
						"{}: retriable mirror failure ({}), attempt {} in {}ms",
						op,
						err,
						attempt + 1,
						delay,
					);
					tokio::time::sleep(Duration::from_millis(delay)).await;
					attempt += 1;
				}
				Err(err) => {
					log::warn!(target: "mirror", "{}: mirror request failed: {}", op, err);
					return Err(err);
				}
			}
		}
	}

	async fn get_paged_contract_results(
		&self,
		first_url: String,
		query: Vec<(String, String)>,
		op: &str,
	) -> Result<Vec<ContractResult>, MirrorNodeClientError> {
		let mut out = Vec::new();
		let mut page = 0u32;
		let mut url = first_url;
		let mut query = query;
		loop {
			let list: ContractResultList = match self.get_json(&url, &query, op).await? {
				Some(list) => list,
				None => break,
			};
			out.extend(list.results);
			match list.links.next {
				Some(next) if page + 1 < self.config.max_pages => {
					url = self.next_url(&next);
					query = Vec::new();
					page += 1;
				}
				Some(_) => {
					log::warn!(
						target: "mirror",
						"{}: result stream truncated at {} pages",
						op,
						self.config.max_pages,
					);
					break;
				}
				None => break,
			}
		}
		Ok(out)
	}
}

#[async_trait]
impl MirrorApi for MirrorNodeClient {
	async fn get_latest_block(&self) -> Result<Option<MirrorBlock>, MirrorNodeClientError> {
		let list: Option<MirrorBlockList> = self
			.get_json(
				&self.url("blocks"),
				&[
					("order".to_owned(), "desc".to_owned()),
					("limit".to_owned(), "1".to_owned()),
				],
				"getLatestBlock",
			)
			.await?;
		Ok(list.and_then(|list| list.blocks.into_iter().next()))
	}

	async fn get_block(
		&self,
		hash_or_number: &str,
	) -> Result<Option<MirrorBlock>, MirrorNodeClientError> {
		self.get_json(
			&self.url(&format!("blocks/{}", hash_or_number)),
			&[],
			"getBlock",
		)
		.await
	}

	async fn get_contract_results_in_range(
		&self,
		from: &str,
		to: &str,
		transaction_index: Option<i64>,
	) -> Result<Vec<ContractResult>, MirrorNodeClientError> {
		let mut query = vec![
			("timestamp".to_owned(), format!("gte:{}", from)),
			("timestamp".to_owned(), format!("lte:{}", to)),
			("order".to_owned(), "asc".to_owned()),
			("limit".to_owned(), "100".to_owned()),
		];
		if let Some(index) = transaction_index {
			query.push(("transaction.index".to_owned(), index.to_string()));
		}
		self.get_paged_contract_results(self.url("contracts/results"), query, "getContractResults")
			.await
	}

	async fn get_contract_result(
		&self,
		hash_or_id: &str,
	) -> Result<Option<ContractResult>, MirrorNodeClientError> {
		self.get_json(
			&self.url(&format!("contracts/results/{}", hash_or_id)),
			&[],
			"getContractResult",
		)
		.await
	}

	async fn get_logs(&self, query: &LogQuery) -> Result<Vec<MirrorLog>, MirrorNodeClientError> {
		let path = match &query.address {
			Some(address) => format!("contracts/{}/results/logs", address),
			None => "contracts/results/logs".to_owned(),
		};
		let mut pairs = query.to_query_pairs();
		pairs.push(("limit".to_owned(), "100".to_owned()));

		let mut out = Vec::new();
		let mut page = 0u32;
		let mut url = self.url(&path);
		loop {
			let list: MirrorLogList = match self.get_json(&url, &pairs, "getLogs").await? {
				Some(list) => list,
				None => break,
			};
			out.extend(list.logs);
			match list.links.next {
				Some(next) if page + 1 < self.config.max_pages => {
					url = self.next_url(&next);
					pairs = Vec::new();
					page += 1;
				}
				Some(_) => {
					log::warn!(
						target: "mirror",
						"getLogs: log stream truncated at {} pages",
						self.config.max_pages,
					);
					break;
				}
				None => break,
			}
		}
		Ok(out)
	}

	async fn get_account(
		&self,
		address: &str,
	) -> Result<Option<MirrorAccount>, MirrorNodeClientError> {
		self.get_json(
			&self.url(&format!("accounts/{}", address)),
			&[("transactions".to_owned(), "false".to_owned())],
			"getAccount",
		)
		.await
	}

	async fn get_contract(
		&self,
		address: &str,
	) -> Result<Option<MirrorContract>, MirrorNodeClientError> {
		self.get_json(
			&self.url(&format!("contracts/{}", address)),
			&[],
			"getContract",
		)
		.await
	}

	async fn get_token(
		&self,
		address: &str,
	) -> Result<Option<MirrorToken>, MirrorNodeClientError> {
		self.get_json(&self.url(&format!("tokens/{}", address)), &[], "getToken")
			.await
	}

	async fn resolve_entity(
		&self,
		address: &str,
	) -> Result<Option<MirrorEntity>, MirrorNodeClientError> {
		// Contracts are the common case for `to` addresses; tokens next so
		// the redirect-proxy path is found before the account fallback.
		if let Some(contract) = self.get_contract(address).await? {
			return Ok(Some(MirrorEntity::Contract(contract)));
		}
		if let Some(token) = self.get_token(address).await? {
			return Ok(Some(MirrorEntity::Token(token)));
		}
		if let Some(account) = self.get_account(address).await? {
			return Ok(Some(MirrorEntity::Account(account)));
		}
		Ok(None)
	}

	async fn get_network_fees(&self) -> Result<Option<NetworkFees>, MirrorNodeClientError> {
		self.get_json(&self.url("network/fees"), &[], "getNetworkFees")
			.await
	}

	async fn get_network_exchange_rate(
		&self,
	) -> Result<Option<NetworkExchangeRate>, MirrorNodeClientError> {
		self.get_json(&self.url("network/exchangerate"), &[], "getNetworkExchangeRate")
			.await
	}

	async fn get_contract_state_slot(
		&self,
		address: &str,
		slot: &str,
		timestamp: Option<&str>,
	) -> Result<Option<String>, MirrorNodeClientError> {
		let mut query = vec![("slot".to_owned(), slot.to_owned())];
		if let Some(timestamp) = timestamp {
			query.push(("timestamp".to_owned(), timestamp.to_owned()));
		}
		let list: Option<ContractStateList> = self
			.get_json(
				&self.url(&format!("contracts/{}/state", address)),
				&query,
				"getContractStateSlot",
			)
			.await?;
		Ok(list
			.and_then(|list| list.state.into_iter().next())
			.and_then(|slot| slot.value))
	}

	async fn post_contract_call(
		&self,
		request: &ContractCallRequest,
	) -> Result<ContractCallResponse, MirrorNodeClientError> {
		let url = self.url("contracts/call");
		let mut attempt = 0u32;
		loop {
			let outcome = async {
				let response = self.http.post(&url).json(request).send().await?;
				let status = response.status();
				if !status.is_success() {
					let body = response.json::<MirrorErrorBody>().await.unwrap_or_default();
					return Err(MirrorNodeClientError::from_body(status.as_u16(), body));
				}
				Ok(response.json::<ContractCallResponse>().await?)
			}
			.await;
			match outcome {
				Ok(response) => return Ok(response),
				Err(err) if err.is_retriable() && attempt < self.config.max_retries => {
					let delay = self.config.retry_delay_ms << attempt;
					log::debug!(
						target: "mirror",
						"postContractCall: retriable mirror failure ({}), attempt {} in {}ms",
						err,
						attempt + 1,
						delay,
					);
					tokio::time::sleep(Duration::from_millis(delay)).await;
					attempt += 1;
				}
				Err(err) => return Err(err),
			}
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn urls_are_rooted_at_api_v1() {
		let client = MirrorNodeClient::new(MirrorClientConfig {
			base_url: "https://mirror.example.com/".to_owned(),
			..MirrorClientConfig::default()
		})
		.unwrap();
		assert_eq!(
			client.url("blocks/0x10"),
			"https://mirror.example.com/api/v1/blocks/0x10"
		);
		assert_eq!(
			client.next_url("/api/v1/contracts/results?timestamp=gte:1"),
			"https://mirror.example.com/api/v1/contracts/results?timestamp=gte:1"
		);
	}
}
