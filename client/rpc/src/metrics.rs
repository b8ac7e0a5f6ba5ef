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

use prometheus::{HistogramOpts, HistogramVec, IntCounterVec, Opts, Registry};

/// Process-local counters; exposition and aggregation are external.
pub struct RelayMetrics {
	pub rpc_calls: IntCounterVec,
	pub rpc_failures: IntCounterVec,
	pub rpc_latency: HistogramVec,
	pub cache_hits: IntCounterVec,
	pub cache_misses: IntCounterVec,
}

impl RelayMetrics {
	pub fn register(registry: &Registry) -> Result<Self, prometheus::Error> {
		let rpc_calls = IntCounterVec::new(
			Opts::new("rpc_relay_method_calls", "Number of rpc method invocations"),
			&["method"],
		)?;
		let rpc_failures = IntCounterVec::new(
			Opts::new("rpc_relay_method_failures", "Number of failed rpc method invocations"),
			&["method"],
		)?;
		let rpc_latency = HistogramVec::new(
			HistogramOpts::new("rpc_relay_method_seconds", "Latency of rpc method invocations"),
			&["method"],
		)?;
		let cache_hits = IntCounterVec::new(
			Opts::new("rpc_relay_cache_hits", "Cache hits by scope"),
			&["scope"],
		)?;
		let cache_misses = IntCounterVec::new(
			Opts::new("rpc_relay_cache_misses", "Cache misses by scope"),
			&["scope"],
		)?;

		registry.register(Box::new(rpc_calls.clone()))?;
		registry.register(Box::new(rpc_failures.clone()))?;
		registry.register(Box::new(rpc_latency.clone()))?;
		registry.register(Box::new(cache_hits.clone()))?;
		registry.register(Box::new(cache_misses.clone()))?;

		Ok(Self {
			rpc_calls,
			rpc_failures,
			rpc_latency,
			cache_hits,
			cache_misses,
		})
	}
}
