//! Session-scoped read cache for planning-time chain state.
//!
//! During planning the same (chain, token, owner, spender) allowance and
//! (chain, address) delegated-code facts are needed by several legs.
//! Queries are registered up front, [`SessionCache::process`] performs
//! one deduplicated read pass — parallel across chains, sequential
//! within a chain — and afterwards lookups are synchronous. A lookup
//! miss is a programming error: the query was never registered.
//!
//! Entries are never invalidated mid-session; a session is short enough
//! that staleness is acceptable, and re-reads only happen across
//! sessions.

use alloy_primitives::{Address, Bytes, U256};
use futures::future::join_all;
use omniswap_types::{ChainId, ClientError, ClientMap};
use std::collections::{HashMap, HashSet};
use thiserror::Error;

/// Errors raised by the session cache.
#[derive(Debug, Error)]
pub enum CacheError {
	/// A lookup was attempted for a query that was never registered.
	#[error("query not registered: {0}")]
	QueryNotRegistered(String),
	/// No client handle is available for a chain with pending queries.
	#[error("no client for chain {0}")]
	NoClient(ChainId),
	/// An underlying chain read failed.
	#[error(transparent)]
	Client(#[from] ClientError),
}

/// Key for one allowance fact.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct AllowanceKey {
	pub chain: ChainId,
	pub token: Address,
	pub owner: Address,
	pub spender: Address,
}

/// Key for one delegated-code fact.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CodeKey {
	pub chain: ChainId,
	pub address: Address,
}

/// One session's batched read cache.
///
/// Owned by a single planning/execution session and passed by reference
/// into components; there is no process-wide instance.
#[derive(Default)]
pub struct SessionCache {
	pending_allowances: HashSet<AllowanceKey>,
	pending_codes: HashSet<CodeKey>,
	allowances: HashMap<AllowanceKey, U256>,
	codes: HashMap<CodeKey, Bytes>,
}

impl SessionCache {
	pub fn new() -> Self {
		Self::default()
	}

	/// Registers an allowance query for the next `process` pass.
	///
	/// Native-currency allowances are unlimited by definition and are
	/// recorded without a read.
	pub fn add_allowance_query(&mut self, key: AllowanceKey, is_native: bool) {
		if is_native {
			self.allowances.insert(key, U256::MAX);
		} else if !self.allowances.contains_key(&key) {
			self.pending_allowances.insert(key);
		}
	}

	/// Registers a delegated-code query for the next `process` pass.
	pub fn add_set_code_query(&mut self, key: CodeKey) {
		if !self.codes.contains_key(&key) {
			self.pending_codes.insert(key);
		}
	}

	/// Executes all registered queries in one batched pass.
	///
	/// Reads are grouped per chain and run in parallel across chains;
	/// within one chain they run sequentially, which keeps transports
	/// that dislike concurrent requests happy.
	pub async fn process(&mut self, clients: &ClientMap) -> Result<(), CacheError> {
		let mut per_chain: HashMap<ChainId, (Vec<AllowanceKey>, Vec<CodeKey>)> = HashMap::new();
		for key in self.pending_allowances.drain() {
			per_chain.entry(key.chain).or_default().0.push(key);
		}
		for key in self.pending_codes.drain() {
			per_chain.entry(key.chain).or_default().1.push(key);
		}

		let mut tasks = Vec::with_capacity(per_chain.len());
		for (chain, (allowance_keys, code_keys)) in per_chain {
			let client = clients
				.get(&chain)
				.cloned()
				.ok_or(CacheError::NoClient(chain))?;
			tasks.push(async move {
				let mut allowances = Vec::with_capacity(allowance_keys.len());
				for key in allowance_keys {
					let value = client
						.get_allowance(key.token, key.owner, key.spender)
						.await?;
					allowances.push((key, value));
				}
				let mut codes = Vec::with_capacity(code_keys.len());
				for key in code_keys {
					let value = client.get_code(key.address).await?;
					codes.push((key, value));
				}
				Ok::<_, CacheError>((allowances, codes))
			});
		}

		let results = join_all(tasks).await;
		for result in results {
			let (allowances, codes) = result?;
			tracing::debug!(
				allowances = allowances.len(),
				codes = codes.len(),
				"cache read pass completed for chain group"
			);
			self.allowances.extend(allowances);
			self.codes.extend(codes);
		}
		Ok(())
	}

	/// Synchronous allowance lookup; the query must have been registered
	/// and processed.
	pub fn allowance(&self, key: &AllowanceKey) -> Result<U256, CacheError> {
		self.allowances.get(key).copied().ok_or_else(|| {
			CacheError::QueryNotRegistered(format!(
				"allowance {}:{}:{}:{}",
				key.chain, key.token, key.owner, key.spender
			))
		})
	}

	/// Synchronous delegated-code lookup.
	pub fn code(&self, key: &CodeKey) -> Result<&Bytes, CacheError> {
		self.codes.get(key).ok_or_else(|| {
			CacheError::QueryNotRegistered(format!("code {}:{}", key.chain, key.address))
		})
	}

	/// Whether an address has any delegated code set on a chain.
	pub fn has_delegated_code(&self, key: &CodeKey) -> Result<bool, CacheError> {
		Ok(!self.code(key)?.is_empty())
	}
}
