//! Chain and token configuration types.
//!
//! These structures describe everything the engine needs to know about a
//! supported network: its id, account-model family, token table, the
//! delegated-execution (vault) contract and the common intermediate token.
//! A `ChainConfig` is immutable once the registry has loaded it.

use alloy_primitives::Address;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Numeric chain identifier.
///
/// Newtype over the raw id so chain ids are never confused with other
/// integers (amounts, indices) at API boundaries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ChainId(pub u64);

impl fmt::Display for ChainId {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "{}", self.0)
	}
}

impl From<u64> for ChainId {
	fn from(id: u64) -> Self {
		ChainId(id)
	}
}

/// Account-model family a chain belongs to.
///
/// Call construction is dispatched once per chain on this tag via the
/// registry; nothing downstream inspects it again.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Universe {
	/// Account-based EVM-style chains.
	Evm,
	/// UTXO-style chains (transfers only, no on-chain swaps).
	Utxo,
}

/// RPC endpoint for a chain, HTTP and/or WebSocket.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RpcEndpoint {
	#[serde(skip_serializing_if = "Option::is_none")]
	pub http: Option<String>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub ws: Option<String>,
}

impl RpcEndpoint {
	/// Creates an endpoint with an HTTP URL only.
	pub fn http_only(url: impl Into<String>) -> Self {
		Self {
			http: Some(url.into()),
			ws: None,
		}
	}
}

/// A token known on a specific chain.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TokenInfo {
	pub address: Address,
	pub symbol: String,
	pub decimals: u8,
}

/// Full configuration for one supported chain.
///
/// `vault_address` is the shared delegated-execution contract batched
/// calls are routed through; `cot_address` is the chain's deployment of
/// the common intermediate token all source swaps convert into.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChainConfig {
	pub id: ChainId,
	pub universe: Universe,
	pub native_decimals: u8,
	pub vault_address: Address,
	pub cot_address: Option<Address>,
	pub tokens: Vec<TokenInfo>,
	pub rpc_urls: Vec<RpcEndpoint>,
}

impl ChainConfig {
	/// Looks up a known token by address.
	pub fn token(&self, address: &Address) -> Option<&TokenInfo> {
		self.tokens.iter().find(|t| &t.address == address)
	}

	/// First available HTTP RPC URL, if any.
	pub fn http_url(&self) -> Option<&str> {
		self.rpc_urls.iter().find_map(|e| e.http.as_deref())
	}
}
