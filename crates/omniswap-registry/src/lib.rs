//! Chain registry for the omniswap engine.
//!
//! Holds the immutable per-chain metadata every other component reads:
//! chain ids, account-model families, token tables, vault contract
//! addresses and the common intermediate token (COT) deployments. Also
//! selects the [`ChainFamily`] call-construction capability once per
//! chain, so nothing downstream dispatches on the universe tag again.

use omniswap_types::{ChainConfig, ChainId, TokenInfo, Universe};
use alloy_primitives::Address;
use std::collections::HashMap;
use std::sync::Arc;
use thiserror::Error;

pub mod family;

pub use family::{ChainFamily, EvmFamily, FamilyError, UtxoFamily};

/// Errors raised by registry lookups.
#[derive(Debug, Error)]
pub enum RegistryError {
	/// No configuration is loaded for the requested chain.
	#[error("chain data not found for chain {0}")]
	ChainDataNotFound(ChainId),
	/// The chain has no deployment of the common intermediate token.
	#[error("common intermediate token not defined on chain {0}")]
	CotNotDefined(ChainId),
	/// The requested token is not in the chain's known-token table.
	#[error("token {token} not known on chain {chain}")]
	TokenNotFound { chain: ChainId, token: Address },
}

/// Read-shared registry of chain metadata.
///
/// Built once from loaded configuration and treated as immutable; it
/// outlives any single execution session.
pub struct ChainRegistry {
	chains: HashMap<ChainId, ChainConfig>,
	families: HashMap<ChainId, Arc<dyn ChainFamily>>,
}

impl ChainRegistry {
	/// Builds a registry, selecting each chain's family capability once.
	pub fn new(configs: Vec<ChainConfig>) -> Self {
		let mut chains = HashMap::new();
		let mut families: HashMap<ChainId, Arc<dyn ChainFamily>> = HashMap::new();
		for config in configs {
			let family: Arc<dyn ChainFamily> = match config.universe {
				Universe::Evm => Arc::new(EvmFamily),
				Universe::Utxo => Arc::new(UtxoFamily),
			};
			families.insert(config.id, family);
			chains.insert(config.id, config);
		}
		Self { chains, families }
	}

	/// Configuration for a chain, if loaded.
	pub fn chain(&self, id: ChainId) -> Option<&ChainConfig> {
		self.chains.get(&id)
	}

	/// Configuration for a chain, failing fast when absent.
	pub fn require_chain(&self, id: ChainId) -> Result<&ChainConfig, RegistryError> {
		self.chains
			.get(&id)
			.ok_or(RegistryError::ChainDataNotFound(id))
	}

	/// The chain's COT deployment, failing fast when undefined.
	pub fn cot_required(&self, id: ChainId) -> Result<Address, RegistryError> {
		self.require_chain(id)?
			.cot_address
			.ok_or(RegistryError::CotNotDefined(id))
	}

	/// The chain's vault (delegated-execution) contract.
	pub fn vault(&self, id: ChainId) -> Result<Address, RegistryError> {
		Ok(self.require_chain(id)?.vault_address)
	}

	/// Known-token metadata for a (chain, token) pair.
	pub fn token_info(&self, id: ChainId, token: &Address) -> Result<&TokenInfo, RegistryError> {
		self.require_chain(id)?
			.token(token)
			.ok_or(RegistryError::TokenNotFound {
				chain: id,
				token: *token,
			})
	}

	/// The call-construction family selected for a chain.
	pub fn family(&self, id: ChainId) -> Result<Arc<dyn ChainFamily>, RegistryError> {
		self.families
			.get(&id)
			.cloned()
			.ok_or(RegistryError::ChainDataNotFound(id))
	}

	/// All loaded chain ids.
	pub fn chain_ids(&self) -> impl Iterator<Item = ChainId> + '_ {
		self.chains.keys().copied()
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use alloy_primitives::address;
	use omniswap_types::RpcEndpoint;

	fn registry() -> ChainRegistry {
		ChainRegistry::new(vec![
			ChainConfig {
				id: ChainId(1),
				universe: Universe::Evm,
				native_decimals: 18,
				vault_address: address!("00000000000000000000000000000000000000aa"),
				cot_address: Some(address!("00000000000000000000000000000000000000cc")),
				tokens: vec![TokenInfo {
					address: address!("00000000000000000000000000000000000000cc"),
					symbol: "USDC".into(),
					decimals: 6,
				}],
				rpc_urls: vec![RpcEndpoint::http_only("http://localhost:8545")],
			},
			ChainConfig {
				id: ChainId(2),
				universe: Universe::Utxo,
				native_decimals: 8,
				vault_address: Address::ZERO,
				cot_address: None,
				tokens: vec![],
				rpc_urls: vec![],
			},
		])
	}

	#[test]
	fn require_chain_fails_fast_for_unknown() {
		let reg = registry();
		assert!(matches!(
			reg.require_chain(ChainId(99)),
			Err(RegistryError::ChainDataNotFound(ChainId(99)))
		));
	}

	#[test]
	fn cot_required_errors_when_undefined() {
		let reg = registry();
		assert!(reg.cot_required(ChainId(1)).is_ok());
		assert!(matches!(
			reg.cot_required(ChainId(2)),
			Err(RegistryError::CotNotDefined(ChainId(2)))
		));
	}

	#[test]
	fn token_info_resolves_known_tokens_only() {
		let reg = registry();
		let usdc = address!("00000000000000000000000000000000000000cc");
		assert_eq!(reg.token_info(ChainId(1), &usdc).unwrap().decimals, 6);
		assert!(matches!(
			reg.token_info(ChainId(1), &Address::ZERO),
			Err(RegistryError::TokenNotFound { .. })
		));
	}

	#[test]
	fn family_selected_by_universe() {
		let reg = registry();
		assert!(reg.family(ChainId(1)).unwrap().supports_contract_calls());
		assert!(!reg.family(ChainId(2)).unwrap().supports_contract_calls());
	}
}
