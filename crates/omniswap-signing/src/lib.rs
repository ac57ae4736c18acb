//! Batched-call signing protocol.
//!
//! Turns an ordered call list for one chain into a single atomic
//! delegated-execution submission: a fresh high-entropy nonce, one
//! EIP-712 signature by the ephemeral key over the chain's vault domain,
//! an optional one-time delegation grant, and submission through the
//! binary relay protocol. A direct path submits the same calls through
//! the user's own wallet instead.

use alloy_primitives::{Address, Bytes, B256, U256};
use alloy_signer::Signer;
use alloy_signer_local::PrivateKeySigner;
use omniswap_registry::{ChainRegistry, RegistryError};
use omniswap_types::eip712::{
	batched_call_struct_hash, delegation_struct_hash, final_digest, vault_domain_hash,
};
use omniswap_types::{
	BatchedCall, Call, ChainId, ClientError, DelegationGrant, SignedBatchedCall,
};
use rand::RngCore;
use std::sync::Arc;
use thiserror::Error;

/// Direct (user-signed) submission path.
pub mod direct;
/// Relay client over a persistent byte stream.
pub mod relay;
/// Bit-exact relay wire codec.
pub mod wire;

pub use direct::submit_direct;
pub use relay::{BatchOutcome, BatchSubmitter, RelayClient, RelaySubmitter, RelayTransport};
pub use wire::RelayReply;

/// Errors raised by the signing and submission layer.
#[derive(Debug, Error)]
pub enum SigningError {
	/// The ephemeral key could not be loaded or used.
	#[error("ephemeral key error: {0}")]
	Key(String),
	/// Chain metadata needed for the domain was missing.
	#[error(transparent)]
	Registry(#[from] RegistryError),
	/// The relay connection dropped while replies were outstanding.
	#[error("relay disconnected with {pending} replies outstanding")]
	RelayDisconnected { pending: usize },
	/// The relay flagged this specific batch as failed.
	#[error("relay reported batch {part_index} failed")]
	BatchFailed { part_index: u16 },
	/// A malformed frame arrived from the relay.
	#[error("relay wire error: {0}")]
	Wire(String),
	/// Transport-level failure reaching the relay.
	#[error("relay transport error: {0}")]
	Transport(String),
	/// A direct submission through the user's wallet failed.
	#[error(transparent)]
	Client(#[from] ClientError),
}

/// Draws a fresh unpredictable 192-bit nonce, widened to a `U256`.
///
/// Chain-scoped by construction: each batch draws its own nonce, so
/// concurrent submissions to different chains never race.
pub fn draw_nonce() -> U256 {
	let mut buf = [0u8; 24];
	rand::thread_rng().fill_bytes(&mut buf);
	U256::from_be_slice(&buf)
}

/// The temporary delegated signer for one execution session.
pub struct EphemeralSigner {
	signer: PrivateKeySigner,
}

impl EphemeralSigner {
	/// Generates a fresh random key.
	pub fn random() -> Self {
		Self {
			signer: PrivateKeySigner::random(),
		}
	}

	/// The ephemeral account address.
	pub fn address(&self) -> Address {
		self.signer.address()
	}

	/// Signs a 32-byte digest, returning the 65-byte r||s||v encoding.
	pub async fn sign_digest(&self, digest: B256) -> Result<Bytes, SigningError> {
		let sig = self
			.signer
			.sign_hash(&digest)
			.await
			.map_err(|e| SigningError::Key(format!("signing failed: {}", e)))?;
		let mut bytes = Vec::with_capacity(65);
		bytes.extend_from_slice(&sig.r().to_be_bytes::<32>());
		bytes.extend_from_slice(&sig.s().to_be_bytes::<32>());
		bytes.push(if sig.v() { 28 } else { 27 });
		Ok(Bytes::from(bytes))
	}
}

/// Produces signed batched calls for one session's ephemeral key.
pub struct BatchSigner {
	registry: Arc<ChainRegistry>,
	signer: EphemeralSigner,
}

impl BatchSigner {
	pub fn new(registry: Arc<ChainRegistry>, signer: EphemeralSigner) -> Self {
		Self { registry, signer }
	}

	/// The delegated account's address.
	pub fn address(&self) -> Address {
		self.signer.address()
	}

	/// The underlying signer, for metadata signing.
	pub fn signer(&self) -> &EphemeralSigner {
		&self.signer
	}

	/// Signs one batch for `chain`.
	///
	/// `needs_delegation` is decided by the caller from the session
	/// cache: when the ephemeral account has not yet delegated execution
	/// to the vault on this chain, a one-time grant is produced and
	/// attached.
	pub async fn sign_batch(
		&self,
		chain: ChainId,
		calls: Vec<Call>,
		needs_delegation: bool,
	) -> Result<SignedBatchedCall, SigningError> {
		let vault = self.registry.vault(chain)?;
		let domain = vault_domain_hash(chain.0, &vault);

		let batch = BatchedCall::new(chain, calls, draw_nonce());
		let digest = final_digest(&domain, &batched_call_struct_hash(&batch));
		let signature = self.signer.sign_digest(digest).await?;

		let authorization = if needs_delegation {
			let grant_hash = delegation_struct_hash(chain.0, &vault, &self.signer.address());
			let grant_digest = final_digest(&domain, &grant_hash);
			let grant_signature = self.signer.sign_digest(grant_digest).await?;
			tracing::debug!(%chain, "attaching one-time delegation grant");
			Some(DelegationGrant {
				chain,
				delegate: vault,
				authority: self.signer.address(),
				signature: grant_signature,
			})
		} else {
			None
		};

		Ok(SignedBatchedCall {
			batch,
			signature,
			authorization,
		})
	}
}
