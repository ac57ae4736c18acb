//! Best-effort audit metadata persistence.
//!
//! After an execution completes, a write-once record of its legs and
//! intent id is signed by the ephemeral key and handed to the store.
//! Persistence never fails the swap: a store error is logged and
//! swallowed.

use async_trait::async_trait;
use omniswap_signing::EphemeralSigner;
use omniswap_types::eip712::metadata_struct_hash;
use omniswap_types::SwapMetadata;
use thiserror::Error;

/// Errors surfaced by a metadata store backend.
#[derive(Debug, Error)]
pub enum MetadataError {
	#[error("metadata store unavailable: {0}")]
	Unavailable(String),
	#[error("metadata rejected: {0}")]
	Rejected(String),
}

/// Write-once audit record sink.
#[async_trait]
#[cfg_attr(feature = "testing", mockall::automock)]
pub trait MetadataStore: Send + Sync {
	async fn persist(&self, metadata: &SwapMetadata) -> Result<(), MetadataError>;
}

/// Signs the record with the ephemeral key and persists it.
///
/// The signature covers the record digest so the audit trail is bound
/// to the session key that executed the swap.
pub async fn sign_and_persist(
	store: &dyn MetadataStore,
	signer: &EphemeralSigner,
	mut metadata: SwapMetadata,
) {
	match signer.sign_digest(metadata_struct_hash(&metadata)).await {
		Ok(signature) => metadata.signature = signature,
		Err(e) => {
			tracing::warn!(error = %e, "metadata signing failed, record dropped");
			return;
		},
	}
	if let Err(e) = store.persist(&metadata).await {
		tracing::warn!(error = %e, "metadata persistence failed");
	}
}
