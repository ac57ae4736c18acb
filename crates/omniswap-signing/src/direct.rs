//! Direct (user-signed) execution path.
//!
//! Used when gas is paid by the user's own wallet rather than the
//! ephemeral signer: the wallet switches to the target chain and the
//! call list goes out one standard send-transaction at a time, in
//! order.

use crate::SigningError;
use alloy_primitives::B256;
use omniswap_types::{CallSpec, ChainClient};
use std::sync::Arc;

/// Submits `calls` in order through the user's wallet.
///
/// Stops at the first failure; transactions already sent cannot be
/// recalled, so the caller gets the hashes that made it out alongside
/// the error.
pub async fn submit_direct(
	client: &Arc<dyn ChainClient>,
	calls: &[CallSpec],
) -> Result<Vec<B256>, (Vec<B256>, SigningError)> {
	if let Err(e) = client.switch_chain().await {
		return Err((Vec::new(), e.into()));
	}

	let mut hashes = Vec::with_capacity(calls.len());
	for call in calls {
		match client.send_transaction(call).await {
			Ok(hash) => {
				tracing::debug!(chain = %client.chain_id(), %hash, "direct transaction sent");
				hashes.push(hash);
			},
			Err(e) => return Err((hashes, e.into())),
		}
	}
	Ok(hashes)
}
