//! Relay client for batched-call submission.
//!
//! The relay is a persistent bidirectional byte stream: the client sends
//! every batch of a submission in one frame, the relay streams back one
//! reply per batch as each lands on-chain. A reply's error flag fails
//! only that batch; losing the connection mid-stream fails every batch
//! still awaiting a reply. Retry and sweep decisions belong to the
//! caller.

use crate::wire::{decode_reply, encode_request, REPLY_LEN};
use crate::SigningError;
use alloy_primitives::B256;
use async_trait::async_trait;
use omniswap_types::SignedBatchedCall;
use std::time::Duration;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};

/// Per-submission retry budget for transport failures.
const MAX_ATTEMPTS: u32 = 3;
/// Fixed backoff between attempts.
const RETRY_BACKOFF: Duration = Duration::from_secs(1);

/// Outcome of one submitted batch.
pub type BatchOutcome = Result<B256, SigningError>;

/// Object-safe submission seam for callers that should not care which
/// transport backs the relay.
#[async_trait]
pub trait BatchSubmitter: Send + Sync {
	/// Submits the batches, one outcome per batch in order.
	async fn submit_batches(&self, batches: &[SignedBatchedCall]) -> Vec<BatchOutcome>;
}

/// Produces fresh relay connections.
#[async_trait]
pub trait RelayTransport: Send + Sync {
	type Stream: AsyncRead + AsyncWrite + Unpin + Send;

	async fn connect(&self) -> Result<Self::Stream, SigningError>;
}

/// A client bound to one open relay connection.
pub struct RelayClient<S> {
	stream: S,
}

impl<S: AsyncRead + AsyncWrite + Unpin + Send> RelayClient<S> {
	pub fn new(stream: S) -> Self {
		Self { stream }
	}

	/// Submits every batch in one frame and collects one reply each.
	///
	/// Returned outcomes are indexed like `batches`. The connection is
	/// closed once all expected replies have arrived or on fatal error.
	pub async fn submit(mut self, batches: &[SignedBatchedCall]) -> Vec<BatchOutcome> {
		if batches.is_empty() {
			return Vec::new();
		}

		let frame = encode_request(batches);
		if let Err(e) = self.write_frame(&frame).await {
			tracing::warn!(error = %e, "relay frame write failed");
			return failed_outcomes(batches.len(), batches.len());
		}

		let mut outcomes: Vec<Option<BatchOutcome>> = (0..batches.len()).map(|_| None).collect();
		let mut received = 0usize;
		while received < batches.len() {
			let mut buf = [0u8; REPLY_LEN];
			if let Err(e) = self.stream.read_exact(&mut buf).await {
				// Disconnect mid-stream: every batch still awaiting a
				// reply fails.
				let pending = batches.len() - received;
				tracing::warn!(pending, error = %e, "relay disconnected mid-stream");
				for slot in outcomes.iter_mut().filter(|s| s.is_none()) {
					*slot = Some(Err(SigningError::RelayDisconnected { pending }));
				}
				break;
			}
			let reply = decode_reply(&buf);
			let index = reply.part_index as usize;
			if index >= outcomes.len() || outcomes[index].is_some() {
				tracing::warn!(part_index = reply.part_index, "relay reply for unknown part");
				continue;
			}
			outcomes[index] = Some(if reply.errored {
				Err(SigningError::BatchFailed {
					part_index: reply.part_index,
				})
			} else {
				Ok(reply.tx_hash)
			});
			received += 1;
		}

		let _ = self.stream.shutdown().await;
		outcomes
			.into_iter()
			.map(|o| o.unwrap_or(Err(SigningError::RelayDisconnected { pending: 0 })))
			.collect()
	}

	async fn write_frame(&mut self, frame: &[u8]) -> Result<(), SigningError> {
		self.stream
			.write_all(frame)
			.await
			.map_err(|e| SigningError::Transport(e.to_string()))?;
		self.stream
			.flush()
			.await
			.map_err(|e| SigningError::Transport(e.to_string()))
	}
}

fn failed_outcomes(count: usize, pending: usize) -> Vec<BatchOutcome> {
	(0..count)
		.map(|_| Err(SigningError::RelayDisconnected { pending }))
		.collect()
}

/// Submission front-end with a small fixed transport retry budget.
///
/// A fresh connection is drawn per attempt. An attempt that produced
/// any reply is final: partially-acknowledged submissions must not be
/// re-sent, the caller decides what to do with the failed parts.
pub struct RelaySubmitter<T> {
	transport: T,
}

impl<T: RelayTransport> RelaySubmitter<T> {
	pub fn new(transport: T) -> Self {
		Self { transport }
	}

	/// Submits the batches, retrying whole-submission transport
	/// failures up to the fixed budget.
	pub async fn submit(&self, batches: &[SignedBatchedCall]) -> Vec<BatchOutcome> {
		let mut attempt = 1;
		loop {
			let outcomes = match self.transport.connect().await {
				Ok(stream) => RelayClient::new(stream).submit(batches).await,
				Err(e) => {
					tracing::warn!(attempt, error = %e, "relay connect failed");
					failed_outcomes(batches.len(), batches.len())
				},
			};

			let any_acknowledged = outcomes
				.iter()
				.any(|o| !matches!(o, Err(SigningError::RelayDisconnected { .. })));
			if any_acknowledged || attempt >= MAX_ATTEMPTS {
				return outcomes;
			}
			attempt += 1;
			tokio::time::sleep(RETRY_BACKOFF).await;
		}
	}
}

#[async_trait]
impl<T: RelayTransport> BatchSubmitter for RelaySubmitter<T> {
	async fn submit_batches(&self, batches: &[SignedBatchedCall]) -> Vec<BatchOutcome> {
		self.submit(batches).await
	}
}
