//! Common types for the omniswap cross-chain execution engine.
//!
//! This crate defines the core data model shared by every component:
//! chain metadata, quotes and swap legs, fund-movement intents, batched
//! calls, progress events, and the per-chain client boundary trait.

/// Batched-call and delegation types for single-signature execution.
pub mod batch;
/// Chain, token and RPC endpoint configuration types.
pub mod chain;
/// The chain-scoped client boundary trait and its request/receipt types.
pub mod client;
/// EIP-712 hashing helpers and the type strings used by this system.
pub mod eip712;
/// Progress events emitted during plan execution.
pub mod events;
/// Cross-chain fund-movement intent types.
pub mod intent;
/// Append-only audit metadata for completed executions.
pub mod metadata;
/// Route plans and their constituent legs.
pub mod plan;
/// Aggregator quote types.
pub mod quote;
/// Small shared helpers.
pub mod utils;

pub use batch::{BatchedCall, Call, DelegationGrant, SignedBatchedCall};
pub use chain::{ChainConfig, ChainId, RpcEndpoint, TokenInfo, Universe};
pub use client::{ChainClient, ClientError, ClientMap, FeeEstimate, TransactionReceipt};
pub use events::SwapEvent;
pub use intent::{FundMovementIntent, IntentParams, IntentStatus};
pub use metadata::{LegSummary, SwapMetadata};
pub use plan::{DestinationLeg, RequoteSpec, RoutePlan, SourceLeg, SwapAction, Target};
pub use quote::{CallSpec, Holding, Quote};
pub use utils::{current_timestamp, truncate_id};
