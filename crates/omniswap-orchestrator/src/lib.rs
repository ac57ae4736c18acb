//! Execution orchestration for omniswap route plans.
//!
//! Takes an immutable [`RoutePlan`](omniswap_types::RoutePlan) and
//! drives it through the source-swap, fund-movement and
//! destination-swap phases, publishing progress events along the way.

use alloy_primitives::U256;
use omniswap_cache::CacheError;
use omniswap_intent::IntentError;
use omniswap_planner::{AggregatorError, PlannerError};
use omniswap_registry::{FamilyError, RegistryError};
use omniswap_signing::SigningError;
use omniswap_types::{ChainId, ClientError};
use thiserror::Error;

/// The three-phase execution engine.
pub mod engine;
/// Progress event broadcasting.
pub mod event_bus;
/// Best-effort audit metadata persistence.
pub mod metadata;
/// Confirmation-depth settlement tracking.
pub mod settlement;

pub use engine::{ExecutionReport, Orchestrator, OrchestratorConfig};
pub use event_bus::EventBus;
pub use metadata::{MetadataError, MetadataStore};
pub use settlement::{SettlementConfig, SettlementError};

/// Execution failures.
///
/// [`SourceSwapFailed`](OrchestratorError::SourceSwapFailed) is the only
/// partial-state error: it names both the chains that failed and the
/// chains whose residual funds were swept back to the user. Everything
/// before the first submission is safely retryable.
#[derive(Debug, Error)]
pub enum OrchestratorError {
	/// One or more source chains failed past the retry budget.
	#[error("source swaps failed on chains {failed:?}; residuals swept back on {swept:?}")]
	SourceSwapFailed {
		failed: Vec<ChainId>,
		swept: Vec<ChainId>,
	},
	/// Re-deriving the stale destination quote would overspend the
	/// planning-time buffer.
	#[error("destination quote stale: fresh quote needs {required} but the buffer allows {buffered}")]
	QuoteStale { required: U256, buffered: U256 },
	/// No client handle exists for a chain named by the plan.
	#[error("no client for chain {0}")]
	MissingClient(ChainId),
	/// The plan violates a structural invariant.
	#[error("malformed plan: {0}")]
	InvalidPlan(String),
	#[error(transparent)]
	Intent(#[from] IntentError),
	#[error(transparent)]
	Signing(#[from] SigningError),
	#[error(transparent)]
	Client(#[from] ClientError),
	#[error(transparent)]
	Cache(#[from] CacheError),
	#[error(transparent)]
	Registry(#[from] RegistryError),
	#[error(transparent)]
	Family(#[from] FamilyError),
	#[error(transparent)]
	Planner(#[from] PlannerError),
	#[error(transparent)]
	Aggregator(#[from] AggregatorError),
	#[error(transparent)]
	Settlement(#[from] SettlementError),
}
