//! Execution client contract
//!
//! Defines the transport abstraction the lifecycle manager depends on:
//! submit a run, poll its status, fetch the finished dataset. The trait is
//! async and backend-agnostic; an in-memory fake is provided for testing via
//! the `fakes` module and an HTTP implementation via `HttpExecutionClient`.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::TransportError;

/// Result type for transport operations
pub type TransportResult<T> = std::result::Result<T, TransportError>;

/// Validated input values keyed by field name, in schema order.
///
/// Transient: produced by the form compiler, consumed once by submit.
pub type InputValueMap = serde_json::Map<String, Value>;

/// Ordered result records from a completed run.
///
/// Records are opaque and may be heterogeneous; provider order is preserved.
pub type ResultSet = Vec<Value>;

/// Lifecycle status of a remote run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RunStatus {
    Ready,
    Running,
    Succeeded,
    Failed,
    Aborted,
    TimedOut,
}

impl RunStatus {
    /// Whether no further transition can occur from this status.
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            RunStatus::Succeeded | RunStatus::Failed | RunStatus::Aborted | RunStatus::TimedOut
        )
    }
}

impl std::fmt::Display for RunStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RunStatus::Ready => write!(f, "READY"),
            RunStatus::Running => write!(f, "RUNNING"),
            RunStatus::Succeeded => write!(f, "SUCCEEDED"),
            RunStatus::Failed => write!(f, "FAILED"),
            RunStatus::Aborted => write!(f, "ABORTED"),
            RunStatus::TimedOut => write!(f, "TIMED_OUT"),
        }
    }
}

/// Handle to one execution instance of an actor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunHandle {
    /// Opaque provider-assigned run id.
    pub run_id: String,

    /// Last observed status.
    pub status: RunStatus,
}

/// Where a catalog entry came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ActorSource {
    /// Owned by the authenticated user.
    User,
    /// Public actor surfaced alongside the user's own.
    Public,
}

/// Catalog entry for a provider-hosted actor.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActorSummary {
    pub id: String,
    pub name: String,
    pub username: Option<String>,
    pub description: Option<String>,
    pub is_public: bool,
    pub is_deprecated: bool,
    pub created_at: Option<DateTime<Utc>>,
    pub modified_at: Option<DateTime<Utc>>,
    pub source: ActorSource,
}

/// Transport abstraction for run execution.
///
/// Guarantees the lifecycle manager relies on:
/// - `submit_run` returns a handle in `Ready` or `Running` state.
/// - `get_run_status` fails with `TransportError::NotFound` when the run is
///   unknown to the provider.
/// - `get_dataset_items` is meaningful once a run has `Succeeded`; calling
///   it earlier may return an empty set.
#[async_trait]
pub trait ExecutionClient: Send + Sync {
    /// Start a new run of the given actor with the supplied input.
    async fn submit_run(&self, actor_id: &str, input: InputValueMap)
        -> TransportResult<RunHandle>;

    /// Fetch the current status of a run.
    async fn get_run_status(&self, actor_id: &str, run_id: &str) -> TransportResult<RunHandle>;

    /// Fetch the ordered dataset produced by a completed run.
    async fn get_dataset_items(&self, actor_id: &str, run_id: &str) -> TransportResult<ResultSet>;
}
