//! Error types for actorbridge-core

use thiserror::Error;

/// Errors raised while constructing a schema model from a raw document
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SchemaError {
    /// The document cannot be used as an input schema
    #[error("malformed schema: {detail}")]
    Malformed { detail: String },
}

/// Transport-level failures from the provider API
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TransportError {
    /// Credential was rejected by the provider
    #[error("unauthorized: credential rejected by the provider")]
    Unauthorized,

    /// The requested resource does not exist
    #[error("resource not found")]
    NotFound,

    /// Too many requests
    #[error("rate limit exceeded")]
    RateLimited,

    /// Any other provider-side failure, carrying the upstream status
    #[error("upstream error (status {status}): {detail}")]
    Upstream { status: u16, detail: String },
}

/// Terminal run failures raised by the lifecycle manager
///
/// Always terminal: the manager never retries after one of these.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RunError {
    /// The provider reported the run as failed
    #[error("run failed on the provider")]
    Failed,

    /// The provider reported the run as aborted
    #[error("run aborted on the provider")]
    Aborted,

    /// The wall-clock budget elapsed before the run reached a terminal state
    #[error("run timed out after {elapsed_ms}ms (budget {budget_ms}ms)")]
    Timeout { elapsed_ms: u64, budget_ms: u64 },

    /// The provider expired the run under its own limit
    #[error("run timed out on the provider")]
    ProviderTimeout,

    /// The run disappeared from the provider mid-poll
    #[error("run not found: {run_id}")]
    RunNotFound { run_id: String },
}

/// Error surface of `RunLifecycleManager::execute`
///
/// Submit-time transport failures pass through verbatim; poll-time
/// classification surfaces as `Run`.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ExecuteError {
    #[error(transparent)]
    Transport(#[from] TransportError),

    #[error(transparent)]
    Run(#[from] RunError),
}

/// Credential construction failures
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CredentialError {
    /// Empty or whitespace-only token
    #[error("credential must be a non-empty string")]
    Empty,
}
