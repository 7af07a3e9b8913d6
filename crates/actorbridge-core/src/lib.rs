//! Actorbridge core
//!
//! Client-side building blocks for running provider-hosted actors
//! (parameterized automation jobs): fetch an actor's declared input schema,
//! compile user edits into validated input values, submit a run, poll it to
//! completion, and collect the resulting dataset.
//!
//! ## Key components
//!
//! - `SchemaModel`: ordered, strongly typed view of an actor's input schema
//! - `FormCompiler`: default seeding, validation, and text coercion for
//!   input values
//! - `ExecutionClient`: async transport contract (submit / poll / fetch),
//!   with `HttpExecutionClient` as the provider-backed implementation and
//!   `fakes::FakeExecutionClient` for tests
//! - `RunLifecycleManager`: submit → poll → terminal classification →
//!   dataset, under a wall-clock budget

pub mod client;
mod error;
pub mod fakes;
mod form;
mod http;
mod lifecycle;
mod schema;
mod session;

pub use client::{
    ActorSource, ActorSummary, ExecutionClient, InputValueMap, ResultSet, RunHandle, RunStatus,
    TransportResult,
};
pub use error::{CredentialError, ExecuteError, RunError, SchemaError, TransportError};
pub use form::{FormCompiler, ValidationError, ValidationReason};
pub use http::{HttpExecutionClient, ProviderConfig};
pub use lifecycle::{PollConfig, RunLifecycleManager};
pub use schema::{ArrayItemShape, PropertyDescriptor, PropertyKind, SchemaModel};
pub use session::{Credential, Session};
