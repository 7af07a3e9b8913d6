//! Run lifecycle orchestration
//!
//! Submits a run, polls the provider's status endpoint under a wall-clock
//! budget, classifies terminal vs. transient states, and fetches the final
//! dataset. The fixed poll interval is deliberate: these are short-lived
//! interactive jobs, not a batch system, and the provider offers no
//! callback channel.

use std::time::Duration;

use tokio::time::Instant;
use tracing::{debug, info, warn};

use crate::client::{ExecutionClient, InputValueMap, ResultSet, RunStatus};
use crate::error::{ExecuteError, RunError, TransportError};

/// Polling parameters for `execute`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollConfig {
    /// Total wall-clock budget for a run, submission included.
    pub timeout_budget: Duration,

    /// Fixed delay between status checks.
    pub poll_interval: Duration,
}

impl Default for PollConfig {
    fn default() -> Self {
        Self {
            timeout_budget: Duration::from_secs(60),
            poll_interval: Duration::from_secs(2),
        }
    }
}

/// Drives one run per `execute` call: submit, poll, classify, fetch.
///
/// Each call owns its handle and timer; concurrent calls for different runs
/// are independent. Status checks for a single run are strictly sequential
/// because the poll loop awaits each check before scheduling the next.
/// Dropping a pending `execute` future stops polling but does not cancel
/// the remote run; it finishes on its own.
pub struct RunLifecycleManager<C: ExecutionClient> {
    client: C,
    config: PollConfig,
}

impl<C: ExecutionClient> RunLifecycleManager<C> {
    /// Create a manager with default polling parameters.
    pub fn new(client: C) -> Self {
        Self::with_config(client, PollConfig::default())
    }

    /// Create a manager with explicit timeout budget and poll interval.
    pub fn with_config(client: C, config: PollConfig) -> Self {
        Self { client, config }
    }

    /// Execute a run to completion and return its dataset.
    ///
    /// Submission failures propagate verbatim and are never retried here.
    /// During polling, `SUCCEEDED` ends the loop with the dataset; `FAILED`
    /// and `ABORTED` end it with the matching `RunError`; a run that
    /// disappears mid-poll is fatal (`RunError::RunNotFound`); any other
    /// transport failure propagates immediately. Exceeding the budget while
    /// non-terminal yields `RunError::Timeout`; a `TIMED_OUT` status from
    /// the provider yields `RunError::ProviderTimeout` instead. Exactly one
    /// result or one error per call.
    pub async fn execute(
        &self,
        actor_id: &str,
        input: InputValueMap,
    ) -> Result<ResultSet, ExecuteError> {
        let started = Instant::now();
        let mut handle = self.client.submit_run(actor_id, input).await?;
        info!(actor_id, run_id = %handle.run_id, status = %handle.status, "run submitted");

        loop {
            match handle.status {
                RunStatus::Succeeded => {
                    debug!(run_id = %handle.run_id, "run succeeded, fetching dataset");
                    let items = self
                        .client
                        .get_dataset_items(actor_id, &handle.run_id)
                        .await?;
                    info!(run_id = %handle.run_id, records = items.len(), "run complete");
                    return Ok(items);
                }
                RunStatus::Failed => {
                    warn!(run_id = %handle.run_id, "run failed on provider");
                    return Err(RunError::Failed.into());
                }
                RunStatus::Aborted => {
                    warn!(run_id = %handle.run_id, "run aborted on provider");
                    return Err(RunError::Aborted.into());
                }
                RunStatus::TimedOut => {
                    // Terminal like Failed/Aborted; the local budget figures
                    // do not apply to a provider-side expiry.
                    warn!(run_id = %handle.run_id, "run timed out on provider");
                    return Err(RunError::ProviderTimeout.into());
                }
                RunStatus::Ready | RunStatus::Running => {
                    if started.elapsed() >= self.config.timeout_budget {
                        warn!(run_id = %handle.run_id, "run exceeded wall-clock budget");
                        return Err(self.timeout_error(started).into());
                    }
                    tokio::time::sleep(self.config.poll_interval).await;
                    handle = match self.client.get_run_status(actor_id, &handle.run_id).await {
                        Ok(next) => next,
                        Err(TransportError::NotFound) => {
                            // A run that disappears mid-poll cannot recover.
                            return Err(RunError::RunNotFound {
                                run_id: handle.run_id.clone(),
                            }
                            .into());
                        }
                        Err(other) => return Err(other.into()),
                    };
                    debug!(run_id = %handle.run_id, status = %handle.status, "poll");
                }
            }
        }
    }

    fn timeout_error(&self, started: Instant) -> RunError {
        RunError::Timeout {
            elapsed_ms: started.elapsed().as_millis() as u64,
            budget_ms: self.config.timeout_budget.as_millis() as u64,
        }
    }

    /// Consume the manager and return the underlying client.
    pub fn into_client(self) -> C {
        self.client
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fakes::FakeExecutionClient;
    use serde_json::json;

    fn config(budget_secs: u64, interval_secs: u64) -> PollConfig {
        PollConfig {
            timeout_budget: Duration::from_secs(budget_secs),
            poll_interval: Duration::from_secs(interval_secs),
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_ready_then_succeeded_fetches_dataset() {
        let client = FakeExecutionClient::new(RunStatus::Ready)
            .with_polls([RunStatus::Ready, RunStatus::Succeeded])
            .with_dataset(vec![json!({ "a": 1 })]);
        let manager = RunLifecycleManager::with_config(client, config(60, 2));

        let items = manager
            .execute("acme/crawler", InputValueMap::new())
            .await
            .expect("execute failed");

        assert_eq!(items, vec![json!({ "a": 1 })]);
        let client = manager.into_client();
        assert_eq!(client.submit_calls(), 1);
        assert_eq!(client.status_calls(), 2);
        assert_eq!(client.dataset_calls(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_failed_poll_raises_and_skips_dataset() {
        let client = FakeExecutionClient::new(RunStatus::Running)
            .with_polls([RunStatus::Running, RunStatus::Failed]);
        let manager = RunLifecycleManager::with_config(client, config(60, 2));

        let err = manager
            .execute("acme/crawler", InputValueMap::new())
            .await
            .unwrap_err();

        assert_eq!(err, ExecuteError::Run(RunError::Failed));
        let client = manager.into_client();
        assert_eq!(client.status_calls(), 2);
        assert_eq!(client.dataset_calls(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_aborted_is_terminal() {
        let client = FakeExecutionClient::new(RunStatus::Running).with_polls([RunStatus::Aborted]);
        let manager = RunLifecycleManager::with_config(client, config(60, 2));

        let err = manager
            .execute("acme/crawler", InputValueMap::new())
            .await
            .unwrap_err();

        assert_eq!(err, ExecuteError::Run(RunError::Aborted));
    }

    #[tokio::test(start_paused = true)]
    async fn test_provider_side_timeout_has_no_budget_figures() {
        let client =
            FakeExecutionClient::new(RunStatus::Running).with_polls([RunStatus::TimedOut]);
        let manager = RunLifecycleManager::with_config(client, config(60, 2));

        let err = manager
            .execute("acme/crawler", InputValueMap::new())
            .await
            .unwrap_err();

        assert_eq!(err, ExecuteError::Run(RunError::ProviderTimeout));
        assert_eq!(err.to_string(), "run timed out on the provider");
        assert_eq!(manager.into_client().dataset_calls(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_no_polls_after_terminal_status() {
        // Succeeded on the first poll: the loop must stop asking.
        let client = FakeExecutionClient::new(RunStatus::Ready)
            .with_polls([RunStatus::Succeeded, RunStatus::Running, RunStatus::Running])
            .with_dataset(vec![]);
        let manager = RunLifecycleManager::with_config(client, config(60, 2));

        manager
            .execute("acme/crawler", InputValueMap::new())
            .await
            .expect("execute failed");

        assert_eq!(manager.into_client().status_calls(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_submit_failure_propagates_verbatim() {
        let client = FakeExecutionClient::failing_submit(TransportError::Unauthorized);
        let manager = RunLifecycleManager::with_config(client, config(60, 2));

        let err = manager
            .execute("acme/crawler", InputValueMap::new())
            .await
            .unwrap_err();

        assert_eq!(err, ExecuteError::Transport(TransportError::Unauthorized));
        assert_eq!(manager.into_client().status_calls(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_vanished_run_is_fatal() {
        let client = FakeExecutionClient::new(RunStatus::Running)
            .with_polls([RunStatus::Running])
            .with_poll_error(TransportError::NotFound);
        let manager = RunLifecycleManager::with_config(client, config(60, 2));

        let err = manager
            .execute("acme/crawler", InputValueMap::new())
            .await
            .unwrap_err();

        match err {
            ExecuteError::Run(RunError::RunNotFound { run_id }) => assert!(!run_id.is_empty()),
            other => panic!("expected RunNotFound, got {other:?}"),
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_other_poll_transport_errors_propagate() {
        let client = FakeExecutionClient::new(RunStatus::Running)
            .with_poll_error(TransportError::RateLimited);
        let manager = RunLifecycleManager::with_config(client, config(60, 2));

        let err = manager
            .execute("acme/crawler", InputValueMap::new())
            .await
            .unwrap_err();

        assert_eq!(err, ExecuteError::Transport(TransportError::RateLimited));
    }

    #[tokio::test(start_paused = true)]
    async fn test_timeout_at_or_after_budget_never_before() {
        // Always RUNNING: the loop must give up once the budget elapses.
        let client = FakeExecutionClient::new(RunStatus::Running);
        let manager = RunLifecycleManager::with_config(client, config(10, 2));

        let begun = Instant::now();
        let err = manager
            .execute("acme/crawler", InputValueMap::new())
            .await
            .unwrap_err();

        assert!(begun.elapsed() >= Duration::from_secs(10));
        match err {
            ExecuteError::Run(RunError::Timeout {
                elapsed_ms,
                budget_ms,
            }) => {
                assert_eq!(budget_ms, 10_000);
                assert!(elapsed_ms >= budget_ms);
            }
            other => panic!("expected Timeout, got {other:?}"),
        }
        // Budget 10s at a 2s interval: polls at 2,4,6,8,10s, then the
        // elapsed check trips.
        assert_eq!(manager.into_client().status_calls(), 5);
    }
}
