//! In-memory fakes for the execution client (testing only)
//!
//! Provides `FakeExecutionClient`, which satisfies the `ExecutionClient`
//! contract from a scripted sequence of poll outcomes without any network.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use serde_json::Value;

use crate::client::{
    ExecutionClient, InputValueMap, ResultSet, RunHandle, RunStatus, TransportResult,
};
use crate::error::TransportError;

/// Scripted `ExecutionClient` backed by a queue of poll outcomes.
///
/// `submit_run` returns the configured initial status; each
/// `get_run_status` call pops the next scripted outcome, and an exhausted
/// script keeps reporting `Running`. Call counters record traffic so tests
/// can assert on the exact number of status and dataset requests.
pub struct FakeExecutionClient {
    run_id: String,
    submit_outcome: TransportResult<RunStatus>,
    script: Mutex<VecDeque<TransportResult<RunStatus>>>,
    dataset: Vec<Value>,
    submit_count: AtomicU32,
    status_count: AtomicU32,
    dataset_count: AtomicU32,
}

impl FakeExecutionClient {
    /// Client whose submission succeeds with the given initial status.
    pub fn new(submit_status: RunStatus) -> Self {
        FakeExecutionClient {
            run_id: uuid::Uuid::new_v4().to_string(),
            submit_outcome: Ok(submit_status),
            script: Mutex::new(VecDeque::new()),
            dataset: Vec::new(),
            submit_count: AtomicU32::new(0),
            status_count: AtomicU32::new(0),
            dataset_count: AtomicU32::new(0),
        }
    }

    /// Client whose submission fails with the given transport error.
    pub fn failing_submit(error: TransportError) -> Self {
        let mut fake = Self::new(RunStatus::Ready);
        fake.submit_outcome = Err(error);
        fake
    }

    /// Append successful poll outcomes to the script.
    pub fn with_polls(self, statuses: impl IntoIterator<Item = RunStatus>) -> Self {
        {
            let mut script = self.script.lock().unwrap();
            script.extend(statuses.into_iter().map(Ok));
        }
        self
    }

    /// Append a failing poll outcome to the script.
    pub fn with_poll_error(self, error: TransportError) -> Self {
        self.script.lock().unwrap().push_back(Err(error));
        self
    }

    /// Dataset returned once the run succeeds.
    pub fn with_dataset(mut self, items: Vec<Value>) -> Self {
        self.dataset = items;
        self
    }

    /// The run id handed out by `submit_run`.
    pub fn run_id(&self) -> &str {
        &self.run_id
    }

    /// Number of `submit_run` calls observed.
    pub fn submit_calls(&self) -> u32 {
        self.submit_count.load(Ordering::Relaxed)
    }

    /// Number of `get_run_status` calls observed.
    pub fn status_calls(&self) -> u32 {
        self.status_count.load(Ordering::Relaxed)
    }

    /// Number of `get_dataset_items` calls observed.
    pub fn dataset_calls(&self) -> u32 {
        self.dataset_count.load(Ordering::Relaxed)
    }

    fn handle(&self, status: RunStatus) -> RunHandle {
        RunHandle {
            run_id: self.run_id.clone(),
            status,
        }
    }
}

#[async_trait]
impl ExecutionClient for FakeExecutionClient {
    async fn submit_run(
        &self,
        _actor_id: &str,
        _input: InputValueMap,
    ) -> TransportResult<RunHandle> {
        self.submit_count.fetch_add(1, Ordering::Relaxed);
        self.submit_outcome.clone().map(|status| self.handle(status))
    }

    async fn get_run_status(&self, _actor_id: &str, run_id: &str) -> TransportResult<RunHandle> {
        self.status_count.fetch_add(1, Ordering::Relaxed);
        if run_id != self.run_id {
            return Err(TransportError::NotFound);
        }
        let next = self.script.lock().unwrap().pop_front();
        match next {
            Some(outcome) => outcome.map(|status| self.handle(status)),
            // Exhausted script: the run just keeps running.
            None => Ok(self.handle(RunStatus::Running)),
        }
    }

    async fn get_dataset_items(
        &self,
        _actor_id: &str,
        run_id: &str,
    ) -> TransportResult<ResultSet> {
        self.dataset_count.fetch_add(1, Ordering::Relaxed);
        if run_id != self.run_id {
            return Err(TransportError::NotFound);
        }
        Ok(self.dataset.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_script_pops_in_order() {
        let fake = FakeExecutionClient::new(RunStatus::Ready)
            .with_polls([RunStatus::Running, RunStatus::Succeeded]);

        let handle = fake.submit_run("actor", InputValueMap::new()).await.unwrap();
        assert_eq!(handle.status, RunStatus::Ready);

        let first = fake.get_run_status("actor", &handle.run_id).await.unwrap();
        assert_eq!(first.status, RunStatus::Running);
        let second = fake.get_run_status("actor", &handle.run_id).await.unwrap();
        assert_eq!(second.status, RunStatus::Succeeded);
        // Exhausted script falls back to Running.
        let third = fake.get_run_status("actor", &handle.run_id).await.unwrap();
        assert_eq!(third.status, RunStatus::Running);
    }

    #[tokio::test]
    async fn test_unknown_run_id_is_not_found() {
        let fake = FakeExecutionClient::new(RunStatus::Ready);
        let err = fake.get_run_status("actor", "no-such-run").await.unwrap_err();
        assert_eq!(err, TransportError::NotFound);
    }
}
