//! # Print Queue
//!
//! A FIFO-with-retry queue in front of one [`Transport`].
//!
//! ## States
//!
//! ```text
//!            submit                 send ok, queue empty
//!   Idle ───────────► Sending ─────────────────────────► Idle
//!                       │  ▲
//!        send failed,   │  │ retry delay elapsed
//!        attempts < 3   ▼  │
//!                     Requeued
//!                       │
//!        third failure  ▼
//!                     Failed  (job dropped, PrintFailed reported)
//! ```
//!
//! Only one job is in flight per client. A failed job goes back to the
//! **front** of the queue, so retries run before newer jobs. A job is
//! attempted at most [`MAX_ATTEMPTS`] times. A transport that panics loses
//! only the job it was sending; the queue keeps draining.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::oneshot;
use tracing::{error, info, warn};
use uuid::Uuid;

use super::Transport;
use crate::error::{DocketError, Result};

/// Attempts per job, counting the first.
pub const MAX_ATTEMPTS: u32 = 3;

/// Queue timing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueueOptions {
    /// Pause before retrying a failed job
    #[serde(default = "default_retry_delay_ms")]
    pub retry_delay_ms: u64,
    /// Upper bound on one send attempt
    #[serde(default = "default_send_timeout_ms")]
    pub send_timeout_ms: u64,
}

fn default_retry_delay_ms() -> u64 {
    1_000
}

fn default_send_timeout_ms() -> u64 {
    30_000
}

impl Default for QueueOptions {
    fn default() -> Self {
        Self {
            retry_delay_ms: default_retry_delay_ms(),
            send_timeout_ms: default_send_timeout_ms(),
        }
    }
}

impl QueueOptions {
    pub fn retry_delay(&self) -> Duration {
        Duration::from_millis(self.retry_delay_ms)
    }

    pub fn send_timeout(&self) -> Duration {
        Duration::from_millis(self.send_timeout_ms)
    }
}

/// One queued print.
#[derive(Debug, Clone)]
pub struct PrintJob {
    pub id: String,
    pub payload: Arc<[u8]>,
    pub created_at: DateTime<Utc>,
    /// Failed attempts so far; never decreases, never exceeds `MAX_ATTEMPTS - 1`
    pub retry_count: u32,
}

impl PrintJob {
    pub fn new(payload: Vec<u8>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            payload: payload.into(),
            created_at: Utc::now(),
            retry_count: 0,
        }
    }
}

/// Where the client is in its send cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ClientState {
    Idle,
    Sending,
    Requeued,
    Failed,
}

/// Result of a delivered job.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct JobReport {
    pub job_id: String,
    pub attempts: u32,
    pub retry_count: u32,
}

/// Snapshot of the queue.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct QueueStatus {
    pub state: ClientState,
    pub pending: usize,
    pub in_flight: Option<String>,
    pub transport: &'static str,
}

type Reply = oneshot::Sender<Result<JobReport>>;

struct Entry {
    job: PrintJob,
    reply: Reply,
}

struct Inner {
    queue: VecDeque<Entry>,
    draining: bool,
    state: ClientState,
    in_flight: Option<String>,
}

/// Resolves when a submitted job is delivered, dropped or cancelled.
#[derive(Debug)]
pub struct JobHandle {
    job_id: String,
    rx: oneshot::Receiver<Result<JobReport>>,
}

impl JobHandle {
    pub fn job_id(&self) -> &str {
        &self.job_id
    }

    pub async fn wait(self) -> Result<JobReport> {
        self.rx.await.map_err(|_| {
            DocketError::Transport(format!("Print queue dropped job {}", self.job_id))
        })?
    }
}

/// Retrying print client bound to one transport.
#[derive(Clone)]
pub struct PrinterClient {
    transport: Arc<dyn Transport>,
    options: QueueOptions,
    inner: Arc<Mutex<Inner>>,
}

impl PrinterClient {
    pub fn new(transport: Arc<dyn Transport>, options: QueueOptions) -> Self {
        Self {
            transport,
            options,
            inner: Arc::new(Mutex::new(Inner {
                queue: VecDeque::new(),
                draining: false,
                state: ClientState::Idle,
                in_flight: None,
            })),
        }
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Queue an encoded payload. Must be called inside a Tokio runtime.
    pub fn submit(&self, payload: Vec<u8>) -> JobHandle {
        let job = PrintJob::new(payload);
        let (tx, rx) = oneshot::channel();
        let job_id = job.id.clone();

        let start = {
            let mut inner = self.lock();
            inner.queue.push_back(Entry { job, reply: tx });
            let start = !inner.draining;
            inner.draining = true;
            start
        };

        info!(job_id = %job_id, transport = self.transport.kind(), "Print job queued");
        if start {
            tokio::spawn(self.clone().drain());
        }

        JobHandle { job_id, rx }
    }

    /// Submit and wait for the outcome.
    pub async fn print(&self, payload: Vec<u8>) -> Result<JobReport> {
        self.submit(payload).wait().await
    }

    /// Remove a job that has not started sending. Returns whether it was found.
    pub fn cancel(&self, job_id: &str) -> bool {
        let entry = {
            let mut inner = self.lock();
            let Some(pos) = inner.queue.iter().position(|e| e.job.id == job_id) else {
                return false;
            };
            inner.queue.remove(pos)
        };

        match entry {
            Some(entry) => {
                info!(job_id, "Print job cancelled");
                let _ = entry.reply.send(Err(DocketError::JobCancelled(job_id.to_string())));
                true
            }
            None => false,
        }
    }

    pub fn status(&self) -> QueueStatus {
        let inner = self.lock();
        QueueStatus {
            state: inner.state,
            pending: inner.queue.len(),
            in_flight: inner.in_flight.clone(),
            transport: self.transport.kind(),
        }
    }

    async fn drain(self) {
        let mut guard = DrainGuard {
            client: self.clone(),
            finished: false,
        };
        loop {
            let entry = {
                let mut inner = self.lock();
                match inner.queue.pop_front() {
                    Some(entry) => {
                        inner.state = ClientState::Sending;
                        inner.in_flight = Some(entry.job.id.clone());
                        entry
                    }
                    None => {
                        inner.draining = false;
                        inner.in_flight = None;
                        if inner.state != ClientState::Failed {
                            inner.state = ClientState::Idle;
                        }
                        guard.finished = true;
                        return;
                    }
                }
            };
            self.dispatch(entry).await;
        }
    }

    async fn dispatch(&self, mut entry: Entry) {
        let job_id = entry.job.id.clone();
        let attempt = entry.job.retry_count + 1;
        info!(
            job_id = %job_id,
            attempt,
            transport = self.transport.kind(),
            bytes = entry.job.payload.len(),
            "Sending print job"
        );

        let result = match tokio::time::timeout(
            self.options.send_timeout(),
            self.transport.send(&entry.job.payload),
        )
        .await
        {
            Ok(result) => result,
            Err(_) => Err(DocketError::Transport(format!(
                "Send timed out after {:?}",
                self.options.send_timeout()
            ))),
        };

        match result {
            Ok(()) => {
                info!(job_id = %job_id, attempt, "Print job delivered");
                {
                    let mut inner = self.lock();
                    inner.state = ClientState::Idle;
                    inner.in_flight = None;
                }
                let _ = entry.reply.send(Ok(JobReport {
                    job_id,
                    attempts: attempt,
                    retry_count: entry.job.retry_count,
                }));
            }
            Err(e) if attempt < MAX_ATTEMPTS => {
                warn!(job_id = %job_id, attempt, error = %e, "Print attempt failed, requeueing");
                entry.job.retry_count += 1;
                {
                    let mut inner = self.lock();
                    inner.state = ClientState::Requeued;
                    inner.in_flight = None;
                    inner.queue.push_front(entry);
                }
                if !self.options.retry_delay().is_zero() {
                    tokio::time::sleep(self.options.retry_delay()).await;
                }
            }
            Err(e) => {
                error!(job_id = %job_id, attempts = attempt, error = %e, "Print job failed");
                {
                    let mut inner = self.lock();
                    inner.state = ClientState::Failed;
                    inner.in_flight = None;
                }
                let _ = entry.reply.send(Err(DocketError::PrintFailed {
                    job_id,
                    attempts: attempt,
                    last_error: e.to_string(),
                }));
            }
        }
    }
}

/// Recovers the queue when a drain task ends without emptying it, which
/// happens when a transport panics or the task is dropped mid-send.
///
/// The in-flight job is lost (its waiter sees the queue drop it). Remaining
/// jobs get a fresh drain task, or wait for the next `submit` when no
/// runtime is available.
struct DrainGuard {
    client: PrinterClient,
    finished: bool,
}

impl Drop for DrainGuard {
    fn drop(&mut self) {
        if self.finished {
            return;
        }

        let runtime = tokio::runtime::Handle::try_current().ok();
        let restart = {
            let mut inner = self.client.lock();
            if let Some(job_id) = inner.in_flight.take() {
                error!(job_id = %job_id, "Print worker stopped mid-send, job dropped");
            }
            inner.state = ClientState::Failed;
            let restart = runtime.is_some() && !inner.queue.is_empty();
            inner.draining = restart;
            restart
        };

        if let (true, Some(runtime)) = (restart, runtime) {
            runtime.spawn(self.client.clone().drain());
        }
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicU32, Ordering};

    /// Fails the first `failures` sends, then succeeds. Records payloads.
    struct Flaky {
        failures: u32,
        calls: AtomicU32,
        sent: Mutex<Vec<Vec<u8>>>,
    }

    impl Flaky {
        fn new(failures: u32) -> Arc<Self> {
            Arc::new(Self {
                failures,
                calls: AtomicU32::new(0),
                sent: Mutex::new(Vec::new()),
            })
        }
    }

    #[async_trait]
    impl Transport for Flaky {
        fn kind(&self) -> &'static str {
            "stub"
        }

        async fn send(&self, payload: &[u8]) -> Result<()> {
            let n = self.calls.fetch_add(1, Ordering::SeqCst);
            self.sent.lock().unwrap().push(payload.to_vec());
            if n < self.failures {
                Err(DocketError::Transport(format!("stub failure {}", n + 1)))
            } else {
                Ok(())
            }
        }
    }

    /// Blocks every send until released.
    struct Gate(tokio::sync::Notify);

    #[async_trait]
    impl Transport for Gate {
        fn kind(&self) -> &'static str {
            "gate"
        }

        async fn send(&self, _payload: &[u8]) -> Result<()> {
            self.0.notified().await;
            Ok(())
        }
    }

    /// Panics on the first send, then succeeds.
    struct Panicky {
        calls: AtomicU32,
    }

    #[async_trait]
    impl Transport for Panicky {
        fn kind(&self) -> &'static str {
            "panicky"
        }

        async fn send(&self, _payload: &[u8]) -> Result<()> {
            if self.calls.fetch_add(1, Ordering::SeqCst) == 0 {
                panic!("driver crashed");
            }
            Ok(())
        }
    }

    fn fast() -> QueueOptions {
        QueueOptions {
            retry_delay_ms: 0,
            send_timeout_ms: 5_000,
        }
    }

    #[tokio::test]
    async fn test_fail_twice_then_succeed() {
        let stub = Flaky::new(2);
        let client = PrinterClient::new(stub.clone(), fast());

        let report = client.print(vec![1, 2, 3]).await.unwrap();
        assert_eq!(report.attempts, 3);
        assert_eq!(report.retry_count, 2);
        assert_eq!(stub.calls.load(Ordering::SeqCst), 3);

        tokio::task::yield_now().await;
        assert_eq!(client.status().pending, 0);
    }

    #[tokio::test]
    async fn test_always_failing_stops_after_three_attempts() {
        let stub = Flaky::new(u32::MAX);
        let client = PrinterClient::new(stub.clone(), fast());

        let err = client.print(vec![9]).await.unwrap_err();
        match err {
            DocketError::PrintFailed {
                attempts,
                last_error,
                ..
            } => {
                assert_eq!(attempts, 3);
                assert!(last_error.contains("stub failure 3"));
            }
            other => panic!("expected PrintFailed, got {:?}", other),
        }

        // Give a stray fourth attempt the chance to happen
        tokio::time::sleep(Duration::from_millis(20)).await;
        assert_eq!(stub.calls.load(Ordering::SeqCst), 3);
        assert_eq!(client.status().state, ClientState::Failed);
    }

    #[tokio::test]
    async fn test_failed_job_retries_before_newer_jobs() {
        let stub = Flaky::new(1);
        let client = PrinterClient::new(stub.clone(), fast());

        let first = client.submit(vec![b'A']);
        let second = client.submit(vec![b'B']);
        first.wait().await.unwrap();
        second.wait().await.unwrap();

        let sent = stub.sent.lock().unwrap().clone();
        assert_eq!(sent, vec![vec![b'A'], vec![b'A'], vec![b'B']]);
    }

    #[tokio::test]
    async fn test_one_job_in_flight_and_cancel_queued() {
        let gate = Arc::new(Gate(tokio::sync::Notify::new()));
        let client = PrinterClient::new(gate.clone(), fast());

        let first = client.submit(vec![1]);
        let second = client.submit(vec![2]);
        tokio::time::sleep(Duration::from_millis(20)).await;

        let status = client.status();
        assert_eq!(status.state, ClientState::Sending);
        assert_eq!(status.in_flight.as_deref(), Some(first.job_id()));
        assert_eq!(status.pending, 1);

        // The in-flight job cannot be cancelled; the queued one can
        assert!(!client.cancel(first.job_id()));
        let second_id = second.job_id().to_string();
        assert!(client.cancel(&second_id));
        assert!(matches!(
            second.wait().await,
            Err(DocketError::JobCancelled(id)) if id == second_id
        ));

        gate.0.notify_one();
        first.wait().await.unwrap();
        tokio::task::yield_now().await;
        assert_eq!(client.status().pending, 0);
    }

    #[tokio::test]
    async fn test_send_timeout_counts_as_failure() {
        let gate = Arc::new(Gate(tokio::sync::Notify::new()));
        let client = PrinterClient::new(
            gate,
            QueueOptions {
                retry_delay_ms: 0,
                send_timeout_ms: 10,
            },
        );
        let err = client.print(vec![1]).await.unwrap_err();
        assert!(matches!(err, DocketError::PrintFailed { attempts: 3, .. }));
    }

    #[tokio::test]
    async fn test_panicking_transport_does_not_wedge_queue() {
        let stub = Arc::new(Panicky {
            calls: AtomicU32::new(0),
        });
        let client = PrinterClient::new(stub.clone(), fast());

        let err = client.print(vec![1]).await.unwrap_err();
        assert!(matches!(err, DocketError::Transport(msg) if msg.contains("dropped job")));
        tokio::task::yield_now().await;
        assert_eq!(client.status().state, ClientState::Failed);
        assert_eq!(client.status().in_flight, None);

        // A later job still gets a worker
        let report = tokio::time::timeout(Duration::from_secs(2), client.print(vec![2]))
            .await
            .expect("queue stuck after panic")
            .unwrap();
        assert_eq!(report.attempts, 1);
        assert_eq!(stub.calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_jobs_queued_behind_a_panic_still_send() {
        let stub = Arc::new(Panicky {
            calls: AtomicU32::new(0),
        });
        let client = PrinterClient::new(stub.clone(), fast());

        let first = client.submit(vec![1]);
        let second = client.submit(vec![2]);
        assert!(first.wait().await.is_err());

        let report = tokio::time::timeout(Duration::from_secs(2), second.wait())
            .await
            .expect("queued job never sent")
            .unwrap();
        assert_eq!(report.attempts, 1);

        tokio::task::yield_now().await;
        let status = client.status();
        assert_eq!(status.state, ClientState::Idle);
        assert_eq!(status.pending, 0);
    }

    #[test]
    fn test_options_defaults_from_json() {
        let o: QueueOptions = serde_json::from_str("{}").unwrap();
        assert_eq!(o, QueueOptions::default());
        assert_eq!(o.retry_delay(), Duration::from_secs(1));
    }

    #[tokio::test]
    async fn test_cancel_unknown_job() {
        let client = PrinterClient::new(Flaky::new(0), fast());
        assert!(!client.cancel("nope"));
        assert_eq!(client.status().state, ClientState::Idle);
    }
}
