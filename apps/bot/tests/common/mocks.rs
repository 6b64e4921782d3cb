//! In-memory doubles for the transport, data sources and request log

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::Notify;

use motbot::error::{AppError, AppResult};
use motbot::models::{ChatProfile, NewUsageEvent, UsageStats};
use motbot::sources::{SourceError, VehicleDataSource};
use motbot::transport::{Transport, TransportError};

// =============================================================================
// Transport
// =============================================================================

/// Records every delivered message and serves canned chat profiles
#[derive(Default)]
pub struct MockTransport {
    sent: Mutex<Vec<(i64, String)>>,
    send_attempts: AtomicUsize,
    fail_sends: AtomicBool,
    profiles: Mutex<HashMap<i64, ChatProfile>>,
    notify: Notify,
}

impl MockTransport {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn with_profile(self: Arc<Self>, profile: ChatProfile) -> Arc<Self> {
        self.profiles.lock().unwrap().insert(profile.id, profile);
        self
    }

    pub fn set_fail_sends(&self, fail: bool) {
        self.fail_sends.store(fail, Ordering::SeqCst);
    }

    pub fn sent(&self) -> Vec<(i64, String)> {
        self.sent.lock().unwrap().clone()
    }

    pub fn sent_texts(&self) -> Vec<String> {
        self.sent().into_iter().map(|(_, text)| text).collect()
    }

    pub fn send_attempts(&self) -> usize {
        self.send_attempts.load(Ordering::SeqCst)
    }

    /// Waits until at least `count` messages were delivered
    pub async fn wait_for_sent(&self, count: usize) -> Vec<(i64, String)> {
        tokio::time::timeout(Duration::from_secs(5), async {
            loop {
                let sent = self.sent();
                if sent.len() >= count {
                    return sent;
                }
                self.notify.notified().await;
            }
        })
        .await
        .expect("timed out waiting for sent messages")
    }
}

#[async_trait]
impl Transport for MockTransport {
    async fn send(&self, chat_id: i64, text: &str) -> Result<(), TransportError> {
        self.send_attempts.fetch_add(1, Ordering::SeqCst);

        if self.fail_sends.load(Ordering::SeqCst) {
            return Err(TransportError::Request("connection reset".to_string()));
        }

        self.sent.lock().unwrap().push((chat_id, text.to_string()));
        self.notify.notify_one();
        Ok(())
    }

    async fn resolve_identity(&self, chat_id: i64) -> Result<ChatProfile, TransportError> {
        self.profiles
            .lock()
            .unwrap()
            .get(&chat_id)
            .cloned()
            .ok_or_else(|| TransportError::Api {
                code: 400,
                description: "Bad Request: chat not found".to_string(),
            })
    }
}

// =============================================================================
// Data Sources
// =============================================================================

/// Sets a flag when a fetch future is dropped before it completes
struct CancelGuard {
    flag: Arc<AtomicBool>,
    armed: bool,
}

impl Drop for CancelGuard {
    fn drop(&mut self) {
        if self.armed {
            self.flag.store(true, Ordering::SeqCst);
        }
    }
}

/// Data source returning a fixed outcome after an optional delay
pub struct StubSource<R> {
    /// `None` means the fetch never completes
    outcome: Option<Result<R, SourceError>>,
    delay: Duration,
    calls: AtomicUsize,
    registrations: Mutex<Vec<String>>,
    cancelled: Arc<AtomicBool>,
}

impl<R> StubSource<R> {
    fn with_outcome(outcome: Option<Result<R, SourceError>>) -> Self {
        Self {
            outcome,
            delay: Duration::ZERO,
            calls: AtomicUsize::new(0),
            registrations: Mutex::new(Vec::new()),
            cancelled: Arc::new(AtomicBool::new(false)),
        }
    }

    pub fn ok(record: R) -> Self {
        Self::with_outcome(Some(Ok(record)))
    }

    pub fn err(error: SourceError) -> Self {
        Self::with_outcome(Some(Err(error)))
    }

    pub fn never() -> Self {
        Self::with_outcome(None)
    }

    pub fn after(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn registrations(&self) -> Vec<String> {
        self.registrations.lock().unwrap().clone()
    }

    /// Whether a fetch was dropped before finishing
    pub fn was_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl<R> VehicleDataSource for StubSource<R>
where
    R: Clone + Send + Sync + 'static,
{
    type Record = R;

    async fn fetch(&self, registration: &str) -> Result<R, SourceError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.registrations
            .lock()
            .unwrap()
            .push(registration.to_string());

        let mut guard = CancelGuard {
            flag: self.cancelled.clone(),
            armed: true,
        };

        let outcome = match &self.outcome {
            Some(outcome) => outcome.clone(),
            None => std::future::pending().await,
        };
        tokio::time::sleep(self.delay).await;

        guard.armed = false;
        outcome
    }
}

// =============================================================================
// Usage Recorder
// =============================================================================

/// Request log double with canned stats
#[derive(Default)]
pub struct MockRecorder {
    events: Mutex<Vec<NewUsageEvent>>,
    stats: UsageStats,
    fail: bool,
    append_calls: AtomicUsize,
    stats_calls: AtomicUsize,
}

impl MockRecorder {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn with_stats(stats: UsageStats) -> Arc<Self> {
        Arc::new(Self {
            stats,
            ..Self::default()
        })
    }

    pub fn failing() -> Arc<Self> {
        Arc::new(Self {
            fail: true,
            ..Self::default()
        })
    }

    pub fn events(&self) -> Vec<NewUsageEvent> {
        self.events.lock().unwrap().clone()
    }

    pub fn append_calls(&self) -> usize {
        self.append_calls.load(Ordering::SeqCst)
    }

    pub fn stats_calls(&self) -> usize {
        self.stats_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl motbot::services::UsageRecorder for MockRecorder {
    async fn append(&self, event: &NewUsageEvent) -> AppResult<()> {
        self.append_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail {
            return Err(AppError::Database(sqlx::Error::PoolClosed));
        }
        self.events.lock().unwrap().push(event.clone());
        Ok(())
    }

    async fn stats(&self) -> AppResult<UsageStats> {
        self.stats_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail {
            return Err(AppError::Database(sqlx::Error::PoolClosed));
        }
        Ok(self.stats)
    }
}
