// ── Synchronization engine ──
//
// Owns the transport client, the device store, and every background
// task. One engine per account; consumers hold clones (cheap, shared
// `Arc<Inner>`). The engine is the only writer to the store: a sync
// pass fetches the full device list, normalizes it, and replaces the
// map wholesale. Failed passes leave the map at last-known-good.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use cooplink_api::CoopClient;

use crate::config::PollingInterval;
use crate::error::CoreError;
use crate::normalize::normalize;
use crate::store::DeviceStore;

/// The main entry point for consumers.
///
/// Cheaply cloneable. Manages polling, on-demand refresh, and the
/// detached tasks spawned on behalf of dispatch and webhook events.
#[derive(Clone)]
pub struct SyncEngine {
    inner: Arc<EngineInner>,
}

struct EngineInner {
    client: CoopClient,
    store: DeviceStore,
    cancel: CancellationToken,

    // Pass coalescing: one pass at a time; a caller that waited behind
    // a pass adopts its outcome instead of fetching again.
    pass_lock: Mutex<()>,
    passes_completed: AtomicU64,
    last_outcome: Mutex<Option<Result<(), String>>>,

    poll_cancel: Mutex<Option<CancellationToken>>,
    task_handles: Mutex<Vec<JoinHandle<()>>>,
}

impl SyncEngine {
    /// Create an engine around a client. No timer runs until
    /// [`set_polling_interval`](Self::set_polling_interval) is called.
    pub fn new(client: CoopClient) -> Self {
        Self {
            inner: Arc::new(EngineInner {
                client,
                store: DeviceStore::new(),
                cancel: CancellationToken::new(),
                pass_lock: Mutex::new(()),
                passes_completed: AtomicU64::new(0),
                last_outcome: Mutex::new(None),
                poll_cancel: Mutex::new(None),
                task_handles: Mutex::new(Vec::new()),
            }),
        }
    }

    /// Access the device store.
    pub fn store(&self) -> &DeviceStore {
        &self.inner.store
    }

    /// `GET /whoami` -- confirms the API key before anything else runs.
    pub async fn validate_credentials(&self) -> Result<(), CoreError> {
        self.inner.client.whoami().await?;
        Ok(())
    }

    /// Direct access to the transport client, for dispatch.
    pub(crate) fn client(&self) -> &CoopClient {
        &self.inner.client
    }

    // ── Refresh ──────────────────────────────────────────────────────

    /// Run one sync pass, or adopt the outcome of a pass that completed
    /// while this caller was waiting its turn.
    pub async fn refresh(&self) -> Result<(), CoreError> {
        if self.inner.cancel.is_cancelled() {
            return Err(CoreError::ShutDown);
        }

        let seen = self.inner.passes_completed.load(Ordering::Acquire);
        let _guard = self.inner.pass_lock.lock().await;

        if self.inner.passes_completed.load(Ordering::Acquire) > seen {
            // Coalesced: someone else just synced. Their result stands.
            return match &*self.inner.last_outcome.lock().await {
                Some(Ok(())) | None => Ok(()),
                Some(Err(message)) => Err(CoreError::RefreshFailed {
                    message: message.clone(),
                }),
            };
        }

        let result = self.run_pass().await;
        *self.inner.last_outcome.lock().await = Some(match &result {
            Ok(()) => Ok(()),
            Err(e) => Err(e.to_string()),
        });
        self.inner.passes_completed.fetch_add(1, Ordering::Release);
        result
    }

    async fn run_pass(&self) -> Result<(), CoreError> {
        let batch = self.inner.client.list_devices().await?;
        let map = normalize(batch)?;
        let count = map.len();
        self.inner.store.replace_all(map);
        debug!(devices = count, "sync pass complete");
        Ok(())
    }

    /// Fire-and-forget refresh. Failures go to the log, not the caller.
    pub async fn schedule_refresh(&self) {
        let engine = self.clone();
        let cancel = self.inner.cancel.clone();
        let handle = tokio::spawn(async move {
            tokio::select! {
                biased;
                () = cancel.cancelled() => {}
                result = engine.refresh() => {
                    if let Err(e) = result {
                        warn!(error = %e, "scheduled refresh failed");
                    }
                }
            }
        });
        self.track(handle).await;
    }

    /// Schedule one delayed refresh per entry in `delays`. Used after a
    /// dispatch to catch slow-moving hardware (a door takes seconds to
    /// finish travelling).
    pub async fn schedule_followups(&self, delays: &[Duration]) {
        let mut handles = self.inner.task_handles.lock().await;
        handles.retain(|h| !h.is_finished());
        for &delay in delays {
            let engine = self.clone();
            let cancel = self.inner.cancel.clone();
            handles.push(tokio::spawn(async move {
                tokio::select! {
                    biased;
                    () = cancel.cancelled() => return,
                    () = tokio::time::sleep(delay) => {}
                }
                if let Err(e) = engine.refresh().await {
                    warn!(error = %e, delay_ms = delay.as_millis() as u64, "follow-up refresh failed");
                }
            }));
        }
    }

    // ── Polling ──────────────────────────────────────────────────────

    /// Install (or replace) the poll timer. `Disabled` tears the timer
    /// down without starting a new one; on-demand and webhook-driven
    /// refreshes keep working.
    pub async fn set_polling_interval(&self, interval: PollingInterval) {
        let mut poll_cancel = self.inner.poll_cancel.lock().await;
        if let Some(old) = poll_cancel.take() {
            old.cancel();
        }

        let Some(period) = interval.effective() else {
            debug!("polling disabled");
            return;
        };

        let child = self.inner.cancel.child_token();
        *poll_cancel = Some(child.clone());

        let engine = self.clone();
        let handle = tokio::spawn(poll_task(engine, period, child));
        self.track(handle).await;
        debug!(period_secs = period.as_secs(), "polling enabled");
    }

    /// Track a background task, first dropping handles whose tasks have
    /// already finished so a long-running host does not accumulate one
    /// handle per dispatch.
    async fn track(&self, handle: JoinHandle<()>) {
        let mut handles = self.inner.task_handles.lock().await;
        handles.retain(|h| !h.is_finished());
        handles.push(handle);
    }

    /// Number of tracked background task handles. Finished tasks are
    /// reaped whenever a new one is scheduled.
    pub async fn task_count(&self) -> usize {
        self.inner.task_handles.lock().await.len()
    }

    // ── Lifecycle ────────────────────────────────────────────────────

    /// Cancel every background task and wait for them to finish. No
    /// pass starts after this returns.
    pub async fn shutdown(&self) {
        self.inner.cancel.cancel();

        let mut handles = self.inner.task_handles.lock().await;
        for handle in handles.drain(..) {
            let _ = handle.await;
        }
        debug!("engine shut down");
    }

    pub fn is_shut_down(&self) -> bool {
        self.inner.cancel.is_cancelled()
    }
}

// ── Background tasks ─────────────────────────────────────────────────

/// Periodic poll loop. The first tick fires after one full period; the
/// initial load is the caller's explicit `refresh()`.
async fn poll_task(engine: SyncEngine, period: Duration, cancel: CancellationToken) {
    let mut interval = tokio::time::interval(period);
    interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
    interval.tick().await; // consume the immediate first tick

    loop {
        tokio::select! {
            biased;
            () = cancel.cancelled() => break,
            _ = interval.tick() => {
                if let Err(e) = engine.refresh().await {
                    warn!(error = %e, "periodic refresh failed");
                }
            }
        }
    }
}
