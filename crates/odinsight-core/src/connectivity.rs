// ── Connectivity state machine ──
//
// Tracks whether upstream data is reachable and drives reconnection.
// `checking` is the initial state. Going offline starts a one-second
// countdown; at zero a single health check runs and either restores
// `online` or restarts the countdown. At most one countdown task is alive
// at any time, and `shutdown()` cancels everything.

use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, PoisonError, Weak};
use std::time::Duration;

use futures_util::future::BoxFuture;
use serde::{Deserialize, Serialize};
use strum::Display;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

/// Seconds counted down before a reconnection attempt.
pub const DEFAULT_COUNTDOWN_SECS: u32 = 30;

/// Interval of the background check while online.
pub const DEFAULT_HEALTH_INTERVAL: Duration = Duration::from_secs(30);

const TICK: Duration = Duration::from_secs(1);

// ── ApiStatus ────────────────────────────────────────────────────────

/// Upstream reachability as seen by consumers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum ApiStatus {
    Online,
    Offline,
    Checking,
}

/// Probes the registry; yields the name of the first reachable source.
pub type HealthProbe = Arc<dyn Fn() -> BoxFuture<'static, Option<String>> + Send + Sync>;

/// Timer tuning.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConnectivityConfig {
    pub countdown_secs: u32,
    /// Zero disables the periodic check.
    pub health_interval: Duration,
}

impl Default for ConnectivityConfig {
    fn default() -> Self {
        Self {
            countdown_secs: DEFAULT_COUNTDOWN_SECS,
            health_interval: DEFAULT_HEALTH_INTERVAL,
        }
    }
}

// ── ConnectivityMonitor ──────────────────────────────────────────────

/// Owner of the single connectivity state and its retry timer.
///
/// Cheaply cloneable via `Arc<MonitorInner>`.
#[derive(Clone)]
pub struct ConnectivityMonitor {
    inner: Arc<MonitorInner>,
}

struct MonitorInner {
    config: ConnectivityConfig,
    probe: HealthProbe,
    status: watch::Sender<ApiStatus>,
    countdown: watch::Sender<u32>,
    reachable: watch::Sender<Option<String>>,
    /// The one retry slot. Replacing it cancels the previous timer.
    retry: Mutex<Option<RetryTimer>>,
    next_timer_id: AtomicU64,
    live_timers: Arc<AtomicUsize>,
    check_lock: tokio::sync::Mutex<()>,
    checks_completed: AtomicU64,
    cancel: CancellationToken,
    health_task: Mutex<Option<JoinHandle<()>>>,
}

struct RetryTimer {
    id: u64,
    token: CancellationToken,
    handle: JoinHandle<()>,
    _guard: TimerGuard,
}

impl RetryTimer {
    /// Stop the task now. The live count drops with `self`.
    fn stop(self) -> JoinHandle<()> {
        let Self { id, token, handle, .. } = self;
        debug!(timer = id, "retry timer cancelled");
        token.cancel();
        handle.abort();
        handle
    }
}

/// Counts an occupied retry slot; decrements when the slot is cleared.
struct TimerGuard(Arc<AtomicUsize>);

impl TimerGuard {
    fn new(counter: &Arc<AtomicUsize>) -> Self {
        counter.fetch_add(1, Ordering::AcqRel);
        Self(Arc::clone(counter))
    }
}

impl Drop for TimerGuard {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::AcqRel);
    }
}

/// Leaves `checking` for `offline` if a health check is abandoned mid-flight.
struct CheckGuard<'a> {
    status: &'a watch::Sender<ApiStatus>,
    finished: bool,
}

impl Drop for CheckGuard<'_> {
    fn drop(&mut self) {
        if !self.finished {
            self.status.send_if_modified(|s| {
                let abandoned = *s == ApiStatus::Checking;
                if abandoned {
                    *s = ApiStatus::Offline;
                }
                abandoned
            });
        }
    }
}

impl Drop for MonitorInner {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}

impl std::fmt::Debug for ConnectivityMonitor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConnectivityMonitor")
            .field("status", &self.status())
            .field("countdown", &self.countdown())
            .field("live_timers", &self.live_timers())
            .finish_non_exhaustive()
    }
}

impl ConnectivityMonitor {
    pub fn new(config: ConnectivityConfig, probe: HealthProbe) -> Self {
        let (status, _) = watch::channel(ApiStatus::Checking);
        let (countdown, _) = watch::channel(0);
        let (reachable, _) = watch::channel(None);

        Self {
            inner: Arc::new(MonitorInner {
                config,
                probe,
                status,
                countdown,
                reachable,
                retry: Mutex::new(None),
                next_timer_id: AtomicU64::new(0),
                live_timers: Arc::new(AtomicUsize::new(0)),
                check_lock: tokio::sync::Mutex::new(()),
                checks_completed: AtomicU64::new(0),
                cancel: CancellationToken::new(),
                health_task: Mutex::new(None),
            }),
        }
    }

    pub fn config(&self) -> &ConnectivityConfig {
        &self.inner.config
    }

    // ── Lifecycle ────────────────────────────────────────────────────

    /// Run the initial check and spawn the periodic health task.
    pub async fn start(&self) -> ApiStatus {
        let status = self.check_health().await;

        let interval = self.inner.config.health_interval;
        if !interval.is_zero() && !self.inner.cancel.is_cancelled() {
            let mut slot = self
                .inner
                .health_task
                .lock()
                .unwrap_or_else(PoisonError::into_inner);
            if slot.is_none() {
                let weak = Arc::downgrade(&self.inner);
                let cancel = self.inner.cancel.child_token();
                *slot = Some(tokio::spawn(health_task(weak, interval, cancel)));
            }
        }
        status
    }

    /// Cancel the periodic task and any countdown. No timers are created
    /// afterwards.
    pub async fn shutdown(&self) {
        self.inner.cancel.cancel();
        let timer = self.lock_retry().take();
        if let Some(timer) = timer {
            let _ = timer.stop().await;
        }

        let handle = self
            .inner
            .health_task
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        if let Some(handle) = handle {
            let _ = handle.await;
        }
        debug!("connectivity monitor shut down");
    }

    pub fn is_shut_down(&self) -> bool {
        self.inner.cancel.is_cancelled()
    }

    // ── Health checks ────────────────────────────────────────────────

    /// Probe the registry now.
    ///
    /// A call made while another check is in flight waits for it and
    /// returns its result instead of probing again.
    pub async fn check_health(&self) -> ApiStatus {
        let seen = self.inner.checks_completed.load(Ordering::Acquire);
        let _lock = self.inner.check_lock.lock().await;
        if self.inner.checks_completed.load(Ordering::Acquire) != seen {
            return self.status();
        }

        self.set_status(ApiStatus::Checking);
        let mut guard = CheckGuard {
            status: &self.inner.status,
            finished: false,
        };

        let reachable = (self.inner.probe)().await;
        match &reachable {
            Some(name) => {
                info!(source = %name, "upstream reachable");
                self.report_online();
            }
            None => {
                warn!("no upstream source reachable");
                self.set_status(ApiStatus::Offline);
                self.schedule_retry();
            }
        }
        self.inner.reachable.send_replace(reachable);

        guard.finished = true;
        self.inner.checks_completed.fetch_add(1, Ordering::AcqRel);
        self.status()
    }

    // ── Data-path entry points ───────────────────────────────────────

    /// A live result arrived: online, countdown cleared, timer cancelled.
    pub fn report_online(&self) {
        self.cancel_retry();
        self.inner.countdown.send_replace(0);
        if self.set_status(ApiStatus::Online) {
            info!("connectivity restored");
        }
    }

    /// Every source failed: offline, and a countdown unless one is running.
    pub fn report_offline(&self) {
        if self.set_status(ApiStatus::Offline) {
            info!("upstream offline, serving synthetic data");
        }
        let mut slot = self.lock_retry();
        if slot.is_none() {
            self.start_countdown(&mut slot);
        }
    }

    // ── Retry timer ──────────────────────────────────────────────────

    /// (Re)start the countdown, cancelling any running one.
    pub fn schedule_retry(&self) {
        let mut slot = self.lock_retry();
        if let Some(previous) = slot.take() {
            previous.stop();
        }
        self.start_countdown(&mut slot);
    }

    /// Cancel the countdown, if any. The countdown value is left as is.
    pub fn cancel_retry(&self) {
        let timer = self.lock_retry().take();
        if let Some(timer) = timer {
            timer.stop();
        }
    }

    fn start_countdown(&self, slot: &mut Option<RetryTimer>) {
        if self.inner.cancel.is_cancelled() {
            return;
        }
        let secs = self.inner.config.countdown_secs;
        let id = self.inner.next_timer_id.fetch_add(1, Ordering::AcqRel);
        let token = self.inner.cancel.child_token();
        let guard = TimerGuard::new(&self.inner.live_timers);

        self.inner.countdown.send_replace(secs);
        debug!(timer = id, secs, "reconnect countdown started");

        let handle = tokio::spawn(countdown_task(
            Arc::downgrade(&self.inner),
            id,
            secs,
            Instant::now() + TICK,
            token.clone(),
        ));
        *slot = Some(RetryTimer {
            id,
            token,
            handle,
            _guard: guard,
        });
    }

    fn lock_retry(&self) -> std::sync::MutexGuard<'_, Option<RetryTimer>> {
        self.inner
            .retry
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    /// Returns `true` when the status actually changed.
    fn set_status(&self, status: ApiStatus) -> bool {
        self.inner.status.send_if_modified(|current| {
            let changed = *current != status;
            *current = status;
            changed
        })
    }

    // ── Observation ──────────────────────────────────────────────────

    pub fn status(&self) -> ApiStatus {
        *self.inner.status.borrow()
    }

    pub fn countdown(&self) -> u32 {
        *self.inner.countdown.borrow()
    }

    /// Source found reachable by the most recent health check.
    pub fn reachable_source(&self) -> Option<String> {
        self.inner.reachable.borrow().clone()
    }

    /// Number of countdown tasks currently alive.
    pub fn live_timers(&self) -> usize {
        self.inner.live_timers.load(Ordering::Acquire)
    }

    pub fn subscribe_status(&self) -> watch::Receiver<ApiStatus> {
        self.inner.status.subscribe()
    }

    pub fn subscribe_countdown(&self) -> watch::Receiver<u32> {
        self.inner.countdown.subscribe()
    }
}

// ── Background tasks ─────────────────────────────────────────────────

/// Count down once per second; at zero release the slot and run one check.
async fn countdown_task(
    inner: Weak<MonitorInner>,
    id: u64,
    secs: u32,
    first_tick: Instant,
    token: CancellationToken,
) {
    let mut interval = tokio::time::interval_at(first_tick, TICK);
    interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
    let mut remaining = secs;

    while remaining > 0 {
        tokio::select! {
            biased;
            () = token.cancelled() => return,
            _ = interval.tick() => {}
        }
        let Some(inner) = inner.upgrade() else { return };
        remaining -= 1;
        inner.countdown.send_replace(remaining);
    }

    let Some(inner) = inner.upgrade() else { return };
    let monitor = ConnectivityMonitor { inner };
    {
        let mut slot = monitor.lock_retry();
        if !slot.as_ref().is_some_and(|timer| timer.id == id) {
            return;
        }
        *slot = None;
    }

    debug!(timer = id, "countdown elapsed, re-checking upstream");
    monitor.check_health().await;
}

/// While online, re-check every `interval` to catch regressions.
async fn health_task(inner: Weak<MonitorInner>, interval: Duration, cancel: CancellationToken) {
    let mut ticker = tokio::time::interval(interval);
    ticker.tick().await; // consume the immediate first tick

    loop {
        tokio::select! {
            biased;
            () = cancel.cancelled() => break,
            _ = ticker.tick() => {
                let Some(inner) = inner.upgrade() else { break };
                let monitor = ConnectivityMonitor { inner };
                if monitor.status() == ApiStatus::Online {
                    debug!("periodic health check");
                    monitor.check_health().await;
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::AtomicBool;

    use futures_util::FutureExt;

    use super::*;

    fn probe(up: bool) -> (HealthProbe, Arc<AtomicUsize>) {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&calls);
        let up = Arc::new(AtomicBool::new(up));
        let probe: HealthProbe = Arc::new(move || {
            counter.fetch_add(1, Ordering::SeqCst);
            let up = up.load(Ordering::SeqCst);
            async move { up.then(|| "primary".to_owned()) }.boxed()
        });
        (probe, calls)
    }

    #[tokio::test(start_paused = true)]
    async fn initial_state_is_checking() {
        let (probe, _) = probe(true);
        let monitor = ConnectivityMonitor::new(ConnectivityConfig::default(), probe);
        assert_eq!(monitor.status(), ApiStatus::Checking);
        assert_eq!(monitor.countdown(), 0);
        assert_eq!(monitor.live_timers(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn report_offline_keeps_running_countdown() {
        let (probe, _) = probe(false);
        let monitor = ConnectivityMonitor::new(ConnectivityConfig::default(), probe);

        monitor.report_offline();
        tokio::time::advance(Duration::from_secs(5)).await;
        tokio::task::yield_now().await;
        let before = monitor.countdown();
        assert!(before < 30);

        monitor.report_offline();
        assert_eq!(monitor.countdown(), before);
        assert_eq!(monitor.status(), ApiStatus::Offline);
        monitor.shutdown().await;
    }

    #[tokio::test(start_paused = true)]
    async fn report_online_clears_countdown() {
        let (probe, _) = probe(false);
        let monitor = ConnectivityMonitor::new(ConnectivityConfig::default(), probe);

        monitor.schedule_retry();
        assert_eq!(monitor.countdown(), 30);
        monitor.report_online();
        assert_eq!(monitor.status(), ApiStatus::Online);
        assert_eq!(monitor.countdown(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn no_timers_after_shutdown() {
        let (probe, _) = probe(false);
        let monitor = ConnectivityMonitor::new(ConnectivityConfig::default(), probe);
        monitor.shutdown().await;

        monitor.schedule_retry();
        monitor.report_offline();
        tokio::task::yield_now().await;
        assert_eq!(monitor.live_timers(), 0);
        assert!(monitor.is_shut_down());
    }

    #[tokio::test(start_paused = true)]
    async fn restarting_countdown_never_stacks_timers() {
        let (probe, _) = probe(false);
        let monitor = ConnectivityMonitor::new(ConnectivityConfig::default(), probe);

        for _ in 0..3 {
            monitor.schedule_retry();
            assert_eq!(monitor.live_timers(), 1);
        }
        monitor.cancel_retry();
        assert_eq!(monitor.live_timers(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn shutdown_stops_running_countdown() {
        let (probe, calls) = probe(false);
        let monitor = ConnectivityMonitor::new(ConnectivityConfig::default(), probe);

        monitor.report_offline();
        tokio::time::advance(Duration::from_secs(3)).await;
        monitor.shutdown().await;
        assert_eq!(monitor.live_timers(), 0);

        let frozen = monitor.countdown();
        tokio::time::sleep(Duration::from_secs(60)).await;
        assert_eq!(monitor.countdown(), frozen);
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }
}
