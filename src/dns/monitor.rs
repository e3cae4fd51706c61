//! Live monitoring of the active DNS provider.
//!
//! [`Monitor`] owns one background tokio task that re-probes the active
//! provider's first server on a fixed interval and accumulates counters in
//! a shared [`MonitorStats`] block.

use crate::dns::probe::Prober;
use crate::dns::types::Provider;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant, MissedTickBehavior};

/// Default interval between monitor probes.
pub const DEFAULT_MONITOR_INTERVAL: Duration = Duration::from_secs(2);

/// Running counters for one monitoring session.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MonitorStats {
    /// Name of the monitored provider
    pub provider_name: String,
    /// Servers captured when monitoring started
    pub active_servers: Vec<String>,
    /// Probes that got an answer
    pub success_count: u64,
    /// Probes that failed or timed out
    pub failed_count: u64,
    /// Latency of the most recent successful probe
    pub last_latency_ms: Option<u64>,
    /// Time monitored so far, in tick increments
    pub uptime: Duration,
}

impl MonitorStats {
    /// Fresh stats for `provider`, seeded with its last probed latency.
    #[must_use]
    pub fn for_provider(provider: &Provider) -> Self {
        Self {
            provider_name: provider.name.clone(),
            active_servers: provider.servers.clone(),
            last_latency_ms: provider.latency_ms,
            ..Self::default()
        }
    }

    /// Record the outcome of one probe.
    pub fn record_probe(&mut self, latency_ms: Option<u64>) {
        match latency_ms {
            Some(ms) => {
                self.success_count += 1;
                self.last_latency_ms = Some(ms);
            }
            None => self.failed_count += 1,
        }
    }

    /// Whole seconds monitored.
    #[must_use]
    pub fn uptime_secs(&self) -> u64 {
        self.uptime.as_secs()
    }
}

/// Stats block shared between the UI and the monitor task.
type SharedStats = Arc<Mutex<MonitorStats>>;

fn lock(stats: &Mutex<MonitorStats>) -> MutexGuard<'_, MonitorStats> {
    stats.lock().unwrap_or_else(PoisonError::into_inner)
}

struct MonitorTask {
    handle: JoinHandle<()>,
    stopped: Arc<AtomicBool>,
}

/// Periodic re-probe of the active provider.
///
/// At most one background task exists per `Monitor`. Starting again stops
/// the previous task first; [`Monitor::stop`] is idempotent. Dropping the
/// monitor stops it.
///
/// # Example
///
/// ```ignore
/// let mut monitor = Monitor::new(Prober::default(), MonitorStats::for_provider(&p), interval);
/// monitor.start();
/// // ... later
/// monitor.stop();
/// ```
pub struct Monitor {
    prober: Prober,
    stats: SharedStats,
    interval: Duration,
    task: Option<MonitorTask>,
}

impl Monitor {
    /// Create a stopped monitor around `stats`.
    #[must_use]
    pub fn new(prober: Prober, stats: MonitorStats, interval: Duration) -> Self {
        Self {
            prober,
            stats: Arc::new(Mutex::new(stats)),
            interval,
            task: None,
        }
    }

    /// Copy of the current stats.
    #[must_use]
    pub fn snapshot(&self) -> MonitorStats {
        lock(&self.stats).clone()
    }

    /// Check if the background task is running.
    #[must_use]
    pub fn is_running(&self) -> bool {
        self.task.is_some()
    }

    /// Start ticking. Must be called inside a tokio runtime.
    ///
    /// The first tick fires one interval after this call.
    pub fn start(&mut self) {
        self.stop();

        let stopped = Arc::new(AtomicBool::new(false));
        let stats = Arc::clone(&self.stats);
        let prober = self.prober.clone();
        let interval = self.interval;
        let server = lock(&self.stats).active_servers.first().cloned();
        let flag = Arc::clone(&stopped);

        tracing::debug!("Starting monitor for {server:?} every {interval:?}");

        let handle = tokio::spawn(async move {
            let mut ticker = interval_at(Instant::now() + interval, interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

            loop {
                ticker.tick().await;

                let latency = match &server {
                    Some(server) => Some(prober.probe(server).await),
                    None => None,
                };

                let mut guard = lock(&stats);
                if flag.load(Ordering::SeqCst) {
                    break;
                }
                guard.uptime += interval;
                if let Some(latency) = latency {
                    guard.record_probe(latency);
                }
            }
        });

        self.task = Some(MonitorTask { handle, stopped });
    }

    /// Stop ticking. Calling this on a stopped monitor does nothing.
    ///
    /// Once this returns the background task will not touch the stats again.
    pub fn stop(&mut self) {
        let Some(task) = self.task.take() else {
            return;
        };

        task.stopped.store(true, Ordering::SeqCst);
        // Wait out a tick that may be recording right now.
        drop(lock(&self.stats));
        task.handle.abort();

        tracing::debug!("Monitor stopped");
    }

    /// Probe the active server now, outside the tick schedule.
    ///
    /// Uptime is not advanced.
    pub async fn refresh(&self) {
        let server = lock(&self.stats).active_servers.first().cloned();
        let Some(server) = server else {
            return;
        };

        let latency = self.prober.probe(&server).await;
        lock(&self.stats).record_probe(latency);
    }
}

impl Drop for Monitor {
    fn drop(&mut self) {
        self.stop();
    }
}
