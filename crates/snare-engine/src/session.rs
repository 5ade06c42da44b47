use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, RwLock};

use snare_ir::types::TrapDefinition;
use snare_sandbox::StateProvider;
use tokio::sync::watch;
use tokio::time::{interval_at, Instant, MissedTickBehavior};
use tracing::{debug, info};

use crate::config::SessionConfig;
use crate::cycle::run_cycle;
use crate::log::ObservationLog;
use crate::outcome::ExecutionOutcome;

/// One trap's execution context: the current definition, the
/// observation log, and the periodic stream driving cycles.
///
/// All methods take `&self`; the session is safe to share behind an
/// `Arc` or call from several tasks. Dropping it stops the stream.
pub struct TrapSession {
    inner: Arc<SessionInner>,
}

struct SessionInner {
    provider: Arc<dyn StateProvider>,
    config: SessionConfig,
    definition: RwLock<Arc<TrapDefinition>>,
    log: Mutex<ObservationLog>,
    active: AtomicBool,
    stop_tx: Mutex<Option<watch::Sender<bool>>>,
}

impl TrapSession {
    pub fn new(
        definition: TrapDefinition,
        provider: Arc<dyn StateProvider>,
        config: SessionConfig,
    ) -> Self {
        let log = ObservationLog::new(config.log_capacity);
        Self {
            inner: Arc::new(SessionInner {
                provider,
                config,
                definition: RwLock::new(Arc::new(definition)),
                log: Mutex::new(log),
                active: AtomicBool::new(false),
                stop_tx: Mutex::new(None),
            }),
        }
    }

    pub fn config(&self) -> &SessionConfig {
        &self.inner.config
    }

    /// Current definition. Cycles in flight keep the `Arc` they
    /// captured at tick time, so a concurrent swap cannot tear one.
    pub fn definition(&self) -> Arc<TrapDefinition> {
        self.inner.definition.read().unwrap().clone()
    }

    /// Swap in a new definition and clear the log. An active stream
    /// keeps running: a cycle already in flight finishes against the
    /// old definition, the next tick compiles the new one.
    pub fn set_definition(&self, definition: TrapDefinition) {
        let label = definition.label.clone();
        *self.inner.definition.write().unwrap() = Arc::new(definition);
        self.inner.log.lock().unwrap().clear();
        debug!(%label, "definition swapped, observation log cleared");
    }

    pub fn is_active(&self) -> bool {
        self.inner.active.load(Ordering::SeqCst)
    }

    /// Begin periodic execution. The first cycle fires one full
    /// interval after this call, not immediately. Calling `start` on
    /// an already active session is a no-op.
    pub fn start(&self) {
        if self.inner.active.swap(true, Ordering::SeqCst) {
            debug!("stream already active, start ignored");
            return;
        }
        let (stop_tx, mut stop_rx) = watch::channel(false);
        *self.inner.stop_tx.lock().unwrap() = Some(stop_tx);

        let inner = Arc::clone(&self.inner);
        let period = inner.config.tick_interval;
        info!(
            label = %inner.definition.read().unwrap().label,
            interval_secs = period.as_secs_f64(),
            "trap stream started"
        );
        tokio::spawn(async move {
            let mut ticker = interval_at(Instant::now() + period, period);
            // Cycles run inline on this task, so one slower than the
            // interval delays the next tick rather than overlapping
            // it. Skip swallows the backlog instead of bursting.
            ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
            loop {
                tokio::select! {
                    biased;
                    _ = stop_rx.changed() => break,
                    _ = ticker.tick() => {
                        let started = Instant::now();
                        let definition = inner.definition.read().unwrap().clone();
                        let outcome = run_cycle(&definition, inner.provider.as_ref()).await;
                        inner.log.lock().unwrap().append(outcome);
                        if started.elapsed() > period {
                            debug!(
                                elapsed_secs = started.elapsed().as_secs_f64(),
                                "cycle overran the interval, missed ticks skipped"
                            );
                        }
                    }
                }
            }
            info!("trap stream stopped");
        });
    }

    /// Halt periodic execution. No new cycle begins after this
    /// returns; a cycle already in flight completes and its outcome
    /// still lands in the log. Calling `stop` on an inactive session
    /// is a no-op.
    pub fn stop(&self) {
        if !self.inner.active.swap(false, Ordering::SeqCst) {
            debug!("stream not active, stop ignored");
            return;
        }
        if let Some(stop_tx) = self.inner.stop_tx.lock().unwrap().take() {
            let _ = stop_tx.send(true);
        }
    }

    /// Execute one cycle right now, outside the periodic stream, and
    /// append its outcome to the same log.
    pub async fn run_once(&self) -> ExecutionOutcome {
        let definition = self.definition();
        let outcome = run_cycle(&definition, self.inner.provider.as_ref()).await;
        self.inner.log.lock().unwrap().append(outcome.clone());
        outcome
    }

    /// Cloned newest-first view of the observation log.
    pub fn snapshot(&self) -> Vec<ExecutionOutcome> {
        self.inner.log.lock().unwrap().to_vec()
    }

    pub fn log_len(&self) -> usize {
        self.inner.log.lock().unwrap().len()
    }
}

impl Drop for TrapSession {
    fn drop(&mut self) {
        self.stop();
    }
}
