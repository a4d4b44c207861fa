//! Cancellable telemetry polling loop.
//!
//! Each `start` opens a new generation. The loop fetches, waits for the
//! reply, reports it, and only then sleeps for the interval, so a slow
//! service delays the next fetch instead of stacking requests. A one-permit
//! semaphore shared across generations keeps a single fetch in flight even
//! when the poller is stopped and restarted while a request is outstanding.
//!
//! `stop` bumps the generation: a pending sleep is cut short and an in-flight
//! fetch is left to finish, but its result is dropped.

use std::sync::Arc;
use std::time::Duration;

use studywatch_remote::{RemoteError, SessionService, TelemetrySample};
use tokio::sync::{watch, Semaphore};

pub struct TelemetryPoller {
    service: Arc<dyn SessionService>,
    generation: watch::Sender<u64>,
    fetch_gate: Arc<Semaphore>,
    active: bool,
}

impl TelemetryPoller {
    #[must_use]
    pub fn new(service: Arc<dyn SessionService>) -> Self {
        let (generation, _) = watch::channel(0);
        Self {
            service,
            generation,
            fetch_gate: Arc::new(Semaphore::new(1)),
            active: false,
        }
    }

    /// Generation of the most recent `start` or `stop`
    #[must_use]
    pub fn generation(&self) -> u64 {
        *self.generation.borrow()
    }

    #[must_use]
    pub const fn is_active(&self) -> bool {
        self.active
    }

    /// Begin polling every `interval`, measured from the end of each fetch.
    ///
    /// Callbacks receive the generation they were scheduled under. Any loop
    /// already running is stopped first. Returns the new generation.
    pub fn start<S, E>(&mut self, interval: Duration, on_sample: S, on_error: E) -> u64
    where
        S: Fn(u64, TelemetrySample) + Send + 'static,
        E: Fn(u64, RemoteError) + Send + 'static,
    {
        self.stop();
        self.generation.send_modify(|g| *g += 1);
        let generation = self.generation();
        let mut cancelled = self.generation.subscribe();
        let service = Arc::clone(&self.service);
        let gate = Arc::clone(&self.fetch_gate);
        self.active = true;

        tokio::spawn(async move {
            loop {
                let result = {
                    let Ok(_permit) = gate.acquire().await else {
                        return;
                    };
                    // Stopped while an earlier generation's fetch held the gate
                    if *cancelled.borrow() != generation {
                        return;
                    }
                    service.fetch_stats().await
                };

                if *cancelled.borrow() != generation {
                    log::debug!("Dropping telemetry reply from stopped poll generation {generation}");
                    return;
                }

                match result {
                    Ok(Some(sample)) => on_sample(generation, sample),
                    Ok(None) => log::debug!("Focus service has no active session"),
                    Err(err) => on_error(generation, err),
                }

                tokio::select! {
                    () = tokio::time::sleep(interval) => {}
                    _ = cancelled.changed() => return,
                }
            }
        });

        log::debug!("Telemetry polling started (generation {generation}, every {interval:?})");
        generation
    }

    /// Stop polling; idempotent
    pub fn stop(&mut self) {
        if !self.active {
            return;
        }
        self.active = false;
        self.generation.send_modify(|g| *g += 1);
        log::debug!("Telemetry polling stopped (generation now {})", self.generation());
    }
}

impl Drop for TelemetryPoller {
    fn drop(&mut self) {
        self.stop();
    }
}
