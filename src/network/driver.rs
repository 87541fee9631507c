//! Tick Driver
//!
//! Fires the session's `tick` at a fixed rate until shutdown. A slow tick
//! never triggers a burst of catch-up ticks; missed ticks are skipped.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{broadcast, RwLock};
use tokio::time::{interval, MissedTickBehavior};
use tracing::{debug, info};

use crate::network::session::SessionCoordinator;

/// Fixed-rate driver for one session.
pub struct TickDriver {
    session: Arc<RwLock<SessionCoordinator>>,
    period: Duration,
}

impl TickDriver {
    /// Create a driver ticking every `period`.
    pub fn new(session: Arc<RwLock<SessionCoordinator>>, period: Duration) -> Self {
        Self { session, period }
    }

    /// Tick until `shutdown_rx` fires. Returns the number of ticks run.
    pub async fn run(self, mut shutdown_rx: broadcast::Receiver<()>) -> u64 {
        let mut tick_interval = interval(self.period);
        tick_interval.set_missed_tick_behavior(MissedTickBehavior::Skip);

        info!("Tick driver started ({:?} per tick)", self.period);

        let mut ticks = 0u64;
        loop {
            tokio::select! {
                _ = tick_interval.tick() => {
                    let result = self.session.write().await.tick();
                    ticks += 1;

                    if result.round_ended {
                        debug!("Round ended at tick {}", ticks);
                    }
                }
                _ = shutdown_rx.recv() => {
                    info!("Tick driver stopping after {} ticks", ticks);
                    break;
                }
            }
        }

        ticks
    }
}
