//! Keepalive monitor - pings the session when outbound traffic goes idle

use tokio::task::JoinHandle;
use tokio::time::{self, Duration, Instant, MissedTickBehavior};
use tracing::{debug, info, warn};

use super::outbound::Outbound;
use crate::domain::entities::Address;

/// Body of the no-op keepalive message
pub const KEEPALIVE_BODY: &str = " ";

/// Sends a blank message to `target` whenever nothing has been sent for
/// longer than the idle threshold.
pub struct KeepaliveMonitor {
    outbound: Outbound,
    target: Address,
    idle: Duration,
    poll: Duration,
}

impl KeepaliveMonitor {
    pub fn new(outbound: Outbound, target: Address, idle: Duration, poll: Duration) -> Self {
        Self {
            outbound,
            target,
            idle,
            poll,
        }
    }

    pub fn idle_threshold(&self) -> Duration {
        self.idle
    }

    /// Whether the session has been idle for strictly longer than the threshold at `now`
    pub async fn is_due(&self, now: Instant) -> bool {
        self.outbound.clock().idle_for(now).await > self.idle
    }

    /// One polling step. Returns whether a keepalive was sent.
    pub async fn tick(&self) -> bool {
        let now = Instant::now();
        if !self.is_due(now).await {
            return false;
        }

        debug!("Outbound idle past {:?}, sending keepalive to {}", self.idle, self.target);
        match self.outbound.send(&self.target, KEEPALIVE_BODY).await {
            Ok(()) => true,
            Err(e) => {
                warn!("Keepalive send failed: {}", e);
                // Reset anyway so a broken session is not hammered every poll.
                self.outbound.clock().touch_at(now).await;
                false
            }
        }
    }

    /// Poll forever
    pub async fn run(self) {
        let mut interval = time::interval(self.poll);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
        info!("Keepalive started: idle {:?}, poll {:?}", self.idle, self.poll);
        loop {
            interval.tick().await;
            self.tick().await;
        }
    }

    pub fn spawn(self) -> JoinHandle<()> {
        tokio::spawn(self.run())
    }
}
