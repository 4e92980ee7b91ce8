//! Outbound path - every send goes through here so idle time is tracked

use std::sync::Arc;

use tokio::sync::Mutex;
use tokio::time::{Duration, Instant};

use crate::application::errors::BotError;
use crate::domain::entities::Address;
use crate::domain::traits::Transport;

/// Time of the most recent outbound send
#[derive(Debug, Clone)]
pub struct SendClock {
    last_send: Arc<Mutex<Instant>>,
}

impl SendClock {
    pub fn new() -> Self {
        Self::starting_at(Instant::now())
    }

    pub fn starting_at(at: Instant) -> Self {
        Self {
            last_send: Arc::new(Mutex::new(at)),
        }
    }

    pub async fn touch(&self) {
        self.touch_at(Instant::now()).await;
    }

    pub async fn touch_at(&self, at: Instant) {
        *self.last_send.lock().await = at;
    }

    pub async fn last_send(&self) -> Instant {
        *self.last_send.lock().await
    }

    /// Time elapsed since the last send, as seen at `now`
    pub async fn idle_for(&self, now: Instant) -> Duration {
        now.saturating_duration_since(self.last_send().await)
    }
}

impl Default for SendClock {
    fn default() -> Self {
        Self::new()
    }
}

/// Sends through the transport and records the send time
#[derive(Clone)]
pub struct Outbound {
    transport: Arc<dyn Transport>,
    clock: SendClock,
}

impl Outbound {
    pub fn new(transport: Arc<dyn Transport>) -> Self {
        Self {
            transport,
            clock: SendClock::new(),
        }
    }

    pub fn with_clock(mut self, clock: SendClock) -> Self {
        self.clock = clock;
        self
    }

    pub fn clock(&self) -> &SendClock {
        &self.clock
    }

    pub fn transport(&self) -> &Arc<dyn Transport> {
        &self.transport
    }

    pub async fn send(&self, destination: &Address, body: &str) -> Result<(), BotError> {
        self.transport.send_message(destination, body).await?;
        self.clock.touch().await;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn idle_time_is_measured_from_last_touch() {
        let start = Instant::now();
        let clock = SendClock::starting_at(start);
        assert_eq!(clock.idle_for(start + Duration::from_secs(30)).await, Duration::from_secs(30));

        clock.touch_at(start + Duration::from_secs(20)).await;
        assert_eq!(clock.idle_for(start + Duration::from_secs(30)).await, Duration::from_secs(10));
    }

    #[tokio::test]
    async fn idle_time_never_goes_negative() {
        let start = Instant::now();
        let clock = SendClock::starting_at(start + Duration::from_secs(5));
        assert_eq!(clock.idle_for(start).await, Duration::ZERO);
    }
}
