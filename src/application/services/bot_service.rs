//! Bot service - Connects the transport to the dispatcher

use std::sync::Arc;

use tokio::runtime::{Handle, RuntimeFlavor};
use tokio::task::JoinHandle;
use tokio::time::Duration;
use tracing::{debug, error, info, warn};

use crate::application::errors::BotError;
use crate::application::messaging::{DispatchOutcome, Dispatcher, KeepaliveMonitor, Outbound};
use crate::domain::entities::{Address, InboundMessage};
use crate::domain::traits::Transport;

/// Keepalive timing
#[derive(Debug, Clone)]
pub struct KeepaliveSettings {
    /// Where the no-op message is sent
    pub target: Address,
    pub idle: Duration,
    pub poll: Duration,
}

/// Runs the bot: one inbound message at a time, in arrival order.
pub struct BotService {
    transport: Arc<dyn Transport>,
    outbound: Outbound,
    dispatcher: Dispatcher,
    rooms: Vec<Address>,
    keepalive: Option<KeepaliveSettings>,
}

impl BotService {
    pub fn new(transport: Arc<dyn Transport>, dispatcher: Dispatcher) -> Self {
        Self {
            outbound: Outbound::new(transport.clone()),
            transport,
            dispatcher,
            rooms: Vec::new(),
            keepalive: None,
        }
    }

    /// Rooms joined right after connecting
    pub fn with_rooms(mut self, rooms: Vec<Address>) -> Self {
        self.rooms = rooms;
        self
    }

    pub fn with_keepalive(mut self, settings: KeepaliveSettings) -> Self {
        self.keepalive = Some(settings);
        self
    }

    pub fn dispatcher(&self) -> &Dispatcher {
        &self.dispatcher
    }

    pub fn dispatcher_mut(&mut self) -> &mut Dispatcher {
        &mut self.dispatcher
    }

    pub fn outbound(&self) -> &Outbound {
        &self.outbound
    }

    /// Connect, join rooms and process messages until the transport's
    /// stream ends. Transport errors end the run.
    ///
    /// Borrows the service so blocking clients held by plugins and the
    /// directory are dropped by the caller, outside the runtime.
    pub async fn run(&mut self) -> Result<(), BotError> {
        self.transport.connect().await?;
        info!("Connected");

        let nickname = self.dispatcher.resolver().nickname().to_string();
        for room in &self.rooms {
            self.transport.join_room(room, &nickname).await?;
            info!("Joined room {} as {}", room, nickname);
        }

        let keepalive = self.spawn_keepalive();
        let result = self.process_inbound().await;
        if let Some(handle) = keepalive {
            handle.abort();
        }

        match &result {
            Ok(()) => info!("Inbound stream closed, stopping"),
            Err(e) => error!("Stopping on transport error: {}", e),
        }
        result
    }

    fn spawn_keepalive(&self) -> Option<JoinHandle<()>> {
        let settings = self.keepalive.as_ref()?;
        if settings.idle.is_zero() {
            debug!("Keepalive disabled");
            return None;
        }
        let monitor = KeepaliveMonitor::new(
            self.outbound.clone(),
            settings.target.clone(),
            settings.idle,
            settings.poll,
        );
        Some(monitor.spawn())
    }

    async fn process_inbound(&mut self) -> Result<(), BotError> {
        while let Some(message) = self.transport.recv().await? {
            self.handle_message(message).await?;
        }
        Ok(())
    }

    /// Dispatch one message and send its reply, if any.
    pub async fn handle_message(&mut self, message: InboundMessage) -> Result<DispatchOutcome, BotError> {
        let destination = message.reply_to();
        let outcome = dispatch_blocking(&mut self.dispatcher, message);

        match &outcome {
            DispatchOutcome::Replied { command, reply } => {
                debug!("{} replied to {}", command, destination);
                self.outbound.send(&destination, reply).await?;
            }
            DispatchOutcome::Failed { command, reply, .. } => {
                warn!("{} failed, sending failure notice to {}", command, destination);
                self.outbound.send(&destination, reply).await?;
            }
            DispatchOutcome::Unhandled | DispatchOutcome::Ignored => {}
        }
        Ok(outcome)
    }
}

/// Handlers and the directory client block, so keep them off the async
/// workers when the runtime allows it.
fn dispatch_blocking(dispatcher: &mut Dispatcher, message: InboundMessage) -> DispatchOutcome {
    match Handle::try_current().map(|handle| handle.runtime_flavor()) {
        Ok(RuntimeFlavor::MultiThread) => tokio::task::block_in_place(|| dispatcher.dispatch(message)),
        _ => dispatcher.dispatch(message),
    }
}
