//! Shared fakes for integration tests

#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, Once};

use async_trait::async_trait;
use serde_json::{json, Value};

use parley_bot::application::errors::{BotError, DirectoryError};
use parley_bot::application::messaging::{AddressingPolicy, Dispatcher};
use parley_bot::application::services::{DirectoryCache, IdentityResolver, UserAddressing};
use parley_bot::domain::entities::{Address, InboundMessage};
use parley_bot::domain::traits::{AdminApi, StatusMessage, Transport};
use parley_bot::plugins::PluginManager;

pub const ROOM_DOMAIN: &str = "conf.example.com";
pub const USER_DOMAIN: &str = "chat.example.com";
pub const NICKNAME: &str = "Parley Bot";
pub const LOBBY: &str = "1_lobby@conf.example.com";

static INIT: Once = Once::new();

pub fn ensure_init() {
    INIT.call_once(|| {
        let _ = tracing_subscriber::fmt().with_test_writer().try_init();
    });
}

/// Administration API serving a fixed directory and recording posts
#[derive(Default)]
pub struct FakeApi {
    pub room_calls: AtomicUsize,
    pub user_calls: AtomicUsize,
    pub posted: Mutex<Vec<StatusMessage>>,
}

impl FakeApi {
    pub fn posted(&self) -> Vec<StatusMessage> {
        self.posted.lock().unwrap().clone()
    }
}

impl AdminApi for FakeApi {
    fn list_rooms(&self) -> Result<Vec<Value>, DirectoryError> {
        self.room_calls.fetch_add(1, Ordering::SeqCst);
        Ok(vec![json!({"room_id": 7, "name": "Lobby", "xmpp_jid": LOBBY})])
    }

    fn list_users(&self) -> Result<Vec<Value>, DirectoryError> {
        self.user_calls.fetch_add(1, Ordering::SeqCst);
        Ok(vec![
            json!({"user_id": 42, "name": "Alice Smith", "mention_name": "alice"}),
            json!({"user_id": 43, "name": "Bob Jones"}),
        ])
    }

    fn post_message(&self, message: &StatusMessage) -> Result<(), DirectoryError> {
        self.posted.lock().unwrap().push(message.clone());
        Ok(())
    }
}

/// Transport fed from a queue; records everything sent
#[derive(Default)]
pub struct FakeTransport {
    pub inbound: Mutex<VecDeque<InboundMessage>>,
    pub sent: Mutex<Vec<(String, String)>>,
    pub joined: Mutex<Vec<(String, String)>>,
    pub connects: AtomicUsize,
}

impl FakeTransport {
    pub fn with_inbound(messages: Vec<InboundMessage>) -> Self {
        Self {
            inbound: Mutex::new(messages.into()),
            ..Self::default()
        }
    }

    pub fn sent(&self) -> Vec<(String, String)> {
        self.sent.lock().unwrap().clone()
    }
}

#[async_trait]
impl Transport for FakeTransport {
    async fn connect(&self) -> Result<(), BotError> {
        self.connects.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    async fn send_message(&self, destination: &Address, body: &str) -> Result<(), BotError> {
        self.sent.lock().unwrap().push((destination.to_string(), body.to_string()));
        Ok(())
    }

    async fn join_room(&self, room: &Address, nickname: &str) -> Result<(), BotError> {
        self.joined.lock().unwrap().push((room.to_string(), nickname.to_string()));
        Ok(())
    }

    async fn recv(&self) -> Result<Option<InboundMessage>, BotError> {
        Ok(self.inbound.lock().unwrap().pop_front())
    }
}

pub fn resolver(api: Arc<dyn AdminApi>) -> IdentityResolver {
    let directory = DirectoryCache::new(api, UserAddressing::new(Some("1".to_string()), USER_DOMAIN));
    IdentityResolver::new(Arc::new(directory), ROOM_DOMAIN, NICKNAME)
}

pub fn dispatcher(api: Arc<dyn AdminApi>, plugins: PluginManager) -> Dispatcher {
    Dispatcher::new(resolver(api), AddressingPolicy::new("@ParleyBot"), plugins)
}

pub fn room_message(nick: &str, body: &str) -> InboundMessage {
    InboundMessage::room(format!("{}/{}", LOBBY, nick).parse().unwrap(), body)
}

pub fn direct_message(user_id: u32, body: &str) -> InboundMessage {
    InboundMessage::direct(format!("1_{}@{}/desktop", user_id, USER_DOMAIN).parse().unwrap(), body)
}
