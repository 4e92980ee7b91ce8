//! Directory cache - Lazily built room/user snapshots from the administration API

use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};

use serde_json::Value;
use tracing::{debug, info, warn};

use crate::domain::entities::user::scalar;
use crate::domain::entities::{Address, Room, User};
use crate::domain::traits::AdminApi;

pub type RoomMap = HashMap<Address, Room>;
pub type UserMap = HashMap<Address, User>;
pub type UserNameMap = HashMap<String, User>;

/// How user addresses are derived when a record does not carry one
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserAddressing {
    /// Account prefix joined to the user id with `_`, if the service uses one
    pub account_prefix: Option<String>,
    pub user_domain: String,
}

impl UserAddressing {
    pub fn new(account_prefix: Option<String>, user_domain: impl Into<String>) -> Self {
        Self {
            account_prefix,
            user_domain: user_domain.into(),
        }
    }

    fn address_for(&self, record: &Value) -> Option<Address> {
        if let Some(addr) = record
            .get("xmpp_jid")
            .and_then(Value::as_str)
            .and_then(|s| s.parse::<Address>().ok())
        {
            return Some(addr.bare());
        }

        let user_id = record.get("user_id").or_else(|| record.get("id")).map(scalar)?;
        if user_id.is_empty() {
            return None;
        }
        let node = match &self.account_prefix {
            Some(prefix) => format!("{}_{}", prefix, user_id),
            None => user_id,
        };
        Some(Address::new(node, self.user_domain.clone()))
    }
}

/// Refreshable cache of directory records keyed by address.
///
/// Each snapshot is built on first access and kept until [`refresh`]. An
/// unreachable API yields an empty snapshot rather than an error.
///
/// [`refresh`]: DirectoryCache::refresh
pub struct DirectoryCache {
    api: Arc<dyn AdminApi>,
    addressing: UserAddressing,
    rooms: RwLock<Option<Arc<RoomMap>>>,
    users: RwLock<Option<Arc<UserMap>>>,
    users_by_name: RwLock<Option<Arc<UserNameMap>>>,
}

impl DirectoryCache {
    pub fn new(api: Arc<dyn AdminApi>, addressing: UserAddressing) -> Self {
        Self {
            api,
            addressing,
            rooms: RwLock::new(None),
            users: RwLock::new(None),
            users_by_name: RwLock::new(None),
        }
    }

    pub fn api(&self) -> &dyn AdminApi {
        self.api.as_ref()
    }

    /// Rooms keyed by bare room address
    pub fn rooms(&self) -> Arc<RoomMap> {
        cached(&self.rooms, || self.build_rooms())
    }

    /// Users keyed by bare user address
    pub fn users(&self) -> Arc<UserMap> {
        cached(&self.users, || self.build_users())
    }

    /// Users keyed by display name, derived from [`users`](Self::users)
    pub fn users_by_name(&self) -> Arc<UserNameMap> {
        cached(&self.users_by_name, || {
            self.users()
                .values()
                .filter(|u| !u.name.is_empty())
                .map(|u| (u.name.clone(), u.clone()))
                .collect()
        })
    }

    pub fn room(&self, address: &Address) -> Option<Room> {
        self.rooms().get(&address.bare()).cloned()
    }

    pub fn user(&self, address: &Address) -> Option<User> {
        self.users().get(&address.bare()).cloned()
    }

    pub fn user_by_display_name(&self, name: &str) -> Option<User> {
        self.users_by_name().get(name).cloned()
    }

    /// Drop every snapshot; the next access rebuilds from the API.
    pub fn refresh(&self) {
        *self.rooms.write().unwrap_or_else(PoisonError::into_inner) = None;
        *self.users.write().unwrap_or_else(PoisonError::into_inner) = None;
        *self.users_by_name.write().unwrap_or_else(PoisonError::into_inner) = None;
        info!("Directory cache invalidated");
    }

    fn build_rooms(&self) -> RoomMap {
        let records = match self.api.list_rooms() {
            Ok(records) => records,
            Err(e) => {
                warn!("Room directory unavailable: {}", e);
                return RoomMap::new();
            }
        };

        let mut rooms = RoomMap::new();
        for record in &records {
            match Room::from_record(record) {
                Some(room) => {
                    rooms.insert(room.address.clone(), room);
                }
                None => debug!("Skipping room record without address: {}", record),
            }
        }
        debug!("Loaded {} rooms", rooms.len());
        rooms
    }

    fn build_users(&self) -> UserMap {
        let records = match self.api.list_users() {
            Ok(records) => records,
            Err(e) => {
                warn!("User directory unavailable: {}", e);
                return UserMap::new();
            }
        };

        let mut users = UserMap::new();
        for record in &records {
            match self.addressing.address_for(record) {
                Some(address) => {
                    let user = User::from_record(record, address);
                    users.insert(user.address.clone(), user);
                }
                None => debug!("Skipping user record without id: {}", record),
            }
        }
        debug!("Loaded {} users", users.len());
        users
    }
}

fn cached<T>(slot: &RwLock<Option<Arc<T>>>, build: impl FnOnce() -> T) -> Arc<T> {
    if let Some(snapshot) = slot.read().unwrap_or_else(PoisonError::into_inner).as_ref() {
        return Arc::clone(snapshot);
    }

    let snapshot = Arc::new(build());
    let mut guard = slot.write().unwrap_or_else(PoisonError::into_inner);
    Arc::clone(guard.get_or_insert(snapshot))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::errors::DirectoryError;
    use crate::domain::traits::{StatusMessage, UnavailableAdminApi};
    use serde_json::json;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[derive(Default)]
    struct CountingApi {
        room_calls: AtomicUsize,
        user_calls: AtomicUsize,
    }

    impl AdminApi for CountingApi {
        fn list_rooms(&self) -> Result<Vec<Value>, DirectoryError> {
            self.room_calls.fetch_add(1, Ordering::SeqCst);
            Ok(vec![
                json!({"room_id": 1, "name": "Lobby", "xmpp_jid": "1_lobby@conf.example.com"}),
                json!({"room_id": 2, "name": "Broken"}),
            ])
        }

        fn list_users(&self) -> Result<Vec<Value>, DirectoryError> {
            self.user_calls.fetch_add(1, Ordering::SeqCst);
            Ok(vec![
                json!({"user_id": 10, "name": "Alice Smith", "mention_name": "alice"}),
                json!({"user_id": "11", "name": "Bob", "xmpp_jid": "1_11@chat.example.com"}),
                json!({"name": "Nobody"}),
            ])
        }

        fn post_message(&self, _message: &StatusMessage) -> Result<(), DirectoryError> {
            Ok(())
        }
    }

    fn cache_with(api: Arc<dyn AdminApi>) -> DirectoryCache {
        DirectoryCache::new(api, UserAddressing::new(Some("1".to_string()), "chat.example.com"))
    }

    #[test]
    fn builds_rooms_once() {
        let api = Arc::new(CountingApi::default());
        let cache = cache_with(api.clone());

        assert_eq!(cache.rooms().len(), 1);
        assert_eq!(cache.rooms().len(), 1);
        assert_eq!(api.room_calls.load(Ordering::SeqCst), 1);

        let room = cache.room(&"1_lobby@conf.example.com/Alice".parse().unwrap()).unwrap();
        assert_eq!(room.name, "Lobby");
    }

    #[test]
    fn derives_user_addresses_from_ids() {
        let cache = cache_with(Arc::new(CountingApi::default()));
        let users = cache.users();
        assert_eq!(users.len(), 2);

        let alice = cache.user(&"1_10@chat.example.com".parse().unwrap()).unwrap();
        assert_eq!(alice.mention_name, "alice");
        assert!(cache.user(&"1_11@chat.example.com/phone".parse().unwrap()).is_some());
    }

    #[test]
    fn name_index_follows_users() {
        let api = Arc::new(CountingApi::default());
        let cache = cache_with(api.clone());
        assert_eq!(cache.user_by_display_name("Alice Smith").unwrap().id, "10");
        assert!(cache.user_by_display_name("alice smith").is_none());
        assert_eq!(api.user_calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn refresh_triggers_exactly_one_rebuild() {
        let api = Arc::new(CountingApi::default());
        let cache = cache_with(api.clone());

        cache.users_by_name();
        cache.rooms();
        cache.refresh();
        cache.user_by_display_name("Bob");
        cache.users();
        cache.rooms();
        cache.rooms();

        assert_eq!(api.user_calls.load(Ordering::SeqCst), 2);
        assert_eq!(api.room_calls.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn unavailable_api_yields_empty_directory() {
        let cache = cache_with(Arc::new(UnavailableAdminApi));
        assert!(cache.rooms().is_empty());
        assert!(cache.users().is_empty());
        assert!(cache.user_by_display_name("Alice").is_none());
    }
}
