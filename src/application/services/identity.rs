//! Identity resolution - Maps message origins to directory records

use std::sync::Arc;

use crate::domain::entities::{Address, Room, User};

use super::DirectoryCache;

/// Classifies origin addresses and resolves senders and rooms.
///
/// Room traffic names its sender only by nickname, so it resolves through
/// the display-name index. Direct traffic carries the user's own address
/// and resolves by key.
pub struct IdentityResolver {
    directory: Arc<DirectoryCache>,
    room_domain: String,
    nickname: String,
}

impl IdentityResolver {
    pub fn new(directory: Arc<DirectoryCache>, room_domain: impl Into<String>, nickname: impl Into<String>) -> Self {
        Self {
            directory,
            room_domain: room_domain.into(),
            nickname: nickname.into(),
        }
    }

    pub fn directory(&self) -> &DirectoryCache {
        &self.directory
    }

    pub fn shared_directory(&self) -> Arc<DirectoryCache> {
        Arc::clone(&self.directory)
    }

    pub fn room_domain(&self) -> &str {
        &self.room_domain
    }

    pub fn nickname(&self) -> &str {
        &self.nickname
    }

    pub fn is_room_broadcast(&self, address: &Address) -> bool {
        address.domain() == self.room_domain
    }

    /// Room echo of a message the bot itself posted
    pub fn is_from_bot(&self, address: &Address) -> bool {
        self.is_room_broadcast(address) && address.resource() == Some(self.nickname.as_str())
    }

    /// Directory record of whoever sent from `address`; `None` when unknown.
    pub fn resolve_sender(&self, address: &Address) -> Option<User> {
        if self.is_room_broadcast(address) {
            let nickname = address.resource()?;
            self.directory.user_by_display_name(nickname)
        } else {
            self.directory.user(&address.bare())
        }
    }

    /// Room a room-broadcast address belongs to; `None` for direct addresses.
    pub fn resolve_room(&self, address: &Address) -> Option<Room> {
        if !self.is_room_broadcast(address) {
            return None;
        }
        self.directory.room(&address.bare())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::errors::DirectoryError;
    use crate::application::services::UserAddressing;
    use crate::domain::traits::{AdminApi, StatusMessage, UnavailableAdminApi};
    use serde_json::{json, Value};

    struct FixedApi;

    impl AdminApi for FixedApi {
        fn list_rooms(&self) -> Result<Vec<Value>, DirectoryError> {
            Ok(vec![json!({"room_id": 5, "name": "Ops", "xmpp_jid": "1_ops@conf.example.com"})])
        }

        fn list_users(&self) -> Result<Vec<Value>, DirectoryError> {
            Ok(vec![json!({"user_id": 9, "name": "Carol Diaz", "mention_name": "carol"})])
        }

        fn post_message(&self, _message: &StatusMessage) -> Result<(), DirectoryError> {
            Ok(())
        }
    }

    fn resolver(api: Arc<dyn AdminApi>) -> IdentityResolver {
        let directory = DirectoryCache::new(api, UserAddressing::new(Some("1".into()), "chat.example.com"));
        IdentityResolver::new(Arc::new(directory), "conf.example.com", "Parley Bot")
    }

    fn addr(s: &str) -> Address {
        s.parse().unwrap()
    }

    #[test]
    fn classifies_by_domain() {
        let r = resolver(Arc::new(FixedApi));
        assert!(r.is_room_broadcast(&addr("1_ops@conf.example.com/Carol Diaz")));
        assert!(!r.is_room_broadcast(&addr("1_9@chat.example.com")));
    }

    #[test]
    fn resolves_room_sender_by_nickname() {
        let r = resolver(Arc::new(FixedApi));
        let user = r.resolve_sender(&addr("1_ops@conf.example.com/Carol Diaz")).unwrap();
        assert_eq!(user.mention_name, "carol");
    }

    #[test]
    fn resolves_direct_sender_by_bare_address() {
        let r = resolver(Arc::new(FixedApi));
        let user = r.resolve_sender(&addr("1_9@chat.example.com/laptop")).unwrap();
        assert_eq!(user.name, "Carol Diaz");
    }

    #[test]
    fn unknown_sender_is_none() {
        let r = resolver(Arc::new(FixedApi));
        assert!(r.resolve_sender(&addr("1_ops@conf.example.com/Stranger")).is_none());
        assert!(r.resolve_sender(&addr("1_ops@conf.example.com")).is_none());
        assert!(r.resolve_sender(&addr("1_99@chat.example.com")).is_none());
    }

    #[test]
    fn resolves_room_only_for_room_addresses() {
        let r = resolver(Arc::new(FixedApi));
        assert_eq!(r.resolve_room(&addr("1_ops@conf.example.com/Carol Diaz")).unwrap().id, "5");
        assert!(r.resolve_room(&addr("1_9@chat.example.com")).is_none());
    }

    #[test]
    fn recognises_own_echo() {
        let r = resolver(Arc::new(UnavailableAdminApi));
        assert!(r.is_from_bot(&addr("1_ops@conf.example.com/Parley Bot")));
        assert!(!r.is_from_bot(&addr("1_ops@conf.example.com/Carol Diaz")));
    }

    #[test]
    fn degrades_without_api() {
        let r = resolver(Arc::new(UnavailableAdminApi));
        assert!(r.resolve_sender(&addr("1_9@chat.example.com")).is_none());
        assert!(r.resolve_room(&addr("1_ops@conf.example.com")).is_none());
    }
}
