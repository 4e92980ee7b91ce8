use serde_json::{Map, Value};

use super::user::scalar;
use super::Address;

/// A directory room, projected from an administration API record
#[derive(Debug, Clone, PartialEq)]
pub struct Room {
    pub id: String,
    pub name: String,
    pub address: Address,
    pub metadata: Map<String, Value>,
}

impl Room {
    /// Builds a room from a raw record. Records without a parsable
    /// `xmpp_jid` cannot be routed to and yield `None`.
    pub fn from_record(record: &Value) -> Option<Self> {
        let metadata = record.as_object().cloned()?;
        let address: Address = metadata.get("xmpp_jid")?.as_str()?.parse().ok()?;
        let id = metadata.get("room_id").or_else(|| metadata.get("id")).map(scalar).unwrap_or_default();
        let name = metadata.get("name").map(scalar).unwrap_or_default();

        Some(Self {
            id,
            name,
            address: address.bare(),
            metadata,
        })
    }
}
