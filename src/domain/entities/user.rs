use std::fmt;

use serde_json::{Map, Value};

use super::Address;

/// A directory user, projected from an administration API record
#[derive(Debug, Clone, PartialEq)]
pub struct User {
    pub id: String,
    pub name: String,
    pub mention_name: String,
    pub address: Address,
    /// Every field of the source record, including the ones above
    pub metadata: Map<String, Value>,
}

impl User {
    /// Builds a user from a raw record. Missing fields are tolerated; the
    /// caller supplies the address because the API may not carry one.
    pub fn from_record(record: &Value, address: Address) -> Self {
        let metadata = record.as_object().cloned().unwrap_or_default();
        let id = metadata.get("user_id").or_else(|| metadata.get("id")).map(scalar).unwrap_or_default();
        let name = metadata.get("name").map(scalar).unwrap_or_default();
        let mention_name = metadata
            .get("mention_name")
            .map(scalar)
            .unwrap_or_else(|| name.replace(' ', ""));

        Self {
            id,
            name,
            mention_name,
            address,
            metadata,
        }
    }

    /// `@mention` form used to address this user in a room
    pub fn mention(&self) -> String {
        format!("@{}", self.mention_name)
    }

    pub fn display_name(&self) -> &str {
        if self.name.is_empty() {
            self.address.node()
        } else {
            &self.name
        }
    }
}

impl fmt::Display for User {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.display_name())
    }
}

/// Renders a JSON scalar as text; ids arrive as numbers or strings.
pub(crate) fn scalar(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}
