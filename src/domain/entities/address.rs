use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Routable origin/destination of a message: `node@domain/resource`.
///
/// The domain tells the room namespace apart from the user namespace. The
/// resource is present on room traffic and names the sender's nickname.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Address {
    node: String,
    domain: String,
    resource: Option<String>,
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AddressError {
    #[error("address is empty")]
    Empty,

    #[error("address has no domain: {0}")]
    MissingDomain(String),

    #[error("address has an empty node: {0}")]
    EmptyNode(String),
}

impl Address {
    pub fn new(node: impl Into<String>, domain: impl Into<String>) -> Self {
        Self {
            node: node.into(),
            domain: domain.into(),
            resource: None,
        }
    }

    pub fn with_resource(mut self, resource: impl Into<String>) -> Self {
        let resource = resource.into();
        self.resource = if resource.is_empty() { None } else { Some(resource) };
        self
    }

    pub fn node(&self) -> &str {
        &self.node
    }

    pub fn domain(&self) -> &str {
        &self.domain
    }

    pub fn resource(&self) -> Option<&str> {
        self.resource.as_deref()
    }

    /// The address without its resource part.
    pub fn bare(&self) -> Address {
        Self {
            node: self.node.clone(),
            domain: self.domain.clone(),
            resource: None,
        }
    }

    pub fn is_bare(&self) -> bool {
        self.resource.is_none()
    }
}

impl FromStr for Address {
    type Err = AddressError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.is_empty() {
            return Err(AddressError::Empty);
        }

        let (bare, resource) = match s.split_once('/') {
            Some((bare, resource)) => (bare, Some(resource)),
            None => (s, None),
        };

        let (node, domain) = bare
            .split_once('@')
            .ok_or_else(|| AddressError::MissingDomain(s.to_string()))?;

        if node.is_empty() {
            return Err(AddressError::EmptyNode(s.to_string()));
        }
        if domain.is_empty() {
            return Err(AddressError::MissingDomain(s.to_string()));
        }

        let address = Address::new(node, domain);
        Ok(match resource {
            Some(r) => address.with_resource(r),
            None => address,
        })
    }
}

impl TryFrom<String> for Address {
    type Error = AddressError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Address> for String {
    fn from(address: Address) -> Self {
        address.to_string()
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}@{}", self.node, self.domain)?;
        if let Some(resource) = &self.resource {
            write!(f, "/{}", resource)?;
        }
        Ok(())
    }
}
