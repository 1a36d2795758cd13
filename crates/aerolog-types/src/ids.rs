//! Type-safe identifier wrapper for tracked entities.
//!
//! The host simulation names its vehicles with free-form callsigns
//! (`UAV001`, `KL204`, ...). [`EntityId`] wraps that string so it cannot be
//! mixed up with other text (logger names, commands) at compile time.
//!
//! An identifier is unique only while its entity is active. The host may
//! reuse a callsign after the original vehicle was deleted; the recorder then
//! treats it as a brand-new entity.

use std::borrow::Borrow;

use serde::{Deserialize, Serialize};

/// Identifier of a tracked entity (vehicle callsign).
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EntityId(String);

impl EntityId {
    /// Create an identifier from any string-like value.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Borrow the identifier as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl core::fmt::Display for EntityId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for EntityId {
    fn from(id: &str) -> Self {
        Self(id.to_owned())
    }
}

impl From<String> for EntityId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

impl From<EntityId> for String {
    fn from(id: EntityId) -> Self {
        id.0
    }
}

impl Borrow<str> for EntityId {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl AsRef<str> for EntityId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
