//! Explicit two-member entity pairs reported by the host.
//!
//! The host's conflict detector reports conflicts and losses of separation
//! as pairs of callsigns. The pair is fixed into named `first`/`second`
//! members at the boundary; records preserve that order.

use serde::{Deserialize, Serialize};

use crate::ids::EntityId;

/// Two entities involved in a proximity event.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EntityPair {
    /// The member reported first by the host.
    pub first: EntityId,
    /// The member reported second by the host.
    pub second: EntityId,
}

impl EntityPair {
    /// Create a pair, keeping the supplied member order.
    pub fn new(first: impl Into<EntityId>, second: impl Into<EntityId>) -> Self {
        Self {
            first: first.into(),
            second: second.into(),
        }
    }

    /// Order-independent key: both orderings of the same members map to
    /// the same key.
    pub fn unordered_key(&self) -> (EntityId, EntityId) {
        if self.first <= self.second {
            (self.first.clone(), self.second.clone())
        } else {
            (self.second.clone(), self.first.clone())
        }
    }
}

impl From<(&str, &str)> for EntityPair {
    fn from((first, second): (&str, &str)) -> Self {
        Self::new(first, second)
    }
}
