use core::fmt;

use serde::{Deserialize, Serialize};

/// Stable identifier for anything that lives in the world: agents, structures,
/// sources, construction sites, dropped resources.
///
/// Deterministic coordination requires:
/// - stable ordering (`Ord`), used for every tie-break in the core
/// - a stable numeric ID (`stable_id`) for logs and persisted records
///
/// Ids are resolved lazily every tick; holding one says nothing about whether
/// the entity still exists.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EntityId(pub u64);

impl EntityId {
    pub const fn new(raw: u64) -> Self {
        Self(raw)
    }

    pub fn stable_id(self) -> u64 {
        self.0
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

impl From<u64> for EntityId {
    fn from(value: u64) -> Self {
        Self(value)
    }
}

/// Agents share the entity id space; the alias documents intent at call sites.
pub type AgentId = EntityId;
