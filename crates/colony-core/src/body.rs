use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BodyPart {
    Work,
    Carry,
    Move,
    Attack,
    RangedAttack,
    Heal,
    Claim,
    Tough,
}

impl BodyPart {
    /// Spawn cost in energy.
    pub fn cost(self) -> u32 {
        match self {
            BodyPart::Work => 100,
            BodyPart::Carry | BodyPart::Move => 50,
            BodyPart::Attack => 80,
            BodyPart::RangedAttack => 150,
            BodyPart::Heal => 250,
            BodyPart::Claim => 600,
            BodyPart::Tough => 10,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResourceKind {
    Energy,
    Power,
    Hydrogen,
    Oxygen,
    Utrium,
    Lemergium,
    Keanium,
    Zynthium,
    Catalyst,
    Ghodium,
    Hydroxide,
    UtriumHydride,
    KeaniumOxide,
    GhodiumOxide,
}

/// A capacity-bounded resource container shared by agents and structures.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Store {
    capacity: u32,
    #[serde(default)]
    contents: BTreeMap<ResourceKind, u32>,
}

impl Store {
    pub fn with_capacity(capacity: u32) -> Self {
        Self {
            capacity,
            contents: BTreeMap::new(),
        }
    }

    pub fn filled(capacity: u32, resource: ResourceKind, amount: u32) -> Self {
        let mut store = Self::with_capacity(capacity);
        store.add(resource, amount);
        store
    }

    pub fn capacity(&self) -> u32 {
        self.capacity
    }

    pub fn get(&self, resource: ResourceKind) -> u32 {
        self.contents.get(&resource).copied().unwrap_or(0)
    }

    pub fn used(&self) -> u32 {
        self.contents.values().sum()
    }

    pub fn free(&self) -> u32 {
        self.capacity.saturating_sub(self.used())
    }

    pub fn is_empty(&self) -> bool {
        self.used() == 0
    }

    pub fn is_full(&self) -> bool {
        self.free() == 0
    }

    /// Adds up to `amount`, clamped to free capacity. Returns what was stored.
    pub fn add(&mut self, resource: ResourceKind, amount: u32) -> u32 {
        let accepted = amount.min(self.free());
        if accepted > 0 {
            *self.contents.entry(resource).or_insert(0) += accepted;
        }
        accepted
    }

    /// Removes up to `amount`. Returns what was taken.
    pub fn remove(&mut self, resource: ResourceKind, amount: u32) -> u32 {
        let Some(held) = self.contents.get_mut(&resource) else {
            return 0;
        };
        let taken = amount.min(*held);
        *held -= taken;
        if *held == 0 {
            self.contents.remove(&resource);
        }
        taken
    }

    pub fn resources(&self) -> impl Iterator<Item = (ResourceKind, u32)> + '_ {
        self.contents.iter().map(|(r, a)| (*r, *a))
    }
}
