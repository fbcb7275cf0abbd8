use std::fmt;

use colony_actions::Action;
use colony_core::{AgentId, TickContext};
use serde::{Deserialize, Serialize};

const SEQUENCE_BITS: u32 = 16;

/// Monotonic, tick-scoped task id: `tick << 16 | sequence`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TaskId(pub u64);

impl TaskId {
    pub const MAX_SEQUENCE: u64 = (1 << SEQUENCE_BITS) - 1;

    pub fn new(tick: u64, sequence: u64) -> Self {
        Self(tick << SEQUENCE_BITS | (sequence & Self::MAX_SEQUENCE))
    }

    pub fn tick(self) -> u64 {
        self.0 >> SEQUENCE_BITS
    }

    pub fn sequence(self) -> u64 {
        self.0 & Self::MAX_SEQUENCE
    }
}

impl fmt::Display for TaskId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "T{}.{}", self.tick(), self.sequence())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Tier {
    Low,
    Normal,
    High,
}

/// Tier first, then rank. Higher sorts first when scheduling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Priority {
    pub tier: Tier,
    pub rank: u32,
}

impl Priority {
    pub const fn new(tier: Tier, rank: u32) -> Self {
        Self { tier, rank }
    }

    pub const fn high(rank: u32) -> Self {
        Self::new(Tier::High, rank)
    }

    pub const fn normal(rank: u32) -> Self {
        Self::new(Tier::Normal, rank)
    }

    pub const fn low(rank: u32) -> Self {
        Self::new(Tier::Low, rank)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TaskStatus {
    #[default]
    Pending,
    #[serde(alias = "in_process", alias = "inprogress")]
    InProcess,
    Complete,
}

/// A unit of work offered to agents.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskRequest {
    pub id: TaskId,
    pub action: Action,
    pub priority: Priority,
    #[serde(default)]
    pub status: TaskStatus,
    pub created_at: u64,
    pub expires_at: u64,
    #[serde(default)]
    pub owner: Option<AgentId>,
}

impl TaskRequest {
    pub fn is_expired(&self, ctx: &TickContext) -> bool {
        ctx.tick >= self.expires_at
    }

    /// Counts against the demand it was generated for.
    pub fn is_live(&self) -> bool {
        self.status != TaskStatus::Complete
    }

    pub fn is_pending(&self) -> bool {
        self.status == TaskStatus::Pending
    }
}
