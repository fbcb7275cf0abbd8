use colony_core::{AgentState, BodyPart, ResourceKind};
use serde::{Deserialize, Serialize};

/// A stateless predicate over an agent's capability profile.
///
/// Evaluation reads the agent snapshot only and never mutates anything.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Prerequisite {
    BodyPart { part: BodyPart, min: u32 },
    CarriesResource { resource: ResourceKind, min: u32 },
    FreeCapacity { min: u32 },
    EmptyStore,
    NotSpawning,
}

/// What an agent could do to satisfy an unmet prerequisite.
///
/// Purely descriptive: turning a remedy into work is the task layer's call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Remedy {
    Collect { resource: ResourceKind, amount: u32 },
    Unload,
}

impl Prerequisite {
    pub const fn part(part: BodyPart) -> Self {
        Prerequisite::BodyPart { part, min: 1 }
    }

    pub const fn carries(resource: ResourceKind) -> Self {
        Prerequisite::CarriesResource { resource, min: 1 }
    }

    pub const fn free_capacity() -> Self {
        Prerequisite::FreeCapacity { min: 1 }
    }

    pub fn evaluate(&self, agent: &AgentState) -> bool {
        match *self {
            Prerequisite::BodyPart { part, min } => agent.count(part) >= min,
            Prerequisite::CarriesResource { resource, min } => agent.store.get(resource) >= min,
            Prerequisite::FreeCapacity { min } => agent.store.free() >= min,
            Prerequisite::EmptyStore => agent.store.is_empty(),
            Prerequisite::NotSpawning => !agent.spawning,
        }
    }

    /// Body composition and spawning state cannot be fixed by behavior.
    pub fn remedy(&self) -> Option<Remedy> {
        match *self {
            Prerequisite::CarriesResource { resource, min } => Some(Remedy::Collect {
                resource,
                amount: min,
            }),
            Prerequisite::FreeCapacity { .. } | Prerequisite::EmptyStore => Some(Remedy::Unload),
            Prerequisite::BodyPart { .. } | Prerequisite::NotSpawning => None,
        }
    }
}

pub fn all_satisfied(prerequisites: &[Prerequisite], agent: &AgentState) -> bool {
    prerequisites.iter().all(|p| p.evaluate(agent))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hauler(energy: u32) -> AgentState {
        let mut agent = AgentState::new(vec![BodyPart::Carry, BodyPart::Carry, BodyPart::Move]);
        agent.store.add(ResourceKind::Energy, energy);
        agent
    }

    #[test]
    fn body_part_counts_are_checked() {
        let agent = hauler(0);
        assert!(Prerequisite::part(BodyPart::Carry).evaluate(&agent));
        assert!(Prerequisite::BodyPart {
            part: BodyPart::Carry,
            min: 2
        }
        .evaluate(&agent));
        assert!(!Prerequisite::part(BodyPart::Work).evaluate(&agent));
    }

    #[test]
    fn store_predicates_follow_contents() {
        let empty = hauler(0);
        let half = hauler(50);
        let full = hauler(100);

        assert!(Prerequisite::EmptyStore.evaluate(&empty));
        assert!(!Prerequisite::carries(ResourceKind::Energy).evaluate(&empty));
        assert!(Prerequisite::carries(ResourceKind::Energy).evaluate(&half));
        assert!(Prerequisite::free_capacity().evaluate(&half));
        assert!(!Prerequisite::free_capacity().evaluate(&full));
    }

    #[test]
    fn evaluation_does_not_touch_the_agent() {
        let agent = hauler(30);
        let before = agent.clone();
        for p in [
            Prerequisite::EmptyStore,
            Prerequisite::free_capacity(),
            Prerequisite::NotSpawning,
        ] {
            let _ = p.evaluate(&agent);
        }
        assert_eq!(agent, before);
    }

    #[test]
    fn only_store_prerequisites_have_remedies() {
        assert_eq!(
            Prerequisite::carries(ResourceKind::Energy).remedy(),
            Some(Remedy::Collect {
                resource: ResourceKind::Energy,
                amount: 1
            })
        );
        assert_eq!(Prerequisite::EmptyStore.remedy(), Some(Remedy::Unload));
        assert_eq!(Prerequisite::part(BodyPart::Claim).remedy(), None);
    }
}
