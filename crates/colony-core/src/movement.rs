use crate::{AgentId, Position, TickContext};

/// "Get `agent` within `range` of `destination`."
///
/// Intents are registrations, not moves: whoever owns the sink decides who
/// actually steps where, and when.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MoveIntent {
    pub agent: AgentId,
    pub destination: Position,
    pub range: u32,
    pub priority: u32,
}

impl MoveIntent {
    pub fn new(agent: AgentId, destination: Position, range: u32, priority: u32) -> Self {
        Self {
            agent,
            destination,
            range,
            priority,
        }
    }
}

pub trait MovementSink {
    fn request_move(&mut self, ctx: &TickContext, intent: MoveIntent);
}

#[derive(Debug, Default)]
pub struct NullMovementSink;

impl MovementSink for NullMovementSink {
    fn request_move(&mut self, _ctx: &TickContext, _intent: MoveIntent) {}
}

#[derive(Debug, Default)]
pub struct VecMovementSink {
    pub intents: Vec<MoveIntent>,
}

impl MovementSink for VecMovementSink {
    fn request_move(&mut self, _ctx: &TickContext, intent: MoveIntent) {
        self.intents.push(intent);
    }
}
