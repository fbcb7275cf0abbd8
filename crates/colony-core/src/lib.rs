//! Deterministic, engine-agnostic kernel types for tick-based colony coordination.

#![cfg_attr(docsrs, feature(doc_cfg))]
#![forbid(unsafe_code)]

pub mod body;
pub mod config;
pub mod cpu;
pub mod entity;
pub mod error;
pub mod ids;
pub mod memory;
pub mod movement;
pub mod position;
pub mod tick;
pub mod world;

pub use body::{BodyPart, ResourceKind, Store};
pub use config::{
    ColonyConfig, MovementConfig, PlannerConfig, SchedulerConfig, TaskConfig, TrafficConfig,
};
pub use cpu::{CpuMeter, ManualCpu, WallClockCpu};
pub use entity::{
    AgentState, ControllerState, Entity, EntityKind, StructureKind, StructureState, Terrain,
    ROAD_COST,
};
pub use error::{ColonyError, Result};
pub use ids::{AgentId, EntityId};
pub use memory::{ColonyMemory, MoveRecord, TrafficRecord};
pub use movement::{MoveIntent, MovementSink, NullMovementSink, VecMovementSink};
pub use position::{Direction, Position, RegionId, REGION_SIZE};
pub use tick::TickContext;
pub use world::{ActionCode, Primitive, WorldMut, WorldView};
