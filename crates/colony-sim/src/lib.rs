//! In-memory reference world.
//!
//! Implements [`WorldView`](colony_core::WorldView) and [`WorldMut`](colony_core::WorldMut)
//! with a small, simplified rule set so the coordination crates can be exercised
//! end to end without a game server. Movement follows tick-engine semantics:
//! `move_agent` registers an intent and [`GridWorld::end_tick`] resolves all
//! intents at once, which is what makes swaps and chains possible.

#![cfg_attr(docsrs, feature(doc_cfg))]
#![forbid(unsafe_code)]

mod layout;
mod rules;
mod world;

pub use layout::demo_world;
pub use world::{Attempt, GridWorld};
