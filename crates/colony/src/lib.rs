//! Umbrella crate that re-exports the `colony-*` building blocks.
//!
//! With the task, traffic and planner features enabled it also provides
//! [`Colony`], which runs the full per-tick coordination loop.

#![cfg_attr(docsrs, feature(doc_cfg))]
#![forbid(unsafe_code)]

#[cfg(feature = "core")]
#[cfg_attr(docsrs, doc(cfg(feature = "core")))]
pub use colony_core as core;

#[cfg(feature = "actions")]
#[cfg_attr(docsrs, doc(cfg(feature = "actions")))]
pub use colony_actions as actions;

#[cfg(feature = "tasks")]
#[cfg_attr(docsrs, doc(cfg(feature = "tasks")))]
pub use colony_tasks as tasks;

#[cfg(feature = "traffic")]
#[cfg_attr(docsrs, doc(cfg(feature = "traffic")))]
pub use colony_traffic as traffic;

#[cfg(feature = "planner")]
#[cfg_attr(docsrs, doc(cfg(feature = "planner")))]
pub use colony_planner as planner;

#[cfg(feature = "sim")]
#[cfg_attr(docsrs, doc(cfg(feature = "sim")))]
pub use colony_sim as sim;

#[cfg(all(feature = "tasks", feature = "planner"))]
mod coordinator;

#[cfg(all(feature = "tasks", feature = "planner"))]
#[cfg_attr(docsrs, doc(cfg(all(feature = "tasks", feature = "planner"))))]
pub use coordinator::{Colony, TickReport};
