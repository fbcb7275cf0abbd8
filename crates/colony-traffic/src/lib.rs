//! Movement arbitration and traffic analysis.
//!
//! Agents register movement intents through [`MovementSink`](colony_core::MovementSink);
//! the [`MovementArbiter`] resolves them once per tick in priority order and
//! feeds a decaying [`TrafficHeatmap`] that infrastructure planning reads.

#![cfg_attr(docsrs, feature(doc_cfg))]
#![forbid(unsafe_code)]

mod arbiter;
mod heatmap;
mod path;

pub use arbiter::{ArbitrationReport, MoveOutcome, MovementArbiter, MovementRequest};
pub use heatmap::{HeatmapStats, TrafficCell, TrafficHeatmap};
pub use path::{find_path, first_step};
