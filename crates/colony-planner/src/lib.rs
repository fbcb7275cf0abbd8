//! Infrastructure planning from observed traffic.
//!
//! The [`InfrastructurePlanner`] reads a [`TrafficHeatmap`](colony_traffic::TrafficHeatmap)
//! and terrain costs to decide where roads pay for themselves, places a small
//! number of construction sites per pass, and orders road repairs.

#![cfg_attr(docsrs, feature(doc_cfg))]
#![forbid(unsafe_code)]

mod planner;
mod repair;

pub use planner::{Candidate, InfrastructurePlanner, PlanReport};
pub use repair::{prioritize_repairs, RepairTarget};
