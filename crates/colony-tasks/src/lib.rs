//! Task lifecycle: generate requests from world demand, assign them to
//! capable agents, and step assigned actions under a per-tick CPU budget.

#![cfg_attr(docsrs, feature(doc_cfg))]
#![forbid(unsafe_code)]

mod demand;
mod manager;
mod report;
mod request;

pub use demand::{demands, Demand};
pub use manager::TaskManager;
pub use report::{ExecutionReport, StarvationReport};
pub use request::{Priority, TaskId, TaskRequest, TaskStatus, Tier};
