//! Capability-gated actions: the vocabulary of "one step of work".
//!
//! An [`Action`] is a closed enum with a payload per kind. Every tick the owner
//! calls [`Action::step`] exactly once; the step resolves its targets afresh,
//! attempts one primitive world mutation, and reports whether the action should
//! keep running. Retries are never internal: a failed step completes, and the
//! task layer regenerates work for demand that is still unmet.

#![cfg_attr(docsrs, feature(doc_cfg))]
#![forbid(unsafe_code)]

pub mod action;
pub mod prerequisite;
pub mod step;

pub use action::{Action, MELEE_RANGE, RANGED_RANGE, RESERVATION_CAP};
pub use prerequisite::{all_satisfied, Prerequisite, Remedy};
pub use step::StepStatus;
