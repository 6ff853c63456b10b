//! Accounts-receivable posting.
//!
//! - `plan`: pure decision of which entries an invoice change implies
//! - `engine`: invoice lifecycle operations that apply those plans atomically
//! - `locks`: per-key serialization for concurrent updates

pub mod engine;
pub mod locks;
pub mod plan;

#[cfg(test)]
mod plan_props;

pub use engine::ArPostingEngine;
pub use locks::{KeyGuard, KeyedLocks};
pub use plan::{PlannedPosting, PostingPlanner, PostingPurpose};
