//! Dashboard summary over accounts and ledger entries.

mod summary;
pub mod types;

pub use summary::{RECENT_ENTRIES, summarize};
pub use types::{DashboardSummary, DateRange};
