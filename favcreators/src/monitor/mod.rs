//! Batch status orchestration.
//!
//! The monitor is the only entry point the rest of the application uses for
//! live checks:
//! - `refresh_all` walks every creator in order, throttled between creators
//! - `refresh_one` re-checks a single creator and leaves the rest untouched
//!
//! Both take the current collection and return a new one. Callers own the
//! store and swap the result in.

mod clock;
mod merge;
mod service;
mod summary;

pub use clock::{Clock, FixedClock, SystemClock};
pub use merge::{merge_account, merge_creator};
pub use service::{StatusMonitor, StatusMonitorConfig};
pub use summary::RefreshSummary;
