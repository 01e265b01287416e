//! Scan Schedule
//!
//! Decides when a deployer rescans. The schedule owns a background thread and
//! knows nothing about deployers: it just calls the task it was given.
//!
//! - `ScanTrigger::Poll` - rescan every `interval`
//! - `ScanTrigger::Watch` - rescan after filesystem changes under the scan root
//!   settle (`DEBOUNCE_MS`), keeping the interval poll as a fallback
//!
//! A zero interval arms nothing: the deployer scans once at start and never again.

mod state;
mod ticker;


pub use state::{WatcherState, DEBOUNCE_MS};
pub use ticker::{ScanSchedule, ScanTrigger, ScheduleHandle};
