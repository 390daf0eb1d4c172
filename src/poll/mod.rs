//! Periodic refresh of the dashboard state.
//!
//! `scheduler` owns the timers, `worker` does one refresh at a time.

pub mod scheduler;
pub mod worker;
