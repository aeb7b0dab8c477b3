//! Health checking subsystem.
//!
//! # Data Flow
//! ```text
//! Probe scheduler (scheduler.rs):
//!     Immediate first tick, then every `delay`
//!     → spawn a probe pass (runner.rs)
//!
//! Probe pass (runner.rs):
//!     One task per candidate
//!     → probe.rs (dial through candidate, GET the test URL)
//!     → write candidate validity flag
//!     → wait for all tasks
//!
//! Dial failures (group/fallback.rs):
//!     Failed dial → candidate flag cleared until the next successful probe
//! ```
//!
//! # Design Decisions
//! - No hysteresis: one probe result decides the flag
//! - Validity is per-candidate and lock-free
//! - Probe failures never propagate to callers

pub mod probe;
pub mod runner;
pub mod scheduler;

pub use probe::{Probe, ProbeError, UrlTestProbe};
pub use runner::ProbeRunner;
pub use scheduler::ProbeScheduler;
