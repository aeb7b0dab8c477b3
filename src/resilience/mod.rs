//! Resilience subsystem.
//!
//! # Data Flow
//! ```text
//! Dial or probe through an upstream:
//!     → timeouts.rs (enforce connect deadline)
//!     → On failure: the fallback group demotes the candidate and moves on
//! ```
//!
//! # Design Decisions
//! - Timeouts are non-negotiable; every external call has a deadline
//! - No backoff or circuit breaking: the next probe pass restores a candidate

pub mod timeouts;
