//! Lifecycle management subsystem.
//!
//! # Data Flow
//! ```text
//! Startup (startup.rs):
//!     Validated config → Resolve endpoints → Build group → Scheduler running
//!
//! Shutdown (shutdown.rs):
//!     close() / drop → broadcast → scheduler loop exits
//!
//! Signals (signals.rs):
//!     SIGTERM/SIGINT → close the group and exit
//! ```
//!
//! # Design Decisions
//! - Shutdown is idempotent and never blocks the caller
//! - In-flight probes and dials are left to finish on their own deadlines

pub mod shutdown;
pub mod signals;
pub mod startup;

pub use shutdown::Shutdown;
