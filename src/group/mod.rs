//! Fallback group subsystem.
//!
//! # Data Flow
//! ```text
//! FallbackOption + resolved endpoints
//!     → fallback.rs (validate, wrap as candidates, start probe scheduler)
//!
//! now() / dial(metadata):
//!     → selection.rs (first valid candidate from index N, no wraparound)
//!     → candidate.rs (endpoint + validity flag)
//!     → on dial failure: clear flag, continue from N + 1
//! ```
//!
//! # Design Decisions
//! - Priority is the configured order and never changes
//! - Validity flags are shared without locks; stale reads self-correct on dial
//! - Dialing never waits on the probe scheduler

pub mod candidate;
pub mod fallback;
pub mod selection;
pub mod types;

pub use candidate::Candidate;
pub use fallback::FallbackGroup;
pub use selection::find_valid_from;
pub use types::{CandidateStatus, GroupError, GroupResult, GroupStatus};
