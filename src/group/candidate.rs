//! Candidate abstraction.
//!
//! # Responsibilities
//! - Wrap a single upstream endpoint tracked by a group
//! - Carry the validity hint written by probes and failed dials

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use crate::adapters::Endpoint;

/// One upstream endpoint with its validity flag.
///
/// The flag is a best-effort hint. Probe passes and dial failures write it
/// concurrently without further coordination, and readers may observe a
/// stale value; a stale `true` costs at most one failed dial, which flips it.
#[derive(Debug)]
pub struct Candidate {
    endpoint: Arc<dyn Endpoint>,
    valid: AtomicBool,
}

impl Candidate {
    /// Wrap an endpoint. Candidates start out valid.
    pub fn new(endpoint: Arc<dyn Endpoint>) -> Self {
        Self {
            endpoint,
            valid: AtomicBool::new(true),
        }
    }

    pub fn name(&self) -> &str {
        self.endpoint.name()
    }

    pub fn endpoint(&self) -> &Arc<dyn Endpoint> {
        &self.endpoint
    }

    pub fn is_valid(&self) -> bool {
        self.valid.load(Ordering::Relaxed)
    }

    /// Store a new validity value and return the previous one.
    pub fn set_valid(&self, valid: bool) -> bool {
        self.valid.swap(valid, Ordering::Relaxed)
    }
}
