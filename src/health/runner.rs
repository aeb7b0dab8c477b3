//! Probe passes.
//!
//! # Responsibilities
//! - Probe every candidate of a group concurrently
//! - Write each candidate's validity flag from its own result
//! - Return only once every probe has finished

use std::collections::HashMap;
use std::sync::Arc;

use tokio::task::{self, JoinSet};
use url::Url;

use crate::group::candidate::Candidate;
use crate::health::probe::Probe;
use crate::observability::metrics;

/// Runs health-check passes over one group's candidates.
#[derive(Clone)]
pub struct ProbeRunner {
    group: Arc<str>,
    candidates: Arc<[Arc<Candidate>]>,
    probe: Arc<dyn Probe>,
    url: Arc<Url>,
}

impl ProbeRunner {
    pub fn new(
        group: &str,
        candidates: Arc<[Arc<Candidate>]>,
        probe: Arc<dyn Probe>,
        url: Url,
    ) -> Self {
        Self {
            group: Arc::from(group),
            candidates,
            probe,
            url: Arc::new(url),
        }
    }

    /// Probe all candidates and wait for every result.
    ///
    /// Each candidate is probed in its own task, so a failing or panicking
    /// probe leaves the other candidates untouched. A panicking probe marks
    /// its own candidate invalid.
    pub async fn run_pass(&self) {
        let mut tasks = JoinSet::new();
        let mut owners: HashMap<task::Id, Arc<Candidate>> = HashMap::with_capacity(self.candidates.len());

        for candidate in self.candidates.iter() {
            let candidate = Arc::clone(candidate);
            let probe = Arc::clone(&self.probe);
            let url = Arc::clone(&self.url);
            let group = Arc::clone(&self.group);

            let owner = Arc::clone(&candidate);
            let handle = tasks.spawn(async move {
                let result = probe.probe(candidate.endpoint().as_ref(), &url).await;
                let valid = result.is_ok();
                let was_valid = candidate.set_valid(valid);

                match result {
                    Ok(latency) => {
                        tracing::debug!(
                            group = %group,
                            candidate = %candidate.name(),
                            latency_ms = latency.as_millis() as u64,
                            "Probe succeeded"
                        );
                        metrics::record_probe_latency(&group, candidate.name(), latency);
                        if !was_valid {
                            tracing::info!(group = %group, candidate = %candidate.name(), "Candidate recovered");
                        }
                    }
                    Err(e) => {
                        metrics::record_probe_failure(&group, candidate.name());
                        if was_valid {
                            tracing::warn!(group = %group, candidate = %candidate.name(), error = %e, "Probe failed, marking candidate invalid");
                        } else {
                            tracing::debug!(group = %group, candidate = %candidate.name(), error = %e, "Probe failed");
                        }
                    }
                }
                metrics::record_candidate_valid(&group, candidate.name(), valid);
            });
            owners.insert(handle.id(), owner);
        }

        while let Some(joined) = tasks.join_next_with_id().await {
            let Err(e) = joined else { continue };
            match owners.get(&e.id()) {
                Some(candidate) => {
                    candidate.set_valid(false);
                    metrics::record_probe_failure(&self.group, candidate.name());
                    metrics::record_candidate_valid(&self.group, candidate.name(), false);
                    tracing::error!(
                        group = %self.group,
                        candidate = %candidate.name(),
                        error = %e,
                        "Probe task aborted, marking candidate invalid"
                    );
                }
                None => tracing::error!(group = %self.group, error = %e, "Probe task aborted"),
            }
        }
    }
}

impl std::fmt::Debug for ProbeRunner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProbeRunner")
            .field("group", &self.group)
            .field("candidates", &self.candidates.len())
            .field("url", &self.url.as_str())
            .finish()
    }
}
