//! Fallback group.
//!
//! # Responsibilities
//! - Validate options and wrap endpoints as candidates
//! - Own the probe scheduler and its shutdown signal
//! - Report the active candidate
//! - Dial through the first candidate that works, demoting failures

use std::sync::Arc;
use std::time::Duration;

use tokio::runtime::Handle;
use tokio::task::JoinHandle;
use url::Url;

use crate::adapters::{AdapterType, Endpoint, Metadata, ProxyStream};
use crate::config::FallbackOption;
use crate::group::candidate::Candidate;
use crate::group::selection::find_valid_from;
use crate::group::types::{CandidateStatus, GroupError, GroupResult, GroupStatus};
use crate::health::{Probe, ProbeRunner, ProbeScheduler};
use crate::lifecycle::Shutdown;
use crate::observability::metrics;

/// Used when the configured delay is zero; `tokio::time::interval` rejects it.
const MIN_PROBE_INTERVAL: Duration = Duration::from_secs(1);

/// A priority-ordered group of upstreams that routes through the first
/// reachable one.
pub struct FallbackGroup {
    name: String,
    candidates: Arc<[Arc<Candidate>]>,
    probe_url: Url,
    probe_interval: Duration,
    runner: ProbeRunner,
    shutdown: Shutdown,
    scheduler: JoinHandle<()>,
}

impl FallbackGroup {
    /// Build a group and start probing in the background.
    ///
    /// Fails, without spawning anything, if the probe URL is malformed,
    /// `endpoints` is empty, or no Tokio runtime is running.
    pub fn new(
        option: &FallbackOption,
        endpoints: Vec<Arc<dyn Endpoint>>,
        probe: Arc<dyn Probe>,
    ) -> GroupResult<Self> {
        let invalid_url = |reason: String| GroupError::InvalidUrl {
            url: option.url.clone(),
            reason,
        };
        let probe_url = Url::parse(&option.url).map_err(|e| invalid_url(e.to_string()))?;
        Metadata::from_url(&probe_url).map_err(|e| invalid_url(e.to_string()))?;

        if endpoints.is_empty() {
            return Err(GroupError::NoEndpoints {
                group: option.name.clone(),
            });
        }

        let runtime = Handle::try_current().map_err(|_| GroupError::NoRuntime {
            group: option.name.clone(),
        })?;

        let mut probe_interval = option.interval();
        if probe_interval.is_zero() {
            tracing::warn!(group = %option.name, "Probe delay is zero, using {:?}", MIN_PROBE_INTERVAL);
            probe_interval = MIN_PROBE_INTERVAL;
        }

        let candidates: Arc<[Arc<Candidate>]> = endpoints
            .into_iter()
            .map(|endpoint| Arc::new(Candidate::new(endpoint)))
            .collect();

        let runner = ProbeRunner::new(&option.name, Arc::clone(&candidates), probe, probe_url.clone());
        let shutdown = Shutdown::new();
        let scheduler = ProbeScheduler::spawn(&runtime, runner.clone(), probe_interval, shutdown.subscribe());

        tracing::info!(
            group = %option.name,
            candidates = candidates.len(),
            url = %probe_url,
            interval_secs = probe_interval.as_secs(),
            "Fallback group created"
        );

        Ok(Self {
            name: option.name.clone(),
            candidates,
            probe_url,
            probe_interval,
            runner,
            shutdown,
            scheduler,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn adapter_type(&self) -> AdapterType {
        AdapterType::Fallback
    }

    /// Name of the candidate a dial would try first.
    ///
    /// When nothing is valid this still names the first configured
    /// candidate rather than reporting nothing.
    pub fn now(&self) -> &str {
        match find_valid_from(&self.candidates, 0) {
            Some((_, candidate)) => candidate.name(),
            None => self.candidates[0].name(),
        }
    }

    /// Produce a connection to `metadata` through the highest-priority
    /// candidate that can deliver one.
    ///
    /// Candidates that fail are marked invalid and the scan moves on to the
    /// next valid one; the error is returned only once the list is exhausted.
    pub async fn dial(&self, metadata: &Metadata) -> GroupResult<Box<dyn ProxyStream>> {
        let (_, conn) = self.dial_via(metadata).await?;
        Ok(conn)
    }

    /// Like [`dial`](Self::dial), also naming the candidate that answered.
    pub async fn dial_via(&self, metadata: &Metadata) -> GroupResult<(&str, Box<dyn ProxyStream>)> {
        let mut start = 0;
        while let Some((idx, candidate)) = find_valid_from(&self.candidates, start) {
            match candidate.endpoint().dial(metadata).await {
                Ok(conn) => {
                    metrics::record_dial(&self.name, candidate.name(), true);
                    tracing::debug!(
                        group = %self.name,
                        candidate = %candidate.name(),
                        target = %metadata,
                        "Dial succeeded"
                    );
                    return Ok((candidate.name(), conn));
                }
                Err(e) => {
                    candidate.set_valid(false);
                    metrics::record_dial(&self.name, candidate.name(), false);
                    metrics::record_candidate_valid(&self.name, candidate.name(), false);
                    tracing::warn!(
                        group = %self.name,
                        candidate = %candidate.name(),
                        target = %metadata,
                        error = %e,
                        "Dial failed, marking candidate invalid"
                    );
                    start = idx + 1;
                }
            }
        }

        tracing::error!(group = %self.name, target = %metadata, "No usable endpoint");
        Err(GroupError::NoUsableEndpoint {
            group: self.name.clone(),
        })
    }

    /// Stop the probe scheduler. Safe to call repeatedly; never blocks.
    pub fn close(&self) {
        if self.shutdown.trigger() {
            tracing::info!(group = %self.name, "Fallback group closing");
        }
    }

    /// True once the scheduler loop has exited.
    pub fn is_closed(&self) -> bool {
        self.scheduler.is_finished()
    }

    /// Run one probe pass now and wait for it to finish.
    pub async fn probe_now(&self) {
        self.runner.run_pass().await;
    }

    pub fn candidates(&self) -> &[Arc<Candidate>] {
        &self.candidates
    }

    pub fn probe_url(&self) -> &Url {
        &self.probe_url
    }

    pub fn probe_interval(&self) -> Duration {
        self.probe_interval
    }

    pub fn status(&self) -> GroupStatus {
        GroupStatus {
            name: self.name.clone(),
            kind: self.adapter_type(),
            now: self.now().to_string(),
            all: self
                .candidates
                .iter()
                .map(|c| CandidateStatus {
                    name: c.name().to_string(),
                    kind: c.endpoint().adapter_type(),
                    valid: c.is_valid(),
                })
                .collect(),
        }
    }
}

impl Drop for FallbackGroup {
    fn drop(&mut self) {
        self.shutdown.trigger();
    }
}

impl std::fmt::Debug for FallbackGroup {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FallbackGroup")
            .field("name", &self.name)
            .field("candidates", &self.candidates)
            .field("probe_url", &self.probe_url.as_str())
            .field("probe_interval", &self.probe_interval)
            .finish()
    }
}
