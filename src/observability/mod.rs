//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! Groups, probe passes, adapters produce:
//!     → logging.rs (structured log events via tracing)
//!     → metrics.rs (validity gauges, probe latency, dial outcomes)
//!
//! Consumers:
//!     → stdout (pretty or JSON)
//!     → Metrics endpoint (Prometheus scrape)
//! ```

pub mod logging;
pub mod metrics;
