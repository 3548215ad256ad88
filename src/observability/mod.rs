//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! Router, resolver, server produce:
//!     → logging.rs (structured log events and the dispatch span)
//!     → metrics.rs (counters, histograms)
//!
//! Consumers:
//!     → stdout (pretty or JSON)
//!     → Metrics endpoint (Prometheus scrape)
//! ```

pub mod logging;
pub mod metrics;

pub use logging::{init_logging, LogFormat};
