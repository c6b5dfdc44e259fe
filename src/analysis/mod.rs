//! Feature-level analysis drivers built on the resilience core.

pub mod api;
pub mod discovery;
pub mod probe;

pub use api::{ApiAnalysisReport, ApiAnalyzer, EndpointResult};
pub use probe::{ProbeClient, ProbeConfig};
