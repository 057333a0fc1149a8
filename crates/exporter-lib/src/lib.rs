//! Library for the load average exporter
//!
//! This crate provides the core functionality for:
//! - Sampling host load averages from /proc/loadavg
//! - The shared gauge store backing the /metrics endpoint
//! - Health checks and readiness tracking

pub mod health;
pub mod models;
pub mod sampler;
pub mod store;

pub use health::{
    ComponentHealth, ComponentStatus, HealthRegistry, HealthResponse, ReadinessResponse,
};
pub use models::LoadSample;
pub use sampler::{LoadSource, ProcLoadSource, SampleError, SamplerConfig, SamplerLoop};
pub use store::LoadGauges;
