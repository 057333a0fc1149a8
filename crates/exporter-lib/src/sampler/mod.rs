//! Load average sampling
//!
//! This module provides the source abstraction for reading host load
//! averages and the background loop that publishes them into the gauge
//! store on a fixed cadence.

mod proc;
mod r#loop;


pub use proc::{parse_loadavg, ProcLoadSource, DEFAULT_LOADAVG_PATH};
pub use r#loop::{SamplerConfig, SamplerLoop};

use crate::models::LoadSample;

pub use async_trait::async_trait;

/// Errors from one sampling round
#[derive(Debug, thiserror::Error)]
pub enum SampleError {
    /// The load data source could not be read (missing path, permissions,
    /// I/O error). Recovered by skipping the round.
    #[error("load source unavailable: {0}")]
    SourceUnavailable(#[from] std::io::Error),

    /// The source returned fewer than three tokens, or a token did not
    /// parse as a decimal number. Recovered by skipping the round.
    #[error("malformed load sample: {0}")]
    MalformedSample(String),
}

/// Trait for load average source implementations
#[async_trait]
pub trait LoadSource: Send + Sync {
    /// Read the current 1/5/15 minute load averages
    async fn sample(&self) -> Result<LoadSample, SampleError>;
}
