//! /proc/loadavg source
//!
//! Reads the kernel's loadavg file. The first three whitespace-separated
//! fields are the 1, 5 and 15 minute load averages; the remaining fields
//! (runnable/total task counts, last pid) are ignored.

use super::{async_trait, LoadSource, SampleError};
use crate::models::LoadSample;
use std::path::PathBuf;
use tokio::fs;

/// Default location of the kernel load average file
pub const DEFAULT_LOADAVG_PATH: &str = "/proc/loadavg";

/// Load source backed by the host's loadavg file
pub struct ProcLoadSource {
    path: PathBuf,
}

impl ProcLoadSource {
    /// Create a source reading from /proc/loadavg
    pub fn new() -> Self {
        Self::with_path(DEFAULT_LOADAVG_PATH)
    }

    /// Create a source with a custom path (for testing)
    pub fn with_path(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl Default for ProcLoadSource {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl LoadSource for ProcLoadSource {
    async fn sample(&self) -> Result<LoadSample, SampleError> {
        let raw = fs::read_to_string(&self.path).await?;
        parse_loadavg(&raw)
    }
}

/// Parse loadavg file contents
///
/// Takes the first three whitespace-separated tokens as decimal floats,
/// in 1m/5m/15m order. Trailing tokens are ignored.
pub fn parse_loadavg(raw: &str) -> Result<LoadSample, SampleError> {
    let mut fields = raw.split_whitespace();

    let mut next_field = |name: &str| -> Result<f64, SampleError> {
        let token = fields
            .next()
            .ok_or_else(|| SampleError::MalformedSample(format!("missing {} field", name)))?;
        token
            .parse()
            .map_err(|_| SampleError::MalformedSample(format!("invalid {} field {:?}", name, token)))
    };

    Ok(LoadSample {
        load1: next_field("load1")?,
        load5: next_field("load5")?,
        load15: next_field("load15")?,
    })
}
