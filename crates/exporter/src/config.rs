//! Exporter configuration

use anyhow::Result;
use serde::Deserialize;
use tracing::warn;

/// Exporter configuration
///
/// Every field has a baked-in default; environment variables with the
/// `EXPORTER_` prefix override them (e.g. `EXPORTER_PORT=9100`).
#[derive(Debug, Clone, Deserialize)]
pub struct ExporterConfig {
    /// TCP port for the metrics endpoint
    #[serde(default = "default_port")]
    pub port: u16,

    /// Delay between sampling rounds, in seconds
    #[serde(default = "default_sample_interval")]
    pub sample_interval_secs: u64,

    /// Path of the kernel load average file
    #[serde(default = "default_loadavg_path")]
    pub loadavg_path: String,
}

fn default_port() -> u16 {
    8080
}

fn default_sample_interval() -> u64 {
    5
}

fn default_loadavg_path() -> String {
    exporter_lib::sampler::DEFAULT_LOADAVG_PATH.to_string()
}

impl Default for ExporterConfig {
    fn default() -> Self {
        Self {
            port: default_port(),
            sample_interval_secs: default_sample_interval(),
            loadavg_path: default_loadavg_path(),
        }
    }
}

impl ExporterConfig {
    /// Load configuration from the environment
    pub fn load() -> Result<Self> {
        let config = config::Config::builder()
            .add_source(config::Environment::with_prefix("EXPORTER"))
            .build()?;

        Ok(Self::from_config(config))
    }

    /// Deserialize from a built config source, falling back to defaults
    /// on an unparsable override (the fallback is logged, not silent)
    fn from_config(config: config::Config) -> Self {
        match config.try_deserialize() {
            Ok(config) => config,
            Err(e) => {
                warn!(error = %e, "Invalid configuration override, using defaults");
                Self::default()
            }
        }
    }
}
