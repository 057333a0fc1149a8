//! Sampling loop
//!
//! Drives the load source on a fixed cadence and publishes each sample
//! into the gauge store. A failed round is logged and skipped; the
//! previous gauge values stay in place until the next successful round.

use super::{LoadSource, SampleError};
use crate::health::{components, HealthRegistry};
use crate::models::LoadSample;
use crate::store::LoadGauges;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::sleep;
use tracing::{debug, info, warn};

/// Configuration for the sampling loop
#[derive(Debug, Clone)]
pub struct SamplerConfig {
    /// Delay between the end of one round and the start of the next
    /// (default: 5 seconds)
    pub interval: Duration,
}

impl Default for SamplerConfig {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(5),
        }
    }
}

/// Background loop that samples load averages and updates the gauges
pub struct SamplerLoop {
    source: Arc<dyn LoadSource>,
    gauges: LoadGauges,
    health: HealthRegistry,
    config: SamplerConfig,
}

impl SamplerLoop {
    pub fn new(
        source: Arc<dyn LoadSource>,
        gauges: LoadGauges,
        health: HealthRegistry,
        config: SamplerConfig,
    ) -> Self {
        Self {
            source,
            gauges,
            health,
            config,
        }
    }

    /// Run until the shutdown channel fires
    ///
    /// Samples immediately on startup, then sleeps the configured
    /// interval after each completed round. Rounds are sequential, never
    /// re-entrant.
    pub async fn run(self, mut shutdown: tokio::sync::broadcast::Receiver<()>) {
        info!(
            interval_secs = self.config.interval.as_secs(),
            "Starting load sampling loop"
        );

        loop {
            match self.tick().await {
                Ok(sample) => {
                    debug!(
                        load1 = sample.load1,
                        load5 = sample.load5,
                        load15 = sample.load15,
                        "Sampling round complete"
                    );
                    self.health.set_healthy(components::SAMPLER).await;
                }
                Err(e) => {
                    warn!(error = %e, "Skipping sampling round");
                    self.gauges.inc_sampler_errors();
                    self.health
                        .set_degraded(components::SAMPLER, e.to_string())
                        .await;
                }
            }

            tokio::select! {
                _ = sleep(self.config.interval) => {}
                _ = shutdown.recv() => {
                    info!("Shutting down load sampling loop");
                    break;
                }
            }
        }
    }

    /// One sampling round: read the source and publish the result
    ///
    /// On error the gauges are left untouched.
    pub async fn tick(&self) -> Result<LoadSample, SampleError> {
        let sample = self.source.sample().await?;
        self.gauges.set_sample(&sample);
        Ok(sample)
    }
}
