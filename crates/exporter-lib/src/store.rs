//! Gauge store backing the metrics endpoint
//!
//! Holds the three load average gauges plus a couple of operational
//! metrics about the sampler itself. Gauges are registered once into an
//! explicitly constructed registry passed in at startup; there is no
//! global registry. The sampler is the sole writer, the HTTP exposition
//! path is the sole reader, and each gauge is an atomic cell, so no
//! additional locking is needed.

use crate::models::LoadSample;
use prometheus::{Gauge, IntCounter, Opts, Registry};
use std::collections::BTreeMap;

/// Stable gauge names, part of the scrape contract
pub const LOAD_1M: &str = "load_1m";
pub const LOAD_5M: &str = "load_5m";
pub const LOAD_15M: &str = "load_15m";

/// The set of gauges exported by this process
///
/// Clones share the same underlying metric cells.
#[derive(Clone)]
pub struct LoadGauges {
    load_1m: Gauge,
    load_5m: Gauge,
    load_15m: Gauge,
    sampler_errors: IntCounter,
    last_success_timestamp: Gauge,
}

impl LoadGauges {
    /// Create the gauges and register them into the given registry
    ///
    /// Called once at startup; the gauges live for the rest of the
    /// process. Registration only fails on a name collision within the
    /// registry, which is a startup wiring error.
    pub fn register(registry: &Registry) -> prometheus::Result<Self> {
        let load_1m = Gauge::with_opts(Opts::new(LOAD_1M, "Load average over the last minute"))?;
        let load_5m = Gauge::with_opts(Opts::new(LOAD_5M, "Load average over the last 5 minutes"))?;
        let load_15m =
            Gauge::with_opts(Opts::new(LOAD_15M, "Load average over the last 15 minutes"))?;
        let sampler_errors = IntCounter::with_opts(Opts::new(
            "sampler_errors_total",
            "Total number of skipped sampling rounds",
        ))?;
        let last_success_timestamp = Gauge::with_opts(Opts::new(
            "sampler_last_success_timestamp_seconds",
            "Unix time of the last successful sampling round",
        ))?;

        registry.register(Box::new(load_1m.clone()))?;
        registry.register(Box::new(load_5m.clone()))?;
        registry.register(Box::new(load_15m.clone()))?;
        registry.register(Box::new(sampler_errors.clone()))?;
        registry.register(Box::new(last_success_timestamp.clone()))?;

        Ok(Self {
            load_1m,
            load_5m,
            load_15m,
            sampler_errors,
            last_success_timestamp,
        })
    }

    /// Publish one sample, overwriting the previous values
    ///
    /// Three independent atomic writes; a concurrent reader may observe
    /// values from two different rounds, but never a partially written
    /// gauge.
    pub fn set_sample(&self, sample: &LoadSample) {
        self.load_1m.set(sample.load1);
        self.load_5m.set(sample.load5);
        self.load_15m.set(sample.load15);
        self.last_success_timestamp
            .set(chrono::Utc::now().timestamp() as f64);
    }

    /// Count a skipped sampling round
    pub fn inc_sampler_errors(&self) {
        self.sampler_errors.inc();
    }

    /// Current values of the three load gauges, keyed by exported name
    pub fn snapshot(&self) -> BTreeMap<&'static str, f64> {
        BTreeMap::from([
            (LOAD_1M, self.load_1m.get()),
            (LOAD_5M, self.load_5m.get()),
            (LOAD_15M, self.load_15m.get()),
        ])
    }

    /// Number of skipped sampling rounds so far
    pub fn sampler_errors(&self) -> u64 {
        self.sampler_errors.get()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    fn gauges() -> LoadGauges {
        LoadGauges::register(&Registry::new()).unwrap()
    }

    #[test]
    fn test_gauges_start_at_zero() {
        let gauges = gauges();
        let snapshot = gauges.snapshot();

        assert_eq!(snapshot[LOAD_1M], 0.0);
        assert_eq!(snapshot[LOAD_5M], 0.0);
        assert_eq!(snapshot[LOAD_15M], 0.0);
        assert_eq!(gauges.sampler_errors(), 0);
    }

    #[test]
    fn test_set_sample_overwrites() {
        let gauges = gauges();

        gauges.set_sample(&LoadSample {
            load1: 0.50,
            load5: 1.25,
            load15: 2.00,
        });
        gauges.set_sample(&LoadSample {
            load1: 0.10,
            load5: 0.20,
            load15: 0.30,
        });

        let snapshot = gauges.snapshot();
        assert_eq!(snapshot[LOAD_1M], 0.10);
        assert_eq!(snapshot[LOAD_5M], 0.20);
        assert_eq!(snapshot[LOAD_15M], 0.30);
    }

    #[test]
    fn test_snapshot_idempotent_without_writes() {
        let gauges = gauges();
        gauges.set_sample(&LoadSample {
            load1: 1.0,
            load5: 2.0,
            load15: 3.0,
        });

        assert_eq!(gauges.snapshot(), gauges.snapshot());
    }

    #[test]
    fn test_duplicate_registration_fails() {
        let registry = Registry::new();
        LoadGauges::register(&registry).unwrap();
        assert!(LoadGauges::register(&registry).is_err());
    }

    #[test]
    fn test_concurrent_sets_never_tear() {
        let gauges = Arc::new(gauges());
        let mut handles = Vec::new();

        // Writers on every gauge; each thread writes a distinct pair of
        // values that a torn write could mix into something else.
        for i in 1..=8u32 {
            let gauges = gauges.clone();
            handles.push(std::thread::spawn(move || {
                let v = f64::from(i);
                for _ in 0..1000 {
                    gauges.set_sample(&LoadSample {
                        load1: v,
                        load5: v * 10.0,
                        load15: v * 100.0,
                    });
                }
            }));
        }

        for _ in 0..1000 {
            let snapshot = gauges.snapshot();
            for (name, value) in snapshot {
                let whole = match name {
                    LOAD_1M => value,
                    LOAD_5M => value / 10.0,
                    LOAD_15M => value / 100.0,
                    _ => unreachable!(),
                };
                assert!(
                    whole == 0.0 || (whole.fract() == 0.0 && (1.0..=8.0).contains(&whole)),
                    "torn value {} for {}",
                    value,
                    name
                );
            }
        }

        for handle in handles {
            handle.join().unwrap();
        }
    }
}
