//! Core data models for the load exporter

use serde::{Deserialize, Serialize};

/// One round of load averages read from the host
///
/// Values are the averaged run-queue length over the trailing 1, 5 and
/// 15 minute windows. A sample is immutable once produced; it is written
/// into the gauge store and then discarded, no history is kept.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LoadSample {
    pub load1: f64,
    pub load5: f64,
    pub load15: f64,
}
