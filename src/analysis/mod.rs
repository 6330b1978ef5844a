// (c) 2024 Ross Younger
//! # Statistical reduction of experiment results
//!
//! Results move through this module in one direction:
//!
//! 1. Each transfer attempt yields a [`Sample`].
//! 2. The samples for one (protocol, file size) cell are reduced to a [`Summary`] by [`summarize`].
//! 3. Summaries for the same cell that were produced by separate runs (for example, runs against
//!    the `A` and `B` test files) are combined by the [`CrossRunMerger`].
//!
//! A [`Summary`] holds one [`Estimate`] per [`Metric`].
//! An estimate whose mean is zero means "no data"; it is never a measured zero.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter};

mod aggregate;
pub use aggregate::summarize;

mod merge;
pub use merge::{combine, CrossRunMerger, MergedResults, ProtocolResults};

/// Errors from the statistics functions
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum AnalysisError {
    /// The caller broke a precondition
    #[error("invalid input: {0}")]
    InvalidInput(&'static str),
}

/// The metrics of one transfer attempt
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Sample {
    /// Wall-clock duration of the transfer, in seconds
    pub transfer_time: f64,
    /// Payload throughput, in bits per second
    pub throughput: f64,
    /// Payload size, in bytes
    pub file_size: u64,
    /// All application-layer bytes over payload bytes (always >= 1)
    pub overhead_ratio: f64,
    /// Non-payload application-layer bytes
    pub header_size: u64,
    /// Total application-layer bytes
    pub total_app_data: u64,
}

/// The measured quantities
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Display, EnumIter)]
pub enum Metric {
    /// Transfer time (seconds)
    #[strum(to_string = "Transfer Time (s)")]
    TransferTime,
    /// Throughput (bits per second)
    #[strum(to_string = "Throughput (bps)")]
    Throughput,
    /// Overhead ratio (dimensionless)
    #[strum(to_string = "Overhead Ratio")]
    OverheadRatio,
}

impl Metric {
    /// Extracts this metric from a sample
    #[must_use]
    pub fn of(self, sample: &Sample) -> f64 {
        match self {
            Metric::TransferTime => sample.transfer_time,
            Metric::Throughput => sample.throughput,
            Metric::OverheadRatio => sample.overhead_ratio,
        }
    }

    /// Spreadsheet number format for this metric
    #[must_use]
    pub fn number_format(self) -> &'static str {
        match self {
            Metric::TransferTime | Metric::OverheadRatio => "0.00000",
            Metric::Throughput => "#,##0.00",
        }
    }

    /// Number of decimal places shown for this metric
    #[must_use]
    pub fn decimals(self) -> usize {
        match self {
            Metric::TransferTime | Metric::OverheadRatio => 5,
            Metric::Throughput => 2,
        }
    }

    /// Whether the integer part is shown with thousands separators
    #[must_use]
    pub fn thousands_separated(self) -> bool {
        matches!(self, Metric::Throughput)
    }
}

/// Mean and standard deviation of one metric
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Estimate {
    /// Arithmetic mean
    pub mean: f64,
    /// Standard deviation
    pub stddev: f64,
}

impl Estimate {
    /// The "no data" marker
    pub const ABSENT: Estimate = Estimate {
        mean: 0.,
        stddev: 0.,
    };

    /// Constructor
    #[must_use]
    pub fn new(mean: f64, stddev: f64) -> Self {
        Self { mean, stddev }
    }

    /// A zero mean is the "no data" sentinel
    #[must_use]
    #[allow(clippy::float_cmp)]
    pub fn is_absent(&self) -> bool {
        self.mean == 0.
    }

    /// Mean and sample standard deviation (n-1 denominator) of a set of values.
    /// A single value has a standard deviation of zero.
    /// Returns `None` if there are no values.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn from_values(values: &[f64]) -> Option<Self> {
        if values.is_empty() {
            return None;
        }
        let n = values.len() as f64;
        let mean = values.iter().sum::<f64>() / n;
        let stddev = if values.len() > 1 {
            let variance = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / (n - 1.);
            variance.sqrt()
        } else {
            0.
        };
        Some(Self { mean, stddev })
    }
}

/// Per-metric estimates for one (protocol, file size) cell.
///
/// A metric missing from a results file deserializes as [`Estimate::ABSENT`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Summary {
    /// Transfer time, seconds
    pub transfer_time: Estimate,
    /// Throughput, bits per second
    #[serde(rename = "throughput_bps")]
    pub throughput: Estimate,
    /// Overhead ratio
    pub overhead_ratio: Estimate,
}

impl Summary {
    /// Builds a summary by computing each metric's estimate in turn
    pub fn from_fn<F>(mut f: F) -> Self
    where
        F: FnMut(Metric) -> Estimate,
    {
        Self {
            transfer_time: f(Metric::TransferTime),
            throughput: f(Metric::Throughput),
            overhead_ratio: f(Metric::OverheadRatio),
        }
    }

    /// Accessor by metric
    #[must_use]
    pub fn get(&self, metric: Metric) -> Estimate {
        match metric {
            Metric::TransferTime => self.transfer_time,
            Metric::Throughput => self.throughput,
            Metric::OverheadRatio => self.overhead_ratio,
        }
    }
}
