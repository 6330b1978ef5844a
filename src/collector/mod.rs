// (c) 2024 Ross Younger
//! # Measurement of individual transfers
//!
//! A [`MetricCollector`] times fetches made through a [`Transfer`] implementation
//! and turns them into [`Sample`]s, then into per-file summaries and whole
//! [`ResultFile`](crate::results::ResultFile)s (see [`MetricCollector::run_plan`]).
//!
//! The protocol clients themselves live outside this crate; anything that can
//! fetch a named test file and report how many bytes it moved can be measured.

use anyhow::{bail, Context as _, Result};
use human_repr::HumanDuration as _;
use indicatif::{MultiProgress, ProgressBar, ProgressFinish, ProgressStyle};
use tracing::{debug, info, warn};

use crate::{
    analysis::{summarize, Sample},
    protocol::{OverheadModel, Protocol},
    results::FileSummary,
    util::{format::fixed, rate::DataRate, time::Stopwatch},
};

mod plan;
pub use plan::ExperimentPlan;

const PROGRESS_STYLE: &str = "{msg:.dim} {wide_bar:.cyan} {pos}/{len} {eta}";

/// Byte counts reported by one completed fetch
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TransferOutcome {
    /// Bytes of file content received
    pub payload_bytes: u64,
    /// Application-layer bytes that were not file content (headers, protocol messages)
    pub header_bytes: u64,
}

/// A protocol client that can fetch test files
pub trait Transfer {
    /// The protocol this client speaks
    fn protocol(&self) -> Protocol;
    /// Fetches one file to completion
    fn fetch(&mut self, file_name: &str) -> Result<TransferOutcome>;
}

/// Times transfers and reduces them to statistics
#[derive(Debug)]
pub struct MetricCollector<T: Transfer> {
    transfer: T,
    overhead: OverheadModel,
    display: MultiProgress,
}

impl<T: Transfer> MetricCollector<T> {
    /// Constructor
    #[must_use]
    pub fn new(transfer: T, overhead: OverheadModel, display: MultiProgress) -> Self {
        Self {
            transfer,
            overhead,
            display,
        }
    }

    /// The protocol being measured
    #[must_use]
    pub fn protocol(&self) -> Protocol {
        self.transfer.protocol()
    }

    /// Performs and times a single fetch
    pub fn measure(&mut self, file_name: &str) -> Result<Sample> {
        let mut stopwatch = Stopwatch::new(file_name);
        let outcome = self.transfer.fetch(file_name)?;
        let elapsed = stopwatch.stop().unwrap_or_default();

        let TransferOutcome {
            payload_bytes,
            header_bytes,
        } = outcome;
        if payload_bytes == 0 {
            bail!("{file_name}: transfer returned no data");
        }
        let overhead_ratio = self
            .overhead
            .ratio(payload_bytes, header_bytes)
            .with_context(|| format!("{file_name}: no overhead ratio"))?;
        let rate = DataRate::new(payload_bytes, elapsed);
        debug!(
            "{}: {payload_bytes} bytes in {} ({rate})",
            stopwatch.name(),
            elapsed.human_duration()
        );
        Ok(Sample {
            transfer_time: elapsed.as_secs_f64(),
            throughput: rate.bit_rate().unwrap_or_default(),
            file_size: payload_bytes,
            overhead_ratio,
            header_size: header_bytes,
            total_app_data: self.overhead.total_bytes(payload_bytes, header_bytes),
        })
    }

    fn progress_bar(&self, file_name: &str, repetitions: u32) -> ProgressBar {
        let style = ProgressStyle::with_template(PROGRESS_STYLE)
            .unwrap_or_else(|_| ProgressStyle::default_bar());
        self.display.add(
            ProgressBar::new(repetitions.into())
                .with_style(style)
                .with_message(format!("{} {file_name}", self.protocol()))
                .with_finish(ProgressFinish::AndClear),
        )
    }

    /// Fetches a file `repetitions` times.
    ///
    /// Failed attempts are logged and skipped. Returns `None` if no attempt succeeded.
    pub fn run_experiment(&mut self, file_name: &str, repetitions: u32) -> Option<FileSummary> {
        let bar = self.progress_bar(file_name, repetitions);
        let mut samples = Vec::new();
        for attempt in 1..=repetitions {
            match self.measure(file_name) {
                Ok(s) => samples.push(s),
                Err(e) => warn!("{file_name}: attempt {attempt}/{repetitions} failed: {e:#}"),
            }
            bar.inc(1);
        }
        bar.finish_and_clear();

        let Ok(summary) = summarize(&samples) else {
            warn!("{file_name}: every attempt failed");
            return None;
        };
        info!(
            "{} {file_name}: {}/{repetitions} ok; time {}s, throughput {} bps, overhead {}",
            self.protocol(),
            samples.len(),
            fixed(summary.transfer_time.mean, 5, false),
            fixed(summary.throughput.mean, 2, true),
            fixed(summary.overhead_ratio.mean, 5, false),
        );
        Some(FileSummary {
            file_name: file_name.to_string(),
            file_size_bytes: samples.first().map(|s| s.file_size).unwrap_or_default(),
            repetitions_completed: samples.len(),
            summary,
            raw_results: samples,
        })
    }
}
