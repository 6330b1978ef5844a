// (c) 2024 Ross Younger

//! Experiment harness for comparing file transfer protocols.
//!
//! The crate measures repeated transfers of fixed-size test files over HTTP/1.1, HTTP/2 and
//! BitTorrent, and turns the measurements into a spreadsheet comparing the protocols:
//!
//! * [`collector`] times individual transfers and writes a results file per run.
//! * [`analysis`] reduces samples to mean and standard deviation, and merges runs.
//! * [`pipeline`] finds results files, merges them by protocol and file size, and hands them to
//! * [`report`], which writes one sheet per metric.
//!
//! The `xferbench` binary runs the [`pipeline`]. Its behaviour is set by [`config`].

pub mod analysis;
mod cli;
pub use cli::cli;
pub mod collector;
pub mod config;
pub mod pipeline;
pub mod protocol;
pub mod report;
pub mod results;
pub mod sizes;
/// Utilities
pub mod util;
