//! General utility code that didn't fit anywhere else
// (c) 2024 Ross Younger

/// Fixed-precision number formatting for console output
pub mod format;
/// Data rate computation
pub mod rate;
/// Stopwatches for timing transfers and pipeline phases
pub mod time;

mod tracing;
pub use tracing::{setup as setup_tracing, Verbosity};

#[cfg(test)]
pub(crate) fn make_test_tempfile(
    data: &str,
    filename: &str,
) -> (std::path::PathBuf, tempfile::TempDir) {
    let tempdir = tempfile::tempdir().unwrap();
    let path = tempdir.path().join(filename);
    std::fs::write(&path, data).expect("Unable to write tempfile");
    (path, tempdir)
}
