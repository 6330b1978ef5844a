// Reduction of raw samples to a summary
// (c) 2024 Ross Younger

use super::{AnalysisError, Estimate, Metric, Sample, Summary};

/// Reduces the samples for one (protocol, file size) cell to a [`Summary`].
///
/// Each metric gets its arithmetic mean and sample standard deviation
/// (n-1 denominator); a single sample has a standard deviation of zero.
///
/// # Errors
/// [`AnalysisError::InvalidInput`] if `samples` is empty.
pub fn summarize(samples: &[Sample]) -> Result<Summary, AnalysisError> {
    if samples.is_empty() {
        return Err(AnalysisError::InvalidInput(
            "cannot summarize an empty set of samples",
        ));
    }
    let mut values = Vec::with_capacity(samples.len());
    Ok(Summary::from_fn(|metric: Metric| {
        values.clear();
        values.extend(samples.iter().map(|s| metric.of(s)));
        // non-empty, checked above
        Estimate::from_values(&values).unwrap_or_default()
    }))
}
