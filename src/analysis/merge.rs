// Merging of summaries from independent runs
// (c) 2024 Ross Younger

use std::collections::{btree_map::Entry, BTreeMap};

use tracing::debug;

use super::{Estimate, Summary};
use crate::sizes::SizeLabel;

/// Merged summaries for one protocol, in canonical size order
pub type ProtocolResults = BTreeMap<SizeLabel, Summary>;

/// Merged summaries for every protocol, keyed by protocol name
pub type MergedResults = BTreeMap<String, ProtocolResults>;

/// Combines estimates of the same quantity from independent runs.
///
/// * The mean is the arithmetic mean of the non-zero means.
/// * The standard deviation is the root-mean-square of the positive standard deviations,
///   `sqrt(sum(s²)/n)`, or zero if there are none.
/// * If no estimate carries a non-zero mean, the result is [`Estimate::ABSENT`].
pub fn combine<I>(estimates: I) -> Estimate
where
    I: IntoIterator<Item = Estimate>,
{
    let mut means = Vec::new();
    let mut stddevs = Vec::new();
    for e in estimates {
        if !e.is_absent() {
            means.push(e.mean);
        }
        if e.stddev > 0. {
            stddevs.push(e.stddev);
        }
    }
    if means.is_empty() {
        return Estimate::ABSENT;
    }
    let mean = mean_of(means.iter().copied());
    let stddev = if stddevs.is_empty() {
        0.
    } else {
        mean_of(stddevs.iter().map(|s| s * s)).sqrt()
    };
    Estimate { mean, stddev }
}

#[allow(clippy::cast_precision_loss)]
fn mean_of<I>(values: I) -> f64
where
    I: ExactSizeIterator<Item = f64>,
{
    let n = values.len() as f64;
    values.sum::<f64>() / n
}

/// Collects the per-file summaries for a single protocol, then merges them cell by cell.
#[derive(Debug, Default, Clone)]
pub struct CrossRunMerger {
    cells: BTreeMap<SizeLabel, Vec<Summary>>,
    files: usize,
}

impl CrossRunMerger {
    /// Constructor
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds the contents of one results file.
    ///
    /// Keys are normalized with [`SizeLabel::from_key`]; entries whose key is not a
    /// recognised file size are skipped. A file contributes at most one summary per size:
    /// if two keys name the same size, the first one seen is kept.
    pub fn add_file<I, K>(&mut self, entries: I)
    where
        I: IntoIterator<Item = (K, Summary)>,
        K: AsRef<str>,
    {
        self.files += 1;
        let mut this_file = BTreeMap::new();
        for (key, summary) in entries {
            let key = key.as_ref();
            let Some(label) = SizeLabel::from_key(key) else {
                debug!("skipping unrecognised file size {key:?}");
                continue;
            };
            match this_file.entry(label) {
                Entry::Vacant(v) => {
                    let _ = v.insert(summary);
                }
                Entry::Occupied(_) => {
                    debug!("skipping {key:?}, this file already has an entry for {label}");
                }
            }
        }
        for (label, summary) in this_file {
            self.add(label, summary);
        }
    }

    /// Adds a single summary for a known size
    pub fn add(&mut self, label: SizeLabel, summary: Summary) {
        self.cells.entry(label).or_default().push(summary);
    }

    /// Number of files added so far
    #[must_use]
    pub fn file_count(&self) -> usize {
        self.files
    }

    /// Merges every size that appeared in at least one file
    #[must_use]
    pub fn merge(&self) -> ProtocolResults {
        self.cells
            .iter()
            .map(|(label, summaries)| {
                let merged = Summary::from_fn(|metric| {
                    combine(summaries.iter().map(|s| s.get(metric)))
                });
                (*label, merged)
            })
            .collect()
    }
}

#[cfg(test)]
mod test {
    use assertables::assert_in_delta;

    use super::{combine, CrossRunMerger};
    use crate::analysis::{Estimate, Summary};
    use crate::sizes::SizeLabel;

    fn summary(mean: f64, stddev: f64) -> Summary {
        Summary::from_fn(|_| Estimate::new(mean, stddev))
    }

    #[test]
    fn single_is_identity() {
        let e = Estimate::new(0.012_345, 0.000_678);
        let c = combine([e]);
        assert_eq!(c.mean, e.mean);
        assert_in_delta!(c.stddev, e.stddev, 1e-15);
    }

    #[test]
    fn root_mean_square() {
        let c = combine([Estimate::new(1., 2.), Estimate::new(3., 4.)]);
        assert_in_delta!(c.mean, 2., 1e-12);
        assert_in_delta!(c.stddev, 10f64.sqrt(), 1e-12);
        assert_in_delta!(c.stddev, 3.1623, 1e-4);
    }

    #[test]
    fn zero_means_are_not_data() {
        let c = combine([Estimate::ABSENT, Estimate::new(4., 0.)]);
        assert_eq!(c, Estimate::new(4., 0.));
    }

    #[test]
    fn zero_stddevs_are_ignored() {
        let c = combine([Estimate::new(1., 0.), Estimate::new(3., 2.)]);
        assert_in_delta!(c.mean, 2., 1e-12);
        assert_in_delta!(c.stddev, 2., 1e-12);
    }

    #[test]
    fn nothing_to_combine() {
        assert_eq!(combine(Vec::<Estimate>::new()), Estimate::ABSENT);
        assert_eq!(combine([Estimate::ABSENT, Estimate::ABSENT]), Estimate::ABSENT);
    }

    #[test]
    fn merges_across_files() {
        let mut m = CrossRunMerger::new();
        m.add_file([("A_10kB", summary(0.01, 0.001))]);
        m.add_file([("B_10kB", summary(0.03, 0.003))]);
        assert_eq!(m.file_count(), 2);
        let merged = m.merge();
        assert_eq!(merged.len(), 1);
        let cell = merged[&SizeLabel::K10].transfer_time;
        assert_in_delta!(cell.mean, 0.02, 1e-12);
        let expected = ((0.001f64.powi(2) + 0.003f64.powi(2)) / 2.).sqrt();
        assert_in_delta!(cell.stddev, expected, 1e-12);
        assert_in_delta!(cell.stddev, 0.002_24, 1e-5);
    }

    #[test]
    fn size_in_one_file_only() {
        let mut m = CrossRunMerger::new();
        m.add_file([
            ("A_10kB", summary(0.01, 0.001)),
            ("A_1MB", summary(0.5, 0.25)),
        ]);
        m.add_file([("B_10kB", summary(0.03, 0.003))]);
        let merged = m.merge();
        assert_eq!(merged[&SizeLabel::M1], summary(0.5, 0.25));
        assert!(!merged.contains_key(&SizeLabel::K100));
    }

    #[test]
    fn one_entry_per_size_per_file() {
        let mut m = CrossRunMerger::new();
        m.add_file([
            ("A_10kB", summary(0.01, 0.001)),
            ("10240", summary(0.03, 0.003)),
        ]);
        let merged = m.merge();
        let cell = merged[&SizeLabel::K10].transfer_time;
        assert_in_delta!(cell.mean, 0.01, 1e-12);
        assert_in_delta!(cell.stddev, 0.001, 1e-12);

        m.add_file([("10240", summary(0.03, 0.003))]);
        let cell = m.merge()[&SizeLabel::K10].transfer_time;
        assert_in_delta!(cell.mean, 0.02, 1e-12);
    }

    #[test]
    fn raw_sizes_and_unknown_keys() {
        let mut m = CrossRunMerger::new();
        m.add_file([
            ("1048576", summary(1., 0.)),
            ("999999", summary(2., 0.)),
            ("garbage", summary(3., 0.)),
        ]);
        let merged = m.merge();
        assert_eq!(merged.keys().copied().collect::<Vec<_>>(), vec![SizeLabel::M1]);
    }

    #[test]
    fn canonical_order() {
        let mut m = CrossRunMerger::new();
        m.add_file([
            ("A_10MB", summary(4., 0.)),
            ("A_10kB", summary(1., 0.)),
            ("A_1MB", summary(3., 0.)),
            ("A_100kB", summary(2., 0.)),
        ]);
        let means: Vec<f64> = m.merge().values().map(|s| s.transfer_time.mean).collect();
        assert_eq!(means, vec![1., 2., 3., 4.]);
    }
}
