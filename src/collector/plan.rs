// Experiment plans: which sizes to fetch, and how often
// (c) 2024 Ross Younger

use std::collections::BTreeMap;

use chrono::Local;
use tracing::{info, warn};

use super::{MetricCollector, Transfer};
use crate::{
    results::{ResultFile, TIMESTAMP_FORMAT},
    sizes::SizeLabel,
};

/// Number of repetitions to run for each file size.
///
/// Smaller files are repeated more often so that each size accumulates
/// a comparable amount of transfer time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExperimentPlan {
    repetitions: BTreeMap<SizeLabel, u32>,
}

impl Default for ExperimentPlan {
    /// 10kB × 1000, 100kB × 100, 1MB × 10, 10MB × 1
    fn default() -> Self {
        Self::from_iter([
            (SizeLabel::K10, 1000),
            (SizeLabel::K100, 100),
            (SizeLabel::M1, 10),
            (SizeLabel::M10, 1),
        ])
    }
}

impl FromIterator<(SizeLabel, u32)> for ExperimentPlan {
    fn from_iter<I: IntoIterator<Item = (SizeLabel, u32)>>(iter: I) -> Self {
        Self {
            repetitions: iter.into_iter().collect(),
        }
    }
}

impl ExperimentPlan {
    /// Planned repetitions for a size; zero if the size is not in the plan
    #[must_use]
    pub fn repetitions(&self, size: SizeLabel) -> u32 {
        self.repetitions.get(&size).copied().unwrap_or_default()
    }

    /// The sizes in the plan, smallest first, with their repetition counts
    pub fn iter(&self) -> impl Iterator<Item = (SizeLabel, u32)> + '_ {
        self.repetitions.iter().map(|(k, v)| (*k, *v))
    }
}

impl<T: Transfer> MetricCollector<T> {
    /// Runs every experiment in a plan against the files `<prefix>_<size>` on `host`.
    ///
    /// Sizes for which every attempt failed are left out of the result.
    pub fn run_plan(&mut self, prefix: &str, host: &str, plan: &ExperimentPlan) -> ResultFile {
        let protocol = self.protocol();
        info!("{protocol}: running {} experiments from {host}", plan.repetitions.len());
        let mut files = BTreeMap::new();
        for (size, repetitions) in plan.iter().filter(|(_, n)| *n > 0) {
            let file_name = size.file_name(prefix);
            match self.run_experiment(&file_name, repetitions) {
                Some(summary) => {
                    let _ = files.insert(file_name, summary);
                }
                None => warn!("{protocol}: no results for {file_name}"),
            }
        }
        ResultFile {
            protocol: protocol.to_string(),
            server: host.to_string(),
            file_prefix: prefix.to_string(),
            timestamp: Local::now().format(TIMESTAMP_FORMAT).to_string(),
            files,
        }
    }
}

#[cfg(test)]
mod test {
    use super::ExperimentPlan;
    use crate::{
        analysis::CrossRunMerger,
        collector::{
            test::{hidden, FakeTransfer},
            MetricCollector,
        },
        protocol::OverheadModel,
        results::ResultFile,
        sizes::SizeLabel,
    };

    #[test]
    fn default_plan() {
        let p = ExperimentPlan::default();
        assert_eq!(p.repetitions(SizeLabel::K10), 1000);
        assert_eq!(p.repetitions(SizeLabel::M10), 1);
        let order: Vec<_> = p.iter().map(|(s, _)| s).collect();
        assert_eq!(
            order,
            vec![SizeLabel::K10, SizeLabel::K100, SizeLabel::M1, SizeLabel::M10]
        );
    }

    #[test]
    fn run_small_plan() {
        let fake = FakeTransfer {
            payload: 4096,
            header: 64,
            // the single 10MB attempt is the 5th call
            failures: vec![5],
            ..Default::default()
        };
        let mut c = MetricCollector::new(fake, OverheadModel::default(), hidden());
        let plan = ExperimentPlan::from_iter([
            (SizeLabel::K10, 3),
            (SizeLabel::K100, 0),
            (SizeLabel::M1, 1),
            (SizeLabel::M10, 1),
        ]);
        let rf = c.run_plan("A", "server1", &plan);
        assert_eq!(rf.protocol, "HTTP/2");
        assert_eq!(rf.server, "server1");
        assert_eq!(rf.file_prefix, "A");
        assert_eq!(rf.timestamp.len(), "2024-01-01 00:00:00".len());
        let keys: Vec<_> = rf.files.keys().cloned().collect();
        assert_eq!(keys, vec!["A_10kB", "A_1MB"]);
        assert_eq!(rf.files["A_10kB"].repetitions_completed, 3);

        // and what the collector writes, the merger reads
        let dir = tempfile::tempdir().unwrap();
        let path = rf.save(dir.path(), c.protocol()).unwrap();
        assert!(path.ends_with("results_A_from_server1_HTTP2.json"));
        let mut merger = CrossRunMerger::new();
        merger.add_file(ResultFile::load(&path).unwrap().summaries());
        let merged = merger.merge();
        assert_eq!(
            merged.keys().copied().collect::<Vec<_>>(),
            vec![SizeLabel::K10, SizeLabel::M1]
        );
    }
}
