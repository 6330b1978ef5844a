// Results files in, spreadsheet out
// (c) 2024 Ross Younger

use std::{collections::BTreeMap, path::PathBuf};

use anyhow::Result;
use tracing::{debug, info, warn};

use crate::{
    analysis::{CrossRunMerger, MergedResults},
    config::Configuration,
    report::ReportBuilder,
    results::{discover, ResultFile},
    util::time::StopwatchChain,
};

/// What a run did
#[derive(Debug)]
pub struct Outcome {
    /// Results files that were read successfully
    pub loaded: usize,
    /// Results files that could not be read and were skipped
    pub skipped: usize,
    /// The merged results, per protocol
    pub results: MergedResults,
    /// The report that was written
    pub report: ReportBuilder,
    /// Where the report was written
    pub output: PathBuf,
    /// Time spent in each phase
    pub timings: StopwatchChain,
}

/// Reads every path, logging and skipping the ones that cannot be read.
fn load_all(paths: &[PathBuf]) -> (Vec<ResultFile>, usize) {
    let mut loaded = Vec::with_capacity(paths.len());
    let mut skipped = 0;
    for path in paths {
        match ResultFile::load(path) {
            Ok(rf) => {
                debug!("{}: {} from {}", path.display(), rf.protocol, rf.server);
                loaded.push(rf);
            }
            Err(e) => {
                warn!("skipping {}: {e:#}", path.display());
                skipped += 1;
            }
        }
    }
    (loaded, skipped)
}

/// Groups results files by protocol name
fn group(files: &[ResultFile]) -> BTreeMap<String, CrossRunMerger> {
    let mut groups = BTreeMap::<String, CrossRunMerger>::new();
    for rf in files {
        groups
            .entry(rf.protocol.clone())
            .or_default()
            .add_file(rf.summaries());
    }
    groups
}

/// Merges each protocol's files cell by cell
#[must_use]
pub fn merge_files(files: &[ResultFile]) -> MergedResults {
    group(files)
        .into_iter()
        .map(|(protocol, merger)| {
            info!("{protocol}: merging {} file(s)", merger.file_count());
            (protocol, merger.merge())
        })
        .collect()
}

/// Discovers, loads and merges results files, then writes the spreadsheet.
///
/// Unreadable results files are skipped. Failing to write the spreadsheet is an error.
pub fn run(config: &Configuration) -> Result<Outcome> {
    let mut timings = StopwatchChain::default();

    timings.next("discover");
    let pattern = config.search_glob();
    let paths = discover(&pattern)?;
    if paths.is_empty() {
        warn!("no results files match {pattern}");
    } else {
        info!("found {} results file(s)", paths.len());
    }

    timings.next("load");
    let (files, skipped) = load_all(&paths);

    timings.next("merge");
    let results = merge_files(&files);

    timings.next("report");
    let report = ReportBuilder::new(&results).with_column_width(config.column_width);
    report.save(&config.output)?;
    timings.stop();
    info!("wrote {}", config.output.display());

    Ok(Outcome {
        loaded: files.len(),
        skipped,
        results,
        report,
        output: config.output.clone(),
        timings,
    })
}

#[cfg(test)]
mod test {
    use std::path::Path;

    use assertables::assert_in_delta;

    use super::run;
    use crate::{
        config::Configuration,
        report::test::{cell_number, is_blank, xlsx_part},
        sizes::SizeLabel,
    };

    fn results_file(dir: &Path, name: &str, protocol: &str, prefix: &str, body: &str) {
        let text = format!(r#"{{"protocol": "{protocol}", "file_prefix": "{prefix}", "files": {{ {body} }} }}"#);
        std::fs::write(dir.join(name), text).unwrap();
    }

    fn cell(key: &str, mean: f64, stddev: f64) -> String {
        format!(
            r#""{key}": {{
                "transfer_time": {{"mean": {mean}, "stddev": {stddev}}},
                "throughput_bps": {{"mean": 8000000.0, "stddev": 0.0}},
                "overhead_ratio": {{"mean": 1.05, "stddev": 0.0}} }}"#
        )
    }

    #[test]
    fn end_to_end() {
        let dir = tempfile::tempdir().unwrap();
        let run_a = dir.path().join("a");
        let run_b = dir.path().join("b").join("nested");
        std::fs::create_dir_all(&run_a).unwrap();
        std::fs::create_dir_all(&run_b).unwrap();

        results_file(
            &run_a,
            "results_A_from_h_HTTP1.1.json",
            "HTTP/1.1",
            "A",
            &format!("{}, {}", cell("A_10kB", 0.01, 0.001), cell("A_999999", 9., 9.)),
        );
        results_file(
            &run_b,
            "results_B_from_h_HTTP1.1.json",
            "HTTP/1.1",
            "B",
            &cell("10240", 0.03, 0.003),
        );
        results_file(
            &run_a,
            "results_A_from_h_BitTorrent.json",
            "BitTorrent",
            "A",
            &cell("A_10kB", 0.5, 0.0),
        );
        std::fs::write(run_a.join("results_C_from_h_HTTP2.json"), "{ truncated").unwrap();

        let config = Configuration {
            root: dir.path().into(),
            output: dir.path().join("out.xlsx"),
            ..Default::default()
        };
        let outcome = run(&config).unwrap();

        assert_eq!(outcome.loaded, 3);
        assert_eq!(outcome.skipped, 1);
        assert!(config.output.is_file());

        let http = &outcome.results["HTTP/1.1"];
        assert_eq!(http.len(), 1);
        let tt = http[&SizeLabel::K10].transfer_time;
        assert_in_delta!(tt.mean, 0.02, 1e-12);
        assert_in_delta!(tt.stddev, 0.002_236, 1e-6);

        let bt = &outcome.results["BitTorrent"][&SizeLabel::K10];
        assert_in_delta!(bt.transfer_time.stddev, 0., 1e-12);

        let sheet = &outcome.report.tables()[0];
        assert_eq!(sheet.protocols, vec!["BitTorrent", "HTTP/1.1"]);
        assert!(sheet.rows[1..].iter().all(|r| r.cells[0].is_none()));
        assert!(outcome.timings.find("report").is_some());

        // BitTorrent is columns B and C, HTTP/1.1 is D and E; 10kB is row 3
        let written = std::fs::read(&config.output).unwrap();
        let transfer = xlsx_part(&written, "xl/worksheets/sheet1.xml");
        assert!(transfer.contains(r#"<mergeCell ref="B1:C1"/>"#));
        assert!(transfer.contains(r#"<mergeCell ref="D1:E1"/>"#));
        assert_in_delta!(cell_number(&transfer, "B3").unwrap(), 0.5, 1e-12);
        assert_in_delta!(cell_number(&transfer, "C3").unwrap(), 0., 1e-12);
        assert_in_delta!(cell_number(&transfer, "D3").unwrap(), 0.02, 1e-12);
        assert_in_delta!(cell_number(&transfer, "E3").unwrap(), 0.002_236, 1e-6);
        for cell in ["B4", "C4", "B6", "C6", "D4", "E6"] {
            assert!(is_blank(&transfer, cell), "{cell}");
        }
        let overhead = xlsx_part(&written, "xl/worksheets/sheet3.xml");
        assert_in_delta!(cell_number(&overhead, "D3").unwrap(), 1.05, 1e-12);
    }

    #[test]
    fn root_with_glob_characters() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path().join("run[1]");
        std::fs::create_dir_all(&root).unwrap();
        results_file(
            &root,
            "results_A_from_h_HTTP1.1.json",
            "HTTP/1.1",
            "A",
            &cell("A_10kB", 0.01, 0.001),
        );
        let config = Configuration {
            root,
            output: dir.path().join("out.xlsx"),
            ..Default::default()
        };
        let outcome = run(&config).unwrap();
        assert_eq!(outcome.loaded, 1);
        let tt = outcome.results["HTTP/1.1"][&SizeLabel::K10].transfer_time;
        assert_in_delta!(tt.mean, 0.01, 1e-12);
    }

    #[test]
    fn nothing_found() {
        let dir = tempfile::tempdir().unwrap();
        let config = Configuration {
            root: dir.path().into(),
            output: dir.path().join("empty.xlsx"),
            ..Default::default()
        };
        let outcome = run(&config).unwrap();
        assert_eq!(outcome.loaded, 0);
        assert!(outcome.results.is_empty());
        assert!(outcome.report.tables().is_empty());
        assert!(config.output.is_file());
    }

    #[test]
    fn unwritable_output() {
        let dir = tempfile::tempdir().unwrap();
        let config = Configuration {
            root: dir.path().into(),
            output: dir.path().join("no").join("such").join("dir.xlsx"),
            ..Default::default()
        };
        assert!(run(&config).is_err());
    }
}
