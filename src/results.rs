// Results file format, discovery and I/O
// (c) 2024 Ross Younger

use std::{
    collections::BTreeMap,
    fs::File,
    io::{BufWriter, Write as _},
    path::{Path, PathBuf},
};

use anyhow::{Context as _, Result};
use glob::{glob_with, MatchOptions};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::{
    analysis::{Sample, Summary},
    protocol::Protocol,
};

/// Timestamp format recorded in results files
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// One experiment run: a protocol, against one server, over one set of test files.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResultFile {
    /// Protocol display name, e.g. `HTTP/1.1`
    pub protocol: String,
    /// Host the files were fetched from
    #[serde(default)]
    pub server: String,
    /// Prefix of the test files (`A` for `A_10kB` etc.)
    pub file_prefix: String,
    /// Local time the run finished, see [`TIMESTAMP_FORMAT`]
    #[serde(default)]
    pub timestamp: String,
    /// Per-file results, keyed by size label or test file name
    pub files: BTreeMap<String, FileSummary>,
}

/// Results for one test file
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FileSummary {
    /// Test file name
    #[serde(default)]
    pub file_name: String,
    /// Test file size
    #[serde(default)]
    pub file_size_bytes: u64,
    /// Number of attempts that succeeded
    #[serde(default)]
    pub repetitions_completed: usize,
    /// Estimates for each metric
    #[serde(flatten)]
    pub summary: Summary,
    /// Every successful attempt. Written for reference, never read back.
    #[serde(default, skip_deserializing, skip_serializing_if = "Vec::is_empty")]
    pub raw_results: Vec<Sample>,
}

impl ResultFile {
    /// Name under which a run is saved: `results_<prefix>_from_<host>_<tag>.json`
    #[must_use]
    pub fn file_name_for(prefix: &str, host: &str, protocol: Protocol) -> String {
        format!("results_{prefix}_from_{host}_{}.json", protocol.tag())
    }

    /// Reads a results file
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("reading {}", path.display()))?;
        serde_json::from_str(&text).with_context(|| format!("parsing {}", path.display()))
    }

    /// Writes this run into `dir` under its conventional name, returning the path written
    pub fn save(&self, dir: &Path, protocol: Protocol) -> Result<PathBuf> {
        let path = dir.join(Self::file_name_for(
            &self.file_prefix,
            &self.server,
            protocol,
        ));
        let file =
            File::create(&path).with_context(|| format!("creating {}", path.display()))?;
        let mut writer = BufWriter::new(file);
        serde_json::to_writer_pretty(&mut writer, self)
            .with_context(|| format!("writing {}", path.display()))?;
        writer
            .flush()
            .with_context(|| format!("writing {}", path.display()))?;
        debug!("saved results to {}", path.display());
        Ok(path)
    }

    /// Each file's key and summary, for feeding a [`CrossRunMerger`](crate::analysis::CrossRunMerger)
    pub fn summaries(&self) -> impl Iterator<Item = (&str, Summary)> {
        self.files.iter().map(|(k, f)| (k.as_str(), f.summary))
    }
}

/// Finds results files matching a glob, in sorted order.
///
/// Unreadable directory entries are logged and skipped.
pub fn discover(pattern: &str) -> Result<Vec<PathBuf>> {
    let options = MatchOptions {
        case_sensitive: true,
        require_literal_leading_dot: true,
        require_literal_separator: true,
    };
    let mut found = Vec::new();
    for entry in glob_with(pattern, options).with_context(|| format!("bad pattern {pattern}"))? {
        match entry {
            Ok(path) if path.is_file() => found.push(path),
            Ok(_) => (),
            Err(e) => warn!("{e}"),
        }
    }
    found.sort();
    Ok(found)
}
