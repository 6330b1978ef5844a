//! Configuration structure
// (c) 2024 Ross Younger

use std::path::{Path, PathBuf};

use glob::Pattern;
use serde::{Deserialize, Serialize};
use struct_field_names_as_array::FieldNamesAsSlice;

use crate::protocol::Protocol;

/// The set of configurable options supported by xferbench.
///
/// **Note:** The implementation of `default()` for this struct returns the hard-wired defaults,
/// which are: search the current directory tree for results files and write `results.xlsx`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize, FieldNamesAsSlice)]
pub struct Configuration {
    /// Directory tree to search for results files
    pub root: PathBuf,

    /// Glob pattern for results files, relative to `root`
    pub pattern: String,

    /// Spreadsheet to write.
    /// A relative path is relative to the working directory, not to `root`.
    pub output: PathBuf,

    /// Width of every spreadsheet column, in characters
    pub column_width: u16,

    /// Framing bytes added to each HTTP/1.1 transfer when computing the overhead ratio
    pub framing_http1: u64,
    /// Framing bytes added to each HTTP/2 transfer when computing the overhead ratio
    pub framing_http2: u64,
    /// Framing bytes added to each BitTorrent transfer when computing the overhead ratio
    pub framing_bittorrent: u64,
}

impl Configuration {
    /// Framing allowance for a protocol
    #[must_use]
    pub fn framing_for(&self, protocol: Protocol) -> u64 {
        match protocol {
            Protocol::Http1 => self.framing_http1,
            Protocol::Http2 => self.framing_http2,
            Protocol::BitTorrent => self.framing_bittorrent,
        }
    }

    /// The glob that finds results files: `pattern` joined onto `root`.
    /// Glob metacharacters in `root` match literally.
    #[must_use]
    pub fn search_glob(&self) -> String {
        let root = Pattern::escape(&self.root.to_string_lossy());
        Path::new(&root)
            .join(&self.pattern)
            .to_string_lossy()
            .into_owned()
    }
}

impl Default for Configuration {
    /// **(Unusual!)**
    /// Returns the hard-wired configuration defaults.
    fn default() -> Self {
        Self {
            root: ".".into(),
            pattern: "**/results_*_from_*_*.json".into(),
            output: "results.xlsx".into(),
            column_width: 15,
            framing_http1: 0,
            framing_http2: 0,
            framing_bittorrent: 0,
        }
    }
}

#[cfg(test)]
mod test {
    use std::path::Path;

    use super::Configuration;
    use crate::protocol::Protocol;
    use struct_field_names_as_array::FieldNamesAsSlice as _;

    #[test]
    fn defaults() {
        let c = Configuration::default();
        assert_eq!(c.output, Path::new("results.xlsx"));
        assert_eq!(c.column_width, 15);
        assert_eq!(c.search_glob(), "./**/results_*_from_*_*.json");
    }

    #[test]
    fn root_is_literal() {
        let c = Configuration {
            root: "runs/[1]*?".into(),
            pattern: "*.json".into(),
            ..Default::default()
        };
        assert_eq!(c.search_glob(), "runs/[[]1[]][*][?]/*.json");
    }

    #[test]
    fn framing() {
        let c = Configuration {
            framing_http1: 1,
            framing_http2: 2,
            framing_bittorrent: 3,
            ..Default::default()
        };
        assert_eq!(c.framing_for(Protocol::Http1), 1);
        assert_eq!(c.framing_for(Protocol::Http2), 2);
        assert_eq!(c.framing_for(Protocol::BitTorrent), 3);
    }

    #[test]
    fn field_names() {
        assert!(Configuration::FIELD_NAMES_AS_SLICE.contains(&"column_width"));
        assert_eq!(Configuration::FIELD_NAMES_AS_SLICE.len(), 7);
    }
}
