// File size classes used by the experiments
// (c) 2024 Ross Younger

use std::str::FromStr as _;

use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString, IntoEnumIterator as _};

/// The closed set of file sizes that experiments are run against.
///
/// The declaration order is the canonical report order (smallest first),
/// so `Ord` and [`strum::IntoEnumIterator`] both yield `10kB → 100kB → 1MB → 10MB`.
#[derive(
    Clone,
    Copy,
    Debug,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Display,
    EnumIter,
    EnumString,
    Serialize,
    Deserialize,
)]
pub enum SizeLabel {
    /// 10 KiB
    #[strum(to_string = "10kB")]
    #[serde(rename = "10kB")]
    K10,
    /// 100 KiB
    #[strum(to_string = "100kB")]
    #[serde(rename = "100kB")]
    K100,
    /// 1 MiB
    #[strum(to_string = "1MB")]
    #[serde(rename = "1MB")]
    M1,
    /// 10 MiB
    #[strum(to_string = "10MB")]
    #[serde(rename = "10MB")]
    M10,
}

impl SizeLabel {
    /// Size of the test file in bytes
    #[must_use]
    pub fn bytes(self) -> u64 {
        match self {
            SizeLabel::K10 => 10_240,
            SizeLabel::K100 => 102_400,
            SizeLabel::M1 => 1_048_576,
            SizeLabel::M10 => 10_485_760,
        }
    }

    /// Maps a key found in a results file to its canonical label.
    ///
    /// Keys may be a bare label (`10kB`), a raw byte count (`10240`), or either
    /// of those behind a file prefix (`A_10kB`, `B_1048576`).
    /// Anything else is not one of ours and yields `None`.
    #[must_use]
    pub fn from_key(key: &str) -> Option<Self> {
        let base = key.rsplit_once('_').map_or(key, |(_, size)| size);
        if let Ok(label) = Self::from_str(base) {
            return Some(label);
        }
        let bytes = base.parse::<u64>().ok()?;
        Self::iter().find(|l| l.bytes() == bytes)
    }

    /// Name of the test file of this size for a given file prefix, e.g. `A_10kB`
    #[must_use]
    pub fn file_name(self, prefix: &str) -> String {
        format!("{prefix}_{self}")
    }
}

#[cfg(test)]
mod test {
    use super::SizeLabel;
    use strum::IntoEnumIterator as _;

    #[test]
    fn canonical_order() {
        let order: Vec<String> = SizeLabel::iter().map(|l| l.to_string()).collect();
        assert_eq!(order, vec!["10kB", "100kB", "1MB", "10MB"]);
        assert!(SizeLabel::K100 < SizeLabel::M1);
    }

    #[test]
    fn labels() {
        assert_eq!(SizeLabel::from_key("10kB"), Some(SizeLabel::K10));
        assert_eq!(SizeLabel::from_key("10MB"), Some(SizeLabel::M10));
    }

    #[test]
    fn raw_byte_counts() {
        assert_eq!(SizeLabel::from_key("1048576"), Some(SizeLabel::M1));
        assert_eq!(SizeLabel::from_key("102400"), Some(SizeLabel::K100));
    }

    #[test]
    fn prefixed() {
        assert_eq!(SizeLabel::from_key("A_10kB"), Some(SizeLabel::K10));
        assert_eq!(SizeLabel::from_key("B_10485760"), Some(SizeLabel::M10));
    }

    #[test]
    fn unrecognised() {
        assert_eq!(SizeLabel::from_key("999999"), None);
        assert_eq!(SizeLabel::from_key("A_5MB"), None);
        assert_eq!(SizeLabel::from_key("10KB"), None);
        assert_eq!(SizeLabel::from_key(""), None);
    }

    #[test]
    fn file_names() {
        assert_eq!(SizeLabel::K100.file_name("A"), "A_100kB");
        for label in SizeLabel::iter() {
            assert_eq!(SizeLabel::from_key(&label.file_name("B")), Some(label));
        }
    }
}
