//! Command-line configuration overrides
// (c) 2024 Ross Younger

use std::path::PathBuf;

use clap::Args;
use figment::{
    value::{Dict, Map, Value},
    Metadata, Profile, Provider,
};

/// Helper function for `figment::Provider` implementation
///
/// If the given `arg` is not None, inserts it into `dict` with key `arg_name`.
pub(crate) fn insert_if_some<T>(
    dict: &mut Dict,
    arg_name: &str,
    arg: Option<T>,
) -> Result<(), figment::Error>
where
    T: serde::Serialize,
{
    if let Some(a) = arg {
        let _ = dict.insert(arg_name.to_string(), Value::serialize(a)?);
    }
    Ok(())
}

/// The configuration fields, as entered on the command line.
///
/// Every member is optional; only the ones the user gave are merged over the
/// lower-priority sources (environment, configuration files, defaults).
/// The fields are documented on [`Configuration`](super::Configuration).
#[derive(Debug, Clone, Default, PartialEq, Eq, Args)]
pub struct ConfigurationOverrides {
    /// Directory tree to search for results files [default: .]
    #[arg(long, value_name("DIR"), help_heading("Configuration"))]
    pub root: Option<PathBuf>,

    /// Glob pattern for results files, relative to the root
    /// [default: **/results_*_from_*_*.json]
    #[arg(long, value_name("GLOB"), help_heading("Configuration"))]
    pub pattern: Option<String>,

    /// Spreadsheet to write [default: results.xlsx]
    #[arg(short, long, value_name("FILE"), help_heading("Configuration"))]
    pub output: Option<PathBuf>,

    /// Spreadsheet column width in characters [default: 15]
    #[arg(long, value_name("chars"), help_heading("Configuration"))]
    pub column_width: Option<u16>,

    /// Framing bytes added to each HTTP/1.1 transfer in the overhead ratio [default: 0]
    #[arg(long, value_name("bytes"), help_heading("Overhead model"))]
    pub framing_http1: Option<u64>,
    /// Framing bytes added to each HTTP/2 transfer in the overhead ratio [default: 0]
    #[arg(long, value_name("bytes"), help_heading("Overhead model"))]
    pub framing_http2: Option<u64>,
    /// Framing bytes added to each BitTorrent transfer in the overhead ratio [default: 0]
    #[arg(long, value_name("bytes"), help_heading("Overhead model"))]
    pub framing_bittorrent: Option<u64>,
}

impl Provider for ConfigurationOverrides {
    fn metadata(&self) -> Metadata {
        Metadata::named("command-line").interpolater(|_profile, path| {
            let key = path
                .last()
                .map_or("<unknown>".to_string(), |s| s.replace('_', "-"));
            format!("--{key}")
        })
    }

    fn data(&self) -> Result<Map<Profile, Dict>, figment::Error> {
        let mut dict = Dict::new();
        insert_if_some(&mut dict, "root", self.root.as_ref())?;
        insert_if_some(&mut dict, "pattern", self.pattern.as_ref())?;
        insert_if_some(&mut dict, "output", self.output.as_ref())?;
        insert_if_some(&mut dict, "column_width", self.column_width)?;
        insert_if_some(&mut dict, "framing_http1", self.framing_http1)?;
        insert_if_some(&mut dict, "framing_http2", self.framing_http2)?;
        insert_if_some(&mut dict, "framing_bittorrent", self.framing_bittorrent)?;

        let mut profile_map = Map::new();
        let _ = profile_map.insert(Profile::Global, dict);
        Ok(profile_map)
    }
}
