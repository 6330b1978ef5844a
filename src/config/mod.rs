// (c) 2024 Ross Younger
//! # Configuration management
//!
//! xferbench obtains run-time configuration from the following sources, lowest priority first:
//! 1. Hard-wired defaults
//! 2. The user's configuration file, `~/.xferbench.toml`
//! 3. `xferbench.toml` in the working directory
//! 4. A file named on the command line with `--config`
//! 5. Environment variables prefixed `XFERBENCH_` (e.g. `XFERBENCH_COLUMN_WIDTH=20`)
//! 6. Command-line options
//!
//! Each option may appear in multiple places; the highest-priority source wins.
//!
//! ## File format
//!
//! Configuration files are TOML, with one top-level key per field.
//!
//! ### Example
//!
//! ```text
//! root = "/srv/experiments"
//! output = "summary.xlsx"
//! # BitTorrent handshake and message length prefixes
//! framing_bittorrent = 68
//! ```
//!
//! ## Configurable options
//!
//! The full list of supported fields is defined by [Configuration].
//!
//! On the command line:
//! * `xferbench --show-config` outputs the supported fields, their current values, and where each value came from.
//! * `xferbench --config-files` outputs the list of implicit configuration files.

mod structure;
pub use structure::Configuration;

mod overrides;
pub use overrides::ConfigurationOverrides;

mod manager;
pub use manager::Manager;

pub(crate) const BASE_CONFIG_FILENAME: &str = "xferbench.toml";
pub(crate) const ENV_PREFIX: &str = "XFERBENCH_";
