// xferbench top-level command-line arguments
// (c) 2024 Ross Younger

use std::path::PathBuf;

use clap::Parser;

use crate::config::ConfigurationOverrides;

#[derive(Debug, Parser, Clone)]
#[command(
    author,
    version(env!("XFERBENCH_VERSION_STRING")),
    about,
    before_help = "e.g.   xferbench --root experiments/ --output summary.xlsx --print",
    infer_long_args(true)
)]
#[command(help_template(
    "\
{name} version {version}
{about-with-newline}
{usage-heading} {usage}
{before-help}
{all-args}{after-help}
"
))]
#[command(styles=super::styles::CLAP_STYLES)]
#[allow(clippy::struct_excessive_bools)]
pub(crate) struct CliArgs {
    // MODE SELECTION ======================================================================
    /// Outputs the configuration, then exits.
    ///
    /// Each field is listed with its current value and the source it came from.
    #[arg(long, help_heading("Configuration"), display_order(0))]
    pub(crate) show_config: bool,

    /// Outputs the paths to the implicit configuration files, then exits
    #[arg(long, help_heading("Configuration"), display_order(0))]
    pub(crate) config_files: bool,

    /// Reads configuration from this file, in addition to the implicit files.
    ///
    /// The file must exist. Its settings take precedence over the implicit files,
    /// but not over environment variables or the command line.
    #[arg(short('c'), long, value_name("FILE"), help_heading("Configuration"))]
    pub(crate) config: Option<PathBuf>,

    // OUTPUT ==============================================================================
    /// Quiet mode
    ///
    /// Reports only errors
    #[arg(short, long, action, conflicts_with("debug"))]
    pub(crate) quiet: bool,

    /// Prints the merged tables to standard output as well as writing the spreadsheet
    #[arg(long, action)]
    pub(crate) print: bool,

    // DEBUG ================================================================================
    /// Enable detailed debug output
    ///
    /// This has the same effect as setting `RUST_LOG=xferbench=debug` in the environment.
    /// If present, `RUST_LOG` overrides this option.
    #[arg(short, long, action, help_heading("Debug"))]
    pub(crate) debug: bool,
    /// Prints timing profile data after completion
    #[arg(long, action, help_heading("Debug"))]
    pub(crate) profile: bool,
    /// Log to a file
    ///
    /// By default the log receives everything printed to stderr.
    /// To override this behaviour, set the environment variable `RUST_LOG_FILE_DETAIL` (same semantics as `RUST_LOG`).
    #[arg(short('l'), long, action, help_heading("Debug"), value_name("FILE"))]
    pub(crate) log_file: Option<PathBuf>,

    // CONFIGURATION OVERRIDES =============================================================
    #[command(flatten)]
    pub(crate) overrides: ConfigurationOverrides,
}

#[cfg(test)]
mod test {
    use clap::{CommandFactory as _, Parser as _};

    use super::CliArgs;

    #[test]
    fn consistent() {
        CliArgs::command().debug_assert();
    }

    #[test]
    fn overrides_are_flattened() {
        let args = CliArgs::try_parse_from([
            "xferbench",
            "--root",
            "runs",
            "-o",
            "x.xlsx",
            "--framing-bittorrent",
            "68",
            "--print",
        ])
        .unwrap();
        assert!(args.print);
        assert_eq!(args.overrides.root.unwrap().to_string_lossy(), "runs");
        assert_eq!(args.overrides.output.unwrap().to_string_lossy(), "x.xlsx");
        assert_eq!(args.overrides.framing_bittorrent, Some(68));
        assert_eq!(args.overrides.column_width, None);
    }

    #[test]
    fn quiet_conflicts_with_debug() {
        assert!(CliArgs::try_parse_from(["xferbench", "-q", "-d"]).is_err());
    }
}
