//! Configuration source wrangling
// (c) 2024 Ross Younger

use super::{Configuration, BASE_CONFIG_FILENAME, ENV_PREFIX};

use figment::{
    providers::{Env, Format, Serialized, Toml},
    value::Value,
    Figment, Metadata, Provider,
};
use serde::Deserialize;
use std::{
    collections::{BTreeSet, HashSet},
    fmt::Display,
    path::{Path, PathBuf},
};
use struct_field_names_as_array::FieldNamesAsSlice;
use tabled::{settings::style::Style, Table, Tabled};

use tracing::{trace, warn};

// PATHS /////////////////////////////////////////////////////////////////////////////////////////////////////

/// `~/.xferbench.toml`
fn user_config_path() -> Option<PathBuf> {
    dirs::home_dir().map(|mut d| {
        d.push(format!(".{BASE_CONFIG_FILENAME}"));
        d
    })
}

/// `./xferbench.toml`
fn working_dir_config_path() -> PathBuf {
    PathBuf::from(BASE_CONFIG_FILENAME)
}

// SYSTEM DEFAULTS //////////////////////////////////////////////////////////////////////////////////////////////

/// A `[https://docs.rs/figment/latest/figment/trait.Provider.html](figment::Provider)` that holds
/// our set of fixed system default options
#[derive(Default)]
struct SystemDefault {}

impl SystemDefault {
    const META_NAME: &str = "default";
}

impl Provider for SystemDefault {
    fn metadata(&self) -> Metadata {
        Metadata::named(Self::META_NAME)
    }

    fn data(
        &self,
    ) -> Result<figment::value::Map<figment::Profile, figment::value::Dict>, figment::Error> {
        Serialized::defaults(Configuration::default()).data()
    }
}

// CONFIG MANAGER /////////////////////////////////////////////////////////////////////////////////////////////

/// Processes and merges all possible configuration sources.
///
/// Later sources win:
/// 1. Hard-wired defaults
/// 2. `~/.xferbench.toml`
/// 3. `./xferbench.toml`
/// 4. A file named with `--config`
/// 5. `XFERBENCH_*` environment variables
/// 6. Command-line options (merged in by the caller, see [`Manager::merge_provider`])
#[derive(Debug, Default)]
pub struct Manager {
    /// Configuration data
    data: Figment,
}

fn add_optional_file(f: Figment, path: Option<PathBuf>) -> Figment {
    let Some(path) = path else {
        warn!("could not determine user configuration file path");
        return f;
    };
    if !path.exists() {
        trace!("configuration file {path:?} not present");
        return f;
    }
    f.merge(Toml::file(path.as_path()))
}

impl Manager {
    /// Initialises this structure, reading the configuration files and environment.
    ///
    /// `explicit` is a file the user named; unlike the implicit files, it must exist.
    #[must_use]
    pub fn new(explicit: Option<&Path>) -> Self {
        let mut data = Figment::new().merge(SystemDefault::default());
        data = add_optional_file(data, user_config_path());
        data = add_optional_file(data, Some(working_dir_config_path()));
        let mut mgr = Self { data };
        if let Some(path) = explicit {
            // N.B. A missing or unparseable file leaves data in a fused-error state, reported on get().
            mgr.merge_toml_file(path);
        }
        mgr.merge_provider(Env::prefixed(ENV_PREFIX));
        mgr
    }

    /// Returns the list of implicit configuration files we look for.
    #[must_use]
    pub fn config_files() -> Vec<String> {
        let inputs = vec![user_config_path(), Some(working_dir_config_path())];

        inputs
            .into_iter()
            .flatten()
            .map(|p| p.into_os_string().to_string_lossy().into())
            .collect()
    }

    /// Testing/internal constructor, does not read files or environment
    #[must_use]
    #[allow(unused)]
    pub(crate) fn without_files() -> Self {
        let data = Figment::new().merge(SystemDefault::default());
        Self { data }
    }

    /// Merges in a data set, which is some sort of [figment::Provider](https://docs.rs/figment/latest/figment/trait.Provider.html).
    ///
    /// Within xferbench, [`ConfigurationOverrides`](super::ConfigurationOverrides) is the command-line provider.
    pub fn merge_provider<T>(&mut self, provider: T)
    where
        T: Provider,
    {
        let f = std::mem::take(&mut self.data);
        self.data = f.merge(provider); // in the error case, this leaves the provider in a fused state
    }

    /// Merges in a data set from a TOML file, which must exist
    pub fn merge_toml_file<T>(&mut self, toml: T)
    where
        T: AsRef<Path>,
    {
        let path = toml.as_ref();
        let provider = Toml::file_exact(path);
        self.merge_provider(provider);
    }

    /// Attempts to extract a particular struct from the data.
    ///
    /// Within xferbench, `T` is usually [Configuration], but it isn't intrinsically required to be.
    pub fn get<'de, T>(&self) -> Result<T, figment::Error>
    where
        T: Deserialize<'de>,
    {
        self.data.extract::<T>()
    }

    /// Every key present in any source, across all profiles
    fn keys(&self) -> Result<BTreeSet<String>, figment::Error> {
        Ok(self
            .data
            .data()?
            .values()
            .flat_map(|dict| dict.keys().cloned())
            .collect())
    }

    /// Keys present in some source which are not fields of `T`
    pub fn unrecognised_fields<T>(&self) -> Vec<String>
    where
        T: FieldNamesAsSlice,
    {
        let known: HashSet<&str> = T::FIELD_NAMES_AS_SLICE.iter().copied().collect();
        self.keys()
            .unwrap_or_default()
            .into_iter()
            .filter(|k| !known.contains(k.as_str()))
            .collect()
    }

    /// Logs a warning for each unrecognised field, naming where it came from
    pub fn warn_unrecognised<T>(&self)
    where
        T: FieldNamesAsSlice,
    {
        for field in self.unrecognised_fields::<T>() {
            let source = PrettyConfig::render_source(self.data.find_metadata(&field));
            warn!("unrecognised field `{field}` in {source}");
        }
    }
}

// PRETTY PRINT SUPPORT ///////////////////////////////////////////////////////////////////////////////////////

#[derive(Tabled)]
struct PrettyConfig {
    field: String,
    value: String,
    source: String,
}

impl PrettyConfig {
    fn render_source(meta: Option<&Metadata>) -> String {
        if let Some(m) = meta {
            m.source
                .as_ref()
                .map_or_else(|| m.name.to_string(), figment::Source::to_string)
        } else {
            String::new()
        }
    }

    fn render_value(value: &Value) -> String {
        match value {
            Value::String(_tag, s) => s.to_string(),
            Value::Char(_tag, c) => c.to_string(),
            Value::Bool(_tag, b) => b.to_string(),
            Value::Num(_tag, num) => {
                if let Some(u) = num.to_u128() {
                    u.to_string()
                } else if let Some(i) = num.to_i128() {
                    i.to_string()
                } else if let Some(ff) = num.to_f64() {
                    ff.to_string()
                } else {
                    format!("{num:?}")
                }
            }
            Value::Empty(_tag, _) => "<empty>".into(),
            Value::Dict(_tag, dict) => format!(
                "{{{}}}",
                dict.iter()
                    .map(|(k, v)| format!("{k}={}", PrettyConfig::render_value(v)))
                    .collect::<Vec<_>>()
                    .join(",")
            ),
            Value::Array(_tag, vec) => {
                format!(
                    "[{}]",
                    vec.iter()
                        .map(PrettyConfig::render_value)
                        .collect::<Vec<_>>()
                        .join(",")
                )
            }
        }
    }

    fn new(field: &str, value: &Value, meta: Option<&Metadata>) -> Self {
        Self {
            field: field.into(),
            value: PrettyConfig::render_value(value),
            source: PrettyConfig::render_source(meta),
        }
    }
}

impl Display for Manager {
    /// Tabulates the known configuration fields, their current values and where each came from.
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let keys = match self.keys() {
            Ok(k) => k,
            Err(e) => {
                // This isn't terribly helpful as it doesn't have metadata attached; BUT attempting to get() a struct does.
                return write!(f, "error: {e}");
            }
        };
        let known: HashSet<&str> = Configuration::FIELD_NAMES_AS_SLICE
            .iter()
            .copied()
            .collect();

        let mut fields = Vec::<PrettyConfig>::new();
        for field in keys.iter().filter(|k| known.contains(k.as_str())) {
            let value = match self.data.find_value(field) {
                Ok(v) => v,
                Err(e) => {
                    writeln!(f, "error on field {field}: {e}")?;
                    continue;
                }
            };
            let meta = self.data.find_metadata(field);
            fields.push(PrettyConfig::new(field, &value, meta));
        }
        write!(f, "{}", Table::new(fields).with(Style::sharp()))
    }
}
