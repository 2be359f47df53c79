//! Layered configuration for a bidsify run.
//!
//! Layers, lowest priority first:
//! 1. built-in defaults,
//! 2. a TOML, YAML or JSON config file (format chosen by extension),
//! 3. `BIDSIFY_*` environment variables,
//! 4. [`Overrides`], usually from the command line.
//!
//! The merged result is validated into a [`Config`] before anything runs.

pub mod error;

use crate::error::{ErrorKind, Result};
use bidsify_identity::DEFAULT_ACCESSION_COLUMN;
use directories::ProjectDirs;
use exn::{OptionExt, ResultExt};
use figment::Figment;
use figment::providers::{Env, Format, Json, Serialized, Toml, Yaml};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::instrument;

/// Prefix of environment variables read as a configuration layer.
pub const ENV_PREFIX: &str = "BIDSIFY_";
/// File name looked up in the platform config directory.
pub const CONFIG_FILE_NAME: &str = "config.toml";
pub const DEFAULT_SESSION: &str = "research";

/// Validated settings for one run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// CSV lookup table mapping accessions to record ids.
    pub mapping: PathBuf,
    /// Root of the per-subject NIfTI tree.
    pub source: PathBuf,
    /// Root of the BIDS tree to write.
    pub output: PathBuf,
    pub session: String,
    /// Lookup table column holding the accession.
    pub accession_column: String,
    /// Destination path template; `None` uses the built-in BIDS layout.
    pub template: Option<String>,
}

/// Highest-priority layer. Unset fields leave lower layers untouched.
#[derive(Debug, Default, Clone, Serialize)]
pub struct Overrides {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mapping: Option<PathBuf>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source: Option<PathBuf>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output: Option<PathBuf>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub session: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub accession_column: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub template: Option<String>,
}

/// The merged layers before validation.
#[derive(Debug, Serialize, Deserialize)]
struct Layered {
    #[serde(skip_serializing_if = "Option::is_none")]
    mapping: Option<PathBuf>,
    #[serde(skip_serializing_if = "Option::is_none")]
    source: Option<PathBuf>,
    #[serde(skip_serializing_if = "Option::is_none")]
    output: Option<PathBuf>,
    session: String,
    accession_column: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    template: Option<String>,
}
impl Default for Layered {
    fn default() -> Self {
        Self {
            mapping: None,
            source: None,
            output: None,
            session: DEFAULT_SESSION.to_string(),
            accession_column: DEFAULT_ACCESSION_COLUMN.to_string(),
            template: None,
        }
    }
}

impl Config {
    /// Loads and validates the configuration.
    ///
    /// `file` must exist when given. Without it, [`default_path`] is used if
    /// a file exists there.
    #[instrument(level = "debug", skip(overrides))]
    pub fn load(file: Option<&Path>, overrides: Overrides) -> Result<Self> {
        Self::from_figment(Self::figment(file, overrides)?)
    }

    /// Builds the layered [`Figment`] without extracting it.
    pub fn figment(file: Option<&Path>, overrides: Overrides) -> Result<Figment> {
        let mut figment = Figment::from(Serialized::defaults(Layered::default()));
        let file = match file {
            Some(path) if !path.is_file() => exn::bail!(ErrorKind::FileNotFound(path.to_path_buf())),
            Some(path) => Some(path.to_path_buf()),
            None => default_path().filter(|path| path.is_file()),
        };
        if let Some(path) = file {
            tracing::debug!(path = %path.display(), "Reading config file");
            figment = merge_file(figment, &path)?;
        }
        Ok(figment.merge(Env::prefixed(ENV_PREFIX)).merge(Serialized::defaults(overrides)))
    }

    /// Extracts and validates a configuration from any figment.
    pub fn from_figment(figment: Figment) -> Result<Self> {
        let layered: Layered = figment.extract().or_raise(|| ErrorKind::Invalid)?;
        let session = layered.session.trim().to_string();
        if session.is_empty() || session.contains(['/', '\\']) {
            exn::bail!(ErrorKind::InvalidSession(layered.session));
        }
        let accession_column = layered.accession_column.trim().to_string();
        if accession_column.is_empty() {
            exn::bail!(ErrorKind::MissingField("accession_column"));
        }
        Ok(Self {
            mapping: layered.mapping.ok_or_raise(|| ErrorKind::MissingField("mapping"))?,
            source: layered.source.ok_or_raise(|| ErrorKind::MissingField("source"))?,
            output: layered.output.ok_or_raise(|| ErrorKind::MissingField("output"))?,
            session,
            accession_column,
            template: layered.template.filter(|template| !template.trim().is_empty()),
        })
    }
}

/// `bidsify/config.toml` in the platform config directory, if there is one.
pub fn default_path() -> Option<PathBuf> {
    ProjectDirs::from("", "", "bidsify").map(|dirs| dirs.config_dir().join(CONFIG_FILE_NAME))
}

fn merge_file(figment: Figment, path: &Path) -> Result<Figment> {
    let extension = path.extension().and_then(|ext| ext.to_str()).map(str::to_ascii_lowercase);
    Ok(match extension.as_deref() {
        Some("toml") => figment.merge(Toml::file_exact(path)),
        Some("yaml" | "yml") => figment.merge(Yaml::file_exact(path)),
        Some("json") => figment.merge(Json::file_exact(path)),
        _ => exn::bail!(ErrorKind::UnsupportedFormat(path.to_path_buf())),
    })
}
