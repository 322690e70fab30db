//! Typed settings for the fixture machinery.
//!
//! Settings deserialize from YAML with every field defaulted, so callers can
//! override only what they need:
//!
//! ```yaml
//! naming:
//!   prefix: TST-ONT-
//! staging:
//!   source_dir: fixtures/ontology_files
//!   supported_versions: 5
//! reuse:
//!   key: parsed-corpus
//! ```

use std::path::PathBuf;

use serde::Deserialize;
use thiserror::Error;

use crate::registry::value_objects::{Acronym, AcronymError};

/// Root settings block for fixture provisioning.
#[derive(Clone, Debug, Default, Deserialize, PartialEq, Eq)]
pub struct FixtureSettings {
    /// Naming convention for provisioned ontologies.
    #[serde(default)]
    pub naming: NamingSettings,
    /// File staging locations and the supported version bound.
    #[serde(default)]
    pub staging: StagingSettings,
    /// Reuse guard configuration.
    #[serde(default)]
    pub reuse: ReuseSettings,
}

impl FixtureSettings {
    /// Parses settings from a YAML document.
    pub fn from_yaml(rendered: &str) -> Result<Self, ConfigError> {
        serde_yaml::from_str(rendered).map_err(ConfigError::YAMLFile)
    }
}

/// Naming convention applied to provisioned fixture ontologies.
#[derive(Clone, Debug, Deserialize, PartialEq, Eq)]
pub struct NamingSettings {
    /// Acronym prefix; provisioned ontologies append a zero-based index.
    #[serde(default = "default_prefix")]
    pub prefix: String,
}

impl NamingSettings {
    /// Builds the acronym for the fixture ontology at the supplied index.
    pub fn acronym_for(&self, index: usize) -> Result<Acronym, AcronymError> {
        Acronym::new(format!("{}{index}", self.prefix))
    }

    /// Returns true when the acronym follows this naming convention.
    #[must_use]
    pub fn matches(&self, acronym: &Acronym) -> bool {
        acronym.has_prefix(&self.prefix)
    }
}

impl Default for NamingSettings {
    fn default() -> Self {
        Self {
            prefix: default_prefix(),
        }
    }
}

/// Locations and bounds for the file staging pipeline.
#[derive(Clone, Debug, Deserialize, PartialEq, Eq)]
pub struct StagingSettings {
    /// Directory holding the versioned fixture source files.
    #[serde(default = "default_source_dir")]
    pub source_dir: PathBuf,
    /// Root directory staged copies are placed under.
    #[serde(default = "default_staged_root")]
    pub staged_root: PathBuf,
    /// Stem of the fixture source file names.
    #[serde(default = "default_file_stem")]
    pub file_stem: String,
    /// Highest submission version a fixture source file exists for.
    #[serde(default = "default_supported_versions")]
    pub supported_versions: u32,
}

impl StagingSettings {
    /// Returns the file name of the fixture source for a version.
    #[must_use]
    pub fn source_file_name(&self, version: u32) -> String {
        format!("{}_v{version}.owl", self.file_stem)
    }

    /// Returns the full path of the fixture source for a version.
    #[must_use]
    pub fn source_path(&self, version: u32) -> PathBuf {
        self.source_dir.join(self.source_file_name(version))
    }
}

impl Default for StagingSettings {
    fn default() -> Self {
        Self {
            source_dir: default_source_dir(),
            staged_root: default_staged_root(),
            file_stem: default_file_stem(),
            supported_versions: default_supported_versions(),
        }
    }
}

/// Conditions under which a provisioning call may reuse existing fixtures.
#[derive(Clone, Debug, Deserialize, PartialEq, Eq)]
pub struct ReuseSettings {
    /// Key a caller must supply to be eligible for reuse. `None` disables
    /// reuse entirely.
    #[serde(default)]
    pub key: Option<String>,
    /// Index of the canonical fixture ontology inspected by the guard.
    #[serde(default)]
    pub canonical_index: usize,
    /// Submission count the canonical fixture must hold to be reusable.
    #[serde(default = "default_expected_submissions")]
    pub expected_submissions: usize,
}

impl Default for ReuseSettings {
    fn default() -> Self {
        Self {
            key: None,
            canonical_index: 0,
            expected_submissions: default_expected_submissions(),
        }
    }
}

/// Errors raised while loading settings.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The YAML document did not match the settings schema.
    #[error("cannot parse settings: {0}")]
    YAMLFile(#[from] serde_yaml::Error),
}

fn default_prefix() -> String {
    "TST-ONT-".to_string()
}

fn default_source_dir() -> PathBuf {
    PathBuf::from("fixtures/ontology_files")
}

fn default_staged_root() -> PathBuf {
    std::env::temp_dir().join("ontology-fixtures")
}

fn default_file_stem() -> String {
    "tst_ontology".to_string()
}

fn default_supported_versions() -> u32 {
    5
}

fn default_expected_submissions() -> usize {
    3
}
