//! Fixture lifecycle machinery for the registry.
//!
//! The provisioner builds a deterministic, versioned set of ontology and
//! submission fixtures in backing storage, reuses prior provisioning when a
//! caller is eligible, drives the optional file staging pipeline, and tears
//! everything down again. Components are small and composable: the status
//! registry, the submission identifier allocator, the staging pipeline and
//! the reuse guard are each usable on their own.

pub mod provisioner;
pub mod reuse;
pub mod sequence;
pub mod staging;
pub mod status;

use std::path::PathBuf;

use thiserror::Error;

use crate::registry::entities::RegistryError;
use crate::registry::value_objects::{Acronym, AcronymError, SubmissionId};

pub use provisioner::{CreateOptions, CreateOutcome, FixtureHandles, FixtureProvisioner};
pub use reuse::{ReuseGuard, ReuseKey};
pub use sequence::SequenceAllocator;
pub use staging::FileStagingPipeline;
pub use status::StatusRegistry;

/// Errors raised while provisioning or tearing down fixtures.
#[derive(Debug, Error)]
pub enum FixtureError {
    /// Domain or persistence failure surfaced by the registry.
    #[error(transparent)]
    Registry(#[from] RegistryError),
    /// A generated acronym did not follow the naming convention.
    #[error(transparent)]
    Acronym(#[from] AcronymError),
    /// The provisioner was configured in a way it cannot execute.
    #[error("invalid fixture configuration: {0}")]
    Config(String),
    /// A supported version has no fixture source file on disk.
    #[error("fixture source for version {version} is missing at `{path}`")]
    MissingSource { version: u32, path: PathBuf },
    /// A submission identifier beyond the supported fixture versions was
    /// requested for processing.
    #[error("submission {requested} exceeds the supported fixture versions (1..={supported})")]
    UnsupportedVersion {
        requested: SubmissionId,
        supported: u32,
    },
    /// Copying a fixture into its staged location failed.
    #[error("failed to stage fixture at `{path}`: {source}")]
    StagingIo {
        path: PathBuf,
        source: std::io::Error,
    },
    /// Reading a staged file back failed.
    #[error("failed to read staged file `{path}`: {source}")]
    StagedRead {
        path: PathBuf,
        source: std::io::Error,
    },
    /// The staged file could not be parsed.
    #[error("staged file `{path}` failed to parse: {reason}")]
    Parse { path: PathBuf, reason: String },
    /// Processing was requested for a submission with nothing staged.
    #[error("submission {id} of `{acronym}` has nothing staged to process")]
    NothingStaged { acronym: Acronym, id: SubmissionId },
}
