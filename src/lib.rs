//! Deterministic fixture lifecycle management for ontology registries.
//!
//! The crate provisions a versioned set of ontology and submission fixtures
//! in backing storage, reuses prior provisioning when the caller is eligible,
//! drives an optional file staging and parsing pipeline per submission, and
//! tears everything down with a cascading, idempotent delete.
//!
//! ```no_run
//! use std::sync::Arc;
//!
//! use ontology_fixtures::config::FixtureSettings;
//! use ontology_fixtures::fixtures::{CreateOptions, FixtureHandles, FixtureProvisioner};
//! use ontology_fixtures::registry::InMemoryRegistry;
//!
//! # async fn demo() -> Result<(), Box<dyn std::error::Error>> {
//! let provisioner =
//!     FixtureProvisioner::new(Arc::new(InMemoryRegistry::new()), FixtureSettings::default());
//! let handles = FixtureHandles::test_defaults()?;
//! let options = CreateOptions::default()
//!     .with_ontology_count(3)
//!     .with_random_submission_count(false);
//! let outcome = provisioner.create(options, &handles).await?;
//! assert_eq!(outcome.count, 3);
//! provisioner.delete(&handles).await?;
//! # Ok(())
//! # }
//! ```

pub mod agents;
pub mod config;
pub mod fixtures;
pub mod registry;

pub use config::FixtureSettings;
pub use fixtures::{
    CreateOptions, CreateOutcome, FileStagingPipeline, FixtureError, FixtureHandles,
    FixtureProvisioner, ReuseGuard, ReuseKey, SequenceAllocator, StatusRegistry,
};
pub use registry::{
    Acronym, InMemoryRegistry, Ontology, RegistryError, RegistryRepository, Submission,
    SubmissionId, SubmissionState,
};
