//! Registry domain primitives and persistence contracts.
//!
//! The module defines the validated value objects and aggregates an ontology
//! registry stores, together with the repository trait the fixture machinery
//! provisions through. Persistence mechanics stay behind the trait; the
//! bundled [`InMemoryRegistry`] serves tests and callers running without a
//! triplestore.

pub mod entities;
pub mod memory;
pub mod repositories;
pub mod value_objects;

pub use entities::{
    Contact, Ontology, OntologyFormat, RegistryError, Submission, SubmissionState,
    SubmissionStatus, User,
};
pub use memory::InMemoryRegistry;
pub use repositories::{OntologySummary, RegistryRepository, RepositoryHandle};
pub use value_objects::{Acronym, AcronymError, SubmissionId, SubmissionIdError};
