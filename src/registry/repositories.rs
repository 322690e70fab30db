use async_trait::async_trait;

use super::entities::{
    Contact, Ontology, OntologyFormat, RegistryError, Submission, SubmissionState,
    SubmissionStatus, User,
};
use super::value_objects::Acronym;

/// Summary DTO for listing ontologies without loading the full aggregate.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct OntologySummary {
    /// Acronym of the ontology.
    pub acronym: Acronym,
    /// Display name of the ontology.
    pub name: String,
    /// Number of owned submissions.
    pub submission_count: usize,
}

impl From<&Ontology> for OntologySummary {
    fn from(ontology: &Ontology) -> Self {
        Self {
            acronym: ontology.acronym().clone(),
            name: ontology.name().to_string(),
            submission_count: ontology.submissions().len(),
        }
    }
}

/// Type alias simplifying repository trait object usage.
pub type RepositoryHandle =
    dyn RegistryRepository<Error = RegistryError> + Send + Sync + 'static;

/// Contract describing persistence responsibilities for the registry.
///
/// Implementors are expected to validate aggregates on every save path and to
/// reject submissions whose status code was never registered.
#[async_trait]
pub trait RegistryRepository {
    /// Associated error type allowing infrastructure specific failures.
    type Error;

    /// Persists a brand new ontology, rejecting duplicate acronyms.
    async fn insert_ontology(&self, ontology: Ontology) -> Result<(), Self::Error>;

    /// Replaces a stored ontology aggregate.
    async fn update_ontology(&self, ontology: Ontology) -> Result<(), Self::Error>;

    /// Retrieves a stored ontology with its submissions fully loaded.
    ///
    /// Implementors must return `Ok(None)` when the ontology is missing.
    async fn get_ontology(&self, acronym: &Acronym) -> Result<Option<Ontology>, Self::Error>;

    /// Deletes an ontology and every submission it owns.
    async fn delete_ontology(&self, acronym: &Acronym) -> Result<(), Self::Error>;

    /// Lists all ontologies without loading full aggregates.
    async fn list_ontologies(&self) -> Result<Vec<OntologySummary>, Self::Error>;

    /// Appends a submission to an existing ontology.
    async fn attach_submission(
        &self,
        acronym: &Acronym,
        submission: Submission,
    ) -> Result<(), Self::Error>;

    /// Replaces an existing submission of an ontology.
    async fn update_submission(
        &self,
        acronym: &Acronym,
        submission: Submission,
    ) -> Result<(), Self::Error>;

    /// Ensures a status record exists for the supplied state. Idempotent.
    async fn ensure_status(&self, state: SubmissionState) -> Result<(), Self::Error>;

    /// Retrieves a status record by vocabulary code.
    async fn find_status(&self, code: &str) -> Result<Option<SubmissionStatus>, Self::Error>;

    /// Lists every registered status record.
    async fn statuses(&self) -> Result<Vec<SubmissionStatus>, Self::Error>;

    /// Retrieves a user by username.
    async fn get_user(&self, username: &str) -> Result<Option<User>, Self::Error>;

    /// Inserts or replaces a user record.
    async fn put_user(&self, user: User) -> Result<(), Self::Error>;

    /// Deletes a user record.
    async fn delete_user(&self, username: &str) -> Result<(), Self::Error>;

    /// Retrieves a format by name.
    async fn get_format(&self, name: &str) -> Result<Option<OntologyFormat>, Self::Error>;

    /// Inserts or replaces a format record.
    async fn put_format(&self, format: OntologyFormat) -> Result<(), Self::Error>;

    /// Deletes a format record.
    async fn delete_format(&self, name: &str) -> Result<(), Self::Error>;

    /// Looks up a contact by its (name, email) pair.
    async fn find_contact(
        &self,
        name: &str,
        email: &str,
    ) -> Result<Option<Contact>, Self::Error>;

    /// Inserts or replaces a contact record.
    async fn put_contact(&self, contact: Contact) -> Result<(), Self::Error>;
}
