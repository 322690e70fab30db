use std::collections::BTreeMap;
use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;

use super::entities::{
    Contact, Ontology, OntologyFormat, RegistryError, Submission, SubmissionState,
    SubmissionStatus, User,
};
use super::repositories::{OntologySummary, RegistryRepository};
use super::value_objects::Acronym;

#[derive(Default)]
struct State {
    ontologies: BTreeMap<Acronym, Ontology>,
    statuses: BTreeMap<String, SubmissionStatus>,
    users: BTreeMap<String, User>,
    formats: BTreeMap<String, OntologyFormat>,
    contacts: BTreeMap<(String, String), Contact>,
}

impl State {
    fn require_status(&self, state: SubmissionState) -> Result<(), RegistryError> {
        if !self.statuses.contains_key(state.code()) {
            return Err(RegistryError::UnknownStatus {
                code: state.code().to_string(),
            });
        }
        Ok(())
    }
}

/// Registry repository backed by process memory.
///
/// Useful for tests and for callers running without a triplestore. All access
/// is serialized behind a single mutex.
#[derive(Default)]
pub struct InMemoryRegistry {
    state: Mutex<State>,
}

impl InMemoryRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn guard(&self) -> MutexGuard<'_, State> {
        self.state.lock().expect("in-memory registry poisoned")
    }
}

#[async_trait]
impl RegistryRepository for InMemoryRegistry {
    type Error = RegistryError;

    async fn insert_ontology(&self, ontology: Ontology) -> Result<(), Self::Error> {
        ontology.validate()?;
        let mut guard = self.guard();
        let acronym = ontology.acronym().clone();
        if guard.ontologies.contains_key(&acronym) {
            return Err(RegistryError::DuplicateOntology { acronym });
        }
        for submission in ontology.submissions().values() {
            submission.validate()?;
            guard.require_status(submission.state())?;
        }
        guard.ontologies.insert(acronym, ontology);
        Ok(())
    }

    async fn update_ontology(&self, ontology: Ontology) -> Result<(), Self::Error> {
        ontology.validate()?;
        let mut guard = self.guard();
        let acronym = ontology.acronym().clone();
        if !guard.ontologies.contains_key(&acronym) {
            return Err(RegistryError::MissingOntology { acronym });
        }
        guard.ontologies.insert(acronym, ontology);
        Ok(())
    }

    async fn get_ontology(&self, acronym: &Acronym) -> Result<Option<Ontology>, Self::Error> {
        let guard = self.guard();
        Ok(guard.ontologies.get(acronym).cloned())
    }

    async fn delete_ontology(&self, acronym: &Acronym) -> Result<(), Self::Error> {
        let mut guard = self.guard();
        guard
            .ontologies
            .remove(acronym)
            .map(|_| ())
            .ok_or_else(|| RegistryError::MissingOntology {
                acronym: acronym.clone(),
            })
    }

    async fn list_ontologies(&self) -> Result<Vec<OntologySummary>, Self::Error> {
        let guard = self.guard();
        Ok(guard.ontologies.values().map(OntologySummary::from).collect())
    }

    async fn attach_submission(
        &self,
        acronym: &Acronym,
        submission: Submission,
    ) -> Result<(), Self::Error> {
        let mut guard = self.guard();
        guard.require_status(submission.state())?;
        let Some(existing) = guard.ontologies.get_mut(acronym) else {
            return Err(RegistryError::MissingOntology {
                acronym: acronym.clone(),
            });
        };
        existing.add_submission(submission)
    }

    async fn update_submission(
        &self,
        acronym: &Acronym,
        submission: Submission,
    ) -> Result<(), Self::Error> {
        let mut guard = self.guard();
        guard.require_status(submission.state())?;
        let Some(existing) = guard.ontologies.get_mut(acronym) else {
            return Err(RegistryError::MissingOntology {
                acronym: acronym.clone(),
            });
        };
        existing.replace_submission(submission)
    }

    async fn ensure_status(&self, state: SubmissionState) -> Result<(), Self::Error> {
        let mut guard = self.guard();
        guard
            .statuses
            .entry(state.code().to_string())
            .or_insert_with(|| SubmissionStatus::new(state));
        Ok(())
    }

    async fn find_status(&self, code: &str) -> Result<Option<SubmissionStatus>, Self::Error> {
        let guard = self.guard();
        Ok(guard.statuses.get(code).cloned())
    }

    async fn statuses(&self) -> Result<Vec<SubmissionStatus>, Self::Error> {
        let guard = self.guard();
        Ok(guard.statuses.values().cloned().collect())
    }

    async fn get_user(&self, username: &str) -> Result<Option<User>, Self::Error> {
        let guard = self.guard();
        Ok(guard.users.get(username).cloned())
    }

    async fn put_user(&self, user: User) -> Result<(), Self::Error> {
        let mut guard = self.guard();
        guard.users.insert(user.username().to_string(), user);
        Ok(())
    }

    async fn delete_user(&self, username: &str) -> Result<(), Self::Error> {
        let mut guard = self.guard();
        guard
            .users
            .remove(username)
            .map(|_| ())
            .ok_or_else(|| RegistryError::MissingUser {
                username: username.to_string(),
            })
    }

    async fn get_format(&self, name: &str) -> Result<Option<OntologyFormat>, Self::Error> {
        let guard = self.guard();
        Ok(guard.formats.get(name).cloned())
    }

    async fn put_format(&self, format: OntologyFormat) -> Result<(), Self::Error> {
        let mut guard = self.guard();
        guard.formats.insert(format.name().to_string(), format);
        Ok(())
    }

    async fn delete_format(&self, name: &str) -> Result<(), Self::Error> {
        let mut guard = self.guard();
        guard
            .formats
            .remove(name)
            .map(|_| ())
            .ok_or_else(|| RegistryError::MissingFormat {
                name: name.to_string(),
            })
    }

    async fn find_contact(
        &self,
        name: &str,
        email: &str,
    ) -> Result<Option<Contact>, Self::Error> {
        let guard = self.guard();
        Ok(guard
            .contacts
            .get(&(name.to_string(), email.to_string()))
            .cloned())
    }

    async fn put_contact(&self, contact: Contact) -> Result<(), Self::Error> {
        let mut guard = self.guard();
        let key = (contact.name().to_string(), contact.email().to_string());
        guard.contacts.insert(key, contact);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;

    use super::InMemoryRegistry;
    use crate::registry::entities::{
        Contact, Ontology, RegistryError, Submission, SubmissionState, User,
    };
    use crate::registry::repositories::RegistryRepository;
    use crate::registry::value_objects::{Acronym, SubmissionId};

    fn acronym(text: &str) -> Acronym {
        Acronym::new(text).expect("valid acronym")
    }

    fn submission(id: u32) -> Submission {
        let contact = Contact::new("Sheila", "sheila@example.org").expect("valid contact");
        Submission::new(
            SubmissionId::new(id).expect("valid identifier"),
            "OWL",
            contact,
            Utc::now(),
        )
    }

    async fn registry_with_statuses() -> InMemoryRegistry {
        let registry = InMemoryRegistry::new();
        for state in SubmissionState::all() {
            registry.ensure_status(state).await.expect("status");
        }
        registry
    }

    #[tokio::test]
    async fn ontology_crud_roundtrip() {
        let registry = registry_with_statuses().await;
        let ontology = Ontology::new(acronym("TST-ONT-0"), "Test Ontology", "tim");
        registry.insert_ontology(ontology.clone()).await.expect("insert");

        let err = registry
            .insert_ontology(ontology.clone())
            .await
            .expect_err("duplicate acronym");
        assert!(matches!(err, RegistryError::DuplicateOntology { .. }));

        registry
            .attach_submission(ontology.acronym(), submission(1))
            .await
            .expect("attach");

        let fetched = registry
            .get_ontology(ontology.acronym())
            .await
            .expect("get")
            .expect("ontology exists");
        assert_eq!(fetched.submissions().len(), 1);

        let summaries = registry.list_ontologies().await.expect("list");
        assert_eq!(summaries.len(), 1);
        assert_eq!(summaries[0].submission_count, 1);

        registry
            .delete_ontology(ontology.acronym())
            .await
            .expect("delete");
        assert!(registry
            .get_ontology(ontology.acronym())
            .await
            .expect("get")
            .is_none());
    }

    #[tokio::test]
    async fn submissions_require_registered_statuses() {
        let registry = InMemoryRegistry::new();
        let ontology = Ontology::new(acronym("TST-ONT-0"), "Test Ontology", "tim");
        registry.insert_ontology(ontology.clone()).await.expect("insert");

        let err = registry
            .attach_submission(ontology.acronym(), submission(1))
            .await
            .expect_err("status table empty");
        assert!(matches!(err, RegistryError::UnknownStatus { .. }));
    }

    #[tokio::test]
    async fn status_initialization_is_idempotent() {
        let registry = InMemoryRegistry::new();
        for _ in 0..2 {
            for state in SubmissionState::all() {
                registry.ensure_status(state).await.expect("status");
            }
        }
        let statuses = registry.statuses().await.expect("statuses");
        assert_eq!(statuses.len(), SubmissionState::all().len());
    }

    #[tokio::test]
    async fn shared_fixture_records_roundtrip() {
        let registry = InMemoryRegistry::new();
        let user = User::new("tim", "tim@example.org").expect("valid user");
        registry.put_user(user.clone()).await.expect("put user");
        assert_eq!(
            registry.get_user("tim").await.expect("get user"),
            Some(user)
        );
        registry.delete_user("tim").await.expect("delete user");
        let err = registry.delete_user("tim").await.expect_err("already gone");
        assert!(matches!(err, RegistryError::MissingUser { .. }));

        let contact = Contact::new("Sheila", "sheila@example.org").expect("valid contact");
        registry.put_contact(contact.clone()).await.expect("put contact");
        let found = registry
            .find_contact("Sheila", "sheila@example.org")
            .await
            .expect("find contact");
        assert_eq!(found, Some(contact));
    }
}
