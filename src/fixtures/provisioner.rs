use std::sync::Arc;

use chrono::Utc;
use rand::Rng;
use tracing::{debug, info};

use super::reuse::{ReuseGuard, ReuseKey};
use super::sequence::SequenceAllocator;
use super::staging::FileStagingPipeline;
use super::status::StatusRegistry;
use super::FixtureError;
use crate::config::FixtureSettings;
use crate::registry::entities::{
    Contact, Ontology, OntologyFormat, RegistryError, Submission, User,
};
use crate::registry::repositories::{RegistryRepository, RepositoryHandle};
use crate::registry::value_objects::Acronym;

/// Caller-owned prototypes of the shared fixture records.
///
/// The user, format and contact are shared by every ontology provisioned in
/// one session. Ownership sits with the calling test session; `create` and
/// `delete` only ever touch the records named by the handles they are given.
#[derive(Clone, Debug)]
pub struct FixtureHandles {
    /// Administering owner of every provisioned ontology.
    pub user: User,
    /// Format attached to every provisioned submission.
    pub format: OntologyFormat,
    /// Contact attached to every provisioned submission.
    pub contact: Contact,
}

impl FixtureHandles {
    /// Bundles the supplied shared fixture prototypes.
    #[must_use]
    pub fn new(user: User, format: OntologyFormat, contact: Contact) -> Self {
        Self {
            user,
            format,
            contact,
        }
    }

    /// The conventional handles used across the registry test suites.
    pub fn test_defaults() -> Result<Self, RegistryError> {
        Ok(Self::new(
            User::new("tim", "tim@example.org")?,
            OntologyFormat::new("OWL")?,
            Contact::new("Sheila", "sheila@example.org")?,
        ))
    }
}

/// Options controlling one provisioning pass.
#[derive(Clone, Debug)]
pub struct CreateOptions {
    /// Number of ontologies to create.
    pub ontology_count: usize,
    /// Target submission count per ontology. Acts as the upper bound when the
    /// count is randomized.
    pub submission_count: u32,
    /// Draw each ontology's submission count from `1..=submission_count`.
    pub random_submission_count: bool,
    /// Stage and parse submission files instead of creating summary-only
    /// submissions.
    pub process_submissions: bool,
    /// Key unlocking fixture reuse, when the caller is eligible.
    pub reuse_key: Option<ReuseKey>,
}

impl CreateOptions {
    /// Sets the number of ontologies to create.
    #[must_use]
    pub fn with_ontology_count(mut self, count: usize) -> Self {
        self.ontology_count = count;
        self
    }

    /// Sets the target submission count per ontology.
    #[must_use]
    pub fn with_submission_count(mut self, count: u32) -> Self {
        self.submission_count = count;
        self
    }

    /// Enables or disables the randomized submission count draw.
    #[must_use]
    pub fn with_random_submission_count(mut self, random: bool) -> Self {
        self.random_submission_count = random;
        self
    }

    /// Enables or disables file staging and parsing.
    #[must_use]
    pub fn with_processing(mut self, process: bool) -> Self {
        self.process_submissions = process;
        self
    }

    /// Supplies the reuse key for this call.
    #[must_use]
    pub fn with_reuse_key(mut self, key: ReuseKey) -> Self {
        self.reuse_key = Some(key);
        self
    }
}

impl Default for CreateOptions {
    fn default() -> Self {
        Self {
            ontology_count: 5,
            submission_count: 5,
            random_submission_count: true,
            process_submissions: false,
            reuse_key: None,
        }
    }
}

/// Result of a provisioning pass.
#[derive(Clone, Debug)]
pub struct CreateOutcome {
    /// Number of ontologies now present under the naming convention.
    pub count: usize,
    /// Acronyms of those ontologies, in creation order.
    pub acronyms: Vec<Acronym>,
    /// The fully loaded ontology aggregates.
    pub ontologies: Vec<Ontology>,
}

/// Orchestrates creation and deletion of fixture ontologies and submissions.
///
/// Provisioning is sequential and single-caller: identifier allocation and
/// ontology creation happen in caller-driven order within one `create` call.
/// A failure partway leaves a partial fixture set; the next call heals it
/// through the idempotent delete that precedes every rebuild.
pub struct FixtureProvisioner {
    repository: Arc<RepositoryHandle>,
    settings: FixtureSettings,
    statuses: StatusRegistry,
    reuse: ReuseGuard,
    staging: Option<FileStagingPipeline>,
}

impl FixtureProvisioner {
    /// Creates a provisioner without a staging pipeline.
    ///
    /// Such a provisioner creates summary-only submissions; requesting
    /// processing is a configuration error.
    #[must_use]
    pub fn new(repository: Arc<RepositoryHandle>, settings: FixtureSettings) -> Self {
        Self::build(repository, settings, None)
    }

    /// Creates a provisioner able to stage and parse submission files.
    #[must_use]
    pub fn with_staging(
        repository: Arc<RepositoryHandle>,
        settings: FixtureSettings,
        staging: FileStagingPipeline,
    ) -> Self {
        Self::build(repository, settings, Some(staging))
    }

    fn build(
        repository: Arc<RepositoryHandle>,
        settings: FixtureSettings,
        staging: Option<FileStagingPipeline>,
    ) -> Self {
        let statuses = StatusRegistry::new(Arc::clone(&repository));
        let reuse = ReuseGuard::new(
            Arc::clone(&repository),
            settings.naming.clone(),
            settings.reuse.clone(),
        );
        Self {
            repository,
            settings,
            statuses,
            reuse,
            staging,
        }
    }

    /// Provisions the requested set of ontologies and submissions.
    ///
    /// When the caller's reuse key unlocks a complete canonical fixture the
    /// existing set is returned untouched. Otherwise prior fixtures matching
    /// the naming convention are deleted and the full set is rebuilt.
    pub async fn create(
        &self,
        options: CreateOptions,
        handles: &FixtureHandles,
    ) -> Result<CreateOutcome, FixtureError> {
        if let Some(key) = &options.reuse_key {
            if self.reuse.can_reuse(key).await? {
                info!(key = %key, "reusing existing fixture set");
                return self.existing_outcome().await;
            }
        }

        if options.submission_count == 0 {
            return Err(FixtureError::Config(
                "submission_count must be at least 1".to_string(),
            ));
        }
        let staging = if options.process_submissions {
            Some(self.staging.as_ref().ok_or_else(|| {
                FixtureError::Config(
                    "processing requested without a staging pipeline".to_string(),
                )
            })?)
        } else {
            None
        };

        self.statuses.init().await?;
        self.delete(handles).await?;
        self.ensure_shared_fixtures(handles).await?;

        let mut acronyms = Vec::with_capacity(options.ontology_count);
        for index in 0..options.ontology_count {
            let acronym = self.settings.naming.acronym_for(index)?;
            let ontology = Ontology::new(
                acronym.clone(),
                format!("Test Ontology #{index}"),
                handles.user.username(),
            );
            self.repository.insert_ontology(ontology.clone()).await?;

            let submission_total = if options.random_submission_count {
                rand::rng().random_range(1..=options.submission_count)
            } else {
                options.submission_count
            };
            debug!(acronym = %acronym, submissions = submission_total, "provisioning ontology");

            let mut tracker = ontology;
            for _ in 0..submission_total {
                let id = SequenceAllocator::next(&tracker);
                let mut submission = Submission::new(
                    id,
                    handles.format.name(),
                    handles.contact.clone(),
                    Utc::now(),
                );
                submission.mark_uploaded()?;
                if let Some(staging) = staging {
                    let staged = staging.stage(&acronym, id).await?;
                    submission.set_staged_file(staged);
                }
                self.repository
                    .attach_submission(&acronym, submission.clone())
                    .await?;
                tracker.add_submission(submission)?;
            }
            acronyms.push(acronym);
        }

        if staging.is_some() {
            self.process_provisioned(&acronyms).await?;
        }

        let mut ontologies = Vec::with_capacity(acronyms.len());
        for acronym in &acronyms {
            ontologies.push(self.load_ontology(acronym).await?);
        }
        info!(count = acronyms.len(), "fixture provisioning complete");
        Ok(CreateOutcome {
            count: acronyms.len(),
            acronyms,
            ontologies,
        })
    }

    /// Deletes every fixture ontology matching the naming convention, then
    /// the handles' shared user and format records when present.
    ///
    /// Calling this on an empty store is a no-op.
    pub async fn delete(&self, handles: &FixtureHandles) -> Result<(), FixtureError> {
        let summaries = self.repository.list_ontologies().await?;
        let mut removed = 0usize;
        for summary in summaries {
            if !self.settings.naming.matches(&summary.acronym) {
                continue;
            }
            if self.repository.get_ontology(&summary.acronym).await?.is_some() {
                self.repository.delete_ontology(&summary.acronym).await?;
                removed += 1;
            }
        }
        if self
            .repository
            .get_user(handles.user.username())
            .await?
            .is_some()
        {
            self.repository.delete_user(handles.user.username()).await?;
        }
        if self
            .repository
            .get_format(handles.format.name())
            .await?
            .is_some()
        {
            self.repository.delete_format(handles.format.name()).await?;
        }
        if removed > 0 {
            debug!(removed, "deleted fixture ontologies");
        }
        Ok(())
    }

    async fn ensure_shared_fixtures(
        &self,
        handles: &FixtureHandles,
    ) -> Result<(), FixtureError> {
        if self
            .repository
            .get_user(handles.user.username())
            .await?
            .is_none()
        {
            self.repository.put_user(handles.user.clone()).await?;
        }
        if self
            .repository
            .get_format(handles.format.name())
            .await?
            .is_none()
        {
            self.repository.put_format(handles.format.clone()).await?;
        }
        let (name, email) = handles.contact.natural_key();
        if self.repository.find_contact(name, email).await?.is_none() {
            self.repository.put_contact(handles.contact.clone()).await?;
        }
        Ok(())
    }

    /// Parses every staged submission except the first version of each
    /// ontology, against freshly loaded aggregates.
    async fn process_provisioned(&self, acronyms: &[Acronym]) -> Result<(), FixtureError> {
        let Some(staging) = &self.staging else {
            return Err(FixtureError::Config(
                "processing requested without a staging pipeline".to_string(),
            ));
        };
        for acronym in acronyms {
            let ontology = self.load_ontology(acronym).await?;
            for submission in ontology.submissions().values() {
                if submission.id().is_first() || submission.summary_only() {
                    continue;
                }
                let mut updated = submission.clone();
                staging.process(acronym, &mut updated).await?;
                self.repository.update_submission(acronym, updated).await?;
            }
        }
        Ok(())
    }

    /// Returns the fixture set already present under the naming convention.
    async fn existing_outcome(&self) -> Result<CreateOutcome, FixtureError> {
        let summaries = self.repository.list_ontologies().await?;
        let mut acronyms = Vec::new();
        let mut ontologies = Vec::new();
        for summary in summaries {
            if !self.settings.naming.matches(&summary.acronym) {
                continue;
            }
            let Some(ontology) = self.repository.get_ontology(&summary.acronym).await? else {
                continue;
            };
            acronyms.push(summary.acronym);
            ontologies.push(ontology);
        }
        Ok(CreateOutcome {
            count: acronyms.len(),
            acronyms,
            ontologies,
        })
    }

    async fn load_ontology(&self, acronym: &Acronym) -> Result<Ontology, FixtureError> {
        self.repository
            .get_ontology(acronym)
            .await?
            .ok_or_else(|| {
                FixtureError::Registry(RegistryError::MissingOntology {
                    acronym: acronym.clone(),
                })
            })
    }
}
