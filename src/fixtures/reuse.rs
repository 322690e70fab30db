use std::fmt::{self, Display, Formatter};
use std::sync::Arc;

use tracing::debug;

use super::FixtureError;
use crate::config::{NamingSettings, ReuseSettings};
use crate::registry::repositories::{RegistryRepository, RepositoryHandle};

/// Caller-supplied token unlocking fixture reuse.
///
/// Reuse eligibility is decided by comparing this key against configuration,
/// never by inspecting who the caller is.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct ReuseKey(String);

impl ReuseKey {
    /// Wraps the supplied token.
    #[must_use]
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    /// Returns the underlying token.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for ReuseKey {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Decides whether existing provisioned fixtures can be reused.
///
/// The check is a pure read: it never mutates state, and any missing fact is
/// answered with "cannot reuse" rather than an error.
#[derive(Clone)]
pub struct ReuseGuard {
    repository: Arc<RepositoryHandle>,
    naming: NamingSettings,
    settings: ReuseSettings,
}

impl ReuseGuard {
    /// Creates a reuse guard over the supplied repository and settings.
    #[must_use]
    pub fn new(
        repository: Arc<RepositoryHandle>,
        naming: NamingSettings,
        settings: ReuseSettings,
    ) -> Self {
        Self {
            repository,
            naming,
            settings,
        }
    }

    /// Returns true when the caller's key unlocks reuse and the canonical
    /// fixture ontology is complete enough to stand in for a rebuild.
    ///
    /// Complete enough means: the canonical ontology exists, holds exactly
    /// the expected number of submissions, and at least one submission has
    /// been parsed.
    pub async fn can_reuse(&self, key: &ReuseKey) -> Result<bool, FixtureError> {
        let Some(expected_key) = self.settings.key.as_deref() else {
            return Ok(false);
        };
        if key.as_str() != expected_key {
            debug!(key = %key, "reuse key does not match configuration");
            return Ok(false);
        }

        let Ok(canonical) = self.naming.acronym_for(self.settings.canonical_index) else {
            return Ok(false);
        };
        let Some(ontology) = self.repository.get_ontology(&canonical).await? else {
            debug!(acronym = %canonical, "canonical fixture absent, rebuilding");
            return Ok(false);
        };
        if ontology.submissions().len() != self.settings.expected_submissions {
            debug!(
                acronym = %canonical,
                found = ontology.submissions().len(),
                expected = self.settings.expected_submissions,
                "canonical fixture has the wrong submission count, rebuilding"
            );
            return Ok(false);
        }
        if !ontology.has_parsed_submission() {
            debug!(acronym = %canonical, "canonical fixture has no parsed submission, rebuilding");
            return Ok(false);
        }
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use chrono::Utc;

    use super::{ReuseGuard, ReuseKey};
    use crate::config::{NamingSettings, ReuseSettings};
    use crate::registry::entities::{Contact, Ontology, Submission, SubmissionState};
    use crate::registry::memory::InMemoryRegistry;
    use crate::registry::repositories::{RegistryRepository, RepositoryHandle};
    use crate::registry::value_objects::SubmissionId;

    fn reuse_settings() -> ReuseSettings {
        ReuseSettings {
            key: Some("parsed-corpus".to_string()),
            canonical_index: 0,
            expected_submissions: 3,
        }
    }

    async fn seeded_registry(submissions: u32, parse_last: bool) -> Arc<RepositoryHandle> {
        let registry = InMemoryRegistry::new();
        for state in SubmissionState::all() {
            registry.ensure_status(state).await.expect("status");
        }
        let naming = NamingSettings::default();
        let acronym = naming.acronym_for(0).expect("acronym");
        let mut ontology = Ontology::new(acronym, "Canonical", "tim");
        let contact = Contact::new("Sheila", "sheila@example.org").expect("contact");
        for index in 1..=submissions {
            let id = SubmissionId::new(index).expect("identifier");
            let mut submission = Submission::new(id, "OWL", contact.clone(), Utc::now());
            submission.mark_uploaded().expect("upload");
            if parse_last && index == submissions {
                submission.set_staged_file("/tmp/canonical.owl");
                submission.mark_parsed().expect("parse");
            }
            ontology.add_submission(submission).expect("append");
        }
        registry.insert_ontology(ontology).await.expect("insert");
        Arc::new(registry)
    }

    fn guard(repository: Arc<RepositoryHandle>) -> ReuseGuard {
        ReuseGuard::new(repository, NamingSettings::default(), reuse_settings())
    }

    #[tokio::test]
    async fn reuse_holds_for_a_complete_canonical_fixture() {
        let guard = guard(seeded_registry(3, true).await);
        let eligible = guard
            .can_reuse(&ReuseKey::new("parsed-corpus"))
            .await
            .expect("check");
        assert!(eligible);
    }

    #[tokio::test]
    async fn mismatched_keys_force_a_rebuild() {
        let guard = guard(seeded_registry(3, true).await);
        let eligible = guard
            .can_reuse(&ReuseKey::new("someone-else"))
            .await
            .expect("check");
        assert!(!eligible);
    }

    #[tokio::test]
    async fn an_empty_store_cannot_be_reused() {
        let guard = guard(Arc::new(InMemoryRegistry::new()));
        let eligible = guard
            .can_reuse(&ReuseKey::new("parsed-corpus"))
            .await
            .expect("check");
        assert!(!eligible);
    }

    #[tokio::test]
    async fn the_wrong_submission_count_forces_a_rebuild() {
        let guard = guard(seeded_registry(2, true).await);
        let eligible = guard
            .can_reuse(&ReuseKey::new("parsed-corpus"))
            .await
            .expect("check");
        assert!(!eligible);
    }

    #[tokio::test]
    async fn an_unparsed_canonical_fixture_forces_a_rebuild() {
        let guard = guard(seeded_registry(3, false).await);
        let eligible = guard
            .can_reuse(&ReuseKey::new("parsed-corpus"))
            .await
            .expect("check");
        assert!(!eligible);
    }

    #[tokio::test]
    async fn reuse_disabled_by_configuration() {
        let repository = seeded_registry(3, true).await;
        let guard = ReuseGuard::new(
            repository,
            NamingSettings::default(),
            ReuseSettings::default(),
        );
        let eligible = guard
            .can_reuse(&ReuseKey::new("parsed-corpus"))
            .await
            .expect("check");
        assert!(!eligible);
    }
}
