use std::sync::Arc;

use tracing::debug;

use super::FixtureError;
use crate::registry::entities::{Submission, SubmissionState, SubmissionStatus};
use crate::registry::repositories::{RegistryRepository, RepositoryHandle};

/// Maintains the vocabulary of submission status codes in backing storage.
#[derive(Clone)]
pub struct StatusRegistry {
    repository: Arc<RepositoryHandle>,
}

impl StatusRegistry {
    /// Creates a status registry over the supplied repository.
    #[must_use]
    pub fn new(repository: Arc<RepositoryHandle>) -> Self {
        Self { repository }
    }

    /// Ensures every known status code exists in backing storage.
    ///
    /// Safe to call repeatedly; re-invocation neither duplicates codes nor
    /// fails.
    pub async fn init(&self) -> Result<(), FixtureError> {
        for state in SubmissionState::all() {
            self.repository.ensure_status(state).await?;
        }
        debug!("submission status vocabulary initialized");
        Ok(())
    }

    /// Retrieves a status record by vocabulary code.
    pub async fn find(&self, code: &str) -> Result<Option<SubmissionStatus>, FixtureError> {
        Ok(self.repository.find_status(code).await?)
    }

    /// Returns true when the submission has reached the parsed state.
    #[must_use]
    pub fn is_parsed(submission: &Submission) -> bool {
        submission.state() == SubmissionState::Parsed
    }
}
