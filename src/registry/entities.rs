use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use thiserror::Error;

use super::value_objects::{Acronym, SubmissionId};

/// Lifecycle state of a submission.
///
/// Transitions are linear: `Created` to `Uploaded` to `Parsed`. Anything else
/// is rejected as an illegal transition.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum SubmissionState {
    /// The submission exists but nothing has been received for it yet.
    Created,
    /// The submission payload has been received and persisted.
    Uploaded,
    /// The staged file has been parsed successfully.
    Parsed,
}

impl SubmissionState {
    /// Returns every state in transition order.
    #[must_use]
    pub fn all() -> [SubmissionState; 3] {
        [Self::Created, Self::Uploaded, Self::Parsed]
    }

    /// Returns the persisted vocabulary code for the state.
    #[must_use]
    pub fn code(self) -> &'static str {
        match self {
            Self::Created => "CREATED",
            Self::Uploaded => "UPLOADED",
            Self::Parsed => "PARSED",
        }
    }

    /// Resolves a vocabulary code back into a state.
    #[must_use]
    pub fn from_code(code: &str) -> Option<Self> {
        match code {
            "CREATED" => Some(Self::Created),
            "UPLOADED" => Some(Self::Uploaded),
            "PARSED" => Some(Self::Parsed),
            _ => None,
        }
    }

    /// Returns true when moving from `self` to `next` is a legal transition.
    #[must_use]
    pub fn can_transition(self, next: Self) -> bool {
        matches!(
            (self, next),
            (Self::Created, Self::Uploaded) | (Self::Uploaded, Self::Parsed)
        )
    }
}

/// Persisted vocabulary record backing a [`SubmissionState`] code.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SubmissionStatus {
    state: SubmissionState,
}

impl SubmissionStatus {
    /// Creates a status record for the supplied state.
    #[must_use]
    pub fn new(state: SubmissionState) -> Self {
        Self { state }
    }

    /// Returns the state the record represents.
    #[must_use]
    pub fn state(&self) -> SubmissionState {
        self.state
    }

    /// Returns the vocabulary code of the record.
    #[must_use]
    pub fn code(&self) -> &'static str {
        self.state.code()
    }
}

/// Shared fixture identity administering provisioned ontologies.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct User {
    username: String,
    email: String,
}

impl User {
    /// Validates and creates a new [`User`].
    pub fn new(username: impl Into<String>, email: impl Into<String>) -> Result<Self, RegistryError> {
        let username = username.into();
        let email = email.into();
        if username.trim().is_empty() {
            return Err(RegistryError::Validation {
                field: "username",
                message: "must not be empty".to_string(),
            });
        }
        validate_email(&email)?;
        Ok(Self { username, email })
    }

    /// Returns the unique username.
    #[must_use]
    pub fn username(&self) -> &str {
        &self.username
    }

    /// Returns the contact email of the user.
    #[must_use]
    pub fn email(&self) -> &str {
        &self.email
    }
}

/// Shared fixture record naming an ontology serialization format.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct OntologyFormat {
    name: String,
}

impl OntologyFormat {
    /// Validates and creates a new [`OntologyFormat`].
    pub fn new(name: impl Into<String>) -> Result<Self, RegistryError> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(RegistryError::Validation {
                field: "format",
                message: "must not be empty".to_string(),
            });
        }
        Ok(Self { name })
    }

    /// Returns the format name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }
}

/// Contact attached to submissions, identified by its (name, email) pair.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Contact {
    name: String,
    email: String,
}

impl Contact {
    /// Validates and creates a new [`Contact`].
    pub fn new(name: impl Into<String>, email: impl Into<String>) -> Result<Self, RegistryError> {
        let name = name.into();
        let email = email.into();
        if name.trim().is_empty() {
            return Err(RegistryError::Validation {
                field: "contact.name",
                message: "must not be empty".to_string(),
            });
        }
        validate_email(&email)?;
        Ok(Self { name, email })
    }

    /// Returns the contact name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the contact email.
    #[must_use]
    pub fn email(&self) -> &str {
        &self.email
    }

    /// Returns the (name, email) pair the contact is looked up by.
    #[must_use]
    pub fn natural_key(&self) -> (&str, &str) {
        (&self.name, &self.email)
    }
}

/// One versioned upload attempt belonging to an ontology.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Submission {
    id: SubmissionId,
    format: String,
    contact: Contact,
    released_at: DateTime<Utc>,
    state: SubmissionState,
    summary_only: bool,
    staged_file: Option<PathBuf>,
}

impl Submission {
    /// Creates a new submission in the `Created` state.
    ///
    /// Submissions start summary-only with no staged file.
    #[must_use]
    pub fn new(
        id: SubmissionId,
        format: impl Into<String>,
        contact: Contact,
        released_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            format: format.into(),
            contact,
            released_at,
            state: SubmissionState::Created,
            summary_only: true,
            staged_file: None,
        }
    }

    /// Returns the submission identifier.
    #[must_use]
    pub fn id(&self) -> SubmissionId {
        self.id
    }

    /// Returns the format name the submission was uploaded in.
    #[must_use]
    pub fn format(&self) -> &str {
        &self.format
    }

    /// Returns the contact attached to the submission.
    #[must_use]
    pub fn contact(&self) -> &Contact {
        &self.contact
    }

    /// Returns the release timestamp.
    #[must_use]
    pub fn released_at(&self) -> DateTime<Utc> {
        self.released_at
    }

    /// Returns the current lifecycle state.
    #[must_use]
    pub fn state(&self) -> SubmissionState {
        self.state
    }

    /// Returns true when file processing is skipped for this submission.
    #[must_use]
    pub fn summary_only(&self) -> bool {
        self.summary_only
    }

    /// Returns the staged file the submission references, when present.
    #[must_use]
    pub fn staged_file(&self) -> Option<&Path> {
        self.staged_file.as_deref()
    }

    /// Moves the submission to the supplied state, rejecting illegal jumps.
    pub fn transition_to(&mut self, next: SubmissionState) -> Result<(), RegistryError> {
        if !self.state.can_transition(next) {
            return Err(RegistryError::IllegalTransition {
                from: self.state,
                to: next,
            });
        }
        self.state = next;
        Ok(())
    }

    /// Marks the submission as uploaded.
    pub fn mark_uploaded(&mut self) -> Result<(), RegistryError> {
        self.transition_to(SubmissionState::Uploaded)
    }

    /// Marks the submission as parsed.
    pub fn mark_parsed(&mut self) -> Result<(), RegistryError> {
        self.transition_to(SubmissionState::Parsed)
    }

    /// Attaches a staged file and switches the submission out of summary mode.
    pub fn set_staged_file(&mut self, path: impl Into<PathBuf>) {
        self.staged_file = Some(path.into());
        self.summary_only = false;
    }

    /// Checks the submission invariants prior to persistence.
    ///
    /// A submission that is not summary-only must reference a staged file.
    pub fn validate(&self) -> Result<(), RegistryError> {
        if self.format.trim().is_empty() {
            return Err(RegistryError::Validation {
                field: "format",
                message: "must not be empty".to_string(),
            });
        }
        if !self.summary_only && self.staged_file.is_none() {
            return Err(RegistryError::Validation {
                field: "staged_file",
                message: "required when the submission is not summary-only".to_string(),
            });
        }
        Ok(())
    }
}

/// Aggregate root owning an ontology and its ordered submissions.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Ontology {
    acronym: Acronym,
    name: String,
    administered_by: String,
    submissions: BTreeMap<SubmissionId, Submission>,
}

impl Ontology {
    /// Creates a new ontology aggregate with no submissions.
    #[must_use]
    pub fn new(
        acronym: Acronym,
        name: impl Into<String>,
        administered_by: impl Into<String>,
    ) -> Self {
        Self {
            acronym,
            name: name.into(),
            administered_by: administered_by.into(),
            submissions: BTreeMap::new(),
        }
    }

    /// Returns the unique acronym of the ontology.
    #[must_use]
    pub fn acronym(&self) -> &Acronym {
        &self.acronym
    }

    /// Returns the display name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the username of the administering user.
    #[must_use]
    pub fn administered_by(&self) -> &str {
        &self.administered_by
    }

    /// Returns the owned submissions ordered by identifier.
    #[must_use]
    pub fn submissions(&self) -> &BTreeMap<SubmissionId, Submission> {
        &self.submissions
    }

    /// Retrieves a submission by identifier.
    #[must_use]
    pub fn submission(&self, id: SubmissionId) -> Option<&Submission> {
        self.submissions.get(&id)
    }

    /// Returns the submission with the highest identifier, when any exists.
    #[must_use]
    pub fn latest_submission(&self) -> Option<&Submission> {
        self.submissions.values().next_back()
    }

    /// Returns true when any owned submission has been parsed.
    #[must_use]
    pub fn has_parsed_submission(&self) -> bool {
        self.submissions
            .values()
            .any(|submission| submission.state() == SubmissionState::Parsed)
    }

    /// Appends a submission, enforcing identifier uniqueness and validity.
    pub fn add_submission(&mut self, submission: Submission) -> Result<(), RegistryError> {
        submission.validate()?;
        let id = submission.id();
        if self.submissions.contains_key(&id) {
            return Err(RegistryError::DuplicateSubmission {
                acronym: self.acronym.clone(),
                id,
            });
        }
        self.submissions.insert(id, submission);
        Ok(())
    }

    /// Replaces an existing submission with an updated value.
    pub fn replace_submission(&mut self, submission: Submission) -> Result<(), RegistryError> {
        submission.validate()?;
        let id = submission.id();
        if !self.submissions.contains_key(&id) {
            return Err(RegistryError::MissingSubmission {
                acronym: self.acronym.clone(),
                id,
            });
        }
        self.submissions.insert(id, submission);
        Ok(())
    }

    /// Checks the aggregate invariants prior to persistence.
    pub fn validate(&self) -> Result<(), RegistryError> {
        if self.name.trim().is_empty() {
            return Err(RegistryError::Validation {
                field: "name",
                message: "must not be empty".to_string(),
            });
        }
        if self.administered_by.trim().is_empty() {
            return Err(RegistryError::Validation {
                field: "administered_by",
                message: "must not be empty".to_string(),
            });
        }
        Ok(())
    }
}

fn validate_email(email: &str) -> Result<(), RegistryError> {
    let well_formed = email
        .split_once('@')
        .is_some_and(|(local, domain)| !local.is_empty() && domain.contains('.'));
    if !well_formed {
        return Err(RegistryError::Validation {
            field: "email",
            message: format!("`{email}` is not a valid address"),
        });
    }
    Ok(())
}

/// Errors raised when manipulating registry entities.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum RegistryError {
    /// Attempted to insert an ontology whose acronym is already taken.
    #[error("ontology `{acronym}` already exists")]
    DuplicateOntology { acronym: Acronym },
    /// Referenced ontology was not found.
    #[error("ontology `{acronym}` missing")]
    MissingOntology { acronym: Acronym },
    /// Attempted to append a submission with an existing identifier.
    #[error("submission {id} already exists in ontology `{acronym}`")]
    DuplicateSubmission { acronym: Acronym, id: SubmissionId },
    /// Referenced submission was not found in the ontology.
    #[error("submission {id} missing in ontology `{acronym}`")]
    MissingSubmission { acronym: Acronym, id: SubmissionId },
    /// A submission referenced a status code that was never registered.
    #[error("status `{code}` is not registered")]
    UnknownStatus { code: String },
    /// Referenced user was not found.
    #[error("user `{username}` missing")]
    MissingUser { username: String },
    /// Referenced format was not found.
    #[error("format `{name}` missing")]
    MissingFormat { name: String },
    /// A state transition outside the legal lifecycle was requested.
    #[error("illegal state transition from `{}` to `{}`", .from.code(), .to.code())]
    IllegalTransition {
        from: SubmissionState,
        to: SubmissionState,
    },
    /// A field-level validation failure on a persisted entity.
    #[error("validation failed for `{field}`: {message}")]
    Validation { field: &'static str, message: String },
}

#[cfg(test)]
mod tests {
    use chrono::Utc;

    use super::{
        Contact, Ontology, RegistryError, Submission, SubmissionState, SubmissionStatus, User,
    };
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

    #[test]
    fn state_codes_round_trip() {
        for state in SubmissionState::all() {
            assert_eq!(SubmissionState::from_code(state.code()), Some(state));
        }
        assert_eq!(SubmissionState::from_code("ARCHIVED"), None);
        assert_eq!(SubmissionStatus::new(SubmissionState::Parsed).code(), "PARSED");
    }

    #[test]
    fn transitions_follow_the_lifecycle() {
        let mut submission = submission(1);
        assert_eq!(submission.state(), SubmissionState::Created);
        submission.mark_uploaded().expect("upload");
        submission.mark_parsed().expect("parse");
        assert_eq!(submission.state(), SubmissionState::Parsed);
    }

    #[test]
    fn illegal_transitions_are_rejected() {
        let mut submission = submission(1);
        let err = submission.mark_parsed().expect_err("created cannot parse");
        assert!(matches!(err, RegistryError::IllegalTransition { .. }));

        submission.mark_uploaded().expect("upload");
        submission.mark_parsed().expect("parse");
        let err = submission
            .transition_to(SubmissionState::Uploaded)
            .expect_err("parsed is terminal");
        assert!(matches!(err, RegistryError::IllegalTransition { .. }));
    }

    #[test]
    fn staged_file_clears_summary_mode() {
        let mut submission = submission(1);
        assert!(submission.summary_only());
        submission.set_staged_file("/tmp/staged.owl");
        assert!(!submission.summary_only());
        assert!(submission.staged_file().is_some());
        submission.validate().expect("staged submission is valid");
    }

    #[test]
    fn ontologies_reject_duplicate_submission_ids() {
        let mut ontology = Ontology::new(acronym("TST-ONT-0"), "Test Ontology", "tim");
        ontology.add_submission(submission(1)).expect("first");
        let err = ontology
            .add_submission(submission(1))
            .expect_err("duplicate identifier");
        assert!(matches!(err, RegistryError::DuplicateSubmission { .. }));
        assert_eq!(ontology.submissions().len(), 1);
    }

    #[test]
    fn latest_submission_tracks_the_highest_identifier() {
        let mut ontology = Ontology::new(acronym("TST-ONT-0"), "Test Ontology", "tim");
        ontology.add_submission(submission(1)).expect("first");
        ontology.add_submission(submission(2)).expect("second");
        let latest = ontology.latest_submission().expect("submissions present");
        assert_eq!(latest.id().value(), 2);
    }

    #[test]
    fn replace_requires_an_existing_submission() {
        let mut ontology = Ontology::new(acronym("TST-ONT-0"), "Test Ontology", "tim");
        let err = ontology
            .replace_submission(submission(1))
            .expect_err("nothing to replace");
        assert!(matches!(err, RegistryError::MissingSubmission { .. }));
    }

    #[test]
    fn users_and_contacts_validate_their_email() {
        assert!(User::new("tim", "tim@example.org").is_ok());
        assert!(User::new("tim", "not-an-email").is_err());
        assert!(User::new("", "tim@example.org").is_err());
        assert!(Contact::new("Sheila", "sheila@localhost").is_err());
    }
}
