use std::fmt::{self, Display, Formatter};
use std::str::FromStr;
use std::sync::LazyLock;

use regex::Regex;
use thiserror::Error;

static ACRONYM_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new("^[A-Z][A-Z0-9_-]{0,15}$").expect("acronym pattern"));

/// Value object ensuring that supplied text is a well formed registry acronym.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Acronym {
    value: String,
}

impl Acronym {
    /// Validates and constructs a new [`Acronym`] value object.
    ///
    /// Acronyms are uppercase, start with a letter and may contain digits,
    /// dashes and underscores up to sixteen characters.
    pub fn new(value: impl Into<String>) -> Result<Self, AcronymError> {
        let value = value.into();
        if !ACRONYM_PATTERN.is_match(&value) {
            return Err(AcronymError::Invalid { value });
        }
        Ok(Self { value })
    }

    /// Returns the underlying textual representation.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.value
    }

    /// Returns true when the acronym starts with the supplied prefix.
    #[must_use]
    pub fn has_prefix(&self, prefix: &str) -> bool {
        self.value.starts_with(prefix)
    }
}

impl Display for Acronym {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(&self.value)
    }
}

impl FromStr for Acronym {
    type Err = AcronymError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s.to_owned())
    }
}

impl TryFrom<String> for Acronym {
    type Error = AcronymError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

/// Errors produced when validating an [`Acronym`].
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum AcronymError {
    /// The provided text does not follow the acronym format.
    #[error("invalid acronym: {value}")]
    Invalid { value: String },
}

/// Identifier of a submission within its owning ontology.
///
/// Identifiers are positive integers starting at 1 and strictly increasing in
/// the order submissions are appended.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SubmissionId(u32);

impl SubmissionId {
    /// The identifier carried by the first submission of every ontology.
    pub const FIRST: SubmissionId = SubmissionId(1);

    /// Validates and constructs a new [`SubmissionId`].
    pub fn new(value: u32) -> Result<Self, SubmissionIdError> {
        if value == 0 {
            return Err(SubmissionIdError::Zero);
        }
        Ok(Self(value))
    }

    /// Returns the numeric value of the identifier.
    #[must_use]
    pub fn value(self) -> u32 {
        self.0
    }

    /// Returns the identifier directly following this one.
    #[must_use]
    pub fn next(self) -> Self {
        Self(self.0 + 1)
    }

    /// Returns true when this identifier marks the first submission version.
    #[must_use]
    pub fn is_first(self) -> bool {
        self == Self::FIRST
    }
}

impl Display for SubmissionId {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Errors produced when validating a [`SubmissionId`].
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum SubmissionIdError {
    /// Submission identifiers start at 1.
    #[error("submission identifiers start at 1")]
    Zero,
}
