use serde::Deserialize;

use super::AgentError;

/// Whether an agent is a person or an organization.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AgentKind {
    Person,
    Organization,
}

/// Agency issuing an agent identifier.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum IdentifierScheme {
    Orcid,
    Ror,
    Isni,
    Grid,
}

/// External identifier attached to an agent, unique by notation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AgentIdentifier {
    notation: String,
    scheme: IdentifierScheme,
}

impl AgentIdentifier {
    /// Validates and creates a new identifier.
    pub fn new(
        notation: impl Into<String>,
        scheme: IdentifierScheme,
    ) -> Result<Self, AgentError> {
        let notation = notation.into();
        if notation.trim().is_empty() {
            return Err(AgentError::Validation {
                field: "notation",
                message: "must not be empty".to_string(),
            });
        }
        Ok(Self { notation, scheme })
    }

    /// Returns the notation the identifier is looked up by.
    #[must_use]
    pub fn notation(&self) -> &str {
        &self.notation
    }

    /// Returns the issuing scheme.
    #[must_use]
    pub fn scheme(&self) -> IdentifierScheme {
        self.scheme
    }

    /// Replaces the issuing scheme.
    pub fn set_scheme(&mut self, scheme: IdentifierScheme) {
        self.scheme = scheme;
    }
}

/// A person or organization known to the registry.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Agent {
    name: String,
    kind: AgentKind,
    email: Option<String>,
    identifiers: Vec<AgentIdentifier>,
    affiliations: Vec<String>,
}

impl Agent {
    /// Validates and creates a new agent with no identifiers or affiliations.
    pub fn new(name: impl Into<String>, kind: AgentKind) -> Result<Self, AgentError> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(AgentError::Validation {
                field: "name",
                message: "must not be empty".to_string(),
            });
        }
        Ok(Self {
            name,
            kind,
            email: None,
            identifiers: Vec::new(),
            affiliations: Vec::new(),
        })
    }

    /// Returns the unique agent name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the agent kind.
    #[must_use]
    pub fn kind(&self) -> AgentKind {
        self.kind
    }

    /// Returns the optional contact email.
    #[must_use]
    pub fn email(&self) -> Option<&str> {
        self.email.as_deref()
    }

    /// Returns the reconciled identifiers.
    #[must_use]
    pub fn identifiers(&self) -> &[AgentIdentifier] {
        &self.identifiers
    }

    /// Returns the names of affiliated organizations.
    #[must_use]
    pub fn affiliations(&self) -> &[String] {
        &self.affiliations
    }

    /// Validates and sets the contact email.
    pub fn set_email(&mut self, email: impl Into<String>) -> Result<(), AgentError> {
        let email = email.into();
        let well_formed = email
            .split_once('@')
            .is_some_and(|(local, domain)| !local.is_empty() && domain.contains('.'));
        if !well_formed {
            return Err(AgentError::Validation {
                field: "email",
                message: format!("`{email}` is not a valid address"),
            });
        }
        self.email = Some(email);
        Ok(())
    }

    /// Replaces the reconciled identifiers.
    pub fn set_identifiers(&mut self, identifiers: Vec<AgentIdentifier>) {
        self.identifiers = identifiers;
    }

    /// Replaces the affiliated organization names.
    pub fn set_affiliations(&mut self, affiliations: Vec<String>) {
        self.affiliations = affiliations;
    }
}
