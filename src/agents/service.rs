use std::sync::Arc;

use serde::Deserialize;
use tracing::debug;

use super::entities::{Agent, AgentIdentifier, AgentKind, IdentifierScheme};
use super::store::{AgentStore, AgentStoreHandle};
use super::AgentError;

/// Incoming agent fields, as posted to the registry's CRUD surface.
#[derive(Clone, Debug, Deserialize)]
pub struct AgentParams {
    /// Unique agent name.
    pub name: String,
    /// Person or organization.
    #[serde(rename = "agentType")]
    pub kind: AgentKind,
    /// Optional contact email.
    #[serde(default)]
    pub email: Option<String>,
    /// Identifiers to reconcile by notation.
    #[serde(default)]
    pub identifiers: Vec<IdentifierParams>,
    /// Affiliations to reconcile by agent name.
    #[serde(default)]
    pub affiliations: Vec<AffiliationParams>,
}

/// Incoming identifier fields.
#[derive(Clone, Debug, Deserialize)]
pub struct IdentifierParams {
    /// Natural key of the identifier.
    pub notation: String,
    /// Issuing scheme.
    #[serde(rename = "schemaAgency")]
    pub scheme: IdentifierScheme,
}

/// Incoming affiliation fields.
#[derive(Clone, Debug, Deserialize)]
pub struct AffiliationParams {
    /// Name of the affiliated organization.
    pub name: String,
    /// Kind of the affiliation target; only organizations are accepted.
    #[serde(rename = "agentType", default = "default_affiliation_kind")]
    pub kind: AgentKind,
    /// Optional contact email used when the organization is created.
    #[serde(default)]
    pub email: Option<String>,
}

fn default_affiliation_kind() -> AgentKind {
    AgentKind::Organization
}

/// Find-or-create reconciliation over agents, their identifiers and
/// affiliations.
///
/// Identifiers reconcile by notation, affiliations by agent name. Creating an
/// agent that already exists and updating one that does not are both errors,
/// mirroring the registry's create/update split.
#[derive(Clone)]
pub struct AgentService {
    store: Arc<AgentStoreHandle>,
}

impl AgentService {
    /// Creates a service over the supplied store.
    #[must_use]
    pub fn new(store: Arc<AgentStoreHandle>) -> Self {
        Self { store }
    }

    /// Retrieves an agent by name.
    pub async fn find(&self, name: &str) -> Result<Option<Agent>, AgentError> {
        self.store.find_agent(name).await
    }

    /// Creates a new agent, rejecting names that are already taken.
    pub async fn create(&self, params: AgentParams) -> Result<Agent, AgentError> {
        if self.store.find_agent(&params.name).await?.is_some() {
            return Err(AgentError::AlreadyExists { name: params.name });
        }
        let agent = self.build(params).await?;
        self.store.save_agent(agent.clone()).await?;
        debug!(agent = agent.name(), "agent created");
        Ok(agent)
    }

    /// Updates an existing agent, rejecting names that are unknown.
    pub async fn update(&self, name: &str, params: AgentParams) -> Result<Agent, AgentError> {
        if self.store.find_agent(name).await?.is_none() {
            return Err(AgentError::Missing {
                name: name.to_string(),
            });
        }
        let params = AgentParams {
            name: name.to_string(),
            ..params
        };
        let agent = self.build(params).await?;
        self.store.save_agent(agent.clone()).await?;
        debug!(agent = agent.name(), "agent updated");
        Ok(agent)
    }

    /// Deletes an agent by name.
    pub async fn delete(&self, name: &str) -> Result<(), AgentError> {
        self.store.delete_agent(name).await
    }

    async fn build(&self, params: AgentParams) -> Result<Agent, AgentError> {
        let mut agent = Agent::new(params.name, params.kind)?;
        if let Some(email) = params.email {
            agent.set_email(email)?;
        }
        agent.set_identifiers(self.reconcile_identifiers(params.identifiers).await?);
        agent.set_affiliations(self.reconcile_affiliations(params.affiliations).await?);
        Ok(agent)
    }

    /// Finds each identifier by notation and updates it, or creates it.
    async fn reconcile_identifiers(
        &self,
        params: Vec<IdentifierParams>,
    ) -> Result<Vec<AgentIdentifier>, AgentError> {
        let mut identifiers = Vec::with_capacity(params.len());
        for incoming in params {
            let identifier = match self.store.find_identifier(&incoming.notation).await? {
                Some(mut existing) => {
                    existing.set_scheme(incoming.scheme);
                    existing
                }
                None => AgentIdentifier::new(incoming.notation, incoming.scheme)?,
            };
            self.store.save_identifier(identifier.clone()).await?;
            identifiers.push(identifier);
        }
        Ok(identifiers)
    }

    /// Finds each affiliation by agent name, or creates the organization.
    async fn reconcile_affiliations(
        &self,
        params: Vec<AffiliationParams>,
    ) -> Result<Vec<String>, AgentError> {
        let mut names = Vec::with_capacity(params.len());
        for incoming in params {
            match self.store.find_agent(&incoming.name).await? {
                Some(existing) => {
                    if existing.kind() != AgentKind::Organization {
                        return Err(AgentError::Validation {
                            field: "affiliations",
                            message: format!("`{}` is not an organization", existing.name()),
                        });
                    }
                    names.push(existing.name().to_string());
                }
                None => {
                    if incoming.kind != AgentKind::Organization {
                        return Err(AgentError::Validation {
                            field: "affiliations",
                            message: format!("`{}` must be an organization", incoming.name),
                        });
                    }
                    let mut affiliation = Agent::new(incoming.name, AgentKind::Organization)?;
                    if let Some(email) = incoming.email {
                        affiliation.set_email(email)?;
                    }
                    self.store.save_agent(affiliation.clone()).await?;
                    names.push(affiliation.name().to_string());
                }
            }
        }
        Ok(names)
    }
}
