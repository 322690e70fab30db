use std::collections::BTreeMap;
use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;

use super::entities::{Agent, AgentIdentifier};
use super::AgentError;

/// Type alias simplifying store trait object usage.
pub type AgentStoreHandle = dyn AgentStore<Error = AgentError> + Send + Sync + 'static;

/// Contract describing persistence responsibilities for agents.
#[async_trait]
pub trait AgentStore {
    /// Associated error type allowing infrastructure specific failures.
    type Error;

    /// Retrieves an agent by name.
    async fn find_agent(&self, name: &str) -> Result<Option<Agent>, Self::Error>;

    /// Inserts or replaces an agent record.
    async fn save_agent(&self, agent: Agent) -> Result<(), Self::Error>;

    /// Deletes an agent record.
    async fn delete_agent(&self, name: &str) -> Result<(), Self::Error>;

    /// Retrieves an identifier by notation.
    async fn find_identifier(
        &self,
        notation: &str,
    ) -> Result<Option<AgentIdentifier>, Self::Error>;

    /// Inserts or replaces an identifier record.
    async fn save_identifier(&self, identifier: AgentIdentifier) -> Result<(), Self::Error>;
}

#[derive(Default)]
struct State {
    agents: BTreeMap<String, Agent>,
    identifiers: BTreeMap<String, AgentIdentifier>,
}

/// Agent store backed by process memory.
#[derive(Default)]
pub struct InMemoryAgentStore {
    state: Mutex<State>,
}

impl InMemoryAgentStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn guard(&self) -> MutexGuard<'_, State> {
        self.state.lock().expect("in-memory agent store poisoned")
    }
}

#[async_trait]
impl AgentStore for InMemoryAgentStore {
    type Error = AgentError;

    async fn find_agent(&self, name: &str) -> Result<Option<Agent>, Self::Error> {
        let guard = self.guard();
        Ok(guard.agents.get(name).cloned())
    }

    async fn save_agent(&self, agent: Agent) -> Result<(), Self::Error> {
        let mut guard = self.guard();
        guard.agents.insert(agent.name().to_string(), agent);
        Ok(())
    }

    async fn delete_agent(&self, name: &str) -> Result<(), Self::Error> {
        let mut guard = self.guard();
        guard
            .agents
            .remove(name)
            .map(|_| ())
            .ok_or_else(|| AgentError::Missing {
                name: name.to_string(),
            })
    }

    async fn find_identifier(
        &self,
        notation: &str,
    ) -> Result<Option<AgentIdentifier>, Self::Error> {
        let guard = self.guard();
        Ok(guard.identifiers.get(notation).cloned())
    }

    async fn save_identifier(&self, identifier: AgentIdentifier) -> Result<(), Self::Error> {
        let mut guard = self.guard();
        guard
            .identifiers
            .insert(identifier.notation().to_string(), identifier);
        Ok(())
    }
}
