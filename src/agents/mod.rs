//! Agents known to the registry and their reconciliation rules.
//!
//! The registry's CRUD surface delegates identifier and affiliation handling
//! to find-or-create-by-natural-key logic; that logic lives here, behind a
//! store trait, with the HTTP mapping intentionally left out.

pub mod entities;
pub mod service;
pub mod store;

use thiserror::Error;

pub use entities::{Agent, AgentIdentifier, AgentKind, IdentifierScheme};
pub use service::{AffiliationParams, AgentParams, AgentService, IdentifierParams};
pub use store::{AgentStore, AgentStoreHandle, InMemoryAgentStore};

/// Errors raised while reconciling agents.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum AgentError {
    /// Attempted to create an agent whose name is already taken.
    #[error("agent `{name}` already exists, use update to modify it")]
    AlreadyExists { name: String },
    /// Referenced agent was not found.
    #[error("agent `{name}` does not exist, create it first")]
    Missing { name: String },
    /// A field-level validation failure.
    #[error("validation failed for `{field}`: {message}")]
    Validation { field: &'static str, message: String },
}
