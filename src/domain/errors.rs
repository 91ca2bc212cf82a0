//! Domain error types
//!
//! These errors are framework-agnostic and represent business-level failures.

use std::fmt;

#[derive(Debug)]
pub enum DomainError {
    /// Resource not found
    NotFound,
    /// Validation error with message; rejected before any mutation
    Validation(String),
    /// Delete blocked by dependent rows. Carries the entity kind being
    /// deleted and how many books reference it.
    ReferentialIntegrity {
        entity: &'static str,
        dependents: u64,
    },
    /// Reserved for future workflow rules on reading-status changes.
    /// No transition is currently restricted, so this is never produced.
    InvalidTransition(String),
    /// Database/persistence error
    Database(String),
    /// Generic internal error
    Internal(String),
}

impl fmt::Display for DomainError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DomainError::NotFound => write!(f, "Resource not found"),
            DomainError::Validation(msg) => write!(f, "Validation error: {}", msg),
            DomainError::ReferentialIntegrity { entity, dependents } => write!(
                f,
                "Cannot delete {}: referenced by {} book(s)",
                entity, dependents
            ),
            DomainError::InvalidTransition(msg) => write!(f, "Invalid transition: {}", msg),
            DomainError::Database(msg) => write!(f, "Database error: {}", msg),
            DomainError::Internal(msg) => write!(f, "Internal error: {}", msg),
        }
    }
}

impl std::error::Error for DomainError {}

// Conversion from SeaORM errors (used in the service layer)
impl From<sea_orm::DbErr> for DomainError {
    fn from(e: sea_orm::DbErr) -> Self {
        DomainError::Database(e.to_string())
    }
}
