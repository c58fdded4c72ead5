//! Error taxonomy for the permission core.
//!
//! Four conditions cover everything the core can report:
//!
//! - [`PermissionError::NotFound`] — the target object does not exist.
//!   Always surfaced; never conflated with "no access".
//! - [`PermissionError::Forbidden`] — a whole-document operation was
//!   rejected by the computed ability. Per-block checks return `Ok(false)`
//!   instead so batch filtering stays cheap.
//! - [`PermissionError::Store`] — the underlying store could not be read or
//!   written. The engine fails closed: a store error during an ability
//!   computation propagates as an error and is never treated as an allow.
//! - [`PermissionError::InvalidGrant`] — a grant record violates its
//!   structural invariant; rejected at write time so it can never reach
//!   ability evaluation.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum PermissionError {
    #[error("{kind} not found: {id}")]
    NotFound { kind: &'static str, id: String },

    #[error("operation forbidden for the requesting user")]
    Forbidden,

    #[error("permission store unavailable")]
    Store(#[source] anyhow::Error),

    #[error("invalid grant: {0}")]
    InvalidGrant(String),
}

impl PermissionError {
    pub fn not_found(kind: &'static str, id: impl Into<String>) -> Self {
        PermissionError::NotFound {
            kind,
            id: id.into(),
        }
    }

    /// Wrap a lower-level store failure. Callers must treat this as a deny.
    pub fn store(err: impl Into<anyhow::Error>) -> Self {
        PermissionError::Store(err.into())
    }
}

pub type Result<T> = std::result::Result<T, PermissionError>;
