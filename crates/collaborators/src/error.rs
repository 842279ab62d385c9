//! Shared collaborator error type.

use thiserror::Error;

/// Errors a collaborator call can produce.
///
/// The two variants map onto the coordination error taxonomy: `Rejected`
/// is a business failure (the collaborator answered and said no), while
/// `Unreachable` is an infrastructure failure (the collaborator never
/// produced a usable answer). Caller-side timeouts belong to the
/// infrastructure class and are mapped by the caller.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum CollaboratorError {
    /// The collaborator explicitly declined the request.
    #[error("{0}")]
    Rejected(String),

    /// The collaborator could not be reached.
    #[error("service unreachable: {0}")]
    Unreachable(String),
}

impl CollaboratorError {
    /// Returns true if this is an explicit business decline.
    pub fn is_rejection(&self) -> bool {
        matches!(self, CollaboratorError::Rejected(_))
    }
}
