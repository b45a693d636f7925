//! Typed errors for the assignment engine.
//!
//! Uses `thiserror` for library errors (not `anyhow`) so the HTTP layer can
//! map each failure to a stable wire code.

use thiserror::Error;

use crate::types::ids::UserId;

/// Errors that can occur during assignment operations.
#[derive(Debug, Error)]
pub enum AssignmentError {
    /// Referenced team, user or pull request does not exist
    #[error("{0}")]
    NotFound(String),

    /// Team name is already taken
    #[error("team already exists")]
    TeamExists,

    /// Pull request id is already taken
    #[error("PR id already exists")]
    PrExists,

    /// A prospective team member already belongs to a different team
    #[error("user {0} already belongs to another team")]
    UserInOtherTeam(UserId),

    /// Malformed input that passed transport decoding
    #[error("{0}")]
    InvalidInput(String),

    /// Reviewers of a merged pull request are frozen
    #[error("cannot reassign on merged PR")]
    PrMerged,

    /// The user is not a reviewer of the pull request
    #[error("reviewer is not assigned to this PR")]
    NotAssigned,

    /// Nobody in the team can take over the review
    #[error("no active replacement candidate in team")]
    NoCandidate,

    /// Storage operation failed
    #[error("storage error: {0}")]
    Storage(#[source] Box<dyn std::error::Error + Send + Sync>),
}

/// Error families surfaced to the boundary layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    NotFound,
    AlreadyExists,
    Validation,
    Conflict,
    Internal,
}

impl AssignmentError {
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::NotFound(message.into())
    }

    pub fn storage(err: impl Into<Box<dyn std::error::Error + Send + Sync>>) -> Self {
        Self::Storage(err.into())
    }

    /// Stable machine-readable code for the wire format.
    pub fn code(&self) -> &'static str {
        match self {
            Self::NotFound(_) => "NOT_FOUND",
            Self::TeamExists => "TEAM_EXISTS",
            Self::PrExists => "PR_EXISTS",
            Self::UserInOtherTeam(_) => "USER_IN_OTHER_TEAM",
            Self::InvalidInput(_) => "BAD_REQUEST",
            Self::PrMerged => "PR_MERGED",
            Self::NotAssigned => "NOT_ASSIGNED",
            Self::NoCandidate => "NO_CANDIDATE",
            Self::Storage(_) => "INTERNAL_ERROR",
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::NotFound(_) => ErrorKind::NotFound,
            Self::TeamExists | Self::PrExists => ErrorKind::AlreadyExists,
            Self::UserInOtherTeam(_) | Self::InvalidInput(_) => ErrorKind::Validation,
            Self::PrMerged | Self::NotAssigned | Self::NoCandidate => ErrorKind::Conflict,
            Self::Storage(_) => ErrorKind::Internal,
        }
    }
}

#[cfg(feature = "postgres")]
impl From<sqlx::Error> for AssignmentError {
    fn from(err: sqlx::Error) -> Self {
        Self::storage(err)
    }
}

/// Result type alias for assignment operations.
pub type Result<T> = std::result::Result<T, AssignmentError>;
