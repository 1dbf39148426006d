//! Unified error type for Warden, and its HTTP rendering.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use warden_protocol::{Envelope, ProtocolError};
use warden_session::SessionError;
use warden_store::StoreError;

/// Why an authorization check failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum AccessError {
    /// No live session for the caller, or the code did not match.
    #[error("no live session for this code")]
    Unauthenticated,

    /// The session is fine but the caller's role is not the required one,
    /// or the caller's record could not be read.
    #[error("caller does not hold the required role")]
    Unauthorized,
}

/// The coarse failure taxonomy every error maps onto.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    BadRequest,
    NotFound,
    Conflict,
    Unauthenticated,
    Unauthorized,
    /// The store or the hasher failed. Not the caller's fault.
    CollaboratorFailure,
}

/// Top-level error that wraps all crate-specific errors.
///
/// The `#[from]` attribute on each wrapping variant generates a `From`
/// impl, so `?` converts sub-crate errors automatically.
#[derive(Debug, thiserror::Error)]
pub enum WardenError {
    /// A body could not be decoded, or a response could not be encoded.
    #[error(transparent)]
    Protocol(#[from] ProtocolError),

    /// Password hashing or verification failed.
    #[error(transparent)]
    Session(#[from] SessionError),

    /// The capability store rejected or failed an operation.
    #[error(transparent)]
    Store(#[from] StoreError),

    /// An authorization check failed.
    #[error(transparent)]
    Access(#[from] AccessError),

    /// Login with an unknown email or a wrong password.
    #[error("invalid credentials")]
    InvalidCredentials,

    #[error("failed to bind {addr}: {source}")]
    Bind {
        addr: String,
        #[source]
        source: std::io::Error,
    },

    #[error("server stopped: {0}")]
    Serve(#[source] std::io::Error),

    /// A blocking hashing task panicked or was cancelled.
    #[error("blocking task failed: {0}")]
    Join(#[from] tokio::task::JoinError),
}

impl WardenError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Protocol(ProtocolError::Encode(_)) => {
                ErrorKind::CollaboratorFailure
            }
            Self::Protocol(_) => ErrorKind::BadRequest,
            Self::Store(e) if e.is_not_found() => ErrorKind::NotFound,
            Self::Store(e) if e.is_conflict() => ErrorKind::Conflict,
            Self::Access(AccessError::Unauthenticated)
            | Self::InvalidCredentials => ErrorKind::Unauthenticated,
            Self::Access(AccessError::Unauthorized) => ErrorKind::Unauthorized,
            Self::Store(_)
            | Self::Session(_)
            | Self::Bind { .. }
            | Self::Serve(_)
            | Self::Join(_) => ErrorKind::CollaboratorFailure,
        }
    }

    /// The HTTP status this error is reported with.
    ///
    /// A failed login is 401; a failed session or role check on a
    /// privileged route is 403 either way.
    pub fn status(&self) -> StatusCode {
        match (self, self.kind()) {
            (Self::InvalidCredentials, _) => StatusCode::UNAUTHORIZED,
            (Self::Access(_), _) => StatusCode::FORBIDDEN,
            (_, ErrorKind::BadRequest) => StatusCode::BAD_REQUEST,
            (_, ErrorKind::NotFound) => StatusCode::NOT_FOUND,
            (_, ErrorKind::Conflict) => StatusCode::CONFLICT,
            (_, ErrorKind::Unauthenticated) => StatusCode::UNAUTHORIZED,
            (_, ErrorKind::Unauthorized) => StatusCode::FORBIDDEN,
            (_, ErrorKind::CollaboratorFailure) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    /// The message put in the envelope's `error` field.
    ///
    /// Every access failure reads `access denied`, every collaborator
    /// failure `internal error`. A rejected field reads as the bare
    /// validation message.
    pub fn public_message(&self) -> String {
        match (self, self.kind()) {
            (_, ErrorKind::CollaboratorFailure) => "internal error".to_string(),
            (Self::Access(_), _) => "access denied".to_string(),
            (Self::Protocol(ProtocolError::InvalidMessage(message)), _) => {
                message.clone()
            }
            _ => self.to_string(),
        }
    }
}

impl IntoResponse for WardenError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!(error = %self, "request failed");
        } else {
            tracing::debug!(error = %self, %status, "request rejected");
        }

        let body = Envelope::<()>::failure(self.public_message());
        (status, Json(body)).into_response()
    }
}
