use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;

use crate::external::storage::StorageError;

/// Guard message raised by the database when a mapping would point at a
/// hidden photo. Matched verbatim by `friendly_db_message`.
pub const HIDDEN_TOP_CONFLICT: &str =
    "A hidden photo cannot be the top photo for a species";

/// What users read instead of the raw guard message.
pub const HIDDEN_TOP_FRIENDLY: &str =
    "Set a different top photo before removing the photo";

#[derive(Debug, thiserror::Error)]
pub enum DomainError {
    /// Precondition failed before any database write was attempted.
    #[error("{0}")]
    Validation(String),

    /// A uniqueness invariant was violated (duplicate entry, duplicate
    /// friendship, and so on).
    #[error("{0}")]
    DuplicateAction(String),

    #[error("{0}")]
    NotFound(String),

    /// The database or a collaborator failed; the message is surfaced
    /// verbatim apart from the documented rewrites.
    #[error("{0}")]
    Persistence(String),
}

impl DomainError {
    pub fn validation(message: impl Into<String>) -> Self {
        DomainError::Validation(message.into())
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        DomainError::NotFound(message.into())
    }
}

/// Rewrite known database guard messages to their user-facing form.
/// Unmatched messages pass through unchanged.
pub fn friendly_db_message(message: &str) -> String {
    if message.contains(HIDDEN_TOP_CONFLICT) {
        HIDDEN_TOP_FRIENDLY.to_string()
    } else {
        message.to_string()
    }
}

impl From<diesel::result::Error> for DomainError {
    fn from(err: diesel::result::Error) -> Self {
        use diesel::result::{DatabaseErrorKind, Error};
        match err {
            Error::NotFound => DomainError::NotFound("Not found".to_string()),
            Error::DatabaseError(DatabaseErrorKind::UniqueViolation, info) => {
                DomainError::DuplicateAction(friendly_db_message(info.message()))
            }
            Error::DatabaseError(_, info) => {
                DomainError::Persistence(friendly_db_message(info.message()))
            }
            other => DomainError::Persistence(other.to_string()),
        }
    }
}

impl From<deadpool::managed::PoolError<diesel_async::pooled_connection::PoolError>>
    for DomainError
{
    fn from(
        err: deadpool::managed::PoolError<diesel_async::pooled_connection::PoolError>,
    ) -> Self {
        DomainError::Persistence(format!("Database error: {}", err))
    }
}

impl From<StorageError> for DomainError {
    fn from(err: StorageError) -> Self {
        DomainError::Persistence(err.to_string())
    }
}

impl IntoResponse for DomainError {
    fn into_response(self) -> Response {
        let status = match &self {
            DomainError::Validation(_) => StatusCode::BAD_REQUEST,
            DomainError::DuplicateAction(_) => StatusCode::CONFLICT,
            DomainError::NotFound(_) => StatusCode::NOT_FOUND,
            DomainError::Persistence(msg) => {
                tracing::error!("Persistence error: {}", msg);
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };

        (status, Json(json!({ "error": self.to_string() }))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_guard_message_is_rewritten() {
        let raw = format!("ERROR: {}", HIDDEN_TOP_CONFLICT);
        assert_eq!(friendly_db_message(&raw), HIDDEN_TOP_FRIENDLY);
    }

    #[test]
    fn unknown_messages_pass_through_unchanged() {
        let raw = "duplicate key value violates unique constraint";
        assert_eq!(friendly_db_message(raw), raw);
    }

    #[test]
    fn not_found_maps_from_diesel() {
        let err = DomainError::from(diesel::result::Error::NotFound);
        assert!(matches!(err, DomainError::NotFound(_)));
    }
}
