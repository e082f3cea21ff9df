use service_core::error::AppError;
use thiserror::Error;

/// Postgres SQLSTATE for `undefined_table`.
pub const UNDEFINED_TABLE: &str = "42P01";

#[derive(Error, Debug)]
pub enum BackendError {
    /// The backing table does not exist yet (schema not provisioned).
    #[error("Relation does not exist: {message}")]
    RelationMissing { message: String },

    #[error("Backend unavailable: {0}")]
    Unavailable(anyhow::Error),

    #[error("Malformed backend response: {0}")]
    Malformed(String),

    #[error("Backend query failed: {0}")]
    Query(anyhow::Error),
}

impl BackendError {
    pub fn is_relation_missing(&self) -> bool {
        matches!(self, BackendError::RelationMissing { .. })
    }

    pub fn relation_missing(relation: &str) -> Self {
        BackendError::RelationMissing {
            message: format!("relation \"{}\" does not exist", relation),
        }
    }
}

impl From<sqlx::Error> for BackendError {
    fn from(err: sqlx::Error) -> Self {
        if let sqlx::Error::Database(db) = &err {
            if db.code().as_deref() == Some(UNDEFINED_TABLE) {
                return BackendError::RelationMissing {
                    message: db.message().to_string(),
                };
            }
        }

        if matches!(
            err,
            sqlx::Error::PoolTimedOut | sqlx::Error::PoolClosed | sqlx::Error::Io(_)
        ) {
            return BackendError::Unavailable(anyhow::Error::new(err));
        }

        if matches!(
            err,
            sqlx::Error::ColumnDecode { .. } | sqlx::Error::ColumnNotFound(_) | sqlx::Error::Decode(_)
        ) {
            return BackendError::Malformed(err.to_string());
        }

        BackendError::Query(anyhow::Error::new(err))
    }
}

impl From<BackendError> for AppError {
    fn from(err: BackendError) -> Self {
        match err {
            BackendError::RelationMissing { message } => AppError::ServiceUnavailable(message),
            BackendError::Unavailable(e) => AppError::ServiceUnavailable(e.to_string()),
            BackendError::Malformed(msg) => AppError::InternalError(anyhow::anyhow!(msg)),
            BackendError::Query(e) => AppError::DatabaseError(e),
        }
    }
}

/// Session token verification failures. Any of them means "no identity".
#[derive(Error, Debug)]
pub enum SessionError {
    #[error("Invalid session token: {0}")]
    InvalidToken(#[from] jsonwebtoken::errors::Error),

    #[error("Session subject is not a valid user id")]
    InvalidSubject,

    #[error("Session token carries no email")]
    MissingEmail,
}
