//! Database-specific error types and conversions.

use gatehouse_core::GateError;

/// Database-layer error type.
#[derive(Debug, thiserror::Error)]
pub enum DbError {
    #[error("SurrealDB error: {0}")]
    Surreal(#[from] surrealdb::Error),

    #[error("Migration failed: {0}")]
    Migration(String),

    #[error("Record not found: {entity} with id {id}")]
    NotFound { entity: String, id: String },

    #[error("Record already exists: {entity}")]
    AlreadyExists { entity: String },
}

impl From<DbError> for GateError {
    fn from(err: DbError) -> Self {
        match err {
            DbError::NotFound { entity, id } => GateError::NotFound { entity, id },
            DbError::AlreadyExists { entity } => GateError::AlreadyExists { entity },
            other => GateError::Database(other.to_string()),
        }
    }
}
