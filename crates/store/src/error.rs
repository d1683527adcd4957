use thiserror::Error;

/// Errors that can occur when interacting with a store.
#[derive(Debug, Error)]
pub enum StoreError {
    /// A row targeted by an update does not exist.
    #[error("No row in {table} with key {key}")]
    NotFound { table: &'static str, key: String },

    /// A row with the same primary key already exists.
    #[error("Duplicate key in {table}: {key}")]
    DuplicateKey { table: &'static str, key: String },

    /// A row references a parent row that does not exist.
    #[error("Foreign key violation on {table}: {detail}")]
    ForeignKeyViolation { table: &'static str, detail: String },

    /// A database error occurred.
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// A database migration error occurred.
    #[error("Migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),
}

impl StoreError {
    pub(crate) fn not_found(table: &'static str, key: impl std::fmt::Display) -> Self {
        Self::NotFound {
            table,
            key: key.to_string(),
        }
    }

    pub(crate) fn duplicate(table: &'static str, key: impl std::fmt::Display) -> Self {
        Self::DuplicateKey {
            table,
            key: key.to_string(),
        }
    }

    pub(crate) fn dangling(table: &'static str, detail: impl Into<String>) -> Self {
        Self::ForeignKeyViolation {
            table,
            detail: detail.into(),
        }
    }
}

/// Result type for store operations.
pub type Result<T> = std::result::Result<T, StoreError>;
