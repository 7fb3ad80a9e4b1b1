//! Store error types.

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, StoreError>;

/// Errors from the persistence layer.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// Underlying `SQLite` error.
    #[error("sqlite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    /// Could not obtain a pooled connection.
    #[error("connection pool error: {0}")]
    Pool(#[from] r2d2::Error),

    /// Schema migration failed.
    #[error("migration failed: {message}")]
    Migration {
        /// What went wrong.
        message: String,
    },

    /// Row lookup by ID found nothing.
    #[error("{entity} not found: {id}")]
    NotFound {
        /// Entity kind ("user", "post").
        entity: &'static str,
        /// The ID that missed.
        id: String,
    },

    /// Signup attempted with an email that is already registered.
    #[error("a user with email {0} already exists")]
    DuplicateEmail(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn not_found_display() {
        let err = StoreError::NotFound {
            entity: "post",
            id: "post_42".into(),
        };
        assert_eq!(err.to_string(), "post not found: post_42");
    }

    #[test]
    fn duplicate_email_display() {
        let err = StoreError::DuplicateEmail("jack@example.com".into());
        assert_eq!(
            err.to_string(),
            "a user with email jack@example.com already exists"
        );
    }
}
