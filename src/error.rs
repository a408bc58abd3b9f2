use std::fmt;

use crate::guard::ResourceKind;

/// The failure classes a caller has to distinguish.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    NotFound,
    Validation,
    Authentication,
    Conflict,
    Internal,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::NotFound => "not_found",
            Self::Validation => "validation_error",
            Self::Authentication => "authentication_error",
            Self::Conflict => "conflict",
            Self::Internal => "internal_error",
        })
    }
}

#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Missing, or owned by someone else. Callers cannot tell which.
    #[error("{kind} {id} not found")]
    NotFound { kind: ResourceKind, id: i64 },

    #[error("{0}")]
    Validation(String),

    #[error("{0}")]
    Authentication(String),

    #[error("{0}")]
    Conflict(String),

    #[error("{0}")]
    Internal(String),

    #[error("store error: {0}")]
    Store(#[from] rusqlite::Error),
}

pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    pub fn not_found(kind: ResourceKind, id: i64) -> Self {
        Self::NotFound { kind, id }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::NotFound { .. } => ErrorKind::NotFound,
            Self::Validation(_) => ErrorKind::Validation,
            Self::Authentication(_) => ErrorKind::Authentication,
            Self::Conflict(_) => ErrorKind::Conflict,
            Self::Internal(_) => ErrorKind::Internal,
            Self::Store(e) if is_constraint_violation(e) => ErrorKind::Conflict,
            Self::Store(_) => ErrorKind::Internal,
        }
    }
}

fn is_constraint_violation(e: &rusqlite::Error) -> bool {
    matches!(
        e,
        rusqlite::Error::SqliteFailure(err, _)
            if err.code == rusqlite::ErrorCode::ConstraintViolation
    )
}

/// Shorthand for `Err(Error::Validation(..))` with `format!` arguments.
macro_rules! invalid {
    ($($arg:tt)*) => {
        return Err($crate::error::Error::Validation(format!($($arg)*)))
    };
}
pub(crate) use invalid;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db;

    #[test]
    fn unique_violation_is_a_conflict() {
        let conn = db::open_memory().unwrap();
        conn.execute("INSERT INTO users (name, token) VALUES ('a', 't1')", [])
            .unwrap();
        let err: Error = conn
            .execute("INSERT INTO users (name, token) VALUES ('a', 't2')", [])
            .unwrap_err()
            .into();
        assert_eq!(err.kind(), ErrorKind::Conflict);
    }

    #[test]
    fn other_store_errors_are_internal() {
        let conn = db::open_memory().unwrap();
        let err: Error = conn
            .execute("SELECT * FROM no_such_table", [])
            .unwrap_err()
            .into();
        assert_eq!(err.kind(), ErrorKind::Internal);
    }

    #[test]
    fn not_found_message_names_the_resource() {
        let err = Error::not_found(ResourceKind::Column, 7);
        assert_eq!(err.to_string(), "column 7 not found");
        assert_eq!(err.kind(), ErrorKind::NotFound);
    }
}
