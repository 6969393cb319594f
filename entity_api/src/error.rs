//! Error types for entity API
use std::error::Error as StdError;
use std::fmt;

use serde::Serialize;

use sea_orm::error::DbErr;

/// Errors while executing operations related to entities.
/// The intent is to categorize errors into two major types:
///  * Errors related to data. Ex DbError::RecordNotFound
///  * Errors related to interactions with the database itself. Ex DbError::Conn
#[derive(Debug, PartialEq)]
pub struct Error {
    // Underlying error emitted from seaORM internals
    pub source: Option<DbErr>,
    // Enum representing which category of error
    pub error_kind: EntityApiErrorKind,
}

#[derive(Debug, PartialEq, Serialize)]
pub enum EntityApiErrorKind {
    // Invalid search term
    InvalidQueryTerm,
    // Record not found
    RecordNotFound,
    // Record not updated
    RecordNotUpdated,
    // Query or write referenced a column the deployed schema does not have.
    // Callers use this to retry with a reduced column set.
    UndefinedColumn,
    // Errors related to interactions with the database itself. Ex DbError::Conn
    SystemError,
    // Other errors
    Other,
}

impl Error {
    /// True when the underlying failure is Postgres complaining about a
    /// column that does not exist (SQLSTATE 42703). Deployments running an
    /// older schema hit this on queries that project newer optional columns.
    pub fn is_undefined_column(&self) -> bool {
        self.error_kind == EntityApiErrorKind::UndefinedColumn
    }
}

pub(crate) fn db_err_is_undefined_column(err: &DbErr) -> bool {
    let msg = err.to_string();
    msg.contains("42703") || (msg.contains("column") && msg.contains("does not exist"))
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "Entity API Error: {:?}", self)
    }
}

impl StdError for Error {}

impl From<DbErr> for Error {
    fn from(err: DbErr) -> Self {
        if db_err_is_undefined_column(&err) {
            return Error {
                source: Some(err),
                error_kind: EntityApiErrorKind::UndefinedColumn,
            };
        }
        match err {
            DbErr::RecordNotFound(_) => Error {
                source: Some(err),
                error_kind: EntityApiErrorKind::RecordNotFound,
            },
            DbErr::RecordNotUpdated => Error {
                source: Some(err),
                error_kind: EntityApiErrorKind::RecordNotUpdated,
            },
            DbErr::ConnectionAcquire(_) => Error {
                source: Some(err),
                error_kind: EntityApiErrorKind::SystemError,
            },
            DbErr::Conn(_) => Error {
                source: Some(err),
                error_kind: EntityApiErrorKind::SystemError,
            },
            DbErr::Exec(_) => Error {
                source: Some(err),
                error_kind: EntityApiErrorKind::SystemError,
            },
            _ => Error {
                source: Some(err),
                error_kind: EntityApiErrorKind::SystemError,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sea_orm::RuntimeErr;

    #[test]
    fn undefined_column_errors_are_classified_for_fallback() {
        let err = DbErr::Query(RuntimeErr::Internal(
            "error returned from database: column \"job_id\" does not exist".to_string(),
        ));
        assert!(db_err_is_undefined_column(&err));

        let api_err: Error = err.into();
        assert!(api_err.is_undefined_column());
    }

    #[test]
    fn sqlstate_code_alone_is_enough() {
        let err = DbErr::Query(RuntimeErr::Internal("SQLSTATE 42703".to_string()));
        assert!(db_err_is_undefined_column(&err));
    }

    #[test]
    fn unrelated_errors_are_not_classified_as_undefined_column() {
        let err = DbErr::Query(RuntimeErr::Internal(
            "duplicate key value violates unique constraint".to_string(),
        ));
        assert!(!db_err_is_undefined_column(&err));

        let api_err: Error = err.into();
        assert_eq!(api_err.error_kind, EntityApiErrorKind::SystemError);
    }

    #[test]
    fn record_not_found_is_preserved() {
        let api_err: Error = DbErr::RecordNotFound("call_rooms".to_string()).into();
        assert_eq!(api_err.error_kind, EntityApiErrorKind::RecordNotFound);
    }
}
