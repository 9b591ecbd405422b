//! Shared Diesel error mapping for the collection repositories.

use tracing::debug;

use crate::domain::ports::RepositoryError;

use super::pool::PoolError;

/// Map pool failures to a repository connection error.
pub(crate) fn map_pool_error(error: PoolError) -> RepositoryError {
    let message = match error {
        PoolError::Checkout { message } | PoolError::Build { message } => message,
    };
    RepositoryError::connection(message)
}

/// Map Diesel failures to repository errors; unique-constraint violations
/// become [`RepositoryError::DuplicateName`].
pub(crate) fn map_diesel_error(error: diesel::result::Error, context: &str) -> RepositoryError {
    use diesel::result::{DatabaseErrorKind, Error as DieselError};

    match &error {
        DieselError::DatabaseError(kind, info) => {
            debug!(?kind, message = info.message(), context, "diesel operation failed");
        }
        other => debug!(
            error_type = %std::any::type_name_of_val(other),
            context,
            "diesel operation failed"
        ),
    }

    match error {
        DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, _) => {
            RepositoryError::DuplicateName
        }
        DieselError::DatabaseError(DatabaseErrorKind::ClosedConnection, _) => {
            RepositoryError::connection(format!("{context}: database connection error"))
        }
        _ => RepositoryError::query(format!("{context}: database error")),
    }
}
