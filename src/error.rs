//! Defines the app level error type and its conversion to rendered HTML pages.
use axum::response::{IntoResponse, Response};

use crate::{
    bad_request::BadRequest, internal_server_error::InternalServerError, not_found::NotFoundError,
};

/// The errors that may occur in the application.
#[derive(Debug, thiserror::Error, PartialEq)]
pub enum Error {
    /// A form field was missing or could not be parsed.
    ///
    /// The string describes the problem and is safe to show to the client.
    #[error("{0}")]
    InvalidInput(String),

    /// The requested resource was not found.
    ///
    /// For HTTP request handlers, the client should check that the parameters
    /// (e.g., ID) are correct and that the resource has been created.
    ///
    /// Internally, this error may occur when a query returns no rows.
    #[error("the requested resource could not be found")]
    NotFound,

    /// An unhandled/unexpected SQL error, e.g. the database file is
    /// unreachable or a write failed.
    #[error("an unexpected SQL error occurred: {0}")]
    SqlError(rusqlite::Error),

    /// Could not acquire the database lock
    #[error("could not acquire the database lock")]
    DatabaseLockError,

    /// The database was written by a newer version of the app.
    #[error("the database schema version {0} is newer than this app supports")]
    UnsupportedSchemaVersion(i64),

    /// The sum of the stored prices does not fit in [crate::MinorUnits].
    ///
    /// Prices are bounded when they are parsed, so this only happens if the
    /// database was written by something else.
    #[error("the total of all expenses is too large to display")]
    TotalOutOfRange,

    /// The Prometheus metrics could not be registered or encoded.
    #[error("metrics error: {0}")]
    MetricsError(String),
}

impl From<rusqlite::Error> for Error {
    fn from(value: rusqlite::Error) -> Self {
        match value {
            rusqlite::Error::QueryReturnedNoRows => Error::NotFound,
            error => {
                tracing::error!("an unhandled SQL error occurred: {}", error);
                Error::SqlError(error)
            }
        }
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        match self {
            Error::NotFound => NotFoundError.into_response(),
            Error::InvalidInput(message) => BadRequest {
                description: "Invalid expense",
                fix: &message,
            }
            .into_response(),
            // Any errors that are not handled above are not intended to be shown to the client.
            error => {
                tracing::error!("An unexpected error occurred: {}", error);
                InternalServerError::default().into_response()
            }
        }
    }
}
