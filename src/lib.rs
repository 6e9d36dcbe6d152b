//! Expense tracker is a small web service for recording personal expenses.
//!
//! This library provides a JSON REST API for creating, listing, updating and
//! deleting expenses stored in a SQLite database.

#![warn(missing_docs)]

use std::{net::SocketAddr, time::Duration};

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use axum_server::Handle;
use serde_json::json;
use tokio::signal;

mod app_state;
mod cors;
mod db;
mod endpoints;
mod expense;
mod logging;
mod routing;

pub use app_state::AppState;
pub use cors::{CorsConfig, DEFAULT_ALLOWED_ORIGIN};
pub use db::initialize as initialize_db;
pub use expense::{
    DEFAULT_EXPENSE_TYPE, Expense, ExpenseData, ExpenseId, ExpenseTitle, NewExpense,
    create_expense,
};
pub use logging::{LOG_BODY_LENGTH_LIMIT, logging_middleware};
pub use routing::build_router;

/// An async task that waits for either the ctrl+c or terminate signal, whichever comes first, and
/// then signals the server to shut down gracefully.
///
/// `handle` is a handle to an Axum `Server`.
pub async fn graceful_shutdown(handle: Handle<SocketAddr>) {
    let ctrl_c = async {
        if let Err(error) = signal::ctrl_c().await {
            tracing::error!("failed to listen for the ctrl+c signal: {error}");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut terminate_signal) => {
                terminate_signal.recv().await;
            }
            Err(error) => {
                tracing::error!("failed to install the terminate signal handler: {error}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::debug!("Received ctrl+c signal.");
            handle.graceful_shutdown(Some(Duration::from_secs(1)));
        },
        _ = terminate => {
            tracing::debug!("Received terminate signal.");
            handle.graceful_shutdown(Some(Duration::from_secs(1)));
        },
    }
}

/// The errors that may occur in the application.
#[derive(Debug, thiserror::Error, PartialEq)]
pub enum Error {
    /// The ID in the request path is not a valid expense ID.
    #[error("Invalid ID")]
    InvalidId,

    /// A date in the query string could not be parsed as `YYYY-MM-DD`.
    ///
    /// Holds the name of the offending query parameter, e.g. "startDate".
    #[error("Invalid {0} format. Use YYYY-MM-DD")]
    InvalidDate(&'static str),

    /// The query string could not be parsed.
    #[error("Invalid query string: {0}")]
    InvalidQuery(String),

    /// The request body was not a valid expense payload.
    ///
    /// Holds the reason given by the JSON extractor, e.g. a missing field.
    #[error("{0}")]
    InvalidBody(String),

    /// An empty string was used as an expense title.
    #[error("Expense title cannot be empty")]
    EmptyExpenseTitle,

    /// The configured CORS origin is not a valid header value.
    #[error("invalid allowed origin \"{0}\"")]
    InvalidOrigin(String),

    /// The requested resource was not found.
    ///
    /// For HTTP request handlers, the client should check that the ID is
    /// correct and that the expense has not been deleted.
    ///
    /// Internally, this error may occur when a query returns no rows.
    #[error("the requested resource could not be found")]
    NotFound,

    /// Tried to update an expense that does not exist
    #[error("tried to update an expense that is not in the database")]
    UpdateMissingExpense,

    /// Tried to delete an expense that does not exist
    #[error("tried to delete an expense that is not in the database")]
    DeleteMissingExpense,

    /// A date-time could not be converted to or from its stored text form.
    #[error("could not convert the date \"{0}\"")]
    DateConversion(String),

    /// A response body could not be read back after a handler produced it.
    #[error("could not read the response body: {0}")]
    ResponseBody(String),

    /// An unhandled/unexpected SQL error.
    #[error("an unexpected SQL error occurred: {0}")]
    SqlError(rusqlite::Error),

    /// Could not acquire the database lock
    #[error("could not acquire the database lock")]
    DatabaseLockError,
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

impl Error {
    /// The HTTP status code that best describes the error to a client.
    pub fn status_code(&self) -> StatusCode {
        match self {
            Error::InvalidId
            | Error::InvalidDate(_)
            | Error::InvalidQuery(_)
            | Error::InvalidBody(_)
            | Error::EmptyExpenseTitle => StatusCode::BAD_REQUEST,
            Error::NotFound | Error::UpdateMissingExpense | Error::DeleteMissingExpense => {
                StatusCode::NOT_FOUND
            }
            Error::InvalidOrigin(_)
            | Error::DateConversion(_)
            | Error::ResponseBody(_)
            | Error::SqlError(_)
            | Error::DatabaseLockError => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let status = self.status_code();

        let message = match self {
            Error::NotFound | Error::UpdateMissingExpense | Error::DeleteMissingExpense => {
                "Expense not found".to_owned()
            }
            // Internal errors are logged but their details are not shown to the client.
            error if status == StatusCode::INTERNAL_SERVER_ERROR => {
                tracing::error!("An unexpected error occurred: {}", error);
                "An unexpected error occurred, check the server logs for more details.".to_owned()
            }
            error => error.to_string(),
        };

        (status, Json(json!({ "error": message }))).into_response()
    }
}
