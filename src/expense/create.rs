//! Expense creation endpoint.

use std::sync::{Arc, Mutex};

use axum::{
    Json,
    extract::{FromRef, State, rejection::JsonRejection},
    http::StatusCode,
};
use rusqlite::Connection;

use crate::{
    AppState, Error,
    expense::{Expense, ExpenseData, create_expense},
};

/// The state needed for creating an expense.
#[derive(Debug, Clone)]
pub struct CreateExpenseState {
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for CreateExpenseState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// Create an expense from a JSON body and respond with the saved expense.
pub async fn create_expense_endpoint(
    State(state): State<CreateExpenseState>,
    payload: Result<Json<ExpenseData>, JsonRejection>,
) -> Result<(StatusCode, Json<Expense>), Error> {
    let Json(expense_data) =
        payload.map_err(|rejection| Error::InvalidBody(rejection.body_text()))?;
    let new_expense = expense_data.into_new_expense()?;

    let connection = state
        .db_connection
        .lock()
        .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
        .map_err(|_| Error::DatabaseLockError)?;

    let expense = create_expense(new_expense, &connection)?;
    tracing::debug!("created expense {}", expense.id);

    Ok((StatusCode::CREATED, Json(expense)))
}
