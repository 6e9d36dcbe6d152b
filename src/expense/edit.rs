//! Expense update endpoint.

use std::sync::{Arc, Mutex};

use axum::{
    Json,
    extract::{FromRef, Path, State, rejection::JsonRejection},
};
use rusqlite::Connection;

use crate::{
    AppState, Error,
    expense::{Expense, ExpenseData, get_expense, parse_expense_id, update_expense},
};

/// The state needed for updating an expense.
#[derive(Debug, Clone)]
pub struct UpdateExpenseState {
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for UpdateExpenseState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// Overwrite an existing expense with the JSON body and respond with the result.
///
/// The ID is checked before the body, so a request for a missing expense is
/// answered with 404 even if its body is also invalid.
pub async fn update_expense_endpoint(
    Path(raw_id): Path<String>,
    State(state): State<UpdateExpenseState>,
    payload: Result<Json<ExpenseData>, JsonRejection>,
) -> Result<Json<Expense>, Error> {
    let expense_id = parse_expense_id(&raw_id)?;

    let connection = state
        .db_connection
        .lock()
        .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
        .map_err(|_| Error::DatabaseLockError)?;

    let existing = get_expense(expense_id, &connection)?;

    let Json(expense_data) =
        payload.map_err(|rejection| Error::InvalidBody(rejection.body_text()))?;
    let expense = expense_data.apply_to(existing)?;

    match update_expense(&expense, &connection) {
        Ok(()) => Ok(Json(expense)),
        Err(Error::UpdateMissingExpense) => Err(Error::UpdateMissingExpense),
        Err(error) => {
            tracing::error!(
                "An unexpected error occurred while updating expense {expense_id}: {error}"
            );
            Err(error)
        }
    }
}
