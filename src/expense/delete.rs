//! Expense deletion endpoint.

use std::sync::{Arc, Mutex};

use axum::{
    Json,
    extract::{FromRef, Path, State},
};
use rusqlite::Connection;
use serde_json::{Value, json};

use crate::{
    AppState, Error,
    expense::{delete_expense, get_expense, parse_expense_id},
};

/// The state needed for deleting an expense.
#[derive(Debug, Clone)]
pub struct DeleteExpenseState {
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for DeleteExpenseState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// Handle expense deletion. Responds with a confirmation message.
pub async fn delete_expense_endpoint(
    Path(raw_id): Path<String>,
    State(state): State<DeleteExpenseState>,
) -> Result<Json<Value>, Error> {
    let expense_id = parse_expense_id(&raw_id)?;

    let connection = state
        .db_connection
        .lock()
        .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
        .map_err(|_| Error::DatabaseLockError)?;

    get_expense(expense_id, &connection)?;

    match delete_expense(expense_id, &connection) {
        Ok(()) => Ok(Json(json!({ "message": "Expense deleted successfully" }))),
        Err(Error::DeleteMissingExpense) => Err(Error::DeleteMissingExpense),
        Err(error) => {
            tracing::error!(
                "An unexpected error occurred while deleting expense {expense_id}: {error}"
            );
            Err(error)
        }
    }
}
