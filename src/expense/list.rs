//! Expense listing endpoint.

use std::sync::{Arc, Mutex};

use axum::{
    Json,
    extract::{FromRef, Query, State, rejection::QueryRejection},
};
use rusqlite::Connection;

use crate::{
    AppState, Error,
    expense::{DateRange, DateRangeQuery, Expense, get_expenses},
};

/// The state needed for listing expenses.
#[derive(Debug, Clone)]
pub struct ListExpensesState {
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for ListExpensesState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// List expenses, most recent first, optionally limited to a date range.
pub async fn list_expenses_endpoint(
    State(state): State<ListExpensesState>,
    query: Result<Query<DateRangeQuery>, QueryRejection>,
) -> Result<Json<Vec<Expense>>, Error> {
    let Query(query) = query.map_err(|rejection| Error::InvalidQuery(rejection.body_text()))?;
    let date_range = DateRange::try_from(query)?;

    let connection = state
        .db_connection
        .lock()
        .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
        .map_err(|_| Error::DatabaseLockError)?;

    get_expenses(date_range, &connection).map(Json)
}
