//! Expense creation endpoint.

use std::sync::{Arc, Mutex};

use axum::{
    Form,
    extract::{FromRef, State, rejection::FormRejection},
    response::{IntoResponse, Redirect, Response},
};
use rusqlite::Connection;

use crate::{
    AppState, Error, endpoints,
    expense::{ExpenseForm, create_expense, validate_expense_form},
    metrics::Metrics,
};

/// The state needed for creating an expense.
#[derive(Debug, Clone)]
pub struct CreateExpenseState {
    pub db_connection: Arc<Mutex<Connection>>,
    pub metrics: Metrics,
}

impl FromRef<AppState> for CreateExpenseState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
            metrics: state.metrics.clone(),
        }
    }
}

/// Handle the add expense form, redirecting to the expenses page on success.
///
/// Only successful creates are counted in `data_entries_total`.
pub async fn create_expense_endpoint(
    State(state): State<CreateExpenseState>,
    form: Result<Form<ExpenseForm>, FormRejection>,
) -> Response {
    let new_expense = match validate_expense_form(form) {
        Ok(new_expense) => new_expense,
        Err(error) => {
            tracing::debug!("Rejected new expense: {error}");
            return error.into_response();
        }
    };

    let connection = match state.db_connection.lock() {
        Ok(connection) => connection,
        Err(error) => {
            tracing::error!("could not acquire database lock: {error}");
            return Error::DatabaseLockError.into_response();
        }
    };

    match create_expense(new_expense, &connection) {
        Ok(expense) => {
            state.metrics.record_data_entry();
            tracing::debug!("Created expense {}", expense.id);
            Redirect::to(endpoints::ROOT).into_response()
        }
        Err(error) => {
            tracing::error!("An unexpected error occurred while creating an expense: {error}");
            error.into_response()
        }
    }
}
