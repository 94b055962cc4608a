//! Expense deletion confirmation page and endpoint.

use std::sync::{Arc, Mutex};

use axum::{
    extract::{FromRef, Path, State},
    response::{IntoResponse, Redirect, Response},
};
use maud::{Markup, html};
use rusqlite::Connection;

use crate::{
    AppState, Error, endpoints,
    expense::{Expense, ExpenseId, delete_expense, get_expense},
    html::{BUTTON_DELETE_STYLE, FORM_CONTAINER_STYLE, base, link},
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

/// Ask the user to confirm deleting an expense.
pub async fn get_delete_expense_page(
    Path(expense_id): Path<ExpenseId>,
    State(state): State<DeleteExpenseState>,
) -> Result<Response, Error> {
    let connection = state
        .db_connection
        .lock()
        .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
        .map_err(|_| Error::DatabaseLockError)?;

    let expense = get_expense(expense_id, &connection)?;

    Ok(delete_expense_view(&expense).into_response())
}

/// Delete an expense and redirect to the expenses page.
pub async fn delete_expense_endpoint(
    Path(expense_id): Path<ExpenseId>,
    State(state): State<DeleteExpenseState>,
) -> Result<Redirect, Error> {
    let connection = state
        .db_connection
        .lock()
        .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
        .map_err(|_| Error::DatabaseLockError)?;

    delete_expense(expense_id, &connection).inspect_err(|error| match error {
        Error::NotFound => tracing::debug!("Tried to delete missing expense {expense_id}"),
        error => tracing::error!(
            "An unexpected error occurred while deleting expense {expense_id}: {error}"
        ),
    })?;

    Ok(Redirect::to(endpoints::ROOT))
}

fn delete_expense_view(expense: &Expense) -> Markup {
    let delete_endpoint = endpoints::format_endpoint(endpoints::DELETE_EXPENSE, expense.id);

    let content = html! {
        div class=(FORM_CONTAINER_STYLE)
        {
            h1 class="mb-4 text-2xl font-bold" { "Delete Expense" }

            p class="mb-4"
            {
                "Are you sure you want to delete "
                strong { (expense.name) }
                " (" (expense.category) ") for "
                strong id="price" { (expense.price) }
                "? This cannot be undone."
            }

            form method="post" action=(delete_endpoint) class="w-full space-y-4"
            {
                button type="submit" class=(BUTTON_DELETE_STYLE) { "Delete" }
            }

            p class="mt-4" { (link(endpoints::ROOT, "Cancel")) }
        }
    };

    base("Delete Expense", &[], &content)
}
