//! Expense editing page and endpoint.
//!
//! Unlike the other expense endpoints, the update endpoint answers with a
//! JSON acknowledgement and reports store failures in the payload.

use std::sync::{Arc, Mutex};

use axum::{
    Form, Json,
    extract::{
        FromRef, Path, State,
        rejection::{FormRejection, PathRejection},
    },
    http::StatusCode,
    response::{IntoResponse, Response},
};
use maud::{Markup, PreEscaped, html};
use rusqlite::Connection;
use serde::{Deserialize, Serialize};

use crate::{
    AppState, Error, endpoints,
    expense::{
        Expense, ExpenseForm, ExpenseId, MAX_TEXT_LENGTH, get_expense, update_expense,
        validate_expense_form,
    },
    html::{
        BUTTON_PRIMARY_STYLE, FORM_CONTAINER_STYLE, FORM_LABEL_STYLE, FORM_TEXT_INPUT_STYLE,
        HeadElement, base,
    },
};

/// The state needed for the edit expense page and the update endpoint.
#[derive(Debug, Clone)]
pub struct EditExpenseState {
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for EditExpenseState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// The acknowledgement returned by [update_expense_endpoint].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpdateResponse {
    /// Whether the expense was saved.
    pub success: bool,
    /// Why the expense was not saved, omitted on success.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl UpdateResponse {
    fn success() -> Self {
        Self {
            success: true,
            error: None,
        }
    }

    fn failure(error: impl ToString) -> Self {
        Self {
            success: false,
            error: Some(error.to_string()),
        }
    }
}

/// Render the form for editing an expense.
pub async fn get_edit_expense_page(
    Path(expense_id): Path<ExpenseId>,
    State(state): State<EditExpenseState>,
) -> Result<Response, Error> {
    let connection = state
        .db_connection
        .lock()
        .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
        .map_err(|_| Error::DatabaseLockError)?;

    let expense = get_expense(expense_id, &connection)?;

    Ok(edit_expense_view(&expense).into_response())
}

/// Handle the edit expense form.
///
/// Responds with `{"success": true}` when the expense was replaced, otherwise
/// `{"success": false, "error": ...}` with a 400, 404 or 500 status code.
pub async fn update_expense_endpoint(
    expense_id: Result<Path<ExpenseId>, PathRejection>,
    State(state): State<EditExpenseState>,
    form: Result<Form<ExpenseForm>, FormRejection>,
) -> Response {
    let expense_id = match expense_id {
        Ok(Path(expense_id)) => expense_id,
        Err(rejection) => {
            return (
                StatusCode::BAD_REQUEST,
                Json(UpdateResponse::failure(rejection.body_text())),
            )
                .into_response();
        }
    };

    let new_expense = match validate_expense_form(form) {
        Ok(new_expense) => new_expense,
        Err(error) => {
            return (StatusCode::BAD_REQUEST, Json(UpdateResponse::failure(error))).into_response();
        }
    };

    let connection = match state.db_connection.lock() {
        Ok(connection) => connection,
        Err(error) => {
            tracing::error!("could not acquire database lock: {error}");
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(UpdateResponse::failure(Error::DatabaseLockError)),
            )
                .into_response();
        }
    };

    match update_expense(expense_id, new_expense, &connection) {
        Ok(_) => Json(UpdateResponse::success()).into_response(),
        Err(Error::NotFound) => (
            StatusCode::NOT_FOUND,
            Json(UpdateResponse::failure(format!(
                "expense {expense_id} could not be found"
            ))),
        )
            .into_response(),
        Err(error) => {
            tracing::error!(
                "An unexpected error occurred while updating expense {expense_id}: {error}"
            );
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(UpdateResponse::failure("could not save the expense")),
            )
                .into_response()
        }
    }
}

fn edit_expense_view(expense: &Expense) -> Markup {
    let update_endpoint = endpoints::format_endpoint(endpoints::UPDATE_EXPENSE, expense.id);
    let form = edit_expense_form_view(&update_endpoint, expense);

    let content = html! {
        div class=(FORM_CONTAINER_STYLE)
        {
            h1 class="mb-4 text-2xl font-bold" { "Edit Expense" }
            (form)
        }
    };

    base("Edit Expense", &[submit_as_fetch_script()], &content)
}

fn edit_expense_form_view(update_endpoint: &str, expense: &Expense) -> Markup {
    html! {
        form
            id="edit-expense-form"
            method="post"
            action=(update_endpoint)
            class="w-full space-y-4 md:space-y-6"
        {
            div
            {
                label for="name" class=(FORM_LABEL_STYLE) { "Name" }

                input
                    id="name"
                    type="text"
                    name="name"
                    maxlength=(MAX_TEXT_LENGTH)
                    value=(expense.name)
                    required
                    autofocus
                    class=(FORM_TEXT_INPUT_STYLE);
            }

            div
            {
                label for="category" class=(FORM_LABEL_STYLE) { "Category" }

                input
                    id="category"
                    type="text"
                    name="category"
                    maxlength=(MAX_TEXT_LENGTH)
                    value=(expense.category)
                    required
                    class=(FORM_TEXT_INPUT_STYLE);
            }

            div
            {
                label for="price" class=(FORM_LABEL_STYLE) { "Price" }

                input
                    id="price"
                    type="number"
                    name="price"
                    step="any"
                    value=(expense.price)
                    required
                    class=(FORM_TEXT_INPUT_STYLE);
            }

            p id="error-message" class="text-red-600" {}

            button type="submit" class=(BUTTON_PRIMARY_STYLE) { "Update Expense" }
        }
    }
}

/// Submits the edit form in the background and returns to the expenses page
/// once the server acknowledges the update.
fn submit_as_fetch_script() -> HeadElement {
    HeadElement::ScriptSource(PreEscaped(format!(
        r#"
        document.addEventListener("DOMContentLoaded", () => {{
            const form = document.getElementById("edit-expense-form");
            const errorMessage = document.getElementById("error-message");

            form.addEventListener("submit", async (event) => {{
                event.preventDefault();
                errorMessage.textContent = "";

                try {{
                    const response = await fetch(form.action, {{
                        method: "POST",
                        body: new URLSearchParams(new FormData(form)),
                    }});
                    const result = await response.json();

                    if (result.success) {{
                        window.location.href = "{root}";
                    }} else {{
                        errorMessage.textContent = result.error;
                    }}
                }} catch (error) {{
                    errorMessage.textContent = "Could not reach the server.";
                }}
            }});
        }});
        "#,
        root = endpoints::ROOT
    )))
}
