//! The expenses page: every expense, the running total and the form for adding an expense.

use std::sync::{Arc, Mutex};

use axum::{
    extract::{FromRef, State},
    response::{IntoResponse, Response},
};
use maud::{Markup, html};
use rusqlite::Connection;

use crate::{
    AppState, Error,
    endpoints::{self, format_endpoint},
    expense::{ExpenseList, MAX_TEXT_LENGTH, list_expenses},
    html::{
        BUTTON_PRIMARY_STYLE, FORM_LABEL_STYLE, FORM_TEXT_INPUT_STYLE, PAGE_CONTAINER_STYLE,
        TABLE_CELL_STYLE, TABLE_HEADER_STYLE, TABLE_ROW_STYLE, base, link,
    },
};

/// The state needed for the expenses page.
#[derive(Debug, Clone)]
pub struct ExpensesPageState {
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for ExpensesPageState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// Render the list of expenses with their total.
pub async fn get_expenses_page(
    State(state): State<ExpensesPageState>,
) -> Result<Response, Error> {
    let connection = state
        .db_connection
        .lock()
        .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
        .map_err(|_| Error::DatabaseLockError)?;

    let expense_list = list_expenses(&connection)
        .inspect_err(|error| tracing::error!("could not list expenses: {error}"))?;

    Ok(expenses_view(&expense_list).into_response())
}

fn expenses_view(expense_list: &ExpenseList) -> Markup {
    let content = html! {
        div class=(PAGE_CONTAINER_STYLE)
        {
            h1 class="mb-4 text-2xl font-bold" { "Expenses" }

            (add_expense_form_view())

            table class="w-full mt-8 text-sm text-left"
            {
                thead class=(TABLE_HEADER_STYLE)
                {
                    tr
                    {
                        th scope="col" class=(TABLE_CELL_STYLE) { "Name" }
                        th scope="col" class=(TABLE_CELL_STYLE) { "Category" }
                        th scope="col" class=(TABLE_CELL_STYLE) { "Price" }
                        th scope="col" class=(TABLE_CELL_STYLE) { "Actions" }
                    }
                }

                tbody
                {
                    @for expense in &expense_list.expenses
                    {
                        tr class=(TABLE_ROW_STYLE) data-expense-id=(expense.id)
                        {
                            td class=(TABLE_CELL_STYLE) { (expense.name) }
                            td class=(TABLE_CELL_STYLE) { (expense.category) }
                            td class=(TABLE_CELL_STYLE) { (expense.price) }
                            td class=(TABLE_CELL_STYLE)
                            {
                                (link(&format_endpoint(endpoints::UPDATE_EXPENSE, expense.id), "Edit"))
                                " "
                                (link(&format_endpoint(endpoints::DELETE_EXPENSE, expense.id), "Delete"))
                            }
                        }
                    }

                    @if expense_list.expenses.is_empty()
                    {
                        tr class=(TABLE_ROW_STYLE)
                        {
                            td colspan="4" class=(TABLE_CELL_STYLE) { "No expenses recorded yet." }
                        }
                    }
                }

                tfoot
                {
                    tr class="font-semibold"
                    {
                        th scope="row" colspan="2" class=(TABLE_CELL_STYLE) { "Total" }
                        td id="total" class=(TABLE_CELL_STYLE) { (expense_list.total) }
                        td {}
                    }
                }
            }
        }
    };

    base("Expenses", &[], &content)
}

fn add_expense_form_view() -> Markup {
    html! {
        form
            method="post"
            action=(endpoints::ADD_EXPENSE)
            class="w-full max-w-md space-y-4"
        {
            div
            {
                label for="name" class=(FORM_LABEL_STYLE) { "Name" }

                input
                    id="name"
                    type="text"
                    name="name"
                    maxlength=(MAX_TEXT_LENGTH)
                    placeholder="Coffee"
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
                    placeholder="Food"
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
                    placeholder="0.00"
                    required
                    class=(FORM_TEXT_INPUT_STYLE);
            }

            button type="submit" class=(BUTTON_PRIMARY_STYLE) { "Add Expense" }
        }
    }
}
