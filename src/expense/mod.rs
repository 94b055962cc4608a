//! Expense tracking: the ledger of recorded expenses and the pages and
//! endpoints for managing them.

mod create;
mod db;
mod delete;
mod domain;
mod edit;
mod list;

pub use create::create_expense_endpoint;
pub use db::{
    ExpenseList, create_expense, create_expense_table, delete_expense, get_expense,
    list_expenses, update_expense,
};
pub use delete::{delete_expense_endpoint, get_delete_expense_page};
pub use domain::{
    Expense, ExpenseForm, ExpenseId, MAX_TEXT_LENGTH, NewExpense, validate_expense_form,
};
pub use edit::{UpdateResponse, get_edit_expense_page, update_expense_endpoint};
pub use list::get_expenses_page;
