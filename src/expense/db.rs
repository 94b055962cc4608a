//! Database operations for expenses.
//!
//! Each operation is a single-row statement. Two updates to the same expense
//! race with last-writer-wins semantics, there is no version check.

use rusqlite::{Connection, Row};

use crate::{
    Error,
    expense::{Expense, ExpenseId, NewExpense},
    money::MinorUnits,
};

/// All expenses and the sum of their prices.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExpenseList {
    /// The expenses in the order they were created.
    pub expenses: Vec<Expense>,
    /// The sum of every expense's price.
    pub total: MinorUnits,
}

/// Create an expense and return it with its generated ID.
pub fn create_expense(new_expense: NewExpense, connection: &Connection) -> Result<Expense, Error> {
    connection.execute(
        "INSERT INTO expense (name, category, price) VALUES (?1, ?2, ?3);",
        (&new_expense.name, &new_expense.category, new_expense.price),
    )?;

    let id = connection.last_insert_rowid();

    Ok(Expense {
        id,
        name: new_expense.name,
        category: new_expense.category,
        price: new_expense.price,
    })
}

/// Retrieve a single expense by ID.
pub fn get_expense(expense_id: ExpenseId, connection: &Connection) -> Result<Expense, Error> {
    connection
        .prepare("SELECT id, name, category, price FROM expense WHERE id = :id;")?
        .query_row(&[(":id", &expense_id)], map_row)
        .map_err(|error| error.into())
}

/// Retrieve all expenses in insertion order along with their total.
///
/// # Errors
///
/// Returns [Error::TotalOutOfRange] if the prices sum to more than an `i64`
/// can hold.
pub fn list_expenses(connection: &Connection) -> Result<ExpenseList, Error> {
    let expenses = connection
        .prepare("SELECT id, name, category, price FROM expense ORDER BY id ASC;")?
        .query_map([], map_row)?
        .map(|maybe_expense| maybe_expense.map_err(Error::from))
        .collect::<Result<Vec<_>, _>>()?;

    let total = expenses
        .iter()
        .try_fold(MinorUnits::ZERO, |total, expense| {
            total.checked_add(expense.price)
        })
        .ok_or(Error::TotalOutOfRange)?;

    Ok(ExpenseList { expenses, total })
}

/// Replace the name, category and price of an expense.
///
/// # Errors
///
/// Returns [Error::NotFound] if there is no expense with `expense_id`, in
/// which case nothing is written.
pub fn update_expense(
    expense_id: ExpenseId,
    new_expense: NewExpense,
    connection: &Connection,
) -> Result<Expense, Error> {
    let rows_affected = connection.execute(
        "UPDATE expense SET name = ?1, category = ?2, price = ?3 WHERE id = ?4",
        (
            &new_expense.name,
            &new_expense.category,
            new_expense.price,
            expense_id,
        ),
    )?;

    if rows_affected == 0 {
        return Err(Error::NotFound);
    }

    Ok(Expense {
        id: expense_id,
        name: new_expense.name,
        category: new_expense.category,
        price: new_expense.price,
    })
}

/// Delete an expense by ID. Returns [Error::NotFound] if the expense doesn't exist.
pub fn delete_expense(expense_id: ExpenseId, connection: &Connection) -> Result<(), Error> {
    let rows_affected = connection.execute("DELETE FROM expense WHERE id = ?1", [expense_id])?;

    if rows_affected == 0 {
        return Err(Error::NotFound);
    }

    Ok(())
}

/// Initialize the expense table.
///
/// IDs use `AUTOINCREMENT` so that the ID of a deleted expense is never handed out again.
pub fn create_expense_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute(
        "CREATE TABLE IF NOT EXISTS expense (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            name TEXT NOT NULL,
            category TEXT NOT NULL,
            price INTEGER NOT NULL
        );",
        (),
    )?;

    Ok(())
}

fn map_row(row: &Row) -> Result<Expense, rusqlite::Error> {
    Ok(Expense {
        id: row.get(0)?,
        name: row.get(1)?,
        category: row.get(2)?,
        price: row.get(3)?,
    })
}
