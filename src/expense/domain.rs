//! Core expense domain types.

use axum::extract::rejection::FormRejection;
use serde::{Deserialize, Serialize};

use crate::{Error, money::MinorUnits};

/// Database identifier for an expense.
pub type ExpenseId = i64;

/// A recorded expense, e.g. 'Coffee' in 'Food' for 3.50.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Expense {
    /// Assigned by the database when the expense is created.
    pub id: ExpenseId,
    /// What was bought. May be empty.
    pub name: String,
    /// A free-form grouping such as 'Food'. May be empty.
    pub category: String,
    /// The amount paid, negative for refunds.
    pub price: MinorUnits,
}

/// The fields of an expense that are supplied by the user.
///
/// Create and update always supply all three fields.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewExpense {
    #[allow(missing_docs)]
    pub name: String,
    #[allow(missing_docs)]
    pub category: String,
    /// The amount paid, already converted to minor units.
    pub price: MinorUnits,
}

/// The maximum number of characters in an expense's name or category.
pub const MAX_TEXT_LENGTH: usize = 50;

/// Form data for expense creation and editing.
///
/// `price` is the major-unit amount as typed by the user, e.g. "12.50".
#[derive(Debug, Clone, Serialize, Deserialize)]
#[allow(missing_docs)]
pub struct ExpenseForm {
    pub name: String,
    pub category: String,
    pub price: String,
}

impl TryFrom<ExpenseForm> for NewExpense {
    type Error = Error;

    /// Validate the form, converting the price to minor units.
    ///
    /// Empty names and categories are accepted, but neither may be longer than
    /// [MAX_TEXT_LENGTH] characters.
    fn try_from(form: ExpenseForm) -> Result<Self, Self::Error> {
        check_length("name", &form.name)?;
        check_length("category", &form.category)?;
        let price = form.price.parse()?;

        Ok(Self {
            name: form.name,
            category: form.category,
            price,
        })
    }
}

fn check_length(field: &str, value: &str) -> Result<(), Error> {
    if value.chars().count() > MAX_TEXT_LENGTH {
        return Err(Error::InvalidInput(format!(
            "{field} must be at most {MAX_TEXT_LENGTH} characters"
        )));
    }

    Ok(())
}

/// Turn the result of the `Form` extractor into a validated [NewExpense].
///
/// # Errors
///
/// Returns [Error::InvalidInput] if a field is missing from the form, the name
/// or category is too long, or the price is not a number.
pub fn validate_expense_form(
    form: Result<axum::Form<ExpenseForm>, FormRejection>,
) -> Result<NewExpense, Error> {
    let axum::Form(form) = form.map_err(|rejection| Error::InvalidInput(rejection.body_text()))?;

    NewExpense::try_from(form)
}
