//! Database initialization and schema migrations.
//!
//! The schema version is stored in SQLite's `user_version` pragma.
//!
//! Version 0 databases may hold an `expense` table from an older release that
//! stored prices as floating-point major units. Those rows are converted to
//! minor units when the database is first opened by this version.

use rusqlite::{Connection, OptionalExtension, Transaction, TransactionBehavior};

use crate::{
    Error,
    expense::create_expense_table,
    money::MinorUnits,
};

/// The schema version written by [initialize].
pub const SCHEMA_VERSION: i64 = 1;

/// Create the app's tables, migrating an older schema if one is found.
///
/// Running this on an up-to-date database does nothing.
///
/// # Errors
///
/// Returns [Error::UnsupportedSchemaVersion] if the database was written by a
/// newer version of the app, [Error::InvalidInput] if a legacy price cannot be
/// converted, or [Error::SqlError] for other SQL errors. The database is left
/// unchanged on error.
pub fn initialize(connection: &Connection) -> Result<(), Error> {
    let transaction = Transaction::new_unchecked(connection, TransactionBehavior::Exclusive)?;

    let version: i64 = transaction.pragma_query_value(None, "user_version", |row| row.get(0))?;

    match version {
        0 => {
            migrate_from_unversioned(&transaction)?;
            transaction.pragma_update(None, "user_version", SCHEMA_VERSION)?;
        }
        SCHEMA_VERSION => {}
        newer => return Err(Error::UnsupportedSchemaVersion(newer)),
    }

    transaction.commit()?;

    Ok(())
}

fn migrate_from_unversioned(connection: &Connection) -> Result<(), Error> {
    let price_type: Option<String> = connection
        .query_row(
            "SELECT type FROM pragma_table_info('expense') WHERE name = 'price'",
            [],
            |row| row.get(0),
        )
        .optional()?;

    let Some(price_type) = price_type else {
        create_expense_table(connection)?;
        return Ok(());
    };

    if price_type.eq_ignore_ascii_case("INTEGER") {
        tracing::info!("Existing expense table already stores minor units");
        return Ok(());
    }

    tracing::info!(
        "Migrating existing expense table (price column type {price_type:?}) to schema version {SCHEMA_VERSION}"
    );

    connection.execute("ALTER TABLE expense RENAME TO expense_legacy;", ())?;
    create_expense_table(connection)?;

    let rows = connection
        .prepare("SELECT id, name, category, price FROM expense_legacy ORDER BY id ASC;")?
        .query_map([], |row| {
            let id: i64 = row.get(0)?;
            let name: String = row.get(1)?;
            let category: String = row.get(2)?;
            let price: f64 = row.get(3)?;

            Ok((id, name, category, price))
        })?
        .collect::<Result<Vec<_>, _>>()?;

    let mut insert = connection
        .prepare("INSERT INTO expense (id, name, category, price) VALUES (?1, ?2, ?3, ?4);")?;

    for (id, name, category, price) in &rows {
        let price = MinorUnits::from_legacy_major(*price).map_err(|error| {
            Error::InvalidInput(format!("could not migrate expense {id}: {error}"))
        })?;

        insert.execute((id, name, category, price))?;
    }

    connection.execute("DROP TABLE expense_legacy;", ())?;

    tracing::info!("Migrated {} expenses", rows.len());

    Ok(())
}
