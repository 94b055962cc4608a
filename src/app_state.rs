//! Implements a struct that holds the state of the REST server.

use std::sync::{Arc, Mutex};

use axum::extract::FromRef;
use rusqlite::Connection;

use crate::{Error, db::initialize, metrics::Metrics};

/// The state of the REST server.
///
/// It is created once at startup and handed to the router, handlers get the
/// parts they need through [FromRef].
#[derive(Debug, Clone)]
pub struct AppState {
    /// The database connection
    pub db_connection: Arc<Mutex<Connection>>,

    /// The counters exported on the metrics route.
    pub metrics: Metrics,
}

impl AppState {
    /// Create a new [AppState] with a SQLite database connection.
    ///
    /// This function will initialize the database by adding the tables for the domain models,
    /// migrating any existing data to the current schema.
    ///
    /// # Errors
    /// Returns an error if the database cannot be initialized or the metrics cannot be registered.
    pub fn new(db_connection: Connection) -> Result<Self, Error> {
        initialize(&db_connection)?;

        Ok(Self {
            db_connection: Arc::new(Mutex::new(db_connection)),
            metrics: Metrics::new()?,
        })
    }
}

impl FromRef<AppState> for Metrics {
    fn from_ref(state: &AppState) -> Self {
        state.metrics.clone()
    }
}
