//! Storage layer for flightcatalog.
//!
//! This module provides the `SQLite`-backed flight record store. Every public
//! operation is a single statement, so each write is its own atomic unit.

pub mod migrations;
pub mod schema;

use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};

use chrono::{DateTime, Utc};
use rusqlite::types::Type;
use rusqlite::{params, params_from_iter, Connection, OptionalExtension};
use tracing::{debug, info};

use crate::error::{Error, Result};
use crate::flight::{format_timestamp, CheapFlight, Flight, NewFlightRecord};
use crate::query::FlightQuery;

use schema::FLIGHT_COLUMNS;

/// Storage engine for flight records.
///
/// Holds one connection behind a mutex. Callers share a single `Storage`
/// (typically through an `Arc`) for the life of the process.
#[derive(Debug)]
pub struct Storage {
    /// Path to the database file.
    path: PathBuf,
    /// Database connection.
    conn: Mutex<Connection>,
}

impl Storage {
    /// Open or create a storage database at the given path.
    ///
    /// Creates the parent directories and database file if they don't exist.
    /// Initializes the schema if this is a new database.
    ///
    /// # Errors
    ///
    /// Returns an error if the database cannot be opened or schema initialization fails.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();

        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                std::fs::create_dir_all(parent).map_err(|source| Error::DirectoryCreate {
                    path: parent.to_path_buf(),
                    source,
                })?;
            }
        }

        debug!("Opening database at {}", path.display());
        let conn = Connection::open(&path).map_err(|source| Error::DatabaseOpen {
            path: path.clone(),
            source,
        })?;

        conn.execute_batch("PRAGMA journal_mode=WAL; PRAGMA synchronous=NORMAL;")?;
        migrations::initialize_schema(&conn)?;

        info!("Database opened successfully at {}", path.display());
        Ok(Self {
            path,
            conn: Mutex::new(conn),
        })
    }

    /// Create an in-memory storage instance for testing.
    ///
    /// # Errors
    ///
    /// Returns an error if the in-memory database cannot be created.
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory().map_err(|source| Error::DatabaseOpen {
            path: PathBuf::from(":memory:"),
            source,
        })?;

        migrations::initialize_schema(&conn)?;

        Ok(Self {
            path: PathBuf::from(":memory:"),
            conn: Mutex::new(conn),
        })
    }

    /// Get the path to the database file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn conn(&self) -> Result<MutexGuard<'_, Connection>> {
        self.conn.lock().map_err(|_| Error::StoreLock)
    }

    /// Insert a flight and return the id the store assigned to it.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn insert(&self, flight: &NewFlightRecord) -> Result<i64> {
        let conn = self.conn()?;
        conn.execute(
            r"
            INSERT INTO flights
                (name, start_destination, end_destination, location_type,
                 depart_time, arrive_time, price)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
            ",
            params![
                flight.name,
                flight.start_destination,
                flight.end_destination,
                flight.location_type,
                format_timestamp(&flight.depart_time),
                format_timestamp(&flight.arrive_time),
                flight.price,
            ],
        )?;

        let id = conn.last_insert_rowid();
        debug!("Inserted flight with id {}", id);
        Ok(id)
    }

    /// Get a flight by its ID.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn get(&self, id: i64) -> Result<Option<Flight>> {
        let conn = self.conn()?;
        let flight = conn
            .query_row(
                &format!("SELECT {FLIGHT_COLUMNS} FROM flights WHERE id = ?1"),
                [id],
                Self::row_to_flight,
            )
            .optional()?;
        Ok(flight)
    }

    /// Get every flight in insertion order.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn list_all(&self) -> Result<Vec<Flight>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(&format!(
            "SELECT {FLIGHT_COLUMNS} FROM flights ORDER BY id ASC"
        ))?;
        let flights = stmt
            .query_map([], Self::row_to_flight)?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(flights)
    }

    /// Run a compiled flight search.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn query(&self, query: &FlightQuery) -> Result<Vec<Flight>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(query.sql())?;
        let flights = stmt
            .query_map(params_from_iter(query.params()), Self::row_to_flight)?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(flights)
    }

    /// Run a compiled cheapest-arrival search.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn query_cheapest(&self, query: &FlightQuery) -> Result<Option<CheapFlight>> {
        let conn = self.conn()?;
        let cheapest = conn
            .query_row(
                query.sql(),
                params_from_iter(query.params()),
                Self::row_to_cheap_flight,
            )
            .optional()?;
        Ok(cheapest)
    }

    /// Overwrite every stored field of `flight`, addressed by its id.
    ///
    /// Returns `true` if a row was updated, `false` if the id does not exist.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn update(&self, flight: &Flight) -> Result<bool> {
        let conn = self.conn()?;
        let affected = conn.execute(
            r"
            UPDATE flights SET
                name = ?1, start_destination = ?2, end_destination = ?3,
                location_type = ?4, depart_time = ?5, arrive_time = ?6, price = ?7
            WHERE id = ?8
            ",
            params![
                flight.name,
                flight.start_destination,
                flight.end_destination,
                flight.location_type,
                format_timestamp(&flight.depart_time),
                format_timestamp(&flight.arrive_time),
                flight.price,
                flight.id,
            ],
        )?;
        Ok(affected > 0)
    }

    /// Delete a flight by ID.
    ///
    /// Returns `true` if a flight was deleted, `false` if not found.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn delete(&self, id: i64) -> Result<bool> {
        let affected = self
            .conn()?
            .execute("DELETE FROM flights WHERE id = ?1", [id])?;
        Ok(affected > 0)
    }

    /// Count total flights in storage.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn count(&self) -> Result<i64> {
        let count: i64 = self
            .conn()?
            .query_row("SELECT COUNT(*) FROM flights", [], |row| row.get(0))?;
        Ok(count)
    }

    fn row_to_flight(row: &rusqlite::Row) -> rusqlite::Result<Flight> {
        Ok(Flight {
            id: row.get(0)?,
            name: row.get(1)?,
            start_destination: row.get(2)?,
            end_destination: row.get(3)?,
            location_type: row.get(4)?,
            depart_time: timestamp_column(row, 5)?,
            arrive_time: timestamp_column(row, 6)?,
            price: row.get(7)?,
        })
    }

    fn row_to_cheap_flight(row: &rusqlite::Row) -> rusqlite::Result<CheapFlight> {
        Ok(CheapFlight {
            name: row.get(0)?,
            price: row.get(1)?,
            arrive_time: timestamp_column(row, 2)?,
        })
    }
}

/// Decode a stored timestamp column, surfacing bad text as a conversion error.
fn timestamp_column(row: &rusqlite::Row, idx: usize) -> rusqlite::Result<DateTime<Utc>> {
    let text: String = row.get(idx)?;
    DateTime::parse_from_rfc3339(&text)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e)))
}
