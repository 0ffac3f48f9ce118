//! `SQLite` schema definitions for flightcatalog.
//!
//! This module contains the SQL statements for creating and managing
//! the database schema.

/// SQL statement to create the flights table.
///
/// Timestamps are stored as fixed-width RFC 3339 UTC text with microsecond
/// precision, so range comparisons on the text are chronological.
pub const CREATE_FLIGHTS_TABLE: &str = r"
CREATE TABLE IF NOT EXISTS flights (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    name TEXT NOT NULL,
    start_destination TEXT NOT NULL,
    end_destination TEXT NOT NULL,
    location_type TEXT NOT NULL,
    depart_time TEXT NOT NULL,
    arrive_time TEXT NOT NULL,
    price REAL NOT NULL
)
";

/// SQL statement to create an index on `depart_time` for day-range queries.
pub const CREATE_DEPART_TIME_INDEX: &str = r"
CREATE INDEX IF NOT EXISTS idx_flights_depart_time ON flights(depart_time)
";

/// SQL statement to create an index on `arrive_time` for the cheapest-arrival search.
pub const CREATE_ARRIVE_TIME_INDEX: &str = r"
CREATE INDEX IF NOT EXISTS idx_flights_arrive_time ON flights(arrive_time, price)
";

/// SQL statement to create the metadata table for storing key-value pairs.
pub const CREATE_METADATA_TABLE: &str = r"
CREATE TABLE IF NOT EXISTS metadata (
    key TEXT PRIMARY KEY,
    value TEXT NOT NULL
)
";

/// All schema creation statements in order.
pub const SCHEMA_STATEMENTS: &[&str] = &[
    CREATE_FLIGHTS_TABLE,
    CREATE_DEPART_TIME_INDEX,
    CREATE_ARRIVE_TIME_INDEX,
    CREATE_METADATA_TABLE,
];

/// Column list selected for a full flight, in `row_to_flight` order.
pub const FLIGHT_COLUMNS: &str =
    "id, name, start_destination, end_destination, location_type, depart_time, arrive_time, price";

/// Column list selected for the cheapest-arrival projection.
pub const CHEAP_FLIGHT_COLUMNS: &str = "name, price, arrive_time";
