//! `flightcatalog` - A small catalog service for flight records
//!
//! This library provides the flight record model, search filters, SQLite-backed
//! storage and the HTTP surface used by the `flightcat` binary.

#![warn(missing_docs)]
#![warn(missing_debug_implementations)]
#![deny(unsafe_code)]

pub mod cli;
pub mod config;
pub mod error;
pub mod flight;
pub mod http;
pub mod logging;
pub mod query;
pub mod service;
pub mod storage;

pub use config::Config;
pub use error::{Error, Result};
pub use flight::{CheapFlight, Flight, FlightPatch, NewFlight};
pub use logging::init_logging;
pub use query::{CheapestArrivalSearch, FlightSearch};
pub use service::FlightService;
pub use storage::Storage;
