//! Flight operations.
//!
//! [`FlightService`] owns the business rules: timestamp parsing, not-found
//! handling and the order of checks on update. It talks to the store only
//! through single-statement calls and performs no retries; a store failure
//! surfaces to the caller as-is.

use tracing::{debug, error, info, warn};

use crate::error::{Error, Result};
use crate::flight::{CheapFlight, Flight, FlightPatch, NewFlight};
use crate::query::{CheapestArrivalSearch, FlightSearch};
use crate::storage::Storage;

/// The flight catalog's operations over a shared store handle.
#[derive(Debug)]
pub struct FlightService {
    storage: Storage,
}

impl FlightService {
    /// Create a service over an opened store.
    #[must_use]
    pub fn new(storage: Storage) -> Self {
        Self { storage }
    }

    /// The underlying store.
    #[must_use]
    pub fn storage(&self) -> &Storage {
        &self.storage
    }

    /// Every flight, unfiltered.
    ///
    /// # Errors
    ///
    /// Returns an error if the store fails.
    pub fn list_all(&self) -> Result<Vec<Flight>> {
        debug!("Fetching all flights");
        self.storage.list_all().inspect_err(|e| {
            error!("Error fetching flights: {e}");
        })
    }

    /// Flights matching every supplied filter. No filters means all flights.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidInput`] if a day filter does not parse, or a
    /// store error.
    pub fn search(&self, search: &FlightSearch) -> Result<Vec<Flight>> {
        let query = search.to_query().inspect_err(|e| {
            warn!("Rejected flight search: {e}");
        })?;
        let flights = self.storage.query(&query)?;
        debug!("Flight search result count: {}", flights.len());
        Ok(flights)
    }

    /// The flight with the given id.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotFound`] if no flight has that id, or a store error.
    pub fn get(&self, id: i64) -> Result<Flight> {
        match self.storage.get(id)? {
            Some(flight) => {
                debug!("Flight fetched: {}", id);
                Ok(flight)
            }
            None => {
                error!("Flight not found: {}", id);
                Err(Error::not_found(id))
            }
        }
    }

    /// Validate and persist a new flight, returning it with its new id.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidInput`] if a timestamp does not parse or a
    /// field fails validation; nothing is stored in that case.
    pub fn create(&self, request: NewFlight) -> Result<Flight> {
        let record = request.validate().inspect_err(|e| {
            warn!("Rejected flight creation: {e}");
        })?;
        let id = self.storage.insert(&record)?;
        let flight = record.with_id(id);
        debug!("Flight created: {} ({})", flight.name, flight.id);
        Ok(flight)
    }

    /// Apply a partial update to an existing flight.
    ///
    /// The flight is fetched first, so a missing id fails before anything
    /// else. The whole patch is then validated; if any value is rejected the
    /// stored flight is left untouched.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotFound`] if no flight has that id (including when
    /// it is deleted between the fetch and the write), [`Error::InvalidInput`]
    /// if the patch is rejected, or a store error.
    pub fn update(&self, id: i64, patch: &FlightPatch) -> Result<Flight> {
        let current = self.get(id)?;
        let updated = patch.apply(&current).inspect_err(|e| {
            warn!("Rejected update for flight {id}: {e}");
        })?;

        if !self.storage.update(&updated)? {
            error!("Flight not found: {}", id);
            return Err(Error::not_found(id));
        }
        info!("Flight updated: {}", id);
        Ok(updated)
    }

    /// Delete a flight.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotFound`] if the store reports no row deleted, or a
    /// store error.
    pub fn delete(&self, id: i64) -> Result<()> {
        if !self.storage.delete(id)? {
            error!("Flight not found: {}", id);
            return Err(Error::not_found(id));
        }
        info!("Flight deleted: {}", id);
        Ok(())
    }

    /// The cheapest flight arriving on the requested day that matches the
    /// other supplied filters.
    ///
    /// Returns `Ok(None)` without querying when no filter is supplied, and
    /// `Ok(None)` when nothing matches.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidInput`] if the arrival day does not parse, or a
    /// store error.
    pub fn cheapest_arrival(&self, search: &CheapestArrivalSearch) -> Result<Option<CheapFlight>> {
        let Some(query) = search.to_query().inspect_err(|e| {
            warn!("Rejected cheapest-arrival search: {e}");
        })?
        else {
            debug!("Cheapest-arrival search without filters");
            return Ok(None);
        };

        let cheapest = self.storage.query_cheapest(&query)?;
        debug!("Cheapest-arrival search matched: {}", cheapest.is_some());
        Ok(cheapest)
    }
}
