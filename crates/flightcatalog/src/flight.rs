//! Core flight types for flightcatalog.
//!
//! This module defines the stored `Flight` entity, the create and patch
//! contracts accepted from callers, the cheapest-arrival projection, and the
//! timestamp parsing rules shared by every operation that takes a time.

use chrono::{
    DateTime, Datelike, Duration, NaiveDate, NaiveDateTime, NaiveTime, SecondsFormat, SubsecRound,
    TimeZone, Utc,
};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Naive date-time layouts accepted in addition to RFC 3339. Interpreted as UTC.
const NAIVE_DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M",
];

/// Date-only layout. Interpreted as midnight UTC.
const DATE_FORMAT: &str = "%Y-%m-%d";

/// A flight as persisted in the catalog.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Flight {
    /// Identifier assigned by the store at creation.
    pub id: i64,
    /// Display label.
    pub name: String,
    /// Origin.
    pub start_destination: String,
    /// Destination.
    pub end_destination: String,
    /// Free-form route classification (e.g. domestic, international).
    pub location_type: String,
    /// Departure instant.
    pub depart_time: DateTime<Utc>,
    /// Arrival instant.
    pub arrive_time: DateTime<Utc>,
    /// Ticket price. No currency is implied.
    pub price: f64,
}

/// Body of a create request. Every field is required.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewFlight {
    /// Display label.
    pub name: String,
    /// Origin.
    pub start_destination: String,
    /// Destination.
    pub end_destination: String,
    /// Route classification.
    pub location_type: String,
    /// Departure time, unparsed.
    pub depart_time: String,
    /// Arrival time, unparsed.
    pub arrive_time: String,
    /// Ticket price.
    pub price: f64,
}

/// A validated flight that has not been assigned an id yet.
#[derive(Debug, Clone, PartialEq)]
pub struct NewFlightRecord {
    /// Display label.
    pub name: String,
    /// Origin.
    pub start_destination: String,
    /// Destination.
    pub end_destination: String,
    /// Route classification.
    pub location_type: String,
    /// Departure instant.
    pub depart_time: DateTime<Utc>,
    /// Arrival instant.
    pub arrive_time: DateTime<Utc>,
    /// Ticket price.
    pub price: f64,
}

impl NewFlight {
    /// Validate the request and parse its timestamps.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidInput`] if the name is blank, the price is not
    /// finite, or either timestamp does not parse.
    pub fn validate(self) -> Result<NewFlightRecord> {
        validate_name(&self.name)?;
        validate_price(self.price)?;
        let depart_time = parse_timestamp("departTime", &self.depart_time)?;
        let arrive_time = parse_timestamp("arriveTime", &self.arrive_time)?;

        Ok(NewFlightRecord {
            name: self.name,
            start_destination: self.start_destination,
            end_destination: self.end_destination,
            location_type: self.location_type,
            depart_time,
            arrive_time,
            price: self.price,
        })
    }
}

impl NewFlightRecord {
    /// Attach the store-assigned id.
    #[must_use]
    pub fn with_id(self, id: i64) -> Flight {
        Flight {
            id,
            name: self.name,
            start_destination: self.start_destination,
            end_destination: self.end_destination,
            location_type: self.location_type,
            depart_time: self.depart_time,
            arrive_time: self.arrive_time,
            price: self.price,
        }
    }
}

/// Body of a partial update.
///
/// Only the fields listed here can be patched; any other key in the request
/// body is rejected during deserialization.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct FlightPatch {
    /// New display label.
    pub name: Option<String>,
    /// New origin.
    pub start_destination: Option<String>,
    /// New destination.
    pub end_destination: Option<String>,
    /// New route classification.
    pub location_type: Option<String>,
    /// New departure time, unparsed.
    pub depart_time: Option<String>,
    /// New arrival time, unparsed.
    pub arrive_time: Option<String>,
    /// New ticket price.
    pub price: Option<f64>,
}

impl FlightPatch {
    /// Returns `true` if the patch changes nothing.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self == &Self::default()
    }

    /// Produce the patched flight without touching `current`.
    ///
    /// Every supplied value is validated before any field is merged, so a
    /// rejected patch never yields a half-updated flight.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidInput`] if a timestamp does not parse, the
    /// name is blank, or the price is not finite.
    pub fn apply(&self, current: &Flight) -> Result<Flight> {
        let depart_time = self
            .depart_time
            .as_deref()
            .map(|value| parse_timestamp("departTime", value))
            .transpose()?;
        let arrive_time = self
            .arrive_time
            .as_deref()
            .map(|value| parse_timestamp("arriveTime", value))
            .transpose()?;
        if let Some(name) = &self.name {
            validate_name(name)?;
        }
        if let Some(price) = self.price {
            validate_price(price)?;
        }

        let mut updated = current.clone();
        if let Some(depart_time) = depart_time {
            updated.depart_time = depart_time;
        }
        if let Some(arrive_time) = arrive_time {
            updated.arrive_time = arrive_time;
        }
        if let Some(name) = &self.name {
            updated.name.clone_from(name);
        }
        if let Some(start) = &self.start_destination {
            updated.start_destination.clone_from(start);
        }
        if let Some(end) = &self.end_destination {
            updated.end_destination.clone_from(end);
        }
        if let Some(location_type) = &self.location_type {
            updated.location_type.clone_from(location_type);
        }
        if let Some(price) = self.price {
            updated.price = price;
        }
        Ok(updated)
    }
}

/// Result of the cheapest-arrival search.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CheapFlight {
    /// Display label of the winning flight.
    pub name: String,
    /// Its price.
    pub price: f64,
    /// Its arrival instant.
    pub arrive_time: DateTime<Utc>,
}

/// An inclusive UTC range covering one calendar day.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DayRange {
    /// First instant of the day.
    pub start: DateTime<Utc>,
    /// Last representable stored instant of the day.
    pub end: DateTime<Utc>,
}

impl DayRange {
    /// The range spanning `day` from 00:00:00.000000 to 23:59:59.999999 UTC.
    #[must_use]
    pub fn for_day(day: NaiveDate) -> Self {
        let start = Utc.from_utc_datetime(&day.and_time(NaiveTime::default()));
        let end = start + Duration::days(1) - Duration::microseconds(1);
        Self { start, end }
    }
}

/// Parse a caller-supplied timestamp.
///
/// Accepts RFC 3339 (`2024-05-01T23:00:00Z`, `2024-05-01T23:00:00+02:00`),
/// a naive date-time (`2024-05-01T23:00:00`, `2024-05-01 23:00`), or a bare
/// date (`2024-05-01`). Values without an offset are read as UTC. Precision
/// beyond microseconds is truncated to match what the store keeps.
///
/// # Errors
///
/// Returns [`Error::InvalidInput`] naming `field` if the value matches none
/// of the accepted layouts or falls outside years 0000 to 9999.
pub fn parse_timestamp(field: &str, input: &str) -> Result<DateTime<Utc>> {
    let value = input.trim();
    let parsed = DateTime::parse_from_rfc3339(value)
        .map(|dt| dt.with_timezone(&Utc))
        .ok()
        .or_else(|| {
            NAIVE_DATETIME_FORMATS
                .iter()
                .find_map(|format| NaiveDateTime::parse_from_str(value, format).ok())
                .map(|naive| Utc.from_utc_datetime(&naive))
        })
        .or_else(|| {
            NaiveDate::parse_from_str(value, DATE_FORMAT)
                .ok()
                .map(|date| Utc.from_utc_datetime(&date.and_time(NaiveTime::default())))
        });

    match parsed {
        Some(ts) if (0..=9999).contains(&ts.year()) => Ok(ts.trunc_subsecs(6)),
        _ => Err(Error::invalid_input(format!("invalid {field}: {input:?}"))),
    }
}

/// Parse a caller-supplied value into the UTC calendar day it names.
///
/// # Errors
///
/// Returns [`Error::InvalidInput`] under the same rules as [`parse_timestamp`].
pub fn parse_day(field: &str, input: &str) -> Result<NaiveDate> {
    parse_timestamp(field, input).map(|ts| ts.date_naive())
}

/// Render a timestamp in the fixed-width form used for storage.
///
/// Every stored value has the same width, so lexical order in the store
/// matches chronological order.
#[must_use]
pub fn format_timestamp(ts: &DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Micros, true)
}

fn validate_name(name: &str) -> Result<()> {
    if name.trim().is_empty() {
        return Err(Error::invalid_input("name must not be empty"));
    }
    Ok(())
}

fn validate_price(price: f64) -> Result<()> {
    if !price.is_finite() {
        return Err(Error::invalid_input(format!("invalid price: {price}")));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn utc(s: &str) -> DateTime<Utc> {
        DateTime::parse_from_rfc3339(s).unwrap().with_timezone(&Utc)
    }

    fn sample_request() -> NewFlight {
        NewFlight {
            name: "AC 123".to_string(),
            start_destination: "New York JFK".to_string(),
            end_destination: "Toronto YYZ".to_string(),
            location_type: "international".to_string(),
            depart_time: "2024-05-01T08:30:00Z".to_string(),
            arrive_time: "2024-05-01T10:05:00Z".to_string(),
            price: 129.5,
        }
    }

    fn sample_flight() -> Flight {
        sample_request().validate().unwrap().with_id(7)
    }

    #[test]
    fn test_parse_rfc3339_with_offset() {
        let ts = parse_timestamp("departTime", "2024-05-01T23:00:00+02:00").unwrap();
        assert_eq!(ts, utc("2024-05-01T21:00:00Z"));
    }

    #[test]
    fn test_parse_naive_datetime_as_utc() {
        let ts = parse_timestamp("departTime", "2024-05-01T23:00:00").unwrap();
        assert_eq!(ts, utc("2024-05-01T23:00:00Z"));

        let ts = parse_timestamp("departTime", "2024-05-01 23:00").unwrap();
        assert_eq!(ts, utc("2024-05-01T23:00:00Z"));

        let ts = parse_timestamp("departTime", "2024-05-01T23:00:00.250").unwrap();
        assert_eq!(ts, utc("2024-05-01T23:00:00.250Z"));
    }

    #[test]
    fn test_parse_truncates_to_microseconds() {
        let ts = parse_timestamp("departTime", "2024-05-01T23:00:00.123456789Z").unwrap();
        assert_eq!(ts, utc("2024-05-01T23:00:00.123456Z"));
    }

    #[test]
    fn test_parse_date_only_is_midnight() {
        let ts = parse_timestamp("arriveTime", " 2024-05-01 ").unwrap();
        assert_eq!(ts, utc("2024-05-01T00:00:00Z"));
    }

    #[test]
    fn test_parse_rejects_garbage() {
        for input in ["", "tomorrow", "2024-13-01", "2024-02-30T10:00:00", "01/05/2024"] {
            let err = parse_timestamp("departTime", input).unwrap_err();
            assert!(err.is_invalid_input(), "accepted {input:?}");
            assert!(err.to_string().contains("departTime"));
        }
    }

    #[test]
    fn test_parse_day_uses_utc_date() {
        let day = parse_day("departTime", "2024-05-01T23:30:00-03:00").unwrap();
        assert_eq!(day, NaiveDate::from_ymd_opt(2024, 5, 2).unwrap());
    }

    #[test]
    fn test_day_range_bounds() {
        let range = DayRange::for_day(NaiveDate::from_ymd_opt(2024, 5, 1).unwrap());
        assert_eq!(range.start, utc("2024-05-01T00:00:00Z"));
        assert_eq!(range.end, utc("2024-05-01T23:59:59.999999Z"));
    }

    #[test]
    fn test_format_timestamp_fixed_width() {
        let a = format_timestamp(&utc("2024-05-01T00:00:00Z"));
        let b = format_timestamp(&utc("2024-05-01T23:00:00.5Z"));
        assert_eq!(a, "2024-05-01T00:00:00.000000Z");
        assert_eq!(a.len(), b.len());
        assert!(a < b);
    }

    #[test]
    fn test_new_flight_validate() {
        let record = sample_request().validate().unwrap();
        assert_eq!(record.depart_time, utc("2024-05-01T08:30:00Z"));
        assert_eq!(record.arrive_time, utc("2024-05-01T10:05:00Z"));
        assert_eq!(record.with_id(3).id, 3);
    }

    #[test]
    fn test_new_flight_rejects_bad_timestamp() {
        let mut request = sample_request();
        request.arrive_time = "not a date".to_string();
        let err = request.validate().unwrap_err();
        assert!(err.is_invalid_input());
        assert!(err.to_string().contains("arriveTime"));
    }

    #[test]
    fn test_new_flight_rejects_blank_name() {
        let mut request = sample_request();
        request.name = "   ".to_string();
        assert!(request.validate().unwrap_err().is_invalid_input());
    }

    #[test]
    fn test_new_flight_deserialize_camel_case() {
        let json = r#"{
            "name": "BA 1",
            "startDestination": "London",
            "endDestination": "Paris",
            "locationType": "international",
            "departTime": "2024-05-01T08:00:00Z",
            "arriveTime": "2024-05-01T09:00:00Z",
            "price": 80
        }"#;
        let request: NewFlight = serde_json::from_str(json).unwrap();
        assert_eq!(request.start_destination, "London");
        assert!((request.price - 80.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_new_flight_missing_field_rejected() {
        let json = r#"{"name": "BA 1", "price": 80}"#;
        assert!(serde_json::from_str::<NewFlight>(json).is_err());
    }

    #[test]
    fn test_patch_merges_supplied_fields() {
        let flight = sample_flight();
        let patch = FlightPatch {
            price: Some(99.0),
            arrive_time: Some("2024-05-01T11:00:00Z".to_string()),
            location_type: Some("charter".to_string()),
            ..FlightPatch::default()
        };

        let updated = patch.apply(&flight).unwrap();
        assert_eq!(updated.id, flight.id);
        assert_eq!(updated.name, flight.name);
        assert_eq!(updated.depart_time, flight.depart_time);
        assert_eq!(updated.arrive_time, utc("2024-05-01T11:00:00Z"));
        assert_eq!(updated.location_type, "charter");
        assert!((updated.price - 99.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_patch_invalid_timestamp_applies_nothing() {
        let flight = sample_flight();
        let patch = FlightPatch {
            name: Some("renamed".to_string()),
            depart_time: Some("2024-05-02T08:00:00Z".to_string()),
            arrive_time: Some("soon".to_string()),
            ..FlightPatch::default()
        };

        let err = patch.apply(&flight).unwrap_err();
        assert!(err.is_invalid_input());
        assert!(err.to_string().contains("arriveTime"));
        assert_eq!(flight, sample_flight());
    }

    #[test]
    fn test_patch_rejects_unknown_keys() {
        let result = serde_json::from_str::<FlightPatch>(r#"{"price": 10, "id": 99}"#);
        assert!(result.is_err());

        let result = serde_json::from_str::<FlightPatch>(r#"{"seats": 3}"#);
        assert!(result.is_err());
    }

    #[test]
    fn test_patch_is_empty() {
        assert!(FlightPatch::default().is_empty());
        let patch: FlightPatch = serde_json::from_str(r#"{"price": 10}"#).unwrap();
        assert!(!patch.is_empty());
    }

    #[test]
    fn test_flight_serializes_camel_case() {
        let json = serde_json::to_value(sample_flight()).unwrap();
        assert_eq!(json["startDestination"], "New York JFK");
        assert_eq!(json["locationType"], "international");
        assert!(json["departTime"].as_str().unwrap().starts_with("2024-05-01T08:30:00"));
    }

    #[test]
    fn test_cheap_flight_serializes_projection() {
        let cheap = CheapFlight {
            name: "AC 123".to_string(),
            price: 30.0,
            arrive_time: utc("2024-05-01T10:05:00Z"),
        };
        let json = serde_json::to_value(&cheap).unwrap();
        let keys: Vec<_> = json.as_object().unwrap().keys().cloned().collect();
        assert_eq!(keys.len(), 3);
        assert!(json.get("arriveTime").is_some());
    }
}
