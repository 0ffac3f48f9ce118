//! Search filters and the SQL they compile to.
//!
//! Both searches take a sparse set of optional filters. Each supplied filter
//! adds one `AND`-ed condition; unsupplied filters add nothing. The result is
//! a [`FlightQuery`], a plain SQL string plus positional parameters, which the
//! storage layer executes as a single statement.

use rusqlite::types::Value;
use serde::{de, Deserialize, Deserializer, Serialize};

use crate::error::Result;
use crate::flight::{format_timestamp, parse_day, DayRange};
use crate::storage::schema::{CHEAP_FLIGHT_COLUMNS, FLIGHT_COLUMNS};

/// Filters for the general flight search.
///
/// Day filters take any accepted timestamp form and match the UTC calendar
/// day of that instant, the same day buckets flights are stored under. A
/// value with an offset is converted first, so `2024-05-01T00:30:00+02:00`
/// selects 2024-04-30.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FlightSearch {
    /// Substring of the origin.
    pub start_destination: Option<String>,
    /// Substring of the destination.
    pub end_destination: Option<String>,
    /// Substring of the route classification.
    pub location_type: Option<String>,
    /// Departure day.
    pub depart_time: Option<String>,
    /// Arrival day.
    pub arrive_time: Option<String>,
    /// Exact price. A blank value counts as not supplied.
    #[serde(default, deserialize_with = "optional_price")]
    pub price: Option<f64>,
}

/// Filters for the cheapest-arrival search.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CheapestArrivalSearch {
    /// Substring of the origin.
    pub start_destination: Option<String>,
    /// Substring of the destination.
    pub end_destination: Option<String>,
    /// Day the flight arrives. Also accepted as `departTime`, the name the
    /// public query string has always used for it.
    #[serde(alias = "departTime")]
    pub arrival_day: Option<String>,
}

/// A compiled, parameterised query against the `flights` table.
#[derive(Debug, Clone, PartialEq)]
pub struct FlightQuery {
    sql: String,
    params: Vec<Value>,
}

impl FlightQuery {
    /// The SQL text, with `?N` placeholders.
    #[must_use]
    pub fn sql(&self) -> &str {
        &self.sql
    }

    /// Parameters bound to the placeholders, in order.
    #[must_use]
    pub fn params(&self) -> &[Value] {
        &self.params
    }
}

impl FlightSearch {
    /// Returns `true` if no filter is supplied.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        supplied(self.start_destination.as_ref()).is_none()
            && supplied(self.end_destination.as_ref()).is_none()
            && supplied(self.location_type.as_ref()).is_none()
            && supplied(self.depart_time.as_ref()).is_none()
            && supplied(self.arrive_time.as_ref()).is_none()
            && self.price.is_none()
    }

    /// Compile the filters. With no filters this selects every flight.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::InvalidInput`] if a day filter does not parse.
    pub fn to_query(&self) -> Result<FlightQuery> {
        let mut builder = QueryBuilder::default();
        builder.contains("start_destination", supplied(self.start_destination.as_ref()));
        builder.contains("end_destination", supplied(self.end_destination.as_ref()));
        builder.contains("location_type", supplied(self.location_type.as_ref()));
        builder.within_day("depart_time", day_filter("departTime", self.depart_time.as_ref())?);
        builder.within_day("arrive_time", day_filter("arriveTime", self.arrive_time.as_ref())?);
        builder.equals("price", self.price);
        Ok(builder.build(FLIGHT_COLUMNS, "id ASC", None))
    }
}

impl CheapestArrivalSearch {
    /// Returns `true` if no filter is supplied.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        supplied(self.start_destination.as_ref()).is_none()
            && supplied(self.end_destination.as_ref()).is_none()
            && supplied(self.arrival_day.as_ref()).is_none()
    }

    /// Compile the filters into a lowest-price lookup.
    ///
    /// Returns `None` when no filter is supplied; the caller answers that
    /// case without querying. Ties on price go to the lowest id.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::InvalidInput`] if the arrival day does not parse.
    pub fn to_query(&self) -> Result<Option<FlightQuery>> {
        if self.is_empty() {
            return Ok(None);
        }

        let mut builder = QueryBuilder::default();
        builder.contains("start_destination", supplied(self.start_destination.as_ref()));
        builder.contains("end_destination", supplied(self.end_destination.as_ref()));
        builder.within_day(
            "arrive_time",
            day_filter("arrivalDay", self.arrival_day.as_ref())?,
        );
        Ok(Some(builder.build(
            CHEAP_FLIGHT_COLUMNS,
            "price ASC, id ASC",
            Some(1),
        )))
    }
}

/// Accumulates `AND`-ed conditions and their parameters.
#[derive(Debug, Default)]
struct QueryBuilder {
    conditions: Vec<String>,
    params: Vec<Value>,
}

impl QueryBuilder {
    fn bind(&mut self, value: Value) -> String {
        self.params.push(value);
        format!("?{}", self.params.len())
    }

    fn contains(&mut self, column: &str, value: Option<&str>) {
        if let Some(value) = value {
            let placeholder = self.bind(Value::Text(like_pattern(value)));
            self.conditions
                .push(format!("{column} LIKE {placeholder} ESCAPE '\\'"));
        }
    }

    fn within_day(&mut self, column: &str, range: Option<DayRange>) {
        if let Some(range) = range {
            let start = self.bind(Value::Text(format_timestamp(&range.start)));
            let end = self.bind(Value::Text(format_timestamp(&range.end)));
            self.conditions
                .push(format!("{column} BETWEEN {start} AND {end}"));
        }
    }

    fn equals(&mut self, column: &str, value: Option<f64>) {
        if let Some(value) = value {
            let placeholder = self.bind(Value::Real(value));
            self.conditions.push(format!("{column} = {placeholder}"));
        }
    }

    fn build(self, columns: &str, order_by: &str, limit: Option<u32>) -> FlightQuery {
        let mut sql = format!("SELECT {columns} FROM flights");
        if !self.conditions.is_empty() {
            sql.push_str(" WHERE ");
            sql.push_str(&self.conditions.join(" AND "));
        }
        sql.push_str(" ORDER BY ");
        sql.push_str(order_by);
        if let Some(limit) = limit {
            sql.push_str(&format!(" LIMIT {limit}"));
        }
        FlightQuery {
            sql,
            params: self.params,
        }
    }
}

/// A price arrives as text in a query string and as a number in JSON.
#[derive(Deserialize)]
#[serde(untagged)]
enum PriceParam {
    Number(f64),
    Text(String),
}

/// Read an optional price, treating blank text like an absent key.
fn optional_price<'de, D>(deserializer: D) -> std::result::Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<PriceParam>::deserialize(deserializer)? {
        None => Ok(None),
        Some(PriceParam::Number(price)) => Ok(Some(price)),
        Some(PriceParam::Text(text)) => {
            let text = text.trim();
            if text.is_empty() {
                return Ok(None);
            }
            text.parse()
                .map(Some)
                .map_err(|_| de::Error::custom(format!("invalid price: {text:?}")))
        }
    }
}

/// A filter value counts as supplied only if it has non-whitespace content.
fn supplied(value: Option<&String>) -> Option<&str> {
    value.map(String::as_str).filter(|v| !v.trim().is_empty())
}

fn day_filter(field: &str, value: Option<&String>) -> Result<Option<DayRange>> {
    supplied(value)
        .map(|v| parse_day(field, v).map(DayRange::for_day))
        .transpose()
}

/// Wrap `value` for literal substring matching under `ESCAPE '\'`.
fn like_pattern(value: &str) -> String {
    let mut pattern = String::with_capacity(value.len() + 2);
    pattern.push('%');
    for c in value.chars() {
        if matches!(c, '%' | '_' | '\\') {
            pattern.push('\\');
        }
        pattern.push(c);
    }
    pattern.push('%');
    pattern
}
