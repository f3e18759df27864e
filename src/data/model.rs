use std::fmt;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::{DataError, DataResult};

// ---------------------------------------------------------------------------
// Season – derived from the arrival month
// ---------------------------------------------------------------------------

/// Calendar season of the arrival date.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub enum Season {
    Winter,
    Spring,
    Summer,
    Fall,
}

impl Season {
    /// All seasons in calendar order, starting at Winter.
    pub const ALL: [Season; 4] = [Season::Winter, Season::Spring, Season::Summer, Season::Fall];

    /// Map a canonical month name to its season. Anything outside the
    /// twelve month names is a schema error, never a silent null.
    pub fn from_month(month: &str) -> DataResult<Season> {
        match month {
            "December" | "January" | "February" => Ok(Season::Winter),
            "March" | "April" | "May" => Ok(Season::Spring),
            "June" | "July" | "August" => Ok(Season::Summer),
            "September" | "October" | "November" => Ok(Season::Fall),
            other => Err(DataError::Schema(format!(
                "unrecognized month name '{other}' in arrival_date_month"
            ))),
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Season::Winter => "Winter",
            Season::Spring => "Spring",
            Season::Summer => "Summer",
            Season::Fall => "Fall",
        }
    }
}

impl fmt::Display for Season {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

// ---------------------------------------------------------------------------
// BookingRecord – one raw row of the source file
// ---------------------------------------------------------------------------

/// A single reservation exactly as it appears in the source file.
/// Column names match the file header one-to-one.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct BookingRecord {
    pub hotel: String,
    pub country: String,
    pub market_segment: String,
    pub distribution_channel: String,
    pub customer_type: String,
    pub deposit_type: String,
    pub meal: String,
    pub arrival_date_month: String,
    pub lead_time: u32,
    pub adr: f64,
    pub stays_in_weekend_nights: u32,
    pub stays_in_week_nights: u32,
    pub adults: u32,
    /// Blank or `NA` in some exports of the raw dataset; treated as zero.
    #[serde(deserialize_with = "de_count_or_blank")]
    pub children: u32,
    pub babies: u32,
    pub previous_cancellations: u32,
    pub total_of_special_requests: u32,
    #[serde(deserialize_with = "de_flag", serialize_with = "ser_flag")]
    pub is_canceled: bool,
    #[serde(deserialize_with = "de_flag", serialize_with = "ser_flag")]
    pub is_repeated_guest: bool,
}

/// Accept a count cell written as an integer, a float (`2.0` from Pandas),
/// a quoted number, or an empty/`NA` cell meaning zero.
fn de_count_or_blank<'de, D: Deserializer<'de>>(deserializer: D) -> Result<u32, D::Error> {
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Int(u32),
        Float(f64),
        Text(String),
    }

    match Option::<Raw>::deserialize(deserializer)? {
        None => Ok(0),
        Some(Raw::Int(n)) => Ok(n),
        Some(Raw::Float(f)) => Ok(f as u32),
        Some(Raw::Text(s)) => {
            let t = s.trim();
            if t.is_empty() || t.eq_ignore_ascii_case("na") {
                Ok(0)
            } else {
                t.parse::<f64>()
                    .map(|f| f as u32)
                    .map_err(|_| serde::de::Error::custom(format!("'{s}' is not a count")))
            }
        }
    }
}

/// Accept a 0/1 flag written as an integer, a bool, or quoted text.
fn de_flag<'de, D: Deserializer<'de>>(deserializer: D) -> Result<bool, D::Error> {
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Bool(bool),
        Int(u8),
        Text(String),
    }

    match Raw::deserialize(deserializer)? {
        Raw::Bool(b) => Ok(b),
        Raw::Int(0) => Ok(false),
        Raw::Int(1) => Ok(true),
        Raw::Int(other) => Err(serde::de::Error::custom(format!(
            "flag value out of range: {other}"
        ))),
        Raw::Text(s) => match s.trim() {
            "0" | "false" | "False" => Ok(false),
            "1" | "true" | "True" => Ok(true),
            other => Err(serde::de::Error::custom(format!(
                "'{other}' is not a 0/1 flag"
            ))),
        },
    }
}

/// Flags serialize back out as 0/1, matching the raw dataset.
fn ser_flag<S: Serializer>(value: &bool, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_u8(*value as u8)
}

/// Display label for a categorical cell. Blank and `NULL` cells surface as
/// an explicit "Unknown" bucket so group-bys never silently drop rows.
pub fn category_label(value: &str) -> &str {
    let trimmed = value.trim();
    if trimmed.is_empty() || trimmed.eq_ignore_ascii_case("null") {
        "Unknown"
    } else {
        trimmed
    }
}

// ---------------------------------------------------------------------------
// Booking – a record plus its derived columns
// ---------------------------------------------------------------------------

/// A reservation row augmented with the engineered columns. Built once at
/// load time and never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Booking {
    #[serde(flatten)]
    pub raw: BookingRecord,
    pub is_family: bool,
    pub total_stays: u32,
    pub total_stays_for_calc: u32,
    pub total_revenue: f64,
    pub is_direct: bool,
    pub season: Season,
}

impl Booking {
    /// Compute the derived columns for one record. Deterministic: the same
    /// input row always yields the same derived values.
    pub fn derive(raw: BookingRecord) -> DataResult<Booking> {
        let season = Season::from_month(&raw.arrival_date_month)?;
        let total_stays = raw.stays_in_weekend_nights + raw.stays_in_week_nights;
        // Zero-night bookings count as a one-night equivalent so their
        // revenue is neither zero nor undefined.
        let total_stays_for_calc = total_stays.max(1);

        Ok(Booking {
            is_family: raw.children + raw.babies > 0,
            total_stays,
            total_stays_for_calc,
            total_revenue: raw.adr * f64::from(total_stays_for_calc),
            is_direct: raw.distribution_channel == "Direct",
            season,
            raw,
        })
    }
}

// ---------------------------------------------------------------------------
// BookingTable – the complete enriched dataset
// ---------------------------------------------------------------------------

/// The fully loaded and enriched dataset, in source row order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BookingTable {
    pub bookings: Vec<Booking>,
}

impl BookingTable {
    /// Enrich a batch of raw records. Fails on the first record that does
    /// not fit the schema; there is no partial table.
    pub fn from_records(records: Vec<BookingRecord>) -> DataResult<Self> {
        let bookings = records
            .into_iter()
            .map(Booking::derive)
            .collect::<DataResult<Vec<_>>>()?;
        Ok(BookingTable { bookings })
    }

    /// Number of bookings.
    pub fn len(&self) -> usize {
        self.bookings.len()
    }

    /// Whether the table holds no bookings.
    pub fn is_empty(&self) -> bool {
        self.bookings.is_empty()
    }
}

// ---------------------------------------------------------------------------
// Test fixtures shared by the query modules
// ---------------------------------------------------------------------------

#[cfg(test)]
pub(crate) mod fixtures {
    use super::*;

    /// A plain mid-week city booking; tests tweak the fields they care about.
    pub(crate) fn record() -> BookingRecord {
        BookingRecord {
            hotel: "City Hotel".to_string(),
            country: "PRT".to_string(),
            market_segment: "Online TA".to_string(),
            distribution_channel: "TA/TO".to_string(),
            customer_type: "Transient".to_string(),
            deposit_type: "No Deposit".to_string(),
            meal: "BB".to_string(),
            arrival_date_month: "July".to_string(),
            lead_time: 30,
            adr: 80.0,
            stays_in_weekend_nights: 1,
            stays_in_week_nights: 2,
            adults: 2,
            children: 0,
            babies: 0,
            previous_cancellations: 0,
            total_of_special_requests: 0,
            is_canceled: false,
            is_repeated_guest: false,
        }
    }

    pub(crate) fn table_of(records: Vec<BookingRecord>) -> BookingTable {
        BookingTable::from_records(records).expect("fixture records must enrich")
    }
}
