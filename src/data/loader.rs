use std::collections::HashSet;
use std::fs::File;
use std::path::Path;

use arrow::array::{
    Array, ArrayRef, AsArray, BooleanArray, Float32Array, Float64Array, Int32Array, Int64Array,
    StringArray,
};
use arrow::datatypes::DataType;
use arrow::record_batch::RecordBatch;
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use serde_json::Value as JsonValue;

use super::model::{BookingRecord, BookingTable};
use crate::error::{DataError, DataResult};

// ---------------------------------------------------------------------------
// Public entry-point
// ---------------------------------------------------------------------------

/// Every column a source file must carry. Extra columns are ignored.
pub const REQUIRED_COLUMNS: [&str; 19] = [
    "hotel",
    "country",
    "market_segment",
    "distribution_channel",
    "customer_type",
    "deposit_type",
    "meal",
    "arrival_date_month",
    "lead_time",
    "adr",
    "stays_in_weekend_nights",
    "stays_in_week_nights",
    "adults",
    "children",
    "babies",
    "previous_cancellations",
    "total_of_special_requests",
    "is_canceled",
    "is_repeated_guest",
];

/// Load a bookings dataset from a file and compute the derived columns.
/// Dispatch by extension.
///
/// Supported formats:
/// * `.csv`     – delimited with a header row of the raw column names
/// * `.json`    – `[{ "hotel": ..., "adr": ..., ... }, ...]`
/// * `.parquet` – flat typed columns, as written by Pandas or Polars
pub fn load_and_enrich(path: &Path) -> DataResult<BookingTable> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();

    let table = match ext.as_str() {
        "csv" => load_csv(path),
        "json" => load_json(path),
        "parquet" | "pq" => load_parquet(path),
        other => Err(DataError::UnsupportedFormat(other.to_string())),
    }?;

    log::info!("loaded {} bookings from {}", table.len(), path.display());
    Ok(table)
}

fn open(path: &Path) -> DataResult<File> {
    File::open(path).map_err(|e| DataError::SourceNotFound {
        path: path.to_path_buf(),
        source: e,
    })
}

/// Check the source columns against [`REQUIRED_COLUMNS`], reporting every
/// missing column at once rather than the first one found.
fn check_required<'a>(present: impl Iterator<Item = &'a str>) -> DataResult<()> {
    let have: HashSet<&str> = present.collect();
    let missing: Vec<&str> = REQUIRED_COLUMNS
        .iter()
        .copied()
        .filter(|col| !have.contains(col))
        .collect();

    if missing.is_empty() {
        Ok(())
    } else {
        Err(DataError::Schema(format!(
            "missing required columns: {}",
            missing.join(", ")
        )))
    }
}

fn bad_cell(column: &str, row: usize, detail: impl std::fmt::Display) -> DataError {
    DataError::Schema(format!("column '{column}' row {row}: {detail}"))
}

// ---------------------------------------------------------------------------
// CSV loader
// ---------------------------------------------------------------------------

fn load_csv(path: &Path) -> DataResult<BookingTable> {
    let mut reader = csv::Reader::from_reader(open(path)?);
    let headers = reader
        .headers()
        .map_err(|e| DataError::Schema(format!("reading CSV header: {e}")))?
        .clone();
    check_required(headers.iter())?;

    let mut records = Vec::new();
    for (row_no, result) in reader.deserialize::<BookingRecord>().enumerate() {
        let record = result.map_err(|e| DataError::Schema(format!("CSV row {row_no}: {e}")))?;
        records.push(record);
    }

    BookingTable::from_records(records)
}

// ---------------------------------------------------------------------------
// JSON loader
// ---------------------------------------------------------------------------

/// Expected JSON schema (records-oriented, the default
/// `df.to_json(orient='records')`): a top-level array of objects, one per
/// reservation, keyed by the raw column names.
fn load_json(path: &Path) -> DataResult<BookingTable> {
    let text = std::fs::read_to_string(path).map_err(|e| DataError::SourceNotFound {
        path: path.to_path_buf(),
        source: e,
    })?;
    let root: JsonValue =
        serde_json::from_str(&text).map_err(|e| DataError::Schema(format!("parsing JSON: {e}")))?;

    let rows = root
        .as_array()
        .ok_or_else(|| DataError::Schema("expected a top-level JSON array of records".into()))?;

    // Validate the schema on the first record so a missing column is
    // reported as such, not as a per-row parse failure.
    if let Some(first) = rows.first() {
        let obj = first
            .as_object()
            .ok_or_else(|| DataError::Schema("JSON record 0 is not an object".into()))?;
        check_required(obj.keys().map(|k| k.as_str()))?;
    }

    let mut records = Vec::with_capacity(rows.len());
    for (i, row) in rows.iter().enumerate() {
        let record: BookingRecord = serde_json::from_value(row.clone())
            .map_err(|e| DataError::Schema(format!("JSON record {i}: {e}")))?;
        records.push(record);
    }

    BookingTable::from_records(records)
}

// ---------------------------------------------------------------------------
// Parquet loader
// ---------------------------------------------------------------------------

/// Load a Parquet file of bookings.
///
/// Columns are matched by name; string columns may be `Utf8` or `LargeUtf8`,
/// numeric columns any of the common int/float widths, and the 0/1 flags
/// either boolean or integer. Works with files written by both **Pandas**
/// (`df.to_parquet()`) and **Polars** (`df.write_parquet()`).
fn load_parquet(path: &Path) -> DataResult<BookingTable> {
    let file = open(path)?;
    let builder = ParquetRecordBatchReaderBuilder::try_new(file)
        .map_err(|e| DataError::Schema(format!("reading parquet metadata: {e}")))?;
    let reader = builder
        .build()
        .map_err(|e| DataError::Schema(format!("building parquet reader: {e}")))?;

    let mut records = Vec::new();
    for batch_result in reader {
        let batch =
            batch_result.map_err(|e| DataError::Schema(format!("reading parquet batch: {e}")))?;
        let schema = batch.schema();
        check_required(schema.fields().iter().map(|f| f.name().as_str()))?;
        read_batch(&batch, &mut records)?;
    }

    BookingTable::from_records(records)
}

fn column<'a>(batch: &'a RecordBatch, name: &'static str) -> DataResult<&'a ArrayRef> {
    batch
        .column_by_name(name)
        .ok_or_else(|| DataError::Schema(format!("missing required columns: {name}")))
}

fn read_batch(batch: &RecordBatch, out: &mut Vec<BookingRecord>) -> DataResult<()> {
    let hotel = column(batch, "hotel")?;
    let country = column(batch, "country")?;
    let market_segment = column(batch, "market_segment")?;
    let distribution_channel = column(batch, "distribution_channel")?;
    let customer_type = column(batch, "customer_type")?;
    let deposit_type = column(batch, "deposit_type")?;
    let meal = column(batch, "meal")?;
    let arrival_date_month = column(batch, "arrival_date_month")?;
    let lead_time = column(batch, "lead_time")?;
    let adr = column(batch, "adr")?;
    let stays_in_weekend_nights = column(batch, "stays_in_weekend_nights")?;
    let stays_in_week_nights = column(batch, "stays_in_week_nights")?;
    let adults = column(batch, "adults")?;
    let children = column(batch, "children")?;
    let babies = column(batch, "babies")?;
    let previous_cancellations = column(batch, "previous_cancellations")?;
    let total_of_special_requests = column(batch, "total_of_special_requests")?;
    let is_canceled = column(batch, "is_canceled")?;
    let is_repeated_guest = column(batch, "is_repeated_guest")?;

    for row in 0..batch.num_rows() {
        out.push(BookingRecord {
            hotel: string_value(hotel, "hotel", row)?,
            country: string_value(country, "country", row)?,
            market_segment: string_value(market_segment, "market_segment", row)?,
            distribution_channel: string_value(distribution_channel, "distribution_channel", row)?,
            customer_type: string_value(customer_type, "customer_type", row)?,
            deposit_type: string_value(deposit_type, "deposit_type", row)?,
            meal: string_value(meal, "meal", row)?,
            arrival_date_month: string_value(arrival_date_month, "arrival_date_month", row)?,
            lead_time: count_value(lead_time, "lead_time", row)?,
            adr: float_value(adr, "adr", row)?,
            stays_in_weekend_nights: count_value(
                stays_in_weekend_nights,
                "stays_in_weekend_nights",
                row,
            )?,
            stays_in_week_nights: count_value(stays_in_week_nights, "stays_in_week_nights", row)?,
            adults: count_value(adults, "adults", row)?,
            children: count_value(children, "children", row)?,
            babies: count_value(babies, "babies", row)?,
            previous_cancellations: count_value(
                previous_cancellations,
                "previous_cancellations",
                row,
            )?,
            total_of_special_requests: count_value(
                total_of_special_requests,
                "total_of_special_requests",
                row,
            )?,
            is_canceled: flag_value(is_canceled, "is_canceled", row)?,
            is_repeated_guest: flag_value(is_repeated_guest, "is_repeated_guest", row)?,
        });
    }

    Ok(())
}

// -- Arrow cell extraction helpers --

/// Read a string cell. Nulls become the empty string so they surface as the
/// "Unknown" bucket downstream instead of dropping the row.
fn string_value(col: &ArrayRef, name: &str, row: usize) -> DataResult<String> {
    if col.is_null(row) {
        return Ok(String::new());
    }
    match col.data_type() {
        DataType::Utf8 => {
            let arr = col.as_any().downcast_ref::<StringArray>().unwrap();
            Ok(arr.value(row).to_string())
        }
        DataType::LargeUtf8 => Ok(col.as_string::<i64>().value(row).to_string()),
        other => Err(bad_cell(name, row, format!("expected text, found {other:?}"))),
    }
}

/// Read a non-negative integer cell. Nulls count as zero, matching the
/// blank-cell policy of the CSV loader.
fn count_value(col: &ArrayRef, name: &str, row: usize) -> DataResult<u32> {
    if col.is_null(row) {
        return Ok(0);
    }
    match col.data_type() {
        DataType::Int32 => {
            let arr = col.as_any().downcast_ref::<Int32Array>().unwrap();
            Ok(arr.value(row) as u32)
        }
        DataType::Int64 => {
            let arr = col.as_any().downcast_ref::<Int64Array>().unwrap();
            Ok(arr.value(row) as u32)
        }
        DataType::Float64 => {
            let arr = col.as_any().downcast_ref::<Float64Array>().unwrap();
            Ok(arr.value(row) as u32)
        }
        other => Err(bad_cell(
            name,
            row,
            format!("expected an integer, found {other:?}"),
        )),
    }
}

fn float_value(col: &ArrayRef, name: &str, row: usize) -> DataResult<f64> {
    if col.is_null(row) {
        return Ok(0.0);
    }
    match col.data_type() {
        DataType::Float64 => {
            let arr = col.as_any().downcast_ref::<Float64Array>().unwrap();
            Ok(arr.value(row))
        }
        DataType::Float32 => {
            let arr = col.as_any().downcast_ref::<Float32Array>().unwrap();
            Ok(arr.value(row) as f64)
        }
        DataType::Int64 => {
            let arr = col.as_any().downcast_ref::<Int64Array>().unwrap();
            Ok(arr.value(row) as f64)
        }
        DataType::Int32 => {
            let arr = col.as_any().downcast_ref::<Int32Array>().unwrap();
            Ok(arr.value(row) as f64)
        }
        other => Err(bad_cell(
            name,
            row,
            format!("expected a number, found {other:?}"),
        )),
    }
}

fn flag_value(col: &ArrayRef, name: &str, row: usize) -> DataResult<bool> {
    if col.is_null(row) {
        return Ok(false);
    }
    let as_int = |v: i64| match v {
        0 => Ok(false),
        1 => Ok(true),
        other => Err(bad_cell(name, row, format!("flag value out of range: {other}"))),
    };
    match col.data_type() {
        DataType::Boolean => {
            let arr = col.as_any().downcast_ref::<BooleanArray>().unwrap();
            Ok(arr.value(row))
        }
        DataType::Int32 => {
            let arr = col.as_any().downcast_ref::<Int32Array>().unwrap();
            as_int(arr.value(row) as i64)
        }
        DataType::Int64 => {
            let arr = col.as_any().downcast_ref::<Int64Array>().unwrap();
            as_int(arr.value(row))
        }
        other => Err(bad_cell(
            name,
            row,
            format!("expected a 0/1 flag, found {other:?}"),
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn all_columns_present_passes() {
        assert!(check_required(REQUIRED_COLUMNS.iter().copied()).is_ok());
    }

    #[test]
    fn extra_columns_are_tolerated() {
        let with_extra = REQUIRED_COLUMNS
            .iter()
            .copied()
            .chain(["arrival_date_year", "agent"]);
        assert!(check_required(with_extra).is_ok());
    }

    #[test]
    fn every_missing_column_is_reported() {
        let partial = REQUIRED_COLUMNS
            .iter()
            .copied()
            .filter(|c| *c != "adr" && *c != "lead_time");
        let err = check_required(partial).unwrap_err();
        match err {
            DataError::Schema(msg) => {
                assert!(msg.contains("adr"), "{msg}");
                assert!(msg.contains("lead_time"), "{msg}");
            }
            other => panic!("expected a schema error, got {other:?}"),
        }
    }

    #[test]
    fn unknown_extension_is_rejected() {
        let err = load_and_enrich(Path::new("bookings.xlsx")).unwrap_err();
        assert!(matches!(err, DataError::UnsupportedFormat(ext) if ext == "xlsx"));
    }
}
