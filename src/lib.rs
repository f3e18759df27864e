//! Data core for a hotel-booking analytics dashboard.
//!
//! Loads a static bookings dataset (CSV, JSON or Parquet), derives the
//! engineered columns once, and answers a fixed catalog of aggregation
//! queries whose results are ready for charting. The presentation layer –
//! pages, charts, narrative – lives elsewhere and only consumes what this
//! crate returns.
//!
//! ```no_run
//! use std::path::Path;
//!
//! use stayscope::queries::{overview, revenue};
//! use stayscope::DatasetCache;
//!
//! # fn main() -> stayscope::DataResult<()> {
//! let mut cache = DatasetCache::new();
//! let table = cache.load(Path::new("hotel_bookings.csv"))?;
//!
//! let metrics = overview::headline_metrics(&table)?;
//! println!("{} bookings", metrics.total_bookings);
//!
//! for season in revenue::revenue_by_season(&table) {
//!     println!("{}: {:.0}", season.season, season.revenue);
//! }
//! # Ok(())
//! # }
//! ```

pub mod data;
pub mod error;
pub mod queries;

pub use data::cache::DatasetCache;
pub use data::loader::load_and_enrich;
pub use data::model::{Booking, BookingRecord, BookingTable, Season};
pub use error::{DataError, DataResult};
