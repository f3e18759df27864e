/// Data layer: booking model, loading, enrichment, and source caching.
///
/// Architecture:
/// ```text
///  .csv / .json / .parquet
///        │
///        ▼
///   ┌──────────┐
///   │  loader   │  validate schema, parse rows → BookingRecord
///   └──────────┘
///        │
///        ▼
///   ┌──────────────┐
///   │ BookingTable │  rows + derived columns, immutable
///   └──────────────┘
///        │
///        ▼
///   ┌──────────┐
///   │  cache    │  memoize per path + modification signature
///   └──────────┘
/// ```
pub mod cache;
pub mod loader;
pub mod model;
