use serde::Serialize;

use super::stats::pearson;
use crate::data::model::{Booking, BookingTable};
use crate::error::{DataError, DataResult};

// ---------------------------------------------------------------------------
// Headline metrics
// ---------------------------------------------------------------------------

/// The four numbers shown across the top of the overview page.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HeadlineMetrics {
    pub total_bookings: usize,
    pub cancellation_rate_pct: f64,
    pub avg_stay_nights: f64,
    pub avg_adr: f64,
}

pub fn headline_metrics(table: &BookingTable) -> DataResult<HeadlineMetrics> {
    if table.is_empty() {
        return Err(DataError::EmptyGroup {
            query: "headline metrics",
            group: "all bookings".to_string(),
        });
    }

    let n = table.len() as f64;
    let canceled = table.bookings.iter().filter(|b| b.raw.is_canceled).count();
    let total_stays: f64 = table.bookings.iter().map(|b| f64::from(b.total_stays)).sum();
    let total_adr: f64 = table.bookings.iter().map(|b| b.raw.adr).sum();

    Ok(HeadlineMetrics {
        total_bookings: table.len(),
        cancellation_rate_pct: canceled as f64 / n * 100.0,
        avg_stay_nights: total_stays / n,
        avg_adr: total_adr / n,
    })
}

// ---------------------------------------------------------------------------
// Correlation matrix
// ---------------------------------------------------------------------------

const FEATURE_COUNT: usize = 8;

/// Numeric features of the correlation heatmap, in display order, paired
/// with their column accessors.
const FEATURES: [(&str, fn(&Booking) -> f64); FEATURE_COUNT] = [
    ("lead_time", |b| f64::from(b.raw.lead_time)),
    ("adr", |b| b.raw.adr),
    ("stays_in_week_nights", |b| {
        f64::from(b.raw.stays_in_week_nights)
    }),
    ("adults", |b| f64::from(b.raw.adults)),
    ("children", |b| f64::from(b.raw.children)),
    ("previous_cancellations", |b| {
        f64::from(b.raw.previous_cancellations)
    }),
    ("total_of_special_requests", |b| {
        f64::from(b.raw.total_of_special_requests)
    }),
    ("is_canceled", |b| f64::from(u8::from(b.raw.is_canceled))),
];

/// Pairwise Pearson correlations over the key numeric features.
/// Symmetric; the diagonal is exactly 1.
#[derive(Debug, Clone, Serialize)]
pub struct CorrelationMatrix {
    pub features: [&'static str; FEATURE_COUNT],
    pub values: [[f64; FEATURE_COUNT]; FEATURE_COUNT],
}

impl CorrelationMatrix {
    /// Look up a coefficient by feature names.
    pub fn get(&self, a: &str, b: &str) -> Option<f64> {
        let i = self.features.iter().position(|f| *f == a)?;
        let j = self.features.iter().position(|f| *f == b)?;
        Some(self.values[i][j])
    }
}

pub fn correlation_matrix(table: &BookingTable) -> DataResult<CorrelationMatrix> {
    if table.is_empty() {
        return Err(DataError::EmptyGroup {
            query: "correlation matrix",
            group: "all bookings".to_string(),
        });
    }

    let columns: Vec<Vec<f64>> = FEATURES
        .iter()
        .map(|(_, extract)| table.bookings.iter().map(extract).collect())
        .collect();

    let mut values = [[0.0; FEATURE_COUNT]; FEATURE_COUNT];
    for i in 0..FEATURE_COUNT {
        values[i][i] = 1.0;
        for j in (i + 1)..FEATURE_COUNT {
            let r = pearson(&columns[i], &columns[j]);
            values[i][j] = r;
            values[j][i] = r;
        }
    }

    Ok(CorrelationMatrix {
        features: FEATURES.map(|(name, _)| name),
        values,
    })
}
