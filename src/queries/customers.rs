use serde::Serialize;

use super::group_by_key;
use crate::data::model::{category_label, Booking, BookingTable};
use crate::error::{DataError, DataResult};

// ---------------------------------------------------------------------------
// Lead-time histogram
// ---------------------------------------------------------------------------

pub const LEAD_TIME_BINS: usize = 50;

/// One lead-time bucket, with separate counts per cancellation status.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LeadTimeBin {
    pub lower: f64,
    pub upper: f64,
    pub kept: u64,
    pub canceled: u64,
}

/// Bucket lead times into [`LEAD_TIME_BINS`] uniform bins spanning the
/// observed range. An empty table yields no bins (there is no range to
/// span).
pub fn lead_time_histogram(table: &BookingTable) -> Vec<LeadTimeBin> {
    let Some(min) = table.bookings.iter().map(|b| b.raw.lead_time).min() else {
        return Vec::new();
    };
    let max = table
        .bookings
        .iter()
        .map(|b| b.raw.lead_time)
        .max()
        .unwrap_or(min);
    let span = f64::from(max - min);

    let mut bins: Vec<LeadTimeBin> = (0..LEAD_TIME_BINS)
        .map(|i| LeadTimeBin {
            lower: f64::from(min) + span * i as f64 / LEAD_TIME_BINS as f64,
            upper: f64::from(min) + span * (i + 1) as f64 / LEAD_TIME_BINS as f64,
            kept: 0,
            canceled: 0,
        })
        .collect();

    for booking in &table.bookings {
        let slot = if span == 0.0 {
            0
        } else {
            let offset = f64::from(booking.raw.lead_time - min);
            ((offset / span * LEAD_TIME_BINS as f64) as usize).min(LEAD_TIME_BINS - 1)
        };
        if booking.raw.is_canceled {
            bins[slot].canceled += 1;
        } else {
            bins[slot].kept += 1;
        }
    }

    bins
}

// ---------------------------------------------------------------------------
// Mean revenue by binary segment
// ---------------------------------------------------------------------------

/// A labeled guest segment with its mean booking revenue.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SegmentRevenue {
    pub label: &'static str,
    pub mean_revenue: f64,
}

/// Mean revenue of new versus repeat guests.
pub fn revenue_by_guest_type(table: &BookingTable) -> DataResult<[SegmentRevenue; 2]> {
    mean_revenue_split(
        table,
        "revenue by guest type",
        |b| b.raw.is_repeated_guest,
        ["New Guests", "Repeat Guests"],
    )
}

/// Mean revenue of family versus non-family bookings.
pub fn revenue_by_family(table: &BookingTable) -> DataResult<[SegmentRevenue; 2]> {
    mean_revenue_split(
        table,
        "revenue by family",
        |b| b.is_family,
        ["Non-Family Guests", "Family Guests"],
    )
}

/// Split the table on a predicate and average revenue per side. Both sides
/// of the split are part of the chart, so an empty side is an error rather
/// than a silently missing bar.
fn mean_revenue_split(
    table: &BookingTable,
    query: &'static str,
    pred: impl Fn(&Booking) -> bool,
    labels: [&'static str; 2],
) -> DataResult<[SegmentRevenue; 2]> {
    let mut sums = [0.0f64; 2];
    let mut counts = [0u64; 2];

    for booking in &table.bookings {
        let side = usize::from(pred(booking));
        sums[side] += booking.total_revenue;
        counts[side] += 1;
    }

    for side in 0..2 {
        if counts[side] == 0 {
            return Err(DataError::EmptyGroup {
                query,
                group: labels[side].to_string(),
            });
        }
    }

    Ok([
        SegmentRevenue {
            label: labels[0],
            mean_revenue: sums[0] / counts[0] as f64,
        },
        SegmentRevenue {
            label: labels[1],
            mean_revenue: sums[1] / counts[1] as f64,
        },
    ])
}

// ---------------------------------------------------------------------------
// Cancellation rate by deposit type
// ---------------------------------------------------------------------------

/// Cancellation rate (0..1) of one deposit type.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DepositCancellation {
    pub deposit_type: String,
    pub cancellation_rate: f64,
}

/// Mean cancellation per deposit type, alphabetical by type. The raw rates
/// are reported as observed, including the non-refundable anomaly present
/// in the source data.
pub fn cancellation_by_deposit(table: &BookingTable) -> Vec<DepositCancellation> {
    let mut groups = group_by_key(
        &table.bookings,
        |b| category_label(&b.raw.deposit_type).to_string(),
        |b| f64::from(u8::from(b.raw.is_canceled)),
    );
    groups.sort_by(|a, b| a.key.cmp(&b.key));

    groups
        .into_iter()
        .map(|g| DepositCancellation {
            cancellation_rate: g.sum / g.count as f64,
            deposit_type: g.key,
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Customer-type frequency
// ---------------------------------------------------------------------------

/// Booking count of one customer type.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CustomerTypeCount {
    pub customer_type: String,
    pub bookings: u64,
}

/// Booking counts per customer type, most frequent first. Ties keep the
/// order the types first appear in the data.
pub fn customer_type_frequency(table: &BookingTable) -> Vec<CustomerTypeCount> {
    let mut groups = group_by_key(
        &table.bookings,
        |b| category_label(&b.raw.customer_type).to_string(),
        |_| 0.0,
    );
    groups.sort_by(|a, b| b.count.cmp(&a.count));

    groups
        .into_iter()
        .map(|g| CustomerTypeCount {
            customer_type: g.key,
            bookings: g.count,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::model::fixtures::{record, table_of};

    #[test]
    fn histogram_splits_counts_by_cancellation() {
        let mut early = record();
        early.lead_time = 0;
        let mut late = record();
        late.lead_time = 100;
        late.is_canceled = true;

        let bins = lead_time_histogram(&table_of(vec![early, late]));
        assert_eq!(bins.len(), LEAD_TIME_BINS);
        assert_eq!(bins.iter().map(|b| b.kept).sum::<u64>(), 1);
        assert_eq!(bins.iter().map(|b| b.canceled).sum::<u64>(), 1);
        assert_eq!(bins[0].kept, 1);
        assert_eq!(bins[LEAD_TIME_BINS - 1].canceled, 1);
    }

    #[test]
    fn histogram_of_empty_table_has_no_bins() {
        assert!(lead_time_histogram(&table_of(vec![])).is_empty());
    }

    #[test]
    fn histogram_handles_a_single_lead_time() {
        let rows = vec![record(), record(), record()];
        let bins = lead_time_histogram(&table_of(rows));
        assert_eq!(bins[0].kept, 3);
    }

    #[test]
    fn guest_type_split_averages_each_side() {
        let mut repeat = record();
        repeat.is_repeated_guest = true;
        repeat.adr = 10.0; // 3 nights -> revenue 30

        let mut new_a = record();
        new_a.adr = 50.0; // revenue 150
        let mut new_b = record();
        new_b.adr = 70.0; // revenue 210

        let split = revenue_by_guest_type(&table_of(vec![new_a, repeat, new_b])).unwrap();
        assert_eq!(split[0].label, "New Guests");
        assert!((split[0].mean_revenue - 180.0).abs() < 1e-9);
        assert_eq!(split[1].label, "Repeat Guests");
        assert!((split[1].mean_revenue - 30.0).abs() < 1e-9);
    }

    #[test]
    fn missing_segment_is_an_empty_group() {
        // No repeat guests at all.
        let err = revenue_by_guest_type(&table_of(vec![record()])).unwrap_err();
        match err {
            DataError::EmptyGroup { group, .. } => assert_eq!(group, "Repeat Guests"),
            other => panic!("expected an empty group, got {other:?}"),
        }
    }

    #[test]
    fn family_split_uses_the_derived_flag() {
        let mut family = record();
        family.children = 1;
        family.adr = 100.0; // revenue 300

        let split = revenue_by_family(&table_of(vec![record(), family])).unwrap();
        assert_eq!(split[1].label, "Family Guests");
        assert!((split[1].mean_revenue - 300.0).abs() < 1e-9);
    }

    #[test]
    fn deposit_rates_are_per_type_and_sorted() {
        let mut non_refund = record();
        non_refund.deposit_type = "Non Refund".to_string();
        non_refund.is_canceled = true;

        let mut kept = record();
        kept.deposit_type = "No Deposit".to_string();
        let mut canceled = record();
        canceled.deposit_type = "No Deposit".to_string();
        canceled.is_canceled = true;

        let rates = cancellation_by_deposit(&table_of(vec![non_refund, kept, canceled]));
        assert_eq!(rates.len(), 2);
        assert_eq!(rates[0].deposit_type, "No Deposit");
        assert!((rates[0].cancellation_rate - 0.5).abs() < 1e-9);
        assert_eq!(rates[1].deposit_type, "Non Refund");
        assert_eq!(rates[1].cancellation_rate, 1.0);
    }

    #[test]
    fn customer_types_sort_by_count_then_first_appearance() {
        let mut contract = record();
        contract.customer_type = "Contract".to_string();
        let mut group = record();
        group.customer_type = "Group".to_string();

        // Two Transient rows, then one Contract, then one Group.
        let counts = customer_type_frequency(&table_of(vec![record(), contract, group, record()]));
        assert_eq!(counts[0].customer_type, "Transient");
        assert_eq!(counts[0].bookings, 2);
        assert_eq!(counts[1].customer_type, "Contract");
        assert_eq!(counts[2].customer_type, "Group");
    }

    #[test]
    fn blank_customer_type_surfaces_as_unknown() {
        let mut blank = record();
        blank.customer_type = String::new();

        let counts = customer_type_frequency(&table_of(vec![blank]));
        assert_eq!(counts[0].customer_type, "Unknown");
    }
}
