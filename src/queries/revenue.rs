use serde::Serialize;

use super::group_by_key;
use super::stats::quantile;
use crate::data::model::{category_label, BookingTable, Season};
use crate::error::{DataError, DataResult};

// ---------------------------------------------------------------------------
// Revenue by season
// ---------------------------------------------------------------------------

/// Total revenue of one season.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SeasonRevenue {
    pub season: Season,
    pub revenue: f64,
}

/// Total revenue per season. Always four rows in calendar order; a season
/// with no bookings reports an explicit zero rather than going missing.
pub fn revenue_by_season(table: &BookingTable) -> [SeasonRevenue; 4] {
    let mut totals = [0.0f64; 4];
    for booking in &table.bookings {
        totals[booking.season as usize] += booking.total_revenue;
    }

    Season::ALL.map(|season| SeasonRevenue {
        season,
        revenue: totals[season as usize],
    })
}

// ---------------------------------------------------------------------------
// Revenue by booking channel
// ---------------------------------------------------------------------------

/// Total revenue of one booking channel.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChannelRevenue {
    pub channel: &'static str,
    pub revenue: f64,
}

/// Revenue contribution of direct versus intermediated bookings.
pub fn revenue_by_channel(table: &BookingTable) -> [ChannelRevenue; 2] {
    let mut totals = [0.0f64; 2];
    for booking in &table.bookings {
        totals[usize::from(booking.is_direct)] += booking.total_revenue;
    }

    [
        ChannelRevenue {
            channel: "Indirect (OTA / Agency)",
            revenue: totals[0],
        },
        ChannelRevenue {
            channel: "Direct Booking",
            revenue: totals[1],
        },
    ]
}

// ---------------------------------------------------------------------------
// Top revenue countries
// ---------------------------------------------------------------------------

const TOP_COUNTRIES: usize = 10;

/// Total revenue of one guest-origin country.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CountryRevenue {
    pub country: String,
    pub revenue: f64,
}

/// The ten highest-revenue countries, descending. Ties keep the order the
/// countries first appear in the data; blank origins bucket as "Unknown".
pub fn top_countries_by_revenue(table: &BookingTable) -> Vec<CountryRevenue> {
    let mut groups = group_by_key(
        &table.bookings,
        |b| category_label(&b.raw.country).to_string(),
        |b| b.total_revenue,
    );
    groups.sort_by(|a, b| b.sum.total_cmp(&a.sum));
    groups.truncate(TOP_COUNTRIES);

    groups
        .into_iter()
        .map(|g| CountryRevenue {
            country: g.key,
            revenue: g.sum,
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Revenue by hotel type
// ---------------------------------------------------------------------------

/// Revenue of one hotel type, absolute and as a share of the grand total.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HotelRevenue {
    pub hotel: String,
    pub revenue: f64,
    pub share: f64,
}

/// Revenue split across hotel types, alphabetical. `share` is the fraction
/// of total revenue (0 when the grand total is itself zero).
pub fn revenue_by_hotel_type(table: &BookingTable) -> Vec<HotelRevenue> {
    let mut groups = group_by_key(
        &table.bookings,
        |b| category_label(&b.raw.hotel).to_string(),
        |b| b.total_revenue,
    );
    groups.sort_by(|a, b| a.key.cmp(&b.key));

    let grand_total: f64 = groups.iter().map(|g| g.sum).sum();
    groups
        .into_iter()
        .map(|g| HotelRevenue {
            hotel: g.key,
            revenue: g.sum,
            share: if grand_total == 0.0 {
                0.0
            } else {
                g.sum / grand_total
            },
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Stay duration vs revenue
// ---------------------------------------------------------------------------

/// One booking's stay length and revenue, for the scatter chart.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StayRevenuePoint {
    pub total_stays: u32,
    pub total_revenue: f64,
}

/// Every booking as a (stay length, revenue) point, sorted by stay length
/// ascending. The sort is stable, so equal stay lengths keep source order.
pub fn stay_revenue_points(table: &BookingTable) -> Vec<StayRevenuePoint> {
    let mut points: Vec<StayRevenuePoint> = table
        .bookings
        .iter()
        .map(|b| StayRevenuePoint {
            total_stays: b.total_stays,
            total_revenue: b.total_revenue,
        })
        .collect();
    points.sort_by_key(|p| p.total_stays);
    points
}

// ---------------------------------------------------------------------------
// Revenue distribution by cancellation status
// ---------------------------------------------------------------------------

/// Five-number revenue summary of one cancellation status.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RevenueSummary {
    pub label: &'static str,
    pub min: f64,
    pub q1: f64,
    pub median: f64,
    pub q3: f64,
    pub max: f64,
}

/// Revenue distribution of kept versus canceled bookings, as the box-plot
/// five-number summary. Both statuses feed the chart, so an absent status
/// is an empty-group error.
pub fn revenue_by_cancellation(table: &BookingTable) -> DataResult<[RevenueSummary; 2]> {
    const QUERY: &str = "revenue by cancellation";
    let labels = ["Not Canceled", "Canceled"];

    let mut revenues: [Vec<f64>; 2] = [Vec::new(), Vec::new()];
    for booking in &table.bookings {
        revenues[usize::from(booking.raw.is_canceled)].push(booking.total_revenue);
    }

    let mut summaries = Vec::with_capacity(2);
    for (label, mut values) in labels.into_iter().zip(revenues) {
        values.sort_by(f64::total_cmp);
        let summary = five_number(label, &values).ok_or_else(|| DataError::EmptyGroup {
            query: QUERY,
            group: label.to_string(),
        })?;
        summaries.push(summary);
    }

    // Vec -> array: exactly two entries were pushed above.
    Ok([summaries[0].clone(), summaries[1].clone()])
}

fn five_number(label: &'static str, sorted: &[f64]) -> Option<RevenueSummary> {
    Some(RevenueSummary {
        label,
        min: quantile(sorted, 0.0)?,
        q1: quantile(sorted, 0.25)?,
        median: quantile(sorted, 0.5)?,
        q3: quantile(sorted, 0.75)?,
        max: quantile(sorted, 1.0)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::model::fixtures::{record, table_of};

    #[test]
    fn season_totals_are_explicit_for_all_four_seasons() {
        let mut winter = record();
        winter.arrival_date_month = "December".to_string();
        winter.adr = 50.0;
        winter.stays_in_weekend_nights = 0;
        winter.stays_in_week_nights = 1; // revenue 50

        let mut summer = record();
        summer.arrival_date_month = "July".to_string();
        summer.adr = 100.0;
        summer.stays_in_weekend_nights = 0;
        summer.stays_in_week_nights = 2; // revenue 200

        let seasons = revenue_by_season(&table_of(vec![winter, summer]));
        assert_eq!(seasons[0].season, Season::Winter);
        assert_eq!(seasons[0].revenue, 50.0);
        assert_eq!(seasons[1].season, Season::Spring);
        assert_eq!(seasons[1].revenue, 0.0);
        assert_eq!(seasons[2].season, Season::Summer);
        assert_eq!(seasons[2].revenue, 200.0);
        assert_eq!(seasons[3].season, Season::Fall);
        assert_eq!(seasons[3].revenue, 0.0);
    }

    #[test]
    fn channel_revenue_sums_each_side() {
        let mut direct = record();
        direct.distribution_channel = "Direct".to_string();
        direct.adr = 40.0; // 3 nights -> 120

        let indirect = record(); // 80 * 3 = 240

        let channels = revenue_by_channel(&table_of(vec![direct, indirect]));
        assert_eq!(channels[0].channel, "Indirect (OTA / Agency)");
        assert!((channels[0].revenue - 240.0).abs() < 1e-9);
        assert_eq!(channels[1].channel, "Direct Booking");
        assert!((channels[1].revenue - 120.0).abs() < 1e-9);
    }

    #[test]
    fn top_countries_sort_descending_and_cap_at_ten() {
        let mut rows = Vec::new();
        for i in 0..12u32 {
            let mut row = record();
            row.country = format!("C{i:02}");
            row.adr = f64::from(i + 1); // revenue grows with i
            rows.push(row);
        }

        let top = top_countries_by_revenue(&table_of(rows));
        assert_eq!(top.len(), 10);
        assert_eq!(top[0].country, "C11");
        for pair in top.windows(2) {
            assert!(pair[0].revenue >= pair[1].revenue);
        }
    }

    #[test]
    fn tied_countries_keep_first_appearance_order() {
        let mut first = record();
        first.country = "AAA".to_string();
        let mut second = record();
        second.country = "BBB".to_string();

        // Identical revenue; AAA appears first in the data.
        let top = top_countries_by_revenue(&table_of(vec![first, second]));
        assert_eq!(top[0].country, "AAA");
        assert_eq!(top[1].country, "BBB");
    }

    #[test]
    fn blank_country_buckets_as_unknown() {
        let mut blank = record();
        blank.country = String::new();

        let top = top_countries_by_revenue(&table_of(vec![blank]));
        assert_eq!(top[0].country, "Unknown");
    }

    #[test]
    fn hotel_shares_sum_to_one() {
        let mut resort = record();
        resort.hotel = "Resort Hotel".to_string();
        resort.adr = 160.0;

        let split = revenue_by_hotel_type(&table_of(vec![record(), resort]));
        assert_eq!(split.len(), 2);
        assert_eq!(split[0].hotel, "City Hotel");
        let total_share: f64 = split.iter().map(|h| h.share).sum();
        assert!((total_share - 1.0).abs() < 1e-9);
        // Resort adr is double the city adr, same nights.
        assert!((split[1].share - 2.0 / 3.0).abs() < 1e-9);
    }

    #[test]
    fn stay_points_sort_stably_by_duration() {
        let mut long = record();
        long.stays_in_week_nights = 6; // 7 nights
        let mut short_a = record();
        short_a.adr = 10.0;
        let mut short_b = record();
        short_b.adr = 20.0;

        let points = stay_revenue_points(&table_of(vec![long, short_a, short_b]));
        assert_eq!(points[0].total_stays, 3);
        assert!((points[0].total_revenue - 30.0).abs() < 1e-9);
        assert!((points[1].total_revenue - 60.0).abs() < 1e-9);
        assert_eq!(points[2].total_stays, 7);
    }

    #[test]
    fn cancellation_summary_has_five_numbers_per_status() {
        let mut rows = Vec::new();
        for adr in [40.0, 50.0, 120.0, 200.0] {
            let mut row = record();
            row.adr = adr;
            row.stays_in_weekend_nights = 0;
            row.stays_in_week_nights = 1;
            rows.push(row);
        }
        let mut canceled = record();
        canceled.is_canceled = true;
        canceled.adr = 75.0;
        canceled.stays_in_weekend_nights = 0;
        canceled.stays_in_week_nights = 1;
        rows.push(canceled);

        let [kept, canceled] = revenue_by_cancellation(&table_of(rows)).unwrap();
        assert_eq!(kept.label, "Not Canceled");
        assert_eq!(kept.min, 40.0);
        assert_eq!(kept.q1, 47.5);
        assert_eq!(kept.median, 85.0);
        assert_eq!(kept.q3, 140.0);
        assert_eq!(kept.max, 200.0);

        assert_eq!(canceled.label, "Canceled");
        assert_eq!(canceled.min, 75.0);
        assert_eq!(canceled.max, 75.0);
    }

    #[test]
    fn absent_cancellation_status_is_an_empty_group() {
        let err = revenue_by_cancellation(&table_of(vec![record()])).unwrap_err();
        match err {
            DataError::EmptyGroup { group, .. } => assert_eq!(group, "Canceled"),
            other => panic!("expected an empty group, got {other:?}"),
        }
    }
}
