use serde::Serialize;

use super::revenue::{revenue_by_season, SeasonRevenue};
use crate::data::model::{Booking, BookingTable};
use crate::error::{DataError, DataResult};

/// Lead-time threshold, in days, above which bookings are treated as
/// long-lead for cancellation-risk purposes.
pub const HIGH_LEAD_TIME_DAYS: u32 = 150;

/// Cancellation rate, in percent, among bookings with a lead time over
/// [`HIGH_LEAD_TIME_DAYS`]. Errors when no booking clears the threshold.
pub fn high_lead_time_cancellation_rate(table: &BookingTable) -> DataResult<f64> {
    let long_lead: Vec<&Booking> = table
        .bookings
        .iter()
        .filter(|b| b.raw.lead_time > HIGH_LEAD_TIME_DAYS)
        .collect();

    if long_lead.is_empty() {
        return Err(DataError::EmptyGroup {
            query: "high lead-time cancellation rate",
            group: format!("lead_time > {HIGH_LEAD_TIME_DAYS}"),
        });
    }

    let canceled = long_lead.iter().filter(|b| b.raw.is_canceled).count();
    Ok(canceled as f64 / long_lead.len() as f64 * 100.0)
}

/// Share of bookings made by returning guests, in percent.
pub fn repeat_guest_rate(table: &BookingTable) -> DataResult<f64> {
    share_pct(table, "repeat-guest rate", |b| b.raw.is_repeated_guest)
}

/// Share of bookings travelling with children or babies, in percent.
pub fn family_booking_share(table: &BookingTable) -> DataResult<f64> {
    share_pct(table, "family booking share", |b| b.is_family)
}

/// Share of bookings made through the direct channel, in percent.
pub fn direct_booking_share(table: &BookingTable) -> DataResult<f64> {
    share_pct(table, "direct booking share", |b| b.is_direct)
}

fn share_pct(
    table: &BookingTable,
    query: &'static str,
    pred: impl Fn(&Booking) -> bool,
) -> DataResult<f64> {
    if table.is_empty() {
        return Err(DataError::EmptyGroup {
            query,
            group: "all bookings".to_string(),
        });
    }
    let hits = table.bookings.iter().filter(|b| pred(b)).count();
    Ok(hits as f64 / table.len() as f64 * 100.0)
}

// ---------------------------------------------------------------------------
// Peak and trough seasons
// ---------------------------------------------------------------------------

/// The best- and worst-earning seasons.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SeasonExtremes {
    pub peak: SeasonRevenue,
    pub trough: SeasonRevenue,
}

/// Identify the seasons with the highest and lowest total revenue. Ties go
/// to the earlier season in calendar order, starting at Winter.
pub fn season_extremes(table: &BookingTable) -> DataResult<SeasonExtremes> {
    if table.is_empty() {
        return Err(DataError::EmptyGroup {
            query: "season extremes",
            group: "all bookings".to_string(),
        });
    }

    let seasons = revenue_by_season(table);
    let mut peak = seasons[0];
    let mut trough = seasons[0];
    for entry in &seasons[1..] {
        if entry.revenue > peak.revenue {
            peak = *entry;
        }
        if entry.revenue < trough.revenue {
            trough = *entry;
        }
    }

    Ok(SeasonExtremes { peak, trough })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::model::fixtures::{record, table_of};
    use crate::data::model::Season;

    #[test]
    fn long_lead_rate_ignores_short_lead_bookings() {
        let mut short = record();
        short.lead_time = 100;

        let mut long_a = record();
        long_a.lead_time = 200;
        long_a.is_canceled = true;

        let mut long_b = record();
        long_b.lead_time = 300;
        long_b.is_canceled = true;

        let rate = high_lead_time_cancellation_rate(&table_of(vec![short, long_a, long_b])).unwrap();
        assert_eq!(rate, 100.0);
    }

    #[test]
    fn threshold_is_exclusive() {
        let mut boundary = record();
        boundary.lead_time = 150;
        boundary.is_canceled = true;

        let err = high_lead_time_cancellation_rate(&table_of(vec![boundary])).unwrap_err();
        assert!(matches!(err, DataError::EmptyGroup { .. }));
    }

    #[test]
    fn shares_are_percentages_of_all_bookings() {
        let mut repeat = record();
        repeat.is_repeated_guest = true;
        let mut family = record();
        family.babies = 1;
        let mut direct = record();
        direct.distribution_channel = "Direct".to_string();

        let table = table_of(vec![record(), repeat, family, direct]);
        assert_eq!(repeat_guest_rate(&table).unwrap(), 25.0);
        assert_eq!(family_booking_share(&table).unwrap(), 25.0);
        assert_eq!(direct_booking_share(&table).unwrap(), 25.0);
    }

    #[test]
    fn shares_reject_an_empty_table() {
        let table = table_of(vec![]);
        assert!(repeat_guest_rate(&table).is_err());
        assert!(family_booking_share(&table).is_err());
        assert!(direct_booking_share(&table).is_err());
    }

    #[test]
    fn extremes_pick_peak_and_trough_seasons() {
        let mut summer = record();
        summer.arrival_date_month = "August".to_string();
        summer.adr = 200.0;

        let mut fall = record();
        fall.arrival_date_month = "October".to_string();
        fall.adr = 20.0;

        let extremes = season_extremes(&table_of(vec![summer, fall])).unwrap();
        assert_eq!(extremes.peak.season, Season::Summer);
        assert!((extremes.peak.revenue - 600.0).abs() < 1e-9);
        // Winter and Spring are both zero; the tie goes to Winter.
        assert_eq!(extremes.trough.season, Season::Winter);
        assert_eq!(extremes.trough.revenue, 0.0);
    }
}
