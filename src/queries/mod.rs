/// Aggregation catalog over the enriched booking table.
///
/// Every query is a pure read of a `BookingTable` returning a small
/// chart-ready result. Queries share no mutable state, so they can run in
/// any order; a failing query never poisons the table or its neighbours.
///
/// Modules follow the dashboard sections they feed:
/// * `overview` – headline metrics and the feature correlation matrix
/// * `customers` – booking-behaviour and customer-mix breakdowns
/// * `revenue` – revenue grouped by season, channel, country and hotel
/// * `strategy` – the scalar rates behind the recommendations copy
pub mod customers;
pub mod overview;
pub mod revenue;
pub mod stats;
pub mod strategy;

use std::collections::HashMap;

use crate::data::model::Booking;

/// One group accumulated by [`group_by_key`]: row count plus the sum of the
/// chosen value column.
pub(crate) struct GroupAccum {
    pub key: String,
    pub count: u64,
    pub sum: f64,
}

/// Group bookings by a string key, preserving first-appearance order of the
/// keys. Sorting the result with a stable sort therefore breaks ties by
/// original row order.
pub(crate) fn group_by_key(
    bookings: &[Booking],
    mut key: impl FnMut(&Booking) -> String,
    mut value: impl FnMut(&Booking) -> f64,
) -> Vec<GroupAccum> {
    let mut index: HashMap<String, usize> = HashMap::new();
    let mut groups: Vec<GroupAccum> = Vec::new();

    for booking in bookings {
        let k = key(booking);
        let slot = match index.get(&k) {
            Some(&i) => i,
            None => {
                let i = groups.len();
                index.insert(k.clone(), i);
                groups.push(GroupAccum {
                    key: k,
                    count: 0,
                    sum: 0.0,
                });
                i
            }
        };
        groups[slot].count += 1;
        groups[slot].sum += value(booking);
    }

    groups
}
