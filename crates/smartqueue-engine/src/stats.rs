// SPDX-FileCopyrightText: 2026 SmartQueue Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Statistics aggregation: pure shaping of raw store counters into the
//! dashboard-facing records.
//!
//! The hourly histogram is merged over a fixed business-hours scaffold so
//! charts keep a stable axis even with zero data; hours outside the scaffold
//! that carry orders are still included.

use std::collections::BTreeMap;

use smartqueue_core::TrafficBucket;

/// 12-hour clock label for an hour of day, e.g. `9 AM`, `12 PM`, `11 PM`.
pub fn hour_label(hour: u32) -> String {
    let meridiem = if hour >= 12 { "PM" } else { "AM" };
    let display = match hour % 12 {
        0 => 12,
        h => h,
    };
    format!("{display} {meridiem}")
}

/// Merge raw `(hour, count)` pairs over the business-hours scaffold,
/// ascending by hour.
pub fn merge_hourly(
    counts: &[(u32, u32)],
    open_hour: u32,
    close_hour: u32,
) -> Vec<TrafficBucket> {
    let mut by_hour: BTreeMap<u32, u32> = (open_hour..=close_hour).map(|h| (h, 0)).collect();
    for &(hour, orders) in counts {
        *by_hour.entry(hour).or_insert(0) += orders;
    }
    by_hour
        .into_iter()
        .map(|(hour, orders)| TrafficBucket {
            hour,
            label: hour_label(hour),
            orders,
        })
        .collect()
}

/// The busiest hour's label, earliest hour winning ties. `None` when no hour
/// has any orders.
pub fn peak_hour_label(counts: &[(u32, u32)]) -> Option<String> {
    counts
        .iter()
        .filter(|(_, orders)| *orders > 0)
        .max_by(|(hour_a, orders_a), (hour_b, orders_b)| {
            orders_a.cmp(orders_b).then(hour_b.cmp(hour_a))
        })
        .map(|&(hour, _)| hour_label(hour))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hour_labels_use_twelve_hour_clock() {
        assert_eq!(hour_label(0), "12 AM");
        assert_eq!(hour_label(9), "9 AM");
        assert_eq!(hour_label(12), "12 PM");
        assert_eq!(hour_label(13), "1 PM");
        assert_eq!(hour_label(23), "11 PM");
    }

    #[test]
    fn empty_data_still_shows_the_full_scaffold() {
        let buckets = merge_hourly(&[], 9, 18);
        assert_eq!(buckets.len(), 10);
        assert_eq!(buckets[0].hour, 9);
        assert_eq!(buckets[0].label, "9 AM");
        assert_eq!(buckets[9].hour, 18);
        assert!(buckets.iter().all(|b| b.orders == 0));
    }

    #[test]
    fn data_hours_fill_their_scaffold_slots() {
        let buckets = merge_hourly(&[(12, 4), (13, 2)], 9, 18);
        let noon = buckets.iter().find(|b| b.hour == 12).unwrap();
        assert_eq!(noon.orders, 4);
        let one = buckets.iter().find(|b| b.hour == 13).unwrap();
        assert_eq!(one.orders, 2);
    }

    #[test]
    fn outlier_hours_are_included_and_sorted() {
        let buckets = merge_hourly(&[(7, 1), (21, 3)], 9, 18);
        assert_eq!(buckets.len(), 12);
        assert_eq!(buckets[0].hour, 7, "early outlier sorts first");
        assert_eq!(buckets.last().unwrap().hour, 21);
        assert_eq!(buckets.last().unwrap().orders, 3);
    }

    #[test]
    fn peak_hour_picks_the_busiest_slot() {
        assert_eq!(peak_hour_label(&[]), None);
        assert_eq!(peak_hour_label(&[(9, 0)]), None);
        assert_eq!(
            peak_hour_label(&[(9, 1), (12, 5), (13, 2)]),
            Some("12 PM".to_string())
        );
        // Earliest hour wins a tie.
        assert_eq!(
            peak_hour_label(&[(12, 5), (17, 5)]),
            Some("12 PM".to_string())
        );
    }
}
