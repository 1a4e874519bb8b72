#![allow(missing_docs)]

//! Ticket prices for a concrete departure.

use std::fmt;

use chrono::{Datelike, Local, NaiveDate, TimeZone};
use serde::Serialize;

use crate::models::{BasicRoute, Price};

/// Percentage taken off fares departing on the last day of a month.
pub const MONTH_END_DISCOUNT_PERCENT: i64 = 10;

/// Single and return prices for one journey.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Fare {
    pub single: Price,
    pub return_price: Price,
    /// Whether the month-end discount was applied.
    pub discounted: bool,
}

impl Fare {
    /// Fare for `route` departing at `departure` (milliseconds, local calendar).
    pub fn for_departure(route: &BasicRoute, departure: i64) -> Self {
        let discounted = departure_date(departure)
            .map(is_last_day_of_month)
            .unwrap_or(false);
        Self::build(route, discounted)
    }

    /// Fare for `route` departing on `date`.
    pub fn for_date(route: &BasicRoute, date: NaiveDate) -> Self {
        Self::build(route, is_last_day_of_month(date))
    }

    fn build(route: &BasicRoute, discounted: bool) -> Self {
        let apply = |price: Price| {
            if discounted {
                price.discounted(MONTH_END_DISCOUNT_PERCENT)
            } else {
                price
            }
        };
        Self {
            single: apply(route.single_price),
            return_price: apply(route.return_price),
            discounted,
        }
    }

    /// Display label for a price, flagging the discount, e.g. `£22.50 (10% off!)`.
    pub fn label(&self, price: Price) -> String {
        if self.discounted {
            format!("{} ({MONTH_END_DISCOUNT_PERCENT}% off!)", price.formatted())
        } else {
            price.formatted()
        }
    }
}

impl fmt::Display for Fare {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "single {}, return {}",
            self.label(self.single),
            self.label(self.return_price)
        )
    }
}

/// Local calendar date of a millisecond timestamp.
pub fn departure_date(timestamp: i64) -> Option<NaiveDate> {
    Local
        .timestamp_millis_opt(timestamp)
        .single()
        .map(|moment| moment.date_naive())
}

pub fn is_last_day_of_month(date: NaiveDate) -> bool {
    date.succ_opt()
        .map(|next| next.month() != date.month())
        .unwrap_or(true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::route;

    fn date(year: i32, month: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(year, month, day).expect("valid date")
    }

    #[test]
    fn detects_month_end() {
        assert!(is_last_day_of_month(date(2027, 1, 31)));
        assert!(is_last_day_of_month(date(2028, 2, 29)));
        assert!(is_last_day_of_month(date(2027, 2, 28)));
        assert!(!is_last_day_of_month(date(2028, 2, 28)));
        assert!(!is_last_day_of_month(date(2027, 4, 15)));
    }

    #[test]
    fn month_end_departures_get_ten_percent_off() {
        let route = route("r", "a", "b");
        let fare = Fare::for_date(&route, date(2027, 4, 30));
        assert!(fare.discounted);
        assert_eq!(fare.single, Price::from_minor(2250));
        assert_eq!(fare.return_price, Price::from_minor(3600));
        assert_eq!(fare.label(fare.single), "£22.50 (10% off!)");

        let fare = Fare::for_date(&route, date(2027, 4, 29));
        assert!(!fare.discounted);
        assert_eq!(fare.to_string(), "single £25.00, return £40.00");
    }

    #[test]
    fn departure_timestamps_use_the_local_calendar() {
        let route = route("r", "a", "b");
        let noon = Local
            .with_ymd_and_hms(2027, 4, 30, 12, 0, 0)
            .single()
            .expect("unambiguous local time");
        let fare = Fare::for_departure(&route, noon.timestamp_millis());
        assert!(fare.discounted);
        assert_eq!(departure_date(noon.timestamp_millis()), Some(date(2027, 4, 30)));
    }
}
