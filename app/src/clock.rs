use std::fmt::Write;

use chrono::{Local, NaiveDate};
use log::*;

/// The short date format of the `es` locale.
pub const DEFAULT_DATE_FORMAT: &str = "%d/%m/%Y";

/// Supplies the calendar date stamped on an achievement when it unlocks.
pub trait Clock {
    fn today(&self) -> NaiveDate;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn today(&self) -> NaiveDate {
        Local::now().date_naive()
    }
}

#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub NaiveDate);

impl Clock for FixedClock {
    fn today(&self) -> NaiveDate {
        self.0
    }
}

/// Formats `date` with a strftime pattern, falling back to ISO 8601 if the
/// pattern cannot be rendered.
pub fn format_date(date: NaiveDate, pattern: &str) -> String {
    let mut out = String::new();
    if write!(out, "{}", date.format(pattern)).is_err() {
        warn!("Unusable date format {:?}; using ISO 8601", pattern);
        return date.format("%Y-%m-%d").to_string();
    }
    out
}
