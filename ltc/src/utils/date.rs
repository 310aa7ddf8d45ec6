//! Calendar helpers for user-bit recording dates.

use chrono::{Local, NaiveDate};
use serde::Serialize;

/// Source of the "current" date used when a timecode carries no usable date.
///
/// Injected into the [`Validator`](crate::process::validate::Validator) so
/// tests can pin the fallback date.
pub trait DateProvider {
    fn today(&self) -> NaiveDate;
}

/// Local wall-clock date.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemDate;

impl DateProvider for SystemDate {
    fn today(&self) -> NaiveDate {
        Local::now().date_naive()
    }
}

/// Always returns the same date.
#[derive(Debug, Clone, Copy)]
pub struct FixedDate(pub NaiveDate);

impl DateProvider for FixedDate {
    fn today(&self) -> NaiveDate {
        self.0
    }
}

/// How a two-digit year is expanded to four digits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CenturyPolicy {
    /// Always 20YY.
    Prefix20,
    /// 00-49 become 20YY, 50-99 become 19YY.
    Pivot50,
}

impl CenturyPolicy {
    pub fn expand(self, year: u8) -> i32 {
        let year = year as i32;
        match self {
            CenturyPolicy::Prefix20 => 2000 + year,
            CenturyPolicy::Pivot50 if year < 50 => 2000 + year,
            CenturyPolicy::Pivot50 => 1900 + year,
        }
    }
}

#[test]
fn century_expansion() {
    assert_eq!(CenturyPolicy::Prefix20.expand(24), 2024);
    assert_eq!(CenturyPolicy::Prefix20.expand(87), 2087);
    assert_eq!(CenturyPolicy::Pivot50.expand(49), 2049);
    assert_eq!(CenturyPolicy::Pivot50.expand(50), 1950);
    assert_eq!(CenturyPolicy::Pivot50.expand(99), 1999);
}

#[test]
fn fixed_date_provider() {
    let date = NaiveDate::from_ymd_opt(2026, 10, 18).unwrap();
    assert_eq!(FixedDate(date).today(), date);
}
