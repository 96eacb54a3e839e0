use time::macros::format_description;
use time::{Date, OffsetDateTime};

use crate::ValidationError;

/// Parses a `YYYY-MM-DD` calendar date.
pub fn parse_date(input: &str) -> Result<Date, ValidationError> {
    Date::parse(input.trim(), format_description!("[year]-[month]-[day]")).map_err(|_| {
        ValidationError::InvalidDate {
            value: input.to_owned(),
        }
    })
}

/// Formats a date as `YYYY-MM-DD`.
pub fn format_date(date: Date) -> String {
    date.format(format_description!("[year]-[month]-[day]"))
        .unwrap_or_else(|_| String::from("<unformattable>"))
}

/// Today's UTC date as `YYYYMMDD`, used in default output file names.
pub fn utc_date_stamp() -> String {
    compact_date(OffsetDateTime::now_utc().date())
}

pub fn compact_date(date: Date) -> String {
    date.format(format_description!("[year][month][day]"))
        .unwrap_or_else(|_| String::from("00000000"))
}
