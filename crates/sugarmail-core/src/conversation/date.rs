//! Short date display for message headers.

use chrono::{DateTime, Datelike};
use serde::{Deserialize, Serialize};

/// Order of day and month in displayed dates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DateOrder {
    /// `DD/MM/YYYY`.
    #[default]
    DayMonthYear,
    /// `MM/DD/YYYY`.
    MonthDayYear,
}

/// Formats a `Date` (or `Received`) header value as a short date.
///
/// For `Received` values only the part after the last `;` is read. Input
/// that holds no recognizable date is returned unchanged.
#[must_use]
pub fn format_date(header: &str, order: DateOrder) -> String {
    let candidate = header.rsplit(';').next().unwrap_or(header).trim();

    let date = DateTime::parse_from_rfc2822(candidate)
        .ok()
        .map(|dt| (dt.day(), dt.month(), dt.year()))
        .or_else(|| scan_date(candidate));

    let Some((day, month, year)) = date else {
        return header.to_string();
    };

    match order {
        DateOrder::DayMonthYear => format!("{day:02}/{month:02}/{year}"),
        DateOrder::MonthDayYear => format!("{month:02}/{day:02}/{year}"),
    }
}

/// Finds a `day month-name year` token run, e.g. `14 Dec 2016`.
fn scan_date(text: &str) -> Option<(u32, u32, i32)> {
    let tokens: Vec<&str> = text
        .split(|c: char| c.is_whitespace() || c == ',')
        .filter(|t| !t.is_empty())
        .collect();

    tokens.windows(3).find_map(|w| {
        let day = w[0].parse::<u32>().ok().filter(|d| (1..=31).contains(d))?;
        let month = month_number(w[1])?;
        let year = w[2].parse::<i32>().ok()?;
        Some((day, month, year))
    })
}

fn month_number(name: &str) -> Option<u32> {
    let prefix = name.get(..3)?.to_ascii_lowercase();
    let month = match prefix.as_str() {
        "jan" => 1,
        "feb" => 2,
        "mar" => 3,
        "apr" => 4,
        "may" => 5,
        "jun" => 6,
        "jul" => 7,
        "aug" => 8,
        "sep" => 9,
        "oct" => 10,
        "nov" => 11,
        "dec" => 12,
        _ => return None,
    };
    Some(month)
}

#[cfg(test)]
#[allow(
    clippy::unwrap_used,
    clippy::redundant_clone,
    clippy::manual_string_new,
    clippy::needless_collect,
    clippy::unreadable_literal,
    clippy::used_underscore_items,
    clippy::similar_names
)]
mod tests {
    use super::*;

    #[test]
    fn test_rfc2822_date() {
        assert_eq!(
            format_date("Wed, 14 Dec 2016 13:59:09 -0800", DateOrder::DayMonthYear),
            "14/12/2016"
        );
        assert_eq!(
            format_date("Wed, 14 Dec 2016 13:59:09 -0800", DateOrder::MonthDayYear),
            "12/14/2016"
        );
    }

    #[test]
    fn test_received_header() {
        assert_eq!(
            format_date(
                "by 10.237.49.66 with HTTP; Wed, 14 Dec 2016 13:59:09 -0800 (PST)",
                DateOrder::DayMonthYear
            ),
            "14/12/2016"
        );
    }

    #[test]
    fn test_single_digit_day_and_long_month() {
        assert_eq!(
            format_date("Mon, 4 Sept 2017 08:00:00 +0000 (UTC)", DateOrder::DayMonthYear),
            "04/09/2017"
        );
    }

    #[test]
    fn test_unparseable_is_unchanged() {
        assert_eq!(format_date("sometime soon", DateOrder::DayMonthYear), "sometime soon");
        assert_eq!(format_date("", DateOrder::MonthDayYear), "");
    }

    #[test]
    fn test_month_number() {
        assert_eq!(month_number("Jan"), Some(1));
        assert_eq!(month_number("DECEMBER"), Some(12));
        assert_eq!(month_number("Ja"), None);
        assert_eq!(month_number("Foo"), None);
    }
}
