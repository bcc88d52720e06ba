//! NBA season arithmetic.

use chrono::{Datelike, NaiveDate};

/// Start year of the season a date belongs to.
///
/// July onward belongs to the season starting that year; January to June
/// to the one that started the year before. Accepts `YYYY-MM-DD` with an
/// optional time suffix.
///
/// ```rust
/// # use courtside::types::season_start_year;
/// assert_eq!(season_start_year("2024-01-15"), Some(2023));
/// assert_eq!(season_start_year("2024-10-22T00:00:00"), Some(2024));
/// assert_eq!(season_start_year("not a date"), None);
/// ```
pub fn season_start_year(date: &str) -> Option<i32> {
    let date = parse_date(date)?;
    Some(if date.month() >= 7 {
        date.year()
    } else {
        date.year() - 1
    })
}

/// Season label for a start year: `2023` → `"2023-24"`.
pub fn season_label(start_year: i32) -> String {
    format!("{start_year}-{:02}", (start_year + 1).rem_euclid(100))
}

/// Parse the date part of `YYYY-MM-DD[THH:MM:SS...]`.
pub fn parse_date(date: &str) -> Option<NaiveDate> {
    let day = date.trim().split(['T', ' ']).next()?;
    NaiveDate::parse_from_str(day, "%Y-%m-%d").ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn season_boundaries() {
        assert_eq!(season_start_year("2024-06-30"), Some(2023));
        assert_eq!(season_start_year("2024-07-01"), Some(2024));
        assert_eq!(season_start_year("2024-01-01 12:00:00"), Some(2023));
    }

    #[test]
    fn labels() {
        assert_eq!(season_label(2023), "2023-24");
        assert_eq!(season_label(1999), "1999-00");
        assert_eq!(season_label(2009), "2009-10");
    }

    #[test]
    fn parse_rejects_garbage() {
        assert!(parse_date("2024-13-01").is_none());
        assert!(parse_date("").is_none());
        assert_eq!(
            parse_date("2024-02-29T10:00:00Z"),
            NaiveDate::from_ymd_opt(2024, 2, 29)
        );
    }
}
