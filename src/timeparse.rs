use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime};
use lazy_static::lazy_static;
use regex::Regex;

/// Format written to the store for both timestamps
pub const STORE_FORMAT: &str = "%Y-%m-%d %H:%M:%S";
/// French format found in older rows
pub const FRENCH_FORMAT: &str = "%d/%m/%Y %H:%M:%S";

lazy_static! {
    // date with any of - / . separators, optional time (HH:MM, HHhMM, optional seconds/fraction)
    static ref LOOSE_DATETIME_REGEX: Regex = Regex::new(
        r"^(\d{1,4})[-/.](\d{1,2})[-/.](\d{1,4})(?:[ T]+(\d{1,2})[:hH](\d{2})(?::(\d{2}))?(?:[.,]\d+)?)?$"
    )
    .unwrap();
}

/// Which parser accepted a timestamp
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TimestampFormat {
    Iso,
    French,
    Permissive,
}

/// Parse a stored timestamp, trying ISO, then French, then the permissive
/// day-first parser. `None` means the row should be dropped.
///
/// # Examples
/// ```
/// use hurina::timeparse::parse_timestamp;
///
/// let iso = parse_timestamp("2024-01-01 08:00:00").unwrap();
/// let fr = parse_timestamp("01/01/2024 08:00:00").unwrap();
/// assert_eq!(iso, fr);
/// assert!(parse_timestamp("bad-date").is_none());
/// ```
pub fn parse_timestamp(raw: &str) -> Option<NaiveDateTime> {
    parse_timestamp_detailed(raw).map(|(dt, _)| dt)
}

pub fn parse_timestamp_detailed(raw: &str) -> Option<(NaiveDateTime, TimestampFormat)> {
    let s = raw.trim();
    if s.is_empty() {
        return None;
    }
    if let Ok(dt) = NaiveDateTime::parse_from_str(s, STORE_FORMAT) {
        return Some((dt, TimestampFormat::Iso));
    }
    if let Ok(dt) = NaiveDateTime::parse_from_str(s, FRENCH_FORMAT) {
        return Some((dt, TimestampFormat::French));
    }
    parse_permissive(s).map(|dt| (dt, TimestampFormat::Permissive))
}

/// Fallback parser: RFC 3339, or a loose date (optionally with a time) read
/// day-first unless the year comes first. Falls back to month-first when the
/// day-first reading is not a real date.
fn parse_permissive(s: &str) -> Option<NaiveDateTime> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.naive_local());
    }

    let caps = LOOSE_DATETIME_REGEX.captures(s)?;
    let first = caps.get(1)?.as_str();
    let second: u32 = caps.get(2)?.as_str().parse().ok()?;
    let third = caps.get(3)?.as_str();

    let date = if first.len() == 4 {
        let year: i32 = first.parse().ok()?;
        let day: u32 = third.parse().ok()?;
        NaiveDate::from_ymd_opt(year, second, day)?
    } else {
        let lead: u32 = first.parse().ok()?;
        let year = expand_year(third)?;
        NaiveDate::from_ymd_opt(year, second, lead)
            .or_else(|| NaiveDate::from_ymd_opt(year, lead, second))?
    };

    let time = match caps.get(4) {
        Some(hour) => {
            let hour: u32 = hour.as_str().parse().ok()?;
            let minute: u32 = caps.get(5)?.as_str().parse().ok()?;
            let second: u32 = match caps.get(6) {
                Some(sec) => sec.as_str().parse().ok()?,
                None => 0,
            };
            NaiveTime::from_hms_opt(hour, minute, second)?
        }
        None => NaiveTime::MIN,
    };

    Some(date.and_time(time))
}

fn expand_year(text: &str) -> Option<i32> {
    let year: i32 = text.parse().ok()?;
    match text.len() {
        4 => Some(year),
        1 | 2 if year < 70 => Some(2000 + year),
        1 | 2 => Some(1900 + year),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dt(y: i32, m: u32, d: u32, h: u32, mi: u32, s: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, m, d)
            .unwrap()
            .and_hms_opt(h, mi, s)
            .unwrap()
    }

    #[test]
    fn stages_in_priority_order() {
        assert_eq!(
            parse_timestamp_detailed("2024-03-04 10:00:00"),
            Some((dt(2024, 3, 4, 10, 0, 0), TimestampFormat::Iso))
        );
        assert_eq!(
            parse_timestamp_detailed("04/03/2024 10:00:00"),
            Some((dt(2024, 3, 4, 10, 0, 0), TimestampFormat::French))
        );
        assert_eq!(
            parse_timestamp_detailed("04/03/2024 10:00"),
            Some((dt(2024, 3, 4, 10, 0, 0), TimestampFormat::Permissive))
        );
    }

    #[test]
    fn permissive_is_day_first() {
        assert_eq!(parse_timestamp("05/06/2024"), Some(dt(2024, 6, 5, 0, 0, 0)));
        assert_eq!(parse_timestamp("5.6.24 7h30"), Some(dt(2024, 6, 5, 7, 30, 0)));
        // 13 cannot be a month, so the month-first reading wins
        assert_eq!(parse_timestamp("06/13/2024"), Some(dt(2024, 6, 13, 0, 0, 0)));
    }

    #[test]
    fn permissive_accepts_rfc3339_and_iso_variants() {
        assert_eq!(
            parse_timestamp("2024-01-07T21:15:00+02:00"),
            Some(dt(2024, 1, 7, 21, 15, 0))
        );
        assert_eq!(parse_timestamp("2024-01-07 21:15"), Some(dt(2024, 1, 7, 21, 15, 0)));
        assert_eq!(parse_timestamp("2024/01/07"), Some(dt(2024, 1, 7, 0, 0, 0)));
    }

    #[test]
    fn rejects_garbage() {
        for bad in ["", "   ", "bad-date", "32/13/2024", "2024-02-30 10:00:00", "10:00"] {
            assert!(parse_timestamp(bad).is_none(), "{} should not parse", bad);
        }
    }
}
