use chrono::{Duration, NaiveDate, NaiveDateTime, NaiveTime, Timelike, Utc};
use serde::{Deserialize, Serialize};

use crate::record::Method;
use crate::timeparse::STORE_FORMAT;
use crate::{Error, Result};

/// Increment offered by the volume input
pub const VOLUME_STEP_ML: u32 = 10;

/// How the capture time is picked in the entry form
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TimeInput {
    /// Free time input, minute precision
    #[default]
    Minute,
    /// Fixed list of 30-minute slots
    HalfHour,
}

/// A measurement about to be appended
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewEntry {
    pub captured_at: NaiveDateTime,
    pub volume_ml: u32,
    pub method: Method,
    pub comment: Option<String>,
}

impl NewEntry {
    /// Build an entry from form text.
    ///
    /// # Errors
    /// * `Error::InvalidInput` for a negative or non-integer volume, an
    ///   unknown method, or an unparseable date/time
    pub fn from_form(date: &str, time: &str, volume: &str, method: &str, comment: &str) -> Result<Self> {
        let date = NaiveDate::parse_from_str(date.trim(), "%Y-%m-%d")
            .or_else(|_| NaiveDate::parse_from_str(date.trim(), "%d/%m/%Y"))
            .map_err(|_| Error::InvalidInput(format!("invalid date '{}'", date)))?;
        let time = NaiveTime::parse_from_str(time.trim(), "%H:%M")
            .or_else(|_| NaiveTime::parse_from_str(time.trim(), "%H:%M:%S"))
            .map_err(|_| Error::InvalidInput(format!("invalid time '{}'", time)))?;
        let volume_ml = parse_volume_input(volume)?;
        let method: Method = method.parse()?;

        Ok(Self::new(date.and_time(time), volume_ml, method, comment))
    }

    pub fn new(captured_at: NaiveDateTime, volume_ml: u32, method: Method, comment: &str) -> Self {
        let comment = comment.trim();
        Self {
            captured_at,
            volume_ml,
            method,
            comment: (!comment.is_empty()).then(|| comment.to_string()),
        }
    }

    /// Store row in column order: submitted, captured, volume, method, comment
    pub fn into_row(self, submitted_at: NaiveDateTime) -> Vec<String> {
        vec![
            submitted_at.format(STORE_FORMAT).to_string(),
            self.captured_at.format(STORE_FORMAT).to_string(),
            self.volume_ml.to_string(),
            self.method.to_string(),
            self.comment.unwrap_or_default(),
        ]
    }
}

/// Volume typed by the user: a non-negative whole number of millilitres
pub fn parse_volume_input(text: &str) -> Result<u32> {
    text.trim()
        .parse::<u32>()
        .map_err(|_| Error::InvalidInput(format!("volume must be a non-negative integer, got '{}'", text)))
}

/// Wall-clock time at a fixed offset from UTC, seconds included
pub fn local_now(utc_offset_hours: i32) -> NaiveDateTime {
    Utc::now().naive_utc() + Duration::hours(utc_offset_hours as i64)
}

/// Default capture time shown in the form for `now`
pub fn default_capture_time(now: NaiveDateTime, input: TimeInput) -> NaiveDateTime {
    let minute = match input {
        TimeInput::Minute => now.minute(),
        TimeInput::HalfHour => now.minute() - now.minute() % 30,
    };
    now.date()
        .and_hms_opt(now.hour(), minute, 0)
        .unwrap_or(now)
}

/// The 48 half-hour slots of a day, 00:00 to 23:30
pub fn half_hour_slots() -> Vec<NaiveTime> {
    (0..48)
        .filter_map(|i| NaiveTime::from_hms_opt(i / 2, (i % 2) * 30, 0))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(h: u32, m: u32, s: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 3, 4)
            .unwrap()
            .and_hms_opt(h, m, s)
            .unwrap()
    }

    #[test]
    fn default_time_per_input_mode() {
        assert_eq!(default_capture_time(at(10, 47, 33), TimeInput::Minute), at(10, 47, 0));
        assert_eq!(default_capture_time(at(10, 47, 33), TimeInput::HalfHour), at(10, 30, 0));
        assert_eq!(default_capture_time(at(10, 12, 0), TimeInput::HalfHour), at(10, 0, 0));
    }

    #[test]
    fn slots_cover_the_day() {
        let slots = half_hour_slots();
        assert_eq!(slots.len(), 48);
        assert_eq!(slots[0], NaiveTime::from_hms_opt(0, 0, 0).unwrap());
        assert_eq!(slots[47], NaiveTime::from_hms_opt(23, 30, 0).unwrap());
    }

    #[test]
    fn row_layout() {
        let entry = NewEntry::new(at(8, 0, 0), 300, Method::Sonde, "  ");
        assert_eq!(entry.comment, None);
        let row = entry.into_row(at(8, 5, 12));
        assert_eq!(
            row,
            vec![
                "2024-03-04 08:05:12".to_string(),
                "2024-03-04 08:00:00".to_string(),
                "300".to_string(),
                "Sonde".to_string(),
                String::new(),
            ]
        );
    }

    #[test]
    fn form_validation() {
        let entry = NewEntry::from_form("2024-03-04", "10:00", "200", "sonde", "ok").unwrap();
        assert_eq!(entry.captured_at, at(10, 0, 0));
        assert_eq!(entry.method, Method::Sonde);
        assert_eq!(entry.comment.as_deref(), Some("ok"));

        assert!(NewEntry::from_form("2024-03-04", "10:00", "-10", "Sonde", "").is_err());
        assert!(NewEntry::from_form("2024-03-04", "10:00", "12.5", "Sonde", "").is_err());
        assert!(NewEntry::from_form("2024-03-04", "10:00", "100", "Autre", "").is_err());
        assert!(NewEntry::from_form("2024-13-04", "10:00", "100", "Sonde", "").is_err());
    }
}
