#![allow(dead_code)]

use chrono::{NaiveDate, NaiveDateTime};
use hurina::record::RawRow;
use hurina::store::MemoryStore;

pub const TIME: &str = "Saisie temps";
pub const SUBMITTED: &str = "Horodatage";
pub const VOLUME: &str = "Volume (mL)";
pub const VOLUME_OLD: &str = "Volume urinaire (en mL)";
pub const METHOD: &str = "Méthode utilisée";
pub const COMMENT: &str = "Commentaire (optionnel)";

pub fn raw(pairs: &[(&str, &str)]) -> RawRow {
    pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}

/// Row with the three required columns
pub fn measurement(time: &str, volume: &str, method: &str) -> RawRow {
    raw(&[(TIME, time), (VOLUME, volume), (METHOD, method)])
}

pub fn dt(y: i32, m: u32, d: u32, h: u32, mi: u32) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(y, m, d)
        .unwrap()
        .and_hms_opt(h, mi, 0)
        .unwrap()
}

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

pub fn header() -> Vec<String> {
    [SUBMITTED, TIME, VOLUME, METHOD, COMMENT]
        .iter()
        .map(|s| s.to_string())
        .collect()
}

/// Sheet with rows given as (capture time, volume, method)
pub fn sheet(rows: &[(&str, &str, &str)]) -> MemoryStore {
    MemoryStore::with_rows(
        header(),
        rows.iter()
            .map(|(t, v, m)| {
                vec![
                    "2024-01-01 00:00:00".to_string(),
                    t.to_string(),
                    v.to_string(),
                    m.to_string(),
                    String::new(),
                ]
            })
            .collect(),
    )
}
