use chrono::{Datelike, Duration, NaiveDate};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use crate::record::{Method, Record};

/// Bucket width for charts
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Granularity {
    Daily,
    /// ISO weeks, starting Monday
    Weekly,
}

impl Granularity {
    /// Start of the period containing `date`
    pub fn period_start(&self, date: NaiveDate) -> NaiveDate {
        match self {
            Granularity::Daily => date,
            Granularity::Weekly => {
                date - Duration::days(date.weekday().num_days_from_monday() as i64)
            }
        }
    }
}

impl fmt::Display for Granularity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Granularity::Daily => f.write_str("daily"),
            Granularity::Weekly => f.write_str("weekly"),
        }
    }
}

impl FromStr for Granularity {
    type Err = crate::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "daily" | "day" | "jour" => Ok(Granularity::Daily),
            "weekly" | "week" | "semaine" => Ok(Granularity::Weekly),
            other => Err(crate::Error::InvalidInput(format!(
                "unknown granularity '{}' (expected daily or weekly)",
                other
            ))),
        }
    }
}

/// Summed volume for one (period, method) pair
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AggregatedBucket {
    pub period_start: NaiveDate,
    pub method: Method,
    pub volume_sum: u64,
}

/// Sum volumes per period and method, oldest period first.
///
/// Input order does not matter. Within a period, buckets follow `Method`
/// order.
///
/// # Examples
/// ```
/// use chrono::NaiveDate;
/// use hurina::aggregator::{aggregate, Granularity};
///
/// assert!(aggregate(&[], Granularity::Weekly).is_empty());
/// let monday = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
/// let sunday = NaiveDate::from_ymd_opt(2024, 1, 7).unwrap();
/// assert_eq!(Granularity::Weekly.period_start(sunday), monday);
/// ```
pub fn aggregate(records: &[Record], granularity: Granularity) -> Vec<AggregatedBucket> {
    let mut sums: BTreeMap<(NaiveDate, Method), u64> = BTreeMap::new();

    for record in records {
        let key = (
            granularity.period_start(record.captured_at.date()),
            record.method.clone(),
        );
        *sums.entry(key).or_insert(0) += record.volume_ml as u64;
    }

    sums.into_iter()
        .map(|((period_start, method), volume_sum)| AggregatedBucket {
            period_start,
            method,
            volume_sum,
        })
        .collect()
}

/// Total volume over a set of buckets
pub fn total_volume(buckets: &[AggregatedBucket]) -> u64 {
    buckets.iter().map(|b| b.volume_sum).sum()
}
