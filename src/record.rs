use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

/// One row as returned by the store: header name → cell text
pub type RawRow = HashMap<String, String>;

/// Collection method for a measurement
///
/// Declaration order is the ordering used when buckets share a period.
/// `Other` holds the cell text of rows written with anything outside the
/// closed set; it is never produced from user input.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(into = "String", from = "String")]
pub enum Method {
    Sonde,
    Naturel,
    Other(String),
}

impl Method {
    /// Methods offered for new measurements
    pub const ALL: [Method; 2] = [Method::Sonde, Method::Naturel];

    pub fn as_str(&self) -> &str {
        match self {
            Method::Sonde => "Sonde",
            Method::Naturel => "Naturel",
            Method::Other(text) => text,
        }
    }

    /// Case-insensitive match against the closed set
    pub fn from_name(name: &str) -> Option<Self> {
        match name.trim().to_lowercase().as_str() {
            "sonde" => Some(Method::Sonde),
            "naturel" => Some(Method::Naturel),
            _ => None,
        }
    }

    /// Method of a stored cell, keeping unknown text as `Other`
    pub fn from_cell(text: &str) -> Self {
        Method::from_name(text).unwrap_or_else(|| Method::Other(text.trim().to_string()))
    }

    pub fn is_known(&self) -> bool {
        !matches!(self, Method::Other(_))
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

impl FromStr for Method {
    type Err = crate::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Method::from_name(s).ok_or_else(|| {
            crate::Error::InvalidInput(format!("unknown method '{}' (expected Sonde or Naturel)", s))
        })
    }
}

impl From<Method> for String {
    fn from(method: Method) -> Self {
        match method {
            Method::Other(text) => text,
            known => known.as_str().to_string(),
        }
    }
}

impl From<String> for Method {
    fn from(text: String) -> Self {
        Method::from_cell(&text)
    }
}

/// How the stored volume text was turned into `volume_ml`
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum VolumeStatus {
    /// Parsed as a non-negative number
    Valid,
    /// Cell empty or column absent on this row
    Missing,
    /// Not a number, or negative; stored as 0
    Invalid,
}

/// A validated measurement
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Record {
    pub captured_at: NaiveDateTime,
    pub submitted_at: Option<NaiveDateTime>,
    pub volume_ml: u32,
    pub volume_status: VolumeStatus,
    pub method: Method,
    pub comment: Option<String>,
    /// 1-based store row at fetch time, header is row 1
    pub row_number: usize,
}

impl Record {
    pub fn volume_flagged(&self) -> bool {
        self.volume_status != VolumeStatus::Valid
    }

    /// Stored method text is outside `Sonde` / `Naturel`
    pub fn method_flagged(&self) -> bool {
        !self.method.is_known()
    }
}

/// Store row for the record at `index` in fetch order
pub fn row_number_for_index(index: usize) -> usize {
    index + 2
}
