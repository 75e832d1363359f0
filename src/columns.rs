//! Column alias resolution.
//!
//! Header names drifted across versions of the sheet ("Volume (mL)" vs
//! "Volume urinaire (en mL)"), so every logical field carries a list of
//! accepted header names, tried in order.

use serde::{Deserialize, Serialize};

use crate::record::RawRow;
use crate::{Error, Result};

/// Logical fields of a measurement row
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Field {
    CapturedAt,
    SubmittedAt,
    Volume,
    Method,
    Comment,
}

impl Field {
    /// Fields whose column must exist somewhere in a non-empty snapshot
    pub const REQUIRED: [Field; 3] = [Field::CapturedAt, Field::Volume, Field::Method];

    pub fn name(&self) -> &'static str {
        match self {
            Field::CapturedAt => "captured_at",
            Field::SubmittedAt => "submitted_at",
            Field::Volume => "volume",
            Field::Method => "method",
            Field::Comment => "comment",
        }
    }
}

/// Accepted header names per logical field
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ColumnAliases {
    pub captured_at: Vec<String>,
    pub submitted_at: Vec<String>,
    pub volume: Vec<String>,
    pub method: Vec<String>,
    pub comment: Vec<String>,
}

impl Default for ColumnAliases {
    fn default() -> Self {
        Self {
            captured_at: vec!["Saisie temps".to_string()],
            submitted_at: vec!["Horodatage".to_string()],
            volume: vec![
                "Volume (mL)".to_string(),
                "Volume urinaire (en mL)".to_string(),
            ],
            method: vec!["Méthode utilisée".to_string()],
            comment: vec!["Commentaire (optionnel)".to_string()],
        }
    }
}

impl ColumnAliases {
    pub fn aliases(&self, field: Field) -> &[String] {
        match field {
            Field::CapturedAt => &self.captured_at,
            Field::SubmittedAt => &self.submitted_at,
            Field::Volume => &self.volume,
            Field::Method => &self.method,
            Field::Comment => &self.comment,
        }
    }

    /// Header written for `field` when creating a new sheet
    pub fn primary(&self, field: Field) -> Option<&str> {
        self.aliases(field).first().map(String::as_str)
    }

    /// Value of `field` in `row`, using the first alias the row has
    pub fn lookup<'a>(&self, field: Field, row: &'a RawRow) -> Option<&'a str> {
        self.aliases(field)
            .iter()
            .find_map(|alias| row.get(alias))
            .map(String::as_str)
    }

    /// Fail on the first required field that no row of the snapshot carries.
    ///
    /// An empty snapshot passes: there is nothing to be missing from.
    pub fn check_required(&self, rows: &[RawRow]) -> Result<()> {
        if rows.is_empty() {
            return Ok(());
        }
        for field in Field::REQUIRED {
            let aliases = self.aliases(field);
            let present = rows
                .iter()
                .any(|row| aliases.iter().any(|alias| row.contains_key(alias)));
            if !present {
                return Err(Error::MissingColumn {
                    field: field.name().to_string(),
                    aliases: aliases.to_vec(),
                });
            }
        }
        Ok(())
    }

    /// Header row matching the store's positional append order
    pub fn default_header(&self) -> Vec<String> {
        [
            Field::SubmittedAt,
            Field::CapturedAt,
            Field::Volume,
            Field::Method,
            Field::Comment,
        ]
        .iter()
        .map(|f| self.primary(*f).unwrap_or(f.name()).to_string())
        .collect()
    }
}
