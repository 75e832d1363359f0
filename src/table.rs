use serde::Serialize;

use crate::record::{Method, Record};

/// One line of the history table
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct TableRow {
    /// `DD/MM/YYYY`
    pub date: String,
    /// `HH:MM`
    pub heure: String,
    pub volume_ml: u32,
    pub volume_flagged: bool,
    pub method: Method,
    pub method_flagged: bool,
    pub comment: String,
    pub row_number: usize,
}

/// Column titles shown above the table and in exports
pub const TABLE_HEADERS: [&str; 5] = [
    "Date",
    "Heure",
    "Volume (mL)",
    "Méthode utilisée",
    "Commentaire (optionnel)",
];

/// Table rows in record order (most recent first)
pub fn build_table(records: &[Record]) -> Vec<TableRow> {
    records
        .iter()
        .map(|r| TableRow {
            date: r.captured_at.format("%d/%m/%Y").to_string(),
            heure: r.captured_at.format("%H:%M").to_string(),
            volume_ml: r.volume_ml,
            volume_flagged: r.volume_flagged(),
            method: r.method.clone(),
            method_flagged: r.method_flagged(),
            comment: r.comment.clone().unwrap_or_default(),
            row_number: r.row_number,
        })
        .collect()
}
