//! Record labels and the deletion protocol.
//!
//! Labels are not unique: two measurements with the same minute, volume and
//! method render identically. Resolution always picks the first match in the
//! most-recent-first order, which is the row the selection list shows first.

use log::{info, warn};

use crate::columns::ColumnAliases;
use crate::normalizer::normalize;
use crate::record::Record;
use crate::store::RowStore;
use crate::{Error, Result};

/// Timestamp part of a label
pub const LABEL_TIME_FORMAT: &str = "%d/%m/%Y %H:%M";

/// `"DD/MM/YYYY HH:MM • <volume> mL • <method>"`
pub fn label_for(record: &Record) -> String {
    format!(
        "{} • {} mL • {}",
        record.captured_at.format(LABEL_TIME_FORMAT),
        record.volume_ml,
        record.method
    )
}

/// One `(label, row_number)` per record, in record order
pub fn build_labels(records: &[Record]) -> Vec<(String, usize)> {
    records
        .iter()
        .map(|r| (label_for(r), r.row_number))
        .collect()
}

/// Row number of the first record carrying `label`
pub fn resolve(label: &str, records: &[Record]) -> Option<usize> {
    records
        .iter()
        .find(|r| label_for(r) == label)
        .map(|r| r.row_number)
}

/// Outcome of a confirmed deletion
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Deleted {
    pub label: String,
    pub row_number: usize,
}

/// Delete the record shown as `label`.
///
/// Always fetches a fresh snapshot from `store` and resolves against it, so
/// the row number cannot come from an older view of the sheet. Nothing is
/// written unless `confirmed` is true. The caller decides whether to refresh
/// afterwards.
///
/// # Errors
/// * `Error::UnknownLabel` if no record in the fresh snapshot has the label
/// * `Error::NotConfirmed` if `confirmed` is false
/// * any store or normalization error, unchanged
pub fn delete_by_label<S: RowStore + ?Sized>(
    store: &mut S,
    aliases: &ColumnAliases,
    label: &str,
    confirmed: bool,
) -> Result<Deleted> {
    let rows = store.fetch_all_rows()?;
    let records = normalize(&rows, aliases)?;

    let row_number =
        resolve(label, &records).ok_or_else(|| Error::UnknownLabel(label.to_string()))?;

    if !confirmed {
        warn!("delete of row {} ('{}') not confirmed", row_number, label);
        return Err(Error::NotConfirmed {
            label: label.to_string(),
        });
    }

    store.delete_row(row_number)?;
    info!("deleted row {} ('{}')", row_number, label);

    Ok(Deleted {
        label: label.to_string(),
        row_number,
    })
}
