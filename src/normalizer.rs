use log::{debug, warn};

use crate::columns::{ColumnAliases, Field};
use crate::record::{Method, RawRow, Record, VolumeStatus, row_number_for_index};
use crate::timeparse::{TimestampFormat, parse_timestamp, parse_timestamp_detailed};
use crate::Result;

/// Turn a raw store snapshot into validated records, most recent first.
///
/// Rows whose capture timestamp does not parse are dropped. Volumes that are
/// not non-negative numbers become 0 and are flagged; a method outside the
/// closed set is kept as `Method::Other` with the cell text. Row numbers come from the position in
/// `raw_rows`, so the slice must be exactly what the store returned.
///
/// # Errors
/// * `Error::MissingColumn` when a required field has no column anywhere in
///   a non-empty snapshot
///
/// # Examples
/// ```
/// use hurina::columns::ColumnAliases;
/// use hurina::normalizer::normalize;
/// use hurina::record::{Method, RawRow};
///
/// let row = |t: &str, v: &str, m: &str| -> RawRow {
///     [("Saisie temps", t), ("Volume (mL)", v), ("Méthode utilisée", m)]
///         .iter()
///         .map(|(k, v)| (k.to_string(), v.to_string()))
///         .collect()
/// };
/// let rows = vec![
///     row("2024-01-01 08:00:00", "300", "Sonde"),
///     row("bad-date", "50", "Naturel"),
/// ];
///
/// let records = normalize(&rows, &ColumnAliases::default()).unwrap();
/// assert_eq!(records.len(), 1);
/// assert_eq!(records[0].volume_ml, 300);
/// assert_eq!(records[0].method, Method::Sonde);
/// assert_eq!(records[0].row_number, 2);
/// ```
pub fn normalize(raw_rows: &[RawRow], aliases: &ColumnAliases) -> Result<Vec<Record>> {
    aliases.check_required(raw_rows)?;

    let mut records: Vec<Record> = raw_rows
        .iter()
        .enumerate()
        .filter_map(|(index, row)| normalize_row(row, row_number_for_index(index), aliases))
        .collect();

    // ties: later store rows first
    records.sort_by(|a, b| {
        b.captured_at
            .cmp(&a.captured_at)
            .then_with(|| b.row_number.cmp(&a.row_number))
    });

    debug!(
        "normalized {} of {} rows",
        records.len(),
        raw_rows.len()
    );
    Ok(records)
}

fn normalize_row(row: &RawRow, row_number: usize, aliases: &ColumnAliases) -> Option<Record> {
    let raw_time = aliases.lookup(Field::CapturedAt, row).unwrap_or("");
    let Some((captured_at, format)) = parse_timestamp_detailed(raw_time) else {
        debug!("row {}: unparseable timestamp '{}', dropped", row_number, raw_time);
        return None;
    };
    if format == TimestampFormat::Permissive {
        debug!("row {}: loose timestamp '{}' read as {}", row_number, raw_time, captured_at);
    }

    let method = Method::from_cell(aliases.lookup(Field::Method, row).unwrap_or(""));
    if !method.is_known() {
        warn!("row {}: unknown method '{}', kept as is", row_number, method);
    }

    let (volume_ml, volume_status) = coerce_volume(aliases.lookup(Field::Volume, row));
    if volume_status == VolumeStatus::Invalid {
        debug!("row {}: volume coerced to 0", row_number);
    }

    let submitted_at = aliases
        .lookup(Field::SubmittedAt, row)
        .and_then(parse_timestamp);

    let comment = aliases
        .lookup(Field::Comment, row)
        .map(str::trim)
        .filter(|c| !c.is_empty())
        .map(str::to_string);

    Some(Record {
        captured_at,
        submitted_at,
        volume_ml,
        volume_status,
        method,
        comment,
        row_number,
    })
}

/// Read a volume cell as a non-negative integer.
///
/// Decimals are truncated ("250.0" and "250,7" both give 250). Anything else
/// yields 0 with a non-valid status.
pub fn coerce_volume(raw: Option<&str>) -> (u32, VolumeStatus) {
    let text = match raw.map(str::trim) {
        Some(t) if !t.is_empty() => t,
        _ => return (0, VolumeStatus::Missing),
    };

    if let Ok(n) = text.parse::<u32>() {
        return (n, VolumeStatus::Valid);
    }
    match text.replace(',', ".").parse::<f64>() {
        Ok(f) if f.is_finite() && f >= 0.0 && f <= u32::MAX as f64 => {
            (f.trunc() as u32, VolumeStatus::Valid)
        }
        _ => (0, VolumeStatus::Invalid),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn volume_coercion() {
        assert_eq!(coerce_volume(Some("300")), (300, VolumeStatus::Valid));
        assert_eq!(coerce_volume(Some(" 250.0 ")), (250, VolumeStatus::Valid));
        assert_eq!(coerce_volume(Some("250,7")), (250, VolumeStatus::Valid));
        assert_eq!(coerce_volume(Some("")), (0, VolumeStatus::Missing));
        assert_eq!(coerce_volume(None), (0, VolumeStatus::Missing));
        assert_eq!(coerce_volume(Some("abc")), (0, VolumeStatus::Invalid));
        assert_eq!(coerce_volume(Some("-20")), (0, VolumeStatus::Invalid));
        assert_eq!(coerce_volume(Some("NaN")), (0, VolumeStatus::Invalid));
    }
}
