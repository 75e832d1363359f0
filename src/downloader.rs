use std::error::Error;

use crate::table::{TABLE_HEADERS, TableRow};

/// Convert the history table to CSV format
///
/// The first line carries the table headers. Fields containing commas,
/// quotes or newlines are quoted, with inner quotes doubled.
///
/// # Arguments
/// * `rows` - Table rows, in display order
///
/// # Returns
/// * `String` - CSV content
///
/// # Examples
/// ```
/// use hurina::downloader::to_csv;
///
/// let csv = to_csv(&[]);
/// assert_eq!(csv, "Date,Heure,Volume (mL),Méthode utilisée,Commentaire (optionnel)\n");
/// ```
pub fn to_csv(rows: &[TableRow]) -> String {
    let mut csv_content = TABLE_HEADERS.join(",");
    csv_content.push('\n');

    for row in rows {
        let fields = [
            row.date.clone(),
            row.heure.clone(),
            row.volume_ml.to_string(),
            row.method.to_string(),
            row.comment.clone(),
        ];
        let line: Vec<String> = fields.iter().map(|f| escape_csv_field(f)).collect();
        csv_content.push_str(&line.join(","));
        csv_content.push('\n');
    }

    csv_content
}

/// Quote a field if it contains a comma, quote or newline
pub fn escape_csv_field(value: &str) -> String {
    if value.contains(',') || value.contains('"') || value.contains('\n') {
        format!("\"{}\"", value.replace('"', "\"\""))
    } else {
        value.to_string()
    }
}

/// Convert the history table to XLSX format
///
/// Writes the headers on the first line and one measurement per line after
/// it, volumes as numbers.
///
/// # Returns
/// * `Result<Vec<u8>, Box<dyn Error>>` - XLSX file content as bytes or an error
#[cfg(feature = "web")]
pub fn to_xlsx(rows: &[TableRow]) -> Result<Vec<u8>, Box<dyn Error>> {
    use rust_xlsxwriter::{Workbook, Worksheet};

    let mut workbook = Workbook::new();
    let mut worksheet = Worksheet::new();

    for (c, title) in TABLE_HEADERS.iter().enumerate() {
        worksheet.write_string(0, c as u16, *title)?;
    }

    for (r, row) in rows.iter().enumerate() {
        let line = (r + 1) as u32;
        worksheet.write_string(line, 0, &row.date)?;
        worksheet.write_string(line, 1, &row.heure)?;
        worksheet.write_number(line, 2, row.volume_ml)?;
        worksheet.write_string(line, 3, row.method.as_str())?;
        worksheet.write_string(line, 4, &row.comment)?;
    }

    workbook.push_worksheet(worksheet);
    let buffer = workbook.save_to_buffer()?;

    Ok(buffer)
}

/// XLSX output is only built with the `web` feature
#[cfg(not(feature = "web"))]
pub fn to_xlsx(_rows: &[TableRow]) -> Result<Vec<u8>, Box<dyn Error>> {
    Err("XLSX export requires the 'web' feature".into())
}
