use std::fs;
use std::path::Path;

use crate::store::MemoryStore;
use crate::{Error, Result};

/// Load a sheet export from a CSV file
///
/// The first record is the header; every following record is a data row.
/// Quoted fields may contain commas, doubled quotes and line breaks.
/// Blank lines are skipped.
///
/// # Arguments
/// * `filepath` - Path to the CSV file to load
///
/// # Returns
/// * `Result<MemoryStore>` - The loaded sheet or an error
///
/// # Examples
/// ```no_run
/// use hurina::loader::from_csv;
///
/// match from_csv("hurina_db.csv") {
///     Ok(sheet) => println!("Loaded {} rows", sheet.len()),
///     Err(e) => eprintln!("Error loading CSV: {}", e),
/// }
/// ```
pub fn from_csv(filepath: impl AsRef<Path>) -> Result<MemoryStore> {
    let text = fs::read_to_string(filepath)?;
    from_csv_str(&text)
}

pub fn from_csv_str(text: &str) -> Result<MemoryStore> {
    let mut records = parse_csv(text.trim_start_matches('\u{feff}'))?.into_iter();

    let header = records
        .next()
        .ok_or_else(|| Error::InvalidInput("CSV file is empty".to_string()))?;
    let header: Vec<String> = header.into_iter().map(|h| h.trim().to_string()).collect();

    let mut sheet = MemoryStore::new(header);
    for mut row in records {
        // trailing empty cells are common in sheet exports
        while row.len() > sheet.header.len() && row.last().is_some_and(|c| c.is_empty()) {
            row.pop();
        }
        crate::store::RowStore::append_row(&mut sheet, &row)?;
    }

    Ok(sheet)
}

// Split CSV text into records of fields
fn parse_csv(text: &str) -> Result<Vec<Vec<String>>> {
    let mut records = Vec::new();
    let mut current_row: Vec<String> = Vec::new();
    let mut current_field = String::new();
    let mut in_quotes = false;
    let mut chars = text.chars().peekable();

    while let Some(c) = chars.next() {
        match c {
            '"' if in_quotes => {
                if chars.peek() == Some(&'"') {
                    // Double quote inside quoted field - add a single quote
                    current_field.push('"');
                    chars.next();
                } else {
                    in_quotes = false;
                }
            }
            '"' if current_field.is_empty() => in_quotes = true,
            ',' if !in_quotes => {
                current_row.push(std::mem::take(&mut current_field));
            }
            '\r' if !in_quotes => {}
            '\n' if !in_quotes => {
                current_row.push(std::mem::take(&mut current_field));
                if !(current_row.len() == 1 && current_row[0].is_empty()) {
                    records.push(std::mem::take(&mut current_row));
                } else {
                    current_row.clear();
                }
            }
            _ => current_field.push(c),
        }
    }

    if in_quotes {
        return Err(Error::InvalidInput("unterminated quoted field".to_string()));
    }
    if !current_field.is_empty() || !current_row.is_empty() {
        current_row.push(current_field);
        records.push(current_row);
    }

    Ok(records)
}
