use bincode::{deserialize_from, serialize_into};
use flate2::Compression;
use flate2::read::GzDecoder;
use flate2::write::GzEncoder;
use log::info;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

use crate::record::RawRow;
use crate::{Error, Result};

/// The spreadsheet-like backend holding one row per measurement under a
/// header row.
///
/// Row numbers are 1-based and the header is row 1, so the first data row is
/// row 2. Deleting a row shifts every later row up by one.
pub trait RowStore {
    /// Every data row, keyed by header name, in store order
    fn fetch_all_rows(&self) -> Result<Vec<RawRow>>;

    /// Append one row; values are positional in header order
    fn append_row(&mut self, fields: &[String]) -> Result<()>;

    /// Remove the row at `row_number` (header counts as row 1)
    fn delete_row(&mut self, row_number: usize) -> Result<()>;
}

/// In-memory sheet: a header plus rows of cell text
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct MemoryStore {
    pub header: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl MemoryStore {
    pub fn new(header: Vec<String>) -> Self {
        Self {
            header,
            rows: Vec::new(),
        }
    }

    pub fn with_rows(header: Vec<String>, rows: Vec<Vec<String>>) -> Self {
        Self { header, rows }
    }

    /// Number of data rows (header excluded)
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Last valid row number, 1 when there are no data rows
    pub fn last_row(&self) -> usize {
        self.rows.len() + 1
    }
}

impl RowStore for MemoryStore {
    fn fetch_all_rows(&self) -> Result<Vec<RawRow>> {
        Ok(self
            .rows
            .iter()
            .map(|row| {
                self.header
                    .iter()
                    .enumerate()
                    .filter(|(_, name)| !name.is_empty())
                    .map(|(c, name)| (name.clone(), row.get(c).cloned().unwrap_or_default()))
                    .collect()
            })
            .collect())
    }

    fn append_row(&mut self, fields: &[String]) -> Result<()> {
        if fields.len() > self.header.len() {
            return Err(Error::InvalidInput(format!(
                "row has {} values but the sheet has {} columns",
                fields.len(),
                self.header.len()
            )));
        }
        let mut row = fields.to_vec();
        row.resize(self.header.len(), String::new());
        self.rows.push(row);
        Ok(())
    }

    fn delete_row(&mut self, row_number: usize) -> Result<()> {
        if row_number < 2 || row_number > self.last_row() {
            return Err(Error::RowOutOfRange {
                row_number,
                last_row: self.last_row(),
            });
        }
        self.rows.remove(row_number - 2);
        Ok(())
    }
}

/// A sheet persisted as a gzip-compressed bincode file.
///
/// The file is rewritten after every mutation. A mutation whose write fails
/// leaves the in-memory sheet untouched.
#[derive(Debug)]
pub struct SheetFile {
    path: PathBuf,
    sheet: MemoryStore,
}

impl SheetFile {
    /// Open `path`, creating an empty sheet with `header` if it does not exist
    pub fn open_or_create(path: impl AsRef<Path>, header: Vec<String>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        if path.exists() {
            let sheet = load_sheet(&path)?;
            info!("opened {} ({} rows)", path.display(), sheet.len());
            return Ok(Self { path, sheet });
        }

        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        let store = Self {
            path,
            sheet: MemoryStore::new(header),
        };
        store.persist()?;
        info!("created {}", store.path.display());
        Ok(store)
    }

    /// Replace the sheet contents wholesale (used by CSV import)
    pub fn replace(&mut self, sheet: MemoryStore) -> Result<()> {
        save_sheet(&sheet, &self.path)?;
        self.sheet = sheet;
        Ok(())
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn sheet(&self) -> &MemoryStore {
        &self.sheet
    }

    fn persist(&self) -> Result<()> {
        save_sheet(&self.sheet, &self.path)
    }

    // apply `change` to a copy, keep it only once it is on disk
    fn commit(&mut self, change: impl FnOnce(&mut MemoryStore) -> Result<()>) -> Result<()> {
        let mut next = self.sheet.clone();
        change(&mut next)?;
        save_sheet(&next, &self.path)?;
        self.sheet = next;
        Ok(())
    }
}

impl RowStore for SheetFile {
    fn fetch_all_rows(&self) -> Result<Vec<RawRow>> {
        self.sheet.fetch_all_rows()
    }

    fn append_row(&mut self, fields: &[String]) -> Result<()> {
        self.commit(|sheet| sheet.append_row(fields))
    }

    fn delete_row(&mut self, row_number: usize) -> Result<()> {
        self.commit(|sheet| sheet.delete_row(row_number))
    }
}

pub fn save_sheet(sheet: &MemoryStore, path: &Path) -> Result<()> {
    let file = File::create(path)?;
    let encoder = GzEncoder::new(file, Compression::default());
    let mut writer = BufWriter::new(encoder);

    serialize_into(&mut writer, sheet)?;

    // surface write errors here instead of losing them in Drop
    let encoder = writer.into_inner().map_err(|e| e.into_error())?;
    encoder.finish()?.flush()?;
    Ok(())
}

pub fn load_sheet(path: &Path) -> Result<MemoryStore> {
    let file = File::open(path)?;
    let decoder = GzDecoder::new(file);
    let mut reader = BufReader::new(decoder);

    let sheet: MemoryStore = deserialize_from(&mut reader)?;
    Ok(sheet)
}
