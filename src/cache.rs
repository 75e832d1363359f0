use log::debug;
use std::time::{Duration, Instant};

use crate::columns::ColumnAliases;
use crate::normalizer::normalize;
use crate::record::Record;
use crate::store::RowStore;
use crate::Result;

/// Short-lived cache of the last normalized snapshot.
///
/// Only bounds how often reads hit the store. It is never a source of row
/// numbers for a delete, and must be invalidated after any mutation.
#[derive(Debug)]
pub struct SnapshotCache {
    ttl: Duration,
    entry: Option<(Instant, Vec<Record>)>,
}

impl SnapshotCache {
    pub fn new(ttl: Duration) -> Self {
        Self { ttl, entry: None }
    }

    /// Cached records if still fresh at `now`
    pub fn get(&self, now: Instant) -> Option<&[Record]> {
        match &self.entry {
            Some((taken, records)) if now.saturating_duration_since(*taken) < self.ttl => {
                Some(records.as_slice())
            }
            _ => None,
        }
    }

    pub fn put(&mut self, now: Instant, records: Vec<Record>) {
        if self.ttl.is_zero() {
            return;
        }
        self.entry = Some((now, records));
    }

    pub fn invalidate(&mut self) {
        if self.entry.take().is_some() {
            debug!("snapshot cache invalidated");
        }
    }

    /// Cached records, or a fresh fetch + normalize stored for next time
    pub fn get_or_load<S: RowStore + ?Sized>(
        &mut self,
        store: &S,
        aliases: &ColumnAliases,
    ) -> Result<Vec<Record>> {
        let now = Instant::now();
        if let Some(records) = self.get(now) {
            return Ok(records.to_vec());
        }
        let records = normalize(&store.fetch_all_rows()?, aliases)?;
        self.put(now, records.clone());
        Ok(records)
    }
}
