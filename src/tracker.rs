use chrono::NaiveDateTime;
use log::info;

use crate::aggregator::{AggregatedBucket, Granularity, aggregate};
use crate::cache::SnapshotCache;
use crate::columns::ColumnAliases;
use crate::entry::NewEntry;
use crate::locator::{Deleted, build_labels, delete_by_label};
use crate::normalizer::normalize;
use crate::record::Record;
use crate::store::RowStore;
use crate::Result;

/// One command at a time over a row store.
///
/// Reads may come from the snapshot cache; every mutation invalidates it,
/// and deletes never read from it.
pub struct Tracker<S: RowStore> {
    store: S,
    aliases: ColumnAliases,
    cache: SnapshotCache,
}

impl<S: RowStore> Tracker<S> {
    pub fn new(store: S, aliases: ColumnAliases, cache: SnapshotCache) -> Self {
        Self {
            store,
            aliases,
            cache,
        }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn store_mut(&mut self) -> &mut S {
        self.cache.invalidate();
        &mut self.store
    }

    pub fn aliases(&self) -> &ColumnAliases {
        &self.aliases
    }

    /// Records, most recent first, possibly from cache
    pub fn records(&mut self) -> Result<Vec<Record>> {
        self.cache.get_or_load(&self.store, &self.aliases)
    }

    /// Records straight from the store
    pub fn records_fresh(&self) -> Result<Vec<Record>> {
        normalize(&self.store.fetch_all_rows()?, &self.aliases)
    }

    pub fn aggregate(&mut self, granularity: Granularity) -> Result<Vec<AggregatedBucket>> {
        Ok(aggregate(&self.records()?, granularity))
    }

    pub fn labels(&mut self) -> Result<Vec<(String, usize)>> {
        Ok(build_labels(&self.records()?))
    }

    /// Labels from a fresh fetch, for building a delete selection
    pub fn labels_fresh(&self) -> Result<Vec<(String, usize)>> {
        Ok(build_labels(&self.records_fresh()?))
    }

    pub fn append(&mut self, entry: NewEntry, submitted_at: NaiveDateTime) -> Result<()> {
        let row = entry.into_row(submitted_at);
        let result = self.store.append_row(&row);
        self.cache.invalidate();
        result?;
        info!("appended measurement captured {}", row[1]);
        Ok(())
    }

    pub fn delete(&mut self, label: &str, confirmed: bool) -> Result<Deleted> {
        let result = delete_by_label(&mut self.store, &self.aliases, label, confirmed);
        self.cache.invalidate();
        result
    }
}
