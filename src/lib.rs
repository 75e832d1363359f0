/*!
# Hurina

Daily urinary-volume tracking backed by a spreadsheet-like row store.

## Overview

A measurement is one row of the sheet: when it was captured, the volume in
millilitres, the collection method (`Sonde` or `Naturel`) and an optional
comment. The crate turns the loosely-typed rows of the sheet into clean
records, aggregates them for charts, and deletes a chosen record safely.

## Pipeline

```text
RowStore ──fetch──▶ normalizer ──▶ table view
                         │
                         └──▶ aggregator ──▶ chart
RowStore ◀──append── entry form
RowStore ◀──delete── locator (fresh fetch, label → row number, confirmation)
```

## Modules

- **columns**: accepted header names per logical field, required-column check
- **timeparse**: ISO, French and permissive day-first timestamp parsing
- **normalizer**: raw rows → records, most recent first
- **aggregator**: daily / ISO-weekly sums per method
- **locator**: record labels and the deletion protocol
- **store**: the `RowStore` trait, an in-memory sheet and a compressed sheet file
- **cache**: short-lived snapshot cache, invalidated on every mutation
- **tracker**: command façade tying store, cache and pipeline together
- **entry**: new-measurement input, default capture time
- **table** / **downloader**: history table and its CSV/XLSX export
- **loader**: CSV import of a sheet export
- **chart**: chart dataset and PNG rendering
- **app**: JSON API (`web` feature)
*/

pub mod aggregator;
#[cfg(feature = "web")]
pub mod app;
pub mod cache;
pub mod chart;
pub mod columns;
pub mod config;
pub mod downloader;
pub mod entry;
pub mod error;
pub mod loader;
pub mod locator;
pub mod normalizer;
pub mod record;
pub mod store;
pub mod table;
pub mod timeparse;
pub mod tracker;

pub use aggregator::{AggregatedBucket, Granularity, aggregate};
pub use columns::{ColumnAliases, Field};
pub use config::Config;
pub use error::{Error, Result};
pub use locator::{build_labels, delete_by_label, resolve};
pub use normalizer::normalize;
pub use record::{Method, RawRow, Record, VolumeStatus};
pub use store::{MemoryStore, RowStore, SheetFile};
pub use tracker::Tracker;
