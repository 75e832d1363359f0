mod common;

use common::*;
use hurina::cache::SnapshotCache;
use hurina::columns::ColumnAliases;
use hurina::entry::NewEntry;
use hurina::locator::{build_labels, delete_by_label, label_for, resolve};
use hurina::normalizer::normalize;
use hurina::record::{Method, RawRow};
use hurina::store::{MemoryStore, RowStore};
use hurina::tracker::Tracker;
use hurina::Error;
use std::cell::RefCell;
use std::rc::Rc;
use std::time::Duration;

fn store() -> MemoryStore {
    sheet(&[
        ("2024-03-04 10:00:00", "200", "Sonde"),
        ("2024-03-05 08:00:00", "300", "Naturel"),
        ("2024-03-04 10:00:00", "200", "Sonde"),
        ("2024-03-03 18:20:00", "120", "Sonde"),
    ])
}

#[test]
fn label_format() {
    let records = normalize(&store().fetch_all_rows().unwrap(), &ColumnAliases::default()).unwrap();

    assert_eq!(label_for(&records[0]), "05/03/2024 08:00 • 300 mL • Naturel");
    let labels = build_labels(&records);
    assert_eq!(labels.len(), 4);
    assert_eq!(labels[3], ("03/03/2024 18:20 • 120 mL • Sonde".to_string(), 5));
}

#[test]
fn duplicate_labels_resolve_to_first_in_current_order() {
    let records = normalize(&store().fetch_all_rows().unwrap(), &ColumnAliases::default()).unwrap();
    let label = "04/03/2024 10:00 • 200 mL • Sonde";

    let labels = build_labels(&records);
    assert_eq!(labels.iter().filter(|(l, _)| l == label).count(), 2);

    // rows 2 and 4 share the label; row 4 comes first in the newest-first order
    assert_eq!(resolve(label, &records), Some(4));
    assert_eq!(resolve("01/01/2000 00:00 • 1 mL • Sonde", &records), None);
}

#[test]
fn delete_without_confirmation_leaves_store_unchanged() {
    let mut store = store();
    let before = store.clone();

    let result = delete_by_label(
        &mut store,
        &ColumnAliases::default(),
        "04/03/2024 10:00 • 200 mL • Sonde",
        false,
    );

    assert!(matches!(result, Err(Error::NotConfirmed { .. })));
    assert_eq!(store, before);
    println!("✓ Unconfirmed delete rejected, store untouched");
}

#[test]
fn confirmed_delete_removes_resolved_row() {
    let mut store = store();

    let deleted = delete_by_label(
        &mut store,
        &ColumnAliases::default(),
        "03/03/2024 18:20 • 120 mL • Sonde",
        true,
    )
    .unwrap();

    assert_eq!(deleted.row_number, 5);
    assert_eq!(store.len(), 3);
    assert!(store.rows.iter().all(|r| r[1] != "2024-03-03 18:20:00"));
}

#[test]
fn unknown_label_is_reported() {
    let mut store = store();
    let result = delete_by_label(&mut store, &ColumnAliases::default(), "nope", true);
    assert!(matches!(result, Err(Error::UnknownLabel(_))));
    assert_eq!(store.len(), 4);
}

/// Store shared with a second writer the tracker knows nothing about
#[derive(Clone)]
struct SharedStore(Rc<RefCell<MemoryStore>>);

impl RowStore for SharedStore {
    fn fetch_all_rows(&self) -> hurina::Result<Vec<RawRow>> {
        self.0.borrow().fetch_all_rows()
    }

    fn append_row(&mut self, fields: &[String]) -> hurina::Result<()> {
        self.0.borrow_mut().append_row(fields)
    }

    fn delete_row(&mut self, row_number: usize) -> hurina::Result<()> {
        self.0.borrow_mut().delete_row(row_number)
    }
}

#[test]
fn delete_resolves_against_fresh_rows_not_the_cache() {
    let shared = SharedStore(Rc::new(RefCell::new(sheet(&[
        ("2024-03-01 08:00:00", "100", "Sonde"),
        ("2024-03-02 08:00:00", "200", "Sonde"),
    ]))));
    let mut other_writer = shared.clone();
    let mut tracker = Tracker::new(
        shared.clone(),
        ColumnAliases::default(),
        SnapshotCache::new(Duration::from_secs(3600)),
    );
    let label = "02/03/2024 08:00 • 200 mL • Sonde";

    assert_eq!(tracker.labels().unwrap()[0], (label.to_string(), 3));

    // row 2 disappears behind the tracker's back; the cached view is stale
    other_writer.delete_row(2).unwrap();
    assert_eq!(tracker.labels().unwrap()[0], (label.to_string(), 3));
    assert_eq!(tracker.labels_fresh().unwrap()[0], (label.to_string(), 2));

    let deleted = tracker.delete(label, true).unwrap();
    assert_eq!(deleted.row_number, 2);
    assert!(shared.0.borrow().is_empty());
}

#[test]
fn append_invalidates_cached_reads() {
    let mut tracker = Tracker::new(
        sheet(&[("2024-03-01 08:00:00", "100", "Sonde")]),
        ColumnAliases::default(),
        SnapshotCache::new(Duration::from_secs(3600)),
    );
    assert_eq!(tracker.records().unwrap().len(), 1);

    let entry = NewEntry::new(dt(2024, 3, 2, 9, 0), 250, Method::Naturel, "");
    tracker.append(entry, dt(2024, 3, 2, 9, 1)).unwrap();

    let records = tracker.records().unwrap();
    assert_eq!(records.len(), 2);
    assert_eq!(records[0].volume_ml, 250);
    assert_eq!(records[0].row_number, 3);
}

#[test]
fn rows_with_unknown_method_can_be_deleted() {
    let mut store = sheet(&[
        ("2024-01-01 08:00:00", "300", "Sonde"),
        ("2024-01-01 09:00:00", "200", ""),
    ]);
    let aliases = ColumnAliases::default();

    let records = normalize(&store.fetch_all_rows().unwrap(), &aliases).unwrap();
    assert_eq!(label_for(&records[0]), "01/01/2024 09:00 • 200 mL • ");

    let deleted = delete_by_label(&mut store, &aliases, "01/01/2024 09:00 • 200 mL • ", true).unwrap();

    assert_eq!(deleted.row_number, 3);
    let rows = store.fetch_all_rows().unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0][METHOD], "Sonde");
}
