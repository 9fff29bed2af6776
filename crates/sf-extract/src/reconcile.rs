//! Pairing a page of records with the deletion markers of a window.
//!
//! Records and markers come from two independent calls, so they are matched
//! by id while scanning forward through the page, never by position.

use std::collections::HashMap;

use chrono::{DateTime, Utc};

use crate::record::Record;
use crate::transport::DeletedMarker;

/// Deletion time per record id for one deleted-since fetch.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DeletionIndex {
    markers: HashMap<String, DateTime<Utc>>,
}

impl DeletionIndex {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, id: impl Into<String>, deleted_at: DateTime<Utc>) {
        self.markers.insert(id.into(), deleted_at);
    }

    pub fn get(&self, id: &str) -> Option<DateTime<Utc>> {
        self.markers.get(id).copied()
    }

    pub fn contains(&self, id: &str) -> bool {
        self.markers.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.markers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.markers.is_empty()
    }

    fn deleted_at(&self, record: &Record) -> Option<DateTime<Utc>> {
        record.id().and_then(|id| self.get(id))
    }
}

impl FromIterator<DeletedMarker> for DeletionIndex {
    fn from_iter<I: IntoIterator<Item = DeletedMarker>>(iter: I) -> Self {
        Self {
            markers: iter.into_iter().map(|m| (m.id, m.deleted_at)).collect(),
        }
    }
}

/// Outcome of one step through a page.
#[derive(Debug, Clone, PartialEq)]
pub struct Visit<'a> {
    /// Where the step stopped; continue from `position + 1`.
    pub position: usize,
    /// The emitted record, if the step found a deleted one.
    pub record: Option<&'a Record>,
    pub deleted_at: Option<DateTime<Utc>>,
    /// No record remains after `position`. Terminal for the fetch.
    pub exhausted: bool,
}

/// Step from `index` to the next deleted record of `records`.
///
/// A record at `index` that carries a marker is emitted directly. Otherwise
/// the scan moves forward until it reaches a marked record, a hole, or the
/// last record. The record at the scanned position is checked against the
/// deletion index once more before it is emitted; the step reports where it
/// stopped either way.
///
/// A hole at `index` yields nothing.
pub fn visit<'a>(records: &'a [Option<Record>], index: usize, deletions: &DeletionIndex) -> Visit<'a> {
    let exhausted = |position: usize| position + 1 >= records.len();

    let Some(current) = records.get(index).and_then(Option::as_ref) else {
        return Visit {
            position: index,
            record: None,
            deleted_at: None,
            exhausted: exhausted(index),
        };
    };

    if let Some(deleted_at) = deletions.deleted_at(current) {
        return Visit {
            position: index,
            record: Some(current),
            deleted_at: Some(deleted_at),
            exhausted: exhausted(index),
        };
    }

    let mut position = index;
    let mut reached = Some(current);
    while position + 1 < records.len() {
        position += 1;
        reached = records[position].as_ref();
        match reached {
            Some(record) if deletions.deleted_at(record).is_none() => continue,
            _ => break,
        }
    }

    let emitted = reached.and_then(|record| deletions.deleted_at(record).map(|at| (record, at)));

    Visit {
        position,
        record: emitted.map(|(record, _)| record),
        deleted_at: emitted.map(|(_, at)| at),
        exhausted: exhausted(position),
    }
}
