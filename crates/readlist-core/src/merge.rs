//! Import reconciliation
//!
//! Combines imported records with the stored collection under one of two
//! policies:
//!
//! - **append**: records whose URL is already stored update that record
//!   in place (keeping its id); the rest are appended.
//! - **overwrite**: the imported records replace the collection.
//!
//! Before either policy runs, imported ids that clash with a stored id or
//! with an earlier imported record are replaced, so ids stay unique.
//!
//! Within one batch, a later record with the same URL as an earlier,
//! newly appended one updates that record rather than adding a duplicate.

use std::collections::{HashMap, HashSet};
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::ReadingListError;
use crate::models::{new_id, Record};

/// How an import combines with the stored collection
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MergeMode {
    #[default]
    Append,
    Overwrite,
}

impl MergeMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            MergeMode::Append => "append",
            MergeMode::Overwrite => "overwrite",
        }
    }
}

impl fmt::Display for MergeMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MergeMode {
    type Err = ReadingListError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "append" => Ok(MergeMode::Append),
            "overwrite" => Ok(MergeMode::Overwrite),
            _ => Err(ReadingListError::InvalidMergeMode(s.to_string())),
        }
    }
}

/// The reconciled collection and what changed
#[derive(Debug, Clone, PartialEq)]
pub struct MergeOutcome {
    pub records: Vec<Record>,
    pub added: usize,
    pub updated: usize,
}

/// Reconcile imported records against the current collection
pub fn reconcile(current: &[Record], incoming: Vec<Record>, mode: MergeMode) -> MergeOutcome {
    let incoming = resolve_id_collisions(current, incoming);

    let outcome = match mode {
        MergeMode::Overwrite => MergeOutcome {
            added: incoming.len(),
            updated: 0,
            records: incoming,
        },
        MergeMode::Append => append(current, incoming),
    };

    debug!(
        mode = %mode,
        added = outcome.added,
        updated = outcome.updated,
        total = outcome.records.len(),
        "Reconciled import"
    );
    outcome
}

fn append(current: &[Record], incoming: Vec<Record>) -> MergeOutcome {
    let mut records = current.to_vec();
    let mut by_url: HashMap<String, usize> = HashMap::with_capacity(records.len());
    for (index, record) in records.iter().enumerate() {
        // First occurrence wins when the stored list has duplicate URLs
        by_url.entry(record.url.clone()).or_insert(index);
    }

    let mut added = 0;
    let mut updated = 0;
    for record in incoming {
        match by_url.get(&record.url).copied() {
            Some(index) => {
                records[index].absorb(record);
                updated += 1;
            }
            None => {
                by_url.insert(record.url.clone(), records.len());
                records.push(record);
                added += 1;
            }
        }
    }

    MergeOutcome {
        records,
        added,
        updated,
    }
}

/// Give every incoming record an id unused by `current` and by the
/// incoming records before it
fn resolve_id_collisions(current: &[Record], incoming: Vec<Record>) -> Vec<Record> {
    let mut taken: HashSet<String> = current.iter().map(|record| record.id.clone()).collect();

    incoming
        .into_iter()
        .map(|mut record| {
            while taken.contains(&record.id) {
                record.id = new_id();
            }
            taken.insert(record.id.clone());
            record
        })
        .collect()
}
