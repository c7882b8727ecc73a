// src/aggregate.rs
// =============================================================================
// Groups module records by stability level.
//
// Input order matters: names inside a group are kept in the order the
// records arrive, which is submission order when fed from the executor.
// Groups themselves iterate in key order (levels ascending, unknown last),
// so the same input always prints the same JSON.
// =============================================================================

use crate::transform::{ModuleRecord, Stability};
use serde::Serialize;
use std::collections::BTreeMap;

/// Stability level -> module names, in submission order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct GroupedResult {
    groups: BTreeMap<Stability, Vec<String>>,
}

impl GroupedResult {
    pub fn get(&self, key: &Stability) -> Option<&[String]> {
        self.groups.get(key).map(Vec::as_slice)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&Stability, &[String])> {
        self.groups.iter().map(|(key, names)| (key, names.as_slice()))
    }

    /// Number of distinct stability groups
    pub fn len(&self) -> usize {
        self.groups.len()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    /// Total number of module names across all groups
    pub fn module_count(&self) -> usize {
        self.groups.values().map(Vec::len).sum()
    }
}

pub fn aggregate<I>(records: I) -> GroupedResult
where
    I: IntoIterator<Item = ModuleRecord>,
{
    let mut groups: BTreeMap<Stability, Vec<String>> = BTreeMap::new();
    for record in records {
        groups.entry(record.stability).or_default().push(record.name);
    }
    GroupedResult { groups }
}
