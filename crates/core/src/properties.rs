//! The per-resource properties store.

use std::collections::{BTreeMap, BTreeSet};

use vor_types::{PropertyValue, Triple};

use crate::patch::{Patch, PatchVerb};

/// Arbitrary metadata attached to one resource: a set of values per
/// predicate IRI.
///
/// Insertion order is irrelevant; iteration is deterministic (ordered by
/// predicate, then value). Inserting a value twice is a no-op, as is
/// deleting a value that is not present — `DELETE DATA` semantics.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PropertySet {
    values: BTreeMap<String, BTreeSet<PropertyValue>>,
}

impl PropertySet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a value under a predicate. Returns `false` if it was already
    /// present.
    pub fn insert(&mut self, predicate: impl Into<String>, value: PropertyValue) -> bool {
        self.values.entry(predicate.into()).or_default().insert(value)
    }

    /// Remove a value under a predicate. Returns `false` if it was not
    /// present. Predicates left without values are dropped entirely.
    pub fn remove(&mut self, predicate: &str, value: &PropertyValue) -> bool {
        let Some(set) = self.values.get_mut(predicate) else {
            return false;
        };
        let removed = set.remove(value);
        if set.is_empty() {
            self.values.remove(predicate);
        }
        removed
    }

    pub fn contains(&self, predicate: &str, value: &PropertyValue) -> bool {
        self.values
            .get(predicate)
            .is_some_and(|set| set.contains(value))
    }

    /// Total number of (predicate, value) statements.
    pub fn len(&self) -> usize {
        self.values.values().map(BTreeSet::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Apply a fully parsed patch.
    ///
    /// Application cannot fail: all validation happened at parse time, so
    /// the caller gets all-or-nothing semantics by parsing first.
    pub fn apply(&mut self, patch: &Patch) {
        for op in &patch.ops {
            match op.verb {
                PatchVerb::Insert => {
                    self.insert(op.predicate.clone(), op.value.clone());
                }
                PatchVerb::Delete => {
                    self.remove(&op.predicate, &op.value);
                }
            }
        }
    }

    /// Project the set as triples about `subject`.
    pub fn triples(&self, subject: &str) -> Vec<Triple> {
        self.values
            .iter()
            .flat_map(|(predicate, set)| {
                set.iter().map(move |value| Triple {
                    subject: subject.to_owned(),
                    predicate: predicate.clone(),
                    object: value.clone(),
                })
            })
            .collect()
    }
}
