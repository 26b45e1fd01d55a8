use std::collections::HashSet;
use std::vec;

use crate::record::Drama;

/// An ordered collection of match results, deduplicated by record identity.
///
/// Records keep the order in which they were pushed, and pushing a record
/// whose `id` is already present is a no-op. A record that qualifies for a
/// result set more than once therefore appears exactly once, at the position
/// of its first qualification.
#[derive(Clone, Debug, Default)]
pub struct MatchResults {
    records: Vec<Drama>,
    seen: HashSet<u32>,
}

impl MatchResults {
    /// Create an empty collection of match results.
    pub fn new() -> MatchResults {
        MatchResults::default()
    }

    /// Add a record to this collection.
    ///
    /// If a record with the same `id` is already present, the collection is
    /// unchanged.
    pub fn push(&mut self, record: Drama) {
        if self.seen.insert(record.id) {
            self.records.push(record);
        }
    }

    /// Sort the results by case-folded title.
    ///
    /// The sort is stable, so records with identical titles keep their
    /// insertion order.
    pub fn sort_by_title(&mut self) {
        self.records.sort_by_key(|r| r.title.to_lowercase());
    }

    /// Returns the number of results in this collection.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Returns true if and only if this collection is empty.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Return a slice of the results in order.
    pub fn as_slice(&self) -> &[Drama] {
        &self.records
    }

    /// Consume this collection and return the underlying sequence of
    /// records.
    pub fn into_vec(self) -> Vec<Drama> {
        self.records
    }
}

impl IntoIterator for MatchResults {
    type IntoIter = vec::IntoIter<Drama>;
    type Item = Drama;

    fn into_iter(self) -> vec::IntoIter<Drama> {
        self.records.into_iter()
    }
}

impl FromIterator<Drama> for MatchResults {
    fn from_iter<I: IntoIterator<Item = Drama>>(it: I) -> MatchResults {
        let mut results = MatchResults::new();
        for record in it {
            results.push(record);
        }
        results
    }
}
