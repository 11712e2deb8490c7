use crate::TermId;
use serde::{Deserialize, Serialize};

/// Term id → ids of the documents containing it, in ingestion order.
///
/// A document is appended once per term, the first time the term shows up in
/// it. Read-only after consolidation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct InvertedIndex<K> {
    postings: Vec<Vec<K>>,
}

impl<K> Default for InvertedIndex<K> {
    fn default() -> Self { Self { postings: Vec::new() } }
}

impl<K> InvertedIndex<K> {
    pub fn new() -> Self { Self::default() }

    pub(crate) fn from_postings(postings: Vec<Vec<K>>) -> Self {
        Self { postings }
    }

    pub fn push(&mut self, term: TermId, doc: K) {
        let t = term as usize;
        if self.postings.len() <= t {
            self.postings.resize_with(t + 1, Vec::new);
        }
        self.postings[t].push(doc);
    }

    pub fn postings(&self, term: TermId) -> &[K] {
        self.postings.get(term as usize).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Document frequency of `term`.
    pub fn df(&self, term: TermId) -> usize {
        self.postings(term).len()
    }

    /// Number of term slots, i.e. the highest indexed term id + 1.
    pub fn len(&self) -> usize { self.postings.len() }
    pub fn is_empty(&self) -> bool { self.postings.is_empty() }

    pub fn iter(&self) -> impl Iterator<Item = (TermId, &[K])> {
        self.postings.iter().enumerate().map(|(t, ids)| (t as TermId, ids.as_slice()))
    }
}
