//! Export/import of the engine learnings as a JSON string.
//!
//! The payload is a fixed 9-slot array:
//!
//! ```text
//! [config, stats, documents, invertedIdx, nextTokenId, token2Index, {}, [], []]
//! ```
//!
//! wrapped as `{"version": 1, "state": [...]}`. The last three slots are
//! reserved and exported empty. Bare 9-slot arrays are accepted on import.

use crate::config::Config;
use crate::document::DocumentStore;
use crate::engine::Engine;
use crate::error::{Error, Result};
use crate::index::InvertedIndex;
use crate::scoring;
use crate::vocabulary::Vocabulary;
use crate::{DocKey, TermId};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::collections::HashMap;

pub const STATE_VERSION: u64 = 1;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SlotKind {
    Object,
    Array,
    Integer,
}

const SLOTS: [SlotKind; 9] = [
    SlotKind::Object,  // config
    SlotKind::Object,  // stats
    SlotKind::Object,  // documents
    SlotKind::Array,   // inverted index
    SlotKind::Integer, // next token id
    SlotKind::Object,  // token → id
    SlotKind::Object,
    SlotKind::Array,
    SlotKind::Array,
];

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DocStats {
    pub total_corpus_length: f64,
    pub total_docs: usize,
    pub consolidated: bool,
}

fn slot_matches(kind: SlotKind, v: &Value) -> bool {
    match kind {
        SlotKind::Object => v.is_object(),
        SlotKind::Array => v.is_array(),
        SlotKind::Integer => v.is_u64(),
    }
}

fn invalid(what: &str) -> Error {
    Error::Import(format!("invalid JSON encountered, can not import: {what}"))
}

/// Unwraps the versioned record (or a bare legacy array) and checks the
/// slot count and slot types.
fn state_slots(blob: &str) -> Result<Vec<Value>> {
    if blob.trim().is_empty() {
        return Err(Error::Import("undefined or null JSON encountered".into()));
    }
    let slots = match serde_json::from_str::<Value>(blob)? {
        Value::Array(slots) => slots,
        Value::Object(mut record) => {
            match record.get("version").and_then(Value::as_u64) {
                Some(STATE_VERSION) => {}
                Some(v) => return Err(Error::Import(format!("unsupported state version {v}"))),
                None => return Err(invalid("missing version")),
            }
            match record.remove("state") {
                Some(Value::Array(slots)) => slots,
                _ => return Err(invalid("state must be an array")),
            }
        }
        Value::Null => return Err(Error::Import("undefined or null JSON encountered".into())),
        _ => return Err(invalid("expected an array or a versioned record")),
    };
    if slots.len() != SLOTS.len() {
        return Err(invalid(&format!("expected {} slots, found {}", SLOTS.len(), slots.len())));
    }
    for (i, (kind, v)) in SLOTS.iter().zip(&slots).enumerate() {
        if !slot_matches(*kind, v) {
            return Err(invalid(&format!("slot {i} should be {kind:?}")));
        }
    }
    Ok(slots)
}

impl<K: DocKey> Engine<K> {
    /// Serializes config, stats, documents, inverted index and vocabulary.
    pub fn export_state(&self) -> Result<String> {
        let config = self.config.as_ref().ok_or(Error::NotConfigured)?;
        if !self.total_corpus_length.is_finite() {
            return Err(Error::Export("corpus length is not a finite number".into()));
        }
        for (id, record) in self.docs.iter() {
            let finite = record.length().is_finite() && record.term_weights().values().all(|w| w.is_finite());
            if !finite {
                return Err(Error::Export(format!("document {id:?} holds a non-finite weight")));
            }
        }
        let stats = DocStats {
            total_corpus_length: self.total_corpus_length,
            total_docs: self.total_docs,
            consolidated: self.consolidated,
        };
        let to_value = |v: serde_json::Result<Value>| v.map_err(|e| Error::Export(e.to_string()));
        let state = json!([
            to_value(serde_json::to_value(config))?,
            to_value(serde_json::to_value(&stats))?,
            to_value(serde_json::to_value(&self.docs))?,
            to_value(serde_json::to_value(&self.index))?,
            self.vocabulary.next_id(),
            to_value(serde_json::to_value(self.vocabulary.tokens()))?,
            {},
            [],
            []
        ]);
        let blob = serde_json::to_string(&json!({ "version": STATE_VERSION, "state": state }))
            .map_err(|e| Error::Export(e.to_string()))?;
        tracing::info!(
            num_docs = self.total_docs,
            num_terms = self.vocabulary.len(),
            consolidated = self.consolidated,
            bytes = blob.len(),
            "state exported"
        );
        Ok(blob)
    }

    /// Replaces all learnings with the ones in `blob`. The engine is left
    /// untouched when the blob is rejected; on success the config is frozen
    /// and, if the blob was consolidated, the engine is ready to search.
    /// Prep pipelines registered on this engine are kept.
    pub fn import_state(&mut self, blob: &str) -> Result<()> {
        let mut slots = state_slots(blob)?.into_iter();
        let mut next = || slots.next().unwrap_or(Value::Null);

        let config: Config = serde_json::from_value(next())?;
        config.validate().map_err(|e| invalid(&e.to_string()))?;
        let stats: DocStats = serde_json::from_value(next())?;
        let docs: DocumentStore<K> = serde_json::from_value(next())?;
        let postings: Vec<Vec<K>> = serde_json::from_value(next())?;
        let next_id: TermId = serde_json::from_value(next())?;
        let tokens: HashMap<String, TermId> = serde_json::from_value(next())?;

        if stats.total_docs != docs.len() {
            return Err(invalid(&format!("stats claim {} docs, found {}", stats.total_docs, docs.len())));
        }
        if let Some((token, id)) = tokens.iter().find(|&(_, &id)| id >= next_id) {
            return Err(invalid(&format!("token {token:?} has id {id} beyond next id {next_id}")));
        }
        if let Some(id) = postings.iter().flatten().find(|id| !docs.contains(id)) {
            return Err(invalid(&format!("inverted index refers to unknown document {id:?}")));
        }

        self.reset();
        self.learned = true;
        self.total_corpus_length = stats.total_corpus_length;
        self.total_docs = stats.total_docs;
        self.consolidated = stats.consolidated;
        self.index = InvertedIndex::from_postings(postings);
        self.docs = docs;
        self.vocabulary = Vocabulary::from_parts(tokens, next_id);
        if self.consolidated && self.total_docs > 0 {
            // Derivable, so not part of the payload.
            let k = config.bm25_params().k;
            let total_docs = self.total_docs;
            self.idf = self.index.iter().map(|(_, ids)| scoring::idf(total_docs, ids.len(), k)).collect();
            self.avg_corpus_length = self.total_corpus_length / total_docs as f64;
        }
        self.config = Some(config);

        tracing::info!(
            num_docs = self.total_docs,
            num_terms = self.vocabulary.len(),
            consolidated = self.consolidated,
            "state imported"
        );
        Ok(())
    }
}
