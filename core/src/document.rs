use crate::{DocKey, TermId};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::borrow::Cow;
use std::collections::{BTreeMap, HashMap};

/// Retained field name → original value, as handed to search filters.
pub type FieldValues = BTreeMap<String, Value>;

/// A document as supplied by the host: field name → value.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Document {
    fields: BTreeMap<String, Value>,
}

impl Document {
    pub fn new() -> Self { Self::default() }

    pub fn with_field(mut self, name: &str, value: impl Into<Value>) -> Self {
        self.insert(name, value);
        self
    }

    pub fn insert(&mut self, name: &str, value: impl Into<Value>) {
        self.fields.insert(name.to_string(), value.into());
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.fields.get(name)
    }

    /// Text handed to the prep pipeline: strings verbatim, other values in
    /// their JSON form, `null` as empty text.
    pub(crate) fn text(&self, name: &str) -> Option<Cow<'_, str>> {
        self.fields.get(name).map(|v| match v {
            Value::String(s) => Cow::Borrowed(s.as_str()),
            Value::Null => Cow::Borrowed(""),
            other => Cow::Owned(other.to_string()),
        })
    }
}

impl From<serde_json::Map<String, Value>> for Document {
    fn from(map: serde_json::Map<String, Value>) -> Self {
        Self { fields: map.into_iter().collect() }
    }
}

impl<N: Into<String>, V: Into<Value>> FromIterator<(N, V)> for Document {
    fn from_iter<I: IntoIterator<Item = (N, V)>>(iter: I) -> Self {
        Self { fields: iter.into_iter().map(|(n, v)| (n.into(), v.into())).collect() }
    }
}

/// Per-document learnings. Before consolidation `term_weights` holds the
/// field-weighted raw frequencies; afterwards each entry is the term's final
/// score contribution. The sign carries negation.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DocumentRecord {
    #[serde(rename = "freq")]
    pub(crate) term_weights: BTreeMap<TermId, f64>,
    #[serde(rename = "fieldValues", default)]
    pub(crate) field_values: FieldValues,
    pub(crate) length: f64,
}

impl DocumentRecord {
    pub fn term_weights(&self) -> &BTreeMap<TermId, f64> { &self.term_weights }
    pub fn field_values(&self) -> &FieldValues { &self.field_values }
    pub fn length(&self) -> f64 { self.length }

    pub fn weight(&self, term: TermId) -> Option<f64> {
        self.term_weights.get(&term).copied()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(transparent, bound = "K: DocKey")]
pub struct DocumentStore<K> {
    docs: HashMap<K, DocumentRecord>,
}

impl<K> Default for DocumentStore<K> {
    fn default() -> Self { Self { docs: HashMap::new() } }
}

impl<K: DocKey> DocumentStore<K> {
    pub fn new() -> Self { Self::default() }

    pub fn get(&self, id: &K) -> Option<&DocumentRecord> { self.docs.get(id) }
    pub fn contains(&self, id: &K) -> bool { self.docs.contains_key(id) }
    pub fn len(&self) -> usize { self.docs.len() }
    pub fn is_empty(&self) -> bool { self.docs.is_empty() }

    pub fn iter(&self) -> impl Iterator<Item = (&K, &DocumentRecord)> {
        self.docs.iter()
    }

    pub(crate) fn insert(&mut self, id: K, record: DocumentRecord) {
        self.docs.insert(id, record);
    }

    pub(crate) fn records_mut(&mut self) -> impl Iterator<Item = &mut DocumentRecord> {
        self.docs.values_mut()
    }
}
