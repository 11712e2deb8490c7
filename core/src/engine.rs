use crate::config::{Config, RawConfig};
use crate::document::{Document, DocumentRecord, DocumentStore, FieldValues};
use crate::error::{Error, Result};
use crate::index::InvertedIndex;
use crate::prep::{Pipeline, PrepRegistry, PrepTarget, PrepTask};
use crate::scoring;
use crate::vocabulary::Vocabulary;
use crate::{DocKey, TermId};
use std::collections::btree_map::Entry;
use std::collections::HashMap;

pub const DEFAULT_LIMIT: usize = 10;
pub const MIN_DOCS_FOR_CONSOLIDATION: usize = 3;

/// BM25F engine. Goes through configure → ingest → consolidate → query;
/// ingestion closes for good at consolidation and only `reset` (or an import)
/// starts over.
#[derive(Debug, Clone)]
pub struct Engine<K = String> {
    pub(crate) config: Option<Config>,
    pub(crate) prep: PrepRegistry,
    pub(crate) docs: DocumentStore<K>,
    pub(crate) index: InvertedIndex<K>,
    pub(crate) idf: Vec<f64>,
    pub(crate) vocabulary: Vocabulary,
    pub(crate) total_docs: usize,
    pub(crate) total_corpus_length: f64,
    pub(crate) avg_corpus_length: f64,
    // Set by the first `add_doc`; freezes the config.
    pub(crate) learned: bool,
    pub(crate) consolidated: bool,
}

impl<K> Default for Engine<K> {
    fn default() -> Self {
        Self {
            config: None,
            prep: PrepRegistry::new(),
            docs: DocumentStore::default(),
            index: InvertedIndex::default(),
            idf: Vec::new(),
            vocabulary: Vocabulary::new(),
            total_docs: 0,
            total_corpus_length: 0.0,
            avg_corpus_length: 0.0,
            learned: false,
            consolidated: false,
        }
    }
}

impl<K: DocKey> Engine<K> {
    pub fn new() -> Self { Self::default() }

    pub fn define_config(&mut self, raw: RawConfig) -> Result<()> {
        if self.learned {
            return Err(Error::Config("config must be defined before learning/addition starts".into()));
        }
        self.config = Some(Config::from_raw(raw)?);
        Ok(())
    }

    /// Registers the prep pipeline for `target` and returns its task count.
    ///
    /// Default and field pipelines are frozen while a corpus is being
    /// ingested; the query pipeline can be replaced at any time.
    pub fn define_prep_tasks(&mut self, tasks: Vec<PrepTask>, target: PrepTarget) -> Result<usize> {
        if let PrepTarget::Field(name) = &target {
            let known = self.config.as_ref().is_some_and(|c| c.has_field(name));
            if !known {
                return Err(Error::Pipeline(format!("field {name:?} is not defined in the config")));
            }
        }
        if target != PrepTarget::Query && self.learned && !self.consolidated {
            return Err(Error::Pipeline(
                "prep tasks can not be changed once learning/addition has started".into(),
            ));
        }
        let pipeline = Pipeline::new(tasks)?;
        let count = pipeline.len();
        self.prep.set(target, pipeline);
        Ok(count)
    }

    /// Adds `doc` under `id` and returns the number of documents so far.
    /// Nothing is mutated unless the whole document is accepted.
    pub fn add_doc(&mut self, doc: &Document, id: K) -> Result<usize> {
        let config = self.config.as_ref().ok_or(Error::NotConfigured)?;
        if self.consolidated {
            return Err(Error::AlreadyConsolidated);
        }
        if self.docs.contains(&id) {
            return Err(Error::DuplicateDocument(format!("{id:?}")));
        }

        let mut prepared: Vec<(f64, Vec<String>)> = Vec::with_capacity(config.field_weights().len());
        for (field, &weight) in config.field_weights() {
            let text = doc.text(field).ok_or_else(|| Error::MissingField(field.clone()))?;
            prepared.push((weight, self.prep.for_field(field).run(&text)));
        }
        let mut field_values = FieldValues::new();
        for field in config.retained_fields() {
            let value = doc.get(field).ok_or_else(|| Error::MissingField(field.clone()))?;
            field_values.insert(field.clone(), value.clone());
        }

        let mut record = DocumentRecord { field_values, ..Default::default() };
        let mut token_count = 0;
        for (weight, tokens) in prepared {
            for token in &tokens {
                let term = self.vocabulary.intern(token);
                match record.term_weights.entry(term) {
                    Entry::Vacant(e) => {
                        e.insert(weight);
                        self.index.push(term, id.clone());
                    }
                    Entry::Occupied(mut e) => *e.get_mut() += weight,
                }
            }
            // Length can not be negative, whatever the field weight.
            record.length += tokens.len() as f64 * weight.abs();
            token_count += tokens.len();
        }

        tracing::debug!(doc = ?id, tokens = token_count, length = record.length, "document added");
        self.total_corpus_length += record.length;
        self.docs.insert(id, record);
        self.total_docs += 1;
        self.learned = true;
        Ok(self.total_docs)
    }

    /// Alias of [`Engine::add_doc`].
    pub fn learn(&mut self, doc: &Document, id: K) -> Result<usize> {
        self.add_doc(doc, id)
    }

    /// Computes IDF and rewrites every stored frequency into its BM25F
    /// weight, kept to `fp` decimal places (4 when absent, clamped to 4..=9).
    pub fn consolidate(&mut self, fp: Option<i64>) -> Result<()> {
        if self.consolidated {
            return Err(Error::AlreadyConsolidated);
        }
        if self.total_docs < MIN_DOCS_FOR_CONSOLIDATION {
            return Err(Error::TooFewDocuments { found: self.total_docs });
        }
        let params = self.config.as_ref().ok_or(Error::NotConfigured)?.bm25_params();
        let precision = scoring::precision(fp);
        let total_docs = self.total_docs;

        self.idf = self
            .index
            .iter()
            .map(|(_, ids)| scoring::idf(total_docs, ids.len(), params.k))
            .collect();
        self.avg_corpus_length = self.total_corpus_length / total_docs as f64;

        let idf = &self.idf;
        for record in self.docs.records_mut() {
            let norm = scoring::length_norm(params.b, record.length, self.avg_corpus_length);
            for (term, freq) in record.term_weights.iter_mut() {
                let term_idf = idf.get(*term as usize).copied().unwrap_or(0.0);
                *freq = scoring::term_weight(*freq, params.k1, norm, term_idf, precision);
            }
        }

        self.consolidated = true;
        tracing::info!(
            num_docs = total_docs,
            num_terms = self.vocabulary.len(),
            avg_length = self.avg_corpus_length,
            precision,
            "consolidated"
        );
        Ok(())
    }

    /// Returns up to `limit` (default 10, at least 1) `(id, score)` pairs,
    /// best first. Unknown query tokens are ignored.
    pub fn search(&self, text: &str, limit: Option<usize>) -> Result<Vec<(K, f64)>> {
        self.search_filtered(text, limit, |_: &FieldValues, _: &()| true, &())
    }

    /// Like [`Engine::search`], scoring only documents whose retained fields
    /// pass `filter(fields, params)`.
    pub fn search_filtered<P, F>(&self, text: &str, limit: Option<usize>, filter: F, params: &P) -> Result<Vec<(K, f64)>>
    where
        F: Fn(&FieldValues, &P) -> bool,
    {
        if !self.consolidated {
            return Err(Error::NotConsolidated);
        }
        let terms: Vec<TermId> = self
            .prep
            .for_query()
            .run(text)
            .iter()
            .filter_map(|t| self.vocabulary.get(t))
            .collect();

        // Scores accumulate across query tokens; slots keep first-hit order so
        // ties come out the same way on every run.
        let mut slots: HashMap<&K, usize> = HashMap::new();
        let mut scored: Vec<(&K, f64)> = Vec::new();
        for term in terms {
            for id in self.index.postings(term) {
                let Some(record) = self.docs.get(id) else { continue };
                if !filter(&record.field_values, params) {
                    continue;
                }
                let w = record.weight(term).unwrap_or(0.0);
                match slots.get(id) {
                    Some(&slot) => scored[slot].1 += w,
                    None => {
                        slots.insert(id, scored.len());
                        scored.push((id, w));
                    }
                }
            }
        }

        scored.sort_by(|a, b| b.1.total_cmp(&a.1));
        scored.truncate(limit.unwrap_or(DEFAULT_LIMIT).max(1));
        Ok(scored.into_iter().map(|(id, score)| (id.clone(), score)).collect())
    }

    /// Alias of [`Engine::search`].
    pub fn predict(&self, text: &str, limit: Option<usize>) -> Result<Vec<(K, f64)>> {
        self.search(text, limit)
    }

    /// Forgets all learnings. Config and prep pipelines are kept, and the
    /// config may be redefined afterwards.
    pub fn reset(&mut self) {
        self.docs = DocumentStore::default();
        self.index = InvertedIndex::default();
        self.idf = Vec::new();
        self.vocabulary = Vocabulary::new();
        self.total_docs = 0;
        self.total_corpus_length = 0.0;
        self.avg_corpus_length = 0.0;
        self.learned = false;
        self.consolidated = false;
        tracing::debug!("engine reset");
    }

    pub fn docs(&self) -> &DocumentStore<K> { &self.docs }
    pub fn tokens(&self) -> &Vocabulary { &self.vocabulary }
    pub fn idf(&self) -> &[f64] { &self.idf }
    pub fn inverted_index(&self) -> &InvertedIndex<K> { &self.index }
    pub fn config(&self) -> Option<&Config> { self.config.as_ref() }
    pub fn total_corpus_length(&self) -> f64 { self.total_corpus_length }
    pub fn total_docs(&self) -> usize { self.total_docs }
    pub fn avg_corpus_length(&self) -> f64 { self.avg_corpus_length }
    pub fn has_started_learning(&self) -> bool { self.learned }
    pub fn is_consolidated(&self) -> bool { self.consolidated }
}
