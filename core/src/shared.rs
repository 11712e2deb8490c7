use crate::config::RawConfig;
use crate::document::{Document, FieldValues};
use crate::engine::Engine;
use crate::error::Result;
use crate::prep::{PrepTarget, PrepTask};
use crate::DocKey;
use parking_lot::{RwLock, RwLockReadGuard, RwLockWriteGuard};
use std::sync::Arc;

/// Cloneable handle to one engine: a single writer at a time, any number of
/// concurrent searches.
#[derive(Debug)]
pub struct SharedEngine<K = String> {
    inner: Arc<RwLock<Engine<K>>>,
}

impl<K> Clone for SharedEngine<K> {
    fn clone(&self) -> Self {
        Self { inner: Arc::clone(&self.inner) }
    }
}

impl<K: DocKey> Default for SharedEngine<K> {
    fn default() -> Self { Self::new(Engine::new()) }
}

impl<K: DocKey> SharedEngine<K> {
    pub fn new(engine: Engine<K>) -> Self {
        Self { inner: Arc::new(RwLock::new(engine)) }
    }

    pub fn read(&self) -> RwLockReadGuard<'_, Engine<K>> { self.inner.read() }
    pub fn write(&self) -> RwLockWriteGuard<'_, Engine<K>> { self.inner.write() }

    pub fn define_config(&self, raw: RawConfig) -> Result<()> {
        self.inner.write().define_config(raw)
    }

    pub fn define_prep_tasks(&self, tasks: Vec<PrepTask>, target: PrepTarget) -> Result<usize> {
        self.inner.write().define_prep_tasks(tasks, target)
    }

    pub fn add_doc(&self, doc: &Document, id: K) -> Result<usize> {
        self.inner.write().add_doc(doc, id)
    }

    pub fn consolidate(&self, fp: Option<i64>) -> Result<()> {
        self.inner.write().consolidate(fp)
    }

    pub fn search(&self, text: &str, limit: Option<usize>) -> Result<Vec<(K, f64)>> {
        self.inner.read().search(text, limit)
    }

    pub fn search_filtered<P, F>(&self, text: &str, limit: Option<usize>, filter: F, params: &P) -> Result<Vec<(K, f64)>>
    where
        F: Fn(&FieldValues, &P) -> bool,
    {
        self.inner.read().search_filtered(text, limit, filter, params)
    }

    pub fn export_state(&self) -> Result<String> {
        self.inner.read().export_state()
    }

    pub fn import_state(&self, blob: &str) -> Result<()> {
        self.inner.write().import_state(blob)
    }

    pub fn reset(&self) {
        self.inner.write().reset()
    }
}
