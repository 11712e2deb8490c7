//! In-memory BM25F text search.
//!
//! Documents made of weighted fields are prepared by host-supplied prep
//! pipelines, folded into a vocabulary, a per-document store and an inverted
//! index, consolidated once into final BM25F term weights and then queried.

pub mod config;
pub mod document;
pub mod engine;
pub mod error;
pub mod index;
pub mod persist;
pub mod prep;
pub mod scoring;
pub mod shared;
pub mod vocabulary;

use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fmt::Debug;
use std::hash::Hash;

pub use config::{Bm25Params, Config, RawConfig};
pub use document::{Document, DocumentRecord, DocumentStore, FieldValues};
pub use engine::Engine;
pub use error::{Error, Result};
pub use index::InvertedIndex;
pub use prep::{Pipeline, PrepTarget, PrepTask};
pub use shared::SharedEngine;
pub use vocabulary::Vocabulary;

pub type TermId = u32;

/// Caller-supplied document identifier. Exported state uses it as a JSON
/// object key, so it should serialize as a string or an integer.
pub trait DocKey: Clone + Eq + Hash + Debug + Serialize + DeserializeOwned + Send + Sync + 'static {}

impl<T> DocKey for T where T: Clone + Eq + Hash + Debug + Serialize + DeserializeOwned + Send + Sync + 'static {}
