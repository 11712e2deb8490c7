use crate::TermId;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// `token: id` mapping. Ids are dense, assigned in first-seen order and shared
/// by every field; the id is used everywhere instead of the token.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Vocabulary {
    token_to_id: HashMap<String, TermId>,
    next_id: TermId,
}

impl Vocabulary {
    pub fn new() -> Self { Self::default() }

    pub(crate) fn from_parts(token_to_id: HashMap<String, TermId>, next_id: TermId) -> Self {
        Self { token_to_id, next_id }
    }

    pub fn get(&self, token: &str) -> Option<TermId> {
        self.token_to_id.get(token).copied()
    }

    /// Returns the id of `token`, assigning the next one on first sight.
    pub fn intern(&mut self, token: &str) -> TermId {
        if let Some(&id) = self.token_to_id.get(token) {
            return id;
        }
        let id = self.next_id;
        self.token_to_id.insert(token.to_string(), id);
        self.next_id += 1;
        id
    }

    pub fn next_id(&self) -> TermId { self.next_id }
    pub fn len(&self) -> usize { self.token_to_id.len() }
    pub fn is_empty(&self) -> bool { self.token_to_id.is_empty() }

    pub fn tokens(&self) -> &HashMap<String, TermId> { &self.token_to_id }
}
