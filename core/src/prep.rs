//! Prep pipelines: ordered text/token transforms supplied by the host.
//!
//! The engine never tokenizes on its own. A pipeline starts from raw text,
//! may rewrite it with [`PrepTask::Text`] stages, turns it into tokens with a
//! [`PrepTask::Tokenize`] stage and refines the tokens with
//! [`PrepTask::Tokens`] stages (stop words, stemming, negation marking...).

use crate::error::{Error, Result};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

type TextFn = dyn Fn(&str) -> String + Send + Sync;
type TokenizeFn = dyn Fn(&str) -> Vec<String> + Send + Sync;
type TokensFn = dyn Fn(Vec<String>) -> Vec<String> + Send + Sync;

#[derive(Clone)]
pub enum PrepTask {
    /// text -> text
    Text(Arc<TextFn>),
    /// text -> tokens
    Tokenize(Arc<TokenizeFn>),
    /// tokens -> tokens
    Tokens(Arc<TokensFn>),
}

impl PrepTask {
    pub fn text(f: impl Fn(&str) -> String + Send + Sync + 'static) -> Self {
        PrepTask::Text(Arc::new(f))
    }

    pub fn tokenize(f: impl Fn(&str) -> Vec<String> + Send + Sync + 'static) -> Self {
        PrepTask::Tokenize(Arc::new(f))
    }

    pub fn tokens(f: impl Fn(Vec<String>) -> Vec<String> + Send + Sync + 'static) -> Self {
        PrepTask::Tokens(Arc::new(f))
    }

    fn input_kind(&self) -> Kind {
        match self {
            PrepTask::Text(_) | PrepTask::Tokenize(_) => Kind::Text,
            PrepTask::Tokens(_) => Kind::Tokens,
        }
    }

    fn output_kind(&self) -> Kind {
        match self {
            PrepTask::Text(_) => Kind::Text,
            PrepTask::Tokenize(_) | PrepTask::Tokens(_) => Kind::Tokens,
        }
    }
}

impl fmt::Debug for PrepTask {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            PrepTask::Text(_) => "Text",
            PrepTask::Tokenize(_) => "Tokenize",
            PrepTask::Tokens(_) => "Tokens",
        };
        write!(f, "PrepTask::{name}")
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Kind {
    Text,
    Tokens,
}

impl fmt::Display for Kind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Kind::Text => "text",
            Kind::Tokens => "tokens",
        })
    }
}

/// Which input a pipeline prepares.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum PrepTarget {
    /// Used by every field without its own pipeline, and by queries when no
    /// query pipeline is defined.
    Default,
    Field(String),
    /// Reserved for search text.
    Query,
}

enum Prepared {
    Text(String),
    Tokens(Vec<String>),
}

#[derive(Debug, Clone, Default)]
pub struct Pipeline {
    tasks: Vec<PrepTask>,
}

impl Pipeline {
    /// Checks that every stage receives the representation it expects.
    pub fn new(tasks: Vec<PrepTask>) -> Result<Self> {
        let mut kind = Kind::Text;
        for (i, task) in tasks.iter().enumerate() {
            if task.input_kind() != kind {
                return Err(Error::Pipeline(format!(
                    "task {i} ({task:?}) expects {} but receives {kind}",
                    task.input_kind()
                )));
            }
            kind = task.output_kind();
        }
        Ok(Self { tasks })
    }

    pub fn len(&self) -> usize { self.tasks.len() }
    pub fn is_empty(&self) -> bool { self.tasks.is_empty() }

    /// Runs the stages in order. Text that never got tokenized becomes a
    /// single token; empty text yields none.
    pub fn run(&self, input: &str) -> Vec<String> {
        let mut out = Prepared::Text(input.to_string());
        for task in &self.tasks {
            out = match (task, out) {
                (PrepTask::Text(f), Prepared::Text(s)) => Prepared::Text(f(&s)),
                (PrepTask::Tokenize(f), Prepared::Text(s)) => Prepared::Tokens(f(&s)),
                (PrepTask::Tokens(f), Prepared::Tokens(t)) => Prepared::Tokens(f(t)),
                // Rejected by `new`; kept total so `run` never panics.
                (PrepTask::Text(f), Prepared::Tokens(t)) => {
                    Prepared::Tokens(t.iter().map(|s| f(s)).collect())
                }
                (PrepTask::Tokenize(f), Prepared::Tokens(t)) => {
                    Prepared::Tokens(t.iter().flat_map(|s| f(s)).collect())
                }
                (PrepTask::Tokens(f), Prepared::Text(s)) => Prepared::Tokens(f(vec![s])),
            };
        }
        match out {
            Prepared::Tokens(t) => t,
            Prepared::Text(s) if s.is_empty() => Vec::new(),
            Prepared::Text(s) => vec![s],
        }
    }
}

/// Default, per-field and query pipelines of one engine.
#[derive(Debug, Clone, Default)]
pub struct PrepRegistry {
    default: Pipeline,
    query: Option<Pipeline>,
    fields: HashMap<String, Pipeline>,
}

impl PrepRegistry {
    pub fn new() -> Self { Self::default() }

    pub fn set(&mut self, target: PrepTarget, pipeline: Pipeline) {
        match target {
            PrepTarget::Default => self.default = pipeline,
            PrepTarget::Query => self.query = Some(pipeline),
            PrepTarget::Field(name) => {
                self.fields.insert(name, pipeline);
            }
        }
    }

    pub fn for_field(&self, field: &str) -> &Pipeline {
        self.fields.get(field).unwrap_or(&self.default)
    }

    pub fn for_query(&self) -> &Pipeline {
        self.query.as_ref().unwrap_or(&self.default)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn split() -> PrepTask {
        PrepTask::tokenize(|s| s.split_whitespace().map(str::to_string).collect())
    }

    #[test]
    fn empty_pipeline_passes_input_through() {
        let p = Pipeline::default();
        assert_eq!(p.run("Hello World"), vec!["Hello World".to_string()]);
        assert!(p.run("").is_empty());
    }

    #[test]
    fn stages_run_in_order() {
        let p = Pipeline::new(vec![
            PrepTask::text(|s| s.to_lowercase()),
            split(),
            PrepTask::tokens(|t| t.into_iter().filter(|w| w != "the").collect()),
        ])
        .unwrap();
        assert_eq!(p.run("The Quick FOX"), vec!["quick", "fox"]);
        assert_eq!(p.len(), 3);
    }

    #[test]
    fn rejects_text_stage_after_tokens() {
        let err = Pipeline::new(vec![split(), PrepTask::text(|s| s.to_string())]).unwrap_err();
        assert!(matches!(err, Error::Pipeline(_)));
    }

    #[test]
    fn rejects_token_stage_on_raw_text() {
        let err = Pipeline::new(vec![PrepTask::tokens(|t| t)]).unwrap_err();
        assert!(matches!(err, Error::Pipeline(_)));
    }

    #[test]
    fn registry_falls_back_to_default() {
        let mut reg = PrepRegistry::new();
        reg.set(PrepTarget::Default, Pipeline::new(vec![split()]).unwrap());
        reg.set(
            PrepTarget::Field("title".into()),
            Pipeline::new(vec![PrepTask::text(|s| s.to_uppercase()), split()]).unwrap(),
        );
        assert_eq!(reg.for_field("title").run("a b"), vec!["A", "B"]);
        assert_eq!(reg.for_field("body").run("a b"), vec!["a", "b"]);
        assert_eq!(reg.for_query().run("a b"), vec!["a", "b"]);

        reg.set(PrepTarget::Query, Pipeline::new(vec![PrepTask::text(|s| s.replace(' ', ""))]).unwrap());
        assert_eq!(reg.for_query().run("a b"), vec!["ab"]);
    }
}
