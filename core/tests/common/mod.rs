//! Host-side prep stages and a small corpus shared by the integration tests.
#![allow(dead_code)]

use bm25f::{Document, Engine, PrepTarget, PrepTask, RawConfig};
use lazy_static::lazy_static;
use regex::Regex;
use rust_stemmers::{Algorithm, Stemmer};
use std::collections::HashSet;
use tracing_subscriber::{fmt, EnvFilter};
use unicode_normalization::UnicodeNormalization;

lazy_static! {
    static ref RE: Regex = Regex::new(r"(?u)\p{L}[\p{L}\p{N}_']*|\p{N}+").expect("valid regex");
    static ref STEMMER: Stemmer = Stemmer::create(Algorithm::English);
    static ref STOPWORDS: HashSet<&'static str> = {
        let words: &[&str] = &[
            "a","about","an","and","are","as","at","be","by","during","for","from","he","her","him","his",
            "i","in","into","is","it","its","no","not","of","on","or","she","that","the","their","they",
            "this","through","to","under","was","were","who","with",
        ];
        words.iter().copied().collect()
    };
    static ref NEGATIONS: HashSet<&'static str> = ["not", "no", "never", "cannot", "don't", "isn't", "wasn't"].into_iter().collect();
}

pub fn normalize(text: &str) -> String {
    text.nfkc().collect::<String>().to_lowercase()
}

pub fn tokenize(text: &str) -> Vec<String> {
    RE.find_iter(text).map(|m| m.as_str().to_string()).collect()
}

/// Marks up to two tokens following a negation word with a leading `!`.
pub fn propagate_negations(tokens: Vec<String>) -> Vec<String> {
    let mut left = 0;
    tokens
        .into_iter()
        .map(|t| {
            if NEGATIONS.contains(t.as_str()) {
                left = 2;
                t
            } else if left > 0 {
                left -= 1;
                format!("!{t}")
            } else {
                t
            }
        })
        .collect()
}

pub fn remove_stop_words(tokens: Vec<String>) -> Vec<String> {
    tokens.into_iter().filter(|t| !STOPWORDS.contains(t.as_str())).collect()
}

pub fn stem(tokens: Vec<String>) -> Vec<String> {
    tokens
        .into_iter()
        .map(|t| match t.strip_prefix('!') {
            Some(rest) => format!("!{}", STEMMER.stem(rest)),
            None => STEMMER.stem(&t).to_string(),
        })
        .collect()
}

pub fn english() -> Vec<PrepTask> {
    vec![
        PrepTask::text(normalize),
        PrepTask::tokenize(tokenize),
        PrepTask::tokens(propagate_negations),
        PrepTask::tokens(remove_stop_words),
        PrepTask::tokens(stem),
    ]
}

pub fn doc(title: &str, body: &str, month: &str) -> Document {
    Document::new()
        .with_field("title", title)
        .with_field("body", body)
        .with_field("month", month)
}

pub fn corpus() -> Vec<Document> {
    vec![
        doc("Barack Obama", "Barack Obama served as the 44th president of the United States", "august"),
        doc("Michelle Obama", "Michelle Robinson married Barack Obama in 1992 and became first lady", "january"),
        doc("President Biden", "Joe Biden served as vice president under Barack Obama", "november"),
        doc("Abraham Lincoln", "Abraham Lincoln was the 16th president and led the nation through the civil war", "february"),
        doc("George Washington", "George Washington was the first president of the United States", "february"),
        doc("Franklin Roosevelt", "Franklin Roosevelt was president during the great depression and the war", "january"),
    ]
}

pub fn config() -> RawConfig {
    RawConfig::new().field_weight("title", 4.0).field_weight("body", 1.0).retain("month")
}

/// Routes engine logs through the test harness; set `RUST_LOG=bm25f=debug` to see them.
pub fn init_tracing() {
    let _ = fmt().with_env_filter(EnvFilter::from_default_env()).with_test_writer().try_init();
}

/// Configured engine with the English pipeline as default; nothing added yet.
pub fn engine() -> Engine<u32> {
    init_tracing();
    let mut e = Engine::new();
    e.define_config(config()).expect("valid config");
    e.define_prep_tasks(english(), PrepTarget::Default).expect("valid tasks");
    e
}

/// Engine holding `docs` (ids are their positions), consolidated.
pub fn consolidated(docs: &[Document]) -> Engine<u32> {
    let mut e = engine();
    for (i, d) in docs.iter().enumerate() {
        e.add_doc(d, i as u32).expect("document accepted");
    }
    e.consolidate(None).expect("consolidated");
    e
}
