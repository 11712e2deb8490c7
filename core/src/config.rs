//! BM25F configuration: field weights, scoring parameters and the names of
//! fields whose original values are retained for filtering.
//!
//! Hosts describe the configuration with a [`RawConfig`] (built in code or
//! deserialized from JSON) and the engine validates it once into a [`Config`].

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

pub const DEFAULT_K1: f64 = 1.2;
pub const DEFAULT_B: f64 = 0.75;
pub const DEFAULT_K: f64 = 1.0;

/// `k1` controls TF saturation, `b` the degree of length normalization
/// (0 = none, 1 = full) and `k` the impact of IDF (higher = lower impact).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bm25Params {
    pub k1: f64,
    pub b: f64,
    pub k: f64,
}

impl Default for Bm25Params {
    fn default() -> Self {
        Self { k1: DEFAULT_K1, b: DEFAULT_B, k: DEFAULT_K }
    }
}

/// Validated configuration. Immutable once learning has started.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(rename = "fldWeights")]
    field_weights: BTreeMap<String, f64>,
    #[serde(rename = "bm25Params")]
    bm25_params: Bm25Params,
    #[serde(rename = "ovFldNames")]
    retained_fields: Vec<String>,
}

impl Config {
    pub fn from_raw(raw: RawConfig) -> Result<Self> {
        let raw_weights = raw
            .field_weights
            .ok_or_else(|| Error::Config("fldWeights must be defined".into()))?;
        if raw_weights.is_empty() {
            return Err(Error::Config("field config has no field defined".into()));
        }
        let mut field_weights = BTreeMap::new();
        for (field, value) in raw_weights {
            match value.as_f64() {
                Some(w) if usable_weight(w) => {
                    field_weights.insert(field, w);
                }
                _ => {
                    return Err(Error::Config(format!(
                        "field weight of {field:?} should be a non-zero number, instead found: {value}"
                    )))
                }
            }
        }

        let params = raw.bm25_params.unwrap_or_default();
        let bm25_params = Bm25Params {
            k1: param_or_default("k1", params.k1.as_ref(), DEFAULT_K1, non_negative),
            b: param_or_default("b", params.b.as_ref(), DEFAULT_B, unit_interval),
            k: param_or_default("k", params.k.as_ref(), DEFAULT_K, non_negative),
        };

        let retained_fields = raw.retained_fields.unwrap_or_default();
        if let Some(bad) = retained_fields.iter().find(|f| f.is_empty()) {
            return Err(Error::Config(format!(
                "retained field name should be a non-empty string, instead found: {bad:?}"
            )));
        }

        Ok(Self { field_weights, bm25_params, retained_fields })
    }

    /// Re-checks a config that did not come through [`Config::from_raw`],
    /// such as one read back from exported state. Nothing falls back to a
    /// default here.
    pub(crate) fn validate(&self) -> Result<()> {
        if self.field_weights.is_empty() {
            return Err(Error::Config("field config has no field defined".into()));
        }
        if let Some((field, w)) = self.field_weights.iter().find(|&(_, &w)| !usable_weight(w)) {
            return Err(Error::Config(format!("field weight of {field:?} should be a non-zero number, instead found: {w}")));
        }
        let Bm25Params { k1, b, k } = self.bm25_params;
        let params: [(&str, f64, fn(f64) -> bool); 3] =
            [("k1", k1, non_negative), ("b", b, unit_interval), ("k", k, non_negative)];
        for (name, value, valid) in params {
            if !(value.is_finite() && valid(value)) {
                return Err(Error::Config(format!("BM25 parameter {name} is out of range: {value}")));
            }
        }
        if self.retained_fields.iter().any(String::is_empty) {
            return Err(Error::Config("retained field name should be a non-empty string".into()));
        }
        Ok(())
    }

    pub fn field_weights(&self) -> &BTreeMap<String, f64> { &self.field_weights }
    pub fn bm25_params(&self) -> Bm25Params { self.bm25_params }
    pub fn retained_fields(&self) -> &[String] { &self.retained_fields }

    pub fn has_field(&self, field: &str) -> bool {
        self.field_weights.contains_key(field)
    }
}

// Negative weights are allowed: they mark negation fields.
fn usable_weight(w: f64) -> bool { w.is_finite() && w != 0.0 }
fn non_negative(v: f64) -> bool { v >= 0.0 }
fn unit_interval(v: f64) -> bool { (0.0..=1.0).contains(&v) }

fn param_or_default(name: &str, raw: Option<&RawNumber>, default: f64, valid: impl Fn(f64) -> bool) -> f64 {
    let Some(raw) = raw else { return default };
    match raw.as_f64() {
        Some(v) if v.is_finite() && valid(v) => v,
        _ => {
            tracing::warn!(param = name, value = %raw, default, "invalid BM25 parameter, using default");
            default
        }
    }
}

/// A number as supplied by the host; numeric strings are coerced.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RawNumber {
    Number(f64),
    Text(String),
}

impl RawNumber {
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            RawNumber::Number(n) => Some(*n),
            RawNumber::Text(s) => s.trim().parse().ok(),
        }
    }
}

impl From<f64> for RawNumber {
    fn from(n: f64) -> Self { RawNumber::Number(n) }
}

impl From<&str> for RawNumber {
    fn from(s: &str) -> Self { RawNumber::Text(s.to_string()) }
}

impl std::fmt::Display for RawNumber {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RawNumber::Number(n) => write!(f, "{n}"),
            RawNumber::Text(s) => write!(f, "{s:?}"),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawParams {
    #[serde(default)]
    pub k1: Option<RawNumber>,
    #[serde(default)]
    pub b: Option<RawNumber>,
    #[serde(default)]
    pub k: Option<RawNumber>,
}

/// Unvalidated configuration in the host-facing shape.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawConfig {
    #[serde(rename = "fldWeights", default)]
    pub field_weights: Option<BTreeMap<String, RawNumber>>,
    #[serde(rename = "bm25Params", default)]
    pub bm25_params: Option<RawParams>,
    #[serde(rename = "ovFldNames", default)]
    pub retained_fields: Option<Vec<String>>,
}

impl RawConfig {
    pub fn new() -> Self { Self::default() }

    pub fn from_json_str(json: &str) -> Result<Self> {
        serde_json::from_str(json).map_err(|e| Error::Config(e.to_string()))
    }

    pub fn field_weight(mut self, field: &str, weight: impl Into<RawNumber>) -> Self {
        self.field_weights
            .get_or_insert_with(BTreeMap::new)
            .insert(field.to_string(), weight.into());
        self
    }

    pub fn bm25(mut self, k1: f64, b: f64, k: f64) -> Self {
        self.bm25_params = Some(RawParams {
            k1: Some(k1.into()),
            b: Some(b.into()),
            k: Some(k.into()),
        });
        self
    }

    pub fn retain(mut self, field: &str) -> Self {
        self.retained_fields.get_or_insert_with(Vec::new).push(field.to_string());
        self
    }
}
