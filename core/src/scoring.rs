//! BM25F arithmetic used at consolidation time.
//!
//! ```text
//! idf(t)    = ln((N - n(t) + 0.5) / (n(t) + 0.5) + k)
//! norm(d)   = (1 - b) + b * |d| / avgdl
//! w(t, d)   = sign(f) * round(|f * (k1 + 1) / (k1 * norm(d) + f)| * idf(t), fp)
//! ```
//!
//! where `f` is the field-weighted frequency of `t` in `d`. Search then only
//! sums the stored `w(t, d)`.

pub const DEFAULT_PRECISION: u32 = 4;
pub const MIN_PRECISION: u32 = 4;
pub const MAX_PRECISION: u32 = 9;

/// Decimal places kept for stored term weights, clamped to 4..=9.
pub fn precision(fp: Option<i64>) -> u32 {
    match fp {
        Some(p) => p.clamp(MIN_PRECISION as i64, MAX_PRECISION as i64) as u32,
        None => DEFAULT_PRECISION,
    }
}

pub fn idf(total_docs: usize, df: usize, k: f64) -> f64 {
    let n = df as f64;
    (((total_docs as f64 - n + 0.5) / (n + 0.5)) + k).ln()
}

pub fn length_norm(b: f64, doc_length: f64, avg_length: f64) -> f64 {
    if avg_length <= 0.0 {
        // Only empty documents: nothing to normalize.
        return 1.0;
    }
    (1.0 - b) + b * (doc_length / avg_length)
}

/// Final score contribution of a term. The sign is taken from `freq` and
/// reapplied after the magnitude is computed, since a large `k1` could flip it.
pub fn term_weight(freq: f64, k1: f64, norm: f64, idf: f64, precision: u32) -> f64 {
    if freq == 0.0 {
        return 0.0;
    }
    let denominator = (k1 * norm) + freq;
    let tf = if denominator == 0.0 {
        // A negative frequency can cancel `k1 * norm` exactly.
        (freq.abs() * (k1 + 1.0)) / ((k1 * norm) + freq.abs())
    } else {
        (freq * (k1 + 1.0)) / denominator
    };
    freq.signum() * round_to(tf.abs() * idf, precision)
}

pub fn round_to(value: f64, precision: u32) -> f64 {
    let scale = 10f64.powi(precision as i32);
    (value * scale).round() / scale
}
