//! Text normalization for comparison fields.
//!
//! Steps run in a fixed order: case folding, whitespace collapsing,
//! punctuation stripping. Each runs only when its switch is on.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::config::NormalizeOptions;

static WHITESPACE_RUN: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").unwrap());
static PUNCTUATION: Lazy<Regex> = Lazy::new(|| Regex::new(r"\p{P}+").unwrap());

/// Normalize an optional text value. `None` passes through untouched.
pub fn normalize(value: Option<&str>, opts: &NormalizeOptions) -> Option<String> {
    value.map(|s| normalize_str(s, opts))
}

/// Normalize a present text value.
pub fn normalize_str(value: &str, opts: &NormalizeOptions) -> String {
    let mut out = value.to_string();
    if opts.normalize_case {
        // Unicode default case mapping, no locale tailoring.
        out = out.to_lowercase();
    }
    if opts.collapse_whitespace {
        out = WHITESPACE_RUN.replace_all(out.trim(), " ").into_owned();
    }
    if opts.strip_punctuation {
        out = PUNCTUATION.replace_all(&out, "").into_owned();
    }
    out
}
