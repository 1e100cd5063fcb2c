//! File name normalization for token-overlap scoring.

use once_cell::sync::Lazy;
use regex_lite::Regex;
use unicode_normalization::char::is_combining_mark;
use unicode_normalization::UnicodeNormalization;

static TOKEN: Lazy<Regex> = Lazy::new(|| Regex::new(r"[a-z0-9]{2,}").unwrap());

/// Decompose and drop combining marks, so `é` becomes `e`.
pub fn fold_accents(input: &str) -> String {
    input.nfd().filter(|c| !is_combining_mark(*c)).collect()
}

/// Fold accents, lowercase, and split into alphanumeric runs of two or more.
///
/// Tokens are returned in order of first appearance, without duplicates.
pub fn tokenize(input: &str) -> Vec<String> {
    let folded = fold_accents(input).to_lowercase();
    let mut tokens: Vec<String> = Vec::new();
    for m in TOKEN.find_iter(&folded) {
        if !tokens.iter().any(|t| t == m.as_str()) {
            tokens.push(m.as_str().to_string());
        }
    }
    tokens
}
