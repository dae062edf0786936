//! Error signatures and keyword extraction.

use std::collections::HashSet;

use regex::Regex;

/// Maximum length of a derived error signature, in characters.
pub const SIGNATURE_MAX_CHARS: usize = 160;
/// Maximum number of keywords kept per text.
pub const MAX_KEYWORDS: usize = 12;
/// Minimum keyword length.
pub const MIN_KEYWORD_LEN: usize = 3;
/// Keyword overlap above which two errors are considered the same.
pub const SIMILARITY_THRESHOLD: f64 = 0.7;

const STOP_WORDS: &[&str] = &[
    "the", "and", "for", "with", "from", "this", "that", "are", "was", "were", "has", "have",
    "had", "but", "its", "into", "does", "did", "can", "will", "you", "your", "not", "npm", "err",
    "error", "warn", "info",
];

/// First line of `text` that reads like an error report.
///
/// npm `> pkg@1.0.0 build` banner lines are skipped. Without an error-like
/// line the first other non-empty line is used.
pub fn error_line(text: &str) -> &str {
    let candidates = || {
        text.lines()
            .map(str::trim)
            .filter(|l| !l.is_empty() && !l.starts_with('>'))
    };
    let looks_like_error =
        Regex::new(r"(?i:\berror\b)|ERR!|\bTS\d+\b|\bCannot\b|Module not found").ok();

    candidates()
        .find(|l| looks_like_error.as_ref().is_some_and(|re| re.is_match(l)))
        .or_else(|| candidates().next())
        .unwrap_or_default()
}

/// [`error_line`] without a leading `file(line,col):` location.
pub fn error_summary(text: &str) -> &str {
    let line = error_line(text);
    match Regex::new(r"^[^\s(]+\(\d+,\d+\):\s*")
        .ok()
        .and_then(|re| re.find(line))
    {
        Some(location) => &line[location.end()..],
        None => line,
    }
}

/// Derive the signature stored as a learned pattern's `error_pattern`.
///
/// The [`error_summary`] of the text, capped at [`SIGNATURE_MAX_CHARS`]
/// characters.
pub fn derive_signature(text: &str) -> String {
    error_summary(text).chars().take(SIGNATURE_MAX_CHARS).collect()
}

/// Extract lowercase keywords from free text.
///
/// Tokens are runs of ASCII alphanumerics, `_` or `-`; short tokens, pure
/// numbers and stop words are dropped. Order of first appearance is kept.
pub fn extract_keywords(text: &str) -> Vec<String> {
    let mut seen = HashSet::new();
    let mut keywords = Vec::new();

    for token in text.split(|c: char| !(c.is_ascii_alphanumeric() || c == '_' || c == '-')) {
        let token = token.trim_matches('-').to_ascii_lowercase();
        if token.len() < MIN_KEYWORD_LEN
            || token.chars().all(|c| c.is_ascii_digit())
            || STOP_WORDS.contains(&token.as_str())
        {
            continue;
        }
        if seen.insert(token.clone()) {
            keywords.push(token);
            if keywords.len() == MAX_KEYWORDS {
                break;
            }
        }
    }

    keywords
}

/// Overlap ratio of two keyword sets: `|A ∩ B| / max(|A|, |B|)`.
pub fn keyword_similarity(a: &[String], b: &[String]) -> f64 {
    if a.is_empty() || b.is_empty() {
        return 0.0;
    }
    let left: HashSet<&str> = a.iter().map(String::as_str).collect();
    let right: HashSet<&str> = b.iter().map(String::as_str).collect();
    let shared = left.intersection(&right).count();
    shared as f64 / left.len().max(right.len()) as f64
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_signature_first_line() {
        let text = "\n\n   src/Badge.tsx(4,9): error TS2304: Cannot find name 'React'.  \nmore";
        assert_eq!(derive_signature(text), "error TS2304: Cannot find name 'React'.");
        assert_eq!(derive_signature("x".repeat(400).as_str()).len(), SIGNATURE_MAX_CHARS);
        assert_eq!(derive_signature("   \n  "), "");
    }

    #[test]
    fn test_signature_skips_npm_banner() {
        let text = "\n> badge@1.0.0 build\n> pluggable-widgets-tools build:web\n\n\
                    Compiling...\n\
                    src/Badge.tsx(12,30): error TS2339: Property 'displayValue' does not exist.\n";
        assert_eq!(
            error_line(text),
            "src/Badge.tsx(12,30): error TS2339: Property 'displayValue' does not exist."
        );
        assert_eq!(
            derive_signature(text),
            "error TS2339: Property 'displayValue' does not exist."
        );

        let npm = "> badge@1.0.0 build\nnpm ERR! Missing script: \"build\"";
        assert_eq!(derive_signature(npm), "npm ERR! Missing script: \"build\"");

        // No error-like line: first non-banner line wins.
        assert_eq!(derive_signature("> badge@1.0.0 build\nsomething odd\n"), "something odd");
        assert_eq!(derive_signature("> badge@1.0.0 build\n"), "");
    }

    #[test]
    fn test_keywords() {
        let keywords = extract_keywords("error TS2304: Cannot find name 'React'. The React import");
        assert_eq!(keywords, vec!["ts2304", "cannot", "find", "name", "react", "import"]);

        let many = (0..40).map(|i| format!("word{}", i)).collect::<Vec<_>>().join(" ");
        assert_eq!(extract_keywords(&many).len(), MAX_KEYWORDS);
    }

    #[test]
    fn test_similarity() {
        let a = extract_keywords("Cannot find module 'classnames' imported from Badge");
        let b = extract_keywords("Cannot find module 'classnames' imported from Rating");
        assert!(keyword_similarity(&a, &b) > SIMILARITY_THRESHOLD);

        let c = extract_keywords("Missing script build");
        assert!(keyword_similarity(&a, &c) < SIMILARITY_THRESHOLD);
        assert_eq!(keyword_similarity(&a, &[]), 0.0);
    }
}
