//! Per-session request de-duplication.
//!
//! Feature drivers must not launch two concurrent runs for the same
//! logical subject. The cache is owned by the caller, keyed by a
//! normalized subject, with an explicit insert/clear lifecycle.

use regex::Regex;
use std::collections::HashSet;

/// Normalize a user-entered subject to a canonical dedup key: scheme and
/// `www.` prefix stripped, trailing slash removed.
pub fn normalize_subject(raw: &str) -> String {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return String::new();
    }

    let scheme = Regex::new(r"^https?://").expect("valid scheme pattern");
    let www = Regex::new(r"^www\.").expect("valid www pattern");

    let cleaned = scheme.replace(trimmed, "");
    let cleaned = www.replace(&cleaned, "");
    cleaned.trim_end_matches('/').to_string()
}

/// Canonical base URL for probing a normalized subject.
pub fn canonical_base_url(raw: &str) -> String {
    format!("https://{}", normalize_subject(raw))
}

/// Set of subjects already checked in this session.
#[derive(Debug, Default)]
pub struct DedupCache {
    seen: HashSet<String>,
}

impl DedupCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Mark a subject as checked. Returns `true` if it was not seen before.
    pub fn insert(&mut self, subject: &str) -> bool {
        self.seen.insert(normalize_subject(subject))
    }

    pub fn contains(&self, subject: &str) -> bool {
        self.seen.contains(&normalize_subject(subject))
    }

    /// Forget all checked subjects, allowing re-runs.
    pub fn clear(&mut self) {
        self.seen.clear();
    }

    pub fn len(&self) -> usize {
        self.seen.len()
    }

    pub fn is_empty(&self) -> bool {
        self.seen.is_empty()
    }
}
