//! Lexical Flagging
//!
//! Scans transcript text against a fixed ordered denylist. Matching is
//! case-insensitive exact substring and not word-boundary aware, so a term
//! embedded in a longer word still matches.

/// Pure denylist matcher over transcript text.
#[derive(Clone, Debug)]
pub struct LexicalFlagger {
    denylist: Vec<String>,
}

impl LexicalFlagger {
    /// Builds a flagger from an ordered denylist. Terms are stored
    /// lower-cased; scan output follows the given order.
    pub fn new(denylist: &[String]) -> Self {
        Self {
            denylist: denylist.iter().map(|t| t.to_lowercase()).collect(),
        }
    }

    /// The normalized denylist, in scan order.
    pub fn denylist(&self) -> &[String] {
        &self.denylist
    }

    /// Returns every denylisted term present in the transcript as a
    /// substring, at most once per term, in denylist order. An empty
    /// transcript yields no matches. Deterministic, no failure modes.
    pub fn scan(&self, transcript: &str) -> Vec<String> {
        if transcript.is_empty() {
            return Vec::new();
        }
        let haystack = transcript.to_lowercase();
        self.denylist
            .iter()
            .filter(|term| !term.is_empty() && haystack.contains(term.as_str()))
            .cloned()
            .collect()
    }
}
