// chargelog - core/filter.rs
//
// Text-only predicates for the Connection and Error system filters.
// Deliberately independent of frame parsing so they keep working on lines
// where the parser returned absent (transport chatter, stack traces).

use crate::util::constants::{CONNECTION_TERMS, ERROR_TERMS, MAX_CONFIG_TERMS};
use regex::Regex;
use std::sync::OnceLock;

/// Detects a protocol CallError frame start anywhere in the line, so the
/// Error filter also catches `[4, ...]` frames whose description carries no
/// error vocabulary.
fn call_error_regex() -> &'static Regex {
    static CALL_ERROR: OnceLock<Regex> = OnceLock::new();
    CALL_ERROR.get_or_init(|| Regex::new(r"\[\s*4\s*,").expect("call error regex: invalid pattern"))
}

/// Matching vocabularies for the two text-based system filters.
///
/// The built-in terms cover the common gateway phrasing; deployments with
/// unusual wording can add terms via the config file. Extension only ever
/// adds terms; the built-ins are always active.
#[derive(Debug, Clone)]
pub struct PredicateVocabulary {
    connection_terms: Vec<String>,
    error_terms: Vec<String>,
}

impl Default for PredicateVocabulary {
    fn default() -> Self {
        Self {
            connection_terms: CONNECTION_TERMS.iter().map(|t| t.to_string()).collect(),
            error_terms: ERROR_TERMS.iter().map(|t| t.to_string()).collect(),
        }
    }
}

impl PredicateVocabulary {
    /// Add deployment-specific terms on top of the built-ins.
    ///
    /// Terms are matched lowercase; blanks are dropped and the total is
    /// capped so a runaway config cannot degrade every refresh cycle.
    pub fn extend(&mut self, connection: &[String], error: &[String]) {
        Self::extend_list(&mut self.connection_terms, connection);
        Self::extend_list(&mut self.error_terms, error);
    }

    fn extend_list(list: &mut Vec<String>, extra: &[String]) {
        for term in extra {
            if list.len() >= MAX_CONFIG_TERMS {
                tracing::warn!(max = MAX_CONFIG_TERMS, "Vocabulary term cap reached; ignoring rest");
                return;
            }
            let term = term.trim().to_lowercase();
            if !term.is_empty() && !list.contains(&term) {
                list.push(term);
            }
        }
    }

    /// Connection filter predicate: connection/handshake/websocket
    /// lifecycle vocabulary, case-insensitive substring match.
    pub fn is_connection(&self, message: &str) -> bool {
        let lower = message.to_lowercase();
        self.connection_terms.iter().any(|t| lower.contains(t))
    }

    /// Error filter predicate: error/failure/rejection vocabulary, plus
    /// protocol CallError frames.
    pub fn is_error(&self, message: &str) -> bool {
        let lower = message.to_lowercase();
        self.error_terms.iter().any(|t| lower.contains(t)) || call_error_regex().is_match(message)
    }
}

/// Case-insensitive free-text match over the raw message. Applied after
/// correlation as an AND filter: it narrows, never widens.
pub fn matches_search(message: &str, needle_lower: &str) -> bool {
    needle_lower.is_empty() || message.to_lowercase().contains(needle_lower)
}
