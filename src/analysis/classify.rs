//! Classification of opaque model failures
//!
//! Providers do not expose a stable error code for quota exhaustion, so the
//! only signal is the error text. Matching is best effort.

/// Outcome of classifying a model failure
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    QuotaExceeded,
    Other,
}

/// Maps a model failure message to a [`FailureKind`]
pub trait FailureClassifier: Send + Sync {
    fn classify(&self, message: &str) -> FailureKind;
}

/// Case-insensitive substring matcher over a fixed pattern list
#[derive(Debug, Clone)]
pub struct SubstringClassifier {
    patterns: Vec<String>,
}

impl SubstringClassifier {
    pub fn new<I, S>(patterns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            patterns: patterns
                .into_iter()
                .map(|p| p.as_ref().trim().to_lowercase())
                .filter(|p| !p.is_empty())
                .collect(),
        }
    }
}

impl Default for SubstringClassifier {
    fn default() -> Self {
        Self::new(crate::config::default_quota_patterns())
    }
}

impl FailureClassifier for SubstringClassifier {
    fn classify(&self, message: &str) -> FailureKind {
        let message = message.to_lowercase();
        if self.patterns.iter().any(|p| message.contains(p.as_str())) {
            FailureKind::QuotaExceeded
        } else {
            FailureKind::Other
        }
    }
}
