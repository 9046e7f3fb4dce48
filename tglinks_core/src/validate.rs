//! Per-candidate validation: format, normalization, existence.

use std::collections::{BTreeMap, BTreeSet};
use tracing::debug;

use crate::extract::{LinkSyntax, extract};
use crate::probe::ExistenceProbe;

/// Prefix of every canonical link.
pub const CANONICAL_PREFIX: &str = "https://t.me/";

pub const INVALID_FORMAT: &str = "Invalid link format";

/// Outcome of validating one candidate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationResult {
    /// Candidate text as extracted.
    pub original: String,
    /// Canonical form, empty when the candidate never got that far.
    pub normalized: String,
    pub is_valid: bool,
    /// Empty when valid.
    pub error_message: String,
}

impl ValidationResult {
    fn invalid(original: &str, normalized: String, error: impl Into<String>) -> Self {
        Self {
            original: original.to_string(),
            normalized,
            is_valid: false,
            error_message: error.into(),
        }
    }
}

/// Canonical `https://t.me/<name>` form of a candidate written in any
/// supported syntax.
#[must_use]
pub fn normalize(candidate: &str) -> Option<String> {
    LinkSyntax::identifier(candidate).map(|name| format!("{CANONICAL_PREFIX}{name}"))
}

pub struct Validator<P> {
    probe: P,
}

impl<P: ExistenceProbe> Validator<P> {
    pub const fn new(probe: P) -> Self {
        Self { probe }
    }

    pub const fn probe(&self) -> &P {
        &self.probe
    }

    pub async fn validate_candidate(&self, candidate: &str) -> ValidationResult {
        let Some((syntax, name)) = LinkSyntax::parse(candidate) else {
            debug!("Rejected malformed candidate {candidate}");
            return ValidationResult::invalid(candidate, String::new(), INVALID_FORMAT);
        };
        let normalized = format!("{CANONICAL_PREFIX}{name}");
        debug!("Checking {normalized} (written as {syntax:?})");

        match self.probe.check(&normalized).await {
            Ok(()) => ValidationResult {
                original: candidate.to_string(),
                normalized,
                is_valid: true,
                error_message: String::new(),
            },
            Err(e) => {
                debug!("Existence check failed for {normalized}: {e}");
                ValidationResult::invalid(candidate, normalized, e.to_string())
            }
        }
    }

    /// Validate each candidate once, in isolation.
    pub async fn validate_candidates(
        &self,
        candidates: &BTreeSet<String>,
    ) -> BTreeMap<String, ValidationResult> {
        let mut results = BTreeMap::new();
        for candidate in candidates {
            let result = self.validate_candidate(candidate).await;
            results.insert(candidate.clone(), result);
        }
        results
    }

    /// Extract candidates from `text` and validate all of them.
    pub async fn validate(&self, text: &str) -> BTreeMap<String, ValidationResult> {
        self.validate_candidates(&extract(text)).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::probe::ProbeError;
    use async_trait::async_trait;
    use std::sync::Mutex;

    struct RecordingProbe {
        outcome: Result<(), ProbeError>,
        seen: Mutex<Vec<String>>,
    }

    impl RecordingProbe {
        fn new(outcome: Result<(), ProbeError>) -> Self {
            Self {
                outcome,
                seen: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl ExistenceProbe for RecordingProbe {
        async fn check(&self, url: &str) -> Result<(), ProbeError> {
            if let Ok(mut seen) = self.seen.lock() {
                seen.push(url.to_string());
            }
            self.outcome.clone()
        }
    }

    #[test]
    fn test_normalize_every_syntax_to_same_form() {
        for candidate in [
            "@example",
            "t.me/example",
            "telegram.me/example",
            "https://t.me/example",
            "https://telegram.me/example",
        ] {
            assert_eq!(
                normalize(candidate).as_deref(),
                Some("https://t.me/example")
            );
        }
    }

    #[test]
    fn test_normalize_rejects_partial_match() {
        assert_eq!(normalize("hi @example"), None);
        assert_eq!(normalize("http://t.me/example"), None);
    }

    #[tokio::test]
    async fn test_invalid_format_skips_probe() {
        let validator = Validator::new(RecordingProbe::new(Ok(())));
        let result = validator.validate_candidate("example").await;

        assert!(!result.is_valid);
        assert_eq!(result.normalized, "");
        assert_eq!(result.error_message, INVALID_FORMAT);
        assert!(validator.probe().seen.lock().is_ok_and(|s| s.is_empty()));
    }

    #[tokio::test]
    async fn test_probe_receives_canonical_form() {
        let validator = Validator::new(RecordingProbe::new(Ok(())));
        let result = validator.validate_candidate("telegram.me/example").await;

        assert!(result.is_valid);
        assert_eq!(result.original, "telegram.me/example");
        assert_eq!(result.normalized, "https://t.me/example");
        assert_eq!(result.error_message, "");
        assert!(
            validator
                .probe()
                .seen
                .lock()
                .is_ok_and(|s| s.as_slice() == ["https://t.me/example"])
        );
    }

    #[tokio::test]
    async fn test_timeout_is_reported() {
        let validator = Validator::new(RecordingProbe::new(Err(ProbeError::Timeout)));
        let result = validator.validate_candidate("@example").await;

        assert!(!result.is_valid);
        assert_eq!(result.normalized, "https://t.me/example");
        assert_eq!(result.error_message, "Request timed out");
    }

    #[tokio::test]
    async fn test_transport_error_text_is_kept() {
        let validator = Validator::new(RecordingProbe::new(Err(ProbeError::Transport(
            "connection refused".to_string(),
        ))));
        let result = validator.validate_candidate("@example").await;
        assert_eq!(result.error_message, "connection refused");
    }

    #[tokio::test]
    async fn test_validate_text_maps_each_candidate() {
        let validator = Validator::new(RecordingProbe::new(Ok(())));
        let results = validator.validate("@example and t.me/another").await;

        assert_eq!(results.len(), 2);
        assert!(results.values().all(|r| r.is_valid));
        assert_eq!(results["@example"].normalized, "https://t.me/example");
        assert_eq!(results["t.me/another"].normalized, "https://t.me/another");
    }

    #[tokio::test]
    async fn test_validate_text_without_links_is_empty() {
        let validator = Validator::new(RecordingProbe::new(Ok(())));
        assert!(validator.validate("hello world").await.is_empty());
    }
}
