use std::fmt;

use super::error::MalformedRuleError;
use super::rule::{Action, RuleEntry};
use super::sexp::Sexp;
use crate::normalize::{normalize_with, NormalizeOptions};

/// A normalized keyword list, ready to be stepped through.
///
/// # Example
///
/// ```
/// use highlight_studio::Keywords;
///
/// let keywords = Keywords::from_source(
///     r#"'(("\\<\\(fn\\)\\s-+\\(\\w+\\)"
///          (1 font-lock-keyword-face)
///          (2 font-lock-function-name-face))
///        (my-string-matcher . font-lock-string-face))"#,
/// )
/// .unwrap();
/// assert_eq!(keywords.len(), 2);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct Keywords {
    entries: Vec<RuleEntry>,
}

impl Keywords {
    /// Normalize already-read entries.
    ///
    /// # Errors
    ///
    /// Returns [`MalformedRuleError`] for the first entry that is not a rule.
    pub fn from_raw(raw: &[Sexp]) -> Result<Self, MalformedRuleError> {
        Self::from_raw_with(raw, NormalizeOptions::default())
    }

    /// # Errors
    ///
    /// Returns [`MalformedRuleError`] for the first entry that is not a rule.
    pub fn from_raw_with(
        raw: &[Sexp],
        options: NormalizeOptions,
    ) -> Result<Self, MalformedRuleError> {
        Ok(Self {
            entries: normalize_with(raw, options)?,
        })
    }

    /// Read and normalize keyword source text.
    ///
    /// This is a convenience method combining [`parse`](crate::parse::parse)
    /// and [`normalize`](crate::normalize()).
    ///
    /// # Errors
    ///
    /// Returns [`StudioError`](crate::StudioError) on read or normalize failure.
    pub fn from_source(input: &str) -> Result<Self, crate::StudioError> {
        Self::from_source_with(input, NormalizeOptions::default())
    }

    /// # Errors
    ///
    /// Returns [`StudioError`](crate::StudioError) on read or normalize failure.
    pub fn from_source_with(
        input: &str,
        options: NormalizeOptions,
    ) -> Result<Self, crate::StudioError> {
        let raw = crate::parse::parse(input)?;
        Ok(Self::from_raw_with(&raw.entries, options)?)
    }

    /// Read a keyword file and normalize it.
    ///
    /// # Errors
    ///
    /// Returns [`StudioError`](crate::StudioError) on I/O, read, or normalize failure.
    pub fn from_file(path: impl AsRef<std::path::Path>) -> Result<Self, crate::StudioError> {
        let input = std::fs::read_to_string(path)?;
        Self::from_source(&input)
    }

    #[must_use]
    pub fn entries(&self) -> &[RuleEntry] {
        &self.entries
    }

    #[must_use]
    pub fn get(&self, index: usize) -> Option<&RuleEntry> {
        self.entries.get(index)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Number of anchored highlights across all entries.
    #[must_use]
    pub fn anchored_count(&self) -> usize {
        self.entries
            .iter()
            .flat_map(RuleEntry::actions)
            .filter(|a| matches!(a, Action::Anchored(_)))
            .count()
    }

    /// The entries in canonical `(MATCHER ACTION...)` form.
    #[must_use]
    pub fn to_raw(&self) -> Vec<Sexp> {
        self.entries.iter().map(RuleEntry::to_sexp).collect()
    }
}

impl From<Keywords> for Vec<RuleEntry> {
    fn from(keywords: Keywords) -> Self {
        keywords.entries
    }
}

impl fmt::Display for Keywords {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Keywords({} entries, {} anchored)",
            self.entries.len(),
            self.anchored_count(),
        )
    }
}
