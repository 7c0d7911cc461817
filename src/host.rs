use std::collections::HashMap;
use std::fmt;
use std::path::{Path, PathBuf};

use crate::parse::parse_sexp;
use crate::types::{Document, Face, Fragment, HostError};

/// The host's execution facility for embedded fragments.
///
/// The engine never looks inside a fragment; it hands the fragment to the
/// host and observes the result and the document afterwards.
pub trait Host {
    /// Run a code matcher bounded by `limit`. On success the matcher has set
    /// the document's match data and moved point past the match.
    ///
    /// # Errors
    ///
    /// Returns [`HostError`] if the fragment cannot be run.
    fn call_matcher(
        &mut self,
        fragment: &Fragment,
        document: &mut Document,
        limit: usize,
    ) -> Result<bool, HostError>;

    /// Evaluate a face expression against the current match data.
    ///
    /// # Errors
    ///
    /// Returns [`HostError`] if the fragment cannot be run.
    fn eval_face(&mut self, fragment: &Fragment, document: &Document)
        -> Result<Option<Face>, HostError>;

    /// Evaluate a pre- or post-match form. The value is a document position
    /// or nothing.
    ///
    /// # Errors
    ///
    /// Returns [`HostError`] if the fragment cannot be run.
    fn eval_form(
        &mut self,
        fragment: &Fragment,
        document: &mut Document,
    ) -> Result<Option<usize>, HostError>;

    /// File the fragment was defined in, when it is file-backed.
    fn source_file(&self, _fragment: &Fragment) -> Option<&Path> {
        None
    }
}

type MatcherFn = Box<dyn FnMut(&mut Document, usize) -> bool>;
type FaceFn = Box<dyn FnMut(&Document) -> Option<Face>>;
type FormFn = Box<dyn FnMut(&mut Document) -> Option<usize>>;

enum Definition {
    Matcher(MatcherFn),
    Face(FaceFn),
    Form(FormFn),
}

impl Definition {
    fn kind(&self) -> &'static str {
        match self {
            Definition::Matcher(_) => "matcher",
            Definition::Face(_) => "face expression",
            Definition::Form(_) => "form",
        }
    }
}

/// A [`Host`] backed by Rust closures registered per fragment key.
///
/// Keys are function names for named matchers and source text for inline
/// fragments. Source keys are read and printed canonically, so whitespace
/// differences do not matter.
///
/// ```
/// use highlight_studio::{Document, FunctionTable, Host};
///
/// let table = FunctionTable::new()
///     .matcher("my-matcher", |doc: &mut Document, limit| {
///         doc.goto_char(limit);
///         false
///     })
///     .form("(line-end-position)", |doc: &mut Document| Some(doc.line_end_position()))
///     .defined_in("my-matcher", "lisp/my-mode.el");
/// assert_eq!(table.len(), 2);
/// ```
#[derive(Default)]
pub struct FunctionTable {
    definitions: HashMap<String, Definition>,
    files: HashMap<String, PathBuf>,
}

/// Canonical key for fragment source text.
fn canonical_key(source: &str) -> String {
    parse_sexp(source).map_or_else(|_| source.trim().to_owned(), |s| s.to_string())
}

impl FunctionTable {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn matcher(
        mut self,
        key: &str,
        f: impl FnMut(&mut Document, usize) -> bool + 'static,
    ) -> Self {
        self.definitions
            .insert(canonical_key(key), Definition::Matcher(Box::new(f)));
        self
    }

    #[must_use]
    pub fn face(mut self, key: &str, f: impl FnMut(&Document) -> Option<Face> + 'static) -> Self {
        self.definitions
            .insert(canonical_key(key), Definition::Face(Box::new(f)));
        self
    }

    #[must_use]
    pub fn form(
        mut self,
        key: &str,
        f: impl FnMut(&mut Document) -> Option<usize> + 'static,
    ) -> Self {
        self.definitions
            .insert(canonical_key(key), Definition::Form(Box::new(f)));
        self
    }

    /// Record the file a fragment was defined in.
    #[must_use]
    pub fn defined_in(mut self, key: &str, path: impl Into<PathBuf>) -> Self {
        self.files.insert(canonical_key(key), path.into());
        self
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.definitions.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.definitions.is_empty()
    }

    fn lookup(&mut self, fragment: &Fragment) -> Result<(String, &mut Definition), HostError> {
        let key = fragment.key();
        match self.definitions.get_mut(&key) {
            Some(def) => Ok((key, def)),
            None => Err(HostError::Undefined { key }),
        }
    }
}

impl Host for FunctionTable {
    fn call_matcher(
        &mut self,
        fragment: &Fragment,
        document: &mut Document,
        limit: usize,
    ) -> Result<bool, HostError> {
        match self.lookup(fragment)? {
            (_, Definition::Matcher(f)) => Ok(f(document, limit)),
            (key, _) => Err(HostError::WrongKind {
                key,
                expected: "matcher",
            }),
        }
    }

    fn eval_face(
        &mut self,
        fragment: &Fragment,
        document: &Document,
    ) -> Result<Option<Face>, HostError> {
        match self.lookup(fragment)? {
            (_, Definition::Face(f)) => Ok(f(document)),
            (key, _) => Err(HostError::WrongKind {
                key,
                expected: "face expression",
            }),
        }
    }

    fn eval_form(
        &mut self,
        fragment: &Fragment,
        document: &mut Document,
    ) -> Result<Option<usize>, HostError> {
        match self.lookup(fragment)? {
            (_, Definition::Form(f)) => Ok(f(document)),
            (key, _) => Err(HostError::WrongKind {
                key,
                expected: "form",
            }),
        }
    }

    fn source_file(&self, fragment: &Fragment) -> Option<&Path> {
        self.files.get(&fragment.key()).map(PathBuf::as_path)
    }
}

impl fmt::Debug for FunctionTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut keys: Vec<(&str, &str)> = self
            .definitions
            .iter()
            .map(|(k, d)| (k.as_str(), d.kind()))
            .collect();
        keys.sort_unstable();
        f.debug_struct("FunctionTable")
            .field("definitions", &keys)
            .field("files", &self.files)
            .finish()
    }
}
