use crate::Sexp;

/// The result of reading keyword source text: the raw, unclassified entries
/// in declaration order.
#[derive(Debug, Clone, PartialEq)]
pub struct RawSpec {
    pub entries: Vec<Sexp>,
}

impl RawSpec {
    #[must_use]
    pub fn new(entries: Vec<Sexp>) -> Self {
        Self { entries }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
