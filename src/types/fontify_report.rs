use std::fmt;
use std::time::Duration;

/// Summary of a run to the end of the keyword list, returned by
/// [`Session::fontify_all()`](crate::Session::fontify_all).
#[derive(Debug, Clone)]
#[must_use]
pub struct FontifyReport {
    transitions: usize,
    matches: Vec<usize>,
    duration: Duration,
}

impl FontifyReport {
    pub(crate) fn new(transitions: usize, matches: Vec<usize>, duration: Duration) -> Self {
        Self {
            transitions,
            matches,
            duration,
        }
    }

    /// Number of navigator transitions taken.
    #[must_use]
    pub fn transitions(&self) -> usize {
        self.transitions
    }

    /// Successful outer matches, indexed by rule.
    #[must_use]
    pub fn matches(&self) -> &[usize] {
        &self.matches
    }

    #[must_use]
    pub fn total_matches(&self) -> usize {
        self.matches.iter().sum()
    }

    /// Wall-clock duration of the run.
    #[must_use]
    pub fn duration(&self) -> Duration {
        self.duration
    }
}

impl fmt::Display for FontifyReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let matches: Vec<String> = self.matches.iter().map(ToString::to_string).collect();
        write!(f, "transitions: {}", self.transitions)?;
        write!(f, ", matches: [{}]", matches.join(", "))?;
        write!(f, ", duration: {:?}", self.duration)?;
        Ok(())
    }
}
