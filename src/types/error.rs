use thiserror::Error;

/// A raw keyword entry that cannot be classified into a rule.
///
/// `entry` is the zero-based position of the offending entry in the raw list.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("malformed keyword entry {entry}: {kind}")]
pub struct MalformedRuleError {
    pub entry: usize,
    pub kind: MalformedKind,
}

impl MalformedRuleError {
    pub(crate) fn new(entry: usize, kind: MalformedKind) -> Self {
        Self { entry, kind }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MalformedKind {
    #[error("entry has no matcher")]
    MissingMatcher,

    #[error("entry has no highlight actions")]
    EmptyActions,

    #[error("'{found}' is not a matcher")]
    InvalidMatcher { found: String },

    #[error("'{found}' is not a highlight")]
    InvalidHighlight { found: String },

    #[error("highlight '{highlight}' has no face")]
    MissingFace { highlight: String },

    #[error("anchored highlight nested inside anchored highlight '{found}'")]
    NestedAnchored { found: String },

    #[error("eval entries are not supported")]
    UnsupportedEval,

    #[error("invalid pattern \"{pattern}\": {message}")]
    InvalidPattern { pattern: String, message: String },
}

/// `DebugHere` was issued on a node that holds no executable fragment.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("nothing to debug at: {label}")]
pub struct NotExecutableError {
    pub label: String,
}

/// Failure reported by the host's execution facility.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum HostError {
    #[error("no definition for '{key}'")]
    Undefined { key: String },

    #[error("'{key}' is not defined as a {expected}")]
    WrongKind { key: String, expected: &'static str },

    #[error("'{key}' failed: {message}")]
    Failed { key: String, message: String },
}

/// The external stepper ended abnormally.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("stepper aborted: {reason}")]
pub struct StepperAbort {
    pub reason: String,
}

impl StepperAbort {
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DebugError {
    #[error(transparent)]
    NotExecutable(#[from] NotExecutableError),

    #[error(transparent)]
    Aborted(#[from] StepperAbort),
}

/// Failure of a navigator command.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CommandError {
    #[error(transparent)]
    Host(#[from] HostError),

    #[error(transparent)]
    Debug(#[from] DebugError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn debug_error_is_transparent() {
        let err: DebugError = StepperAbort::new("quit").into();
        assert_eq!(err.to_string(), "stepper aborted: quit");
        let err: CommandError = err.into();
        assert_eq!(err.to_string(), "stepper aborted: quit");
    }

    #[test]
    fn malformed_empty_actions_message() {
        let err = MalformedRuleError::new(3, MalformedKind::EmptyActions);
        assert_eq!(
            err.to_string(),
            "malformed keyword entry 3: entry has no highlight actions"
        );
    }

    #[test]
    fn malformed_invalid_matcher_message() {
        let err = MalformedRuleError::new(
            0,
            MalformedKind::InvalidMatcher {
                found: "42".into(),
            },
        );
        assert_eq!(
            err.to_string(),
            "malformed keyword entry 0: '42' is not a matcher"
        );
    }

    #[test]
    fn malformed_invalid_pattern_message() {
        let err = MalformedRuleError::new(
            1,
            MalformedKind::InvalidPattern {
                pattern: "\\1".into(),
                message: "back references are not supported".into(),
            },
        );
        assert_eq!(
            err.to_string(),
            "malformed keyword entry 1: invalid pattern \"\\1\": back references are not supported"
        );
    }

    #[test]
    fn not_executable_message() {
        let err = NotExecutableError {
            label: "Keyword with regexp matcher".into(),
        };
        assert_eq!(
            err.to_string(),
            "nothing to debug at: Keyword with regexp matcher"
        );
    }

    #[test]
    fn host_error_messages() {
        let err = HostError::Undefined {
            key: "my-matcher".into(),
        };
        assert_eq!(err.to_string(), "no definition for 'my-matcher'");

        let err = HostError::WrongKind {
            key: "my-matcher".into(),
            expected: "matcher",
        };
        assert_eq!(err.to_string(), "'my-matcher' is not defined as a matcher");
    }
}
