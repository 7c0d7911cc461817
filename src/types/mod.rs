mod cursor;
mod document;
mod error;
mod event;
mod fontify_report;
mod keywords;
mod options;
mod rule;
mod sexp;

pub use cursor::{NavigatorCursor, NodePath, Phase};
pub use document::{Document, MatchData, Span};
pub use error::{
    CommandError, DebugError, HostError, MalformedKind, MalformedRuleError, NotExecutableError,
    StepperAbort,
};
pub use event::{SessionEvent, SessionLog};
pub use fontify_report::FontifyReport;
pub use keywords::Keywords;
pub use options::{SessionOptions, DEFAULT_DISPLAY_NAME};
pub use rule::{
    Action, AnchoredSpec, Face, FaceSpec, Fragment, FragmentKind, HighlightSpec, LiteralMatcher,
    MatcherKind, MatcherSpec, Override, RuleEntry,
};
pub use sexp::Sexp;
