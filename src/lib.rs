//! Step debugger for syntax-highlighting keyword rule sets.
//!
//! Keyword source is read ([`parse`]), normalized into a typed rule tree
//! ([`normalize`], [`Keywords`]) and walked by a [`Session`] in lock-step with
//! matching against a [`Document`]. Embedded code is run through a [`Host`];
//! [`Session::debug_here`] hands it to an external [`Stepper`] instead.

mod debug;
mod error;
pub mod explain;
mod host;
mod matcher;
mod navigate;
mod normalize;
pub mod parse;
mod regexp;
mod types;

pub use debug::{DebugBridge, DebugRequest, Stepper};
pub use error::StudioError;
pub use host::{FunctionTable, Host};
pub use matcher::{search_forward, try_match, MatchResult};
pub use navigate::{Command, Outcome, Session, StopReason};
pub use normalize::{normalize, normalize_with, NormalizeOptions, DEFAULT_FACE};
pub use regex_automata::meta::Regex;
pub use types::{
    Action, AnchoredSpec, CommandError, DebugError, Document, Face, FaceSpec, FontifyReport,
    Fragment, FragmentKind, HighlightSpec, HostError, Keywords, LiteralMatcher, MalformedKind,
    MalformedRuleError, MatchData, MatcherKind, MatcherSpec, NavigatorCursor, NodePath,
    NotExecutableError, Override, Phase, RuleEntry, SessionEvent, SessionLog, SessionOptions,
    Sexp, Span, StepperAbort, DEFAULT_DISPLAY_NAME,
};
