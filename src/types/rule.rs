use std::fmt;

use regex_automata::meta::Regex;

use super::Sexp;

/// The shape of an executable fragment embedded in a keyword entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum FragmentKind {
    /// A reference to a function by name.
    Function,
    /// An inline `lambda` without captured environment.
    Lambda,
    /// An inline `closure` carrying a captured environment.
    Closure,
    /// A form evaluated for its value (face expressions, pre/post forms).
    Form,
}

/// An executable fragment, kept as source.
///
/// The fragment is never run here. Its [`key`](Fragment::key) is how the
/// host execution facility finds the code to run.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Fragment {
    kind: FragmentKind,
    form: Sexp,
}

impl Fragment {
    #[must_use]
    pub fn new(kind: FragmentKind, form: Sexp) -> Self {
        Self { kind, form }
    }

    #[must_use]
    pub fn kind(&self) -> FragmentKind {
        self.kind
    }

    #[must_use]
    pub fn form(&self) -> &Sexp {
        &self.form
    }

    /// Declared name of a named function.
    #[must_use]
    pub fn name(&self) -> Option<&str> {
        match self.kind {
            FragmentKind::Function => self.form.as_symbol(),
            _ => None,
        }
    }

    /// The function name for named functions, the canonical printed form
    /// for everything else.
    #[must_use]
    pub fn key(&self) -> String {
        self.form.to_string()
    }
}

impl fmt::Display for Fragment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.form)
    }
}

/// A literal search pattern, translated and compiled once.
#[derive(Debug, Clone)]
pub struct LiteralMatcher {
    pattern: String,
    case_fold: bool,
    regex: Regex,
}

impl LiteralMatcher {
    pub(crate) fn compile(pattern: String, case_fold: bool) -> Result<Self, String> {
        let regex = crate::regexp::compile(&pattern, case_fold)?;
        Ok(Self {
            pattern,
            case_fold,
            regex,
        })
    }

    /// The pattern as written, in the host's regexp dialect.
    #[must_use]
    pub fn pattern(&self) -> &str {
        &self.pattern
    }

    #[must_use]
    pub fn regex(&self) -> &Regex {
        &self.regex
    }
}

impl PartialEq for LiteralMatcher {
    fn eq(&self, other: &Self) -> bool {
        self.pattern == other.pattern && self.case_fold == other.case_fold
    }
}

/// How a matcher was written. Fixed at normalization.
#[derive(Debug, Clone, PartialEq)]
pub enum MatcherSpec {
    Literal(LiteralMatcher),
    NamedFunction(Fragment),
    Anonymous(Fragment),
    Closure(Fragment),
}

/// The classification stepping and explanation work with. Anonymous and
/// closure matchers collapse into [`MatcherKind::CodeBased`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum MatcherKind {
    Literal,
    Named,
    CodeBased,
}

impl MatcherSpec {
    #[must_use]
    pub fn kind(&self) -> MatcherKind {
        match self {
            MatcherSpec::Literal(_) => MatcherKind::Literal,
            MatcherSpec::NamedFunction(_) => MatcherKind::Named,
            MatcherSpec::Anonymous(_) | MatcherSpec::Closure(_) => MatcherKind::CodeBased,
        }
    }

    /// The executable fragment, if the matcher is code.
    #[must_use]
    pub fn fragment(&self) -> Option<&Fragment> {
        match self {
            MatcherSpec::Literal(_) => None,
            MatcherSpec::NamedFunction(f) | MatcherSpec::Anonymous(f) | MatcherSpec::Closure(f) => {
                Some(f)
            }
        }
    }

    #[must_use]
    pub fn to_sexp(&self) -> Sexp {
        match self {
            MatcherSpec::Literal(m) => Sexp::string(m.pattern()),
            MatcherSpec::NamedFunction(f) | MatcherSpec::Anonymous(f) | MatcherSpec::Closure(f) => {
                f.form().clone()
            }
        }
    }
}

/// A face name.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Face(String);

impl Face {
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Face {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Face {
    fn from(s: &str) -> Self {
        Face::new(s)
    }
}

/// How a highlight picks its face.
///
/// Symbols and strings are both literal names; they are kept apart so the
/// highlight prints back the way it was written.
#[derive(Debug, Clone, PartialEq)]
pub enum FaceSpec {
    /// A symbol or quoted symbol.
    Literal(Face),
    /// A string.
    Str(Face),
    /// `nil`: no face. Only clears, under [`Override::Replace`].
    Nil,
    /// Evaluated after every successful match to pick the face.
    Expression(Fragment),
}

impl FaceSpec {
    /// The face named directly by this spec, if any.
    #[must_use]
    pub fn face(&self) -> Option<&Face> {
        match self {
            FaceSpec::Literal(face) | FaceSpec::Str(face) => Some(face),
            FaceSpec::Nil | FaceSpec::Expression(_) => None,
        }
    }

    fn to_sexp(&self) -> Sexp {
        match self {
            FaceSpec::Literal(face) => Sexp::symbol(face.name()),
            FaceSpec::Str(face) => Sexp::string(face.name()),
            FaceSpec::Nil => Sexp::nil(),
            FaceSpec::Expression(f) => f.form().clone(),
        }
    }
}

/// What to do when the highlighted span already carries a face.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Override {
    /// Apply only when no part of the span is fontified.
    #[default]
    Never,
    /// Replace whatever is there.
    Replace,
    /// Fill in only the unfontified parts.
    Keep,
    Prepend,
    Append,
}

impl Override {
    pub(crate) fn from_sexp(s: &Sexp) -> Option<Override> {
        if s.is_nil() {
            return Some(Override::Never);
        }
        match s.as_symbol()? {
            "t" => Some(Override::Replace),
            "keep" => Some(Override::Keep),
            "prepend" => Some(Override::Prepend),
            "append" => Some(Override::Append),
            _ => None,
        }
    }

    fn to_sexp(self) -> Sexp {
        match self {
            Override::Never => Sexp::nil(),
            Override::Replace => Sexp::symbol("t"),
            Override::Keep => Sexp::symbol("keep"),
            Override::Prepend => Sexp::symbol("prepend"),
            Override::Append => Sexp::symbol("append"),
        }
    }
}

/// Decorate subexpression `subexp` of the current match.
#[derive(Debug, Clone, PartialEq)]
pub struct HighlightSpec {
    pub subexp: usize,
    pub face: FaceSpec,
    pub override_mode: Override,
    /// An unmatched subexpression is tolerated when set.
    pub laxmatch: bool,
}

impl HighlightSpec {
    #[must_use]
    pub fn new(subexp: usize, face: FaceSpec) -> Self {
        Self {
            subexp,
            face,
            override_mode: Override::Never,
            laxmatch: false,
        }
    }

    #[must_use]
    pub fn to_sexp(&self) -> Sexp {
        #[allow(clippy::cast_possible_wrap)]
        let mut items = vec![Sexp::Int(self.subexp as i64), self.face.to_sexp()];
        if self.override_mode != Override::Never || self.laxmatch {
            items.push(self.override_mode.to_sexp());
        }
        if self.laxmatch {
            items.push(Sexp::symbol("t"));
        }
        Sexp::list(items)
    }
}

/// Chained sub-matching bounded by the value of a pre-match form.
#[derive(Debug, Clone, PartialEq)]
pub struct AnchoredSpec {
    pub matcher: MatcherSpec,
    pub pre_form: Option<Fragment>,
    pub post_form: Option<Fragment>,
    pub highlights: Vec<HighlightSpec>,
}

impl AnchoredSpec {
    #[must_use]
    pub fn to_sexp(&self) -> Sexp {
        let form = |f: &Option<Fragment>| f.as_ref().map_or_else(Sexp::nil, |f| f.form().clone());
        let mut items = vec![
            self.matcher.to_sexp(),
            form(&self.pre_form),
            form(&self.post_form),
        ];
        items.extend(self.highlights.iter().map(HighlightSpec::to_sexp));
        Sexp::list(items)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    Highlight(HighlightSpec),
    Anchored(AnchoredSpec),
}

impl Action {
    #[must_use]
    pub fn to_sexp(&self) -> Sexp {
        match self {
            Action::Highlight(h) => h.to_sexp(),
            Action::Anchored(a) => a.to_sexp(),
        }
    }
}

/// One top-level highlighting rule: a matcher and a non-empty action list.
#[derive(Debug, Clone, PartialEq)]
pub struct RuleEntry {
    matcher: MatcherSpec,
    actions: Vec<Action>,
}

impl RuleEntry {
    /// Callers guarantee `actions` is non-empty.
    pub(crate) fn new(matcher: MatcherSpec, actions: Vec<Action>) -> Self {
        debug_assert!(!actions.is_empty());
        Self { matcher, actions }
    }

    #[must_use]
    pub fn matcher(&self) -> &MatcherSpec {
        &self.matcher
    }

    #[must_use]
    pub fn actions(&self) -> &[Action] {
        &self.actions
    }

    #[must_use]
    pub fn action(&self, index: usize) -> Option<&Action> {
        self.actions.get(index)
    }

    /// The entry in its canonical `(MATCHER ACTION...)` shape.
    #[must_use]
    pub fn to_sexp(&self) -> Sexp {
        let mut items = vec![self.matcher.to_sexp()];
        items.extend(self.actions.iter().map(Action::to_sexp));
        Sexp::list(items)
    }
}
