use std::fmt;

use super::MatchData;

/// Where the navigator stands within the focused rule.
///
/// Indices are action indices within the rule, and for
/// [`Phase::AtInnerHighlight`] the highlight index within the anchored highlight.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Phase {
    AtRuleMatcher,
    AtHighlight(usize),
    AtAnchoredMatcher(usize),
    AtPreForm(usize),
    AtInnerMatcher(usize),
    AtInnerHighlight(usize, usize),
    AtPostForm(usize),
    Exhausted,
}

impl Phase {
    /// The action of the rule this phase belongs to, if any.
    #[must_use]
    pub fn action(&self) -> Option<usize> {
        match *self {
            Phase::AtRuleMatcher | Phase::Exhausted => None,
            Phase::AtHighlight(i)
            | Phase::AtAnchoredMatcher(i)
            | Phase::AtPreForm(i)
            | Phase::AtInnerMatcher(i)
            | Phase::AtInnerHighlight(i, _)
            | Phase::AtPostForm(i) => Some(i),
        }
    }

    /// True for the first phase reached when entering a node: the node's
    /// breakpoint fires here.
    #[must_use]
    pub fn is_entry(&self) -> bool {
        matches!(
            self,
            Phase::AtRuleMatcher
                | Phase::AtHighlight(_)
                | Phase::AtAnchoredMatcher(_)
                | Phase::AtInnerHighlight(..)
        )
    }

    /// True while inside the anchored highlight at `action`.
    #[must_use]
    pub fn within_anchored(&self, action: usize) -> bool {
        matches!(
            *self,
            Phase::AtPreForm(i)
                | Phase::AtInnerMatcher(i)
                | Phase::AtInnerHighlight(i, _)
                | Phase::AtPostForm(i)
                if i == action
        )
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Phase::AtRuleMatcher => write!(f, "rule matcher"),
            Phase::AtHighlight(i) => write!(f, "highlight {i}"),
            Phase::AtAnchoredMatcher(i) => write!(f, "anchored {i}"),
            Phase::AtPreForm(i) => write!(f, "pre-form of anchored {i}"),
            Phase::AtInnerMatcher(i) => write!(f, "matcher of anchored {i}"),
            Phase::AtInnerHighlight(i, j) => write!(f, "highlight {j} of anchored {i}"),
            Phase::AtPostForm(i) => write!(f, "post-form of anchored {i}"),
            Phase::Exhausted => write!(f, "exhausted"),
        }
    }
}

/// Child indices from the rule list root to a node: `[rule]`,
/// `[rule, action]` or `[rule, action, inner highlight]`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct NodePath(Vec<usize>);

impl NodePath {
    #[must_use]
    pub fn rule(rule: usize) -> Self {
        Self(vec![rule])
    }

    #[must_use]
    pub fn action(rule: usize, action: usize) -> Self {
        Self(vec![rule, action])
    }

    #[must_use]
    pub fn inner(rule: usize, action: usize, highlight: usize) -> Self {
        Self(vec![rule, action, highlight])
    }

    #[must_use]
    pub fn indices(&self) -> &[usize] {
        &self.0
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for NodePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = self.0.iter().map(ToString::to_string).collect();
        write!(f, "[{}]", parts.join(", "))
    }
}

/// The navigator's position in the rule tree plus the live matching state.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct NavigatorCursor {
    pub(crate) rule: usize,
    pub(crate) phase: Phase,
    pub(crate) position: usize,
    pub(crate) limit: usize,
    pub(crate) match_data: MatchData,
    /// Outer match saved while an anchored inner loop runs.
    pub(crate) saved_outer: Option<MatchData>,
}

impl NavigatorCursor {
    pub(crate) fn at_rule(rule: usize, position: usize, limit: usize) -> Self {
        Self {
            rule,
            phase: Phase::AtRuleMatcher,
            position,
            limit,
            match_data: MatchData::default(),
            saved_outer: None,
        }
    }

    #[must_use]
    pub fn rule(&self) -> usize {
        self.rule
    }

    #[must_use]
    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// Document position after the last transition.
    #[must_use]
    pub fn position(&self) -> usize {
        self.position
    }

    /// Active search limit: the region end, or the anchored limit inside an
    /// anchored highlight.
    #[must_use]
    pub fn limit(&self) -> usize {
        self.limit
    }

    #[must_use]
    pub fn match_data(&self) -> &MatchData {
        &self.match_data
    }

    #[must_use]
    pub fn is_exhausted(&self) -> bool {
        self.phase == Phase::Exhausted
    }

    #[must_use]
    pub fn path(&self) -> NodePath {
        match self.phase {
            Phase::Exhausted => NodePath(Vec::new()),
            Phase::AtRuleMatcher => NodePath::rule(self.rule),
            Phase::AtInnerHighlight(i, j) => NodePath::inner(self.rule, i, j),
            Phase::AtHighlight(i)
            | Phase::AtAnchoredMatcher(i)
            | Phase::AtPreForm(i)
            | Phase::AtInnerMatcher(i)
            | Phase::AtPostForm(i) => NodePath::action(self.rule, i),
        }
    }
}
