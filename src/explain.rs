//! Labels describing where a navigator cursor stands.
//!
//! The label depends only on the classification of the focused node and the
//! phase, never on document contents or match state.

use crate::types::{
    Action, AnchoredSpec, FaceSpec, Fragment, HighlightSpec, MatcherKind, NavigatorCursor, Phase,
    RuleEntry,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FaceKind {
    Literal,
    Expression,
}

impl FaceKind {
    fn of(spec: &HighlightSpec) -> Self {
        match spec.face {
            FaceSpec::Literal(_) | FaceSpec::Str(_) | FaceSpec::Nil => FaceKind::Literal,
            FaceSpec::Expression(_) => FaceKind::Expression,
        }
    }
}

/// Classification of the node a cursor focuses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeClass {
    RuleMatcher(MatcherKind),
    Highlight(FaceKind),
    Anchored,
    PreForm,
    InnerMatcher(MatcherKind),
    InnerHighlight(FaceKind),
    PostForm,
    Exhausted,
}

fn anchored(rule: &RuleEntry, action: usize) -> Option<&AnchoredSpec> {
    match rule.action(action)? {
        Action::Anchored(spec) => Some(spec),
        Action::Highlight(_) => None,
    }
}

fn highlight(rule: &RuleEntry, action: usize) -> Option<&HighlightSpec> {
    match rule.action(action)? {
        Action::Highlight(spec) => Some(spec),
        Action::Anchored(_) => None,
    }
}

/// Classify the node under `cursor`. A cursor that does not address a node
/// of `rules` classifies as [`NodeClass::Exhausted`].
#[must_use]
pub fn classify(rules: &[RuleEntry], cursor: &NavigatorCursor) -> NodeClass {
    classify_phase(rules, cursor.rule(), cursor.phase()).unwrap_or(NodeClass::Exhausted)
}

fn classify_phase(rules: &[RuleEntry], rule: usize, phase: Phase) -> Option<NodeClass> {
    let rule = rules.get(rule)?;
    let class = match phase {
        Phase::Exhausted => NodeClass::Exhausted,
        Phase::AtRuleMatcher => NodeClass::RuleMatcher(rule.matcher().kind()),
        Phase::AtHighlight(i) => NodeClass::Highlight(FaceKind::of(highlight(rule, i)?)),
        Phase::AtAnchoredMatcher(i) => {
            anchored(rule, i)?;
            NodeClass::Anchored
        }
        Phase::AtPreForm(i) => {
            anchored(rule, i)?;
            NodeClass::PreForm
        }
        Phase::AtInnerMatcher(i) => NodeClass::InnerMatcher(anchored(rule, i)?.matcher.kind()),
        Phase::AtInnerHighlight(i, j) => {
            NodeClass::InnerHighlight(FaceKind::of(anchored(rule, i)?.highlights.get(j)?))
        }
        Phase::AtPostForm(i) => {
            anchored(rule, i)?;
            NodeClass::PostForm
        }
    };
    Some(class)
}

#[must_use]
pub fn label(class: NodeClass) -> &'static str {
    match class {
        NodeClass::RuleMatcher(MatcherKind::Literal) => "Keyword with regexp matcher",
        NodeClass::RuleMatcher(MatcherKind::Named) => "Keyword with function name matcher",
        NodeClass::RuleMatcher(MatcherKind::CodeBased) => "Keyword with code-based matcher",
        NodeClass::Highlight(FaceKind::Literal) => "Highlight",
        NodeClass::Highlight(FaceKind::Expression) => "Highlight: Face is decided by expression",
        NodeClass::Anchored => "Anchored highlight",
        NodeClass::PreForm => "Pre-match form of anchored highlight",
        NodeClass::InnerMatcher(MatcherKind::Literal) => "Anchored highlight with regexp matcher",
        NodeClass::InnerMatcher(MatcherKind::Named) => {
            "Anchored highlight with function name matcher"
        }
        NodeClass::InnerMatcher(MatcherKind::CodeBased) => {
            "Anchored highlight with code-based matcher"
        }
        NodeClass::InnerHighlight(FaceKind::Literal) => "Highlight inside anchored highlight",
        NodeClass::InnerHighlight(FaceKind::Expression) => {
            "Highlight inside anchored highlight, Face is decided by expression"
        }
        NodeClass::PostForm => "Post-match form of anchored highlight",
        NodeClass::Exhausted => "End of keywords",
    }
}

/// Describe the node under `cursor`.
#[must_use]
pub fn explain(rules: &[RuleEntry], cursor: &NavigatorCursor) -> String {
    label(classify(rules, cursor)).to_owned()
}

fn face_fragment(spec: &HighlightSpec) -> Option<&Fragment> {
    match &spec.face {
        FaceSpec::Expression(f) => Some(f),
        FaceSpec::Literal(_) | FaceSpec::Str(_) | FaceSpec::Nil => None,
    }
}

/// The executable fragment held by the node under `cursor`, if any.
pub(crate) fn fragment_at<'r>(
    rules: &'r [RuleEntry],
    cursor: &NavigatorCursor,
) -> Option<&'r Fragment> {
    let rule = rules.get(cursor.rule())?;
    match cursor.phase() {
        Phase::Exhausted | Phase::AtAnchoredMatcher(_) => None,
        Phase::AtRuleMatcher => rule.matcher().fragment(),
        Phase::AtHighlight(i) => face_fragment(highlight(rule, i)?),
        Phase::AtPreForm(i) => anchored(rule, i)?.pre_form.as_ref(),
        Phase::AtInnerMatcher(i) => anchored(rule, i)?.matcher.fragment(),
        Phase::AtInnerHighlight(i, j) => face_fragment(anchored(rule, i)?.highlights.get(j)?),
        Phase::AtPostForm(i) => anchored(rule, i)?.post_form.as_ref(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::normalize::normalize;
    use crate::parse::parse;

    fn rules(src: &str) -> Vec<RuleEntry> {
        normalize(&parse(src).unwrap().entries).unwrap()
    }

    fn at(rule: usize, phase: Phase) -> NavigatorCursor {
        let mut cursor = NavigatorCursor::at_rule(rule, 0, 0);
        cursor.phase = phase;
        cursor
    }

    const SOURCE: &str = r#"
        (("\\<if\\>" . font-lock-keyword-face)
         (my-matcher (1 'bold) (2 (if (foo) 'italic 'bold)))
         ((lambda (limit) (re-search-forward "x" limit t))
          ("\\w+" (end-of-line) nil (0 font-lock-constant-face) (1 (face-for)))
          (my-inner nil (forward-line) (0 'bold))))
    "#;

    #[test]
    fn rule_matcher_labels() {
        let rules = rules(SOURCE);
        assert_eq!(
            explain(&rules, &at(0, Phase::AtRuleMatcher)),
            "Keyword with regexp matcher"
        );
        assert_eq!(
            explain(&rules, &at(1, Phase::AtRuleMatcher)),
            "Keyword with function name matcher"
        );
        assert_eq!(
            explain(&rules, &at(2, Phase::AtRuleMatcher)),
            "Keyword with code-based matcher"
        );
    }

    #[test]
    fn highlight_labels() {
        let rules = rules(SOURCE);
        assert_eq!(explain(&rules, &at(1, Phase::AtHighlight(0))), "Highlight");
        assert_eq!(
            explain(&rules, &at(1, Phase::AtHighlight(1))),
            "Highlight: Face is decided by expression"
        );
    }

    #[test]
    fn anchored_labels() {
        let rules = rules(SOURCE);
        assert_eq!(
            explain(&rules, &at(2, Phase::AtAnchoredMatcher(0))),
            "Anchored highlight"
        );
        assert_eq!(
            explain(&rules, &at(2, Phase::AtPreForm(0))),
            "Pre-match form of anchored highlight"
        );
        assert_eq!(
            explain(&rules, &at(2, Phase::AtInnerMatcher(0))),
            "Anchored highlight with regexp matcher"
        );
        assert_eq!(
            explain(&rules, &at(2, Phase::AtInnerMatcher(1))),
            "Anchored highlight with function name matcher"
        );
        assert_eq!(
            explain(&rules, &at(2, Phase::AtInnerHighlight(0, 0))),
            "Highlight inside anchored highlight"
        );
        assert_eq!(
            explain(&rules, &at(2, Phase::AtInnerHighlight(0, 1))),
            "Highlight inside anchored highlight, Face is decided by expression"
        );
        assert_eq!(
            explain(&rules, &at(2, Phase::AtPostForm(1))),
            "Post-match form of anchored highlight"
        );
    }

    #[test]
    fn unaddressable_cursor_is_end_of_keywords() {
        let rules = rules(SOURCE);
        assert_eq!(explain(&rules, &at(9, Phase::AtRuleMatcher)), "End of keywords");
        assert_eq!(explain(&rules, &at(0, Phase::AtPreForm(0))), "End of keywords");
        assert_eq!(explain(&rules, &at(0, Phase::Exhausted)), "End of keywords");
    }

    #[test]
    fn explain_ignores_match_state() {
        let rules = rules(SOURCE);
        let a = at(1, Phase::AtHighlight(1));
        let mut b = a.clone();
        b.position = 40;
        b.limit = 50;
        assert_eq!(explain(&rules, &a), explain(&rules, &b));
    }

    #[test]
    fn fragments_only_on_executable_nodes() {
        let rules = rules(SOURCE);
        assert!(fragment_at(&rules, &at(0, Phase::AtRuleMatcher)).is_none());
        assert!(fragment_at(&rules, &at(1, Phase::AtHighlight(0))).is_none());
        assert_eq!(
            fragment_at(&rules, &at(1, Phase::AtRuleMatcher)).map(Fragment::key),
            Some("my-matcher".to_owned())
        );
        assert_eq!(
            fragment_at(&rules, &at(2, Phase::AtPreForm(0))).map(Fragment::key),
            Some("(end-of-line)".to_owned())
        );
        assert!(fragment_at(&rules, &at(2, Phase::AtPostForm(0))).is_none());
        assert!(fragment_at(&rules, &at(2, Phase::AtAnchoredMatcher(0))).is_none());
        assert!(fragment_at(&rules, &at(2, Phase::AtInnerMatcher(0))).is_none());
        assert!(fragment_at(&rules, &at(2, Phase::AtInnerMatcher(1))).is_some());
    }
}
