use log::debug;

use crate::types::{
    Action, AnchoredSpec, Face, FaceSpec, Fragment, FragmentKind, HighlightSpec, LiteralMatcher,
    MalformedKind, MalformedRuleError, MatcherSpec, Override, RuleEntry, Sexp,
};

/// Face used by the entry shorthands that name no face.
pub const DEFAULT_FACE: &str = "font-lock-keyword-face";

/// Options applied while normalizing a raw keyword list.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct NormalizeOptions {
    /// Compile literal matchers case-insensitively.
    pub case_fold: bool,
}

impl NormalizeOptions {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn case_fold(mut self, case_fold: bool) -> Self {
        self.case_fold = case_fold;
        self
    }
}

/// Classify raw keyword entries into rules.
///
/// # Errors
///
/// Returns [`MalformedRuleError`] naming the first entry that has no matcher,
/// no actions, or a shape that is neither a matcher nor a highlight.
pub fn normalize(raw: &[Sexp]) -> Result<Vec<RuleEntry>, MalformedRuleError> {
    normalize_with(raw, NormalizeOptions::default())
}

/// [`normalize`] with explicit options.
///
/// # Errors
///
/// See [`normalize`].
pub fn normalize_with(
    raw: &[Sexp],
    options: NormalizeOptions,
) -> Result<Vec<RuleEntry>, MalformedRuleError> {
    let entries = raw
        .iter()
        .enumerate()
        .map(|(i, entry)| {
            normalize_entry(entry, options).map_err(|kind| MalformedRuleError::new(i, kind))
        })
        .collect::<Result<Vec<_>, _>>()?;
    debug!("normalized {} keyword entries", entries.len());
    Ok(entries)
}

fn default_highlight(subexp: usize, face: &str) -> Action {
    Action::Highlight(HighlightSpec::new(subexp, FaceSpec::Literal(Face::new(face))))
}

fn normalize_entry(entry: &Sexp, options: NormalizeOptions) -> Result<RuleEntry, MalformedKind> {
    // MATCHER
    if is_bare_matcher(entry) {
        let matcher = classify_matcher(entry, options)?;
        return Ok(RuleEntry::new(matcher, vec![default_highlight(0, DEFAULT_FACE)]));
    }

    let Sexp::List(items, tail) = entry else {
        return Err(MalformedKind::InvalidMatcher {
            found: entry.to_string(),
        });
    };
    let Some((head, rest)) = items.split_first() else {
        return Err(MalformedKind::MissingMatcher);
    };
    if head.as_symbol() == Some("eval") {
        return Err(MalformedKind::UnsupportedEval);
    }
    let matcher = classify_matcher(head, options)?;

    let actions = match (rest, tail.as_deref()) {
        // (MATCHER . SUBEXP)
        ([], Some(Sexp::Int(n))) => vec![default_highlight(subexp(*n, entry)?, DEFAULT_FACE)],
        // (MATCHER . FACENAME)
        ([], Some(Sexp::Symbol(face))) => vec![default_highlight(0, face)],
        ([], Some(other)) => {
            return Err(MalformedKind::InvalidHighlight {
                found: other.to_string(),
            })
        }
        ([], None) => return Err(MalformedKind::EmptyActions),
        // (MATCHER . HIGHLIGHT), i.e. (MATCHER SUBEXP FACE ...)
        ([first, ..], _) if !matches!(first, Sexp::List(..)) => {
            let highlight = Sexp::List(rest.to_vec(), tail.clone());
            vec![normalize_action(&highlight, options)?]
        }
        // (MATCHER HIGHLIGHT...)
        (_, _) => {
            if let Some(tail) = tail {
                return Err(MalformedKind::InvalidHighlight {
                    found: tail.to_string(),
                });
            }
            rest.iter()
                .map(|h| normalize_action(h, options))
                .collect::<Result<Vec<_>, _>>()?
        }
    };
    Ok(RuleEntry::new(matcher, actions))
}

/// Entries that consist of nothing but a matcher: a string, a function
/// symbol, or an inline function.
fn is_bare_matcher(entry: &Sexp) -> bool {
    match entry {
        Sexp::Str(_) | Sexp::Symbol(_) => true,
        Sexp::List(..) => matches!(entry.head(), Some("lambda" | "closure" | "function")),
        Sexp::Int(_) => false,
    }
}

fn subexp(n: i64, highlight: &Sexp) -> Result<usize, MalformedKind> {
    usize::try_from(n).map_err(|_| MalformedKind::InvalidHighlight {
        found: highlight.to_string(),
    })
}

pub(crate) fn classify_matcher(
    form: &Sexp,
    options: NormalizeOptions,
) -> Result<MatcherSpec, MalformedKind> {
    let invalid = || MalformedKind::InvalidMatcher {
        found: form.to_string(),
    };
    match form {
        Sexp::Str(pattern) => {
            let literal = LiteralMatcher::compile(pattern.clone(), options.case_fold).map_err(
                |message| MalformedKind::InvalidPattern {
                    pattern: pattern.clone(),
                    message,
                },
            )?;
            Ok(MatcherSpec::Literal(literal))
        }
        Sexp::Symbol(name) if name != "nil" && name != "t" => Ok(MatcherSpec::NamedFunction(
            Fragment::new(FragmentKind::Function, form.clone()),
        )),
        Sexp::List(..) => match form.head() {
            Some("function") => match form.unwrap_form("function") {
                Some(inner @ Sexp::Symbol(_)) => classify_matcher(inner, options),
                Some(inner) if inner.head() == Some("lambda") => Ok(MatcherSpec::Anonymous(
                    Fragment::new(FragmentKind::Lambda, inner.clone()),
                )),
                _ => Err(invalid()),
            },
            Some("lambda") => Ok(MatcherSpec::Anonymous(Fragment::new(
                FragmentKind::Lambda,
                form.clone(),
            ))),
            Some("closure") => Ok(MatcherSpec::Closure(Fragment::new(
                FragmentKind::Closure,
                form.clone(),
            ))),
            _ => Err(invalid()),
        },
        _ => Err(invalid()),
    }
}

fn normalize_action(form: &Sexp, options: NormalizeOptions) -> Result<Action, MalformedKind> {
    match form {
        Sexp::List(items, _) if matches!(items.first(), Some(Sexp::Int(_))) => {
            normalize_highlight(form).map(Action::Highlight)
        }
        Sexp::List(items, None) if !items.is_empty() => {
            normalize_anchored(items, options).map(Action::Anchored)
        }
        _ => Err(MalformedKind::InvalidHighlight {
            found: form.to_string(),
        }),
    }
}

/// `(SUBEXP FACE [OVERRIDE [LAXMATCH]])`
fn normalize_highlight(form: &Sexp) -> Result<HighlightSpec, MalformedKind> {
    let invalid = || MalformedKind::InvalidHighlight {
        found: form.to_string(),
    };
    let Sexp::List(items, None) = form else {
        return Err(invalid());
    };
    if items.len() > 4 {
        return Err(invalid());
    }
    let n = items[0].as_int().ok_or_else(invalid)?;
    let face = items.get(1).ok_or_else(|| MalformedKind::MissingFace {
        highlight: form.to_string(),
    })?;
    let override_mode = match items.get(2) {
        Some(s) => Override::from_sexp(s).ok_or_else(invalid)?,
        None => Override::Never,
    };
    let laxmatch = items.get(3).is_some_and(|s| !s.is_nil());
    Ok(HighlightSpec {
        subexp: subexp(n, form)?,
        face: classify_face(face),
        override_mode,
        laxmatch,
    })
}

/// Symbols, strings and quoted symbols name a face directly and `nil` names
/// none; any other form is evaluated to choose one.
fn classify_face(face: &Sexp) -> FaceSpec {
    match face {
        _ if face.is_nil() => FaceSpec::Nil,
        Sexp::Symbol(name) => FaceSpec::Literal(Face::new(name.as_str())),
        Sexp::Str(name) => FaceSpec::Str(Face::new(name.as_str())),
        _ => match face.unwrap_form("quote") {
            Some(quoted) if quoted.is_nil() => FaceSpec::Nil,
            Some(Sexp::Symbol(name)) => FaceSpec::Literal(Face::new(name.as_str())),
            _ => FaceSpec::Expression(Fragment::new(FragmentKind::Form, face.clone())),
        },
    }
}

/// `(MATCHER PRE-FORM POST-FORM HIGHLIGHT...)`
fn normalize_anchored(
    items: &[Sexp],
    options: NormalizeOptions,
) -> Result<AnchoredSpec, MalformedKind> {
    let matcher = classify_matcher(&items[0], options)?;
    let form = |i: usize| {
        items
            .get(i)
            .filter(|s| !s.is_nil())
            .map(|s| Fragment::new(FragmentKind::Form, s.clone()))
    };
    let highlights = items
        .iter()
        .skip(3)
        .map(|h| match h {
            Sexp::List(inner, _) if matches!(inner.first(), Some(Sexp::Int(_))) => {
                normalize_highlight(h)
            }
            Sexp::List(..) => Err(MalformedKind::NestedAnchored {
                found: h.to_string(),
            }),
            _ => Err(MalformedKind::InvalidHighlight {
                found: h.to_string(),
            }),
        })
        .collect::<Result<Vec<_>, _>>()?;
    Ok(AnchoredSpec {
        matcher,
        pre_form: form(1),
        post_form: form(2),
        highlights,
    })
}

#[cfg(test)]
mod tests {
    use crate::parse::parse;
    use crate::{MalformedKind, MatcherKind};

    use super::*;

    fn norm(src: &str) -> Result<Vec<RuleEntry>, MalformedRuleError> {
        normalize(&parse(src).unwrap().entries)
    }

    fn only_highlight(rule: &RuleEntry) -> &HighlightSpec {
        match &rule.actions()[0] {
            Action::Highlight(h) => h,
            other => panic!("expected highlight, got {other:?}"),
        }
    }

    #[test]
    fn bare_string_gets_keyword_face() {
        let rules = norm(r#"("foo")"#).unwrap();
        assert_eq!(rules[0].matcher().kind(), MatcherKind::Literal);
        let h = only_highlight(&rules[0]);
        assert_eq!(h.subexp, 0);
        assert_eq!(h.face, FaceSpec::Literal(Face::new(DEFAULT_FACE)));
    }

    #[test]
    fn matcher_dot_subexp() {
        let rules = norm(r#"(("\\(foo\\)" . 1))"#).unwrap();
        let h = only_highlight(&rules[0]);
        assert_eq!(h.subexp, 1);
        assert_eq!(h.face, FaceSpec::Literal(Face::new(DEFAULT_FACE)));
    }

    #[test]
    fn matcher_dot_facename() {
        let rules = norm(r#"(("foo" . bold))"#).unwrap();
        let h = only_highlight(&rules[0]);
        assert_eq!(h.subexp, 0);
        assert_eq!(h.face, FaceSpec::Literal(Face::new("bold")));
    }

    #[test]
    fn matcher_dot_highlight() {
        let rules = norm(r#"(("foo" 0 bold prepend))"#).unwrap();
        assert_eq!(rules[0].actions().len(), 1);
        assert_eq!(only_highlight(&rules[0]).override_mode, Override::Prepend);
    }

    #[test]
    fn matcher_with_highlight_list() {
        let rules = norm(r#"(("\\(a\\)\\(b\\)" (1 bold) (2 italic keep t)))"#).unwrap();
        assert_eq!(rules[0].actions().len(), 2);
        match &rules[0].actions()[1] {
            Action::Highlight(h) => {
                assert_eq!(h.subexp, 2);
                assert_eq!(h.override_mode, Override::Keep);
                assert!(h.laxmatch);
            }
            other => panic!("expected highlight, got {other:?}"),
        }
    }

    #[test]
    fn classify_all_matcher_shapes() {
        let rules = norm(
            r#"((my-matcher 0 bold)
                (#'my-matcher 0 bold)
                ((lambda (limit) nil) 0 bold)
                (#'(lambda (limit) nil) 0 bold)
                ((closure (t) (limit) nil) 0 bold))"#,
        )
        .unwrap();
        assert!(matches!(rules[0].matcher(), MatcherSpec::NamedFunction(_)));
        assert!(matches!(rules[1].matcher(), MatcherSpec::NamedFunction(_)));
        assert!(matches!(rules[2].matcher(), MatcherSpec::Anonymous(_)));
        assert!(matches!(rules[3].matcher(), MatcherSpec::Anonymous(_)));
        assert!(matches!(rules[4].matcher(), MatcherSpec::Closure(_)));
        assert_eq!(rules[1].matcher().fragment().unwrap().key(), "my-matcher");
    }

    #[test]
    fn bare_function_entry() {
        let rules = norm("(my-matcher (lambda (limit) nil))").unwrap();
        assert_eq!(rules.len(), 2);
        assert_eq!(rules[0].matcher().kind(), MatcherKind::Named);
        assert_eq!(rules[1].matcher().kind(), MatcherKind::CodeBased);
    }

    #[test]
    fn face_classification() {
        let rules = norm(concat!(
            r#"(("\\(a\\)\\(b\\)\\(c\\)\\(d\\)" "#,
            r#"(1 bold) (2 'italic) (3 "underline") (4 (if x 'bold 'italic))))"#,
        ))
        .unwrap();
        let faces: Vec<&FaceSpec> = rules[0]
            .actions()
            .iter()
            .map(|a| match a {
                Action::Highlight(h) => &h.face,
                other => panic!("expected highlight, got {other:?}"),
            })
            .collect();
        assert_eq!(faces[0], &FaceSpec::Literal(Face::new("bold")));
        assert_eq!(faces[1], &FaceSpec::Literal(Face::new("italic")));
        assert_eq!(faces[2], &FaceSpec::Str(Face::new("underline")));
        assert!(matches!(faces[3], FaceSpec::Expression(_)));
    }

    #[test]
    fn nil_face_names_no_face() {
        let rules = norm(r#"(("a" (0 nil) (0 'nil t) (0 "nil")))"#).unwrap();
        let faces: Vec<&FaceSpec> = rules[0]
            .actions()
            .iter()
            .filter_map(|a| match a {
                Action::Highlight(h) => Some(&h.face),
                Action::Anchored(_) => None,
            })
            .collect();
        let named_nil = FaceSpec::Str(Face::new("nil"));
        assert_eq!(faces, vec![&FaceSpec::Nil, &FaceSpec::Nil, &named_nil]);
    }

    #[test]
    fn anchored_with_forms() {
        let rules = norm(
            r#"(("\\<let\\>" ("\\w+" (end-of-line) (goto-char (match-end 0)) (0 bold))))"#,
        )
        .unwrap();
        match &rules[0].actions()[0] {
            Action::Anchored(a) => {
                assert_eq!(a.matcher.kind(), MatcherKind::Literal);
                assert_eq!(a.pre_form.as_ref().unwrap().key(), "(end-of-line)");
                assert_eq!(
                    a.post_form.as_ref().unwrap().key(),
                    "(goto-char (match-end 0))"
                );
                assert_eq!(a.highlights.len(), 1);
            }
            other => panic!("expected anchored, got {other:?}"),
        }
    }

    #[test]
    fn anchored_nil_forms_are_absent() {
        let rules = norm(r#"(("x" (inner nil nil (0 bold))))"#).unwrap();
        match &rules[0].actions()[0] {
            Action::Anchored(a) => {
                assert!(a.pre_form.is_none());
                assert!(a.post_form.is_none());
                assert_eq!(a.matcher.kind(), MatcherKind::Named);
            }
            other => panic!("expected anchored, got {other:?}"),
        }
    }

    #[test]
    fn malformed_entries_report_position() {
        let err = norm(r#"(("ok" . 1) ("no-actions") ("x" . 2))"#).unwrap_err();
        assert_eq!(err.entry, 1);
        assert_eq!(err.kind, MalformedKind::EmptyActions);
    }

    #[test]
    fn malformed_missing_matcher() {
        let err = norm("(())").unwrap_err();
        assert_eq!(err.kind, MalformedKind::MissingMatcher);
    }

    #[test]
    fn malformed_matcher_shape() {
        let err = norm("((42 0 bold))").unwrap_err();
        assert!(matches!(err.kind, MalformedKind::InvalidMatcher { .. }));
    }

    #[test]
    fn malformed_missing_face() {
        let err = norm(r#"(("x" (1)))"#).unwrap_err();
        assert!(matches!(err.kind, MalformedKind::MissingFace { .. }));
    }

    #[test]
    fn malformed_nested_anchored() {
        let err = norm(r#"(("x" ("y" nil nil ("z" nil nil (0 bold)))))"#).unwrap_err();
        assert!(matches!(err.kind, MalformedKind::NestedAnchored { .. }));
    }

    #[test]
    fn malformed_eval_entry() {
        let err = norm("((eval . (list \"x\" 0 'bold)))").unwrap_err();
        assert_eq!(err.kind, MalformedKind::UnsupportedEval);
    }

    #[test]
    fn malformed_pattern() {
        let err = norm(r#"(("\\(a\\)\\1" . 1))"#).unwrap_err();
        assert!(matches!(err.kind, MalformedKind::InvalidPattern { .. }));
    }

    #[test]
    fn malformed_override() {
        let err = norm(r#"(("x" (0 bold sometimes)))"#).unwrap_err();
        assert!(matches!(err.kind, MalformedKind::InvalidHighlight { .. }));
    }

    #[test]
    fn case_fold_option() {
        let raw = parse(r#"(("select" . 0))"#).unwrap();
        let rules = normalize_with(&raw.entries, NormalizeOptions::new().case_fold(true)).unwrap();
        match rules[0].matcher() {
            MatcherSpec::Literal(m) => assert!(m.regex().is_match("SELECT")),
            other => panic!("expected literal, got {other:?}"),
        }
    }

    #[test]
    fn canonical_shape_renormalizes_identically() {
        let rules = norm(
            r#"(("foo" . 1)
                (my-matcher 0 bold)
                ("x" (0 (if a 'b 'c) t) ((lambda (l) nil) (pre) nil (1 bold nil t))))"#,
        )
        .unwrap();
        let raw: Vec<Sexp> = rules.iter().map(RuleEntry::to_sexp).collect();
        assert_eq!(normalize(&raw).unwrap(), rules);
    }
}
