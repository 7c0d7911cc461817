use log::trace;
use regex_automata::meta::Regex;
use regex_automata::Input;

use crate::host::Host;
use crate::types::{Document, HostError, MatchData, MatcherSpec, Span};

/// Outcome of a single matcher call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatchResult {
    pub success: bool,
    /// Capture spans, group 0 first. Empty on failure.
    pub groups: Vec<Option<Span>>,
    /// Point after the call: the end of the match, or `from` on failure.
    pub new_pos: usize,
}

impl MatchResult {
    fn failed(from: usize) -> Self {
        Self {
            success: false,
            groups: Vec::new(),
            new_pos: from,
        }
    }
}

/// Run `matcher` once, searching from `from` with `limit` as the bound.
///
/// Literal matchers search `[from, limit)`. Code matchers are handed to the
/// host with point at `from`. On success the document's point and match
/// data describe the match; on failure both are left as they were before
/// the call, with point at `from`.
///
/// # Errors
///
/// Returns [`HostError`] if the host cannot run a code matcher. Point and
/// match data are restored in that case too.
pub fn try_match<H: Host + ?Sized>(
    matcher: &MatcherSpec,
    document: &mut Document,
    from: usize,
    limit: usize,
    host: &mut H,
) -> Result<MatchResult, HostError> {
    document.goto_char(from);
    let from = document.point();
    let previous = document.match_data().clone();

    let outcome = match matcher {
        MatcherSpec::Literal(literal) => Ok(search_forward(document, literal.regex(), limit)),
        MatcherSpec::NamedFunction(f) | MatcherSpec::Anonymous(f) | MatcherSpec::Closure(f) => {
            host.call_matcher(f, document, limit)
        }
    };

    let result = match outcome {
        Ok(true) => MatchResult {
            success: true,
            groups: document.match_data().groups().to_vec(),
            new_pos: document.point(),
        },
        Ok(false) => {
            document.goto_char(from);
            document.set_match_data(previous);
            MatchResult::failed(from)
        }
        Err(e) => {
            document.goto_char(from);
            document.set_match_data(previous);
            return Err(e);
        }
    };
    trace!(
        "matcher {} from {from} limit {limit}: {}",
        matcher.to_sexp(),
        if result.success { "matched" } else { "no match" }
    );
    Ok(result)
}

/// Search forward from point for `regex`, not past `limit`.
///
/// Only the match is bounded by `limit`: anchors and boundaries still see
/// the text on both sides of the searched range. On success point moves to
/// the end of the match and the match data is replaced. On failure nothing
/// changes.
pub fn search_forward(document: &mut Document, regex: &Regex, limit: usize) -> bool {
    let start = document.point();
    let end = document.clamp(limit);
    if start > end {
        return false;
    }
    let mut caps = regex.create_captures();
    regex.search_captures(&Input::new(document.text()).range(start..end), &mut caps);
    let Some(found) = caps.get_match() else {
        return false;
    };
    document.set_match_data(MatchData::from_captures(&caps));
    document.goto_char(found.end());
    true
}
