use std::collections::BTreeSet;
use std::ops::Range;
use std::time::Instant;

use log::{debug, warn};

use crate::debug::{DebugBridge, DebugRequest, Stepper};
use crate::explain;
use crate::host::Host;
use crate::matcher::try_match;
use crate::types::{
    Action, AnchoredSpec, CommandError, DebugError, Document, FaceSpec, FontifyReport, Fragment,
    HighlightSpec, HostError, NavigatorCursor, NodePath, NotExecutableError, Phase, RuleEntry,
    SessionLog, SessionOptions,
};

/// The four commands a UI can issue.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    StepInto,
    StepOver,
    Continue,
    DebugHere,
}

/// Why [`Session::continue_stepping`] stopped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StopReason {
    Exhausted,
    Breakpoint(NodePath),
}

/// Result of [`Session::execute`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Moved(Phase),
    Stopped(StopReason),
    Debugged,
}

/// A debugging session over one keyword list and one document.
///
/// The session owns its cursor and document exclusively. Every transition
/// leaves the cursor addressing a node of the rule tree, or
/// [`Phase::Exhausted`].
///
/// ```
/// use highlight_studio::{Document, FunctionTable, Keywords, Phase, Session};
///
/// let keywords = Keywords::from_source(r#"(("\\<let\\>" . font-lock-keyword-face))"#).unwrap();
/// let mut session = Session::new(keywords, Document::new("let x = 1"), FunctionTable::new());
/// assert_eq!(session.explain(), "Keyword with regexp matcher");
/// assert_eq!(session.step_into().unwrap(), Phase::AtHighlight(0));
/// assert_eq!(session.explain(), "Highlight");
/// ```
#[derive(Debug)]
pub struct Session<H> {
    rules: Vec<RuleEntry>,
    document: Document,
    host: H,
    options: SessionOptions,
    region: Range<usize>,
    cursor: NavigatorCursor,
    breakpoints: BTreeSet<NodePath>,
}

impl<H: Host> Session<H> {
    pub fn new(rules: impl Into<Vec<RuleEntry>>, document: Document, host: H) -> Self {
        Self::with_options(rules, document, host, SessionOptions::default())
    }

    pub fn with_options(
        rules: impl Into<Vec<RuleEntry>>,
        mut document: Document,
        host: H,
        options: SessionOptions,
    ) -> Self {
        let rules = rules.into();
        let region = match &options.region {
            Some(r) => {
                let start = document.clamp(r.start);
                start..document.clamp(r.end).max(start)
            }
            None => 0..document.len(),
        };
        document.goto_char(region.start);
        let mut cursor = NavigatorCursor::at_rule(0, region.start, region.end);
        if rules.is_empty() {
            cursor.phase = Phase::Exhausted;
        }
        Self {
            rules,
            document,
            host,
            options,
            region,
            cursor,
            breakpoints: BTreeSet::new(),
        }
    }

    #[must_use]
    pub fn rules(&self) -> &[RuleEntry] {
        &self.rules
    }

    #[must_use]
    pub fn document(&self) -> &Document {
        &self.document
    }

    #[must_use]
    pub fn host(&self) -> &H {
        &self.host
    }

    #[must_use]
    pub fn options(&self) -> &SessionOptions {
        &self.options
    }

    #[must_use]
    pub fn region(&self) -> Range<usize> {
        self.region.clone()
    }

    #[must_use]
    pub fn cursor(&self) -> &NavigatorCursor {
        &self.cursor
    }

    #[must_use]
    pub fn explain(&self) -> String {
        explain::explain(&self.rules, &self.cursor)
    }

    pub fn into_document(self) -> Document {
        self.document
    }

    /// Start over at the matcher of rule `index`, point at the region start.
    /// Returns `false`, leaving the session untouched, if there is no such rule.
    pub fn select_rule(&mut self, index: usize) -> bool {
        if index >= self.rules.len() {
            return false;
        }
        self.document.goto_char(self.region.start);
        self.cursor = NavigatorCursor::at_rule(index, self.region.start, self.region.end);
        debug!("selected rule {index}");
        true
    }

    /// Take one transition, descending into anchored highlights.
    ///
    /// # Errors
    ///
    /// Returns [`HostError`] if a fragment could not be run. The cursor
    /// keeps its phase in that case.
    pub fn step_into(&mut self) -> Result<Phase, HostError> {
        let from = self.cursor.phase;
        let rule = self.cursor.rule;
        self.transition()?;
        self.cursor.position = self.document.point();
        self.cursor.match_data = self.document.match_data().clone();
        debug!(
            "rule {rule}: {from} -> {} at {}",
            self.cursor.phase, self.cursor.position
        );
        Ok(self.cursor.phase)
    }

    /// Run the focused node to completion without pausing inside it.
    ///
    /// At a rule matcher this runs every remaining match of the rule and
    /// stops at the next rule's matcher. At an anchored highlight it runs the
    /// pre-form, the inner loop and the post-form. At an inner matcher it
    /// runs the rest of the inner loop. Anywhere else it is one step.
    ///
    /// # Errors
    ///
    /// Returns [`HostError`] if a fragment could not be run.
    pub fn step_over(&mut self) -> Result<Phase, HostError> {
        let origin = self.cursor.phase;
        let rule = self.cursor.rule;
        loop {
            self.step_into()?;
            if !still_inside(origin, rule, &self.cursor) {
                return Ok(self.cursor.phase);
            }
        }
    }

    /// Step until the keyword list is exhausted or a breakpoint is reached.
    /// Takes at least one step unless already exhausted.
    ///
    /// # Errors
    ///
    /// Returns [`HostError`] if a fragment could not be run.
    pub fn continue_stepping(&mut self) -> Result<StopReason, HostError> {
        while !self.cursor.is_exhausted() {
            self.step_into()?;
            if self.cursor.phase.is_entry() {
                let path = self.cursor.path();
                if self.breakpoints.contains(&path) {
                    debug!("breakpoint {path}");
                    return Ok(StopReason::Breakpoint(path));
                }
            }
        }
        Ok(StopReason::Exhausted)
    }

    /// Step to the end, ignoring breakpoints.
    ///
    /// # Errors
    ///
    /// Returns [`HostError`] if a fragment could not be run.
    pub fn fontify_all(&mut self) -> Result<FontifyReport, HostError> {
        let start = Instant::now();
        let mut transitions = 0;
        let mut matches = vec![0; self.rules.len()];
        while !self.cursor.is_exhausted() {
            let from = self.cursor.phase;
            let rule = self.cursor.rule;
            let to = self.step_into()?;
            transitions += 1;
            if from == Phase::AtRuleMatcher && to.action().is_some() {
                if let Some(count) = matches.get_mut(rule) {
                    *count += 1;
                }
            }
        }
        Ok(FontifyReport::new(transitions, matches, start.elapsed()))
    }

    /// Set or clear the breakpoint at `path`. Returns whether it is now set.
    pub fn toggle_breakpoint(&mut self, path: NodePath) -> bool {
        if self.breakpoints.remove(&path) {
            false
        } else {
            self.breakpoints.insert(path);
            true
        }
    }

    #[must_use]
    pub fn has_breakpoint(&self, path: &NodePath) -> bool {
        self.breakpoints.contains(path)
    }

    pub fn clear_breakpoints(&mut self) {
        self.breakpoints.clear();
    }

    pub fn breakpoints(&self) -> impl Iterator<Item = &NodePath> {
        self.breakpoints.iter()
    }

    /// Hand the fragment under the cursor to the bridge's stepper.
    ///
    /// The session is frozen for the duration and resumes exactly where it
    /// was.
    ///
    /// # Errors
    ///
    /// Returns [`DebugError::NotExecutable`] without logging anything if the
    /// focused node holds no fragment, and [`DebugError::Aborted`] if the
    /// stepper aborted.
    pub fn debug_here<S: Stepper, L: SessionLog>(
        &self,
        bridge: &mut DebugBridge<S, L>,
    ) -> Result<(), DebugError> {
        let explanation = self.explain();
        let Some(fragment) = explain::fragment_at(&self.rules, &self.cursor) else {
            return Err(NotExecutableError { label: explanation }.into());
        };
        let identity = self.source_identity(fragment);
        let request = DebugRequest::new(fragment, &identity, &self.document, &self.cursor);
        bridge.enter(&request, explanation)
    }

    /// Dispatch a UI command.
    ///
    /// # Errors
    ///
    /// Returns [`CommandError`] from the underlying operation.
    pub fn execute<S: Stepper, L: SessionLog>(
        &mut self,
        command: Command,
        bridge: &mut DebugBridge<S, L>,
    ) -> Result<Outcome, CommandError> {
        match command {
            Command::StepInto => Ok(Outcome::Moved(self.step_into()?)),
            Command::StepOver => Ok(Outcome::Moved(self.step_over()?)),
            Command::Continue => Ok(Outcome::Stopped(self.continue_stepping()?)),
            Command::DebugHere => {
                self.debug_here(bridge)?;
                Ok(Outcome::Debugged)
            }
        }
    }

    fn source_identity(&self, fragment: &Fragment) -> String {
        self.host
            .source_file(fragment)
            .and_then(|path| path.file_name())
            .map_or_else(
                || self.options.display_name.clone(),
                |name| name.to_string_lossy().into_owned(),
            )
    }

    fn transition(&mut self) -> Result<(), HostError> {
        let Session {
            rules,
            document,
            host,
            options,
            region,
            cursor,
            ..
        } = self;
        let Some(rule) = rules.get(cursor.rule) else {
            cursor.phase = Phase::Exhausted;
            return Ok(());
        };

        match cursor.phase {
            Phase::Exhausted => {}
            Phase::AtRuleMatcher => {
                let from = document.point();
                let matched = from < region.end
                    && try_match(rule.matcher(), document, from, region.end, host)?.success;
                if matched {
                    ensure_progress(document, from);
                    cursor.limit = region.end;
                    cursor.phase = entry_phase(rule, 0);
                } else if cursor.rule + 1 < rules.len() {
                    cursor.rule += 1;
                    cursor.phase = Phase::AtRuleMatcher;
                    cursor.limit = region.end;
                    document.goto_char(region.start);
                } else {
                    cursor.phase = Phase::Exhausted;
                }
            }
            Phase::AtHighlight(i) => {
                if let Some(Action::Highlight(spec)) = rule.action(i) {
                    apply_highlight(spec, document, host)?;
                }
                advance_action(rule, i, cursor, region.end);
            }
            Phase::AtAnchoredMatcher(i) => match anchored(rule, i) {
                Some(spec) => match &spec.pre_form {
                    Some(_) if options.stop_at_forms => cursor.phase = Phase::AtPreForm(i),
                    Some(form) => {
                        let value = host.eval_form(form, document)?;
                        enter_inner(cursor, document, value, i);
                    }
                    None => enter_inner(cursor, document, None, i),
                },
                None => advance_action(rule, i, cursor, region.end),
            },
            Phase::AtPreForm(i) => match anchored(rule, i) {
                Some(spec) => {
                    let value = match &spec.pre_form {
                        Some(form) => host.eval_form(form, document)?,
                        None => None,
                    };
                    enter_inner(cursor, document, value, i);
                }
                None => advance_action(rule, i, cursor, region.end),
            },
            Phase::AtInnerMatcher(i) => match anchored(rule, i) {
                Some(spec) => {
                    let from = document.point();
                    let matched = from < cursor.limit
                        && try_match(&spec.matcher, document, from, cursor.limit, host)?.success;
                    if matched {
                        ensure_progress(document, from);
                        if !spec.highlights.is_empty() {
                            cursor.phase = Phase::AtInnerHighlight(i, 0);
                        }
                    } else {
                        if let Some(saved) = &cursor.saved_outer {
                            document.set_match_data(saved.clone());
                        }
                        match &spec.post_form {
                            Some(_) if options.stop_at_forms => {
                                cursor.phase = Phase::AtPostForm(i);
                            }
                            Some(form) => {
                                host.eval_form(form, document)?;
                                advance_action(rule, i, cursor, region.end);
                            }
                            None => advance_action(rule, i, cursor, region.end),
                        }
                    }
                }
                None => advance_action(rule, i, cursor, region.end),
            },
            Phase::AtInnerHighlight(i, j) => match anchored(rule, i) {
                Some(spec) => {
                    if let Some(highlight) = spec.highlights.get(j) {
                        apply_highlight(highlight, document, host)?;
                    }
                    cursor.phase = if j + 1 < spec.highlights.len() {
                        Phase::AtInnerHighlight(i, j + 1)
                    } else {
                        Phase::AtInnerMatcher(i)
                    };
                }
                None => advance_action(rule, i, cursor, region.end),
            },
            Phase::AtPostForm(i) => {
                if let Some(form) = anchored(rule, i).and_then(|spec| spec.post_form.as_ref()) {
                    host.eval_form(form, document)?;
                }
                advance_action(rule, i, cursor, region.end);
            }
        }
        Ok(())
    }
}

fn anchored(rule: &RuleEntry, action: usize) -> Option<&AnchoredSpec> {
    match rule.action(action)? {
        Action::Anchored(spec) => Some(spec),
        Action::Highlight(_) => None,
    }
}

/// The phase a node is entered at, or the rule matcher past the last action.
fn entry_phase(rule: &RuleEntry, action: usize) -> Phase {
    match rule.action(action) {
        Some(Action::Highlight(_)) => Phase::AtHighlight(action),
        Some(Action::Anchored(_)) => Phase::AtAnchoredMatcher(action),
        None => Phase::AtRuleMatcher,
    }
}

/// Move past action `done`. After the last action the rule's matcher runs
/// again from the current point.
fn advance_action(rule: &RuleEntry, done: usize, cursor: &mut NavigatorCursor, region_end: usize) {
    cursor.saved_outer = None;
    cursor.phase = entry_phase(rule, done + 1);
    if cursor.phase == Phase::AtRuleMatcher {
        cursor.limit = region_end;
    }
}

/// Fix the inner search limit and save the outer match for the inner loop.
///
/// A pre-form value past point is the limit; anything else means the end of
/// the current line.
fn enter_inner(
    cursor: &mut NavigatorCursor,
    document: &Document,
    pre_form_value: Option<usize>,
    action: usize,
) {
    cursor.limit = match pre_form_value {
        Some(limit) if limit > document.point() => limit.min(document.len()),
        _ => document.line_end_position(),
    };
    cursor.saved_outer = Some(document.match_data().clone());
    cursor.phase = Phase::AtInnerMatcher(action);
}

/// An empty match, or a code matcher that did not move point, must not be
/// found again at the same place.
fn ensure_progress(document: &mut Document, from: usize) {
    let floor = document
        .match_data()
        .beginning(0)
        .map_or(from, |start| start.max(from));
    if document.point() <= floor {
        document.goto_char(floor);
        document.forward_char(1);
    }
}

fn apply_highlight<H: Host>(
    spec: &HighlightSpec,
    document: &mut Document,
    host: &mut H,
) -> Result<(), HostError> {
    let Some(span) = document.match_data().group(spec.subexp) else {
        if spec.laxmatch {
            debug!("subexpression {} did not match, skipped", spec.subexp);
        } else {
            warn!("no match {} in highlight, skipped", spec.subexp);
        }
        return Ok(());
    };
    let face = match &spec.face {
        FaceSpec::Expression(form) => host.eval_face(form, document)?,
        literal => literal.face().cloned(),
    };
    document.apply_face(span, face.as_ref(), spec.override_mode);
    Ok(())
}

fn still_inside(origin: Phase, rule: usize, cursor: &NavigatorCursor) -> bool {
    if cursor.rule != rule || cursor.is_exhausted() {
        return false;
    }
    match origin {
        Phase::AtRuleMatcher => true,
        Phase::AtAnchoredMatcher(i) => cursor.phase.within_anchored(i),
        Phase::AtInnerMatcher(i) => matches!(
            cursor.phase,
            Phase::AtInnerMatcher(j) | Phase::AtInnerHighlight(j, _) if j == i
        ),
        _ => false,
    }
}
