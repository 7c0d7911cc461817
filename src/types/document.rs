use std::ops::Range;

use regex_automata::util::captures::Captures;

use super::{Face, Override};

/// A byte range `[start, end)` in the document text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Span {
    pub start: usize,
    pub end: usize,
}

impl Span {
    #[must_use]
    pub fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.start >= self.end
    }

    #[must_use]
    pub fn range(&self) -> Range<usize> {
        self.start..self.end
    }
}

/// Capture spans of the last successful match. Group 0 is the whole match;
/// groups that did not participate are `None`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct MatchData {
    groups: Vec<Option<Span>>,
}

impl MatchData {
    #[must_use]
    pub fn new(groups: Vec<Option<Span>>) -> Self {
        Self { groups }
    }

    pub(crate) fn from_captures(caps: &Captures) -> Self {
        Self {
            groups: (0..caps.group_len())
                .map(|i| caps.get_group(i).map(|m| Span::new(m.start, m.end)))
                .collect(),
        }
    }

    #[must_use]
    pub fn group(&self, n: usize) -> Option<Span> {
        self.groups.get(n).copied().flatten()
    }

    #[must_use]
    pub fn beginning(&self, n: usize) -> Option<usize> {
        self.group(n).map(|s| s.start)
    }

    #[must_use]
    pub fn end(&self, n: usize) -> Option<usize> {
        self.group(n).map(|s| s.end)
    }

    #[must_use]
    pub fn groups(&self) -> &[Option<Span>] {
        &self.groups
    }

    /// Number of groups, counting group 0.
    #[must_use]
    pub fn len(&self) -> usize {
        self.groups.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }
}

/// The target document: text, point, match data, and the face layer
/// that highlights are applied to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Document {
    text: String,
    point: usize,
    match_data: MatchData,
    faces: Vec<Vec<Face>>,
}

impl Document {
    #[must_use]
    pub fn new(text: impl Into<String>) -> Self {
        let text = text.into();
        let faces = vec![Vec::new(); text.len()];
        Self {
            text,
            point: 0,
            match_data: MatchData::default(),
            faces,
        }
    }

    #[must_use]
    pub fn text(&self) -> &str {
        &self.text
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.text.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    #[must_use]
    pub fn point(&self) -> usize {
        self.point
    }

    /// Move point, clamped to the text and floored to a char boundary.
    pub fn goto_char(&mut self, pos: usize) {
        self.point = self.clamp(pos);
    }

    /// Move point forward by `n` characters, stopping at the end.
    pub fn forward_char(&mut self, n: usize) {
        let rest = &self.text[self.point..];
        let offset = rest
            .char_indices()
            .nth(n)
            .map_or(rest.len(), |(i, _)| i);
        self.point += offset;
    }

    /// End of the line containing point (position of its newline).
    #[must_use]
    pub fn line_end_position(&self) -> usize {
        self.text[self.point..]
            .find('\n')
            .map_or(self.text.len(), |i| self.point + i)
    }

    #[must_use]
    pub fn line_beginning_position(&self) -> usize {
        self.text[..self.point].rfind('\n').map_or(0, |i| i + 1)
    }

    #[must_use]
    pub fn match_data(&self) -> &MatchData {
        &self.match_data
    }

    pub fn set_match_data(&mut self, match_data: MatchData) {
        self.match_data = match_data;
    }

    /// Text of group `n` of the current match data.
    #[must_use]
    pub fn match_string(&self, n: usize) -> Option<&str> {
        let span = self.match_data.group(n)?;
        self.text.get(span.range())
    }

    /// Faces at byte `pos`, in priority order.
    #[must_use]
    pub fn faces_at(&self, pos: usize) -> &[Face] {
        self.faces.get(pos).map_or(&[], Vec::as_slice)
    }

    /// Maximal runs of identical, non-empty face lists.
    #[must_use]
    pub fn face_runs(&self) -> Vec<(Span, Vec<Face>)> {
        let mut runs: Vec<(Span, Vec<Face>)> = Vec::new();
        for (pos, faces) in self.faces.iter().enumerate() {
            if faces.is_empty() {
                continue;
            }
            match runs.last_mut() {
                Some((span, last)) if span.end == pos && last == faces => span.end = pos + 1,
                _ => runs.push((Span::new(pos, pos + 1), faces.clone())),
            }
        }
        runs
    }

    pub fn clear_faces(&mut self) {
        self.faces.iter_mut().for_each(Vec::clear);
    }

    /// Put `face` on `span` according to `mode`. A missing face only
    /// has an effect under [`Override::Replace`], where it clears.
    pub(crate) fn apply_face(&mut self, span: Span, face: Option<&Face>, mode: Override) {
        let start = self.clamp(span.start);
        let end = self.clamp(span.end).max(start);
        let cells = &mut self.faces[start..end];
        match (mode, face) {
            (Override::Replace, face) => {
                for cell in cells {
                    *cell = face.into_iter().cloned().collect();
                }
            }
            (_, None) => {}
            (Override::Never, Some(face)) => {
                if cells.iter().all(Vec::is_empty) {
                    for cell in cells {
                        *cell = vec![face.clone()];
                    }
                }
            }
            (Override::Keep, Some(face)) => {
                for cell in cells.iter_mut().filter(|c| c.is_empty()) {
                    *cell = vec![face.clone()];
                }
            }
            (Override::Prepend, Some(face)) => {
                for cell in cells.iter_mut().filter(|c| !c.contains(face)) {
                    cell.insert(0, face.clone());
                }
            }
            (Override::Append, Some(face)) => {
                for cell in cells.iter_mut().filter(|c| !c.contains(face)) {
                    cell.push(face.clone());
                }
            }
        }
    }

    pub(crate) fn clamp(&self, pos: usize) -> usize {
        let mut pos = pos.min(self.text.len());
        while !self.text.is_char_boundary(pos) {
            pos -= 1;
        }
        pos
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bold() -> Face {
        Face::new("bold")
    }

    fn italic() -> Face {
        Face::new("italic")
    }

    #[test]
    fn goto_char_clamps_to_char_boundary() {
        let mut doc = Document::new("aé b");
        doc.goto_char(2);
        assert_eq!(doc.point(), 1);
        doc.goto_char(100);
        assert_eq!(doc.point(), doc.len());
    }

    #[test]
    fn forward_char_steps_whole_chars() {
        let mut doc = Document::new("éa");
        doc.forward_char(1);
        assert_eq!(doc.point(), 2);
        doc.forward_char(5);
        assert_eq!(doc.point(), 3);
    }

    #[test]
    fn line_positions() {
        let mut doc = Document::new("one\ntwo\nthree");
        doc.goto_char(5);
        assert_eq!(doc.line_beginning_position(), 4);
        assert_eq!(doc.line_end_position(), 7);
        doc.goto_char(9);
        assert_eq!(doc.line_end_position(), 13);
    }

    #[test]
    fn match_data_groups() {
        let md = MatchData::new(vec![Some(Span::new(0, 5)), None, Some(Span::new(2, 3))]);
        assert_eq!(md.len(), 3);
        assert_eq!(md.beginning(0), Some(0));
        assert_eq!(md.end(2), Some(3));
        assert_eq!(md.group(1), None);
        assert_eq!(md.group(7), None);
    }

    #[test]
    fn match_string_reads_text() {
        let mut doc = Document::new("hello world");
        doc.set_match_data(MatchData::new(vec![Some(Span::new(6, 11))]));
        assert_eq!(doc.match_string(0), Some("world"));
        assert_eq!(doc.match_string(1), None);
    }

    #[test]
    fn never_skips_partially_fontified_span() {
        let mut doc = Document::new("abcdef");
        doc.apply_face(Span::new(2, 4), Some(&bold()), Override::Never);
        doc.apply_face(Span::new(0, 3), Some(&italic()), Override::Never);
        assert!(doc.faces_at(0).is_empty());
        assert_eq!(doc.faces_at(2), &[bold()]);
    }

    #[test]
    fn keep_fills_gaps_only() {
        let mut doc = Document::new("abcdef");
        doc.apply_face(Span::new(2, 4), Some(&bold()), Override::Never);
        doc.apply_face(Span::new(0, 6), Some(&italic()), Override::Keep);
        assert_eq!(doc.faces_at(0), &[italic()]);
        assert_eq!(doc.faces_at(3), &[bold()]);
        assert_eq!(doc.faces_at(5), &[italic()]);
    }

    #[test]
    fn replace_overwrites_and_clears() {
        let mut doc = Document::new("abc");
        doc.apply_face(Span::new(0, 3), Some(&bold()), Override::Never);
        doc.apply_face(Span::new(0, 1), Some(&italic()), Override::Replace);
        assert_eq!(doc.faces_at(0), &[italic()]);
        doc.apply_face(Span::new(1, 2), None, Override::Replace);
        assert!(doc.faces_at(1).is_empty());
        assert_eq!(doc.faces_at(2), &[bold()]);
    }

    #[test]
    fn prepend_and_append_stack() {
        let mut doc = Document::new("ab");
        doc.apply_face(Span::new(0, 2), Some(&bold()), Override::Never);
        doc.apply_face(Span::new(0, 1), Some(&italic()), Override::Prepend);
        doc.apply_face(Span::new(1, 2), Some(&italic()), Override::Append);
        assert_eq!(doc.faces_at(0), &[italic(), bold()]);
        assert_eq!(doc.faces_at(1), &[bold(), italic()]);
    }

    #[test]
    fn missing_face_is_ignored_without_replace() {
        let mut doc = Document::new("ab");
        doc.apply_face(Span::new(0, 2), None, Override::Never);
        assert!(doc.face_runs().is_empty());
    }

    #[test]
    fn face_runs_coalesce() {
        let mut doc = Document::new("aaabbb");
        doc.apply_face(Span::new(0, 3), Some(&bold()), Override::Never);
        doc.apply_face(Span::new(3, 5), Some(&italic()), Override::Never);
        assert_eq!(
            doc.face_runs(),
            vec![
                (Span::new(0, 3), vec![bold()]),
                (Span::new(3, 5), vec![italic()]),
            ]
        );
    }
}
