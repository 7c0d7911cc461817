use highlight_studio::{
    search_forward, Action, Document, Face, FaceSpec, FunctionTable, Keywords, MatcherKind,
    Override, Session, Span, StudioError,
};
use highlight_studio::Regex;

const MODE_KEYWORDS: &str = r##"
;; Keywords for a small configuration language.
'(;; section headers
  ("^\\[\\([a-z-]+\\)\\]" 1 font-lock-type-face)
  ;; keys, with the value highlighted up to the end of the line
  ("^\\([a-z_]+\\) *="
   (1 font-lock-variable-name-face)
   ("\\<\\(true\\|false\\)\\>" nil nil (0 font-lock-constant-face)))
  ;; comments win over everything
  ("#.*$" 0 font-lock-comment-face t)
  (config-find-url . link))
"##;

fn urls() -> FunctionTable {
    let re = Regex::new(r"https?://\S+").unwrap();
    FunctionTable::new().matcher("config-find-url", move |doc: &mut Document, limit| {
        search_forward(doc, &re, limit)
    })
}

#[test]
fn mode_keywords_read_and_classify() {
    let keywords = Keywords::from_source(MODE_KEYWORDS).unwrap();
    assert_eq!(keywords.len(), 4);
    assert_eq!(keywords.anchored_count(), 1);

    let kinds: Vec<MatcherKind> = keywords
        .entries()
        .iter()
        .map(|e| e.matcher().kind())
        .collect();
    assert_eq!(
        kinds,
        vec![
            MatcherKind::Literal,
            MatcherKind::Literal,
            MatcherKind::Literal,
            MatcherKind::Named
        ]
    );

    let Action::Highlight(comment) = &keywords.entries()[2].actions()[0] else {
        panic!("expected a highlight");
    };
    assert_eq!(comment.override_mode, Override::Replace);

    let Action::Highlight(link) = &keywords.entries()[3].actions()[0] else {
        panic!("expected a highlight");
    };
    assert_eq!(link.subexp, 0);
    assert_eq!(link.face, FaceSpec::Literal(Face::new("link")));
}

#[test]
fn mode_keywords_fontify() {
    let keywords = Keywords::from_source(MODE_KEYWORDS).unwrap();
    let text = "[server]\nenabled = true # off by default\nhome = https://example.org\n";
    let mut session = Session::new(keywords, Document::new(text), urls());
    let report = session.fontify_all().unwrap();
    assert_eq!(report.matches(), &[1, 2, 1, 1]);

    let doc = session.document();
    assert_eq!(doc.faces_at(1), &[Face::new("font-lock-type-face")]);
    assert_eq!(doc.faces_at(9), &[Face::new("font-lock-variable-name-face")]);
    // "true" sits before the comment on the same line
    assert_eq!(doc.faces_at(19), &[Face::new("font-lock-constant-face")]);
    assert_eq!(doc.faces_at(24), &[Face::new("font-lock-comment-face")]);
    assert_eq!(doc.faces_at(48), &[Face::new("link")]);

    let runs = doc.face_runs();
    assert!(runs.contains(&(Span::new(1, 7), vec![Face::new("font-lock-type-face")])));
}

#[test]
fn from_file_reads_keywords() {
    let path = std::env::temp_dir().join(format!("highlight-studio-{}.el", std::process::id()));
    std::fs::write(&path, MODE_KEYWORDS).unwrap();
    let keywords = Keywords::from_file(&path).unwrap();
    std::fs::remove_file(&path).unwrap();
    assert_eq!(keywords.len(), 4);
}

#[test]
fn canonical_text_reads_back() {
    let keywords = Keywords::from_source(MODE_KEYWORDS).unwrap();
    let printed: Vec<String> = keywords.to_raw().iter().map(ToString::to_string).collect();
    let reread = Keywords::from_source(&format!("({})", printed.join("\n"))).unwrap();
    assert_eq!(keywords, reread);
}

#[test]
fn unreadable_source() {
    let err = Keywords::from_source("((\"^x\" . bold)").unwrap_err();
    assert!(matches!(err, StudioError::Parse(_)));
}

#[test]
fn malformed_entry_position() {
    let err = Keywords::from_source(r#"(("a" . bold) ("b" (1 bold) (eval . x)) (c))"#).unwrap_err();
    let StudioError::Malformed(err) = err else {
        panic!("expected a malformed entry");
    };
    assert_eq!(err.entry, 1);
}
