use highlight_studio::{
    search_forward, Command, DebugBridge, DebugRequest, Document, FunctionTable, Keywords,
    Outcome, Session, SessionEvent, StepperAbort,
};
use highlight_studio::Regex;

const KEYWORDS: &str = r#"
'(("\\<\\(fn\\|let\\)\\>" . font-lock-keyword-face)
  (find-numbers . font-lock-constant-face)
  ("^let" ("\\w+" nil nil (0 font-lock-variable-name-face))))
"#;

fn main() {
    let keywords = Keywords::from_source(KEYWORDS).expect("failed to read keywords");
    println!("{keywords}");

    let re = Regex::new("[0-9]+").expect("valid pattern");
    let host = FunctionTable::new()
        .matcher("find-numbers", move |doc: &mut Document, limit| {
            search_forward(doc, &re, limit)
        })
        .defined_in("find-numbers", "/src/demo-mode.el");

    let text = "let width 80\nfn area 3";
    let mut session = Session::new(keywords, Document::new(text), host);
    let mut bridge = DebugBridge::new(
        |req: &DebugRequest<'_>| -> Result<(), StepperAbort> {
            println!("  stepping {} (limit {})", req.fragment(), req.limit());
            Ok(())
        },
        Vec::<SessionEvent>::new(),
    );

    loop {
        println!("{:>4}  {}", session.cursor().position(), session.explain());
        if session.cursor().is_exhausted() {
            break;
        }
        if session.execute(Command::DebugHere, &mut bridge).is_ok() {
            println!("  debugged");
        }
        match session.execute(Command::StepInto, &mut bridge) {
            Ok(Outcome::Moved(_)) => {}
            Ok(other) => println!("  {other:?}"),
            Err(e) => {
                eprintln!("error: {e}");
                break;
            }
        }
    }

    for event in bridge.log() {
        println!("{event}");
    }
    for (span, faces) in session.document().face_runs() {
        let names: Vec<&str> = faces.iter().map(|f| f.name()).collect();
        println!("{:?} {:?} {}", span.range(), &text[span.range()], names.join(" "));
    }
}
