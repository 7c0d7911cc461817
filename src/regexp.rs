//! Translation from the host's regexp dialect to the `regex` crate dialect.
//!
//! In the host dialect grouping, alternation and intervals are backslashed
//! (`\(`, `\|`, `\{`) while the bare characters are literals, and a backslash
//! inside a bracket expression is an ordinary character. `^` and `$` are
//! anchors only at the edges of the pattern or of a group or alternative.

use std::iter::Peekable;
use std::str::Chars;

use regex_automata::meta::Regex;
use regex_automata::util::syntax;

/// Translate `pattern` and compile it. `^` and `$` match at line boundaries.
pub(crate) fn compile(pattern: &str, case_fold: bool) -> Result<Regex, String> {
    let translated = translate(pattern)?;
    Regex::builder()
        .syntax(
            syntax::Config::new()
                .multi_line(true)
                .case_insensitive(case_fold),
        )
        .build(&translated)
        .map_err(|e| e.to_string())
}

pub(crate) fn translate(pattern: &str) -> Result<String, String> {
    let mut out = String::with_capacity(pattern.len() + 8);
    let mut chars = pattern.chars().peekable();
    // Postfix operators are literal where nothing precedes them.
    let mut at_start = true;

    while let Some(c) = chars.next() {
        let mut opens = false;
        match c {
            '\\' => {
                let next = chars
                    .next()
                    .ok_or_else(|| "trailing backslash".to_owned())?;
                opens = matches!(next, '(' | '|');
                escape(next, &mut chars, &mut out)?;
            }
            '*' | '+' | '?' if at_start => {
                out.push('\\');
                out.push(c);
            }
            '(' | ')' | '|' | '{' | '}' | ']' => {
                out.push('\\');
                out.push(c);
            }
            '[' => bracket(&mut chars, &mut out)?,
            '^' if at_start => {
                out.push('^');
                opens = true;
            }
            '^' => out.push_str("\\^"),
            '$' if ends_context(&chars) => out.push('$'),
            '$' => out.push_str("\\$"),
            other => out.push(other),
        }
        at_start = opens;
    }
    Ok(out)
}

/// True when what follows closes the pattern, a group or an alternative.
fn ends_context(chars: &Peekable<Chars<'_>>) -> bool {
    let mut ahead = chars.clone();
    matches!(
        (ahead.next(), ahead.next()),
        (None, _) | (Some('\\'), Some(')' | '|'))
    )
}

fn escape(c: char, chars: &mut Peekable<Chars<'_>>, out: &mut String) -> Result<(), String> {
    match c {
        '(' => {
            if chars.peek() == Some(&'?') {
                chars.next();
                if chars.next() != Some(':') {
                    return Err("explicitly numbered groups are not supported".to_owned());
                }
                out.push_str("(?:");
            } else {
                out.push('(');
            }
        }
        ')' | '|' | '{' | '}' => out.push(c),
        '<' => out.push_str("\\b{start}"),
        '>' => out.push_str("\\b{end}"),
        'b' => out.push_str("\\b"),
        'B' => out.push_str("\\B"),
        '_' => match chars.next() {
            Some('<') => out.push_str("\\b{start}"),
            Some('>') => out.push_str("\\b{end}"),
            _ => return Err("unsupported \\_ construct".to_owned()),
        },
        'w' => out.push_str("\\w"),
        'W' => out.push_str("\\W"),
        's' | 'S' => {
            let class = chars
                .next()
                .ok_or_else(|| "missing syntax class".to_owned())?;
            let set = syntax_class(class)?;
            if c == 's' {
                out.push_str(&format!("[{set}]"));
            } else {
                out.push_str(&format!("[^{set}]"));
            }
        }
        '`' => out.push_str("\\A"),
        '\'' => out.push_str("\\z"),
        '1'..='9' => return Err("back references are not supported".to_owned()),
        '=' => return Err("\\= is not supported".to_owned()),
        other => out.push_str(&regex::escape(&other.to_string())),
    }
    Ok(())
}

fn syntax_class(class: char) -> Result<&'static str, String> {
    match class {
        '-' | ' ' => Ok("\\s"),
        'w' => Ok("\\w"),
        '_' => Ok("\\w_\\-+*/\\&|<>=!?$%:"),
        '.' => Ok("[:punct:]"),
        '(' => Ok("\\(\\[{"),
        ')' => Ok("\\)\\]}"),
        '"' => Ok("\""),
        other => Err(format!("unsupported syntax class '{other}'")),
    }
}

fn bracket(chars: &mut Peekable<Chars<'_>>, out: &mut String) -> Result<(), String> {
    out.push('[');
    if chars.peek() == Some(&'^') {
        chars.next();
        out.push('^');
    }
    let mut first = true;
    loop {
        let c = chars
            .next()
            .ok_or_else(|| "unterminated bracket expression".to_owned())?;
        match c {
            ']' if !first => {
                out.push(']');
                return Ok(());
            }
            '[' if chars.peek() == Some(&':') => {
                chars.next();
                let mut class = String::from("[:");
                loop {
                    let c = chars
                        .next()
                        .ok_or_else(|| "unterminated character class".to_owned())?;
                    class.push(c);
                    if class.len() > 3 && class.ends_with(":]") {
                        break;
                    }
                }
                out.push_str(&class);
            }
            '\\' | '[' | ']' | '&' | '~' | '^' => {
                out.push('\\');
                out.push(c);
            }
            c => out.push(c),
        }
        first = false;
    }
}
