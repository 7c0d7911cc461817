use winnow::ascii::till_line_ending;
use winnow::combinator::{alt, cut_err, opt, preceded, repeat};
use winnow::error::{ModalResult, StrContext, StrContextValue};
use winnow::prelude::*;
use winnow::token::{any, take_while};

use crate::Sexp;

// -- Whitespace & comments --------------------------------------------------

fn ws(input: &mut &str) -> ModalResult<()> {
    let _: () = repeat(
        0..,
        alt((
            take_while(1.., |c: char| c.is_whitespace()).void(),
            (';', till_line_ending).void(),
        )),
    )
    .parse_next(input)?;
    Ok(())
}

// -- Atoms ------------------------------------------------------------------

fn is_atom_char(c: char) -> bool {
    !c.is_whitespace() && !matches!(c, '(' | ')' | '"' | '\'' | ';')
}

fn atom(input: &mut &str) -> ModalResult<Sexp> {
    let text = take_while(1.., is_atom_char).parse_next(input)?;
    Ok(match text.parse::<i64>() {
        Ok(n) => Sexp::Int(n),
        Err(_) => Sexp::Symbol(text.to_owned()),
    })
}

fn string_literal(input: &mut &str) -> ModalResult<String> {
    '"'.parse_next(input)?;
    let mut s = String::new();
    loop {
        let ch = cut_err(any).parse_next(input)?;
        match ch {
            '"' => return Ok(s),
            '\\' => {
                let esc = cut_err(any).parse_next(input)?;
                match esc {
                    '"' => s.push('"'),
                    '\\' => s.push('\\'),
                    'n' => s.push('\n'),
                    't' => s.push('\t'),
                    // An escaped newline is a line continuation.
                    '\n' => {}
                    other => s.push(other),
                }
            }
            c => s.push(c),
        }
    }
}

// -- Lists ------------------------------------------------------------------

/// True when the input starts with a lone `.` separating a dotted tail.
fn at_dot(input: &str) -> bool {
    let mut chars = input.chars();
    chars.next() == Some('.')
        && chars
            .next()
            .is_some_and(|c| c.is_whitespace() || matches!(c, '(' | '"' | '\''))
}

fn list(input: &mut &str) -> ModalResult<Sexp> {
    '('.parse_next(input)?;
    let mut items = Vec::new();
    loop {
        ws.parse_next(input)?;
        if opt(')').parse_next(input)?.is_some() {
            return Ok(Sexp::List(items, None));
        }
        if !items.is_empty() && at_dot(input) {
            '.'.parse_next(input)?;
            let tail = cut_err(sexp).parse_next(input)?;
            ws.parse_next(input)?;
            cut_err(')')
                .context(StrContext::Expected(StrContextValue::CharLiteral(')')))
                .parse_next(input)?;
            return Ok(Sexp::dotted(items, tail));
        }
        let item = cut_err(sexp).parse_next(input)?;
        items.push(item);
    }
}

// -- Expressions ------------------------------------------------------------

pub(crate) fn sexp(input: &mut &str) -> ModalResult<Sexp> {
    ws.parse_next(input)?;
    alt((
        preceded("#'", cut_err(sexp)).map(Sexp::function),
        preceded('\'', cut_err(sexp)).map(Sexp::quote),
        string_literal.map(Sexp::Str),
        list,
        atom,
    ))
    .context(StrContext::Expected(StrContextValue::Description(
        "expression",
    )))
    .parse_next(input)
}

// -- Top-level parser -------------------------------------------------------

pub fn document(input: &mut &str) -> ModalResult<Sexp> {
    let form = sexp.parse_next(input)?;
    ws.parse_next(input)?;
    Ok(form)
}
