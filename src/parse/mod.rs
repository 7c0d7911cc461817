mod error;
mod grammar;
mod parser;

pub use error::ParseError;
pub use parser::RawSpec;

use crate::Sexp;

/// Parse keyword source text into a [`RawSpec`].
///
/// The source is a single list of entries, optionally quoted.
///
/// # Errors
///
/// Returns [`ParseError`] if the input is not a readable list.
pub fn parse(input: &str) -> Result<RawSpec, ParseError> {
    use winnow::Parser;
    let form = grammar::document
        .parse(input)
        .map_err(|e| ParseError::new(e.to_string()))?;
    let form = form.unwrap_form("quote").cloned().unwrap_or(form);
    match form {
        Sexp::List(entries, None) => Ok(RawSpec::new(entries)),
        other if other.is_nil() => Ok(RawSpec::new(Vec::new())),
        other => Err(ParseError::new(format!(
            "expected a list of keyword entries, found {other}"
        ))),
    }
}

/// Read a single expression.
///
/// # Errors
///
/// Returns [`ParseError`] if the input is not exactly one expression.
pub fn parse_sexp(input: &str) -> Result<Sexp, ParseError> {
    use winnow::Parser;
    grammar::document
        .parse(input)
        .map_err(|e| ParseError::new(e.to_string()))
}
