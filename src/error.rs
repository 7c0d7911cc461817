use thiserror::Error;

use crate::parse::ParseError;
use crate::MalformedRuleError;

/// Unified error type covering reading, normalization, and I/O.
///
/// Returned by convenience methods like [`Keywords::from_source()`](crate::Keywords::from_source)
/// and [`Keywords::from_file()`](crate::Keywords::from_file).
#[derive(Debug, Error)]
pub enum StudioError {
    #[error(transparent)]
    Parse(#[from] ParseError),

    #[error(transparent)]
    Malformed(#[from] MalformedRuleError),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}
