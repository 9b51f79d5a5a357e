use crate::balloon::StyleError;
use thiserror::Error;

/// Fatal render failures. Positions are 1-based; `column` counts characters
/// of the raw template line up to the opening `$`.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RenderError {
    #[error("unterminated directive at line {line}, column {column}")]
    UnterminatedDirective { line: usize, column: usize },
    #[error("undefined variable `{name}` at line {line}, column {column}")]
    UndefinedVariable {
        name: String,
        line: usize,
        column: usize,
    },
    #[error("invalid balloon spec `{spec}` at line {line}, column {column}")]
    InvalidBalloonSpec {
        spec: String,
        line: usize,
        column: usize,
    },
    #[error(transparent)]
    Style(#[from] StyleError),
}
