use thiserror::Error;

/// Errors raised while reading or evaluating a top-level form.
///
/// All three kinds abort the current input; the shell reports them on
/// stderr and the session continues with the global environment intact.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SchemeError {
    /// Malformed input text, or a structurally invalid special form.
    #[error("Syntax error: {0}")]
    Syntax(String),

    /// Type mismatch, wrong argument count, or applying a non-callable.
    #[error("Runtime error: {0}")]
    Runtime(String),

    /// Unbound symbol lookup, or `set!` of an undefined name.
    #[error("Name error: {0}")]
    Name(String),
}

pub type SchemeResult<T> = Result<T, SchemeError>;
