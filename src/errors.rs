use std::fmt;

/// Broad error categories. The first four are static errors, found while
/// scanning or parsing a query. `EvaluationError` is dynamic, raised while
/// applying a parsed query to a JSON value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum JSONPathErrorType {
    LexerError,
    SyntaxError,
    TypeError,
    NameError,
    EvaluationError,
}

/// An error raised while parsing or evaluating a JSONPath expression.
///
/// `span` is the start and end character index of the offending portion of
/// the query, or `(0, 0)` for evaluation errors with no useful position.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JSONPathError {
    pub kind: JSONPathErrorType,
    pub msg: String,
    pub span: (usize, usize),
}

impl JSONPathError {
    pub fn new(kind: JSONPathErrorType, msg: String, span: (usize, usize)) -> Self {
        Self { kind, msg, span }
    }

    pub fn syntax(msg: String, span: (usize, usize)) -> Self {
        Self {
            kind: JSONPathErrorType::SyntaxError,
            msg,
            span,
        }
    }

    pub fn typ(msg: String, span: (usize, usize)) -> Self {
        Self {
            kind: JSONPathErrorType::TypeError,
            msg,
            span,
        }
    }

    pub fn name(msg: String, span: (usize, usize)) -> Self {
        Self {
            kind: JSONPathErrorType::NameError,
            msg,
            span,
        }
    }

    pub fn evaluation(msg: String) -> Self {
        Self {
            kind: JSONPathErrorType::EvaluationError,
            msg,
            span: (0, 0),
        }
    }
}

impl std::error::Error for JSONPathError {}

impl fmt::Display for JSONPathError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind {
            JSONPathErrorType::LexerError => {
                write!(f, "lexer error: {} ({})", self.msg, self.span.0)
            }
            JSONPathErrorType::SyntaxError => {
                write!(f, "syntax error: {} ({})", self.msg, self.span.0)
            }
            JSONPathErrorType::TypeError => {
                write!(f, "type error: {} ({})", self.msg, self.span.0)
            }
            JSONPathErrorType::NameError => {
                write!(f, "name error: {} ({})", self.msg, self.span.0)
            }
            JSONPathErrorType::EvaluationError => {
                write!(f, "evaluation error: {} ({})", self.msg, self.span.0)
            }
        }
    }
}
