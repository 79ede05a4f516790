//! Convenience functions bound to a shared standard environment.
use lazy_static::lazy_static;
use serde_json::Value;

use crate::{errors::JSONPathError, node::NodeList, parser::Parser, query::Query};

lazy_static! {
    pub(crate) static ref PARSER: Parser = Parser::new();
}

/// Parse `expr` using the standard environment.
pub fn parse(expr: &str) -> Result<Query, JSONPathError> {
    PARSER.parse(expr)
}

/// Parse `expr` and apply it to `value` using the standard environment.
pub fn find<'v>(expr: &str, value: &'v Value) -> Result<NodeList<'v>, JSONPathError> {
    PARSER.parse(expr)?.find(value, &PARSER.env)
}
