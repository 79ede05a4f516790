//! Filter expression trees and their evaluation.
//!
//! Comparisons follow the algebra of RFC 9535 table 11. Everything is
//! derived from `==` and `<`, with the missing value `Nothing` equal only
//! to itself and unordered with respect to everything.
use std::fmt;

use serde_json::Value;

use crate::{
    env::Environment,
    errors::JSONPathError,
    function::ExpressionType,
    node::NodeList,
    query::Query,
    token::Token,
};

#[derive(Debug, Clone)]
pub enum FilterExpressionType {
    True,
    False,
    Null,
    String {
        value: String,
    },
    Int {
        value: i64,
    },
    Float {
        value: f64,
    },
    Not {
        expression: Box<FilterExpression>,
    },
    Logical {
        left: Box<FilterExpression>,
        operator: LogicalOperator,
        right: Box<FilterExpression>,
    },
    Comparison {
        left: Box<FilterExpression>,
        operator: ComparisonOperator,
        right: Box<FilterExpression>,
    },
    RelativeQuery {
        query: Box<Query>,
    },
    RootQuery {
        query: Box<Query>,
    },
    Function {
        name: String,
        args: Vec<FilterExpression>,
    },
}

#[derive(Debug, Clone)]
pub struct FilterExpression {
    pub token: Token,
    pub kind: FilterExpressionType,
}

impl FilterExpression {
    pub fn new(token: Token, kind: FilterExpressionType) -> Self {
        FilterExpression { token, kind }
    }

    pub fn is_literal(&self) -> bool {
        use FilterExpressionType::*;
        matches!(
            self.kind,
            True | False | Null | String { .. } | Int { .. } | Float { .. }
        )
    }

    pub fn evaluate<'v>(
        &self,
        env: &Environment,
        root: &'v Value,
        current: &'v Value,
    ) -> Result<FilterExpressionResult<'v>, JSONPathError> {
        match &self.kind {
            FilterExpressionType::True => Ok(FilterExpressionResult::Bool(true)),
            FilterExpressionType::False => Ok(FilterExpressionResult::Bool(false)),
            FilterExpressionType::Null => Ok(FilterExpressionResult::Null),
            FilterExpressionType::String { value } => {
                Ok(FilterExpressionResult::String(value.clone()))
            }
            FilterExpressionType::Int { value } => Ok(FilterExpressionResult::Int(*value)),
            FilterExpressionType::Float { value } => Ok(FilterExpressionResult::Float(*value)),
            FilterExpressionType::Not { expression } => Ok(FilterExpressionResult::Bool(
                !is_truthy(&expression.evaluate(env, root, current)?),
            )),
            FilterExpressionType::Logical {
                left,
                operator,
                right,
            } => {
                let rv = match operator {
                    LogicalOperator::And => {
                        is_truthy(&left.evaluate(env, root, current)?)
                            && is_truthy(&right.evaluate(env, root, current)?)
                    }
                    LogicalOperator::Or => {
                        is_truthy(&left.evaluate(env, root, current)?)
                            || is_truthy(&right.evaluate(env, root, current)?)
                    }
                };
                Ok(FilterExpressionResult::Bool(rv))
            }
            FilterExpressionType::Comparison {
                left,
                operator,
                right,
            } => {
                let left = left.evaluate(env, root, current)?;
                let right = right.evaluate(env, root, current)?;
                Ok(FilterExpressionResult::Bool(compare(left, operator, right)))
            }
            FilterExpressionType::RelativeQuery { query } => Ok(FilterExpressionResult::Nodes(
                query.find_with_root(current, root, env)?,
            )),
            FilterExpressionType::RootQuery { query } => {
                Ok(FilterExpressionResult::Nodes(query.find_with_root(root, root, env)?))
            }
            FilterExpressionType::Function { name, args } => {
                self.call_function(name, args, env, root, current)
            }
        }
    }

    fn call_function<'v>(
        &self,
        name: &str,
        args: &[FilterExpression],
        env: &Environment,
        root: &'v Value,
        current: &'v Value,
    ) -> Result<FilterExpressionResult<'v>, JSONPathError> {
        let ext = env.functions.get(name).ok_or_else(|| {
            JSONPathError::new(
                crate::errors::JSONPathErrorType::EvaluationError,
                format!("unknown function `{}`", name),
                self.token.span,
            )
        })?;

        let signature = ext.sig();
        let mut call_args = Vec::with_capacity(args.len());

        for (index, arg) in args.iter().enumerate() {
            let rv = arg.evaluate(env, root, current)?;
            call_args.push(unpack_argument(rv, &signature.param_types, index));
        }

        ext.call(call_args)
            .map_err(|err| JSONPathError::new(err.kind, err.msg, self.token.span))
    }
}

impl fmt::Display for FilterExpression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.kind {
            FilterExpressionType::True => f.write_str("true"),
            FilterExpressionType::False => f.write_str("false"),
            FilterExpressionType::Null => f.write_str("null"),
            FilterExpressionType::String { value } => write!(f, "\"{value}\""),
            FilterExpressionType::Int { value } => write!(f, "{value}"),
            FilterExpressionType::Float { value } => write!(f, "{value}"),
            FilterExpressionType::Not { expression } => write!(f, "!{expression}"),
            FilterExpressionType::Logical {
                left,
                operator,
                right,
            } => write!(f, "({left} {operator} {right})"),
            FilterExpressionType::Comparison {
                left,
                operator,
                right,
            } => write!(f, "{left} {operator} {right}"),
            FilterExpressionType::RelativeQuery { query } => {
                write!(
                    f,
                    "@{}",
                    query
                        .segments
                        .iter()
                        .map(|s| s.to_string())
                        .collect::<Vec<String>>()
                        .join("")
                )
            }
            FilterExpressionType::RootQuery { query } => {
                write!(
                    f,
                    "${}",
                    query
                        .segments
                        .iter()
                        .map(|s| s.to_string())
                        .collect::<Vec<String>>()
                        .join("")
                )
            }
            FilterExpressionType::Function { name, args } => {
                write!(
                    f,
                    "{}({})",
                    name,
                    args.iter()
                        .map(|a| a.to_string())
                        .collect::<Vec<String>>()
                        .join(", ")
                )
            }
        }
    }
}

#[derive(Debug, Clone)]
pub enum LogicalOperator {
    And,
    Or,
}

impl fmt::Display for LogicalOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LogicalOperator::And => f.write_str("&&"),
            LogicalOperator::Or => f.write_str("||"),
        }
    }
}

#[derive(Debug, Clone)]
pub enum ComparisonOperator {
    Eq,
    Ne,
    Ge,
    Gt,
    Le,
    Lt,
}

impl fmt::Display for ComparisonOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ComparisonOperator::Eq => f.write_str("=="),
            ComparisonOperator::Ne => f.write_str("!="),
            ComparisonOperator::Ge => f.write_str(">="),
            ComparisonOperator::Gt => f.write_str(">"),
            ComparisonOperator::Le => f.write_str("<="),
            ComparisonOperator::Lt => f.write_str("<"),
        }
    }
}

/// The result of evaluating a filter expression.
///
/// Spans the three type universes of RFC 9535 section 2.4.1. `Bool` doubles
/// as a logical result and a JSON boolean value, `Nodes` is a nodelist and
/// `Nothing` is the missing value, distinct from JSON null.
#[derive(Debug, PartialEq)]
pub enum FilterExpressionResult<'v> {
    Bool(bool),
    Int(i64),
    Float(f64),
    Null,
    String(String),
    Array(&'v Value),
    Object(&'v Value),
    Nodes(NodeList<'v>),
    Nothing,
}

impl<'v> FilterExpressionResult<'v> {
    pub fn from_json_value(value: &'v Value) -> Self {
        match value {
            Value::Bool(v) => FilterExpressionResult::Bool(*v),
            Value::Null => FilterExpressionResult::Null,
            Value::Number(n) => {
                if let Some(i) = n.as_i64() {
                    FilterExpressionResult::Int(i)
                } else {
                    n.as_f64()
                        .map_or(FilterExpressionResult::Nothing, FilterExpressionResult::Float)
                }
            }
            Value::String(s) => FilterExpressionResult::String(s.to_owned()),
            Value::Array(_) => FilterExpressionResult::Array(value),
            Value::Object(_) => FilterExpressionResult::Object(value),
        }
    }
}

pub fn is_truthy(rv: &FilterExpressionResult) -> bool {
    match rv {
        FilterExpressionResult::Nothing => false,
        FilterExpressionResult::Nodes(nodes) => !nodes.is_empty(),
        FilterExpressionResult::Bool(v) => *v,
        _ => true,
    }
}

/// Collapse a singular query result to the value it selected, or leave any
/// other result untouched.
fn nodes_or_singular(rv: FilterExpressionResult) -> FilterExpressionResult {
    match rv {
        FilterExpressionResult::Nodes(ref nodes) => {
            if nodes.len() == 1 {
                FilterExpressionResult::from_json_value(nodes.first().unwrap().value)
            } else {
                rv
            }
        }
        _ => rv,
    }
}

fn compare(
    left: FilterExpressionResult,
    op: &ComparisonOperator,
    right: FilterExpressionResult,
) -> bool {
    use ComparisonOperator::*;
    let left = nodes_or_singular(left);
    let right = nodes_or_singular(right);
    match op {
        Eq => eq(&left, &right),
        Ne => !eq(&left, &right),
        Lt => lt(&left, &right),
        Gt => lt(&right, &left),
        Ge => lt(&right, &left) || eq(&left, &right),
        Le => lt(&left, &right) || eq(&left, &right),
    }
}

fn eq(left: &FilterExpressionResult, right: &FilterExpressionResult) -> bool {
    use FilterExpressionResult::*;
    match (left, right) {
        (Nothing, Nothing) => true,
        (Nodes(nodes), Nothing) | (Nothing, Nodes(nodes)) => nodes.is_empty(),
        (Nothing, _) | (_, Nothing) => false,
        // Only singular queries reach a comparison, so any node list here
        // selected nothing.
        (Nodes(left), Nodes(right)) => left.is_empty() && right.is_empty(),
        (Nodes(_), _) | (_, Nodes(_)) => false,
        (Int(l), Int(r)) => l == r,
        (Float(l), Float(r)) => l == r,
        (Int(l), Float(r)) => *l as f64 == *r,
        (Float(l), Int(r)) => *l == *r as f64,
        (Null, Null) => true,
        (Bool(l), Bool(r)) => l == r,
        (String(l), String(r)) => l == r,
        (Array(l), Array(r)) => *l == *r,
        (Object(l), Object(r)) => *l == *r,
        _ => false,
    }
}

fn lt(left: &FilterExpressionResult, right: &FilterExpressionResult) -> bool {
    use FilterExpressionResult::*;
    match (left, right) {
        (String(l), String(r)) => l < r,
        (Int(l), Int(r)) => l < r,
        (Float(l), Float(r)) => l < r,
        (Int(l), Float(r)) => (*l as f64) < *r,
        (Float(l), Int(r)) => *l < *r as f64,
        _ => false,
    }
}

/// Convert a function argument according to the declared parameter type,
/// per RFC 9535 section 2.4.2.
fn unpack_argument<'v>(
    rv: FilterExpressionResult<'v>,
    param_types: &[ExpressionType],
    index: usize,
) -> FilterExpressionResult<'v> {
    match param_types.get(index) {
        Some(ExpressionType::Nodes) | None => rv,
        Some(ExpressionType::Logical) => match rv {
            FilterExpressionResult::Nodes(nodes) => {
                FilterExpressionResult::Bool(!nodes.is_empty())
            }
            rv => rv,
        },
        Some(ExpressionType::Value) => match rv {
            FilterExpressionResult::Nodes(nodes) => match nodes.len() {
                1 => FilterExpressionResult::from_json_value(nodes.first().unwrap().value),
                _ => FilterExpressionResult::Nothing,
            },
            rv => rv,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::FilterExpressionResult::*;
    use super::*;
    use serde_json::json;

    #[test]
    fn nothing_equals_nothing() {
        assert!(eq(&Nothing, &Nothing));
    }

    #[test]
    fn nothing_equals_no_value() {
        assert!(!eq(&Nothing, &Null));
        assert!(!eq(&Null, &Nothing));
        assert!(!eq(&Nothing, &Int(0)));
        assert!(!eq(&Bool(false), &Nothing));
    }

    #[test]
    fn nothing_is_unordered() {
        assert!(!lt(&Nothing, &Int(1)));
        assert!(!lt(&Int(1), &Nothing));
    }

    #[test]
    fn mixed_kinds_are_never_equal() {
        assert!(!eq(&Int(13), &String(std::string::String::from("13"))));
        assert!(!eq(&Bool(true), &Int(1)));
        assert!(!eq(&Null, &Bool(false)));
    }

    #[test]
    fn numbers_compare_across_representations() {
        assert!(eq(&Int(1), &Float(1.0)));
        assert!(eq(&Float(2.5), &Float(2.5)));
        assert!(lt(&Int(1), &Float(1.5)));
        assert!(lt(&Float(0.5), &Int(1)));
    }

    #[test]
    fn strings_compare_by_code_point() {
        assert!(lt(
            &String(std::string::String::from("a")),
            &String(std::string::String::from("b"))
        ));
        assert!(!lt(
            &String(std::string::String::from("b")),
            &String(std::string::String::from("a"))
        ));
    }

    #[test]
    fn booleans_are_unordered() {
        assert!(!lt(&Bool(false), &Bool(true)));
        assert!(!lt(&Bool(true), &Bool(false)));
    }

    #[test]
    fn deep_equality_on_structures() {
        let left = json!({"a": [1, {"b": 2}]});
        let right = json!({"a": [1, {"b": 2}]});
        let other = json!({"a": [1, {"b": 3}]});
        assert!(eq(&Object(&left), &Object(&right)));
        assert!(!eq(&Object(&left), &Object(&other)));
    }

    #[test]
    fn comparison_operators_derive_from_eq_and_lt() {
        // On ordered operands the usual boolean identities hold.
        let cases = [(1, 2), (2, 2), (3, 2)];

        for (l, r) in cases {
            let el = eq(&Int(l), &Int(r));
            let ll = lt(&Int(l), &Int(r));
            assert_eq!(compare(Int(l), &ComparisonOperator::Ne, Int(r)), !el);
            assert_eq!(compare(Int(l), &ComparisonOperator::Le, Int(r)), ll || el);
            assert_eq!(compare(Int(l), &ComparisonOperator::Gt, Int(r)), !ll && !el);
            assert_eq!(compare(Int(l), &ComparisonOperator::Ge, Int(r)), !ll);
        }
    }

    #[test]
    fn nothing_with_ordered_operators() {
        assert!(!compare(Nothing, &ComparisonOperator::Lt, Int(1)));
        assert!(!compare(Nothing, &ComparisonOperator::Le, Int(1)));
        assert!(!compare(Nothing, &ComparisonOperator::Gt, Int(1)));
        assert!(!compare(Nothing, &ComparisonOperator::Ge, Int(1)));
        assert!(!compare(Int(1), &ComparisonOperator::Ge, Nothing));
    }

    #[test]
    fn nothing_with_nothing_and_inclusive_operators() {
        // `<=` and `>=` include equality, and the missing value equals itself.
        assert!(compare(Nothing, &ComparisonOperator::Le, Nothing));
        assert!(compare(Nothing, &ComparisonOperator::Ge, Nothing));
        assert!(compare(Nothing, &ComparisonOperator::Eq, Nothing));
        assert!(!compare(Nothing, &ComparisonOperator::Lt, Nothing));
        assert!(!compare(Nothing, &ComparisonOperator::Gt, Nothing));
    }
}
