//! An RFC 9535 JSONPath query engine, evaluating JSONPath expressions
//! against [`serde_json::Value`]s and producing nodelists of selected
//! values paired with their normalized paths.
//!
//! ## Standard queries
//!
//! To parse a JSONPath expression that is limited to standard [function
//! extensions], use [`Query::standard`], then apply it to a value with
//! [`Query::find`] or use the [`find`] convenience function.
//!
//! ```
//! use jsonpath_core::{errors::JSONPathError, find};
//! use serde_json::json;
//!
//! fn main() -> Result<(), JSONPathError> {
//!     let value = json!({"a": [{"b": 1}, {"b": 2}]});
//!
//!     for node in find("$.a[?@.b > 1]", &value)? {
//!         println!("{} at {}", node.value, node.location);
//!     }
//!
//!     Ok(())
//! }
//! ```
//!
//! A [`Query`] is displayed in its canonical form when printed.
//!
//! ```
//! use jsonpath_core::{errors::JSONPathError, Query};
//!
//! fn main() -> Result<(), JSONPathError> {
//!     let q = Query::standard("$..foo[0]")?;
//!     assert_eq!(q.to_string(), "$..['foo'][0]");
//!     Ok(())
//! }
//! ```
//!
//! ## Function extensions
//!
//! Register [function extensions] by implementing
//! [`FunctionExtension`](function::FunctionExtension) and calling
//! [`Parser::add_function`], then use [`Parser::parse`] to create new
//! queries. Function calls are checked against the registered signature at
//! parse time. Without registering `foo`, parsing `$.some[?foo(@.thing)]`
//! fails with a [`JSONPathError`] with `kind` set to
//! [`JSONPathErrorType::NameError`].
//!
//! [function extensions]: https://datatracker.ietf.org/doc/html/rfc9535#name-function-extensions
pub mod env;
pub mod errors;
pub mod filter;
pub mod function;
pub mod jsonpath;
pub mod lexer;
pub mod node;
pub mod parser;
pub mod query;
pub mod segment;
pub mod selector;
pub mod standard_functions;
pub mod token;
pub mod unescape;

pub use env::Environment;
pub use errors::JSONPathError;
pub use errors::JSONPathErrorType;
pub use function::ExpressionType;
pub use function::FunctionExtension;
pub use function::FunctionSignature;
pub use jsonpath::find;
pub use jsonpath::parse;
pub use node::Node;
pub use node::NodeList;
pub use parser::Parser;
pub use query::Query;
