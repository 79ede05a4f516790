//! The filter function extension interface.
use std::{collections::HashMap, fmt::Debug};

use crate::{errors::JSONPathError, filter::FilterExpressionResult};

/// The type of a filter function parameter or return value, as defined by
/// RFC 9535 section 2.4.1.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExpressionType {
    Logical,
    Nodes,
    Value,
}

#[derive(Debug, Clone)]
pub struct FunctionSignature {
    pub param_types: Vec<ExpressionType>,
    pub return_type: ExpressionType,
}

/// A filter function implementation.
///
/// The parser uses `sig` to check that calls are well-typed. At evaluation
/// time, `call` receives arguments already converted according to the
/// signature's parameter types.
pub trait FunctionExtension {
    fn call<'v>(
        &self,
        args: Vec<FilterExpressionResult<'v>>,
    ) -> Result<FilterExpressionResult<'v>, JSONPathError>;

    fn sig(&self) -> FunctionSignature;
}

impl Debug for dyn FunctionExtension + Send + Sync {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let sig = self.sig();
        write!(f, "({:?}) -> {:?}", sig.param_types, sig.return_type)
    }
}

pub type FunctionRegister = HashMap<String, Box<dyn FunctionExtension + Send + Sync>>;
