//! The standard filter functions of RFC 9535 sections 2.4.4 to 2.4.8.
use std::{num::NonZeroUsize, sync::Mutex};

use lru::LruCache;
use regex::{Regex, RegexBuilder};

use crate::{
    errors::JSONPathError,
    filter::FilterExpressionResult,
    function::{ExpressionType, FunctionExtension, FunctionSignature},
};

const REGEX_CACHE_SIZE: usize = 100;

// Compiled patterns larger than this are rejected. Together with the regex
// crate's linear-time matching, this bounds evaluation time per call.
const REGEX_SIZE_LIMIT: usize = 1 << 20;

pub struct Count;

impl Count {
    pub fn new() -> Self {
        Self {}
    }
}

impl Default for Count {
    fn default() -> Self {
        Self::new()
    }
}

impl FunctionExtension for Count {
    fn call<'v>(
        &self,
        args: Vec<FilterExpressionResult<'v>>,
    ) -> Result<FilterExpressionResult<'v>, JSONPathError> {
        match args.first() {
            Some(FilterExpressionResult::Nodes(nodes)) => {
                Ok(FilterExpressionResult::Int(nodes.len() as i64))
            }
            _ => Err(JSONPathError::evaluation(String::from(
                "count() requires a nodelist argument",
            ))),
        }
    }

    fn sig(&self) -> FunctionSignature {
        FunctionSignature {
            param_types: vec![ExpressionType::Nodes],
            return_type: ExpressionType::Value,
        }
    }
}

pub struct Length;

impl Length {
    pub fn new() -> Self {
        Self {}
    }
}

impl Default for Length {
    fn default() -> Self {
        Self::new()
    }
}

impl FunctionExtension for Length {
    fn call<'v>(
        &self,
        args: Vec<FilterExpressionResult<'v>>,
    ) -> Result<FilterExpressionResult<'v>, JSONPathError> {
        let rv = match args.first() {
            // A count of Unicode scalar values, not bytes or UTF-16 code
            // units.
            Some(FilterExpressionResult::String(s)) => {
                FilterExpressionResult::Int(s.chars().count() as i64)
            }
            Some(FilterExpressionResult::Array(v)) => v
                .as_array()
                .map_or(FilterExpressionResult::Nothing, |arr| {
                    FilterExpressionResult::Int(arr.len() as i64)
                }),
            Some(FilterExpressionResult::Object(v)) => v
                .as_object()
                .map_or(FilterExpressionResult::Nothing, |obj| {
                    FilterExpressionResult::Int(obj.len() as i64)
                }),
            _ => FilterExpressionResult::Nothing,
        };

        Ok(rv)
    }

    fn sig(&self) -> FunctionSignature {
        FunctionSignature {
            param_types: vec![ExpressionType::Value],
            return_type: ExpressionType::Value,
        }
    }
}

pub struct Match {
    cache: Mutex<LruCache<String, Regex>>,
}

impl Match {
    pub fn new() -> Self {
        Self {
            cache: Mutex::new(LruCache::new(
                NonZeroUsize::new(REGEX_CACHE_SIZE).unwrap(),
            )),
        }
    }
}

impl Default for Match {
    fn default() -> Self {
        Self::new()
    }
}

impl FunctionExtension for Match {
    fn call<'v>(
        &self,
        args: Vec<FilterExpressionResult<'v>>,
    ) -> Result<FilterExpressionResult<'v>, JSONPathError> {
        match (args.first(), args.get(1)) {
            (
                Some(FilterExpressionResult::String(s)),
                Some(FilterExpressionResult::String(pattern)),
            ) => {
                let mut cache = self.cache.lock().expect("regex cache lock is poisoned");

                match cache.get(pattern) {
                    Some(re) => Ok(FilterExpressionResult::Bool(re.is_match(s))),
                    None => {
                        let re = compile_pattern(pattern, &full_match(pattern))?;
                        let rv = re.is_match(s);
                        cache.push(pattern.to_owned(), re);
                        Ok(FilterExpressionResult::Bool(rv))
                    }
                }
            }
            _ => Ok(FilterExpressionResult::Bool(false)),
        }
    }

    fn sig(&self) -> FunctionSignature {
        FunctionSignature {
            param_types: vec![ExpressionType::Value, ExpressionType::Value],
            return_type: ExpressionType::Logical,
        }
    }
}

pub struct Search {
    cache: Mutex<LruCache<String, Regex>>,
}

impl Search {
    pub fn new() -> Self {
        Self {
            cache: Mutex::new(LruCache::new(
                NonZeroUsize::new(REGEX_CACHE_SIZE).unwrap(),
            )),
        }
    }
}

impl Default for Search {
    fn default() -> Self {
        Self::new()
    }
}

impl FunctionExtension for Search {
    fn call<'v>(
        &self,
        args: Vec<FilterExpressionResult<'v>>,
    ) -> Result<FilterExpressionResult<'v>, JSONPathError> {
        match (args.first(), args.get(1)) {
            (
                Some(FilterExpressionResult::String(s)),
                Some(FilterExpressionResult::String(pattern)),
            ) => {
                let mut cache = self.cache.lock().expect("regex cache lock is poisoned");

                match cache.get(pattern) {
                    Some(re) => Ok(FilterExpressionResult::Bool(re.is_match(s))),
                    None => {
                        let re = compile_pattern(pattern, pattern)?;
                        let rv = re.is_match(s);
                        cache.push(pattern.to_owned(), re);
                        Ok(FilterExpressionResult::Bool(rv))
                    }
                }
            }
            _ => Ok(FilterExpressionResult::Bool(false)),
        }
    }

    fn sig(&self) -> FunctionSignature {
        FunctionSignature {
            param_types: vec![ExpressionType::Value, ExpressionType::Value],
            return_type: ExpressionType::Logical,
        }
    }
}

pub struct Value;

impl Value {
    pub fn new() -> Self {
        Self {}
    }
}

impl Default for Value {
    fn default() -> Self {
        Self::new()
    }
}

impl FunctionExtension for Value {
    fn call<'v>(
        &self,
        args: Vec<FilterExpressionResult<'v>>,
    ) -> Result<FilterExpressionResult<'v>, JSONPathError> {
        match args.first() {
            Some(FilterExpressionResult::Nodes(nodes)) => {
                if nodes.len() == 1 {
                    Ok(FilterExpressionResult::from_json_value(
                        nodes.first().unwrap().value,
                    ))
                } else {
                    Ok(FilterExpressionResult::Nothing)
                }
            }
            _ => Err(JSONPathError::evaluation(String::from(
                "value() requires a nodelist argument",
            ))),
        }
    }

    fn sig(&self) -> FunctionSignature {
        FunctionSignature {
            param_types: vec![ExpressionType::Nodes],
            return_type: ExpressionType::Value,
        }
    }
}

/// Check `pattern` against RFC 9485 and compile `target`, which is
/// `pattern` or a wrapped version of it.
fn compile_pattern(pattern: &str, target: &str) -> Result<Regex, JSONPathError> {
    if !iregexp::check(pattern) {
        return Err(JSONPathError::evaluation(format!(
            "pattern `{}` is not a valid I-Regexp",
            pattern
        )));
    }

    RegexBuilder::new(target)
        .size_limit(REGEX_SIZE_LIMIT)
        .build()
        .map_err(|_| JSONPathError::evaluation(format!("invalid pattern `{}`", pattern)))
}

/// Anchor `pattern` so it must match an entire string.
fn full_match(pattern: &str) -> String {
    format!("^(?:{})$", pattern)
}
