use std::{collections::HashMap, ops::RangeInclusive};

use crate::{
    function::{FunctionExtension, FunctionRegister, FunctionSignature},
    standard_functions::{Count, Length, Match, Search, Value},
};

/// Evaluation environment shared by the parser and the evaluator.
///
/// Holds the filter function register and the range of array indices and
/// integer literals deemed interoperable by RFC 9535. There is no global
/// register. Every environment owns its functions, so tests and embedders
/// can register extensions without side effects on other environments.
#[derive(Debug)]
pub struct Environment {
    pub index_range: RangeInclusive<i64>,
    pub functions: FunctionRegister,
}

impl Environment {
    /// A new environment with the standard filter functions registered.
    pub fn standard() -> Self {
        let mut functions: FunctionRegister = HashMap::new();
        functions.insert(String::from("count"), Box::new(Count::new()));
        functions.insert(String::from("length"), Box::new(Length::new()));
        functions.insert(String::from("match"), Box::new(Match::new()));
        functions.insert(String::from("search"), Box::new(Search::new()));
        functions.insert(String::from("value"), Box::new(Value::new()));

        Self {
            index_range: ((-2_i64).pow(53) + 1..=2_i64.pow(53) - 1),
            functions,
        }
    }

    pub fn add_function(&mut self, name: &str, ext: Box<dyn FunctionExtension + Send + Sync>) {
        self.functions.insert(name.to_string(), ext);
    }

    /// The signature of the function registered as `name`, if any.
    pub fn signature(&self, name: &str) -> Option<FunctionSignature> {
        self.functions.get(name).map(|ext| ext.sig())
    }
}

impl Default for Environment {
    fn default() -> Self {
        Self::standard()
    }
}
