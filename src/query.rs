use std::fmt;

use serde_json::Value;

use crate::{
    env::Environment,
    errors::JSONPathError,
    node::{Node, NodeList},
    segment::Segment,
    selector::Selector,
};

/// A parsed JSONPath expression, ready to be applied to JSON-like data.
#[derive(Debug, Clone)]
pub struct Query {
    pub segments: Vec<Segment>,
}

pub(crate) struct QueryContext<'e, 'v> {
    pub env: &'e Environment,
    pub root: &'v Value,
}

impl Query {
    pub fn new(segments: Vec<Segment>) -> Self {
        Query { segments }
    }

    /// A query with no segments, selecting the query argument itself.
    pub fn empty() -> Self {
        Query {
            segments: Vec::new(),
        }
    }

    /// Parse `expr` with the standard environment, which is limited to
    /// standard function extensions.
    pub fn standard(expr: &str) -> Result<Self, JSONPathError> {
        crate::jsonpath::PARSER.parse(expr)
    }

    /// Apply this query to `value`, producing a list of nodes in document
    /// order.
    pub fn find<'v>(
        &self,
        value: &'v Value,
        env: &Environment,
    ) -> Result<NodeList<'v>, JSONPathError> {
        self.find_with_root(value, value, env)
    }

    /// Apply this query starting at `value`, with `root` as the value that
    /// `$` resolves to in any nested filter expression. Relative queries in
    /// filters start somewhere other than the document root.
    pub(crate) fn find_with_root<'v>(
        &self,
        value: &'v Value,
        root: &'v Value,
        env: &Environment,
    ) -> Result<NodeList<'v>, JSONPathError> {
        let context = QueryContext { env, root };

        self.segments
            .iter()
            .try_fold(vec![Node::new_root(value)], |nodes, segment| {
                if nodes.is_empty() {
                    Ok(nodes)
                } else {
                    segment.resolve(nodes, &context)
                }
            })
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    /// `true` if this query is guaranteed to select at most one node, which
    /// is the case when every segment is a child segment with a single name
    /// or index selector.
    pub fn is_singular(&self) -> bool {
        self.segments.iter().all(|segment| {
            if let Segment::Child { selectors, .. } = segment {
                return selectors.len() == 1
                    && selectors.first().is_some_and(|selector| {
                        matches!(selector, Selector::Name { .. } | Selector::Index { .. })
                    });
            }
            false
        })
    }
}

impl fmt::Display for Query {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "${}",
            self.segments
                .iter()
                .map(|s| s.to_string())
                .collect::<Vec<String>>()
                .join("")
        )
    }
}
