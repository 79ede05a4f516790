use std::fmt;

use serde_json::Value;

use crate::{
    errors::JSONPathError,
    node::{Node, NodeList},
    query::QueryContext,
    selector::Selector,
    token::Token,
};

#[derive(Debug, Clone)]
pub enum Segment {
    Child {
        token: Token,
        selectors: Vec<Selector>,
    },
    Recursive {
        token: Token,
        selectors: Vec<Selector>,
    },
}

impl Segment {
    /// Apply this segment to every node in `nodes`, producing the next
    /// intermediate node list.
    pub(crate) fn resolve<'v>(
        &self,
        nodes: NodeList<'v>,
        context: &QueryContext<'_, 'v>,
    ) -> Result<NodeList<'v>, JSONPathError> {
        match self {
            Segment::Child { selectors, .. } => {
                let child_nodes: Result<Vec<_>, _> = nodes
                    .iter()
                    .flat_map(|node| selectors.iter().map(move |s| s.resolve(node, context)))
                    .collect();

                Ok(child_nodes?.into_iter().flatten().collect())
            }
            Segment::Recursive { selectors, .. } => {
                let descendant_nodes: Result<Vec<_>, _> = nodes
                    .iter()
                    .flat_map(|n| visit(n))
                    .flat_map(|node| {
                        selectors
                            .iter()
                            .map(move |s| s.resolve(&node, context))
                            .collect::<Vec<_>>()
                    })
                    .collect();

                Ok(descendant_nodes?.into_iter().flatten().collect())
            }
        }
    }
}

/// `node` and all of its descendants, depth-first, in document order.
fn visit<'v>(node: &Node<'v>) -> NodeList<'v> {
    let mut nodes: NodeList = vec![node.clone()];

    match node.value {
        Value::Object(obj) => {
            obj.iter()
                .for_each(|(k, v)| nodes.extend(visit(&node.new_child_member(v, k))));
        }
        Value::Array(arr) => arr
            .iter()
            .enumerate()
            .for_each(|(i, e)| nodes.extend(visit(&node.new_child_element(e, i)))),
        _ => (),
    }

    nodes
}

impl fmt::Display for Segment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Segment::Child { selectors, .. } => {
                write!(
                    f,
                    "[{}]",
                    selectors
                        .iter()
                        .map(|s| s.to_string())
                        .collect::<Vec<String>>()
                        .join(", ")
                )
            }
            Segment::Recursive { selectors, .. } => {
                write!(
                    f,
                    "..[{}]",
                    selectors
                        .iter()
                        .map(|s| s.to_string())
                        .collect::<Vec<String>>()
                        .join(", ")
                )
            }
        }
    }
}
