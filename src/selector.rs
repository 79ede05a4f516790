use std::fmt::{self, Write};

use itertools::Itertools;
use serde_json::Value;

use crate::{
    errors::JSONPathError,
    filter::{is_truthy, FilterExpression},
    node::{Node, NodeList},
    query::QueryContext,
    token::Token,
};

#[derive(Debug, Clone)]
pub enum Selector {
    Name {
        token: Token,
        name: String,
    },
    Index {
        token: Token,
        index: i64,
    },
    Slice {
        token: Token,
        start: Option<i64>,
        stop: Option<i64>,
        step: Option<i64>,
    },
    Wild {
        token: Token,
    },
    Filter {
        token: Token,
        expression: Box<FilterExpression>,
    },
}

impl Selector {
    pub(crate) fn resolve<'v>(
        &self,
        node: &Node<'v>,
        context: &QueryContext<'_, 'v>,
    ) -> Result<NodeList<'v>, JSONPathError> {
        match self {
            Selector::Name { name, .. } => Ok(node
                .value
                .as_object()
                .and_then(|obj| obj.get(name))
                .map(|v| node.new_child_member(v, name))
                .into_iter()
                .collect()),
            Selector::Index { index, .. } => Ok(node
                .value
                .as_array()
                .and_then(|arr| {
                    let norm = norm_index(*index, arr.len())?;
                    arr.get(norm).map(|v| (norm, v))
                })
                .map(|(i, v)| node.new_child_element(v, i))
                .into_iter()
                .collect()),
            Selector::Slice {
                start, stop, step, ..
            } => {
                if let Some(array) = node.value.as_array() {
                    Ok(slice(array, *start, *stop, *step)
                        .into_iter()
                        .map(|(i, v)| node.new_child_element(v, i))
                        .collect())
                } else {
                    Ok(Vec::new())
                }
            }
            Selector::Wild { .. } => match node.value {
                Value::Array(arr) => Ok(arr
                    .iter()
                    .enumerate()
                    .map(|(i, v)| node.new_child_element(v, i))
                    .collect()),
                Value::Object(obj) => Ok(obj
                    .iter()
                    .map(|(k, v)| node.new_child_member(v, k))
                    .collect()),
                _ => Ok(Vec::new()),
            },
            Selector::Filter { expression, .. } => match node.value {
                Value::Array(arr) => arr
                    .iter()
                    .enumerate()
                    .map(|(i, v)| {
                        expression
                            .evaluate(context.env, context.root, v)
                            .map(|r| (i, v, r))
                    })
                    .filter_ok(|(_, _, r)| is_truthy(r))
                    .map_ok(|(i, v, _)| node.new_child_element(v, i))
                    .collect(),
                Value::Object(obj) => obj
                    .iter()
                    .map(|(k, v)| {
                        expression
                            .evaluate(context.env, context.root, v)
                            .map(|r| (k, v, r))
                    })
                    .filter_ok(|(_, _, r)| is_truthy(r))
                    .map_ok(|(k, v, _)| node.new_child_member(v, k))
                    .collect(),
                _ => Ok(Vec::new()),
            },
        }
    }
}

impl fmt::Display for Selector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Selector::Name { name, .. } => write!(f, "'{name}'"),
            Selector::Index { index, .. } => write!(f, "{index}"),
            Selector::Slice {
                start, stop, step, ..
            } => {
                write!(
                    f,
                    "{}:{}:{}",
                    start.map(|i| i.to_string()).unwrap_or_default(),
                    stop.map(|i| i.to_string()).unwrap_or_default(),
                    step.map(|i| i.to_string())
                        .unwrap_or_else(|| String::from("1")),
                )
            }
            Selector::Wild { .. } => f.write_char('*'),
            Selector::Filter { expression, .. } => write!(f, "?{expression}"),
        }
    }
}

/// Resolve a possibly negative array index against an array of length
/// `length`. `None` if the index is out of bounds.
pub(crate) fn norm_index(index: i64, length: usize) -> Option<usize> {
    if index < 0 {
        index
            .checked_abs()
            .and_then(|i| usize::try_from(i).ok())
            .and_then(|i| length.checked_sub(i))
    } else {
        usize::try_from(index).ok().filter(|i| *i < length)
    }
}

/// Select array elements per the slice semantics of RFC 9535 section
/// 2.3.4.2. The bounds arithmetic follows the RFC pseudocode, with 128 bit
/// intermediates so extreme start/stop/step values can't overflow.
pub(crate) fn slice<'v>(
    array: &'v [Value],
    start: Option<i64>,
    stop: Option<i64>,
    step: Option<i64>,
) -> Vec<(usize, &'v Value)> {
    let len = array.len() as i128;
    if len == 0 {
        return Vec::new();
    }

    let step = step.map(i128::from).unwrap_or(1);
    if step == 0 {
        return Vec::new();
    }

    let start = start
        .map(i128::from)
        .unwrap_or(if step < 0 { len - 1 } else { 0 });

    let stop = stop
        .map(i128::from)
        .unwrap_or(if step < 0 { -len - 1 } else { len });

    let n_start = if start < 0 { len + start } else { start };
    let n_stop = if stop < 0 { len + stop } else { stop };

    let mut sliced_array: Vec<(usize, &Value)> = Vec::new();

    if step > 0 {
        let lower = n_start.clamp(0, len);
        let upper = n_stop.clamp(0, len);
        let mut i = lower;
        while i < upper {
            sliced_array.push((i as usize, &array[i as usize]));
            i += step;
        }
    } else {
        let upper = n_start.clamp(-1, len - 1);
        let lower = n_stop.clamp(-1, len - 1);
        let mut i = upper;
        while i > lower {
            sliced_array.push((i as usize, &array[i as usize]));
            i += step;
        }
    }

    sliced_array
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn indices(
        value: &Value,
        start: Option<i64>,
        stop: Option<i64>,
        step: Option<i64>,
    ) -> Vec<usize> {
        slice(value.as_array().unwrap(), start, stop, step)
            .into_iter()
            .map(|(i, _)| i)
            .collect()
    }

    #[test]
    fn slice_with_start_and_stop() {
        let arr = json!([0, 1, 2, 3, 4, 5, 6]);
        assert_eq!(indices(&arr, Some(1), Some(3), None), vec![1, 2]);
    }

    #[test]
    fn slice_with_open_stop() {
        let arr = json!([0, 1, 2, 3, 4, 5, 6]);
        assert_eq!(indices(&arr, Some(5), None, None), vec![5, 6]);
    }

    #[test]
    fn slice_with_step() {
        let arr = json!([0, 1, 2, 3, 4, 5, 6]);
        assert_eq!(indices(&arr, Some(1), Some(5), Some(2)), vec![1, 3]);
    }

    #[test]
    fn slice_with_negative_step() {
        let arr = json!([0, 1, 2, 3, 4, 5, 6]);
        assert_eq!(indices(&arr, Some(5), Some(1), Some(-2)), vec![5, 3]);
    }

    #[test]
    fn slice_reversed() {
        let arr = json!([0, 1, 2]);
        assert_eq!(indices(&arr, None, None, Some(-1)), vec![2, 1, 0]);
    }

    #[test]
    fn slice_with_zero_step_selects_nothing() {
        let arr = json!([0, 1, 2]);
        assert_eq!(indices(&arr, None, None, Some(0)), Vec::<usize>::new());
    }

    #[test]
    fn slice_with_start_past_the_end() {
        let arr = json!([0, 1, 2]);
        assert_eq!(indices(&arr, Some(5), Some(5), None), Vec::<usize>::new());
        assert_eq!(indices(&arr, Some(3), None, None), Vec::<usize>::new());
    }

    #[test]
    fn slice_with_negative_start_and_stop() {
        let arr = json!([0, 1, 2, 3, 4]);
        assert_eq!(indices(&arr, Some(-3), Some(-1), None), vec![2, 3]);
    }

    #[test]
    fn slice_with_extreme_bounds() {
        let arr = json!([0, 1, 2]);
        assert_eq!(
            indices(&arr, Some(i64::MIN), Some(i64::MAX), None),
            vec![0, 1, 2]
        );
        assert_eq!(
            indices(&arr, Some(i64::MAX), Some(i64::MIN), Some(-1)),
            vec![2, 1, 0]
        );
    }

    #[test]
    fn slice_of_empty_array() {
        let arr = json!([]);
        assert_eq!(indices(&arr, None, None, None), Vec::<usize>::new());
    }

    #[test]
    fn norm_index_in_bounds() {
        assert_eq!(norm_index(0, 3), Some(0));
        assert_eq!(norm_index(2, 3), Some(2));
        assert_eq!(norm_index(-1, 3), Some(2));
        assert_eq!(norm_index(-3, 3), Some(0));
    }

    #[test]
    fn norm_index_out_of_bounds() {
        assert_eq!(norm_index(3, 3), None);
        assert_eq!(norm_index(-4, 3), None);
        assert_eq!(norm_index(i64::MIN, 3), None);
    }
}
