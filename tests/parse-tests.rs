use jsonpath_core::Query;

macro_rules! assert_valid {
    ($($name:ident: $value:expr,)*) => {
        mod valid {
            use super::*;
            $(
                #[allow(non_snake_case)]
                #[test]
                fn $name() {
                    assert!(Query::standard($value).is_ok(), "{} did not parse", $value);
                }
            )*
        }
    }
}

macro_rules! assert_invalid {
    ($($name:ident: $value:expr,)*) => {
        mod invalid {
            use super::*;
            $(
                #[allow(non_snake_case)]
                #[test]
                fn $name() {
                    assert!(Query::standard($value).is_err(), "{} did not fail", $value);
                }
            )*
        }
    }
}

assert_valid! {
    just_root: "$",
    shorthand_name: "$.foo",
    shorthand_names: "$.foo.bar.baz",
    shorthand_wild: "$.*",
    unicode_shorthand_name: "$.☺",
    bracketed_single_quoted_name: "$['foo']",
    bracketed_double_quoted_name: "$[\"foo\"]",
    bracketed_name_with_escapes: "$[\"\\u263A\"]",
    bracketed_name_surrogate_pair: "$[\"\\uD83D\\uDE00\"]",
    bracketed_wild: "$[*]",
    index: "$[1]",
    negative_index: "$[-1]",
    index_zero: "$[0]",
    slice_start_stop: "$[1:3]",
    slice_open_stop: "$[1:]",
    slice_open_start: "$[:3]",
    slice_all: "$[:]",
    slice_with_step: "$[1:9:2]",
    slice_negative_step: "$[::-1]",
    slice_with_whitespace: "$[1 : 3 : 2]",
    union_of_names: "$['a', 'b']",
    union_of_mixed_selectors: "$['a', 1, *, 1:3, ?@.b]",
    duplicate_selectors: "$['a', 'a']",
    recursive_shorthand: "$..foo",
    recursive_wild: "$..*",
    recursive_bracketed: "$..['foo']",
    recursive_index: "$..[0]",
    filter_existence: "$[?@.foo]",
    filter_root_query_existence: "$[?$.foo]",
    filter_comparison_eq: "$[?@.foo == 42]",
    filter_comparison_mixed_sides: "$[?@.foo == $.bar]",
    filter_comparison_negative_zero: "$[?@.foo == -0]",
    filter_comparison_float_exponent: "$[?@.foo == 4.2e1]",
    filter_comparison_int_exponent: "$[?@.foo == 4e2]",
    filter_null_literal: "$[?@.foo == null]",
    filter_not: "$[?!@.foo]",
    filter_grouped: "$[?(@.foo || @.bar) && @.baz]",
    filter_precedence: "$[?@.a || @.b && @.c]",
    filter_nested: "$[?@[?@>1]]",
    filter_current_alone: "$[?@ > 1]",
    filter_function_match: "$[?match(@.a, 'a.*')]",
    filter_function_search: "$[?search(@.a, 'b')]",
    filter_function_count: "$[?count(@.*) > 1]",
    filter_function_length_on_root_query: "$[?length($.foo) == 3]",
    filter_function_value: "$[?value(@..color) == 'red']",
    filter_two_filters: "$[?@.a, ?@.b]",
    filter_with_whitespace: "$[? @.a == 1 ]",
    whitespace_between_segments: "$ .foo [0]",
    deeply_nested: "$.a[0].b[?@.c[1:3]]..d",
}

assert_invalid! {
    empty_string: "",
    no_root: "foo.bar",
    bald_root_name: "$foo",
    trailing_whitespace: "$.foo ",
    whitespace_after_dot: "$. foo",
    numeric_shorthand: "$.5",
    trailing_dot: "$.",
    lone_recursive_descent: "$..",
    triple_dot: "$...foo",
    empty_brackets: "$[]",
    unclosed_brackets: "$[1, 3",
    trailing_comma: "$[1,]",
    leading_comma: "$[,1]",
    missing_comma: "$['a' 'b']",
    leading_zero_index: "$[01]",
    negative_zero_index: "$[-0]",
    leading_zero_slice_start: "$[01:3]",
    index_out_of_interoperable_range: "$[9007199254740992]",
    slice_with_too_many_colons: "$[1:2:3:4]",
    unclosed_string: "$['foo",
    invalid_escape: "$['\\x']",
    lone_high_surrogate: "$[\"\\uD83D\"]",
    filter_without_expression: "$[?]",
    filter_empty_parens: "$[?()]",
    filter_unbalanced_parens: "$[?((@.foo)]",
    filter_single_equals: "$[?@.foo = 42]",
    filter_single_ampersand: "$[?@.a & @.b]",
    filter_single_pipe: "$[?@.a | @.b]",
    filter_uncompared_literal: "$[?true]",
    filter_negated_literal: "$[?!true]",
    filter_literal_in_logical: "$[?@.a && true]",
    filter_non_singular_comparison_wild: "$[?@.* == 1]",
    filter_non_singular_comparison_slice: "$[?@[0:1] == 1]",
    filter_non_singular_comparison_descendant: "$[?@..a == 1]",
    filter_chained_comparison: "$[?1 < 2 < 3]",
    filter_leading_zero_int_literal: "$[?@.a == 01]",
    filter_unknown_function: "$[?nosuchthing(@.a)]",
    filter_function_missing_comma: "$[?count(@.a @.b) == 1]",
    function_with_whitespace_before_parens: "$[?count (@.a) == 1]",
    keyword_without_word_boundary: "$[?truex]",
}
