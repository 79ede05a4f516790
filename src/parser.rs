//! A recursive descent parser for RFC 9535 JSONPath expressions.
//!
//! Filter expressions are parsed by precedence climbing with one token of
//! lookahead. Function calls are checked for well-typedness while the tree
//! is built, so a successfully parsed query can't fail a type check at
//! evaluation time.
use std::{iter::Peekable, vec::IntoIter};

use crate::{
    env::Environment,
    errors::JSONPathError,
    filter::{ComparisonOperator, FilterExpression, FilterExpressionType, LogicalOperator},
    function::{ExpressionType, FunctionExtension, FunctionSignature},
    lexer::lex,
    query::Query,
    segment::Segment,
    selector::Selector,
    token::{Token, TokenType},
    unescape::unescape_string,
};

use TokenType::*;

const EOQ_TOKEN: Token = Token {
    kind: Eoq,
    span: (0, 0),
};

type Tokens = Peekable<IntoIter<Token>>;

const PRECEDENCE_LOWEST: u8 = 1;
const PRECEDENCE_LOGICAL_OR: u8 = 3;
const PRECEDENCE_LOGICAL_AND: u8 = 4;
const PRECEDENCE_RELATIONAL: u8 = 5;
const PRECEDENCE_LOGICAL_NOT: u8 = 7;

pub struct Parser {
    pub env: Environment,
}

impl Parser {
    /// A parser with the standard environment.
    pub fn new() -> Self {
        Parser {
            env: Environment::standard(),
        }
    }

    pub fn with_environment(env: Environment) -> Self {
        Parser { env }
    }

    /// Register a function extension, making it available to subsequently
    /// parsed queries.
    pub fn add_function(&mut self, name: &str, ext: Box<dyn FunctionExtension + Send + Sync>) {
        self.env.add_function(name, ext);
    }

    pub fn parse(&self, expr: &str) -> Result<Query, JSONPathError> {
        let tokens = lex(expr)?;
        let mut it = tokens.into_iter().peekable();

        match it.next().unwrap_or(EOQ_TOKEN) {
            Token { kind: Root, .. } => {
                let segments = self.parse_segments(&mut it)?;
                // parse_segments should have consumed all tokens
                match it.next() {
                    Some(Token { kind: Eoq, .. }) | None => Ok(Query::new(segments)),
                    Some(token) => Err(JSONPathError::syntax(
                        format!("expected end of query, found {}", token.kind),
                        token.span,
                    )),
                }
            }
            token => Err(JSONPathError::syntax(
                format!("expected '$', found {}", token.kind),
                token.span,
            )),
        }
    }

    fn parse_segments(&self, it: &mut Tokens) -> Result<Vec<Segment>, JSONPathError> {
        let mut segments: Vec<Segment> = Vec::new();
        loop {
            match it.peek().unwrap_or(&EOQ_TOKEN).kind {
                DoubleDot => {
                    let token = it.next().unwrap();
                    let selectors = self.parse_selectors(it)?;
                    segments.push(Segment::Recursive { token, selectors });
                }
                LBracket | Name { .. } | Wild => {
                    let token = (*it.peek().unwrap()).clone();
                    let selectors = self.parse_selectors(it)?;
                    segments.push(Segment::Child { token, selectors });
                }
                _ => {
                    break;
                }
            }
        }

        Ok(segments)
    }

    fn parse_selectors(&self, it: &mut Tokens) -> Result<Vec<Selector>, JSONPathError> {
        match it.peek().unwrap_or(&EOQ_TOKEN) {
            Token {
                kind: Name { value },
                ..
            } => {
                // shorthand names can't contain escape sequences
                let name = value.to_string();
                let token = it.next().unwrap();
                Ok(vec![Selector::Name { token, name }])
            }
            Token { kind: Wild, .. } => Ok(vec![Selector::Wild {
                token: it.next().unwrap(),
            }]),
            Token { kind: LBracket, .. } => self.parse_bracketed(it),
            _ => Ok(Vec::new()),
        }
    }

    fn parse_bracketed(&self, it: &mut Tokens) -> Result<Vec<Selector>, JSONPathError> {
        #[cfg(debug_assertions)]
        debug_assert!(
            matches!(it.peek(), Some(Token { kind: LBracket, .. })),
            "expected the start of a bracketed selection"
        );

        let lbracket = it.next().unwrap();
        let mut selectors: Vec<Selector> = Vec::new();

        loop {
            match it.peek().unwrap_or(&EOQ_TOKEN) {
                Token { kind: RBracket, .. } => {
                    it.next();
                    break;
                }
                Token {
                    kind: Index { .. } | Colon,
                    ..
                } => {
                    let selector = self.parse_slice_or_index(it)?;
                    selectors.push(selector);
                }
                Token {
                    kind: DoubleQuoteString { value },
                    span,
                } => {
                    let name = unescape_string(value, '"', *span)?;
                    let token = it.next().unwrap();
                    selectors.push(Selector::Name { token, name });
                }
                Token {
                    kind: SingleQuoteString { value },
                    span,
                } => {
                    let name = unescape_string(value, '\'', *span)?;
                    let token = it.next().unwrap();
                    selectors.push(Selector::Name { token, name });
                }
                Token { kind: Wild, .. } => {
                    let token = it.next().unwrap();
                    selectors.push(Selector::Wild { token });
                }
                Token { kind: Filter, .. } => {
                    let selector = self.parse_filter(it)?;
                    selectors.push(selector);
                }
                Token { kind: Eoq, .. } => {
                    return Err(JSONPathError::syntax(
                        String::from("unexpected end of query"),
                        lbracket.span,
                    ));
                }
                token => {
                    return Err(JSONPathError::syntax(
                        format!("unexpected selector token {}", token.kind),
                        token.span,
                    ));
                }
            }

            // expect a comma or closing bracket
            match it.peek() {
                Some(Token { kind: RBracket, .. }) | None => continue,
                Some(Token { kind: Comma, .. }) => {
                    let comma = it.next().unwrap();
                    if matches!(it.peek().unwrap_or(&EOQ_TOKEN).kind, RBracket | Eoq) {
                        return Err(JSONPathError::syntax(
                            String::from("unexpected trailing comma"),
                            comma.span,
                        ));
                    }
                }
                Some(token) => {
                    return Err(JSONPathError::syntax(
                        format!("expected a comma or closing bracket, found {}", token.kind),
                        token.span,
                    ));
                }
            }
        }

        if selectors.is_empty() {
            return Err(JSONPathError::syntax(
                String::from("empty bracketed selection"),
                lbracket.span,
            ));
        }

        Ok(selectors)
    }

    fn parse_slice_or_index(&self, it: &mut Tokens) -> Result<Selector, JSONPathError> {
        let token = it.next().unwrap(); // index or colon

        #[cfg(debug_assertions)]
        debug_assert!(
            matches!(
                token,
                Token {
                    kind: Colon | Index { .. },
                    ..
                }
            ),
            "expected an index or slice"
        );

        if token.kind == Colon || it.peek().unwrap_or(&EOQ_TOKEN).kind == Colon {
            // a slice
            let mut start: Option<i64> = None;
            let mut stop: Option<i64> = None;
            let mut step: Option<i64> = None;

            // 1: or :
            if let Token {
                kind: Index { value },
                span,
            } = &token
            {
                start = Some(self.parse_i_json_int(value, *span)?);
                it.next(); // eat colon
            }

            // 1 or 1: or : or ]
            if matches!(it.peek().unwrap_or(&EOQ_TOKEN).kind, Index { .. } | Colon) {
                if let Token {
                    kind: Index { ref value },
                    span,
                } = it.next().unwrap()
                {
                    stop = Some(self.parse_i_json_int(value, span)?);
                    if it.peek().unwrap_or(&EOQ_TOKEN).kind == Colon {
                        it.next(); // eat colon
                    }
                }
            }

            // 1 or ]
            if matches!(it.peek().unwrap_or(&EOQ_TOKEN).kind, Index { .. }) {
                if let Token {
                    kind: Index { ref value },
                    span,
                } = it.next().unwrap()
                {
                    step = Some(self.parse_i_json_int(value, span)?);
                }
            }

            Ok(Selector::Slice {
                token,
                start,
                stop,
                step,
            })
        } else {
            // an index
            match token {
                Token {
                    kind: Index { ref value },
                    span,
                } => {
                    let index = self.parse_i_json_int(value, span)?;
                    Ok(Selector::Index { token, index })
                }
                tok => Err(JSONPathError::syntax(
                    format!("expected an index, found {}", tok.kind),
                    tok.span,
                )),
            }
        }
    }

    fn parse_filter(&self, it: &mut Tokens) -> Result<Selector, JSONPathError> {
        #[cfg(debug_assertions)]
        debug_assert!(
            matches!(it.peek(), Some(Token { kind: Filter, .. })),
            "expected a filter"
        );

        let token = it.next().unwrap();
        let expr = self.parse_filter_expression(it, PRECEDENCE_LOWEST)?;
        self.assert_compared(&expr)?;

        if expr.is_literal() {
            return Err(JSONPathError::typ(
                String::from("filter expression literals must be compared"),
                expr.token.span,
            ));
        }

        Ok(Selector::Filter {
            token,
            expression: Box::new(expr),
        })
    }

    fn parse_not_expression(&self, it: &mut Tokens) -> Result<FilterExpression, JSONPathError> {
        let token = it.next().unwrap();
        let expr = self.parse_filter_expression(it, PRECEDENCE_LOGICAL_NOT)?;

        if expr.is_literal() {
            return Err(JSONPathError::typ(
                String::from("filter expression literals must be compared"),
                expr.token.span,
            ));
        }

        Ok(FilterExpression::new(
            token,
            FilterExpressionType::Not {
                expression: Box::new(expr),
            },
        ))
    }

    fn parse_infix_expression(
        &self,
        it: &mut Tokens,
        left: FilterExpression,
    ) -> Result<FilterExpression, JSONPathError> {
        let token = it.next().unwrap();
        let precedence = self.precedence(&token.kind);
        let right = self.parse_filter_expression(it, precedence)?;

        match token.kind {
            And | Or => {
                for expr in [&left, &right] {
                    if expr.is_literal() {
                        return Err(JSONPathError::typ(
                            String::from("filter expression literals must be compared"),
                            expr.token.span,
                        ));
                    }
                    self.assert_compared(expr)?;
                }

                let operator = if token.kind == And {
                    LogicalOperator::And
                } else {
                    LogicalOperator::Or
                };

                Ok(FilterExpression::new(
                    token,
                    FilterExpressionType::Logical {
                        left: Box::new(left),
                        operator,
                        right: Box::new(right),
                    },
                ))
            }
            Eq | Ge | Gt | Le | Lt | Ne => {
                self.assert_comparable(&left)?;
                self.assert_comparable(&right)?;

                let operator = match token.kind {
                    Eq => ComparisonOperator::Eq,
                    Ge => ComparisonOperator::Ge,
                    Gt => ComparisonOperator::Gt,
                    Le => ComparisonOperator::Le,
                    Lt => ComparisonOperator::Lt,
                    _ => ComparisonOperator::Ne,
                };

                Ok(FilterExpression::new(
                    token,
                    FilterExpressionType::Comparison {
                        left: Box::new(left),
                        operator,
                        right: Box::new(right),
                    },
                ))
            }
            _ => Err(JSONPathError::syntax(
                format!("unexpected infix operator {}", token.kind),
                token.span,
            )),
        }
    }

    fn parse_grouped_expression(&self, it: &mut Tokens) -> Result<FilterExpression, JSONPathError> {
        let lparen = it.next().unwrap();
        let expr = self.parse_filter_expression(it, PRECEDENCE_LOWEST)?;

        match it.peek().unwrap_or(&EOQ_TOKEN) {
            Token { kind: RParen, .. } => {
                it.next(); // eat closing paren
                Ok(expr)
            }
            _ => Err(JSONPathError::syntax(
                String::from("unbalanced parentheses"),
                lparen.span,
            )),
        }
    }

    fn parse_basic_expression(&self, it: &mut Tokens) -> Result<FilterExpression, JSONPathError> {
        match it.peek().unwrap_or(&EOQ_TOKEN) {
            Token {
                kind: DoubleQuoteString { value },
                span,
            } => {
                let value = unescape_string(value, '"', *span)?;
                let token = it.next().unwrap();
                Ok(FilterExpression::new(
                    token,
                    FilterExpressionType::String { value },
                ))
            }
            Token {
                kind: SingleQuoteString { value },
                span,
            } => {
                let value = unescape_string(value, '\'', *span)?;
                let token = it.next().unwrap();
                Ok(FilterExpression::new(
                    token,
                    FilterExpressionType::String { value },
                ))
            }
            Token { kind: False, .. } => {
                let token = it.next().unwrap();
                Ok(FilterExpression::new(token, FilterExpressionType::False))
            }
            Token { kind: True, .. } => {
                let token = it.next().unwrap();
                Ok(FilterExpression::new(token, FilterExpressionType::True))
            }
            Token { kind: Null, .. } => {
                let token = it.next().unwrap();
                Ok(FilterExpression::new(token, FilterExpressionType::Null))
            }
            Token {
                kind: Int { value },
                span,
            } => {
                validate_number_literal(value, *span)?;
                let i = value.parse::<f64>().map_err(|_| {
                    JSONPathError::syntax(String::from("invalid integer literal"), *span)
                })? as i64;

                if !self.env.index_range.contains(&i) {
                    return Err(JSONPathError::syntax(
                        format!("integer literal out of range `{}`", value),
                        *span,
                    ));
                }

                let token = it.next().unwrap();
                Ok(FilterExpression::new(
                    token,
                    FilterExpressionType::Int { value: i },
                ))
            }
            Token {
                kind: Float { value },
                span,
            } => {
                validate_number_literal(value, *span)?;
                let f = value.parse::<f64>().map_err(|_| {
                    JSONPathError::syntax(String::from("invalid float literal"), *span)
                })?;
                let token = it.next().unwrap();
                Ok(FilterExpression::new(
                    token,
                    FilterExpressionType::Float { value: f },
                ))
            }
            Token {
                kind: Function { .. },
                ..
            } => self.parse_function_call(it),
            Token { kind: Root, .. } => {
                let token = it.next().unwrap();
                let segments = self.parse_segments(it)?;
                Ok(FilterExpression::new(
                    token,
                    FilterExpressionType::RootQuery {
                        query: Box::new(Query::new(segments)),
                    },
                ))
            }
            Token { kind: Current, .. } => {
                let token = it.next().unwrap();
                let segments = self.parse_segments(it)?;
                Ok(FilterExpression::new(
                    token,
                    FilterExpressionType::RelativeQuery {
                        query: Box::new(Query::new(segments)),
                    },
                ))
            }
            Token { kind: LParen, .. } => self.parse_grouped_expression(it),
            Token { kind: Not, .. } => self.parse_not_expression(it),
            Token {
                kind: RParen, span, ..
            } => Err(JSONPathError::syntax(
                String::from("expected a filter expression"),
                *span,
            )),
            Token { kind, span } => Err(JSONPathError::syntax(
                format!("unexpected basic expression token {}", kind),
                *span,
            )),
        }
    }

    fn parse_function_call(&self, it: &mut Tokens) -> Result<FilterExpression, JSONPathError> {
        let token = it.next().unwrap();
        let mut arguments: Vec<FilterExpression> = Vec::new();

        while it.peek().unwrap_or(&EOQ_TOKEN).kind != RParen {
            let mut expr = self.parse_basic_expression(it)?;

            while matches!(
                it.peek().unwrap_or(&EOQ_TOKEN).kind,
                Eq | Ge | Gt | Le | Lt | Ne | And | Or
            ) {
                expr = self.parse_infix_expression(it, expr)?
            }

            arguments.push(expr);

            match it.peek().unwrap_or(&EOQ_TOKEN) {
                Token { kind: RParen, .. } => {
                    break;
                }
                Token { kind: Comma, .. } => {
                    it.next(); // eat comma
                }
                tok => {
                    return Err(JSONPathError::syntax(
                        format!("expected a comma or closing parenthesis, found {}", tok.kind),
                        tok.span,
                    ));
                }
            }
        }

        it.next(); // eat closing paren

        if let Function { ref name } = token.kind {
            let function_name = name.to_string();
            self.assert_well_typed(&function_name, &arguments, token.span)?;
            Ok(FilterExpression::new(
                token,
                FilterExpressionType::Function {
                    name: function_name,
                    args: arguments,
                },
            ))
        } else {
            Err(JSONPathError::syntax(
                format!("expected a function call, found {}", token.kind),
                token.span,
            ))
        }
    }

    fn parse_filter_expression(
        &self,
        it: &mut Tokens,
        precedence: u8,
    ) -> Result<FilterExpression, JSONPathError> {
        let mut left = self.parse_basic_expression(it)?;

        loop {
            let stop = match it.peek() {
                Some(Token { kind, .. }) => {
                    matches!(kind, Eoq | RBracket)
                        || self.precedence(kind) < precedence
                        || !matches!(kind, Eq | Ge | Gt | Le | Lt | Ne | And | Or)
                }
                None => true,
            };

            if stop {
                break;
            }

            left = self.parse_infix_expression(it, left)?;
        }

        Ok(left)
    }

    fn precedence(&self, kind: &TokenType) -> u8 {
        match kind {
            And => PRECEDENCE_LOGICAL_AND,
            Or => PRECEDENCE_LOGICAL_OR,
            Eq | Ge | Gt | Le | Lt | Ne => PRECEDENCE_RELATIONAL,
            _ => PRECEDENCE_LOWEST,
        }
    }

    fn parse_i_json_int(&self, value: &str, span: (usize, usize)) -> Result<i64, JSONPathError> {
        if value.len() > 1 && (value.starts_with('0') || value.starts_with("-0")) {
            return Err(JSONPathError::syntax(
                format!("invalid index `{}`", value),
                span,
            ));
        }

        let i = value.parse::<i64>().map_err(|_| {
            JSONPathError::syntax(format!("index out of range `{}`", value), span)
        })?;

        if !self.env.index_range.contains(&i) {
            return Err(JSONPathError::syntax(
                format!("index out of range `{}`", value),
                span,
            ));
        }

        Ok(i)
    }

    fn assert_comparable(&self, expr: &FilterExpression) -> Result<(), JSONPathError> {
        match &expr.kind {
            FilterExpressionType::RelativeQuery { query }
            | FilterExpressionType::RootQuery { query } => {
                if !query.is_singular() {
                    Err(JSONPathError::typ(
                        String::from("non-singular query is not comparable"),
                        expr.token.span,
                    ))
                } else {
                    Ok(())
                }
            }
            FilterExpressionType::Function { name, .. } => {
                if let Some(FunctionSignature {
                    return_type: ExpressionType::Value,
                    ..
                }) = self.env.signature(name)
                {
                    Ok(())
                } else {
                    Err(JSONPathError::typ(
                        format!("result of {}() is not comparable", name),
                        expr.token.span,
                    ))
                }
            }
            FilterExpressionType::Logical { .. }
            | FilterExpressionType::Comparison { .. }
            | FilterExpressionType::Not { .. } => Err(JSONPathError::typ(
                String::from("expression is not comparable"),
                expr.token.span,
            )),
            _ => Ok(()),
        }
    }

    fn assert_compared(&self, expr: &FilterExpression) -> Result<(), JSONPathError> {
        match &expr.kind {
            FilterExpressionType::Function { name, .. } => {
                if let Some(FunctionSignature {
                    return_type: ExpressionType::Value,
                    ..
                }) = self.env.signature(name)
                {
                    Err(JSONPathError::typ(
                        format!("result of {}() must be compared", name),
                        expr.token.span,
                    ))
                } else {
                    Ok(())
                }
            }
            _ => Ok(()),
        }
    }

    fn assert_well_typed(
        &self,
        func_name: &str,
        args: &[FilterExpression],
        span: (usize, usize),
    ) -> Result<(), JSONPathError> {
        let signature = self.env.signature(func_name).ok_or_else(|| {
            JSONPathError::name(format!("unknown function `{}`", func_name), span)
        })?;

        // correct number of arguments?
        if args.len() != signature.param_types.len() {
            return Err(JSONPathError::typ(
                format!(
                    "{}() takes {} argument{} but {} were given",
                    func_name,
                    signature.param_types.len(),
                    if signature.param_types.len() > 1 {
                        "s"
                    } else {
                        ""
                    },
                    args.len()
                ),
                span,
            ));
        }

        // correct argument types?
        for (idx, typ) in signature.param_types.iter().enumerate() {
            let arg = &args[idx];
            match typ {
                ExpressionType::Value => {
                    if !self.is_value_type(arg) {
                        return Err(JSONPathError::typ(
                            format!(
                                "argument {} of {}() must be of a 'Value' type",
                                idx + 1,
                                func_name
                            ),
                            arg.token.span,
                        ));
                    }
                }
                ExpressionType::Logical => {
                    if !self.is_logical_type(arg) {
                        return Err(JSONPathError::typ(
                            format!(
                                "argument {} of {}() must be of a 'Logical' type",
                                idx + 1,
                                func_name
                            ),
                            arg.token.span,
                        ));
                    }
                }
                ExpressionType::Nodes => {
                    if !self.is_nodes_type(arg) {
                        return Err(JSONPathError::typ(
                            format!(
                                "argument {} of {}() must be of a 'Nodes' type",
                                idx + 1,
                                func_name
                            ),
                            arg.token.span,
                        ));
                    }
                }
            }
        }

        Ok(())
    }

    fn is_value_type(&self, expr: &FilterExpression) -> bool {
        // literals are values
        if expr.is_literal() {
            return true;
        }

        match &expr.kind {
            FilterExpressionType::RelativeQuery { query }
            | FilterExpressionType::RootQuery { query } => {
                // singular queries will be coerced to a value
                query.is_singular()
            }
            FilterExpressionType::Function { name, .. } => {
                // some functions return a value
                matches!(
                    self.env.signature(name),
                    Some(FunctionSignature {
                        return_type: ExpressionType::Value,
                        ..
                    })
                )
            }
            _ => false,
        }
    }

    fn is_logical_type(&self, expr: &FilterExpression) -> bool {
        match &expr.kind {
            FilterExpressionType::RelativeQuery { .. }
            | FilterExpressionType::RootQuery { .. }
            | FilterExpressionType::Logical { .. }
            | FilterExpressionType::Comparison { .. }
            | FilterExpressionType::Not { .. } => true,
            FilterExpressionType::Function { name, .. } => {
                // a nodelist result converts to a logical
                matches!(
                    self.env.signature(name),
                    Some(FunctionSignature {
                        return_type: ExpressionType::Logical | ExpressionType::Nodes,
                        ..
                    })
                )
            }
            _ => false,
        }
    }

    fn is_nodes_type(&self, expr: &FilterExpression) -> bool {
        match &expr.kind {
            FilterExpressionType::RelativeQuery { .. } | FilterExpressionType::RootQuery { .. } => {
                true
            }
            FilterExpressionType::Function { name, .. } => {
                matches!(
                    self.env.signature(name),
                    Some(FunctionSignature {
                        return_type: ExpressionType::Nodes,
                        ..
                    })
                )
            }
            _ => false,
        }
    }
}

impl Default for Parser {
    fn default() -> Self {
        Self::new()
    }
}

/// Reject number literals with a leading zero in the integer part. `-0` on
/// its own is allowed, per the RFC 9535 `number` grammar.
fn validate_number_literal(value: &str, span: (usize, usize)) -> Result<(), JSONPathError> {
    let digits = value.strip_prefix('-').unwrap_or(value);
    let int_part = digits
        .split(['.', 'e', 'E'])
        .next()
        .unwrap_or(digits);

    if int_part.len() > 1 && int_part.starts_with('0') {
        return Err(JSONPathError::syntax(
            format!("invalid number literal `{}`", value),
            span,
        ));
    }

    Ok(())
}
