//! Expression parsing implementation
//!
//! One method per precedence level, lowest first:
//! assignment → conditional → `|| ??` → `&&` → `|` → `^` → `&` → equality →
//! relational → shift → additive → multiplicative → `**` → unary → postfix →
//! call/member → primary.
//!
//! Arrow functions are recognised at the assignment level by looking ahead
//! for `=>` after an identifier or a parenthesised parameter list.

use crate::parser::ast::*;
use crate::parser::lexer::TokenKind;
use crate::parser::parse::{ParseError, Parser};
use std::sync::Arc;

type Level = fn(&mut Parser) -> Result<Expression, ParseError>;

impl Parser {
    /// Parse expression (top-level entry point)
    pub(crate) fn parse_expression(&mut self) -> Result<Expression, ParseError> {
        self.parse_assignment()
    }

    /// Parse assignment, arrow function, or conditional (right-associative)
    pub(crate) fn parse_assignment(&mut self) -> Result<Expression, ParseError> {
        self.nested(Self::parse_assignment_level)
    }

    fn parse_assignment_level(&mut self) -> Result<Expression, ParseError> {
        if let Some(is_async) = self.arrow_ahead() {
            return self.parse_arrow_function(is_async);
        }

        let target = self.parse_conditional()?;

        let op = match self.peek().kind {
            TokenKind::Eq => AssignOp::Assign,
            TokenKind::PlusEq => AssignOp::Compound(BinOp::Add),
            TokenKind::MinusEq => AssignOp::Compound(BinOp::Sub),
            TokenKind::StarEq => AssignOp::Compound(BinOp::Mul),
            TokenKind::SlashEq => AssignOp::Compound(BinOp::Div),
            TokenKind::PercentEq => AssignOp::Compound(BinOp::Mod),
            TokenKind::StarStarEq => AssignOp::Compound(BinOp::Exp),
            TokenKind::AmpEq => AssignOp::Compound(BinOp::BitAnd),
            TokenKind::PipeEq => AssignOp::Compound(BinOp::BitOr),
            TokenKind::CaretEq => AssignOp::Compound(BinOp::BitXor),
            TokenKind::LtLtEq => AssignOp::Compound(BinOp::Shl),
            TokenKind::GtGtEq => AssignOp::Compound(BinOp::Shr),
            TokenKind::GtGtGtEq => AssignOp::Compound(BinOp::UShr),
            _ => return Ok(target),
        };

        if !matches!(
            target,
            Expression::Identifier { .. } | Expression::Member { .. }
        ) {
            return Err(ParseError::at(
                "Invalid left-hand side in assignment",
                target.location(),
            ));
        }

        self.advance(); // consume operator
        let value = self.parse_assignment()?;
        let location = target.location().to(value.location());

        Ok(Expression::Assign {
            op,
            target: Box::new(target),
            value: Box::new(value),
            location,
        })
    }

    /// Parse ternary: test ? consequent : alternate
    fn parse_conditional(&mut self) -> Result<Expression, ParseError> {
        let test = self.parse_logical_or()?;

        if !self.match_token(&TokenKind::Question) {
            return Ok(test);
        }

        let consequent = self.parse_assignment()?;
        self.expect_token(&TokenKind::Colon, "in conditional expression")?;
        let alternate = self.parse_assignment()?;
        let location = test.location().to(alternate.location());

        Ok(Expression::Conditional {
            test: Box::new(test),
            consequent: Box::new(consequent),
            alternate: Box::new(alternate),
            location,
        })
    }

    /// Parse logical OR (||) and nullish coalescing (??)
    fn parse_logical_or(&mut self) -> Result<Expression, ParseError> {
        let mut left = self.parse_logical_and()?;

        loop {
            let op = match self.peek().kind {
                TokenKind::OrOr => LogicalOp::Or,
                TokenKind::QuestionQuestion => LogicalOp::Nullish,
                _ => break,
            };
            self.advance();
            let right = self.parse_logical_and()?;
            left = Self::logical(op, left, right);
        }

        Ok(left)
    }

    /// Parse logical AND (&&)
    fn parse_logical_and(&mut self) -> Result<Expression, ParseError> {
        let mut left = self.parse_bitwise_or()?;

        while self.match_token(&TokenKind::AndAnd) {
            let right = self.parse_bitwise_or()?;
            left = Self::logical(LogicalOp::And, left, right);
        }

        Ok(left)
    }

    fn parse_bitwise_or(&mut self) -> Result<Expression, ParseError> {
        self.parse_binary_level(Self::parse_bitwise_xor, &[(TokenKind::Pipe, BinOp::BitOr)])
    }

    fn parse_bitwise_xor(&mut self) -> Result<Expression, ParseError> {
        self.parse_binary_level(
            Self::parse_bitwise_and,
            &[(TokenKind::Caret, BinOp::BitXor)],
        )
    }

    fn parse_bitwise_and(&mut self) -> Result<Expression, ParseError> {
        self.parse_binary_level(Self::parse_equality, &[(TokenKind::Amp, BinOp::BitAnd)])
    }

    fn parse_equality(&mut self) -> Result<Expression, ParseError> {
        self.parse_binary_level(
            Self::parse_relational,
            &[
                (TokenKind::EqEqEq, BinOp::StrictEq),
                (TokenKind::NotEqEq, BinOp::StrictNe),
                (TokenKind::EqEq, BinOp::LooseEq),
                (TokenKind::NotEq, BinOp::LooseNe),
            ],
        )
    }

    fn parse_relational(&mut self) -> Result<Expression, ParseError> {
        self.parse_binary_level(
            Self::parse_shift,
            &[
                (TokenKind::Lt, BinOp::Lt),
                (TokenKind::Le, BinOp::Le),
                (TokenKind::Gt, BinOp::Gt),
                (TokenKind::Ge, BinOp::Ge),
            ],
        )
    }

    fn parse_shift(&mut self) -> Result<Expression, ParseError> {
        self.parse_binary_level(
            Self::parse_additive,
            &[
                (TokenKind::LtLt, BinOp::Shl),
                (TokenKind::GtGt, BinOp::Shr),
                (TokenKind::GtGtGt, BinOp::UShr),
            ],
        )
    }

    fn parse_additive(&mut self) -> Result<Expression, ParseError> {
        self.parse_binary_level(
            Self::parse_multiplicative,
            &[(TokenKind::Plus, BinOp::Add), (TokenKind::Minus, BinOp::Sub)],
        )
    }

    fn parse_multiplicative(&mut self) -> Result<Expression, ParseError> {
        self.parse_binary_level(
            Self::parse_exponent,
            &[
                (TokenKind::Star, BinOp::Mul),
                (TokenKind::Slash, BinOp::Div),
                (TokenKind::Percent, BinOp::Mod),
            ],
        )
    }

    /// Parse exponent (**), right-associative
    fn parse_exponent(&mut self) -> Result<Expression, ParseError> {
        let base = self.parse_unary()?;

        if !self.match_token(&TokenKind::StarStar) {
            return Ok(base);
        }

        let exponent = self.parse_exponent()?;
        let location = base.location().to(exponent.location());
        Ok(Expression::Binary {
            op: BinOp::Exp,
            left: Box::new(base),
            right: Box::new(exponent),
            location,
        })
    }

    /// Left-associative binary level: `next (op next)*`
    fn parse_binary_level(
        &mut self,
        next: Level,
        ops: &[(TokenKind, BinOp)],
    ) -> Result<Expression, ParseError> {
        let mut left = next(self)?;

        while let Some(op) = ops
            .iter()
            .find(|(kind, _)| self.check(kind))
            .map(|(_, op)| *op)
        {
            self.advance();
            let right = next(self)?;
            let location = left.location().to(right.location());
            left = Expression::Binary {
                op,
                left: Box::new(left),
                right: Box::new(right),
                location,
            };
        }

        Ok(left)
    }

    fn logical(op: LogicalOp, left: Expression, right: Expression) -> Expression {
        let location = left.location().to(right.location());
        Expression::Logical {
            op,
            left: Box::new(left),
            right: Box::new(right),
            location,
        }
    }

    /// Parse unary (! - + ~ typeof await, prefix ++ --)
    fn parse_unary(&mut self) -> Result<Expression, ParseError> {
        let start = self.current_location();

        let op = match self.peek().kind {
            TokenKind::Bang => Some(UnaryOp::Not),
            TokenKind::Minus => Some(UnaryOp::Neg),
            TokenKind::Plus => Some(UnaryOp::Plus),
            TokenKind::Tilde => Some(UnaryOp::BitNot),
            TokenKind::Typeof => Some(UnaryOp::Typeof),
            _ => None,
        };
        if let Some(op) = op {
            self.advance();
            let argument = self.nested(Self::parse_unary)?;
            return Ok(Expression::Unary {
                op,
                location: start.to(argument.location()),
                argument: Box::new(argument),
            });
        }

        if self.match_token(&TokenKind::Await) {
            let argument = self.nested(Self::parse_unary)?;
            return Ok(Expression::Await {
                location: start.to(argument.location()),
                argument: Box::new(argument),
            });
        }

        let update = match self.peek().kind {
            TokenKind::PlusPlus => Some(UpdateOp::Increment),
            TokenKind::MinusMinus => Some(UpdateOp::Decrement),
            _ => None,
        };
        if let Some(op) = update {
            self.advance();
            let argument = self.nested(Self::parse_unary)?;
            Self::check_update_target(&argument)?;
            return Ok(Expression::Update {
                op,
                prefix: true,
                location: start.to(argument.location()),
                argument: Box::new(argument),
            });
        }

        self.parse_postfix()
    }

    /// Parse postfix ++ / -- (no line break allowed before the operator)
    fn parse_postfix(&mut self) -> Result<Expression, ParseError> {
        let expr = self.parse_call_member()?;

        let op = match self.peek().kind {
            TokenKind::PlusPlus if !self.peek().newline_before => UpdateOp::Increment,
            TokenKind::MinusMinus if !self.peek().newline_before => UpdateOp::Decrement,
            _ => return Ok(expr),
        };
        Self::check_update_target(&expr)?;
        self.advance();

        Ok(Expression::Update {
            op,
            prefix: false,
            location: self.span_from(expr.location()),
            argument: Box::new(expr),
        })
    }

    fn check_update_target(target: &Expression) -> Result<(), ParseError> {
        match target {
            Expression::Identifier { .. } | Expression::Member { .. } => Ok(()),
            other => Err(ParseError::at(
                "Invalid left-hand side expression in update operation",
                other.location(),
            )),
        }
    }

    /// Parse calls and member access chains: `a.b[c](d).e`
    fn parse_call_member(&mut self) -> Result<Expression, ParseError> {
        let mut expr = if self.check(&TokenKind::New) {
            self.parse_new()?
        } else {
            self.parse_primary()?
        };

        loop {
            let start = expr.location();
            if self.match_token(&TokenKind::Dot) {
                let name = self.expect_property_name()?;
                expr = Expression::Member {
                    object: Box::new(expr),
                    property: MemberProperty::Named(name),
                    location: self.span_from(start),
                };
            } else if self.match_token(&TokenKind::LBracket) {
                let index = self.parse_expression()?;
                self.expect_token(&TokenKind::RBracket, "after computed member")?;
                expr = Expression::Member {
                    object: Box::new(expr),
                    property: MemberProperty::Computed(Box::new(index)),
                    location: self.span_from(start),
                };
            } else if self.check(&TokenKind::LParen) {
                let arguments = self.parse_arguments()?;
                expr = Expression::Call {
                    callee: Box::new(expr),
                    arguments,
                    location: self.span_from(start),
                };
            } else {
                break;
            }
        }

        Ok(expr)
    }

    /// Parse `new Callee(args)`; the callee is a member chain without calls
    fn parse_new(&mut self) -> Result<Expression, ParseError> {
        let start = self.current_location();
        self.advance(); // consume 'new'

        let mut callee = if self.check(&TokenKind::New) {
            self.parse_new()?
        } else {
            self.parse_primary()?
        };
        loop {
            let callee_start = callee.location();
            if self.match_token(&TokenKind::Dot) {
                let name = self.expect_property_name()?;
                callee = Expression::Member {
                    object: Box::new(callee),
                    property: MemberProperty::Named(name),
                    location: self.span_from(callee_start),
                };
            } else if self.match_token(&TokenKind::LBracket) {
                let index = self.parse_expression()?;
                self.expect_token(&TokenKind::RBracket, "after computed member")?;
                callee = Expression::Member {
                    object: Box::new(callee),
                    property: MemberProperty::Computed(Box::new(index)),
                    location: self.span_from(callee_start),
                };
            } else {
                break;
            }
        }

        let arguments = if self.check(&TokenKind::LParen) {
            self.parse_arguments()?
        } else {
            Vec::new()
        };

        Ok(Expression::New {
            callee: Box::new(callee),
            arguments,
            location: self.span_from(start),
        })
    }

    /// Parse argument list: (expr, expr, ...)
    fn parse_arguments(&mut self) -> Result<Vec<Expression>, ParseError> {
        self.expect_lparen("to open argument list")?;
        let mut args = Vec::new();

        while !self.check(&TokenKind::RParen) {
            args.push(self.parse_assignment()?);
            if !self.match_token(&TokenKind::Comma) {
                break;
            }
        }

        self.expect_rparen("after arguments")?;
        Ok(args)
    }

    /// Parse primary (literals, identifiers, grouping, literals of arrays,
    /// objects and functions)
    fn parse_primary(&mut self) -> Result<Expression, ParseError> {
        let location = self.current_location();

        let expr = match self.peek().kind.clone() {
            TokenKind::Number(value) => Expression::Number { value, location },
            TokenKind::String(value) => Expression::String { value, location },
            TokenKind::Template { quasis, chunks } => {
                let depth = self.depth();
                let expressions = chunks
                    .iter()
                    .map(|chunk| Parser::parse_template_chunk(chunk, depth))
                    .collect::<Result<Vec<_>, _>>()?;
                Expression::Template {
                    quasis,
                    expressions,
                    location,
                }
            }
            TokenKind::True => Expression::Boolean {
                value: true,
                location,
            },
            TokenKind::False => Expression::Boolean {
                value: false,
                location,
            },
            TokenKind::Null => Expression::Null { location },
            TokenKind::This => Expression::This { location },
            TokenKind::Ident(name) => {
                if name == "async"
                    && matches!(self.peek_ahead(1), Some(t) if t.kind == TokenKind::Function)
                {
                    self.advance(); // consume 'async'
                    return self.parse_function_expression(true, location);
                }
                Expression::Identifier { name, location }
            }
            TokenKind::Function => {
                return self.parse_function_expression(false, location);
            }
            TokenKind::LParen => {
                self.advance();
                let expr = self.parse_expression()?;
                self.expect_rparen("after parenthesized expression")?;
                return Ok(expr);
            }
            TokenKind::LBracket => return self.parse_array_literal(),
            TokenKind::LBrace => return self.parse_object_literal(),
            _ => return Err(self.unexpected()),
        };

        self.advance();
        Ok(expr)
    }

    fn parse_array_literal(&mut self) -> Result<Expression, ParseError> {
        let start = self.current_location();
        self.advance(); // consume '['

        let mut elements = Vec::new();
        while !self.check(&TokenKind::RBracket) {
            if self.match_token(&TokenKind::Comma) {
                elements.push(None); // hole
                continue;
            }
            elements.push(Some(self.parse_assignment()?));
            if !self.match_token(&TokenKind::Comma) {
                break;
            }
        }
        self.expect_token(&TokenKind::RBracket, "to close array literal")?;

        Ok(Expression::Array {
            elements,
            location: self.span_from(start),
        })
    }

    fn parse_object_literal(&mut self) -> Result<Expression, ParseError> {
        let start = self.current_location();
        self.advance(); // consume '{'

        let mut properties = Vec::new();
        while !self.check(&TokenKind::RBrace) {
            let prop_start = self.current_location();
            let (key, shorthand_ok) = match self.peek().kind.clone() {
                TokenKind::String(s) => {
                    self.advance();
                    (s, false)
                }
                TokenKind::Number(n) => {
                    self.advance();
                    (crate::memory::value::number_to_string(n), false)
                }
                TokenKind::Ident(_) => (self.expect_property_name()?, true),
                _ => (self.expect_property_name()?, false),
            };

            let value = if self.check(&TokenKind::LParen) {
                let function = self.parse_function_rest(Some(key.clone()), false, prop_start)?;
                Expression::Function {
                    location: function.location,
                    function,
                }
            } else if self.match_token(&TokenKind::Colon) {
                self.parse_assignment()?
            } else if shorthand_ok {
                Expression::Identifier {
                    name: key.clone(),
                    location: prop_start,
                }
            } else {
                return Err(self.unexpected());
            };

            properties.push(Property {
                key,
                value,
                location: self.span_from(prop_start),
            });

            if !self.match_token(&TokenKind::Comma) {
                break;
            }
        }
        self.expect_rbrace("to close object literal")?;

        Ok(Expression::Object {
            properties,
            location: self.span_from(start),
        })
    }

    /// Parse `function [name](params) { body }` in expression position
    fn parse_function_expression(
        &mut self,
        is_async: bool,
        start: SourceLocation,
    ) -> Result<Expression, ParseError> {
        self.expect_token(&TokenKind::Function, "to start function expression")?;
        let name = match &self.peek().kind {
            TokenKind::Ident(_) => Some(self.expect_identifier()?),
            _ => None,
        };
        let function = self.parse_function_rest(name, is_async, start)?;

        Ok(Expression::Function {
            location: function.location,
            function,
        })
    }

    /// Parse the parameter list and block body shared by declarations,
    /// expressions, and object methods
    pub(crate) fn parse_function_rest(
        &mut self,
        name: Option<String>,
        is_async: bool,
        start: SourceLocation,
    ) -> Result<Arc<FunctionNode>, ParseError> {
        let params = self.parse_params()?;
        let body_start = self.current_location();
        let body = self.parse_block()?;

        Ok(Arc::new(FunctionNode {
            name,
            params,
            body: FunctionBody::Block(body),
            is_arrow: false,
            is_async,
            location: self.span_from(start),
            body_location: self.span_from(body_start),
        }))
    }

    /// Parse `(a, b = 1, c)`
    fn parse_params(&mut self) -> Result<Vec<Param>, ParseError> {
        self.expect_lparen("to open parameter list")?;
        let mut params = Vec::new();

        while !self.check(&TokenKind::RParen) {
            let name = self.expect_identifier()?;
            let default = if self.match_token(&TokenKind::Eq) {
                Some(self.parse_assignment()?)
            } else {
                None
            };
            params.push(Param { name, default });

            if !self.match_token(&TokenKind::Comma) {
                break;
            }
        }

        self.expect_rparen("after parameters")?;
        Ok(params)
    }

    /// If an arrow function starts at the current token, report whether it is async
    fn arrow_ahead(&self) -> Option<bool> {
        let is_async = self.check_ident("async")
            && matches!(
                self.peek_ahead(1),
                Some(t) if !t.newline_before
                    && matches!(t.kind, TokenKind::Ident(_) | TokenKind::LParen)
            );
        let offset = usize::from(is_async);

        let first = self.peek_ahead(offset)?;
        let after_params = match first.kind {
            TokenKind::Ident(_) => offset + 1,
            TokenKind::LParen => {
                let mut depth = 0usize;
                let mut i = offset;
                loop {
                    match self.peek_ahead(i)?.kind {
                        TokenKind::LParen => depth += 1,
                        TokenKind::RParen => {
                            depth -= 1;
                            if depth == 0 {
                                break i + 1;
                            }
                        }
                        TokenKind::Eof => return None,
                        _ => {}
                    }
                    i += 1;
                }
            }
            _ => return None,
        };

        let arrow = self.peek_ahead(after_params)?;
        (arrow.kind == TokenKind::FatArrow && !arrow.newline_before).then_some(is_async)
    }

    /// Parse `x => expr`, `(a, b) => { ... }`, optionally prefixed with `async`
    fn parse_arrow_function(&mut self, is_async: bool) -> Result<Expression, ParseError> {
        let start = self.current_location();
        if is_async {
            self.advance(); // consume 'async'
        }

        let params = if self.check(&TokenKind::LParen) {
            self.parse_params()?
        } else {
            vec![Param {
                name: self.expect_identifier()?,
                default: None,
            }]
        };
        self.expect_token(&TokenKind::FatArrow, "after arrow parameters")?;

        let body_start = self.current_location();
        let body = if self.check(&TokenKind::LBrace) {
            FunctionBody::Block(self.parse_block()?)
        } else {
            FunctionBody::Expression(Box::new(self.parse_assignment()?))
        };

        let function = Arc::new(FunctionNode {
            name: None,
            params,
            body,
            is_arrow: true,
            is_async,
            location: self.span_from(start),
            body_location: self.span_from(body_start),
        });

        Ok(Expression::Function {
            location: function.location,
            function,
        })
    }
}

#[cfg(test)]
mod tests {
    use crate::parser::ast::*;
    use crate::parser::parse::Parser;

    fn parse_expr(source: &str) -> Expression {
        let program = Parser::new(source)
            .expect("lex")
            .parse_program()
            .expect("parse");
        match program.body.into_iter().next() {
            Some(Statement::Expression { expr, .. }) => expr,
            other => panic!("Expected expression statement, got {:?}", other),
        }
    }

    #[test]
    fn test_precedence() {
        match parse_expr("1 + 2 * 3") {
            Expression::Binary {
                op: BinOp::Add,
                right,
                ..
            } => {
                assert!(matches!(*right, Expression::Binary { op: BinOp::Mul, .. }));
            }
            other => panic!("Expected addition, got {:?}", other),
        }
    }

    #[test]
    fn test_exponent_is_right_associative() {
        match parse_expr("2 ** 3 ** 2") {
            Expression::Binary {
                op: BinOp::Exp,
                left,
                right,
                ..
            } => {
                assert!(matches!(*left, Expression::Number { value, .. } if value == 2.0));
                assert!(matches!(*right, Expression::Binary { op: BinOp::Exp, .. }));
            }
            other => panic!("Expected exponent, got {:?}", other),
        }
    }

    #[test]
    fn test_compound_assignment() {
        match parse_expr("x >>>= 2") {
            Expression::Assign { op, target, .. } => {
                assert_eq!(op, AssignOp::Compound(BinOp::UShr));
                assert_eq!(target.as_identifier(), Some("x"));
            }
            other => panic!("Expected assignment, got {:?}", other),
        }
    }

    #[test]
    fn test_invalid_assignment_target() {
        let err = Parser::new("1 = 2").unwrap().parse_program().unwrap_err();
        assert_eq!(err.message, "Invalid left-hand side in assignment");
    }

    #[test]
    fn test_member_call_chain() {
        match parse_expr("Promise.resolve().then(cb).then(() => 1)") {
            Expression::Call { callee, arguments, .. } => {
                assert_eq!(arguments.len(), 1);
                match *callee {
                    Expression::Member {
                        property: MemberProperty::Named(ref name),
                        ..
                    } => assert_eq!(name, "then"),
                    ref other => panic!("Expected member callee, got {:?}", other),
                }
            }
            other => panic!("Expected call, got {:?}", other),
        }
    }

    #[test]
    fn test_arrow_functions() {
        let single = parse_expr("x => x * 2");
        let function = single.as_function().expect("arrow");
        assert!(function.is_arrow);
        assert_eq!(function.params[0].name, "x");
        assert!(matches!(function.body, FunctionBody::Expression(_)));

        let block = parse_expr("async (a, b) => { return a; }");
        let function = block.as_function().expect("arrow");
        assert!(function.is_async);
        assert_eq!(function.params.len(), 2);
        assert!(matches!(function.body, FunctionBody::Block(_)));
    }

    #[test]
    fn test_parenthesized_is_not_arrow() {
        assert!(matches!(
            parse_expr("(a + b) * c"),
            Expression::Binary { op: BinOp::Mul, .. }
        ));
    }

    #[test]
    fn test_object_literal_forms() {
        match parse_expr("({ a: 1, 'b c': 2, d, e() { return 1; }, 3: x })") {
            Expression::Object { properties, .. } => {
                let keys: Vec<_> = properties.iter().map(|p| p.key.as_str()).collect();
                assert_eq!(keys, ["a", "b c", "d", "e", "3"]);
                assert!(matches!(properties[2].value, Expression::Identifier { .. }));
                assert!(properties[3].value.as_function().is_some());
            }
            other => panic!("Expected object, got {:?}", other),
        }
    }

    #[test]
    fn test_array_holes() {
        match parse_expr("[1, , 3,]") {
            Expression::Array { elements, .. } => {
                assert_eq!(elements.len(), 3);
                assert!(elements[1].is_none());
            }
            other => panic!("Expected array, got {:?}", other),
        }
    }

    #[test]
    fn test_template_literal_expressions() {
        match parse_expr("`sum: ${a + b}!`") {
            Expression::Template {
                quasis,
                expressions,
                ..
            } => {
                assert_eq!(quasis, ["sum: ", "!"]);
                assert!(matches!(expressions[0], Expression::Binary { op: BinOp::Add, .. }));
                assert_eq!(expressions[0].location().column, 8);
            }
            other => panic!("Expected template, got {:?}", other),
        }
    }

    #[test]
    fn test_new_and_update() {
        assert!(matches!(parse_expr("new Promise(r)"), Expression::New { .. }));
        assert!(matches!(
            parse_expr("i++"),
            Expression::Update {
                prefix: false,
                op: UpdateOp::Increment,
                ..
            }
        ));
        assert!(matches!(
            parse_expr("--obj.count"),
            Expression::Update { prefix: true, .. }
        ));
    }

    #[test]
    fn test_expression_span() {
        let expr = parse_expr("foo.bar(1, 2)");
        let loc = expr.location();
        assert_eq!((loc.start, loc.end), (0, 13));
    }
}
