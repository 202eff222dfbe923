//! Statement parsing implementation
//!
//! Handles declarations (`var`/`let`/`const`, `function`), control flow
//! (`if`, `for`, `for...of`, `while`, `do...while`, `break`, `continue`,
//! `return`, `throw`), blocks, and `try`/`catch`/`finally`.

use crate::parser::ast::*;
use crate::parser::lexer::TokenKind;
use crate::parser::parse::{ParseError, Parser};

impl Parser {
    /// Parse a single statement
    pub(crate) fn parse_statement(&mut self) -> Result<Statement, ParseError> {
        self.nested(Self::parse_statement_kind)
    }

    fn parse_statement_kind(&mut self) -> Result<Statement, ParseError> {
        let start = self.current_location();

        match self.peek().kind {
            TokenKind::LBrace => {
                let body = self.parse_block()?;
                Ok(Statement::Block {
                    body,
                    location: self.span_from(start),
                })
            }
            TokenKind::Var | TokenKind::Let | TokenKind::Const => {
                let stmt = self.parse_variable_declaration()?;
                self.consume_semicolon()?;
                Ok(stmt)
            }
            TokenKind::Function => self.parse_function_declaration(false),
            TokenKind::Ident(_)
                if self.check_ident("async")
                    && matches!(
                        self.peek_ahead(1),
                        Some(t) if t.kind == TokenKind::Function && !t.newline_before
                    ) =>
            {
                self.advance(); // consume 'async'
                self.parse_function_declaration(true)
            }
            TokenKind::Return => self.parse_return_statement(),
            TokenKind::If => self.parse_if_statement(),
            TokenKind::For => self.parse_for_statement(),
            TokenKind::While => self.parse_while_statement(),
            TokenKind::Do => self.parse_do_while_statement(),
            TokenKind::Break => {
                self.advance();
                self.consume_semicolon()?;
                Ok(Statement::Break {
                    location: self.span_from(start),
                })
            }
            TokenKind::Continue => {
                self.advance();
                self.consume_semicolon()?;
                Ok(Statement::Continue {
                    location: self.span_from(start),
                })
            }
            TokenKind::Throw => {
                self.advance();
                let argument = self.parse_expression()?;
                self.consume_semicolon()?;
                Ok(Statement::Throw {
                    argument,
                    location: self.span_from(start),
                })
            }
            TokenKind::Try => self.parse_try_statement(),
            TokenKind::Semicolon => {
                self.advance();
                Ok(Statement::Empty { location: start })
            }
            _ => {
                let expr = self.parse_expression()?;
                self.consume_semicolon()?;
                Ok(Statement::Expression {
                    expr,
                    location: self.span_from(start),
                })
            }
        }
    }

    /// Parse `{ statements }` and return the statements
    pub(crate) fn parse_block(&mut self) -> Result<Vec<Statement>, ParseError> {
        self.expect_lbrace("to open block")?;

        let mut statements = Vec::new();
        while !self.check(&TokenKind::RBrace) && !self.is_at_end() {
            statements.push(self.parse_statement()?);
        }

        self.expect_rbrace("to close block")?;
        Ok(statements)
    }

    fn parse_var_kind(&mut self) -> Result<VarKind, ParseError> {
        let kind = match self.peek().kind {
            TokenKind::Var => VarKind::Var,
            TokenKind::Let => VarKind::Let,
            TokenKind::Const => VarKind::Const,
            _ => return Err(self.unexpected()),
        };
        self.advance();
        Ok(kind)
    }

    /// Parse `kind a = 1, b, c = 3` (without the terminating semicolon)
    fn parse_variable_declaration(&mut self) -> Result<Statement, ParseError> {
        let start = self.current_location();
        let kind = self.parse_var_kind()?;

        let mut declarations = Vec::new();
        loop {
            let decl_start = self.current_location();
            let name = self.expect_identifier()?;
            let init = if self.match_token(&TokenKind::Eq) {
                Some(self.parse_assignment()?)
            } else {
                None
            };
            declarations.push(VarDeclarator {
                name,
                init,
                location: self.span_from(decl_start),
            });

            if !self.match_token(&TokenKind::Comma) {
                break;
            }
        }

        Ok(Statement::VarDecl {
            kind,
            declarations,
            location: self.span_from(start),
        })
    }

    /// Parse `function name(params) { body }`; `async` is already consumed
    fn parse_function_declaration(
        &mut self,
        is_async: bool,
    ) -> Result<Statement, ParseError> {
        let start = if is_async {
            self.previous().location
        } else {
            self.current_location()
        };
        self.expect_token(&TokenKind::Function, "to start function declaration")?;
        let name = self.expect_identifier()?;
        let function = self.parse_function_rest(Some(name), is_async, start)?;

        Ok(Statement::FunctionDecl {
            location: function.location,
            function,
        })
    }

    fn parse_return_statement(&mut self) -> Result<Statement, ParseError> {
        let start = self.current_location();
        self.advance(); // consume 'return'

        let token = self.peek();
        let argument = if token.newline_before
            || matches!(
                token.kind,
                TokenKind::Semicolon | TokenKind::RBrace | TokenKind::Eof
            ) {
            None
        } else {
            Some(self.parse_expression()?)
        };
        self.consume_semicolon()?;

        Ok(Statement::Return {
            argument,
            location: self.span_from(start),
        })
    }

    fn parse_if_statement(&mut self) -> Result<Statement, ParseError> {
        let start = self.current_location();
        self.advance(); // consume 'if'

        self.expect_lparen("after 'if'")?;
        let test = self.parse_expression()?;
        self.expect_rparen("after if condition")?;

        let consequent = Box::new(self.parse_statement()?);
        let alternate = if self.match_token(&TokenKind::Else) {
            Some(Box::new(self.parse_statement()?))
        } else {
            None
        };

        Ok(Statement::If {
            test,
            consequent,
            alternate,
            location: self.span_from(start),
        })
    }

    fn parse_while_statement(&mut self) -> Result<Statement, ParseError> {
        let start = self.current_location();
        self.advance(); // consume 'while'

        self.expect_lparen("after 'while'")?;
        let test = self.parse_expression()?;
        self.expect_rparen("after while condition")?;
        let body = Box::new(self.parse_statement()?);

        Ok(Statement::While {
            test,
            body,
            location: self.span_from(start),
        })
    }

    fn parse_do_while_statement(&mut self) -> Result<Statement, ParseError> {
        let start = self.current_location();
        self.advance(); // consume 'do'

        let body = Box::new(self.parse_statement()?);
        self.expect_token(&TokenKind::While, "after do-while body")?;
        self.expect_lparen("after 'while'")?;
        let test = self.parse_expression()?;
        self.expect_rparen("after do-while condition")?;
        self.match_token(&TokenKind::Semicolon);

        Ok(Statement::DoWhile {
            body,
            test,
            location: self.span_from(start),
        })
    }

    /// Parse `for (init; test; update) body` or `for (kind x of iterable) body`
    fn parse_for_statement(&mut self) -> Result<Statement, ParseError> {
        let start = self.current_location();
        self.advance(); // consume 'for'

        if self.check_ident("await") {
            return Err(ParseError::at(
                "for await loops are not supported",
                self.current_location(),
            ));
        }
        self.expect_lparen("after 'for'")?;

        let is_declaration = matches!(
            self.peek().kind,
            TokenKind::Var | TokenKind::Let | TokenKind::Const
        );
        let is_for_of = is_declaration
            && matches!(
                self.peek_ahead(2),
                Some(t) if matches!(&t.kind, TokenKind::Ident(s) if s == "of")
            );

        if is_for_of {
            let kind = self.parse_var_kind()?;
            let binding = self.expect_identifier()?;
            self.advance(); // consume 'of'
            let iterable = self.parse_assignment()?;
            self.expect_rparen("after for-of iterable")?;
            let body = Box::new(self.parse_statement()?);

            return Ok(Statement::ForOf {
                kind,
                binding,
                iterable,
                body,
                location: self.span_from(start),
            });
        }

        let init = if self.check(&TokenKind::Semicolon) {
            None
        } else if is_declaration {
            Some(Box::new(self.parse_variable_declaration()?))
        } else {
            let init_start = self.current_location();
            let expr = self.parse_expression()?;
            Some(Box::new(Statement::Expression {
                expr,
                location: self.span_from(init_start),
            }))
        };
        self.expect_token(&TokenKind::Semicolon, "after for-loop initializer")?;

        let test = if self.check(&TokenKind::Semicolon) {
            None
        } else {
            Some(self.parse_expression()?)
        };
        self.expect_token(&TokenKind::Semicolon, "after for-loop condition")?;

        let update = if self.check(&TokenKind::RParen) {
            None
        } else {
            Some(self.parse_expression()?)
        };
        self.expect_rparen("after for-loop update")?;

        let body = Box::new(self.parse_statement()?);

        Ok(Statement::For {
            init,
            test,
            update,
            body,
            location: self.span_from(start),
        })
    }

    fn parse_try_statement(&mut self) -> Result<Statement, ParseError> {
        let start = self.current_location();
        self.advance(); // consume 'try'

        let block = self.parse_block()?;

        let handler = if self.check(&TokenKind::Catch) {
            let catch_start = self.current_location();
            self.advance();
            let param = if self.match_token(&TokenKind::LParen) {
                let name = self.expect_identifier()?;
                self.expect_rparen("after catch parameter")?;
                Some(name)
            } else {
                None
            };
            let body = self.parse_block()?;
            Some(CatchClause {
                param,
                body,
                location: self.span_from(catch_start),
            })
        } else {
            None
        };

        let finalizer = if self.match_token(&TokenKind::Finally) {
            Some(self.parse_block()?)
        } else {
            None
        };

        if handler.is_none() && finalizer.is_none() {
            return Err(ParseError::at(
                "Missing catch or finally after try",
                self.current_location(),
            ));
        }

        Ok(Statement::Try {
            block,
            handler,
            finalizer,
            location: self.span_from(start),
        })
    }
}

#[cfg(test)]
mod tests {
    use crate::parser::ast::*;
    use crate::parser::parse::Parser;

    fn parse(source: &str) -> Program {
        Parser::new(source)
            .expect("lex")
            .parse_program()
            .expect("parse")
    }

    #[test]
    fn test_parse_variable_declarations() {
        let program = parse("let a = 1, b; const c = 'x';");

        match &program.body[0] {
            Statement::VarDecl {
                kind, declarations, ..
            } => {
                assert_eq!(*kind, VarKind::Let);
                assert_eq!(declarations.len(), 2);
                assert_eq!(declarations[0].name, "a");
                assert!(declarations[1].init.is_none());
            }
            other => panic!("Expected declaration, got {:?}", other),
        }
        assert!(matches!(
            program.body[1],
            Statement::VarDecl {
                kind: VarKind::Const,
                ..
            }
        ));
    }

    #[test]
    fn test_parse_function_declaration() {
        let program = parse("async function add(a, b = 2) {\n  return a + b;\n}");

        match &program.body[0] {
            Statement::FunctionDecl { function, location } => {
                assert_eq!(function.name.as_deref(), Some("add"));
                assert!(function.is_async);
                assert_eq!(function.params.len(), 2);
                assert!(function.params[1].default.is_some());
                assert_eq!(location.line, 1);
                assert_eq!(function.body_location.line, 1);
            }
            other => panic!("Expected function, got {:?}", other),
        }
    }

    #[test]
    fn test_parse_if_else_chain() {
        let program = parse("if (x > 1) { y = 1; } else if (x < 0) y = 2; else y = 3;");

        match &program.body[0] {
            Statement::If { alternate, .. } => {
                assert!(matches!(
                    alternate.as_deref(),
                    Some(Statement::If { alternate: Some(_), .. })
                ));
            }
            other => panic!("Expected if, got {:?}", other),
        }
    }

    #[test]
    fn test_parse_loops() {
        let program = parse(
            "for (let i = 0; i < 3; i++) {}\nfor (const v of arr) {}\nwhile (true) break;\ndo { x++ } while (x < 3)",
        );

        assert!(matches!(
            program.body[0],
            Statement::For {
                init: Some(_),
                test: Some(_),
                update: Some(_),
                ..
            }
        ));
        assert!(matches!(
            &program.body[1],
            Statement::ForOf { binding, kind: VarKind::Const, .. } if binding == "v"
        ));
        assert!(matches!(program.body[2], Statement::While { .. }));
        assert!(matches!(program.body[3], Statement::DoWhile { .. }));
        assert_eq!(program.body[3].location().line, 4);
    }

    #[test]
    fn test_parse_empty_for_header() {
        let program = parse("for (;;) { break; }");

        assert!(matches!(
            program.body[0],
            Statement::For {
                init: None,
                test: None,
                update: None,
                ..
            }
        ));
    }

    #[test]
    fn test_parse_try_catch_finally() {
        let program = parse("try { a(); } catch (e) { b(); } finally { c(); }");

        match &program.body[0] {
            Statement::Try {
                block,
                handler,
                finalizer,
                ..
            } => {
                assert_eq!(block.len(), 1);
                assert_eq!(
                    handler.as_ref().and_then(|h| h.param.as_deref()),
                    Some("e")
                );
                assert!(finalizer.is_some());
            }
            other => panic!("Expected try, got {:?}", other),
        }
    }

    #[test]
    fn test_return_without_argument_before_newline() {
        let program = parse("function f() {\n  return\n  1\n}");

        match &program.body[0] {
            Statement::FunctionDecl { function, .. } => match &function.body {
                FunctionBody::Block(body) => {
                    assert!(matches!(body[0], Statement::Return { argument: None, .. }));
                    assert_eq!(body.len(), 2);
                }
                FunctionBody::Expression(_) => panic!("Expected block body"),
            },
            other => panic!("Expected function, got {:?}", other),
        }
    }
}
