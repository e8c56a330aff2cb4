//! Recursive descent parser with one-token lookahead and precedence
//! climbing for expressions.
//!
//! On a mismatch the parser records a diagnostic at the offending token,
//! enters panic mode, and resynchronizes at the next statement boundary, so
//! a single run reports as many errors as possible. Sub-nodes that failed
//! to parse stay `None` in the AST.

use crate::error::ParseDiagnostic;
use crate::parser::ast::{
    AstBinOp, AstExpr, AstFunction, AstParam, AstStmt, AstType, AstUnaryOp, Ident, Program,
};
use crate::parser::lexer::Lexer;
use crate::parser::token::{Token, TokenKind};
use crate::source::{SourceId, SourceManager, Span};
use crate::types;

pub struct Parser<'src> {
    lexer: Lexer<'src>,
    current: Token<'src>,
    previous: Token<'src>,
    had_error: bool,
    panic_mode: bool,
    errors: Vec<ParseDiagnostic>,
}

impl<'src> Parser<'src> {
    pub fn new(sm: &'src SourceManager, id: SourceId) -> Parser<'src> {
        let mut parser = Parser {
            lexer: Lexer::new(sm, id),
            current: Token::dummy(),
            previous: Token::dummy(),
            had_error: false,
            panic_mode: false,
            errors: Vec::new(),
        };
        parser.advance();
        parser
    }

    pub fn had_error(&self) -> bool {
        self.had_error
    }

    pub fn errors(&self) -> &[ParseDiagnostic] {
        &self.errors
    }

    pub fn into_errors(self) -> Vec<ParseDiagnostic> {
        self.errors
    }

    // -----------------------------------------------------------------
    // Token handling
    // -----------------------------------------------------------------

    fn advance(&mut self) {
        self.previous = self.current;
        loop {
            self.current = self.lexer.next();
            if !self.current.is_error() {
                break;
            }
            // Lexer errors carry their message in the token text. Report
            // verbatim, then skip past.
            let token = self.current;
            self.error_at(token, token.text);
        }
    }

    fn check(&self, kind: TokenKind) -> bool {
        self.current.is(kind)
    }

    fn match_token(&mut self, kind: TokenKind) -> bool {
        if !self.check(kind) {
            return false;
        }
        self.advance();
        true
    }

    fn consume(&mut self, kind: TokenKind, message: &str) {
        if self.check(kind) {
            self.advance();
            return;
        }
        self.error(message);
    }

    fn skip_newlines(&mut self) {
        while self.match_token(TokenKind::Newline) {}
    }

    // -----------------------------------------------------------------
    // Error handling
    // -----------------------------------------------------------------

    fn error(&mut self, message: &str) {
        let token = self.current;
        self.error_at(token, message);
    }

    fn error_at(&mut self, token: Token<'src>, message: &str) {
        if self.panic_mode {
            return;
        }
        self.panic_mode = true;
        self.had_error = true;
        self.errors.push(ParseDiagnostic {
            message: message.to_owned(),
            span: token.span,
            lexical: token.is_error(),
        });
    }

    /// Skips tokens until a likely statement boundary: just past a
    /// semicolon or newline, or in front of a declaration/statement
    /// keyword.
    fn synchronize(&mut self) {
        self.panic_mode = false;
        while !self.current.is_eof() {
            if self.previous.kind == TokenKind::Semicolon
                || self.previous.kind == TokenKind::Newline
            {
                return;
            }
            match self.current.kind {
                TokenKind::Fn
                | TokenKind::Let
                | TokenKind::If
                | TokenKind::While
                | TokenKind::Return => return,
                _ => {}
            }
            self.advance();
        }
    }

    // -----------------------------------------------------------------
    // Top level
    // -----------------------------------------------------------------

    pub fn parse(&mut self) -> Program {
        let mut program = Program::default();

        self.skip_newlines();

        while !self.current.is_eof() {
            // `use NAME` imports are recognised, recorded, and skipped.
            if self.check(TokenKind::Use) {
                self.advance();
                if self.check(TokenKind::Ident) {
                    program.imports.push(self.current.text.to_owned());
                    self.advance();
                }
                self.skip_newlines();
                continue;
            }

            if self.check(TokenKind::Fn) {
                program.functions.push(self.parse_fn_decl());
            } else {
                self.error("Expected function declaration");
                self.synchronize();
            }
            self.skip_newlines();
        }

        program
    }

    fn parse_fn_decl(&mut self) -> AstFunction {
        let start = self.current.span;
        let mut func = AstFunction {
            name: String::new(),
            params: Vec::new(),
            return_ty: None,
            body: Vec::new(),
            span: start,
        };

        self.consume(TokenKind::Fn, "Expected 'fn'");

        if !self.check(TokenKind::Ident) {
            self.error("Expected function name");
            return func;
        }
        func.name = self.current.text.to_owned();
        self.advance();

        self.consume(TokenKind::LParen, "Expected '(' after function name");
        func.params = self.parse_params();
        self.consume(TokenKind::RParen, "Expected ')' after parameters");

        if self.match_token(TokenKind::Arrow) {
            func.return_ty = Some(self.parse_type());
        }

        self.skip_newlines();
        self.consume(TokenKind::LBrace, "Expected '{' before function body");
        self.skip_newlines();

        while !self.check(TokenKind::RBrace) && !self.current.is_eof() {
            if let Some(stmt) = self.parse_stmt() {
                func.body.push(stmt);
            }
            if self.panic_mode {
                self.synchronize();
            }
            self.skip_newlines();
        }

        self.consume(TokenKind::RBrace, "Expected '}' after function body");
        func.span = start.merge(self.previous.span);
        func
    }

    fn parse_params(&mut self) -> Vec<AstParam> {
        let mut params = Vec::new();

        if self.check(TokenKind::RParen) {
            return params;
        }

        loop {
            if !self.check(TokenKind::Ident) {
                self.error("Expected parameter name");
                break;
            }
            let name = self.current.text.to_owned();
            let span = self.current.span;
            self.advance();

            let ty = if self.match_token(TokenKind::Colon) {
                self.parse_type()
            } else {
                AstType {
                    ty: types::Type::UNKNOWN,
                    span: Span::invalid(),
                }
            };

            params.push(AstParam { name, ty, span });

            if !self.match_token(TokenKind::Comma) {
                break;
            }
        }

        params
    }

    fn parse_type(&mut self) -> AstType {
        let span = self.current.span;
        if self.check(TokenKind::Ident) {
            let ty = types::parse_type(self.current.text);
            self.advance();
            AstType { ty, span }
        } else {
            self.error("Expected type");
            AstType {
                ty: types::Type::UNKNOWN,
                span,
            }
        }
    }

    // -----------------------------------------------------------------
    // Statements
    // -----------------------------------------------------------------

    fn parse_stmt(&mut self) -> Option<AstStmt> {
        self.skip_newlines();

        if self.check(TokenKind::Let) {
            return self.parse_let_stmt();
        }
        if self.check(TokenKind::Return) {
            return Some(self.parse_return_stmt());
        }
        if self.check(TokenKind::If) {
            return Some(self.parse_if_stmt());
        }
        if self.check(TokenKind::While) {
            return Some(self.parse_while_stmt());
        }
        if self.check(TokenKind::LBrace) {
            return Some(self.parse_block());
        }

        Some(self.parse_expr_stmt())
    }

    fn parse_let_stmt(&mut self) -> Option<AstStmt> {
        let start = self.current.span;
        self.consume(TokenKind::Let, "Expected 'let'");

        if !self.check(TokenKind::Ident) {
            self.error("Expected variable name");
            return None;
        }
        let name = self.current.text.to_owned();
        self.advance();

        let ty = if self.match_token(TokenKind::Colon) {
            Some(self.parse_type())
        } else {
            None
        };

        self.consume(TokenKind::Eq, "Expected '=' after variable name");
        let init = self.parse_expr();

        self.match_token(TokenKind::Semicolon);

        Some(AstStmt::Let {
            name,
            ty,
            init,
            span: start.merge(self.previous.span),
        })
    }

    fn parse_return_stmt(&mut self) -> AstStmt {
        let start = self.current.span;
        self.consume(TokenKind::Return, "Expected 'return'");

        let value = if !self.check(TokenKind::Semicolon)
            && !self.check(TokenKind::Newline)
            && !self.check(TokenKind::RBrace)
            && !self.current.is_eof()
        {
            self.parse_expr()
        } else {
            None
        };

        self.match_token(TokenKind::Semicolon);

        AstStmt::Return {
            value,
            span: start.merge(self.previous.span),
        }
    }

    fn parse_if_stmt(&mut self) -> AstStmt {
        let start = self.current.span;
        self.consume(TokenKind::If, "Expected 'if'");
        let cond = self.parse_expr();

        self.skip_newlines();
        self.consume(TokenKind::LBrace, "Expected '{' after if condition");
        let then_branch = self.parse_stmt_list();
        self.consume(TokenKind::RBrace, "Expected '}' after if body");

        self.skip_newlines();
        let else_branch = if self.match_token(TokenKind::Else) {
            self.skip_newlines();
            self.consume(TokenKind::LBrace, "Expected '{' after else");
            let body = self.parse_stmt_list();
            self.consume(TokenKind::RBrace, "Expected '}' after else body");
            body
        } else {
            Vec::new()
        };

        AstStmt::If {
            cond,
            then_branch,
            else_branch,
            span: start.merge(self.previous.span),
        }
    }

    fn parse_while_stmt(&mut self) -> AstStmt {
        let start = self.current.span;
        self.consume(TokenKind::While, "Expected 'while'");
        let cond = self.parse_expr();

        self.skip_newlines();
        self.consume(TokenKind::LBrace, "Expected '{' after while condition");
        let body = self.parse_stmt_list();
        self.consume(TokenKind::RBrace, "Expected '}' after while body");

        AstStmt::While {
            cond,
            body,
            span: start.merge(self.previous.span),
        }
    }

    fn parse_block(&mut self) -> AstStmt {
        let start = self.current.span;
        self.consume(TokenKind::LBrace, "Expected '{'");
        let stmts = self.parse_stmt_list();
        self.consume(TokenKind::RBrace, "Expected '}'");

        AstStmt::Block {
            stmts,
            span: start.merge(self.previous.span),
        }
    }

    /// Parses statements up to (but not including) the closing brace.
    fn parse_stmt_list(&mut self) -> Vec<AstStmt> {
        let mut stmts = Vec::new();
        self.skip_newlines();
        while !self.check(TokenKind::RBrace) && !self.current.is_eof() {
            if let Some(stmt) = self.parse_stmt() {
                stmts.push(stmt);
            }
            if self.panic_mode {
                self.synchronize();
            }
            self.skip_newlines();
        }
        stmts
    }

    fn parse_expr_stmt(&mut self) -> AstStmt {
        let start = self.current.span;
        let expr = self.parse_expr();
        self.match_token(TokenKind::Semicolon);

        let span = expr.as_ref().map(|e| e.span()).unwrap_or(start);
        AstStmt::Expr { expr, span }
    }

    // -----------------------------------------------------------------
    // Expressions (precedence climbing)
    // -----------------------------------------------------------------

    fn parse_expr(&mut self) -> Option<Box<AstExpr>> {
        self.parse_equality()
    }

    fn parse_equality(&mut self) -> Option<Box<AstExpr>> {
        let mut expr = self.parse_comparison();

        while self.match_token(TokenKind::EqEq) || self.match_token(TokenKind::BangEq) {
            let op = if self.previous.kind == TokenKind::EqEq {
                AstBinOp::Eq
            } else {
                AstBinOp::Ne
            };
            let op_span = self.previous.span;
            let rhs = self.parse_comparison();
            expr = Some(Self::make_binary(op, expr, rhs, op_span));
        }

        expr
    }

    fn parse_comparison(&mut self) -> Option<Box<AstExpr>> {
        let mut expr = self.parse_term();

        while self.match_token(TokenKind::Lt)
            || self.match_token(TokenKind::Gt)
            || self.match_token(TokenKind::LtEq)
            || self.match_token(TokenKind::GtEq)
        {
            let op = match self.previous.kind {
                TokenKind::Lt => AstBinOp::Lt,
                TokenKind::Gt => AstBinOp::Gt,
                TokenKind::LtEq => AstBinOp::Le,
                _ => AstBinOp::Ge,
            };
            let op_span = self.previous.span;
            let rhs = self.parse_term();
            expr = Some(Self::make_binary(op, expr, rhs, op_span));
        }

        expr
    }

    fn parse_term(&mut self) -> Option<Box<AstExpr>> {
        let mut expr = self.parse_factor();

        while self.match_token(TokenKind::Plus) || self.match_token(TokenKind::Minus) {
            let op = if self.previous.kind == TokenKind::Plus {
                AstBinOp::Add
            } else {
                AstBinOp::Sub
            };
            let op_span = self.previous.span;
            let rhs = self.parse_factor();
            expr = Some(Self::make_binary(op, expr, rhs, op_span));
        }

        expr
    }

    fn parse_factor(&mut self) -> Option<Box<AstExpr>> {
        let mut expr = self.parse_unary();

        while self.match_token(TokenKind::Star) || self.match_token(TokenKind::Slash) {
            let op = if self.previous.kind == TokenKind::Star {
                AstBinOp::Mul
            } else {
                AstBinOp::Div
            };
            let op_span = self.previous.span;
            let rhs = self.parse_unary();
            expr = Some(Self::make_binary(op, expr, rhs, op_span));
        }

        expr
    }

    fn make_binary(
        op: AstBinOp,
        lhs: Option<Box<AstExpr>>,
        rhs: Option<Box<AstExpr>>,
        op_span: Span,
    ) -> Box<AstExpr> {
        // A binary node's span is the merge of its children; when recovery
        // left a side empty, the operator's own span stands in.
        let span = match (&lhs, &rhs) {
            (Some(l), Some(r)) => l.span().merge(r.span()),
            (Some(l), None) => l.span().merge(op_span),
            (None, Some(r)) => op_span.merge(r.span()),
            (None, None) => op_span,
        };
        Box::new(AstExpr::Binary { op, lhs, rhs, span })
    }

    fn parse_unary(&mut self) -> Option<Box<AstExpr>> {
        if self.match_token(TokenKind::Minus) || self.match_token(TokenKind::Bang) {
            let op = if self.previous.kind == TokenKind::Minus {
                AstUnaryOp::Neg
            } else {
                AstUnaryOp::Not
            };
            let start = self.previous.span;
            let operand = self.parse_unary();
            let span = match &operand {
                Some(e) => start.merge(e.span()),
                None => start,
            };
            return Some(Box::new(AstExpr::Unary { op, operand, span }));
        }

        self.parse_call()
    }

    fn parse_call(&mut self) -> Option<Box<AstExpr>> {
        let expr = self.parse_primary()?;

        // A call is an identifier immediately followed by `(`.
        if let AstExpr::Ident(id) = expr.as_ref() {
            if self.match_token(TokenKind::LParen) {
                let callee = id.name.clone();
                let mut span = id.span;
                let mut args = Vec::new();

                if !self.check(TokenKind::RParen) {
                    loop {
                        // Keyword argument `name = expr`: the name is
                        // accepted syntactically and discarded. A single
                        // lexer peek distinguishes it from a positional
                        // identifier.
                        if self.check(TokenKind::Ident)
                            && self.lexer.peek().kind == TokenKind::Eq
                        {
                            self.advance();
                            self.advance();
                        }
                        if let Some(arg) = self.parse_expr() {
                            args.push(*arg);
                        }
                        if !self.match_token(TokenKind::Comma) {
                            break;
                        }
                    }
                }

                self.consume(TokenKind::RParen, "Expected ')' after arguments");
                span = span.merge(self.previous.span);
                return Some(Box::new(AstExpr::Call { callee, args, span }));
            }
        }

        Some(expr)
    }

    fn parse_primary(&mut self) -> Option<Box<AstExpr>> {
        if self.match_token(TokenKind::IntLit) {
            let value = self.previous.text.parse::<i64>().unwrap_or(0);
            return Some(Box::new(AstExpr::IntLit {
                value,
                span: self.previous.span,
            }));
        }

        if self.match_token(TokenKind::FloatLit) {
            let value = self.previous.text.parse::<f64>().unwrap_or(0.0);
            return Some(Box::new(AstExpr::FloatLit {
                value,
                span: self.previous.span,
            }));
        }

        if self.match_token(TokenKind::StringLit) {
            let value = unescape_string(self.previous.text);
            return Some(Box::new(AstExpr::StrLit {
                value,
                span: self.previous.span,
            }));
        }

        if self.match_token(TokenKind::Ident) {
            return Some(Box::new(AstExpr::Ident(Ident {
                name: self.previous.text.to_owned(),
                span: self.previous.span,
            })));
        }

        if self.match_token(TokenKind::LParen) {
            let start = self.previous.span;
            let inner = self.parse_expr();
            self.consume(TokenKind::RParen, "Expected ')' after expression");
            return Some(Box::new(AstExpr::Group {
                inner,
                span: start.merge(self.previous.span),
            }));
        }

        self.error("Expected expression");
        None
    }
}

/// Strips the surrounding quotes from a string token's text and interprets
/// `\n`, `\t`, `\"` and `\\`. Unrecognized escapes keep the backslash
/// verbatim.
fn unescape_string(text: &str) -> String {
    let inner = text
        .strip_prefix('"')
        .and_then(|t| t.strip_suffix('"'))
        .unwrap_or(text);

    let mut out = String::with_capacity(inner.len());
    let mut chars = inner.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('n') => out.push('\n'),
            Some('t') => out.push('\t'),
            Some('"') => out.push('"'),
            Some('\\') => out.push('\\'),
            Some(other) => {
                out.push('\\');
                out.push(other);
            }
            None => out.push('\\'),
        }
    }
    out
}
