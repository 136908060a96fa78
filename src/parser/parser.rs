//! Parser state and the `parse` entry point.
//!
//! The parser owns the token stream, the lookup tables for statements and
//! expressions, and the arena every node is allocated into.

use std::collections::HashMap;

use crate::{
    ast::{
        ast::{Arena, Ast, ExprId, IdentId, StmtId},
        expressions::Expr,
        statements::Stmt,
    },
    errors::errors::{Error, ErrorImpl},
    lexer::tokens::{Token, TokenKind},
    Position, Span, MK_TOKEN,
};

use super::{
    decl::parse_program,
    lookups::{
        create_token_lookups, BPLookup, BindingPower, LEDHandler, LEDLookup, NUDHandler,
        NUDLookup, StmtHandler, StmtLookup,
    },
};

pub struct Parser {
    /// The list of tokens to parse, always terminated by `EOF`
    tokens: Vec<Token>,
    /// Current position in the token stream
    pos: usize,
    /// Storage for every node built so far
    arena: Arena,
    stmt_lookup: StmtLookup,
    nud_lookup: NUDLookup,
    led_lookup: LEDLookup,
    binding_power_lookup: BPLookup,
}

impl Parser {
    pub fn new(mut tokens: Vec<Token>) -> Self {
        if tokens.last().map(|token| token.kind) != Some(TokenKind::EOF) {
            let end = tokens
                .last()
                .map(|token| token.span.end)
                .unwrap_or_default();
            tokens.push(MK_TOKEN!(
                TokenKind::EOF,
                String::from("EOF"),
                Span::new(end, end)
            ));
        }

        Parser {
            tokens,
            pos: 0,
            arena: Arena::new(),
            stmt_lookup: HashMap::new(),
            nud_lookup: HashMap::new(),
            led_lookup: HashMap::new(),
            binding_power_lookup: HashMap::new(),
        }
    }

    pub fn current_token(&self) -> &Token {
        &self.tokens[self.pos]
    }

    pub fn current_token_kind(&self) -> TokenKind {
        self.current_token().kind
    }

    /// The token after the current one, or `EOF`.
    pub fn peek_kind(&self) -> TokenKind {
        self.tokens
            .get(self.pos + 1)
            .map(|token| token.kind)
            .unwrap_or(TokenKind::EOF)
    }

    /// Advances to the next token and returns the previous one. Never moves
    /// past `EOF`.
    pub fn advance(&mut self) -> &Token {
        let index = self.pos;
        if self.pos + 1 < self.tokens.len() {
            self.pos += 1;
        }
        &self.tokens[index]
    }

    /// Expects a token of the given kind, failing with `error` (or a plain
    /// unexpected-token error) otherwise.
    pub fn expect_error(
        &mut self,
        expected_kind: TokenKind,
        error: Option<Error>,
    ) -> Result<Token, Error> {
        let token = self.current_token();
        if token.kind != expected_kind {
            return Err(error.unwrap_or_else(|| {
                Error::new(
                    ErrorImpl::UnexpectedToken {
                        token: token.value.clone(),
                    },
                    token.span.start,
                )
            }));
        }

        Ok(self.advance().clone())
    }

    pub fn expect(&mut self, expected_kind: TokenKind) -> Result<Token, Error> {
        self.expect_error(expected_kind, None)
    }

    /// Expects `expected_kind`, explaining what was being parsed on failure.
    pub fn expect_detailed(
        &mut self,
        expected_kind: TokenKind,
        message: &str,
    ) -> Result<Token, Error> {
        let error = self.unexpected(message);
        self.expect_error(expected_kind, Some(error))
    }

    /// An error pointing at the current token.
    pub fn unexpected(&self, message: &str) -> Error {
        Error::new(
            ErrorImpl::UnexpectedTokenDetailed {
                token: self.current_token().value.clone(),
                message: String::from(message),
            },
            self.get_position(),
        )
    }

    pub fn has_tokens(&self) -> bool {
        self.current_token_kind() != TokenKind::EOF
    }

    pub fn get_stmt_lookup(&self) -> &StmtLookup {
        &self.stmt_lookup
    }

    pub fn get_nud_lookup(&self) -> &NUDLookup {
        &self.nud_lookup
    }

    pub fn get_led_lookup(&self) -> &LEDLookup {
        &self.led_lookup
    }

    pub fn get_bp_lookup(&self) -> &BPLookup {
        &self.binding_power_lookup
    }

    /// Binding power of the current token, `Default` when it is not an operator.
    pub fn current_binding_power(&self) -> BindingPower {
        self.binding_power_lookup
            .get(&self.current_token_kind())
            .copied()
            .unwrap_or(BindingPower::Default)
    }

    /// Registers an infix handler for a token.
    pub fn led(&mut self, kind: TokenKind, binding_power: BindingPower, led_fn: LEDHandler) {
        self.binding_power_lookup.insert(kind, binding_power);
        self.led_lookup.insert(kind, led_fn);
    }

    /// Registers a prefix handler for a token. The token's infix binding
    /// power, if any, is left untouched so `-` can be both.
    pub fn nud(&mut self, kind: TokenKind, nud_fn: NUDHandler) {
        self.nud_lookup.insert(kind, nud_fn);
    }

    /// Registers a statement handler for a token.
    pub fn stmt(&mut self, kind: TokenKind, stmt_fn: StmtHandler) {
        self.stmt_lookup.insert(kind, stmt_fn);
    }

    /// Start of the current token.
    pub fn get_position(&self) -> Position {
        self.current_token().span.start
    }

    /// End of the most recently consumed token.
    pub fn previous_end(&self) -> Position {
        self.pos
            .checked_sub(1)
            .map(|index| self.tokens[index].span.end)
            .unwrap_or_else(|| self.get_position())
    }

    /// A span from `start` to the end of the last consumed token.
    pub fn span_from(&self, start: Position) -> Span {
        Span::new(start, self.previous_end())
    }

    pub fn alloc_expr(&mut self, expr: Expr, span: Span) -> ExprId {
        self.arena.alloc_expr(expr, span)
    }

    pub fn alloc_stmt(&mut self, stmt: Stmt, span: Span) -> StmtId {
        self.arena.alloc_stmt(stmt, span)
    }

    pub fn alloc_ident(&mut self, token: &Token) -> IdentId {
        self.arena.alloc_ident(token.value.clone(), token.span)
    }

    pub fn ident_name(&self, id: IdentId) -> &str {
        &self.arena[id].name
    }

    pub fn expr_span(&self, id: ExprId) -> Span {
        self.arena[id].span
    }

    pub fn into_arena(self) -> Arena {
        self.arena
    }
}

/// Parses a token stream produced by [`tokenize`](crate::lexer::lexer::tokenize)
/// into a program tree.
pub fn parse(tokens: Vec<Token>) -> Result<Ast, Error> {
    let mut parser = Parser::new(tokens);
    create_token_lookups(&mut parser);

    let program = parse_program(&mut parser)?;

    if parser.has_tokens() {
        return Err(parser.unexpected("expected end of input after the final '.'"));
    }

    log::debug!(
        "parsed program '{}' with {} subprograms",
        parser.ident_name(program.name),
        program.subprograms.len()
    );

    Ok(Ast {
        program,
        arena: parser.into_arena(),
    })
}
