use crate::{
    ast::{ast::StmtId, expressions::Expr, statements::Stmt},
    errors::errors::Error,
    lexer::tokens::TokenKind,
};

use super::{
    expr::{parse_arguments, parse_expr, parse_index},
    lookups::BindingPower,
    parser::Parser,
};

pub fn parse_stmt(parser: &mut Parser) -> Result<StmtId, Error> {
    let Some(stmt_fn) = parser
        .get_stmt_lookup()
        .get(&parser.current_token_kind())
        .copied()
    else {
        return Err(parser.unexpected("expected a statement"));
    };

    stmt_fn(parser)
}

/// `begin [ stmt { ; stmt } ] end`. Empty statements between semicolons are
/// skipped.
pub fn parse_compound_stmt(parser: &mut Parser) -> Result<StmtId, Error> {
    let start = parser.expect(TokenKind::Begin)?.span.start;

    let mut statements = Vec::new();
    loop {
        while parser.current_token_kind() == TokenKind::Semicolon {
            parser.advance();
        }

        if parser.current_token_kind() == TokenKind::End {
            break;
        }

        statements.push(parse_stmt(parser)?);

        if parser.current_token_kind() != TokenKind::Semicolon {
            break;
        }
    }

    parser.expect_detailed(TokenKind::End, "expected ';' or 'end' after statement")?;

    let span = parser.span_from(start);
    Ok(parser.alloc_stmt(Stmt::Compound(statements), span))
}

pub fn parse_if_stmt(parser: &mut Parser) -> Result<StmtId, Error> {
    let start = parser.expect(TokenKind::If)?.span.start;

    let condition = parse_expr(parser, BindingPower::Default)?;
    parser.expect_detailed(TokenKind::Then, "expected 'then' after if condition")?;
    let then_branch = parse_stmt(parser)?;

    let else_branch = if parser.current_token_kind() == TokenKind::Else {
        parser.advance();
        Some(parse_stmt(parser)?)
    } else {
        None
    };

    let span = parser.span_from(start);
    Ok(parser.alloc_stmt(
        Stmt::If {
            condition,
            then_branch,
            else_branch,
        },
        span,
    ))
}

pub fn parse_while_stmt(parser: &mut Parser) -> Result<StmtId, Error> {
    let start = parser.expect(TokenKind::While)?.span.start;

    let condition = parse_expr(parser, BindingPower::Default)?;
    parser.expect_detailed(TokenKind::Do, "expected 'do' after while condition")?;
    let body = parse_stmt(parser)?;

    let span = parser.span_from(start);
    Ok(parser.alloc_stmt(Stmt::While { condition, body }, span))
}

/// A statement starting with an identifier: `x := e`, `a[i] := e`, `p(args)`
/// or a bare `p`.
pub fn parse_identifier_stmt(parser: &mut Parser) -> Result<StmtId, Error> {
    let token = parser.expect(TokenKind::Identifier)?;
    let start = token.span.start;
    let ident = parser.alloc_ident(&token);

    let stmt = match parser.current_token_kind() {
        TokenKind::OpenParen => Stmt::ProcCall {
            callee: ident,
            arguments: parse_arguments(parser)?,
        },
        TokenKind::Assignment | TokenKind::OpenBracket => {
            let target_expr = if parser.current_token_kind() == TokenKind::OpenBracket {
                Expr::ArrayElement {
                    array: ident,
                    index: parse_index(parser)?,
                }
            } else {
                Expr::Variable(ident)
            };
            let target_span = parser.span_from(start);
            let target = parser.alloc_expr(target_expr, target_span);

            parser.expect_detailed(TokenKind::Assignment, "expected ':=' in assignment")?;
            let value = parse_expr(parser, BindingPower::Default)?;

            Stmt::Assign { target, value }
        }
        _ => Stmt::ProcCall {
            callee: ident,
            arguments: vec![],
        },
    };

    let span = parser.span_from(start);
    Ok(parser.alloc_stmt(stmt, span))
}
