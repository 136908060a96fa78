//! Program header, `var` sections and subprogram declarations.

use crate::{
    ast::{
        ast::{IdentId, Program, SubprogramDecl, SubprogramKind, VarDecl},
        types::TypeSpec,
    },
    errors::errors::Error,
    lexer::tokens::TokenKind,
};

use super::{
    parser::Parser,
    stmt::parse_compound_stmt,
    types::{parse_standard_type, parse_type},
};

/// `program ID ; [var decls] {subprogram} compound .`
pub fn parse_program(parser: &mut Parser) -> Result<Program, Error> {
    let start = parser
        .expect_detailed(TokenKind::Program, "a source file must start with 'program'")?
        .span
        .start;

    let name_token = parser.expect_detailed(TokenKind::Identifier, "expected program name")?;
    let name = parser.alloc_ident(&name_token);
    parser.expect_detailed(TokenKind::Semicolon, "expected ';' after program name")?;

    let globals = parse_var_section(parser)?;

    let mut subprograms = vec![];
    while matches!(
        parser.current_token_kind(),
        TokenKind::Function | TokenKind::Procedure
    ) {
        subprograms.push(parse_subprogram(parser)?);
    }

    let body = parse_compound_stmt(parser)?;
    parser.expect_detailed(TokenKind::Dot, "expected '.' after the program body")?;

    Ok(Program {
        name,
        globals,
        subprograms,
        body,
        span: parser.span_from(start),
    })
}

/// An optional `var` keyword followed by one or more `idlist : type ;`.
pub fn parse_var_section(parser: &mut Parser) -> Result<Vec<VarDecl>, Error> {
    let mut declarations = vec![];

    if parser.current_token_kind() != TokenKind::Var {
        return Ok(declarations);
    }
    parser.advance();

    loop {
        declarations.push(parse_var_decl(parser)?);
        parser.expect_detailed(TokenKind::Semicolon, "expected ';' after declaration")?;

        if parser.current_token_kind() != TokenKind::Identifier {
            break;
        }
    }

    Ok(declarations)
}

/// `idlist : type`, without the trailing `;`.
pub fn parse_var_decl(parser: &mut Parser) -> Result<VarDecl, Error> {
    let start = parser.get_position();

    let names = parse_ident_list(parser)?;
    parser.expect_detailed(TokenKind::Colon, "expected ':' before the type")?;
    let ty: TypeSpec = parse_type(parser)?;

    Ok(VarDecl {
        names,
        ty,
        span: parser.span_from(start),
    })
}

pub fn parse_ident_list(parser: &mut Parser) -> Result<Vec<IdentId>, Error> {
    let mut names = vec![];

    loop {
        let token = parser.expect_detailed(TokenKind::Identifier, "expected identifier")?;
        names.push(parser.alloc_ident(&token));

        if parser.current_token_kind() != TokenKind::Comma {
            break;
        }
        parser.advance();
    }

    Ok(names)
}

/// `'(' [ idlist ':' type { ';' idlist ':' type } ] ')'`, or nothing.
pub fn parse_params(parser: &mut Parser) -> Result<Vec<VarDecl>, Error> {
    let mut params = vec![];

    if parser.current_token_kind() != TokenKind::OpenParen {
        return Ok(params);
    }
    parser.advance();

    if parser.current_token_kind() != TokenKind::CloseParen {
        params.push(parse_var_decl(parser)?);

        while parser.current_token_kind() == TokenKind::Semicolon {
            parser.advance();
            params.push(parse_var_decl(parser)?);
        }
    }

    parser.expect_detailed(TokenKind::CloseParen, "expected ';' or ')' in parameter list")?;

    Ok(params)
}

/// A function or procedure: header, optional locals, body and a closing `;`.
pub fn parse_subprogram(parser: &mut Parser) -> Result<SubprogramDecl, Error> {
    let start = parser.get_position();
    let is_function = parser.advance().kind == TokenKind::Function;

    let name_token = parser.expect_detailed(TokenKind::Identifier, "expected subprogram name")?;
    let name = parser.alloc_ident(&name_token);

    let params = parse_params(parser)?;

    let kind = if is_function {
        parser.expect_detailed(TokenKind::Colon, "expected ':' and a return type")?;
        SubprogramKind::Function {
            return_kind: parse_standard_type(parser)?,
        }
    } else {
        SubprogramKind::Procedure
    };
    parser.expect_detailed(TokenKind::Semicolon, "expected ';' after subprogram header")?;

    let locals = parse_var_section(parser)?;
    let body = parse_compound_stmt(parser)?;
    parser.expect_detailed(TokenKind::Semicolon, "expected ';' after subprogram body")?;

    Ok(SubprogramDecl {
        name,
        kind,
        params,
        locals,
        body,
        span: parser.span_from(start),
    })
}
