//! Type annotations: `int`, `real`, `bool` (and their long spellings) and
//! `array [lo..hi] of <standard type>`.

use crate::{
    ast::types::{Kind, TypeSpec},
    errors::errors::{Error, ErrorImpl},
    lexer::tokens::TokenKind,
};

use super::parser::Parser;

pub fn parse_type(parser: &mut Parser) -> Result<TypeSpec, Error> {
    if parser.current_token_kind() == TokenKind::Array {
        return parse_array_type(parser);
    }

    Ok(TypeSpec::Standard(parse_standard_type(parser)?))
}

pub fn parse_standard_type(parser: &mut Parser) -> Result<Kind, Error> {
    let kind = match parser.current_token_kind() {
        TokenKind::IntType => Kind::Int,
        TokenKind::RealType => Kind::Real,
        TokenKind::BoolType => Kind::Bool,
        _ => return Err(parser.unexpected("expected 'int', 'real' or 'bool'")),
    };

    parser.advance();
    Ok(kind)
}

pub fn parse_array_type(parser: &mut Parser) -> Result<TypeSpec, Error> {
    parser.expect(TokenKind::Array)?;
    parser.expect_detailed(TokenKind::OpenBracket, "expected '[' after 'array'")?;

    let bounds_position = parser.get_position();
    let begin = parse_signed_integer(parser)?;
    parser.expect_detailed(TokenKind::DotDot, "expected '..' between array bounds")?;
    let end = parse_signed_integer(parser)?;

    parser.expect_detailed(TokenKind::CloseBracket, "expected ']' after array bounds")?;
    parser.expect_detailed(TokenKind::Of, "expected 'of' after array bounds")?;
    let element = parse_standard_type(parser)?;

    let array = TypeSpec::Array {
        begin,
        end,
        element,
    };

    if begin > end || array.element_count().is_none() {
        return Err(Error::new(
            ErrorImpl::InvalidArrayBounds { begin, end },
            bounds_position,
        ));
    }

    Ok(array)
}

/// An integer literal with an optional leading `-`.
fn parse_signed_integer(parser: &mut Parser) -> Result<i64, Error> {
    let negative = if parser.current_token_kind() == TokenKind::Dash {
        parser.advance();
        true
    } else {
        false
    };

    let error = parser.unexpected("expected an integer array bound");
    let token = parser.expect_error(TokenKind::Integer, Some(error))?;

    let value: i64 = token.value.parse().map_err(|_| {
        Error::new(
            ErrorImpl::NumberParseError {
                token: token.value.clone(),
            },
            token.span.start,
        )
    })?;

    Ok(if negative { -value } else { value })
}
