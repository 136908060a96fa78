use crate::{
    ast::{
        ast::ExprId,
        expressions::{BinaryOperator, Expr, UnaryOperator},
    },
    errors::errors::{Error, ErrorImpl},
    lexer::tokens::TokenKind,
    Span,
};

use super::{lookups::BindingPower, parser::Parser};

pub fn parse_expr(parser: &mut Parser, bp: BindingPower) -> Result<ExprId, Error> {
    // First parse NUD
    let token_kind = parser.current_token_kind();
    let Some(nud_fn) = parser.get_nud_lookup().get(&token_kind).copied() else {
        return Err(parser.unexpected("expected an expression"));
    };

    let mut left = nud_fn(parser)?;

    // While LED and current BP is less than BP of current token, continue parsing lhs
    while parser.current_binding_power() > bp {
        let token_kind = parser.current_token_kind();
        let Some(led_fn) = parser.get_led_lookup().get(&token_kind).copied() else {
            return Err(parser.unexpected("expected an operator"));
        };

        let operator_bp = parser.current_binding_power();
        left = led_fn(parser, left, operator_bp)?;
    }

    Ok(left)
}

pub fn parse_primary_expr(parser: &mut Parser) -> Result<ExprId, Error> {
    let token = parser.current_token().clone();

    let expr = match token.kind {
        TokenKind::Integer => Expr::Integer(token.value.parse().map_err(|_| {
            Error::new(
                ErrorImpl::NumberParseError {
                    token: token.value.clone(),
                },
                token.span.start,
            )
        })?),
        TokenKind::Real => Expr::Real(token.value.parse().map_err(|_| {
            Error::new(
                ErrorImpl::NumberParseError {
                    token: token.value.clone(),
                },
                token.span.start,
            )
        })?),
        TokenKind::True => Expr::Boolean(true),
        TokenKind::False => Expr::Boolean(false),
        _ => return Err(parser.unexpected("expected a literal")),
    };

    parser.advance();
    Ok(parser.alloc_expr(expr, token.span))
}

/// `ID`, `ID[index]` or `ID(arguments)`.
pub fn parse_identifier_expr(parser: &mut Parser) -> Result<ExprId, Error> {
    let token = parser.expect(TokenKind::Identifier)?;
    let ident = parser.alloc_ident(&token);

    let expr = match parser.current_token_kind() {
        TokenKind::OpenParen => Expr::Call {
            callee: ident,
            arguments: parse_arguments(parser)?,
        },
        TokenKind::OpenBracket => Expr::ArrayElement {
            array: ident,
            index: parse_index(parser)?,
        },
        _ => Expr::Variable(ident),
    };

    let span = parser.span_from(token.span.start);
    Ok(parser.alloc_expr(expr, span))
}

/// `'(' [ expr { ',' expr } ] ')'`
pub fn parse_arguments(parser: &mut Parser) -> Result<Vec<ExprId>, Error> {
    parser.expect(TokenKind::OpenParen)?;

    let mut arguments = vec![];

    if parser.current_token_kind() != TokenKind::CloseParen {
        arguments.push(parse_expr(parser, BindingPower::Default)?);

        while parser.current_token_kind() == TokenKind::Comma {
            parser.advance();
            arguments.push(parse_expr(parser, BindingPower::Default)?);
        }
    }

    parser.expect_detailed(TokenKind::CloseParen, "expected ',' or ')' in argument list")?;

    Ok(arguments)
}

/// `'[' expr ']'`
pub fn parse_index(parser: &mut Parser) -> Result<ExprId, Error> {
    parser.expect(TokenKind::OpenBracket)?;
    let index = parse_expr(parser, BindingPower::Default)?;
    parser.expect_detailed(TokenKind::CloseBracket, "expected ']' after array index")?;

    Ok(index)
}

pub fn parse_binary_expr(
    parser: &mut Parser,
    left: ExprId,
    bp: BindingPower,
) -> Result<ExprId, Error> {
    let operator_token = parser.advance().clone();

    let operator = match operator_token.kind {
        TokenKind::Plus => BinaryOperator::Add,
        TokenKind::Dash => BinaryOperator::Subtract,
        TokenKind::Star => BinaryOperator::Multiply,
        TokenKind::Slash => BinaryOperator::Divide,
        TokenKind::Div => BinaryOperator::IntDivide,
        TokenKind::Greater => BinaryOperator::Greater,
        TokenKind::Less => BinaryOperator::Less,
        TokenKind::GreaterEquals => BinaryOperator::GreaterEquals,
        TokenKind::LessEquals => BinaryOperator::LessEquals,
        TokenKind::Equals => BinaryOperator::Equals,
        TokenKind::NotEquals => BinaryOperator::NotEquals,
        TokenKind::And => BinaryOperator::And,
        TokenKind::Or => BinaryOperator::Or,
        _ => {
            return Err(Error::new(
                ErrorImpl::UnexpectedToken {
                    token: operator_token.value,
                },
                operator_token.span.start,
            ))
        }
    };

    let right = parse_expr(parser, bp)?;
    let span = parser.expr_span(left).to(&parser.expr_span(right));

    Ok(parser.alloc_expr(
        Expr::Binary {
            operator,
            left,
            right,
        },
        span,
    ))
}

pub fn parse_prefix_expr(parser: &mut Parser) -> Result<ExprId, Error> {
    let operator_token = parser.advance().clone();

    let operator = match operator_token.kind {
        TokenKind::Dash => UnaryOperator::Negate,
        TokenKind::Not => UnaryOperator::Not,
        _ => {
            return Err(Error::new(
                ErrorImpl::UnexpectedToken {
                    token: operator_token.value,
                },
                operator_token.span.start,
            ))
        }
    };

    let operand = parse_expr(parser, BindingPower::Unary)?;
    let span = Span::new(operator_token.span.start, parser.expr_span(operand).end);

    Ok(parser.alloc_expr(Expr::Unary { operator, operand }, span))
}

pub fn parse_grouping_expr(parser: &mut Parser) -> Result<ExprId, Error> {
    parser.expect(TokenKind::OpenParen)?;
    let expr = parse_expr(parser, BindingPower::Default)?;
    parser.expect_detailed(TokenKind::CloseParen, "expected ')' to close the group")?;

    Ok(expr)
}
