//! Utility macros for the lexer.
//!
//! - `MK_TOKEN!` builds a [`Token`](crate::lexer::tokens::Token)
//! - `MK_DEFAULT_HANDLER!` builds a lexer handler for a fixed piece of text

/// Creates a Token instance.
///
/// ```ignore
/// let token = MK_TOKEN!(TokenKind::Integer, "42".to_string(), span);
/// ```
#[macro_export]
macro_rules! MK_TOKEN {
    ($kind:expr, $value:expr, $span:expr) => {
        Token {
            kind: $kind,
            value: $value,
            span: $span,
        }
    };
}

/// Creates a handler that emits one token of `$kind` for the literal text
/// `$value` and moves the lexer past it.
///
/// ```ignore
/// RegexPattern {
///     regex: Regex::new("^:=").unwrap(),
///     handler: MK_DEFAULT_HANDLER!(TokenKind::Assignment, ":="),
/// }
/// ```
#[macro_export]
macro_rules! MK_DEFAULT_HANDLER {
    ($kind:expr, $value:literal) => {
        |lexer: &mut Lexer, _regex: &Regex| {
            let start = lexer.position();
            lexer.advance_n($value.len());
            lexer.push(MK_TOKEN!(
                $kind,
                String::from($value),
                Span::new(start, lexer.position())
            ));
        }
    };
}
