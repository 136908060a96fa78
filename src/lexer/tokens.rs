use lazy_static::lazy_static;
use std::{collections::HashMap, fmt::Display};

use crate::Span;

lazy_static! {
    pub static ref RESERVED_LOOKUP: HashMap<&'static str, TokenKind> = {
        let mut map = HashMap::new();
        map.insert("program", TokenKind::Program);
        map.insert("var", TokenKind::Var);
        map.insert("function", TokenKind::Function);
        map.insert("procedure", TokenKind::Procedure);
        map.insert("begin", TokenKind::Begin);
        map.insert("end", TokenKind::End);
        map.insert("if", TokenKind::If);
        map.insert("then", TokenKind::Then);
        map.insert("else", TokenKind::Else);
        map.insert("while", TokenKind::While);
        map.insert("do", TokenKind::Do);
        map.insert("array", TokenKind::Array);
        map.insert("of", TokenKind::Of);
        map.insert("div", TokenKind::Div);
        map.insert("and", TokenKind::And);
        map.insert("or", TokenKind::Or);
        map.insert("not", TokenKind::Not);
        map.insert("true", TokenKind::True);
        map.insert("false", TokenKind::False);
        map.insert("int", TokenKind::IntType);
        map.insert("integer", TokenKind::IntType);
        map.insert("real", TokenKind::RealType);
        map.insert("bool", TokenKind::BoolType);
        map.insert("boolean", TokenKind::BoolType);
        map
    };
}

#[derive(Debug, PartialEq, Eq, Clone, Copy, Hash)]
pub enum TokenKind {
    EOF,
    Integer,
    Real,
    Identifier,

    OpenBracket,
    CloseBracket,
    OpenParen,
    CloseParen,

    Assignment, // :=
    Equals,     // =
    NotEquals,  // <>

    Less,
    LessEquals,
    Greater,
    GreaterEquals,

    Dot,
    DotDot,
    Semicolon,
    Colon,
    Comma,

    Plus,
    Dash,
    Slash,
    Star,

    // Reserved
    Program,
    Var,
    Function,
    Procedure,
    Begin,
    End,
    If,
    Then,
    Else,
    While,
    Do,
    Array,
    Of,
    Div,
    And,
    Or,
    Not,
    True,
    False,
    IntType,
    RealType,
    BoolType,
}

impl Display for TokenKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:?}", self)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    pub value: String,
    pub span: Span,
}

impl Display for Token {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Token {{\nkind: {},\nvalue: {}}}", self.kind, self.value)
    }
}

impl Token {
    pub fn is_one_of_many(&self, kinds: &[TokenKind]) -> bool {
        kinds.contains(&self.kind)
    }

    /// `int`, `real` or `bool` in any of their spellings.
    pub fn is_standard_type(&self) -> bool {
        self.is_one_of_many(&[TokenKind::IntType, TokenKind::RealType, TokenKind::BoolType])
    }

    pub fn debug(&self) {
        if self.is_one_of_many(&[TokenKind::Identifier, TokenKind::Integer, TokenKind::Real]) {
            println!("{} ({}) at {}", self.kind, self.value, self.span.start);
        } else {
            println!("{} () at {}", self.kind, self.span.start);
        }
    }
}
