#![allow(clippy::module_inception)]

use std::fmt::Display;

use crate::{
    ast::ast::Ast,
    compiler::compiler::compile,
    errors::{
        diagnostics::Diagnostics,
        errors::{Error, ErrorImpl, ErrorTip},
    },
    lexer::lexer::tokenize,
    parser::parser::parse,
    type_checker::type_checker::type_check,
};

pub mod ast;
pub mod compiler;
pub mod errors;
pub mod lexer;
pub mod macros;
pub mod parser;
pub mod type_checker;

extern crate regex;

/// A location in the source text. `line` and `column` are 1-based.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Position {
    pub offset: u32,
    pub line: u32,
    pub column: u32,
}

impl Position {
    pub fn new(offset: u32, line: u32, column: u32) -> Self {
        Position {
            offset,
            line,
            column,
        }
    }

    pub fn null() -> Self {
        Position::new(0, 0, 0)
    }
}

impl Display for Position {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.line, self.column)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Span {
    pub start: Position,
    pub end: Position,
}

impl Span {
    pub fn new(start: Position, end: Position) -> Self {
        Span { start, end }
    }

    pub fn to(&self, other: &Span) -> Span {
        Span {
            start: self.start,
            end: other.end,
        }
    }
}

/// Everything the pipeline produced for one source file.
#[derive(Debug)]
pub struct Compilation {
    pub ast: Ast,
    pub diagnostics: Diagnostics,
    /// VM assembly, present only when type checking recorded no errors.
    pub code: Option<String>,
}

/// Runs the whole pipeline: tokenize, parse, type check and, when no errors
/// were recorded, generate VM code.
pub fn compile_source(source: &str) -> Result<Compilation, Error> {
    let tokens = tokenize(source)?;
    log::debug!("tokenized {} tokens", tokens.len());

    let mut ast = parse(tokens)?;
    let checked = type_check(&mut ast);

    let code = if checked.diagnostics.has_errors() {
        log::debug!(
            "skipping code generation, {} errors recorded",
            checked.diagnostics.errors().len()
        );
        None
    } else {
        let code = compile(&ast, &checked.scopes).map_err(|err| {
            Error::new(
                ErrorImpl::Codegen {
                    message: err.to_string(),
                },
                Position::null(),
            )
        })?;
        Some(code)
    };

    Ok(Compilation {
        ast,
        diagnostics: checked.diagnostics,
        code,
    })
}

/// Returns the 1-based line number, the full text of that line and the
/// 0-based column of `position` inside it.
pub fn get_line_at_position(content: &str, position: &Position) -> Option<(usize, String, usize)> {
    let pos = position.offset as usize;

    if pos > content.len() {
        return None;
    }

    let mut start = 0;
    let mut line_number = 1;

    for line in content.split_inclusive('\n') {
        let end = start + line.len();

        if (start..end).contains(&pos) {
            return Some((line_number, line.to_string(), pos - start));
        }

        start = end;
        line_number += 1;
    }

    // End of input: point just past the last character
    content
        .split_inclusive('\n')
        .last()
        .map(|line| (line_number - 1, line.to_string(), line.len()))
}

/// Renders a syntax error with the offending source line.
pub fn display_error(error: &Error, file: &str, content: &str) {
    /*
        Error: UnexpectedToken (...)
        -> prog.pas
           |
        20 | x := #;
           | -----^
    */

    if let ErrorTip::None = error.get_tip() {
        eprintln!("Error: {}", error.get_error_name());
    } else {
        eprintln!("Error: {} ({})", error.get_error_name(), error.get_tip());
    }
    eprintln!("-> {}:{}", file, error.get_position());

    let Some((line, line_text, line_pos)) = get_line_at_position(content, error.get_position())
    else {
        return;
    };

    let line_string = line.to_string();
    let padding = line_string.len() + 2;

    eprintln!("{:>padding$}", "|");

    let (line_text_removed, removed_whitespace) = remove_starting_whitespace(&line_text);
    eprintln!("{} | {}", line_string, line_text_removed.trim_end());

    let arrows = line_pos.saturating_sub(removed_whitespace) + 1;

    eprintln!("{:>padding$} {:->arrows$}", "|", "^");
}

fn remove_starting_whitespace(string: &str) -> (String, usize) {
    let start = string
        .chars()
        .take_while(|c| *c == ' ' || *c == '\t')
        .count();

    (String::from(&string[start..]), start)
}

#[cfg(test)]
mod tests {
    use super::{get_line_at_position, Position};

    #[test]
    fn test_get_line_at_position() {
        let content = "Hello, world!\nline two\n\nTesting { }\n";

        let (line_number, line, line_pos) =
            get_line_at_position(content, &Position::new(10, 1, 11)).unwrap();
        assert_eq!(line_number, 1);
        assert_eq!(line, "Hello, world!\n");
        assert_eq!(line_pos, 10);

        let (line_number, line, line_pos) =
            get_line_at_position(content, &Position::new(32, 4, 9)).unwrap();
        assert_eq!(line_number, 4);
        assert_eq!(line, "Testing { }\n");
        assert_eq!(line_pos, 8);
    }

    #[test]
    fn test_get_line_past_end() {
        assert!(get_line_at_position("abc", &Position::new(10, 1, 11)).is_none());
    }
}
