//! Unit tests for error handling.
//!
//! This module contains tests for syntax error types and the semantic
//! diagnostic sink.

use crate::ast::types::Kind;
use crate::errors::diagnostics::{Diagnostics, SemanticError, SemanticWarning};
use crate::errors::errors::{Error, ErrorImpl, ErrorTip};
use crate::Position;

#[test]
fn test_error_creation() {
    let error = Error::new(
        ErrorImpl::UnrecognisedToken {
            token: "@".to_string(),
        },
        Position::new(10, 1, 11),
    );

    assert_eq!(error.get_error_name(), "UnrecognisedToken");
}

#[test]
fn test_error_position() {
    let error = Error::new(
        ErrorImpl::UnexpectedToken {
            token: "begin".to_string(),
        },
        Position::new(42, 3, 7),
    );

    assert_eq!(error.get_position().offset, 42);
    assert_eq!(error.get_position().line, 3);
    assert_eq!(error.get_position().column, 7);
    assert_eq!(error.to_string(), "3:7: unexpected token: \"begin\"");
}

#[test]
fn test_number_parse_error() {
    let error = Error::new(
        ErrorImpl::NumberParseError {
            token: "99999999999999999999".to_string(),
        },
        Position::null(),
    );

    assert_eq!(error.get_error_name(), "NumberParseError");
}

#[test]
fn test_invalid_array_bounds_error() {
    let error = Error::new(
        ErrorImpl::InvalidArrayBounds { begin: 5, end: 1 },
        Position::null(),
    );

    assert_eq!(error.get_error_name(), "InvalidArrayBounds");
    assert_eq!(
        error.get_tip().to_string(),
        "Array lower bound 5 is greater than upper bound 1"
    );
}

#[test]
fn test_error_tip_none() {
    let error = Error::new(
        ErrorImpl::UnrecognisedToken {
            token: "@".to_string(),
        },
        Position::null(),
    );

    assert!(matches!(error.get_tip(), ErrorTip::None));
}

#[test]
fn test_error_tip_suggestion() {
    let error = Error::new(
        ErrorImpl::UnexpectedToken {
            token: "end".to_string(),
        },
        Position::null(),
    );

    match error.get_tip() {
        ErrorTip::Suggestion(_) => (),
        _ => panic!("Expected suggestion tip"),
    }
}

#[test]
fn test_error_tip_display() {
    let tip = ErrorTip::Suggestion("Try this instead".to_string());
    assert_eq!(tip.to_string(), "Try this instead");

    let tip = ErrorTip::None;
    assert_eq!(tip.to_string(), "");
}

#[test]
fn test_semantic_error_messages() {
    let error = SemanticError::AssignmentMismatch {
        name: "x".to_string(),
        expected: Kind::Int,
        found: Kind::Bool,
    };
    assert_eq!(
        error.to_string(),
        "Cannot assign expression of type Bool to variable 'x' of type Int."
    );

    let error = SemanticError::UndeclaredProcedure {
        signature: "p@Bool".to_string(),
    };
    assert_eq!(error.to_string(), "Undeclared procedure: p@Bool");
}

#[test]
fn test_diagnostics_collects_in_order() {
    let mut diagnostics = Diagnostics::new();
    assert!(!diagnostics.has_errors());

    diagnostics.warning(
        SemanticWarning::ImplicitIntToReal {
            context: "addition".to_string(),
        },
        Position::new(0, 2, 5),
    );
    assert!(!diagnostics.has_errors());

    diagnostics.error(
        SemanticError::UndeclaredVariable {
            name: "a".to_string(),
        },
        Position::new(0, 3, 1),
    );
    diagnostics.error(
        SemanticError::UndeclaredVariable {
            name: "b".to_string(),
        },
        Position::new(0, 4, 1),
    );

    assert!(diagnostics.has_errors());
    assert_eq!(diagnostics.warnings().len(), 1);
    assert_eq!(diagnostics.errors().len(), 2);
    assert_eq!(diagnostics.errors()[0].position.line, 3);
    assert_eq!(diagnostics.errors()[1].position.line, 4);
}

#[test]
fn test_diagnostics_report_prints_warnings_first() {
    let mut diagnostics = Diagnostics::new();
    diagnostics.error(
        SemanticError::MissingReturn {
            function: "f".to_string(),
        },
        Position::new(0, 1, 10),
    );
    diagnostics.warning(
        SemanticWarning::ImplicitIntToReal {
            context: "assignment to 'x'".to_string(),
        },
        Position::new(0, 2, 3),
    );

    let report = diagnostics.report();
    let warning_at = report.find("Warning:2:3").unwrap();
    let errors_at = report.find("** Found 1 Errors **").unwrap();
    assert!(warning_at < errors_at);
    assert!(report.contains("Error:1:10 Message: Function 'f' is missing a return assignment"));
}
