//! Integration tests for end-to-end compilation.
//!
//! These tests drive source text through tokenization, parsing, type checking
//! and VM code generation, and run the `minipascal` binary against temporary
//! files.

use std::{fs, process::Command};

use minipascal::{
    compile_source,
    errors::diagnostics::{SemanticError, SemanticWarning},
    lexer::lexer::tokenize,
    parser::parser::parse,
    type_checker::type_checker::type_check,
};

fn instructions(code: &str) -> Vec<&str> {
    code.lines().map(str::trim).collect()
}

fn contains_sequence(lines: &[&str], expected: &[&str]) -> bool {
    lines.windows(expected.len()).any(|window| window == expected)
}

fn compile_ok(source: &str) -> String {
    let compilation = compile_source(source).unwrap();
    assert!(
        !compilation.diagnostics.has_errors(),
        "{}",
        compilation.diagnostics.report()
    );
    compilation.code.unwrap()
}

#[test]
fn test_compile_simple_program() {
    let compilation = compile_source("program P; var x:int; begin x := 1; write(x) end.").unwrap();

    assert!(compilation.diagnostics.errors().is_empty());
    assert!(compilation.diagnostics.warnings().is_empty());
    assert_eq!(
        instructions(&compilation.code.unwrap()),
        vec!["START", "PUSHN 1", "PUSHI 1", "STOREG 0", "PUSHG 0", "WRITEI", "STOP"]
    );
}

#[test]
fn test_compile_program_with_subprograms() {
    let source = "
program sums;
var total: int; values: array [1..3] of int;

function sum(n: int): int;
var i, acc: int;
begin
    i := 1;
    acc := 0;
    while i <= n do
    begin
        acc := acc + values[i];
        i := i + 1
    end;
    sum := acc
end;

procedure show(x: int);
begin
    write(x)
end;

begin
    values[1] := 10;
    values[2] := 20;
    values[3] := 30;
    total := sum(3);
    show(total)
end.
";
    let code = compile_ok(source);
    let lines = instructions(&code);

    assert_eq!(lines[0], "START");
    assert!(lines.contains(&"fsum@Int:"));
    assert!(lines.contains(&"pshow@Int:"));
    assert!(contains_sequence(
        &lines,
        &["PUSHN 1", "PUSHI 3", "PUSHA fsum@Int", "CALL", "POP 1", "STOREG 0"]
    ));
    assert!(contains_sequence(
        &lines,
        &["PUSHG 0", "PUSHA pshow@Int", "CALL", "POP 1", "STOP"]
    ));
    assert_eq!(lines.iter().filter(|line| **line == "RETURN").count(), 2);
}

#[test]
fn test_shadowed_names_resolve_to_the_innermost_declaration() {
    let source = "
program p;
var x: real;
procedure q;
var x: int;
begin x := 1 end;
begin x := 2.5; q end.
";
    let code = compile_ok(source);
    let lines = instructions(&code);

    assert!(contains_sequence(&lines, &["PUSHF 2.500000", "STOREG 0"]));
    assert!(contains_sequence(&lines, &["PUSHI 1", "STOREL 0"]));
}

#[test]
fn test_overloads_resolve_by_argument_kinds() {
    let source = "
program p;
function twice(a: int): int; begin twice := a * 2 end;
function twice(a: real): real; begin twice := a * 2.0 end;
begin write(twice(1)); write(twice(1.5)) end.
";
    let code = compile_ok(source);
    let lines = instructions(&code);

    assert!(contains_sequence(&lines, &["PUSHA ftwice@Int", "CALL", "POP 1", "WRITEI"]));
    assert!(contains_sequence(&lines, &["PUSHA ftwice@Real", "CALL", "POP 1", "WRITEF"]));
}

#[test]
fn test_duplicate_overload_is_rejected() {
    let source = "
program p;
procedure q(a: int); begin end;
procedure q(b: int); begin end;
begin q(1) end.
";
    let compilation = compile_source(source).unwrap();

    assert!(compilation.code.is_none());
    assert_eq!(
        compilation.diagnostics.errors()[0].kind,
        SemanticError::ProcedureRedefinition {
            name: "q@Int".to_string()
        }
    );
}

#[test]
fn test_checking_twice_gives_identical_results() {
    let source = "program p; var x: int; y: real; begin y := x + 1.0; y := x end.";
    let mut ast = parse(tokenize(source).unwrap()).unwrap();

    let first = type_check(&mut ast);
    let kinds_after_first = ast
        .arena
        .exprs()
        .map(|(_, node)| node.kind)
        .collect::<Vec<_>>();

    let second = type_check(&mut ast);
    let kinds_after_second = ast
        .arena
        .exprs()
        .map(|(_, node)| node.kind)
        .collect::<Vec<_>>();

    assert_eq!(first.diagnostics, second.diagnostics);
    assert_eq!(kinds_after_first, kinds_after_second);
    assert_eq!(second.diagnostics.warnings().len(), 2);
}

#[test]
fn test_function_without_return_assignment_fails() {
    let source = "program p; var x: int; function f: int; begin x := 1 end; begin x := f() end.";
    let compilation = compile_source(source).unwrap();

    assert!(compilation.code.is_none());
    assert_eq!(
        compilation.diagnostics.errors()[0].kind,
        SemanticError::MissingReturn {
            function: "f".to_string()
        }
    );
    assert!(compilation
        .diagnostics
        .report()
        .contains("Function 'f' is missing a return assignment"));
}

#[test]
fn test_integer_return_from_real_function_is_converted() {
    let source = "program p; function f: real; begin f := 1 end; begin write(f()) end.";
    let compilation = compile_source(source).unwrap();

    assert_eq!(
        compilation.diagnostics.warnings()[0].kind,
        SemanticWarning::ImplicitReturnCast {
            function: "f".to_string()
        }
    );

    let code = compilation.code.unwrap();
    let lines = instructions(&code);
    assert!(contains_sequence(&lines, &["PUSHI 1", "ITOF", "STOREL -1"]));
}

#[test]
fn test_array_accesses_emit_bounds_checks() {
    let source = "program p; var a: array [1..10] of int; begin a[3] := a[4] end.";
    let code = compile_ok(source);
    let lines = instructions(&code);

    assert_eq!(
        lines
            .iter()
            .filter(|line| line.starts_with("ERR \"array index out of bounds"))
            .count(),
        4
    );
    assert!(contains_sequence(&lines, &["DUP 1", "PUSHI 1", "INF"]));
    assert!(contains_sequence(&lines, &["DUP 1", "PUSHI 10", "SUP"]));
    assert!(contains_sequence(&lines, &["PUSHI 1", "SUB", "LOADN", "STOREN"]));
}

#[test]
fn test_divisions_emit_zero_checks() {
    let source = "program p; var i: int; r: real; begin i := 7 div i; r := r / 2 end.";
    let code = compile_ok(source);
    let lines = instructions(&code);

    assert_eq!(
        lines
            .iter()
            .filter(|line| **line == "ERR \"division by zero\"")
            .count(),
        2
    );
    assert!(contains_sequence(&lines, &["PUSHI 0", "EQUAL"]));
    assert!(contains_sequence(&lines, &["PUSHF 0.000000", "EQUAL"]));
    assert!(lines.contains(&"DIV"));
    assert!(lines.contains(&"FDIV"));
}

#[test]
fn test_syntax_error_stops_the_pipeline() {
    let result = compile_source("program p; begin x := end.");

    let error = result.unwrap_err();
    assert_eq!(error.get_position().line, 1);
}

#[test]
fn test_semantic_errors_suppress_code_generation() {
    let source = "
program p;
var b: bool;
begin
    b := 1;
    y := 2;
    if 3 then b := true
end.
";
    let compilation = compile_source(source).unwrap();

    assert!(compilation.code.is_none());
    assert_eq!(compilation.diagnostics.errors().len(), 3);
    assert!(matches!(
        compilation.diagnostics.errors()[1].kind,
        SemanticError::UndeclaredVariable { .. }
    ));
    assert_eq!(compilation.diagnostics.errors()[2].position.line, 7);
}

#[test]
fn test_cli_writes_vm_code() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("prog.pas");
    let output = dir.path().join("out").join("prog.vm");
    fs::write(&input, "program P; var x:int; begin x := 1; write(x) end.").unwrap();

    let status = Command::new(env!("CARGO_BIN_EXE_minipascal"))
        .arg(&input)
        .arg("--output")
        .arg(&output)
        .status()
        .unwrap();

    assert!(status.success());
    let code = fs::read_to_string(&output).unwrap();
    assert!(code.starts_with("    START\n"));
    assert!(code.ends_with("    STOP\n"));
}

#[test]
fn test_cli_reports_semantic_errors() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("bad.pas");
    let output = dir.path().join("bad.vm");
    fs::write(&input, "program p; begin y := 1 end.").unwrap();

    let result = Command::new(env!("CARGO_BIN_EXE_minipascal"))
        .arg(&input)
        .arg("-o")
        .arg(&output)
        .output()
        .unwrap();

    assert!(!result.status.success());
    assert!(!output.exists());
    let stderr = String::from_utf8_lossy(&result.stderr);
    assert!(stderr.contains("Undeclared variable: y"));
}
