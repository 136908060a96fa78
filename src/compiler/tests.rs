//! Unit tests for VM code generation.

use crate::{
    ast::types::{Kind, TypeSpec},
    lexer::lexer::tokenize,
    parser::parser::parse,
    type_checker::{scope::ScopeManager, type_checker::type_check},
};

use super::{
    compiler::{compile, CodegenError},
    expr::real_literal,
};

fn generate(source: &str) -> String {
    let mut ast = parse(tokenize(source).unwrap()).unwrap();
    let output = type_check(&mut ast);
    assert!(
        !output.diagnostics.has_errors(),
        "{}",
        output.diagnostics.report()
    );

    compile(&ast, &output.scopes).unwrap()
}

fn instructions(code: &str) -> Vec<&str> {
    code.lines().map(str::trim).collect()
}

/// Whether `expected` appears as a contiguous run in `lines`.
fn contains_sequence(lines: &[&str], expected: &[&str]) -> bool {
    lines.windows(expected.len()).any(|window| window == expected)
}

#[test]
fn test_minimal_program() {
    let code = generate("program p; begin end.");

    assert_eq!(code, "    START\n    STOP\n");
}

#[test]
fn test_global_assignment_and_write() {
    let code = generate("program P; var x:int; begin x := 1; write(x) end.");

    assert_eq!(
        instructions(&code),
        vec!["START", "PUSHN 1", "PUSHI 1", "STOREG 0", "PUSHG 0", "WRITEI", "STOP"]
    );
}

#[test]
fn test_labels_are_flush_left_and_instructions_indented() {
    let code = generate("program p; var b: bool; begin while b do b := false end.");

    for line in code.lines() {
        if line.ends_with(':') {
            assert!(!line.starts_with(' '), "label indented: {:?}", line);
        } else {
            assert!(line.starts_with("    "), "instruction not indented: {:?}", line);
        }
    }
}

#[test]
fn test_function_call_convention() {
    let source = "program p;
        function add(a, b: int): int;
        begin add := a + b end;
        begin write(add(1, 2)) end.";
    let code = generate(source);

    assert_eq!(
        instructions(&code),
        vec![
            "START",
            "PUSHN 1",
            "PUSHI 2",
            "PUSHI 1",
            "PUSHA fadd@Int,Int",
            "CALL",
            "POP 2",
            "WRITEI",
            "STOP",
            "fadd@Int,Int:",
            "PUSHL -1",
            "PUSHL -2",
            "ADD",
            "STOREL -3",
            "RETURN",
        ]
    );
}

#[test]
fn test_procedure_with_locals_and_local_array() {
    let source = "program p;
        procedure q;
        var t: int; a: array [0..4] of real;
        begin t := 1 end;
        begin q end.";
    let code = generate(source);

    assert_eq!(
        instructions(&code),
        vec![
            "START",
            "PUSHA pq@",
            "CALL",
            "STOP",
            "pq@:",
            "PUSHN 2",
            "PUSHI 5",
            "ALLOCN",
            "STOREL 1",
            "PUSHI 1",
            "STOREL 0",
            "RETURN",
        ]
    );
}

#[test]
fn test_global_arrays_are_allocated_at_start() {
    let code = generate("program p; var n: int; a: array [-2..2] of bool; begin end.");

    assert_eq!(
        instructions(&code),
        vec!["START", "PUSHN 2", "PUSHI 5", "ALLOCN", "STOREG 1", "STOP"]
    );
}

#[test]
fn test_if_then_else() {
    let code = generate("program p; var x: int; begin if x > 0 then x := 1 else x := 2 end.");

    assert_eq!(
        instructions(&code),
        vec![
            "START",
            "PUSHN 1",
            "PUSHG 0",
            "PUSHI 0",
            "SUP",
            "JZ L1",
            "PUSHI 1",
            "STOREG 0",
            "JUMP L0",
            "L1:",
            "PUSHI 2",
            "STOREG 0",
            "L0:",
            "STOP",
        ]
    );
}

#[test]
fn test_if_without_else() {
    let code = generate("program p; var x: int; begin if x = 0 then x := 1 end.");
    let lines = instructions(&code);

    assert!(contains_sequence(
        &lines,
        &["EQUAL", "JZ L0", "PUSHI 1", "STOREG 0", "L0:"]
    ));
}

#[test]
fn test_while_loop() {
    let code = generate("program p; var x: int; begin while x < 10 do x := x + 1 end.");

    assert_eq!(
        instructions(&code),
        vec![
            "START",
            "PUSHN 1",
            "L0:",
            "PUSHG 0",
            "PUSHI 10",
            "INF",
            "JZ L1",
            "PUSHG 0",
            "PUSHI 1",
            "ADD",
            "STOREG 0",
            "JUMP L0",
            "L1:",
            "STOP",
        ]
    );
}

#[test]
fn test_labels_are_unique_across_subprograms() {
    let source = "program p;
        var b: bool;
        procedure q; begin while b do b := false end;
        begin if b then q; while b do q end.";
    let code = generate(source);

    let mut labels = code
        .lines()
        .filter(|line| line.starts_with('L') && line.ends_with(':'))
        .collect::<Vec<&str>>();
    let count = labels.len();
    labels.sort();
    labels.dedup();

    assert_eq!(count, 5);
    assert_eq!(labels.len(), count);
}

#[test]
fn test_array_store_is_bounds_checked() {
    let source = "program p; var a: array [1..10] of int; i: int; begin a[i] := 5 end.";
    let code = generate(source);
    let lines = instructions(&code);

    assert!(contains_sequence(
        &lines,
        &[
            "PUSHG 0",
            "PUSHG 1",
            "DUP 1",
            "PUSHI 1",
            "INF",
            "JZ L0",
            "ERR \"array index out of bounds: a[1..10]\"",
            "STOP",
            "L0:",
            "DUP 1",
            "PUSHI 10",
            "SUP",
            "JZ L1",
            "ERR \"array index out of bounds: a[1..10]\"",
            "STOP",
            "L1:",
            "PUSHI 1",
            "SUB",
            "PUSHI 5",
            "STOREN",
        ]
    ));
}

#[test]
fn test_constant_index_is_still_checked() {
    let source = "program p; var a: array [1..10] of int; begin write(a[0]) end.";
    let code = generate(source);
    let lines = instructions(&code);

    assert!(contains_sequence(&lines, &["PUSHG 0", "PUSHI 0", "DUP 1", "PUSHI 1", "INF"]));
    assert!(contains_sequence(&lines, &["PUSHI 1", "SUB", "LOADN", "WRITEI"]));
}

#[test]
fn test_real_division_is_guarded() {
    let code = generate("program p; var x: int; r: real; begin r := x / 0 end.");
    let lines = instructions(&code);

    assert!(contains_sequence(
        &lines,
        &[
            "PUSHG 0",
            "ITOF",
            "PUSHI 0",
            "ITOF",
            "DUP 1",
            "PUSHF 0.000000",
            "EQUAL",
            "JZ L0",
            "ERR \"division by zero\"",
            "STOP",
            "L0:",
            "FDIV",
            "STOREG 1",
        ]
    ));
}

#[test]
fn test_integer_division_is_guarded() {
    let code = generate("program p; var x: int; begin x := x div 0 end.");
    let lines = instructions(&code);

    assert!(contains_sequence(
        &lines,
        &[
            "PUSHG 0",
            "PUSHI 0",
            "DUP 1",
            "PUSHI 0",
            "EQUAL",
            "JZ L0",
            "ERR \"division by zero\"",
            "STOP",
            "L0:",
            "DIV",
        ]
    ));
}

#[test]
fn test_mixed_arithmetic_converts_the_integer_operand() {
    let code = generate("program p; var i: int; r: real; begin r := i + 1.5; r := 2.5 * i end.");
    let lines = instructions(&code);

    assert!(contains_sequence(
        &lines,
        &["PUSHG 0", "ITOF", "PUSHF 1.500000", "FADD", "STOREG 1"]
    ));
    assert!(contains_sequence(
        &lines,
        &["PUSHF 2.500000", "PUSHG 0", "ITOF", "FMUL", "STOREG 1"]
    ));
}

#[test]
fn test_integer_arithmetic_stays_integer() {
    let code = generate("program p; var i: int; begin i := i - 2 * i end.");
    let lines = instructions(&code);

    assert!(contains_sequence(
        &lines,
        &["PUSHG 0", "PUSHI 2", "PUSHG 0", "MUL", "SUB", "STOREG 0"]
    ));
}

#[test]
fn test_int_value_stored_into_real_is_converted() {
    let code = generate("program p; var r: real; begin r := 3 end.");

    assert!(contains_sequence(
        &instructions(&code),
        &["PUSHI 3", "ITOF", "STOREG 0"]
    ));
}

#[test]
fn test_real_function_returning_an_integer() {
    let code = generate("program p; function half(n: int): real; begin half := n end; begin end.");

    assert!(contains_sequence(
        &instructions(&code),
        &["fhalf@Int:", "PUSHL -1", "ITOF", "STOREL -2", "RETURN"]
    ));
}

#[test]
fn test_mixed_comparisons() {
    let code = generate(
        "program p; var i: int; r: real; b: bool; begin b := i < r; b := r >= i; b := i <> 1 end.",
    );
    let lines = instructions(&code);

    assert!(contains_sequence(
        &lines,
        &["PUSHG 0", "PUSHG 1", "SWAP", "ITOF", "SWAP", "FINF"]
    ));
    assert!(contains_sequence(&lines, &["PUSHG 1", "PUSHG 0", "ITOF", "FSUPEQ"]));
    assert!(contains_sequence(&lines, &["PUSHG 0", "PUSHI 1", "EQUAL", "NOT"]));
}

#[test]
fn test_and_short_circuits() {
    let code = generate("program p; var a, b, c: bool; begin c := a and b end.");

    assert!(contains_sequence(
        &instructions(&code),
        &[
            "PUSHG 0", "JZ L0", "PUSHG 1", "JZ L0", "PUSHI 1", "JUMP L1", "L0:", "PUSHI 0", "L1:",
            "STOREG 2",
        ]
    ));
}

#[test]
fn test_or_is_eager() {
    let code = generate("program p; var a, b, c: bool; begin c := a or b end.");

    assert!(contains_sequence(
        &instructions(&code),
        &["PUSHG 0", "PUSHG 1", "ADD", "PUSHI 0", "SUP", "STOREG 2"]
    ));
}

#[test]
fn test_unary_operators() {
    let code = generate(
        "program p; var i: int; r: real; b: bool; begin i := -i; r := -r; b := not b end.",
    );
    let lines = instructions(&code);

    assert!(contains_sequence(&lines, &["PUSHG 0", "PUSHI -1", "MUL", "STOREG 0"]));
    assert!(contains_sequence(&lines, &["PUSHG 1", "PUSHF -1.0", "FMUL", "STOREG 1"]));
    assert!(contains_sequence(&lines, &["PUSHG 2", "NOT", "STOREG 2"]));
}

#[test]
fn test_write_selects_the_instruction_by_kind() {
    let code = generate("program p; begin write(1); write(2.5); write(true) end.");

    assert_eq!(
        instructions(&code),
        vec![
            "START",
            "PUSHI 1",
            "WRITEI",
            "PUSHF 2.500000",
            "WRITEF",
            "PUSHI 1",
            "WRITEI",
            "STOP",
        ]
    );
}

#[test]
fn test_shadowed_variable_uses_the_local_slot() {
    let source = "program p;
        var x: real;
        procedure q; var x: int; begin x := 1 end;
        begin x := 2.0 end.";
    let lines = generate(source);
    let lines = instructions(&lines);

    assert!(contains_sequence(&lines, &["PUSHF 2.000000", "STOREG 0"]));
    assert!(contains_sequence(&lines, &["PUSHI 1", "STOREL 0"]));
}

#[test]
fn test_overloads_get_distinct_labels() {
    let source = "program p;
        procedure show(n: int); begin write(n) end;
        procedure show(r: real); begin write(r) end;
        begin show(3); show(3.0) end.";
    let code = generate(source);
    let lines = instructions(&code);

    assert!(contains_sequence(&lines, &["PUSHI 3", "PUSHA pshow@Int", "CALL", "POP 1"]));
    assert!(contains_sequence(&lines, &["PUSHF 3.000000", "PUSHA pshow@Real", "CALL", "POP 1"]));
    assert!(lines.contains(&"pshow@Int:"));
    assert!(lines.contains(&"pshow@Real:"));
}

#[test]
fn test_local_array_element_access_uses_frame_slot() {
    let source = "program p;
        var g: array [1..3] of int;
        function first(n: int): int;
        var a: array [1..3] of int;
        begin a[1] := n; first := a[1] end;
        begin g[2] := first(4) end.";
    let code = generate(source);
    let lines = instructions(&code);

    assert!(contains_sequence(&lines, &["PUSHL 0", "PUSHI 1", "DUP 1"]));
    assert!(contains_sequence(&lines, &["PUSHI 1", "SUB", "LOADN", "STOREL -2"]));
}

#[test]
fn test_unchecked_tree_is_rejected() {
    let ast = parse(tokenize("program p; var x: int; begin x := 1 end.").unwrap()).unwrap();
    let scopes = ScopeManager::with_builtins();

    assert_eq!(
        compile(&ast, &scopes),
        Err(CodegenError::UnresolvedSymbol {
            name: "x".to_string()
        })
    );
}

#[test]
fn test_oversized_array_is_an_error_not_a_panic() {
    let mut ast = parse(tokenize("program p; var a: array [1..2] of int; begin end.").unwrap()).unwrap();
    let output = type_check(&mut ast);
    ast.program.globals[0].ty = TypeSpec::Array {
        begin: -i64::MAX,
        end: i64::MAX,
        element: Kind::Int,
    };

    assert_eq!(
        compile(&ast, &output.scopes),
        Err(CodegenError::ArrayTooLarge {
            name: "a".to_string()
        })
    );
}

#[test]
fn test_small_real_literal_keeps_its_value() {
    let code = generate("program p; var x: real; begin x := 1.0 / 0.0000001 end.");
    let lines = instructions(&code);

    assert!(contains_sequence(
        &lines,
        &["PUSHF 1.000000", "PUSHF 0.0000001", "DUP 1", "PUSHF 0.000000", "EQUAL"]
    ));
}

#[test]
fn test_real_literal_formatting() {
    assert_eq!(real_literal(2.5), "2.500000");
    assert_eq!(real_literal(0.1), "0.100000");
    assert_eq!(real_literal(1e-7), "0.0000001");
    assert_eq!(real_literal(1.23456789), "1.23456789");
}
