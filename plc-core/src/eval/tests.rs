use num_bigint::BigInt;

use crate::analyzer::prelude::analyze_source;
use crate::environment::prelude::{Type, Value};
use crate::eval::prelude::{Interpreter, RuntimeError, RuntimeErrorType};
use crate::parser::prelude::parse_source_str;

fn interpret(src: &str) -> (Value, String) {
    match try_interpret(src) {
        (Ok(value), output) => (value, output),
        (Err(error), _) => panic!("execution failed: {error:?}"),
    }
}

fn try_interpret(src: &str) -> (Result<Value, RuntimeError>, String) {
    let mut source = parse_source_str(src).expect("parsing failed");
    analyze_source(&mut source).expect("analysis failed");

    let mut output = Vec::new();
    let result = Interpreter::new(&mut output).execute(&source);

    (result, String::from_utf8(output).expect("invalid utf8"))
}

fn integer(value: i32) -> Value {
    Value::Integer(BigInt::from(value))
}

#[test]
fn test_hello_world() {
    let (value, output) =
        interpret(r#"DEF main(): Integer DO print("Hello, World!"); RETURN 0; END"#);

    assert_eq!(output, "Hello, World!\n");
    assert_eq!(value, integer(0));
}

#[test]
fn test_integer_division_truncates() {
    let (value, _) = interpret("DEF main(): Integer DO RETURN 7 / 2; END");
    assert_eq!(value, integer(3));

    let (value, _) = interpret("DEF main(): Integer DO RETURN -7 / 2; END");
    assert_eq!(value, integer(-3));
}

#[test]
fn test_decimal_division_rounds_half_even() {
    let (_, output) = interpret(
        r#"DEF main(): Integer DO
               print(7.0 / 2.0);
               print(5.0 / 4.0);
               RETURN 0;
           END"#,
    );

    // 1.25 rounds to 1.2 at the dividend's scale under half-to-even.
    assert_eq!(output, "3.5\n1.2\n");
}

#[test]
fn test_division_by_zero() {
    let (result, _) = try_interpret("DEF main(): Integer DO RETURN 1 / 0; END");

    assert_eq!(
        result.unwrap_err().error,
        RuntimeErrorType::DivisionByZero
    );

    let (result, _) = try_interpret(
        "DEF main(): Integer DO print(1.0 / 0.0); RETURN 0; END",
    );

    assert_eq!(
        result.unwrap_err().error,
        RuntimeErrorType::DivisionByZero
    );
}

#[test]
fn test_exact_arithmetic() {
    let (_, output) = interpret(
        r#"DEF main(): Integer DO
               print(2000000000 + 2000000000);
               print(0.1 + 0.2);
               RETURN 0;
           END"#,
    );

    // No word-size overflow, no binary floating point drift.
    assert_eq!(output, "4000000000\n0.3\n");
}

#[test]
fn test_string_concatenation() {
    let (_, output) = interpret(
        r#"DEF main(): Integer DO
               print("n = " + 42);
               print(1 + "!");
               RETURN 0;
           END"#,
    );

    assert_eq!(output, "n = 42\n1!\n");
}

#[test]
fn test_equality_is_structural() {
    let (_, output) = interpret(
        r#"DEF main(): Integer DO
               print(1000 == 1000);
               print("ab" == "a" + "b");
               print(1 != 2);
               print(1 == 2);
               RETURN 0;
           END"#,
    );

    assert_eq!(output, "true\ntrue\ntrue\nfalse\n");
}

#[test]
fn test_or_short_circuits() {
    let (value, output) = interpret(
        r#"DEF effect(): Boolean DO
               print("evaluated");
               RETURN TRUE;
           END
           DEF main(): Integer DO
               IF TRUE OR effect() DO
                   RETURN 1;
               END
               RETURN 0;
           END"#,
    );

    assert_eq!(output, "");
    assert_eq!(value, integer(1));
}

#[test]
fn test_and_evaluates_both_operands() {
    let (value, output) = interpret(
        r#"DEF effect(): Boolean DO
               print("evaluated");
               RETURN TRUE;
           END
           DEF main(): Integer DO
               IF FALSE AND effect() DO
                   RETURN 1;
               END
               RETURN 0;
           END"#,
    );

    assert_eq!(output, "evaluated\n");
    assert_eq!(value, integer(0));
}

#[test]
fn test_for_loop_runs_increment_each_iteration() {
    let (value, output) = interpret(
        r#"DEF main(): Integer DO
               LET i: Integer;
               FOR (i = 0; i < 5; i = i + 1)
                   print(i);
               END
               RETURN i;
           END"#,
    );

    assert_eq!(output, "0\n1\n2\n3\n4\n");
    assert_eq!(value, integer(5));
}

#[test]
fn test_return_unwinds_through_loops() {
    let (value, _) = interpret(
        r#"DEF find(): Integer DO
               LET i: Integer;
               FOR (i = 0; i < 10; i = i + 1)
                   IF i == 3 DO
                       RETURN i;
                   END
               END
               RETURN -1;
           END
           DEF main(): Integer DO RETURN find(); END"#,
    );

    assert_eq!(value, integer(3));
}

#[test]
fn test_while_loop() {
    let (value, output) = interpret(
        r#"DEF main(): Integer DO
               LET n: Integer = 3;
               WHILE n > 0 DO
                   print(n);
                   n = n - 1;
               END
               RETURN n;
           END"#,
    );

    assert_eq!(output, "3\n2\n1\n");
    assert_eq!(value, integer(0));
}

#[test]
fn test_method_without_return_yields_nil() {
    let (_, output) = interpret(
        r#"DEF greet(name: String) DO
               print("Hello, " + name + "!");
           END
           DEF main(): Integer DO
               print(greet("World"));
               RETURN 0;
           END"#,
    );

    assert_eq!(output, "Hello, World!\nNIL\n");
}

#[test]
fn test_uninitialized_variable_flows_nil() {
    // Reading an Integer-typed field that was never assigned yields the Nil
    // placeholder rather than a runtime type violation.
    let (value, _) = interpret("LET x: Integer; DEF main(): Integer DO RETURN x; END");

    assert_eq!(value, Value::Nil);
}

#[test]
fn test_nil_condition_is_a_type_violation() {
    let (result, _) = try_interpret(
        r#"LET b: Boolean;
           DEF main(): Integer DO
               IF b DO
                   RETURN 1;
               END
               RETURN 0;
           END"#,
    );

    assert_eq!(
        result.unwrap_err().error,
        RuntimeErrorType::TypeViolation {
            expected: Type::Boolean,
            found: Type::Nil,
        }
    );
}

#[test]
fn test_recursion() {
    let (value, _) = interpret(
        r#"DEF factorial(n: Integer): Integer DO
               IF n <= 1 DO
                   RETURN 1;
               END
               RETURN n * factorial(n - 1);
           END
           DEF main(): Integer DO RETURN factorial(5); END"#,
    );

    assert_eq!(value, integer(120));
}

#[test]
fn test_fields_are_shared_mutable_state() {
    let (value, _) = interpret(
        r#"LET counter: Integer = 0;
           DEF bump() DO
               counter = counter + 1;
           END
           DEF main(): Integer DO
               bump();
               bump();
               bump();
               RETURN counter;
           END"#,
    );

    assert_eq!(value, integer(3));
}

#[test]
fn test_block_shadowing_reverts() {
    let (_, output) = interpret(
        r#"DEF main(): Integer DO
               LET x: Integer = 1;
               IF TRUE DO
                   LET x: Integer = 2;
                   print(x);
               END
               print(x);
               RETURN 0;
           END"#,
    );

    assert_eq!(output, "2\n1\n");
}

#[test]
fn test_call_frames_do_not_see_caller_locals() {
    // `helper` resolves `x` against the global scope, not `main`'s frame.
    let (value, _) = interpret(
        r#"LET x: Integer = 10;
           DEF helper(): Integer DO RETURN x; END
           DEF main(): Integer DO
               LET x: Integer = 99;
               RETURN helper();
           END"#,
    );

    assert_eq!(value, integer(10));
}

#[test]
fn test_comparisons_three_way() {
    let (_, output) = interpret(
        r#"DEF main(): Integer DO
               print(1 < 2);
               print(2 <= 2);
               print('a' < 'b');
               print("abc" > "abd");
               RETURN 0;
           END"#,
    );

    assert_eq!(output, "true\ntrue\ntrue\nfalse\n");
}

#[test]
fn test_arguments_evaluate_left_to_right() {
    let (value, output) = interpret(
        r#"DEF log(n: Integer): Integer DO
               print(n);
               RETURN n;
           END
           DEF add(a: Integer, b: Integer): Integer DO RETURN a + b; END
           DEF main(): Integer DO RETURN add(log(1), log(2)); END"#,
    );

    assert_eq!(output, "1\n2\n");
    assert_eq!(value, integer(3));
}
