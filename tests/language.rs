use lam::{run_with, Error, ErrorKind, Evaluator, Object};
use regex::Regex;

fn run(src: &str) -> (Result<Object, Error>, String) {
    let mut evaluator = Evaluator::with_output(Vec::new());
    let result = run_with(src, &mut evaluator);
    let output = String::from_utf8(evaluator.into_output()).expect("output is utf-8");
    (result, output)
}

fn assert_output(src: &str, expected: &str) {
    match run(src) {
        (Ok(_), output) => assert_eq!(output, expected, "script:\n{}", src),
        (Err(e), _) => panic!("Script failed: {e}\n{src}"),
    }
}

fn assert_failure(src: &str, kind: ErrorKind) -> Error {
    match run(src).0 {
        Ok(value) => panic!("Script succeeded with {value} but was expected to fail"),
        Err(e) => {
            assert_eq!(e.kind(), kind, "unexpected error: {e}");
            e
        }
    }
}

#[test]
fn hello_world() {
    assert_output(r#"println("Hello, world!")"#, "Hello, world!\n");
    assert_output(r#"print("a"); print("b")"#, "ab");
}

#[test]
fn sum_of_range() {
    let src = r#"
        # sum numbers from a to b recursively
        sum = lambda (a, b) if a > b then 0 else a + sum(a + 1, b);
        println(sum(1, 10));
    "#;
    assert_output(src, "55\n");
}

#[test]
fn higher_order_functions() {
    let src = r#"
        compose = λ (f, g) λ (x) f(g(x));
        inc = λ (x) x + 1;
        double = λ (x) x * 2;
        println(compose(inc, double)(5));
        println(compose(double, inc)(5));
    "#;
    assert_output(src, "11\n12\n");
}

#[test]
fn blocks_as_then_branches() {
    let src = r#"
        check = lambda (n) if n % 2 == 0 {
            print(n);
            println(" is even")
        } else {
            print(n);
            println(" is odd")
        };
        check(4);
        check(7)
    "#;
    assert_output(src, "4 is even\n7 is odd\n");
}

#[test]
fn closures_keep_private_state() {
    let src = r#"
        make_counter = lambda (count) lambda () count = count + 1;
        a = make_counter(0);
        b = make_counter(10);
        a(); a();
        println(a());
        println(b());
    "#;
    assert_output(src, "3\n11\n");
}

#[test]
fn printing_functions() {
    assert_output("println(lambda (x, y) x + y)", "lambda (x, y) (x + y)\n");
    assert_output("println(print)", "print() { [native code] }\n");
}

#[test]
fn logical_operators_do_not_short_circuit() {
    let src = r#"
        loud = lambda (label, value) { print(label); value };
        result = loud("a", false) && loud("b", true);
        println("");
        println(result);
        loud("c", true) || loud("d", false)
    "#;
    assert_output(src, "ab\nfalse\ncd");
}

#[test]
fn global_declaration_by_assignment() {
    assert_output("answer = 42; println(answer)", "42\n");

    let e = assert_failure("f = lambda () undeclared = 1; f()", ErrorKind::Name);
    assert_eq!(e.to_string(), "Undefined variable undeclared");
}

#[test]
fn lambda_can_write_to_declared_globals() {
    assert_output("total = 0; add = lambda (n) total = total + n; add(2); add(3); println(total)", "5\n");
}

#[test]
fn truthy_numbers_are_not_true() {
    assert_output(r#"println(if 1 then "then" else "else")"#, "else\n");
    assert_output(r#"println(if 1 == 1 then "then" else "else")"#, "then\n");
}

#[test]
fn errors_stop_evaluation() {
    let (result, output) = run(r#"print("before"); missing; print("after")"#);
    assert_eq!(result.unwrap_err().kind(), ErrorKind::Name);
    assert_eq!(output, "before");
}

#[test]
fn assignment_targets_are_checked_when_evaluated() {
    let (result, output) = run(r#"print("before"); 1 = 2"#);
    let e = result.unwrap_err();
    assert_eq!(e.kind(), ErrorKind::Type);
    assert_eq!(e.to_string(), "Cannot assign to number");
    assert_eq!(output, "before");

    let e = assert_failure("a = b = 1", ErrorKind::Type);
    assert_eq!(e.to_string(), "Cannot assign to assign");
}

#[test]
fn long_operator_chains() {
    let src = format!("println(1{})", "+1".repeat(200_000));
    assert_output(&src, "200001\n");
}

#[test]
fn positioned_errors() {
    let position = Regex::new(r" \(\d+:\d+\)$").unwrap();

    let lex = assert_failure("x = 1;\ny = $", ErrorKind::Lex);
    assert!(position.is_match(&lex.to_string()), "{lex}");
    assert_eq!(lex.to_string(), "Can't handle character: $ (2:4)");

    let unterminated = assert_failure("s = \"open", ErrorKind::Lex);
    assert!(position.is_match(&unterminated.to_string()), "{unterminated}");

    let parse = assert_failure("f(1, 2", ErrorKind::Parse);
    assert!(position.is_match(&parse.to_string()), "{parse}");

    let runtime = assert_failure("1 + true", ErrorKind::Type);
    assert!(!position.is_match(&runtime.to_string()), "{runtime}");
}

#[test]
fn call_errors() {
    let e = assert_failure(r#""text"(1)"#, ErrorKind::Call);
    assert_eq!(e.to_string(), "string \"text\" is not a function");
}

#[test]
fn runaway_recursion_is_reported() {
    let e = assert_failure("forever = lambda () forever(); forever()", ErrorKind::StackOverflow);
    assert_eq!(e.to_string(), "Maximum call depth of 10000 exceeded");
}
