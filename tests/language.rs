use std::{
    cell::RefCell,
    fs,
    io::{self, Write},
    rc::Rc,
};

use pretty_assertions::assert_eq;
use tealang::{
    error::{Error, ParseError, RuntimeError},
    get_result,
    interpreter::{
        evaluator::core::Context,
        lexer::lex,
        parser::core::strip_whitespace,
        value::{core::Value, namespace::Item},
    },
    repl::{Config, Instance},
};
use walkdir::WalkDir;

#[derive(Clone, Default)]
struct Output(Rc<RefCell<Vec<u8>>>);

impl Write for Output {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.borrow_mut().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl Output {
    fn text(&self) -> String {
        String::from_utf8_lossy(&self.0.borrow()).into_owned()
    }
}

fn init_tracing() {
    let _ = tracing_subscriber::fmt().with_test_writer().try_init();
}

#[test]
fn scripts_run() {
    init_tracing();
    let mut count = 0;

    for entry in WalkDir::new("scripts").into_iter()
                                        .filter_map(Result::ok)
                                        .filter(|e| e.path().extension().is_some_and(|ext| ext == "tea"))
    {
        count += 1;
        let path = entry.path();
        let output = Output::default();
        let context = Context::new().with_output(Box::new(output.clone()));
        let mut instance = Instance::with_context(Config::default(), context);

        if let Err(e) = instance.load(path) {
            panic!("Script {path:?} failed:\n{}\nError: {e}",
                   fs::read_to_string(path).unwrap_or_default());
        }
    }

    assert!(count > 0, "No scripts found in scripts/");
}

fn assert_success(src: &str) {
    if let Err(e) = get_result(src, false) {
        panic!("Script failed: {e}");
    }
}

fn assert_failure(src: &str) -> Error {
    match Instance::new(Config::default()).interpret(src) {
        Ok(value) => panic!("Script succeeded with '{value}' but was expected to fail"),
        Err(e) => e,
    }
}

fn assert_value(src: &str, expected: &str) {
    match Instance::new(Config::default()).interpret(src) {
        Ok(value) => assert_eq!(value, expected, "for script: {src}"),
        Err(e) => panic!("Script failed: {e}\n{src}"),
    }
}

fn printed(src: &str) -> String {
    let output = Output::default();
    let context = Context::new().with_output(Box::new(output.clone()));
    let mut instance = Instance::with_context(Config::default(), context);
    if let Err(e) = instance.interpret(src) {
        panic!("Script failed: {e}\n{src}");
    }
    output.text()
}

#[test]
fn lexing_keeps_numbers_whole() {
    let tokens = strip_whitespace(&lex("x+3.5*y")).unwrap();
    let texts = tokens.iter().map(|t| t.text.as_str()).collect::<Vec<_>>();
    assert_eq!(texts, ["x", "+", "3.5", "*", "y"]);
}

#[test]
fn relexing_stripped_tokens_is_stable() {
    let source = "let total = 0; for var i = 0; i < 10; i += 1 { total += i * 2.5; }";
    let first = strip_whitespace(&lex(source)).unwrap();
    let joined = first.iter()
                      .map(|t| t.text.as_str())
                      .collect::<Vec<_>>()
                      .join(" ");
    let second = strip_whitespace(&lex(&joined)).unwrap();

    let texts = |tokens: &[tealang::interpreter::lexer::Token]| {
        tokens.iter()
              .map(|t| (t.kind, t.text.clone()))
              .collect::<Vec<_>>()
    };
    assert_eq!(texts(&first), texts(&second));
}

#[test]
fn precedence() {
    assert_value("1+2*3;", "7");
    assert_value("(1+2)*3;", "9");
    assert_value("2^3^2;", "512");
    assert_value("10 - 2 - 3;", "5");
    assert_value("7 % 4 + 1;", "2");
    assert_value("1 < 2 && 2 < 3;", "true");
}

#[test]
fn unary_disambiguation() {
    assert_value("-3+4;", "1");
    assert_value("3-4;", "-1");
    assert_value("3--4;", "7");
    assert_value("!true || false;", "false");
    assert_value("-(2 + 3);", "-5");
    assert_value("-9223372036854775808;", "-9223372036854775808");
    assert!(matches!(assert_failure("9223372036854775808;"),
                     Error::Parse(ParseError::InvalidLiteral { .. })));
}

#[test]
fn arithmetic_and_promotion() {
    assert_value("7 / 2;", "3");
    assert_value("7.0 / 2;", "3.5");
    assert_value("1 + 0.5;", "1.5");
    assert_value("\"tea\" + \"pot\";", "teapot");
    assert_value("6 & 3;", "2");
    assert_value("true ^| true;", "false");
    assert!(matches!(assert_failure("1 / 0;"), Error::Runtime(RuntimeError::DivisionByZero { .. })));
    assert!(matches!(assert_failure("1 + \"a\";"),
                     Error::Runtime(RuntimeError::NoMatchingSignature { .. })));
}

#[test]
fn declarations() {
    assert_value("let x: int; x;", "0");
    assert_value("var s: string; s;", "");
    assert_value("var x = 3; x = 4; x;", "4");
    assert_value("var x, y = 1, 2; x;", "1");
    assert_value("var x, y = 1, 2; y;", "2");
    assert_value("var a, b: float; a + b;", "0");
    assert_value("let f: float = 2; f / 4;", "0.5");

    assert!(matches!(assert_failure("let x = 3; x = 4;"),
                     Error::Runtime(RuntimeError::ConstantMutation { .. })));
    assert!(matches!(assert_failure("var x, y = 1;"), Error::Parse(ParseError::ArityMismatch { .. })));
    assert!(matches!(assert_failure("var x;"), Error::Parse(ParseError::MissingTypeAnnotation { .. })));
    assert!(matches!(assert_failure("var x = 1; var x = 2;"),
                     Error::Runtime(RuntimeError::AlreadyDeclared { .. })));
    assert!(matches!(assert_failure("var x = 1; x = \"s\";"),
                     Error::Runtime(RuntimeError::TypeMismatch { .. })));
}

#[test]
fn assignments() {
    assert_value("var a, b = 1, 2; a, b = b, a; a * 10 + b;", "21");
    assert_value("var x = 2; x += 3; x *= 4; x -= 1; x;", "19");
    assert_value("var x = 2; x ^= 3; x;", "8");
    assert_value("var x = 1.5; x += 1; x;", "2.5");
    assert!(matches!(assert_failure("y = 1;"), Error::Runtime(RuntimeError::UnknownIdentifier { .. })));
}

#[test]
fn blocks_shadow_without_leaking() {
    assert_value("var x = 1; { let x = 2; } x;", "1");
    assert_value("var x = 1; { x = 2; } x;", "2");
    assert!(matches!(assert_failure("{ let y = 1; } y;"),
                     Error::Runtime(RuntimeError::UnknownIdentifier { .. })));
}

#[test]
fn branches() {
    assert_value("var x = 5; if x > 3 { \"big\"; } else { \"small\"; }", "big");
    assert_value("var x = 2; if x > 3 { 1; } else if x > 1 { 2; } else { 3; }", "2");
    assert_value("if false { 1; }", "");
    assert!(matches!(assert_failure("if 1 { }"), Error::Runtime(RuntimeError::ExpectedBoolean { .. })));
}

#[test]
fn loops() {
    assert_value("var i = 0; for i < 3 { i = i + 1; } i;", "3");
    assert_value("var i = 0; for i < 3 { if i == 1 { break; } i = i + 1; } i;", "1");
    assert_value("var n = 0; for { n += 1; if n == 5 { break; } } n;", "5");
    assert_value("var total = 0; for var i = 0; i < 5; i += 1 { total += i; } total;", "10");
}

#[test]
fn three_clause_loop_scoping() {
    assert!(matches!(assert_failure("for var i = 0; i < 3; i += 1 { } i;"),
                     Error::Runtime(RuntimeError::UnknownIdentifier { .. })));
    assert_value("var i = 10; for var i = 0; i < 3; i += 1 { } i;", "10");
    assert_value("var n = 0; for var i = 0; i < 3; i += 1 { let sq = i * i; n += sq; } n;", "5");
}

#[test]
fn continue_still_runs_post() {
    let src = "var odd = 0; for var i = 0; i < 6; i += 1 { if i % 2 == 0 { continue; } odd += 1; } odd;";
    assert_value(src, "3");
}

#[test]
fn matches_and_fallthrough() {
    let src = "func name(n: int): string { \
                 match n { \
                   case 1 { return \"one\"; } \
                   case 2 { fallthrough; } \
                   case 3 { return \"few\"; } \
                   default { return \"many\"; } \
                 } \
               }";
    assert_value(&format!("{src} name(1);"), "one");
    assert_value(&format!("{src} name(2);"), "few");
    assert_value(&format!("{src} name(3);"), "few");
    assert_value(&format!("{src} name(9);"), "many");
    assert_value("match 4 { case 1 { 1; } }", "");
}

#[test]
fn functions_and_closures() {
    assert_value("func add(a, b: int): int { return a + b; } add(2, 5);", "7");
    assert_value("func fact(n: int): int { if n < 2 { return 1; } return n * fact(n - 1); } fact(10);",
                 "3628800");
    assert_value("var base = 10; let offset = func(x: int): int { return x + base; }; base = 20; offset(1);",
                 "21");
    assert_value("func counter(): func { var n = 0; return func(): int { n += 1; return n; }; } \
                  let next = counter(); next(); next(); next();",
                 "3");
    assert_value("func greet(name: string) { return \"hi \" + name; } greet(\"tea\");", "hi tea");
    assert_value("func counter(): func { var n = 0; func next(): int { n += 1; return n; } return next; } \
                  let next = counter(); next(); next();",
                 "2");
    assert_value("var last = 0; var keep = null; \
                  for var i = 0; i < 3; i += 1 { let k = i; func f(): int { return k; } last = f(); keep = f; } \
                  last + keep();",
                 "4");
}

#[test]
fn return_does_not_leak_from_calls() {
    assert_value("func one(): int { return 1; } var x = one(); x = x + 1; x;", "2");
}

#[test]
fn top_level_return_stops_the_program() {
    assert_value("return 1; 2;", "1");
}

#[test]
fn signature_failures() {
    assert!(matches!(assert_failure("func f(a: int) { } f(\"s\");"),
                     Error::Runtime(RuntimeError::NoMatchingSignature { .. })));
    assert!(matches!(assert_failure("func f(a: int) { } f(1, 2);"),
                     Error::Runtime(RuntimeError::NoMatchingSignature { .. })));
    assert!(matches!(assert_failure("func f(): int { return \"s\"; } f();"),
                     Error::Runtime(RuntimeError::ReturnTypeMismatch { .. })));
    assert!(matches!(assert_failure("var x = 1; x();"), Error::Runtime(RuntimeError::NotCallable { .. })));
    assert!(matches!(assert_failure("nothing();"), Error::Runtime(RuntimeError::UnknownIdentifier { .. })));
}

#[test]
fn operator_overloads_dispatch_by_type() {
    let src = "operator +(a: int, b: int): int { return 42; } \
               operator +(a: string, b: string): string { return \"joined\"; }";
    assert_value(&format!("{src} 1 + 2;"), "42");
    assert_value(&format!("{src} \"a\" + \"b\";"), "joined");
    assert_value(&format!("{src} 1.5 + 1.5;"), "3");
}

#[test]
fn operators_are_scoped() {
    assert_value("{ operator -(a: int, b: int): int { return 0; } } 5 - 3;", "2");
    assert_value("operator .(a: string, b: string): string { return a + \"-\" + b; } \"x\" . \"y\";",
                 "x-y");
}

#[test]
fn casts() {
    assert_value("\"42\":int + 1;", "43");
    assert_value("2:float / 4;", "0");
    assert_value("7:float / 2;", "3");
    assert_value("(7:float) / 2;", "3.5");
    assert_value("typeof(7:float / 2);", "float");
    assert_value("3.9:int;", "3");
    assert_value("12:string + \"!\";", "12!");
    assert_value("(1, 2, 3):array;", "(1, 2, 3)");
    assert!(matches!(assert_failure("\"abc\":int;"), Error::Runtime(RuntimeError::InvalidCast { .. })));
    assert!(matches!(assert_failure("1:nothing;"), Error::Runtime(RuntimeError::UnknownType { .. })));
}

#[test]
fn any_follows_the_assigned_value() {
    assert_value("var x: any; x = 5; x = \"s\"; x;", "s");
    assert_value("var x: any; typeof(x);", "null");
    assert_value("var x: any = 1; x = 2.5; typeof(x);", "float");
    assert_value("var x: any = 1; x = null; typeof(x);", "null");
    assert_value("func f(x: any) { x = \"5\"; return typeof(x); } f(1);", "string");
    assert_value("func h(x: any) { x = \"5\"; return x == \"5\"; } h(1);", "true");
    assert_value("func g(x: any) { x = 2.5; return x + 1.0; } g(1);", "3.5");
    assert!(matches!(assert_failure("func g(x: any) { x = \"5\"; return x + 1; } g(1);"),
                     Error::Runtime(RuntimeError::NoMatchingSignature { .. })));
}

#[test]
fn recursion_depth_is_bounded() {
    let countdown = "func down(n: int): int { if n == 0 { return 0; } return down(n - 1) + 1; }";
    assert_value(&format!("{countdown} down(500);"), "500");
    assert!(matches!(assert_failure(&format!("{countdown} down(1000000);")),
                     Error::Runtime(RuntimeError::RecursionLimit { .. })));
}

#[test]
fn host_references_are_read_through() {
    let context = Context::new();
    let cell = Rc::new(RefCell::new(context.types.make_int(41)));
    let shared = Value::reference_to(cell.clone()).renamed("shared");
    context.global_namespace
           .borrow_mut()
           .store(Item::Value(shared), 0)
           .unwrap();
    let one = context.types.make_int(1);
    let mut instance = Instance::with_context(Config::default(), context);

    assert_eq!(instance.interpret("shared + 1;").unwrap(), "42");
    *cell.borrow_mut() = one;
    assert_eq!(instance.interpret("shared + 1;").unwrap(), "2");
    assert!(matches!(instance.interpret("shared = 5;"),
                     Err(Error::Runtime(RuntimeError::ReferenceMismatch { .. }))));
}

#[test]
fn tuples_and_arrays() {
    assert_value("len((1, 2, 3));", "3");
    assert_value("typeof((1, 2));", "array<int>");
    assert_value("typeof((1, \"a\"));", "array<any>");
    assert_value("var xs: array<float> = (1, 2); xs;", "(1, 2)");
    assert_value("typeof(1.5);", "float");
    assert_value("typeof(null);", "null");
}

#[test]
fn equality() {
    assert_value("1 == 1;", "true");
    assert_value("\"a\" != \"b\";", "true");
    assert_value("(1, 2) == (1, 2);", "true");
    assert_value("1 == 1.0;", "false");
}

#[test]
fn print_and_read() {
    assert_eq!(printed("print(\"hello\"); print(1 + 1); print();"), "hello\n2\n\n");

    let output = Output::default();
    let context = Context::new().with_output(Box::new(output.clone()))
                                .with_input(Box::new(io::Cursor::new(b"green\n".to_vec())));
    let mut instance = Instance::with_context(Config::default(), context);
    assert_eq!(instance.interpret("read(\"tea? \") + \" tea\";").unwrap(), "green tea");
    assert_eq!(output.text(), "tea? ");
}

#[test]
fn syntax_errors() {
    assert!(matches!(assert_failure("1 +;"), Error::Parse(ParseError::MissingOperand { .. })));
    assert!(matches!(assert_failure("1 2;"), Error::Parse(ParseError::MissingOperator { .. })));
    assert!(matches!(assert_failure("(1 + 2;"), Error::Parse(ParseError::UnbalancedParentheses { .. })));
    assert!(matches!(assert_failure("let x = 1 let y = 2;"),
                     Error::Parse(ParseError::MissingTerminator { .. })));
    assert!(matches!(assert_failure("var $ = 1;"), Error::Parse(ParseError::UnrecognizedToken { .. })));
    assert!(matches!(assert_failure("\"open;"), Error::Parse(ParseError::UnrecognizedToken { .. })));
    assert!(matches!(assert_failure("let if = 1;"), Error::Parse(ParseError::ReservedKeyword { .. })));
}

#[test]
fn errors_report_lines() {
    let error = assert_failure("var a = 1;\nvar b = 2;\nb = c;");
    assert!(error.to_string().starts_with("Error on line 3:"), "{error}");
}

#[test]
fn parse_errors_run_nothing() {
    assert_eq!(printed("print(1);"), "1\n");
    let output = Output::default();
    let context = Context::new().with_output(Box::new(output.clone()));
    let mut instance = Instance::with_context(Config::default(), context);
    assert!(instance.interpret("print(1); 1 +;").is_err());
    assert_eq!(output.text(), "");
}

#[test]
fn get_result_entry_point() {
    assert_success("let result = 2 + 2;");
    assert!(get_result("let y = x + 1;", false).is_err());
}
