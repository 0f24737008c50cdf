use scheme::{Interpreter, SchemeError};

fn eval(interp: &mut Interpreter, input: &str) -> String {
    interp
        .run(input)
        .expect("evaluation failed")
        .expect("input held no form")
}

fn eval_err(interp: &mut Interpreter, input: &str) -> SchemeError {
    interp
        .run(input)
        .expect_err("evaluation should have failed")
}

#[test]
fn self_evaluating_numbers() {
    let mut interp = Interpreter::new();
    assert_eq!(eval(&mut interp, "42"), "42");
    assert_eq!(eval(&mut interp, "-17"), "-17");
    assert_eq!(eval(&mut interp, "+3"), "3");
}

#[test]
fn arithmetic() {
    let mut interp = Interpreter::new();
    assert_eq!(eval(&mut interp, "(+ 1 2 3)"), "6");
    assert_eq!(eval(&mut interp, "(+)"), "0");
    assert_eq!(eval(&mut interp, "(*)"), "1");
    assert_eq!(eval(&mut interp, "(* 2 3 4)"), "24");
    assert_eq!(eval(&mut interp, "(- 5)"), "-5");
    assert_eq!(eval(&mut interp, "(- 10 1 2)"), "7");
    assert_eq!(eval(&mut interp, "(/ 7 2)"), "3");
    assert_eq!(eval(&mut interp, "(/ 2)"), "0");
    assert_eq!(eval(&mut interp, "(/ 100 5 2)"), "10");
    assert_eq!(eval(&mut interp, "(abs -4)"), "4");
    assert_eq!(eval(&mut interp, "(max 1 5 3)"), "5");
    assert_eq!(eval(&mut interp, "(min 4 2 9)"), "2");
}

#[test]
fn arithmetic_identities() {
    let mut interp = Interpreter::new();
    assert_eq!(eval(&mut interp, "(+ 5)"), "5");
    assert_eq!(eval(&mut interp, "(* 7)"), "7");
    assert_eq!(eval(&mut interp, "(- 3 3)"), "0");
    assert_eq!(eval(&mut interp, "(abs -9)"), "9");
}

#[test]
fn numeric_comparison() {
    let mut interp = Interpreter::new();
    assert_eq!(eval(&mut interp, "(= 1 1 1)"), "#t");
    assert_eq!(eval(&mut interp, "(= 1 2)"), "#f");
    assert_eq!(eval(&mut interp, "(< 1 2 3)"), "#t");
    assert_eq!(eval(&mut interp, "(< 1 3 2)"), "#f");
    assert_eq!(eval(&mut interp, "(> 3 2 1)"), "#t");
    assert_eq!(eval(&mut interp, "(<= 1 1 2)"), "#t");
    assert_eq!(eval(&mut interp, "(>= 2 2 1)"), "#t");
    // With fewer than two arguments every relation holds.
    assert_eq!(eval(&mut interp, "(=)"), "#t");
    assert_eq!(eval(&mut interp, "(< 5)"), "#t");
}

#[test]
fn booleans_and_predicates() {
    let mut interp = Interpreter::new();
    assert_eq!(eval(&mut interp, "#t"), "#t");
    assert_eq!(eval(&mut interp, "#f"), "#f");
    assert_eq!(eval(&mut interp, "(not #f)"), "#t");
    assert_eq!(eval(&mut interp, "(not 0)"), "#f");
    assert_eq!(eval(&mut interp, "(boolean? #t)"), "#t");
    assert_eq!(eval(&mut interp, "(boolean? (quote x))"), "#f");
    assert_eq!(eval(&mut interp, "(number? 3)"), "#t");
    assert_eq!(eval(&mut interp, "(number? (quote a))"), "#f");
    assert_eq!(eval(&mut interp, "(symbol? (quote a))"), "#t");
    assert_eq!(eval(&mut interp, "(null? (quote ()))"), "#t");
    assert_eq!(eval(&mut interp, "(null? 1)"), "#f");
}

#[test]
fn list_predicates() {
    let mut interp = Interpreter::new();
    assert_eq!(eval(&mut interp, "(list? '(1 2 . 3))"), "#f");
    assert_eq!(eval(&mut interp, "(list? '(1 2 3))"), "#t");
    assert_eq!(eval(&mut interp, "(list? '())"), "#t");
    assert_eq!(eval(&mut interp, "(pair? '())"), "#f");
    assert_eq!(eval(&mut interp, "(pair? '(1))"), "#t");
}

#[test]
fn pairs_and_lists() {
    let mut interp = Interpreter::new();
    assert_eq!(eval(&mut interp, "(cons 1 2)"), "(1 . 2)");
    assert_eq!(eval(&mut interp, "(cons 1 (cons 2 (cons 3 '())))"), "(1 2 3)");
    assert_eq!(eval(&mut interp, "(car (cdr '(a b c)))"), "b");
    assert_eq!(eval(&mut interp, "(list)"), "()");
    assert_eq!(eval(&mut interp, "(list 1 2 3)"), "(1 2 3)");
    assert_eq!(eval(&mut interp, "(list 1 '(2 3) 4)"), "(1 (2 3) 4)");
}

#[test]
fn pair_mutation() {
    let mut interp = Interpreter::new();
    assert_eq!(eval(&mut interp, "(define p (cons 1 2))"), "()");
    assert_eq!(eval(&mut interp, "(set-car! p 9)"), "()");
    assert_eq!(eval(&mut interp, "p"), "(9 . 2)");
    assert_eq!(eval(&mut interp, "(set-cdr! p '(8 7))"), "()");
    assert_eq!(eval(&mut interp, "p"), "(9 8 7)");
}

#[test]
fn quoting() {
    let mut interp = Interpreter::new();
    assert_eq!(eval(&mut interp, "'a"), "a");
    assert_eq!(eval(&mut interp, "'()"), "()");
    assert_eq!(eval(&mut interp, "'(1 . 2)"), "(1 . 2)");
    assert_eq!(eval(&mut interp, "'(1 2 . 3)"), "(1 2 . 3)");
    assert_eq!(eval(&mut interp, "''x"), "(quote x)");
    assert_eq!(eval(&mut interp, "(quote (a b))"), "(a b)");
}

#[test]
fn list_access() {
    let mut interp = Interpreter::new();
    assert_eq!(eval(&mut interp, "(list-ref '(a b c) 0)"), "a");
    assert_eq!(eval(&mut interp, "(list-ref '(a b c) 2)"), "c");
    // list-tail always takes at least one chain step: a count of 0
    // behaves like 1.
    assert_eq!(eval(&mut interp, "(list-tail '(1 2 3) 0)"), "(2 3)");
    assert_eq!(eval(&mut interp, "(list-tail '(1 2 3) 1)"), "(2 3)");
    assert_eq!(eval(&mut interp, "(list-tail '(1 2 3) 2)"), "(3)");
    assert_eq!(eval(&mut interp, "(list-tail '(1 2 3) 3)"), "()");
    assert!(matches!(
        eval_err(&mut interp, "(list-ref '(a b c) 3)"),
        SchemeError::Runtime(_)
    ));
}

#[test]
fn conditionals() {
    let mut interp = Interpreter::new();
    assert_eq!(eval(&mut interp, "(if #t 1 2)"), "1");
    assert_eq!(eval(&mut interp, "(if #f 1 2)"), "2");
    // Everything except #f is true.
    assert_eq!(eval(&mut interp, "(if 0 'yes 'no)"), "yes");
    assert_eq!(eval(&mut interp, "(if '() 'yes 'no)"), "yes");
    // A false predicate with no alternative yields the empty list.
    assert_eq!(eval(&mut interp, "(if #f 1)"), "()");
}

#[test]
fn and_or() {
    let mut interp = Interpreter::new();
    assert_eq!(eval(&mut interp, "(and)"), "#t");
    assert_eq!(eval(&mut interp, "(or)"), "#f");
    assert_eq!(eval(&mut interp, "(and 1 2)"), "2");
    assert_eq!(eval(&mut interp, "(and #f 2)"), "#f");
    assert_eq!(eval(&mut interp, "(and 1 #f 2)"), "#f");
    assert_eq!(eval(&mut interp, "(or #f 3)"), "3");
    assert_eq!(eval(&mut interp, "(or #f #f)"), "#f");
    assert_eq!(eval(&mut interp, "(or 1 2)"), "1");
}

#[test]
fn begin_sequences() {
    let mut interp = Interpreter::new();
    assert_eq!(eval(&mut interp, "(begin 1 2 3)"), "3");
    assert_eq!(eval(&mut interp, "(begin (define z 5) z)"), "5");
    assert_eq!(eval(&mut interp, "z"), "5");
}

#[test]
fn definitions_persist_across_inputs() {
    let mut interp = Interpreter::new();
    assert_eq!(eval(&mut interp, "(define x 1)"), "()");
    assert_eq!(eval(&mut interp, "x"), "1");
    assert_eq!(eval(&mut interp, "(set! x (+ x 10))"), "()");
    assert_eq!(eval(&mut interp, "x"), "11");
}

#[test]
fn define_shadows_locally() {
    let mut interp = Interpreter::new();
    eval(&mut interp, "(define x 10)");
    eval(&mut interp, "(define (f x) (+ x 1))");
    assert_eq!(eval(&mut interp, "(f 5)"), "6");
    assert_eq!(eval(&mut interp, "x"), "10");
}

#[test]
fn set_reaches_through_the_chain() {
    let mut interp = Interpreter::new();
    eval(&mut interp, "(define counter 0)");
    eval(&mut interp, "(define (bump) (set! counter (+ counter 1)))");
    eval(&mut interp, "(bump)");
    eval(&mut interp, "(bump)");
    assert_eq!(eval(&mut interp, "counter"), "2");
}

#[test]
fn lambdas_and_closures() {
    let mut interp = Interpreter::new();
    assert_eq!(eval(&mut interp, "((lambda (x y) (+ x y)) 3 4)"), "7");
    eval(&mut interp, "(define (make-adder n) (lambda (x) (+ x n)))");
    eval(&mut interp, "(define add2 (make-adder 2))");
    assert_eq!(eval(&mut interp, "(add2 40)"), "42");
    // Multi-expression bodies evaluate in order.
    eval(&mut interp, "(define (two) (define a 1) (+ a 1))");
    assert_eq!(eval(&mut interp, "(two)"), "2");
}

#[test]
fn recursive_define() {
    let mut interp = Interpreter::new();
    assert_eq!(
        eval(
            &mut interp,
            "(define (fact n) (if (= n 0) 1 (* n (fact (- n 1)))))"
        ),
        "()"
    );
    assert_eq!(eval(&mut interp, "(fact 5)"), "120");
    assert_eq!(eval(&mut interp, "(fact 0)"), "1");
}

#[test]
fn tail_calls_do_not_grow_the_stack() {
    let mut interp = Interpreter::new();
    eval(
        &mut interp,
        "(define (loop n) (if (= n 0) 'done (loop (- n 1))))",
    );
    assert_eq!(eval(&mut interp, "(loop 100000)"), "done");
}

#[test]
fn tail_calls_through_nested_syntax() {
    let mut interp = Interpreter::new();
    eval(
        &mut interp,
        "(define (run n) (begin (if (= n 0) 'over (run (- n 1)))))",
    );
    assert_eq!(eval(&mut interp, "(run 100000)"), "over");
    eval(
        &mut interp,
        "(define (dive n) (and #t (if (= n 0) 'bottom (dive (- n 1)))))",
    );
    assert_eq!(eval(&mut interp, "(dive 100000)"), "bottom");
}

#[test]
fn callables_print_by_kind() {
    let mut interp = Interpreter::new();
    assert_eq!(eval(&mut interp, "(lambda (x) x)"), "Lambda");
    assert_eq!(eval(&mut interp, "if"), "BuiltInSyntax");
    assert_eq!(eval(&mut interp, "car"), "BuiltInProcedure");
}

#[test]
fn environments_print_their_names() {
    use scheme::printer::print_val;
    use scheme::Value;

    let mut interp = Interpreter::new();
    let env = interp.heap.alloc_env(None);
    let a = interp.symbols.intern("a");
    let b = interp.symbols.intern("b");
    interp.heap.env_define(env, a, Value::Number(1));
    interp.heap.env_define(env, b, Value::Number(2));
    assert_eq!(
        print_val(Value::Env(env), &interp.heap, &interp.symbols),
        "Environment { a b }"
    );
}

#[test]
fn improper_argument_lists_contribute_their_tail() {
    let mut interp = Interpreter::new();
    assert_eq!(eval(&mut interp, "(+ 1 . 2)"), "3");
}

#[test]
fn blank_input_reads_no_form() {
    let mut interp = Interpreter::new();
    assert!(interp.run("").unwrap().is_none());
    assert!(interp.run("   \t").unwrap().is_none());
    // Only the first form on a line is evaluated.
    assert_eq!(eval(&mut interp, "1 2"), "1");
}

#[test]
fn multi_form_sources_evaluate_in_order() {
    let mut interp = Interpreter::new();
    let source = "(define a 1)\n(define b (+ a 1))\nb";
    let mut pos = 0;
    let mut outputs = Vec::new();
    while let Some((text, next)) = interp.run_at(source, pos).unwrap() {
        outputs.push(text);
        pos = next;
    }
    assert_eq!(outputs, vec!["()", "()", "2"]);
}

#[test]
fn evaluating_the_empty_list_fails() {
    let mut interp = Interpreter::new();
    match eval_err(&mut interp, "()") {
        SchemeError::Runtime(msg) => assert_eq!(msg, "() cannot be evaluated"),
        other => panic!("expected a runtime error, got {:?}", other),
    }
}

#[test]
fn unbound_names_fail() {
    let mut interp = Interpreter::new();
    match eval_err(&mut interp, "(foo)") {
        SchemeError::Name(msg) => assert_eq!(msg, "Invalid name: foo"),
        other => panic!("expected a name error, got {:?}", other),
    }
    match eval_err(&mut interp, "(set! y 1)") {
        SchemeError::Name(msg) => assert_eq!(msg, "Trying to set! undefined variable."),
        other => panic!("expected a name error, got {:?}", other),
    }
}

#[test]
fn type_and_arity_errors() {
    let mut interp = Interpreter::new();
    assert!(matches!(
        eval_err(&mut interp, "(+ 1 'a)"),
        SchemeError::Runtime(_)
    ));
    assert!(matches!(
        eval_err(&mut interp, "(1 2)"),
        SchemeError::Runtime(_)
    ));
    assert!(matches!(
        eval_err(&mut interp, "(car 5)"),
        SchemeError::Runtime(_)
    ));
    assert!(matches!(
        eval_err(&mut interp, "(cons 1)"),
        SchemeError::Runtime(_)
    ));
    assert!(matches!(
        eval_err(&mut interp, "(if 1)"),
        SchemeError::Syntax(_)
    ));
    assert!(matches!(
        eval_err(&mut interp, "(define 3 4)"),
        SchemeError::Runtime(_)
    ));
    assert!(matches!(
        eval_err(&mut interp, "(lambda (x))"),
        SchemeError::Syntax(_)
    ));
}

#[test]
fn reader_errors() {
    let mut interp = Interpreter::new();
    assert!(matches!(
        eval_err(&mut interp, "(1 2"),
        SchemeError::Syntax(_)
    ));
    assert!(matches!(eval_err(&mut interp, ")"), SchemeError::Syntax(_)));
    assert!(matches!(eval_err(&mut interp, "."), SchemeError::Syntax(_)));
    assert!(matches!(
        eval_err(&mut interp, "(. 2)"),
        SchemeError::Syntax(_)
    ));
    assert!(matches!(
        eval_err(&mut interp, "(1 . 2 3)"),
        SchemeError::Syntax(_)
    ));
    assert!(matches!(eval_err(&mut interp, "%"), SchemeError::Syntax(_)));
    // Integer literals outside i64 range do not lex.
    assert!(matches!(
        eval_err(&mut interp, "99999999999999999999999"),
        SchemeError::Syntax(_)
    ));
}

#[test]
fn errors_leave_earlier_definitions_in_place() {
    let mut interp = Interpreter::new();
    eval(&mut interp, "(define stable 7)");
    assert!(interp.run("(+ stable 'a)").is_err());
    assert_eq!(eval(&mut interp, "stable"), "7");
    // Definitions completed before the failure also persist.
    assert!(interp.run("(begin (define partial 2) (car 5))").is_err());
    assert_eq!(eval(&mut interp, "partial"), "2");
}

#[test]
fn display_returns_the_empty_list() {
    let mut interp = Interpreter::new();
    assert_eq!(eval(&mut interp, "(display '(1 2 3))"), "()");
}
