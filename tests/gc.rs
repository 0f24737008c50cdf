use scheme::Interpreter;

fn eval(interp: &mut Interpreter, input: &str) -> String {
    interp
        .run(input)
        .expect("evaluation failed")
        .expect("input held no form")
}

#[test]
fn garbage_is_reclaimed_between_inputs() {
    let mut interp = Interpreter::new();
    eval(&mut interp, "(list 1 2 3 4 5)");
    // Nothing was bound, so the parsed form and the result are both
    // garbage once the input finishes.
    assert_eq!(interp.heap.live_cells(), 0);
}

#[test]
fn bound_values_survive_collection() {
    let mut interp = Interpreter::new();
    eval(&mut interp, "(define keep (list 1 2 3))");
    assert_eq!(interp.heap.live_cells(), 3);
    eval(&mut interp, "(list 9 9 9 9 9 9)");
    assert_eq!(interp.heap.live_cells(), 3);
    assert_eq!(eval(&mut interp, "keep"), "(1 2 3)");
}

#[test]
fn swept_slots_are_reused() {
    let mut interp = Interpreter::new();
    eval(&mut interp, "(list 1 2 3 4 5)");
    let total = interp.heap.total_cells();
    for _ in 0..50 {
        eval(&mut interp, "(list 1 2 3 4 5)");
    }
    assert_eq!(interp.heap.total_cells(), total);
}

#[test]
fn captured_environments_stay_live() {
    let mut interp = Interpreter::new();
    eval(&mut interp, "(define (make-adder n) (lambda (x) (+ x n)))");
    eval(&mut interp, "(define add2 (make-adder 2))");
    // Global plus the environment captured by add2.
    assert_eq!(interp.heap.live_envs(), 2);
    // Call frames are garbage once their input finishes.
    eval(&mut interp, "(add2 1)");
    eval(&mut interp, "(add2 2)");
    assert_eq!(interp.heap.live_envs(), 2);
    assert_eq!(eval(&mut interp, "(add2 40)"), "42");
}

#[test]
fn unbound_lambdas_are_collected() {
    let mut interp = Interpreter::new();
    eval(&mut interp, "((lambda (x) x) 1)");
    assert_eq!(interp.heap.live_lambdas(), 0);
    eval(&mut interp, "(define id (lambda (x) x))");
    assert_eq!(interp.heap.live_lambdas(), 1);
}

#[test]
fn cyclic_structures_collect_and_survive() {
    let mut interp = Interpreter::new();
    eval(&mut interp, "(define x (list 1 2))");
    // Tie the knot: x is now a two-cell cycle.
    eval(&mut interp, "(set-cdr! (cdr x) x)");
    assert_eq!(interp.heap.live_cells(), 2);
    assert_eq!(eval(&mut interp, "(car x)"), "1");
    assert_eq!(eval(&mut interp, "(car (cdr x))"), "2");
    assert_eq!(eval(&mut interp, "(car (cdr (cdr x)))"), "1");
}

#[test]
fn deep_recursion_leaves_no_residue() {
    let mut interp = Interpreter::new();
    eval(
        &mut interp,
        "(define (loop n) (if (= n 0) 'done (loop (- n 1))))",
    );
    assert_eq!(eval(&mut interp, "(loop 10000)"), "done");
    // One lambda, its stored body, and nothing from the call frames.
    assert_eq!(interp.heap.live_envs(), 1);
    assert_eq!(interp.heap.live_lambdas(), 1);
}
