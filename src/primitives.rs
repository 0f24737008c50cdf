use crate::error::{SchemeError, SchemeResult};
use crate::eval::{ArgList, Interpreter};
use crate::printer;
use crate::symbol::sym;
use crate::value::{CellId, EnvId, SymbolId, Value};

/// A built-in special form. The function receives its argument tail
/// unevaluated, plus the caller's environment, and decides what to
/// evaluate and when. For tail-recursive entries the function is the
/// call-until-tail entry point: it performs its own reductions and
/// returns the remaining tail expression unevaluated, leaving the final
/// evaluation to the dispatcher or to a lambda's trampoline.
pub struct SyntaxDef {
    pub name: &'static str,
    pub tail: bool,
    pub run: fn(&mut Interpreter, Value, EnvId) -> SchemeResult<Value>,
}

/// A built-in procedure. The function receives its arguments already
/// evaluated, in list order.
pub struct ProcDef {
    pub name: &'static str,
    pub run: fn(&mut Interpreter, &[Value]) -> SchemeResult<Value>,
}

pub static SYNTAXES: &[SyntaxDef] = &[
    SyntaxDef { name: "quote", tail: false, run: syntax_quote },
    SyntaxDef { name: "if", tail: true, run: syntax_if },
    SyntaxDef { name: "begin", tail: true, run: syntax_begin },
    SyntaxDef { name: "and", tail: true, run: syntax_and },
    SyntaxDef { name: "or", tail: true, run: syntax_or },
    SyntaxDef { name: "lambda", tail: false, run: syntax_lambda },
    SyntaxDef { name: "define", tail: false, run: syntax_define },
    SyntaxDef { name: "set!", tail: false, run: syntax_set },
    SyntaxDef { name: "list-ref", tail: false, run: syntax_list_ref },
    SyntaxDef { name: "list-tail", tail: false, run: syntax_list_tail },
];

pub static PROCS: &[ProcDef] = &[
    ProcDef { name: "not", run: proc_not },
    ProcDef { name: "null?", run: proc_is_null },
    ProcDef { name: "pair?", run: proc_is_pair },
    ProcDef { name: "list?", run: proc_is_list },
    ProcDef { name: "number?", run: proc_is_number },
    ProcDef { name: "symbol?", run: proc_is_symbol },
    ProcDef { name: "boolean?", run: proc_is_boolean },
    ProcDef { name: "+", run: proc_add },
    ProcDef { name: "*", run: proc_mul },
    ProcDef { name: "-", run: proc_sub },
    ProcDef { name: "/", run: proc_div },
    ProcDef { name: "abs", run: proc_abs },
    ProcDef { name: "max", run: proc_max },
    ProcDef { name: "min", run: proc_min },
    ProcDef { name: "=", run: proc_num_eq },
    ProcDef { name: "<", run: proc_num_lt },
    ProcDef { name: ">", run: proc_num_gt },
    ProcDef { name: "<=", run: proc_num_le },
    ProcDef { name: ">=", run: proc_num_ge },
    ProcDef { name: "cons", run: proc_cons },
    ProcDef { name: "car", run: proc_car },
    ProcDef { name: "cdr", run: proc_cdr },
    ProcDef { name: "list", run: proc_list },
    ProcDef { name: "set-car!", run: proc_set_car },
    ProcDef { name: "set-cdr!", run: proc_set_cdr },
    ProcDef { name: "display", run: proc_display },
];

// === Shared helpers ===

/// Everything is true except the symbol named #f.
pub fn is_true(value: Value) -> bool {
    value != Value::Symbol(sym::F)
}

fn bool_symbol(truth: bool) -> Value {
    Value::Symbol(if truth { sym::T } else { sym::F })
}

fn type_mismatch() -> SchemeError {
    SchemeError::Runtime("Expected type does not match.".into())
}

fn as_number(value: Value) -> SchemeResult<i64> {
    value.as_number().ok_or_else(type_mismatch)
}

fn as_symbol(value: Value) -> SchemeResult<SymbolId> {
    value.as_symbol().ok_or_else(type_mismatch)
}

fn as_cell(value: Value) -> SchemeResult<CellId> {
    value.as_cell().ok_or_else(type_mismatch)
}

fn numbers(args: &[Value]) -> SchemeResult<Vec<i64>> {
    args.iter().map(|&v| as_number(v)).collect()
}

fn require_len(args: &[Value], len: usize) -> SchemeResult<()> {
    if args.len() != len {
        return Err(SchemeError::Runtime("Invalid function call".into()));
    }
    Ok(())
}

fn require_at_least(args: &[Value], len: usize) -> SchemeResult<()> {
    if args.len() < len {
        return Err(SchemeError::Runtime("Invalid function call".into()));
    }
    Ok(())
}

/// Each relation holds pairwise between every adjacent pair; fewer than
/// two arguments is vacuously true.
fn compare(args: &[Value], holds: fn(i64, i64) -> bool) -> SchemeResult<Value> {
    let nums = numbers(args)?;
    Ok(bool_symbol(nums.windows(2).all(|w| holds(w[0], w[1]))))
}

/// Wrap the body forms of a lambda or define in a synthetic begin call,
/// so multi-expression bodies share one evaluation path and inherit
/// begin's tail behavior. The wrapper shares structure with the input
/// form; evaluation never mutates the AST, so the sharing is safe.
fn wrap_body(interp: &mut Interpreter, form: Value) -> SchemeResult<Value> {
    let body_forms = interp.heap.second(as_cell(form)?);
    let begin = interp
        .heap
        .alloc_cell(Value::Symbol(sym::BEGIN), body_forms);
    Ok(Value::Cell(begin))
}

/// Collect the formal parameter symbols of a lambda declaration.
fn formal_names(interp: &Interpreter, declaration: Value) -> SchemeResult<Vec<SymbolId>> {
    ArgList::new(&interp.heap, declaration)
        .values()
        .iter()
        .map(|&v| as_symbol(v))
        .collect()
}

// === Special forms ===

fn syntax_quote(interp: &mut Interpreter, form: Value, _env: EnvId) -> SchemeResult<Value> {
    ArgList::new(&interp.heap, form).expect_len(1)?.at(0)
}

fn syntax_if(interp: &mut Interpreter, form: Value, env: EnvId) -> SchemeResult<Value> {
    let args = ArgList::new(&interp.heap, form);
    if args.len() != 2 && args.len() != 3 {
        return Err(SchemeError::Syntax("Wrong number of parameters".into()));
    }
    let condition = interp.eval(args.at(0)?, env)?;
    if is_true(condition) {
        return args.at(1);
    }
    if args.len() == 3 {
        return args.at(2);
    }
    // No alternative: hand back the form (quote ()) so the pending
    // evaluation yields the empty list.
    let inner = interp.heap.alloc_cell(Value::Nil, Value::Nil);
    let quoted = interp
        .heap
        .alloc_cell(Value::Symbol(sym::QUOTE), Value::Cell(inner));
    Ok(Value::Cell(quoted))
}

fn syntax_begin(interp: &mut Interpreter, form: Value, env: EnvId) -> SchemeResult<Value> {
    let args = ArgList::new(&interp.heap, form).expect_at_least(1)?;
    for i in 0..args.len() - 1 {
        interp.eval(args.at(i)?, env)?;
    }
    args.at(args.len() - 1)
}

fn syntax_and(interp: &mut Interpreter, form: Value, env: EnvId) -> SchemeResult<Value> {
    let args = ArgList::new(&interp.heap, form);
    if args.is_empty() {
        return Ok(Value::Symbol(sym::T));
    }
    for i in 0..args.len() - 1 {
        let value = interp.eval(args.at(i)?, env)?;
        if !is_true(value) {
            return Ok(value);
        }
    }
    args.at(args.len() - 1)
}

fn syntax_or(interp: &mut Interpreter, form: Value, env: EnvId) -> SchemeResult<Value> {
    let args = ArgList::new(&interp.heap, form);
    if args.is_empty() {
        return Ok(Value::Symbol(sym::F));
    }
    for i in 0..args.len() - 1 {
        let value = interp.eval(args.at(i)?, env)?;
        if is_true(value) {
            return Ok(value);
        }
    }
    args.at(args.len() - 1)
}

fn syntax_lambda(interp: &mut Interpreter, form: Value, env: EnvId) -> SchemeResult<Value> {
    let args = ArgList::new(&interp.heap, form);
    if args.len() < 2 {
        return Err(SchemeError::Syntax("Invalid lambda expression.".into()));
    }
    let formals = formal_names(interp, args.at(0)?)?;
    let body = wrap_body(interp, form)?;
    Ok(Value::Lambda(interp.heap.alloc_lambda(formals, body, env)))
}

fn syntax_define(interp: &mut Interpreter, form: Value, env: EnvId) -> SchemeResult<Value> {
    let args = ArgList::new(&interp.heap, form);
    if args.len() < 2 {
        return Err(SchemeError::Syntax("Invalid define expression.".into()));
    }
    match args.at(0)? {
        Value::Symbol(name) => {
            if args.len() != 2 {
                return Err(SchemeError::Syntax("Invalid define expression.".into()));
            }
            // The binding is installed only after the expression
            // evaluates, so a failing define leaves no partial state.
            let value = interp.eval(args.at(1)?, env)?;
            interp.heap.env_define(env, name, value);
        }
        declaration @ Value::Cell(_) => {
            // (define (name formals...) body...) is sugar for binding
            // name to (lambda (formals...) body...).
            let decl = ArgList::new(&interp.heap, declaration);
            let name = as_symbol(decl.at(0)?)?;
            let formals = decl.values()[1..]
                .iter()
                .map(|&v| as_symbol(v))
                .collect::<SchemeResult<Vec<SymbolId>>>()?;
            let body = wrap_body(interp, form)?;
            let lambda = interp.heap.alloc_lambda(formals, body, env);
            interp.heap.env_define(env, name, Value::Lambda(lambda));
        }
        _ => return Err(type_mismatch()),
    }
    Ok(Value::Nil)
}

fn syntax_set(interp: &mut Interpreter, form: Value, env: EnvId) -> SchemeResult<Value> {
    let args = ArgList::new(&interp.heap, form);
    if args.len() != 2 {
        return Err(SchemeError::Syntax("Invalid set! expression.".into()));
    }
    let name = as_symbol(args.at(0)?)?;
    let value = interp.eval(args.at(1)?, env)?;
    interp.assign(env, name, value)?;
    Ok(Value::Nil)
}

fn syntax_list_ref(interp: &mut Interpreter, form: Value, env: EnvId) -> SchemeResult<Value> {
    let args = ArgList::new(&interp.heap, form).expect_len(2)?;
    let list = as_cell(interp.eval(args.at(0)?, env)?)?;
    let elements = ArgList::new(&interp.heap, Value::Cell(list));
    let index = as_number(interp.eval(args.at(1)?, env)?)?;
    let index =
        usize::try_from(index).map_err(|_| SchemeError::Runtime("Too few arguments".into()))?;
    elements.at(index)
}

fn syntax_list_tail(interp: &mut Interpreter, form: Value, env: EnvId) -> SchemeResult<Value> {
    let args = ArgList::new(&interp.heap, form).expect_len(2)?;
    let mut cell = as_cell(interp.eval(args.at(0)?, env)?)?;
    let mut steps = as_number(interp.eval(args.at(1)?, env)?)?;
    // One chain step is always taken: a count of 0 behaves like 1, both
    // returning the second of the first cell.
    while steps > 1 {
        cell = as_cell(interp.heap.second(cell))?;
        steps -= 1;
    }
    Ok(interp.heap.second(cell))
}

// === Predicates ===

fn proc_not(_interp: &mut Interpreter, args: &[Value]) -> SchemeResult<Value> {
    require_len(args, 1)?;
    Ok(bool_symbol(!is_true(args[0])))
}

fn proc_is_null(_interp: &mut Interpreter, args: &[Value]) -> SchemeResult<Value> {
    require_len(args, 1)?;
    Ok(bool_symbol(args[0].is_nil()))
}

fn proc_is_pair(_interp: &mut Interpreter, args: &[Value]) -> SchemeResult<Value> {
    require_len(args, 1)?;
    Ok(bool_symbol(args[0].is_cell()))
}

fn proc_is_list(interp: &mut Interpreter, args: &[Value]) -> SchemeResult<Value> {
    require_len(args, 1)?;
    let truth = match args[0] {
        Value::Nil => true,
        Value::Cell(_) => interp.heap.is_proper_list(args[0]),
        _ => false,
    };
    Ok(bool_symbol(truth))
}

fn proc_is_number(_interp: &mut Interpreter, args: &[Value]) -> SchemeResult<Value> {
    require_len(args, 1)?;
    Ok(bool_symbol(matches!(args[0], Value::Number(_))))
}

fn proc_is_symbol(_interp: &mut Interpreter, args: &[Value]) -> SchemeResult<Value> {
    require_len(args, 1)?;
    Ok(bool_symbol(matches!(args[0], Value::Symbol(_))))
}

fn proc_is_boolean(_interp: &mut Interpreter, args: &[Value]) -> SchemeResult<Value> {
    require_len(args, 1)?;
    Ok(bool_symbol(matches!(
        args[0],
        Value::Symbol(sym::T) | Value::Symbol(sym::F)
    )))
}

// === Arithmetic ===

fn proc_add(_interp: &mut Interpreter, args: &[Value]) -> SchemeResult<Value> {
    let nums = numbers(args)?;
    let sum = nums.into_iter().fold(0i64, i64::wrapping_add);
    Ok(Value::Number(sum))
}

fn proc_mul(_interp: &mut Interpreter, args: &[Value]) -> SchemeResult<Value> {
    let nums = numbers(args)?;
    let product = nums.into_iter().fold(1i64, i64::wrapping_mul);
    Ok(Value::Number(product))
}

fn proc_sub(_interp: &mut Interpreter, args: &[Value]) -> SchemeResult<Value> {
    require_at_least(args, 1)?;
    let nums = numbers(args)?;
    if nums.len() == 1 {
        return Ok(Value::Number(nums[0].wrapping_neg()));
    }
    let difference = nums[1..].iter().fold(nums[0], |acc, &n| acc.wrapping_sub(n));
    Ok(Value::Number(difference))
}

fn proc_div(_interp: &mut Interpreter, args: &[Value]) -> SchemeResult<Value> {
    require_at_least(args, 1)?;
    let nums = numbers(args)?;
    // Native integer division throughout; dividing by zero is a host
    // arithmetic fault, as in the rest of the arithmetic set.
    if nums.len() == 1 {
        return Ok(Value::Number(1 / nums[0]));
    }
    let quotient = nums[1..].iter().fold(nums[0], |acc, &n| acc / n);
    Ok(Value::Number(quotient))
}

fn proc_abs(_interp: &mut Interpreter, args: &[Value]) -> SchemeResult<Value> {
    require_len(args, 1)?;
    Ok(Value::Number(as_number(args[0])?.wrapping_abs()))
}

fn proc_max(_interp: &mut Interpreter, args: &[Value]) -> SchemeResult<Value> {
    require_at_least(args, 1)?;
    let nums = numbers(args)?;
    Ok(Value::Number(nums.into_iter().max().unwrap_or(0)))
}

fn proc_min(_interp: &mut Interpreter, args: &[Value]) -> SchemeResult<Value> {
    require_at_least(args, 1)?;
    let nums = numbers(args)?;
    Ok(Value::Number(nums.into_iter().min().unwrap_or(0)))
}

fn proc_num_eq(_interp: &mut Interpreter, args: &[Value]) -> SchemeResult<Value> {
    compare(args, |a, b| a == b)
}

fn proc_num_lt(_interp: &mut Interpreter, args: &[Value]) -> SchemeResult<Value> {
    compare(args, |a, b| a < b)
}

fn proc_num_gt(_interp: &mut Interpreter, args: &[Value]) -> SchemeResult<Value> {
    compare(args, |a, b| a > b)
}

fn proc_num_le(_interp: &mut Interpreter, args: &[Value]) -> SchemeResult<Value> {
    compare(args, |a, b| a <= b)
}

fn proc_num_ge(_interp: &mut Interpreter, args: &[Value]) -> SchemeResult<Value> {
    compare(args, |a, b| a >= b)
}

// === Pairs and lists ===

fn proc_cons(interp: &mut Interpreter, args: &[Value]) -> SchemeResult<Value> {
    require_len(args, 2)?;
    Ok(Value::Cell(interp.heap.alloc_cell(args[0], args[1])))
}

fn proc_car(interp: &mut Interpreter, args: &[Value]) -> SchemeResult<Value> {
    require_len(args, 1)?;
    Ok(interp.heap.first(as_cell(args[0])?))
}

fn proc_cdr(interp: &mut Interpreter, args: &[Value]) -> SchemeResult<Value> {
    require_len(args, 1)?;
    Ok(interp.heap.second(as_cell(args[0])?))
}

fn proc_list(interp: &mut Interpreter, args: &[Value]) -> SchemeResult<Value> {
    Ok(interp.heap.list_from_slice(args))
}

fn proc_set_car(interp: &mut Interpreter, args: &[Value]) -> SchemeResult<Value> {
    require_len(args, 2)?;
    interp.heap.set_first(as_cell(args[0])?, args[1]);
    Ok(Value::Nil)
}

fn proc_set_cdr(interp: &mut Interpreter, args: &[Value]) -> SchemeResult<Value> {
    require_len(args, 2)?;
    interp.heap.set_second(as_cell(args[0])?, args[1]);
    Ok(Value::Nil)
}

// === I/O ===

fn proc_display(interp: &mut Interpreter, args: &[Value]) -> SchemeResult<Value> {
    require_len(args, 1)?;
    println!("{}", printer::print_val(args[0], &interp.heap, &interp.symbols));
    Ok(Value::Nil)
}
