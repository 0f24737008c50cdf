use crate::error::{SchemeError, SchemeResult};
use crate::globals;
use crate::heap::Heap;
use crate::printer;
use crate::primitives::{PROCS, SYNTAXES};
use crate::reader;
use crate::symbol::SymbolTable;
use crate::value::{EnvId, LambdaId, SymbolId, Value};

/// The interpreter session. Every heap root lives here so the collector
/// can find it between top-level inputs.
pub struct Interpreter {
    pub heap: Heap,
    pub symbols: SymbolTable,
    /// The persistent global environment; always the collection root.
    pub global: EnvId,
    /// Print each top-level form and its result to stderr.
    pub trace: bool,
}

impl Interpreter {
    pub fn new() -> Self {
        let mut heap = Heap::new();
        let mut symbols = SymbolTable::new();
        let global = globals::base_environment(&mut heap, &mut symbols);
        Interpreter {
            heap,
            symbols,
            global,
            trace: false,
        }
    }

    /// Run one top-level input: parse a single form, evaluate it against
    /// the global environment, print the result, then collect garbage
    /// rooted at the global environment. Returns None for blank input.
    /// Anything after the first form on the line is ignored.
    pub fn run(&mut self, input: &str) -> SchemeResult<Option<String>> {
        Ok(self.run_at(input, 0)?.map(|(text, _)| text))
    }

    /// Evaluate one form of a larger source text starting at byte offset
    /// `pos`. Returns the printed result and the offset where reading
    /// stopped, or None when only whitespace remains. Collects between
    /// forms, so callers must not hold heap values across calls.
    pub fn run_at(&mut self, input: &str, pos: usize) -> SchemeResult<Option<(String, usize)>> {
        let (form, next) =
            match reader::read_one_at(input, pos, &mut self.heap, &mut self.symbols)? {
                Some(pair) => pair,
                None => return Ok(None),
            };
        if self.trace {
            eprintln!("eval: {}", printer::print_val(form, &self.heap, &self.symbols));
        }
        let global = self.global;
        let result = self.eval(form, global)?;
        let text = printer::print_val(result, &self.heap, &self.symbols);
        if self.trace {
            eprintln!("   => {}", text);
        }
        self.collect();
        Ok(Some((text, next)))
    }

    /// Mark everything reachable from the global environment and sweep
    /// the rest. Runs between top-level inputs, never mid-evaluation, so
    /// transient values on the host stack are never collected from under
    /// the evaluator.
    pub fn collect(&mut self) {
        self.heap.clear_marks();
        let mut worklist = Vec::new();
        self.heap.mark_value(Value::Env(self.global), &mut worklist);
        self.heap.process_worklist(&mut worklist);
        self.heap.sweep();
    }

    // === Core evaluation ===

    pub fn eval(&mut self, expr: Value, env: EnvId) -> SchemeResult<Value> {
        match expr {
            Value::Nil => Err(SchemeError::Runtime("() cannot be evaluated".into())),
            Value::Number(_) => Ok(expr),
            Value::Symbol(name) => self.lookup(env, name),
            Value::Cell(id) => {
                let head = self.heap.first(id);
                let tail = self.heap.second(id);
                let callee = self.eval(head, env)?;
                self.call(callee, tail, env)
            }
            Value::Syntax(_) => Err(SchemeError::Runtime(
                "Trying to evaluate a syntax keyword".into(),
            )),
            Value::Proc(_) => Err(SchemeError::Runtime(
                "Trying to evaluate a procedure".into(),
            )),
            Value::Lambda(_) => Err(SchemeError::Syntax(
                "Trying to evaluate a procedure".into(),
            )),
            Value::Env(_) => Err(SchemeError::Runtime(
                "Trying to evaluate Environment".into(),
            )),
        }
    }

    /// Look up a name along the environment chain.
    pub fn lookup(&self, env: EnvId, name: SymbolId) -> SchemeResult<Value> {
        self.heap.env_lookup(env, name).ok_or_else(|| {
            SchemeError::Name(format!("Invalid name: {}", self.symbols.name(name)))
        })
    }

    /// Chain-walking assignment for set!. Unlike define, this never
    /// creates a binding.
    pub fn assign(&mut self, env: EnvId, name: SymbolId, value: Value) -> SchemeResult<()> {
        if self.heap.env_assign(env, name, value) {
            Ok(())
        } else {
            Err(SchemeError::Name(
                "Trying to set! undefined variable.".into(),
            ))
        }
    }

    /// Apply a callable to the unevaluated tail of a call form.
    fn call(&mut self, callee: Value, tail: Value, env: EnvId) -> SchemeResult<Value> {
        match callee {
            Value::Syntax(id) => {
                let def = &SYNTAXES[id.0 as usize];
                let out = (def.run)(self, tail, env)?;
                // A tail-recursive syntax returns its result form
                // unevaluated; this is the convenience wrapper around
                // its call-until-tail entry point.
                if def.tail {
                    self.eval(out, env)
                } else {
                    Ok(out)
                }
            }
            Value::Proc(id) => {
                let args = self.eval_args(tail, env)?;
                (PROCS[id.0 as usize].run)(self, &args)
            }
            Value::Lambda(id) => self.call_lambda(id, tail, env),
            _ => Err(SchemeError::Runtime("Expected type does not match.".into())),
        }
    }

    /// Evaluate every element of a call tail, left to right. An improper
    /// tail contributes its terminal element.
    fn eval_args(&mut self, tail: Value, env: EnvId) -> SchemeResult<Vec<Value>> {
        let args = ArgList::new(&self.heap, tail);
        let mut out = Vec::with_capacity(args.len());
        for &arg in args.values() {
            out.push(self.eval(arg, env)?);
        }
        Ok(out)
    }

    /// Invoke a user procedure, with an explicit trampoline instead of
    /// host recursion for tail calls: a body that tail-calls the same
    /// lambda, directly or through any nesting of tail-recursive
    /// syntaxes, re-enters this loop with rebound arguments.
    fn call_lambda(&mut self, lambda: LambdaId, tail: Value, env: EnvId) -> SchemeResult<Value> {
        let mut tail = tail;
        let mut caller = env;
        loop {
            let formals = self.heap.lambda(lambda).formals.clone();
            let args = ArgList::new(&self.heap, tail).expect_len(formals.len())?;
            let mut values = Vec::with_capacity(formals.len());
            for &arg in args.values() {
                values.push(self.eval(arg, caller)?);
            }

            let parent = self.heap.lambda(lambda).env;
            let local = self.heap.alloc_env(None);
            self.heap.env_set_parent(local, parent);
            for (&name, value) in formals.iter().zip(values) {
                self.heap.env_define(local, name, value);
            }

            // Drill through the body looking for a tail call back to this
            // lambda. The body head resolves in the caller's environment;
            // forms produced by call-until-tail resolve in the local one.
            let mut form = self.heap.lambda(lambda).body;
            let mut scope = caller;
            let rebound = loop {
                let Value::Cell(id) = form else { break None };
                let Value::Symbol(head) = self.heap.first(id) else {
                    break None;
                };
                let Some(callee) = self.heap.env_lookup(scope, head) else {
                    break None;
                };
                if callee == Value::Lambda(lambda) {
                    break Some(self.heap.second(id));
                }
                let Value::Syntax(syntax) = callee else { break None };
                let def = &SYNTAXES[syntax.0 as usize];
                if !def.tail {
                    break None;
                }
                let rest = self.heap.second(id);
                form = (def.run)(self, rest, local)?;
                scope = local;
            };

            match rebound {
                Some(new_tail) => {
                    // Tail call to self: rebind the argument list and loop.
                    // The new arguments evaluate in the environment the
                    // tail form appeared in.
                    tail = new_tail;
                    caller = local;
                }
                None => return self.eval(form, local),
            }
        }
    }
}

impl Default for Interpreter {
    fn default() -> Self {
        Interpreter::new()
    }
}

/// A call tail flattened into its elements. An improper tail contributes
/// its terminal element and marks the list improper.
pub struct ArgList {
    items: Vec<Value>,
    proper: bool,
}

impl ArgList {
    pub fn new(heap: &Heap, mut form: Value) -> Self {
        let mut items = Vec::new();
        let mut proper = true;
        loop {
            match form {
                Value::Nil => break,
                Value::Cell(id) => {
                    items.push(heap.first(id));
                    form = heap.second(id);
                }
                terminal => {
                    items.push(terminal);
                    proper = false;
                    break;
                }
            }
        }
        ArgList { items, proper }
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn is_proper(&self) -> bool {
        self.proper
    }

    pub fn values(&self) -> &[Value] {
        &self.items
    }

    pub fn at(&self, index: usize) -> SchemeResult<Value> {
        self.items
            .get(index)
            .copied()
            .ok_or_else(|| SchemeError::Runtime("Too few arguments".into()))
    }

    pub fn expect_len(self, len: usize) -> SchemeResult<Self> {
        if self.items.len() != len {
            return Err(SchemeError::Runtime("Invalid function call".into()));
        }
        Ok(self)
    }

    pub fn expect_at_least(self, len: usize) -> SchemeResult<Self> {
        if self.items.len() < len {
            return Err(SchemeError::Runtime("Invalid function call".into()));
        }
        Ok(self)
    }
}
