use crate::heap::Heap;
use crate::symbol::SymbolTable;
use crate::value::Value;

/// Print a value to its canonical textual form.
pub fn print_val(val: Value, heap: &Heap, symbols: &SymbolTable) -> String {
    let mut out = String::new();
    print_inner(val, heap, symbols, &mut out, 0);
    out
}

fn print_inner(val: Value, heap: &Heap, symbols: &SymbolTable, out: &mut String, depth: usize) {
    if depth > 1000 {
        out.push_str("...");
        return;
    }

    match val {
        Value::Nil => out.push_str("()"),
        Value::Number(n) => out.push_str(&n.to_string()),
        Value::Symbol(id) => out.push_str(symbols.name(id)),
        Value::Cell(id) => {
            // Proper chains print as (e1 e2 ... en); a non-cell terminal
            // prints as a dotted pair (e1 ... . en).
            out.push('(');
            print_inner(heap.first(id), heap, symbols, out, depth + 1);

            let mut current = heap.second(id);
            loop {
                match current {
                    Value::Nil => break,
                    Value::Cell(next) => {
                        out.push(' ');
                        print_inner(heap.first(next), heap, symbols, out, depth + 1);
                        current = heap.second(next);
                    }
                    terminal => {
                        out.push_str(" . ");
                        print_inner(terminal, heap, symbols, out, depth + 1);
                        break;
                    }
                }
            }
            out.push(')');
        }
        Value::Lambda(_) => out.push_str("Lambda"),
        Value::Syntax(_) => out.push_str("BuiltInSyntax"),
        Value::Proc(_) => out.push_str("BuiltInProcedure"),
        Value::Env(id) => {
            out.push_str("Environment { ");
            for name in heap.env_names(id) {
                out.push_str(symbols.name(name));
                out.push(' ');
            }
            out.push('}');
        }
    }
}
