use crate::heap::Heap;
use crate::primitives::{PROCS, SYNTAXES};
use crate::symbol::{sym, SymbolTable};
use crate::value::{EnvId, ProcId, SyntaxId, Value};

/// Build the root environment with the whole standard binding set
/// installed: #t and #f bound to themselves, then every entry of the
/// static syntax and procedure tables under its surface name.
pub fn base_environment(heap: &mut Heap, symbols: &mut SymbolTable) -> EnvId {
    let env = heap.alloc_env(None);

    heap.env_define(env, sym::T, Value::Symbol(sym::T));
    heap.env_define(env, sym::F, Value::Symbol(sym::F));

    for (i, def) in SYNTAXES.iter().enumerate() {
        let name = symbols.intern(def.name);
        heap.env_define(env, name, Value::Syntax(SyntaxId(i as u32)));
    }

    for (i, def) in PROCS.iter().enumerate() {
        let name = symbols.intern(def.name);
        heap.env_define(env, name, Value::Proc(ProcId(i as u32)));
    }

    env
}
