use std::collections::BTreeMap;

use crate::value::{CellId, EnvId, LambdaId, SymbolId, Value};

/// Poison written into swept cells to make use-after-free visible: the
/// symbol id is never interned, so touching it panics in the table.
const SWEPT: Value = Value::Symbol(SymbolId(0xDEAD));

/// A single cons cell on the heap.
pub struct ConsCell {
    pub first: Value,
    pub second: Value,
    mark: bool,
}

/// A user procedure: formal names, a body form (a synthetic `begin`
/// call), and the environment captured at construction.
pub struct LambdaObj {
    pub formals: Vec<SymbolId>,
    pub body: Value,
    pub env: EnvId,
    mark: bool,
}

/// Name-to-value bindings with optional parent chaining. The map keeps a
/// stable iteration order for printing.
pub struct EnvObj {
    names: BTreeMap<SymbolId, Value>,
    parent: Option<EnvId>,
    mark: bool,
}

/// The managed heap. Cells, lambdas and environments are allocated here;
/// ids are indices into the per-kind arenas. Liveness is decided by a
/// mark-sweep pass rooted at the global environment, run by the session
/// driver between top-level inputs and never mid-evaluation.
pub struct Heap {
    cells: Vec<ConsCell>,
    cell_free: Vec<CellId>,
    lambdas: Vec<LambdaObj>,
    lambda_free: Vec<LambdaId>,
    envs: Vec<EnvObj>,
    env_free: Vec<EnvId>,
}

impl Heap {
    pub fn new() -> Self {
        Heap {
            cells: Vec::new(),
            cell_free: Vec::new(),
            lambdas: Vec::new(),
            lambda_free: Vec::new(),
            envs: Vec::new(),
            env_free: Vec::new(),
        }
    }

    // === Allocation ===

    /// Allocate a new cons cell, reusing a swept slot when one is free.
    pub fn alloc_cell(&mut self, first: Value, second: Value) -> CellId {
        if let Some(id) = self.cell_free.pop() {
            let cell = &mut self.cells[id.0 as usize];
            cell.first = first;
            cell.second = second;
            cell.mark = false;
            return id;
        }
        let id = CellId(self.cells.len() as u32);
        self.cells.push(ConsCell {
            first,
            second,
            mark: false,
        });
        id
    }

    pub fn alloc_lambda(&mut self, formals: Vec<SymbolId>, body: Value, env: EnvId) -> LambdaId {
        if let Some(id) = self.lambda_free.pop() {
            let lambda = &mut self.lambdas[id.0 as usize];
            lambda.formals = formals;
            lambda.body = body;
            lambda.env = env;
            lambda.mark = false;
            return id;
        }
        let id = LambdaId(self.lambdas.len() as u32);
        self.lambdas.push(LambdaObj {
            formals,
            body,
            env,
            mark: false,
        });
        id
    }

    pub fn alloc_env(&mut self, parent: Option<EnvId>) -> EnvId {
        if let Some(id) = self.env_free.pop() {
            let env = &mut self.envs[id.0 as usize];
            env.names.clear();
            env.parent = parent;
            env.mark = false;
            return id;
        }
        let id = EnvId(self.envs.len() as u32);
        self.envs.push(EnvObj {
            names: BTreeMap::new(),
            parent,
            mark: false,
        });
        id
    }

    // === Cell access ===

    #[inline]
    pub fn first(&self, id: CellId) -> Value {
        self.cells[id.0 as usize].first
    }

    #[inline]
    pub fn second(&self, id: CellId) -> Value {
        self.cells[id.0 as usize].second
    }

    /// set-car! in place.
    #[inline]
    pub fn set_first(&mut self, id: CellId, value: Value) {
        self.cells[id.0 as usize].first = value;
    }

    /// set-cdr! in place.
    #[inline]
    pub fn set_second(&mut self, id: CellId, value: Value) {
        self.cells[id.0 as usize].second = value;
    }

    pub fn lambda(&self, id: LambdaId) -> &LambdaObj {
        &self.lambdas[id.0 as usize]
    }

    // === Environments ===

    /// Search the local bindings, then the parent chain.
    pub fn env_lookup(&self, env: EnvId, name: SymbolId) -> Option<Value> {
        let mut current = Some(env);
        while let Some(id) = current {
            let env = &self.envs[id.0 as usize];
            if let Some(&value) = env.names.get(&name) {
                return Some(value);
            }
            current = env.parent;
        }
        None
    }

    /// Create or overwrite a binding in this environment only. Never
    /// walks the parent chain; this is what lets `define` shadow.
    pub fn env_define(&mut self, env: EnvId, name: SymbolId, value: Value) {
        self.envs[env.0 as usize].names.insert(name, value);
    }

    /// Update the first binding of `name` found along the chain.
    /// Returns false when the name is bound nowhere.
    pub fn env_assign(&mut self, env: EnvId, name: SymbolId, value: Value) -> bool {
        let mut current = Some(env);
        while let Some(id) = current {
            if self.envs[id.0 as usize].names.contains_key(&name) {
                self.envs[id.0 as usize].names.insert(name, value);
                return true;
            }
            current = self.envs[id.0 as usize].parent;
        }
        false
    }

    pub fn env_set_parent(&mut self, env: EnvId, parent: EnvId) {
        self.envs[env.0 as usize].parent = Some(parent);
    }

    /// Bound names in the environment's own map, in stable order.
    pub fn env_names(&self, env: EnvId) -> impl Iterator<Item = SymbolId> + '_ {
        self.envs[env.0 as usize].names.keys().copied()
    }

    // === List helpers ===

    /// Build a proper list from a slice of values.
    pub fn list_from_slice(&mut self, values: &[Value]) -> Value {
        let mut result = Value::Nil;
        for &value in values.iter().rev() {
            result = Value::Cell(self.alloc_cell(value, result));
        }
        result
    }

    /// Returns true if this value is a chain of cells ending in `()`.
    pub fn is_proper_list(&self, value: Value) -> bool {
        let mut current = value;
        loop {
            match current {
                Value::Nil => return true,
                Value::Cell(id) => current = self.second(id),
                _ => return false,
            }
        }
    }

    // === Statistics ===

    /// Cell slots ever allocated, including free-listed ones.
    pub fn total_cells(&self) -> usize {
        self.cells.len()
    }

    pub fn free_cells(&self) -> usize {
        self.cell_free.len()
    }

    pub fn live_cells(&self) -> usize {
        self.cells.len() - self.cell_free.len()
    }

    pub fn live_lambdas(&self) -> usize {
        self.lambdas.len() - self.lambda_free.len()
    }

    pub fn live_envs(&self) -> usize {
        self.envs.len() - self.env_free.len()
    }

    // === Garbage collection ===

    /// Clear all mark bits (phase 1 of mark-sweep).
    pub fn clear_marks(&mut self) {
        for cell in &mut self.cells {
            cell.mark = false;
        }
        for lambda in &mut self.lambdas {
            lambda.mark = false;
        }
        for env in &mut self.envs {
            env.mark = false;
        }
    }

    /// Mark a value as reachable. Heap-owned values that were not already
    /// marked are added to the worklist so their dependencies get marked.
    pub fn mark_value(&mut self, value: Value, worklist: &mut Vec<Value>) {
        match value {
            Value::Cell(id) => {
                let cell = &mut self.cells[id.0 as usize];
                if !cell.mark {
                    cell.mark = true;
                    worklist.push(value);
                }
            }
            Value::Lambda(id) => {
                let lambda = &mut self.lambdas[id.0 as usize];
                if !lambda.mark {
                    lambda.mark = true;
                    worklist.push(value);
                }
            }
            Value::Env(id) => {
                let env = &mut self.envs[id.0 as usize];
                if !env.mark {
                    env.mark = true;
                    worklist.push(value);
                }
            }
            // Numbers and nil are inline; symbols live in the intern
            // table; built-ins hold no heap references.
            _ => {}
        }
    }

    /// Drain the mark worklist, marking each value's dependencies:
    /// cell -> first and second; lambda -> body and captured environment;
    /// environment -> every bound value and the parent.
    pub fn process_worklist(&mut self, worklist: &mut Vec<Value>) {
        while let Some(value) = worklist.pop() {
            match value {
                Value::Cell(id) => {
                    let first = self.first(id);
                    let second = self.second(id);
                    self.mark_value(first, worklist);
                    self.mark_value(second, worklist);
                }
                Value::Lambda(id) => {
                    let body = self.lambdas[id.0 as usize].body;
                    let env = self.lambdas[id.0 as usize].env;
                    self.mark_value(body, worklist);
                    self.mark_value(Value::Env(env), worklist);
                }
                Value::Env(id) => {
                    let bound: Vec<Value> =
                        self.envs[id.0 as usize].names.values().copied().collect();
                    let parent = self.envs[id.0 as usize].parent;
                    for value in bound {
                        self.mark_value(value, worklist);
                    }
                    if let Some(parent) = parent {
                        self.mark_value(Value::Env(parent), worklist);
                    }
                }
                _ => {}
            }
        }
    }

    /// Free every unmarked slot (phase 2 of mark-sweep). Swept slots drop
    /// their embedded storage and go to the free lists for reuse.
    pub fn sweep(&mut self) {
        self.cell_free.clear();
        for i in 0..self.cells.len() {
            if !self.cells[i].mark {
                self.cell_free.push(CellId(i as u32));
                self.cells[i].first = SWEPT;
                self.cells[i].second = SWEPT;
            }
        }

        self.lambda_free.clear();
        for i in 0..self.lambdas.len() {
            if !self.lambdas[i].mark {
                self.lambda_free.push(LambdaId(i as u32));
                self.lambdas[i].formals = Vec::new();
                self.lambdas[i].body = SWEPT;
            }
        }

        self.env_free.clear();
        for i in 0..self.envs.len() {
            if !self.envs[i].mark {
                self.env_free.push(EnvId(i as u32));
                self.envs[i].names.clear();
                self.envs[i].parent = None;
            }
        }
    }
}

impl Default for Heap {
    fn default() -> Self {
        Heap::new()
    }
}
