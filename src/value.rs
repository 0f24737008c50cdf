use std::fmt;

/// Unique identifier for an interned symbol.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
pub struct SymbolId(pub u32);

/// Index into the heap's cons cell arena.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub struct CellId(pub u32);

/// Index into the heap's lambda arena.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub struct LambdaId(pub u32);

/// Index into the heap's environment arena.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub struct EnvId(pub u32);

/// Index into the static built-in syntax table.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub struct SyntaxId(pub u32);

/// Index into the static built-in procedure table.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub struct ProcId(pub u32);

/// The fundamental runtime value: discriminant plus inline payload.
/// Copy semantics. Cell, lambda and environment data live in the heap,
/// symbols in the intern table, and built-ins in static tables; the value
/// itself is just a tag and an index.
#[derive(Clone, Copy, PartialEq, Eq)]
pub enum Value {
    /// The empty list `()`.
    Nil,
    Number(i64),
    Symbol(SymbolId),
    Cell(CellId),
    Lambda(LambdaId),
    Syntax(SyntaxId),
    Proc(ProcId),
    Env(EnvId),
}

impl Value {
    pub fn is_nil(self) -> bool {
        matches!(self, Value::Nil)
    }

    pub fn is_cell(self) -> bool {
        matches!(self, Value::Cell(_))
    }

    pub fn as_cell(self) -> Option<CellId> {
        match self {
            Value::Cell(id) => Some(id),
            _ => None,
        }
    }

    pub fn as_symbol(self) -> Option<SymbolId> {
        match self {
            Value::Symbol(id) => Some(id),
            _ => None,
        }
    }

    pub fn as_number(self) -> Option<i64> {
        match self {
            Value::Number(n) => Some(n),
            _ => None,
        }
    }
}

impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Nil => write!(f, "Nil"),
            Value::Number(n) => write!(f, "Num({})", n),
            Value::Symbol(id) => write!(f, "Sym({})", id.0),
            Value::Cell(id) => write!(f, "Cell({})", id.0),
            Value::Lambda(id) => write!(f, "Lambda({})", id.0),
            Value::Syntax(id) => write!(f, "Syntax({})", id.0),
            Value::Proc(id) => write!(f, "Proc({})", id.0),
            Value::Env(id) => write!(f, "Env({})", id.0),
        }
    }
}
