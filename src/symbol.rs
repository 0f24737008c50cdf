use crate::value::SymbolId;
use std::collections::HashMap;

/// Interned symbol table. Each unique name maps to a unique SymbolId, so
/// name equality is id equality. `#t` and `#f` carry no special identity
/// beyond their names.
pub struct SymbolTable {
    name_to_id: HashMap<String, SymbolId>,
    id_to_name: Vec<String>,
}

/// Well-known symbol IDs, pre-interned at startup.
/// These must match the order of interning in SymbolTable::new().
pub mod sym {
    use crate::value::SymbolId;

    pub const T: SymbolId = SymbolId(0);
    pub const F: SymbolId = SymbolId(1);
    pub const QUOTE: SymbolId = SymbolId(2);
    pub const BEGIN: SymbolId = SymbolId(3);
}

impl SymbolTable {
    /// Create a new symbol table with the well-known symbols pre-interned.
    /// The order MUST match the constants in the `sym` module above.
    pub fn new() -> Self {
        let names = ["#t", "#f", "quote", "begin"];

        let mut name_to_id = HashMap::new();
        let mut id_to_name = Vec::new();

        for (i, name) in names.iter().enumerate() {
            name_to_id.insert(name.to_string(), SymbolId(i as u32));
            id_to_name.push(name.to_string());
        }

        SymbolTable {
            name_to_id,
            id_to_name,
        }
    }

    /// Intern a symbol name. Returns the existing ID if already interned,
    /// or creates a new one.
    pub fn intern(&mut self, name: &str) -> SymbolId {
        if let Some(&id) = self.name_to_id.get(name) {
            return id;
        }
        let id = SymbolId(self.id_to_name.len() as u32);
        self.name_to_id.insert(name.to_string(), id);
        self.id_to_name.push(name.to_string());
        id
    }

    /// Look up a symbol name by its ID.
    pub fn name(&self, id: SymbolId) -> &str {
        &self.id_to_name[id.0 as usize]
    }

    /// Look up a symbol ID by name, without interning.
    pub fn lookup(&self, name: &str) -> Option<SymbolId> {
        self.name_to_id.get(name).copied()
    }

    /// Total number of interned symbols.
    pub fn count(&self) -> usize {
        self.id_to_name.len()
    }
}

impl Default for SymbolTable {
    fn default() -> Self {
        SymbolTable::new()
    }
}
