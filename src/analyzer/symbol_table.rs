use super::Ty;

/// Where a variable's value lives. Declarations start out unallocated; the
/// code generator assigns concrete storage when a run of fresh declarations
/// is handed to it.
#[derive(Clone, Debug)]
pub enum Storage {
    None,
    /// WebAssembly global variable named after the symbol.
    Global,
    /// Function local or value parameter; carries the emitted name, which
    /// differs from the source name for compiler-introduced loop variables.
    Local(String),
    /// Fixed byte offset into the linear memory (arrays and records).
    Memory(i32),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StdProcKind {
    Read,
    Write,
    Writeln,
}

/// One formal parameter of a declared or built-in procedure.
#[derive(Clone, Debug)]
pub struct Param {
    pub name: String,
    pub ty: Ty,
    pub by_ref: bool,
}

#[derive(Clone, Debug)]
pub enum Entry {
    Var { ty: Ty, storage: Storage },
    /// Reference parameter: holds the address of the caller's storage.
    Ref { ty: Ty },
    Const { ty: Ty, val: i32 },
    TypeDef { ty: Ty },
    Proc { params: Vec<Param> },
    StdProc { kind: StdProcKind, params: Vec<Param> },
}

#[derive(Clone, Debug)]
pub struct Symbol {
    pub name: String,
    pub lev: i32,
    pub entry: Entry,
}

/// Declaring a name twice in one scope; the first declaration wins.
#[derive(Debug, PartialEq, Eq)]
pub struct Redeclared;

/// A stack of lexical scopes, innermost last. Resolution searches
/// innermost-first, so inner declarations shadow outer ones.
#[derive(Debug)]
pub struct SymTab {
    scopes: Vec<Vec<Symbol>>,
}

impl SymTab {
    pub fn new() -> Self {
        Self {
            scopes: vec![vec![]],
        }
    }

    pub fn open_scope(&mut self) {
        self.scopes.push(vec![]);
    }

    pub fn close_scope(&mut self) {
        if self.scopes.len() > 1 {
            self.scopes.pop();
        }
    }

    pub fn depth(&self) -> usize {
        self.scopes.len()
    }

    fn top(&mut self) -> &mut Vec<Symbol> {
        if self.scopes.is_empty() {
            self.scopes.push(vec![]);
        }
        let last = self.scopes.len() - 1;
        &mut self.scopes[last]
    }

    pub fn declare(&mut self, name: &str, entry: Entry) -> Result<(), Redeclared> {
        let lev = self.scopes.len() as i32 - 1;
        let top = self.top();
        if top.iter().any(|s| s.name == name) {
            return Err(Redeclared);
        }
        top.push(Symbol {
            name: name.to_string(),
            lev,
            entry,
        });
        Ok(())
    }

    /// Innermost-first lookup. Returns a clone; composite types are
    /// `Rc`-shared so type identity survives the copy. `None` means the
    /// caller reports "undefined identifier" and continues with
    /// `error_entry`.
    pub fn find(&self, name: &str) -> Option<Symbol> {
        self.scopes
            .iter()
            .rev()
            .find_map(|scope| scope.iter().find(|s| s.name == name))
            .cloned()
    }

    /// The designated recovery entry: a zero constant of unknown type, which
    /// downstream analysis accepts anywhere without further complaints.
    pub fn error_entry(name: &str) -> Symbol {
        Symbol {
            name: name.to_string(),
            lev: 0,
            entry: Entry::Const {
                ty: Ty::Unknown,
                val: 0,
            },
        }
    }

    /// Entries of the innermost scope, in declaration order. Used to hand a
    /// contiguous run of fresh declarations to the storage allocator.
    pub fn top_scope_mut(&mut self) -> &mut [Symbol] {
        self.top()
    }

    pub fn top_len(&self) -> usize {
        self.scopes.last().map_or(0, |s| s.len())
    }

    /// Patches the parameter list of procedure `name` once its formals have
    /// been parsed. The procedure itself lives in the scope enclosing its
    /// parameter scope, so it stays visible for recursive calls.
    pub fn set_params(&mut self, name: &str, params: Vec<Param>) {
        for scope in self.scopes.iter_mut().rev() {
            for sym in scope.iter_mut() {
                if sym.name == name {
                    if let Entry::Proc { params: p } = &mut sym.entry {
                        *p = params;
                    }
                    return;
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn shadowing_resolves_innermost_first() {
        let mut st = SymTab::new();
        st.declare(
            "x",
            Entry::Const {
                ty: Ty::Int,
                val: 1,
            },
        )
        .unwrap();
        st.open_scope();
        st.declare(
            "x",
            Entry::Const {
                ty: Ty::Int,
                val: 2,
            },
        )
        .unwrap();
        let sym = st.find("x").unwrap();
        assert!(matches!(sym.entry, Entry::Const { val: 2, .. }));
        st.close_scope();
        let sym = st.find("x").unwrap();
        assert!(matches!(sym.entry, Entry::Const { val: 1, .. }));
    }

    #[test]
    fn redeclaration_in_same_scope_is_rejected() {
        let mut st = SymTab::new();
        assert!(st
            .declare(
                "x",
                Entry::Var {
                    ty: Ty::Int,
                    storage: Storage::None
                }
            )
            .is_ok());
        assert_eq!(
            st.declare(
                "x",
                Entry::Var {
                    ty: Ty::Bool,
                    storage: Storage::None
                }
            ),
            Err(Redeclared)
        );
        // the first declaration is still the one that resolves
        let sym = st.find("x").unwrap();
        assert!(matches!(sym.entry, Entry::Var { ty: Ty::Int, .. }));
    }

    #[test]
    fn outer_declaration_is_visible_in_inner_scope() {
        let mut st = SymTab::new();
        st.declare(
            "n",
            Entry::Var {
                ty: Ty::Int,
                storage: Storage::Global,
            },
        )
        .unwrap();
        st.open_scope();
        assert!(st.find("n").is_some());
        assert!(st.find("m").is_none());
    }
}
