use crate::analyzer::Ty;

/// Delayed-code attribute of an expression: says where its value is right
/// now, so instructions to fetch it are only emitted once the context is
/// known.
#[derive(Clone, Debug)]
pub enum ItemKind {
    /// Folded compile-time constant.
    Const(i32),
    /// Value of a module-level global variable.
    Global(String),
    /// Value of a function local or value parameter.
    Local(String),
    /// Composite at a fixed byte address in linear memory.
    Memory(i32),
    /// Value already on the operand stack.
    Stack,
    /// Local holding the address of the value (reference parameter).
    RefLocal(String),
    /// Address of the value on the operand stack.
    RefStack,
}

#[derive(Clone, Debug)]
pub struct Item {
    pub ty: Ty,
    pub kind: ItemKind,
}

impl Item {
    pub fn constant(ty: Ty, val: i32) -> Self {
        Self {
            ty,
            kind: ItemKind::Const(val),
        }
    }

    pub fn stack(ty: Ty) -> Self {
        Self {
            ty,
            kind: ItemKind::Stack,
        }
    }

    pub fn is_const(&self) -> bool {
        matches!(self.kind, ItemKind::Const(_))
    }

    pub fn const_val(&self) -> Option<i32> {
        match self.kind {
            ItemKind::Const(v) => Some(v),
            _ => None,
        }
    }
}
