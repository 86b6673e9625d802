use std::rc::Rc;

/// Size in bytes of every scalar cell. Booleans occupy a full word so that
/// every stack slot and memory cell has uniform width.
pub const WORD: i32 = 4;

#[derive(Clone, Debug)]
pub enum Ty {
    /// Placeholder produced by error recovery; compatible with everything.
    Unknown,
    Int,
    Bool,
    Array(Rc<ArrayTy>),
    Record(Rc<RecordTy>),
}

#[derive(Debug)]
pub struct ArrayTy {
    pub elem: Ty,
    pub lower: i32,
    pub length: i32,
    pub size: i32,
}

#[derive(Clone, Debug)]
pub struct Field {
    pub name: String,
    pub ty: Ty,
    pub offset: i32,
}

#[derive(Debug)]
pub struct RecordTy {
    pub fields: Vec<Field>,
    pub size: i32,
}

impl ArrayTy {
    pub fn new(elem: Ty, lower: i32, length: i32) -> Rc<Self> {
        // declarations reject products that do not fit; saturate anyway
        let size = (length as i64 * elem.size() as i64).min(i32::MAX as i64) as i32;
        Rc::new(Self {
            elem,
            lower,
            length,
            size,
        })
    }
}

impl RecordTy {
    /// Field offsets are a prefix sum over declaration order.
    pub fn new(fields: Vec<(String, Ty)>) -> Rc<Self> {
        let mut offset = 0;
        let fields = fields
            .into_iter()
            .map(|(name, ty)| {
                let size = ty.size();
                let f = Field { name, ty, offset };
                offset = offset.saturating_add(size);
                f
            })
            .collect();
        Rc::new(Self {
            fields,
            size: offset,
        })
    }
}

impl Ty {
    pub fn size(&self) -> i32 {
        match self {
            Ty::Unknown => 0,
            Ty::Int | Ty::Bool => WORD,
            Ty::Array(a) => a.size,
            Ty::Record(r) => r.size,
        }
    }

    pub fn is_scalar(&self) -> bool {
        matches!(self, Ty::Int | Ty::Bool)
    }

    pub fn is_composite(&self) -> bool {
        matches!(self, Ty::Array(_) | Ty::Record(_))
    }

    /// Type identity: scalars by variant, composites by the shared type
    /// object (a named type alias refers to the same object). `Unknown`
    /// matches anything so that one error does not cascade.
    pub fn same(&self, other: &Ty) -> bool {
        match (self, other) {
            (Ty::Unknown, _) | (_, Ty::Unknown) => true,
            (Ty::Int, Ty::Int) | (Ty::Bool, Ty::Bool) => true,
            (Ty::Array(a), Ty::Array(b)) => Rc::ptr_eq(a, b),
            (Ty::Record(a), Ty::Record(b)) => Rc::ptr_eq(a, b),
            _ => false,
        }
    }
}
