use log::debug;

use crate::analyzer::{ArrayTy, Entry, Field, Param, Storage, Symbol, Ty, WORD};
use crate::lexer::TokenKind;

use super::{Item, ItemKind};

/// Text of one function under construction. The signature, the local
/// declarations and the instruction sequence grow independently, so a local
/// can be declared after instructions for earlier statements exist.
#[derive(Debug)]
struct Frame {
    header: String,
    locals: Vec<String>,
    body: Vec<String>,
}

/// Emits a WebAssembly text module, one instruction line at a time, as the
/// parser walks the source. `level` is 0 at module scope and 1 inside a
/// function body; `memsize` is the high-water mark of static linear memory.
#[derive(Debug)]
pub struct Codegen {
    pub level: i32,
    memsize: i32,
    globals: Vec<String>,
    funcs: Vec<String>,
    frames: Vec<Frame>,
    tmp: u32,
}

impl Codegen {
    pub fn new() -> Self {
        Self {
            level: 0,
            memsize: 0,
            globals: vec![],
            funcs: vec![],
            frames: vec![],
            tmp: 0,
        }
    }

    fn emit(&mut self, line: impl Into<String>) {
        if let Some(frame) = self.frames.last_mut() {
            frame.body.push(line.into());
        }
    }

    /// A name no source identifier can collide with: '.' is not an
    /// identifier character.
    pub fn fresh(&mut self, base: &str) -> String {
        self.tmp += 1;
        format!("{}.{}", base, self.tmp)
    }

    pub fn declare_local(&mut self, name: &str) {
        if let Some(frame) = self.frames.last_mut() {
            frame.locals.push(format!("(local ${} i32)", name));
        }
    }

    // ------------------------------------------------------------------
    // storage allocation

    /// Assigns storage to a run of fresh module-level variables: scalars
    /// become mutable globals, composites get a slice of linear memory.
    pub fn alloc_globals(&mut self, syms: &mut [Symbol]) {
        for sym in syms {
            if let Entry::Var { ty, storage } = &mut sym.entry {
                if matches!(storage, Storage::None) {
                    if ty.is_scalar() {
                        self.globals
                            .push(format!("(global ${} (mut i32) i32.const 0)", sym.name));
                        *storage = Storage::Global;
                    } else {
                        *storage = Storage::Memory(self.memsize);
                        self.memsize = self.memsize.saturating_add(ty.size());
                    }
                }
            }
        }
    }

    /// Assigns locals to fresh scalar procedure variables. Composites are
    /// rejected before this is called and keep no storage.
    pub fn alloc_locals(&mut self, syms: &mut [Symbol]) {
        let mut names = vec![];
        for sym in syms.iter_mut() {
            if let Entry::Var { ty, storage } = &mut sym.entry {
                if matches!(storage, Storage::None) && ty.is_scalar() {
                    *storage = Storage::Local(sym.name.clone());
                    names.push(sym.name.clone());
                }
            }
        }
        for name in names {
            self.declare_local(&name);
        }
    }

    // ------------------------------------------------------------------
    // items

    /// The item denoting a resolved variable, constant or parameter.
    pub fn var_item(&self, sym: &Symbol) -> Item {
        match &sym.entry {
            Entry::Var { ty, storage } => {
                let kind = match storage {
                    Storage::Global => ItemKind::Global(sym.name.clone()),
                    Storage::Local(name) => ItemKind::Local(name.clone()),
                    Storage::Memory(adr) => ItemKind::Memory(*adr),
                    Storage::None => ItemKind::Const(0),
                };
                Item {
                    ty: ty.clone(),
                    kind,
                }
            }
            Entry::Ref { ty } => Item {
                ty: ty.clone(),
                kind: ItemKind::RefLocal(sym.name.clone()),
            },
            Entry::Const { ty, val } => Item::constant(ty.clone(), *val),
            // procedures and type names are rejected by the caller
            _ => Item::constant(Ty::Unknown, 0),
        }
    }

    /// Emits the instructions that put the item's value on the operand
    /// stack.
    pub fn load(&mut self, item: Item) -> Item {
        match &item.kind {
            ItemKind::Const(v) => self.emit(format!("i32.const {}", v)),
            ItemKind::Global(name) => self.emit(format!("global.get ${}", name)),
            ItemKind::Local(name) => self.emit(format!("local.get ${}", name)),
            ItemKind::Memory(adr) => {
                self.emit(format!("i32.const {}", adr));
                self.emit("i32.load");
            }
            ItemKind::RefLocal(name) => {
                self.emit(format!("local.get ${}", name));
                self.emit("i32.load");
            }
            ItemKind::RefStack => self.emit("i32.load"),
            ItemKind::Stack => {}
        }
        Item::stack(item.ty)
    }

    /// First half of an assignment: emits the target address, if one is
    /// needed, before the right-hand side is parsed. `i32.store` expects
    /// the address below the value.
    pub fn prepare_store(&mut self, target: Item) -> Item {
        match target.kind {
            ItemKind::Memory(adr) => {
                self.emit(format!("i32.const {}", adr));
                Item {
                    ty: target.ty,
                    kind: ItemKind::RefStack,
                }
            }
            ItemKind::RefLocal(name) => {
                self.emit(format!("local.get ${}", name));
                Item {
                    ty: target.ty,
                    kind: ItemKind::RefStack,
                }
            }
            _ => target,
        }
    }

    /// Second half of an assignment: consumes the value on the stack.
    pub fn finish_store(&mut self, target: &Item) {
        match &target.kind {
            ItemKind::Global(name) => self.emit(format!("global.set ${}", name)),
            ItemKind::Local(name) => self.emit(format!("local.set ${}", name)),
            ItemKind::RefStack => self.emit("i32.store"),
            _ => {}
        }
    }

    pub fn set_local(&mut self, name: &str) {
        self.emit(format!("local.set ${}", name));
    }

    pub fn get_local(&mut self, name: &str) {
        self.emit(format!("local.get ${}", name));
    }

    pub fn drop_value(&mut self) {
        self.emit("drop");
    }

    // ------------------------------------------------------------------
    // selectors

    /// `x.f`: for a statically addressed record the offset folds into the
    /// address; otherwise it is added at run time.
    pub fn select(&mut self, base: Item, field: &Field) -> Item {
        let kind = match base.kind {
            ItemKind::Memory(adr) => ItemKind::Memory(adr + field.offset),
            ItemKind::RefLocal(name) => {
                self.emit(format!("local.get ${}", name));
                self.emit(format!("i32.const {}", field.offset));
                self.emit("i32.add");
                ItemKind::RefStack
            }
            ItemKind::RefStack => {
                self.emit(format!("i32.const {}", field.offset));
                self.emit("i32.add");
                ItemKind::RefStack
            }
            other => other,
        };
        Item {
            ty: field.ty.clone(),
            kind,
        }
    }

    /// `a[i]`: a constant subscript folds into the address; a run-time one
    /// is rebased to the lower bound and scaled by the element size. Range
    /// checking of constant subscripts happens before this is called.
    pub fn index(&mut self, base: Item, idx: Item, arr: &ArrayTy) -> Item {
        let elem_size = arr.elem.size();
        let kind = if let ItemKind::Const(i) = idx.kind {
            let offset = (i - arr.lower) * elem_size;
            match base.kind {
                ItemKind::Memory(adr) => ItemKind::Memory(adr + offset),
                ItemKind::RefLocal(name) => {
                    self.emit(format!("local.get ${}", name));
                    self.emit(format!("i32.const {}", offset));
                    self.emit("i32.add");
                    ItemKind::RefStack
                }
                ItemKind::RefStack => {
                    self.emit(format!("i32.const {}", offset));
                    self.emit("i32.add");
                    ItemKind::RefStack
                }
                other => other,
            }
        } else {
            self.load(idx);
            if arr.lower != 0 {
                self.emit(format!("i32.const {}", arr.lower));
                self.emit("i32.sub");
            }
            self.emit(format!("i32.const {}", elem_size));
            self.emit("i32.mul");
            match base.kind {
                ItemKind::Memory(adr) => {
                    self.emit(format!("i32.const {}", adr));
                    self.emit("i32.add");
                }
                ItemKind::RefLocal(name) => {
                    self.emit(format!("local.get ${}", name));
                    self.emit("i32.add");
                }
                ItemKind::RefStack => self.emit("i32.add"),
                _ => {}
            }
            ItemKind::RefStack
        };
        Item {
            ty: arr.elem.clone(),
            kind,
        }
    }

    // ------------------------------------------------------------------
    // operators

    /// `-x` and negation; the operand is already on the stack.
    pub fn negate(&mut self) {
        self.emit("i32.const -1");
        self.emit("i32.mul");
    }

    /// `not x`; the operand is already on the stack.
    pub fn invert(&mut self) {
        self.emit("i32.eqz");
    }

    /// Arithmetic on two stack operands.
    pub fn binary_op(&mut self, op: &TokenKind) {
        let instr = match op {
            TokenKind::Times => "i32.mul",
            TokenKind::Div => "i32.div_s",
            TokenKind::Mod => "i32.rem_s",
            TokenKind::Plus => "i32.add",
            TokenKind::Minus => "i32.sub",
            _ => return,
        };
        self.emit(instr);
    }

    /// Puts a constant below a value already on the stack, via a scratch
    /// local, so a non-commutative operator sees its operands in source
    /// order.
    pub fn const_under_stack(&mut self, val: i32) {
        let t = self.fresh("t");
        self.declare_local(&t);
        self.emit(format!("local.set ${}", t));
        self.emit(format!("i32.const {}", val));
        self.emit(format!("local.get ${}", t));
    }

    /// Comparison of two stack operands; leaves a boolean.
    pub fn relation(&mut self, op: &TokenKind) {
        let instr = match op {
            TokenKind::Eq => "i32.eq",
            TokenKind::Ne => "i32.ne",
            TokenKind::Lt => "i32.lt_s",
            TokenKind::Le => "i32.le_s",
            TokenKind::Gt => "i32.gt_s",
            TokenKind::Ge => "i32.ge_s",
            _ => return,
        };
        self.emit(instr);
    }

    /// Short-circuit `and`: the right operand only runs when the left is
    /// true.
    pub fn and_left(&mut self, left: Item) {
        self.load(left);
        self.emit("if (result i32)");
    }

    pub fn and_right(&mut self, right: Item) {
        self.load(right);
        self.emit("else");
        self.emit("i32.const 0");
        self.emit("end");
    }

    /// Short-circuit `or`: the right operand only runs when the left is
    /// false.
    pub fn or_left(&mut self, left: Item) {
        self.load(left);
        self.emit("if (result i32)");
        self.emit("i32.const 1");
        self.emit("else");
    }

    pub fn or_right(&mut self, right: Item) {
        self.load(right);
        self.emit("end");
    }

    // ------------------------------------------------------------------
    // control flow

    pub fn then_begin(&mut self, cond: Item) {
        self.load(cond);
        self.emit("if");
    }

    pub fn else_begin(&mut self) {
        self.emit("else");
    }

    pub fn if_end(&mut self) {
        self.emit("end");
    }

    pub fn while_begin(&mut self) {
        self.emit("loop");
    }

    pub fn while_do(&mut self, cond: Item) {
        self.load(cond);
        self.emit("if");
    }

    pub fn while_end(&mut self) {
        self.emit("br 1");
        self.emit("end");
        self.emit("end");
    }

    // ------------------------------------------------------------------
    // materialized sequences (for-loops and case arms)

    /// Reserves one linear-memory cell and emits its address, so the value
    /// parsed next can be stored into it with `seq_store`.
    pub fn seq_reserve_cell(&mut self) -> i32 {
        let adr = self.memsize;
        self.emit(format!("i32.const {}", adr));
        self.memsize = self.memsize.saturating_add(WORD);
        adr
    }

    pub fn seq_store(&mut self, value: Item) {
        self.load(value);
        self.emit("i32.store");
    }

    /// Opens a counting loop over `len` sequence elements.
    pub fn loop_begin(&mut self, counter: &str, len: i32) {
        self.emit("i32.const 0");
        self.emit(format!("local.set ${}", counter));
        self.emit("loop");
        self.emit(format!("local.get ${}", counter));
        self.emit(format!("i32.const {}", len));
        self.emit("i32.lt_s");
        self.emit("if");
    }

    /// Loads the sequence element the counter currently points at.
    pub fn seq_elem_load(&mut self, base: i32, counter: &str) {
        self.emit(format!("local.get ${}", counter));
        self.emit(format!("i32.const {}", WORD));
        self.emit("i32.mul");
        self.emit(format!("i32.const {}", base));
        self.emit("i32.add");
        self.emit("i32.load");
    }

    pub fn loop_end(&mut self, counter: &str) {
        self.emit(format!("local.get ${}", counter));
        self.emit("i32.const 1");
        self.emit("i32.add");
        self.emit(format!("local.set ${}", counter));
        self.emit("br 1");
        self.emit("end");
        self.emit("end");
    }

    // ------------------------------------------------------------------
    // case dispatch

    /// Guard around one arm body: runs it only when no earlier arm matched
    /// and the current label equals the selector.
    pub fn case_guard_begin(&mut self, matched: &str, sel: &str, base: i32, counter: &str) {
        self.emit(format!("local.get ${}", matched));
        self.emit("i32.eqz");
        self.emit("if");
        self.seq_elem_load(base, counter);
        self.emit(format!("local.get ${}", sel));
        self.emit("i32.eq");
        self.emit("if");
        self.emit("i32.const 1");
        self.emit(format!("local.set ${}", matched));
    }

    pub fn case_guard_end(&mut self) {
        self.emit("end");
        self.emit("end");
    }

    pub fn case_else_begin(&mut self, matched: &str) {
        self.emit(format!("local.get ${}", matched));
        self.emit("i32.eqz");
        self.emit("if");
    }

    pub fn case_else_end(&mut self) {
        self.emit("end");
    }

    // ------------------------------------------------------------------
    // procedures

    pub fn proc_start(&mut self, name: &str, params: &[Param]) {
        debug!("generating procedure {}", name);
        self.level += 1;
        let mut header = format!("(func ${}", name);
        for p in params {
            header.push_str(&format!(" (param ${} i32)", p.name));
        }
        self.frames.push(Frame {
            header,
            locals: vec![],
            body: vec![],
        });
    }

    pub fn proc_exit(&mut self) {
        self.level -= 1;
        self.finish_frame();
    }

    pub fn prog_entry(&mut self) {
        debug!("generating program body");
        self.frames.push(Frame {
            header: "(func $program".to_string(),
            locals: vec![],
            body: vec![],
        });
    }

    pub fn prog_exit(&mut self) {
        self.finish_frame();
    }

    fn finish_frame(&mut self) {
        if let Some(frame) = self.frames.pop() {
            let mut text = frame.header;
            for local in frame.locals {
                text.push('\n');
                text.push_str(&local);
            }
            for line in frame.body {
                text.push('\n');
                text.push_str(&line);
            }
            text.push_str(")");
            self.funcs.push(text);
        }
    }

    pub fn call(&mut self, name: &str) {
        self.emit(format!("call ${}", name));
    }

    /// One actual parameter: a reference formal receives the address of the
    /// actual, a value formal its value. Callers pass only addressable
    /// items for reference formals.
    pub fn actual_param(&mut self, item: Item, by_ref: bool) {
        if by_ref {
            match item.kind {
                ItemKind::Memory(adr) => self.emit(format!("i32.const {}", adr)),
                ItemKind::RefLocal(name) => self.emit(format!("local.get ${}", name)),
                ItemKind::RefStack => {}
                _ => {}
            }
        } else {
            self.load(item);
        }
    }

    /// `read(x)`: the import pushes the value, the prepared target consumes
    /// it.
    pub fn read(&mut self, target: &Item) {
        self.emit("call $read");
        self.finish_store(target);
    }

    pub fn write(&mut self, value: Item) {
        self.load(value);
        self.emit("call $write");
    }

    pub fn writeln(&mut self) {
        self.emit("call $writeln");
    }

    // ------------------------------------------------------------------
    // module assembly

    /// Assembles the complete module text. Memory is sized in 64 KiB pages
    /// covering the static high-water mark.
    pub fn finish(self) -> String {
        let mut out = vec!["(module".to_string()];
        out.push("(import \"P0lib\" \"write\" (func $write (param i32)))".to_string());
        out.push("(import \"P0lib\" \"writeln\" (func $writeln))".to_string());
        out.push("(import \"P0lib\" \"read\" (func $read (result i32)))".to_string());
        out.extend(self.globals);
        out.extend(self.funcs);
        out.push(format!("(memory {})", self.memsize / 65536 + 1));
        out.push("(start $program)".to_string());
        out.push(")".to_string());
        let mut text = out.join("\n");
        text.push('\n');
        text
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_program_module_shape() {
        let mut gen = Codegen::new();
        gen.prog_entry();
        gen.prog_exit();
        let text = gen.finish();
        assert!(text.starts_with("(module\n"));
        assert!(text.contains("(func $program)"));
        assert!(text.contains("(memory 1)"));
        assert!(text.contains("(start $program)"));
    }

    #[test]
    fn scalar_global_and_composite_memory_allocation() {
        let mut gen = Codegen::new();
        let mut syms = vec![
            Symbol {
                name: "x".to_string(),
                lev: 0,
                entry: Entry::Var {
                    ty: Ty::Int,
                    storage: Storage::None,
                },
            },
            Symbol {
                name: "a".to_string(),
                lev: 0,
                entry: Entry::Var {
                    ty: Ty::Array(ArrayTy::new(Ty::Int, 1, 10)),
                    storage: Storage::None,
                },
            },
        ];
        gen.alloc_globals(&mut syms);
        assert!(matches!(
            syms[0].entry,
            Entry::Var {
                storage: Storage::Global,
                ..
            }
        ));
        assert!(matches!(
            syms[1].entry,
            Entry::Var {
                storage: Storage::Memory(0),
                ..
            }
        ));
        let text = gen.finish();
        assert!(text.contains("(global $x (mut i32) i32.const 0)"));
    }

    #[test]
    fn store_address_precedes_value() {
        let mut gen = Codegen::new();
        gen.prog_entry();
        let target = Item {
            ty: Ty::Int,
            kind: ItemKind::Memory(8),
        };
        let target = gen.prepare_store(target);
        let value = gen.load(Item::constant(Ty::Int, 7));
        gen.finish_store(&target);
        drop(value);
        gen.prog_exit();
        let text = gen.finish();
        assert!(text.contains("i32.const 8\ni32.const 7\ni32.store"));
    }
}
