use log::debug;

use crate::analyzer::{
    ArrayTy, Entry, Param, RecordTy, StdProcKind, Storage, SymTab, Symbol, Ty,
};
use crate::codegen::{Codegen, Item, ItemKind};
use crate::error::Diagnostic;
use crate::lexer::{Scanner, TokenKind};

/// Recursive-descent parser, one method per grammar production. Parsing,
/// type checking, constant folding and code generation interleave in a
/// single left-to-right pass over the token stream; no syntax tree is
/// built.
#[derive(Debug)]
pub struct Parser {
    pub(super) scan: Scanner,
    pub(super) st: SymTab,
    pub(super) gen: Codegen,
}

impl Parser {
    pub fn new(scan: Scanner) -> Self {
        let mut st = SymTab::new();
        // predeclared names; declaring into the empty outermost scope
        // cannot collide
        let _ = st.declare("boolean", Entry::TypeDef { ty: Ty::Bool });
        let _ = st.declare("integer", Entry::TypeDef { ty: Ty::Int });
        let _ = st.declare(
            "true",
            Entry::Const {
                ty: Ty::Bool,
                val: 1,
            },
        );
        let _ = st.declare(
            "false",
            Entry::Const {
                ty: Ty::Bool,
                val: 0,
            },
        );
        let _ = st.declare(
            "read",
            Entry::StdProc {
                kind: StdProcKind::Read,
                params: vec![Param {
                    name: "x".to_string(),
                    ty: Ty::Int,
                    by_ref: true,
                }],
            },
        );
        let _ = st.declare(
            "write",
            Entry::StdProc {
                kind: StdProcKind::Write,
                params: vec![Param {
                    name: "x".to_string(),
                    ty: Ty::Int,
                    by_ref: false,
                }],
            },
        );
        let _ = st.declare(
            "writeln",
            Entry::StdProc {
                kind: StdProcKind::Writeln,
                params: vec![],
            },
        );
        Self {
            scan,
            st,
            gen: Codegen::new(),
        }
    }

    // ------------------------------------------------------------------
    // token helpers

    fn accept(&mut self, kind: TokenKind) -> bool {
        if self.scan.sym == kind {
            self.scan.next();
            true
        } else {
            false
        }
    }

    pub(super) fn expect(&mut self, kind: TokenKind, msg: &str) {
        if !self.accept(kind) {
            self.scan.report(msg);
        }
    }

    pub(super) fn ident(&mut self) -> Option<String> {
        if let TokenKind::Ident(name) = self.scan.sym.clone() {
            self.scan.next();
            Some(name)
        } else {
            self.scan.report("identifier expected");
            None
        }
    }

    // ------------------------------------------------------------------
    // declarations

    /// typedIds ::= ident {',' ident} ':' type
    ///
    /// Declares each identifier with the shared type; the symbols stay
    /// unallocated until the enclosing declaration section assigns storage.
    fn typed_ids(&mut self) {
        let mut names = vec![];
        if let Some(name) = self.ident() {
            names.push(name);
        }
        while self.accept(TokenKind::Comma) {
            if let Some(name) = self.ident() {
                names.push(name);
            }
        }
        self.expect(TokenKind::Colon, "':' expected");
        let ty = self.typ();
        for name in names {
            let entry = Entry::Var {
                ty: ty.clone(),
                storage: Storage::None,
            };
            if self.st.declare(&name, entry).is_err() {
                self.scan.report("multiple definition");
            }
        }
    }

    /// type ::= ident | 'array' '[' expression '..' expression ']' 'of' type
    ///        | 'record' typedIds {';' typedIds} 'end'
    fn typ(&mut self) -> Ty {
        if !self.scan.sym.starts_type() {
            self.scan.report("type expected");
            while !(self.scan.sym.starts_type()
                || self.scan.sym == TokenKind::Semicolon
                || self.scan.sym.is_strong())
            {
                self.scan.next();
            }
        }
        match self.scan.sym.clone() {
            TokenKind::Ident(name) => {
                self.scan.next();
                match self.st.find(&name) {
                    Some(Symbol {
                        entry: Entry::TypeDef { ty },
                        ..
                    }) => ty,
                    Some(_) => {
                        self.scan.report("type expected");
                        Ty::Unknown
                    }
                    None => {
                        self.scan.report("undefined identifier");
                        Ty::Unknown
                    }
                }
            }
            TokenKind::Array => {
                self.scan.next();
                self.expect(TokenKind::LBrak, "'[' expected");
                let lower = self.const_int_expression();
                self.expect(TokenKind::Period, "'..' expected");
                self.expect(TokenKind::Period, "'..' expected");
                let upper = self.const_int_expression();
                self.expect(TokenKind::RBrak, "']' expected");
                self.expect(TokenKind::Of, "'of' expected");
                let elem = self.typ();
                // sized in i64: the bound difference alone can exceed i32
                let length = upper as i64 - lower as i64 + 1;
                let length = if upper < lower {
                    self.scan.report("invalid array bounds");
                    0
                } else if length * elem.size() as i64 > i32::MAX as i64 {
                    self.scan.report("array too large");
                    0
                } else {
                    length as i32
                };
                Ty::Array(ArrayTy::new(elem, lower, length))
            }
            TokenKind::Record => {
                self.scan.next();
                self.st.open_scope();
                self.typed_ids();
                while self.accept(TokenKind::Semicolon) {
                    self.typed_ids();
                }
                self.expect(TokenKind::End, "'end' expected");
                let fields = self
                    .st
                    .top_scope_mut()
                    .iter()
                    .filter_map(|sym| match &sym.entry {
                        Entry::Var { ty, .. } => Some((sym.name.clone(), ty.clone())),
                        _ => None,
                    })
                    .collect();
                self.st.close_scope();
                Ty::Record(RecordTy::new(fields))
            }
            _ => Ty::Unknown,
        }
    }

    /// An expression required to be a compile-time integer constant, as in
    /// array bounds and `for` ranges.
    fn const_int_expression(&mut self) -> i32 {
        let x = self.expression();
        if !x.ty.same(&Ty::Int) {
            self.scan.report("integer expected");
        }
        match x.const_val() {
            Some(v) => v,
            None => {
                self.scan.report("expression not constant");
                self.discard(x);
                0
            }
        }
    }

    /// declarations ::= {'const' {ident '=' expression ';'}}
    ///                  {'type' {ident '=' type ';'}}
    ///                  {'var' {typedIds ';'}}
    ///                  {'procedure' ...}
    ///
    /// The section keywords may repeat and interleave. Fresh variables get
    /// storage once the const/type/var sections are exhausted.
    fn declarations(&mut self, global: bool) {
        if !(self.scan.sym.starts_declaration() || self.scan.sym == TokenKind::Begin) {
            self.scan.report("declaration or 'begin' expected");
            while !(self.scan.sym.starts_declaration()
                || self.scan.sym == TokenKind::Begin
                || self.scan.sym == TokenKind::Eof)
            {
                self.scan.next();
            }
        }
        let start = self.st.top_len();
        while matches!(
            self.scan.sym,
            TokenKind::Const | TokenKind::Type | TokenKind::Var
        ) {
            match self.scan.sym {
                TokenKind::Const => {
                    self.scan.next();
                    while matches!(self.scan.sym, TokenKind::Ident(_)) {
                        let name = self.ident();
                        self.expect(TokenKind::Eq, "'=' expected");
                        let x = self.expression();
                        let entry = match x.const_val() {
                            Some(val) => Entry::Const {
                                ty: x.ty.clone(),
                                val,
                            },
                            None => {
                                self.scan.report("expression not constant");
                                self.discard(x);
                                Entry::Const {
                                    ty: Ty::Unknown,
                                    val: 0,
                                }
                            }
                        };
                        if let Some(name) = name {
                            if self.st.declare(&name, entry).is_err() {
                                self.scan.report("multiple definition");
                            }
                        }
                        self.expect(TokenKind::Semicolon, "';' expected");
                    }
                }
                TokenKind::Type => {
                    self.scan.next();
                    while matches!(self.scan.sym, TokenKind::Ident(_)) {
                        let name = self.ident();
                        self.expect(TokenKind::Eq, "'=' expected");
                        let ty = self.typ();
                        if let Some(name) = name {
                            if self.st.declare(&name, Entry::TypeDef { ty }).is_err() {
                                self.scan.report("multiple definition");
                            }
                        }
                        self.expect(TokenKind::Semicolon, "';' expected");
                    }
                }
                _ => {
                    self.scan.next();
                    while matches!(self.scan.sym, TokenKind::Ident(_)) {
                        self.typed_ids();
                        self.expect(TokenKind::Semicolon, "';' expected");
                    }
                }
            }
        }
        if global {
            self.gen.alloc_globals(&mut self.st.top_scope_mut()[start..]);
        } else {
            for sym in &self.st.top_scope_mut()[start..] {
                if let Entry::Var { ty, .. } = &sym.entry {
                    if ty.is_composite() {
                        self.scan.report("local arrays and records are not supported");
                    }
                }
            }
            self.gen.alloc_locals(&mut self.st.top_scope_mut()[start..]);
        }
        while self.scan.sym == TokenKind::Procedure {
            self.procedure_declaration();
        }
    }

    /// procedure ::= 'procedure' ident ['(' [['var'] typedIds
    ///               {';' ['var'] typedIds}] ')'] ';' declarations
    ///               compoundStatement ';'
    fn procedure_declaration(&mut self) {
        self.scan.next();
        let name = self.ident().unwrap_or_default();
        debug!("parsing procedure {}", name);
        if self.gen.level > 0 {
            self.scan.report("no nested procedures");
        }
        if self.st.declare(&name, Entry::Proc { params: vec![] }).is_err() {
            self.scan.report("multiple definition");
        }
        self.st.open_scope();
        let mut params = vec![];
        if self.accept(TokenKind::LParen) {
            if matches!(self.scan.sym, TokenKind::Var | TokenKind::Ident(_)) {
                self.formal_params(&mut params);
                while self.accept(TokenKind::Semicolon) {
                    self.formal_params(&mut params);
                }
            }
            self.expect(TokenKind::RParen, "')' expected");
        }
        self.expect(TokenKind::Semicolon, "';' expected");
        self.st.set_params(&name, params.clone());
        self.gen.proc_start(&name, &params);
        self.declarations(false);
        self.compound_statement();
        self.gen.proc_exit();
        self.st.close_scope();
        self.expect(TokenKind::Semicolon, "';' expected");
    }

    /// One group of formals sharing a mode and a type. Only scalar-by-value
    /// and composite-by-reference are expressible in the calling
    /// convention.
    fn formal_params(&mut self, params: &mut Vec<Param>) {
        let by_ref = self.accept(TokenKind::Var);
        let start = params.len();
        if let Some(name) = self.ident() {
            params.push(Param {
                name,
                ty: Ty::Unknown,
                by_ref,
            });
        }
        while self.accept(TokenKind::Comma) {
            if let Some(name) = self.ident() {
                params.push(Param {
                    name,
                    ty: Ty::Unknown,
                    by_ref,
                });
            }
        }
        self.expect(TokenKind::Colon, "':' expected");
        let ty = self.typ();
        if by_ref && ty.is_scalar() {
            self.scan
                .report("only array and record reference parameters are supported");
        }
        if !by_ref && ty.is_composite() {
            self.scan
                .report("structured value parameters are not supported");
        }
        for param in &mut params[start..] {
            param.ty = ty.clone();
            let entry = if by_ref {
                Entry::Ref { ty: ty.clone() }
            } else {
                Entry::Var {
                    ty: ty.clone(),
                    storage: Storage::Local(param.name.clone()),
                }
            };
            if self.st.declare(&param.name, entry).is_err() {
                self.scan.report("multiple definition");
            }
        }
    }

    // ------------------------------------------------------------------
    // statements

    /// statement ::= ident (assignment | procedureCall) | compoundStatement
    ///             | ifStatement | whileStatement | forStatement
    ///             | caseStatement | empty
    ///
    /// The empty statement makes trailing and doubled semicolons legal, as
    /// in `begin write(x); end`.
    fn statement(&mut self) {
        if matches!(
            self.scan.sym,
            TokenKind::Semicolon
                | TokenKind::End
                | TokenKind::Else
                | TokenKind::Otherwise
                | TokenKind::Period
                | TokenKind::Eof
        ) {
            return;
        }
        if !self.scan.sym.starts_statement() {
            self.scan.report("statement expected");
            while !(self.scan.sym.starts_statement()
                || self.scan.sym.follows_statement()
                || self.scan.sym.is_strong())
            {
                self.scan.next();
            }
        }
        match self.scan.sym.clone() {
            TokenKind::Ident(name) => {
                self.scan.next();
                let sym = match self.st.find(&name) {
                    Some(sym) => sym,
                    None => {
                        self.scan.report("undefined identifier");
                        SymTab::error_entry(&name)
                    }
                };
                match &sym.entry {
                    Entry::Var { .. } | Entry::Ref { .. } => self.assignment(&sym),
                    Entry::Proc { .. } | Entry::StdProc { .. } => self.procedure_call(&sym),
                    Entry::Const { ty: Ty::Unknown, .. } => {
                        // error recovery after an unresolved name: accept
                        // either statement form without further complaints
                        if self.scan.sym == TokenKind::LParen {
                            self.skip_actuals();
                        } else {
                            self.assignment(&sym);
                        }
                    }
                    _ => self.scan.report("variable or procedure expected"),
                }
            }
            TokenKind::Begin => self.compound_statement(),
            TokenKind::If => {
                self.scan.next();
                let cond = self.expression();
                if !cond.ty.same(&Ty::Bool) {
                    self.scan.report("boolean expected");
                }
                self.expect(TokenKind::Then, "'then' expected");
                self.gen.then_begin(cond);
                self.statement();
                if self.accept(TokenKind::Else) {
                    self.gen.else_begin();
                    self.statement();
                }
                self.gen.if_end();
            }
            TokenKind::While => {
                self.scan.next();
                self.gen.while_begin();
                let cond = self.expression();
                if !cond.ty.same(&Ty::Bool) {
                    self.scan.report("boolean expected");
                }
                self.expect(TokenKind::Do, "'do' expected");
                self.gen.while_do(cond);
                self.statement();
                self.gen.while_end();
            }
            TokenKind::For => self.for_statement(),
            TokenKind::Case => self.case_statement(),
            _ => {}
        }
    }

    /// assignment ::= selector ':=' expression
    ///
    /// The target's address is emitted before the right-hand side is
    /// parsed, matching the target machine's store operand order.
    fn assignment(&mut self, sym: &Symbol) {
        let target = self.gen.var_item(sym);
        let target = self.selector(target);
        self.expect(TokenKind::Becomes, "':=' expected");
        if target.ty.is_composite() {
            self.scan.report("composite assignment is not supported");
        }
        let target = self.gen.prepare_store(target);
        let x = self.expression();
        if !x.ty.same(&target.ty) {
            self.scan.report("incompatible assignment");
        }
        self.gen.load(x);
        self.gen.finish_store(&target);
    }

    /// procedureCall ::= ident ['(' expression {',' expression} ')']
    fn procedure_call(&mut self, sym: &Symbol) {
        match &sym.entry {
            Entry::StdProc { kind, .. } => self.std_call(*kind),
            Entry::Proc { params } => {
                let params = params.clone();
                let mut seen = 0usize;
                if self.accept(TokenKind::LParen) {
                    if self.scan.sym.starts_expression() {
                        loop {
                            self.actual_param(params.get(seen));
                            seen += 1;
                            if !self.accept(TokenKind::Comma) {
                                break;
                            }
                        }
                    }
                    self.expect(TokenKind::RParen, "')' expected");
                }
                if seen < params.len() {
                    self.scan.report("too few parameters");
                }
                self.gen.call(&sym.name);
            }
            _ => {}
        }
    }

    fn actual_param(&mut self, formal: Option<&Param>) {
        let Some(formal) = formal else {
            self.scan.report("extra parameter");
            let x = self.expression();
            self.discard(x);
            return;
        };
        let x = self.expression();
        if !x.ty.same(&formal.ty) {
            self.scan.report("incompatible parameter");
        }
        if formal.by_ref
            && !matches!(
                x.kind,
                ItemKind::Memory(_) | ItemKind::RefLocal(_) | ItemKind::RefStack
            )
        {
            self.scan.report("illegal parameter mode");
        }
        self.gen.actual_param(x, formal.by_ref);
    }

    /// The three built-ins: `read` needs a writable integer variable,
    /// `write` an integer expression, `writeln` nothing.
    fn std_call(&mut self, kind: StdProcKind) {
        match kind {
            StdProcKind::Read => {
                self.expect(TokenKind::LParen, "'(' expected");
                let target = match self.ident() {
                    Some(name) => match self.st.find(&name) {
                        Some(sym) if matches!(sym.entry, Entry::Var { .. } | Entry::Ref { .. }) => {
                            let item = self.gen.var_item(&sym);
                            self.selector(item)
                        }
                        Some(_) => {
                            self.scan.report("variable expected");
                            Item::constant(Ty::Unknown, 0)
                        }
                        None => {
                            self.scan.report("undefined identifier");
                            Item::constant(Ty::Unknown, 0)
                        }
                    },
                    None => Item::constant(Ty::Unknown, 0),
                };
                if !target.ty.same(&Ty::Int) {
                    self.scan.report("integer expected");
                }
                let target = self.gen.prepare_store(target);
                self.gen.read(&target);
                self.expect(TokenKind::RParen, "')' expected");
            }
            StdProcKind::Write => {
                self.expect(TokenKind::LParen, "'(' expected");
                let x = self.expression();
                if !x.ty.same(&Ty::Int) {
                    self.scan.report("integer expected");
                }
                self.gen.write(x);
                self.expect(TokenKind::RParen, "')' expected");
            }
            StdProcKind::Writeln => {
                if self.accept(TokenKind::LParen) {
                    self.expect(TokenKind::RParen, "')' expected");
                }
                self.gen.writeln();
            }
        }
    }

    /// Consumes a parenthesized actual list after an unresolved name,
    /// discarding the argument values.
    fn skip_actuals(&mut self) {
        self.scan.next();
        if self.scan.sym.starts_expression() {
            loop {
                let x = self.expression();
                self.discard(x);
                if !self.accept(TokenKind::Comma) {
                    break;
                }
            }
        }
        self.expect(TokenKind::RParen, "')' expected");
    }

    /// forStatement ::= 'for' ident (':=' expression ('to' | 'downto')
    ///                  expression | 'in' '[' expression {',' expression}
    ///                  ']') 'do' statement
    ///
    /// Both forms materialize the value sequence into linear-memory cells
    /// and iterate a fresh counter over it; the control variable is scoped
    /// to the loop body.
    fn for_statement(&mut self) {
        self.scan.next();
        let name = self.ident().unwrap_or_default();
        self.st.open_scope();
        let (base, len, elem_ty) = match self.scan.sym {
            TokenKind::Becomes => {
                self.scan.next();
                let initial = self.const_int_expression();
                let up = match self.scan.sym {
                    TokenKind::To => true,
                    TokenKind::Downto => false,
                    _ => {
                        self.scan.report("'to' or 'downto' expected");
                        true
                    }
                };
                if matches!(self.scan.sym, TokenKind::To | TokenKind::Downto) {
                    self.scan.next();
                }
                let final_ = self.const_int_expression();
                if (up && initial > final_) || (!up && initial < final_) {
                    self.scan.report("empty for range");
                }
                let (initial, final_) = (initial as i64, final_ as i64);
                let mut base = 0;
                let mut len = 0;
                let mut v = initial;
                while (up && v <= final_) || (!up && v >= final_) {
                    let adr = self.gen.seq_reserve_cell();
                    if len == 0 {
                        base = adr;
                    }
                    self.gen.seq_store(Item::constant(Ty::Int, v as i32));
                    len += 1;
                    v = if up { v + 1 } else { v - 1 };
                }
                (base, len, Ty::Int)
            }
            TokenKind::In => {
                self.scan.next();
                self.expect(TokenKind::LBrak, "'[' expected");
                let base = self.gen.seq_reserve_cell();
                let first = self.expression();
                let elem_ty = first.ty.clone();
                if !elem_ty.is_scalar() && !matches!(elem_ty, Ty::Unknown) {
                    self.scan.report("scalar expected");
                }
                self.gen.seq_store(first);
                let mut len = 1;
                while self.accept(TokenKind::Comma) {
                    self.gen.seq_reserve_cell();
                    let x = self.expression();
                    if !x.ty.same(&elem_ty) {
                        self.scan.report("incompatible types");
                    }
                    self.gen.seq_store(x);
                    len += 1;
                }
                self.expect(TokenKind::RBrak, "']' expected");
                (base, len, elem_ty)
            }
            _ => {
                self.scan.report("':=' or 'in' expected");
                (0, 0, Ty::Unknown)
            }
        };
        let ctrl = self.gen.fresh(&name);
        self.gen.declare_local(&ctrl);
        let entry = Entry::Var {
            ty: elem_ty,
            storage: Storage::Local(ctrl.clone()),
        };
        if self.st.declare(&name, entry).is_err() {
            self.scan.report("multiple definition");
        }
        self.expect(TokenKind::Do, "'do' expected");
        let counter = self.gen.fresh("i");
        self.gen.declare_local(&counter);
        self.gen.loop_begin(&counter, len);
        self.gen.seq_elem_load(base, &counter);
        self.gen.set_local(&ctrl);
        self.statement();
        self.gen.loop_end(&counter);
        self.st.close_scope();
    }

    /// caseStatement ::= 'case' expression 'of' caseArm {';' caseArm}
    ///                   [('else' | 'otherwise') statement {';' statement}]
    ///                   'end'
    /// caseArm ::= expression {',' expression} ':' statement
    ///
    /// The selector is captured in a local once; each arm materializes its
    /// label values and scans them with a fresh counter, and a matched flag
    /// ensures only the first matching arm's statement runs.
    fn case_statement(&mut self) {
        self.scan.next();
        let sel = self.expression();
        let sel_ty = sel.ty.clone();
        if !sel_ty.is_scalar() && !matches!(sel_ty, Ty::Unknown) {
            self.scan.report("scalar expected");
        }
        let sel_local = self.gen.fresh("case");
        self.gen.declare_local(&sel_local);
        self.gen.load(sel);
        self.gen.set_local(&sel_local);
        // locals are only zero on function entry; a case inside a loop
        // must reset its flag each time it executes
        let matched = self.gen.fresh("matched");
        self.gen.declare_local(&matched);
        self.gen.load(Item::constant(Ty::Int, 0));
        self.gen.set_local(&matched);
        self.expect(TokenKind::Of, "'of' expected");
        loop {
            if !self.scan.sym.starts_expression() {
                break;
            }
            let base = self.gen.seq_reserve_cell();
            let first = self.expression();
            if !first.ty.same(&sel_ty) {
                self.scan.report("incompatible case label");
            }
            self.gen.seq_store(first);
            let mut len = 1;
            while self.accept(TokenKind::Comma) {
                self.gen.seq_reserve_cell();
                let x = self.expression();
                if !x.ty.same(&sel_ty) {
                    self.scan.report("incompatible case label");
                }
                self.gen.seq_store(x);
                len += 1;
            }
            self.expect(TokenKind::Colon, "':' expected");
            let counter = self.gen.fresh("i");
            self.gen.declare_local(&counter);
            self.gen.loop_begin(&counter, len);
            self.gen.case_guard_begin(&matched, &sel_local, base, &counter);
            self.statement();
            self.gen.case_guard_end();
            self.gen.loop_end(&counter);
            if !self.accept(TokenKind::Semicolon) {
                break;
            }
        }
        if matches!(self.scan.sym, TokenKind::Else | TokenKind::Otherwise) {
            self.scan.next();
            self.gen.case_else_begin(&matched);
            self.statement();
            while self.accept(TokenKind::Semicolon) {
                self.statement();
            }
            self.gen.case_else_end();
        }
        self.expect(TokenKind::End, "'end' expected");
    }

    /// compoundStatement ::= 'begin' statement {';' statement} 'end'
    fn compound_statement(&mut self) {
        self.expect(TokenKind::Begin, "'begin' expected");
        self.statement();
        while self.scan.sym == TokenKind::Semicolon || self.scan.sym.starts_statement() {
            if !self.accept(TokenKind::Semicolon) {
                self.scan.report("';' missing");
            }
            self.statement();
        }
        self.expect(TokenKind::End, "'end' expected");
    }

    // ------------------------------------------------------------------
    // program

    /// program ::= 'program' ident ';' declarations compoundStatement
    ///
    /// Returns the assembled module text and every diagnostic reported
    /// along the way; the text is only meaningful when no diagnostics were
    /// reported.
    pub fn program(mut self) -> (String, Vec<Diagnostic>) {
        self.expect(TokenKind::Program, "'program' expected");
        self.ident();
        self.expect(TokenKind::Semicolon, "';' expected");
        self.declarations(true);
        self.gen.prog_entry();
        self.compound_statement();
        self.gen.prog_exit();
        self.accept(TokenKind::Period);
        if self.scan.sym != TokenKind::Eof {
            self.scan.report("unexpected text after program");
        }
        (self.gen.finish(), self.scan.into_diagnostics())
    }
}
