use crate::analyzer::{Entry, SymTab, Ty};
use crate::codegen::{Item, ItemKind};
use crate::lexer::TokenKind;

use super::Parser;

impl Parser {
    /// selector ::= {'.' ident | '[' expression ']'}
    pub(super) fn selector(&mut self, mut item: Item) -> Item {
        loop {
            match &self.scan.sym {
                TokenKind::Period => {
                    self.scan.next();
                    let Some(name) = self.ident() else { continue };
                    if let Ty::Record(rec) = item.ty.clone() {
                        match rec.fields.iter().find(|f| f.name == name) {
                            Some(field) => {
                                let field = field.clone();
                                item = self.gen.select(item, &field);
                            }
                            None => {
                                self.scan.report("undefined field");
                                item = Item::constant(Ty::Unknown, 0);
                            }
                        }
                    } else {
                        self.scan.report("not a record");
                        item = Item::constant(Ty::Unknown, 0);
                    }
                }
                TokenKind::LBrak => {
                    self.scan.next();
                    let idx = self.expression();
                    self.expect(TokenKind::RBrak, "']' expected");
                    if let Ty::Array(arr) = item.ty.clone() {
                        if !idx.ty.same(&Ty::Int) {
                            self.scan.report("integer expected");
                        }
                        if let Some(i) = idx.const_val() {
                            if i < arr.lower || i >= arr.lower + arr.length {
                                self.scan.report("index out of bounds");
                                item = Item::constant(arr.elem.clone(), 0);
                                continue;
                            }
                        }
                        item = self.gen.index(item, idx, &arr);
                    } else {
                        self.scan.report("not an array");
                        self.discard(idx);
                        item = Item::constant(Ty::Unknown, 0);
                    }
                }
                _ => return item,
            }
        }
    }

    /// factor ::= ident selector | number | '(' expression ')' |
    ///            ('not' | '~') factor
    fn factor(&mut self) -> Item {
        if !self.scan.sym.starts_factor() {
            self.scan.report("expression expected");
            while !(self.scan.sym.starts_factor()
                || self.scan.sym.follows_factor()
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
                match sym.entry {
                    Entry::Var { .. } | Entry::Ref { .. } => {
                        let item = self.gen.var_item(&sym);
                        self.selector(item)
                    }
                    // constants take no selector, so `c` in `[c .. n]`
                    // leaves the '..' to the type parser
                    Entry::Const { .. } => self.gen.var_item(&sym),
                    _ => {
                        self.scan.report("variable or constant expected");
                        Item::constant(Ty::Unknown, 0)
                    }
                }
            }
            TokenKind::Number(v) => {
                self.scan.next();
                Item::constant(Ty::Int, v)
            }
            TokenKind::LParen => {
                self.scan.next();
                let item = self.expression();
                self.expect(TokenKind::RParen, "')' expected");
                item
            }
            TokenKind::Not | TokenKind::Tilde => {
                self.scan.next();
                let item = self.factor();
                if !item.ty.same(&Ty::Bool) {
                    self.scan.report("boolean expected");
                }
                match item.const_val() {
                    Some(v) => Item::constant(Ty::Bool, if v == 0 { 1 } else { 0 }),
                    None => {
                        self.gen.load(item);
                        self.gen.invert();
                        Item::stack(Ty::Bool)
                    }
                }
            }
            _ => Item::constant(Ty::Unknown, 0),
        }
    }

    /// term ::= factor {('*' | 'div' | 'mod' | 'and' | '&') factor}
    fn term(&mut self) -> Item {
        let mut x = self.factor();
        while matches!(
            self.scan.sym,
            TokenKind::Times
                | TokenKind::Div
                | TokenKind::Mod
                | TokenKind::And
                | TokenKind::Amp
        ) {
            let op = self.scan.sym.clone();
            self.scan.next();
            if matches!(op, TokenKind::And | TokenKind::Amp) {
                x = self.conjunction(x);
            } else {
                if !x.ty.same(&Ty::Int) {
                    self.scan.report("integer expected");
                }
                if !x.is_const() {
                    x = self.gen.load(x);
                }
                let y = self.factor();
                if !y.ty.same(&Ty::Int) {
                    self.scan.report("integer expected");
                }
                x = self.arith(op, x, y);
            }
        }
        x
    }

    /// simpleExpression ::= ['+' | '-'] term {('+' | '-' | 'or' | '|') term}
    pub(super) fn simple_expression(&mut self) -> Item {
        let mut x = match self.scan.sym {
            TokenKind::Plus => {
                self.scan.next();
                let x = self.term();
                if !x.ty.same(&Ty::Int) {
                    self.scan.report("integer expected");
                }
                x
            }
            TokenKind::Minus => {
                self.scan.next();
                let x = self.term();
                if !x.ty.same(&Ty::Int) {
                    self.scan.report("integer expected");
                }
                match x.const_val() {
                    Some(v) => Item::constant(Ty::Int, v.wrapping_neg()),
                    None => {
                        self.gen.load(x);
                        self.gen.negate();
                        Item::stack(Ty::Int)
                    }
                }
            }
            _ => self.term(),
        };
        while matches!(
            self.scan.sym,
            TokenKind::Plus | TokenKind::Minus | TokenKind::Or | TokenKind::Bar
        ) {
            let op = self.scan.sym.clone();
            self.scan.next();
            if matches!(op, TokenKind::Or | TokenKind::Bar) {
                x = self.disjunction(x);
            } else {
                if !x.ty.same(&Ty::Int) {
                    self.scan.report("integer expected");
                }
                if !x.is_const() {
                    x = self.gen.load(x);
                }
                let y = self.term();
                if !y.ty.same(&Ty::Int) {
                    self.scan.report("integer expected");
                }
                x = self.arith(op, x, y);
            }
        }
        x
    }

    /// expression ::= simpleExpression [relation simpleExpression]
    ///
    /// Relations are non-associative: at most one per expression.
    pub(super) fn expression(&mut self) -> Item {
        let mut x = self.simple_expression();
        if self.scan.sym.is_relation() {
            let op = self.scan.sym.clone();
            self.scan.next();
            if !x.is_const() {
                x = self.gen.load(x);
            }
            let y = self.simple_expression();
            if !x.ty.same(&y.ty) || !(x.ty.is_scalar() || matches!(x.ty, Ty::Unknown)) {
                self.scan.report("incompatible types");
            }
            x = match (x.const_val(), y.const_val()) {
                (Some(a), Some(b)) => {
                    let v = match op {
                        TokenKind::Eq => a == b,
                        TokenKind::Ne => a != b,
                        TokenKind::Lt => a < b,
                        TokenKind::Le => a <= b,
                        TokenKind::Gt => a > b,
                        _ => a >= b,
                    };
                    Item::constant(Ty::Bool, v as i32)
                }
                (Some(a), None) => {
                    self.push_const_under(a, y);
                    self.gen.relation(&op);
                    Item::stack(Ty::Bool)
                }
                (None, _) => {
                    self.gen.load(y);
                    self.gen.relation(&op);
                    Item::stack(Ty::Bool)
                }
            };
        }
        x
    }

    /// Short-circuit `and`. A constant left operand folds: `false` cancels
    /// the right operand's value, `true` passes it through unchanged.
    fn conjunction(&mut self, x: Item) -> Item {
        if !x.ty.same(&Ty::Bool) {
            self.scan.report("boolean expected");
        }
        match x.const_val() {
            Some(v) => {
                let y = self.factor();
                if !y.ty.same(&Ty::Bool) {
                    self.scan.report("boolean expected");
                }
                if v == 0 {
                    self.discard(y);
                    Item::constant(Ty::Bool, 0)
                } else {
                    y
                }
            }
            None => {
                self.gen.and_left(x);
                let y = self.factor();
                if !y.ty.same(&Ty::Bool) {
                    self.scan.report("boolean expected");
                }
                self.gen.and_right(y);
                Item::stack(Ty::Bool)
            }
        }
    }

    /// Short-circuit `or`, dual to `conjunction`.
    fn disjunction(&mut self, x: Item) -> Item {
        if !x.ty.same(&Ty::Bool) {
            self.scan.report("boolean expected");
        }
        match x.const_val() {
            Some(v) => {
                let y = self.term();
                if !y.ty.same(&Ty::Bool) {
                    self.scan.report("boolean expected");
                }
                if v != 0 {
                    self.discard(y);
                    Item::constant(Ty::Bool, 1)
                } else {
                    y
                }
            }
            None => {
                self.gen.or_left(x);
                let y = self.term();
                if !y.ty.same(&Ty::Bool) {
                    self.scan.report("boolean expected");
                }
                self.gen.or_right(y);
                Item::stack(Ty::Bool)
            }
        }
    }

    /// One arithmetic operator. Two constants fold; otherwise the left
    /// operand is already loaded (or is a constant slipped under the right
    /// operand) and the instruction is emitted.
    fn arith(&mut self, op: TokenKind, x: Item, y: Item) -> Item {
        match (x.const_val(), y.const_val()) {
            (Some(a), Some(b)) => {
                let v = match op {
                    TokenKind::Times => a.wrapping_mul(b),
                    TokenKind::Plus => a.wrapping_add(b),
                    TokenKind::Minus => a.wrapping_sub(b),
                    TokenKind::Div | TokenKind::Mod if b == 0 => {
                        self.scan.report("division by zero");
                        0
                    }
                    TokenKind::Div => a.wrapping_div(b),
                    _ => a.wrapping_rem(b),
                };
                Item::constant(Ty::Int, v)
            }
            (Some(a), None) => {
                self.push_const_under(a, y);
                self.gen.binary_op(&op);
                Item::stack(Ty::Int)
            }
            (None, _) => {
                self.gen.load(y);
                self.gen.binary_op(&op);
                Item::stack(Ty::Int)
            }
        }
    }

    /// Puts a constant left operand below a right operand. If the right
    /// operand's instructions are already emitted, the constant is routed
    /// under it through a scratch local so source operand order is kept.
    fn push_const_under(&mut self, val: i32, y: Item) {
        if matches!(y.kind, ItemKind::Stack | ItemKind::RefStack) {
            self.gen.load(y);
            self.gen.const_under_stack(val);
        } else {
            self.gen.load(Item::constant(Ty::Int, val));
            self.gen.load(y);
        }
    }

    /// Throws away an item whose instructions may already be emitted, as
    /// happens to the dead branch of a constant-folded `and`/`or`.
    pub(super) fn discard(&mut self, item: Item) {
        if matches!(item.kind, ItemKind::Stack | ItemKind::RefStack) {
            self.gen.load(item);
            self.gen.drop_value();
        }
    }
}
