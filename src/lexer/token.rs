use phf::phf_map;

pub static KEYWORDS: phf::Map<&str, TokenKind> = phf_map! {
    "div" => TokenKind::Div,
    "mod" => TokenKind::Mod,
    "and" => TokenKind::And,
    "or" => TokenKind::Or,
    "of" => TokenKind::Of,
    "then" => TokenKind::Then,
    "do" => TokenKind::Do,
    "not" => TokenKind::Not,
    "end" => TokenKind::End,
    "else" => TokenKind::Else,
    "if" => TokenKind::If,
    "while" => TokenKind::While,
    "array" => TokenKind::Array,
    "record" => TokenKind::Record,
    "const" => TokenKind::Const,
    "type" => TokenKind::Type,
    "var" => TokenKind::Var,
    "procedure" => TokenKind::Procedure,
    "begin" => TokenKind::Begin,
    "program" => TokenKind::Program,
    "for" => TokenKind::For,
    "in" => TokenKind::In,
    "to" => TokenKind::To,
    "downto" => TokenKind::Downto,
    "case" => TokenKind::Case,
    "otherwise" => TokenKind::Otherwise,
};

#[derive(Clone, Debug, PartialEq)]
pub enum TokenKind {
    Times,
    Div,
    Mod,
    And,
    Amp,
    Plus,
    Minus,
    Or,
    Bar,
    Tilde,
    Not,

    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,

    Period,
    Comma,
    Colon,
    Semicolon,
    Becomes,
    LParen,
    RParen,
    LBrak,
    RBrak,

    Number(i32),
    Ident(String),

    Of,
    Then,
    Do,
    End,
    Else,
    If,
    While,
    Array,
    Record,
    Const,
    Type,
    Var,
    Procedure,
    Begin,
    Program,
    For,
    In,
    To,
    Downto,
    Case,
    Otherwise,

    Eof,
}

impl TokenKind {
    pub fn starts_factor(&self) -> bool {
        matches!(
            self,
            TokenKind::Ident(_)
                | TokenKind::Number(_)
                | TokenKind::LParen
                | TokenKind::Not
                | TokenKind::Tilde
        )
    }

    pub fn follows_factor(&self) -> bool {
        matches!(
            self,
            TokenKind::Times
                | TokenKind::Div
                | TokenKind::Mod
                | TokenKind::And
                | TokenKind::Amp
                | TokenKind::Or
                | TokenKind::Bar
                | TokenKind::Plus
                | TokenKind::Minus
                | TokenKind::Eq
                | TokenKind::Ne
                | TokenKind::Lt
                | TokenKind::Le
                | TokenKind::Gt
                | TokenKind::Ge
                | TokenKind::Comma
                | TokenKind::Semicolon
                | TokenKind::Then
                | TokenKind::Else
                | TokenKind::RParen
                | TokenKind::RBrak
                | TokenKind::Do
                | TokenKind::Period
                | TokenKind::End
                | TokenKind::In
        )
    }

    pub fn starts_expression(&self) -> bool {
        self.starts_factor() || matches!(self, TokenKind::Plus | TokenKind::Minus)
    }

    pub fn starts_statement(&self) -> bool {
        matches!(
            self,
            TokenKind::Ident(_)
                | TokenKind::If
                | TokenKind::While
                | TokenKind::Begin
                | TokenKind::For
                | TokenKind::Case
        )
    }

    pub fn follows_statement(&self) -> bool {
        matches!(
            self,
            TokenKind::Semicolon
                | TokenKind::End
                | TokenKind::Else
                | TokenKind::Otherwise
                | TokenKind::In
                | TokenKind::Becomes
        )
    }

    pub fn starts_type(&self) -> bool {
        matches!(
            self,
            TokenKind::Ident(_) | TokenKind::Record | TokenKind::Array | TokenKind::LParen
        )
    }

    pub fn starts_declaration(&self) -> bool {
        matches!(
            self,
            TokenKind::Const | TokenKind::Type | TokenKind::Var | TokenKind::Procedure
        )
    }

    /// Symbols that always resynchronize error recovery.
    pub fn is_strong(&self) -> bool {
        matches!(
            self,
            TokenKind::Const
                | TokenKind::Type
                | TokenKind::Var
                | TokenKind::Procedure
                | TokenKind::While
                | TokenKind::If
                | TokenKind::Begin
                | TokenKind::Eof
        )
    }

    pub fn is_relation(&self) -> bool {
        matches!(
            self,
            TokenKind::Eq
                | TokenKind::Ne
                | TokenKind::Lt
                | TokenKind::Le
                | TokenKind::Gt
                | TokenKind::Ge
        )
    }
}
