/// Represents a token from the lexer.
#[derive(Debug, Clone, PartialEq)]
pub enum Token {
    /// An opening parenthesis (`(`), starting an argument list or a grouping.
    NewArgs,
    /// A closing parenthesis (`)`).
    EndArgs,
    /// A comma, separating argument sub-chains (`,`).
    Comma,
    /// A period, the statement terminator (`.`).
    Period,
    /// A line break, which also terminates a statement.
    Newline,
    /// The assignment operator (`=`).
    Assign,
    /// An integer literal (`42`), kept textual for arbitrary precision.
    LitInteger(String),
    /// A string literal (`"hello, world"`).
    LitString(String),
    /// A symbol literal (`:foo`).
    LitSymbol(String),
    /// An identifier (`foo`), possibly keyword-shaped (`foo:`).
    Identifier(String),
    /// A sequence of operator characters (eg: `<=>`).
    Operator(String),
    /// A comment (`; until end of line`).
    Comment(String),
    /// Some whitespace other than line breaks (` `).
    Whitespace,
}

impl Token {
    /// Whether this token is keyword-shaped (an identifier ending in `:`).
    pub fn is_keyword(&self) -> bool {
        matches!(self, Token::Identifier(name) if name.ends_with(':'))
    }
}
