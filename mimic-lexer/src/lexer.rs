use crate::token::Token;

/// The lexer for the Mimic language.
pub struct Lexer {
    pub(crate) chars: Vec<char>,
    pub(crate) skip_comments: bool,
    pub(crate) skip_whitespace: bool,
    line: u32,
    column: u32,
    token_line: u32,
    token_column: u32,
}

impl Lexer {
    pub fn new<T: AsRef<str>>(input: T) -> Lexer {
        Lexer {
            chars: input.as_ref().chars().rev().collect(),
            skip_comments: false,
            skip_whitespace: false,
            line: 1,
            column: 1,
            token_line: 1,
            token_column: 1,
        }
    }

    pub fn skip_whitespace(mut self, value: bool) -> Lexer {
        self.skip_whitespace = value;
        self
    }

    pub fn skip_comments(mut self, value: bool) -> Lexer {
        self.skip_comments = value;
        self
    }

    pub fn text(self) -> String {
        self.chars.into_iter().rev().collect()
    }

    /// The source position (line, column) at which the most recently
    /// returned token started.
    pub fn token_position(&self) -> (u32, u32) {
        (self.token_line, self.token_column)
    }

    fn peek(&self) -> Option<char> {
        self.chars.last().copied()
    }

    fn peek_second(&self) -> Option<char> {
        let len = self.chars.len();
        if len < 2 {
            None
        } else {
            Some(self.chars[len - 2])
        }
    }

    fn bump(&mut self) -> Option<char> {
        let ch = self.chars.pop()?;
        if ch == '\n' {
            self.line += 1;
            self.column = 1;
        } else {
            self.column += 1;
        }
        Some(ch)
    }

    fn lex_string(&mut self) -> Option<String> {
        let mut output = String::new();
        self.bump()?;
        loop {
            let ch = self.bump()?;
            match ch {
                '"' => break Some(output),
                '\\' => {
                    let ch = self.bump()?;
                    match ch {
                        't' => output.push('\t'),
                        'n' => output.push('\n'),
                        'r' => output.push('\r'),
                        '"' => output.push('"'),
                        '\\' => output.push('\\'),
                        _ => {}
                    }
                }
                ch => output.push(ch),
            }
        }
    }

    fn lex_comment(&mut self) -> Option<Token> {
        let mut output = String::new();
        self.bump()?;
        while let Some(ch) = self.peek() {
            if ch == '\n' {
                break;
            }
            output.push(ch);
            self.bump()?;
        }
        if self.skip_comments {
            self.next()
        } else {
            Some(Token::Comment(output))
        }
    }

    fn lex_identifier(&mut self) -> Option<String> {
        let mut ident = String::new();
        while let Some(ch) = self.peek() {
            if ch.is_alphanumeric() || ch == '_' || ch == '!' || ch == '?' {
                ident.push(ch);
                self.bump()?;
            } else {
                break;
            }
        }
        // A single trailing colon makes a keyword-shaped identifier (`foo:`).
        if let Some(':') = self.peek() {
            if self.peek_second() != Some(':') {
                ident.push(':');
                self.bump()?;
            }
        }
        Some(ident)
    }

    fn is_operator(ch: char) -> bool {
        matches!(
            ch,
            '~' | '&' | '|' | '*' | '/' | '+' | '-' | '=' | '>' | '<' | '%' | '^' | ':' | '@'
        )
    }
}

impl Iterator for Lexer {
    type Item = Token;

    fn next(&mut self) -> Option<Self::Item> {
        self.token_line = self.line;
        self.token_column = self.column;
        let peeked = self.peek()?;
        match peeked {
            '\r' | '\n' => {
                self.bump()?;
                if peeked == '\r' && self.peek() == Some('\n') {
                    self.bump()?;
                }
                Some(Token::Newline)
            }
            _ if peeked.is_whitespace() => {
                while let Some(ch) = self.peek() {
                    if ch.is_whitespace() && ch != '\n' && ch != '\r' {
                        self.bump()?;
                    } else {
                        break;
                    }
                }
                if self.skip_whitespace {
                    self.next()
                } else {
                    Some(Token::Whitespace)
                }
            }
            ';' => self.lex_comment(),
            '"' => self.lex_string().map(Token::LitString),
            '(' => {
                self.bump()?;
                Some(Token::NewArgs)
            }
            ')' => {
                self.bump()?;
                Some(Token::EndArgs)
            }
            ',' => {
                self.bump()?;
                Some(Token::Comma)
            }
            '.' => {
                self.bump()?;
                Some(Token::Period)
            }
            ':' if self
                .peek_second()
                .map(|ch| ch.is_alphabetic() || ch == '_')
                .unwrap_or(false) =>
            {
                self.bump()?;
                self.lex_identifier().map(Token::LitSymbol)
            }
            _ if Lexer::is_operator(peeked) => {
                let mut op = String::new();
                while let Some(ch) = self.peek() {
                    if Lexer::is_operator(ch) {
                        op.push(ch);
                        self.bump()?;
                    } else {
                        break;
                    }
                }
                if op == "=" {
                    Some(Token::Assign)
                } else {
                    Some(Token::Operator(op))
                }
            }
            _ if peeked.is_digit(10) => {
                let mut digits = String::new();
                while let Some(ch) = self.peek() {
                    if ch.is_digit(10) {
                        digits.push(ch);
                        self.bump()?;
                    } else {
                        break;
                    }
                }
                Some(Token::LitInteger(digits))
            }
            _ if peeked.is_alphabetic() || peeked == '_' => {
                self.lex_identifier().map(Token::Identifier)
            }
            _ => None,
        }
    }
}
