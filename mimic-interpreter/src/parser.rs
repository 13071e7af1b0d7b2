use std::fmt;

use num_bigint::BigInt;

use mimic_lexer::{Lexer, Token};

use crate::message::{self, Position};
use crate::object::Object;
use crate::runtime::Runtime;

/// A syntax error, with the position of the offending token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseError {
    pub line: u32,
    pub column: u32,
    pub text: String,
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} (at {}:{})", self.text, self.line, self.column)
    }
}

impl std::error::Error for ParseError {}

/// Parse a whole source text into one message chain, or `None` when the
/// source holds no messages at all.
pub fn parse(rt: &Runtime, source: &str) -> Result<Option<Object>, ParseError> {
    let mut lexer = Lexer::new(source).skip_comments(true);
    let mut tokens = Vec::new();
    while let Some(token) = lexer.next() {
        tokens.push((token, lexer.token_position()));
    }
    let mut parser = Parser {
        rt,
        tokens,
        index: 0,
    };
    parser.parse_chain(false, false)
}

struct Parser<'a> {
    rt: &'a Runtime,
    tokens: Vec<(Token, (u32, u32))>,
    index: usize,
}

impl<'a> Parser<'a> {
    fn current(&self) -> Option<&(Token, (u32, u32))> {
        self.tokens.get(self.index)
    }

    fn advance(&mut self) {
        self.index += 1;
    }

    fn position(&self) -> (u32, u32) {
        self.current()
            .or_else(|| self.tokens.last())
            .map(|(_, position)| *position)
            .unwrap_or((1, 1))
    }

    fn error(&self, text: impl Into<String>) -> ParseError {
        let (line, column) = self.position();
        ParseError {
            line,
            column,
            text: text.into(),
        }
    }

    /// Parse one chain of messages, linking them in order.
    ///
    /// Inside argument lists the chain stops (without consuming) at `,` and
    /// `)`; terminators stay part of the chain there, which is what lets
    /// method bodies span lines. An assignment target chain instead stops
    /// at the first terminator.
    fn parse_chain(
        &mut self,
        in_args: bool,
        stop_at_terminator: bool,
    ) -> Result<Option<Object>, ParseError> {
        let mut head: Option<Object> = None;
        let mut tail: Option<Object> = None;
        loop {
            let token = match self.current() {
                Some((token, _)) => token.clone(),
                None => break,
            };
            match token {
                Token::Whitespace | Token::Comment(_) => self.advance(),
                Token::Comma | Token::EndArgs => {
                    if in_args {
                        break;
                    }
                    return Err(self.error("unexpected token outside of an argument list"));
                }
                Token::Period | Token::Newline => {
                    if stop_at_terminator {
                        break;
                    }
                    self.advance();
                    if let Some(last) = &tail {
                        if !message::is_terminator(last) {
                            let terminator = message::terminator(self.rt);
                            message::link(last, &terminator);
                            tail = Some(terminator);
                        }
                    }
                }
                Token::Assign => {
                    let place = match tail.take() {
                        Some(place) if !message::is_terminator(&place) => place,
                        _ => return Err(self.error("assignment without a target")),
                    };
                    self.advance();
                    let value = self
                        .parse_chain(in_args, true)?
                        .ok_or_else(|| self.error("assignment without a value"))?;
                    let prev = message::prev(&place);
                    message::set_prev(&place, None);
                    message::set_next(&place, None);
                    let position = message::position(&place);
                    let assign = message::with_args(self.rt, "=", vec![place, value]);
                    if let Some(position) = position {
                        message::set_position(&assign, position);
                    }
                    match &prev {
                        Some(prev) => message::link(prev, &assign),
                        None => head = Some(assign.clone()),
                    }
                    tail = Some(assign);
                }
                _ => {
                    let element = self.parse_element()?;
                    match &tail {
                        Some(last) => message::link(last, &element),
                        None => head = Some(element.clone()),
                    }
                    tail = Some(element);
                }
            }
        }
        Ok(head)
    }

    /// Parse one message: an identifier or operator (with its arguments), a
    /// literal, or a parenthesized group.
    fn parse_element(&mut self) -> Result<Object, ParseError> {
        let (token, (line, column)) = self
            .current()
            .cloned()
            .ok_or_else(|| self.error("unexpected end of input"))?;
        self.advance();
        let element = match token {
            Token::Identifier(name) => {
                let element = message::new(self.rt, &name);
                if matches!(self.current(), Some((Token::NewArgs, _))) {
                    self.advance();
                    let args = self.parse_args()?;
                    message::set_args(&element, args);
                }
                element
            }
            Token::Operator(name) => {
                let element = message::new(self.rt, &name);
                if matches!(self.current(), Some((Token::NewArgs, _))) {
                    self.advance();
                    let args = self.parse_args()?;
                    message::set_args(&element, args);
                } else {
                    // An operator without parentheses takes the next single
                    // element as its argument: no precedence, left to right.
                    while matches!(
                        self.current(),
                        Some((Token::Whitespace, _)) | Some((Token::Comment(_), _))
                    ) {
                        self.advance();
                    }
                    if self.starts_element() {
                        let argument = self.parse_element()?;
                        message::set_args(&element, vec![argument]);
                    }
                }
                element
            }
            Token::LitInteger(digits) => {
                let value = digits
                    .parse::<BigInt>()
                    .map_err(|_| self.error(format!("invalid number literal '{}'", digits)))?;
                let element = message::new(self.rt, "internal:createNumber");
                let number = self.rt.new_number(value);
                message::with_state_mut(&element, |state| state.cached = Some(number));
                element
            }
            Token::LitString(text) => {
                let element = message::new(self.rt, "internal:createText");
                let value = self.rt.new_text(&text);
                message::with_state_mut(&element, |state| state.cached = Some(value));
                element
            }
            Token::LitSymbol(name) => {
                let element = message::new(self.rt, "internal:createSymbol");
                let value = self.rt.new_symbol(&name);
                message::with_state_mut(&element, |state| state.cached = Some(value));
                element
            }
            Token::NewArgs => {
                let element = message::new(self.rt, "");
                let args = self.parse_args()?;
                message::set_args(&element, args);
                element
            }
            token => return Err(self.error(format!("unexpected token {:?}", token))),
        };
        message::set_position(
            &element,
            Position {
                line: line as usize,
                column: column as usize,
            },
        );
        Ok(element)
    }

    fn starts_element(&self) -> bool {
        matches!(
            self.current(),
            Some((Token::Identifier(_), _))
                | Some((Token::Operator(_), _))
                | Some((Token::LitInteger(_), _))
                | Some((Token::LitString(_), _))
                | Some((Token::LitSymbol(_), _))
                | Some((Token::NewArgs, _))
        )
    }

    /// Parse a `(`-opened argument list up to its closing `)`.
    fn parse_args(&mut self) -> Result<Vec<Object>, ParseError> {
        let mut args = Vec::new();
        loop {
            if let Some(chain) = self.parse_chain(true, false)? {
                args.push(chain);
            }
            match self.current() {
                Some((Token::Comma, _)) => self.advance(),
                Some((Token::EndArgs, _)) => {
                    self.advance();
                    break;
                }
                _ => return Err(self.error("unmatched '(' in argument list")),
            }
        }
        Ok(args)
    }
}
