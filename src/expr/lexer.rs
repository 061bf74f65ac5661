use super::ast::Operator;
use crate::error::ParseError;
use std::fmt;

#[derive(Debug, Clone, PartialEq)]
pub enum Token {
    String(String),
    Integer(i64),
    Double(f64),
    Boolean(bool),
    Nil,
    /// Raw reference text including the leading `$`.
    Reference(String),
    /// A function name, possibly dotted (`string.concat`).
    Identifier(String),
    Operator(Operator),
    Question,
    Colon,
    Comma,
    LeftParen,
    RightParen,
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Token::String(s) => write!(f, "\"{}\"", s),
            Token::Integer(n) => write!(f, "{}", n),
            Token::Double(n) => write!(f, "{}", n),
            Token::Boolean(b) => write!(f, "{}", b),
            Token::Nil => write!(f, "nil"),
            Token::Reference(r) | Token::Identifier(r) => write!(f, "{}", r),
            Token::Operator(op) => write!(f, "{}", op),
            Token::Question => write!(f, "?"),
            Token::Colon => write!(f, ":"),
            Token::Comma => write!(f, ","),
            Token::LeftParen => write!(f, "("),
            Token::RightParen => write!(f, ")"),
        }
    }
}

/// A token and the character offset it starts at.
#[derive(Debug, Clone, PartialEq)]
pub struct Spanned {
    pub token: Token,
    pub position: usize,
}

/// States of the reference scanner.
#[derive(Clone, Copy)]
enum RefState {
    Path,
    Bracket,
    Quoted(char),
}

pub struct Lexer<'a> {
    input: &'a str,
    chars: Vec<char>,
    pos: usize,
}

impl<'a> Lexer<'a> {
    pub fn new(input: &'a str) -> Self {
        Lexer {
            input,
            chars: input.chars().collect(),
            pos: 0,
        }
    }

    fn peek(&self) -> Option<char> {
        self.chars.get(self.pos).copied()
    }

    fn peek_next(&self) -> Option<char> {
        self.chars.get(self.pos + 1).copied()
    }

    fn unexpected(&self, found: char, position: usize) -> ParseError {
        ParseError::UnexpectedCharacter {
            input: self.input.to_string(),
            found,
            position,
        }
    }

    pub fn tokenize(mut self) -> Result<Vec<Spanned>, ParseError> {
        let mut tokens = Vec::new();
        while let Some(c) = self.peek() {
            if c.is_whitespace() {
                self.pos += 1;
                continue;
            }
            let position = self.pos;
            let token = match c {
                '"' | '\'' => self.scan_string(c)?,
                '0'..='9' => self.scan_number()?,
                '$' => self.scan_reference()?,
                c if c.is_alphabetic() || c == '_' => self.scan_word(),
                _ => self.scan_symbol(c)?,
            };
            tokens.push(Spanned { token, position });
        }
        Ok(tokens)
    }

    fn scan_string(&mut self, quote: char) -> Result<Token, ParseError> {
        let start = self.pos;
        self.pos += 1;
        let mut text = String::new();
        while let Some(c) = self.peek() {
            self.pos += 1;
            match c {
                '\\' => {
                    let escaped = self.peek().ok_or_else(|| ParseError::Unterminated {
                        input: self.input.to_string(),
                        what: "string literal",
                        position: start,
                    })?;
                    self.pos += 1;
                    text.push(match escaped {
                        'n' => '\n',
                        't' => '\t',
                        'r' => '\r',
                        other => other,
                    });
                }
                c if c == quote => return Ok(Token::String(text)),
                c => text.push(c),
            }
        }
        Err(ParseError::Unterminated {
            input: self.input.to_string(),
            what: "string literal",
            position: start,
        })
    }

    fn scan_number(&mut self) -> Result<Token, ParseError> {
        let start = self.pos;
        while matches!(self.peek(), Some('0'..='9')) {
            self.pos += 1;
        }
        let is_double = self.peek() == Some('.') && matches!(self.peek_next(), Some('0'..='9'));
        if is_double {
            self.pos += 1;
            while matches!(self.peek(), Some('0'..='9')) {
                self.pos += 1;
            }
        }
        let text: String = self.chars[start..self.pos].iter().collect();
        if is_double {
            text.parse::<f64>()
                .map(Token::Double)
                .map_err(|_| ParseError::InvalidNumber(text))
        } else {
            text.parse::<i64>()
                .map(Token::Integer)
                .map_err(|_| ParseError::InvalidNumber(text))
        }
    }

    /// Scans `$...` up to the first character that cannot continue a reference.
    /// Brackets may hold quoted keys, which may contain any character.
    fn scan_reference(&mut self) -> Result<Token, ParseError> {
        let start = self.pos;
        self.pos += 1;
        let mut state = RefState::Path;

        while let Some(c) = self.peek() {
            state = match (state, c) {
                (RefState::Path, c) if c.is_alphanumeric() || matches!(c, '_' | '.' | '$') => {
                    RefState::Path
                }
                (RefState::Path, '[') => RefState::Bracket,
                (RefState::Path, _) => break,
                (RefState::Bracket, ']') => RefState::Path,
                (RefState::Bracket, q @ ('"' | '\'')) => RefState::Quoted(q),
                (RefState::Bracket, _) => RefState::Bracket,
                (RefState::Quoted(q), c) if c == q => RefState::Bracket,
                (RefState::Quoted(q), _) => RefState::Quoted(q),
            };
            self.pos += 1;
        }

        if !matches!(state, RefState::Path) {
            return Err(ParseError::Unterminated {
                input: self.input.to_string(),
                what: "reference bracket",
                position: start,
            });
        }
        if self.pos == start + 1 {
            return Err(self.unexpected('$', start));
        }
        Ok(Token::Reference(self.chars[start..self.pos].iter().collect()))
    }

    fn scan_word(&mut self) -> Token {
        let start = self.pos;
        while matches!(self.peek(), Some(c) if c.is_alphanumeric() || c == '_' || c == '.') {
            self.pos += 1;
        }
        let word: String = self.chars[start..self.pos].iter().collect();
        match word.as_str() {
            "true" => Token::Boolean(true),
            "false" => Token::Boolean(false),
            "nil" | "null" => Token::Nil,
            _ => Token::Identifier(word),
        }
    }

    fn scan_symbol(&mut self, c: char) -> Result<Token, ParseError> {
        let position = self.pos;
        let next = self.peek_next();
        let (token, width) = match (c, next) {
            ('|', Some('|')) => (Token::Operator(Operator::Or), 2),
            ('&', Some('&')) => (Token::Operator(Operator::And), 2),
            ('=', Some('=')) => (Token::Operator(Operator::Equal), 2),
            ('!', Some('=')) => (Token::Operator(Operator::NotEqual), 2),
            ('<', Some('=')) => (Token::Operator(Operator::LessOrEqual), 2),
            ('>', Some('=')) => (Token::Operator(Operator::GreaterOrEqual), 2),
            ('<', _) => (Token::Operator(Operator::Less), 1),
            ('>', _) => (Token::Operator(Operator::Greater), 1),
            ('+', _) => (Token::Operator(Operator::Add), 1),
            ('-', _) => (Token::Operator(Operator::Subtract), 1),
            ('*', _) => (Token::Operator(Operator::Multiply), 1),
            ('/', _) => (Token::Operator(Operator::Divide), 1),
            ('%', _) => (Token::Operator(Operator::Modulo), 1),
            ('?', _) => (Token::Question, 1),
            (':', _) => (Token::Colon, 1),
            (',', _) => (Token::Comma, 1),
            ('(', _) => (Token::LeftParen, 1),
            (')', _) => (Token::RightParen, 1),
            (other, _) => return Err(self.unexpected(other, position)),
        };
        self.pos += width;
        Ok(token)
    }
}
