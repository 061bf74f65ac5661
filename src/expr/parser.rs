use super::ast::{Expr, Operator, Reference};
use super::lexer::{Lexer, Spanned, Token};
use crate::error::ParseError;
use crate::path;
use crate::scope::normalize_reference;
use crate::value::Value;

/// Parses expression text into a tree.
///
/// Grammar, lowest binding first:
///
/// ```text
/// ternary        := or ( "?" ternary ":" ternary )?
/// or             := and ( "||" and )*
/// and            := comparison ( "&&" comparison )*
/// comparison     := additive ( ( "==" | "!=" | "<" | "<=" | ">" | ">=" ) additive )*
/// additive       := multiplicative ( ( "+" | "-" ) multiplicative )*
/// multiplicative := unary ( ( "*" | "/" | "%" ) unary )*
/// unary          := "-" number | primary
/// primary        := literal | reference | name "(" args? ")" | "(" ternary ")"
/// ```
pub fn parse(text: &str) -> Result<Expr, ParseError> {
    let tokens = Lexer::new(text).tokenize()?;
    let mut parser = Parser { tokens, pos: 0 };
    let expr = parser.parse_ternary()?;
    match parser.tokens.get(parser.pos) {
        None => Ok(expr),
        Some(extra) => Err(ParseError::UnexpectedToken {
            found: extra.token.to_string(),
            expected: "end of expression".to_string(),
            position: extra.position,
        }),
    }
}

/// Turns raw reference text into a scope or element reference.
pub fn parse_reference(raw: &str) -> Result<Reference, ParseError> {
    if let Some(rest) = raw.strip_prefix("$$") {
        return Ok(Reference::Element(path::parse(rest)?));
    }
    if let Some(rest) = raw.strip_prefix("$.") {
        return Ok(Reference::Element(path::parse(rest)?));
    }
    Ok(Reference::Scope(normalize_reference(raw).into_owned()))
}

struct Parser {
    tokens: Vec<Spanned>,
    pos: usize,
}

impl Parser {
    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos).map(|spanned| &spanned.token)
    }

    fn advance(&mut self) -> Option<Spanned> {
        let spanned = self.tokens.get(self.pos).cloned();
        if spanned.is_some() {
            self.pos += 1;
        }
        spanned
    }

    fn expect(&mut self, expected: Token, description: &str) -> Result<(), ParseError> {
        match self.advance() {
            Some(spanned) if spanned.token == expected => Ok(()),
            Some(spanned) => Err(ParseError::UnexpectedToken {
                found: spanned.token.to_string(),
                expected: description.to_string(),
                position: spanned.position,
            }),
            None => Err(ParseError::UnexpectedEnd(description.to_string())),
        }
    }

    /// Consumes the next token if it is one of `operators`.
    fn match_operator(&mut self, operators: &[Operator]) -> Option<Operator> {
        match self.peek() {
            Some(Token::Operator(op)) if operators.contains(op) => {
                let op = *op;
                self.pos += 1;
                Some(op)
            }
            _ => None,
        }
    }

    fn parse_ternary(&mut self) -> Result<Expr, ParseError> {
        let condition = self.parse_binary(0)?;
        if self.peek() != Some(&Token::Question) {
            return Ok(condition);
        }
        self.pos += 1;
        let then = self.parse_ternary()?;
        self.expect(Token::Colon, "':' in conditional expression")?;
        let otherwise = self.parse_ternary()?;
        Ok(Expr::Ternary {
            condition: Box::new(condition),
            then: Box::new(then),
            otherwise: Box::new(otherwise),
        })
    }

    /// Parses one left-associative level of binary operators and everything above it.
    fn parse_binary(&mut self, level: usize) -> Result<Expr, ParseError> {
        const LEVELS: [&[Operator]; 5] = [
            &[Operator::Or],
            &[Operator::And],
            &[
                Operator::Equal,
                Operator::NotEqual,
                Operator::Less,
                Operator::LessOrEqual,
                Operator::Greater,
                Operator::GreaterOrEqual,
            ],
            &[Operator::Add, Operator::Subtract],
            &[Operator::Multiply, Operator::Divide, Operator::Modulo],
        ];

        let Some(operators) = LEVELS.get(level) else {
            return self.parse_unary();
        };
        let mut left = self.parse_binary(level + 1)?;
        while let Some(op) = self.match_operator(operators) {
            let right = self.parse_binary(level + 1)?;
            left = Expr::binary(left, op, right);
        }
        Ok(left)
    }

    fn parse_unary(&mut self) -> Result<Expr, ParseError> {
        if self.peek() != Some(&Token::Operator(Operator::Subtract)) {
            return self.parse_primary();
        }
        self.pos += 1;
        match self.advance() {
            Some(Spanned {
                token: Token::Integer(n),
                ..
            }) => Ok(Expr::Literal(Value::from_i64(-n))),
            Some(Spanned {
                token: Token::Double(n),
                ..
            }) => Ok(Expr::Literal(Value::Double(-n))),
            Some(spanned) => Err(ParseError::UnexpectedToken {
                found: spanned.token.to_string(),
                expected: "a number after '-'".to_string(),
                position: spanned.position,
            }),
            None => Err(ParseError::UnexpectedEnd("a number after '-'".to_string())),
        }
    }

    fn parse_primary(&mut self) -> Result<Expr, ParseError> {
        let Some(spanned) = self.advance() else {
            return Err(ParseError::UnexpectedEnd("an operand".to_string()));
        };
        match spanned.token {
            Token::String(s) => Ok(Expr::Literal(Value::String(s))),
            Token::Integer(n) => Ok(Expr::Literal(Value::from_i64(n))),
            Token::Double(n) => Ok(Expr::Literal(Value::Double(n))),
            Token::Boolean(b) => Ok(Expr::Literal(Value::Boolean(b))),
            Token::Nil => Ok(Expr::Literal(Value::Null)),
            Token::Reference(raw) => Ok(Expr::Reference(parse_reference(&raw)?)),
            Token::Identifier(name) => self.parse_call(name),
            Token::LeftParen => {
                let inner = self.parse_ternary()?;
                self.expect(Token::RightParen, "')'")?;
                Ok(inner)
            }
            other => Err(ParseError::UnexpectedToken {
                found: other.to_string(),
                expected: "an operand".to_string(),
                position: spanned.position,
            }),
        }
    }

    fn parse_call(&mut self, name: String) -> Result<Expr, ParseError> {
        self.expect(Token::LeftParen, &format!("'(' after function name '{}'", name))?;
        let mut args = Vec::new();
        if self.peek() == Some(&Token::RightParen) {
            self.pos += 1;
            return Ok(Expr::Call { name, args });
        }
        loop {
            args.push(self.parse_ternary()?);
            match self.advance() {
                Some(Spanned {
                    token: Token::Comma,
                    ..
                }) => continue,
                Some(Spanned {
                    token: Token::RightParen,
                    ..
                }) => break,
                Some(spanned) => {
                    return Err(ParseError::UnexpectedToken {
                        found: spanned.token.to_string(),
                        expected: "',' or ')' in argument list".to_string(),
                        position: spanned.position,
                    });
                }
                None => return Err(ParseError::UnexpectedEnd("')'".to_string())),
            }
        }
        Ok(Expr::Call { name, args })
    }
}
