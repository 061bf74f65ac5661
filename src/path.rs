//! Field path addressing into value trees.
//!
//! A path is a flat sequence of segments: dotted names, bracketed integer
//! indices, and bracketed quoted keys, e.g. `items[0]["first name"].city`.

use crate::error::ParseError;
use std::fmt;

/// One step of a field path.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Segment {
    /// A dotted field name.
    Name(String),
    /// A zero-based array index, written `[n]`.
    Index(usize),
    /// A quoted map key, written `["key"]` or `['key']`.
    Key(String),
}

impl Segment {
    /// The object key this segment addresses, if it addresses one.
    pub fn key(&self) -> Option<&str> {
        match self {
            Segment::Name(name) | Segment::Key(name) => Some(name),
            Segment::Index(_) => None,
        }
    }
}

impl fmt::Display for Segment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Segment::Name(name) if is_plain_name(name) => f.write_str(name),
            Segment::Name(key) | Segment::Key(key) => {
                // A key closes at its quote followed by ']', so avoid a quote that forms that pair.
                let quote = if key.contains("\"]") { '\'' } else { '"' };
                write!(f, "[{quote}{key}{quote}]")
            }
            Segment::Index(i) => write!(f, "[{}]", i),
        }
    }
}

fn is_plain_name(name: &str) -> bool {
    !name.is_empty() && !name.contains(['.', '['])
}

/// A parsed field path.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct FieldPath {
    segments: Vec<Segment>,
}

impl FieldPath {
    pub fn new(segments: Vec<Segment>) -> Self {
        FieldPath { segments }
    }

    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    pub fn len(&self) -> usize {
        self.segments.len()
    }

    pub fn first(&self) -> Option<&Segment> {
        self.segments.first()
    }

    pub fn split_first(&self) -> Option<(&Segment, &[Segment])> {
        self.segments.split_first()
    }

    pub fn push(&mut self, segment: Segment) {
        self.segments.push(segment);
    }
}

impl From<Vec<Segment>> for FieldPath {
    fn from(segments: Vec<Segment>) -> Self {
        FieldPath::new(segments)
    }
}

impl fmt::Display for FieldPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, segment) in self.segments.iter().enumerate() {
            if i > 0 && matches!(segment, Segment::Name(name) if is_plain_name(name)) {
                f.write_str(".")?;
            }
            write!(f, "{}", segment)?;
        }
        Ok(())
    }
}

impl std::str::FromStr for FieldPath {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse(s)
    }
}

/// Strips a leading `$INPUT` marker (and the dot after it) from a target reference.
pub fn strip_input_prefix(text: &str) -> &str {
    match text.strip_prefix("$INPUT") {
        Some(rest) => rest.strip_prefix('.').unwrap_or(rest),
        None => text,
    }
}

/// Parses a field path. A single leading `.` is ignored; the empty string is the empty path.
pub fn parse(text: &str) -> Result<FieldPath, ParseError> {
    PathScanner::new(text).scan()
}

#[derive(Clone, Copy, PartialEq)]
enum State {
    /// At the start of the path or right after a closing bracket.
    Boundary,
    /// Right after a `.`, a name must follow.
    AfterDot,
    /// Inside a dotted name.
    Name,
}

struct PathScanner<'a> {
    input: &'a str,
    chars: Vec<char>,
    pos: usize,
}

impl<'a> PathScanner<'a> {
    fn new(input: &'a str) -> Self {
        let body = input.strip_prefix('.').unwrap_or(input);
        PathScanner {
            input,
            chars: body.chars().collect(),
            pos: 0,
        }
    }

    fn error(&self, message: impl Into<String>) -> ParseError {
        ParseError::InvalidPath {
            path: self.input.to_string(),
            message: message.into(),
        }
    }

    fn scan(mut self) -> Result<FieldPath, ParseError> {
        let mut segments = Vec::new();
        let mut name = String::new();
        let mut state = State::Boundary;

        while let Some(&c) = self.chars.get(self.pos) {
            match (state, c) {
                (State::Name, '.') => {
                    segments.push(Segment::Name(std::mem::take(&mut name)));
                    state = State::AfterDot;
                    self.pos += 1;
                }
                (State::Boundary, '.') => {
                    if segments.is_empty() {
                        return Err(self.error("empty field name"));
                    }
                    state = State::AfterDot;
                    self.pos += 1;
                }
                (State::AfterDot, '.') | (State::AfterDot, '[') => {
                    return Err(self.error(format!("empty field name at position {}", self.pos)));
                }
                (State::Name, '[') => {
                    segments.push(Segment::Name(std::mem::take(&mut name)));
                    segments.push(self.scan_bracket()?);
                    state = State::Boundary;
                }
                (State::Boundary, '[') => {
                    segments.push(self.scan_bracket()?);
                }
                (State::Boundary, _) if !segments.is_empty() => {
                    return Err(self.error(format!(
                        "expected '.' or '[' after ']' at position {}",
                        self.pos
                    )));
                }
                (_, c) => {
                    name.push(c);
                    state = State::Name;
                    self.pos += 1;
                }
            }
        }

        match state {
            State::Name => segments.push(Segment::Name(name)),
            State::AfterDot => return Err(self.error("path ends with '.'")),
            State::Boundary => {}
        }
        Ok(FieldPath::new(segments))
    }

    /// Scans `[...]` starting at the opening bracket.
    fn scan_bracket(&mut self) -> Result<Segment, ParseError> {
        let open = self.pos;
        self.pos += 1;
        match self.chars.get(self.pos) {
            Some(&quote) if quote == '"' || quote == '\'' => {
                self.pos += 1;
                let start = self.pos;
                // A quote only closes the key when a ']' follows it.
                while self.pos < self.chars.len() {
                    if self.chars[self.pos] == quote && self.chars.get(self.pos + 1) == Some(&']') {
                        let key: String = self.chars[start..self.pos].iter().collect();
                        self.pos += 2;
                        return Ok(Segment::Key(key));
                    }
                    self.pos += 1;
                }
                Err(self.error(format!("unterminated quoted key starting at position {}", open)))
            }
            _ => {
                let start = self.pos;
                while self.pos < self.chars.len() && self.chars[self.pos] != ']' {
                    self.pos += 1;
                }
                if self.pos >= self.chars.len() {
                    return Err(self.error(format!("unterminated '[' at position {}", open)));
                }
                let digits: String = self.chars[start..self.pos].iter().collect();
                self.pos += 1;
                digits
                    .trim()
                    .parse::<usize>()
                    .map(Segment::Index)
                    .map_err(|_| self.error(format!("invalid array index '{}'", digits)))
            }
        }
    }
}
