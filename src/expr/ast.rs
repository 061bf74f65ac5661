use crate::path::FieldPath;
use crate::value::Value;
use std::fmt;

/// Binary operators, lowest binding first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operator {
    Or,
    And,
    Equal,
    NotEqual,
    Less,
    LessOrEqual,
    Greater,
    GreaterOrEqual,
    Add,
    Subtract,
    Multiply,
    Divide,
    Modulo,
}

impl Operator {
    pub fn symbol(&self) -> &'static str {
        match self {
            Operator::Or => "||",
            Operator::And => "&&",
            Operator::Equal => "==",
            Operator::NotEqual => "!=",
            Operator::Less => "<",
            Operator::LessOrEqual => "<=",
            Operator::Greater => ">",
            Operator::GreaterOrEqual => ">=",
            Operator::Add => "+",
            Operator::Subtract => "-",
            Operator::Multiply => "*",
            Operator::Divide => "/",
            Operator::Modulo => "%",
        }
    }

    /// Higher numbers bind more tightly.
    pub fn precedence(&self) -> u8 {
        match self {
            Operator::Or => 2,
            Operator::And => 3,
            Operator::Equal
            | Operator::NotEqual
            | Operator::Less
            | Operator::LessOrEqual
            | Operator::Greater
            | Operator::GreaterOrEqual => 4,
            Operator::Add | Operator::Subtract => 5,
            Operator::Multiply | Operator::Divide | Operator::Modulo => 6,
        }
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

/// A value reference inside an expression.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Reference {
    /// A scope reference such as `$flow.customer.name`, resolved by a resolver.
    Scope(String),
    /// A path into the current array element: `$.name`, `$$`, `$$[0]`.
    Element(FieldPath),
}

impl fmt::Display for Reference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Reference::Scope(text) => f.write_str(text),
            Reference::Element(path) if path.is_empty() => f.write_str("$$"),
            Reference::Element(path) => match path.first() {
                Some(crate::path::Segment::Name(_)) => write!(f, "$.{}", path),
                _ => write!(f, "$${}", path),
            },
        }
    }
}

/// A parsed expression tree. Immutable once built.
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    Literal(Value),
    Reference(Reference),
    Call {
        name: String,
        args: Vec<Expr>,
    },
    Binary {
        left: Box<Expr>,
        op: Operator,
        right: Box<Expr>,
    },
    Ternary {
        condition: Box<Expr>,
        then: Box<Expr>,
        otherwise: Box<Expr>,
    },
}

impl Expr {
    pub fn binary(left: Expr, op: Operator, right: Expr) -> Self {
        Expr::Binary {
            left: Box::new(left),
            op,
            right: Box::new(right),
        }
    }

    /// True if any leaf reads from the current array element.
    pub fn references_element(&self) -> bool {
        match self {
            Expr::Reference(Reference::Element(_)) => true,
            Expr::Reference(Reference::Scope(_)) | Expr::Literal(_) => false,
            Expr::Call { args, .. } => args.iter().any(Expr::references_element),
            Expr::Binary { left, right, .. } => {
                left.references_element() || right.references_element()
            }
            Expr::Ternary {
                condition,
                then,
                otherwise,
            } => {
                condition.references_element()
                    || then.references_element()
                    || otherwise.references_element()
            }
        }
    }

    fn precedence(&self) -> u8 {
        match self {
            Expr::Ternary { .. } => 1,
            Expr::Binary { op, .. } => op.precedence(),
            Expr::Literal(_) | Expr::Reference(_) | Expr::Call { .. } => 9,
        }
    }

    /// Formats the expression, adding parentheses only where the grammar needs them.
    fn fmt_with_precedence(&self, f: &mut fmt::Formatter<'_>, parent_precedence: u8) -> fmt::Result {
        let current_precedence = self.precedence();
        let needs_parens = current_precedence < parent_precedence;

        if needs_parens {
            write!(f, "(")?;
        }

        match self {
            Expr::Literal(value) => fmt_literal(value, f)?,
            Expr::Reference(reference) => write!(f, "{}", reference)?,
            Expr::Call { name, args } => {
                write!(f, "{}(", name)?;
                for (i, arg) in args.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    arg.fmt_with_precedence(f, 0)?;
                }
                write!(f, ")")?;
            }
            // Operators are left-associative, so an equal-precedence right side keeps its parentheses.
            Expr::Binary { left, op, right } => {
                left.fmt_with_precedence(f, current_precedence)?;
                write!(f, " {} ", op)?;
                right.fmt_with_precedence(f, current_precedence + 1)?;
            }
            Expr::Ternary {
                condition,
                then,
                otherwise,
            } => {
                condition.fmt_with_precedence(f, current_precedence + 1)?;
                write!(f, " ? ")?;
                then.fmt_with_precedence(f, current_precedence)?;
                write!(f, " : ")?;
                otherwise.fmt_with_precedence(f, current_precedence)?;
            }
        }

        if needs_parens {
            write!(f, ")")?;
        }
        Ok(())
    }
}

fn fmt_literal(value: &Value, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match value {
        Value::Null => write!(f, "nil"),
        Value::String(s) => write!(f, "\"{}\"", s.replace('\\', "\\\\").replace('"', "\\\"")),
        Value::Double(n) if n.is_finite() && n.fract() == 0.0 => write!(f, "{:.1}", n),
        other => write!(f, "{}", other),
    }
}

impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.fmt_with_precedence(f, 0)
    }
}
