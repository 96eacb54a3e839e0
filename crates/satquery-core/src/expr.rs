//! Boolean filter expressions in the DISCOS query grammar.
//!
//! Clauses are kept as a tree and only rendered to text when a request is
//! built, e.g. `eq(objectClass,'Payload')&ge(mass,1.00)&le(mass,5.00)`.

use std::fmt::{Display, Formatter};

use time::Date;

use crate::domain::format_date;

/// Literal operand of a comparison.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Str(String),
    Int(u64),
    /// Decimal rendered with a fixed number of fractional digits.
    Fixed { value: f64, decimals: usize },
    Epoch(Date),
    Null,
    List(Vec<Value>),
}

impl Value {
    pub fn str(value: impl Into<String>) -> Self {
        Self::Str(value.into())
    }

    pub const fn fixed(value: f64, decimals: usize) -> Self {
        Self::Fixed { value, decimals }
    }
}

impl Display for Value {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            // A quote inside a string literal is written twice.
            Self::Str(value) => write!(f, "'{}'", value.replace('\'', "''")),
            Self::Int(value) => write!(f, "{value}"),
            Self::Fixed { value, decimals } => write!(f, "{:.*}", *decimals, value),
            Self::Epoch(date) => write!(f, "epoch:'{}'", format_date(*date)),
            Self::Null => f.write_str("null"),
            Self::List(values) => {
                f.write_str("(")?;
                for (index, value) in values.iter().enumerate() {
                    if index > 0 {
                        f.write_str(",")?;
                    }
                    write!(f, "{value}")?;
                }
                f.write_str(")")
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Op {
    Eq,
    Ne,
    Ge,
    Le,
    In,
    IContains,
}

impl Op {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Eq => "eq",
            Self::Ne => "ne",
            Self::Ge => "ge",
            Self::Le => "le",
            Self::In => "in",
            Self::IContains => "icontains",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    Cmp {
        op: Op,
        field: &'static str,
        value: Value,
    },
    And(Vec<Expr>),
    Or(Vec<Expr>),
}

impl Expr {
    pub const fn cmp(op: Op, field: &'static str, value: Value) -> Self {
        Self::Cmp { op, field, value }
    }

    /// Inclusive `ge(field,lo)&le(field,hi)`.
    pub fn between(field: &'static str, lo: Value, hi: Value) -> Self {
        Self::And(vec![Self::cmp(Op::Ge, field, lo), Self::cmp(Op::Le, field, hi)])
    }

    /// Conjunction of `clauses`, flattening nested conjunctions.
    /// Returns `None` for an empty list and the clause itself for a single one.
    pub fn all(clauses: Vec<Expr>) -> Option<Self> {
        Self::combine(clauses, true)
    }

    /// Disjunction of `clauses`, flattening nested disjunctions.
    pub fn any_of(clauses: Vec<Expr>) -> Option<Self> {
        Self::combine(clauses, false)
    }

    fn combine(clauses: Vec<Expr>, conjunction: bool) -> Option<Self> {
        let mut flat = Vec::with_capacity(clauses.len());
        for clause in clauses {
            match clause {
                Self::And(children) if conjunction => flat.extend(children),
                Self::Or(children) if !conjunction => flat.extend(children),
                other => flat.push(other),
            }
        }

        match flat.len() {
            0 => None,
            1 => flat.pop(),
            _ if conjunction => Some(Self::And(flat)),
            _ => Some(Self::Or(flat)),
        }
    }

    fn write_children(
        f: &mut Formatter<'_>,
        children: &[Expr],
        separator: &str,
        parent_is_and: bool,
    ) -> std::fmt::Result {
        for (index, child) in children.iter().enumerate() {
            if index > 0 {
                f.write_str(separator)?;
            }
            let needs_parens = match child {
                Self::And(_) => !parent_is_and,
                Self::Or(_) => parent_is_and,
                Self::Cmp { .. } => false,
            };
            if needs_parens {
                write!(f, "({child})")?;
            } else {
                write!(f, "{child}")?;
            }
        }
        Ok(())
    }
}

impl Display for Expr {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Cmp { op, field, value } => write!(f, "{}({field},{value})", op.as_str()),
            Self::And(children) => Self::write_children(f, children, "&", true),
            Self::Or(children) => Self::write_children(f, children, "|", false),
        }
    }
}
