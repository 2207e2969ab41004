//! The structured value domain the evaluator reads and writes.
//!
//! This is the crate's own tagged enum for the self-describing data tree
//! described by the config syntax, generalized from the same shape the
//! teacher crate uses for its own literal domain (a closed sum of variants
//! with one heap indirection at each recursive boundary, no shared
//! ownership). It deliberately does not borrow an external JSON/Ion value
//! type: the compiler and evaluator only ever need to construct, compare,
//! and clone these values, never to parse them from bytes.

use std::fmt;

use bigdecimal::BigDecimal;
use chrono::{DateTime, FixedOffset};
use num_bigint::BigInt;
use smol_str::SmolStr;

/// A value together with the ordered annotation labels attached to it.
///
/// Annotations only matter during compilation (they carry criterion
/// identifiers and namespace markers); a materialized result value has no
/// further use for them, so [`crate::eval`] only ever returns bare [`Value`]s.
#[derive(Debug, Clone, PartialEq)]
pub struct Element {
    pub annotations: Vec<SmolStr>,
    pub value: Value,
}

impl Element {
    pub fn new(value: Value) -> Self {
        Self {
            annotations: Vec::new(),
            value,
        }
    }

    pub fn with_annotations(annotations: Vec<SmolStr>, value: Value) -> Self {
        Self { annotations, value }
    }

    pub fn is_null(&self) -> bool {
        matches!(self.value, Value::Null)
    }
}

impl From<Value> for Element {
    fn from(value: Value) -> Self {
        Element::new(value)
    }
}

/// One node of the self-describing data tree.
///
/// Struct fields preserve insertion order and allow repeated field names
/// (hence `Vec<(SmolStr, Element)>` rather than a map); everything else is
/// a direct match for spec's enumerated value domain.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Null,
    Bool(bool),
    Int(BigInt),
    Decimal(BigDecimal),
    Float(f64),
    String(SmolStr),
    Symbol(SmolStr),
    Timestamp(Timestamp),
    Blob(Vec<u8>),
    List(Vec<Element>),
    Struct(Vec<(SmolStr, Element)>),
}

impl Value {
    /// Text content of a string or symbol value, treated equivalently for
    /// field-name and criterion parsing purposes (spec §6).
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Value::String(s) | Value::Symbol(s) => Some(s.as_str()),
            _ => None,
        }
    }

    pub fn as_struct(&self) -> Option<&[(SmolStr, Element)]> {
        match self {
            Value::Struct(fields) => Some(fields),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[Element]> {
        match self {
            Value::List(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_int(&self) -> Option<&BigInt> {
        match self {
            Value::Int(i) => Some(i),
            _ => None,
        }
    }

    pub fn as_decimal(&self) -> Option<&BigDecimal> {
        match self {
            Value::Decimal(d) => Some(d),
            _ => None,
        }
    }

    pub fn as_float(&self) -> Option<f64> {
        match self {
            Value::Float(f) => Some(*f),
            _ => None,
        }
    }

    pub fn as_blob(&self) -> Option<&[u8]> {
        match self {
            Value::Blob(b) => Some(b),
            _ => None,
        }
    }

    pub fn as_timestamp(&self) -> Option<&Timestamp> {
        match self {
            Value::Timestamp(t) => Some(t),
            _ => None,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => write!(f, "null"),
            Value::Bool(b) => write!(f, "{b}"),
            Value::Int(i) => write!(f, "{i}"),
            Value::Decimal(d) => write!(f, "{d}"),
            Value::Float(x) => write!(f, "{x}"),
            Value::String(s) => write!(f, "{s:?}"),
            Value::Symbol(s) => write!(f, "'{s}'"),
            Value::Timestamp(t) => write!(f, "{t}"),
            Value::Blob(b) => write!(f, "blob({} bytes)", b.len()),
            Value::List(items) => write!(f, "[{} elements]", items.len()),
            Value::Struct(fields) => write!(f, "{{{} fields}}", fields.len()),
        }
    }
}

/// A point in time with an explicit declared precision, mirroring Ion's
/// timestamp model (a timestamp written to day precision is a different
/// value from the same instant written to fractional-second precision).
#[derive(Debug, Clone, PartialEq)]
pub struct Timestamp {
    pub instant: DateTime<FixedOffset>,
    pub precision: TimestampPrecision,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimestampPrecision {
    Year,
    Month,
    Day,
    Minute,
    Second,
    FractionalSecond(u32),
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.instant.to_rfc3339())
    }
}
