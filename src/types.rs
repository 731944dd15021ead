use std::fmt::Display;

// Ordering classes for the value domain the histograms index. Values of
// different classes are strictly ordered by class, values within a class are
// ordered by their own comparison. The ranks leave gaps so further classes
// can be slotted in later without renumbering.
pub const NULL_TYPE_CLASS: i32 = 5;
pub const NUMERIC_TYPE_CLASS: i32 = 10;
pub const STRING_TYPE_CLASS: i32 = 15;
pub const BOOL_TYPE_CLASS: i32 = 40;

#[derive(Debug, Clone)]
pub enum DomainValue {
    Null,
    BigInt(i64),
    Int(i32),
    SmallInt(i16),
    Double(f64),
    String(String),
    Bool(bool),
}

impl DomainValue {
    pub fn type_class(&self) -> i32 {
        match self {
            DomainValue::Null => NULL_TYPE_CLASS,
            DomainValue::BigInt(_)
            | DomainValue::Int(_)
            | DomainValue::SmallInt(_)
            | DomainValue::Double(_) => NUMERIC_TYPE_CLASS,
            DomainValue::String(_) => STRING_TYPE_CLASS,
            DomainValue::Bool(_) => BOOL_TYPE_CLASS,
        }
    }

    pub fn as_number(&self) -> Option<f64> {
        match self {
            DomainValue::BigInt(value) => Some(*value as f64),
            DomainValue::Int(value) => Some(*value as f64),
            DomainValue::SmallInt(value) => Some(*value as f64),
            DomainValue::Double(value) => Some(*value),
            _ => None,
        }
    }
}

impl PartialEq for DomainValue {
    fn eq(&self, other: &Self) -> bool {
        // For numeric types also allow comparisons between different widths
        // (like bigint with smallint)
        match (self, other) {
            (DomainValue::Null, DomainValue::Null) => true,
            (DomainValue::String(a), DomainValue::String(b)) => a == b,
            (DomainValue::Bool(a), DomainValue::Bool(b)) => a == b,
            _ => match (self.as_number(), other.as_number()) {
                (Some(a), Some(b)) => a == b,
                _ => false,
            },
        }
    }
}

impl PartialOrd for DomainValue {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        if self.type_class() != other.type_class() {
            return self.type_class().partial_cmp(&other.type_class());
        }
        match (self, other) {
            (DomainValue::Null, DomainValue::Null) => Some(std::cmp::Ordering::Equal),
            (DomainValue::String(a), DomainValue::String(b)) => a.partial_cmp(b),
            (DomainValue::Bool(a), DomainValue::Bool(b)) => a.partial_cmp(b),
            // all numeric variants share a class, compare by magnitude
            _ => match (self.as_number(), other.as_number()) {
                (Some(a), Some(b)) => a.partial_cmp(&b),
                _ => unreachable!(),
            },
        }
    }
}

impl Display for DomainValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DomainValue::Null => write!(f, "NULL"),
            DomainValue::BigInt(i) => write!(f, "{}", i),
            DomainValue::Int(i) => write!(f, "{}", i),
            DomainValue::SmallInt(i) => write!(f, "{}", i),
            DomainValue::Double(d) => write!(f, "{}", d),
            DomainValue::String(s) => write!(f, "\"{}\"", s.escape_debug()),
            DomainValue::Bool(b) => write!(f, "{}", b),
        }
    }
}

// Descriptor of an index key pattern (the ordered list of indexed fields).
// Opaque to the statistics layer, it is only ever used as a cache key.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct IndexKey {
    pub fields: Vec<String>,
}

impl IndexKey {
    pub fn new(fields: Vec<String>) -> Self {
        Self { fields }
    }

    pub fn single(field: &str) -> Self {
        Self { fields: vec![field.to_string()] }
    }
}
