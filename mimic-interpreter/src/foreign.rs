use std::fmt;

use num_bigint::BigInt;

use crate::data::Data;
use crate::object::Object;
use crate::runtime::Runtime;

/// A value crossing the boundary to or from a foreign host.
#[derive(Debug, Clone, PartialEq)]
pub enum ForeignValue {
    Nil,
    Boolean(bool),
    Integer(BigInt),
    Text(String),
}

/// One callable a foreign bridge exposes.
#[derive(Debug, Clone)]
pub struct ForeignDescriptor {
    pub name: String,
    pub arity: usize,
    pub documentation: String,
}

/// Failure of a foreign invocation, surfaced as a `NativeException`
/// condition.
#[derive(Debug, Clone)]
pub enum ForeignError {
    NoSuchMethod(String),
    ArgumentMismatch { name: String, expected: usize, got: usize },
    Failed(String),
}

impl fmt::Display for ForeignError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ForeignError::NoSuchMethod(name) => {
                write!(f, "no foreign method named '{}'", name)
            }
            ForeignError::ArgumentMismatch {
                name,
                expected,
                got,
            } => write!(
                f,
                "foreign method '{}' expects {} arguments, got {}",
                name, expected, got
            ),
            ForeignError::Failed(text) => write!(f, "foreign invocation failed: {}", text),
        }
    }
}

/// The seam towards a host environment.
///
/// A bridge exposes a flat set of named callables over simple values; the
/// `foreign` native routes to it and maps failures onto the condition
/// system.
pub trait ForeignBridge {
    fn descriptors(&self) -> Vec<ForeignDescriptor>;
    fn invoke(
        &mut self,
        name: &str,
        arguments: Vec<ForeignValue>,
    ) -> Result<ForeignValue, ForeignError>;
}

pub fn to_object(rt: &Runtime, value: ForeignValue) -> Object {
    match value {
        ForeignValue::Nil => rt.nil(),
        ForeignValue::Boolean(value) => rt.truth(value),
        ForeignValue::Integer(value) => rt.new_number(value),
        ForeignValue::Text(value) => rt.new_text(&value),
    }
}

/// Convert an object to a bridge value, or `None` for anything a bridge
/// cannot represent.
pub fn from_object(rt: &Runtime, object: &Object) -> Option<ForeignValue> {
    if object.is_nil() {
        return Some(ForeignValue::Nil);
    }
    if *object == rt.true_object {
        return Some(ForeignValue::Boolean(true));
    }
    if *object == rt.false_object {
        return Some(ForeignValue::Boolean(false));
    }
    match &object.state().data {
        Data::Number(value) => Some(ForeignValue::Integer(value.clone())),
        Data::Text(value) => Some(ForeignValue::Text(value.clone())),
        Data::Symbol(value) => Some(ForeignValue::Text(value.clone())),
        _ => None,
    }
}
