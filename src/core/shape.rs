// Destination shape checks run once before any input is read.
// Accepted: `&mut Vec<R>` and `&mut Vec<Box<R>>` where `R` is a record.
use std::fmt;

use crate::core::error::{Error, ErrorKind};
use crate::core::schema::Record;

/// Structural description of a Rust type, as far as decoding cares.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum TypeShape {
    Null,
    Text,
    Primitive(&'static str),
    Record(&'static str),
    Boxed(Box<TypeShape>),
    Ref(Box<TypeShape>),
    Seq(Box<TypeShape>),
}

impl TypeShape {
    pub fn boxed(self) -> Self {
        TypeShape::Boxed(Box::new(self))
    }

    pub fn by_ref(self) -> Self {
        TypeShape::Ref(Box::new(self))
    }

    pub fn seq(self) -> Self {
        TypeShape::Seq(Box::new(self))
    }

    /// Shape of `&mut Vec<E>`.
    pub fn destination<E: Element>() -> Self {
        E::shape().seq().by_ref()
    }

    fn is_record(&self) -> bool {
        matches!(self, TypeShape::Record(_))
    }
}

impl fmt::Display for TypeShape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TypeShape::Null => f.write_str("null"),
            TypeShape::Text => f.write_str("String"),
            TypeShape::Primitive(name) | TypeShape::Record(name) => f.write_str(name),
            TypeShape::Boxed(inner) => write!(f, "Box<{inner}>"),
            TypeShape::Ref(inner) => write!(f, "&mut {inner}"),
            TypeShape::Seq(inner) => write!(f, "Vec<{inner}>"),
        }
    }
}

/// How decoded records are stored in the destination.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ElementShape {
    Value,
    Reference,
}

/// An element type a destination `Vec` may hold.
pub trait Element: Sized {
    type Record: Default;

    fn shape() -> TypeShape;

    fn from_record(record: Self::Record) -> Self;
}

impl<R: Record> Element for Box<R> {
    type Record = R;

    fn shape() -> TypeShape {
        R::shape().boxed()
    }

    fn from_record(record: R) -> Self {
        Box::new(record)
    }
}

pub fn validate_destination(shape: &TypeShape) -> Result<ElementShape, Error> {
    let unsupported = || {
        Error::new(ErrorKind::UnsupportedType)
            .with_message("destination must be a mutable reference to a Vec of records")
            .with_type(shape.to_string())
    };

    let TypeShape::Ref(target) = shape else {
        return Err(unsupported());
    };
    let TypeShape::Seq(element) = target.as_ref() else {
        return Err(unsupported());
    };
    match element.as_ref() {
        TypeShape::Record(_) => Ok(ElementShape::Value),
        TypeShape::Boxed(inner) if inner.is_record() => Ok(ElementShape::Reference),
        _ => Err(unsupported()),
    }
}
