use std::fmt;

use serde::{Deserialize, Serialize};

macro_rules! id_type {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub usize);

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

id_type!(
    /// Index into [`BoundProgram::functions`](crate::BoundProgram)
    FunctionId
);
id_type!(
    /// Index into [`BoundProgram::classes`](crate::BoundProgram)
    ClassId
);
id_type!(
    /// Index into [`BoundProgram::enums`](crate::BoundProgram)
    EnumId
);
id_type!(
    /// Index into [`BoundProgram::namespaces`](crate::BoundProgram)
    NamespaceId
);

/// The type of a bound value
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Type {
    Void,
    Int,
    Bool,
    Float,
    Double,
    String,
    /// Any composite value
    Object,
    Enum(EnumId),
    Class(ClassId),
    /// Multi dimensional arrays nest this variant
    Array(Box<Type>),
}

impl Type {
    pub fn array_of(element: Type) -> Self {
        Type::Array(Box::new(element))
    }

    /// The element type if this is an array
    pub fn element(&self) -> Option<&Type> {
        match self {
            Type::Array(element) => Some(element),
            _ => None,
        }
    }

    /// The number of array dimensions of this type
    pub fn rank(&self) -> usize {
        let mut rank = 0;
        let mut current = self;
        while let Type::Array(element) = current {
            rank += 1;
            current = element;
        }
        rank
    }

    pub fn is_floating(&self) -> bool {
        matches!(self, Type::Float | Type::Double)
    }

    /// Whether values of this type are compared structurally instead of numerically
    pub fn is_composite(&self) -> bool {
        matches!(self, Type::Object | Type::Class(_) | Type::Array(_))
    }
}

impl fmt::Display for Type {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Type::Void => f.write_str("void"),
            Type::Int => f.write_str("int"),
            Type::Bool => f.write_str("bool"),
            Type::Float => f.write_str("float"),
            Type::Double => f.write_str("double"),
            Type::String => f.write_str("string"),
            Type::Object => f.write_str("object"),
            Type::Enum(id) => write!(f, "enum#{id}"),
            Type::Class(id) => write!(f, "class#{id}"),
            Type::Array(element) => write!(f, "{element}[]"),
        }
    }
}
