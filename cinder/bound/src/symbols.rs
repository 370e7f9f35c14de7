use std::fmt;

use serde::{Deserialize, Serialize};
use smol_str::SmolStr;

use crate::{ClassId, FunctionId, NamespaceId, Type};

/// How the members of an enum are represented at runtime
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum EnumBacking {
    /// Members are integers, stored in registers
    #[default]
    Int,
    /// Members are their names, stored as strings in the tree storage
    String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnumMember {
    pub name: SmolStr,
    pub value: i32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnumSymbol {
    pub name: SmolStr,
    #[serde(default)]
    pub backing: EnumBacking,
    pub members: Vec<EnumMember>,
}

impl EnumSymbol {
    /// Creates an int backed enum whose members are numbered from zero
    pub fn new<I, S>(name: impl Into<SmolStr>, members: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<SmolStr>,
    {
        EnumSymbol {
            name: name.into(),
            backing: EnumBacking::Int,
            members: members
                .into_iter()
                .zip(0..)
                .map(|(name, value)| EnumMember {
                    name: name.into(),
                    value,
                })
                .collect(),
        }
    }

    pub fn with_backing(mut self, backing: EnumBacking) -> Self {
        self.backing = backing;
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldSymbol {
    pub name: SmolStr,
    pub ty: Type,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassSymbol {
    pub name: SmolStr,
    pub namespace: NamespaceId,
    pub fields: Vec<FieldSymbol>,
    /// The constructor is always inlined at the creation site
    #[serde(default)]
    pub constructor: Option<FunctionId>,
}

impl ClassSymbol {
    pub fn field(&self, name: &str) -> Option<&FieldSymbol> {
        self.fields.iter().find(|field| field.name == name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParameterSymbol {
    pub name: SmolStr,
    pub ty: Type,
}

impl ParameterSymbol {
    pub fn new(name: impl Into<SmolStr>, ty: Type) -> Self {
        ParameterSymbol {
            name: name.into(),
            ty,
        }
    }
}

/// What kind of function a [`BoundFunction`](crate::BoundFunction) is
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum FunctionKind {
    #[default]
    Free,
    /// A method receives its instance as implicit `this` parameter
    Method(ClassId),
    /// Constructors are inlined into every object creation and never emitted on their own
    Constructor(ClassId),
}

/// Attributes that hook a function into the game loop
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct FunctionAttributes {
    /// Runs whenever the datapack is (re-)loaded
    pub load: bool,
    /// Runs every game tick
    pub tick: bool,
}

/// A reference to a variable
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum VariableSymbol {
    Local { name: SmolStr, ty: Type },
    Parameter { name: SmolStr, ty: Type },
    Global { namespace: NamespaceId, name: SmolStr, ty: Type },
    This { class: ClassId },
}

impl VariableSymbol {
    pub fn ty(&self) -> Type {
        match self {
            VariableSymbol::Local { ty, .. }
            | VariableSymbol::Parameter { ty, .. }
            | VariableSymbol::Global { ty, .. } => ty.clone(),
            VariableSymbol::This { class } => Type::Class(*class),
        }
    }

    pub fn name(&self) -> &str {
        match self {
            VariableSymbol::Local { name, .. }
            | VariableSymbol::Parameter { name, .. }
            | VariableSymbol::Global { name, .. } => name,
            VariableSymbol::This { .. } => "this",
        }
    }
}

/// A jump target produced by lowering
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LabelSymbol(pub SmolStr);

impl LabelSymbol {
    pub fn new(name: impl Into<SmolStr>) -> Self {
        LabelSymbol(name.into())
    }
}

impl fmt::Display for LabelSymbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
