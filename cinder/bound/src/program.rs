use cinder_common::StorageKind;
use serde::{Deserialize, Serialize};
use smol_str::SmolStr;

use crate::{
    BoundBlock, BoundExpression, ClassId, ClassSymbol, EnumBacking, EnumId, EnumSymbol,
    FunctionAttributes, FunctionId, FunctionKind, NamespaceId, ParameterSymbol, Type,
};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BoundFunction {
    pub name: SmolStr,
    pub namespace: NamespaceId,
    pub parameters: Vec<ParameterSymbol>,
    pub return_type: Type,
    pub body: BoundBlock,
    #[serde(default)]
    pub kind: FunctionKind,
    #[serde(default)]
    pub attributes: FunctionAttributes,
}

impl BoundFunction {
    /// Creates a free function without attributes
    pub fn new(
        namespace: NamespaceId,
        name: impl Into<SmolStr>,
        parameters: Vec<ParameterSymbol>,
        return_type: Type,
        body: BoundBlock,
    ) -> Self {
        BoundFunction {
            name: name.into(),
            namespace,
            parameters,
            return_type,
            body,
            kind: FunctionKind::Free,
            attributes: FunctionAttributes::default(),
        }
    }

    pub fn with_kind(mut self, kind: FunctionKind) -> Self {
        self.kind = kind;
        self
    }

    pub fn with_attributes(mut self, attributes: FunctionAttributes) -> Self {
        self.attributes = attributes;
        self
    }

    /// The class whose instance is available as `this`
    pub fn receiver_class(&self) -> Option<ClassId> {
        match self.kind {
            FunctionKind::Free => None,
            FunctionKind::Method(class) | FunctionKind::Constructor(class) => Some(class),
        }
    }
}

/// A namespace level variable
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GlobalField {
    pub name: SmolStr,
    pub ty: Type,
    #[serde(default)]
    pub initializer: Option<BoundExpression>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BoundNamespace {
    pub name: SmolStr,
    #[serde(default)]
    pub fields: Vec<GlobalField>,
}

/// A complete, fully bound program
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct BoundProgram {
    pub namespaces: Vec<BoundNamespace>,
    pub functions: Vec<BoundFunction>,
    #[serde(default)]
    pub classes: Vec<ClassSymbol>,
    #[serde(default)]
    pub enums: Vec<EnumSymbol>,
}

impl BoundProgram {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_namespace(&mut self, name: impl Into<SmolStr>) -> NamespaceId {
        self.namespaces.push(BoundNamespace {
            name: name.into(),
            fields: Vec::new(),
        });
        NamespaceId(self.namespaces.len() - 1)
    }

    pub fn add_field(
        &mut self,
        namespace: NamespaceId,
        name: impl Into<SmolStr>,
        ty: Type,
        initializer: Option<BoundExpression>,
    ) {
        self.namespaces[namespace.0].fields.push(GlobalField {
            name: name.into(),
            ty,
            initializer,
        });
    }

    pub fn add_function(&mut self, function: BoundFunction) -> FunctionId {
        self.functions.push(function);
        FunctionId(self.functions.len() - 1)
    }

    pub fn add_class(&mut self, class: ClassSymbol) -> ClassId {
        self.classes.push(class);
        ClassId(self.classes.len() - 1)
    }

    pub fn add_enum(&mut self, enumeration: EnumSymbol) -> EnumId {
        self.enums.push(enumeration);
        EnumId(self.enums.len() - 1)
    }

    pub fn namespace(&self, id: NamespaceId) -> Option<&BoundNamespace> {
        self.namespaces.get(id.0)
    }

    pub fn function(&self, id: FunctionId) -> Option<&BoundFunction> {
        self.functions.get(id.0)
    }

    pub fn function_mut(&mut self, id: FunctionId) -> Option<&mut BoundFunction> {
        self.functions.get_mut(id.0)
    }

    pub fn class(&self, id: ClassId) -> Option<&ClassSymbol> {
        self.classes.get(id.0)
    }

    pub fn enumeration(&self, id: EnumId) -> Option<&EnumSymbol> {
        self.enums.get(id.0)
    }

    pub fn namespaces(&self) -> impl Iterator<Item = (NamespaceId, &BoundNamespace)> {
        self.namespaces
            .iter()
            .enumerate()
            .map(|(index, namespace)| (NamespaceId(index), namespace))
    }

    pub fn functions(&self) -> impl Iterator<Item = (FunctionId, &BoundFunction)> {
        self.functions
            .iter()
            .enumerate()
            .map(|(index, function)| (FunctionId(index), function))
    }

    /// Decides where values of a type live.
    ///
    /// Integers, booleans and int backed enums live in registers,
    /// everything else lives in the tree storage.
    pub fn storage_kind(&self, ty: &Type) -> StorageKind {
        match ty {
            Type::Int | Type::Bool => StorageKind::Register,
            Type::Enum(id) => match self.enumeration(*id).map(|symbol| symbol.backing) {
                Some(EnumBacking::String) => StorageKind::Tree,
                Some(EnumBacking::Int) | None => StorageKind::Register,
            },
            Type::Void
            | Type::Float
            | Type::Double
            | Type::String
            | Type::Object
            | Type::Class(_)
            | Type::Array(_) => StorageKind::Tree,
        }
    }
}
