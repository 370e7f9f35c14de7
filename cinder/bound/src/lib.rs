//! The bound program model
//!
//! This is the hand-over format between the front-end (parsing, binding, type checking and
//! lowering) and the backends. Every program in this format is fully resolved and typed:
//! variables carry their types, calls name their callee by id and structured control flow
//! only uses the closed set of statements in [`BoundStatement`].
//!
//! The model can be built directly with the constructors on [`BoundExpression`] and
//! [`BoundStatement`] or deserialized from json.

#[macro_use]
mod macros;

mod builtins;
pub use builtins::BuiltinFunction;

mod expressions;
pub use expressions::*;

mod program;
pub use program::{BoundFunction, BoundNamespace, BoundProgram, GlobalField};

mod statements;
pub use statements::*;

mod symbols;
pub use symbols::{
    ClassSymbol, EnumBacking, EnumMember, EnumSymbol, FieldSymbol, FunctionAttributes,
    FunctionKind, LabelSymbol, ParameterSymbol, VariableSymbol,
};

mod types;
pub use types::{ClassId, EnumId, FunctionId, NamespaceId, Type};
