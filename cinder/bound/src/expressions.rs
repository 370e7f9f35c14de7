use std::fmt;

use serde::{Deserialize, Serialize};
use smol_str::SmolStr;

use crate::{BuiltinFunction, ClassId, EnumId, FunctionId, NamespaceId, Type, VariableSymbol};

bound_node_declaration! {
    #[derive(Clone, PartialEq, Serialize, Deserialize)]
    pub enum BoundExpression {
        Literal(BoundLiteral),
        Variable(BoundVariableExpression),
        Unary(BoundUnaryExpression),
        Binary(BoundBinaryExpression),
        Call(BoundCallExpression),
        Conversion(BoundConversionExpression),
        ObjectCreation(BoundObjectCreationExpression),
        ArrayCreation(BoundArrayCreationExpression),
        FieldAccess(BoundFieldAccessExpression),
        ArrayAccess(BoundArrayAccessExpression),
        Assignment(BoundAssignmentExpression),
    }
}

/// A value that is known at compile time
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum LiteralValue {
    Int(i32),
    Bool(bool),
    Float(f32),
    Double(f64),
    String(SmolStr),
    EnumMember { enumeration: EnumId, member: usize },
}

impl LiteralValue {
    pub fn ty(&self) -> Type {
        match self {
            LiteralValue::Int(_) => Type::Int,
            LiteralValue::Bool(_) => Type::Bool,
            LiteralValue::Float(_) => Type::Float,
            LiteralValue::Double(_) => Type::Double,
            LiteralValue::String(_) => Type::String,
            LiteralValue::EnumMember { enumeration, .. } => Type::Enum(*enumeration),
        }
    }
}

impl fmt::Display for LiteralValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LiteralValue::Int(value) => write!(f, "{value}"),
            LiteralValue::Bool(value) => write!(f, "{value}"),
            LiteralValue::Float(value) => write!(f, "{value}f"),
            LiteralValue::Double(value) => write!(f, "{value}d"),
            LiteralValue::String(value) => write!(f, "{value:?}"),
            LiteralValue::EnumMember {
                enumeration,
                member,
            } => write!(f, "enum#{enumeration}::{member}"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BoundLiteral {
    pub value: LiteralValue,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BoundVariableExpression {
    pub variable: VariableSymbol,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum UnaryOperator {
    Identity,
    Negation,
    LogicalNegation,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BoundUnaryExpression {
    pub operator: UnaryOperator,
    pub operand: Box<BoundExpression>,
    pub ty: Type,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BinaryOperator {
    Add,
    Sub,
    Mul,
    Div,
    Mod,
    Equal,
    NotEqual,
    Less,
    LessOrEqual,
    Greater,
    GreaterOrEqual,
    LogicalAnd,
    LogicalOr,
}

impl BinaryOperator {
    pub fn is_comparison(self) -> bool {
        matches!(
            self,
            BinaryOperator::Equal
                | BinaryOperator::NotEqual
                | BinaryOperator::Less
                | BinaryOperator::LessOrEqual
                | BinaryOperator::Greater
                | BinaryOperator::GreaterOrEqual
        )
    }

    pub fn is_logical(self) -> bool {
        matches!(self, BinaryOperator::LogicalAnd | BinaryOperator::LogicalOr)
    }

    pub fn symbol(self) -> &'static str {
        match self {
            BinaryOperator::Add => "+",
            BinaryOperator::Sub => "-",
            BinaryOperator::Mul => "*",
            BinaryOperator::Div => "/",
            BinaryOperator::Mod => "%",
            BinaryOperator::Equal => "==",
            BinaryOperator::NotEqual => "!=",
            BinaryOperator::Less => "<",
            BinaryOperator::LessOrEqual => "<=",
            BinaryOperator::Greater => ">",
            BinaryOperator::GreaterOrEqual => ">=",
            BinaryOperator::LogicalAnd => "&&",
            BinaryOperator::LogicalOr => "||",
        }
    }
}

impl fmt::Display for BinaryOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BoundBinaryExpression {
    pub left: Box<BoundExpression>,
    pub operator: BinaryOperator,
    pub right: Box<BoundExpression>,
    pub ty: Type,
}

/// The function a call expression invokes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Callee {
    User(FunctionId),
    Builtin(BuiltinFunction),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BoundCallExpression {
    pub callee: Callee,
    /// The instance a method is called on
    #[serde(default)]
    pub receiver: Option<Box<BoundExpression>>,
    pub arguments: Vec<BoundExpression>,
    pub ty: Type,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BoundConversionExpression {
    pub operand: Box<BoundExpression>,
    pub ty: Type,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BoundObjectCreationExpression {
    pub class: ClassId,
    pub arguments: Vec<BoundExpression>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BoundArrayCreationExpression {
    pub element: Type,
    /// One length per dimension, outermost first
    pub dimensions: Vec<BoundExpression>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BoundFieldAccessExpression {
    pub instance: Box<BoundExpression>,
    pub field: SmolStr,
    pub ty: Type,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BoundArrayAccessExpression {
    pub array: Box<BoundExpression>,
    pub index: Box<BoundExpression>,
    pub ty: Type,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BoundAssignmentExpression {
    pub target: Box<BoundExpression>,
    pub value: Box<BoundExpression>,
}

impl BoundExpression {
    pub fn ty(&self) -> Type {
        match self {
            BoundExpression::Literal(literal) => literal.value.ty(),
            BoundExpression::Variable(variable) => variable.variable.ty(),
            BoundExpression::Unary(unary) => unary.ty.clone(),
            BoundExpression::Binary(binary) => binary.ty.clone(),
            BoundExpression::Call(call) => call.ty.clone(),
            BoundExpression::Conversion(conversion) => conversion.ty.clone(),
            BoundExpression::ObjectCreation(creation) => Type::Class(creation.class),
            BoundExpression::ArrayCreation(creation) => creation
                .dimensions
                .iter()
                .fold(creation.element.clone(), |ty, _| Type::array_of(ty)),
            BoundExpression::FieldAccess(access) => access.ty.clone(),
            BoundExpression::ArrayAccess(access) => access.ty.clone(),
            BoundExpression::Assignment(assignment) => assignment.target.ty(),
        }
    }

    pub fn as_literal(&self) -> Option<&LiteralValue> {
        match self {
            BoundExpression::Literal(literal) => Some(&literal.value),
            _ => None,
        }
    }

    pub fn as_int_literal(&self) -> Option<i32> {
        match self.as_literal() {
            Some(LiteralValue::Int(value)) => Some(*value),
            _ => None,
        }
    }

    /// Whether evaluating this expression never runs user code or macros
    pub fn is_trivial(&self) -> bool {
        matches!(
            self,
            BoundExpression::Literal(_) | BoundExpression::Variable(_)
        )
    }

    /// A short description used in error messages
    pub fn describe(&self) -> String {
        match self {
            BoundExpression::Literal(literal) => format!("literal {}", literal.value),
            BoundExpression::Variable(variable) => {
                format!("variable '{}'", variable.variable.name())
            }
            BoundExpression::Unary(unary) => format!("unary {:?} expression", unary.operator),
            BoundExpression::Binary(binary) => format!("binary '{}' expression", binary.operator),
            BoundExpression::Call(call) => match call.callee {
                Callee::User(id) => format!("call of function #{id}"),
                Callee::Builtin(builtin) => format!("call of builtin '{builtin}'"),
            },
            BoundExpression::Conversion(conversion) => {
                format!("conversion to {}", conversion.ty)
            }
            BoundExpression::ObjectCreation(creation) => {
                format!("creation of class #{}", creation.class)
            }
            BoundExpression::ArrayCreation(creation) => {
                format!("creation of a {} array", creation.element)
            }
            BoundExpression::FieldAccess(access) => format!("access of field '{}'", access.field),
            BoundExpression::ArrayAccess(_) => "array access".to_string(),
            BoundExpression::Assignment(assignment) => {
                format!("assignment to {}", assignment.target.describe())
            }
        }
    }
}

/// Constructors used by front-ends and tests
impl BoundExpression {
    pub fn literal(value: LiteralValue) -> Self {
        BoundLiteral { value }.into()
    }

    pub fn int(value: i32) -> Self {
        Self::literal(LiteralValue::Int(value))
    }

    pub fn bool(value: bool) -> Self {
        Self::literal(LiteralValue::Bool(value))
    }

    pub fn float(value: f32) -> Self {
        Self::literal(LiteralValue::Float(value))
    }

    pub fn double(value: f64) -> Self {
        Self::literal(LiteralValue::Double(value))
    }

    pub fn string(value: impl Into<SmolStr>) -> Self {
        Self::literal(LiteralValue::String(value.into()))
    }

    pub fn enum_member(enumeration: EnumId, member: usize) -> Self {
        Self::literal(LiteralValue::EnumMember {
            enumeration,
            member,
        })
    }

    pub fn variable(variable: VariableSymbol) -> Self {
        BoundVariableExpression { variable }.into()
    }

    pub fn local(name: impl Into<SmolStr>, ty: Type) -> Self {
        Self::variable(VariableSymbol::Local {
            name: name.into(),
            ty,
        })
    }

    pub fn parameter(name: impl Into<SmolStr>, ty: Type) -> Self {
        Self::variable(VariableSymbol::Parameter {
            name: name.into(),
            ty,
        })
    }

    pub fn global(namespace: NamespaceId, name: impl Into<SmolStr>, ty: Type) -> Self {
        Self::variable(VariableSymbol::Global {
            namespace,
            name: name.into(),
            ty,
        })
    }

    pub fn this(class: ClassId) -> Self {
        Self::variable(VariableSymbol::This { class })
    }

    pub fn unary(operator: UnaryOperator, operand: BoundExpression) -> Self {
        let ty = match operator {
            UnaryOperator::Identity | UnaryOperator::Negation => operand.ty(),
            UnaryOperator::LogicalNegation => Type::Bool,
        };
        BoundUnaryExpression {
            operator,
            operand: Box::new(operand),
            ty,
        }
        .into()
    }

    pub fn negate(operand: BoundExpression) -> Self {
        Self::unary(UnaryOperator::Negation, operand)
    }

    pub fn not(operand: BoundExpression) -> Self {
        Self::unary(UnaryOperator::LogicalNegation, operand)
    }

    /// Creates a binary expression, comparisons and logical operators evaluate to `bool`,
    /// everything else to the type of the left operand
    pub fn binary(left: BoundExpression, operator: BinaryOperator, right: BoundExpression) -> Self {
        let ty = if operator.is_comparison() || operator.is_logical() {
            Type::Bool
        } else {
            left.ty()
        };
        BoundBinaryExpression {
            left: Box::new(left),
            operator,
            right: Box::new(right),
            ty,
        }
        .into()
    }

    pub fn call(function: FunctionId, arguments: Vec<BoundExpression>, ty: Type) -> Self {
        BoundCallExpression {
            callee: Callee::User(function),
            receiver: None,
            arguments,
            ty,
        }
        .into()
    }

    pub fn method_call(
        function: FunctionId,
        receiver: BoundExpression,
        arguments: Vec<BoundExpression>,
        ty: Type,
    ) -> Self {
        BoundCallExpression {
            callee: Callee::User(function),
            receiver: Some(Box::new(receiver)),
            arguments,
            ty,
        }
        .into()
    }

    pub fn builtin(builtin: BuiltinFunction, arguments: Vec<BoundExpression>) -> Self {
        BoundCallExpression {
            callee: Callee::Builtin(builtin),
            receiver: None,
            arguments,
            ty: builtin.return_type(),
        }
        .into()
    }

    pub fn convert(operand: BoundExpression, ty: Type) -> Self {
        BoundConversionExpression {
            operand: Box::new(operand),
            ty,
        }
        .into()
    }

    pub fn new_object(class: ClassId, arguments: Vec<BoundExpression>) -> Self {
        BoundObjectCreationExpression { class, arguments }.into()
    }

    pub fn new_array(element: Type, dimensions: Vec<BoundExpression>) -> Self {
        BoundArrayCreationExpression {
            element,
            dimensions,
        }
        .into()
    }

    pub fn field(instance: BoundExpression, field: impl Into<SmolStr>, ty: Type) -> Self {
        BoundFieldAccessExpression {
            instance: Box::new(instance),
            field: field.into(),
            ty,
        }
        .into()
    }

    /// Indexes into an array, the result type is the element type of the array
    pub fn index(array: BoundExpression, index: BoundExpression) -> Self {
        let ty = array.ty().element().cloned().unwrap_or(Type::Object);
        BoundArrayAccessExpression {
            array: Box::new(array),
            index: Box::new(index),
            ty,
        }
        .into()
    }

    pub fn assign(target: BoundExpression, value: BoundExpression) -> Self {
        BoundAssignmentExpression {
            target: Box::new(target),
            value: Box::new(value),
        }
        .into()
    }
}
