//! Snbt rendering of literals and default values
use cinder_bound::{BoundProgram, ClassId, EnumBacking, LiteralValue, Type};
use cinder_error::{EmitErrorKind, EmitResult};
use itertools::Itertools;

use crate::common::string_escape::quote_snbt;

/// Renders a literal as it is stored in the tree
pub(crate) fn literal_snbt(program: &BoundProgram, value: &LiteralValue) -> EmitResult<String> {
    Ok(match value {
        LiteralValue::Int(value) => value.to_string(),
        LiteralValue::Bool(value) => if *value { "1b" } else { "0b" }.to_string(),
        LiteralValue::Float(value) => format!("{value}f"),
        LiteralValue::Double(value) => format!("{value}d"),
        LiteralValue::String(value) => quote_snbt(value),
        LiteralValue::EnumMember {
            enumeration,
            member,
        } => {
            let symbol = program
                .enumeration(*enumeration)
                .ok_or(EmitErrorKind::UnknownEnum(enumeration.0))?;
            let member = symbol.members.get(*member).ok_or_else(|| {
                EmitErrorKind::ExpectedConstant {
                    what: format!("member #{member} of enum '{}'", symbol.name),
                }
            })?;
            match symbol.backing {
                EnumBacking::Int => member.value.to_string(),
                EnumBacking::String => quote_snbt(&member.name),
            }
        }
    })
}

/// Renders the value a freshly declared variable of this type holds
pub(crate) fn default_snbt(program: &BoundProgram, ty: &Type) -> EmitResult<String> {
    default_snbt_inner(program, ty, &mut Vec::new())
}

fn default_snbt_inner(
    program: &BoundProgram,
    ty: &Type,
    visiting: &mut Vec<ClassId>,
) -> EmitResult<String> {
    Ok(match ty {
        Type::Int => "0".to_string(),
        Type::Bool => "0b".to_string(),
        Type::Float => "0f".to_string(),
        Type::Double => "0d".to_string(),
        Type::String => quote_snbt(""),
        Type::Enum(id) => {
            let symbol = program
                .enumeration(*id)
                .ok_or(EmitErrorKind::UnknownEnum(id.0))?;
            match (symbol.backing, symbol.members.first()) {
                (EnumBacking::Int, Some(member)) => member.value.to_string(),
                (EnumBacking::String, Some(member)) => quote_snbt(&member.name),
                (EnumBacking::Int, None) => "0".to_string(),
                (EnumBacking::String, None) => quote_snbt(""),
            }
        }
        Type::Class(id) if visiting.contains(id) => "{}".to_string(),
        Type::Class(id) => {
            let class = program.class(*id).ok_or(EmitErrorKind::UnknownClass(id.0))?;
            visiting.push(*id);
            let fields = class
                .fields
                .iter()
                .map(|field| {
                    default_snbt_inner(program, &field.ty, visiting)
                        .map(|value| format!("{}:{value}", field.name))
                })
                .collect::<EmitResult<Vec<_>>>()?;
            visiting.pop();
            format!("{{{}}}", fields.iter().join(","))
        }
        Type::Array(_) => "[]".to_string(),
        Type::Void | Type::Object => "{}".to_string(),
    })
}

/// A list holding `count` copies of `element`
pub(crate) fn repeated_list(element: &str, count: usize) -> String {
    format!("[{}]", std::iter::repeat(element).take(count).join(","))
}

#[cfg(test)]
mod tests {
    use cinder_bound::{
        BoundProgram, ClassSymbol, EnumBacking, EnumSymbol, FieldSymbol, LiteralValue, Type,
    };

    use super::{default_snbt, literal_snbt, repeated_list};

    #[test]
    fn test_literals() {
        let mut program = BoundProgram::new();
        let mode = program
            .add_enum(EnumSymbol::new("Mode", ["Fast", "Slow"]).with_backing(EnumBacking::String));

        let render = |value| literal_snbt(&program, &value).unwrap();
        assert_eq!(render(LiteralValue::Int(-3)), "-3");
        assert_eq!(render(LiteralValue::Bool(true)), "1b");
        assert_eq!(render(LiteralValue::Float(1.5)), "1.5f");
        assert_eq!(render(LiteralValue::Double(2.0)), "2d");
        assert_eq!(render(LiteralValue::String("a\"b".into())), r#""a\"b""#);
        assert_eq!(
            render(LiteralValue::EnumMember {
                enumeration: mode,
                member: 1
            }),
            r#""Slow""#
        );
    }

    #[test]
    fn test_class_default() {
        let mut program = BoundProgram::new();
        let ns = program.add_namespace("demo");
        let point = program.add_class(ClassSymbol {
            name: "Point".into(),
            namespace: ns,
            fields: vec![
                FieldSymbol {
                    name: "x".into(),
                    ty: Type::Int,
                },
                FieldSymbol {
                    name: "name".into(),
                    ty: Type::String,
                },
                FieldSymbol {
                    name: "tags".into(),
                    ty: Type::array_of(Type::String),
                },
            ],
            constructor: None,
        });

        assert_eq!(
            default_snbt(&program, &Type::Class(point)).unwrap(),
            r#"{x:0,name:"",tags:[]}"#
        );
    }

    #[test]
    fn test_repeated_list() {
        assert_eq!(repeated_list("0", 3), "[0,0,0]");
        assert_eq!(repeated_list("[0,0]", 2), "[[0,0],[0,0]]");
        assert_eq!(repeated_list("0", 0), "[]");
    }
}
