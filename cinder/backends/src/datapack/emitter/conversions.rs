use std::rc::Rc;

use cinder_bound::{BoundConversionExpression, EnumBacking, LiteralValue, Type};
use cinder_common::StorageKind;
use cinder_error::{emit_unsupported, EmitErrorKind, EmitResult};

use crate::common::{
    string_escape::quote_snbt, Execute, ExecuteCondition, MinecraftCommand, MinecraftRange,
    StoreKind, StoreTarget,
};

use super::{nbt_type, EmittionVariable, FunctionEmitter, MacroFunction, Operand};

impl FunctionEmitter<'_, '_> {
    pub(crate) fn emit_conversion(
        &mut self,
        dest: &Rc<EmittionVariable>,
        conversion: &BoundConversionExpression,
        base: usize,
    ) -> EmitResult<()> {
        let operand = &*conversion.operand;
        let from = operand.ty();
        let to = &conversion.ty;

        if let Some(literal) = operand.as_literal() {
            if let Some(converted) = self.convert_literal(literal, to)? {
                return self.set_literal(dest, &converted);
            }
        }

        let from_storage = self.storage_kind(&from);
        let to_storage = self.storage_kind(to);
        match (&from, to) {
            _ if &from == to || (from.is_composite() && to.is_composite()) => {
                self.emit_into(dest, operand, base)
            }
            (_, Type::Object) => self.emit_into(dest, operand, base),
            (_, Type::Bool) if from_storage == StorageKind::Register => {
                self.with_register_work(dest, &Type::Bool, base, |this, work, base| {
                    let (source, _) = this.register_operand(operand, base)?;
                    this.push(
                        Execute::new()
                            .with_store(StoreKind::Success, StoreTarget::Score(this.player(work)?))
                            .with_unless(this.score_matches(&source, MinecraftRange::equal(0))?),
                    );
                    Ok(())
                })
            }
            _ if from_storage == StorageKind::Register && to_storage == StorageKind::Register => {
                self.emit_into(dest, operand, base)
            }
            (_, Type::Float | Type::Double) if from_storage == StorageKind::Register => {
                let (source, _) = self.register_operand(operand, base)?;
                self.store_register(dest, &source, nbt_type(to))
            }
            (Type::Float | Type::Double, Type::Float | Type::Double) => {
                let value = self.operand(operand, base)?;
                self.stage("v", &value, &from)?;
                self.call_macro(if *to == Type::Float {
                    MacroFunction::ToFloat
                } else {
                    MacroFunction::ToDouble
                });
                self.copy(dest, &Self::macro_result(to))
            }
            (Type::Float | Type::Double, Type::Int) => {
                // `data get` truncates towards zero
                self.with_register_work(dest, &Type::Int, base, |this, work, base| {
                    let value = this.operand(operand, base)?;
                    let source = this.operand_location(value, &from)?;
                    this.copy(work, &source)
                })
            }
            (Type::Bool, Type::String) => {
                let (source, _) = self.register_operand(operand, base)?;
                self.guarded_set(dest, &source, 1, "true")?;
                self.guarded_set_unless(dest, &source, 1, "false")
            }
            (Type::Enum(id), Type::String) => {
                let symbol = self
                    .program()
                    .enumeration(*id)
                    .ok_or(EmitErrorKind::UnknownEnum(id.0))?;
                if symbol.backing == EnumBacking::String {
                    return self.emit_into(dest, operand, base);
                }
                let (source, _) = self.register_operand(operand, base)?;
                for member in &symbol.members {
                    self.guarded_set(dest, &source, member.value, &member.name)?;
                }
                Ok(())
            }
            (Type::Int | Type::Float | Type::Double, Type::String) => {
                let value = self.operand(operand, base)?;
                self.stage("v", &value, &from)?;
                self.call_macro(MacroFunction::ToString);
                self.copy(dest, &Self::macro_result(to))
            }
            (Type::String, Type::Int | Type::Float | Type::Double) => {
                let value = self.operand(operand, base)?;
                self.stage("text", &value, &from)?;
                self.call_macro(match to {
                    Type::Int => MacroFunction::ParseInt,
                    Type::Float => MacroFunction::ParseFloat,
                    _ => MacroFunction::ParseDouble,
                });
                self.copy(dest, &Self::macro_result(to))
            }
            _ => emit_unsupported!("conversion", format!("{from} to {to}")),
        }
    }

    /// The location an operand is stored in, literals are written to a macro key first
    fn operand_location(
        &mut self,
        operand: Operand,
        ty: &Type,
    ) -> EmitResult<Rc<EmittionVariable>> {
        match operand {
            Operand::Location(location) => Ok(location),
            Operand::Literal(value) => {
                let location = Self::macro_location("v", ty);
                self.set_literal(&location, &value)?;
                Ok(location)
            }
        }
    }

    /// `execute if score <source> matches <value> run data modify <dest> set value "<text>"`
    fn guarded_set(
        &mut self,
        dest: &EmittionVariable,
        source: &EmittionVariable,
        value: i32,
        text: &str,
    ) -> EmitResult<()> {
        let condition = self.score_matches(source, MinecraftRange::equal(value))?;
        self.push_guarded_text(dest, false, condition, text)
    }

    fn guarded_set_unless(
        &mut self,
        dest: &EmittionVariable,
        source: &EmittionVariable,
        value: i32,
        text: &str,
    ) -> EmitResult<()> {
        let condition = self.score_matches(source, MinecraftRange::equal(value))?;
        self.push_guarded_text(dest, true, condition, text)
    }

    fn push_guarded_text(
        &mut self,
        dest: &EmittionVariable,
        inverted: bool,
        condition: ExecuteCondition,
        text: &str,
    ) -> EmitResult<()> {
        let set = MinecraftCommand::data_set_value(self.path(dest)?, quote_snbt(text));
        let execute = if inverted {
            Execute::new().with_unless(condition)
        } else {
            Execute::new().with_if(condition)
        };
        self.push(execute.with_run(set));
        Ok(())
    }

    /// Converts a literal while emitting, `None` if the conversion has to happen at runtime
    #[allow(clippy::cast_precision_loss, clippy::cast_possible_truncation)]
    fn convert_literal(
        &self,
        literal: &LiteralValue,
        to: &Type,
    ) -> EmitResult<Option<LiteralValue>> {
        let register = self.register_literal(literal)?;
        Ok(match (literal, to) {
            (literal, to) if literal.ty() == *to => Some(literal.clone()),
            (LiteralValue::Int(value), Type::Float) => Some(LiteralValue::Float(*value as f32)),
            (LiteralValue::Int(value), Type::Double) => {
                Some(LiteralValue::Double(f64::from(*value)))
            }
            (LiteralValue::Float(value), Type::Double) => {
                Some(LiteralValue::Double(f64::from(*value)))
            }
            (LiteralValue::Double(value), Type::Float) => Some(LiteralValue::Float(*value as f32)),
            (LiteralValue::Float(value), Type::Int) => Some(LiteralValue::Int(value.trunc() as i32)),
            (LiteralValue::Double(value), Type::Int) => {
                Some(LiteralValue::Int(value.trunc() as i32))
            }
            (LiteralValue::Bool(value), Type::String) => Some(LiteralValue::String(
                if *value { "true" } else { "false" }.into(),
            )),
            (LiteralValue::Int(value), Type::String) => {
                Some(LiteralValue::String(value.to_string().into()))
            }
            (LiteralValue::EnumMember { enumeration, member }, Type::String) => {
                let symbol = self
                    .program()
                    .enumeration(*enumeration)
                    .ok_or(EmitErrorKind::UnknownEnum(enumeration.0))?;
                symbol
                    .members
                    .get(*member)
                    .map(|member| LiteralValue::String(member.name.clone()))
            }
            (LiteralValue::String(text), Type::Int) => text.trim().parse().ok().map(LiteralValue::Int),
            (_, Type::Int) => register.map(LiteralValue::Int),
            (_, Type::Bool) => register.map(|value| LiteralValue::Bool(value != 0)),
            _ => None,
        })
    }
}

#[cfg(test)]
mod tests {
    use cinder_bound::{BoundExpression, BoundStatement, EnumSymbol, Type};

    use crate::datapack::emitter::tests::{
        add_main, emit_main, emit_program, lines, program_with_main,
    };

    #[test]
    fn test_literal_conversions_fold() {
        let program = emit_main(
            Type::Void,
            vec![
                BoundStatement::declare(
                    "f",
                    Type::Float,
                    Some(BoundExpression::convert(BoundExpression::int(3), Type::Float)),
                ),
                BoundStatement::declare(
                    "s",
                    Type::String,
                    Some(BoundExpression::convert(BoundExpression::bool(true), Type::String)),
                ),
            ],
        );
        assert_eq!(
            lines(&program, "demo:main"),
            vec![
                "data modify storage demo:vars demo/main.f set value 3f",
                "data modify storage demo:vars demo/main.s set value \"true\"",
            ]
        );
    }

    #[test]
    fn test_int_to_double_bridges() {
        let program = emit_main(
            Type::Void,
            vec![
                BoundStatement::declare("i", Type::Int, Some(BoundExpression::int(3))),
                BoundStatement::declare(
                    "d",
                    Type::Double,
                    Some(BoundExpression::convert(
                        BoundExpression::local("i", Type::Int),
                        Type::Double,
                    )),
                ),
            ],
        );
        assert_eq!(
            lines(&program, "demo:main")[1],
            "execute store result storage demo:vars demo/main.d double 1 run scoreboard players get demo/main.i cinder"
        );
    }

    #[test]
    fn test_double_to_int_truncates() {
        let program = emit_main(
            Type::Int,
            vec![
                BoundStatement::declare("d", Type::Double, Some(BoundExpression::double(2.5))),
                BoundStatement::ret(Some(BoundExpression::convert(
                    BoundExpression::local("d", Type::Double),
                    Type::Int,
                ))),
            ],
        );
        assert_eq!(
            lines(&program, "demo:main")[1],
            "execute store result score #return cinder run data get storage demo:vars demo/main.d"
        );
    }

    #[test]
    fn test_enum_to_string_sets_per_member() {
        let (mut program, ns) = program_with_main();
        let color = program.add_enum(EnumSymbol::new("Color", ["Red", "Green"]));
        add_main(
            &mut program,
            ns,
            Type::String,
            vec![
                BoundStatement::declare(
                    "c",
                    Type::Enum(color),
                    Some(BoundExpression::enum_member(color, 1)),
                ),
                BoundStatement::ret(Some(BoundExpression::convert(
                    BoundExpression::local("c", Type::Enum(color)),
                    Type::String,
                ))),
            ],
        );
        let emission = emit_program(&program);
        let lines = lines(&emission, "demo:main");
        assert_eq!(lines[0], "scoreboard players set demo/main.c cinder 1");
        assert_eq!(
            &lines[1..3],
            [
                "execute if score demo/main.c cinder matches 0 run data modify storage demo:vars #return set value \"Red\"",
                "execute if score demo/main.c cinder matches 1 run data modify storage demo:vars #return set value \"Green\"",
            ]
        );
    }

    #[test]
    fn test_string_to_int_parses_at_runtime() {
        let program = emit_main(
            Type::Int,
            vec![
                BoundStatement::declare("s", Type::String, Some(BoundExpression::string("12"))),
                BoundStatement::ret(Some(BoundExpression::convert(
                    BoundExpression::local("s", Type::String),
                    Type::Int,
                ))),
            ],
        );
        let lines = lines(&program, "demo:main");
        assert_eq!(
            &lines[1..4],
            [
                "data modify storage demo:vars #macro.text set from storage demo:vars demo/main.s",
                "function demo:__generated/parse_int with storage demo:vars #macro",
                "execute store result score #return cinder run data get storage demo:vars #macro.result",
            ]
        );
    }
}
