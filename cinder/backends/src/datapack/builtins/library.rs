//! Emission of calls to compiler provided functions
//!
//! Arguments that are known while emitting specialize into a direct command.
//! Everything else is staged into the `#macro` compound and handed to one of the
//! support functions of [`MacroFunction`].
use std::rc::Rc;

use cinder_bound::{BoundExpression, BuiltinFunction, EnumBacking, LiteralValue, Type};
use cinder_common::StorageKind;
use cinder_error::{emit_bail, utils::display_expected_of_any, EmitErrorKind, EmitResult};
use log::trace;

use crate::{
    common::{
        string_escape::quote_snbt, DatapackCommand, DatapackListFilter, Difficulty, Execute,
        MinecraftCommand, MinecraftRange, Param, StoreKind, StoreTarget, WeatherKind,
    },
    datapack::{
        emitter::{FunctionEmitter, Operand},
        json_formatter::{format_json, JsonFormatComponent},
        scope::EmittionVariable,
    },
};

use super::MacroFunction;

const WEATHERS: [&str; 3] = ["clear", "rain", "thunder"];
const DIFFICULTIES: [&str; 4] = ["peaceful", "easy", "normal", "hard"];

fn invalid_arguments(builtin: BuiltinFunction, message: impl Into<String>) -> EmitErrorKind {
    EmitErrorKind::InvalidBuiltinArguments {
        builtin: builtin.name().to_string(),
        message: message.into(),
    }
}

fn expect_type(
    builtin: BuiltinFunction,
    argument: &BoundExpression,
    expected: &Type,
) -> EmitResult<()> {
    let actual = argument.ty();
    if actual == *expected {
        Ok(())
    } else {
        Err(invalid_arguments(builtin, format!("expected {expected}, got {actual}")).into())
    }
}

fn string_literal(expression: &BoundExpression) -> Option<&str> {
    match expression.as_literal() {
        Some(LiteralValue::String(text)) => Some(text.as_str()),
        _ => None,
    }
}

fn bool_literal(expression: &BoundExpression) -> Option<bool> {
    match expression.as_literal() {
        Some(LiteralValue::Bool(value)) => Some(*value),
        _ => None,
    }
}

impl FunctionEmitter<'_, '_> {
    /// Emits a builtin call, `dest` receives the result of builtins that return a value
    pub(crate) fn emit_builtin(
        &mut self,
        builtin: BuiltinFunction,
        arguments: &[BoundExpression],
        dest: Option<&Rc<EmittionVariable>>,
        base: usize,
    ) -> EmitResult<()> {
        if arguments.len() != builtin.arity() {
            emit_bail!(invalid_arguments(
                builtin,
                format!(
                    "expected {} arguments, got {}",
                    builtin.arity(),
                    arguments.len()
                ),
            ));
        }
        trace!("Emitting builtin {builtin}");

        match builtin {
            BuiltinFunction::RunCommand => {
                expect_type(builtin, &arguments[0], &Type::String)?;
                match string_literal(&arguments[0]) {
                    Some(command) => self.push(MinecraftCommand::RawCommand {
                        command: command.into(),
                    }),
                    None => self.emit_staged(
                        MacroFunction::RunCommand,
                        &[("command", &arguments[0])],
                        base,
                    )?,
                }
                Ok(())
            }
            BuiltinFunction::Say => {
                expect_type(builtin, &arguments[0], &Type::String)?;
                match string_literal(&arguments[0]) {
                    Some(message) => self.push(MinecraftCommand::Say {
                        message: message.into(),
                    }),
                    None => {
                        self.emit_staged(MacroFunction::Say, &[("message", &arguments[0])], base)?;
                    }
                }
                Ok(())
            }
            BuiltinFunction::Print => self.emit_print(&arguments[0], base),
            BuiltinFunction::SetDatapackEnabled => {
                self.emit_set_datapack_enabled(&arguments[0], &arguments[1], base)
            }
            BuiltinFunction::IsDatapackEnabled => {
                expect_type(builtin, &arguments[0], &Type::String)?;
                match dest {
                    Some(dest) => self.emit_is_datapack_enabled(dest, &arguments[0], base),
                    None => self.discard_argument(&arguments[0], base),
                }
            }
            BuiltinFunction::DatapackCount => {
                expect_type(builtin, &arguments[0], &Type::Bool)?;
                match dest {
                    Some(dest) => self.emit_datapack_count(dest, &arguments[0], base),
                    None => self.discard_argument(&arguments[0], base),
                }
            }
            BuiltinFunction::SetWeather => self.emit_set_weather(&arguments[0], &arguments[1], base),
            BuiltinFunction::GetGamerule => {
                expect_type(builtin, &arguments[0], &Type::String)?;
                match dest {
                    Some(dest) => self.emit_get_gamerule(dest, &arguments[0], base),
                    None => self.discard_argument(&arguments[0], base),
                }
            }
            BuiltinFunction::SetGamerule => {
                self.emit_set_gamerule(&arguments[0], &arguments[1], base)
            }
            BuiltinFunction::GetDifficulty => match dest {
                Some(dest) => self.with_register_work(dest, &Type::Int, base, |this, work, _| {
                    this.push(
                        Execute::new()
                            .with_store(StoreKind::Result, StoreTarget::Score(this.player(work)?))
                            .with_run(MinecraftCommand::Difficulty { difficulty: None }),
                    );
                    Ok(())
                }),
                None => Ok(()),
            },
            BuiltinFunction::SetDifficulty => {
                expect_type(builtin, &arguments[0], &Type::String)?;
                match string_literal(&arguments[0]) {
                    Some(name) => {
                        let difficulty = Difficulty::from_name(name).ok_or_else(|| {
                            invalid_arguments(builtin, display_expected_of_any(&DIFFICULTIES))
                        })?;
                        self.push(MinecraftCommand::Difficulty {
                            difficulty: Some(Param::Value(difficulty)),
                        });
                        Ok(())
                    }
                    None => self.emit_staged(
                        MacroFunction::SetDifficulty,
                        &[("difficulty", &arguments[0])],
                        base,
                    ),
                }
            }
        }
    }

    /// A query whose result is unused only keeps the side effects of its argument
    fn discard_argument(&mut self, argument: &BoundExpression, base: usize) -> EmitResult<()> {
        if !argument.is_trivial() {
            self.evaluate_into_temp(argument, base)?;
        }
        Ok(())
    }

    /// Stages every argument under its key and calls the support function
    fn emit_staged(
        &mut self,
        function: MacroFunction,
        arguments: &[(&str, &BoundExpression)],
        base: usize,
    ) -> EmitResult<()> {
        let mut operands = Vec::with_capacity(arguments.len());
        for (index, (_, argument)) in arguments.iter().enumerate() {
            operands.push(self.operand(argument, base + index)?);
        }
        for ((key, argument), operand) in arguments.iter().zip(&operands) {
            self.stage(key, operand, &argument.ty())?;
        }
        self.call_macro(function);
        Ok(())
    }

    /// `tellraw @a [...]`, scores and nbt are resolved by the text component itself
    fn emit_print(&mut self, value: &BoundExpression, base: usize) -> EmitResult<()> {
        let component = match self.operand(value, base)? {
            Operand::Literal(literal) => JsonFormatComponent::RawText(self.literal_text(&literal)?),
            Operand::Location(location) => match location.storage {
                StorageKind::Register => JsonFormatComponent::Score(self.player(&location)?),
                StorageKind::Tree => JsonFormatComponent::Nbt(self.path(&location)?),
            },
        };
        self.push(MinecraftCommand::Tellraw {
            target: "@a".into(),
            message: format_json(&[component]).into(),
        });
        Ok(())
    }

    /// The text a literal is printed as
    fn literal_text(&self, literal: &LiteralValue) -> EmitResult<String> {
        Ok(match literal {
            LiteralValue::String(text) => text.to_string(),
            LiteralValue::Int(value) => value.to_string(),
            LiteralValue::Bool(value) => value.to_string(),
            LiteralValue::Float(value) => value.to_string(),
            LiteralValue::Double(value) => value.to_string(),
            LiteralValue::EnumMember {
                enumeration,
                member,
            } => {
                let symbol = self
                    .program()
                    .enumeration(*enumeration)
                    .ok_or(EmitErrorKind::UnknownEnum(enumeration.0))?;
                match (symbol.backing, symbol.members.get(*member)) {
                    (EnumBacking::String, Some(member)) => member.name.to_string(),
                    (EnumBacking::Int, Some(member)) => member.value.to_string(),
                    (_, None) => {
                        return Err(EmitErrorKind::ExpectedConstant {
                            what: format!("member #{member} of enum '{}'", symbol.name),
                        }
                        .into())
                    }
                }
            }
        })
    }

    /// The command that enables or disables the pack, the name is staged first if it is dynamic
    fn datapack_toggle(
        &mut self,
        name: &BoundExpression,
        enable: bool,
        base: usize,
    ) -> EmitResult<MinecraftCommand> {
        if let Some(name) = string_literal(name) {
            let name = Param::Value(name.into());
            return Ok(MinecraftCommand::Datapack(if enable {
                DatapackCommand::Enable(name)
            } else {
                DatapackCommand::Disable(name)
            }));
        }

        let operand = self.operand(name, base)?;
        self.stage("name", &operand, &Type::String)?;
        Ok(self.macro_call(if enable {
            MacroFunction::DatapackEnable
        } else {
            MacroFunction::DatapackDisable
        }))
    }

    fn emit_set_datapack_enabled(
        &mut self,
        name: &BoundExpression,
        enabled: &BoundExpression,
        base: usize,
    ) -> EmitResult<()> {
        let builtin = BuiltinFunction::SetDatapackEnabled;
        expect_type(builtin, name, &Type::String)?;
        expect_type(builtin, enabled, &Type::Bool)?;

        if let Some(enabled) = bool_literal(enabled) {
            let command = self.datapack_toggle(name, enabled, base)?;
            self.push(command);
            return Ok(());
        }

        let (flag, next) = self.register_operand(enabled, base)?;
        let enable = self.datapack_toggle(name, true, next)?;
        let disable = self.datapack_toggle(name, false, next)?;
        let is_set = self.score_matches(&flag, MinecraftRange::equal(1))?;
        self.push(Execute::new().with_if(is_set.clone()).with_run(enable));
        self.push(Execute::new().with_unless(is_set).with_run(disable));
        Ok(())
    }

    /// Disabling only succeeds for enabled packs, which are enabled again right away
    fn emit_is_datapack_enabled(
        &mut self,
        dest: &Rc<EmittionVariable>,
        name: &BoundExpression,
        base: usize,
    ) -> EmitResult<()> {
        let Some(literal) = string_literal(name) else {
            let operand = self.operand(name, base)?;
            self.stage("name", &operand, &Type::String)?;
            self.call_macro(MacroFunction::DatapackIsEnabled);
            return self.copy(dest, &Self::macro_register(&Type::Bool));
        };

        let name: Rc<str> = literal.into();
        self.with_register_work(dest, &Type::Bool, base, |this, work, _| {
            let player = this.player(work)?;
            this.push(
                Execute::new()
                    .with_store(StoreKind::Success, StoreTarget::Score(player))
                    .with_run(MinecraftCommand::Datapack(DatapackCommand::Disable(
                        Param::Value(name.clone()),
                    ))),
            );
            this.push(
                Execute::new()
                    .with_if(this.score_matches(work, MinecraftRange::equal(1))?)
                    .with_run(MinecraftCommand::Datapack(DatapackCommand::Enable(
                        Param::Value(name),
                    ))),
            );
            Ok(())
        })
    }

    fn emit_datapack_count(
        &mut self,
        dest: &Rc<EmittionVariable>,
        enabled_only: &BoundExpression,
        base: usize,
    ) -> EmitResult<()> {
        let list = |enabled_only: bool| {
            MinecraftCommand::Datapack(DatapackCommand::List(
                enabled_only.then_some(DatapackListFilter::Enabled),
            ))
        };

        let literal = bool_literal(enabled_only);
        self.with_register_work(dest, &Type::Int, base, |this, work, base| {
            let store = Execute::new().with_store(StoreKind::Result, StoreTarget::Score(this.player(work)?));
            if let Some(enabled_only) = literal {
                this.push(store.with_run(list(enabled_only)));
                return Ok(());
            }

            let (flag, _) = this.register_operand(enabled_only, base)?;
            let is_set = this.score_matches(&flag, MinecraftRange::equal(1))?;
            this.push(
                Execute::new()
                    .with_if(is_set.clone())
                    .with_store(StoreKind::Result, StoreTarget::Score(this.player(work)?))
                    .with_run(list(true)),
            );
            this.push(
                Execute::new()
                    .with_unless(is_set)
                    .with_store(StoreKind::Result, StoreTarget::Score(this.player(work)?))
                    .with_run(list(false)),
            );
            Ok(())
        })
    }

    fn emit_set_weather(
        &mut self,
        weather: &BoundExpression,
        duration: &BoundExpression,
        base: usize,
    ) -> EmitResult<()> {
        let builtin = BuiltinFunction::SetWeather;
        expect_type(builtin, weather, &Type::String)?;
        expect_type(builtin, duration, &Type::Int)?;

        let kind = match string_literal(weather) {
            Some(name) => Some(
                WeatherKind::from_name(name)
                    .ok_or_else(|| invalid_arguments(builtin, display_expected_of_any(&WEATHERS)))?,
            ),
            None => None,
        };

        if let (Some(kind), Some(duration)) = (kind, duration.as_int_literal()) {
            self.push(MinecraftCommand::Weather {
                weather: Param::Value(kind),
                duration: Some(Param::Value(duration)),
            });
            return Ok(());
        }
        self.emit_staged(
            MacroFunction::SetWeather,
            &[("weather", weather), ("duration", duration)],
            base,
        )
    }

    fn emit_get_gamerule(
        &mut self,
        dest: &Rc<EmittionVariable>,
        name: &BoundExpression,
        base: usize,
    ) -> EmitResult<()> {
        let Some(rule) = string_literal(name) else {
            let operand = self.operand(name, base)?;
            self.stage("name", &operand, &Type::String)?;
            self.call_macro(MacroFunction::GetGamerule);
            return self.copy(dest, &Self::macro_register(&Type::Int));
        };

        let rule: Rc<str> = rule.into();
        self.with_register_work(dest, &Type::Int, base, |this, work, _| {
            this.push(
                Execute::new()
                    .with_store(StoreKind::Result, StoreTarget::Score(this.player(work)?))
                    .with_run(MinecraftCommand::Gamerule {
                        rule: Param::Value(rule),
                        value: None,
                    }),
            );
            Ok(())
        })
    }

    /// Boolean gamerules take `true`/`false`, which a byte in the tree does not render as
    fn emit_set_gamerule(
        &mut self,
        name: &BoundExpression,
        value: &BoundExpression,
        base: usize,
    ) -> EmitResult<()> {
        let builtin = BuiltinFunction::SetGamerule;
        expect_type(builtin, name, &Type::String)?;
        let value_ty = value.ty();
        if value_ty != Type::Int && value_ty != Type::Bool {
            emit_bail!(invalid_arguments(
                builtin,
                format!("expected int or bool, got {value_ty}")
            ));
        }

        let literal_value = match value.as_literal() {
            Some(LiteralValue::Int(value)) => Some(value.to_string()),
            Some(LiteralValue::Bool(value)) => Some(value.to_string()),
            _ => None,
        };
        if let (Some(rule), Some(literal_value)) = (string_literal(name), &literal_value) {
            self.push(MinecraftCommand::Gamerule {
                rule: Param::Value(rule.into()),
                value: Some(Param::Value(literal_value.as_str().into())),
            });
            return Ok(());
        }

        let rule = self.operand(name, base)?;
        let staged_value = Self::macro_location("value", &Type::String);
        match (literal_value, value_ty) {
            (Some(text), _) => {
                let text = Operand::Literal(LiteralValue::String(text.into()));
                self.store_operand(&staged_value, &text)?;
            }
            (None, Type::Bool) => {
                let (flag, _) = self.register_operand(value, base + 1)?;
                let is_set = self.score_matches(&flag, MinecraftRange::equal(1))?;
                let path = self.path(&staged_value)?;
                self.push(
                    Execute::new()
                        .with_if(is_set.clone())
                        .with_run(MinecraftCommand::data_set_value(path.clone(), quote_snbt("true"))),
                );
                self.push(
                    Execute::new()
                        .with_unless(is_set)
                        .with_run(MinecraftCommand::data_set_value(path, quote_snbt("false"))),
                );
            }
            (None, _) => {
                let operand = self.operand(value, base + 1)?;
                self.stage("value", &operand, &Type::Int)?;
            }
        }
        self.stage("name", &rule, &Type::String)?;
        self.call_macro(MacroFunction::SetGamerule);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use cinder_bound::{
        BoundBlock, BoundExpression, BoundFunction, BoundStatement, BuiltinFunction, Type,
    };

    use crate::datapack::emitter::tests::{
        add_main, emit_main, emit_program, lines, program_with_main, try_emit_main,
    };

    fn call(builtin: BuiltinFunction, arguments: Vec<BoundExpression>) -> BoundStatement {
        BoundStatement::expression(BoundExpression::builtin(builtin, arguments))
    }

    #[test]
    fn test_literal_arguments_are_direct_commands() {
        let program = emit_main(
            Type::Void,
            vec![
                call(
                    BuiltinFunction::RunCommand,
                    vec![BoundExpression::string("time set day")],
                ),
                call(
                    BuiltinFunction::SetWeather,
                    vec![BoundExpression::string("rain"), BoundExpression::int(600)],
                ),
                call(
                    BuiltinFunction::SetGamerule,
                    vec![
                        BoundExpression::string("doDaylightCycle"),
                        BoundExpression::bool(false),
                    ],
                ),
                call(
                    BuiltinFunction::SetDatapackEnabled,
                    vec![BoundExpression::string("file/extra"), BoundExpression::bool(true)],
                ),
                call(BuiltinFunction::SetDifficulty, vec![BoundExpression::string("Hard")]),
            ],
        );
        assert_eq!(
            lines(&program, "demo:main"),
            vec![
                "time set day",
                "weather rain 600",
                "gamerule doDaylightCycle false",
                "datapack enable \"file/extra\"",
                "difficulty hard",
            ]
        );
    }

    #[test]
    fn test_dynamic_command_is_staged() {
        let program = emit_main(
            Type::Void,
            vec![
                BoundStatement::declare("c", Type::String, Some(BoundExpression::string("say hi"))),
                call(
                    BuiltinFunction::RunCommand,
                    vec![BoundExpression::local("c", Type::String)],
                ),
            ],
        );
        assert_eq!(
            &lines(&program, "demo:main")[1..],
            [
                "data modify storage demo:vars #macro.command set from storage demo:vars demo/main.c",
                "function demo:__generated/run_command with storage demo:vars #macro",
            ]
        );
        assert_eq!(
            lines(&program, "demo:__generated/run_command"),
            vec!["$$(command)"]
        );
    }

    #[test]
    fn test_print_uses_text_components() {
        let program = emit_main(
            Type::Void,
            vec![
                BoundStatement::declare("x", Type::Int, Some(BoundExpression::int(4))),
                call(BuiltinFunction::Print, vec![BoundExpression::local("x", Type::Int)]),
                call(BuiltinFunction::Print, vec![BoundExpression::string("done")]),
            ],
        );
        assert_eq!(
            &lines(&program, "demo:main")[1..],
            [
                r#"tellraw @a [{"score":{"name":"demo/main.x","objective":"cinder"}}]"#,
                r#"tellraw @a [{"text":"done"}]"#,
            ]
        );
    }

    #[test]
    fn test_is_datapack_enabled_probes() {
        let program = emit_main(
            Type::Bool,
            vec![BoundStatement::ret(Some(BoundExpression::builtin(
                BuiltinFunction::IsDatapackEnabled,
                vec![BoundExpression::string("vanilla")],
            )))],
        );
        assert_eq!(
            &lines(&program, "demo:main")[..2],
            [
                "execute store success score #return cinder run datapack disable \"vanilla\"",
                "execute if score #return cinder matches 1 run datapack enable \"vanilla\"",
            ]
        );
    }

    #[test]
    fn test_unused_query_keeps_argument_side_effects() {
        let (mut program, namespace) = program_with_main();
        let pack_name = program.add_function(BoundFunction::new(
            namespace,
            "pack_name",
            vec![],
            Type::String,
            BoundBlock::new(vec![BoundStatement::ret(Some(BoundExpression::string(
                "vanilla",
            )))]),
        ));
        add_main(
            &mut program,
            namespace,
            Type::Void,
            vec![
                call(
                    BuiltinFunction::IsDatapackEnabled,
                    vec![BoundExpression::call(pack_name, vec![], Type::String)],
                ),
                call(
                    BuiltinFunction::GetGamerule,
                    vec![BoundExpression::string("keepInventory")],
                ),
            ],
        );

        let program = emit_program(&program);
        let main = lines(&program, "demo:main");
        assert_eq!(main[0], "function demo:pack_name");
        assert!(!main.iter().any(|line| line.contains("datapack")));
        assert!(!main.iter().any(|line| line.contains("gamerule")));
    }

    #[test]
    fn test_dynamic_gamerule_value_is_text() {
        let program = emit_main(
            Type::Void,
            vec![
                BoundStatement::declare("b", Type::Bool, Some(BoundExpression::bool(true))),
                call(
                    BuiltinFunction::SetGamerule,
                    vec![
                        BoundExpression::string("keepInventory"),
                        BoundExpression::local("b", Type::Bool),
                    ],
                ),
            ],
        );
        assert_eq!(
            &lines(&program, "demo:main")[1..],
            [
                "execute if score demo/main.b cinder matches 1 run data modify storage demo:vars #macro.value set value \"true\"",
                "execute unless score demo/main.b cinder matches 1 run data modify storage demo:vars #macro.value set value \"false\"",
                "data modify storage demo:vars #macro.name set value \"keepInventory\"",
                "function demo:__generated/set_gamerule with storage demo:vars #macro",
            ]
        );
    }

    #[test]
    fn test_invalid_weather_is_rejected() {
        let error = try_emit_main(
            Type::Void,
            vec![call(
                BuiltinFunction::SetWeather,
                vec![BoundExpression::string("snow"), BoundExpression::int(1)],
            )],
        )
        .unwrap_err();
        let message = error.to_string();
        assert!(message.contains("set_weather"));
        assert!(message.contains("Expected one of (clear, rain, thunder)"));
    }

    #[test]
    fn test_arity_is_checked() {
        let error = try_emit_main(Type::Void, vec![call(BuiltinFunction::Say, vec![])]).unwrap_err();
        assert!(error.to_string().contains("expected 1 arguments, got 0"));
    }
}
