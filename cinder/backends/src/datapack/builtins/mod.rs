//! The fixed catalog of support functions
//!
//! Operations the target has no command for are implemented as functions under
//! `<main namespace>:__generated/`. Most of them are macro functions that read
//! their arguments from the `#macro` compound. A function is only fabricated if
//! some emitted code requested it, at most once per compilation.
use std::rc::Rc;

use cinder_common::FxIndexMap;
use log::trace;

use crate::common::{
    Anchor, CommandNode, Coordinate, Coordinates, DataCommand, DataModifyOperation,
    DataModifySource, DataPath, DataTarget, DatapackCommand, Execute, ExecuteComponent,
    ExecuteCondition, FunctionIdent, MinecraftCommand, MinecraftRange, NbtType, Param, Rotation,
    ScoreboardCommand, ScoreboardOperation, ScoreboardPlayer, StoreKind, StoreTarget,
    TeleportDestination,
};

use super::{
    emission::FunctionEmission, markers::Marker, scoreboard_constants::ScoreboardConstants,
    storage_context::StorageContext,
};

pub(crate) mod library;

/// A fabricated support function
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub(crate) enum MacroFunction {
    RunCommand,
    Say,
    DatapackEnable,
    DatapackDisable,
    DatapackIsEnabled,
    SetWeather,
    GetGamerule,
    SetGamerule,
    SetDifficulty,
    StringConcat,
    ToString,
    ToFloat,
    ToDouble,
    ParseInt,
    ParseFloat,
    ParseDouble,
    FloatNegate,
    FloatNegatePrepend,
    FloatAdd,
    FloatMultiply,
    FloatDivide,
    FloatCompare,
    /// Reads an element through as many dynamic indices as the rank
    ArrayGet(usize),
    /// Writes an element through as many dynamic indices as the rank
    ArraySet(usize),
}

impl MacroFunction {
    pub fn name(self) -> String {
        match self {
            MacroFunction::RunCommand => "run_command".to_string(),
            MacroFunction::Say => "say".to_string(),
            MacroFunction::DatapackEnable => "datapack_enable".to_string(),
            MacroFunction::DatapackDisable => "datapack_disable".to_string(),
            MacroFunction::DatapackIsEnabled => "datapack_is_enabled".to_string(),
            MacroFunction::SetWeather => "set_weather".to_string(),
            MacroFunction::GetGamerule => "get_gamerule".to_string(),
            MacroFunction::SetGamerule => "set_gamerule".to_string(),
            MacroFunction::SetDifficulty => "set_difficulty".to_string(),
            MacroFunction::StringConcat => "string_concat".to_string(),
            MacroFunction::ToString => "to_string".to_string(),
            MacroFunction::ToFloat => "to_float".to_string(),
            MacroFunction::ToDouble => "to_double".to_string(),
            MacroFunction::ParseInt => "parse_int".to_string(),
            MacroFunction::ParseFloat => "parse_float".to_string(),
            MacroFunction::ParseDouble => "parse_double".to_string(),
            MacroFunction::FloatNegate => "float_negate".to_string(),
            MacroFunction::FloatNegatePrepend => "float_negate_prepend".to_string(),
            MacroFunction::FloatAdd => "float_add".to_string(),
            MacroFunction::FloatMultiply => "float_multiply".to_string(),
            MacroFunction::FloatDivide => "float_divide".to_string(),
            MacroFunction::FloatCompare => "float_compare".to_string(),
            MacroFunction::ArrayGet(rank) => format!("array_get_{rank}"),
            MacroFunction::ArraySet(rank) => format!("array_set_{rank}"),
        }
    }

    /// Other support functions this function calls
    pub fn dependencies(self) -> &'static [MacroFunction] {
        match self {
            MacroFunction::FloatNegate => &[MacroFunction::FloatNegatePrepend],
            MacroFunction::FloatMultiply | MacroFunction::FloatDivide => &[MacroFunction::FloatAdd],
            _ => &[],
        }
    }

    /// Scoreboard constants this function reads
    fn constants(self) -> &'static [i32] {
        match self {
            MacroFunction::FloatMultiply => &[FLOAT_SCALE],
            MacroFunction::FloatDivide => &[DIGIT_BASE],
            _ => &[],
        }
    }

    /// Whether the function reads `$(...)` arguments
    pub fn is_macro(self) -> bool {
        !matches!(self, MacroFunction::FloatDivide)
    }

    /// The command that invokes this function with the staged arguments
    pub fn call(self, ident: Rc<FunctionIdent>, storage: &StorageContext) -> MinecraftCommand {
        if self.is_macro() {
            MinecraftCommand::call_with(ident, storage.macro_arguments())
        } else {
            MinecraftCommand::call(ident)
        }
    }

    fn body(self, storage: &StorageContext) -> Vec<CommandNode> {
        let result = || storage.macro_path("result");
        let macro_text = |text: &str| MinecraftCommand::RawCommand {
            command: text.into(),
        };

        match self {
            MacroFunction::RunCommand => vec![CommandNode::Macro(macro_text("$(command)"))],
            MacroFunction::Say => vec![CommandNode::Macro(MinecraftCommand::Say {
                message: "$(message)".into(),
            })],
            MacroFunction::DatapackEnable => vec![CommandNode::Macro(MinecraftCommand::Datapack(
                DatapackCommand::Enable(Param::placeholder("name")),
            ))],
            MacroFunction::DatapackDisable => vec![CommandNode::Macro(
                MinecraftCommand::Datapack(DatapackCommand::Disable(Param::placeholder("name"))),
            )],
            MacroFunction::DatapackIsEnabled => vec![
                CommandNode::Macro(
                    Execute::new()
                        .with_store(
                            StoreKind::Success,
                            StoreTarget::Score(storage.macro_register()),
                        )
                        .with_run(MinecraftCommand::Datapack(DatapackCommand::Disable(
                            Param::placeholder("name"),
                        )))
                        .into(),
                ),
                CommandNode::Macro(
                    Execute::new()
                        .with_if(ExecuteCondition::Score {
                            player: storage.macro_register(),
                            range: MinecraftRange::equal(1),
                        })
                        .with_run(MinecraftCommand::Datapack(DatapackCommand::Enable(
                            Param::placeholder("name"),
                        )))
                        .into(),
                ),
            ],
            MacroFunction::SetWeather => vec![CommandNode::Macro(MinecraftCommand::Weather {
                weather: Param::placeholder("weather"),
                duration: Some(Param::placeholder("duration")),
            })],
            MacroFunction::GetGamerule => vec![CommandNode::Macro(
                Execute::new()
                    .with_store(StoreKind::Result, StoreTarget::Score(storage.macro_register()))
                    .with_run(MinecraftCommand::Gamerule {
                        rule: Param::placeholder("name"),
                        value: None,
                    })
                    .into(),
            )],
            MacroFunction::SetGamerule => vec![CommandNode::Macro(MinecraftCommand::Gamerule {
                rule: Param::placeholder("name"),
                value: Some(Param::placeholder("value")),
            })],
            MacroFunction::SetDifficulty => vec![CommandNode::Macro(MinecraftCommand::Difficulty {
                difficulty: Some(Param::placeholder("difficulty")),
            })],
            MacroFunction::StringConcat => vec![CommandNode::Macro(
                MinecraftCommand::data_set_value(result(), r#""$(a)$(b)""#),
            )],
            MacroFunction::ToString => vec![CommandNode::Macro(MinecraftCommand::data_set_value(
                result(),
                r#""$(v)""#,
            ))],
            MacroFunction::ToFloat => vec![CommandNode::Macro(MinecraftCommand::data_set_value(
                result(),
                "$(v)f",
            ))],
            MacroFunction::ToDouble => vec![CommandNode::Macro(MinecraftCommand::data_set_value(
                result(),
                "$(v)d",
            ))],
            MacroFunction::ParseInt => vec![CommandNode::Macro(MinecraftCommand::data_set_value(
                result(),
                "$(text)",
            ))],
            MacroFunction::ParseFloat => vec![CommandNode::Macro(
                MinecraftCommand::data_set_value(result(), "$(text)f"),
            )],
            MacroFunction::ParseDouble => vec![CommandNode::Macro(
                MinecraftCommand::data_set_value(result(), "$(text)d"),
            )],
            MacroFunction::FloatNegate => float_negate(storage),
            MacroFunction::FloatNegatePrepend => vec![CommandNode::Macro(
                MinecraftCommand::data_set_value(storage.macro_path("text"), r#""-$(text)""#),
            )],
            MacroFunction::FloatAdd => float_add(storage),
            MacroFunction::FloatMultiply => float_multiply(storage),
            MacroFunction::FloatDivide => float_divide(storage),
            MacroFunction::FloatCompare => float_compare(storage),
            MacroFunction::ArrayGet(rank) => vec![CommandNode::Macro(
                MinecraftCommand::data_set_from(result(), storage.path(dynamic_path(rank))),
            )],
            MacroFunction::ArraySet(rank) => vec![CommandNode::Macro(
                MinecraftCommand::data_set_from(
                    storage.path(dynamic_path(rank)),
                    storage.macro_path("value"),
                ),
            )],
        }
    }
}

/// Fixed point scale of the scoreboard based float operations
const FLOAT_SCALE: i32 = 1000;

/// Largest magnitude whose thousandths still fit into a score
const SCALED_LIMIT: i32 = i32::MAX / FLOAT_SCALE - 1;

/// Division produces one decimal digit per step
const DIGIT_BASE: i32 = 10;

/// Largest divisor whose remainders can be shifted by one digit
const DIGIT_LIMIT: i32 = i32::MAX / DIGIT_BASE;

/// `$(p0)[$(i0)]$(p1)...[$(i{rank - 1})]$(p{rank})`
fn dynamic_path(rank: usize) -> String {
    let mut path = String::from("$(p0)");
    for index in 0..rank {
        path.push_str(&format!("[$(i{index})]$(p{})", index + 1));
    }
    path
}

fn marker_entity(marker: Marker) -> Rc<str> {
    marker.uuid().into()
}

/// Teleports a marker to `x = $(placeholder)` at the home height
fn teleport_marker_to(marker: Marker, placeholder: &str) -> MinecraftCommand {
    let (_, y, z) = Marker::HOME;
    MinecraftCommand::Teleport {
        target: marker_entity(marker),
        destination: TeleportDestination::Location {
            position: Coordinates {
                x: Coordinate::Absolute(Param::placeholder(placeholder)),
                y: Coordinate::Absolute(Param::Value(y)),
                z: Coordinate::Absolute(Param::Value(z)),
            },
            rotation: None,
        },
    }
}

fn teleport_marker_home(marker: Marker) -> MinecraftCommand {
    MinecraftCommand::Teleport {
        target: marker_entity(marker),
        destination: TeleportDestination::Location {
            position: Marker::home(),
            rotation: Some(Rotation {
                yaw: Coordinate::Absolute(Param::Value(0.0)),
                pitch: Coordinate::Absolute(Param::Value(0.0)),
            }),
        },
    }
}

fn marker_data(marker: Marker, path: &str) -> DataPath {
    DataPath {
        target: DataTarget::Entity(marker_entity(marker)),
        path: path.into(),
    }
}

/// Flips the sign of `$(v)` as text, leaving the negated text in `#macro.text`.
///
/// Macro arguments render floats and doubles as plain decimals without exponent or
/// type suffix, which is the only shape this handles. `0` becomes `-0`. Non finite
/// values have no literal form and are not supported.
fn float_negate(storage: &StorageContext) -> Vec<CommandNode> {
    let text = || storage.macro_path("text");
    let is_negative = || {
        ExecuteCondition::Data(storage.path(format!(
            r#"{}{{sign:"-"}}"#,
            StorageContext::MACRO
        )))
    };
    let prepend = Rc::new(storage.generated_function(&MacroFunction::FloatNegatePrepend.name()));

    vec![
        CommandNode::Macro(MinecraftCommand::data_set_value(text(), r#""$(v)""#)),
        CommandNode::Command(
            DataCommand::Modify {
                target: storage.macro_path("sign"),
                operation: DataModifyOperation::Set,
                source: DataModifySource::String {
                    source: text(),
                    start: Some(0),
                    end: Some(1),
                },
            }
            .into(),
        ),
        CommandNode::Command(
            Execute::new()
                .with_if(is_negative())
                .with_run(DataCommand::Modify {
                    target: text(),
                    operation: DataModifyOperation::Set,
                    source: DataModifySource::String {
                        source: text(),
                        start: Some(1),
                        end: None,
                    },
                })
                .into(),
        ),
        CommandNode::Command(
            Execute::new()
                .with_unless(is_negative())
                .with_run(MinecraftCommand::call_with(
                    prepend,
                    storage.macro_arguments(),
                ))
                .into(),
        ),
        CommandNode::Command(MinecraftCommand::data_remove(storage.macro_path("sign"))),
    ]
}

fn float_add(storage: &StorageContext) -> Vec<CommandNode> {
    vec![
        CommandNode::Macro(teleport_marker_to(Marker::A, "a")),
        CommandNode::Macro(
            Execute::new()
                .with_component(ExecuteComponent::As(marker_entity(Marker::A)))
                .with_component(ExecuteComponent::At("@s".into()))
                .with_run(MinecraftCommand::Teleport {
                    target: "@s".into(),
                    destination: TeleportDestination::Location {
                        position: Coordinates {
                            x: Coordinate::Relative(Param::placeholder("b")),
                            y: Coordinate::Relative(Param::Value(0.0)),
                            z: Coordinate::Relative(Param::Value(0.0)),
                        },
                        rotation: None,
                    },
                })
                .into(),
        ),
        CommandNode::Command(MinecraftCommand::data_set_from(
            storage.macro_path("result"),
            marker_data(Marker::A, "Pos[0]"),
        )),
        CommandNode::Command(teleport_marker_home(Marker::A)),
    ]
}

/// `execute store result score <player> run data get storage #macro.<key> <scale>`
fn read_scaled(
    storage: &StorageContext,
    player: ScoreboardPlayer,
    key: &str,
    scale: f64,
) -> CommandNode {
    CommandNode::Command(
        Execute::new()
            .with_store(StoreKind::Result, StoreTarget::Score(player))
            .with_run(DataCommand::Get {
                path: storage.macro_path(key),
                scale: Some(scale),
            })
            .into(),
    )
}

fn score_operation(
    target: ScoreboardPlayer,
    operation: ScoreboardOperation,
    source: ScoreboardPlayer,
) -> MinecraftCommand {
    MinecraftCommand::score_operation(target, operation, source)
}

fn within(player: ScoreboardPlayer, limit: i32) -> ExecuteCondition {
    ExecuteCondition::Score {
        player,
        range: MinecraftRange::between(-limit, limit),
    }
}

/// `execute store result storage <path> double <scale>`
fn store_double(path: DataPath, scale: Param<f64>) -> Execute {
    Execute::new().with_store(
        StoreKind::Result,
        StoreTarget::Data {
            path,
            nbt_type: NbtType::Double,
            scale,
        },
    )
}

/// Adds the doubles left in `#macro.a` and `#macro.b` through `float_add`
fn sum_staged(storage: &StorageContext) -> CommandNode {
    let add = Rc::new(storage.generated_function(&MacroFunction::FloatAdd.name()));
    CommandNode::Command(MinecraftCommand::call_with(add, storage.macro_arguments()))
}

/// `a * b = floor(a) * b + frac(a) * b`.
///
/// `b` is used as the exact store scale of both products, only the fraction of
/// `a` goes through thousandths. Operands beyond [`SCALED_LIMIT`] drop the
/// fraction of `a` or read the second product in whole units.
fn float_multiply(storage: &StorageContext) -> Vec<CommandNode> {
    let whole = || storage.player("#float_q");
    let milli = || storage.player("#float_n");
    let shifted = || storage.player("#float_t");
    let factor = || storage.player("#float_d");
    let scale = || storage.player(ScoreboardConstants::name(FLOAT_SCALE));

    vec![
        read_scaled(storage, whole(), "a", 1.0),
        read_scaled(storage, milli(), "a", f64::from(FLOAT_SCALE)),
        read_scaled(storage, factor(), "b", 1.0),
        CommandNode::Command(score_operation(shifted(), ScoreboardOperation::Assign, whole())),
        CommandNode::Command(score_operation(shifted(), ScoreboardOperation::Times, scale())),
        CommandNode::Command(
            Execute::new()
                .with_if(within(whole(), SCALED_LIMIT))
                .with_run(score_operation(milli(), ScoreboardOperation::Minus, shifted()))
                .into(),
        ),
        CommandNode::Command(
            Execute::new()
                .with_unless(within(whole(), SCALED_LIMIT))
                .with_run(MinecraftCommand::score_set(milli(), 0))
                .into(),
        ),
        CommandNode::Macro(
            store_double(storage.macro_path("a"), Param::placeholder("b"))
                .with_run(ScoreboardCommand::Get(whole()))
                .into(),
        ),
        CommandNode::Macro(
            store_double(storage.macro_path("b"), Param::placeholder("b"))
                .with_run(ScoreboardCommand::Get(milli()))
                .into(),
        ),
        CommandNode::Command(
            Execute::new()
                .with_if(within(factor(), SCALED_LIMIT))
                .with_store(
                    StoreKind::Result,
                    StoreTarget::Data {
                        path: storage.macro_path("b"),
                        nbt_type: NbtType::Double,
                        scale: Param::Value(1.0 / f64::from(FLOAT_SCALE)),
                    },
                )
                .with_run(DataCommand::Get {
                    path: storage.macro_path("b"),
                    scale: None,
                })
                .into(),
        ),
        CommandNode::Command(
            Execute::new()
                .with_unless(within(factor(), SCALED_LIMIT))
                .with_store(
                    StoreKind::Result,
                    StoreTarget::Data {
                        path: storage.macro_path("b"),
                        nbt_type: NbtType::Double,
                        scale: Param::Value(1.0),
                    },
                )
                .with_run(DataCommand::Get {
                    path: storage.macro_path("b"),
                    scale: Some(1.0 / f64::from(FLOAT_SCALE)),
                })
                .into(),
        ),
        sum_staged(storage),
        CommandNode::Command(MinecraftCommand::score_reset(whole())),
        CommandNode::Command(MinecraftCommand::score_reset(milli())),
        CommandNode::Command(MinecraftCommand::score_reset(shifted())),
        CommandNode::Command(MinecraftCommand::score_reset(factor())),
    ]
}

/// Long division on the scoreboard.
///
/// Both operands are read in thousandths, `q = n / d` and `r = n % d`. The three
/// decimals of `r / d` are produced one digit at a time, so no intermediate
/// exceeds ten times the divisor. Divisors beyond [`DIGIT_LIMIT`] are shortened
/// by one digit first. `q` and the decimals are summed as doubles.
fn float_divide(storage: &StorageContext) -> Vec<CommandNode> {
    let numerator = || storage.player("#float_n");
    let denominator = || storage.player("#float_d");
    let quotient = || storage.player("#float_q");
    let remainder = || storage.player("#float_r");
    let digit = || storage.player("#float_t");
    let decimals = || storage.player("#float_f");
    let base = || storage.player(ScoreboardConstants::name(DIGIT_BASE));
    let operation = |target, operation, source| {
        CommandNode::Command(score_operation(target, operation, source))
    };
    let shorten = |player| {
        CommandNode::Command(
            Execute::new()
                .with_unless(within(denominator(), DIGIT_LIMIT))
                .with_run(score_operation(player, ScoreboardOperation::Divide, base()))
                .into(),
        )
    };

    let mut commands = vec![
        read_scaled(storage, numerator(), "a", f64::from(FLOAT_SCALE)),
        read_scaled(storage, denominator(), "b", f64::from(FLOAT_SCALE)),
        operation(quotient(), ScoreboardOperation::Assign, numerator()),
        operation(quotient(), ScoreboardOperation::Divide, denominator()),
        operation(remainder(), ScoreboardOperation::Assign, numerator()),
        operation(remainder(), ScoreboardOperation::Modulo, denominator()),
        shorten(remainder()),
        shorten(denominator()),
        CommandNode::Command(MinecraftCommand::score_set(decimals(), 0)),
    ];
    let mut precision = 1;
    while precision < FLOAT_SCALE {
        commands.extend([
            operation(remainder(), ScoreboardOperation::Times, base()),
            operation(digit(), ScoreboardOperation::Assign, remainder()),
            operation(digit(), ScoreboardOperation::Divide, denominator()),
            operation(remainder(), ScoreboardOperation::Modulo, denominator()),
            operation(decimals(), ScoreboardOperation::Times, base()),
            operation(decimals(), ScoreboardOperation::Plus, digit()),
        ]);
        precision *= DIGIT_BASE;
    }
    commands.extend([
        CommandNode::Command(
            store_double(storage.macro_path("a"), Param::Value(1.0))
                .with_run(ScoreboardCommand::Get(quotient()))
                .into(),
        ),
        CommandNode::Command(
            store_double(
                storage.macro_path("b"),
                Param::Value(1.0 / f64::from(FLOAT_SCALE)),
            )
            .with_run(ScoreboardCommand::Get(decimals()))
            .into(),
        ),
        sum_staged(storage),
    ]);
    for player in [
        numerator(),
        denominator(),
        quotient(),
        remainder(),
        digit(),
        decimals(),
    ] {
        commands.push(CommandNode::Command(MinecraftCommand::score_reset(player)));
    }
    commands
}

/// Leaves the yaw of marker A facing marker B in the macro register:
/// `..-45` if `a < b`, `45..` if `a > b` and `0` if both are equal.
///
/// Facing a marker at the same position yields the same yaw as `a < b`, so the
/// positions are compared first. Comparing `Pos` instead of the arguments makes a
/// float equal to the double of the same value.
fn float_compare(storage: &StorageContext) -> Vec<CommandNode> {
    let differs = || storage.player("#float_ne");
    let position = || storage.macro_path("pos");

    vec![
        CommandNode::Macro(teleport_marker_to(Marker::A, "a")),
        CommandNode::Macro(teleport_marker_to(Marker::B, "b")),
        CommandNode::Command(
            Execute::new()
                .with_component(ExecuteComponent::As(marker_entity(Marker::A)))
                .with_component(ExecuteComponent::At("@s".into()))
                .with_component(ExecuteComponent::FacingEntity {
                    target: marker_entity(Marker::B),
                    anchor: Anchor::Feet,
                })
                .with_run(MinecraftCommand::Teleport {
                    target: "@s".into(),
                    destination: TeleportDestination::Location {
                        position: Coordinates::here(),
                        rotation: Some(Rotation::current()),
                    },
                })
                .into(),
        ),
        CommandNode::Command(
            Execute::new()
                .with_store(StoreKind::Result, StoreTarget::Score(storage.macro_register()))
                .with_run(DataCommand::Get {
                    path: marker_data(Marker::A, "Rotation[0]"),
                    scale: None,
                })
                .into(),
        ),
        CommandNode::Command(MinecraftCommand::data_set_from(
            position(),
            marker_data(Marker::B, "Pos"),
        )),
        CommandNode::Command(
            Execute::new()
                .with_store(StoreKind::Success, StoreTarget::Score(differs()))
                .with_run(MinecraftCommand::data_set_from(
                    position(),
                    marker_data(Marker::A, "Pos"),
                ))
                .into(),
        ),
        CommandNode::Command(
            Execute::new()
                .with_if(ExecuteCondition::Score {
                    player: differs(),
                    range: MinecraftRange::equal(0),
                })
                .with_run(MinecraftCommand::score_set(storage.macro_register(), 0))
                .into(),
        ),
        CommandNode::Command(MinecraftCommand::data_remove(position())),
        CommandNode::Command(MinecraftCommand::score_reset(differs())),
        CommandNode::Command(teleport_marker_home(Marker::A)),
        CommandNode::Command(teleport_marker_home(Marker::B)),
    ]
}

/// The support functions requested during one compilation, in request order
#[derive(Debug, Default)]
pub(crate) struct BuiltinRegistry {
    used: FxIndexMap<MacroFunction, Rc<FunctionIdent>>,
}

impl BuiltinRegistry {
    /// Returns the identifier of the function, fabricating it and its dependencies on first use
    pub fn request(
        &mut self,
        function: MacroFunction,
        storage: &StorageContext,
        constants: &mut ScoreboardConstants,
    ) -> Rc<FunctionIdent> {
        if let Some(ident) = self.used.get(&function) {
            return ident.clone();
        }

        trace!("Fabricating support function {}", function.name());
        for dependency in function.dependencies() {
            self.request(*dependency, storage, constants);
        }
        for constant in function.constants() {
            constants.get_name(*constant);
        }

        let ident = Rc::new(storage.generated_function(&function.name()));
        self.used.insert(function, ident.clone());
        ident
    }

    #[cfg(test)]
    pub fn is_used(&self, function: MacroFunction) -> bool {
        self.used.contains_key(&function)
    }

    pub fn emit(&self, storage: &StorageContext) -> Vec<FunctionEmission> {
        self.used
            .iter()
            .map(|(function, ident)| FunctionEmission {
                ident: ident.clone(),
                content: CommandNode::Block(function.body(storage)),
                sub_functions: Vec::new(),
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use cinder_common::Config;

    use crate::datapack::{
        scoreboard_constants::ScoreboardConstants, storage_context::StorageContext,
    };

    use super::{BuiltinRegistry, MacroFunction};

    fn storage() -> StorageContext {
        StorageContext::new(&Config {
            project_name: "demo".to_string(),
            ..Default::default()
        })
    }

    fn render(registry: &BuiltinRegistry, name: &str) -> String {
        registry
            .emit(&storage())
            .into_iter()
            .find(|function| function.ident.to_string() == name)
            .map(|function| function.content.render())
            .unwrap()
    }

    #[test]
    fn test_request_once_with_dependencies() {
        let storage = storage();
        let mut constants = ScoreboardConstants::default();
        let mut registry = BuiltinRegistry::default();

        let first = registry.request(MacroFunction::FloatNegate, &storage, &mut constants);
        let second = registry.request(MacroFunction::FloatNegate, &storage, &mut constants);
        assert_eq!(first, second);
        assert_eq!(first.to_string(), "demo:__generated/float_negate");
        assert!(registry.is_used(MacroFunction::FloatNegatePrepend));
        assert_eq!(registry.emit(&storage).len(), 2);
    }

    /// Whether `value` lies in a rendered `matches` range
    fn in_range(range: &str, value: i32) -> bool {
        match range.split_once("..") {
            Some((min, max)) => {
                (min.is_empty() || min.parse::<i32>().unwrap() <= value)
                    && (max.is_empty() || value <= max.parse::<i32>().unwrap())
            }
            None => range.parse::<i32>().unwrap() == value,
        }
    }

    fn floor_div(lhs: i32, rhs: i32) -> i32 {
        let quotient = lhs / rhs;
        if lhs % rhs != 0 && (lhs < 0) != (rhs < 0) {
            quotient - 1
        } else {
            quotient
        }
    }

    /// Runs one scoreboard command the way the game does: wrapping products,
    /// floored division and division by zero is ignored
    fn run_score_command(scores: &mut HashMap<String, i32>, inputs: (f64, f64), words: &[&str]) {
        let read = |scores: &HashMap<String, i32>, name: &str| match name.strip_prefix("#const_") {
            Some(value) => value.parse::<i32>().unwrap(),
            None => scores.get(name).copied().unwrap_or(0),
        };
        match words {
            ["execute", check @ ("if" | "unless"), "score", player, _, "matches", range, "run", rest @ ..] => {
                if in_range(range, read(scores, *player)) == (*check == "if") {
                    run_score_command(scores, inputs, rest);
                }
            }
            ["execute", "store", "result", "score", player, _, "run", "data", "get", "storage", _, key, scale] => {
                let input = if key.ends_with(".a") { inputs.0 } else { inputs.1 };
                let value = (input * scale.parse::<f64>().unwrap()).floor() as i32;
                scores.insert(player.to_string(), value);
            }
            ["scoreboard", "players", "set", player, _, value] => {
                scores.insert(player.to_string(), value.parse().unwrap());
            }
            ["scoreboard", "players", "operation", target, _, operation, source, _] => {
                let (lhs, rhs) = (read(scores, *target), read(scores, *source));
                let value = match *operation {
                    "=" => rhs,
                    "+=" => lhs.wrapping_add(rhs),
                    "-=" => lhs.wrapping_sub(rhs),
                    "*=" => lhs.wrapping_mul(rhs),
                    "/=" if rhs == 0 => lhs,
                    "/=" => floor_div(lhs, rhs),
                    "%=" if rhs == 0 => lhs,
                    "%=" => lhs - rhs * floor_div(lhs, rhs),
                    other => panic!("unexpected operation {other}"),
                };
                scores.insert(target.to_string(), value);
            }
            other => panic!("unexpected command {}", other.join(" ")),
        }
    }

    /// The scores left by the scoreboard prefix of a support function, which ends at
    /// the first command that writes the tree
    fn run_scores(function: MacroFunction, a: f64, b: f64) -> HashMap<String, i32> {
        let storage = storage();
        let mut registry = BuiltinRegistry::default();
        registry.request(function, &storage, &mut ScoreboardConstants::default());
        let body = render(&registry, &format!("demo:__generated/{}", function.name()));

        let mut scores = HashMap::new();
        for line in body.lines() {
            if line.starts_with('$') || line.contains("store result storage") {
                break;
            }
            let words: Vec<_> = line.split_whitespace().collect();
            run_score_command(&mut scores, (a, b), &words);
        }
        scores
    }

    #[test]
    fn test_float_divide_requests_add() {
        let storage = storage();
        let mut constants = ScoreboardConstants::default();
        let mut registry = BuiltinRegistry::default();
        let ident = registry.request(MacroFunction::FloatDivide, &storage, &mut constants);

        assert_eq!(constants.constants().map(|(value, _)| value).collect::<Vec<_>>(), [10]);
        assert!(registry.is_used(MacroFunction::FloatAdd));
        assert_eq!(
            MacroFunction::FloatDivide.call(ident, &storage).to_string(),
            "function demo:__generated/float_divide"
        );

        let body = render(&registry, "demo:__generated/float_divide");
        assert!(body.contains(
            "function demo:__generated/float_add with storage demo:vars #macro\n"
        ));
        assert!(!body.contains("#float_r cinder *= #const_1000"));
    }

    #[test]
    fn test_float_divide_digits() {
        let divide = |a, b| {
            let scores = run_scores(MacroFunction::FloatDivide, a, b);
            (scores["#float_q"], scores["#float_f"])
        };
        assert_eq!(divide(7.0, 2.0), (3, 500));
        assert_eq!(divide(-7.0, 2.0), (-4, 500));
        assert_eq!(divide(1.0, 3.0), (0, 333));
        // The remainder exceeds a thousandth of the score range
        assert_eq!(divide(10000.0, 5000.5), (1, 999));
        assert_eq!(divide(2000.0, 2147.0), (0, 931));
        // The divisor is shortened by one digit before shifting the remainder
        assert_eq!(divide(1_000_000.0, 300_000.5), (3, 333));
    }

    #[test]
    fn test_float_multiply_splits_first_factor() {
        let split = |a| {
            let scores = run_scores(MacroFunction::FloatMultiply, a, 3.0);
            (scores["#float_q"], scores["#float_n"])
        };
        assert_eq!(split(1.25), (1, 250));
        assert_eq!(split(-1.5), (-2, 500));
        assert_eq!(split(2_147_482.5), (2_147_482, 500));
        // Thousandths of the factor no longer fit, only the whole part is used
        assert_eq!(split(3_000_000.5), (3_000_000, 0));
    }

    #[test]
    fn test_float_multiply_scales_by_second_factor() {
        let storage = storage();
        let mut registry = BuiltinRegistry::default();
        registry.request(
            MacroFunction::FloatMultiply,
            &storage,
            &mut ScoreboardConstants::default(),
        );

        let body = render(&registry, "demo:__generated/float_multiply");
        let lines: Vec<_> = body.lines().collect();
        assert_eq!(
            &lines[7..11],
            [
                "$execute store result storage demo:vars #macro.a double $(b) run scoreboard players get #float_q cinder",
                "$execute store result storage demo:vars #macro.b double $(b) run scoreboard players get #float_n cinder",
                "execute if score #float_d cinder matches -2147482..2147482 store result storage demo:vars #macro.b double 0.001 run data get storage demo:vars #macro.b",
                "execute unless score #float_d cinder matches -2147482..2147482 store result storage demo:vars #macro.b double 1 run data get storage demo:vars #macro.b 0.001",
            ]
        );
        assert_eq!(
            lines[11],
            "function demo:__generated/float_add with storage demo:vars #macro"
        );
    }

    #[test]
    fn test_string_concat_body() {
        let storage = storage();
        let mut registry = BuiltinRegistry::default();
        registry.request(
            MacroFunction::StringConcat,
            &storage,
            &mut ScoreboardConstants::default(),
        );

        assert_eq!(
            render(&registry, "demo:__generated/string_concat"),
            "$data modify storage demo:vars #macro.result set value \"$(a)$(b)\"\n"
        );
    }

    #[test]
    fn test_array_get_body() {
        let storage = storage();
        let mut registry = BuiltinRegistry::default();
        registry.request(
            MacroFunction::ArrayGet(2),
            &storage,
            &mut ScoreboardConstants::default(),
        );

        assert_eq!(
            render(&registry, "demo:__generated/array_get_2"),
            "$data modify storage demo:vars #macro.result set from storage demo:vars $(p0)[$(i0)]$(p1)[$(i1)]$(p2)\n"
        );
    }

    #[test]
    fn test_float_compare_body() {
        let storage = storage();
        let mut registry = BuiltinRegistry::default();
        registry.request(
            MacroFunction::FloatCompare,
            &storage,
            &mut ScoreboardConstants::default(),
        );

        let body = render(&registry, "demo:__generated/float_compare");
        let lines: Vec<_> = body.lines().collect();
        assert_eq!(
            lines[0],
            "$tp 43494e44-4552-4d41-524b-000000000001 $(a) -512 0"
        );
        assert_eq!(
            lines[2],
            "execute as 43494e44-4552-4d41-524b-000000000001 at @s facing entity 43494e44-4552-4d41-524b-000000000002 feet run tp @s ~ ~ ~ ~ ~"
        );
        assert_eq!(
            lines[3],
            "execute store result score #macro cinder run data get entity 43494e44-4552-4d41-524b-000000000001 Rotation[0]"
        );
        assert_eq!(
            &lines[4..9],
            [
                "data modify storage demo:vars #macro.pos set from entity 43494e44-4552-4d41-524b-000000000002 Pos",
                "execute store success score #float_ne cinder run data modify storage demo:vars #macro.pos set from entity 43494e44-4552-4d41-524b-000000000001 Pos",
                "execute if score #float_ne cinder matches 0 run scoreboard players set #macro cinder 0",
                "data remove storage demo:vars #macro.pos",
                "scoreboard players reset #float_ne cinder",
            ]
        );
        // Equal operands leave a yaw that neither ordering accepts
        assert!(!in_range("..-45", 0));
        assert!(!in_range("45..", 0));
    }

    #[test]
    fn test_float_negate_body() {
        let storage = storage();
        let mut registry = BuiltinRegistry::default();
        registry.request(
            MacroFunction::FloatNegate,
            &storage,
            &mut ScoreboardConstants::default(),
        );

        assert_eq!(
            render(&registry, "demo:__generated/float_negate"),
            "$data modify storage demo:vars #macro.text set value \"$(v)\"\n\
             data modify storage demo:vars #macro.sign set string storage demo:vars #macro.text 0 1\n\
             execute if data storage demo:vars #macro{sign:\"-\"} run data modify storage demo:vars #macro.text set string storage demo:vars #macro.text 1\n\
             execute unless data storage demo:vars #macro{sign:\"-\"} run function demo:__generated/float_negate_prepend with storage demo:vars #macro\n\
             data remove storage demo:vars #macro.sign\n"
        );
    }
}
