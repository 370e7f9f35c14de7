//! Renders [`MinecraftCommand`]s as single lines of command syntax
use std::fmt::{self, Display, Formatter};

use itertools::Itertools;

use super::commands::{
    Anchor, Coordinate, Coordinates, DataCommand, DataModifyOperation, DataModifySource, DataPath,
    DataTarget, DatapackCommand, DatapackListFilter, Difficulty, Execute, ExecuteComponent,
    ExecuteCondition, ForceloadCommand, FunctionIdent, MinecraftCommand, MinecraftRange,
    ObjectiveCriterion, Param, ReturnValue, Rotation, ScoreboardCommand, ScoreboardPlayer, StoreKind,
    StoreTarget, TagCommand, TeleportDestination, WeatherKind,
};

impl Display for ObjectiveCriterion {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ObjectiveCriterion::Dummy => "dummy",
            ObjectiveCriterion::Other(string) => string,
        })
    }
}

impl Display for FunctionIdent {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_fmt(format_args!(
            "{}{}:{}",
            if self.is_collection { "#" } else { "" },
            self.namespace,
            self.path
        ))
    }
}

impl Display for ScoreboardPlayer {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.player, self.scoreboard)
    }
}

impl Display for MinecraftRange {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match (self.min, self.max) {
            (Some(min), Some(max)) if min == max => write!(f, "{min}"),
            (Some(min), Some(max)) => write!(f, "{min}..{max}"),
            (Some(min), None) => write!(f, "{min}.."),
            (None, Some(max)) => write!(f, "..{max}"),
            (None, None) => f.write_str(".."),
        }
    }
}

impl Display for DataTarget {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            DataTarget::Storage(id) => write!(f, "storage {id}"),
            DataTarget::Entity(selector) => write!(f, "entity {selector}"),
            DataTarget::Block(position) => write!(f, "block {position}"),
        }
    }
}

impl Display for DataPath {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.target, self.path)
    }
}

impl Display for DataModifyOperation {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            DataModifyOperation::Set => f.write_str("set"),
            DataModifyOperation::Merge => f.write_str("merge"),
            DataModifyOperation::Append => f.write_str("append"),
            DataModifyOperation::Prepend => f.write_str("prepend"),
            DataModifyOperation::Insert(index) => write!(f, "insert {index}"),
        }
    }
}

impl Display for DataModifySource {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            DataModifySource::Value(value) => write!(f, "value {value}"),
            DataModifySource::From(path) => write!(f, "from {path}"),
            DataModifySource::String { source, start, end } => {
                write!(f, "string {source}")?;
                if let Some(start) = start {
                    write!(f, " {start}")?;
                    if let Some(end) = end {
                        write!(f, " {end}")?;
                    }
                }
                Ok(())
            }
        }
    }
}

impl Display for DataCommand {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            DataCommand::Get { path, scale: None } => write!(f, "data get {path}"),
            DataCommand::Get {
                path,
                scale: Some(scale),
            } => write!(f, "data get {path} {scale}"),
            DataCommand::Merge { target, value } => write!(f, "data merge {target} {value}"),
            DataCommand::Remove(path) => write!(f, "data remove {path}"),
            DataCommand::Modify {
                target,
                operation,
                source,
            } => write!(f, "data modify {target} {operation} {source}"),
        }
    }
}

impl Display for ScoreboardCommand {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            ScoreboardCommand::AddObjective {
                name,
                criterion,
                display_name,
            } => {
                write!(f, "scoreboard objectives add {name} {criterion}")?;
                if let Some(json) = display_name {
                    write!(f, " {json}")?;
                }
                Ok(())
            }
            ScoreboardCommand::RemoveObjective { name } => {
                write!(f, "scoreboard objectives remove {name}")
            }
            ScoreboardCommand::ListObjectives => f.write_str("scoreboard objectives list"),
            ScoreboardCommand::ModifyObjective {
                name,
                property,
                value,
            } => write!(f, "scoreboard objectives modify {name} {property} {value}"),
            ScoreboardCommand::Get(player) => write!(f, "scoreboard players get {player}"),
            ScoreboardCommand::Set { player, value } => {
                write!(f, "scoreboard players set {player} {value}")
            }
            ScoreboardCommand::Add { player, value } => {
                write!(f, "scoreboard players add {player} {value}")
            }
            ScoreboardCommand::Remove { player, value } => {
                write!(f, "scoreboard players remove {player} {value}")
            }
            ScoreboardCommand::Operation {
                target,
                operation,
                source,
            } => write!(
                f,
                "scoreboard players operation {target} {} {source}",
                operation.str_value()
            ),
            ScoreboardCommand::Reset {
                target,
                objective: None,
            } => write!(f, "scoreboard players reset {target}"),
            ScoreboardCommand::Reset {
                target,
                objective: Some(objective),
            } => write!(f, "scoreboard players reset {target} {objective}"),
            ScoreboardCommand::Enable { target, objective } => {
                write!(f, "scoreboard players enable {target} {objective}")
            }
            ScoreboardCommand::List { target: None } => f.write_str("scoreboard players list"),
            ScoreboardCommand::List {
                target: Some(target),
            } => write!(f, "scoreboard players list {target}"),
            ScoreboardCommand::Display {
                player,
                property,
                value,
            } => write!(
                f,
                "scoreboard players display {property} {} {} {value}",
                player.player, player.scoreboard
            ),
        }
    }
}

impl Display for Coordinate {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        fn offset(
            f: &mut Formatter<'_>,
            prefix: char,
            value: &Param<f64>,
        ) -> fmt::Result {
            match value {
                Param::Value(value) if *value == 0.0 => write!(f, "{prefix}"),
                value => write!(f, "{prefix}{value}"),
            }
        }

        match self {
            Coordinate::Absolute(value) => write!(f, "{value}"),
            Coordinate::Relative(value) => offset(f, '~', value),
            Coordinate::Local(value) => offset(f, '^', value),
        }
    }
}

impl Display for Coordinates {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} {}", self.x, self.y, self.z)
    }
}

impl Display for Rotation {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.yaw, self.pitch)
    }
}

impl Display for Anchor {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Anchor::Feet => "feet",
            Anchor::Eyes => "eyes",
        })
    }
}

impl Display for ExecuteCondition {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            ExecuteCondition::Score { player, range } => {
                write!(f, "score {player} matches {range}")
            }
            ExecuteCondition::ScoreRelation {
                lhs,
                comparison,
                rhs,
            } => write!(f, "score {lhs} {} {rhs}", comparison.str_value()),
            ExecuteCondition::Data(path) => write!(f, "data {path}"),
            ExecuteCondition::Block { position, block } => write!(f, "block {position} {block}"),
            ExecuteCondition::Entity(selector) => write!(f, "entity {selector}"),
            ExecuteCondition::Predicate(predicate) => write!(f, "predicate {predicate}"),
        }
    }
}

impl Display for StoreTarget {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            StoreTarget::Score(player) => write!(f, "score {player}"),
            StoreTarget::Data {
                path,
                nbt_type,
                scale,
            } => write!(f, "{path} {} {scale}", nbt_type.str_value()),
        }
    }
}

impl Display for ExecuteComponent {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            ExecuteComponent::Condition {
                inverted,
                condition,
            } => write!(f, "{} {condition}", if *inverted { "unless" } else { "if" }),
            ExecuteComponent::As(selector) => write!(f, "as {selector}"),
            ExecuteComponent::At(selector) => write!(f, "at {selector}"),
            ExecuteComponent::Positioned(position) => write!(f, "positioned {position}"),
            ExecuteComponent::PositionedAs(selector) => write!(f, "positioned as {selector}"),
            ExecuteComponent::Rotated(rotation) => write!(f, "rotated {rotation}"),
            ExecuteComponent::RotatedAs(selector) => write!(f, "rotated as {selector}"),
            ExecuteComponent::Facing(position) => write!(f, "facing {position}"),
            ExecuteComponent::FacingEntity { target, anchor } => {
                write!(f, "facing entity {target} {anchor}")
            }
            ExecuteComponent::Align(axes) => write!(f, "align {axes}"),
            ExecuteComponent::Anchored(anchor) => write!(f, "anchored {anchor}"),
            ExecuteComponent::In(dimension) => write!(f, "in {dimension}"),
            ExecuteComponent::On(relation) => write!(f, "on {relation}"),
            ExecuteComponent::Store { kind, target } => write!(
                f,
                "store {} {target}",
                match kind {
                    StoreKind::Result => "result",
                    StoreKind::Success => "success",
                }
            ),
        }
    }
}

impl Display for Execute {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str("execute")?;
        if !self.components.is_empty() {
            write!(f, " {}", self.components.iter().format(" "))?;
        }
        if let Some(run) = &self.run {
            write!(f, " run {run}")?;
        }
        Ok(())
    }
}

impl Display for TeleportDestination {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            TeleportDestination::Location {
                position,
                rotation: None,
            } => write!(f, "{position}"),
            TeleportDestination::Location {
                position,
                rotation: Some(rotation),
            } => write!(f, "{position} {rotation}"),
            TeleportDestination::Entity(selector) => write!(f, "{selector}"),
        }
    }
}

impl Display for TagCommand {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            TagCommand::Add { target, tag } => write!(f, "tag {target} add {tag}"),
            TagCommand::Remove { target, tag } => write!(f, "tag {target} remove {tag}"),
            TagCommand::List { target } => write!(f, "tag {target} list"),
        }
    }
}

impl Display for DatapackCommand {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            DatapackCommand::Enable(name) => write!(f, "datapack enable \"{name}\""),
            DatapackCommand::Disable(name) => write!(f, "datapack disable \"{name}\""),
            DatapackCommand::List(None) => f.write_str("datapack list"),
            DatapackCommand::List(Some(DatapackListFilter::Available)) => {
                f.write_str("datapack list available")
            }
            DatapackCommand::List(Some(DatapackListFilter::Enabled)) => {
                f.write_str("datapack list enabled")
            }
        }
    }
}

impl Display for WeatherKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            WeatherKind::Clear => "clear",
            WeatherKind::Rain => "rain",
            WeatherKind::Thunder => "thunder",
        })
    }
}

impl Display for Difficulty {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Difficulty::Peaceful => "peaceful",
            Difficulty::Easy => "easy",
            Difficulty::Normal => "normal",
            Difficulty::Hard => "hard",
        })
    }
}

impl Display for ForceloadCommand {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            ForceloadCommand::Add { x, z } => write!(f, "forceload add {x} {z}"),
            ForceloadCommand::Remove { x, z } => write!(f, "forceload remove {x} {z}"),
        }
    }
}

impl Display for ReturnValue {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            ReturnValue::Value(value) => write!(f, "return {value}"),
            ReturnValue::Run(command) => write!(f, "return run {command}"),
            ReturnValue::Fail => f.write_str("return fail"),
        }
    }
}

impl Display for MinecraftCommand {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            MinecraftCommand::Data(command) => command.fmt(f),
            MinecraftCommand::Scoreboard(command) => command.fmt(f),
            MinecraftCommand::Function {
                function,
                arguments: None,
            } => write!(f, "function {function}"),
            MinecraftCommand::Function {
                function,
                arguments: Some(arguments),
            } => write!(f, "function {function} with {arguments}"),
            MinecraftCommand::Execute(execute) => execute.fmt(f),
            MinecraftCommand::Teleport {
                target,
                destination,
            } => write!(f, "tp {target} {destination}"),
            MinecraftCommand::Tag(command) => command.fmt(f),
            MinecraftCommand::Summon {
                entity,
                position,
                nbt,
            } => {
                write!(f, "summon {entity}")?;
                match (position, nbt) {
                    (Some(position), Some(nbt)) => write!(f, " {position} {nbt}"),
                    (Some(position), None) => write!(f, " {position}"),
                    (None, Some(nbt)) => write!(f, " ~ ~ ~ {nbt}"),
                    (None, None) => Ok(()),
                }
            }
            MinecraftCommand::Kill { target } => write!(f, "kill {target}"),
            MinecraftCommand::Forceload(command) => command.fmt(f),
            MinecraftCommand::Gamerule { rule, value: None } => write!(f, "gamerule {rule}"),
            MinecraftCommand::Gamerule {
                rule,
                value: Some(value),
            } => write!(f, "gamerule {rule} {value}"),
            MinecraftCommand::Weather {
                weather,
                duration: None,
            } => write!(f, "weather {weather}"),
            MinecraftCommand::Weather {
                weather,
                duration: Some(duration),
            } => write!(f, "weather {weather} {duration}"),
            MinecraftCommand::Difficulty { difficulty: None } => f.write_str("difficulty"),
            MinecraftCommand::Difficulty {
                difficulty: Some(difficulty),
            } => write!(f, "difficulty {difficulty}"),
            MinecraftCommand::Datapack(command) => command.fmt(f),
            MinecraftCommand::Say { message } => write!(f, "say {message}"),
            MinecraftCommand::Tellraw { target, message } => write!(f, "tellraw {target} {message}"),
            MinecraftCommand::Return(value) => value.fmt(f),
            MinecraftCommand::RawCommand { command } => f.write_str(command),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::rc::Rc;

    use crate::common::{
        Coordinate, Coordinates, DataCommand, DataModifyOperation, DataModifySource, DataPath,
        DataTarget, DatapackCommand, Execute, ExecuteCondition, FunctionIdent, MinecraftCommand,
        MinecraftRange, NbtType, ObjectiveCriterion, Param, ReturnValue, ScoreboardCommand,
        ScoreboardComparison, ScoreboardOperation, ScoreboardPlayer, StoreKind, StoreTarget,
        TeleportDestination,
    };

    fn player(name: &str) -> ScoreboardPlayer {
        ScoreboardPlayer {
            player: name.into(),
            scoreboard: "cinder".into(),
        }
    }

    fn storage(path: &str) -> DataPath {
        DataPath {
            target: DataTarget::Storage("demo:vars".into()),
            path: path.into(),
        }
    }

    #[test]
    fn test_scoreboard_set() {
        let command: MinecraftCommand = ScoreboardCommand::Set {
            player: player("@s"),
            value: Param::Value(100),
        }
        .into();

        assert_eq!(command.to_string(), "scoreboard players set @s cinder 100");
    }

    #[test]
    fn test_scoreboard_set_placeholder() {
        let command: MinecraftCommand = ScoreboardCommand::Set {
            player: player("#return"),
            value: Param::placeholder("value"),
        }
        .into();

        assert_eq!(
            command.to_string(),
            "scoreboard players set #return cinder $(value)"
        );
    }

    #[test]
    fn test_scoreboard_operation() {
        let command: MinecraftCommand = ScoreboardCommand::Operation {
            target: player("value_1"),
            operation: ScoreboardOperation::Modulo,
            source: player("value_2"),
        }
        .into();

        assert_eq!(
            command.to_string(),
            "scoreboard players operation value_1 cinder %= value_2 cinder"
        );
    }

    #[test]
    fn test_scoreboard_add_json_name() {
        let command: MinecraftCommand = ScoreboardCommand::AddObjective {
            name: "foo".into(),
            criterion: ObjectiveCriterion::Other("health".into()),
            display_name: Some(r#"{"text":"foo","color":"green"}"#.into()),
        }
        .into();

        assert_eq!(
            command.to_string(),
            r#"scoreboard objectives add foo health {"text":"foo","color":"green"}"#
        );
    }

    #[test]
    fn test_scoreboard_reset() {
        let command: MinecraftCommand = ScoreboardCommand::Reset {
            target: "demo/main.#tmp0".into(),
            objective: Some("cinder".into()),
        }
        .into();

        assert_eq!(
            command.to_string(),
            "scoreboard players reset demo/main.#tmp0 cinder"
        );
    }

    #[test]
    fn test_function() {
        let command = MinecraftCommand::Function {
            function: Rc::new(FunctionIdent::new("demo", "foo/bar")),
            arguments: None,
        };
        assert_eq!(command.to_string(), "function demo:foo/bar");

        let command = MinecraftCommand::Function {
            function: Rc::new(FunctionIdent::new("demo", "__generated/say")),
            arguments: Some(storage("#macro")),
        };
        assert_eq!(
            command.to_string(),
            "function demo:__generated/say with storage demo:vars #macro"
        );
    }

    #[test]
    fn test_function_tag() {
        let ident = FunctionIdent {
            namespace: "minecraft".into(),
            path: "tick".into(),
            is_collection: true,
        };
        assert_eq!(ident.to_string(), "#minecraft:tick");
    }

    #[test]
    fn test_ranges() {
        assert_eq!(MinecraftRange::equal(1).to_string(), "1");
        assert_eq!(MinecraftRange::at_most(4).to_string(), "..4");
        assert_eq!(MinecraftRange::at_least(-45).to_string(), "-45..");
        assert_eq!(MinecraftRange::between(1, 3).to_string(), "1..3");
        assert_eq!(
            MinecraftRange::between(-2147482, 2147482).to_string(),
            "-2147482..2147482"
        );
    }

    #[test]
    fn test_comparison_ranges() {
        assert_eq!(
            ScoreboardComparison::Less.range_for(5),
            Some(MinecraftRange::at_most(4))
        );
        assert_eq!(
            ScoreboardComparison::Greater.range_for(5),
            Some(MinecraftRange::at_least(6))
        );
        assert_eq!(ScoreboardComparison::Less.range_for(i32::MIN), None);
    }

    #[test]
    fn test_data_modify() {
        let command: MinecraftCommand = DataCommand::Modify {
            target: storage("demo/main.s"),
            operation: DataModifyOperation::Set,
            source: DataModifySource::Value(r#""hello""#.into()),
        }
        .into();
        assert_eq!(
            command.to_string(),
            r#"data modify storage demo:vars demo/main.s set value "hello""#
        );

        let command: MinecraftCommand = DataCommand::Modify {
            target: storage("demo/main.a"),
            operation: DataModifyOperation::Insert(0),
            source: DataModifySource::String {
                source: storage("demo/main.b"),
                start: Some(1),
                end: None,
            },
        }
        .into();
        assert_eq!(
            command.to_string(),
            "data modify storage demo:vars demo/main.a insert 0 string storage demo:vars demo/main.b 1"
        );
    }

    #[test]
    fn test_data_get_scaled() {
        let command: MinecraftCommand = DataCommand::Get {
            path: DataPath {
                target: DataTarget::Entity("@s".into()),
                path: "Pos[0]".into(),
            },
            scale: Some(1000.0),
        }
        .into();
        assert_eq!(command.to_string(), "data get entity @s Pos[0] 1000");
    }

    #[test]
    fn test_execute_store_and_condition() {
        let command: MinecraftCommand = Execute::new()
            .with_store(
                StoreKind::Result,
                StoreTarget::Data {
                    path: storage("demo/main.f"),
                    nbt_type: NbtType::Double,
                    scale: Param::Value(1.0),
                },
            )
            .with_if(ExecuteCondition::ScoreRelation {
                lhs: player("a"),
                comparison: ScoreboardComparison::LessOrEqual,
                rhs: player("b"),
            })
            .with_run(ScoreboardCommand::Get(player("a")))
            .into();

        assert_eq!(
            command.to_string(),
            "execute store result storage demo:vars demo/main.f double 1 if score a cinder <= b cinder run scoreboard players get a cinder"
        );
    }

    #[test]
    fn test_execute_unless_return() {
        let command: MinecraftCommand = Execute::new()
            .with_unless(ExecuteCondition::Score {
                player: player("demo/main.#tmp0"),
                range: MinecraftRange::equal(1),
            })
            .with_run(MinecraftCommand::Return(ReturnValue::Value(0)))
            .into();

        assert_eq!(
            command.to_string(),
            "execute unless score demo/main.#tmp0 cinder matches 1 run return 0"
        );
    }

    #[test]
    fn test_teleport_macro() {
        let command = MinecraftCommand::Teleport {
            target: "@s".into(),
            destination: TeleportDestination::Location {
                position: Coordinates {
                    x: Coordinate::Relative(Param::placeholder("b")),
                    y: Coordinate::Relative(Param::Value(0.0)),
                    z: Coordinate::Relative(Param::Value(0.0)),
                },
                rotation: None,
            },
        };
        assert_eq!(command.to_string(), "tp @s ~$(b) ~ ~");
    }

    #[test]
    fn test_datapack() {
        let command = MinecraftCommand::Datapack(DatapackCommand::Disable(Param::Value(
            "file/other".into(),
        )));
        assert_eq!(command.to_string(), r#"datapack disable "file/other""#);

        let command =
            MinecraftCommand::Datapack(DatapackCommand::Enable(Param::placeholder("name")));
        assert_eq!(command.to_string(), r#"datapack enable "$(name)""#);
    }

    #[test]
    fn test_return_run() {
        let command = MinecraftCommand::Return(ReturnValue::Run(Box::new(
            ScoreboardCommand::Get(player("#return")).into(),
        )));
        assert_eq!(
            command.to_string(),
            "return run scoreboard players get #return cinder"
        );
    }

    #[test]
    fn test_raw_command() {
        let command = MinecraftCommand::RawCommand {
            command: "Hallo Welt".into(),
        };

        assert_eq!(command.to_string(), "Hallo Welt");
    }
}
