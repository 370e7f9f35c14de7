use std::{fmt, fmt::Display, rc::Rc};

use fmt::Formatter;
use smol_str::SmolStr;

/// A value that is either known while emitting or substituted when a macro function runs
#[derive(Debug, Clone, PartialEq)]
pub enum Param<T> {
    Value(T),
    /// Rendered as `$(name)`, only valid inside macro lines
    Macro(SmolStr),
}

impl<T> Param<T> {
    pub fn placeholder(name: impl Into<SmolStr>) -> Self {
        Param::Macro(name.into())
    }
}

impl<T> From<T> for Param<T> {
    fn from(value: T) -> Self {
        Param::Value(value)
    }
}

impl<T: Display> Display for Param<T> {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Param::Value(value) => value.fmt(f),
            Param::Macro(name) => write!(f, "$({name})"),
        }
    }
}

/// A score holder on an objective
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ScoreboardPlayer {
    pub player: Rc<str>,
    pub scoreboard: Rc<str>,
}

/// The identifier of a function, e.g. `demo:main` or `#minecraft:tick`
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FunctionIdent {
    pub namespace: Rc<str>,
    pub path: Rc<str>,
    pub is_collection: bool,
}

impl FunctionIdent {
    pub fn new(namespace: impl Into<Rc<str>>, path: impl Into<Rc<str>>) -> Self {
        FunctionIdent {
            namespace: namespace.into(),
            path: path.into(),
            is_collection: false,
        }
    }
}

/// An inclusive integer range as used by `matches`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MinecraftRange {
    pub min: Option<i32>,
    pub max: Option<i32>,
}

impl MinecraftRange {
    pub fn equal(value: i32) -> Self {
        MinecraftRange {
            min: Some(value),
            max: Some(value),
        }
    }

    pub fn at_least(value: i32) -> Self {
        MinecraftRange {
            min: Some(value),
            max: None,
        }
    }

    pub fn at_most(value: i32) -> Self {
        MinecraftRange {
            min: None,
            max: Some(value),
        }
    }

    pub fn between(min: i32, max: i32) -> Self {
        MinecraftRange {
            min: Some(min),
            max: Some(max),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ScoreboardOperation {
    Assign,
    Plus,
    Minus,
    Times,
    Divide,
    Modulo,
    Min,
    Max,
    Swap,
}

impl ScoreboardOperation {
    pub fn str_value(self) -> &'static str {
        match self {
            ScoreboardOperation::Assign => "=",
            ScoreboardOperation::Plus => "+=",
            ScoreboardOperation::Minus => "-=",
            ScoreboardOperation::Times => "*=",
            ScoreboardOperation::Divide => "/=",
            ScoreboardOperation::Modulo => "%=",
            ScoreboardOperation::Min => "<",
            ScoreboardOperation::Max => ">",
            ScoreboardOperation::Swap => "><",
        }
    }
}

/// The relations available in `execute if score <a> <relation> <b>`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ScoreboardComparison {
    Equal,
    Less,
    LessOrEqual,
    Greater,
    GreaterOrEqual,
}

impl ScoreboardComparison {
    pub fn str_value(self) -> &'static str {
        match self {
            ScoreboardComparison::Equal => "=",
            ScoreboardComparison::Less => "<",
            ScoreboardComparison::LessOrEqual => "<=",
            ScoreboardComparison::Greater => ">",
            ScoreboardComparison::GreaterOrEqual => ">=",
        }
    }

    /// The range a score has to be in to satisfy `score <relation> value`
    pub fn range_for(self, value: i32) -> Option<MinecraftRange> {
        Some(match self {
            ScoreboardComparison::Equal => MinecraftRange::equal(value),
            ScoreboardComparison::Less => MinecraftRange::at_most(value.checked_sub(1)?),
            ScoreboardComparison::LessOrEqual => MinecraftRange::at_most(value),
            ScoreboardComparison::Greater => MinecraftRange::at_least(value.checked_add(1)?),
            ScoreboardComparison::GreaterOrEqual => MinecraftRange::at_least(value),
        })
    }
}

/// The holder of nbt data
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum DataTarget {
    Storage(Rc<str>),
    Entity(Rc<str>),
    Block(Rc<str>),
}

/// A path into the nbt data of a [`DataTarget`]
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DataPath {
    pub target: DataTarget,
    pub path: Rc<str>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NbtType {
    Byte,
    Short,
    Int,
    Long,
    Float,
    Double,
}

impl NbtType {
    pub fn str_value(self) -> &'static str {
        match self {
            NbtType::Byte => "byte",
            NbtType::Short => "short",
            NbtType::Int => "int",
            NbtType::Long => "long",
            NbtType::Float => "float",
            NbtType::Double => "double",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DataModifyOperation {
    Set,
    Merge,
    Append,
    Prepend,
    Insert(i32),
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum DataModifySource {
    /// A snbt literal
    Value(Rc<str>),
    From(DataPath),
    /// The string representation of the source, optionally sliced
    String {
        source: DataPath,
        start: Option<i32>,
        end: Option<i32>,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub enum DataCommand {
    Get {
        path: DataPath,
        scale: Option<f64>,
    },
    Merge {
        target: DataTarget,
        value: Rc<str>,
    },
    Remove(DataPath),
    Modify {
        target: DataPath,
        operation: DataModifyOperation,
        source: DataModifySource,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ObjectiveCriterion {
    Dummy,
    Other(Rc<str>),
}

#[derive(Debug, Clone, PartialEq)]
pub enum ScoreboardCommand {
    AddObjective {
        name: Rc<str>,
        criterion: ObjectiveCriterion,
        display_name: Option<Rc<str>>,
    },
    RemoveObjective {
        name: Rc<str>,
    },
    ListObjectives,
    ModifyObjective {
        name: Rc<str>,
        property: Rc<str>,
        value: Rc<str>,
    },
    Get(ScoreboardPlayer),
    Set {
        player: ScoreboardPlayer,
        value: Param<i32>,
    },
    Add {
        player: ScoreboardPlayer,
        value: i32,
    },
    Remove {
        player: ScoreboardPlayer,
        value: i32,
    },
    Operation {
        target: ScoreboardPlayer,
        operation: ScoreboardOperation,
        source: ScoreboardPlayer,
    },
    Reset {
        target: Rc<str>,
        objective: Option<Rc<str>>,
    },
    Enable {
        target: Rc<str>,
        objective: Rc<str>,
    },
    List {
        target: Option<Rc<str>>,
    },
    Display {
        player: ScoreboardPlayer,
        property: Rc<str>,
        value: Rc<str>,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub enum Coordinate {
    Absolute(Param<f64>),
    Relative(Param<f64>),
    Local(Param<f64>),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Coordinates {
    pub x: Coordinate,
    pub y: Coordinate,
    pub z: Coordinate,
}

impl Coordinates {
    pub fn absolute(x: f64, y: f64, z: f64) -> Self {
        Coordinates {
            x: Coordinate::Absolute(x.into()),
            y: Coordinate::Absolute(y.into()),
            z: Coordinate::Absolute(z.into()),
        }
    }

    /// `~ ~ ~`
    pub fn here() -> Self {
        Coordinates {
            x: Coordinate::Relative(0.0.into()),
            y: Coordinate::Relative(0.0.into()),
            z: Coordinate::Relative(0.0.into()),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Rotation {
    pub yaw: Coordinate,
    pub pitch: Coordinate,
}

impl Rotation {
    /// `~ ~`, the rotation of the execution context
    pub fn current() -> Self {
        Rotation {
            yaw: Coordinate::Relative(0.0.into()),
            pitch: Coordinate::Relative(0.0.into()),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Anchor {
    Feet,
    Eyes,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ExecuteCondition {
    Score {
        player: ScoreboardPlayer,
        range: MinecraftRange,
    },
    ScoreRelation {
        lhs: ScoreboardPlayer,
        comparison: ScoreboardComparison,
        rhs: ScoreboardPlayer,
    },
    Data(DataPath),
    Block {
        position: Coordinates,
        block: Rc<str>,
    },
    Entity(Rc<str>),
    Predicate(Rc<str>),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StoreKind {
    Result,
    Success,
}

#[derive(Debug, Clone, PartialEq)]
pub enum StoreTarget {
    Score(ScoreboardPlayer),
    Data {
        path: DataPath,
        nbt_type: NbtType,
        scale: Param<f64>,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub enum ExecuteComponent {
    Condition {
        inverted: bool,
        condition: ExecuteCondition,
    },
    As(Rc<str>),
    At(Rc<str>),
    Positioned(Coordinates),
    PositionedAs(Rc<str>),
    Rotated(Rotation),
    RotatedAs(Rc<str>),
    Facing(Coordinates),
    FacingEntity {
        target: Rc<str>,
        anchor: Anchor,
    },
    Align(Rc<str>),
    Anchored(Anchor),
    In(Rc<str>),
    On(Rc<str>),
    Store {
        kind: StoreKind,
        target: StoreTarget,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub struct Execute {
    pub components: Vec<ExecuteComponent>,
    pub run: Option<Box<MinecraftCommand>>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum TeleportDestination {
    Location {
        position: Coordinates,
        rotation: Option<Rotation>,
    },
    Entity(Rc<str>),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TagCommand {
    Add { target: Rc<str>, tag: Rc<str> },
    Remove { target: Rc<str>, tag: Rc<str> },
    List { target: Rc<str> },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DatapackListFilter {
    Available,
    Enabled,
}

#[derive(Debug, Clone, PartialEq)]
pub enum DatapackCommand {
    Enable(Param<Rc<str>>),
    Disable(Param<Rc<str>>),
    List(Option<DatapackListFilter>),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WeatherKind {
    Clear,
    Rain,
    Thunder,
}

impl WeatherKind {
    pub fn from_name(name: &str) -> Option<Self> {
        Some(match name.to_ascii_lowercase().as_str() {
            "clear" => WeatherKind::Clear,
            "rain" => WeatherKind::Rain,
            "thunder" => WeatherKind::Thunder,
            _ => return None,
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Difficulty {
    Peaceful,
    Easy,
    Normal,
    Hard,
}

impl Difficulty {
    pub fn from_name(name: &str) -> Option<Self> {
        Some(match name.to_ascii_lowercase().as_str() {
            "peaceful" => Difficulty::Peaceful,
            "easy" => Difficulty::Easy,
            "normal" => Difficulty::Normal,
            "hard" => Difficulty::Hard,
            _ => return None,
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ForceloadCommand {
    Add { x: i32, z: i32 },
    Remove { x: i32, z: i32 },
}

#[derive(Debug, Clone, PartialEq)]
pub enum ReturnValue {
    Value(i32),
    Run(Box<MinecraftCommand>),
    Fail,
}

/// Enumerates all minecraft commands that are used by any backend
#[derive(Debug, Clone, PartialEq)]
pub enum MinecraftCommand {
    Data(DataCommand),
    Scoreboard(ScoreboardCommand),
    /// Calls another function, macro functions receive their arguments from a compound
    Function {
        function: Rc<FunctionIdent>,
        arguments: Option<DataPath>,
    },
    Execute(Execute),
    Teleport {
        target: Rc<str>,
        destination: TeleportDestination,
    },
    Tag(TagCommand),
    Summon {
        entity: Rc<str>,
        position: Option<Coordinates>,
        nbt: Option<Rc<str>>,
    },
    Kill {
        target: Rc<str>,
    },
    Forceload(ForceloadCommand),
    Gamerule {
        rule: Param<Rc<str>>,
        value: Option<Param<Rc<str>>>,
    },
    Weather {
        weather: Param<WeatherKind>,
        duration: Option<Param<i32>>,
    },
    Difficulty {
        difficulty: Option<Param<Difficulty>>,
    },
    Datapack(DatapackCommand),
    Say {
        message: Rc<str>,
    },
    Tellraw {
        target: Rc<str>,
        message: Rc<str>,
    },
    Return(ReturnValue),
    RawCommand {
        command: Rc<str>,
    },
}

impl From<DataCommand> for MinecraftCommand {
    fn from(command: DataCommand) -> Self {
        MinecraftCommand::Data(command)
    }
}

impl From<ScoreboardCommand> for MinecraftCommand {
    fn from(command: ScoreboardCommand) -> Self {
        MinecraftCommand::Scoreboard(command)
    }
}

impl From<Execute> for MinecraftCommand {
    fn from(execute: Execute) -> Self {
        MinecraftCommand::Execute(execute)
    }
}

impl Execute {
    pub fn new() -> Self {
        Execute {
            components: Vec::new(),
            run: None,
        }
    }

    pub fn with_component(mut self, component: ExecuteComponent) -> Self {
        self.components.push(component);
        self
    }

    pub fn with_if(self, condition: ExecuteCondition) -> Self {
        self.with_component(ExecuteComponent::Condition {
            inverted: false,
            condition,
        })
    }

    pub fn with_unless(self, condition: ExecuteCondition) -> Self {
        self.with_component(ExecuteComponent::Condition {
            inverted: true,
            condition,
        })
    }

    pub fn with_store(self, kind: StoreKind, target: StoreTarget) -> Self {
        self.with_component(ExecuteComponent::Store { kind, target })
    }

    pub fn with_run(mut self, command: impl Into<MinecraftCommand>) -> Self {
        self.run = Some(Box::new(command.into()));
        self
    }
}

impl Default for Execute {
    fn default() -> Self {
        Self::new()
    }
}

impl MinecraftCommand {
    pub fn data_set_value(target: DataPath, value: impl Into<Rc<str>>) -> Self {
        DataCommand::Modify {
            target,
            operation: DataModifyOperation::Set,
            source: DataModifySource::Value(value.into()),
        }
        .into()
    }

    pub fn data_set_from(target: DataPath, source: DataPath) -> Self {
        DataCommand::Modify {
            target,
            operation: DataModifyOperation::Set,
            source: DataModifySource::From(source),
        }
        .into()
    }

    pub fn data_remove(path: DataPath) -> Self {
        DataCommand::Remove(path).into()
    }

    pub fn score_set(player: ScoreboardPlayer, value: i32) -> Self {
        ScoreboardCommand::Set {
            player,
            value: Param::Value(value),
        }
        .into()
    }

    pub fn score_operation(
        target: ScoreboardPlayer,
        operation: ScoreboardOperation,
        source: ScoreboardPlayer,
    ) -> Self {
        ScoreboardCommand::Operation {
            target,
            operation,
            source,
        }
        .into()
    }

    pub fn score_reset(player: ScoreboardPlayer) -> Self {
        ScoreboardCommand::Reset {
            target: player.player,
            objective: Some(player.scoreboard),
        }
        .into()
    }

    pub fn call(function: Rc<FunctionIdent>) -> Self {
        MinecraftCommand::Function {
            function,
            arguments: None,
        }
    }

    pub fn call_with(function: Rc<FunctionIdent>, arguments: DataPath) -> Self {
        MinecraftCommand::Function {
            function,
            arguments: Some(arguments),
        }
    }

    pub fn return_value(value: i32) -> Self {
        MinecraftCommand::Return(ReturnValue::Value(value))
    }

    pub fn return_run(command: impl Into<MinecraftCommand>) -> Self {
        MinecraftCommand::Return(ReturnValue::Run(Box::new(command.into())))
    }
}
