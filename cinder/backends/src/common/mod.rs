//! Defines common items that are specific to the latest minecraft version

mod command_node;
mod commands;
mod stringify;
pub mod string_escape;

pub use command_node::CommandNode;
pub use commands::{
    Anchor, Coordinate, Coordinates, DataCommand, DataModifyOperation, DataModifySource, DataPath,
    DataTarget, DatapackCommand, DatapackListFilter, Difficulty, Execute, ExecuteComponent,
    ExecuteCondition, ForceloadCommand, FunctionIdent, MinecraftCommand, MinecraftRange, NbtType,
    ObjectiveCriterion, Param, ReturnValue, Rotation, ScoreboardCommand, ScoreboardComparison,
    ScoreboardOperation, ScoreboardPlayer, StoreKind, StoreTarget, TagCommand,
    TeleportDestination, WeatherKind,
};
