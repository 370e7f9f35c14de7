use std::fmt;

use serde::{Deserialize, Serialize};

use crate::Type;

/// Every function that is provided by the compiler instead of user code
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum BuiltinFunction {
    /// `run_command(command: string)`
    RunCommand,
    /// `print(value: any)`, shows the value to every player
    Print,
    /// `say(message: string)`
    Say,
    /// `set_datapack_enabled(name: string, enabled: bool)`
    SetDatapackEnabled,
    /// `is_datapack_enabled(name: string): bool`
    IsDatapackEnabled,
    /// `datapack_count(enabled_only: bool): int`
    DatapackCount,
    /// `set_weather(weather: string, duration: int)`
    SetWeather,
    /// `get_gamerule(name: string): int`
    GetGamerule,
    /// `set_gamerule(name: string, value: int | bool)`
    SetGamerule,
    /// `get_difficulty(): int`
    GetDifficulty,
    /// `set_difficulty(difficulty: string)`
    SetDifficulty,
}

impl BuiltinFunction {
    pub const ALL: [BuiltinFunction; 11] = [
        BuiltinFunction::RunCommand,
        BuiltinFunction::Print,
        BuiltinFunction::Say,
        BuiltinFunction::SetDatapackEnabled,
        BuiltinFunction::IsDatapackEnabled,
        BuiltinFunction::DatapackCount,
        BuiltinFunction::SetWeather,
        BuiltinFunction::GetGamerule,
        BuiltinFunction::SetGamerule,
        BuiltinFunction::GetDifficulty,
        BuiltinFunction::SetDifficulty,
    ];

    pub fn name(self) -> &'static str {
        match self {
            BuiltinFunction::RunCommand => "run_command",
            BuiltinFunction::Print => "print",
            BuiltinFunction::Say => "say",
            BuiltinFunction::SetDatapackEnabled => "set_datapack_enabled",
            BuiltinFunction::IsDatapackEnabled => "is_datapack_enabled",
            BuiltinFunction::DatapackCount => "datapack_count",
            BuiltinFunction::SetWeather => "set_weather",
            BuiltinFunction::GetGamerule => "get_gamerule",
            BuiltinFunction::SetGamerule => "set_gamerule",
            BuiltinFunction::GetDifficulty => "get_difficulty",
            BuiltinFunction::SetDifficulty => "set_difficulty",
        }
    }

    /// The number of arguments this builtin takes
    pub fn arity(self) -> usize {
        match self {
            BuiltinFunction::GetDifficulty => 0,
            BuiltinFunction::RunCommand
            | BuiltinFunction::Print
            | BuiltinFunction::Say
            | BuiltinFunction::IsDatapackEnabled
            | BuiltinFunction::DatapackCount
            | BuiltinFunction::GetGamerule
            | BuiltinFunction::SetDifficulty => 1,
            BuiltinFunction::SetDatapackEnabled
            | BuiltinFunction::SetWeather
            | BuiltinFunction::SetGamerule => 2,
        }
    }

    pub fn return_type(self) -> Type {
        match self {
            BuiltinFunction::IsDatapackEnabled => Type::Bool,
            BuiltinFunction::DatapackCount
            | BuiltinFunction::GetGamerule
            | BuiltinFunction::GetDifficulty => Type::Int,
            _ => Type::Void,
        }
    }
}

impl fmt::Display for BuiltinFunction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
