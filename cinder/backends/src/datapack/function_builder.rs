use std::rc::Rc;

use crate::common::{CommandNode, FunctionIdent};

use super::emission::FunctionEmission;

/// The reason a sub-function was fabricated, decides its name suffix
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub(crate) enum SubFunctionKind {
    Loop,
    If,
    Else,
    Misc,
}

impl SubFunctionKind {
    fn suffix(self) -> &'static str {
        match self {
            SubFunctionKind::Loop => "sl",
            SubFunctionKind::If => "sif",
            SubFunctionKind::Else => "sel",
            SubFunctionKind::Misc => "sm",
        }
    }

    fn counter(self) -> usize {
        match self {
            SubFunctionKind::Loop => 0,
            SubFunctionKind::If => 1,
            SubFunctionKind::Else => 2,
            SubFunctionKind::Misc => 3,
        }
    }
}

/// Identifies a loop statement within one emitted user function
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub(crate) struct LoopId(pub usize);

/// The ways control can leave a function other than falling through
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub(crate) struct Exits {
    /// A `return` sets the returned flag somewhere below this function
    pub returns: bool,
    /// Loops whose control register is set somewhere below this function
    pub loops: Vec<LoopId>,
}

impl Exits {
    pub fn add_loop(&mut self, id: LoopId) {
        if !self.loops.contains(&id) {
            self.loops.push(id);
        }
    }
}

/// Accumulates the commands of one function that is being emitted
#[derive(Debug)]
pub(crate) struct FunctionBuilder {
    pub ident: Rc<FunctionIdent>,
    pub exits: Exits,
    content: Vec<CommandNode>,
    sub_functions: Vec<FunctionEmission>,
    counters: [usize; 4],
}

impl FunctionBuilder {
    pub fn new(ident: Rc<FunctionIdent>) -> Self {
        FunctionBuilder {
            ident,
            exits: Exits::default(),
            content: Vec::new(),
            sub_functions: Vec::new(),
            counters: [0; 4],
        }
    }

    /// Creates the builder of a new sub-function named after this function,
    /// e.g. `main_sif0`, `main_sif1`, `main_sif0_sl0`
    pub fn sub_function(&mut self, kind: SubFunctionKind) -> FunctionBuilder {
        let counter = &mut self.counters[kind.counter()];
        let path = format!("{}_{}{}", self.ident.path, kind.suffix(), counter);
        *counter += 1;

        let ident = FunctionIdent::new(self.ident.namespace.clone(), path);
        FunctionBuilder::new(Rc::new(ident))
    }

    pub fn push(&mut self, node: impl Into<CommandNode>) {
        self.content.push(node.into());
    }

    pub fn push_front(&mut self, node: impl Into<CommandNode>) {
        self.content.insert(0, node.into());
    }

    pub fn add_sub_function(&mut self, function: FunctionEmission) {
        self.sub_functions.push(function);
    }

    pub fn finish(self) -> (FunctionEmission, Exits) {
        let emission = FunctionEmission {
            ident: self.ident,
            content: CommandNode::Block(self.content),
            sub_functions: self.sub_functions,
        };
        (emission, self.exits)
    }
}

#[cfg(test)]
mod tests {
    use std::rc::Rc;

    use crate::common::{FunctionIdent, MinecraftCommand};

    use super::{Exits, FunctionBuilder, LoopId, SubFunctionKind};

    #[test]
    fn test_sub_function_names() {
        let mut builder = FunctionBuilder::new(Rc::new(FunctionIdent::new("demo", "main")));
        let first = builder.sub_function(SubFunctionKind::If);
        let second = builder.sub_function(SubFunctionKind::If);
        let mut loop_builder = builder.sub_function(SubFunctionKind::Loop);
        let nested = loop_builder.sub_function(SubFunctionKind::Else);

        assert_eq!(first.ident.to_string(), "demo:main_sif0");
        assert_eq!(second.ident.to_string(), "demo:main_sif1");
        assert_eq!(loop_builder.ident.to_string(), "demo:main_sl0");
        assert_eq!(nested.ident.to_string(), "demo:main_sl0_sel0");
    }

    #[test]
    fn test_finish() {
        let mut builder = FunctionBuilder::new(Rc::new(FunctionIdent::new("demo", "main")));
        builder.push(MinecraftCommand::RawCommand {
            command: "say b".into(),
        });
        builder.push_front(MinecraftCommand::RawCommand {
            command: "say a".into(),
        });
        let sub = builder.sub_function(SubFunctionKind::Misc);
        builder.add_sub_function(sub.finish().0);
        builder.exits.add_loop(LoopId(0));
        builder.exits.add_loop(LoopId(0));

        let (emission, exits) = builder.finish();
        assert_eq!(emission.content.render(), "say a\nsay b\n");
        assert_eq!(emission.sub_functions.len(), 1);
        assert_eq!(
            exits,
            Exits {
                returns: false,
                loops: vec![LoopId(0)]
            }
        );
    }
}
