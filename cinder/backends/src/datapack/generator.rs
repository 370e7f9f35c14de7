use std::rc::Rc;

use cinder_bound::{BoundProgram, FunctionKind};
use cinder_common::CompileContext;
use cinder_error::EmitResult;
use log::debug;

use crate::common::{
    CommandNode, ForceloadCommand, FunctionIdent, MinecraftCommand, ObjectiveCriterion,
    ScoreboardCommand,
};

use super::{
    builtins::BuiltinRegistry,
    emission::{FunctionEmission, ProgramEmission},
    emitter::FunctionEmitter,
    function_context::FunctionContext,
    markers::Marker,
    scoreboard_constants::ScoreboardConstants,
    storage_context::StorageContext,
};

/// State shared by every function emitted in one compilation
pub(crate) struct EmissionSession<'a> {
    pub program: &'a BoundProgram,
    pub storage: StorageContext,
    pub constants: ScoreboardConstants,
    pub builtins: BuiltinRegistry,
    pub functions: FunctionContext,
    /// Emit comments and blank lines
    pub debug: bool,
}

pub struct DatapackGenerator<'a> {
    ctx: &'a CompileContext,
    session: EmissionSession<'a>,
}

impl<'a> DatapackGenerator<'a> {
    pub fn new(ctx: &'a CompileContext, program: &'a BoundProgram) -> EmitResult<Self> {
        let session = EmissionSession {
            program,
            storage: StorageContext::new(&ctx.config),
            constants: ScoreboardConstants::default(),
            builtins: BuiltinRegistry::default(),
            functions: FunctionContext::new(program)?,
            debug: ctx.config.is_debug(),
        };
        Ok(DatapackGenerator { ctx, session })
    }

    /// Emits every function of the program, followed by `__load`, `__tick` and the support functions
    pub fn generate(mut self) -> EmitResult<ProgramEmission> {
        let mut emission = ProgramEmission::default();
        let mut load_calls = Vec::new();
        let mut tick_calls = Vec::new();

        let program = self.session.program;
        for (id, function) in program.functions() {
            // Constructors are inlined at every object creation
            if matches!(function.kind, FunctionKind::Constructor(_)) {
                continue;
            }
            let ident = self.session.functions.ident(id)?;
            debug!("Emitting function {ident}");

            let mut emitter = FunctionEmitter::for_function(&mut self.session, id)?;
            emitter
                .emit_body(&function.body)
                .map_err(|error| error.within(format!("function {ident}")))?;
            emission.push_function(emitter.finish());

            if function.attributes.load {
                load_calls.push(ident.clone());
            }
            if function.attributes.tick {
                tick_calls.push(ident);
            }
        }

        let load = self.generate_load(&load_calls)?;
        emission.load.push(load.ident.clone());
        emission.push_function(load);

        if !tick_calls.is_empty() {
            let tick = self.generate_tick(&tick_calls);
            emission.tick.push(tick.ident.clone());
            emission.push_function(tick);
        }

        for function in self.session.builtins.emit(&self.session.storage) {
            emission.push_function(function);
        }

        debug!(
            "Emitted {} namespaces for compilation {}",
            emission.namespaces.len(),
            self.ctx.compilation_id.0
        );
        Ok(emission)
    }

    fn main_function(&self, name: &str) -> Rc<FunctionIdent> {
        Rc::new(FunctionIdent::new(
            self.session.storage.namespace().clone(),
            name,
        ))
    }

    /// Resets the runtime, initializes constants and globals, then runs the `load` functions
    fn generate_load(&mut self, calls: &[Rc<FunctionIdent>]) -> EmitResult<FunctionEmission> {
        let ident = self.main_function("__load");
        let local_prefix: Rc<str> = format!("{}/__load", ident.namespace).into();
        debug!("Emitting function {ident}");

        // Globals may register constants, so they are emitted before the constants are listed
        let mut emitter =
            FunctionEmitter::new(&mut self.session, ident.clone(), local_prefix, "".into());
        emitter
            .emit_globals()
            .map_err(|error| error.within("global fields"))?;
        let globals = emitter.finish();

        let storage = &self.session.storage;
        let namespace = storage.namespace().clone();
        let objective = storage.objective().clone();
        let (chunk_x, chunk_z) = Marker::HOME_CHUNK;

        let debug = self.session.debug;
        let mut nodes = Vec::new();
        let comment = |nodes: &mut Vec<CommandNode>, text: &str| {
            if debug {
                nodes.push(CommandNode::comment(text));
            }
        };

        comment(&mut nodes, "Runtime");
        nodes.push(CommandNode::Command(
            ScoreboardCommand::RemoveObjective {
                name: objective.clone(),
            }
            .into(),
        ));
        nodes.push(CommandNode::Command(
            ScoreboardCommand::AddObjective {
                name: objective,
                criterion: ObjectiveCriterion::Dummy,
                display_name: None,
            }
            .into(),
        ));
        nodes.push(CommandNode::Command(MinecraftCommand::Forceload(
            ForceloadCommand::Add {
                x: chunk_x,
                z: chunk_z,
            },
        )));
        nodes.push(CommandNode::Command(Marker::kill_all(&namespace)));
        nodes.push(CommandNode::Command(Marker::A.summon(&namespace)));
        nodes.push(CommandNode::Command(Marker::B.summon(&namespace)));

        comment(&mut nodes, "Constants");
        for (value, name) in self.session.constants.constants() {
            nodes.push(CommandNode::Command(MinecraftCommand::score_set(
                storage.player(name.clone()),
                value,
            )));
        }

        comment(&mut nodes, "Globals");
        nodes.push(globals.content);

        comment(&mut nodes, "Load functions");
        nodes.extend(
            calls
                .iter()
                .map(|call| CommandNode::Command(MinecraftCommand::call(call.clone()))),
        );

        Ok(FunctionEmission {
            ident,
            content: CommandNode::Block(nodes),
            sub_functions: globals.sub_functions,
        })
    }

    fn generate_tick(&self, calls: &[Rc<FunctionIdent>]) -> FunctionEmission {
        FunctionEmission {
            ident: self.main_function("__tick"),
            content: CommandNode::Block(
                calls
                    .iter()
                    .map(|call| CommandNode::Command(MinecraftCommand::call(call.clone())))
                    .collect(),
            ),
            sub_functions: Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use cinder_bound::{
        BinaryOperator, BoundBlock, BoundExpression, BoundFunction, FunctionAttributes, Type,
    };

    use crate::datapack::emitter::tests::{emit_program, lines, program_with_main};

    #[test]
    fn test_load_initializes_runtime() {
        let (mut program, ns) = program_with_main();
        program.add_function(
            BoundFunction::new(ns, "init", vec![], Type::Void, BoundBlock::new(vec![]))
                .with_attributes(FunctionAttributes {
                    load: true,
                    tick: false,
                }),
        );
        let emission = emit_program(&program);
        let load = lines(&emission, "demo:__load");

        assert_eq!(load[0], "scoreboard objectives remove cinder");
        assert_eq!(load[1], "scoreboard objectives add cinder dummy");
        assert_eq!(load[2], "forceload add 0 0");
        assert_eq!(
            load[3],
            "kill @e[type=minecraft:marker,tag=demo.marker]"
        );
        assert!(load[4].starts_with("summon minecraft:marker 0 -512 0"));
        assert!(load[5].starts_with("summon minecraft:marker 0 -512 0"));
        assert_eq!(load.last().unwrap(), "function demo:init");
        assert_eq!(emission.load.len(), 1);
        assert!(emission.tick.is_empty());
        assert!(emission.find("demo:__tick").is_none());
    }

    #[test]
    fn test_tick_only_with_tick_functions() {
        let (mut program, ns) = program_with_main();
        program.add_function(
            BoundFunction::new(ns, "step", vec![], Type::Void, BoundBlock::new(vec![]))
                .with_attributes(FunctionAttributes {
                    load: false,
                    tick: true,
                }),
        );
        let emission = emit_program(&program);
        assert_eq!(lines(&emission, "demo:__tick"), vec!["function demo:step"]);
        assert_eq!(emission.tick[0].to_string(), "demo:__tick");
    }

    #[test]
    fn test_globals_follow_constants() {
        let (mut program, ns) = program_with_main();
        program.add_field(ns, "base", Type::Int, Some(BoundExpression::int(4)));
        program.add_field(
            ns,
            "limit",
            Type::Int,
            Some(BoundExpression::binary(
                BoundExpression::global(ns, "base", Type::Int),
                BinaryOperator::Mul,
                BoundExpression::int(3),
            )),
        );
        let emission = emit_program(&program);
        let load = lines(&emission, "demo:__load");
        assert_eq!(load[6], "scoreboard players set #const_3 cinder 3");
        assert_eq!(load[7], "scoreboard players set demo.base cinder 4");
        assert!(load[8..]
            .iter()
            .any(|line| line.ends_with("*= #const_3 cinder")));
    }
}
