//! Translates bound functions into commands
//!
//! One [`FunctionEmitter`] exists per emitted user function. It owns the scope arena
//! of that function and the builder of the (sub-)function that is currently written,
//! while borrowing the compilation wide [`EmissionSession`].
//!
//! Every expression is emitted as "write the value of this expression into a given
//! location". Intermediate values live in temporaries named `#tmp{n}`, where `n` is
//! handed down as `temp_base`: evaluating into temporary `k` passes `k + 1`, so a
//! nested evaluation never clobbers a temporary that is still needed.
use std::{mem, rc::Rc};

use cinder_bound::{
    BoundExpression, BoundProgram, ClassId, EnumBacking, FunctionId, LiteralValue, Type,
};
use cinder_common::StorageKind;
use cinder_error::{EmitErrorKind, EmitResult};
use log::trace;
use smol_str::SmolStr;

use crate::common::{
    CommandNode, DataCommand, DataPath, Execute, ExecuteCondition, FunctionIdent,
    MinecraftCommand, MinecraftRange, NbtType, Param, ScoreboardCommand, ScoreboardOperation,
    ScoreboardPlayer, StoreKind, StoreTarget,
};

use super::{
    builtins::MacroFunction,
    emission::FunctionEmission,
    function_builder::{Exits, FunctionBuilder, LoopId, SubFunctionKind},
    function_context::sanitize,
    generator::EmissionSession,
    scope::{EmittionVariable, ScopeArena, ScopeId, VariableRequest},
    snbt::{default_snbt, literal_snbt, repeated_list},
    storage_context::StorageContext,
};

mod access;
mod calls;
mod conversions;
mod expressions;
mod floats;
mod statements;

/// The function a `return` leaves
#[derive(Debug, Clone, Copy)]
struct ReturnBoundary {
    /// Sub-function depth of the function that ends on `return`
    depth: usize,
    /// The outermost scope whose temporaries are cleaned up
    scope: ScopeId,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LoopKind {
    While,
    DoWhile,
}

/// A loop whose body is currently emitted
#[derive(Debug)]
struct LoopFrame {
    id: LoopId,
    kind: LoopKind,
    break_label: SmolStr,
    continue_label: SmolStr,
    /// The fabricated loop function
    ident: Rc<FunctionIdent>,
    depth: usize,
    /// The scope the loop statement is in
    parent_scope: ScopeId,
    body_scope: ScopeId,
    condition: BoundExpression,
    condition_temp: Rc<EmittionVariable>,
    temp_floor: usize,
    /// `1` requests a break, `2` a continue, declared on first use
    control: Option<Rc<EmittionVariable>>,
    /// Condition check of a do-while, used to continue from nested functions
    tail: Option<Rc<FunctionIdent>>,
}

/// A value that is either known while emitting or stored somewhere
#[derive(Debug, Clone)]
pub(crate) enum Operand {
    Literal(LiteralValue),
    Location(Rc<EmittionVariable>),
}

pub(crate) struct FunctionEmitter<'s, 'a> {
    session: &'s mut EmissionSession<'a>,
    /// The user function that is emitted, if any
    function: Option<FunctionId>,
    scopes: ScopeArena,
    current: FunctionBuilder,
    /// Sub-function depth of `current`, the user function is at depth zero
    depth: usize,
    loops: Vec<LoopFrame>,
    next_loop: usize,
    temp_floor: usize,
    receiver: Option<Rc<EmittionVariable>>,
    parameter_prefix: Rc<str>,
    boundary: ReturnBoundary,
    /// Classes whose constructors are currently inlined
    inlining: Vec<ClassId>,
}

impl<'s, 'a> FunctionEmitter<'s, 'a> {
    pub fn new(
        session: &'s mut EmissionSession<'a>,
        ident: Rc<FunctionIdent>,
        local_prefix: Rc<str>,
        parameter_prefix: Rc<str>,
    ) -> Self {
        FunctionEmitter {
            session,
            function: None,
            scopes: ScopeArena::new(local_prefix),
            current: FunctionBuilder::new(ident),
            depth: 0,
            loops: Vec::new(),
            next_loop: 0,
            temp_floor: 0,
            receiver: None,
            parameter_prefix,
            boundary: ReturnBoundary {
                depth: 0,
                scope: ScopeId::ROOT,
            },
            inlining: Vec::new(),
        }
    }

    /// Creates the emitter of a user function, methods receive their instance as `this`
    pub fn for_function(session: &'s mut EmissionSession<'a>, id: FunctionId) -> EmitResult<Self> {
        let program = session.program;
        let function = program
            .function(id)
            .ok_or(EmitErrorKind::UnknownFunction(id.0))?;
        let names = session.functions.names(id)?.clone();

        let mut emitter = Self::new(
            session,
            names.ident,
            names.local_prefix,
            names.parameter_prefix,
        );
        emitter.function = Some(id);
        if let Some(class) = function.receiver_class() {
            let prefix = emitter.parameter_prefix.clone();
            emitter.receiver = Some(emitter.receiver_location(&prefix, class));
        }
        Ok(emitter)
    }

    pub fn finish(self) -> FunctionEmission {
        self.current.finish().0
    }

    pub(crate) fn program(&self) -> &'a BoundProgram {
        self.session.program
    }

    pub(crate) fn storage(&self) -> &StorageContext {
        &self.session.storage
    }

    pub(crate) fn storage_kind(&self, ty: &Type) -> StorageKind {
        self.session.program.storage_kind(ty)
    }

    pub(crate) fn push(&mut self, command: impl Into<MinecraftCommand>) {
        self.current.push(CommandNode::Command(command.into()));
    }

    /// Adds a comment in debug builds
    pub(crate) fn comment(&mut self, text: impl FnOnce() -> String) {
        if self.session.debug {
            self.current.push(CommandNode::comment(text()));
        }
    }

    /// The temporary with the given index, typed as requested
    pub(crate) fn temp(&mut self, index: usize, ty: &Type) -> Rc<EmittionVariable> {
        let name = format!("#tmp{index}");
        let storage = self.storage_kind(ty);
        self.scopes
            .lookup_or_declare(VariableRequest::scoped(&name, ty.clone(), storage))
    }

    /// A location that keeps its name at every depth
    pub(crate) fn verbatim(&mut self, name: &str, ty: &Type) -> Rc<EmittionVariable> {
        let storage = self.storage_kind(ty);
        self.scopes
            .lookup_or_declare(VariableRequest::verbatim(name, ty.clone(), storage))
    }

    fn receiver_location(&mut self, parameter_prefix: &str, class: ClassId) -> Rc<EmittionVariable> {
        self.verbatim(&format!("{parameter_prefix}.this"), &Type::Class(class))
    }

    /// The location a global field lives in
    pub(crate) fn global_location(
        &mut self,
        namespace: &str,
        name: &str,
        ty: &Type,
    ) -> Rc<EmittionVariable> {
        self.verbatim(&format!("{}.{name}", sanitize(namespace)), ty)
    }

    /// The reserved location `return` writes to
    fn return_location(&self, ty: &Type) -> Rc<EmittionVariable> {
        Rc::new(EmittionVariable::synthetic(
            StorageContext::RETURN,
            ty.clone(),
            self.storage_kind(ty),
        ))
    }

    /// A key of the macro argument compound
    pub(crate) fn macro_location(key: &str, ty: &Type) -> Rc<EmittionVariable> {
        Rc::new(EmittionVariable::synthetic(
            StorageContext::macro_key(key),
            ty.clone(),
            StorageKind::Tree,
        ))
    }

    /// Where macro functions leave their tree result
    pub(crate) fn macro_result(ty: &Type) -> Rc<EmittionVariable> {
        Self::macro_location("result", ty)
    }

    /// Where macro functions leave their integer result
    pub(crate) fn macro_register(ty: &Type) -> Rc<EmittionVariable> {
        Rc::new(EmittionVariable::synthetic(
            StorageContext::MACRO,
            ty.clone(),
            StorageKind::Register,
        ))
    }

    pub(crate) fn player(&self, variable: &EmittionVariable) -> EmitResult<ScoreboardPlayer> {
        match variable.storage {
            StorageKind::Register => Ok(self.storage().player(variable.target.clone())),
            StorageKind::Tree => Err(EmitErrorKind::StorageMismatch {
                symbol: variable.target.to_string(),
                expected: StorageKind::Register,
                actual: StorageKind::Tree,
            }
            .into()),
        }
    }

    pub(crate) fn path(&self, variable: &EmittionVariable) -> EmitResult<DataPath> {
        match variable.storage {
            StorageKind::Tree => Ok(self.storage().path(variable.target.clone())),
            StorageKind::Register => Err(EmitErrorKind::StorageMismatch {
                symbol: variable.target.to_string(),
                expected: StorageKind::Tree,
                actual: StorageKind::Register,
            }
            .into()),
        }
    }

    pub(crate) fn constant(&mut self, value: i32) -> ScoreboardPlayer {
        let name = self.session.constants.get_name(value);
        self.storage().player(name)
    }

    /// `score <variable> matches <value>`
    pub(crate) fn score_matches(
        &self,
        variable: &EmittionVariable,
        range: MinecraftRange,
    ) -> EmitResult<ExecuteCondition> {
        Ok(ExecuteCondition::Score {
            player: self.player(variable)?,
            range,
        })
    }

    /// Copies a value, bridging between registers and the tree where necessary
    pub(crate) fn copy(
        &mut self,
        dest: &EmittionVariable,
        source: &EmittionVariable,
    ) -> EmitResult<()> {
        if dest.aliases(source) {
            return Ok(());
        }

        let command = match (dest.storage, source.storage) {
            (StorageKind::Register, StorageKind::Register) => MinecraftCommand::score_operation(
                self.player(dest)?,
                ScoreboardOperation::Assign,
                self.player(source)?,
            ),
            (StorageKind::Tree, StorageKind::Tree) => {
                MinecraftCommand::data_set_from(self.path(dest)?, self.path(source)?)
            }
            (StorageKind::Tree, StorageKind::Register) => {
                return self.store_register(dest, source, nbt_type(&dest.ty));
            }
            (StorageKind::Register, StorageKind::Tree) => Execute::new()
                .with_store(StoreKind::Result, StoreTarget::Score(self.player(dest)?))
                .with_run(DataCommand::Get {
                    path: self.path(source)?,
                    scale: None,
                })
                .into(),
        };
        self.push(command);
        Ok(())
    }

    /// Writes a register into the tree as the given nbt type
    pub(crate) fn store_register(
        &mut self,
        dest: &EmittionVariable,
        source: &EmittionVariable,
        nbt_type: NbtType,
    ) -> EmitResult<()> {
        let command = Execute::new()
            .with_store(
                StoreKind::Result,
                StoreTarget::Data {
                    path: self.path(dest)?,
                    nbt_type,
                    scale: Param::Value(1.0),
                },
            )
            .with_run(ScoreboardCommand::Get(self.player(source)?));
        self.push(command);
        Ok(())
    }

    /// The integer a literal is stored as in a register
    pub(crate) fn register_literal(&self, value: &LiteralValue) -> EmitResult<Option<i32>> {
        Ok(match value {
            LiteralValue::Int(value) => Some(*value),
            LiteralValue::Bool(value) => Some(i32::from(*value)),
            LiteralValue::EnumMember {
                enumeration,
                member,
            } => {
                let symbol = self
                    .program()
                    .enumeration(*enumeration)
                    .ok_or(EmitErrorKind::UnknownEnum(enumeration.0))?;
                match (symbol.backing, symbol.members.get(*member)) {
                    (EnumBacking::Int, Some(member)) => Some(member.value),
                    (EnumBacking::Int, None) => {
                        return Err(EmitErrorKind::ExpectedConstant {
                            what: format!("member #{member} of enum '{}'", symbol.name),
                        }
                        .into())
                    }
                    (EnumBacking::String, _) => None,
                }
            }
            LiteralValue::Float(_) | LiteralValue::Double(_) | LiteralValue::String(_) => None,
        })
    }

    pub(crate) fn set_literal(
        &mut self,
        dest: &EmittionVariable,
        value: &LiteralValue,
    ) -> EmitResult<()> {
        let command = match dest.storage {
            StorageKind::Register => {
                let Some(value) = self.register_literal(value)? else {
                    return Err(EmitErrorKind::StorageMismatch {
                        symbol: format!("literal {value}"),
                        expected: StorageKind::Tree,
                        actual: StorageKind::Register,
                    }
                    .into());
                };
                MinecraftCommand::score_set(self.player(dest)?, value)
            }
            StorageKind::Tree => MinecraftCommand::data_set_value(
                self.path(dest)?,
                literal_snbt(self.program(), value)?,
            ),
        };
        self.push(command);
        Ok(())
    }

    /// Resets a variable to the value a fresh declaration of its type holds
    pub(crate) fn set_default(&mut self, dest: &EmittionVariable) -> EmitResult<()> {
        let command = match dest.storage {
            StorageKind::Register => {
                let value = match &dest.ty {
                    Type::Enum(id) => {
                        let symbol = self
                            .program()
                            .enumeration(*id)
                            .ok_or(EmitErrorKind::UnknownEnum(id.0))?;
                        symbol.members.first().map_or(0, |member| member.value)
                    }
                    _ => 0,
                };
                MinecraftCommand::score_set(self.player(dest)?, value)
            }
            StorageKind::Tree => MinecraftCommand::data_set_value(
                self.path(dest)?,
                default_snbt(self.program(), &dest.ty)?,
            ),
        };
        self.push(command);
        Ok(())
    }

    pub(crate) fn store_operand(
        &mut self,
        dest: &EmittionVariable,
        operand: &Operand,
    ) -> EmitResult<()> {
        match operand {
            Operand::Literal(value) => self.set_literal(dest, value),
            Operand::Location(source) => self.copy(dest, source),
        }
    }

    /// Literals and variables are used as they are, everything else is
    /// evaluated into the temporary `index`
    pub(crate) fn operand(
        &mut self,
        expression: &BoundExpression,
        index: usize,
    ) -> EmitResult<Operand> {
        Ok(match expression {
            BoundExpression::Literal(literal) => Operand::Literal(literal.value.clone()),
            BoundExpression::Variable(variable) => {
                Operand::Location(self.variable_location(&variable.variable)?)
            }
            _ => Operand::Location(self.evaluate_into_temp(expression, index)?),
        })
    }

    pub(crate) fn evaluate_into_temp(
        &mut self,
        expression: &BoundExpression,
        index: usize,
    ) -> EmitResult<Rc<EmittionVariable>> {
        let temp = self.temp(index, &expression.ty());
        self.emit_into(&temp, expression, index + 1)?;
        Ok(temp)
    }

    /// Makes the value available in a register.
    ///
    /// Register variables are read in place, everything else is evaluated into
    /// the temporary `index`. Returns the next free temporary index.
    pub(crate) fn register_operand(
        &mut self,
        expression: &BoundExpression,
        index: usize,
    ) -> EmitResult<(Rc<EmittionVariable>, usize)> {
        if let BoundExpression::Variable(variable) = expression {
            let location = self.variable_location(&variable.variable)?;
            if location.is_register() {
                return Ok((location, index));
            }
        }

        let ty = match expression.ty() {
            ty if self.storage_kind(&ty) == StorageKind::Register => ty,
            _ => Type::Int,
        };
        let temp = self.temp(index, &ty);
        self.emit_into(&temp, expression, index + 1)?;
        Ok((temp, index + 1))
    }

    /// Runs `emit` with a register that receives the result.
    ///
    /// That is `dest` itself if it is a register, otherwise a temporary that is
    /// copied into `dest` afterwards.
    pub(crate) fn with_register_work(
        &mut self,
        dest: &Rc<EmittionVariable>,
        ty: &Type,
        base: usize,
        emit: impl FnOnce(&mut Self, &Rc<EmittionVariable>, usize) -> EmitResult<()>,
    ) -> EmitResult<()> {
        if dest.is_register() {
            emit(self, dest, base)
        } else {
            let work = self.temp(base, ty);
            emit(self, &work, base + 1)?;
            self.copy(dest, &work)
        }
    }

    /// Writes an operand into the macro argument `key`
    pub(crate) fn stage(&mut self, key: &str, operand: &Operand, ty: &Type) -> EmitResult<()> {
        let location = Self::macro_location(key, ty);
        self.store_operand(&location, operand)
    }

    /// The command that calls a support function with the staged arguments
    pub(crate) fn macro_call(&mut self, function: MacroFunction) -> MinecraftCommand {
        let session = &mut *self.session;
        let ident = session
            .builtins
            .request(function, &session.storage, &mut session.constants);
        function.call(ident, &session.storage)
    }

    pub(crate) fn call_macro(&mut self, function: MacroFunction) {
        let command = self.macro_call(function);
        self.push(command);
    }

    /// Resets every temporary declared in one of `scopes`
    fn cleanup_scopes(&mut self, scopes: &[ScopeId]) -> EmitResult<()> {
        let mut commands = Vec::new();
        for scope in scopes {
            for variable in self.scopes.locals(*scope).filter(|var| var.is_temporary) {
                commands.push(match variable.storage {
                    StorageKind::Register => {
                        MinecraftCommand::score_reset(self.player(variable)?)
                    }
                    StorageKind::Tree => MinecraftCommand::data_remove(self.path(variable)?),
                });
            }
        }

        if !commands.is_empty() {
            self.comment(|| "cleanup".to_string());
        }
        for command in commands {
            self.push(command);
        }
        Ok(())
    }

    /// Emits `emit` into a new sub-function of the current function
    fn with_sub_function<T>(
        &mut self,
        kind: SubFunctionKind,
        emit: impl FnOnce(&mut Self) -> EmitResult<T>,
    ) -> EmitResult<(FunctionEmission, Exits, T)> {
        let builder = self.current.sub_function(kind);
        trace!("Fabricating sub-function {}", builder.ident);

        let parent = mem::replace(&mut self.current, builder);
        self.depth += 1;
        let result = emit(self);
        self.depth -= 1;
        let builder = mem::replace(&mut self.current, parent);

        let value = result?;
        let (emission, exits) = builder.finish();
        Ok((emission, exits, value))
    }

    /// Attaches a fabricated sub-function, calls it and forwards the ways it may exit
    fn call_sub_function(
        &mut self,
        function: FunctionEmission,
        exits: Exits,
        guard: Option<(bool, ExecuteCondition)>,
    ) -> EmitResult<()> {
        let call = MinecraftCommand::call(function.ident.clone());
        self.current.add_sub_function(function);

        match guard {
            Some((false, condition)) => self.push(Execute::new().with_if(condition).with_run(call)),
            Some((true, condition)) => {
                self.push(Execute::new().with_unless(condition).with_run(call));
            }
            None => self.push(call),
        }
        self.handle_exits(exits)
    }

    /// Checks the flags a called sub-function may have set
    fn handle_exits(&mut self, exits: Exits) -> EmitResult<()> {
        if exits.returns {
            let flag = self.storage().returned_flag();
            let returned = ExecuteCondition::Score {
                player: flag.clone(),
                range: MinecraftRange::equal(1),
            };
            let command = if self.depth == self.boundary.depth {
                MinecraftCommand::return_run(MinecraftCommand::score_reset(flag))
            } else {
                self.current.exits.returns = true;
                MinecraftCommand::return_value(0)
            };
            self.push(Execute::new().with_if(returned).with_run(command));
        }

        for id in exits.loops {
            let Some(index) = self.loops.iter().position(|frame| frame.id == id) else {
                return Err(EmitErrorKind::UnsupportedGoto {
                    label: format!("loop #{}", id.0),
                }
                .into());
            };
            let control = self.loop_control(index);

            if self.loops[index].depth == self.depth {
                self.push(
                    Execute::new()
                        .with_if(self.score_matches(&control, MinecraftRange::equal(1))?)
                        .with_run(MinecraftCommand::return_value(0)),
                );
                let restart = match self.loops[index].kind {
                    LoopKind::While => self.loops[index].ident.clone(),
                    LoopKind::DoWhile => self.loop_tail(index)?,
                };
                self.push(
                    Execute::new()
                        .with_if(self.score_matches(&control, MinecraftRange::equal(2))?)
                        .with_run(MinecraftCommand::return_run(MinecraftCommand::call(restart))),
                );
            } else {
                self.push(
                    Execute::new()
                        .with_if(self.score_matches(&control, MinecraftRange::at_least(1))?)
                        .with_run(MinecraftCommand::return_value(0)),
                );
                self.current.exits.add_loop(id);
            }
        }
        Ok(())
    }

    /// The control register of a loop, declared in the scope of the loop statement
    fn loop_control(&mut self, index: usize) -> Rc<EmittionVariable> {
        if let Some(control) = &self.loops[index].control {
            return control.clone();
        }

        let name = format!("#ctl{}", self.loops[index].id.0);
        let control = self.scopes.declare_in(
            self.loops[index].parent_scope,
            VariableRequest::scoped(&name, Type::Int, StorageKind::Register),
        );
        self.loops[index].control = Some(control.clone());
        control
    }

    /// The function that checks the condition of a do-while and restarts it.
    ///
    /// Must be requested while the loop function itself is emitted.
    fn loop_tail(&mut self, index: usize) -> EmitResult<Rc<FunctionIdent>> {
        if let Some(tail) = &self.loops[index].tail {
            return Ok(tail.clone());
        }

        let frame = &self.loops[index];
        let condition = frame.condition.clone();
        let condition_temp = frame.condition_temp.clone();
        let loop_ident = frame.ident.clone();
        let temp_floor = frame.temp_floor;

        let (tail, _, ()) = self.with_sub_function(SubFunctionKind::Misc, |this| {
            this.emit_into(&condition_temp, &condition, temp_floor + 1)?;
            this.push(
                Execute::new()
                    .with_if(this.score_matches(&condition_temp, MinecraftRange::equal(1))?)
                    .with_run(MinecraftCommand::call(loop_ident)),
            );
            Ok(())
        })?;

        let ident = tail.ident.clone();
        self.current.add_sub_function(tail);
        self.loops[index].tail = Some(ident.clone());
        Ok(ident)
    }
}

/// The nbt type a register value is stored as in a location of this type
pub(crate) fn nbt_type(ty: &Type) -> NbtType {
    match ty {
        Type::Bool => NbtType::Byte,
        Type::Float => NbtType::Float,
        Type::Double => NbtType::Double,
        _ => NbtType::Int,
    }
}
