use std::{mem, rc::Rc};

use cinder_bound::{
    BoundArrayCreationExpression, BoundCallExpression, BoundExpression,
    BoundObjectCreationExpression, Callee, FunctionId, FunctionKind, Type, VariableSymbol,
};
use cinder_error::{emit_unsupported, EmitErrorKind, EmitResult};
use log::trace;

use crate::common::{
    DataModifyOperation, DataModifySource, DataCommand, Execute, MinecraftCommand,
    MinecraftRange, ScoreboardCommand,
};

use super::{
    access::{is_place, Place},
    default_snbt, repeated_list,
    statements::contains_return,
    EmittionVariable, FunctionEmitter, Operand, ReturnBoundary, SubFunctionKind,
};

/// One dimension of an array creation
enum Dimension {
    Fixed(usize),
    /// The temporary holding the runtime length
    Dynamic(Rc<EmittionVariable>),
}

/// The element every slot of one array level starts out as
enum Inner {
    Value(String),
    Location(Rc<EmittionVariable>),
}

impl FunctionEmitter<'_, '_> {
    pub(crate) fn emit_call(
        &mut self,
        call: &BoundCallExpression,
        dest: Option<&Rc<EmittionVariable>>,
        base: usize,
    ) -> EmitResult<()> {
        match call.callee {
            Callee::Builtin(builtin) => self.emit_builtin(builtin, &call.arguments, dest, base),
            Callee::User(id) => self.emit_user_call(id, call, dest, base),
        }
    }

    /// Evaluates call arguments that could change while the parameters are staged
    fn call_operands(
        &mut self,
        arguments: &[BoundExpression],
        recursive: bool,
        base: usize,
    ) -> EmitResult<(Vec<Operand>, usize)> {
        let mut next = base;
        let mut operands = Vec::with_capacity(arguments.len());
        for argument in arguments {
            let stable = match argument {
                BoundExpression::Literal(_) => true,
                BoundExpression::Variable(variable) => !recursive
                    || matches!(
                        variable.variable,
                        VariableSymbol::Local { .. } | VariableSymbol::Global { .. }
                    ),
                _ => false,
            };
            if stable {
                operands.push(self.operand(argument, next)?);
            } else {
                operands.push(Operand::Location(self.evaluate_into_temp(argument, next)?));
                next += 1;
            }
        }
        Ok((operands, next))
    }

    /// Writes the arguments into the parameter locations of the callee
    fn stage_parameters(&mut self, callee: FunctionId, operands: &[Operand]) -> EmitResult<()> {
        let program = self.program();
        let function = program
            .function(callee)
            .ok_or(EmitErrorKind::UnknownFunction(callee.0))?;
        let prefix = self.session.functions.names(callee)?.parameter_prefix.clone();

        for (parameter, operand) in function.parameters.iter().zip(operands) {
            let location = self.verbatim(&format!("{prefix}.{}", parameter.name), &parameter.ty);
            self.store_operand(&location, operand)?;
        }
        Ok(())
    }

    fn emit_user_call(
        &mut self,
        id: FunctionId,
        call: &BoundCallExpression,
        dest: Option<&Rc<EmittionVariable>>,
        base: usize,
    ) -> EmitResult<()> {
        let program = self.program();
        let function = program
            .function(id)
            .ok_or(EmitErrorKind::UnknownFunction(id.0))?;
        if let FunctionKind::Constructor(_) = function.kind {
            emit_unsupported!("call", format!("constructor '{}'", function.name));
        }
        if function.parameters.len() != call.arguments.len() {
            emit_unsupported!(
                "call",
                format!(
                    "'{}' with {} arguments, expected {}",
                    function.name,
                    call.arguments.len(),
                    function.parameters.len()
                )
            );
        }

        let names = self.session.functions.names(id)?.clone();
        let (operands, mut next) =
            self.call_operands(&call.arguments, self.function == Some(id), base)?;

        let receiver = match (function.receiver_class(), call.receiver.as_deref()) {
            (None, _) => None,
            (Some(class), Some(receiver)) if is_place(receiver) => {
                let (place, after) = self.resolve_place(receiver, next)?;
                next = after;
                match place {
                    Place::Static(location) => Some((class, location.clone(), Some(location))),
                    Place::Dynamic { .. } => {
                        let temp = self.temp(next, &receiver.ty());
                        self.read_place(&temp, &place)?;
                        Some((class, temp, None))
                    }
                }
            }
            (Some(class), Some(receiver)) => {
                let temp = self.evaluate_into_temp(receiver, next)?;
                Some((class, temp, None))
            }
            (Some(class), None) => {
                let this = self.receiver.clone().ok_or(EmitErrorKind::MissingReceiver)?;
                Some((class, this.clone(), Some(this)))
            }
        };

        self.stage_parameters(id, &operands)?;
        let this = match &receiver {
            Some((class, location, _)) => {
                let this = self.receiver_location(&names.parameter_prefix, *class);
                self.copy(&this, location)?;
                Some(this)
            }
            None => None,
        };

        self.push(MinecraftCommand::call(names.ident.clone()));

        if let (Some(this), Some((_, _, Some(write_back)))) = (&this, &receiver) {
            self.copy(write_back, this)?;
        }
        match dest {
            Some(dest) if function.return_type != Type::Void => {
                let result = self.return_location(&function.return_type);
                self.copy(dest, &result)
            }
            _ => Ok(()),
        }
    }

    /// Inlines the constructor with `dest` as the receiver
    pub(crate) fn emit_object_creation(
        &mut self,
        dest: &Rc<EmittionVariable>,
        creation: &BoundObjectCreationExpression,
        base: usize,
    ) -> EmitResult<()> {
        let program = self.program();
        let class = program
            .class(creation.class)
            .ok_or(EmitErrorKind::UnknownClass(creation.class.0))?;
        if self.inlining.contains(&creation.class) {
            emit_unsupported!("new", format!("recursive construction of '{}'", class.name));
        }

        let Some(constructor) = class.constructor else {
            if !creation.arguments.is_empty() {
                emit_unsupported!("new", format!("'{}' with arguments but no constructor", class.name));
            }
            return self.set_default(dest);
        };
        let function = program
            .function(constructor)
            .ok_or(EmitErrorKind::UnknownFunction(constructor.0))?;
        if function.parameters.len() != creation.arguments.len() {
            emit_unsupported!(
                "new",
                format!(
                    "'{}' with {} arguments, expected {}",
                    class.name,
                    creation.arguments.len(),
                    function.parameters.len()
                )
            );
        }

        let (operands, next) = self.call_operands(&creation.arguments, true, base)?;
        self.stage_parameters(constructor, &operands)?;
        self.push(MinecraftCommand::data_set_value(
            self.path(dest)?,
            default_snbt(program, &Type::Class(creation.class))?,
        ));
        trace!("Inlining constructor of {}", class.name);

        let parameter_prefix = self.session.functions.names(constructor)?.parameter_prefix.clone();
        let saved_receiver = self.receiver.replace(dest.clone());
        let saved_prefix = mem::replace(&mut self.parameter_prefix, parameter_prefix);
        let saved_floor = mem::replace(&mut self.temp_floor, next);
        let saved_loops = mem::take(&mut self.loops);
        let saved_boundary = self.boundary;
        self.inlining.push(creation.class);

        let result = if contains_return(&function.body) {
            self.with_sub_function(SubFunctionKind::Misc, |this| {
                let scope = this.scopes.push();
                this.boundary = ReturnBoundary {
                    depth: this.depth,
                    scope,
                };
                let terminated = this.emit_statements(&function.body.statements);
                let terminated = match terminated {
                    Ok(false) => this.cleanup_scopes(&[scope]).map(|()| false),
                    other => other,
                };
                this.scopes.pop();
                terminated
            })
            .map(Some)
        } else {
            self.emit_block(&function.body).map(|_| None)
        };

        self.inlining.pop();
        self.boundary = saved_boundary;
        self.loops = saved_loops;
        self.temp_floor = saved_floor;
        self.parameter_prefix = saved_prefix;
        self.receiver = saved_receiver;

        if let Some((function, exits, _)) = result? {
            self.call_sub_function(function, exits, None)?;
        }
        Ok(())
    }

    /// Builds the array from the innermost dimension outwards
    pub(crate) fn emit_array_creation(
        &mut self,
        dest: &Rc<EmittionVariable>,
        creation: &BoundArrayCreationExpression,
        base: usize,
    ) -> EmitResult<()> {
        let mut next = base;
        let mut dimensions = Vec::with_capacity(creation.dimensions.len());
        for dimension in &creation.dimensions {
            dimensions.push(match dimension.as_int_literal() {
                Some(length) => Dimension::Fixed(usize::try_from(length).unwrap_or(0)),
                None => {
                    let length = self.evaluate_into_temp(dimension, next)?;
                    next += 1;
                    Dimension::Dynamic(length)
                }
            });
        }

        let element = default_snbt(self.program(), &creation.element)?;
        self.build_array_level(dest, &creation.element, &dimensions, element, next)
    }

    fn build_array_level(
        &mut self,
        dest: &Rc<EmittionVariable>,
        element_ty: &Type,
        dimensions: &[Dimension],
        element: String,
        base: usize,
    ) -> EmitResult<()> {
        let Some((outer, rest)) = dimensions.split_first() else {
            return Ok(());
        };

        let (inner, base) = match fold_fixed(rest, &element) {
            Some(value) => (Inner::Value(value), base),
            None => {
                let ty = rest
                    .iter()
                    .fold(element_ty.clone(), |ty, _| Type::array_of(ty));
                let temp = self.temp(base, &ty);
                self.build_array_level(&temp, element_ty, rest, element, base + 1)?;
                (Inner::Location(temp), base + 1)
            }
        };

        let counter = match (outer, &inner) {
            (Dimension::Fixed(length), Inner::Value(value)) => {
                self.push(MinecraftCommand::data_set_value(
                    self.path(dest)?,
                    repeated_list(value, *length),
                ));
                return Ok(());
            }
            (Dimension::Fixed(length), Inner::Location(_)) => {
                let counter = self.temp(base, &Type::Int);
                self.push(MinecraftCommand::score_set(
                    self.player(&counter)?,
                    i32::try_from(*length).unwrap_or(i32::MAX),
                ));
                counter
            }
            (Dimension::Dynamic(length), _) => {
                let counter = self.temp(base, &Type::Int);
                self.copy(&counter, length)?;
                counter
            }
        };

        self.push(MinecraftCommand::data_set_value(self.path(dest)?, "[]"));
        let source = match &inner {
            Inner::Value(value) => DataModifySource::Value(value.as_str().into()),
            Inner::Location(location) => DataModifySource::From(self.path(location)?),
        };
        let (function, exits, ()) = self.with_sub_function(SubFunctionKind::Loop, |this| {
            this.push(
                Execute::new()
                    .with_unless(this.score_matches(&counter, MinecraftRange::at_least(1))?)
                    .with_run(MinecraftCommand::return_value(0)),
            );
            this.push(DataCommand::Modify {
                target: this.path(dest)?,
                operation: DataModifyOperation::Append,
                source,
            });
            this.push(ScoreboardCommand::Remove {
                player: this.player(&counter)?,
                value: 1,
            });
            this.push(MinecraftCommand::call(this.current.ident.clone()));
            Ok(())
        })?;
        self.call_sub_function(function, exits, None)
    }
}

/// The snbt of an array level whose dimensions are all known, if they are
fn fold_fixed(dimensions: &[Dimension], element: &str) -> Option<String> {
    dimensions
        .iter()
        .rev()
        .try_fold(element.to_string(), |value, dimension| match dimension {
            Dimension::Fixed(length) => Some(repeated_list(&value, *length)),
            Dimension::Dynamic(_) => None,
        })
}

#[cfg(test)]
mod tests {
    use cinder_bound::{
        BoundBlock, BoundExpression, BoundFunction, BoundProgram, BoundStatement, ClassSymbol,
        FieldSymbol, FunctionKind, ParameterSymbol, Type,
    };

    use crate::datapack::emitter::tests::{emit_main, emit_program, lines};

    #[test]
    fn test_fixed_array_folds() {
        let program = emit_main(
            Type::Void,
            vec![BoundStatement::declare(
                "grid",
                Type::array_of(Type::array_of(Type::Int)),
                Some(BoundExpression::new_array(
                    Type::Int,
                    vec![BoundExpression::int(2), BoundExpression::int(3)],
                )),
            )],
        );
        assert_eq!(
            lines(&program, "demo:main"),
            vec!["data modify storage demo:vars demo/main.grid set value [[0,0,0],[0,0,0]]"]
        );
    }

    #[test]
    fn test_dynamic_array_loops_once() {
        let program = emit_main(
            Type::Void,
            vec![
                BoundStatement::declare("n", Type::Int, Some(BoundExpression::int(4))),
                BoundStatement::declare(
                    "a",
                    Type::array_of(Type::Int),
                    Some(BoundExpression::new_array(
                        Type::Int,
                        vec![BoundExpression::local("n", Type::Int)],
                    )),
                ),
            ],
        );
        assert_eq!(
            lines(&program, "demo:main_sl0"),
            vec![
                "execute unless score demo/main.#tmp1 cinder matches 1.. run return 0",
                "data modify storage demo:vars demo/main.a append value 0",
                "scoreboard players remove demo/main.#tmp1 cinder 1",
                "function demo:main_sl0",
            ]
        );
        assert!(program.find("demo:main_sl1").is_none());
    }

    #[test]
    fn test_method_call_writes_receiver_back() {
        let mut program = BoundProgram::new();
        let ns = program.add_namespace("demo");
        let class = program.add_class(ClassSymbol {
            name: "Counter".into(),
            namespace: ns,
            fields: vec![FieldSymbol {
                name: "count".into(),
                ty: Type::Int,
            }],
            constructor: None,
        });
        let increment = program.add_function(
            BoundFunction::new(
                ns,
                "increment",
                vec![ParameterSymbol::new("by", Type::Int)],
                Type::Void,
                BoundBlock::new(vec![BoundStatement::assign(
                    BoundExpression::field(BoundExpression::this(class), "count", Type::Int),
                    BoundExpression::parameter("by", Type::Int),
                )]),
            )
            .with_kind(FunctionKind::Method(class)),
        );
        program.add_function(BoundFunction::new(
            ns,
            "main",
            vec![],
            Type::Void,
            BoundBlock::new(vec![
                BoundStatement::declare(
                    "c",
                    Type::Class(class),
                    Some(BoundExpression::new_object(class, vec![])),
                ),
                BoundStatement::expression(BoundExpression::method_call(
                    increment,
                    BoundExpression::local("c", Type::Class(class)),
                    vec![BoundExpression::int(2)],
                    Type::Void,
                )),
            ]),
        ));

        let emission = emit_program(&program);
        let main = lines(&emission, "demo:main");
        assert_eq!(main[0], "data modify storage demo:vars demo/main.c set value {count:0}");
        assert!(main[1].starts_with("scoreboard players set p"));
        assert!(main[1].ends_with(".by cinder 2"));
        assert!(main[2].ends_with(" set from storage demo:vars demo/main.c"));
        assert_eq!(main[3], "function demo:counter/increment");
        assert!(main[4].starts_with("data modify storage demo:vars demo/main.c set from storage demo:vars p"));
    }
}
