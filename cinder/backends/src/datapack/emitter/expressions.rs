use std::rc::Rc;

use cinder_bound::{
    BinaryOperator, BoundBinaryExpression, BoundExpression, BoundUnaryExpression, Type,
    UnaryOperator, VariableSymbol,
};
use cinder_common::StorageKind;
use cinder_error::{emit_unsupported, EmitErrorKind, EmitResult};

use crate::common::{
    DataCommand, DataModifyOperation, DataModifySource, Execute, ExecuteCondition,
    MinecraftCommand, MinecraftRange, ScoreboardCommand, ScoreboardComparison,
    ScoreboardOperation, StoreKind, StoreTarget,
};

use super::{
    literal_snbt, EmittionVariable, FunctionEmitter, MacroFunction, Operand,
    VariableRequest,
};

impl FunctionEmitter<'_, '_> {
    /// The location a variable symbol refers to
    pub(crate) fn variable_location(
        &mut self,
        variable: &VariableSymbol,
    ) -> EmitResult<Rc<EmittionVariable>> {
        Ok(match variable {
            VariableSymbol::Local { name, ty } => {
                let storage = self.storage_kind(ty);
                self.scopes
                    .lookup_or_declare(VariableRequest::local(name, ty.clone(), storage))
            }
            VariableSymbol::Parameter { name, ty } => {
                let name = format!("{}.{name}", self.parameter_prefix);
                self.verbatim(&name, ty)
            }
            VariableSymbol::Global {
                namespace,
                name,
                ty,
            } => {
                let namespace = self
                    .program()
                    .namespace(*namespace)
                    .ok_or(EmitErrorKind::UnknownNamespace(namespace.0))?;
                self.global_location(&namespace.name, name, ty)
            }
            VariableSymbol::This { .. } => self
                .receiver
                .clone()
                .ok_or(EmitErrorKind::MissingReceiver)?,
        })
    }

    /// Writes the value of `expression` into `dest`.
    ///
    /// Temporaries with an index below `base` are never touched.
    pub(crate) fn emit_into(
        &mut self,
        dest: &Rc<EmittionVariable>,
        expression: &BoundExpression,
        base: usize,
    ) -> EmitResult<()> {
        match expression {
            BoundExpression::Literal(literal) => self.set_literal(dest, &literal.value),
            BoundExpression::Variable(variable) => {
                let source = self.variable_location(&variable.variable)?;
                self.copy(dest, &source)
            }
            BoundExpression::Unary(unary) => self.emit_unary(dest, unary, base),
            BoundExpression::Binary(binary) => self.emit_binary(dest, binary, base),
            BoundExpression::Call(call) => self.emit_call(call, Some(dest), base),
            BoundExpression::Conversion(conversion) => {
                self.emit_conversion(dest, conversion, base)
            }
            BoundExpression::ObjectCreation(creation) => {
                self.emit_object_creation(dest, creation, base)
            }
            BoundExpression::ArrayCreation(creation) => {
                self.emit_array_creation(dest, creation, base)
            }
            BoundExpression::FieldAccess(_) | BoundExpression::ArrayAccess(_) => {
                let (place, _) = self.resolve_place(expression, base)?;
                self.read_place(dest, &place)
            }
            BoundExpression::Assignment(assignment) => {
                self.emit_assignment(assignment, Some(dest), base)
            }
        }
    }

    /// Like [`Self::register_operand`], but never returns `work` itself
    fn detached_register(
        &mut self,
        expression: &BoundExpression,
        index: usize,
        work: &EmittionVariable,
    ) -> EmitResult<(Rc<EmittionVariable>, usize)> {
        let (operand, next) = self.register_operand(expression, index)?;
        if operand.aliases(work) {
            let copy = self.temp(next, &operand.ty);
            self.copy(&copy, &operand)?;
            return Ok((copy, next + 1));
        }
        Ok((operand, next))
    }

    fn emit_unary(
        &mut self,
        dest: &Rc<EmittionVariable>,
        unary: &BoundUnaryExpression,
        base: usize,
    ) -> EmitResult<()> {
        match unary.operator {
            UnaryOperator::Identity => self.emit_into(dest, &unary.operand, base),
            UnaryOperator::Negation if unary.ty.is_floating() => {
                self.emit_float_negation(dest, &unary.operand, &unary.ty, base)
            }
            UnaryOperator::Negation => {
                if self.storage_kind(&unary.ty) != StorageKind::Register {
                    emit_unsupported!("-", unary.ty);
                }
                self.with_register_work(dest, &unary.ty, base, |this, work, base| {
                    this.emit_into(work, &unary.operand, base)?;
                    let minus_one = this.constant(-1);
                    this.push(MinecraftCommand::score_operation(
                        this.player(work)?,
                        ScoreboardOperation::Times,
                        minus_one,
                    ));
                    Ok(())
                })
            }
            UnaryOperator::LogicalNegation => {
                self.with_register_work(dest, &Type::Bool, base, |this, work, base| {
                    let (operand, _) = this.detached_register(&unary.operand, base, work)?;
                    let is_true = this.score_matches(&operand, MinecraftRange::equal(1))?;
                    let player = this.player(work)?;
                    this.push(
                        Execute::new()
                            .with_if(is_true.clone())
                            .with_run(MinecraftCommand::score_set(player.clone(), 0)),
                    );
                    this.push(
                        Execute::new()
                            .with_unless(is_true)
                            .with_run(MinecraftCommand::score_set(player, 1)),
                    );
                    Ok(())
                })
            }
        }
    }

    fn emit_binary(
        &mut self,
        dest: &Rc<EmittionVariable>,
        binary: &BoundBinaryExpression,
        base: usize,
    ) -> EmitResult<()> {
        let operand_ty = binary.left.ty();
        let operand_storage = self.storage_kind(&operand_ty);

        match binary.operator {
            BinaryOperator::LogicalAnd | BinaryOperator::LogicalOr => {
                self.emit_logical(dest, binary, base)
            }
            BinaryOperator::Equal | BinaryOperator::NotEqual
                if operand_storage == StorageKind::Tree =>
            {
                self.emit_structural_equality(dest, binary, base)
            }
            operator if operator.is_comparison() && operand_ty.is_floating() => {
                self.emit_float_comparison(dest, binary, base)
            }
            operator if operator.is_comparison() && operand_storage == StorageKind::Register => {
                self.emit_int_comparison(dest, binary, base)
            }
            BinaryOperator::Add if operand_ty == Type::String => {
                self.emit_string_concat(dest, binary, base)
            }
            operator if !operator.is_comparison() && operand_ty.is_floating() => {
                self.emit_float_arithmetic(dest, binary, base)
            }
            operator if !operator.is_comparison() && operand_storage == StorageKind::Register => {
                self.emit_int_arithmetic(dest, binary, base)
            }
            operator => emit_unsupported!(operator, operand_ty),
        }
    }

    /// The register value of a literal right operand, if it has one
    fn register_literal_of(&self, expression: &BoundExpression) -> EmitResult<Option<i32>> {
        match expression.as_literal() {
            Some(literal) => self.register_literal(literal),
            None => Ok(None),
        }
    }

    fn emit_int_arithmetic(
        &mut self,
        dest: &Rc<EmittionVariable>,
        binary: &BoundBinaryExpression,
        base: usize,
    ) -> EmitResult<()> {
        let operation = match binary.operator {
            BinaryOperator::Add => ScoreboardOperation::Plus,
            BinaryOperator::Sub => ScoreboardOperation::Minus,
            BinaryOperator::Mul => ScoreboardOperation::Times,
            BinaryOperator::Div => ScoreboardOperation::Divide,
            BinaryOperator::Mod => ScoreboardOperation::Modulo,
            operator => emit_unsupported!(operator, binary.ty),
        };
        let literal = self.register_literal_of(&binary.right)?;

        self.with_register_work(dest, &binary.ty, base, |this, work, base| {
            if let Some(value) = literal {
                this.emit_into(work, &binary.left, base)?;
                let player = this.player(work)?;
                let delta = match operation {
                    ScoreboardOperation::Plus => Some(value),
                    ScoreboardOperation::Minus => value.checked_neg(),
                    _ => None,
                };
                let command = match delta {
                    Some(delta) if delta >= 0 => ScoreboardCommand::Add {
                        player,
                        value: delta,
                    }
                    .into(),
                    Some(delta) if delta != i32::MIN => ScoreboardCommand::Remove {
                        player,
                        value: -delta,
                    }
                    .into(),
                    _ => MinecraftCommand::score_operation(player, operation, this.constant(value)),
                };
                this.push(command);
                return Ok(());
            }

            let right = if binary.right.is_trivial() {
                let (right, _) = this.detached_register(&binary.right, base, work)?;
                this.emit_into(work, &binary.left, base + 2)?;
                right
            } else {
                let left = this.evaluate_into_temp(&binary.left, base)?;
                let right = this.evaluate_into_temp(&binary.right, base + 1)?;
                this.copy(work, &left)?;
                right
            };
            this.push(MinecraftCommand::score_operation(
                this.player(work)?,
                operation,
                this.player(&right)?,
            ));
            Ok(())
        })
    }

    fn emit_int_comparison(
        &mut self,
        dest: &Rc<EmittionVariable>,
        binary: &BoundBinaryExpression,
        base: usize,
    ) -> EmitResult<()> {
        let comparison = match binary.operator {
            BinaryOperator::Equal | BinaryOperator::NotEqual => ScoreboardComparison::Equal,
            BinaryOperator::Less => ScoreboardComparison::Less,
            BinaryOperator::LessOrEqual => ScoreboardComparison::LessOrEqual,
            BinaryOperator::Greater => ScoreboardComparison::Greater,
            BinaryOperator::GreaterOrEqual => ScoreboardComparison::GreaterOrEqual,
            operator => emit_unsupported!(operator, binary.left.ty()),
        };
        let inverted = binary.operator == BinaryOperator::NotEqual;
        let range = self
            .register_literal_of(&binary.right)?
            .and_then(|value| comparison.range_for(value));

        self.with_register_work(dest, &Type::Bool, base, |this, work, base| {
            let condition = if let Some(range) = range {
                let (left, _) = this.register_operand(&binary.left, base)?;
                this.score_matches(&left, range)?
            } else if binary.right.is_trivial() {
                let (left, next) = this.register_operand(&binary.left, base)?;
                let (right, _) = this.register_operand(&binary.right, next)?;
                ExecuteCondition::ScoreRelation {
                    lhs: this.player(&left)?,
                    comparison,
                    rhs: this.player(&right)?,
                }
            } else {
                let left = this.evaluate_into_temp(&binary.left, base)?;
                let (right, _) = this.register_operand(&binary.right, base + 1)?;
                ExecuteCondition::ScoreRelation {
                    lhs: this.player(&left)?,
                    comparison,
                    rhs: this.player(&right)?,
                }
            };

            let store = Execute::new().with_store(StoreKind::Success, StoreTarget::Score(this.player(work)?));
            this.push(if inverted {
                store.with_unless(condition)
            } else {
                store.with_if(condition)
            });
            Ok(())
        })
    }

    /// Compares tree values by trying to overwrite a copy of the left value with the right one
    fn emit_structural_equality(
        &mut self,
        dest: &Rc<EmittionVariable>,
        binary: &BoundBinaryExpression,
        base: usize,
    ) -> EmitResult<()> {
        let ty = binary.left.ty();
        let equal = binary.operator == BinaryOperator::Equal;

        self.with_register_work(dest, &Type::Bool, base, |this, work, base| {
            let probe = this.temp(base, &ty);
            this.emit_into(&probe, &binary.left, base + 1)?;
            let source = match this.operand(&binary.right, base + 1)? {
                Operand::Literal(value) => {
                    DataModifySource::Value(literal_snbt(this.program(), &value)?.into())
                }
                Operand::Location(location) => DataModifySource::From(this.path(&location)?),
            };

            let player = this.player(work)?;
            this.push(
                Execute::new()
                    .with_store(StoreKind::Success, StoreTarget::Score(player.clone()))
                    .with_run(DataCommand::Modify {
                        target: this.path(&probe)?,
                        operation: DataModifyOperation::Set,
                        source,
                    }),
            );
            if equal {
                this.push(
                    Execute::new()
                        .with_store(StoreKind::Success, StoreTarget::Score(player.clone()))
                        .with_if(ExecuteCondition::Score {
                            player,
                            range: MinecraftRange::equal(0),
                        }),
                );
            }
            Ok(())
        })
    }

    /// Both operands are always evaluated
    fn emit_logical(
        &mut self,
        dest: &Rc<EmittionVariable>,
        binary: &BoundBinaryExpression,
        base: usize,
    ) -> EmitResult<()> {
        self.with_register_work(dest, &Type::Bool, base, |this, work, base| {
            let left = this.evaluate_into_temp(&binary.left, base)?;
            let right = this.evaluate_into_temp(&binary.right, base + 1)?;
            let player = this.player(work)?;
            let left = this.score_matches(&left, MinecraftRange::equal(1))?;
            let right = this.score_matches(&right, MinecraftRange::equal(1))?;

            this.push(MinecraftCommand::score_set(player.clone(), 0));
            if binary.operator == BinaryOperator::LogicalAnd {
                this.push(
                    Execute::new()
                        .with_if(left)
                        .with_if(right)
                        .with_run(MinecraftCommand::score_set(player, 1)),
                );
            } else {
                this.push(
                    Execute::new()
                        .with_if(left)
                        .with_run(MinecraftCommand::score_set(player.clone(), 1)),
                );
                this.push(
                    Execute::new()
                        .with_if(right)
                        .with_run(MinecraftCommand::score_set(player, 1)),
                );
            }
            Ok(())
        })
    }

    fn emit_string_concat(
        &mut self,
        dest: &Rc<EmittionVariable>,
        binary: &BoundBinaryExpression,
        base: usize,
    ) -> EmitResult<()> {
        let left = self.operand(&binary.left, base)?;
        let right = self.operand(&binary.right, base + 1)?;
        self.stage("a", &left, &Type::String)?;
        self.stage("b", &right, &Type::String)?;
        self.call_macro(MacroFunction::StringConcat);
        self.copy(dest, &Self::macro_result(&Type::String))
    }
}

#[cfg(test)]
mod tests {
    use cinder_bound::{BinaryOperator, BoundExpression, BoundStatement, Type};

    use crate::datapack::emitter::tests::{emit_main, lines};

    #[test]
    fn test_literal_addition_is_in_place() {
        let program = emit_main(
            Type::Void,
            vec![
                BoundStatement::declare("x", Type::Int, Some(BoundExpression::int(1))),
                BoundStatement::assign(
                    BoundExpression::local("x", Type::Int),
                    BoundExpression::binary(
                        BoundExpression::local("x", Type::Int),
                        BinaryOperator::Sub,
                        BoundExpression::int(4),
                    ),
                ),
            ],
        );
        assert_eq!(
            lines(&program, "demo:main"),
            vec![
                "scoreboard players set demo/main.x cinder 1",
                "scoreboard players remove demo/main.x cinder 4",
            ]
        );
    }

    #[test]
    fn test_self_referencing_operand_is_copied() {
        let x = || BoundExpression::local("x", Type::Int);
        let program = emit_main(
            Type::Void,
            vec![
                BoundStatement::declare("x", Type::Int, Some(BoundExpression::int(2))),
                BoundStatement::declare("y", Type::Int, Some(BoundExpression::int(3))),
                BoundStatement::assign(
                    x(),
                    BoundExpression::binary(
                        BoundExpression::local("y", Type::Int),
                        BinaryOperator::Sub,
                        x(),
                    ),
                ),
            ],
        );
        let lines = lines(&program, "demo:main");
        assert_eq!(
            &lines[2..5],
            [
                "scoreboard players operation demo/main.#tmp0 cinder = demo/main.x cinder",
                "scoreboard players operation demo/main.x cinder = demo/main.y cinder",
                "scoreboard players operation demo/main.x cinder -= demo/main.#tmp0 cinder",
            ]
        );
    }

    #[test]
    fn test_comparison_with_literal_uses_range() {
        let program = emit_main(
            Type::Bool,
            vec![
                BoundStatement::declare("x", Type::Int, Some(BoundExpression::int(5))),
                BoundStatement::ret(Some(BoundExpression::binary(
                    BoundExpression::local("x", Type::Int),
                    BinaryOperator::Less,
                    BoundExpression::int(10),
                ))),
            ],
        );
        let lines = lines(&program, "demo:main");
        assert_eq!(
            lines[1],
            "execute store success score #return cinder if score demo/main.x cinder matches ..9"
        );
        assert_eq!(lines[2], "return run scoreboard players get #return cinder");
    }

    #[test]
    fn test_logical_operators_do_not_short_circuit() {
        let program = emit_main(
            Type::Bool,
            vec![BoundStatement::ret(Some(BoundExpression::binary(
                BoundExpression::bool(false),
                BinaryOperator::LogicalAnd,
                BoundExpression::bool(true),
            )))],
        );
        let lines = lines(&program, "demo:main");
        assert_eq!(
            &lines[..4],
            [
                "scoreboard players set demo/main.#tmp0 cinder 0",
                "scoreboard players set demo/main.#tmp1 cinder 1",
                "scoreboard players set #return cinder 0",
                "execute if score demo/main.#tmp0 cinder matches 1 if score demo/main.#tmp1 cinder matches 1 run scoreboard players set #return cinder 1",
            ]
        );
    }

    #[test]
    fn test_string_equality_uses_probe() {
        let program = emit_main(
            Type::Bool,
            vec![
                BoundStatement::declare("s", Type::String, Some(BoundExpression::string("a"))),
                BoundStatement::ret(Some(BoundExpression::binary(
                    BoundExpression::local("s", Type::String),
                    BinaryOperator::Equal,
                    BoundExpression::string("b"),
                ))),
            ],
        );
        let lines = lines(&program, "demo:main");
        assert_eq!(
            &lines[1..4],
            [
                "data modify storage demo:vars demo/main.#tmp0 set from storage demo:vars demo/main.s",
                "execute store success score #return cinder run data modify storage demo:vars demo/main.#tmp0 set value \"b\"",
                "execute store success score #return cinder if score #return cinder matches 0",
            ]
        );
    }
}
