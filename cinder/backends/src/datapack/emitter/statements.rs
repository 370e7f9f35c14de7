use std::rc::Rc;

use cinder_bound::{
    BoundBlock, BoundConditionalGotoStatement, BoundExpression, BoundStatement,
    BoundVariableDeclaration, LabelSymbol, Type, VariableSymbol,
};
use cinder_error::{emit_bail, EmitErrorKind, EmitResult};

use crate::common::{CommandNode, Execute, MinecraftCommand, MinecraftRange, ScoreboardCommand};

use super::{
    EmittionVariable, FunctionEmitter, LoopFrame, LoopKind, LoopId, ScopeId, SubFunctionKind,
    VariableRequest,
};

impl FunctionEmitter<'_, '_> {
    /// Emits the body of a function into its root scope
    pub fn emit_body(&mut self, body: &BoundBlock) -> EmitResult<()> {
        let terminated = self.emit_statements(&body.statements)?;
        if !terminated {
            self.cleanup_scopes(&[ScopeId::ROOT])?;
        }
        Ok(())
    }

    /// Initializes every global field of the program, in declaration order
    pub fn emit_globals(&mut self) -> EmitResult<()> {
        let program = self.program();
        for (_, namespace) in program.namespaces() {
            for field in &namespace.fields {
                self.comment(|| format!("{}.{}", namespace.name, field.name));
                let location = self.global_location(&namespace.name, &field.name, &field.ty);
                match &field.initializer {
                    Some(initializer) => self.emit_into(&location, initializer, 0)?,
                    None => self.set_default(&location)?,
                }
            }
        }
        self.cleanup_scopes(&[ScopeId::ROOT])
    }

    /// Emits statements into the current scope, returns whether control never reaches the end
    pub(super) fn emit_statements(&mut self, statements: &[BoundStatement]) -> EmitResult<bool> {
        for (index, statement) in statements.iter().enumerate() {
            if index > 0 && self.session.debug {
                self.current.push(CommandNode::LineBreak);
            }
            if self.emit_statement(statement)? {
                return Ok(true);
            }
        }
        Ok(false)
    }

    fn emit_statement(&mut self, statement: &BoundStatement) -> EmitResult<bool> {
        match statement {
            BoundStatement::Block(block) => return self.emit_block(block),
            BoundStatement::VariableDeclaration(declaration) => {
                self.emit_declaration(declaration)?;
            }
            BoundStatement::Expression(statement) => self.emit_discarded(&statement.expression)?,
            BoundStatement::If(statement) => self.emit_if(
                &statement.condition,
                &statement.then_body,
                statement.else_body.as_ref(),
            )?,
            BoundStatement::While(statement) => self.emit_loop(
                LoopKind::While,
                &statement.condition,
                &statement.body,
                (&statement.break_label, &statement.continue_label),
            )?,
            BoundStatement::DoWhile(statement) => self.emit_loop(
                LoopKind::DoWhile,
                &statement.condition,
                &statement.body,
                (&statement.break_label, &statement.continue_label),
            )?,
            BoundStatement::Goto(statement) => {
                self.emit_goto(&statement.label)?;
                return Ok(true);
            }
            BoundStatement::ConditionalGoto(statement) => self.emit_conditional_goto(statement)?,
            BoundStatement::Label(_) => {}
            BoundStatement::Return(statement) => {
                self.emit_return(statement.expression.as_ref())?;
                return Ok(true);
            }
        }
        Ok(false)
    }

    /// Emits a block in a new scope
    pub(super) fn emit_block(&mut self, block: &BoundBlock) -> EmitResult<bool> {
        let scope = self.scopes.push();
        let terminated = self.emit_statements(&block.statements)?;
        if !terminated {
            self.cleanup_scopes(&[scope])?;
        }
        self.scopes.pop();
        Ok(terminated)
    }

    fn emit_declaration(&mut self, declaration: &BoundVariableDeclaration) -> EmitResult<()> {
        let storage = self.storage_kind(&declaration.ty);
        let request = VariableRequest::local(&declaration.name, declaration.ty.clone(), storage);
        let floor = self.temp_floor;

        match &declaration.initializer {
            // `let x = x + 1` reads the shadowed variable, which must happen before the declaration
            Some(initializer) if reads_local(initializer, &declaration.name) => {
                let value = self.evaluate_into_temp(initializer, floor)?;
                let variable = self.scopes.declare(request);
                self.copy(&variable, &value)
            }
            Some(initializer) => {
                let variable = self.scopes.declare(request);
                self.emit_into(&variable, initializer, floor)
            }
            None => {
                let variable = self.scopes.declare(request);
                self.set_default(&variable)
            }
        }
    }

    /// Evaluates an expression only for its side effects
    pub(super) fn emit_discarded(&mut self, expression: &BoundExpression) -> EmitResult<()> {
        let floor = self.temp_floor;
        match expression {
            BoundExpression::Assignment(assignment) => {
                self.emit_assignment(assignment, None, floor)
            }
            BoundExpression::Call(call) => self.emit_call(call, None, floor),
            _ if expression.is_trivial() || expression.ty() == Type::Void => Ok(()),
            _ => self.evaluate_into_temp(expression, floor).map(|_| ()),
        }
    }

    fn emit_if(
        &mut self,
        condition: &BoundExpression,
        then_body: &BoundBlock,
        else_body: Option<&BoundBlock>,
    ) -> EmitResult<()> {
        let floor = self.temp_floor;
        let guard = self.temp(floor, &Type::Bool);
        self.emit_into(&guard, condition, floor + 1)?;

        self.temp_floor = floor + 1;
        let result = self
            .emit_branch(SubFunctionKind::If, then_body, &guard, false)
            .and_then(|()| match else_body {
                Some(else_body) => self.emit_branch(SubFunctionKind::Else, else_body, &guard, true),
                None => Ok(()),
            });
        self.temp_floor = floor;
        result
    }

    fn emit_branch(
        &mut self,
        kind: SubFunctionKind,
        body: &BoundBlock,
        guard: &Rc<EmittionVariable>,
        inverted: bool,
    ) -> EmitResult<()> {
        let (function, exits, _) = self.with_sub_function(kind, |this| this.emit_block(body))?;
        let condition = self.score_matches(guard, MinecraftRange::equal(1))?;
        self.call_sub_function(function, exits, Some((inverted, condition)))
    }

    fn emit_conditional_goto(&mut self, goto: &BoundConditionalGotoStatement) -> EmitResult<()> {
        let condition = if goto.jump_if_true {
            goto.condition.clone()
        } else {
            BoundExpression::not(goto.condition.clone())
        };
        let body = BoundBlock::new(vec![BoundStatement::goto(goto.label.0.clone())]);
        self.emit_if(&condition, &body, None)
    }

    fn emit_loop(
        &mut self,
        kind: LoopKind,
        condition: &BoundExpression,
        body: &BoundBlock,
        (break_label, continue_label): (&LabelSymbol, &LabelSymbol),
    ) -> EmitResult<()> {
        let floor = self.temp_floor;
        let condition_temp = self.temp(floor, &Type::Bool);
        let parent_scope = self.scopes.current();
        let id = LoopId(self.next_loop);
        self.next_loop += 1;

        let (function, exits, ()) = self.with_sub_function(SubFunctionKind::Loop, |this| {
            let index = this.loops.len();
            this.loops.push(LoopFrame {
                id,
                kind,
                break_label: break_label.0.clone(),
                continue_label: continue_label.0.clone(),
                ident: this.current.ident.clone(),
                depth: this.depth,
                parent_scope,
                body_scope: parent_scope,
                condition: condition.clone(),
                condition_temp: condition_temp.clone(),
                temp_floor: floor,
                control: None,
                tail: None,
            });

            // Returns emitted before the first jump out of a nested function
            // must already reset the control register
            if jumps_from_nested(&body.statements, (break_label, continue_label), false) {
                this.loop_control(index);
            }

            this.temp_floor = floor + 1;
            let result = this.emit_loop_body(index, body);
            this.temp_floor = floor;
            let frame = this.loops.pop();
            result?;

            if let Some(control) = frame.and_then(|frame| frame.control) {
                let reset = MinecraftCommand::score_set(this.player(&control)?, 0);
                this.current.push_front(reset);
            }
            Ok(())
        })?;

        self.call_sub_function(function, exits, None)
    }

    fn emit_loop_body(&mut self, index: usize, body: &BoundBlock) -> EmitResult<()> {
        let kind = self.loops[index].kind;
        let condition = self.loops[index].condition.clone();
        let condition_temp = self.loops[index].condition_temp.clone();
        let ident = self.loops[index].ident.clone();
        let floor = self.loops[index].temp_floor;

        if kind == LoopKind::While {
            self.emit_into(&condition_temp, &condition, floor + 1)?;
            self.push(
                Execute::new()
                    .with_unless(self.score_matches(&condition_temp, MinecraftRange::equal(1))?)
                    .with_run(MinecraftCommand::return_value(0)),
            );
        }

        let scope = self.scopes.push();
        self.loops[index].body_scope = scope;
        let terminated = self.emit_statements(&body.statements)?;
        if !terminated {
            self.cleanup_scopes(&[scope])?;
        }
        self.scopes.pop();

        if terminated {
            return Ok(());
        }
        match kind {
            LoopKind::While => self.push(MinecraftCommand::call(ident)),
            LoopKind::DoWhile => {
                self.emit_into(&condition_temp, &condition, floor + 1)?;
                self.push(
                    Execute::new()
                        .with_if(self.score_matches(&condition_temp, MinecraftRange::equal(1))?)
                        .with_run(MinecraftCommand::call(ident)),
                );
            }
        }
        Ok(())
    }

    /// `break` and `continue`, the only jumps that survive lowering
    fn emit_goto(&mut self, label: &LabelSymbol) -> EmitResult<()> {
        let Some(index) = self
            .loops
            .iter()
            .rposition(|frame| frame.break_label == label.0 || frame.continue_label == label.0)
        else {
            emit_bail!(EmitErrorKind::UnsupportedGoto {
                label: label.to_string(),
            });
        };
        let is_break = self.loops[index].break_label == label.0;

        let chain = self.scopes.chain_to(self.loops[index].body_scope);
        self.cleanup_scopes(&chain)?;

        if self.loops[index].depth != self.depth {
            let control = self.loop_control(index);
            let value = if is_break { 1 } else { 2 };
            self.push(MinecraftCommand::score_set(self.player(&control)?, value));
            self.push(MinecraftCommand::return_value(0));
            let id = self.loops[index].id;
            self.current.exits.add_loop(id);
            return Ok(());
        }

        let ident = self.loops[index].ident.clone();
        match (is_break, self.loops[index].kind) {
            (true, _) => self.push(MinecraftCommand::return_value(0)),
            (false, LoopKind::While) => {
                self.push(MinecraftCommand::return_run(MinecraftCommand::call(ident)));
            }
            (false, LoopKind::DoWhile) => {
                let condition = self.loops[index].condition.clone();
                let condition_temp = self.loops[index].condition_temp.clone();
                let floor = self.loops[index].temp_floor;
                self.emit_into(&condition_temp, &condition, floor + 1)?;
                self.push(
                    Execute::new()
                        .with_if(self.score_matches(&condition_temp, MinecraftRange::equal(1))?)
                        .with_run(MinecraftCommand::return_run(MinecraftCommand::call(ident))),
                );
                self.push(MinecraftCommand::return_value(0));
            }
        }
        Ok(())
    }

    fn emit_return(&mut self, expression: Option<&BoundExpression>) -> EmitResult<()> {
        let result = match expression {
            Some(expression) => {
                let location = self.return_location(&expression.ty());
                self.emit_into(&location, expression, self.temp_floor)?;
                Some(location)
            }
            None => None,
        };

        let chain = self.scopes.chain_to(self.boundary.scope);
        self.cleanup_scopes(&chain)?;

        if self.depth == self.boundary.depth {
            let command = match result {
                Some(location) if location.is_register() => {
                    MinecraftCommand::return_run(ScoreboardCommand::Get(self.player(&location)?))
                }
                _ => MinecraftCommand::return_value(0),
            };
            self.push(command);
        } else {
            self.push(MinecraftCommand::score_set(self.storage().returned_flag(), 1));
            self.push(MinecraftCommand::return_value(0));
            self.current.exits.returns = true;
        }
        Ok(())
    }
}

/// Whether the expression reads the local variable `name`
fn reads_local(expression: &BoundExpression, name: &str) -> bool {
    let reads = |expression: &BoundExpression| reads_local(expression, name);
    match expression {
        BoundExpression::Literal(_) => false,
        BoundExpression::Variable(variable) => {
            matches!(&variable.variable, VariableSymbol::Local { name: local, .. } if local == name)
        }
        BoundExpression::Unary(unary) => reads(&unary.operand),
        BoundExpression::Binary(binary) => reads(&binary.left) || reads(&binary.right),
        BoundExpression::Call(call) => {
            call.receiver.as_deref().is_some_and(reads) || call.arguments.iter().any(reads)
        }
        BoundExpression::Conversion(conversion) => reads(&conversion.operand),
        BoundExpression::ObjectCreation(creation) => creation.arguments.iter().any(reads),
        BoundExpression::ArrayCreation(creation) => creation.dimensions.iter().any(reads),
        BoundExpression::FieldAccess(access) => reads(&access.instance),
        BoundExpression::ArrayAccess(access) => reads(&access.array) || reads(&access.index),
        BoundExpression::Assignment(assignment) => {
            reads(&assignment.target) || reads(&assignment.value)
        }
    }
}

/// Whether a jump to one of `labels` is emitted inside a sub-function of the loop
fn jumps_from_nested(
    statements: &[BoundStatement],
    labels: (&LabelSymbol, &LabelSymbol),
    nested: bool,
) -> bool {
    let targets = |label: &LabelSymbol| *label == *labels.0 || *label == *labels.1;
    statements.iter().any(|statement| match statement {
        BoundStatement::Goto(goto) => nested && targets(&goto.label),
        // Lowered to an `if`
        BoundStatement::ConditionalGoto(goto) => targets(&goto.label),
        BoundStatement::Block(block) => jumps_from_nested(&block.statements, labels, nested),
        BoundStatement::If(statement) => {
            jumps_from_nested(&statement.then_body.statements, labels, true)
                || statement
                    .else_body
                    .as_ref()
                    .is_some_and(|body| jumps_from_nested(&body.statements, labels, true))
        }
        BoundStatement::While(statement) => {
            jumps_from_nested(&statement.body.statements, labels, true)
        }
        BoundStatement::DoWhile(statement) => {
            jumps_from_nested(&statement.body.statements, labels, true)
        }
        BoundStatement::VariableDeclaration(_)
        | BoundStatement::Expression(_)
        | BoundStatement::Label(_)
        | BoundStatement::Return(_) => false,
    })
}

/// Whether a `return` appears anywhere in the block
pub(super) fn contains_return(block: &BoundBlock) -> bool {
    block.statements.iter().any(|statement| match statement {
        BoundStatement::Return(_) => true,
        BoundStatement::Block(block) => contains_return(block),
        BoundStatement::If(statement) => {
            contains_return(&statement.then_body)
                || statement.else_body.as_ref().is_some_and(contains_return)
        }
        BoundStatement::While(statement) => contains_return(&statement.body),
        BoundStatement::DoWhile(statement) => contains_return(&statement.body),
        BoundStatement::VariableDeclaration(_)
        | BoundStatement::Expression(_)
        | BoundStatement::Goto(_)
        | BoundStatement::ConditionalGoto(_)
        | BoundStatement::Label(_) => false,
    })
}

#[cfg(test)]
mod tests {
    use cinder_bound::{BinaryOperator, BoundBlock, BoundExpression, BoundStatement, Type};

    use super::{contains_return, reads_local};

    #[test]
    fn test_reads_local() {
        let x = BoundExpression::local("x", Type::Int);
        let increment = BoundExpression::binary(x, BinaryOperator::Add, BoundExpression::int(1));
        assert!(reads_local(&increment, "x"));
        assert!(!reads_local(&increment, "y"));
        assert!(!reads_local(&BoundExpression::parameter("x", Type::Int), "x"));
    }

    #[test]
    fn test_contains_return() {
        let nested = BoundBlock::new(vec![BoundStatement::if_else(
            BoundExpression::bool(true),
            vec![BoundStatement::ret(None)],
            None,
        )]);
        assert!(contains_return(&nested));
        assert!(!contains_return(&BoundBlock::new(vec![BoundStatement::expression(
            BoundExpression::int(1)
        )])));
    }
}
