use serde::{Deserialize, Serialize};
use smol_str::SmolStr;

use crate::{BoundExpression, LabelSymbol, Type};

bound_node_declaration! {
    #[derive(Clone, PartialEq, Serialize, Deserialize)]
    pub enum BoundStatement {
        Block(BoundBlock),
        VariableDeclaration(BoundVariableDeclaration),
        Expression(BoundExpressionStatement),
        If(BoundIfStatement),
        While(BoundWhileStatement),
        DoWhile(BoundDoWhileStatement),
        Goto(BoundGotoStatement),
        ConditionalGoto(BoundConditionalGotoStatement),
        Label(BoundLabelStatement),
        Return(BoundReturnStatement),
    }
}

/// A lexical block, opens a new scope
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct BoundBlock {
    pub statements: Vec<BoundStatement>,
}

impl BoundBlock {
    pub fn new(statements: Vec<BoundStatement>) -> Self {
        BoundBlock { statements }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BoundVariableDeclaration {
    pub name: SmolStr,
    pub ty: Type,
    #[serde(default)]
    pub initializer: Option<BoundExpression>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BoundExpressionStatement {
    pub expression: BoundExpression,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BoundIfStatement {
    pub condition: BoundExpression,
    pub then_body: BoundBlock,
    #[serde(default)]
    pub else_body: Option<BoundBlock>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BoundWhileStatement {
    pub condition: BoundExpression,
    pub body: BoundBlock,
    pub break_label: LabelSymbol,
    pub continue_label: LabelSymbol,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BoundDoWhileStatement {
    pub body: BoundBlock,
    pub condition: BoundExpression,
    pub break_label: LabelSymbol,
    pub continue_label: LabelSymbol,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BoundGotoStatement {
    pub label: LabelSymbol,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BoundConditionalGotoStatement {
    pub label: LabelSymbol,
    pub condition: BoundExpression,
    pub jump_if_true: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BoundLabelStatement {
    pub label: LabelSymbol,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BoundReturnStatement {
    #[serde(default)]
    pub expression: Option<BoundExpression>,
}

impl BoundStatement {
    /// Whether control never continues after this statement
    pub fn is_terminator(&self) -> bool {
        matches!(self, BoundStatement::Goto(_) | BoundStatement::Return(_))
    }
}

/// Constructors used by front-ends and tests
impl BoundStatement {
    pub fn block(statements: Vec<BoundStatement>) -> Self {
        BoundBlock::new(statements).into()
    }

    pub fn declare(
        name: impl Into<SmolStr>,
        ty: Type,
        initializer: Option<BoundExpression>,
    ) -> Self {
        BoundVariableDeclaration {
            name: name.into(),
            ty,
            initializer,
        }
        .into()
    }

    pub fn expression(expression: BoundExpression) -> Self {
        BoundExpressionStatement { expression }.into()
    }

    pub fn assign(target: BoundExpression, value: BoundExpression) -> Self {
        Self::expression(BoundExpression::assign(target, value))
    }

    pub fn if_else(
        condition: BoundExpression,
        then_body: Vec<BoundStatement>,
        else_body: Option<Vec<BoundStatement>>,
    ) -> Self {
        BoundIfStatement {
            condition,
            then_body: BoundBlock::new(then_body),
            else_body: else_body.map(BoundBlock::new),
        }
        .into()
    }

    pub fn while_loop(
        condition: BoundExpression,
        body: Vec<BoundStatement>,
        break_label: impl Into<SmolStr>,
        continue_label: impl Into<SmolStr>,
    ) -> Self {
        BoundWhileStatement {
            condition,
            body: BoundBlock::new(body),
            break_label: LabelSymbol::new(break_label),
            continue_label: LabelSymbol::new(continue_label),
        }
        .into()
    }

    pub fn do_while(
        body: Vec<BoundStatement>,
        condition: BoundExpression,
        break_label: impl Into<SmolStr>,
        continue_label: impl Into<SmolStr>,
    ) -> Self {
        BoundDoWhileStatement {
            body: BoundBlock::new(body),
            condition,
            break_label: LabelSymbol::new(break_label),
            continue_label: LabelSymbol::new(continue_label),
        }
        .into()
    }

    pub fn goto(label: impl Into<SmolStr>) -> Self {
        BoundGotoStatement {
            label: LabelSymbol::new(label),
        }
        .into()
    }

    pub fn goto_if(label: impl Into<SmolStr>, condition: BoundExpression, jump_if_true: bool) -> Self {
        BoundConditionalGotoStatement {
            label: LabelSymbol::new(label),
            condition,
            jump_if_true,
        }
        .into()
    }

    pub fn label(label: impl Into<SmolStr>) -> Self {
        BoundLabelStatement {
            label: LabelSymbol::new(label),
        }
        .into()
    }

    pub fn ret(expression: Option<BoundExpression>) -> Self {
        BoundReturnStatement { expression }.into()
    }
}
