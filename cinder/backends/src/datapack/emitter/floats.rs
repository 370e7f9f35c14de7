//! Floating point arithmetic
//!
//! The target has no floating point instructions. Addition moves a marker entity,
//! comparison reads the yaw of one marker facing the other, multiplication and
//! division compute parts on the scoreboard that are summed by the addition.
use std::rc::Rc;

use cinder_bound::{BinaryOperator, BoundBinaryExpression, BoundExpression, LiteralValue, Type};
use cinder_error::{emit_unsupported, EmitResult};

use crate::common::{Execute, MinecraftRange, StoreKind, StoreTarget};

use super::{EmittionVariable, FunctionEmitter, MacroFunction, Operand};

/// The yaw at which marker A is considered to face sideways
const FACING_THRESHOLD: i32 = 45;

fn negate_literal(value: &LiteralValue) -> Option<LiteralValue> {
    match value {
        LiteralValue::Float(value) => Some(LiteralValue::Float(-value)),
        LiteralValue::Double(value) => Some(LiteralValue::Double(-value)),
        _ => None,
    }
}

impl FunctionEmitter<'_, '_> {
    /// Flips the sign textually and parses the result again
    pub(crate) fn emit_float_negation(
        &mut self,
        dest: &Rc<EmittionVariable>,
        operand: &BoundExpression,
        ty: &Type,
        base: usize,
    ) -> EmitResult<()> {
        if let Some(negated) = operand.as_literal().and_then(negate_literal) {
            return self.set_literal(dest, &negated);
        }

        let value = self.operand(operand, base)?;
        self.negate_into_result(&value, ty)?;
        self.copy(dest, &Self::macro_result(ty))
    }

    /// Leaves the negated operand in `#macro.result`, typed as `ty`
    fn negate_into_result(&mut self, value: &Operand, ty: &Type) -> EmitResult<()> {
        self.stage("v", value, ty)?;
        self.call_macro(MacroFunction::FloatNegate);
        self.call_macro(if *ty == Type::Float {
            MacroFunction::ParseFloat
        } else {
            MacroFunction::ParseDouble
        });
        Ok(())
    }

    /// Stages both operands as `a` and `b`
    fn stage_float_operands(
        &mut self,
        binary: &BoundBinaryExpression,
        base: usize,
    ) -> EmitResult<()> {
        let left = self.operand(&binary.left, base)?;
        let right = self.operand(&binary.right, base + 1)?;
        self.stage("a", &left, &binary.left.ty())?;

        if binary.operator != BinaryOperator::Sub {
            return self.stage("b", &right, &binary.right.ty());
        }
        match &right {
            Operand::Literal(value) => match negate_literal(value) {
                Some(negated) => self.stage("b", &Operand::Literal(negated), &binary.right.ty()),
                None => emit_unsupported!(binary.operator, binary.right.ty()),
            },
            Operand::Location(_) => {
                self.negate_into_result(&right, &Type::Double)?;
                let negated = Self::macro_result(&Type::Double);
                self.copy(&Self::macro_location("b", &Type::Double), &negated)
            }
        }
    }

    pub(crate) fn emit_float_arithmetic(
        &mut self,
        dest: &Rc<EmittionVariable>,
        binary: &BoundBinaryExpression,
        base: usize,
    ) -> EmitResult<()> {
        let function = match binary.operator {
            BinaryOperator::Add | BinaryOperator::Sub => MacroFunction::FloatAdd,
            BinaryOperator::Mul => MacroFunction::FloatMultiply,
            BinaryOperator::Div => MacroFunction::FloatDivide,
            operator => emit_unsupported!(operator, binary.ty),
        };
        self.stage_float_operands(binary, base)?;
        self.call_macro(function);

        // Every helper leaves a double behind
        if binary.ty == Type::Float {
            let result = Self::macro_result(&Type::Double);
            self.copy(&Self::macro_location("v", &Type::Double), &result)?;
            self.call_macro(MacroFunction::ToFloat);
        }
        self.copy(dest, &Self::macro_result(&binary.ty))
    }

    pub(crate) fn emit_float_comparison(
        &mut self,
        dest: &Rc<EmittionVariable>,
        binary: &BoundBinaryExpression,
        base: usize,
    ) -> EmitResult<()> {
        let (inverted, range) = match binary.operator {
            BinaryOperator::Less => (false, MinecraftRange::at_most(-FACING_THRESHOLD)),
            BinaryOperator::Greater => (false, MinecraftRange::at_least(FACING_THRESHOLD)),
            BinaryOperator::LessOrEqual => (true, MinecraftRange::at_least(FACING_THRESHOLD)),
            BinaryOperator::GreaterOrEqual => (true, MinecraftRange::at_most(-FACING_THRESHOLD)),
            operator => emit_unsupported!(operator, binary.left.ty()),
        };

        let left = self.operand(&binary.left, base)?;
        let right = self.operand(&binary.right, base + 1)?;
        self.stage("a", &left, &binary.left.ty())?;
        self.stage("b", &right, &binary.right.ty())?;
        self.call_macro(MacroFunction::FloatCompare);

        let yaw = Self::macro_register(&Type::Int);
        self.with_register_work(dest, &Type::Bool, base, |this, work, _| {
            let condition = this.score_matches(&yaw, range)?;
            let store = Execute::new()
                .with_store(StoreKind::Success, StoreTarget::Score(this.player(work)?));
            this.push(if inverted {
                store.with_unless(condition)
            } else {
                store.with_if(condition)
            });
            Ok(())
        })
    }
}

#[cfg(test)]
mod tests {
    use cinder_bound::{BinaryOperator, BoundExpression, BoundStatement, Type};

    use crate::datapack::emitter::tests::{emit_main, lines};

    fn double(name: &str) -> BoundExpression {
        BoundExpression::local(name, Type::Double)
    }

    #[test]
    fn test_subtraction_negates_literal() {
        let program = emit_main(
            Type::Double,
            vec![
                BoundStatement::declare("x", Type::Double, Some(BoundExpression::double(1.5))),
                BoundStatement::ret(Some(BoundExpression::binary(
                    double("x"),
                    BinaryOperator::Sub,
                    BoundExpression::double(0.5),
                ))),
            ],
        );
        assert_eq!(
            &lines(&program, "demo:main")[1..5],
            [
                "data modify storage demo:vars #macro.a set from storage demo:vars demo/main.x",
                "data modify storage demo:vars #macro.b set value -0.5d",
                "function demo:__generated/float_add with storage demo:vars #macro",
                "data modify storage demo:vars #return set from storage demo:vars #macro.result",
            ]
        );
    }

    #[test]
    fn test_less_reads_yaw() {
        let program = emit_main(
            Type::Bool,
            vec![
                BoundStatement::declare("x", Type::Double, Some(BoundExpression::double(1.0))),
                BoundStatement::ret(Some(BoundExpression::binary(
                    double("x"),
                    BinaryOperator::LessOrEqual,
                    BoundExpression::double(2.0),
                ))),
            ],
        );
        let lines = lines(&program, "demo:main");
        assert_eq!(lines[3], "function demo:__generated/float_compare with storage demo:vars #macro");
        assert_eq!(
            lines[4],
            "execute store success score #return cinder unless score #macro cinder matches 45.."
        );
    }

    fn matches(range: &str, value: i32) -> bool {
        let (min, max) = range.split_once("..").unwrap();
        (min.is_empty() || min.parse::<i32>().unwrap() <= value)
            && (max.is_empty() || value <= max.parse::<i32>().unwrap())
    }

    #[test]
    fn test_equal_operands() {
        // Yaw left by float_compare for a < b, a == b and a > b
        let yaws = [-90, 0, 90];
        let cases = [
            (BinaryOperator::Less, [true, false, false]),
            (BinaryOperator::LessOrEqual, [true, true, false]),
            (BinaryOperator::Greater, [false, false, true]),
            (BinaryOperator::GreaterOrEqual, [false, true, true]),
        ];

        for (operator, expected) in cases {
            let program = emit_main(
                Type::Bool,
                vec![
                    BoundStatement::declare("x", Type::Double, Some(BoundExpression::double(1.5))),
                    BoundStatement::ret(Some(BoundExpression::binary(
                        double("x"),
                        operator,
                        BoundExpression::double(1.5),
                    ))),
                ],
            );
            let main = lines(&program, "demo:main");
            let words: Vec<_> = main[4].split_whitespace().collect();
            let [.., check, "score", "#macro", "cinder", "matches", range] = words.as_slice() else {
                panic!("unexpected comparison {}", main[4]);
            };
            let results = yaws.map(|yaw| matches(range, yaw) == (*check == "if"));
            assert_eq!(results, expected, "{operator}");

            let compare = lines(&program, "demo:__generated/float_compare");
            assert!(compare.contains(
                &"execute if score #float_ne cinder matches 0 run scoreboard players set #macro cinder 0"
                    .to_string()
            ));
        }
    }

    #[test]
    fn test_negation_of_variable() {
        let program = emit_main(
            Type::Float,
            vec![
                BoundStatement::declare("f", Type::Float, Some(BoundExpression::float(2.0))),
                BoundStatement::ret(Some(BoundExpression::negate(BoundExpression::local(
                    "f",
                    Type::Float,
                )))),
            ],
        );
        let lines = lines(&program, "demo:main");
        assert_eq!(
            &lines[2..4],
            [
                "function demo:__generated/float_negate with storage demo:vars #macro",
                "function demo:__generated/parse_float with storage demo:vars #macro",
            ]
        );
        assert!(program.find("demo:__generated/float_negate_prepend").is_some());
    }
}
