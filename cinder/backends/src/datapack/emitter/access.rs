use std::rc::Rc;

use cinder_bound::{BoundAssignmentExpression, BoundExpression, LiteralValue, Type};
use cinder_common::StorageKind;
use cinder_error::{emit_bail, EmitErrorKind, EmitResult};

use super::{EmittionVariable, FunctionEmitter, MacroFunction, Operand};

/// A location that can be read from and written to
#[derive(Debug, Clone)]
pub(crate) enum Place {
    /// A location whose full name is known while emitting
    Static(Rc<EmittionVariable>),
    /// A path interrupted by runtime indices: `parts[0][indices[0]]parts[1]...`
    Dynamic {
        parts: Vec<String>,
        indices: Vec<Rc<EmittionVariable>>,
        ty: Type,
    },
}

/// Whether the expression names a location
pub(crate) fn is_place(expression: &BoundExpression) -> bool {
    matches!(
        expression,
        BoundExpression::Variable(_)
            | BoundExpression::FieldAccess(_)
            | BoundExpression::ArrayAccess(_)
    )
}

impl FunctionEmitter<'_, '_> {
    /// Walks an access chain from left to right.
    ///
    /// Returns the place and the next free temporary index. Temporaries holding
    /// dynamic indices stay alive until the place is used.
    pub(crate) fn resolve_place(
        &mut self,
        expression: &BoundExpression,
        base: usize,
    ) -> EmitResult<(Place, usize)> {
        match expression {
            BoundExpression::Variable(variable) => {
                Ok((Place::Static(self.variable_location(&variable.variable)?), base))
            }
            BoundExpression::FieldAccess(access) => {
                let (place, next) = self.resolve_place(&access.instance, base)?;
                let place = match place {
                    Place::Static(instance) => {
                        let path = self.path(&instance)?;
                        Place::Static(Rc::new(EmittionVariable::synthetic(
                            format!("{}.{}", path.path, access.field),
                            access.ty.clone(),
                            StorageKind::Tree,
                        )))
                    }
                    Place::Dynamic {
                        mut parts, indices, ..
                    } => {
                        if let Some(last) = parts.last_mut() {
                            last.push('.');
                            last.push_str(&access.field);
                        }
                        Place::Dynamic {
                            parts,
                            indices,
                            ty: access.ty.clone(),
                        }
                    }
                };
                Ok((place, next))
            }
            BoundExpression::ArrayAccess(access) => {
                let (place, next) = self.resolve_place(&access.array, base)?;
                if let Some(index) = access.index.as_int_literal() {
                    let place = match place {
                        Place::Static(array) => {
                            let path = self.path(&array)?;
                            Place::Static(Rc::new(EmittionVariable::synthetic(
                                format!("{}[{index}]", path.path),
                                access.ty.clone(),
                                StorageKind::Tree,
                            )))
                        }
                        Place::Dynamic {
                            mut parts, indices, ..
                        } => {
                            if let Some(last) = parts.last_mut() {
                                last.push_str(&format!("[{index}]"));
                            }
                            Place::Dynamic {
                                parts,
                                indices,
                                ty: access.ty.clone(),
                            }
                        }
                    };
                    return Ok((place, next));
                }

                let (index, next) = self.register_operand(&access.index, next)?;
                let (mut parts, mut indices) = match place {
                    Place::Static(array) => (vec![self.path(&array)?.path.to_string()], Vec::new()),
                    Place::Dynamic { parts, indices, .. } => (parts, indices),
                };
                indices.push(index);
                parts.push(String::new());
                Ok((
                    Place::Dynamic {
                        parts,
                        indices,
                        ty: access.ty.clone(),
                    },
                    next,
                ))
            }
            _ => {
                let temp = self.evaluate_into_temp(expression, base)?;
                Ok((Place::Static(temp), base + 1))
            }
        }
    }

    /// Stages the path fragments and indices of a dynamic place, returns its rank
    fn stage_dynamic(
        &mut self,
        parts: &[String],
        indices: &[Rc<EmittionVariable>],
    ) -> EmitResult<usize> {
        for (k, part) in parts.iter().enumerate() {
            let part = Operand::Literal(LiteralValue::String(part.into()));
            self.stage(&format!("p{k}"), &part, &Type::String)?;
        }
        for (k, index) in indices.iter().enumerate() {
            self.stage(&format!("i{k}"), &Operand::Location(index.clone()), &Type::Int)?;
        }
        Ok(indices.len())
    }

    pub(crate) fn read_place(
        &mut self,
        dest: &Rc<EmittionVariable>,
        place: &Place,
    ) -> EmitResult<()> {
        match place {
            Place::Static(location) => self.copy(dest, location),
            Place::Dynamic { parts, indices, ty } => {
                let rank = self.stage_dynamic(parts, indices)?;
                self.call_macro(MacroFunction::ArrayGet(rank));
                self.copy(dest, &Self::macro_result(ty))
            }
        }
    }

    /// Writes the value into the target, `dest` additionally receives the assigned value
    pub(crate) fn emit_assignment(
        &mut self,
        assignment: &BoundAssignmentExpression,
        dest: Option<&Rc<EmittionVariable>>,
        base: usize,
    ) -> EmitResult<()> {
        if !is_place(&assignment.target) {
            emit_bail!(EmitErrorKind::InvalidAssignmentTarget {
                expression: assignment.target.describe(),
            });
        }

        let (place, next) = self.resolve_place(&assignment.target, base)?;
        match place {
            Place::Static(location) => {
                self.emit_into(&location, &assignment.value, next)?;
                match dest {
                    Some(dest) => self.copy(dest, &location),
                    None => Ok(()),
                }
            }
            Place::Dynamic { parts, indices, ty } => {
                let value = self.operand(&assignment.value, next)?;
                self.stage("value", &value, &ty)?;
                let rank = self.stage_dynamic(&parts, &indices)?;
                self.call_macro(MacroFunction::ArraySet(rank));
                match dest {
                    Some(dest) => self.copy(dest, &Self::macro_location("value", &ty)),
                    None => Ok(()),
                }
            }
        }
    }
}
