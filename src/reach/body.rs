//
//  body.rs
//  Retain
//
//  Created by hak (tharun)
//

use super::context::ReachableContext;
use super::helpers::{BOXING, CHECKED};
use super::walker::Steps;
use crate::error::Result;
use crate::model::*;

const INITIALIZE_ARRAY: &str = "InitializeArray";
const RUNTIME_HELPERS: &str = "System.Runtime.CompilerServices.RuntimeHelpers";

impl<'p> ReachableContext<'p> {
    /// Catch types, locals, instruction operands and the helpers that code
    /// patterns in the body require.
    pub(crate) fn body_steps(&mut self, body: &'p MethodBody, steps: &mut Steps) -> Result<()> {
        let program = self.program;
        for handler in &body.handlers {
            steps.ty_opt(handler.catch_type);
        }
        for &local in &body.locals {
            steps.ty(local);
        }

        for (index, instruction) in body.instructions.iter().enumerate() {
            match &instruction.operand {
                Operand::Type(t) => {
                    if !is_excluded(program, body, index) {
                        steps.ty(*t);
                    }
                }
                Operand::Method(m) => {
                    if !is_excluded(program, body, index) {
                        steps.method(*m);
                    }
                    self.generic_array_steps(*m, steps)?;
                }
                Operand::Field(f) => {
                    if !is_excluded(program, body, index) {
                        steps.entity(Entity::Field(*f));
                    }
                }
                Operand::Parameter(p) => steps.entity(Entity::Parameter(*p)),
                Operand::Local(slot) => steps.ty_opt(body.locals.get(*slot as usize).copied()),
                _ => {}
            }
            self.opcode_steps(instruction.opcode, steps)?;
        }
        Ok(())
    }

    /// Generic arrays have no target representation; the emitter converts
    /// them through the boxing helpers.
    fn generic_array_steps(&mut self, method: MethodId, steps: &mut Steps) -> Result<()> {
        let program = self.program;
        let Some((return_type, parameters)) = program.method_signature(method) else {
            return Ok(());
        };
        if parameters
            .iter()
            .any(|p| program.is_generic_parameter_array(*p))
        {
            steps.methods(self.helper_methods(BOXING, "Box")?);
            steps.methods(self.helper_methods(BOXING, "UnboxTo")?);
        }
        if program.is_generic_parameter_array(return_type) {
            let unboxers = self.helpers.methods_where(program, BOXING, "Unbox*", |name, count| {
                name.starts_with("Unbox") && count == 1
            })?;
            steps.methods(unboxers);
        }
        Ok(())
    }

    /// Opcodes the emitter always lowers into helper calls.
    fn opcode_steps(&mut self, opcode: OpCode, steps: &mut Steps) -> Result<()> {
        let program = self.program;
        if let Some(op) = opcode.checked_op() {
            let name = match op {
                CheckedOp::Add => "Add",
                CheckedOp::Sub => "Sub",
                CheckedOp::Mul => "Mul",
            };
            steps.methods(self.helper_methods(CHECKED, name)?);
        } else if opcode == OpCode::Box {
            steps.methods(self.helper_methods(BOXING, "Box")?);
        } else if opcode.is_unbox() {
            let unboxers = self.helpers.methods_where(program, BOXING, "Unbox*", |name, _| {
                name.starts_with("Unbox")
            })?;
            steps.methods(unboxers);
        }
        Ok(())
    }
}

/// Is the operand of instruction `index` a compiler artifact that must not be
/// walked?
///
/// Array initializer blobs are recognized by adjacency only: a field token
/// immediately followed by a call to `RuntimeHelpers.InitializeArray`.
/// Otherwise native methods and resource-id fields are excluded.
fn is_excluded(program: &Program, body: &MethodBody, index: usize) -> bool {
    let Some(instruction) = body.instructions.get(index) else {
        return false;
    };
    if instruction.opcode == OpCode::Ldtoken {
        if !matches!(instruction.operand, Operand::Field(_)) {
            return false;
        }
        let Some(next) = body.instructions.get(index + 1) else {
            return false;
        };
        if next.opcode != OpCode::Call {
            return false;
        }
        let Operand::Method(target) = next.operand else {
            return false;
        };
        return program.method_name(target) == Some(INITIALIZE_ARRAY)
            && program
                .method_declaring_type(target)
                .is_some_and(|t| program.full_name(t) == RUNTIME_HELPERS);
    }
    match instruction.operand {
        Operand::Method(m) => program
            .resolve_method(m)
            .and_then(|d| program.method_def(d))
            .is_some_and(|d| d.flags.native),
        Operand::Field(f) => program
            .resolve_field(f)
            .and_then(|d| program.field_def(d))
            .is_some_and(|d| d.resource_id),
        _ => false,
    }
}
