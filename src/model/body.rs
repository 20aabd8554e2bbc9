//
//  body.rs
//  Retain
//
//  Created by hak (tharun)
//

use serde::{Deserialize, Serialize};

use super::ids::*;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MethodBody {
    /// Local variable types, indexed by `Operand::Local`.
    #[serde(default)]
    pub locals: Vec<TypeId>,
    #[serde(default)]
    pub handlers: Vec<ExceptionHandler>,
    #[serde(default)]
    pub instructions: Vec<Instruction>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExceptionHandler {
    /// `None` for finally/fault handlers.
    #[serde(default)]
    pub catch_type: Option<TypeId>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Instruction {
    pub opcode: OpCode,
    #[serde(default)]
    pub operand: Operand,
}

impl Instruction {
    pub fn new(opcode: OpCode, operand: Operand) -> Self {
        Self { opcode, operand }
    }

    pub fn simple(opcode: OpCode) -> Self {
        Self {
            opcode,
            operand: Operand::None,
        }
    }
}

/// The subset of IL opcodes the walker distinguishes. Everything else is `Other`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OpCode {
    Nop,
    Ldtoken,
    Call,
    Callvirt,
    Newobj,
    Ldftn,
    Ldfld,
    Ldflda,
    Stfld,
    Ldsfld,
    Stsfld,
    Ldarg,
    Starg,
    Ldloc,
    Stloc,
    Newarr,
    Castclass,
    Isinst,
    Initobj,
    Box,
    Unbox,
    UnboxAny,
    Add,
    AddOvf,
    AddOvfUn,
    Sub,
    SubOvf,
    SubOvfUn,
    Mul,
    MulOvf,
    MulOvfUn,
    Ret,
    Other,
}

/// Overflow-checked arithmetic family of an opcode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CheckedOp {
    Add,
    Sub,
    Mul,
}

impl OpCode {
    pub fn checked_op(self) -> Option<CheckedOp> {
        match self {
            OpCode::AddOvf | OpCode::AddOvfUn => Some(CheckedOp::Add),
            OpCode::SubOvf | OpCode::SubOvfUn => Some(CheckedOp::Sub),
            OpCode::MulOvf | OpCode::MulOvfUn => Some(CheckedOp::Mul),
            _ => None,
        }
    }

    pub fn is_unbox(self) -> bool {
        matches!(self, OpCode::Unbox | OpCode::UnboxAny)
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Operand {
    #[default]
    None,
    Type(TypeId),
    Method(MethodId),
    Field(FieldId),
    Parameter(ParamId),
    Local(u32),
    Int(i64),
    Float(f64),
    String(String),
    Branch(u32),
}

impl Operand {
    pub fn is_none(&self) -> bool {
        matches!(self, Operand::None)
    }
}
