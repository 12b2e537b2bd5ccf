//! Opcode, register, and addressing-mode tables.
//!
//! Opcodes are grouped by operand arity; the enum discriminant is the
//! architectural opcode index emitted into the title word.

use std::str::FromStr;

use num_derive::FromPrimitive;
use strum_macros::EnumString;

#[allow(clippy::upper_case_acronyms)]
#[derive(FromPrimitive, EnumString, Debug, Clone, Copy, PartialEq, Eq)]
#[strum(serialize_all = "lowercase")]
pub enum TwoOperandOp {
    MOV = 0,
    CMP = 1,
    ADD = 2,
    SUB = 3,
    LEA = 4,
}

#[allow(clippy::upper_case_acronyms)]
#[derive(FromPrimitive, EnumString, Debug, Clone, Copy, PartialEq, Eq)]
#[strum(serialize_all = "lowercase")]
pub enum OneOperandOp {
    CLR = 5,
    NOT = 6,
    INC = 7,
    DEC = 8,
    JMP = 9,
    BNE = 10,
    JSR = 11,
    RED = 12,
    PRN = 13,
}

#[allow(clippy::upper_case_acronyms)]
#[derive(FromPrimitive, EnumString, Debug, Clone, Copy, PartialEq, Eq)]
#[strum(serialize_all = "lowercase")]
pub enum ZeroOperandOp {
    RTS = 14,
    STOP = 15,
}

#[derive(FromPrimitive, EnumString, Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[strum(serialize_all = "lowercase")]
pub enum Register {
    R0 = 0,
    R1 = 1,
    R2 = 2,
    R3 = 3,
    R4 = 4,
    R5 = 5,
    R6 = 6,
    R7 = 7,
}

#[derive(FromPrimitive, Debug, Clone, Copy, PartialEq, Eq)]
pub enum AddressMode {
    Immediate = 0,
    Direct = 1,
    MatrixAccess = 2,
    DirectRegister = 3,
}

/// The addressing modes an opcode accepts in one operand position.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ModeSet(u8);

impl ModeSet {
    pub fn of(modes: &[AddressMode]) -> Self {
        ModeSet(modes.iter().fold(0, |set, &m| set | (1 << m as u8)))
    }

    pub fn all() -> Self {
        ModeSet(0b1111)
    }

    pub fn contains(self, mode: AddressMode) -> bool {
        self.0 & (1 << mode as u8) != 0
    }
}

impl TwoOperandOp {
    pub fn source_modes(self) -> ModeSet {
        match self {
            TwoOperandOp::LEA => ModeSet::of(&[AddressMode::Direct, AddressMode::MatrixAccess]),
            _ => ModeSet::all(),
        }
    }

    pub fn dest_modes(self) -> ModeSet {
        match self {
            TwoOperandOp::CMP => ModeSet::all(),
            _ => ModeSet::of(&[
                AddressMode::Direct,
                AddressMode::MatrixAccess,
                AddressMode::DirectRegister,
            ]),
        }
    }
}

impl OneOperandOp {
    pub fn dest_modes(self) -> ModeSet {
        match self {
            OneOperandOp::PRN => ModeSet::all(),
            _ => ModeSet::of(&[
                AddressMode::Direct,
                AddressMode::MatrixAccess,
                AddressMode::DirectRegister,
            ]),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Op {
    Two(TwoOperandOp),
    One(OneOperandOp),
    Zero(ZeroOperandOp),
}

impl Op {
    pub fn from_mnemonic(i: &str) -> Option<Op> {
        if let Ok(two) = TwoOperandOp::from_str(i) {
            Some(Op::Two(two))
        } else if let Ok(one) = OneOperandOp::from_str(i) {
            Some(Op::One(one))
        } else if let Ok(zero) = ZeroOperandOp::from_str(i) {
            Some(Op::Zero(zero))
        } else {
            None
        }
    }

    pub fn opcode(self) -> u8 {
        match self {
            Op::Two(op) => op as u8,
            Op::One(op) => op as u8,
            Op::Zero(op) => op as u8,
        }
    }
}
