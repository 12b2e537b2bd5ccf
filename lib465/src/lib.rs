//! Machine model for the 20465 teaching architecture: the 10-bit word
//! layout, opcode and register tables, and the base-4 textual encoding
//! used by the object format.

pub mod op;
pub mod word;
