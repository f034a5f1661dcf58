//! SPIRAL IR - decoded document model.
//!
//! This crate contains the data structures every evaluator consumes:
//! - `Type` and `Literal` for the tagged leaf encoding (`{"kind": "int", "value": 42}`)
//! - `Expr` and `Arg` for the expression layers (AIR, CIR, EIR)
//! - `Document` and `NodeTable` for node-graph documents
//! - `LirDocument`, `Block`, `Instruction`, `Terminator` for control-flow graphs
//! - `Layer` and its per-layer capability policy
//! - `CoreOp` for the built-in operator catalogue
//!
//! Documents are produced by an external parser; this crate only decodes
//! them (via serde) and answers structural questions about them. No
//! evaluation happens here.

mod document;
mod error;
mod expr;
mod layer;
mod lir;
mod ops;
mod types;

pub use document::{def_key, AirDef, Document, Node, NodeTable};
pub use error::IrError;
pub use expr::{Arg, Expr};
pub use layer::Layer;
pub use lir::{Block, Cfg, Instruction, LirDocument, Terminator};
pub use ops::CoreOp;
pub use types::{Literal, Type};
