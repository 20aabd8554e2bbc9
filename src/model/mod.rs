//! Object-program metadata graph.
//!
//! Types, members, parameters and attributes are stored in per-kind arenas
//! inside [`Program`] and addressed by `u32` handles. The model is read-only
//! while a reachability pass runs.

pub mod attribute;
pub mod body;
pub mod ids;
pub mod members;
pub mod program;
mod resolve;
pub mod types;

pub use attribute::*;
pub use body::*;
pub use ids::*;
pub use members::*;
pub use program::{Program, ProgramStats};
pub use types::*;
