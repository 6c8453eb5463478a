#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![deny(clippy::unwrap_used)]

//! idlsmith metadata model
//!
//! This crate defines the records the reflection layer registers (enums,
//! structured types, entities, APIs, databases) and the [`RegistrySnapshot`]
//! that carries them into a generation pass. The snapshot is the only input
//! the code generator reads.

pub mod metadata;
pub mod select;
pub mod snapshot;
pub mod var;

// Re-export the model for convenience
pub use metadata::*;
pub use select::{FieldSelect, TypeSelect};
pub use snapshot::{by_name, RegistrySnapshot, SnapshotError};
pub use var::{Scalar, StructKind, VarType};
