//! Emitters for each registry category.
//!
//! Each emitter turns one metadata record into IDL nodes and, where the
//! category has a runtime side, script text. The assembler decides ordering.

/// Module alias the generated script imports the compiled IDL under
pub const GEN: &str = "srv";

pub mod api;
pub mod database;
pub mod entity;
pub mod enum_emitter;
pub mod prolog;
pub mod selection;
pub mod service;
pub mod struct_emitter;

pub use api::{emit_api, ApiEmission};
pub use database::{emit_database, DatabaseEmission};
pub use entity::{emit_entity, EntityEmission, ProviderClosure};
pub use enum_emitter::emit_enum;
pub use selection::SelectionBuilder;
pub use service::dispatch_service;
pub use struct_emitter::emit_struct;
