//! Record domain model.
//!
//! # Responsibility
//! - Define the in-memory shape of records: dynamic values, schema-gated
//!   attribute state, lifecycle hooks.
//!
//! # Invariants
//! - Nothing in this module performs I/O; persistence lives in `repo`.
//! - Attribute state is always gated by the owning type's `Schema`.

pub mod attributes;
pub mod callbacks;
pub mod record;
pub mod timestamps;
pub mod value;
