//! Store client capability and implementations.
//!
//! # Responsibility
//! - Define the low-level operations the persistence layer consumes.
//! - Ship an in-memory implementation used as the test fixture and as the
//!   reference for store-side semantics.
//!
//! # Invariants
//! - Raw failures are reported as `ClientError` with a machine-matchable
//!   kind; translation into domain errors happens in the repo layer, never
//!   here.

pub mod client;
pub mod memory;
