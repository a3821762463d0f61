//! Lifecycle hook registry.
//!
//! # Responsibility
//! - Accumulate ordered hook lists per lifecycle moment at
//!   type-registration time.
//! - Run all hooks of a kind, in registration order, against a record.
//!
//! # Invariants
//! - Hooks may mutate record attributes.
//! - Registration order is execution order.

use crate::model::record::Record;
use std::fmt;

/// A registered lifecycle hook.
pub type Hook = Box<dyn Fn(&mut Record) + Send + Sync>;

/// Lifecycle moments a hook can attach to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CallbackKind {
    BeforeCreate,
    BeforeSave,
    BeforeUpdate,
    BeforeDelete,
}

/// Ordered hook lists for one record type.
#[derive(Default)]
pub struct CallbackSet {
    before_create: Vec<Hook>,
    before_save: Vec<Hook>,
    before_update: Vec<Hook>,
    before_delete: Vec<Hook>,
}

impl CallbackSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, kind: CallbackKind, hook: Hook) {
        self.hooks_mut(kind).push(hook);
    }

    pub fn run(&self, kind: CallbackKind, record: &mut Record) {
        for hook in self.hooks(kind) {
            hook(record);
        }
    }

    fn hooks(&self, kind: CallbackKind) -> &[Hook] {
        match kind {
            CallbackKind::BeforeCreate => &self.before_create,
            CallbackKind::BeforeSave => &self.before_save,
            CallbackKind::BeforeUpdate => &self.before_update,
            CallbackKind::BeforeDelete => &self.before_delete,
        }
    }

    fn hooks_mut(&mut self, kind: CallbackKind) -> &mut Vec<Hook> {
        match kind {
            CallbackKind::BeforeCreate => &mut self.before_create,
            CallbackKind::BeforeSave => &mut self.before_save,
            CallbackKind::BeforeUpdate => &mut self.before_update,
            CallbackKind::BeforeDelete => &mut self.before_delete,
        }
    }
}

impl fmt::Debug for CallbackSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CallbackSet")
            .field("before_create", &self.before_create.len())
            .field("before_save", &self.before_save.len())
            .field("before_update", &self.before_update.len())
            .field("before_delete", &self.before_delete.len())
            .finish()
    }
}
