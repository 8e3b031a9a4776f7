//! Memoization of built composite schemas.
//!
//! A composite's slot is reserved before its members are built, so any member
//! that refers back to it (directly or through other composites) resolves to
//! the reserved handle instead of recursing. Slots are never overwritten, and a
//! failed build is undone with [`IdentityCache::rollback`].

use std::collections::HashMap;

use tracing::trace;

use super::field::Schema;
use crate::diagnostic::SchemaError;
use crate::ir::CompositeId;

#[derive(Debug, Clone)]
enum Slot {
    /// Reserved; members are still being built.
    Pending(String),
    Ready(Schema),
}

/// Position in the insertion journal to roll back to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Checkpoint(usize);

/// Map from composite identity to its built schema.
#[derive(Debug, Clone, Default)]
pub struct IdentityCache {
    slots: HashMap<CompositeId, Slot>,
    order: Vec<CompositeId>,
}

impl IdentityCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reserves a slot for `id`. Returns false if the slot already exists.
    pub fn reserve(&mut self, id: CompositeId, name: &str) -> bool {
        if self.slots.contains_key(&id) {
            trace!(composite = %name, "cache hit");
            return false;
        }
        self.slots.insert(id, Slot::Pending(name.to_string()));
        self.order.push(id);
        true
    }

    /// Fills a reserved slot.
    pub fn complete(&mut self, id: CompositeId, schema: Schema) -> Result<(), SchemaError> {
        match self.slots.get(&id) {
            Some(Slot::Pending(_)) => {
                self.slots.insert(id, Slot::Ready(schema));
                Ok(())
            }
            Some(Slot::Ready(_)) => Err(SchemaError::invalid(
                "cache slot",
                schema.name,
                "schema was already built",
            )),
            None => Err(SchemaError::UnknownComposite { name: schema.name }),
        }
    }

    /// Returns the built schema for `id`.
    pub fn get(&self, id: CompositeId) -> Result<&Schema, SchemaError> {
        match self.slots.get(&id) {
            Some(Slot::Ready(schema)) => Ok(schema),
            Some(Slot::Pending(name)) => Err(SchemaError::CyclicDefinitionIncomplete {
                composite: name.clone(),
            }),
            None => Err(SchemaError::UnknownComposite {
                name: id.to_string(),
            }),
        }
    }

    pub fn contains(&self, id: CompositeId) -> bool {
        self.slots.contains_key(&id)
    }

    pub fn is_ready(&self, id: CompositeId) -> bool {
        matches!(self.slots.get(&id), Some(Slot::Ready(_)))
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    pub fn checkpoint(&self) -> Checkpoint {
        Checkpoint(self.order.len())
    }

    /// Drops every slot inserted after `checkpoint`.
    pub fn rollback(&mut self, checkpoint: Checkpoint) {
        for id in self.order.drain(checkpoint.0..) {
            self.slots.remove(&id);
        }
    }

    pub fn clear(&mut self) {
        self.slots.clear();
        self.order.clear();
    }
}
