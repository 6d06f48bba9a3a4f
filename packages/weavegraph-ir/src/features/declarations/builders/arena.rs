//! Generation-tagged builder arena
//!
//! Slots move Vacant -> Pending -> Sealed. Sealing hands the builder's
//! declaration out as an `Arc` the model keeps; releasing frees the slot and
//! bumps its generation so ids taken before the release no longer resolve.

use super::Builder;
use crate::features::declarations::domain::BuiltDeclaration;
use crate::features::references::{DanglingReferenceError, DeclRef};
use crate::shared::models::BuilderId;
use std::sync::Arc;
use tracing::trace;

#[derive(Debug)]
enum Slot {
    Vacant,
    Pending(Builder),
    Sealed(Arc<BuiltDeclaration>),
}

#[derive(Debug)]
struct Entry {
    generation: u32,
    slot: Slot,
}

#[derive(Debug, Default)]
pub struct BuilderArena {
    entries: Vec<Entry>,
    free: Vec<u32>,
}

impl BuilderArena {
    pub fn new() -> Self {
        Self::default()
    }

    /// Arena that never hands out the first `reserved` indices
    ///
    /// Used when weaving on top of a model that already holds built
    /// declarations.
    pub fn reserving(reserved: u32) -> Self {
        Self {
            entries: (0..reserved)
                .map(|_| Entry {
                    generation: 0,
                    slot: Slot::Vacant,
                })
                .collect(),
            free: Vec::new(),
        }
    }

    /// Reserve an id, then build the builder that carries it
    pub fn allocate<B, F>(&mut self, make: F) -> BuilderId
    where
        B: Into<Builder>,
        F: FnOnce(BuilderId) -> B,
    {
        let id = match self.free.pop() {
            Some(index) => {
                let entry = &self.entries[index as usize];
                BuilderId::new(index, entry.generation)
            }
            None => {
                self.entries.push(Entry {
                    generation: 0,
                    slot: Slot::Vacant,
                });
                BuilderId::new((self.entries.len() - 1) as u32, 0)
            }
        };

        let builder = make(id).into();
        debug_assert_eq!(builder.id(), id, "builder must carry its allocated id");
        self.entries[id.index as usize].slot = Slot::Pending(builder);
        id
    }

    fn entry(&self, id: BuilderId) -> Option<&Entry> {
        self.entries
            .get(id.index as usize)
            .filter(|e| e.generation == id.generation)
    }

    fn entry_mut(&mut self, id: BuilderId) -> Option<&mut Entry> {
        self.entries
            .get_mut(id.index as usize)
            .filter(|e| e.generation == id.generation)
    }

    /// Pending builder
    pub fn get(&self, id: BuilderId) -> Option<&Builder> {
        match &self.entry(id)?.slot {
            Slot::Pending(builder) => Some(builder),
            _ => None,
        }
    }

    pub fn get_mut(&mut self, id: BuilderId) -> Option<&mut Builder> {
        match &mut self.entry_mut(id)?.slot {
            Slot::Pending(builder) => Some(builder),
            _ => None,
        }
    }

    /// Sealed declaration
    pub fn sealed(&self, id: BuilderId) -> Option<&Arc<BuiltDeclaration>> {
        match &self.entry(id)?.slot {
            Slot::Sealed(built) => Some(built),
            _ => None,
        }
    }

    pub fn is_pending(&self, id: BuilderId) -> bool {
        self.get(id).is_some()
    }

    /// Freeze a pending builder
    ///
    /// Sealing twice returns the same declaration.
    pub fn seal(&mut self, id: BuilderId) -> Result<Arc<BuiltDeclaration>, DanglingReferenceError> {
        let entry = self
            .entry_mut(id)
            .ok_or_else(|| DanglingReferenceError::new(DeclRef::Built(id)))?;

        match std::mem::replace(&mut entry.slot, Slot::Vacant) {
            Slot::Pending(builder) => {
                let built = Arc::new(builder.build());
                entry.slot = Slot::Sealed(Arc::clone(&built));
                trace!(builder = %id, "sealed builder");
                Ok(built)
            }
            Slot::Sealed(built) => {
                entry.slot = Slot::Sealed(Arc::clone(&built));
                Ok(built)
            }
            Slot::Vacant => Err(DanglingReferenceError::new(DeclRef::Built(id))),
        }
    }

    /// Drop a builder and invalidate its id
    pub fn release(&mut self, id: BuilderId) -> bool {
        let Some(entry) = self.entry_mut(id) else {
            return false;
        };
        if matches!(entry.slot, Slot::Vacant) {
            return false;
        }
        entry.slot = Slot::Vacant;
        entry.generation = entry.generation.wrapping_add(1);
        self.free.push(id.index);
        trace!(builder = %id, "released builder");
        true
    }

    pub fn pending_count(&self) -> usize {
        self.entries
            .iter()
            .filter(|e| matches!(e.slot, Slot::Pending(_)))
            .count()
    }

    pub fn sealed_count(&self) -> usize {
        self.entries
            .iter()
            .filter(|e| matches!(e.slot, Slot::Sealed(_)))
            .count()
    }
}
