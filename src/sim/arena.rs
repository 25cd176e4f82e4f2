//! Capacity-bounded slot map for simulation entities
//!
//! Storage is a `Vec` of slots; vacant slots are chained into a free list and
//! reused first. Every slot carries a generation that is bumped on removal, so
//! a `Handle` to a removed entity never aliases whatever reuses its slot.

use serde::{Deserialize, Serialize};

/// End of the free list
const NONE: usize = usize::MAX;

/// Non-owning reference to an arena entry
///
/// Ordered by slot index first so handle-keyed tables can be binary searched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Handle {
    index: u32,
    generation: u32,
}

impl Handle {
    /// Raw slot index
    #[inline]
    pub const fn index(self) -> usize {
        self.index as usize
    }

    #[inline]
    pub const fn generation(self) -> u32 {
        self.generation
    }
}

#[derive(Debug, Clone)]
enum Slot<T> {
    Occupied(T),
    /// Next free slot (or `NONE`)
    Vacant(usize),
}

#[derive(Debug, Clone)]
struct Entry<T> {
    generation: u32,
    slot: Slot<T>,
}

/// Generational arena with a hard capacity
#[derive(Debug, Clone)]
pub struct Arena<T> {
    entries: Vec<Entry<T>>,
    free_head: usize,
    len: usize,
    capacity: usize,
}

impl<T> Arena<T> {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            entries: Vec::with_capacity(capacity.min(1024)),
            free_head: NONE,
            len: 0,
            capacity,
        }
    }

    /// Store a value. Returns `None` when the arena is full.
    pub fn insert(&mut self, value: T) -> Option<Handle> {
        if self.len >= self.capacity {
            log::warn!("Entity pool exhausted ({} slots)", self.capacity);
            return None;
        }

        let index = if self.free_head != NONE {
            let index = self.free_head;
            let entry = &mut self.entries[index];
            if let Slot::Vacant(next) = entry.slot {
                self.free_head = next;
            }
            entry.slot = Slot::Occupied(value);
            index
        } else {
            let index = self.entries.len();
            self.entries.push(Entry {
                generation: 0,
                slot: Slot::Occupied(value),
            });
            index
        };

        self.len += 1;
        Some(Handle {
            index: index as u32,
            generation: self.entries[index].generation,
        })
    }

    /// Remove and return the value behind `handle`
    pub fn remove(&mut self, handle: Handle) -> Option<T> {
        if !self.contains(handle) {
            return None;
        }
        let index = handle.index();
        let entry = &mut self.entries[index];
        let old = std::mem::replace(&mut entry.slot, Slot::Vacant(self.free_head));
        entry.generation = entry.generation.wrapping_add(1);
        self.free_head = index;
        self.len -= 1;

        match old {
            Slot::Occupied(value) => Some(value),
            Slot::Vacant(_) => None,
        }
    }

    /// Whether `handle` still refers to a live entry
    pub fn contains(&self, handle: Handle) -> bool {
        self.get(handle).is_some()
    }

    pub fn get(&self, handle: Handle) -> Option<&T> {
        match self.entries.get(handle.index()) {
            Some(Entry {
                generation,
                slot: Slot::Occupied(value),
            }) if *generation == handle.generation => Some(value),
            _ => None,
        }
    }

    pub fn get_mut(&mut self, handle: Handle) -> Option<&mut T> {
        match self.entries.get_mut(handle.index()) {
            Some(Entry {
                generation,
                slot: Slot::Occupied(value),
            }) if *generation == handle.generation => Some(value),
            _ => None,
        }
    }

    /// Live entries in slot order
    pub fn iter(&self) -> impl Iterator<Item = (Handle, &T)> {
        self.entries
            .iter()
            .enumerate()
            .filter_map(|(index, entry)| match &entry.slot {
                Slot::Occupied(value) => Some((
                    Handle {
                        index: index as u32,
                        generation: entry.generation,
                    },
                    value,
                )),
                Slot::Vacant(_) => None,
            })
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = (Handle, &mut T)> {
        self.entries
            .iter_mut()
            .enumerate()
            .filter_map(|(index, entry)| {
                let generation = entry.generation;
                match &mut entry.slot {
                    Slot::Occupied(value) => Some((
                        Handle {
                            index: index as u32,
                            generation,
                        },
                        value,
                    )),
                    Slot::Vacant(_) => None,
                }
            })
    }

    /// Snapshot of live handles, in slot order
    pub fn handles(&self) -> Vec<Handle> {
        self.iter().map(|(handle, _)| handle).collect()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    #[inline]
    pub fn capacity(&self) -> usize {
        self.capacity
    }
}
