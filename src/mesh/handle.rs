//! Handle and arena types for mesh entities.
//!
//! Mesh entities form a dense cyclic reference graph (edges reference
//! vertices, loops reference edges and faces, everything references back),
//! which cannot be expressed with owning pointers. Instead, every entity
//! lives in an [`Arena`] owned by the mesh and is referred to by a typed
//! generational handle. Removing an entity bumps its slot's generation, so
//! handles that outlive their entity become observably invalid instead of
//! dangling.

use std::fmt::{self, Debug};
use std::marker::PhantomData;
use std::ops;

/// Crate-internal interface shared by all handle types.
pub(crate) trait Handle: Copy + Eq {
    /// Assemble a handle from a slot index and a generation.
    fn from_parts(index: u32, generation: u32) -> Self;

    /// The slot index in the owning arena.
    fn index(self) -> usize;

    /// The generation the slot had when this handle was issued.
    fn generation(self) -> u32;
}

macro_rules! impl_handle_type {
    ($(#[$meta:meta])* $name:ident, $display:literal) => {
        $(#[$meta])*
        #[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
        pub struct $name {
            index: u32,
            generation: u32,
        }

        impl $name {
            /// Get the raw slot index. Useful for debugging output; two
            /// handles may share an index across generations.
            #[inline]
            pub fn index(self) -> usize {
                self.index as usize
            }
        }

        impl Handle for $name {
            #[inline]
            fn from_parts(index: u32, generation: u32) -> Self {
                Self { index, generation }
            }

            #[inline]
            fn index(self) -> usize {
                self.index as usize
            }

            #[inline]
            fn generation(self) -> u32 {
                self.generation
            }
        }

        impl Debug for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}({})", $display, self.index)
            }
        }
    };
}

impl_handle_type!(
    /// A handle to a vertex.
    VertexId,
    "V"
);
impl_handle_type!(
    /// A handle to an edge.
    EdgeId,
    "E"
);
impl_handle_type!(
    /// A handle to a loop (a face corner).
    LoopId,
    "L"
);
impl_handle_type!(
    /// A handle to a face.
    FaceId,
    "F"
);

#[derive(Debug, Clone)]
struct Slot<T> {
    generation: u32,
    value: Option<T>,
}

/// Generational slot storage for one entity kind.
///
/// Removal tombstones the slot, bumps its generation and recycles the index
/// through a free list, so removal is O(1) and stale handles fail the
/// generation check on every later access.
#[derive(Debug, Clone)]
pub(crate) struct Arena<H: Handle, T> {
    slots: Vec<Slot<T>>,
    free: Vec<u32>,
    len: usize,
    _handle: PhantomData<H>,
}

impl<H: Handle, T> Arena<H, T> {
    pub fn new() -> Self {
        Self {
            slots: Vec::new(),
            free: Vec::new(),
            len: 0,
            _handle: PhantomData,
        }
    }

    /// Number of live entities.
    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    /// Insert an entity and return its handle.
    pub fn insert(&mut self, value: T) -> H {
        self.insert_with(|_| value)
    }

    /// Insert an entity built from its own handle. Needed for nodes that
    /// start out as singleton cycles linking to themselves.
    pub fn insert_with(&mut self, build: impl FnOnce(H) -> T) -> H {
        let index = match self.free.pop() {
            Some(index) => index,
            None => {
                self.slots.push(Slot {
                    generation: 0,
                    value: None,
                });
                (self.slots.len() - 1) as u32
            }
        };
        let generation = self.slots[index as usize].generation;
        let handle = H::from_parts(index, generation);
        self.slots[index as usize].value = Some(build(handle));
        self.len += 1;
        handle
    }

    /// Remove an entity, invalidating its handle. Panics if the handle is
    /// stale or foreign.
    pub fn remove(&mut self, handle: H) -> T {
        let slot = &mut self.slots[handle.index()];
        assert_eq!(
            slot.generation,
            handle.generation(),
            "stale handle passed to remove"
        );
        let value = slot.value.take().expect("handle points at a vacant slot");
        slot.generation += 1;
        self.free.push(handle.index() as u32);
        self.len -= 1;
        value
    }

    pub fn get(&self, handle: H) -> Option<&T> {
        let slot = self.slots.get(handle.index())?;
        if slot.generation != handle.generation() {
            return None;
        }
        slot.value.as_ref()
    }

    pub fn get_mut(&mut self, handle: H) -> Option<&mut T> {
        let slot = self.slots.get_mut(handle.index())?;
        if slot.generation != handle.generation() {
            return None;
        }
        slot.value.as_mut()
    }

    /// Check whether a handle refers to a live entity.
    #[inline]
    pub fn contains(&self, handle: H) -> bool {
        self.get(handle).is_some()
    }

    /// Iterate over live entities with their handles, in slot order.
    pub fn iter(&self) -> impl Iterator<Item = (H, &T)> + '_ {
        self.slots.iter().enumerate().filter_map(|(index, slot)| {
            slot.value
                .as_ref()
                .map(|value| (H::from_parts(index as u32, slot.generation), value))
        })
    }

    /// Mutable variant of [`Arena::iter`].
    pub fn iter_mut(&mut self) -> impl Iterator<Item = (H, &mut T)> + '_ {
        self.slots
            .iter_mut()
            .enumerate()
            .filter_map(|(index, slot)| {
                let generation = slot.generation;
                slot.value
                    .as_mut()
                    .map(move |value| (H::from_parts(index as u32, generation), value))
            })
    }

    /// Iterate over the handles of live entities.
    pub fn handles(&self) -> impl Iterator<Item = H> + '_ {
        self.iter().map(|(handle, _)| handle)
    }
}

impl<H: Handle, T> Default for Arena<H, T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<H: Handle, T> ops::Index<H> for Arena<H, T> {
    type Output = T;

    #[inline]
    fn index(&self, handle: H) -> &T {
        self.get(handle).expect("stale or foreign handle")
    }
}

impl<H: Handle, T> ops::IndexMut<H> for Arena<H, T> {
    #[inline]
    fn index_mut(&mut self, handle: H) -> &mut T {
        self.get_mut(handle).expect("stale or foreign handle")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insert_and_get() {
        let mut arena: Arena<VertexId, &str> = Arena::new();
        let a = arena.insert("a");
        let b = arena.insert("b");

        assert_eq!(arena.len(), 2);
        assert_eq!(arena[a], "a");
        assert_eq!(arena[b], "b");
        assert_ne!(a, b);
    }

    #[test]
    fn test_remove_invalidates_handle() {
        let mut arena: Arena<VertexId, u32> = Arena::new();
        let a = arena.insert(7);
        assert_eq!(arena.remove(a), 7);

        assert_eq!(arena.len(), 0);
        assert!(!arena.contains(a));
        assert!(arena.get(a).is_none());
    }

    #[test]
    fn test_slot_reuse_bumps_generation() {
        let mut arena: Arena<VertexId, u32> = Arena::new();
        let a = arena.insert(1);
        arena.remove(a);
        let b = arena.insert(2);

        // Same slot, different generation.
        assert_eq!(a.index(), b.index());
        assert_ne!(a, b);
        assert!(!arena.contains(a));
        assert_eq!(arena[b], 2);
    }

    #[test]
    fn test_insert_with_sees_own_handle() {
        let mut arena: Arena<LoopId, LoopId> = Arena::new();
        let l = arena.insert_with(|id| id);
        assert_eq!(arena[l], l);
    }

    #[test]
    fn test_iter_skips_vacant_slots() {
        let mut arena: Arena<EdgeId, u32> = Arena::new();
        let a = arena.insert(1);
        let b = arena.insert(2);
        let c = arena.insert(3);
        arena.remove(b);

        let collected: Vec<_> = arena.iter().map(|(h, &v)| (h, v)).collect();
        assert_eq!(collected, vec![(a, 1), (c, 3)]);
    }

    #[test]
    fn test_debug_format() {
        let mut arena: Arena<VertexId, ()> = Arena::new();
        let v = arena.insert(());
        assert_eq!(format!("{:?}", v), "V(0)");
    }
}
