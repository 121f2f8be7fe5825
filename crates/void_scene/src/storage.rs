//! Generational slot storage for scene nodes
//!
//! O(1) insertion, removal and lookup with use-after-free detection.

use crate::handle::NodeHandle;

/// Slot entry
struct Slot<T> {
    value: Option<T>,
    generation: u32,
}

/// Slot storage addressed by [`NodeHandle`]
pub(crate) struct NodeStorage<T> {
    slots: Vec<Slot<T>>,
    free_list: Vec<u32>,
    len: usize,
}

impl<T> NodeStorage<T> {
    pub fn new() -> Self {
        Self {
            slots: Vec::new(),
            free_list: Vec::new(),
            len: 0,
        }
    }

    /// Insert a value and get its handle
    pub fn insert(&mut self, value: T) -> NodeHandle {
        self.len += 1;

        if let Some(index) = self.free_list.pop() {
            let slot = &mut self.slots[index as usize];
            slot.value = Some(value);
            NodeHandle::new(index, slot.generation)
        } else {
            let index = self.slots.len() as u32;
            self.slots.push(Slot {
                value: Some(value),
                generation: 0,
            });
            NodeHandle::new(index, 0)
        }
    }

    /// Remove a value by handle
    pub fn remove(&mut self, handle: NodeHandle) -> Option<T> {
        let slot = self.slots.get_mut(handle.index() as usize)?;

        if slot.generation != handle.generation() || slot.value.is_none() {
            return None;
        }

        slot.generation = slot.generation.wrapping_add(1);
        self.free_list.push(handle.index());
        self.len -= 1;

        slot.value.take()
    }

    pub fn get(&self, handle: NodeHandle) -> Option<&T> {
        let slot = self.slots.get(handle.index() as usize)?;
        if slot.generation != handle.generation() {
            return None;
        }
        slot.value.as_ref()
    }

    pub fn get_mut(&mut self, handle: NodeHandle) -> Option<&mut T> {
        let slot = self.slots.get_mut(handle.index() as usize)?;
        if slot.generation != handle.generation() {
            return None;
        }
        slot.value.as_mut()
    }

    pub fn contains(&self, handle: NodeHandle) -> bool {
        self.get(handle).is_some()
    }

    pub fn len(&self) -> usize {
        self.len
    }

    /// Iterate over live handles
    pub fn handles(&self) -> impl Iterator<Item = NodeHandle> + '_ {
        self.slots.iter().enumerate().filter_map(|(i, slot)| {
            slot.value
                .as_ref()
                .map(|_| NodeHandle::new(i as u32, slot.generation))
        })
    }
}
