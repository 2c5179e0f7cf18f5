//!
//! # Object Pool
//!
//! Generation-checked slot arena over a [SegArray].
//! Freed slots go onto a LIFO free-list and are handed out again before the arena grows.
//! Slots never move, and every [Handle] carries the generation it was issued with,
//! so a handle to a freed (or freed-and-reused) slot reads as `None` rather than aliasing.
//!

// Std-Lib
use std::ops::{Index, IndexMut};

// Crates.io
use serde::{Deserialize, Serialize};

// Local imports
use crate::{Array1D, SegArray};

/// # Pool Handle
///
/// Slot index plus the slot's generation at allocation time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Handle {
    index: u32,
    generation: u32,
}
impl Handle {
    /// Slot index. Doubles as the object's public integer id.
    pub fn index(&self) -> u32 {
        self.index
    }
    pub fn generation(&self) -> u32 {
        self.generation
    }
}
impl std::fmt::Display for Handle {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "#{}.{}", self.index, self.generation)
    }
}

#[derive(Debug, Clone)]
struct Slot<T> {
    value: Option<T>,
    generation: u32,
}

/// # Object Pool
#[derive(Debug, Clone)]
pub struct Pool<T> {
    slots: SegArray<Slot<T>>,
    free: Array1D<u32>,
}
impl<T> Pool<T> {
    /// Create a new [Pool], growing `chunk` slots at a time
    pub fn new(chunk: usize) -> Self {
        Self {
            slots: SegArray::new(chunk),
            free: Array1D::new(chunk),
        }
    }
    /// Allocate a slot for `value`
    pub fn allocate(&mut self, value: T) -> Handle {
        self.allocate_with(|_| value)
    }
    /// Allocate a slot, constructing its value from the new [Handle].
    /// Recycled slots are preferred over growth.
    pub fn allocate_with(&mut self, f: impl FnOnce(Handle) -> T) -> Handle {
        if let Some(index) = self.free.pop() {
            let slot = &mut self.slots[index as usize];
            let h = Handle {
                index,
                generation: slot.generation,
            };
            slot.value = Some(f(h));
            return h;
        }
        let h = Handle {
            index: self.slots.cnt() as u32,
            generation: 0,
        };
        self.slots.add(Slot {
            value: Some(f(h)),
            generation: 0,
        });
        h
    }
    /// Free the slot at `h`, returning its value.
    /// Stale handles (already freed, or from an earlier generation) return `None` and change nothing.
    pub fn deallocate(&mut self, h: Handle) -> Option<T> {
        let slot = self.slots.get_mut(h.index as usize)?;
        if slot.generation != h.generation || slot.value.is_none() {
            return None;
        }
        slot.generation = slot.generation.wrapping_add(1);
        let value = slot.value.take();
        self.free.add(h.index);
        value
    }
    pub fn get(&self, h: Handle) -> Option<&T> {
        let slot = self.slots.get(h.index as usize)?;
        if slot.generation != h.generation {
            return None;
        }
        slot.value.as_ref()
    }
    pub fn get_mut(&mut self, h: Handle) -> Option<&mut T> {
        let slot = self.slots.get_mut(h.index as usize)?;
        if slot.generation != h.generation {
            return None;
        }
        slot.value.as_mut()
    }
    /// Boolean indication of whether `h` refers to a live object
    pub fn contains(&self, h: Handle) -> bool {
        self.get(h).is_some()
    }
    /// Resolve a public integer id to the live [Handle] currently at that slot
    pub fn handle_at(&self, index: u32) -> Option<Handle> {
        let slot = self.slots.get(index as usize)?;
        slot.value.as_ref().map(|_| Handle {
            index,
            generation: slot.generation,
        })
    }
    /// High-water mark: number of slots ever allocated, live or free
    pub fn cnt(&self) -> usize {
        self.slots.cnt()
    }
    /// Number of live objects
    pub fn live_cnt(&self) -> usize {
        self.slots.cnt() - self.free.cnt()
    }
    /// Number of slots waiting on the free-list
    pub fn free_cnt(&self) -> usize {
        self.free.cnt()
    }
    /// Iterate over live objects and their handles, in slot order
    pub fn iter(&self) -> impl Iterator<Item = (Handle, &T)> {
        self.slots.iter().enumerate().filter_map(|(i, s)| {
            s.value.as_ref().map(|v| {
                let h = Handle {
                    index: i as u32,
                    generation: s.generation,
                };
                (h, v)
            })
        })
    }
}
impl<T> Default for Pool<T> {
    fn default() -> Self {
        Self::new(crate::array::DEFAULT_CHUNK)
    }
}
/// Indexing by [Handle] panics on a stale handle.
/// Use [Pool::get] for handles of uncertain provenance.
impl<T> Index<Handle> for Pool<T> {
    type Output = T;
    fn index(&self, h: Handle) -> &T {
        match self.get(h) {
            Some(v) => v,
            None => panic!("stale pool handle {}", h),
        }
    }
}
impl<T> IndexMut<Handle> for Pool<T> {
    fn index_mut(&mut self, h: Handle) -> &mut T {
        match self.get_mut(h) {
            Some(v) => v,
            None => panic!("stale pool handle {}", h),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn free_then_alloc_reuses_slot() {
        let mut p = Pool::new(4);
        let a = p.allocate("a");
        let b = p.allocate("b");
        assert_eq!(p.deallocate(a), Some("a"));
        let c = p.allocate("c");
        // Reuse before growth
        assert_eq!(c.index(), a.index());
        assert_eq!(p.cnt(), 2);
        assert_eq!(p.live_cnt(), 2);
        // The old handle is stale, the new one is live
        assert_eq!(p.get(a), None);
        assert_eq!(p.get(c), Some(&"c"));
        assert_eq!(p[b], "b");
    }
    #[test]
    fn double_free_is_refused() {
        let mut p = Pool::new(4);
        let a = p.allocate(1);
        assert_eq!(p.deallocate(a), Some(1));
        assert_eq!(p.deallocate(a), None);
        assert_eq!(p.free_cnt(), 1);
    }
    #[test]
    fn high_water_count() {
        let mut p = Pool::new(2);
        let hs: Vec<Handle> = (0..5).map(|i| p.allocate(i)).collect();
        for h in &hs[..3] {
            p.deallocate(*h);
        }
        assert_eq!(p.cnt(), 5);
        assert_eq!(p.live_cnt(), 2);
        assert_eq!(p.iter().count(), 2);
    }
    #[test]
    fn self_referencing_values() {
        let mut p = Pool::new(2);
        let h = p.allocate_with(|h| h.index() * 2);
        let g = p.allocate_with(|h| h.index() * 2);
        assert_eq!(p[h], 0);
        assert_eq!(p[g], 2);
        assert_eq!(p.handle_at(1), Some(g));
        assert_eq!(p.handle_at(7), None);
    }
    #[test]
    fn addresses_are_stable() {
        let mut p = Pool::new(2);
        let h = p.allocate(5u64);
        let addr = &p[h] as *const u64;
        for i in 0..64 {
            p.allocate(i);
        }
        assert_eq!(addr, &p[h] as *const u64);
    }
}
