//!
//! # Segmented Array
//!
//! Two-level array: a growable table of fixed-size element blocks.
//! Growth only ever adds a block; existing blocks are never re-allocated,
//! so elements keep their addresses for the life of the array.
//!

// Std-Lib
use std::ops::{Index, IndexMut};

// Crates.io
use log::trace;

/// # Segmented Array
#[derive(Debug, Clone)]
pub struct SegArray<T> {
    /// Element blocks. Each is allocated with capacity `alloc_size` and never pushed beyond it.
    blocks: Vec<Vec<T>>,
    alloc_size: usize,
    cnt: usize,
}
impl<T> SegArray<T> {
    /// Create a new [SegArray] with blocks of `alloc_size` elements
    pub fn new(alloc_size: usize) -> Self {
        Self {
            blocks: Vec::new(),
            alloc_size: alloc_size.max(1),
            cnt: 0,
        }
    }
    /// Append `v`, returning its index
    pub fn add(&mut self, v: T) -> usize {
        let (block, _) = self.split(self.cnt);
        if block == self.blocks.len() {
            trace!("SegArray: adding block #{} of {}", block, self.alloc_size);
            self.blocks.push(Vec::with_capacity(self.alloc_size));
        }
        self.blocks[block].push(v);
        self.cnt += 1;
        self.cnt - 1
    }
    /// (block, offset) for index `idx`
    #[inline]
    fn split(&self, idx: usize) -> (usize, usize) {
        (idx / self.alloc_size, idx % self.alloc_size)
    }
    pub fn get(&self, idx: usize) -> Option<&T> {
        if idx >= self.cnt {
            return None;
        }
        let (b, o) = self.split(idx);
        self.blocks.get(b).and_then(|blk| blk.get(o))
    }
    pub fn get_mut(&mut self, idx: usize) -> Option<&mut T> {
        if idx >= self.cnt {
            return None;
        }
        let (b, o) = self.split(idx);
        self.blocks.get_mut(b).and_then(|blk| blk.get_mut(o))
    }
    /// Number of elements ever added
    pub fn cnt(&self) -> usize {
        self.cnt
    }
    pub fn is_empty(&self) -> bool {
        self.cnt == 0
    }
    pub fn alloc_size(&self) -> usize {
        self.alloc_size
    }
    /// Number of allocated blocks
    pub fn block_cnt(&self) -> usize {
        self.blocks.len()
    }
    pub fn iter(&self) -> impl Iterator<Item = &T> {
        self.blocks.iter().flat_map(|b| b.iter())
    }
    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut T> {
        self.blocks.iter_mut().flat_map(|b| b.iter_mut())
    }
}
impl<T> Index<usize> for SegArray<T> {
    type Output = T;
    fn index(&self, idx: usize) -> &T {
        let (b, o) = self.split(idx);
        &self.blocks[b][o]
    }
}
impl<T> IndexMut<usize> for SegArray<T> {
    fn index_mut(&mut self, idx: usize) -> &mut T {
        let (b, o) = self.split(idx);
        &mut self.blocks[b][o]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blocks_and_offsets() {
        let mut a = SegArray::new(4);
        for v in 0..10 {
            assert_eq!(a.add(v * 10), v);
        }
        assert_eq!(a.cnt(), 10);
        assert_eq!(a.block_cnt(), 3);
        assert_eq!(a[5], 50);
        assert_eq!(a.get(9), Some(&90));
        assert_eq!(a.get(10), None);
        assert_eq!(a.iter().count(), 10);
    }
    #[test]
    fn addresses_survive_growth() {
        let mut a = SegArray::new(2);
        a.add(1u64);
        let p0 = &a[0] as *const u64;
        for v in 0..100 {
            a.add(v);
        }
        assert_eq!(p0, &a[0] as *const u64);
    }
}
