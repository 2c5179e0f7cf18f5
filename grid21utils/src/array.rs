//!
//! # Growable Arrays
//!
//! [Array1D] is a flat, chunk-grown array with a fill count,
//! used throughout as a result table and as LIFO free-list.
//! [Array2D] is a table of independently-growing [Array1D] rows.
//!
//! Neither keeps element addresses stable across growth.
//! See [crate::SegArray] for that.
//!

// Std-Lib
use std::ops::{Index, IndexMut};

/// Default number of elements added per re-allocation
pub const DEFAULT_CHUNK: usize = 1024;

///
/// # Growable One-Dimensional Array
///
/// Appends are amortized O(1); the backing buffer grows by `chunk` elements at a time.
/// Indexing past the fill count with `[]` is a caller bug and panics.
/// [Array1D::geti] and [Array1D::set] instead grow the array to fit.
///
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Array1D<T> {
    data: Vec<T>,
    chunk: usize,
}
impl<T> Array1D<T> {
    /// Create a new, empty [Array1D] growing by `chunk` elements at a time
    pub fn new(chunk: usize) -> Self {
        let chunk = chunk.max(1);
        Self {
            data: Vec::with_capacity(chunk),
            chunk,
        }
    }
    /// Append `v`. Returns its index.
    pub fn add(&mut self, v: T) -> usize {
        if self.data.len() == self.data.capacity() {
            self.data.reserve_exact(self.chunk);
        }
        self.data.push(v);
        self.data.len() - 1
    }
    /// Get a reference to element `idx`, if in range
    pub fn get(&self, idx: usize) -> Option<&T> {
        self.data.get(idx)
    }
    /// Get a mutable reference to element `idx`, if in range
    pub fn get_mut(&mut self, idx: usize) -> Option<&mut T> {
        self.data.get_mut(idx)
    }
    /// Remove and return the last element
    pub fn pop(&mut self) -> Option<T> {
        self.data.pop()
    }
    /// Get the last element
    pub fn last(&self) -> Option<&T> {
        self.data.last()
    }
    /// Number of filled elements
    pub fn cnt(&self) -> usize {
        self.data.len()
    }
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
    /// Reset the fill count to zero, keeping the allocation
    pub fn reset_cnt(&mut self) {
        self.data.clear();
    }
    /// Allocated capacity, in elements
    pub fn capacity(&self) -> usize {
        self.data.capacity()
    }
    pub fn iter(&self) -> std::slice::Iter<'_, T> {
        self.data.iter()
    }
    pub fn iter_mut(&mut self) -> std::slice::IterMut<'_, T> {
        self.data.iter_mut()
    }
    pub fn as_slice(&self) -> &[T] {
        &self.data
    }
}
impl<T: PartialEq> Array1D<T> {
    /// Linear scan for the first element equal to `v`
    pub fn find_index(&self, v: &T) -> Option<usize> {
        self.data.iter().position(|e| e == v)
    }
}
impl<T: PartialOrd> Array1D<T> {
    /// For ascending-ordered contents: the first index whose element is `>= v`.
    /// Returns `None` if every element is smaller.
    pub fn find_next_biggest_index(&self, v: &T) -> Option<usize> {
        let idx = self.data.partition_point(|e| e < v);
        if idx < self.data.len() {
            Some(idx)
        } else {
            None
        }
    }
}
impl<T: Default> Array1D<T> {
    /// Grow with default values until index `idx` is valid
    fn fit(&mut self, idx: usize) {
        while self.data.len() <= idx {
            self.add(T::default());
        }
    }
    /// Get a mutable reference to element `idx`, growing the array if necessary
    pub fn geti(&mut self, idx: usize) -> &mut T {
        self.fit(idx);
        &mut self.data[idx]
    }
    /// Set element `idx` to `v`, growing the array if necessary
    pub fn set(&mut self, idx: usize, v: T) {
        *self.geti(idx) = v;
    }
}
impl<T> Default for Array1D<T> {
    fn default() -> Self {
        Self::new(DEFAULT_CHUNK)
    }
}
impl<T> Index<usize> for Array1D<T> {
    type Output = T;
    fn index(&self, idx: usize) -> &T {
        &self.data[idx]
    }
}
impl<T> IndexMut<usize> for Array1D<T> {
    fn index_mut(&mut self, idx: usize) -> &mut T {
        &mut self.data[idx]
    }
}
impl<'a, T> IntoIterator for &'a Array1D<T> {
    type Item = &'a T;
    type IntoIter = std::slice::Iter<'a, T>;
    fn into_iter(self) -> Self::IntoIter {
        self.data.iter()
    }
}
impl<T> From<Array1D<T>> for Vec<T> {
    fn from(a: Array1D<T>) -> Self {
        a.data
    }
}

///
/// # Two-Dimensional Array
///
/// A fixed number of rows, each an independently-growing [Array1D].
///
#[derive(Debug, Clone)]
pub struct Array2D<T> {
    rows: Vec<Array1D<T>>,
}
impl<T> Array2D<T> {
    /// Create `row_cnt` empty rows, each growing by `chunk`
    pub fn new(row_cnt: usize, chunk: usize) -> Self {
        let rows = (0..row_cnt).map(|_| Array1D::new(chunk)).collect();
        Self { rows }
    }
    /// Append `v` to row `row`. Returns its column index, or `None` if `row` is out of range.
    pub fn add(&mut self, row: usize, v: T) -> Option<usize> {
        self.rows.get_mut(row).map(|r| r.add(v))
    }
    pub fn get(&self, row: usize, col: usize) -> Option<&T> {
        self.rows.get(row).and_then(|r| r.get(col))
    }
    pub fn get_mut(&mut self, row: usize, col: usize) -> Option<&mut T> {
        self.rows.get_mut(row).and_then(|r| r.get_mut(col))
    }
    pub fn row(&self, row: usize) -> Option<&Array1D<T>> {
        self.rows.get(row)
    }
    pub fn row_cnt(&self) -> usize {
        self.rows.len()
    }
    /// Fill count of row `row`. Zero for out-of-range rows.
    pub fn cnt(&self, row: usize) -> usize {
        self.rows.get(row).map(Array1D::cnt).unwrap_or(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn add_get_pop() {
        let mut a = Array1D::new(2);
        assert_eq!(a.add(10), 0);
        assert_eq!(a.add(11), 1);
        assert_eq!(a.add(12), 2);
        assert_eq!(a.cnt(), 3);
        assert!(a.capacity() >= 3);
        assert_eq!(a[1], 11);
        assert_eq!(a.get(3), None);
        assert_eq!(a.pop(), Some(12));
        assert_eq!(a.pop(), Some(11));
        assert_eq!(a.cnt(), 1);
    }
    #[test]
    fn auto_grow() {
        let mut a: Array1D<u32> = Array1D::new(4);
        a.set(9, 7);
        assert_eq!(a.cnt(), 10);
        assert_eq!(a[9], 7);
        assert_eq!(a[3], 0);
        *a.geti(12) += 1;
        assert_eq!(a[12], 1);
    }
    #[test]
    fn ordered_search() {
        let mut a = Array1D::new(8);
        for v in [1, 3, 5, 9] {
            a.add(v);
        }
        assert_eq!(a.find_index(&5), Some(2));
        assert_eq!(a.find_index(&4), None);
        assert_eq!(a.find_next_biggest_index(&4), Some(2));
        assert_eq!(a.find_next_biggest_index(&5), Some(2));
        assert_eq!(a.find_next_biggest_index(&10), None);
    }
    #[test]
    #[should_panic]
    fn index_past_fill_count() {
        let a: Array1D<u8> = Array1D::new(4);
        let _ = a[0];
    }
    #[test]
    fn rows() {
        let mut t = Array2D::new(2, 4);
        assert_eq!(t.add(1, 'a'), Some(0));
        assert_eq!(t.add(1, 'b'), Some(1));
        assert_eq!(t.add(2, 'c'), None);
        assert_eq!(t.get(1, 1), Some(&'b'));
        assert_eq!(t.cnt(0), 0);
        assert_eq!(t.cnt(1), 2);
        assert_eq!(t.row_cnt(), 2);
    }
}
