//!
//! # Chained Hash Table
//!
//! String-keyed, with singly-linked collision chains threaded through a node array.
//! New entries go to the head of their chain and duplicate keys are kept,
//! so [HashTable::get] returns the most recently added value for a key.
//!

// Local imports
use crate::Array1D;

/// Candidate bucket counts, descending
const PRIMES: [usize; 24] = [
    4_194_301, 2_097_143, 1_048_573, 524_287, 262_139, 131_071, 65_521, 32_749, 16_381, 8_191,
    4_093, 2_039, 1_021, 509, 251, 127, 61, 31, 17, 13, 11, 7, 5, 3,
];

/// The largest candidate prime `<= size`. Sizes below the smallest candidate get the smallest.
pub fn bucket_cnt_for(size: usize) -> usize {
    PRIMES
        .iter()
        .copied()
        .find(|p| *p <= size)
        .unwrap_or(PRIMES[PRIMES.len() - 1])
}

/// Polynomial string hash, `h * 65599 + c` per byte, in shift-add form
pub fn hash_key(key: &str) -> u32 {
    let mut h: u32 = 0;
    for c in key.bytes() {
        h = (c as u32)
            .wrapping_add(h << 6)
            .wrapping_add(h << 16)
            .wrapping_sub(h);
    }
    h
}

#[derive(Debug, Clone)]
struct Node<T> {
    key: String,
    value: T,
    next: Option<usize>,
}

/// # Chained Hash Table
#[derive(Debug, Clone)]
pub struct HashTable<T> {
    heads: Vec<Option<usize>>,
    nodes: Array1D<Node<T>>,
}
impl<T> HashTable<T> {
    /// Create a table sized for roughly `size` entries
    pub fn new(size: usize) -> Self {
        let n = bucket_cnt_for(size);
        Self {
            heads: vec![None; n],
            nodes: Array1D::new(n.min(crate::array::DEFAULT_CHUNK)),
        }
    }
    pub fn bucket_cnt(&self) -> usize {
        self.heads.len()
    }
    /// Bucket index of `key`
    pub fn bucket(&self, key: &str) -> usize {
        hash_key(key) as usize % self.heads.len()
    }
    /// Add `value` under a copy of `key`. Returns the bucket index.
    /// An existing entry for `key` is shadowed, not replaced.
    pub fn add(&mut self, key: &str, value: T) -> usize {
        let b = self.bucket(key);
        let idx = self.nodes.add(Node {
            key: key.to_string(),
            value,
            next: self.heads[b],
        });
        self.heads[b] = Some(idx);
        b
    }
    /// Index of the most recently added node for `key`
    fn find(&self, key: &str) -> Option<usize> {
        let mut cur = self.heads[self.bucket(key)];
        while let Some(idx) = cur {
            let node = &self.nodes[idx];
            if node.key == key {
                return Some(idx);
            }
            cur = node.next;
        }
        None
    }
    pub fn get(&self, key: &str) -> Option<&T> {
        self.find(key).map(|idx| &self.nodes[idx].value)
    }
    pub fn get_mut(&mut self, key: &str) -> Option<&mut T> {
        let idx = self.find(key)?;
        Some(&mut self.nodes[idx].value)
    }
    pub fn contains(&self, key: &str) -> bool {
        self.find(key).is_some()
    }
    /// Number of entries, duplicates included
    pub fn cnt(&self) -> usize {
        self.nodes.cnt()
    }
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
    /// Iterate over all `(key, value)` entries: buckets in index order, each chain newest-first
    pub fn iter(&self) -> HashIter<'_, T> {
        HashIter {
            table: self,
            bucket: 0,
            cur: None,
        }
    }
}

/// Iterator over [HashTable] entries
pub struct HashIter<'a, T> {
    table: &'a HashTable<T>,
    bucket: usize,
    cur: Option<usize>,
}
impl<'a, T> Iterator for HashIter<'a, T> {
    type Item = (&'a str, &'a T);
    fn next(&mut self) -> Option<Self::Item> {
        while self.cur.is_none() {
            if self.bucket >= self.table.heads.len() {
                return None;
            }
            self.cur = self.table.heads[self.bucket];
            self.bucket += 1;
        }
        let idx = self.cur?;
        let node = &self.table.nodes[idx];
        self.cur = node.next;
        Some((node.key.as_str(), &node.value))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bucket_counts() {
        assert_eq!(bucket_cnt_for(100), 61);
        assert_eq!(bucket_cnt_for(127), 127);
        assert_eq!(bucket_cnt_for(1), 3);
        assert_eq!(bucket_cnt_for(usize::MAX), 4_194_301);
    }
    #[test]
    fn hash_matches_shift_add_form() {
        // h * 65599 + c, folded per byte
        let expected = "ab"
            .bytes()
            .fold(0u32, |h, c| h.wrapping_mul(65599).wrapping_add(c as u32));
        assert_eq!(hash_key("ab"), expected);
        assert_eq!(hash_key(""), 0);
    }
    #[test]
    fn get_after_add() {
        let mut t = HashTable::new(64);
        for (i, name) in ["vdd", "vss", "clk", "net_12"].iter().enumerate() {
            t.add(name, i);
        }
        assert_eq!(t.get("vss"), Some(&1));
        assert_eq!(t.get("net_12"), Some(&3));
        assert_eq!(t.get("nope"), None);
        assert_eq!(t.cnt(), 4);
        assert_eq!(t.iter().count(), 4);
    }
    #[test]
    fn duplicate_key_last_insert_wins() {
        // Current behavior, kept as-is: duplicates shadow rather than replace.
        let mut t = HashTable::new(16);
        t.add("clk", 1);
        t.add("clk", 2);
        assert_eq!(t.get("clk"), Some(&2));
        assert_eq!(t.cnt(), 2);
        let vals: Vec<i32> = t.iter().filter(|(k, _)| *k == "clk").map(|(_, v)| *v).collect();
        assert_eq!(vals, vec![2, 1]);
    }
}
