//!
//! # Name Table
//!
//! Interns strings to small integer tags.
//! Buckets live in a [Pool], so a name's tag never changes once issued;
//! a [HashTable] maps each name to its bucket.
//!

// Local imports
use crate::{HashTable, Pool};

/// Interned-name record
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NameBucket {
    pub name: String,
    pub tag: u32,
    /// Caller-supplied payload, typically the id of the named object
    pub data_id: u32,
}

/// # Name Table
#[derive(Debug, Clone)]
pub struct NameTable {
    buckets: Pool<NameBucket>,
    hash: HashTable<u32>,
}
impl NameTable {
    /// Create a [NameTable] sized for roughly `size` names
    pub fn new(size: usize) -> Self {
        Self {
            buckets: Pool::new(size.max(1)),
            hash: HashTable::new(size),
        }
    }
    /// Intern `name` with payload `data_id`, returning its tag.
    /// Names already present keep their tag and payload.
    pub fn add(&mut self, name: &str, data_id: u32) -> u32 {
        if let Some(tag) = self.tag(name) {
            return tag;
        }
        let h = self.buckets.allocate_with(|h| NameBucket {
            name: name.to_string(),
            tag: h.index(),
            data_id,
        });
        self.hash.add(name, h.index());
        h.index()
    }
    pub fn tag(&self, name: &str) -> Option<u32> {
        self.hash.get(name).copied()
    }
    fn bucket(&self, tag: u32) -> Option<&NameBucket> {
        self.buckets.handle_at(tag).and_then(|h| self.buckets.get(h))
    }
    pub fn name(&self, tag: u32) -> Option<&str> {
        self.bucket(tag).map(|b| b.name.as_str())
    }
    pub fn data_id(&self, name: &str) -> Option<u32> {
        self.tag(name).and_then(|t| self.data_id_by_tag(t))
    }
    pub fn data_id_by_tag(&self, tag: u32) -> Option<u32> {
        self.bucket(tag).map(|b| b.data_id)
    }
    /// Number of interned names
    pub fn cnt(&self) -> usize {
        self.buckets.live_cnt()
    }
}
impl Default for NameTable {
    fn default() -> Self {
        Self::new(1024)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn interning() {
        let mut t = NameTable::new(32);
        let vdd = t.add("VDD", 100);
        let vss = t.add("VSS", 200);
        assert_ne!(vdd, vss);
        assert_eq!(t.add("VDD", 999), vdd);
        assert_eq!(t.name(vss), Some("VSS"));
        assert_eq!(t.data_id("VDD"), Some(100));
        assert_eq!(t.data_id_by_tag(vss), Some(200));
        assert_eq!(t.tag("GND"), None);
        assert_eq!(t.cnt(), 2);
    }
}
