//!
//! # Tagged Rectangles
//!
//! [Rect] is the placed-box record: an axis-aligned rectangle plus two packed
//! words of owner, layer and type tags. Rects allocated from a [Pool] may be
//! threaded into singly-linked chains via `next`.
//!

// Crates.io
use serde::{Deserialize, Serialize};

// Local imports
use crate::utils::{Handle, Pool};
use crate::{intersect, Dir, Int, Transform};

// Packed-word layouts.
// Word 1: owner (23 bits) | owner-type (4) | layer (4) | valid (1)
const OWNER_BITS: u32 = 23;
const OTYPE_SHIFT: u32 = 23;
const LAYER_SHIFT: u32 = 27;
const VALID_SHIFT: u32 = 31;
// Word 2: clip (1) | id (28) | box-type (3)
const ID_SHIFT: u32 = 1;
const ID_BITS: u32 = 28;
const BTYPE_SHIFT: u32 = 29;

/// Bit-mask of the low `bits` bits
const fn mask(bits: u32) -> u32 {
    (1 << bits) - 1
}

/// # Tagged Rectangle
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rect {
    pub xlo: Int,
    pub ylo: Int,
    pub xhi: Int,
    pub yhi: Int,
    word1: u32,
    word2: u32,
    /// Next rect in a pool-resident chain
    pub next: Option<Handle>,
}
impl Rect {
    /// Create a valid [Rect] from any two opposite corners
    pub fn new(x1: Int, y1: Int, x2: Int, y2: Int) -> Self {
        let mut r = Self::default();
        r.set_coords(x1, y1, x2, y2);
        r.set_valid(true);
        r
    }
    /// Create from user-unit coordinates, scaled by `units` per user unit and rounded
    pub fn new_scaled(x1: f64, y1: f64, x2: f64, y2: f64, units: Int) -> Self {
        let s = |v: f64| (v * units as f64).round() as Int;
        Self::new(s(x1), s(y1), s(x2), s(y2))
    }
    /// Set all four coordinates, normalizing so that lo <= hi
    pub fn set_coords(&mut self, x1: Int, y1: Int, x2: Int, y2: Int) {
        self.xlo = x1.min(x2);
        self.xhi = x1.max(x2);
        self.ylo = y1.min(y2);
        self.yhi = y1.max(y2);
    }

    pub fn owner(&self) -> u32 {
        self.word1 & mask(OWNER_BITS)
    }
    /// Set the owner id. Bits beyond the 23-bit field are dropped.
    pub fn set_owner(&mut self, owner: u32) {
        self.word1 = (self.word1 & !mask(OWNER_BITS)) | (owner & mask(OWNER_BITS));
    }
    pub fn owner_type(&self) -> u8 {
        ((self.word1 >> OTYPE_SHIFT) & mask(4)) as u8
    }
    pub fn set_owner_type(&mut self, otype: u8) {
        self.word1 = (self.word1 & !(mask(4) << OTYPE_SHIFT))
            | ((otype as u32 & mask(4)) << OTYPE_SHIFT);
    }
    pub fn layer(&self) -> u8 {
        ((self.word1 >> LAYER_SHIFT) & mask(4)) as u8
    }
    pub fn set_layer(&mut self, layer: u8) {
        self.word1 = (self.word1 & !(mask(4) << LAYER_SHIFT))
            | ((layer as u32 & mask(4)) << LAYER_SHIFT);
    }
    pub fn is_valid(&self) -> bool {
        (self.word1 >> VALID_SHIFT) & 1 == 1
    }
    pub fn set_valid(&mut self, valid: bool) {
        self.word1 = (self.word1 & !(1 << VALID_SHIFT)) | ((valid as u32) << VALID_SHIFT);
    }
    /// Mark as invalid. Invalid rects are never reported [Rect::outside] any query.
    pub fn invalidate(&mut self) {
        self.set_valid(false);
    }
    pub fn is_clipped(&self) -> bool {
        self.word2 & 1 == 1
    }
    pub fn set_clipped(&mut self, clip: bool) {
        self.word2 = (self.word2 & !1) | clip as u32;
    }
    pub fn id(&self) -> u32 {
        (self.word2 >> ID_SHIFT) & mask(ID_BITS)
    }
    /// Set the 28-bit id. Higher bits are dropped.
    pub fn set_id(&mut self, id: u32) {
        self.word2 = (self.word2 & !(mask(ID_BITS) << ID_SHIFT))
            | ((id & mask(ID_BITS)) << ID_SHIFT);
    }
    pub fn box_type(&self) -> u8 {
        ((self.word2 >> BTYPE_SHIFT) & mask(3)) as u8
    }
    pub fn set_box_type(&mut self, btype: u8) {
        self.word2 = (self.word2 & !(mask(3) << BTYPE_SHIFT))
            | ((btype as u32 & mask(3)) << BTYPE_SHIFT);
    }

    /// Low x, raised to at least `bound`
    pub fn xlo_bounded(&self, bound: Int) -> Int {
        self.xlo.max(bound)
    }
    /// Low y, raised to at least `bound`
    pub fn ylo_bounded(&self, bound: Int) -> Int {
        self.ylo.max(bound)
    }
    /// High x, lowered to at most `bound`
    pub fn xhi_bounded(&self, bound: Int) -> Int {
        self.xhi.min(bound)
    }
    /// High y, lowered to at most `bound`
    pub fn yhi_bounded(&self, bound: Int) -> Int {
        self.yhi.min(bound)
    }
    pub fn dx(&self) -> Int {
        self.xhi - self.xlo
    }
    pub fn dy(&self) -> Int {
        self.yhi - self.ylo
    }
    /// Direction of the longer side
    pub fn dir(&self) -> Dir {
        Dir::from_aspect(self.dx(), self.dy())
    }
    /// Extent across a shape running in direction `dir`
    pub fn width_dir(&self, dir: Dir) -> Int {
        match dir {
            Dir::Horiz => self.dy(),
            Dir::Vert => self.dx(),
        }
    }
    /// Extent along direction `dir`
    pub fn length_dir(&self, dir: Dir) -> Int {
        self.width_dir(!dir)
    }
    /// Extent along the longer side
    pub fn length(&self) -> Int {
        self.dx().max(self.dy())
    }
    /// Extent along the shorter side
    pub fn width(&self) -> Int {
        self.dx().min(self.dy())
    }
    /// Boolean indication of whether we are disjoint from, or only edge-touching,
    /// the rectangle (x1,y1)-(x2,y2). Invalid rects always return `false`.
    pub fn outside(&self, x1: Int, y1: Int, x2: Int, y2: Int) -> bool {
        if !self.is_valid() {
            return false;
        }
        x1 >= self.xhi || y1 >= self.yhi || x2 <= self.xlo || y2 <= self.ylo
    }
    /// Boolean indication of a positive-area intersection with `other`
    pub fn overlaps(&self, other: &Rect) -> bool {
        intersect(self.xlo, self.dx(), other.xlo, other.dx()).is_some()
            && intersect(self.ylo, self.dy(), other.ylo, other.dy()).is_some()
    }
    /// Clip to the rectangle (x1,y1)-(x2,y2).
    /// Returns `false` and leaves us unchanged if the two are disjoint.
    pub fn clip(&mut self, x1: Int, y1: Int, x2: Int, y2: Int) -> bool {
        let (xlo, xhi) = match intersect(self.xlo, self.dx(), x1, x2 - x1) {
            Some(x) => x,
            None => return false,
        };
        let (ylo, yhi) = match intersect(self.ylo, self.dy(), y1, y2 - y1) {
            Some(y) => y,
            None => return false,
        };
        if (xlo, ylo, xhi, yhi) != (self.xlo, self.ylo, self.xhi, self.yhi) {
            self.set_coords(xlo, ylo, xhi, yhi);
            self.set_clipped(true);
        }
        true
    }
    /// Create a transformed copy
    pub fn transformed(&self, trans: &Transform) -> Rect {
        trans.apply_rect(self)
    }

    /// Allocate `rects` into `pool` as a chain, in iteration order.
    /// Returns the head, or `None` if `rects` is empty.
    pub fn alloc_chain(pool: &mut Pool<Rect>, rects: impl IntoIterator<Item = Rect>) -> Option<Handle> {
        let handles: Vec<Handle> = rects.into_iter().map(|r| pool.allocate(r)).collect();
        for pair in handles.windows(2) {
            pool[pair[0]].next = Some(pair[1]);
        }
        if let Some(last) = handles.last() {
            pool[*last].next = None;
        }
        handles.first().copied()
    }
    /// Iterate over the chain starting at `head`
    pub fn chain(pool: &Pool<Rect>, head: Option<Handle>) -> RectChain<'_> {
        RectChain { pool, cur: head }
    }
    /// Free every rect in the chain starting at `head`. Returns the number freed.
    pub fn free_chain(pool: &mut Pool<Rect>, head: Option<Handle>) -> usize {
        let mut cur = head;
        let mut cnt = 0;
        while let Some(h) = cur {
            match pool.deallocate(h) {
                Some(r) => {
                    cur = r.next;
                    cnt += 1;
                }
                None => break,
            }
        }
        cnt
    }
}

/// Iterator over a pool-resident [Rect] chain.
/// Ends early at the first stale link.
pub struct RectChain<'a> {
    pool: &'a Pool<Rect>,
    cur: Option<Handle>,
}
impl<'a> Iterator for RectChain<'a> {
    type Item = (Handle, &'a Rect);
    fn next(&mut self) -> Option<Self::Item> {
        let h = self.cur?;
        let r = self.pool.get(h)?;
        self.cur = r.next;
        Some((h, r))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn packed_fields() {
        let mut r = Rect::new(10, 0, 0, 5);
        assert_eq!((r.xlo, r.ylo, r.xhi, r.yhi), (0, 0, 10, 5));
        assert!(r.is_valid());
        r.set_owner(0x7f_ffff);
        r.set_owner_type(9);
        r.set_layer(15);
        r.set_id(123_456);
        r.set_box_type(5);
        r.set_clipped(true);
        assert_eq!(r.owner(), 0x7f_ffff);
        assert_eq!(r.owner_type(), 9);
        assert_eq!(r.layer(), 15);
        assert_eq!(r.id(), 123_456);
        assert_eq!(r.box_type(), 5);
        assert!(r.is_clipped());
        assert!(r.is_valid());
        // Overflowing owner bits do not spill into neighboring fields
        r.set_owner(0xff_ffff);
        assert_eq!(r.owner(), 0x7f_ffff);
        assert_eq!(r.owner_type(), 9);
        r.invalidate();
        assert!(!r.is_valid());
        assert_eq!(r.layer(), 15);
    }
    #[test]
    fn outside() {
        let mut r = Rect::new(0, 0, 10, 10);
        assert!(r.outside(10, 0, 20, 10));
        assert!(r.outside(-5, -5, 0, 0));
        assert!(!r.outside(5, 5, 15, 15));
        r.invalidate();
        assert!(!r.outside(100, 100, 200, 200));
    }
    #[test]
    fn extents() {
        let r = Rect::new(0, 0, 20, 4);
        assert_eq!(r.dir(), Dir::Horiz);
        assert_eq!(r.width_dir(Dir::Horiz), 4);
        assert_eq!(r.length_dir(Dir::Horiz), 20);
        assert_eq!(r.length(), 20);
        assert_eq!(r.width(), 4);
        assert_eq!(r.xlo_bounded(5), 5);
        assert_eq!(r.xhi_bounded(50), 20);
        assert_eq!(Rect::new_scaled(0.5, 0.0, 1.25, 0.1, 1000), Rect::new(500, 0, 1250, 100));
    }
    #[test]
    fn clip() {
        let mut r = Rect::new(0, 0, 20, 20);
        assert!(!r.clip(30, 30, 40, 40));
        assert_eq!(r, Rect::new(0, 0, 20, 20));
        assert!(r.clip(10, -5, 30, 5));
        assert_eq!((r.xlo, r.ylo, r.xhi, r.yhi), (10, 0, 20, 5));
        assert!(r.is_clipped());
    }
    #[test]
    fn chains() {
        let mut pool = Pool::new(4);
        let head = Rect::alloc_chain(&mut pool, (0..3).map(|i| Rect::new(i, 0, i + 1, 1)));
        let xs: Vec<Int> = Rect::chain(&pool, head).map(|(_, r)| r.xlo).collect();
        assert_eq!(xs, vec![0, 1, 2]);
        assert_eq!(Rect::free_chain(&mut pool, head), 3);
        assert_eq!(pool.live_cnt(), 0);
        assert_eq!(Rect::chain(&pool, head).count(), 0);
    }
}
