//!
//! # Search Boxes
//!
//! Transient placement and query descriptors.
//!

// Crates.io
use serde::{Deserialize, Serialize};

// Local imports
use crate::{Dir, Int, Point, Rect};

/// # Search Box
///
/// A rectangle plus the level, direction and tags of the object it places or queries.
/// Built fresh per operation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchBox {
    /// Lower-left corner
    pub ll: Point,
    /// Upper-right corner
    pub ur: Point,
    /// Routing level
    pub level: u32,
    /// Direction
    pub dir: Option<Dir>,
    /// Owning box id
    pub owner: u32,
    /// Secondary reference id
    pub other: u32,
    /// Wire type tag
    pub wire_type: u8,
}
impl SearchBox {
    /// Create from two opposite corners, with direction inferred from the aspect ratio
    pub fn new(x1: Int, y1: Int, x2: Int, y2: Int, level: u32) -> Self {
        let ll = Point::new(x1.min(x2), y1.min(y2));
        let ur = Point::new(x1.max(x2), y1.max(y2));
        Self {
            ll,
            ur,
            level,
            dir: Some(Dir::from_aspect(ur.x - ll.x, ur.y - ll.y)),
            ..Default::default()
        }
    }
    /// Create with an explicit direction
    pub fn with_dir(x1: Int, y1: Int, x2: Int, y2: Int, level: u32, dir: Dir) -> Self {
        let mut sb = Self::new(x1, y1, x2, y2, level);
        sb.dir = Some(dir);
        sb
    }
    /// Create from [Rect] `r`, taking its owner id and box type
    pub fn from_rect(r: &Rect, level: u32) -> Self {
        let mut sb = Self::new(r.xlo, r.ylo, r.xhi, r.yhi, level);
        sb.owner = r.owner();
        sb.wire_type = r.box_type();
        sb
    }
    /// Direction: explicit if set, else inferred from our aspect ratio
    pub fn dir(&self) -> Dir {
        self.dir
            .unwrap_or_else(|| Dir::from_aspect(self.ur.x - self.ll.x, self.ur.y - self.ll.y))
    }
    /// Low coordinate along direction `dir`
    pub fn lo(&self, dir: Dir) -> Int {
        self.ll.coord(dir)
    }
    /// High coordinate along direction `dir`
    pub fn hi(&self, dir: Dir) -> Int {
        self.ur.coord(dir)
    }
    /// Low coordinate along `dir`, raised to at least `bound`
    pub fn lo_bounded(&self, dir: Dir, bound: Int) -> Int {
        self.lo(dir).max(bound)
    }
    /// High coordinate along `dir`, lowered to at most `bound`
    pub fn hi_bounded(&self, dir: Dir, bound: Int) -> Int {
        self.hi(dir).min(bound)
    }
    pub fn set_lo(&mut self, dir: Dir, val: Int) {
        self.ll.set_coord(dir, val);
    }
    pub fn set_hi(&mut self, dir: Dir, val: Int) {
        self.ur.set_coord(dir, val);
    }
    pub fn set_owner(&mut self, owner: u32, other: u32) {
        self.owner = owner;
        self.other = other;
    }
    pub fn set_type(&mut self, wire_type: u8) {
        self.wire_type = wire_type;
    }
    /// Extent along direction `dir`
    pub fn length(&self, dir: Dir) -> Int {
        self.hi(dir) - self.lo(dir)
    }
    /// Collapse to a centerline query: the midpoint across our direction,
    /// leaving the extent along it unchanged.
    pub fn set_mid_point_search(&mut self) {
        let across = !self.dir();
        let mid = (self.lo(across) + self.hi(across)) / 2;
        self.set_lo(across, mid);
        self.set_hi(across, mid);
    }
    /// Grow to the union of ourselves and `other`
    pub fn set_max_box(&mut self, other: &SearchBox) {
        self.ll.x = self.ll.x.min(other.ll.x);
        self.ll.y = self.ll.y.min(other.ll.y);
        self.ur.x = self.ur.x.max(other.ur.x);
        self.ur.y = self.ur.y.max(other.ur.y);
    }
    /// Boolean indication of whether we are disjoint from, or only edge-touching,
    /// the rectangle (x1,y1)-(x2,y2)
    pub fn outside(&self, x1: Int, y1: Int, x2: Int, y2: Int) -> bool {
        x1 >= self.ur.x || y1 >= self.ur.y || x2 <= self.ll.x || y2 <= self.ll.y
    }
    /// Convert to a valid [Rect] carrying our owner id and type
    pub fn to_rect(&self) -> Rect {
        let mut r = Rect::new(self.ll.x, self.ll.y, self.ur.x, self.ur.y);
        r.set_owner(self.owner);
        r.set_box_type(self.wire_type);
        r
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn direction_inference() {
        assert_eq!(SearchBox::new(0, 0, 20, 5, 1).dir(), Dir::Horiz);
        assert_eq!(SearchBox::new(0, 0, 5, 20, 1).dir(), Dir::Vert);
        let mut sb = SearchBox::new(0, 0, 5, 20, 1);
        sb.dir = None;
        assert_eq!(sb.dir(), Dir::Vert);
        assert_eq!(SearchBox::with_dir(0, 0, 5, 20, 1, Dir::Horiz).dir(), Dir::Horiz);
    }
    #[test]
    fn bounds() {
        let mut sb = SearchBox::new(20, 17, 0, 12, 3);
        assert_eq!((sb.lo(Dir::Horiz), sb.hi(Dir::Horiz)), (0, 20));
        assert_eq!((sb.lo(Dir::Vert), sb.hi(Dir::Vert)), (12, 17));
        assert_eq!(sb.lo_bounded(Dir::Horiz, 5), 5);
        assert_eq!(sb.hi_bounded(Dir::Vert, 15), 15);
        assert_eq!(sb.length(Dir::Horiz), 20);
        sb.set_mid_point_search();
        assert_eq!((sb.lo(Dir::Vert), sb.hi(Dir::Vert)), (14, 14));
        sb.set_max_box(&SearchBox::new(-5, 0, 1, 1, 3));
        assert_eq!((sb.ll, sb.ur), (Point::new(-5, 0), Point::new(20, 14)));
        assert!(sb.outside(20, 0, 30, 10));
        assert!(!sb.outside(19, 0, 30, 10));
    }
}
