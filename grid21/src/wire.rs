//!
//! # Wires
//!
//! A [Wire] is one placed rectangle, reduced to an offset and length along its track
//! plus a base and width across it. Wires live in a table-wide [Pool] and are threaded
//! through their track's bucket lists by `next`.
//!

// Crates.io
use serde::{Deserialize, Serialize};

// Local imports
use crate::utils::{enumstr, Handle};
use crate::{intersect, Dir, Int, Point, SearchBox};

/// Pool handle of a [Wire]
pub type WireId = Handle;
/// Pool handle of a [Track](crate::Track)
pub type TrackId = Handle;

enumstr!(
    /// # Named Wire Kinds
    ///
    /// The flag values with special meaning. Other values are user-defined.
    WireKind {
        Wire: "wire",
        TilePin: "tile-pin",
        TileBus: "tile-bus",
        Via: "via",
        Power: "power",
    }
);
impl WireKind {
    /// Flag value stored on wires of this kind
    pub fn code(&self) -> u8 {
        match self {
            Self::Wire => 0,
            Self::TilePin => 1,
            Self::TileBus => 2,
            Self::Via => 5,
            Self::Power => 11,
        }
    }
    pub fn from_code(code: u8) -> Option<Self> {
        Self::variants().iter().copied().find(|k| k.code() == code)
    }
}

// Packed `bits` layout: flags (6) | dir (1) | ext (1)
const FLAG_MASK: u8 = 0x3f;
const DIR_BIT: u8 = 1 << 6;
const EXT_BIT: u8 = 1 << 7;

/// # Wire Geometry
///
/// Offset `xy` and length `len` along the track; `base` and `width` across it.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WireGeom {
    pub xy: Int,
    pub len: Int,
    pub base: Int,
    pub width: Int,
}
impl WireGeom {
    /// Reduce the box `ll`-`ur` to the geometry of a wire running in `dir`
    pub fn from_box(dir: Dir, ll: Point, ur: Point) -> Self {
        Self {
            xy: ll.coord(dir),
            len: ur.coord(dir) - ll.coord(dir),
            base: ll.coord(!dir),
            width: ur.coord(!dir) - ll.coord(!dir),
        }
    }
    /// End coordinate along the track
    pub fn end(&self) -> Int {
        self.xy + self.len
    }
    /// Boolean indication of identical base and width
    pub fn same_band(&self, other: &WireGeom) -> bool {
        self.base == other.base && self.width == other.width
    }
    /// Boolean indication of whether our cross-track extents overlap or touch
    pub fn band_touches(&self, other: &WireGeom) -> bool {
        self.base <= other.base + other.width && other.base <= self.base + self.width
    }
    /// Boolean indication of a positive-width overlap of cross-track extents
    pub fn band_overlaps(&self, other: &WireGeom) -> bool {
        self.base < other.base + other.width && other.base < self.base + self.width
    }
    /// Boolean indication of a positive-length overlap along the track
    pub fn span_overlaps(&self, other: &WireGeom) -> bool {
        intersect(self.xy, self.len, other.xy, other.len).is_some()
    }
    /// Boolean indication of whether placing both would be a spatial conflict.
    /// With `touch_check`, touching bands count.
    pub fn conflicts(&self, other: &WireGeom, touch_check: bool) -> bool {
        if !self.span_overlaps(other) {
            return false;
        }
        if self.same_band(other) {
            return true;
        }
        match touch_check {
            true => self.band_touches(other),
            false => self.band_overlaps(other),
        }
    }
}

/// # Wire-Overlap Classification
///
/// Lengths are measured on the reference wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WireOverlap {
    /// The other wire ends at or before our start
    Left,
    /// The other wire starts at or after our end
    Right,
    /// Overlapping, with our lengths before, inside and after the other wire
    Overlap { before: Int, common: Int, after: Int },
}

/// # Wire
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Wire {
    /// Public id: the wire's pool slot index
    pub id: u32,
    /// Owning box id
    pub box_id: u32,
    /// Secondary reference id
    pub other_id: u32,
    /// Representative of which we are a replica
    pub src: Option<WireId>,
    /// Track we are placed on
    pub track: Option<TrackId>,
    /// Next wire in our bucket list
    pub next: Option<WireId>,
    pub xy: Int,
    pub len: Int,
    pub base: Int,
    pub width: Int,
    bits: u8,
}
impl Wire {
    /// Create an unplaced wire with id `id`
    pub fn new(id: u32, dir: Dir, geom: WireGeom, box_id: u32, other_id: u32, flags: u8) -> Self {
        let mut w = Self {
            id,
            box_id,
            other_id,
            ..Default::default()
        };
        w.set_geom(geom);
        w.set_flags(flags);
        w.set_dir(dir);
        w
    }
    /// Create an unplaced replica with id `id`, standing in for representative `root`
    pub fn replica(&self, id: u32, root: WireId) -> Self {
        let mut w = self.clone();
        w.id = id;
        w.src = Some(root);
        w.track = None;
        w.next = None;
        w.set_ext(false);
        w
    }
    /// Clear everything but our id, for reuse
    pub fn reset(&mut self) {
        *self = Self {
            id: self.id,
            ..Default::default()
        };
    }

    pub fn flags(&self) -> u8 {
        self.bits & FLAG_MASK
    }
    /// Set the six-bit flags field. Higher bits are dropped.
    pub fn set_flags(&mut self, flags: u8) {
        self.bits = (self.bits & !FLAG_MASK) | (flags & FLAG_MASK);
    }
    /// Named kind, if our flags carry one
    pub fn kind(&self) -> Option<WireKind> {
        WireKind::from_code(self.flags())
    }
    pub fn is_power(&self) -> bool {
        self.flags() == WireKind::Power.code()
    }
    pub fn is_via(&self) -> bool {
        self.flags() == WireKind::Via.code()
    }
    pub fn is_tile_pin(&self) -> bool {
        self.flags() == WireKind::TilePin.code()
    }
    pub fn is_tile_bus(&self) -> bool {
        self.flags() == WireKind::TileBus.code()
    }
    pub fn dir(&self) -> Dir {
        Dir::from_code((self.bits & DIR_BIT) >> 6)
    }
    pub fn set_dir(&mut self, dir: Dir) {
        self.bits = (self.bits & !DIR_BIT) | (dir.code() << 6);
    }
    /// Scratch "already visited" mark
    pub fn ext(&self) -> bool {
        self.bits & EXT_BIT != 0
    }
    pub fn set_ext(&mut self, ext: bool) {
        if ext {
            self.bits |= EXT_BIT;
        } else {
            self.bits &= !EXT_BIT;
        }
    }
    /// Boolean indication of being a replica
    pub fn is_replica(&self) -> bool {
        self.src.is_some()
    }

    pub fn geom(&self) -> WireGeom {
        WireGeom {
            xy: self.xy,
            len: self.len,
            base: self.base,
            width: self.width,
        }
    }
    pub fn set_geom(&mut self, g: WireGeom) {
        self.xy = g.xy;
        self.len = g.len;
        self.base = g.base;
        self.width = g.width;
    }
    pub fn set_xy(&mut self, xy: Int, len: Int) {
        self.xy = xy;
        self.len = len;
    }
    /// End coordinate along the track
    pub fn end(&self) -> Int {
        self.xy + self.len
    }
    /// Layout coordinates (x1, y1, x2, y2)
    pub fn coords(&self) -> (Int, Int, Int, Int) {
        match self.dir() {
            Dir::Horiz => (self.xy, self.base, self.end(), self.base + self.width),
            Dir::Vert => (self.base, self.xy, self.base + self.width, self.end()),
        }
    }
    /// [SearchBox] covering us, carrying our ids and flags
    pub fn search_box(&self, level: u32) -> SearchBox {
        let (x1, y1, x2, y2) = self.coords();
        let mut sb = SearchBox::with_dir(x1, y1, x2, y2, level, self.dir());
        sb.set_owner(self.box_id, self.other_id);
        sb.set_type(self.flags());
        sb
    }

    /// Classify `other`'s extent along the track relative to ours
    pub fn overlap(&self, other: &Wire) -> WireOverlap {
        let (start, end) = (self.xy, self.end());
        let (ostart, oend) = (other.xy, other.end());
        if oend <= start {
            return WireOverlap::Left;
        }
        if ostart >= end {
            return WireOverlap::Right;
        }
        let before = (ostart - start).max(0);
        let after = (end - oend).max(0);
        WireOverlap::Overlap {
            before,
            common: self.len - before - after,
            after,
        }
    }
    /// Cross-track spacing from us to `other`, toward higher coordinates if `target_high`.
    /// `None` unless the two are strictly apart.
    pub fn coupling_gap(&self, other: &Wire, target_high: bool) -> Option<Int> {
        let dist = match target_high {
            true => other.base - (self.base + self.width),
            false => self.base - (other.base + other.width),
        };
        if dist > 0 {
            Some(dist)
        } else {
            None
        }
    }
    /// Create the coupling wire filling the gap between us and `other`,
    /// over `xy`..`xy + len` along the track.
    /// Its box id is our id, and its other id is `other`'s.
    pub fn couple_wire(
        &self,
        id: u32,
        other: &Wire,
        xy: Int,
        len: Int,
        target_high: bool,
    ) -> Option<Wire> {
        let dist = self.coupling_gap(other, target_high)?;
        let base = match target_high {
            true => self.base + self.width,
            false => other.base + other.width,
        };
        let geom = WireGeom {
            xy,
            len,
            base,
            width: dist,
        };
        Some(Wire::new(id, self.dir(), geom, self.id, other.id, self.flags()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn wire(xy: Int, len: Int) -> Wire {
        let geom = WireGeom {
            xy,
            len,
            base: 0,
            width: 5,
        };
        Wire::new(0, Dir::Horiz, geom, 1, 0, 0)
    }

    #[test]
    fn packed_bits() {
        let mut w = wire(0, 10);
        w.set_flags(WireKind::Power.code());
        w.set_ext(true);
        assert!(w.is_power());
        assert_eq!(w.kind(), Some(WireKind::Power));
        assert_eq!(w.dir(), Dir::Horiz);
        w.set_dir(Dir::Vert);
        assert_eq!(w.dir(), Dir::Vert);
        assert!(w.ext());
        assert!(w.is_power());
        w.set_flags(0xff);
        assert_eq!(w.flags(), 0x3f);
        assert_eq!(w.kind(), None);
        assert!(w.ext());
    }
    #[test]
    fn overlaps() {
        let w = wire(10, 10);
        assert_eq!(w.overlap(&wire(0, 10)), WireOverlap::Left);
        assert_eq!(w.overlap(&wire(20, 5)), WireOverlap::Right);
        assert_eq!(
            w.overlap(&wire(5, 10)),
            WireOverlap::Overlap {
                before: 0,
                common: 5,
                after: 5
            }
        );
        assert_eq!(
            w.overlap(&wire(12, 4)),
            WireOverlap::Overlap {
                before: 2,
                common: 4,
                after: 4
            }
        );
        assert_eq!(
            w.overlap(&wire(15, 20)),
            WireOverlap::Overlap {
                before: 5,
                common: 5,
                after: 0
            }
        );
        assert_eq!(
            w.overlap(&wire(0, 40)),
            WireOverlap::Overlap {
                before: 0,
                common: 10,
                after: 0
            }
        );
    }
    #[test]
    fn coords() {
        let geom = WireGeom::from_box(Dir::Vert, Point::new(3, 10), Point::new(7, 50));
        assert_eq!(
            geom,
            WireGeom {
                xy: 10,
                len: 40,
                base: 3,
                width: 4
            }
        );
        let w = Wire::new(4, Dir::Vert, geom, 9, 0, 0);
        assert_eq!(w.coords(), (3, 10, 7, 50));
        let sb = w.search_box(2);
        assert_eq!((sb.ll, sb.ur), (Point::new(3, 10), Point::new(7, 50)));
        assert_eq!(sb.owner, 9);
    }
    #[test]
    fn bands() {
        let a = WireGeom {
            xy: 0,
            len: 10,
            base: 0,
            width: 5,
        };
        let touching = WireGeom { base: 5, ..a };
        let apart = WireGeom { base: 6, ..a };
        assert!(a.conflicts(&a, false));
        assert!(a.conflicts(&touching, true));
        assert!(!a.conflicts(&touching, false));
        assert!(!a.conflicts(&apart, true));
        assert!(!a.conflicts(&WireGeom { xy: 10, ..a }, true));
    }
    #[test]
    fn coupling() {
        let mut lo = wire(0, 10);
        lo.id = 1;
        let mut hi = wire(0, 10);
        hi.id = 2;
        hi.base = 8;
        assert_eq!(lo.coupling_gap(&hi, true), Some(3));
        assert_eq!(lo.coupling_gap(&hi, false), None);
        let c = lo.couple_wire(7, &hi, 2, 6, true);
        let c = c.unwrap();
        assert_eq!((c.xy, c.len, c.base, c.width), (2, 6, 5, 3));
        assert_eq!((c.id, c.box_id, c.other_id), (7, 1, 2));
        assert_eq!(hi.couple_wire(8, &lo, 2, 6, false).map(|c| c.base), Some(5));
    }
}
