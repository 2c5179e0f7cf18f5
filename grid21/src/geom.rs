//!
//! # Geometry Module
//!
//! Defines [Dir], [Point], the eight placement orientations [Orient],
//! and integer [Transform]s built from them.
//!

// Crates.io
use serde::{Deserialize, Serialize};

// Local imports
use crate::utils::enumstr;
use crate::{Int, Rect};

/// # Point in two-dimensional layout-space
#[derive(Debug, Copy, Clone, Default, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord)]
pub struct Point {
    pub x: Int,
    pub y: Int,
}
impl Point {
    /// Create a new [Point] from (x,y) coordinates
    pub fn new(x: Int, y: Int) -> Self {
        Self { x, y }
    }
    /// Get the coordinate associated with direction `dir`
    pub fn coord(&self, dir: Dir) -> Int {
        match dir {
            Dir::Horiz => self.x,
            Dir::Vert => self.y,
        }
    }
    /// Set the coordinate associated with direction `dir`
    pub fn set_coord(&mut self, dir: Dir, val: Int) {
        match dir {
            Dir::Horiz => self.x = val,
            Dir::Vert => self.y = val,
        }
    }
    /// Create a new point shifted by `p`
    pub fn shift(&self, p: &Point) -> Point {
        Point {
            x: p.x + self.x,
            y: p.y + self.y,
        }
    }
    /// Create a new [Point], transformed from our original location by `trans`
    pub fn transform(&self, trans: &Transform) -> Point {
        trans.apply(*self)
    }
}

/// Direction Enumeration
///
/// A grid's direction is the direction its tracks run.
/// Horizontal tracks are indexed by y and extend along x.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum Dir {
    Horiz,
    Vert,
}
impl Dir {
    /// Whichever direction we are, return the other one.
    pub fn other(self) -> Self {
        match self {
            Self::Horiz => Self::Vert,
            Self::Vert => Self::Horiz,
        }
    }
    /// Direction of a `dx` by `dy` shape: along its longer side, horizontal on ties
    pub fn from_aspect(dx: Int, dy: Int) -> Self {
        if dx < dy {
            Self::Vert
        } else {
            Self::Horiz
        }
    }
    /// Numeric code, as stored in packed wire flags: vertical 0, horizontal 1
    pub fn code(self) -> u8 {
        match self {
            Self::Vert => 0,
            Self::Horiz => 1,
        }
    }
    /// Inverse of [Dir::code]. Any nonzero code is horizontal.
    pub fn from_code(code: u8) -> Self {
        if code == 0 {
            Self::Vert
        } else {
            Self::Horiz
        }
    }
}
impl std::ops::Not for Dir {
    type Output = Self;
    /// Exclamation Operator returns the opposite direction
    fn not(self) -> Self::Output {
        self.other()
    }
}

enumstr!(
    /// # Placement Orientations
    ///
    /// The eight rotations and mirrorings of an instanced cell.
    Orient {
        R0: "R0",
        R90: "R90",
        R180: "R180",
        R270: "R270",
        MY: "MY",
        MYR90: "MYR90",
        MX: "MX",
        MXR90: "MXR90",
    }
);
impl Orient {
    /// Row-major 2x2 matrix: `x' = m[0][0]*x + m[0][1]*y`, `y' = m[1][0]*x + m[1][1]*y`
    pub fn matrix(&self) -> [[Int; 2]; 2] {
        match self {
            Self::R0 => [[1, 0], [0, 1]],
            Self::R90 => [[0, -1], [1, 0]],
            Self::R180 => [[-1, 0], [0, -1]],
            Self::R270 => [[0, 1], [-1, 0]],
            Self::MY => [[-1, 0], [0, 1]],
            Self::MYR90 => [[0, -1], [-1, 0]],
            Self::MX => [[1, 0], [0, -1]],
            Self::MXR90 => [[0, 1], [1, 0]],
        }
    }
    /// The orientation with matrix `m`, if any
    pub fn from_matrix(m: [[Int; 2]; 2]) -> Option<Self> {
        Self::variants().iter().copied().find(|o| o.matrix() == m)
    }
    /// Boolean indication of whether we swap the x and y extents of shapes
    pub fn swaps_axes(&self) -> bool {
        self.matrix()[0][0] == 0
    }
}
impl Default for Orient {
    fn default() -> Self {
        Self::R0
    }
}

/// # Integer Placement Transform
///
/// Orientation about the origin, followed by translation by `offset`.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transform {
    pub orient: Orient,
    pub offset: Point,
}
impl Transform {
    pub fn new(orient: Orient, offset: Point) -> Self {
        Self { orient, offset }
    }
    /// The identity transform, leaving any transformed object unmodified
    pub fn identity() -> Self {
        Self::default()
    }
    /// Translation by (x,y)
    pub fn translate(x: Int, y: Int) -> Self {
        Self::new(Orient::R0, Point::new(x, y))
    }
    /// Apply to point `p`
    pub fn apply(&self, p: Point) -> Point {
        let m = self.orient.matrix();
        Point {
            x: m[0][0] * p.x + m[0][1] * p.y + self.offset.x,
            y: m[1][0] * p.x + m[1][1] * p.y + self.offset.y,
        }
    }
    /// Apply to the corners of `r`, returning a copy with re-normalized coordinates.
    /// All of `r`'s tags and links are kept.
    pub fn apply_rect(&self, r: &Rect) -> Rect {
        let p0 = self.apply(Point::new(r.xlo, r.ylo));
        let p1 = self.apply(Point::new(r.xhi, r.yhi));
        let mut rv = r.clone();
        rv.set_coords(p0.x, p0.y, p1.x, p1.y);
        rv
    }
    /// The inverse transform, such that `t.invert().apply(t.apply(p)) == p`
    pub fn invert(&self) -> Self {
        // Orientation matrices are orthogonal; the inverse is the transpose
        let m = self.orient.matrix();
        let inv = [[m[0][0], m[1][0]], [m[0][1], m[1][1]]];
        let orient = Orient::from_matrix(inv).unwrap_or_default();
        let o = self.offset;
        let offset = Point {
            x: -(inv[0][0] * o.x + inv[0][1] * o.y),
            y: -(inv[1][0] * o.x + inv[1][1] * o.y),
        };
        Self { orient, offset }
    }
    /// Create a new [Transform] applying `child` first, then `self`.
    /// As for instance hierarchies: `self` places the parent, `child` places within it.
    pub fn concat(&self, child: &Transform) -> Transform {
        let a = self.orient.matrix();
        let b = child.orient.matrix();
        let m = [
            [
                a[0][0] * b[0][0] + a[0][1] * b[1][0],
                a[0][0] * b[0][1] + a[0][1] * b[1][1],
            ],
            [
                a[1][0] * b[0][0] + a[1][1] * b[1][0],
                a[1][0] * b[0][1] + a[1][1] * b[1][1],
            ],
        ];
        // Products of orientations are orientations
        let orient = Orient::from_matrix(m).unwrap_or_default();
        Self {
            orient,
            offset: self.apply(child.offset),
        }
    }
}

/// One-dimensional interval intersection.
/// Returns the overlap of `[x1, x1 + dx)` and `[y1, y1 + dy)` as `(lo, hi)`,
/// or `None` if they are disjoint or merely abut.
pub fn intersect(x1: Int, dx: Int, y1: Int, dy: Int) -> Option<(Int, Int)> {
    let lo = x1.max(y1);
    let hi = (x1 + dx).min(y1 + dy);
    if hi > lo {
        Some((lo, hi))
    } else {
        None
    }
}
