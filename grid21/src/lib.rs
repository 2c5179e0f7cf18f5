//!
//! # Grid21 Spatial Index
//!
//! Tiled track-and-wire index for routed layout.
//!
//! A [GridTable] partitions a design extent into tiles, each holding a [Grid] of [Track]s
//! running in one routing direction on one level. Each track keeps its [Wire]s in
//! bucketed, xy-sorted linked lists, so region searches touch only the tracks and
//! buckets a query overlaps. Placement resolves overlaps per the configured [OverlapAdjust] policy.
//!
//! ```rust
//! use grid21::{Dir, GridTable, PlacementConfig, Point, TableSpec};
//!
//! let spec = TableSpec {
//!     lo: Point::new(0, 0),
//!     hi: Point::new(100, 100),
//!     row_size: 100,
//!     col_size: 100,
//!     level: 3,
//!     dir: Dir::Horiz,
//!     width: 5,
//!     pitch: 10,
//!     min_width: None,
//! };
//! let mut table = GridTable::new(spec, PlacementConfig::default()).unwrap();
//! let track = table.add_box(0, 12, 20, 17, 3, 100, 0, 0).unwrap();
//! assert_eq!(track, 1);
//! assert_eq!(table.search_ids(0, 10, 20, 20).unwrap(), vec![100]);
//! ```
//!

/// Internal Utilities Re-export
pub use grid21utils as utils;

/// Database-unit coordinate type
pub type Int = i32;

pub mod error;
pub use error::*;

pub mod geom;
pub use geom::*;

pub mod rect;
pub use rect::*;

pub mod search;
pub use search::*;

pub mod config;
pub use config::*;

pub mod stats;
pub use stats::*;

pub mod wire;
pub use wire::*;

pub mod track;
pub use track::*;

pub mod grid;
pub use grid::*;

pub mod table;
pub use table::*;

pub mod design;
pub use design::*;
