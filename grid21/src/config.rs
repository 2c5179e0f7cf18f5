//!
//! # Placement Configuration
//!
//! [PlacementConfig] carries the policy flags shared by every placement into a table.
//! [TableSpec] describes the tiled extent and track geometry of one table.
//! Both are plain serde data, loadable from any [SerializationFormat](crate::utils::SerializationFormat).
//!

// Crates.io
use derive_builder::Builder;
use serde::{Deserialize, Serialize};

// Local imports
use crate::utils::{enumstr, SerdeFile};
use crate::{Dir, GridError, GridResult, Int, Point};

enumstr!(
    /// # Overlap-Adjustment Policy
    ///
    /// How a new wire overlapping an existing wire in the same band is resolved.
    OverlapAdjust {
        NoAdjust: "none",
        Merge: "merge",
        EndAdjust: "end-adjust",
        Reject: "reject",
    }
);
impl OverlapAdjust {
    /// Boolean indication of whether this policy modifies wires to remove overlap
    pub fn adjusts(&self) -> bool {
        matches!(self, Self::Merge | Self::EndAdjust)
    }
}
impl Default for OverlapAdjust {
    fn default() -> Self {
        Self::NoAdjust
    }
}

/// # Placement Configuration
#[derive(Debug, Clone, PartialEq, Eq, Builder, Serialize, Deserialize)]
#[builder(pattern = "owned", setter(into), default)]
#[serde(default)]
pub struct PlacementConfig {
    /// Same-band overlap policy
    pub overlap_adjust: OverlapAdjust,
    /// Treat wires in different but touching bands as conflicting
    pub overlap_touch_check: bool,
    /// Marker buckets per track, absent a table minimum width
    pub marker_cnt: usize,
    /// Tracks tried by free-track placement before giving up
    pub retry_cap: usize,
    /// Wire and track pool growth increment
    pub pool_chunk: usize,
    /// Type of wires placed without one
    pub default_wire_type: u8,
    /// Skip power wires as coupling sources
    pub no_power_source: bool,
    /// Skip power wires as coupling targets
    pub no_power_target: bool,
    /// Coupling looks toward higher-numbered tracks (else lower)
    pub cc_target_high_tracks: bool,
}
impl Default for PlacementConfig {
    fn default() -> Self {
        Self {
            overlap_adjust: OverlapAdjust::NoAdjust,
            overlap_touch_check: true,
            marker_cnt: 32,
            retry_cap: 20,
            pool_chunk: 1024,
            default_wire_type: 0,
            no_power_source: false,
            no_power_target: false,
            cc_target_high_tracks: true,
        }
    }
}
impl PlacementConfig {
    /// Create a [PlacementConfigBuilder]
    pub fn builder() -> PlacementConfigBuilder {
        PlacementConfigBuilder::default()
    }
    /// Check for values the index cannot work with
    pub fn validate(&self) -> GridResult<()> {
        if self.marker_cnt == 0 {
            return Err(GridError::config("marker_cnt must be positive"));
        }
        if self.pool_chunk == 0 {
            return Err(GridError::config("pool_chunk must be positive"));
        }
        Ok(())
    }
}
impl SerdeFile for PlacementConfig {}

/// # Grid-Table Geometry
///
/// Extent `lo`-`hi` is cut into tiles of `row_size` (in y) by `col_size` (in x).
/// Tracks run in `dir` at `pitch`, starting from the extent's low edge.
#[derive(Debug, Clone, PartialEq, Eq, Builder, Serialize, Deserialize)]
#[builder(pattern = "owned", setter(into))]
pub struct TableSpec {
    pub lo: Point,
    pub hi: Point,
    pub row_size: Int,
    pub col_size: Int,
    pub level: u32,
    pub dir: Dir,
    pub width: Int,
    pub pitch: Int,
    /// Minimum wire width. Sets the marker count when present.
    #[builder(default, setter(into, strip_option))]
    #[serde(default)]
    pub min_width: Option<Int>,
}
impl TableSpec {
    /// Create a [TableSpecBuilder]
    pub fn builder() -> TableSpecBuilder {
        TableSpecBuilder::default()
    }
    pub fn dx(&self) -> Int {
        self.hi.x - self.lo.x
    }
    pub fn dy(&self) -> Int {
        self.hi.y - self.lo.y
    }
    /// Number of tile rows
    pub fn row_cnt(&self) -> usize {
        (self.dy() / self.row_size) as usize + 1
    }
    /// Number of tile columns
    pub fn col_cnt(&self) -> usize {
        (self.dx() / self.col_size) as usize + 1
    }
    /// Marker buckets per track: from `min_width` if set, else from `config`
    pub fn marker_cnt(&self, config: &PlacementConfig) -> usize {
        match self.min_width {
            Some(mw) => ((self.dx() / mw) / 16).max(1) as usize,
            None => config.marker_cnt,
        }
    }
    /// Check for degenerate extents and non-positive sizes
    pub fn validate(&self) -> GridResult<()> {
        if self.dx() <= 0 || self.dy() <= 0 {
            return Err(GridError::config(format!(
                "Empty table extent {:?} - {:?}",
                self.lo, self.hi
            )));
        }
        if self.row_size <= 0 || self.col_size <= 0 {
            return Err(GridError::config(format!(
                "Invalid tile size {} x {}",
                self.row_size, self.col_size
            )));
        }
        if self.pitch <= 0 {
            return Err(GridError::config(format!("Invalid pitch {}", self.pitch)));
        }
        if self.width < 0 {
            return Err(GridError::config(format!("Invalid width {}", self.width)));
        }
        if let Some(mw) = self.min_width {
            if mw <= 0 {
                return Err(GridError::config(format!("Invalid min_width {}", mw)));
            }
        }
        Ok(())
    }
}
impl SerdeFile for TableSpec {}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::{EnumStr, SerializationFormat};

    #[test]
    fn policy_names() {
        assert_eq!(OverlapAdjust::from_str("end-adjust"), Some(OverlapAdjust::EndAdjust));
        assert_eq!(OverlapAdjust::default().to_str(), "none");
        assert!(OverlapAdjust::Merge.adjusts());
        assert!(!OverlapAdjust::Reject.adjusts());
    }
    #[test]
    fn builders() -> GridResult<()> {
        let cfg = PlacementConfig::builder()
            .overlap_adjust(OverlapAdjust::Merge)
            .retry_cap(4usize)
            .build()?;
        assert_eq!(cfg.overlap_adjust, OverlapAdjust::Merge);
        assert_eq!(cfg.retry_cap, 4);
        assert_eq!(cfg.marker_cnt, 32);

        let spec = TableSpec::builder()
            .lo(Point::new(0, 0))
            .hi(Point::new(1000, 500))
            .row_size(100)
            .col_size(250)
            .level(2u32)
            .dir(Dir::Vert)
            .width(4)
            .pitch(8)
            .min_width(4)
            .build()?;
        spec.validate()?;
        assert_eq!(spec.row_cnt(), 6);
        assert_eq!(spec.col_cnt(), 5);
        assert_eq!(spec.marker_cnt(&cfg), 15);
        Ok(())
    }
    #[test]
    fn invalid_specs() {
        let mut spec = TableSpec {
            lo: Point::new(0, 0),
            hi: Point::new(100, 100),
            row_size: 50,
            col_size: 50,
            level: 1,
            dir: Dir::Horiz,
            width: 2,
            pitch: 0,
            min_width: None,
        };
        assert!(spec.validate().is_err());
        spec.pitch = 4;
        assert!(spec.validate().is_ok());
        spec.hi = Point::new(0, 100);
        assert!(spec.validate().is_err());
    }
    #[test]
    fn partial_config_file() -> GridResult<()> {
        let cfg: PlacementConfig = SerializationFormat::Yaml.from_str(
            r#"
            overlap_adjust: end-adjust
            marker_cnt: 8
            "#,
        )?;
        assert_eq!(cfg.overlap_adjust, OverlapAdjust::EndAdjust);
        assert_eq!(cfg.marker_cnt, 8);
        assert_eq!(cfg.retry_cap, 20);
        assert!(cfg.overlap_touch_check);
        Ok(())
    }
}
