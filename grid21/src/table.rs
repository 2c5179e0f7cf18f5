//!
//! # Grid Tables
//!
//! A [GridTable] cuts a design extent into tiles, each with its own [Grid],
//! all sharing one pool of wires and one pool of tracks.
//! Tiles are created on first use.
//!

// Crates.io
use log::{debug, info, warn};
use serde::{Deserialize, Serialize};

// Local imports
use crate::utils::{Array1D, Array2D, ErrorContext, ErrorHelper, Handle, Pool, Unwrapper};
use crate::{
    Coupling, Grid, GridError, GridResult, Int, MergedRun, OverlapAdjust, PlaceError,
    PlacementConfig, PlacementStats, Point, Pools, Rect, SearchBox, TableSpec, TrackCounts,
    Transform, Wire, WireId,
};

/// Layout geometry and ids of a placed wire
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WireBox {
    pub x1: Int,
    pub y1: Int,
    pub x2: Int,
    pub y2: Int,
    pub level: u32,
    pub box_id: u32,
    pub other_id: u32,
    pub wire_type: u8,
}

/// Coupling geometry of a wire, for extraction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CcDist {
    pub width: Int,
    pub len: Int,
    pub box_id: u32,
    pub other_id: u32,
}

/// Lazily-populated tile array, with what it takes to create a tile
#[derive(Debug, Clone)]
struct Tiles {
    grids: Array2D<Option<Grid>>,
    spec: TableSpec,
    marker_cnt: usize,
    wire_type: u8,
}
impl Tiles {
    fn new(spec: &TableSpec, marker_cnt: usize, wire_type: u8) -> Self {
        let (rows, cols) = (spec.row_cnt(), spec.col_cnt());
        let mut grids = Array2D::new(rows, cols);
        for row in 0..rows {
            for _ in 0..cols {
                grids.add(row, None);
            }
        }
        Self {
            grids,
            spec: spec.clone(),
            marker_cnt,
            wire_type,
        }
    }
    fn get(&self, row: usize, col: usize) -> Option<&Grid> {
        self.grids.get(row, col).and_then(Option::as_ref)
    }
    fn get_mut(&mut self, row: usize, col: usize) -> Option<&mut Grid> {
        self.grids.get_mut(row, col).and_then(Option::as_mut)
    }
    fn get_or_create(&mut self, row: usize, col: usize) -> GridResult<&mut Grid> {
        let spec = &self.spec;
        let ll = Point::new(
            spec.lo.x + col as Int * spec.col_size,
            spec.lo.y + row as Int * spec.row_size,
        );
        let slot = match self.grids.get_mut(row, col) {
            Some(s) => s,
            None => {
                return Err(GridError::OutOfExtent {
                    x: ll.x,
                    y: ll.y,
                    rows: spec.row_cnt(),
                    cols: spec.col_cnt(),
                })
            }
        };
        if slot.is_none() {
            let ur = Point::new(ll.x + spec.col_size, ll.y + spec.row_size);
            let mut grid = Grid::new(
                spec.dir,
                spec.level,
                row * 1000 + col,
                ll,
                ur,
                spec.width,
                spec.pitch,
                self.marker_cnt,
            );
            grid.default_wire_type = self.wire_type;
            debug!("Created tile [{}][{}] with {} tracks", row, col, grid.track_cnt());
            *slot = Some(grid);
        }
        slot.as_mut().ok_or_else(|| GridError::msg("Tile creation failed"))
    }
    /// Positions of every created tile, row-major
    fn positions(&self) -> Vec<(usize, usize)> {
        let mut rv = Vec::new();
        for r in 0..self.grids.row_cnt() {
            for c in 0..self.grids.cnt(r) {
                if self.get(r, c).is_some() {
                    rv.push((r, c));
                }
            }
        }
        rv
    }
    /// Every created tile, with its position
    fn iter(&self) -> impl Iterator<Item = ((usize, usize), &Grid)> + '_ {
        self.positions()
            .into_iter()
            .filter_map(move |(r, c)| self.get(r, c).map(|g| ((r, c), g)))
    }
}

///
/// # Grid Table
///
/// One level, one track direction, over the extent of a [TableSpec].
///
/// Placement errors leave the table unchanged, apart from counting the rejection.
///
#[derive(Debug, Clone)]
pub struct GridTable {
    spec: TableSpec,
    config: PlacementConfig,
    pools: Pools,
    tiles: Tiles,
    row_cnt: usize,
    col_cnt: usize,
    marker_cnt: usize,
    stats: PlacementStats,
    max_area: Option<SearchBox>,
}
impl GridTable {
    /// Create an empty table, validating `spec` and `config`
    pub fn new(spec: TableSpec, config: PlacementConfig) -> GridResult<Self> {
        let ctx = ErrorContext::Table(spec.level);
        spec.validate().map_err(|e| e.context(ctx.clone()))?;
        config.validate().map_err(|e| e.context(ctx))?;
        let marker_cnt = spec.marker_cnt(&config);
        let (row_cnt, col_cnt) = (spec.row_cnt(), spec.col_cnt());
        debug!(
            "New grid table on level {}: {}x{} tiles, {} markers per track",
            spec.level, row_cnt, col_cnt, marker_cnt
        );
        Ok(Self {
            tiles: Tiles::new(&spec, marker_cnt, config.default_wire_type),
            pools: Pools::new(config.pool_chunk),
            spec,
            config,
            row_cnt,
            col_cnt,
            marker_cnt,
            stats: PlacementStats::default(),
            max_area: None,
        })
    }
    pub fn spec(&self) -> &TableSpec {
        &self.spec
    }
    pub fn config(&self) -> &PlacementConfig {
        &self.config
    }
    /// Placement counters accumulated so far
    pub fn stats(&self) -> &PlacementStats {
        &self.stats
    }
    pub fn row_cnt(&self) -> usize {
        self.row_cnt
    }
    pub fn col_cnt(&self) -> usize {
        self.col_cnt
    }
    pub fn marker_cnt(&self) -> usize {
        self.marker_cnt
    }
    /// The shared wire pool
    pub fn wires(&self) -> &Pool<Wire> {
        &self.pools.wires
    }
    /// Tile at (`row`, `col`), if created
    pub fn grid(&self, row: usize, col: usize) -> Option<&Grid> {
        self.tiles.get(row, col)
    }
    /// Tile at (`row`, `col`), failing if it is out of range or not yet created
    pub fn grid_at(&self, row: usize, col: usize) -> GridResult<&Grid> {
        self.check_index(row, self.row_cnt, "row")?;
        self.check_index(col, self.col_cnt, "col")?;
        self.tiles
            .get(row, col)
            .unwrapper(self, format!("No tile at [{}][{}]", row, col))
    }
    /// Number of live wires, not counting replicas
    pub fn wire_cnt(&self) -> usize {
        self.pools.wires.iter().filter(|(_, w)| !w.is_replica()).count()
    }

    /// Tile row of `y`. Coordinates below the extent land in row 0.
    pub fn row_num(&self, y: Int) -> usize {
        let d = y - self.spec.lo.y;
        if d <= 0 {
            return 0;
        }
        (d / self.spec.row_size) as usize
    }
    /// Tile column of `x`. Coordinates left of the extent land in column 0.
    pub fn col_num(&self, x: Int) -> usize {
        let d = x - self.spec.lo.x;
        if d <= 0 {
            return 0;
        }
        (d / self.spec.col_size) as usize
    }
    /// Tile (row, col) of point (`x`, `y`), failing beyond the tile array
    pub fn row_col(&self, x: Int, y: Int) -> GridResult<(usize, usize)> {
        let (row, col) = (self.row_num(y), self.col_num(x));
        if row >= self.row_cnt || col >= self.col_cnt {
            return Err(GridError::OutOfExtent {
                x,
                y,
                rows: self.row_cnt,
                cols: self.col_cnt,
            });
        }
        Ok((row, col))
    }
    fn check_level(&self, level: u32) -> GridResult<()> {
        if level != self.spec.level {
            return Err(GridError::LevelMismatch {
                expected: self.spec.level,
                found: level,
            });
        }
        Ok(())
    }
    /// Tiles holding a copy of `sb`: from its low corner's tile through its upper-right's
    fn place_span(&self, sb: &SearchBox) -> GridResult<(usize, usize, usize, usize)> {
        let (r1, c1) = self.row_col(sb.ll.x, sb.ll.y)?;
        let r2 = self.row_num((sb.ur.y - 1).max(sb.ll.y)).min(self.row_cnt - 1);
        let c2 = self.col_num((sb.ur.x - 1).max(sb.ll.x)).min(self.col_cnt - 1);
        Ok((r1, c1, r2.max(r1), c2.max(c1)))
    }
    /// Tiles to search for `sb`: one extra row and column below, for wires reaching in
    fn search_span(&self, sb: &SearchBox) -> (usize, usize, usize, usize) {
        let r2 = self.row_num(sb.ur.y).min(self.row_cnt - 1);
        let c2 = self.col_num(sb.ur.x).min(self.col_cnt - 1);
        let r1 = self.row_num(sb.ll.y).min(r2).saturating_sub(1);
        let c1 = self.col_num(sb.ll.x).min(c2).saturating_sub(1);
        (r1, c1, r2, c2)
    }
    /// Wrap a tile's [PlaceError] with where it happened
    fn place_error(&self, e: PlaceError, row: usize, col: usize) -> GridError {
        let track = match e {
            PlaceError::Overlap { track, .. } | PlaceError::Blocked(track) => track,
            PlaceError::NoFreeTrack { init, .. } => init,
        };
        GridError::from(e)
            .context(ErrorContext::Track(track))
            .context(ErrorContext::Tile(row, col))
            .context(ErrorContext::Table(self.spec.level))
    }

    ///
    /// Place box `x1,y1`-`x2,y2` with ids `id1` (box) and `id2` (other) and type `wire_type`.
    /// Returns the track index the wire landed on, within its home tile.
    ///
    pub fn add_box(
        &mut self,
        x1: Int,
        y1: Int,
        x2: Int,
        y2: Int,
        level: u32,
        id1: u32,
        id2: u32,
        wire_type: u8,
    ) -> GridResult<usize> {
        let mut sb = SearchBox::with_dir(x1, y1, x2, y2, level, self.spec.dir);
        sb.set_owner(id1, id2);
        sb.set_type(wire_type);
        Ok(self.place_wire(&sb)?.0)
    }
    /// Place rectangle `r` on its own layer, with box id `r.id()` and other id `r.owner()`
    pub fn place_box(&mut self, r: &Rect) -> GridResult<usize> {
        let mut sb = SearchBox::with_dir(r.xlo, r.ylo, r.xhi, r.yhi, r.layer() as u32, self.spec.dir);
        sb.set_owner(r.id(), r.owner());
        sb.set_type(r.box_type());
        Ok(self.place_wire(&sb)?.0)
    }
    ///
    /// Place `sb` as a wire.
    /// Its representative goes in the tile of its low corner, where overlaps are resolved.
    /// Every other tile its final span reaches gets a replica.
    /// Every tile is checked before any is changed.
    ///
    /// Returns the representative's track index and public wire id.
    ///
    pub fn place_wire(&mut self, sb: &SearchBox) -> GridResult<(usize, u32)> {
        self.check_level(sb.level)?;
        let (r1, c1, r2, c2) = self.place_span(sb)?;
        for r in r1..=r2 {
            for c in c1..=c2 {
                let grid = self.tiles.get_or_create(r, c)?;
                if let Err(e) = grid.precheck_box(&self.pools, sb, &self.config) {
                    self.stats.rejected += 1;
                    warn!("Rejected box {} in tile [{}][{}]: {}", sb.owner, r, c, e);
                    return Err(self.place_error(e, r, c));
                }
            }
        }
        let mut delta = PlacementStats::default();
        let grid = self.tiles.get_or_create(r1, c1)?;
        let placed = match grid.place_wire(&mut self.pools, sb, &self.config, &mut delta) {
            Ok(p) => p,
            Err(e) => return Err(self.place_error(e, r1, c1)),
        };
        if placed.linked {
            delta.tile_replicas += self.add_tile_replicas(placed.wire, (r1, c1), &mut delta)?;
        }
        for w in placed.changed.iter() {
            if self.pools.wires[*w].track.is_some() {
                self.add_tile_replicas(*w, (r1, c1), &mut PlacementStats::default())?;
            }
        }
        self.stats += delta;
        Ok((placed.track, placed.wire.index()))
    }
    ///
    /// Copy representative `rep`, homed in tile `home`, into every other tile its span reaches.
    /// Returns the number of tiles given a copy.
    ///
    fn add_tile_replicas(
        &mut self,
        rep: WireId,
        home: (usize, usize),
        stats: &mut PlacementStats,
    ) -> GridResult<usize> {
        let sb = self.pools.wires[rep].search_box(self.spec.level);
        let (r1, c1, r2, c2) = self.place_span(&sb)?;
        let mut cnt = 0;
        for r in r1..=r2 {
            for c in c1..=c2 {
                if (r, c) == home {
                    continue;
                }
                let grid = self.tiles.get_or_create(r, c)?;
                if grid.add_replicas(&mut self.pools, rep, false, stats) > 0 {
                    cnt += 1;
                }
            }
        }
        Ok(cnt)
    }
    /// Rebuild every replica of representative `rep`, homed in tile `home`, from its current span
    fn refresh_replicas(&mut self, rep: WireId, home: (usize, usize)) -> GridResult<()> {
        self.pools.drop_replicas(rep);
        if self.pools.wires[rep].track.is_none() {
            return Ok(());
        }
        let mut scratch = PlacementStats::default();
        if let Some(grid) = self.tiles.get_mut(home.0, home.1) {
            grid.add_replicas(&mut self.pools, rep, true, &mut scratch);
        }
        self.add_tile_replicas(rep, home, &mut scratch)?;
        Ok(())
    }

    /// Resolve public wire id `id` to its live handle
    fn handle(&self, id: u32) -> GridResult<WireId> {
        self.pools.wires.handle_at(id).ok_or(GridError::StaleWire(id))
    }
    /// Wire with public id `id`
    pub fn wire(&self, id: u32) -> GridResult<&Wire> {
        let h = self.handle(id)?;
        self.pools.wires.get(h).ok_or(GridError::StaleWire(id))
    }
    /// Layout box of wire `id`
    pub fn get_box(&self, id: u32) -> GridResult<WireBox> {
        let w = self.wire(id)?;
        let (x1, y1, x2, y2) = w.coords();
        Ok(WireBox {
            x1,
            y1,
            x2,
            y2,
            level: self.spec.level,
            box_id: w.box_id,
            other_id: w.other_id,
            wire_type: w.flags(),
        })
    }
    /// Box id, other id and type of wire `id`
    pub fn ids(&self, id: u32) -> GridResult<(u32, u32, u8)> {
        let w = self.wire(id)?;
        Ok((w.box_id, w.other_id, w.flags()))
    }
    pub fn cc_dist(&self, id: u32) -> GridResult<CcDist> {
        let w = self.wire(id)?;
        Ok(CcDist {
            width: w.width,
            len: w.len,
            box_id: w.box_id,
            other_id: w.other_id,
        })
    }
    /// Wire `id` as a [SearchBox], carrying its ids and type
    pub fn coords(&self, id: u32) -> GridResult<SearchBox> {
        Ok(self.wire(id)?.search_box(self.spec.level))
    }
    /// Id of the first linked wire with box id `box_id`
    pub fn find_wire(&self, box_id: u32) -> Option<u32> {
        self.tiles
            .iter()
            .find_map(|(_, g)| g.find_wire(&self.pools, box_id))
            .map(|h| h.index())
    }

    /// Unlink and free representative `rep` and all its replicas.
    /// Returns the number of wires freed.
    fn release_rep(&mut self, rep: WireId) -> usize {
        let cnt = self.pools.drop_replicas(rep);
        self.pools.unlink(rep);
        self.pools.wires.deallocate(rep);
        cnt + 1
    }
    ///
    /// Remove wire `id` from the table, along with every replica of it.
    /// Replica ids remove their representative.
    /// Returns the number of wires freed.
    ///
    pub fn release_wire(&mut self, id: u32) -> GridResult<usize> {
        let h = self.handle(id)?;
        let rep = self.pools.wires[h].src.unwrap_or(h);
        let cnt = self.release_rep(rep);
        debug!("Released wire #{} and {} replicas", rep.index(), cnt - 1);
        Ok(cnt)
    }
    /// Remove every wire whose representative satisfies `pred`.
    /// Returns the number of representatives removed.
    pub fn remove_wires(&mut self, mut pred: impl FnMut(&Wire) -> bool) -> usize {
        let reps: Vec<WireId> = self
            .pools
            .wires
            .iter()
            .filter(|(_, w)| !w.is_replica() && pred(w))
            .map(|(h, _)| h)
            .collect();
        for rep in reps.iter() {
            self.release_rep(*rep);
        }
        reps.len()
    }

    /// Emit the box ids (or representative wire ids) of `hits` into `out`,
    /// resolving replicas and dropping repeats
    fn emit(wires: &mut Pool<Wire>, hits: &[WireId], out: &mut Array1D<u32>, wire_ids: bool) -> usize {
        let mut marked = Vec::new();
        for id in hits {
            let rep = match wires.get(*id) {
                Some(w) => w.src.unwrap_or(*id),
                None => continue,
            };
            let w = match wires.get_mut(rep) {
                Some(w) => w,
                None => continue,
            };
            if w.ext() {
                continue;
            }
            w.set_ext(true);
            out.add(if wire_ids { w.id } else { w.box_id });
            marked.push(rep);
        }
        for rep in marked.iter() {
            if let Some(w) = wires.get_mut(*rep) {
                w.set_ext(false);
            }
        }
        marked.len()
    }
    fn search_hits(&mut self, sb: &SearchBox) -> GridResult<Vec<WireId>> {
        self.check_level(sb.level)?;
        let (r1, c1, r2, c2) = self.search_span(sb);
        let mut hits = Vec::new();
        for r in r1..=r2 {
            for c in c1..=c2 {
                if let Some(grid) = self.tiles.get(r, c) {
                    grid.search_wires(&mut self.pools, sb, &mut hits);
                }
            }
        }
        Ok(hits)
    }
    ///
    /// Search for wires overlapping `sb`, adding their box ids to `out`.
    /// Each placed box is reported once, however many tracks and tiles it spans.
    /// Returns the number of ids added.
    ///
    pub fn search(&mut self, sb: &SearchBox, out: &mut Array1D<u32>) -> GridResult<usize> {
        let hits = self.search_hits(sb)?;
        let cnt = Self::emit(&mut self.pools.wires, &hits, out, false);
        debug!("Search {:?}-{:?} found {} boxes", sb.ll, sb.ur, cnt);
        Ok(cnt)
    }
    /// Box ids overlapping `x1,y1`-`x2,y2` on our level
    pub fn search_ids(&mut self, x1: Int, y1: Int, x2: Int, y2: Int) -> GridResult<Vec<u32>> {
        let sb = SearchBox::new(x1, y1, x2, y2, self.spec.level);
        let mut out = Array1D::new(16);
        self.search(&sb, &mut out)?;
        Ok(out.into())
    }
    /// Representative wire ids overlapping `sb`
    pub fn search_wire_ids(&mut self, sb: &SearchBox) -> GridResult<Vec<u32>> {
        let hits = self.search_hits(sb)?;
        let mut out = Array1D::new(16);
        Self::emit(&mut self.pools.wires, &hits, &mut out, true);
        Ok(out.into())
    }
    /// Search a single tile, adding wire ids if `wire_ids`, else box ids
    pub fn search_tile(
        &mut self,
        x1: Int,
        y1: Int,
        x2: Int,
        y2: Int,
        row: usize,
        col: usize,
        out: &mut Array1D<u32>,
        wire_ids: bool,
    ) -> GridResult<usize> {
        self.check_index(row, self.row_cnt, "row")?;
        self.check_index(col, self.col_cnt, "col")?;
        let sb = SearchBox::new(x1, y1, x2, y2, self.spec.level);
        let mut hits = Vec::new();
        if let Some(grid) = self.tiles.get(row, col) {
            grid.search_wires(&mut self.pools, &sb, &mut hits);
        }
        Ok(Self::emit(&mut self.pools.wires, &hits, out, wire_ids))
    }
    /// Search track by track, merging hits closer than `gap` into runs
    pub fn search_merged(&mut self, sb: &SearchBox, gap: Int) -> GridResult<Vec<MergedRun>> {
        self.check_level(sb.level)?;
        let (r1, c1, r2, c2) = self.search_span(sb);
        let mut runs = Vec::new();
        for r in r1..=r2 {
            for c in c1..=c2 {
                if let Some(grid) = self.tiles.get(r, c) {
                    runs.extend(grid.search_merged(&mut self.pools, sb, gap));
                }
            }
        }
        Ok(runs)
    }

    /// Set the maximum search area used by domain passes
    pub fn set_max_area(&mut self, x1: Int, y1: Int, x2: Int, y2: Int) {
        self.max_area = Some(SearchBox::new(x1, y1, x2, y2, self.spec.level));
    }
    pub fn reset_max_area(&mut self) {
        self.max_area = None;
    }
    pub fn max_area(&self) -> Option<&SearchBox> {
        self.max_area.as_ref()
    }
    /// Box ids of tile (`row`, `col`) within the maximum search area,
    /// widened by `adjust` tracks. Without an area, every wire of the tile.
    pub fn domain_box_ids(&mut self, row: usize, col: usize, adjust: usize) -> GridResult<Vec<u32>> {
        self.check_index(row, self.row_cnt, "row")?;
        self.check_index(col, self.col_cnt, "col")?;
        let grid = match self.tiles.get_mut(row, col) {
            Some(g) => g,
            None => return Ok(Vec::new()),
        };
        grid.set_search_domain(self.max_area.as_ref(), adjust);
        Ok(grid
            .domain_wires(&self.pools)
            .iter()
            .map(|h| self.pools.wires[*h].box_id)
            .collect())
    }

    /// Check every track of every tile is xy-ascending
    pub fn is_ordered(&self) -> bool {
        let mut ordered = true;
        let mut cnt = 0;
        for ((r, c), grid) in self.tiles.iter() {
            let (ok, n) = grid.is_ordered(&self.pools);
            cnt += n;
            if !ok {
                info!("Tile [{}][{}] is not ordered", r, c);
                ordered = false;
            }
        }
        info!("Checked order of {} wires: {}", cnt, if ordered { "ok" } else { "FAILED" });
        ordered
    }
    /// Trim wires overrunning their bucket's successor, and rebuild their replicas.
    /// Only applies under end-adjustment. Returns whether anything was attempted.
    pub fn adjust_overlap_marker_end(&mut self) -> GridResult<bool> {
        if self.config.overlap_adjust != OverlapAdjust::EndAdjust {
            return Ok(false);
        }
        for (r, c) in self.tiles.positions() {
            let trimmed = match self.tiles.get(r, c) {
                Some(grid) => grid.adjust_overlap_marker_end(&mut self.pools),
                None => continue,
            };
            for w in trimmed {
                self.refresh_replicas(w, (r, c))?;
            }
        }
        Ok(true)
    }
    /// Rebuild every track's extrusion markers
    pub fn set_extrusion_marker(&mut self) -> usize {
        let mut cnt = 0;
        for (r, c) in self.tiles.positions() {
            if let Some(grid) = self.tiles.get(r, c) {
                cnt += grid.set_extrusion_marker(&mut self.pools);
            }
        }
        cnt
    }
    /// Track allocation summaries of every created tile, also logged
    pub fn track_counts(&self) -> Vec<((usize, usize), TrackCounts)> {
        info!("tile      alloc  live offbase expand tsubtn toptk   stn");
        self.tiles
            .iter()
            .map(|((r, c), grid)| {
                let tc = grid.track_counts(&self.pools);
                info!(
                    "[{:3}][{:3}] {:5} {:5} {:7} {:6} {:6} {:5} {:5}",
                    r, c, tc.alloc, tc.live, tc.off_base, tc.expanded, tc.sub_tracks, tc.top_track, tc.top_sub_cnt
                );
                ((r, c), tc)
            })
            .collect()
    }

    ///
    /// Place a chain of rectangles from `rects`, each on the first free track at or above its own.
    /// Rectangles on other layers or running in the other direction are skipped.
    /// With `trans`, each rectangle is transformed first.
    /// Rectangles finding no free track are counted as rejected and skipped.
    ///
    /// Returns the number placed.
    ///
    pub fn add_box_list(
        &mut self,
        rects: &Pool<Rect>,
        head: Option<Handle>,
        trans: Option<&Transform>,
    ) -> GridResult<usize> {
        let mut placed = 0;
        for (_, r) in Rect::chain(rects, head) {
            let r = match trans {
                Some(t) => r.transformed(t),
                None => r.clone(),
            };
            if r.layer() as u32 != self.spec.level || r.dir() != self.spec.dir {
                continue;
            }
            let (row, col) = self.row_col(r.xlo, r.ylo)?;
            let grid = self.tiles.get_or_create(row, col)?;
            let added = grid.add_rect(&mut self.pools, &r, true, &self.config, &mut self.stats);
            match added {
                Ok(_) => placed += 1,
                Err(e @ PlaceError::NoFreeTrack { .. }) => {
                    warn!("Skipping box {}: {}", r.id(), e);
                    self.stats.rejected += 1;
                }
                Err(e) => return Err(self.place_error(e, row, col)),
            }
        }
        Ok(placed)
    }

    /// Coupling records of every tile, looking `track_dist` tracks away
    pub fn coupling(&self, track_dist: usize) -> Vec<Coupling> {
        self.tiles
            .iter()
            .flat_map(|(_, g)| g.coupling(&self.pools, track_dist, &self.config))
            .collect()
    }
    ///
    /// Create the coupling wire between wires `src` and `dst` over `xy`..`xy + len`.
    /// The new wire is allocated but not placed on any track.
    /// Returns its id, or `None` if the two are not apart in the configured direction.
    ///
    pub fn make_couple_wire(&mut self, src: u32, dst: u32, xy: Int, len: Int) -> GridResult<Option<u32>> {
        let (s, d) = (self.handle(src)?, self.handle(dst)?);
        self.assert(s != d, format!("Cannot couple wire #{} to itself", src))?;
        let high = self.config.cc_target_high_tracks;
        let proto = match self.pools.wires[s].couple_wire(0, &self.pools.wires[d], xy, len, high) {
            Some(w) => w,
            None => return Ok(None),
        };
        let h = self.pools.wires.allocate_with(|h| {
            let mut w = proto;
            w.id = h.index();
            w
        });
        Ok(Some(h.index()))
    }

    /// Block the tracks under `sb` in every tile it overlaps.
    /// With `check_level`, boxes on other levels block nothing.
    pub fn block_tracks(&mut self, sb: &SearchBox, check_level: bool) -> usize {
        if check_level && sb.level != self.spec.level {
            return 0;
        }
        let r1 = self.row_num(sb.ll.y).min(self.row_cnt - 1);
        let c1 = self.col_num(sb.ll.x).min(self.col_cnt - 1);
        let r2 = self.row_num(sb.ur.y).min(self.row_cnt - 1);
        let c2 = self.col_num(sb.ur.x).min(self.col_cnt - 1);
        let mut cnt = 0;
        for r in r1..=r2 {
            for c in c1..=c2 {
                if let Ok(grid) = self.tiles.get_or_create(r, c) {
                    cnt += grid.block_tracks(sb, false);
                }
            }
        }
        cnt
    }
    /// Unblock every track of every tile
    pub fn set_free_tracks(&mut self) {
        for (r, c) in self.tiles.positions() {
            if let Some(grid) = self.tiles.get_mut(r, c) {
                grid.set_free_tracks();
            }
        }
    }
}
impl ErrorHelper for GridTable {
    type Error = GridError;
    fn err(&self, msg: impl Into<String>) -> GridError {
        GridError::Config {
            message: format!("{} ({:?} tracks)", msg.into(), self.spec.dir),
            stack: vec![ErrorContext::Table(self.spec.level)],
        }
    }
}
