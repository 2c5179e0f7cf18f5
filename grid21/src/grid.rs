//!
//! # Grids
//!
//! A [Grid] covers one tile of a table: the tracks of one routing direction on one level.
//! Tracks are indexed by their distance from the grid's low edge in pitches.
//! Each index may hold a ring of sub-tracks, for wires placed off the nominal pitch.
//!

// Crates.io
use log::{debug, error, info};
use serde::{Deserialize, Serialize};

// Local imports
use crate::utils::{Array1D, Pool};
use crate::{
    intersect, BucketGeom, Dir, Int, PlaceError, PlaceResult, PlacementConfig, PlacementStats,
    Point, Rect, SearchBox, Track, TrackId, Window, Wire, WireGeom, WireId,
};

/// # Shared Object Pools
///
/// Wires and tracks of every grid in a table.
#[derive(Debug, Clone)]
pub struct Pools {
    pub wires: Pool<Wire>,
    pub tracks: Pool<Track>,
}
impl Pools {
    pub fn new(chunk: usize) -> Self {
        Self {
            wires: Pool::new(chunk),
            tracks: Pool::new(chunk),
        }
    }
    /// Unlink wire `w` from its track, if it is on one
    pub fn unlink(&mut self, w: WireId) -> bool {
        let t = match self.wires.get(w).and_then(|x| x.track) {
            Some(t) => t,
            None => return false,
        };
        match self.tracks.get_mut(t) {
            Some(track) => track.unlink(&mut self.wires, w),
            None => false,
        }
    }
    /// Unlink and free every replica of representative `rep`.
    /// Returns the number freed.
    pub fn drop_replicas(&mut self, rep: WireId) -> usize {
        let doomed: Vec<WireId> = self
            .wires
            .iter()
            .filter(|(_, w)| w.src == Some(rep))
            .map(|(h, _)| h)
            .collect();
        for w in doomed.iter() {
            self.unlink(*w);
            self.wires.deallocate(*w);
        }
        doomed.len()
    }
}
impl Default for Pools {
    fn default() -> Self {
        Self::new(crate::utils::DEFAULT_CHUNK)
    }
}

/// Track and bucket ranges iterated by domain-restricted passes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SearchDomain {
    pub lo_track: usize,
    pub hi_track: usize,
    pub lo_marker: usize,
    pub hi_marker: usize,
}

/// Result of [Grid::place_wire]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Placed {
    /// First spanned track index
    pub track: usize,
    /// The new representative
    pub wire: WireId,
    /// Whether it was linked, rather than absorbed by or merged into another wire
    pub linked: bool,
    /// Other representatives of this grid whose span changed, or which were unlinked
    pub changed: Vec<WireId>,
}

/// Result of a free-track placement
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FreeTrack {
    /// Track the wire landed on
    pub track: usize,
    /// Track to try first for the next wire in the same sweep
    pub next: usize,
    /// Cross-track coordinate of `track`
    pub height: Int,
}

/// Run of nearby hits on one track, merged across gaps
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MergedRun {
    pub track: usize,
    pub xy: Int,
    pub len: Int,
    /// Box id of the run's first wire
    pub box_id: u32,
}

/// Coupling between two wires on nearby tracks
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Coupling {
    /// Source wire id
    pub src: u32,
    /// Target wire id
    pub dst: u32,
    /// Shared span along the track
    pub xy: Int,
    pub len: Int,
    /// Cross-track spacing
    pub dist: Int,
}

/// Track allocation summary of one grid
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrackCounts {
    /// Track indices
    pub alloc: usize,
    /// Indices holding at least one track
    pub live: usize,
    /// Indices whose ring head is off the nominal pitch
    pub off_base: usize,
    /// Indices holding more than one sub-track
    pub expanded: usize,
    /// Total extra sub-tracks
    pub sub_tracks: usize,
    /// Index with the most sub-tracks
    pub top_track: usize,
    pub top_sub_cnt: usize,
}

/// # Grid
#[derive(Debug, Clone)]
pub struct Grid {
    /// Direction tracks run
    pub dir: Dir,
    pub level: u32,
    /// Tile number, `row * 1000 + col`
    pub num: usize,
    /// Lower-left corner
    pub ll: Point,
    /// Upper-right corner
    pub ur: Point,
    /// Low edge across the tracks
    base: Int,
    /// High edge across the tracks
    max: Int,
    width: Int,
    pitch: Int,
    track_cnt: usize,
    buckets: BucketGeom,
    tracks: Array1D<Option<TrackId>>,
    sub_track_cnt: Array1D<usize>,
    blocked: Array1D<bool>,
    /// Type of wires placed from bare rectangles
    pub default_wire_type: u8,
    domain: SearchDomain,
}
impl Grid {
    /// Create a [Grid] over `ll`-`ur`, with tracks of `width` at `pitch`
    pub fn new(
        dir: Dir,
        level: u32,
        num: usize,
        ll: Point,
        ur: Point,
        width: Int,
        pitch: Int,
        marker_cnt: usize,
    ) -> Self {
        let (base, max) = (ll.coord(!dir), ur.coord(!dir));
        let pitch = pitch.max(1);
        let track_cnt = (((max - base) + pitch - 1) / pitch).max(1) as usize;
        let mut tracks = Array1D::new(track_cnt);
        let mut sub_track_cnt = Array1D::new(track_cnt);
        let mut blocked = Array1D::new(track_cnt);
        tracks.set(track_cnt - 1, None);
        sub_track_cnt.set(track_cnt - 1, 0);
        blocked.set(track_cnt - 1, false);
        let buckets = BucketGeom::new(ll.coord(dir), ur.coord(dir), marker_cnt);
        Self {
            dir,
            level,
            num,
            ll,
            ur,
            base,
            max,
            width,
            pitch,
            track_cnt,
            buckets,
            tracks,
            sub_track_cnt,
            blocked,
            default_wire_type: 0,
            domain: SearchDomain {
                lo_track: 0,
                hi_track: track_cnt - 1,
                lo_marker: 0,
                hi_marker: buckets.cnt - 1,
            },
        }
    }
    pub fn track_cnt(&self) -> usize {
        self.track_cnt
    }
    pub fn buckets(&self) -> &BucketGeom {
        &self.buckets
    }
    pub fn width(&self) -> Int {
        self.width
    }
    pub fn pitch(&self) -> Int {
        self.pitch
    }
    /// Our extent as a [SearchBox]
    pub fn bbox(&self) -> SearchBox {
        SearchBox::with_dir(self.ll.x, self.ll.y, self.ur.x, self.ur.y, self.level, self.dir)
    }
    /// Track index of cross-track coordinate `xy`, if it lies on the grid
    pub fn abs_track_num(&self, xy: Int) -> Option<usize> {
        let dist = xy - self.base;
        if dist < 0 {
            return None;
        }
        let n = (dist / self.pitch) as usize;
        if n < self.track_cnt {
            Some(n)
        } else {
            None
        }
    }
    /// Track index of cross-track coordinate `xy`, clamped to `[0, track_cnt-1]`
    pub fn min_max_track_num(&self, xy: Int) -> usize {
        let dist = xy - self.base;
        if dist < 0 {
            return 0;
        }
        ((dist / self.pitch) as usize).min(self.track_cnt - 1)
    }
    /// Nominal cross-track coordinate of track `track`
    pub fn track_height(&self, track: usize) -> Int {
        self.base + track as Int * self.pitch
    }
    /// Head of the sub-track ring at `idx`
    pub fn track(&self, idx: usize) -> Option<TrackId> {
        self.tracks.get(idx).copied().flatten()
    }
    pub fn is_blocked(&self, idx: usize) -> bool {
        self.blocked.get(idx).copied().unwrap_or(true)
    }
    /// Sub-tracks at `idx`, lowest base first
    pub fn sub_tracks(&self, tracks: &Pool<Track>, idx: usize) -> Vec<TrackId> {
        let head = match self.track(idx) {
            Some(h) => h,
            None => return Vec::new(),
        };
        let cap = self.sub_track_cnt.get(idx).copied().unwrap_or(0) + 1;
        let mut rv = Vec::with_capacity(cap);
        let mut cur = head;
        while rv.len() < cap {
            rv.push(cur);
            match tracks.get(cur) {
                Some(t) if t.hi != head => cur = t.hi,
                _ => break,
            }
        }
        rv
    }

    ///
    /// Get or create the sub-track at index `idx` with cross-track coordinate `base`.
    /// Returns `None` for out-of-range or blocked indices.
    ///
    pub fn track_ptr(&mut self, tracks: &mut Pool<Track>, idx: usize, base: Int) -> Option<TrackId> {
        if idx >= self.track_cnt || self.is_blocked(idx) {
            return None;
        }
        let (width, marker_cnt) = (self.width, self.buckets.cnt);
        let head = match self.track(idx) {
            Some(h) => h,
            None => {
                let id = tracks.allocate_with(|h| {
                    let mut t = Track::new(h, idx, base, width, marker_cnt);
                    t.lowest = true;
                    t
                });
                self.tracks[idx] = Some(id);
                return Some(id);
            }
        };
        let ring = self.sub_tracks(tracks, idx);
        if let Some(t) = ring.iter().find(|t| tracks[**t].base == base) {
            return Some(*t);
        }
        let id = tracks.allocate_with(|h| Track::new(h, idx, base, width, marker_cnt));
        // Insert before the first sub-track with a higher base, or at the ring's end
        let above = ring
            .iter()
            .copied()
            .find(|t| tracks[*t].base > base)
            .unwrap_or(head);
        let below = tracks[above].low;
        tracks[below].hi = id;
        tracks[id].hi = above;
        tracks[id].low = below;
        tracks[above].low = id;
        if base < tracks[head].base {
            tracks[head].lowest = false;
            tracks[id].lowest = true;
            self.tracks[idx] = Some(id);
        }
        *self.sub_track_cnt.geti(idx) += 1;
        Some(id)
    }
    /// Get or create the nominal track at index `idx`
    pub fn nominal_track(&mut self, tracks: &mut Pool<Track>, idx: usize) -> Option<TrackId> {
        let base = self.track_height(idx);
        self.track_ptr(tracks, idx, base)
    }

    /// Track range spanned by `sb` across our direction
    fn track_range(&self, sb: &SearchBox) -> (usize, usize) {
        let d = !self.dir;
        (self.min_max_track_num(sb.lo(d)), self.min_max_track_num(sb.hi(d)))
    }
    /// Check whether a wire of `geom` owned by `box_id` may go on tracks `t1..=t2`
    fn precheck(
        &self,
        pools: &Pools,
        geom: &WireGeom,
        box_id: u32,
        t1: usize,
        t2: usize,
        cfg: &PlacementConfig,
    ) -> PlaceResult<()> {
        if let Some(t) = (t1..=t2).find(|t| self.is_blocked(*t)) {
            return Err(PlaceError::Blocked(t));
        }
        if cfg.overlap_adjust != crate::OverlapAdjust::Reject {
            return Ok(());
        }
        for t in t1..=t2 {
            for sub in self.sub_tracks(&pools.tracks, t) {
                let track = &pools.tracks[sub];
                if let Some(e) = track.conflicts(&pools.wires, geom, cfg.overlap_touch_check) {
                    return Err(PlaceError::Overlap {
                        track: t,
                        existing: pools.wires[e].box_id,
                        new: box_id,
                    });
                }
            }
        }
        Ok(())
    }
    /// Check `sb` could be placed, without changing anything
    pub fn precheck_box(&self, pools: &Pools, sb: &SearchBox, cfg: &PlacementConfig) -> PlaceResult<()> {
        let geom = WireGeom::from_box(self.dir, sb.ll, sb.ur);
        let (t1, t2) = self.track_range(sb);
        self.precheck(pools, &geom, sb.owner, t1, t2, cfg)
    }

    ///
    /// Place the box of `sb` as a representative wire, on the sub-track of the
    /// first spanned track matching its base. Overlaps are resolved there, per `cfg`.
    /// Every further spanned track then gets a replica of the representative's final span.
    ///
    /// Representatives changed by the placement get their replicas in this grid rebuilt.
    /// Copies in other grids are left to the caller.
    ///
    pub fn place_wire(
        &mut self,
        pools: &mut Pools,
        sb: &SearchBox,
        cfg: &PlacementConfig,
        stats: &mut PlacementStats,
    ) -> PlaceResult<Placed> {
        let geom = WireGeom::from_box(self.dir, sb.ll, sb.ur);
        let (t1, t2) = self.track_range(sb);
        self.precheck(pools, &geom, sb.owner, t1, t2, cfg)?;
        let first = self
            .track_ptr(&mut pools.tracks, t1, geom.base)
            .ok_or(PlaceError::Blocked(t1))?;

        let dir = self.dir;
        let root = pools
            .wires
            .allocate_with(|h| Wire::new(h.index(), dir, geom, sb.owner, sb.other, sb.wire_type));
        let placement = pools.tracks[first].place(&mut pools.wires, root, &self.buckets, cfg, stats);
        let linked = placement.bucket.is_some();
        if linked {
            self.add_replicas(pools, root, true, stats);
        }
        for w in placement.changed.iter() {
            pools.drop_replicas(*w);
            if pools.wires[*w].track.is_some() {
                self.add_replicas(pools, *w, true, &mut PlacementStats::default());
            }
        }
        debug!(
            "Placed box {} on tracks {}..={} of grid {} as wire #{}{}",
            sb.owner,
            t1,
            t2,
            self.num,
            root.index(),
            if linked { "" } else { " (absorbed)" }
        );
        Ok(Placed {
            track: t1,
            wire: root,
            linked,
            changed: placement.changed,
        })
    }

    ///
    /// Copy representative `rep` onto every track of ours its span crosses.
    /// With `home`, `rep` itself sits on the first of them, which is skipped.
    /// Blocked tracks get no copy.
    ///
    /// Returns the number of replicas placed.
    ///
    pub fn add_replicas(
        &mut self,
        pools: &mut Pools,
        rep: WireId,
        home: bool,
        stats: &mut PlacementStats,
    ) -> usize {
        let proto = pools.wires[rep].clone();
        let sb = proto.search_box(self.level);
        let (t1, t2) = self.track_range(&sb);
        let mut cnt = 0;
        for t in t1..=t2 {
            if home && t == t1 {
                continue;
            }
            let track = match t == t1 {
                true => self.track_ptr(&mut pools.tracks, t, proto.base),
                false => self.nominal_track(&mut pools.tracks, t),
            };
            let track = match track {
                Some(x) => x,
                None => continue,
            };
            let id = pools.wires.allocate_with(|h| proto.replica(h.index(), rep));
            pools.tracks[track].insert(&mut pools.wires, id, &self.buckets);
            if t != t1 {
                stats.incr_multi_track(proto.is_power());
            }
            cnt += 1;
        }
        cnt
    }

    /// Place existing wire `w` on nominal track `track`, if it is open and free over `w`'s span
    pub fn add_on_track(
        &mut self,
        pools: &mut Pools,
        track: usize,
        w: WireId,
        cfg: &PlacementConfig,
        stats: &mut PlacementStats,
    ) -> bool {
        let (xy, end) = (pools.wires[w].xy, pools.wires[w].end());
        let tid = match self.nominal_track(&mut pools.tracks, track) {
            Some(t) => t,
            None => return false,
        };
        if !pools.tracks[tid].is_free(&pools.wires, xy, end) {
            return false;
        }
        pools.tracks[tid].place(&mut pools.wires, w, &self.buckets, cfg, stats);
        true
    }

    ///
    /// Place wire `w` on the first free track starting from `init`,
    /// sweeping up if `ascending`, else down (through track 0).
    /// At most `cfg.retry_cap` tracks are tried.
    /// On success the wire's base moves to its track's height.
    ///
    pub fn place_on_free_track(
        &mut self,
        pools: &mut Pools,
        init: usize,
        w: WireId,
        ascending: bool,
        cfg: &PlacementConfig,
        stats: &mut PlacementStats,
    ) -> PlaceResult<FreeTrack> {
        let cap = cfg.retry_cap.max(1);
        let candidates: Vec<usize> = match ascending {
            true => (init..self.track_cnt.min(init.saturating_add(cap))).collect(),
            false => (init.saturating_add(1).saturating_sub(cap)..=init.min(self.track_cnt - 1))
                .rev()
                .collect(),
        };
        let orig_base = pools.wires[w].base;
        for track in candidates.iter().copied() {
            let height = self.track_height(track);
            pools.wires[w].base = height;
            if self.add_on_track(pools, track, w, cfg, stats) {
                let next = match ascending {
                    true => track + 1,
                    false => track.saturating_sub(1),
                };
                return Ok(FreeTrack {
                    track,
                    next,
                    height,
                });
            }
        }
        pools.wires[w].base = orig_base;
        error!(
            "Cannot place wire #{} near track #{} of grid {}",
            pools.wires[w].id, init, self.num
        );
        Err(PlaceError::NoFreeTrack {
            init,
            tried: candidates.len(),
        })
    }

    /// Track index a rectangle would start its free-track search from
    pub fn rect_track_num(&self, r: &Rect) -> usize {
        let ll = Point::new(r.xlo, r.ylo);
        self.min_max_track_num(ll.coord(!self.dir))
    }
    /// Place rectangle `r` on the first free track at or beyond its own.
    /// Its box id is `r.id()` and its other id is `r.owner()`.
    pub fn add_rect(
        &mut self,
        pools: &mut Pools,
        r: &Rect,
        ascending: bool,
        cfg: &PlacementConfig,
        stats: &mut PlacementStats,
    ) -> PlaceResult<FreeTrack> {
        let geom = WireGeom::from_box(self.dir, Point::new(r.xlo, r.ylo), Point::new(r.xhi, r.yhi));
        let (dir, wtype) = (self.dir, self.default_wire_type);
        let w = pools
            .wires
            .allocate_with(|h| Wire::new(h.index(), dir, geom, r.id(), r.owner(), wtype));
        let init = self.rect_track_num(r);
        match self.place_on_free_track(pools, init, w, ascending, cfg, stats) {
            Ok(ft) => Ok(ft),
            Err(e) => {
                pools.wires.deallocate(w);
                Err(e)
            }
        }
    }

    /// Block the tracks under `sb`. With `check_level`, boxes on other levels block nothing.
    /// Returns the number of newly blocked tracks.
    pub fn block_tracks(&mut self, sb: &SearchBox, check_level: bool) -> usize {
        if check_level && sb.level != self.level {
            return 0;
        }
        let g = self.bbox();
        if g.outside(sb.ll.x, sb.ll.y, sb.ur.x, sb.ur.y) {
            return 0;
        }
        let (t1, t2) = self.track_range(sb);
        let mut cnt = 0;
        for t in t1..=t2 {
            if !self.blocked[t] {
                self.blocked[t] = true;
                cnt += 1;
            }
        }
        cnt
    }
    /// Block the tracks under rectangle `r`
    pub fn block_rect(&mut self, r: &Rect) -> usize {
        let sb = SearchBox::new(r.xlo, r.ylo, r.xhi, r.yhi, self.level);
        self.block_tracks(&sb, false)
    }
    /// Unblock every track
    pub fn set_free_tracks(&mut self) {
        for b in self.blocked.iter_mut() {
            *b = false;
        }
    }
    pub fn free_track_cnt(&self) -> usize {
        self.blocked.iter().filter(|b| !**b).count()
    }
    pub fn any_track_available(&self) -> bool {
        self.free_track_cnt() > 0
    }

    /// First track of the tracks under `ll`-`ur`, if all are free over its span
    pub fn find_empty_track(&self, pools: &Pools, ll: Point, ur: Point) -> Option<usize> {
        let d = !self.dir;
        let (t1, t2) = (self.min_max_track_num(ll.coord(d)), self.min_max_track_num(ur.coord(d)));
        let (xy, end) = (ll.coord(self.dir), ur.coord(self.dir));
        let all_free = (t1..=t2).all(|t| {
            !self.is_blocked(t)
                && self
                    .sub_tracks(&pools.tracks, t)
                    .iter()
                    .all(|sub| pools.tracks[*sub].is_free(&pools.wires, xy, end))
        });
        if all_free {
            Some(t1)
        } else {
            None
        }
    }
    /// Center of the allocated track nearest `xy`, or of our nearer edge if none is
    pub fn closest_track_coord(&self, xy: Int) -> Int {
        let t = self.min_max_track_num(xy);
        let up = (t..self.track_cnt).find(|i| self.track(*i).is_some());
        let down = (0..=t).rev().find(|i| self.track(*i).is_some());
        let h1 = up.map(|i| self.track_height(i)).unwrap_or(self.max);
        let h2 = down.map(|i| self.track_height(i)).unwrap_or(self.base);
        if xy - h2 < h1 - xy {
            h2 + self.width / 2
        } else {
            h1 + self.width / 2
        }
    }
    /// Track at `1 / divider` of our cross-track extent
    pub fn first_track(&self, divider: usize) -> usize {
        let xy = self.base + (self.max - self.base) / divider.max(1) as Int;
        self.min_max_track_num(xy)
    }

    /// Box ids of every wire at track index `idx`. Blocked tracks report none.
    pub fn boxes_on_track(&self, pools: &Pools, idx: usize) -> Vec<u32> {
        if self.is_blocked(idx) {
            return Vec::new();
        }
        self.sub_tracks(&pools.tracks, idx)
            .iter()
            .flat_map(|sub| pools.tracks[*sub].iter(&pools.wires).map(|(_, w)| w.box_id))
            .collect()
    }
    /// Box ids of every wire on every open track
    pub fn all_boxes(&self, pools: &Pools) -> Vec<u32> {
        (0..self.track_cnt)
            .flat_map(|t| self.boxes_on_track(pools, t))
            .collect()
    }
    /// Linked wire with box id `box_id`
    pub fn find_wire(&self, pools: &Pools, box_id: u32) -> Option<WireId> {
        (0..self.track_cnt).find_map(|t| {
            self.sub_tracks(&pools.tracks, t)
                .iter()
                .find_map(|sub| pools.tracks[*sub].find_wire(&pools.wires, box_id))
        })
    }
    /// Check every track is xy-ascending. Returns the check and the number of wires visited.
    pub fn is_ordered(&self, pools: &Pools) -> (bool, usize) {
        let mut ordered = true;
        let mut cnt = 0;
        for t in 0..self.track_cnt {
            for sub in self.sub_tracks(&pools.tracks, t) {
                let (ok, n) = pools.tracks[sub].is_ascending_ordered(&pools.wires);
                cnt += n;
                if !ok {
                    info!("Track #{} of grid {} is not ordered", t, self.num);
                    ordered = false;
                }
            }
        }
        (ordered, cnt)
    }
    /// Rebuild extrusion markers of every track
    pub fn set_extrusion_marker(&self, pools: &mut Pools) -> usize {
        let mut cnt = 0;
        for t in 0..self.track_cnt {
            for sub in self.sub_tracks(&pools.tracks, t) {
                cnt += pools.tracks[sub].set_extrusion_marker(&pools.wires, &self.buckets);
            }
        }
        cnt
    }
    /// Trim bucket-tail representatives overrunning their successors. Returns the trimmed wires.
    pub fn adjust_overlap_marker_end(&self, pools: &mut Pools) -> Vec<WireId> {
        let mut trimmed = Vec::new();
        for t in 0..self.track_cnt {
            for sub in self.sub_tracks(&pools.tracks, t) {
                trimmed.extend(pools.tracks[sub].adjust_overlap_marker_end(&mut pools.wires));
            }
        }
        trimmed
    }

    /// Search window of `sb` in our coordinates
    fn window(&self, sb: &SearchBox) -> Window {
        let d = self.dir;
        let (lo, hi) = (sb.lo(d), sb.hi(d));
        Window {
            lo,
            hi,
            plo: sb.lo(!d),
            phi: sb.hi(!d),
            m1: self.buckets.bucket_num(lo),
            m2: self.buckets.bucket_num(hi),
        }
    }
    /// Track range searched for `sb`: one extra below, for wires reaching up from lower tracks
    fn search_tracks(&self, sb: &SearchBox) -> (usize, usize) {
        let (t1, t2) = self.track_range(sb);
        (t1.saturating_sub(1), t2)
    }
    /// Search one track index, refreshing stale extrusion markers first
    fn search_track(&self, pools: &mut Pools, t: usize, win: &Window, out: &mut Vec<WireId>) -> usize {
        let mut cnt = 0;
        for sub in self.sub_tracks(&pools.tracks, t) {
            let track = &mut pools.tracks[sub];
            if !track.is_ordered() {
                track.set_extrusion_marker(&pools.wires, &self.buckets);
            }
            cnt += track.search(&pools.wires, win, out);
        }
        cnt
    }
    ///
    /// Search for wires overlapping `sb`, pushing their ids onto `out`.
    /// Replicas are reported as-is; resolving them is up to the caller.
    ///
    pub fn search_wires(&self, pools: &mut Pools, sb: &SearchBox, out: &mut Vec<WireId>) -> usize {
        let win = self.window(sb);
        let (lo, hi) = self.search_tracks(sb);
        (lo..=hi)
            .map(|t| self.search_track(pools, t, &win, out))
            .sum()
    }
    ///
    /// Search track by track, merging hits closer than `gap` along the track into runs
    ///
    pub fn search_merged(&self, pools: &mut Pools, sb: &SearchBox, gap: Int) -> Vec<MergedRun> {
        let win = self.window(sb);
        let (lo, hi) = self.search_tracks(sb);
        let mut runs = Vec::new();
        for t in lo..=hi {
            let mut hits = Vec::new();
            self.search_track(pools, t, &win, &mut hits);
            let mut spans: Vec<(Int, Int, u32)> = hits
                .iter()
                .map(|id| {
                    let w = &pools.wires[*id];
                    (w.xy, w.end(), w.box_id)
                })
                .collect();
            spans.sort();
            let mut cur: Option<MergedRun> = None;
            for (xy, end, box_id) in spans {
                cur = match cur {
                    Some(mut run) if xy - (run.xy + run.len) <= gap => {
                        run.len = end.max(run.xy + run.len) - run.xy;
                        Some(run)
                    }
                    Some(run) => {
                        runs.push(run);
                        Some(MergedRun {
                            track: t,
                            xy,
                            len: end - xy,
                            box_id,
                        })
                    }
                    None => Some(MergedRun {
                        track: t,
                        xy,
                        len: end - xy,
                        box_id,
                    }),
                };
            }
            runs.extend(cur);
        }
        runs
    }

    /// Restrict domain passes to `area`, widened by `adjust` tracks on each side.
    /// With no area, the domain is the whole grid.
    pub fn set_search_domain(&mut self, area: Option<&SearchBox>, adjust: usize) {
        let area = match area {
            None => {
                self.domain = SearchDomain {
                    lo_track: 0,
                    hi_track: self.track_cnt - 1,
                    lo_marker: 0,
                    hi_marker: self.buckets.cnt - 1,
                };
                return;
            }
            Some(a) => a,
        };
        let (d, across) = (self.dir, !self.dir);
        self.domain = SearchDomain {
            lo_track: self.min_max_track_num(area.lo(across)).saturating_sub(adjust),
            hi_track: (self.min_max_track_num(area.hi(across)) + adjust).min(self.track_cnt - 1),
            lo_marker: self.buckets.bucket_num(area.lo(d)),
            hi_marker: self.buckets.bucket_num(area.hi(d)),
        };
    }
    pub fn search_domain(&self) -> &SearchDomain {
        &self.domain
    }
    /// Wires in the search domain's tracks and buckets
    pub fn domain_wires(&self, pools: &Pools) -> Vec<WireId> {
        let dm = self.domain;
        let mut rv = Vec::new();
        for t in dm.lo_track..=dm.hi_track {
            for sub in self.sub_tracks(&pools.tracks, t) {
                let track = &pools.tracks[sub];
                for k in dm.lo_marker..=dm.hi_marker {
                    rv.extend(track.bucket(&pools.wires, k).map(|(id, _)| id));
                }
            }
        }
        rv
    }

    ///
    /// Coupling pass: for each wire, every overlapping wire on the next `track_dist`
    /// track indices, toward higher tracks or lower per `cfg.cc_target_high_tracks`.
    ///
    pub fn coupling(&self, pools: &Pools, track_dist: usize, cfg: &PlacementConfig) -> Vec<Coupling> {
        let high = cfg.cc_target_high_tracks;
        let mut rv = Vec::new();
        for t in 0..self.track_cnt {
            let targets: Vec<usize> = match high {
                true => ((t + 1)..self.track_cnt.min(t + 1 + track_dist)).collect(),
                false => (t.saturating_sub(track_dist)..t).rev().collect(),
            };
            for sub in self.sub_tracks(&pools.tracks, t) {
                for sid in pools.tracks[sub].wire_ids(&pools.wires, cfg.no_power_source) {
                    let src = &pools.wires[sid];
                    for tt in targets.iter() {
                        for tsub in self.sub_tracks(&pools.tracks, *tt) {
                            let track = &pools.tracks[tsub];
                            for did in track.wire_ids(&pools.wires, cfg.no_power_target) {
                                let dst = &pools.wires[did];
                                let (xy, end) = match intersect(src.xy, src.len, dst.xy, dst.len) {
                                    Some(x) => x,
                                    None => continue,
                                };
                                if let Some(dist) = src.coupling_gap(dst, high) {
                                    rv.push(Coupling {
                                        src: src.id,
                                        dst: dst.id,
                                        xy,
                                        len: end - xy,
                                        dist,
                                    });
                                }
                            }
                        }
                    }
                }
            }
        }
        rv
    }

    /// Track allocation summary
    pub fn track_counts(&self, pools: &Pools) -> TrackCounts {
        let mut tc = TrackCounts {
            alloc: self.track_cnt,
            ..Default::default()
        };
        for t in 0..self.track_cnt {
            let head = match self.track(t) {
                Some(h) => h,
                None => continue,
            };
            tc.live += 1;
            if pools.tracks.get(head).map(|tr| tr.base) != Some(self.track_height(t)) {
                tc.off_base += 1;
            }
            let subs = self.sub_track_cnt.get(t).copied().unwrap_or(0);
            if subs == 0 {
                continue;
            }
            tc.expanded += 1;
            tc.sub_tracks += subs;
            if subs > tc.top_sub_cnt {
                tc.top_sub_cnt = subs;
                tc.top_track = t;
            }
        }
        tc
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::OverlapAdjust;

    fn grid() -> Grid {
        // Horizontal tracks at y = 0, 10, .., 90
        Grid::new(Dir::Horiz, 3, 0, Point::new(0, 0), Point::new(100, 100), 5, 10, 4)
    }

    #[test]
    fn track_numbers() {
        let g = grid();
        assert_eq!(g.track_cnt(), 10);
        assert_eq!(g.abs_track_num(12), Some(1));
        assert_eq!(g.abs_track_num(-1), None);
        assert_eq!(g.abs_track_num(100), None);
        assert_eq!(g.min_max_track_num(-50), 0);
        assert_eq!(g.min_max_track_num(1000), 9);
        let nums: Vec<usize> = (-20..130).map(|xy| g.min_max_track_num(xy)).collect();
        assert!(nums.windows(2).all(|p| p[0] <= p[1]));
        assert_eq!(g.track_height(3), 30);
        assert_eq!(g.first_track(2), 5);
        let odd = Grid::new(Dir::Vert, 1, 0, Point::new(0, 0), Point::new(95, 10), 5, 10, 4);
        assert_eq!(odd.track_cnt(), 10);
    }
    #[test]
    fn sub_track_ring() {
        let mut g = grid();
        let mut pools = Pools::new(8);
        let a = g.track_ptr(&mut pools.tracks, 2, 20);
        let b = g.track_ptr(&mut pools.tracks, 2, 24);
        let c = g.track_ptr(&mut pools.tracks, 2, 17);
        assert_eq!(g.track_ptr(&mut pools.tracks, 2, 24), b);
        let bases: Vec<Int> = g
            .sub_tracks(&pools.tracks, 2)
            .iter()
            .map(|t| pools.tracks[*t].base)
            .collect();
        assert_eq!(bases, vec![17, 20, 24]);
        assert_eq!(g.track(2), c);
        assert!(a.is_some());
        let tc = g.track_counts(&pools);
        assert_eq!((tc.live, tc.off_base, tc.expanded, tc.sub_tracks), (1, 1, 1, 2));
        assert_eq!(g.track_ptr(&mut pools.tracks, 10, 100), None);
    }
    #[test]
    fn multi_track_replicas() -> PlaceResult<()> {
        let mut g = grid();
        let mut pools = Pools::new(8);
        let mut stats = PlacementStats::default();
        let cfg = PlacementConfig::default();
        let sb = SearchBox::with_dir(0, 8, 50, 32, 3, Dir::Horiz);
        let placed = g.place_wire(&mut pools, &sb, &cfg, &mut stats)?;
        let root = placed.wire;
        assert_eq!(placed.track, 0);
        assert!(placed.linked);
        assert_eq!(stats.signal_multi_track, 3);
        assert_eq!(g.boxes_on_track(&pools, 2), vec![0]);
        let replicas = pools.wires.iter().filter(|(_, w)| w.src == Some(root)).count();
        assert_eq!(replicas, 3);
        // Every spanned track reports it; resolution is left to the caller
        let mut hits = Vec::new();
        g.search_wires(&mut pools, &SearchBox::new(10, 0, 20, 100, 3), &mut hits);
        assert_eq!(hits.len(), 4);
        Ok(())
    }
    #[test]
    fn replicas_follow_trimmed_rep() -> PlaceResult<()> {
        let mut g = grid();
        let mut pools = Pools::new(8);
        let mut stats = PlacementStats::default();
        let cfg = PlacementConfig {
            overlap_adjust: OverlapAdjust::EndAdjust,
            ..Default::default()
        };
        let mut a = SearchBox::with_dir(20, 10, 60, 25, 3, Dir::Horiz);
        a.owner = 1;
        let first = g.place_wire(&mut pools, &a, &cfg, &mut stats)?;
        let mut b = SearchBox::with_dir(10, 10, 40, 25, 3, Dir::Horiz);
        b.owner = 2;
        let second = g.place_wire(&mut pools, &b, &cfg, &mut stats)?;
        assert!(second.linked);
        assert_eq!(second.changed, vec![first.wire]);

        let spans = |box_id: u32| -> Vec<(Int, Int)> {
            pools
                .wires
                .iter()
                .filter(|(_, w)| w.box_id == box_id)
                .map(|(_, w)| (w.xy, w.len))
                .collect()
        };
        assert_eq!(spans(1), vec![(40, 20), (40, 20)]);
        assert_eq!(spans(2).len(), 2);
        assert!(spans(2).iter().all(|s| *s == (10, 30)));
        assert_eq!(stats.trimmed, 1);
        Ok(())
    }
    #[test]
    fn blocked_tracks() {
        let mut g = grid();
        let mut pools = Pools::new(8);
        let mut stats = PlacementStats::default();
        let cfg = PlacementConfig::default();
        assert_eq!(g.block_rect(&Rect::new(0, 20, 100, 35)), 2);
        assert_eq!(g.free_track_cnt(), 8);
        let sb = SearchBox::with_dir(0, 22, 50, 27, 3, Dir::Horiz);
        let err = g.place_wire(&mut pools, &sb, &cfg, &mut stats);
        assert_eq!(err, Err(PlaceError::Blocked(2)));
        assert_eq!(pools.wires.live_cnt(), 0);
        assert_eq!(g.block_tracks(&SearchBox::new(0, 50, 100, 60, 7), true), 0);
        g.set_free_tracks();
        assert!(g.any_track_available());
        assert_eq!(g.free_track_cnt(), 10);
    }
    #[test]
    fn reject_leaves_grid_untouched() -> PlaceResult<()> {
        let mut g = grid();
        let mut pools = Pools::new(8);
        let mut stats = PlacementStats::default();
        let cfg = PlacementConfig {
            overlap_adjust: OverlapAdjust::Reject,
            ..Default::default()
        };
        let mut a = SearchBox::with_dir(0, 10, 40, 15, 3, Dir::Horiz);
        a.owner = 1;
        g.place_wire(&mut pools, &a, &cfg, &mut stats)?;
        let mut b = SearchBox::with_dir(30, 10, 60, 15, 3, Dir::Horiz);
        b.owner = 2;
        let err = g.place_wire(&mut pools, &b, &cfg, &mut stats);
        assert_eq!(
            err,
            Err(PlaceError::Overlap {
                track: 1,
                existing: 1,
                new: 2
            })
        );
        assert_eq!(pools.wires.live_cnt(), 1);
        assert_eq!(g.all_boxes(&pools), vec![1]);
        Ok(())
    }
    #[test]
    fn free_track_retry() {
        let mut g = grid();
        let mut pools = Pools::new(8);
        let mut stats = PlacementStats::default();
        let cfg = PlacementConfig {
            retry_cap: 3,
            ..Default::default()
        };
        let mut r = Rect::new(0, 10, 50, 15);
        r.set_id(7);
        let ft = g.add_rect(&mut pools, &r, true, &cfg, &mut stats);
        assert_eq!(
            ft,
            Ok(FreeTrack {
                track: 1,
                next: 2,
                height: 10
            })
        );
        // Same span: bumped to the next track up
        let ft = g.add_rect(&mut pools, &r, true, &cfg, &mut stats);
        assert_eq!(ft.map(|f| f.track), Ok(2));
        g.add_rect(&mut pools, &r, true, &cfg, &mut stats).ok();
        // Tracks 1, 2 and 3 are taken; the cap stops the sweep there
        let ft = g.add_rect(&mut pools, &r, true, &cfg, &mut stats);
        assert_eq!(ft, Err(PlaceError::NoFreeTrack { init: 1, tried: 3 }));
        assert_eq!(pools.wires.live_cnt(), 3);
        // Sweeping down reaches track 0
        let ft = g.add_rect(&mut pools, &r, false, &cfg, &mut stats);
        assert_eq!(ft.map(|f| f.track), Ok(0));
        assert_eq!(g.find_empty_track(&pools, Point::new(0, 40), Point::new(50, 45)), Some(4));
        assert_eq!(g.find_empty_track(&pools, Point::new(0, 10), Point::new(50, 15)), None);
    }
    #[test]
    fn merged_runs_and_coupling() -> PlaceResult<()> {
        let mut g = grid();
        let mut pools = Pools::new(8);
        let mut stats = PlacementStats::default();
        let cfg = PlacementConfig::default();
        for (x1, x2, y, id) in [(0, 10, 10, 1), (12, 20, 10, 2), (40, 50, 10, 3), (5, 45, 20, 4)] {
            let mut sb = SearchBox::with_dir(x1, y, x2, y + 5, 3, Dir::Horiz);
            sb.owner = id;
            g.place_wire(&mut pools, &sb, &cfg, &mut stats)?;
        }
        let runs = g.search_merged(&mut pools, &SearchBox::new(0, 10, 100, 15, 3), 5);
        let track1: Vec<(Int, Int)> = runs
            .iter()
            .filter(|r| r.track == 1)
            .map(|r| (r.xy, r.len))
            .collect();
        assert_eq!(track1, vec![(0, 20), (40, 10)]);

        let cc = g.coupling(&pools, 1, &cfg);
        let spans: Vec<(Int, Int, Int)> = cc.iter().map(|c| (c.xy, c.len, c.dist)).collect();
        assert_eq!(spans, vec![(5, 5, 5), (12, 8, 5), (40, 5, 5)]);
        Ok(())
    }
    #[test]
    fn search_domain() -> PlaceResult<()> {
        let mut g = grid();
        let mut pools = Pools::new(8);
        let mut stats = PlacementStats::default();
        let cfg = PlacementConfig::default();
        for (y, id) in [(10, 1), (50, 2), (80, 3)] {
            let mut sb = SearchBox::with_dir(0, y, 20, y + 5, 3, Dir::Horiz);
            sb.owner = id;
            g.place_wire(&mut pools, &sb, &cfg, &mut stats)?;
        }
        assert_eq!(g.domain_wires(&pools).len(), 3);
        g.set_search_domain(Some(&SearchBox::new(0, 45, 100, 55, 3)), 1);
        assert_eq!(g.search_domain().lo_track, 3);
        assert_eq!(g.search_domain().hi_track, 6);
        let ids: Vec<u32> = g
            .domain_wires(&pools)
            .iter()
            .map(|id| pools.wires[*id].box_id)
            .collect();
        assert_eq!(ids, vec![2]);
        Ok(())
    }
}
