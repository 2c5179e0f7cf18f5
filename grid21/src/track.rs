//!
//! # Tracks
//!
//! A [Track] is one lane of a grid, at a fixed cross-track `base`.
//! Its wires are split into marker buckets by start coordinate,
//! each bucket an xy-ascending list threaded through the wires' `next` links.
//!

// Crates.io
use log::{debug, warn};

// Local imports
use crate::utils::Pool;
use crate::{Int, OverlapAdjust, PlacementConfig, PlacementStats, TrackId, Wire, WireGeom, WireId};

/// # Bucket Geometry
///
/// Splits `start`.. into `cnt` buckets of `len` database units.
/// Coordinates outside the range land in the first or last bucket.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BucketGeom {
    pub start: Int,
    pub len: Int,
    pub cnt: usize,
}
impl BucketGeom {
    /// Split `start`..`end` into `cnt` equal buckets, rounding their length up
    pub fn new(start: Int, end: Int, cnt: usize) -> Self {
        let cnt = cnt.max(1);
        let span = (end - start).max(0);
        let n = cnt as Int;
        let len = ((span + n - 1) / n).max(1);
        Self { start, len, cnt }
    }
    /// Bucket index of coordinate `xy`, clamped to `[0, cnt-1]`
    pub fn bucket_num(&self, xy: Int) -> usize {
        let offset = xy - self.start;
        if offset <= 0 {
            return 0;
        }
        ((offset / self.len) as usize).min(self.cnt - 1)
    }
}

/// First wire, in bucket order, which extends into a later bucket
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Extrusion {
    /// Bucket holding `wire`
    pub bucket: usize,
    pub wire: WireId,
}

/// Outcome of [Track::place]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Placement {
    /// Bucket the new wire was linked into.
    /// `None` if it was absorbed by, or merged into, another wire.
    pub bucket: Option<usize>,
    /// Other representatives whose span changed, or which were unlinked
    pub changed: Vec<WireId>,
}

/// Effect of resolving one overlapping pair
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Resolution {
    Kept,
    Trimmed,
    /// `gone` is covered by `into`, possibly after `into` grew
    Gone { gone: WireId, into: WireId },
}

/// # Track Search Window
///
/// Along-track range `lo`..`hi` in buckets `m1`..=`m2`,
/// and cross-track range `plo`..`phi`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Window {
    pub lo: Int,
    pub hi: Int,
    pub plo: Int,
    pub phi: Int,
    pub m1: usize,
    pub m2: usize,
}

/// Iterator over one bucket list, from some starting wire
pub struct ListIter<'a> {
    wires: &'a Pool<Wire>,
    cur: Option<WireId>,
}
impl<'a> ListIter<'a> {
    pub fn new(wires: &'a Pool<Wire>, start: Option<WireId>) -> Self {
        Self { wires, cur: start }
    }
}
impl<'a> Iterator for ListIter<'a> {
    type Item = (WireId, &'a Wire);
    fn next(&mut self) -> Option<Self::Item> {
        let id = self.cur?;
        let w = self.wires.get(id)?;
        self.cur = w.next;
        Some((id, w))
    }
}

/// # Track
#[derive(Debug, Clone)]
pub struct Track {
    /// Our own pool handle
    pub id: TrackId,
    /// Nominal track index within the grid
    pub num: usize,
    /// Cross-track coordinate
    pub base: Int,
    pub width: Int,
    markers: Vec<Option<WireId>>,
    ext: Vec<Option<Extrusion>>,
    /// Next sub-track up the ring of sub-tracks sharing `num`
    pub hi: TrackId,
    /// Next sub-track down the ring
    pub low: TrackId,
    /// Head of the sub-track ring
    pub lowest: bool,
    ordered: bool,
}
impl Track {
    /// Create a single-track ring
    pub fn new(id: TrackId, num: usize, base: Int, width: Int, marker_cnt: usize) -> Self {
        let marker_cnt = marker_cnt.max(1);
        Self {
            id,
            num,
            base,
            width,
            markers: vec![None; marker_cnt],
            ext: vec![None; marker_cnt],
            hi: id,
            low: id,
            lowest: false,
            ordered: false,
        }
    }
    pub fn marker_cnt(&self) -> usize {
        self.markers.len()
    }
    /// Head of bucket `k`
    pub fn marker(&self, k: usize) -> Option<WireId> {
        self.markers.get(k).copied().flatten()
    }
    /// Extrusion entry of bucket `k`
    pub fn extrusion(&self, k: usize) -> Option<Extrusion> {
        self.ext.get(k).copied().flatten()
    }
    /// Boolean indication of whether our extrusion markers are current
    pub fn is_ordered(&self) -> bool {
        self.ordered
    }
    pub fn is_empty(&self) -> bool {
        self.markers.iter().all(Option::is_none)
    }
    /// Iterate over bucket `k`
    pub fn bucket<'a>(&self, wires: &'a Pool<Wire>, k: usize) -> ListIter<'a> {
        ListIter::new(wires, self.marker(k))
    }
    /// Iterate over all wires, in bucket order
    pub fn iter<'a>(&'a self, wires: &'a Pool<Wire>) -> impl Iterator<Item = (WireId, &'a Wire)> + 'a {
        self.markers
            .iter()
            .flat_map(move |head| ListIter::new(wires, *head))
    }
    /// Ids of all wires, skipping power wires if `no_power`
    pub fn wire_ids(&self, wires: &Pool<Wire>, no_power: bool) -> Vec<WireId> {
        self.iter(wires)
            .filter(|(_, w)| !(no_power && w.is_power()))
            .map(|(id, _)| id)
            .collect()
    }
    /// Number of linked wires
    pub fn wire_cnt(&self, wires: &Pool<Wire>) -> usize {
        self.iter(wires).count()
    }
    /// Find the linked wire with box id `box_id`
    pub fn find_wire(&self, wires: &Pool<Wire>, box_id: u32) -> Option<WireId> {
        self.iter(wires)
            .find(|(_, w)| w.box_id == box_id)
            .map(|(id, _)| id)
    }
    ///
    /// Place wire `w` on this track, resolving overlaps per `cfg`.
    ///
    /// Replicas are inserted as-is. Overlap policies apply only between representatives:
    /// a replica is never trimmed, merged or absorbed, and never trims another wire.
    /// Representatives moved by a trim are re-bucketed by their new start.
    /// Wires absorbed by another, or merged into another, remain allocated but unlinked.
    ///
    pub fn place(
        &mut self,
        wires: &mut Pool<Wire>,
        w: WireId,
        buckets: &BucketGeom,
        cfg: &PlacementConfig,
        stats: &mut PlacementStats,
    ) -> Placement {
        wires[w].track = None;
        wires[w].next = None;
        if wires[w].is_replica() {
            let bucket = self.insert(wires, w, buckets);
            return Placement {
                bucket: Some(bucket),
                changed: Vec::new(),
            };
        }
        let g = wires[w].geom();
        let mut hits: Vec<WireId> = self
            .iter(wires)
            .filter(|(_, e)| {
                let ge = e.geom();
                !e.is_replica() && ge.span_overlaps(&g) && ge.band_touches(&g)
            })
            .map(|(id, _)| id)
            .collect();
        hits.sort_by_key(|id| wires[*id].xy);

        let mut changed: Vec<WireId> = Vec::new();
        // Holder of the new wire's extent: `w`, or the wire it merged into
        let mut cur = Some(w);
        for e in hits {
            let c = match cur {
                Some(c) => c,
                None => break,
            };
            if e == c || wires[e].track != Some(self.id) {
                continue;
            }
            let (gc, ge) = (wires[c].geom(), wires[e].geom());
            if !gc.span_overlaps(&ge) {
                continue;
            }
            let (a, b) = match ge.xy <= gc.xy {
                true => (e, c),
                false => (c, e),
            };
            let (ga, gb) = (wires[a].geom(), wires[b].geom());
            let res = self.resolve(wires, a, b, cfg, stats);
            for (x, gx) in [(a, ga), (b, gb)] {
                if x != w && wires[x].geom() != gx {
                    changed.push(x);
                }
            }
            if let Resolution::Gone { gone, into } = res {
                if gone != w {
                    self.unlink(wires, gone);
                    changed.push(gone);
                }
                if gone == c {
                    let before = if into == a { ga } else { gb };
                    cur = match wires[into].geom() != before {
                        true => Some(into),
                        false => None,
                    };
                }
            }
        }

        // Trimmed wires may now start in a later bucket
        let mut seen = Vec::with_capacity(changed.len());
        for x in changed {
            if seen.contains(&x) {
                continue;
            }
            if wires[x].track == Some(self.id) {
                self.unlink(wires, x);
                self.insert(wires, x, buckets);
            }
            seen.push(x);
        }
        let bucket = match cur == Some(w) {
            true => Some(self.insert(wires, w, buckets)),
            false => None,
        };
        Placement {
            bucket,
            changed: seen,
        }
    }

    /// Resolve the overlap of representatives `a` and `b`, where `a` starts no later than `b`.
    /// Adjusts geometry only; linking is left to the caller.
    fn resolve(
        &self,
        wires: &mut Pool<Wire>,
        a: WireId,
        b: WireId,
        cfg: &PlacementConfig,
        stats: &mut PlacementStats,
    ) -> Resolution {
        let (ga, gb) = (wires[a].geom(), wires[b].geom());
        let (pa, pb) = (wires[a].is_power(), wires[b].is_power());
        let policy = cfg.overlap_adjust;

        if !ga.same_band(&gb) {
            // Bands touch or partly overlap
            if !policy.adjusts() {
                stats.incr_not_aligned(pa, pb);
                return Resolution::Kept;
            }
            if !cfg.overlap_touch_check {
                return Resolution::Kept;
            }
            stats.trimmed += 1;
            let (cut, other) = match ga.base < gb.base {
                true => {
                    wires[b].set_xy(ga.end(), (gb.end() - ga.end()).max(0));
                    (b, a)
                }
                false => {
                    wires[a].len = (gb.xy - ga.xy).max(0);
                    (a, b)
                }
            };
            return match wires[cut].len > 0 {
                true => Resolution::Trimmed,
                false => Resolution::Gone {
                    gone: cut,
                    into: other,
                },
            };
        }
        match policy {
            OverlapAdjust::Merge => {
                if gb.end() <= ga.end() {
                    stats.absorbed += 1;
                    debug!("Wire #{} absorbed by #{}", wires[b].id, wires[a].id);
                } else {
                    wires[a].len = gb.end() - ga.xy;
                    stats.merged += 1;
                    debug!("Wire #{} merged into #{}", wires[b].id, wires[a].id);
                }
                Resolution::Gone { gone: b, into: a }
            }
            OverlapAdjust::EndAdjust => {
                if gb.end() <= ga.end() {
                    stats.absorbed += 1;
                    debug!("Wire #{} absorbed by #{}", wires[b].id, wires[a].id);
                    return Resolution::Gone { gone: b, into: a };
                }
                wires[b].set_xy(ga.end(), gb.end() - ga.end());
                stats.trimmed += 1;
                Resolution::Trimmed
            }
            OverlapAdjust::NoAdjust | OverlapAdjust::Reject => {
                stats.incr_overlap(pa, pb);
                warn!(
                    "Overlap on track #{} (base {}): box {} [{}, {}) and box {} [{}, {})",
                    self.num,
                    self.base,
                    wires[a].box_id,
                    ga.xy,
                    ga.end(),
                    wires[b].box_id,
                    gb.xy,
                    gb.end()
                );
                Resolution::Kept
            }
        }
    }

    /// Sorted insert of `w` into its start bucket, with no overlap resolution.
    /// Returns the bucket index.
    pub fn insert(&mut self, wires: &mut Pool<Wire>, w: WireId, buckets: &BucketGeom) -> usize {
        let xy = wires[w].xy;
        let m = buckets.bucket_num(xy).min(self.markers.len() - 1);
        let mut prev: Option<WireId> = None;
        let mut cur = self.markers[m];
        while let Some(e) = cur {
            if xy < wires[e].xy {
                break;
            }
            prev = Some(e);
            cur = wires[e].next;
        }
        {
            let wire = &mut wires[w];
            wire.track = Some(self.id);
            wire.next = cur;
        }
        match prev {
            Some(p) => wires[p].next = Some(w),
            None => self.markers[m] = Some(w),
        }
        self.ordered = false;
        m
    }

    /// Sorted insert which refuses any along-track overlap.
    /// Returns `false`, and changes nothing, if `w` would overlap a linked wire.
    pub fn check_and_place(&mut self, wires: &mut Pool<Wire>, w: WireId, buckets: &BucketGeom) -> bool {
        let (xy, end) = (wires[w].xy, wires[w].end());
        if !self.is_free(wires, xy, end) {
            return false;
        }
        self.insert(wires, w, buckets);
        true
    }
    /// First linked wire conflicting with `geom`
    pub fn conflicts(&self, wires: &Pool<Wire>, geom: &WireGeom, touch_check: bool) -> Option<WireId> {
        self.iter(wires)
            .find(|(_, w)| w.geom().conflicts(geom, touch_check))
            .map(|(id, _)| id)
    }
    /// Every linked wire whose span and band both overlap `geom`
    pub fn overlaps(&self, wires: &Pool<Wire>, geom: &WireGeom) -> Vec<WireId> {
        self.iter(wires)
            .filter(|(_, w)| {
                let g = w.geom();
                g.span_overlaps(geom) && g.band_overlaps(geom)
            })
            .map(|(id, _)| id)
            .collect()
    }
    /// Boolean indication of whether no linked wire overlaps `xy`..`end` along the track
    pub fn is_free(&self, wires: &Pool<Wire>, xy: Int, end: Int) -> bool {
        !self.iter(wires).any(|(_, w)| w.xy < end && xy < w.end())
    }

    ///
    /// Rebuild the extrusion markers: for each bucket, the first wire
    /// (scanning buckets in order) which starts earlier and ends inside or past it.
    /// Returns the number of buckets given an entry.
    ///
    pub fn set_extrusion_marker(&mut self, wires: &Pool<Wire>, buckets: &BucketGeom) -> usize {
        let cnt = self.markers.len();
        let mut ext: Vec<Option<Extrusion>> = vec![None; cnt];
        let mut set = 0;
        for k in 0..cnt {
            for (id, w) in self.bucket(wires, k) {
                let tail = buckets.bucket_num(w.end()).min(cnt - 1);
                for slot in ext.iter_mut().take(tail + 1).skip(k + 1) {
                    if slot.is_none() {
                        *slot = Some(Extrusion { bucket: k, wire: id });
                        set += 1;
                    }
                }
            }
        }
        self.ext = ext;
        self.ordered = true;
        set
    }

    ///
    /// Search for wires overlapping `win`, pushing their ids onto `out`.
    /// Returns the number found.
    ///
    /// Unordered tracks scan from their first bucket.
    ///
    pub fn search(&self, wires: &Pool<Wire>, win: &Window, out: &mut Vec<WireId>) -> usize {
        let last = self.markers.len() - 1;
        let (m1, m2) = (win.m1.min(last), win.m2.min(last));
        let (first_bucket, first_wire) = match (self.ordered, self.extrusion(m1)) {
            (true, Some(x)) => (x.bucket, Some(x.wire)),
            (true, None) => (m1, self.marker(m1)),
            (false, _) => (0, self.marker(0)),
        };
        let mut cnt = 0;
        let mut scan = |start: Option<WireId>, out: &mut Vec<WireId>| {
            for (id, w) in ListIter::new(wires, start) {
                if win.hi <= w.xy {
                    break;
                }
                if w.end() >= win.lo && w.base < win.phi && w.base + w.width >= win.plo {
                    out.push(id);
                    cnt += 1;
                }
            }
        };
        scan(first_wire, out);
        for k in (first_bucket + 1)..=m2 {
            scan(self.marker(k), out);
        }
        cnt
    }

    ///
    /// Trim the last representative of each bucket back to the start of the
    /// same-band representative heading the next non-empty bucket.
    /// Returns the trimmed wires.
    ///
    pub fn adjust_overlap_marker_end(&mut self, wires: &mut Pool<Wire>) -> Vec<WireId> {
        let cnt = self.markers.len();
        let mut trimmed = Vec::new();
        let mut k = 0;
        while k + 1 < cnt {
            let last = match self.bucket(wires, k).filter(|(_, w)| !w.is_replica()).last() {
                Some((id, _)) => id,
                None => {
                    k += 1;
                    continue;
                }
            };
            let next = (k + 1..cnt).find_map(|j| {
                self.bucket(wires, j)
                    .find(|(_, w)| !w.is_replica())
                    .map(|(id, _)| (j, id))
            });
            let (j, head) = match next {
                Some(x) => x,
                None => break,
            };
            let (gl, gh) = (wires[last].geom(), wires[head].geom());
            if gl.same_band(&gh) && gl.end() > gh.xy {
                wires[last].len = (gh.xy - gl.xy).max(0);
                trimmed.push(last);
            }
            k = j;
        }
        self.ordered = false;
        trimmed
    }
    /// Check every bucket is xy-ascending. Returns the check and the number of wires visited.
    pub fn is_ascending_ordered(&self, wires: &Pool<Wire>) -> (bool, usize) {
        let mut cnt = 0;
        for k in 0..self.markers.len() {
            let mut prev: Option<Int> = None;
            for (_, w) in self.bucket(wires, k) {
                cnt += 1;
                if let Some(p) = prev {
                    if w.xy < p {
                        return (false, cnt);
                    }
                }
                prev = Some(w.xy);
            }
        }
        (true, cnt)
    }

    /// Remove `w` from whichever bucket list holds it.
    /// Returns `false` if it is not linked here.
    pub fn unlink(&mut self, wires: &mut Pool<Wire>, w: WireId) -> bool {
        for k in 0..self.markers.len() {
            let mut prev: Option<WireId> = None;
            let mut cur = self.markers[k];
            while let Some(e) = cur {
                if e == w {
                    let rest = wires[e].next.take();
                    match prev {
                        Some(p) => wires[p].next = rest,
                        None => self.markers[k] = rest,
                    }
                    wires[e].track = None;
                    self.ordered = false;
                    return true;
                }
                prev = Some(e);
                cur = wires[e].next;
            }
        }
        false
    }

    /// Unlink every wire for which `pred` holds. Returns the unlinked ids.
    /// The wires stay allocated.
    pub fn remove_wires(&mut self, wires: &mut Pool<Wire>, mut pred: impl FnMut(&Wire) -> bool) -> Vec<WireId> {
        let doomed: Vec<WireId> = self
            .iter(wires)
            .filter(|(_, w)| pred(*w))
            .map(|(id, _)| id)
            .collect();
        for id in doomed.iter() {
            self.unlink(wires, *id);
        }
        doomed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Dir, OverlapAdjust};

    struct Lane {
        wires: Pool<Wire>,
        tracks: Pool<Track>,
        track: TrackId,
        buckets: BucketGeom,
        cfg: PlacementConfig,
        stats: PlacementStats,
    }
    impl Lane {
        fn new(policy: OverlapAdjust) -> Self {
            let mut tracks = Pool::new(4);
            let track = tracks.allocate_with(|h| Track::new(h, 0, 0, 5, 4));
            let cfg = PlacementConfig {
                overlap_adjust: policy,
                ..Default::default()
            };
            Self {
                wires: Pool::new(16),
                tracks,
                track,
                buckets: BucketGeom::new(0, 100, 4),
                cfg,
                stats: PlacementStats::default(),
            }
        }
        fn add(&mut self, xy: Int, len: Int, base: Int, box_id: u32) -> WireId {
            let geom = WireGeom {
                xy,
                len,
                base,
                width: 5,
            };
            let id = self
                .wires
                .allocate_with(|h| Wire::new(h.index(), Dir::Horiz, geom, box_id, 0, 0));
            let t = &mut self.tracks[self.track];
            t.place(&mut self.wires, id, &self.buckets, &self.cfg, &mut self.stats);
            id
        }
        fn span(&self, id: WireId) -> (Int, Int) {
            (self.wires[id].xy, self.wires[id].len)
        }
        fn linked(&self) -> Vec<u32> {
            let t = &self.tracks[self.track];
            t.iter(&self.wires).map(|(_, w)| w.box_id).collect()
        }
        fn find(&mut self, lo: Int, hi: Int) -> Vec<u32> {
            let t = &mut self.tracks[self.track];
            t.set_extrusion_marker(&self.wires, &self.buckets);
            let win = Window {
                lo,
                hi,
                plo: 0,
                phi: 5,
                m1: self.buckets.bucket_num(lo),
                m2: self.buckets.bucket_num(hi),
            };
            let mut out = Vec::new();
            t.search(&self.wires, &win, &mut out);
            out.iter().map(|id| self.wires[*id].box_id).collect()
        }
    }

    #[test]
    fn buckets() {
        let b = BucketGeom::new(0, 100, 3);
        assert_eq!(b.len, 34);
        assert_eq!(b.bucket_num(-5), 0);
        assert_eq!(b.bucket_num(33), 0);
        assert_eq!(b.bucket_num(34), 1);
        assert_eq!(b.bucket_num(1000), 2);
        assert_eq!(BucketGeom::new(0, 2, 8).len, 1);
    }
    #[test]
    fn sorted_insert() {
        let mut lane = Lane::new(OverlapAdjust::NoAdjust);
        lane.add(30, 5, 0, 3);
        lane.add(0, 5, 0, 1);
        lane.add(10, 5, 0, 2);
        lane.add(60, 5, 0, 5);
        lane.add(40, 5, 0, 4);
        assert_eq!(lane.linked(), vec![1, 2, 3, 4, 5]);
        let t = &lane.tracks[lane.track];
        assert_eq!(t.is_ascending_ordered(&lane.wires), (true, 5));
        assert_eq!(lane.stats.total_overlaps(), 0);
    }
    #[test]
    fn end_adjust() {
        let mut lane = Lane::new(OverlapAdjust::EndAdjust);
        let a = lane.add(0, 10, 0, 1);
        let b = lane.add(5, 10, 0, 2);
        assert_eq!(lane.span(a), (0, 10));
        assert_eq!(lane.span(b), (10, 5));
        assert_eq!(lane.stats.trimmed, 1);
    }
    #[test]
    fn end_adjust_across_buckets() {
        let mut lane = Lane::new(OverlapAdjust::EndAdjust);
        let a = lane.add(20, 10, 0, 1);
        let b = lane.add(25, 10, 0, 2);
        assert_eq!(lane.span(a), (20, 10));
        assert_eq!(lane.span(b), (30, 5));
        assert_eq!(lane.linked(), vec![1, 2]);
    }
    #[test]
    fn merge() {
        let mut lane = Lane::new(OverlapAdjust::Merge);
        let a = lane.add(0, 10, 0, 1);
        let b = lane.add(5, 10, 0, 2);
        assert_eq!(lane.span(a), (0, 15));
        assert_eq!(lane.linked(), vec![1]);
        assert_eq!(lane.stats.merged, 1);
        assert_eq!(lane.wires[b].track, None);
        // Inside an existing wire: absorbed
        let c = lane.add(2, 3, 0, 3);
        assert_eq!(lane.linked(), vec![1]);
        assert_eq!(lane.stats.absorbed, 1);
        assert_eq!(lane.wires[c].track, None);
        // Same start, running further: the existing wire grows
        lane.add(0, 20, 0, 4);
        assert_eq!(lane.linked(), vec![1]);
        assert_eq!(lane.span(a), (0, 20));
        // Starting earlier: the new wire takes over both
        let e = lane.add(-5, 10, 0, 5);
        assert_eq!(lane.linked(), vec![5]);
        assert_eq!(lane.span(e), (-5, 25));
        assert_eq!(lane.wires[a].track, None);
        assert_eq!(lane.stats.merged, 3);
    }
    #[test]
    fn merge_chains_across_buckets() {
        let mut lane = Lane::new(OverlapAdjust::Merge);
        let a = lane.add(10, 10, 0, 1);
        lane.add(30, 10, 0, 2);
        lane.add(60, 10, 0, 3);
        // Bridges the first two, into the first
        let d = lane.add(15, 20, 0, 4);
        assert_eq!(lane.linked(), vec![1, 3]);
        assert_eq!(lane.wires[d].track, None);
        assert_eq!(lane.span(a), (10, 30));
        assert_eq!(lane.find(35, 36), vec![1]);
    }
    #[test]
    fn end_adjust_moves_trimmed_wire() {
        let mut lane = Lane::new(OverlapAdjust::EndAdjust);
        let a = lane.add(20, 10, 0, 1);
        // Starts earlier and runs into `a`: `a` now starts in bucket 1
        let b = lane.add(10, 15, 0, 2);
        assert_eq!(lane.span(b), (10, 15));
        assert_eq!(lane.span(a), (25, 5));
        assert_eq!(lane.tracks[lane.track].marker(1), Some(a));
        assert_eq!(lane.linked(), vec![2, 1]);
        // Overlaps both; trimmed past each in turn
        let c = lane.add(22, 10, 0, 3);
        assert_eq!(lane.span(c), (30, 2));
        assert_eq!(lane.linked(), vec![2, 1, 3]);
        let t = &lane.tracks[lane.track];
        assert_eq!(t.is_ascending_ordered(&lane.wires), (true, 3));
        let spans: Vec<(Int, Int)> = t.iter(&lane.wires).map(|(_, w)| (w.xy, w.end())).collect();
        assert!(spans.iter().all(|(lo, hi)| lo <= hi));
        assert!(spans.windows(2).all(|p| p[0].1 <= p[1].0));
        assert_eq!(lane.find(26, 27), vec![1]);
        assert_eq!(lane.find(31, 32), vec![3]);
    }
    #[test]
    fn end_adjust_absorbs_covered() {
        let mut lane = Lane::new(OverlapAdjust::EndAdjust);
        let a = lane.add(30, 5, 0, 1);
        let b = lane.add(28, 20, 0, 2);
        assert_eq!(lane.linked(), vec![2]);
        assert_eq!(lane.wires[a].track, None);
        assert_eq!(lane.span(b), (28, 20));
        let c = lane.add(40, 3, 0, 3);
        assert_eq!(lane.wires[c].track, None);
        assert_eq!(lane.stats.absorbed, 2);
    }
    #[test]
    fn touching_trim_never_negative() {
        let mut lane = Lane::new(OverlapAdjust::EndAdjust);
        // Same start, the existing wire in the higher band: cut to nothing
        let a = lane.add(10, 10, 5, 1);
        let b = lane.add(10, 10, 0, 2);
        assert_eq!(lane.wires[a].len, 0);
        assert_eq!(lane.wires[a].track, None);
        assert_eq!(lane.span(b), (10, 10));
        assert_eq!(lane.linked(), vec![2]);
    }
    #[test]
    fn replicas_are_left_alone() {
        let mut lane = Lane::new(OverlapAdjust::EndAdjust);
        let a = lane.add(0, 10, 0, 1);
        let copy = lane.wires[a].clone();
        let r = lane.wires.allocate_with(|h| {
            let mut w = copy.replica(h.index(), a);
            w.set_xy(5, 10);
            w
        });
        let t = &mut lane.tracks[lane.track];
        let placed = t.place(&mut lane.wires, r, &lane.buckets, &lane.cfg, &mut lane.stats);
        assert_eq!(placed.bucket, Some(0));
        assert_eq!(lane.span(r), (5, 10));
        // Trimmed against the representative only
        let b = lane.add(8, 10, 0, 2);
        assert_eq!(lane.span(b), (10, 8));
        assert_eq!(lane.span(r), (5, 10));
        assert_eq!(lane.stats.trimmed, 1);
        assert_eq!(lane.find(6, 7), vec![1, 1]);
    }
    #[test]
    fn no_adjust_counts() {
        let mut lane = Lane::new(OverlapAdjust::NoAdjust);
        let a = lane.add(0, 10, 0, 1);
        let b = lane.add(5, 10, 0, 2);
        assert_eq!(lane.span(a), (0, 10));
        assert_eq!(lane.span(b), (5, 10));
        assert_eq!(lane.stats.signal_overlap, 1);
        assert_eq!(lane.linked(), vec![1, 2]);
    }
    #[test]
    fn touching_bands_trim() {
        let mut lane = Lane::new(OverlapAdjust::EndAdjust);
        let a = lane.add(0, 10, 0, 1);
        let b = lane.add(5, 10, 5, 2);
        assert_eq!(lane.span(a), (0, 10));
        assert_eq!(lane.span(b), (10, 5));
        assert_eq!(lane.stats.trimmed, 1);
    }
    #[test]
    fn extrusion_search() {
        let mut lane = Lane::new(OverlapAdjust::NoAdjust);
        // Starts in bucket 0, runs through bucket 2
        lane.add(5, 60, 0, 1);
        lane.add(55, 5, 0, 2);
        lane.add(80, 5, 0, 3);
        assert_eq!(lane.find(52, 58), vec![1, 2]);
        assert_eq!(lane.find(70, 79), Vec::<u32>::new());
        assert_eq!(lane.find(0, 100), vec![1, 2, 3]);
        let t = &lane.tracks[lane.track];
        assert_eq!(t.extrusion(2).map(|x| x.bucket), Some(0));
        assert_eq!(t.extrusion(3), None);
    }
    #[test]
    fn check_and_place_refuses_overlap() {
        let mut lane = Lane::new(OverlapAdjust::NoAdjust);
        lane.add(0, 10, 0, 1);
        let geom = WireGeom {
            xy: 8,
            len: 4,
            base: 0,
            width: 5,
        };
        let w = lane
            .wires
            .allocate_with(|h| Wire::new(h.index(), Dir::Horiz, geom, 2, 0, 0));
        let t = &mut lane.tracks[lane.track];
        assert!(!t.check_and_place(&mut lane.wires, w, &lane.buckets));
        lane.wires[w].xy = 10;
        let t = &mut lane.tracks[lane.track];
        assert!(t.check_and_place(&mut lane.wires, w, &lane.buckets));
        assert_eq!(lane.linked(), vec![1, 2]);
    }
    #[test]
    fn overlapping_wires() {
        let mut lane = Lane::new(OverlapAdjust::NoAdjust);
        lane.add(0, 10, 0, 1);
        lane.add(20, 10, 0, 2);
        let c = lane.add(25, 10, 3, 3);
        let query = WireGeom {
            xy: 5,
            len: 20,
            base: 1,
            width: 5,
        };
        let t = &lane.tracks[lane.track];
        assert_eq!(t.overlaps(&lane.wires, &query).len(), 2);
        let above = WireGeom {
            len: 30,
            base: 7,
            ..query
        };
        assert_eq!(t.overlaps(&lane.wires, &above), vec![c]);
    }
    #[test]
    fn unlink_and_remove() {
        let mut lane = Lane::new(OverlapAdjust::NoAdjust);
        let a = lane.add(0, 5, 0, 1);
        lane.add(10, 5, 0, 2);
        lane.add(30, 5, 0, 3);
        let t = &mut lane.tracks[lane.track];
        assert!(t.unlink(&mut lane.wires, a));
        assert!(!t.unlink(&mut lane.wires, a));
        let gone = t.remove_wires(&mut lane.wires, |w| w.box_id == 3);
        assert_eq!(gone.len(), 1);
        assert_eq!(lane.linked(), vec![2]);
    }
    #[test]
    fn marker_end_adjust() {
        let mut lane = Lane::new(OverlapAdjust::NoAdjust);
        let a = lane.add(10, 30, 0, 1);
        lane.add(30, 5, 0, 2);
        let t = &mut lane.tracks[lane.track];
        assert_eq!(t.adjust_overlap_marker_end(&mut lane.wires), vec![a]);
        assert_eq!(lane.span(a), (10, 20));
    }
}
