//!
//! # Design Files
//!
//! A [Design] is a table geometry, a placement configuration, a list of net boxes
//! and a list of region queries, in any of the [SerializationFormat](crate::utils::SerializationFormat)s.
//! [Design::run] places every box and answers every query, producing a [Report].
//!

// Crates.io
use log::{info, warn};
use serde::{Deserialize, Serialize};

// Local imports
use crate::utils::{Array1D, ErrorContext, NameTable, SerdeFile};
use crate::{GridError, GridResult, GridTable, Int, PlacementConfig, PlacementStats, SearchBox, TableSpec, WireKind};

/// # Box Entry
///
/// One net shape. Its box id is its position in the design's box list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BoxSpec {
    pub x1: Int,
    pub y1: Int,
    pub x2: Int,
    pub y2: Int,
    /// Level, defaulting to the table's
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub level: Option<u32>,
    /// Net name
    pub net: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<WireKind>,
    /// Raw wire type. Takes precedence over `kind`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub flags: Option<u8>,
}
impl BoxSpec {
    /// Wire type: explicit flags, else our kind's code, else the configured default
    pub fn wire_type(&self, config: &PlacementConfig) -> u8 {
        self.flags
            .or_else(|| self.kind.map(|k| k.code()))
            .unwrap_or(config.default_wire_type)
    }
}

/// # Query Entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuerySpec {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    pub x1: Int,
    pub y1: Int,
    pub x2: Int,
    pub y2: Int,
    /// Report wire ids rather than box ids
    #[serde(default)]
    pub wire_ids: bool,
}

/// # Design
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Design {
    pub table: TableSpec,
    #[serde(default)]
    pub config: PlacementConfig,
    #[serde(default)]
    pub boxes: Vec<BoxSpec>,
    #[serde(default)]
    pub queries: Vec<QuerySpec>,
}
impl SerdeFile for Design {}

/// Answer to one [QuerySpec]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueryResult {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Box ids, or wire ids if requested
    pub ids: Vec<u32>,
    /// Distinct nets hit, in order of first hit
    pub nets: Vec<String>,
}

/// # Design Report
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Report {
    /// Live wires, not counting replicas
    pub wire_cnt: usize,
    pub net_cnt: usize,
    /// Whether every track ended up xy-ordered
    pub ordered: bool,
    /// Indices of boxes which could not be placed
    pub rejected: Vec<usize>,
    pub stats: PlacementStats,
    pub results: Vec<QueryResult>,
}
impl SerdeFile for Report {}

impl Design {
    /// Place every box, run every query
    pub fn run(&self) -> GridResult<Report> {
        let mut table = GridTable::new(self.table.clone(), self.config.clone())?;
        let mut nets = NameTable::new(self.boxes.len());
        let mut rejected = Vec::new();
        for (idx, b) in self.boxes.iter().enumerate() {
            let tag = nets.add(&b.net, idx as u32);
            let level = b.level.unwrap_or(self.table.level);
            let placed = table.add_box(
                b.x1,
                b.y1,
                b.x2,
                b.y2,
                level,
                idx as u32,
                tag,
                b.wire_type(&self.config),
            );
            match placed {
                Ok(_) => (),
                Err(e @ GridError::Place { .. })
                | Err(e @ GridError::LevelMismatch { .. })
                | Err(e @ GridError::OutOfExtent { .. }) => {
                    warn!("Box {} of net {} not placed: {}", idx, b.net, e);
                    rejected.push(idx);
                }
                Err(e) => {
                    let ctx = ErrorContext::Config(format!("box {} of net {}", idx, b.net));
                    return Err(e.context(ctx));
                }
            }
        }

        let mut results = Vec::with_capacity(self.queries.len());
        for q in self.queries.iter() {
            let sb = SearchBox::new(q.x1, q.y1, q.x2, q.y2, self.table.level);
            let ids: Vec<u32> = match q.wire_ids {
                true => table.search_wire_ids(&sb)?,
                false => {
                    let mut out = Array1D::new(16);
                    table.search(&sb, &mut out)?;
                    out.into()
                }
            };
            let mut hit_nets: Vec<String> = Vec::new();
            for id in ids.iter() {
                let tag = match q.wire_ids {
                    true => table.ids(*id)?.1,
                    false => match self.boxes.get(*id as usize).and_then(|b| nets.tag(&b.net)) {
                        Some(t) => t,
                        None => continue,
                    },
                };
                if let Some(name) = nets.name(tag) {
                    if !hit_nets.iter().any(|n| n == name) {
                        hit_nets.push(name.to_string());
                    }
                }
            }
            results.push(QueryResult {
                name: q.name.clone(),
                ids,
                nets: hit_nets,
            });
        }
        let report = Report {
            wire_cnt: table.wire_cnt(),
            net_cnt: nets.cnt(),
            ordered: table.is_ordered(),
            rejected,
            stats: *table.stats(),
            results,
        };
        info!(
            "Placed {} of {} boxes, answered {} queries",
            self.boxes.len() - report.rejected.len(),
            self.boxes.len(),
            report.results.len()
        );
        Ok(report)
    }
}
