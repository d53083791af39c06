//
// Copyright (c) Pirmin Kalberer. All rights reserved.
// Licensed under the MIT License. See LICENSE file in the project root for full license information.
//

//! Coverage index of map sheet bounds
//!
//! Adaptive quad-tree over bounding boxes. A record is filed at the deepest
//! node whose quadrant holds it completely, so records spanning a split line
//! stay at the node owning the split. The root grows by doubling whenever a
//! record lies outside of it.

use crate::core::error::IndexError;
use crate::core::maprecord::MapRecord;
use std::fmt::Write;
use std::sync::Arc;
use utm_grid::Extent;

/// Relative tolerance of a dumped split point against the box midpoint
const SPLIT_TOLERANCE: f64 = 1e-9;

#[derive(PartialEq, Eq, Clone, Copy, Debug)]
pub enum Quadrant {
    Sw,
    Se,
    Nw,
    Ne,
}

impl Quadrant {
    /// Traversal and dump order
    pub const ALL: [Quadrant; 4] = [Quadrant::Sw, Quadrant::Se, Quadrant::Nw, Quadrant::Ne];

    pub fn name(&self) -> &'static str {
        match self {
            Quadrant::Sw => "SW",
            Quadrant::Se => "SE",
            Quadrant::Nw => "NW",
            Quadrant::Ne => "NE",
        }
    }
}

#[derive(Debug)]
pub struct QuadNode {
    extent: Extent,
    xsep: f64,
    ysep: f64,
    sw: Option<Box<QuadNode>>,
    se: Option<Box<QuadNode>>,
    nw: Option<Box<QuadNode>>,
    ne: Option<Box<QuadNode>>,
    maps: Vec<Arc<MapRecord>>,
}

impl QuadNode {
    fn new(extent: Extent) -> QuadNode {
        let (xsep, ysep) = extent.center();
        QuadNode::with_split(extent, xsep, ysep)
    }
    fn with_split(extent: Extent, xsep: f64, ysep: f64) -> QuadNode {
        QuadNode {
            extent,
            xsep,
            ysep,
            sw: None,
            se: None,
            nw: None,
            ne: None,
            maps: Vec::new(),
        }
    }
    pub fn extent(&self) -> &Extent {
        &self.extent
    }
    /// Split point (x, y)
    pub fn split(&self) -> (f64, f64) {
        (self.xsep, self.ysep)
    }
    /// Records filed at this node
    pub fn maps(&self) -> &[Arc<MapRecord>] {
        &self.maps
    }
    pub fn child(&self, quadrant: Quadrant) -> Option<&QuadNode> {
        let child = match quadrant {
            Quadrant::Sw => &self.sw,
            Quadrant::Se => &self.se,
            Quadrant::Nw => &self.nw,
            Quadrant::Ne => &self.ne,
        };
        child.as_deref()
    }
    /// Existing children in sw, se, nw, ne order
    pub fn children(&self) -> impl Iterator<Item = (Quadrant, &QuadNode)> + '_ {
        Quadrant::ALL
            .iter()
            .filter_map(move |q| self.child(*q).map(|node| (*q, node)))
    }
    fn child_slot(&mut self, quadrant: Quadrant) -> &mut Option<Box<QuadNode>> {
        match quadrant {
            Quadrant::Sw => &mut self.sw,
            Quadrant::Se => &mut self.se,
            Quadrant::Nw => &mut self.nw,
            Quadrant::Ne => &mut self.ne,
        }
    }
    /// Box of a quadrant of this node
    pub fn quadrant_extent(&self, quadrant: Quadrant) -> Extent {
        let e = &self.extent;
        match quadrant {
            Quadrant::Sw => Extent::new(e.minx, e.miny, self.xsep, self.ysep),
            Quadrant::Se => Extent::new(self.xsep, e.miny, e.maxx, self.ysep),
            Quadrant::Nw => Extent::new(e.minx, self.ysep, self.xsep, e.maxy),
            Quadrant::Ne => Extent::new(self.xsep, self.ysep, e.maxx, e.maxy),
        }
    }

    /// Quadrant holding `extent` completely, sw before nw before se before ne.
    fn placement(&self, extent: &Extent) -> Option<Quadrant> {
        let w = extent.maxx <= self.xsep;
        let e = extent.minx >= self.xsep;
        let s = extent.maxy <= self.ysep;
        let n = extent.miny >= self.ysep;
        if s && w {
            Some(Quadrant::Sw)
        } else if n && w {
            Some(Quadrant::Nw)
        } else if s && e {
            Some(Quadrant::Se)
        } else if n && e {
            Some(Quadrant::Ne)
        } else {
            None
        }
    }

    /// File `record` at this node or below. Returns false if the record is
    /// not inside this node.
    fn add(&mut self, record: &Arc<MapRecord>) -> bool {
        if !self.extent.contains(&record.extent) {
            return false;
        }
        let placed = match self.placement(&record.extent) {
            Some(quadrant) => {
                let extent = self.quadrant_extent(quadrant);
                // no further subdivision at floating point resolution
                if extent == self.extent {
                    false
                } else {
                    self.child_slot(quadrant)
                        .get_or_insert_with(|| Box::new(QuadNode::new(extent)))
                        .add(record)
                }
            }
            None => false,
        };
        if !placed {
            self.maps.push(record.clone());
        }
        true
    }

    fn collect(&self, x: f64, y: f64, result: &mut Vec<Arc<MapRecord>>) {
        if !self.extent.contains_point(x, y) {
            return;
        }
        result.extend(self.maps.iter().filter(|m| m.covers(x, y)).cloned());
        // points on a split line descend into every adjacent child
        let east = x >= self.xsep;
        let west = x <= self.xsep;
        let north = y >= self.ysep;
        let south = y <= self.ysep;
        for (quadrant, hit) in &[
            (Quadrant::Ne, east && north),
            (Quadrant::Se, east && south),
            (Quadrant::Nw, west && north),
            (Quadrant::Sw, west && south),
        ] {
            if *hit {
                if let Some(child) = self.child(*quadrant) {
                    child.collect(x, y, result);
                }
            }
        }
    }

    fn write_debug(&self, out: &mut String, level: usize) {
        let tab = " ".repeat(3 * level);
        let tab2 = " ".repeat(3 * (level + 1));
        let tab3 = " ".repeat(3 * (level + 2));
        let e = &self.extent;
        let _ = writeln!(out, "{}{{", tab);
        let _ = writeln!(out, "{}WE={}/{}", tab2, e.minx, e.maxx);
        let _ = writeln!(out, "{}SN={}/{}", tab2, e.miny, e.maxy);
        let _ = writeln!(out, "{}maps:", tab2);
        for map in &self.maps {
            let m = &map.extent;
            let _ = writeln!(out, "{}WE={}/{}", tab3, m.minx, m.maxx);
            let _ = writeln!(out, "{}SN={}/{}", tab3, m.miny, m.maxy);
            let _ = writeln!(out, "{}{} - {}", tab3, map.scale, map.title);
        }
        for (quadrant, child) in self.children() {
            let _ = writeln!(out, "{}{}:", tab2, quadrant.name());
            child.write_debug(out, level + 1);
        }
        let _ = writeln!(out, "{}}}", tab);
    }

    fn to_dump(&self) -> QuadNodeCfg {
        let dump_child = |quadrant| self.child(quadrant).map(|c| Box::new(c.to_dump()));
        QuadNodeCfg {
            w: self.extent.minx,
            e: self.extent.maxx,
            s: self.extent.miny,
            n: self.extent.maxy,
            x: self.xsep,
            y: self.ysep,
            maps: self.maps.iter().map(|m| m.as_ref().clone()).collect(),
            sw: dump_child(Quadrant::Sw),
            se: dump_child(Quadrant::Se),
            nw: dump_child(Quadrant::Nw),
            ne: dump_child(Quadrant::Ne),
        }
    }

    /// Rebuild a node from its dump, checking the node invariants.
    /// Returns the node and the number of records below it.
    fn from_dump(dump: QuadNodeCfg) -> Result<(QuadNode, usize), IndexError> {
        let extent = Extent::new(dump.w, dump.s, dump.e, dump.n);
        if !extent.is_valid() {
            return Err(IndexError::InvalidDump(format!(
                "invalid node bounds {:?}",
                extent
            )));
        }
        let (cx, cy) = extent.center();
        let off_center = |sep: f64, center: f64, lo: f64, hi: f64, size: f64| {
            let tolerance = SPLIT_TOLERANCE * size.max(center.abs());
            !(sep > lo && sep < hi && (sep - center).abs() <= tolerance)
        };
        if off_center(dump.x, cx, extent.minx, extent.maxx, extent.width())
            || off_center(dump.y, cy, extent.miny, extent.maxy, extent.height())
        {
            return Err(IndexError::InvalidDump(format!(
                "split point ({}, {}) is not the midpoint of {:?}",
                dump.x, dump.y, extent
            )));
        }
        let mut node = QuadNode::with_split(extent, dump.x, dump.y);
        let mut len = 0;
        for map in dump.maps {
            if !node.extent.contains(&map.extent) {
                return Err(IndexError::InvalidDump(format!(
                    "map '{}' outside of node {:?}",
                    map.title, node.extent
                )));
            }
            node.maps.push(Arc::new(map));
            len += 1;
        }
        let children = vec![
            (Quadrant::Sw, dump.sw),
            (Quadrant::Se, dump.se),
            (Quadrant::Nw, dump.nw),
            (Quadrant::Ne, dump.ne),
        ];
        for (quadrant, child) in children {
            if let Some(child) = child {
                let (child, child_len) = QuadNode::from_dump(*child)?;
                if child.extent != node.quadrant_extent(quadrant) {
                    return Err(IndexError::InvalidDump(format!(
                        "{} child {:?} is not a quadrant of {:?}",
                        quadrant.name(),
                        child.extent,
                        node.extent
                    )));
                }
                *node.child_slot(quadrant) = Some(Box::new(child));
                len += child_len;
            }
        }
        Ok((node, len))
    }
}

/// Serialized node of an index dump
#[derive(Serialize, Deserialize, Clone, PartialEq, Debug)]
pub struct QuadNodeCfg {
    pub w: f64,
    pub e: f64,
    pub s: f64,
    pub n: f64,
    pub x: f64,
    pub y: f64,
    #[serde(default)]
    pub maps: Vec<MapRecord>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sw: Option<Box<QuadNodeCfg>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub se: Option<Box<QuadNodeCfg>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nw: Option<Box<QuadNodeCfg>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ne: Option<Box<QuadNodeCfg>>,
}

/// Spatial index answering which map sheets cover a point
#[derive(Default, Debug)]
pub struct CoverageIndex {
    root: Option<Box<QuadNode>>,
    len: usize,
}

impl CoverageIndex {
    pub fn new() -> CoverageIndex {
        CoverageIndex::default()
    }

    /// Add a record, growing the root until it contains the record's box.
    /// A failed insert leaves the index unchanged.
    pub fn insert(&mut self, record: Arc<MapRecord>) -> Result<(), IndexError> {
        let ext = &record.extent;
        if !ext.is_valid() {
            return Err(IndexError::InvalidRecord(format!(
                "'{}': invalid bounds {:?}",
                record.title, ext
            )));
        }
        let root_extent = match &self.root {
            Some(root) => root.extent.clone(),
            None => ext.clone(),
        };
        // Plan growth first, so that an overflow does not touch the tree
        let mut growth = Vec::new();
        let mut extent = root_extent;
        while !extent.contains(ext) {
            let left = ext.minx < extent.minx;
            let down = ext.miny < extent.miny;
            let grown = extent.doubled(left, down);
            if !grown.is_finite() {
                return Err(IndexError::GeometryOverflow {
                    minx: grown.minx,
                    miny: grown.miny,
                    maxx: grown.maxx,
                    maxy: grown.maxy,
                });
            }
            growth.push((left, down));
            extent = grown;
        }

        let mut root = self
            .root
            .take()
            .unwrap_or_else(|| Box::new(QuadNode::new(ext.clone())));
        for (left, down) in growth {
            root = grow(root, left, down);
        }
        let placed = root.add(&record);
        self.root = Some(root);
        if !placed {
            return Err(IndexError::PlacementFailed(record.title.clone()));
        }
        self.len += 1;
        Ok(())
    }

    /// All records whose box contains the point, in no particular order.
    pub fn query(&self, lon: f64, lat: f64) -> Result<Vec<Arc<MapRecord>>, IndexError> {
        if !(lon.is_finite() && lat.is_finite()) {
            return Err(IndexError::InvalidPoint { lon, lat });
        }
        let mut result = Vec::new();
        if let Some(root) = &self.root {
            root.collect(lon, lat, &mut result);
        }
        Ok(result)
    }

    /// Number of inserted records
    pub fn len(&self) -> usize {
        self.len
    }
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }
    /// Root box, `None` before the first insert
    pub fn extent(&self) -> Option<&Extent> {
        self.root.as_ref().map(|root| &root.extent)
    }
    pub fn root(&self) -> Option<&QuadNode> {
        self.root.as_deref()
    }
    /// Depth-first traversal yielding `(depth, node)`, root at depth 0
    pub fn nodes(&self) -> Nodes {
        Nodes {
            stack: self.root().map(|root| (0, root)).into_iter().collect(),
        }
    }
    pub fn node_count(&self) -> usize {
        self.nodes().count()
    }
    /// Number of levels, 0 for an empty index
    pub fn depth(&self) -> usize {
        self.nodes().map(|(depth, _)| depth + 1).max().unwrap_or(0)
    }

    /// Indented text rendering of the tree
    pub fn debug_dump(&self) -> String {
        let mut out = String::new();
        if let Some(root) = &self.root {
            root.write_debug(&mut out, 0);
        }
        out
    }

    /// Serializable copy of the tree, `None` for an empty index
    pub fn dump(&self) -> Option<QuadNodeCfg> {
        self.root.as_ref().map(|root| root.to_dump())
    }

    pub fn from_dump(dump: Option<QuadNodeCfg>) -> Result<CoverageIndex, IndexError> {
        match dump {
            Some(root) => {
                let (root, len) = QuadNode::from_dump(root)?;
                Ok(CoverageIndex {
                    root: Some(Box::new(root)),
                    len,
                })
            }
            None => Ok(CoverageIndex::new()),
        }
    }

    /// JSON index dump, `null` for an empty index
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(&self.dump())
    }

    pub fn from_json(json: &str) -> Result<CoverageIndex, IndexError> {
        let dump: Option<QuadNodeCfg> =
            serde_json::from_str(json).map_err(|e| IndexError::InvalidDump(e.to_string()))?;
        let index = CoverageIndex::from_dump(dump)?;
        info!(
            "Index loaded: {} maps in {} nodes",
            index.len(),
            index.node_count()
        );
        Ok(index)
    }
}

/// New root twice the size of `old`, with `old` as one of its quadrants.
fn grow(old: Box<QuadNode>, left: bool, down: bool) -> Box<QuadNode> {
    let extent = old.extent.doubled(left, down);
    // split exactly along the old root's edges
    let xsep = if left { old.extent.minx } else { old.extent.maxx };
    let ysep = if down { old.extent.miny } else { old.extent.maxy };
    debug!("Growing index root to {:?}", extent);
    let mut root = QuadNode::with_split(extent, xsep, ysep);
    let quadrant = match (left, down) {
        (true, true) => Quadrant::Ne,
        (true, false) => Quadrant::Se,
        (false, true) => Quadrant::Nw,
        (false, false) => Quadrant::Sw,
    };
    *root.child_slot(quadrant) = Some(old);
    Box::new(root)
}

pub struct Nodes<'a> {
    stack: Vec<(usize, &'a QuadNode)>,
}

impl<'a> Iterator for Nodes<'a> {
    type Item = (usize, &'a QuadNode);

    fn next(&mut self) -> Option<Self::Item> {
        let (depth, node) = self.stack.pop()?;
        for quadrant in Quadrant::ALL.iter().rev() {
            if let Some(child) = node.child(*quadrant) {
                self.stack.push((depth + 1, child));
            }
        }
        Some((depth, node))
    }
}
