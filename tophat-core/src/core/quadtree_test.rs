//
// Copyright (c) Pirmin Kalberer. All rights reserved.
// Licensed under the MIT License. See LICENSE file in the project root for full license information.
//

use crate::core::error::IndexError;
use crate::core::maprecord::{MapRecord, MapRecordCfg};
use crate::core::quadtree::{CoverageIndex, Quadrant};
use crate::core::stats::index_statistics;
use std::collections::HashSet;
use std::convert::TryFrom;
use std::sync::Arc;
use utm_grid::Extent;

fn record(title: &str, w: f64, s: f64, e: f64, n: f64) -> Arc<MapRecord> {
    let cfg = MapRecordCfg {
        w,
        e,
        s,
        n,
        scale: 24000,
        title: title.to_string(),
        mgrs_new: true,
        lon0: Some(-93.0),
        k0: Some(0.9996),
        feast: Some(500000.0),
        fnorth: Some(0.0),
        a: Some(6378137.0),
        f: Some(298.257223563),
        links: Vec::new(),
    };
    Arc::new(MapRecord::try_from(cfg).unwrap())
}

/// Deterministic pseudo random numbers in [0, 1)
struct Lcg(u64);

impl Lcg {
    fn next(&mut self) -> f64 {
        self.0 = self
            .0
            .wrapping_mul(6364136223846793005)
            .wrapping_add(1442695040888963407);
        (self.0 >> 11) as f64 / (1u64 << 53) as f64
    }
}

fn random_records(count: usize) -> Vec<Arc<MapRecord>> {
    let mut rnd = Lcg(42);
    (0..count)
        .map(|i| {
            let w = -125.0 + 60.0 * rnd.next();
            let s = 25.0 + 24.0 * rnd.next();
            let width = 0.125 * (1 + (rnd.next() * 16.0) as i32) as f64;
            let height = 0.125 * (1 + (rnd.next() * 8.0) as i32) as f64;
            record(&format!("sheet {}", i), w, s, w + width, s + height)
        })
        .collect()
}

fn titles(maps: &[Arc<MapRecord>]) -> Vec<String> {
    let mut titles: Vec<String> = maps.iter().map(|m| m.title.clone()).collect();
    titles.sort();
    titles
}

#[test]
fn test_empty() {
    let index = CoverageIndex::new();
    assert!(index.is_empty());
    assert_eq!(index.extent(), None);
    assert_eq!(index.node_count(), 0);
    assert_eq!(index.depth(), 0);
    assert!(index.query(-92.0, 46.0).unwrap().is_empty());
    assert_eq!(index.debug_dump(), "");
}

#[test]
fn test_first_insert() {
    let mut index = CoverageIndex::new();
    index.insert(record("Duluth", -93.0, 45.0, -91.0, 47.0)).unwrap();
    assert_eq!(index.len(), 1);
    assert_eq!(index.extent(), Some(&Extent::new(-93.0, 45.0, -91.0, 47.0)));
    assert_eq!(titles(&index.query(-92.0, 46.0).unwrap()), vec!["Duluth"]);
    // boundary included
    assert_eq!(index.query(-91.0, 47.0).unwrap().len(), 1);
    assert!(index.query(-90.99, 46.0).unwrap().is_empty());
}

#[test]
fn test_invalid_point() {
    let mut index = CoverageIndex::new();
    index.insert(record("Duluth", -93.0, 45.0, -91.0, 47.0)).unwrap();
    assert!(matches!(
        index.query(f64::NAN, 46.0),
        Err(IndexError::InvalidPoint { .. })
    ));
    assert!(matches!(
        index.query(-92.0, f64::INFINITY),
        Err(IndexError::InvalidPoint { .. })
    ));
}

#[test]
fn test_invalid_record() {
    let mut index = CoverageIndex::new();
    index.insert(record("Duluth", -93.0, 45.0, -91.0, 47.0)).unwrap();
    let mut broken = MapRecord::clone(&record("Broken", -93.0, 45.0, -91.0, 47.0));
    broken.extent = Extent::new(-91.0, 45.0, -93.0, 47.0);
    assert!(matches!(
        index.insert(Arc::new(broken)),
        Err(IndexError::InvalidRecord(_))
    ));
    assert_eq!(index.len(), 1);
}

#[test]
fn test_placement() {
    let mut index = CoverageIndex::new();
    // root 0..4 x 0..4, split at (2, 2)
    index.insert(record("root", 0.0, 0.0, 4.0, 4.0)).unwrap();
    index.insert(record("sw", 0.5, 0.5, 1.5, 1.5)).unwrap();
    index.insert(record("se", 2.5, 0.5, 3.5, 1.5)).unwrap();
    index.insert(record("ne", 2.5, 2.5, 3.5, 3.5)).unwrap();
    index.insert(record("nw", 0.0, 3.0, 1.0, 4.0)).unwrap();
    index.insert(record("spanning", 1.0, 1.0, 3.0, 2.0)).unwrap();
    // east edge on the split line counts as west
    index.insert(record("sw edge", 1.0, 0.5, 2.0, 1.5)).unwrap();

    let root = index.root().unwrap();
    assert_eq!(root.split(), (2.0, 2.0));
    assert_eq!(titles(root.maps()), vec!["root", "spanning"]);
    let sw = root.child(Quadrant::Sw).unwrap();
    assert_eq!(sw.extent(), &Extent::new(0.0, 0.0, 2.0, 2.0));
    assert_eq!(titles(sw.maps()), vec!["sw", "sw edge"]);
    assert_eq!(titles(root.child(Quadrant::Se).unwrap().maps()), vec!["se"]);
    assert_eq!(titles(root.child(Quadrant::Ne).unwrap().maps()), vec!["ne"]);
    // 0..1 x 3..4 lies in the NW quadrant of the NW quadrant
    let nw = root.child(Quadrant::Nw).unwrap();
    assert!(nw.maps().is_empty());
    assert_eq!(titles(nw.child(Quadrant::Nw).unwrap().maps()), vec!["nw"]);
    assert_eq!(index.depth(), 3);
    assert_eq!(index.node_count(), 6);

    let quadrants: Vec<Quadrant> = root.children().map(|(q, _)| q).collect();
    assert_eq!(
        quadrants,
        vec![Quadrant::Sw, Quadrant::Se, Quadrant::Nw, Quadrant::Ne]
    );
    let depths: Vec<usize> = index.nodes().map(|(depth, _)| depth).collect();
    assert_eq!(depths, vec![0, 1, 1, 1, 2, 1]);
}

#[test]
fn test_split_line_query() {
    let mut index = CoverageIndex::new();
    index.insert(record("root", 0.0, 0.0, 4.0, 4.0)).unwrap();
    index.insert(record("sw", 1.0, 1.0, 2.0, 2.0)).unwrap();
    index.insert(record("se", 2.0, 1.0, 3.0, 2.0)).unwrap();
    index.insert(record("ne", 2.0, 2.0, 3.0, 3.0)).unwrap();
    index.insert(record("nw", 1.0, 2.0, 2.0, 3.0)).unwrap();
    assert_eq!(
        titles(&index.query(2.0, 1.5).unwrap()),
        vec!["root", "se", "sw"]
    );
    assert_eq!(
        titles(&index.query(2.0, 2.0).unwrap()),
        vec!["ne", "nw", "root", "se", "sw"]
    );
    assert_eq!(titles(&index.query(2.5, 2.5).unwrap()), vec!["ne", "root"]);
}

#[test]
fn test_growth() {
    let mut index = CoverageIndex::new();
    index.insert(record("first", 0.0, 0.0, 1.0, 1.0)).unwrap();
    index.insert(record("far", 5.0, -3.0, 6.0, -2.0)).unwrap();
    let extent = index.extent().unwrap().clone();
    assert_eq!(extent, Extent::new(0.0, -3.0, 8.0, 5.0));
    assert!(extent.contains(&Extent::new(0.0, 0.0, 1.0, 1.0)));
    assert_eq!(titles(&index.query(0.5, 0.5).unwrap()), vec!["first"]);
    assert_eq!(titles(&index.query(5.5, -2.5).unwrap()), vec!["far"]);

    // growing west and south keeps the old root as NE quadrant
    let mut index = CoverageIndex::new();
    index.insert(record("first", 0.0, 0.0, 1.0, 1.0)).unwrap();
    index.insert(record("west", -0.9, -0.9, -0.5, -0.5)).unwrap();
    let root = index.root().unwrap();
    assert_eq!(root.extent(), &Extent::new(-1.0, -1.0, 1.0, 1.0));
    assert_eq!(root.split(), (0.0, 0.0));
    assert_eq!(
        root.child(Quadrant::Ne).unwrap().maps()[0].title,
        "first"
    );
    assert_eq!(titles(&index.query(0.5, 0.5).unwrap()), vec!["first"]);
    assert_eq!(titles(&index.query(-0.7, -0.7).unwrap()), vec!["west"]);
}

#[test]
fn test_overflow() {
    let mut index = CoverageIndex::new();
    index.insert(record("unit", 0.0, 0.0, 1.0, 1.0)).unwrap();
    let huge = record("huge", 1.7e308, 0.0, 1.79e308, 1.0);
    assert!(matches!(
        index.insert(huge),
        Err(IndexError::GeometryOverflow { .. })
    ));
    assert_eq!(index.len(), 1);
    assert_eq!(index.extent(), Some(&Extent::new(0.0, 0.0, 1.0, 1.0)));
    assert_eq!(index.node_count(), 1);
}

#[test]
fn test_against_linear_scan() {
    let records = random_records(500);
    let mut index = CoverageIndex::new();
    for record in &records {
        index.insert(record.clone()).unwrap();
    }
    assert_eq!(index.len(), 500);

    // every record is filed exactly once, inside its node
    let mut seen = HashSet::new();
    for (_, node) in index.nodes() {
        for map in node.maps() {
            assert!(node.extent().contains(&map.extent));
            assert!(seen.insert(map.title.clone()));
        }
        for (quadrant, child) in node.children() {
            assert_eq!(child.extent(), &node.quadrant_extent(quadrant));
        }
    }
    assert_eq!(seen.len(), 500);

    let mut rnd = Lcg(7);
    for _ in 0..1000 {
        let lon = -130.0 + 75.0 * rnd.next();
        let lat = 20.0 + 35.0 * rnd.next();
        let expected: Vec<Arc<MapRecord>> = records
            .iter()
            .filter(|r| r.covers(lon, lat))
            .cloned()
            .collect();
        assert_eq!(titles(&index.query(lon, lat).unwrap()), titles(&expected));
    }
    // corners hit the inclusive boundaries
    for record in records.iter().take(50) {
        let e = &record.extent;
        for &(lon, lat) in &[(e.minx, e.miny), (e.maxx, e.maxy), (e.minx, e.maxy)] {
            let found = index.query(lon, lat).unwrap();
            assert!(found.iter().any(|m| m.title == record.title));
        }
    }
}

#[test]
fn test_dump_roundtrip() {
    let mut index = CoverageIndex::new();
    for record in random_records(200) {
        index.insert(record).unwrap();
    }
    let json = index.to_json().unwrap();
    let reloaded = CoverageIndex::from_json(&json).unwrap();
    assert_eq!(reloaded.len(), index.len());
    assert_eq!(reloaded.node_count(), index.node_count());
    assert_eq!(reloaded.depth(), index.depth());
    assert_eq!(reloaded.extent(), index.extent());
    assert_eq!(reloaded.dump(), index.dump());

    let mut rnd = Lcg(3);
    for _ in 0..500 {
        let lon = -130.0 + 75.0 * rnd.next();
        let lat = 20.0 + 35.0 * rnd.next();
        assert_eq!(
            titles(&reloaded.query(lon, lat).unwrap()),
            titles(&index.query(lon, lat).unwrap())
        );
    }

    let empty = CoverageIndex::new();
    assert_eq!(empty.to_json().unwrap(), "null");
    assert!(CoverageIndex::from_json("null").unwrap().is_empty());
}

#[test]
fn test_invalid_dump() {
    let mut index = CoverageIndex::new();
    index.insert(record("root", 0.0, 0.0, 4.0, 4.0)).unwrap();
    index.insert(record("sw", 1.0, 1.0, 2.0, 2.0)).unwrap();

    let mut dump = index.dump().unwrap();
    dump.x = 3.0;
    assert!(matches!(
        CoverageIndex::from_dump(Some(dump)),
        Err(IndexError::InvalidDump(_))
    ));

    let mut dump = index.dump().unwrap();
    dump.ne = dump.sw.take();
    assert!(matches!(
        CoverageIndex::from_dump(Some(dump)),
        Err(IndexError::InvalidDump(_))
    ));

    let mut dump = index.dump().unwrap();
    let outside = MapRecord::clone(&record("outside", 5.0, 5.0, 6.0, 6.0));
    dump.maps.push(outside);
    assert!(matches!(
        CoverageIndex::from_dump(Some(dump)),
        Err(IndexError::InvalidDump(_))
    ));

    let json = index.to_json().unwrap().replace("\"lon0\":-93.0,", "");
    assert!(matches!(
        CoverageIndex::from_json(&json),
        Err(IndexError::InvalidDump(_))
    ));
    assert!(matches!(
        CoverageIndex::from_json("{\"w\":0"),
        Err(IndexError::InvalidDump(_))
    ));
}

#[test]
fn test_debug_dump() {
    let mut index = CoverageIndex::new();
    index.insert(record("root", 0.0, 0.0, 4.0, 4.0)).unwrap();
    index.insert(record("sw", 0.5, 0.5, 1.5, 1.5)).unwrap();
    let expected = "\
{
   WE=0/4
   SN=0/4
   maps:
      WE=0/4
      SN=0/4
      24000 - root
   SW:
   {
      WE=0/2
      SN=0/2
      maps:
         WE=0.5/1.5
         SN=0.5/1.5
         24000 - sw
   }
}
";
    assert_eq!(index.debug_dump(), expected);
}

#[test]
fn test_statistics() {
    let mut index = CoverageIndex::new();
    index.insert(record("root", 0.0, 0.0, 4.0, 4.0)).unwrap();
    index.insert(record("sw", 0.5, 0.5, 1.5, 1.5)).unwrap();
    index.insert(record("se", 2.5, 0.5, 3.5, 1.5)).unwrap();
    index.insert(record("ne", 2.5, 2.5, 3.5, 3.5)).unwrap();
    index.insert(record("nw", 0.0, 3.0, 1.0, 4.0)).unwrap();
    index.insert(record("spanning", 1.0, 1.0, 3.0, 2.0)).unwrap();
    index.insert(record("sw edge", 1.0, 0.5, 2.0, 1.5)).unwrap();

    let stats = index_statistics(&index);
    // root, sw, se, nw, nw/nw, ne
    let node_maps = stats.results("node.maps");
    assert_eq!(node_maps.len, 6);
    assert_eq!(node_maps.min, 0);
    assert_eq!(node_maps.max, 2);

    let root = stats.results("depth.00.maps");
    assert_eq!((root.len, root.max), (1, 2));
    let level1 = stats.results("depth.01.maps");
    assert_eq!(level1.len, 4);
    assert_eq!(level1.mean, 1.0);
    let level2 = stats.results("depth.02.maps");
    assert_eq!((level2.len, level2.max), (1, 1));
    assert_eq!(stats.results("depth.03.maps").len, 0);

    let children = stats.results("node.children");
    assert_eq!((children.min, children.max), (0, 4));
    let map_depth = stats.results("map.depth");
    assert_eq!(map_depth.len, 7);
    assert_eq!((map_depth.min, map_depth.max), (0, 2));
    assert_eq!(stats.results("map.scale").mean, 24000.0);
}
