//
// Copyright (c) Pirmin Kalberer. All rights reserved.
// Licensed under the MIT License. See LICENSE file in the project root for full license information.
//

use crate::catalog::Catalog;
use crate::lookup_service::{parse_zone, LookupError, LookupService};
use approx::assert_abs_diff_eq;
use std::convert::TryFrom;
use std::fs;
use std::sync::Arc;
use tophat_core::core::{parse_config, ApplicationCfg, Config, IndexError, MapRecord, MapRecordCfg};
use utm_grid::Zone;

fn service() -> LookupService {
    let catalog = Catalog::read("topo", "src/test/catalog.json").unwrap();
    let (index, failed) = LookupService::build(&catalog.records, false);
    assert_eq!(failed, 0);
    LookupService::new(index, Zone::Utm)
}

#[test]
fn test_scenario() {
    let service = service();
    let result = service.lookup(-92.0, 46.0).unwrap();
    assert_eq!(result.len(), 1);
    let lookup = &result[0];
    assert_eq!(lookup.title, "Duluth");
    assert_eq!(lookup.scale, 250000);
    assert_abs_diff_eq!(lookup.projected_easting, 500000.0, epsilon = 1e-6);
    assert_abs_diff_eq!(lookup.projected_northing, 5094047.492, epsilon = 1e-3);
    assert_eq!(lookup.grid_zone_label, "15T WL");
    assert_eq!(
        lookup.as_text(),
        "Duluth / 1:250000 / UTM 15T WL (5)00000E,(50)94047N / GeoTIFF (12.3MB)"
    );
}

#[test]
fn test_overlapping_sheets() {
    let service = service();
    let result = service.lookup(-92.4, 46.1).unwrap();
    let titles: Vec<&str> = result.iter().map(|l| l.title.as_str()).collect();
    assert_eq!(titles, vec!["Duluth Heights", "Duluth"]);

    // legacy datum sheet, central meridian -93
    let heights = &result[0];
    assert_abs_diff_eq!(heights.projected_easting, 546376.992, epsilon = 1e-3);
    assert_abs_diff_eq!(heights.projected_northing, 5105115.212, epsilon = 1e-3);
    assert_eq!(heights.grid_zone_label, "15T WB");
    assert_eq!(
        heights.as_text(),
        "Duluth Heights / 1:24000 / UTM 15T WB (5)46376E,(51)05115N / GeoPDF (4.6MB) GeoTIFF (21.0MB)"
    );

    let duluth = &result[1];
    assert_abs_diff_eq!(duluth.projected_easting, 469082.928, epsilon = 1e-3);
    assert_abs_diff_eq!(duluth.projected_northing, 5105236.039, epsilon = 1e-3);
    assert_eq!(duluth.grid_zone_label, "15T VM");
}

#[test]
fn test_next_zone() {
    let service = service();
    let result = service.lookup(-86.0, 46.0).unwrap();
    assert_eq!(result.len(), 1);
    assert_eq!(result[0].grid_zone_label, "16T ER");
    assert_eq!(result[0].as_text(), "Lake Superior / 1:1000000 / UTM 16T ER (5)77432E,(50)94533N");
}

#[test]
fn test_no_coverage() {
    let service = service();
    assert!(service.lookup(-91.0 + 0.5, 45.5).unwrap().is_empty());
    assert!(service.lookup(10.0, 10.0).unwrap().is_empty());
}

#[test]
fn test_invalid_point() {
    let service = service();
    match service.lookup(f64::NAN, 46.0) {
        Err(LookupError::Index(IndexError::InvalidPoint { lat, .. })) => assert_eq!(lat, 46.0),
        other => panic!("unexpected result {:?}", other),
    }
}

#[test]
fn test_degenerate_projection() {
    // sheet on the equator with its central meridian 90 degrees away
    let cfg = MapRecordCfg {
        w: -1.0,
        e: 1.0,
        s: -1.0,
        n: 1.0,
        scale: 1000000,
        title: "Equator".to_string(),
        mgrs_new: true,
        lon0: Some(90.0),
        k0: Some(0.9996),
        feast: Some(500000.0),
        fnorth: Some(0.0),
        a: Some(6378137.0),
        f: Some(298.257223563),
        links: Vec::new(),
    };
    let record = Arc::new(MapRecord::try_from(cfg).unwrap());
    let (index, _) = LookupService::build(&[record], false);
    let service = LookupService::new(index, Zone::Utm);
    assert!(matches!(
        service.lookup(0.0, 0.0),
        Err(LookupError::Projection { .. })
    ));
    assert_eq!(service.lookup(0.5, 0.5).unwrap().len(), 1);
}

#[test]
fn test_ups_zone() {
    let mut service = service();
    service.zone = Zone::Ups;
    let result = service.lookup(-92.0, 46.0).unwrap();
    assert_eq!(result.len(), 1);
    assert!(result[0].projected_easting.is_finite());
    assert!(result[0].projected_northing < 500000.0);
}

#[test]
fn test_lookup_json() {
    let service = service();
    let result = service.lookup(-92.0, 46.0).unwrap();
    let json = serde_json::to_value(&result).unwrap();
    assert_eq!(json[0]["title"], json!("Duluth"));
    assert_eq!(json[0]["gridZoneLabel"], json!("15T WL"));
    assert_eq!(json[0]["projectedEasting"], json!(500000.0));
    assert!(json[0]["projectedNorthing"].is_f64());
    assert_eq!(json[0]["links"][0]["sizemb"], json!(12.3));
}

#[test]
fn test_parse_zone() {
    assert_eq!(parse_zone("utm"), Ok(Zone::Utm));
    assert_eq!(parse_zone("UPS"), Ok(Zone::Ups));
    assert!(parse_zone("mgrs").is_err());
}

#[test]
fn test_index_dump() {
    use std::env;

    let mut dir = env::temp_dir();
    dir.push("tophat_test");
    let _ = fs::remove_dir_all(&dir);
    fs::create_dir_all(&dir).unwrap();
    let dump = format!("{}/quadtree.json", dir.display());
    let toml = format!(
        r#"
        [service.lookup]
        zone = "utm"

        [[catalog]]
        name = "topo"
        path = "src/test/catalog.json"

        [index]
        dump = "{}"

        [webserver]
        "#,
        dump
    );
    let config: ApplicationCfg = parse_config(toml, "").unwrap();

    // build from catalogs and write the dump
    let built = LookupService::from_config(&config).unwrap();
    assert_eq!(built.index.len(), 3);
    assert_eq!(built.catalogs.rejected(), 2);
    assert!(std::path::Path::new(&dump).exists());

    // load from the dump
    let loaded = LookupService::from_config(&config).unwrap();
    assert!(loaded.catalogs.catalogs.is_empty());
    assert_eq!(loaded.index.len(), 3);
    assert_eq!(loaded.index.dump(), built.index.dump());
    for &(lon, lat) in &[(-92.0, 46.0), (-92.4, 46.1), (-86.0, 46.0), (-91.0, 47.0)] {
        assert_eq!(loaded.lookup(lon, lat).unwrap(), built.lookup(lon, lat).unwrap());
    }

    fs::write(&dump, "{\"w\": 0.0}").unwrap();
    assert!(LookupService::from_config(&config).is_err());
}

#[test]
fn test_gen_config() {
    let toml = LookupService::gen_config() + "\n[webserver]\n";
    assert_eq!(Some("# tophat configuration"), toml.lines().next());
    let config: ApplicationCfg = parse_config(toml, "").unwrap();
    assert_eq!(config.service.lookup.zone, "utm");
    assert_eq!(config.catalog[0].path, "catalog.json");
    assert_eq!(config.index.unwrap().dump, "quadtree.json");

    let service = service();
    let runtime = service.gen_runtime_config();
    assert!(runtime.contains("# Index extent: [-93.00000, 43.00000, -77.00000, 59.00000]"));
}

#[test]
fn test_catalog_metadata() {
    let service = service();
    let metadata = service.get_catalog_metadata().unwrap();
    assert_eq!(metadata["maps"], json!(3));
    assert_eq!(metadata["sheets"][0]["title"], json!("Duluth"));
    assert_eq!(metadata["sheets"][0]["bounds"], json!([-93.0, 45.0, -91.0, 47.0]));
    assert_eq!(metadata["sheets"][2]["title"], json!("Lake Superior"));
    assert_eq!(metadata["sheets"].as_array().unwrap().len(), 3);

    let stats = service.statistics();
    assert_eq!(stats.results("map.scale").len, 3);
}
