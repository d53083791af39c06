//
// Copyright (c) Pirmin Kalberer. All rights reserved.
// Licensed under the MIT License. See LICENSE file in the project root for full license information.
//

use crate::catalog::Catalogs;
use pbr::ProgressBar;
use std::fs;
use std::io::{stderr, Stderr};
use std::path::Path;
use std::sync::Arc;
use thiserror::Error;
use tophat_core::core::stats::{index_statistics, Statistics};
use tophat_core::core::{ApplicationCfg, Config, CoverageIndex, IndexError, MapLink, MapRecord};
use utm_grid::mgrs::{format_grid_coordinate, grid_zone_designator};
use utm_grid::{utmups, ProjectionError, Zone};

#[derive(Debug, Error)]
pub enum LookupError {
    #[error(transparent)]
    Index(#[from] IndexError),

    #[error("Projection of '{title}' failed: {source}")]
    Projection {
        title: String,
        source: ProjectionError,
    },
}

/// Map sheet covering a point, with the point's grid coordinate in the
/// sheet's own projection
#[derive(Serialize, Clone, PartialEq, Debug)]
#[serde(rename_all = "camelCase")]
pub struct Lookup {
    pub title: String,
    pub scale: u32,
    pub projected_easting: f64,
    pub projected_northing: f64,
    pub grid_zone_label: String,
    pub links: Vec<MapLink>,
}

impl Lookup {
    /// One line summary, e.g.
    /// `Duluth / 1:250000 / UTM 15T WL (5)00000E,(50)94047N / GeoTIFF (12.3MB)`
    pub fn as_text(&self) -> String {
        let mut line = format!(
            "{} / 1:{} / UTM {} {}E,{}N",
            self.title,
            self.scale,
            self.grid_zone_label,
            format_grid_coordinate(self.projected_easting),
            format_grid_coordinate(self.projected_northing)
        );
        if !self.links.is_empty() {
            let links: Vec<String> = self
                .links
                .iter()
                .map(|link| format!("{} ({:.1}MB)", link.name, link.sizemb))
                .collect();
            line.push_str(" / ");
            line.push_str(&links.join(" "));
        }
        line
    }
}

/// Map sheet coverage lookup service
pub struct LookupService {
    pub index: CoverageIndex,
    /// Projection branch used for all sheets
    pub zone: Zone,
    /// Catalogs the index was built from (empty when loaded from a dump)
    pub catalogs: Catalogs,
}

pub fn parse_zone(zone: &str) -> Result<Zone, String> {
    match zone.to_lowercase().as_str() {
        "utm" => Ok(Zone::Utm),
        "ups" => Ok(Zone::Ups),
        _ => Err(format!("Unknown projection zone '{}' (utm or ups)", zone)),
    }
}

fn zone_name(zone: Zone) -> &'static str {
    match zone {
        Zone::Utm => "utm",
        Zone::Ups => "ups",
    }
}

impl LookupService {
    pub fn new(index: CoverageIndex, zone: Zone) -> LookupService {
        LookupService {
            index,
            zone,
            catalogs: Catalogs::new(),
        }
    }
    /// Build an index from `records`. Records which can't be inserted are
    /// logged and counted.
    pub fn build(records: &[Arc<MapRecord>], progress: bool) -> (CoverageIndex, usize) {
        let mut index = CoverageIndex::new();
        let mut failed = 0;
        let mut pb = if progress {
            Some(progress_bar(records.len() as u64))
        } else {
            None
        };
        for record in records {
            if let Err(e) = index.insert(record.clone()) {
                warn!("Skipping '{}': {}", record.title, e);
                failed += 1;
            }
            if let Some(ref mut pb) = pb {
                pb.inc();
            }
        }
        if let Some(ref mut pb) = pb {
            pb.finish();
            eprintln!("");
        }
        info!(
            "Index built: {} maps in {} nodes, depth {}",
            index.len(),
            index.node_count(),
            index.depth()
        );
        (index, failed)
    }
    /// Grid coordinate of the point in the projection of `record`
    pub fn lookup_record(
        &self,
        record: &MapRecord,
        lon: f64,
        lat: f64,
    ) -> Result<Lookup, LookupError> {
        let (easting, northing) = utmups::forward(lat, lon, &record.projection, self.zone)
            .map_err(|source| LookupError::Projection {
                title: record.title.clone(),
                source,
            })?;
        Ok(Lookup {
            title: record.title.clone(),
            scale: record.scale,
            projected_easting: easting,
            projected_northing: northing,
            grid_zone_label: grid_zone_designator(lon, lat, easting, northing, !record.mgrs_new),
            links: record.links.clone(),
        })
    }
    /// All sheets covering the point, most detailed scale first
    pub fn lookup(&self, lon: f64, lat: f64) -> Result<Vec<Lookup>, LookupError> {
        let mut result = self
            .index
            .query(lon, lat)?
            .iter()
            .map(|record| self.lookup_record(record, lon, lat))
            .collect::<Result<Vec<_>, _>>()?;
        result.sort_by(|a, b| a.scale.cmp(&b.scale).then_with(|| a.title.cmp(&b.title)));
        debug!("{},{}: {} maps", lon, lat, result.len());
        Ok(result)
    }
    pub fn index_json(&self) -> serde_json::Result<String> {
        self.index.to_json()
    }
    pub fn write_index(&self, path: &str) -> Result<(), String> {
        let json = self
            .index_json()
            .map_err(|e| format!("Error serializing index: {}", e))?;
        fs::write(path, json).map_err(|e| format!("Error writing {}: {}", path, e))?;
        info!("Index dump written to '{}'", path);
        Ok(())
    }
    pub fn read_index(path: &str) -> Result<CoverageIndex, String> {
        let json =
            fs::read_to_string(path).map_err(|e| format!("Error reading {}: {}", path, e))?;
        CoverageIndex::from_json(&json).map_err(|e| format!("{} - {}", path, e))
    }
    pub fn statistics(&self) -> Statistics {
        index_statistics(&self.index)
    }
}

fn progress_bar(records: u64) -> ProgressBar<Stderr> {
    let mut pb = ProgressBar::on(stderr(), records);
    pb.message("Indexing ");
    pb.show_speed = false;
    pb.show_percent = false;
    pb.show_time_left = false;
    pb
}

impl<'a> Config<'a, ApplicationCfg> for LookupService {
    fn from_config(config: &ApplicationCfg) -> Result<Self, String> {
        let zone = parse_zone(&config.service.lookup.zone)?;
        if let Some(ref index_cfg) = config.index {
            if !index_cfg.rebuild && Path::new(&index_cfg.dump).exists() {
                info!("Reading index from '{}'", index_cfg.dump);
                let index = LookupService::read_index(&index_cfg.dump)?;
                return Ok(LookupService::new(index, zone));
            }
        }
        let catalogs = Catalogs::from_config(config)?;
        let (index, failed) =
            LookupService::build(&catalogs.records(), config.service.lookup.progress);
        if failed > 0 || catalogs.rejected() > 0 {
            warn!(
                "{} invalid catalog records, {} records not indexed",
                catalogs.rejected(),
                failed
            );
        }
        let service = LookupService {
            index,
            zone,
            catalogs,
        };
        if let Some(ref index_cfg) = config.index {
            service.write_index(&index_cfg.dump)?;
        }
        Ok(service)
    }
    fn gen_config() -> String {
        let mut config = String::new();
        config.push_str(&toml_services(Zone::Utm));
        config.push_str(&Catalogs::gen_config());
        config.push_str(TOML_INDEX);
        config
    }
    fn gen_runtime_config(&self) -> String {
        let mut config = String::new();
        config.push_str(&toml_services(self.zone));
        config.push_str(&self.catalogs.gen_runtime_config());
        if let Some(ext) = self.index.extent() {
            config.push_str(&format!(
                "\n# Index extent: [{:.5}, {:.5}, {:.5}, {:.5}]",
                ext.minx, ext.miny, ext.maxx, ext.maxy
            ));
        }
        config.push_str(TOML_INDEX);
        config
    }
}

fn toml_services(zone: Zone) -> String {
    format!(
        r#"# tophat configuration

[service.lookup]
# Projection applied to all sheets: utm or ups
zone = "{}"
# Show a progress bar while building the index
progress = false
"#,
        zone_name(zone)
    )
}

const TOML_INDEX: &'static str = r#"
[index]
# Index dump, loaded instead of the catalogs if it exists
dump = "quadtree.json"
#rebuild = true
"#;
