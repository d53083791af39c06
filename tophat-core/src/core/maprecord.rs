//
// Copyright (c) Pirmin Kalberer. All rights reserved.
// Licensed under the MIT License. See LICENSE file in the project root for full license information.
//

use crate::core::error::IndexError;
use std::convert::TryFrom;
use utm_grid::math::normalize_flattening;
use utm_grid::{Extent, ProjectionParams, TransverseMercator};

/// Download link of a map sheet
#[derive(Serialize, Deserialize, Clone, PartialEq, Debug)]
pub struct MapLink {
    pub name: String,
    pub href: String,
    /// Download size in megabytes
    pub sizemb: f64,
}

/// Map record as found in catalogs and index dumps.
///
/// Projection parameters are optional here, so that incomplete catalog
/// entries can be reported instead of failing the whole catalog.
#[derive(Serialize, Deserialize, Clone, PartialEq, Debug)]
pub struct MapRecordCfg {
    pub w: f64,
    pub e: f64,
    pub s: f64,
    pub n: f64,
    pub scale: i64,
    pub title: String,
    #[serde(rename = "mgrsNew", default)]
    pub mgrs_new: bool,
    /// Longitude of natural origin
    pub lon0: Option<f64>,
    /// Scale factor at natural origin
    pub k0: Option<f64>,
    /// False easting
    pub feast: Option<f64>,
    /// False northing
    pub fnorth: Option<f64>,
    /// Semi-major axis
    pub a: Option<f64>,
    /// Flattening, or inverse flattening if above 1
    pub f: Option<f64>,
    #[serde(default)]
    pub links: Vec<MapLink>,
}

/// Surveyed paper map sheet with its own projection definition
#[derive(Serialize, Deserialize, Clone, PartialEq, Debug)]
#[serde(try_from = "MapRecordCfg", into = "MapRecordCfg")]
pub struct MapRecord {
    pub title: String,
    /// Scale denominator
    pub scale: u32,
    /// Sheet bounds in degrees (west, south, east, north)
    pub extent: Extent,
    pub projection: ProjectionParams,
    /// Modern (NAD83-class) MGRS row lettering
    pub mgrs_new: bool,
    pub links: Vec<MapLink>,
}

impl MapRecord {
    /// Sheet covers the point (boundary included)
    pub fn covers(&self, lon: f64, lat: f64) -> bool {
        self.extent.contains_point(lon, lat)
    }
}

fn required(value: Option<f64>, name: &str, title: &str) -> Result<f64, IndexError> {
    match value {
        Some(v) if v.is_finite() => Ok(v),
        Some(v) => Err(IndexError::InvalidRecord(format!(
            "'{}': parameter {} is not finite ({})",
            title, name, v
        ))),
        None => Err(IndexError::InvalidRecord(format!(
            "'{}': missing parameter {}",
            title, name
        ))),
    }
}

impl TryFrom<MapRecordCfg> for MapRecord {
    type Error = IndexError;

    fn try_from(cfg: MapRecordCfg) -> Result<Self, Self::Error> {
        let title = cfg.title;
        let extent = Extent::new(cfg.w, cfg.s, cfg.e, cfg.n);
        if !extent.is_valid() {
            return Err(IndexError::InvalidRecord(format!(
                "'{}': invalid bounds w={} e={} s={} n={}",
                title, cfg.w, cfg.e, cfg.s, cfg.n
            )));
        }
        if cfg.scale <= 0 || cfg.scale > i64::from(u32::MAX) {
            return Err(IndexError::InvalidRecord(format!(
                "'{}': invalid scale {}",
                title, cfg.scale
            )));
        }
        let projection = ProjectionParams {
            lon0: required(cfg.lon0, "lon0", &title)?,
            k0: required(cfg.k0, "k0", &title)?,
            feast: required(cfg.feast, "feast", &title)?,
            fnorth: required(cfg.fnorth, "fnorth", &title)?,
            a: required(cfg.a, "a", &title)?,
            f: normalize_flattening(required(cfg.f, "f", &title)?),
        };
        TransverseMercator::new(projection.a, projection.f, projection.k0)
            .map_err(|e| IndexError::InvalidRecord(format!("'{}': {}", title, e)))?;
        Ok(MapRecord {
            title,
            scale: cfg.scale as u32,
            extent,
            projection,
            mgrs_new: cfg.mgrs_new,
            links: cfg.links,
        })
    }
}

impl From<MapRecord> for MapRecordCfg {
    fn from(record: MapRecord) -> Self {
        MapRecordCfg {
            w: record.extent.minx,
            e: record.extent.maxx,
            s: record.extent.miny,
            n: record.extent.maxy,
            scale: i64::from(record.scale),
            title: record.title,
            mgrs_new: record.mgrs_new,
            lon0: Some(record.projection.lon0),
            k0: Some(record.projection.k0),
            feast: Some(record.projection.feast),
            fnorth: Some(record.projection.fnorth),
            a: Some(record.projection.a),
            f: Some(record.projection.f),
            links: record.links,
        }
    }
}
