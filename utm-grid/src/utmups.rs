//
// Copyright (c) Pirmin Kalberer. All rights reserved.
// Licensed under the MIT License. See LICENSE file in the project root for full license information.
//

//! UTM/UPS forward conversion with caller-supplied projection parameters
//!
//! Historical map sheets carry their own projection definition, which need
//! not match a standard UTM zone. The caller decides whether the transverse
//! Mercator (UTM) or polar stereographic (UPS) branch applies.

use crate::error::ProjectionError;
use crate::polar_stereographic::PolarStereographic;
use crate::transverse_mercator::TransverseMercator;

/// Projection branch
#[derive(PartialEq, Eq, Clone, Copy, Debug)]
pub enum Zone {
    /// Universal Polar Stereographic pseudo-zone
    Ups,
    /// Transverse Mercator around the sheet's own central meridian
    Utm,
}

/// Projection definition of one map sheet
#[derive(PartialEq, Clone, Copy, Debug)]
pub struct ProjectionParams {
    /// Longitude of natural origin (degrees)
    pub lon0: f64,
    /// Scale factor at natural origin
    pub k0: f64,
    /// False easting (meters)
    pub feast: f64,
    /// False northing (meters)
    pub fnorth: f64,
    /// Semi-major axis (meters)
    pub a: f64,
    /// Flattening
    pub f: f64,
}

impl ProjectionParams {
    /// Standard UTM definition on WGS84 for the given central meridian
    pub fn utm_wgs84(lon0: f64, northp: bool) -> ProjectionParams {
        ProjectionParams {
            lon0,
            k0: 0.9996,
            feast: 500_000.0,
            fnorth: if northp { 0.0 } else { 10_000_000.0 },
            a: 6378137.0,
            f: 1.0 / 298.257223563,
        }
    }
    /// Standard UPS definition on WGS84
    pub fn ups_wgs84() -> ProjectionParams {
        ProjectionParams {
            lon0: 0.0,
            k0: 0.994,
            feast: 2_000_000.0,
            fnorth: 2_000_000.0,
            a: 6378137.0,
            f: 1.0 / 298.257223563,
        }
    }
}

/// Easting and northing (meters, false offsets included) of `lat`/`lon`.
pub fn forward(
    lat: f64,
    lon: f64,
    params: &ProjectionParams,
    zone: Zone,
) -> Result<(f64, f64), ProjectionError> {
    if !(params.feast.is_finite() && params.fnorth.is_finite()) {
        return Err(ProjectionError::Degenerate(format!(
            "non-finite false offsets ({}, {})",
            params.feast, params.fnorth
        )));
    }
    let (x, y) = match zone {
        Zone::Utm => {
            TransverseMercator::new(params.a, params.f, params.k0)?.forward(params.lon0, lat, lon)?
        }
        Zone::Ups => {
            PolarStereographic::new(params.a, params.f, params.k0)?.forward(lat >= 0.0, lat, lon)?
        }
    };
    Ok((x + params.feast, y + params.fnorth))
}
