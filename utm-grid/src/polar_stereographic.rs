//
// Copyright (c) Pirmin Kalberer. All rights reserved.
// Licensed under the MIT License. See LICENSE file in the project root for full license information.
//

//! Polar stereographic projection
//!
//! Straightforward implementation of J. P. Snyder, "Map Projections: A
//! Working Manual", USGS Professional Paper 1395 (1987), pp. 160-163,
//! working with tau = tan(phi) and tau' = tan(phi') of the conformal
//! latitude phi'.

use crate::error::ProjectionError;
use crate::math::{ang_normalize, check_parameters, check_point, normalize_flattening, tanx};
use crate::math::{Eccentricity, DEGREE};

/// Polar stereographic for one ellipsoid and central scale
#[derive(Clone, Debug, PartialEq)]
pub struct PolarStereographic {
    /// Equatorial radius in meters
    pub a: f64,
    /// Flattening
    pub f: f64,
    /// Central scale factor at the pole
    pub k0: f64,
    ecc: Eccentricity,
    /// (1 - f) * exp(e * atanh(e))
    c: f64,
}

impl PolarStereographic {
    /// Projection on the ellipsoid with equatorial radius `a` (meters) and
    /// flattening `f`. An `f` above 1 is taken as inverse flattening.
    pub fn new(a: f64, f: f64, k0: f64) -> Result<PolarStereographic, ProjectionError> {
        let f = normalize_flattening(f);
        check_parameters(a, f, k0)?;
        let ecc = Eccentricity::new(f);
        let c = (1.0 - f) * ecc.eatanhe(1.0).exp();
        Ok(PolarStereographic { a, f, k0, ecc, c })
    }

    /// Projected (x, y) in meters of the point at `lat`/`lon` (degrees),
    /// centered on the north pole if `northp`, else on the south pole.
    pub fn forward(&self, northp: bool, lat: f64, lon: f64) -> Result<(f64, f64), ProjectionError> {
        check_point(lat, lon)?;
        let lat = if northp { lat } else { -lat };
        if lat == -90.0 {
            return Err(ProjectionError::Degenerate(format!(
                "{} pole is at infinity in the {} polar stereographic projection",
                if northp { "south" } else { "north" },
                if northp { "north" } else { "south" }
            )));
        }
        let phi = lat * DEGREE;
        let tau = tanx(phi);
        let taup = self.ecc.taupf(tau);
        let mut rho = 1f64.hypot(taup) + taup.abs();
        // rho = C/(hypot + taup) north of the equator, C*(hypot - taup) south of it
        rho = if taup >= 0.0 {
            if lat != 90.0 {
                1.0 / rho
            } else {
                0.0
            }
        } else {
            rho
        };
        rho *= 2.0 * self.k0 * self.a / self.c;

        let lon = ang_normalize(lon);
        let lam = lon * DEGREE;
        let x = rho * if lon == -180.0 { 0.0 } else { lam.sin() };
        let y = (if northp { -rho } else { rho }) * if lon.abs() == 90.0 { 0.0 } else { lam.cos() };
        Ok((x, y))
    }
}
