//
// Copyright (c) Pirmin Kalberer. All rights reserved.
// Licensed under the MIT License. See LICENSE file in the project root for full license information.
//

//! Transverse Mercator projection
//!
//! Krüger's series extended to 6th order, following C. F. F. Karney,
//! "Transverse Mercator with an accuracy of a few nanometers",
//! J. Geodesy 85(8), 475-485 (2011). The error is below 5 nm for points
//! within 35 degrees of the central meridian.
//!
//! The latitude of origin is the equator. No false easting or northing is
//! applied; `utmups::forward` adds those.

use crate::error::ProjectionError;
use crate::math::{ang_diff, ang_normalize, check_parameters, check_point, normalize_flattening};
use crate::math::{Eccentricity, DEGREE};
use std::f64::consts::PI;

const MAXPOW: usize = 6;

/// Transverse Mercator for one ellipsoid and central scale
#[derive(Clone, Debug, PartialEq)]
pub struct TransverseMercator {
    /// Equatorial radius in meters
    pub a: f64,
    /// Flattening
    pub f: f64,
    /// Central scale factor
    pub k0: f64,
    ecc: Eccentricity,
    /// Rectifying radius: a1 * pi/2 is the length of a quarter meridian
    a1: f64,
    /// alp[0] is unused
    alp: [f64; MAXPOW + 1],
}

impl TransverseMercator {
    /// Projection on the ellipsoid with equatorial radius `a` (meters) and
    /// flattening `f`. An `f` above 1 is taken as inverse flattening.
    pub fn new(a: f64, f: f64, k0: f64) -> Result<TransverseMercator, ProjectionError> {
        let f = normalize_flattening(f);
        check_parameters(a, f, k0)?;
        let n = f / (2.0 - f);
        let mut nx = n * n;
        let b1 = 1.0 / (1.0 + n) * (nx * (nx * (nx + 4.0) + 64.0) + 256.0) / 256.0;

        let mut alp = [0.0; MAXPOW + 1];
        alp[1] = n
            * (n * (n * (n * (n * (31564.0 * n - 66675.0) + 34440.0) + 47250.0) - 100800.0)
                + 75600.0)
            / 151200.0;
        alp[2] = nx
            * (n * (n * ((863232.0 - 1983433.0 * n) * n + 748608.0) - 1161216.0) + 524160.0)
            / 1935360.0;
        nx *= n;
        alp[3] = nx * (n * (n * (670412.0 * n + 406647.0) - 533952.0) + 184464.0) / 725760.0;
        nx *= n;
        alp[4] = nx * (n * (6601661.0 * n - 7732800.0) + 2230245.0) / 7257600.0;
        nx *= n;
        alp[5] = (3438171.0 - 13675556.0 * n) * nx / 7983360.0;
        nx *= n;
        alp[6] = 212378941.0 * nx / 319334400.0;

        Ok(TransverseMercator {
            a,
            f,
            k0,
            ecc: Eccentricity::new(f),
            a1: b1 * a,
            alp,
        })
    }

    /// Projected (x, y) in meters of the point at `lat`/`lon` (degrees) for
    /// central meridian `lon0`.
    pub fn forward(&self, lon0: f64, lat: f64, lon: f64) -> Result<(f64, f64), ProjectionError> {
        check_point(lat, lon)?;
        if !lon0.is_finite() {
            return Err(ProjectionError::Degenerate(format!(
                "non-finite central meridian {}",
                lon0
            )));
        }
        let mut lon = ang_diff(ang_normalize(lon0), ang_normalize(lon));
        // Evaluate the series for the first quadrant only
        let mut latsign = if lat < 0.0 { -1.0 } else { 1.0 };
        let lonsign = if lon < 0.0 { -1.0 } else { 1.0 };
        lon *= lonsign;
        let lat = lat * latsign;
        let backside = lon > 90.0;
        if backside {
            if lat == 0.0 {
                latsign = -1.0;
            }
            lon = 180.0 - lon;
        }
        if lat == 0.0 && lon == 90.0 {
            return Err(ProjectionError::Degenerate(format!(
                "point on the equator 90 degrees from central meridian {}",
                lon0
            )));
        }
        let phi = lat * DEGREE;
        let lam = lon * DEGREE;

        // Gauss-Schreiber coordinates
        let (xip, etap) = if lat != 90.0 {
            // cos(pi/2) might be negative
            let c = lam.cos().max(0.0);
            let taup = self.ecc.taupf(phi.tan());
            (taup.atan2(c), (lam.sin() / taup.hypot(c)).asinh())
        } else {
            (PI / 2.0, 0.0)
        };

        // Gauss-Krüger coordinates by Clenshaw summation of
        // zeta = zeta' + sum(alp[j] * sin(2 * j * zeta'))
        let c0 = (2.0 * xip).cos();
        let ch0 = (2.0 * etap).cosh();
        let s0 = (2.0 * xip).sin();
        let sh0 = (2.0 * etap).sinh();
        // 2 * cos(2 * zeta')
        let ar = 2.0 * c0 * ch0;
        let ai = -2.0 * s0 * sh0;
        // MAXPOW is even, so the recurrence starts from zero
        let mut n = MAXPOW;
        let (mut xi0, mut eta0) = (0.0, 0.0);
        let (mut xi1, mut eta1) = (0.0, 0.0);
        while n > 0 {
            xi1 = ar * xi0 - ai * eta0 - xi1 + self.alp[n];
            eta1 = ai * xi0 + ar * eta0 - eta1;
            n -= 1;
            xi0 = ar * xi1 - ai * eta1 - xi0 + self.alp[n];
            eta0 = ai * xi1 + ar * eta1 - eta0;
            n -= 1;
        }
        // sin(2 * zeta')
        let ar = s0 * ch0;
        let ai = c0 * sh0;
        let xi = xip + ar * xi0 - ai * eta0;
        let eta = etap + ai * xi0 + ar * eta0;

        let scale = self.a1 * self.k0;
        let y = scale * (if backside { PI - xi } else { xi }) * latsign;
        let x = scale * eta * lonsign;
        Ok((x, y))
    }
}
