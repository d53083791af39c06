//
// Copyright (c) Pirmin Kalberer. All rights reserved.
// Licensed under the MIT License. See LICENSE file in the project root for full license information.
//

//! Angle and ellipsoid helpers shared by the projections

use crate::error::ProjectionError;
use std::f64::consts::PI;

pub(crate) const DEGREE: f64 = PI / 180.0;

const DIGITS: i32 = 53;

/// Machine epsilon for f64.
pub(crate) fn epsilon() -> f64 {
    0.5f64.powi(DIGITS - 1)
}

/// Overflow value s.t. atan(overflow) = pi/2
pub(crate) fn overflow() -> f64 {
    let eps = epsilon();
    1.0 / (eps * eps)
}

/// Reduce an angle in degrees to [-180, 180).
pub fn ang_normalize(x: f64) -> f64 {
    let y = x % 360.0;
    if y >= 180.0 {
        y - 360.0
    } else if y < -180.0 {
        y + 360.0
    } else {
        y
    }
}

/// `y - x` reduced to [-180, 180], computed with the rounding error folded back in.
///
/// Both arguments must lie in [-180, 180].
pub fn ang_diff(x: f64, y: f64) -> f64 {
    let mut d = y - x;
    let mut yp = d + x;
    let mut xpp = yp - d;
    yp -= y;
    xpp -= x;
    let t = xpp - yp;
    if (d - 180.0) + t > 0.0 {
        d -= 360.0;
    } else if (d + 180.0) + t <= 0.0 {
        d += 360.0;
    }
    d + t
}

/// tan(x) for x in [-pi/2, pi/2] with the sign kept right at the ends
pub(crate) fn tanx(x: f64) -> f64 {
    let t = x.tan();
    // written this way so that tanx(NaN) stays NaN
    if x >= 0.0 {
        if !(t < 0.0) {
            t
        } else {
            overflow()
        }
    } else if !(t >= 0.0) {
        t
    } else {
        -overflow()
    }
}

/// Eccentricity terms derived from the flattening.
#[derive(Clone, Copy, Debug, PartialEq)]
pub(crate) struct Eccentricity {
    f: f64,
    e: f64,
}

impl Eccentricity {
    pub fn new(f: f64) -> Eccentricity {
        let e2 = f * (2.0 - f);
        Eccentricity {
            f,
            e: e2.abs().sqrt(),
        }
    }
    /// `e * atanh(e * x)` for an oblate ellipsoid, `-e * atan(e * x)` for a prolate one.
    pub fn eatanhe(&self, x: f64) -> f64 {
        if self.f >= 0.0 {
            self.e * (self.e * x).atanh()
        } else {
            -self.e * (self.e * x).atan()
        }
    }
    /// tan of the conformal latitude from tan of the geographic latitude
    pub fn taupf(&self, tau: f64) -> f64 {
        if !(tau.abs() < overflow()) {
            return tau;
        }
        let tau1 = 1f64.hypot(tau);
        let sig = self.eatanhe(tau / tau1).sinh();
        1f64.hypot(sig) * tau - sig * tau1
    }
}

/// Flattening given either directly or as an inverse flattening (> 1).
pub fn normalize_flattening(f: f64) -> f64 {
    if f <= 1.0 {
        f
    } else {
        1.0 / f
    }
}

/// Reject parameters which do not define a projection.
pub(crate) fn check_parameters(a: f64, f: f64, k0: f64) -> Result<(), ProjectionError> {
    if !(a.is_finite() && a > 0.0) {
        return Err(ProjectionError::Degenerate(format!(
            "semi-major axis must be positive, got {}",
            a
        )));
    }
    if !(f.is_finite() && f < 1.0) {
        return Err(ProjectionError::Degenerate(format!(
            "flattening must be below 1, got {}",
            f
        )));
    }
    if !(k0.is_finite() && k0 > 0.0) {
        return Err(ProjectionError::Degenerate(format!(
            "central scale must be positive, got {}",
            k0
        )));
    }
    Ok(())
}

/// Reject non-finite coordinates and latitudes beyond the poles.
pub(crate) fn check_point(lat: f64, lon: f64) -> Result<(), ProjectionError> {
    if !(lat.is_finite() && lon.is_finite()) {
        return Err(ProjectionError::Degenerate(format!(
            "non-finite point ({}, {})",
            lon, lat
        )));
    }
    if lat.abs() > 90.0 {
        return Err(ProjectionError::Degenerate(format!(
            "latitude {} outside [-90, 90]",
            lat
        )));
    }
    Ok(())
}
