//
// Copyright (c) Pirmin Kalberer. All rights reserved.
// Licensed under the MIT License. See LICENSE file in the project root for full license information.
//

/// Geographic extent
///
/// `minx`/`maxx` are the west/east longitudes, `miny`/`maxy` the south/north
/// latitudes in degrees. All containment tests are inclusive.
#[derive(PartialEq, Clone, Debug)]
pub struct Extent {
    pub minx: f64,
    pub miny: f64,
    pub maxx: f64,
    pub maxy: f64,
}

impl Extent {
    pub fn new(minx: f64, miny: f64, maxx: f64, maxy: f64) -> Extent {
        Extent {
            minx,
            miny,
            maxx,
            maxy,
        }
    }
    pub fn width(&self) -> f64 {
        self.maxx - self.minx
    }
    pub fn height(&self) -> f64 {
        self.maxy - self.miny
    }
    /// Midpoint (x, y)
    pub fn center(&self) -> (f64, f64) {
        ((self.minx + self.maxx) / 2.0, (self.miny + self.maxy) / 2.0)
    }
    pub fn is_finite(&self) -> bool {
        self.minx.is_finite() && self.miny.is_finite() && self.maxx.is_finite() && self.maxy.is_finite()
    }
    /// Finite with min strictly below max on both axes
    pub fn is_valid(&self) -> bool {
        self.is_finite() && self.minx < self.maxx && self.miny < self.maxy
    }
    /// `other` lies completely inside this extent
    pub fn contains(&self, other: &Extent) -> bool {
        self.minx <= other.minx
            && self.miny <= other.miny
            && self.maxx >= other.maxx
            && self.maxy >= other.maxy
    }
    pub fn contains_point(&self, x: f64, y: f64) -> bool {
        x >= self.minx && x <= self.maxx && y >= self.miny && y <= self.maxy
    }
    /// Extent twice as wide and twice as high, growing west if `left`
    /// (else east) and south if `down` (else north). `self` stays one of
    /// the quadrants of the result, sharing its outer edges exactly.
    pub fn doubled(&self, left: bool, down: bool) -> Extent {
        let (minx, maxx) = if left {
            (2.0 * self.minx - self.maxx, self.maxx)
        } else {
            (self.minx, 2.0 * self.maxx - self.minx)
        };
        let (miny, maxy) = if down {
            (2.0 * self.miny - self.maxy, self.maxy)
        } else {
            (self.miny, 2.0 * self.maxy - self.miny)
        };
        Extent {
            minx,
            miny,
            maxx,
            maxy,
        }
    }
}
