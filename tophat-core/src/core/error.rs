//
// Copyright (c) Pirmin Kalberer. All rights reserved.
// Licensed under the MIT License. See LICENSE file in the project root for full license information.
//

use thiserror::Error;

/// Errors of the coverage index and its records.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum IndexError {
    /// Record with missing or invalid fields.
    #[error("Invalid map record: {0}")]
    InvalidRecord(String),

    /// Growing the root would leave the finite range.
    #[error("Index extent overflow growing to ({minx}, {miny}, {maxx}, {maxy})")]
    GeometryOverflow {
        minx: f64,
        miny: f64,
        maxx: f64,
        maxy: f64,
    },

    #[error("Invalid query point ({lon}, {lat})")]
    InvalidPoint { lon: f64, lat: f64 },

    /// The root refused a record it was grown to contain.
    #[error("Map record could not be placed: {0}")]
    PlacementFailed(String),

    #[error("Invalid index dump: {0}")]
    InvalidDump(String),
}
