//
// Copyright (c) Pirmin Kalberer. All rights reserved.
// Licensed under the MIT License. See LICENSE file in the project root for full license information.
//

use thiserror::Error;

/// Errors raised by the forward projections.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ProjectionError {
    /// Ellipsoid or scale parameters that do not define a projection,
    /// or a point the projection sends to infinity.
    #[error("Degenerate projection: {0}")]
    Degenerate(String),
}
