//! A library for UTM/UPS grid calculations on map sheet projections
//!
//! ## Transverse Mercator
//!
//! ```rust
//! use utm_grid::TransverseMercator;
//!
//! let tm = TransverseMercator::new(6378137.0, 1.0 / 298.257223563, 0.9996).unwrap();
//! let (x, y) = tm.forward(-93.0, 0.0, -93.0).unwrap();
//! assert_eq!((x, y), (0.0, 0.0));
//! ```
//!
//! ## Sheet projections with false offsets
//!
//! ```rust
//! use utm_grid::{utmups, ProjectionParams, Zone};
//!
//! let params = ProjectionParams::utm_wgs84(-93.0, true);
//! let (easting, _northing) = utmups::forward(48.5, -93.0, &params, Zone::Utm).unwrap();
//! assert!((easting - 500000.0).abs() < 1e-9);
//! ```
//!
//! ## MGRS labels
//!
//! ```rust
//! use utm_grid::mgrs::grid_zone_designator;
//!
//! assert_eq!(grid_zone_designator(-92.0, 46.0, 500000.0, 5094000.0, false), "15T WL");
//! ```

mod error;
mod extent;
pub mod math;
pub mod mgrs;
mod polar_stereographic;
mod transverse_mercator;
pub mod utmups;


pub use error::ProjectionError;
pub use extent::Extent;
pub use polar_stereographic::PolarStereographic;
pub use transverse_mercator::TransverseMercator;
pub use utmups::{ProjectionParams, Zone};
