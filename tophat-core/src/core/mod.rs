//
// Copyright (c) Pirmin Kalberer. All rights reserved.
// Licensed under the MIT License. See LICENSE file in the project root for full license information.
//

pub mod config;
pub mod error;
pub mod maprecord;
pub mod quadtree;
pub mod stats;

pub use self::config::{parse_config, read_config, ApplicationCfg, Config};
pub use self::error::IndexError;
pub use self::maprecord::{MapLink, MapRecord, MapRecordCfg};
pub use self::quadtree::{CoverageIndex, QuadNode, QuadNodeCfg, Quadrant};

#[cfg(test)]
mod quadtree_test;
