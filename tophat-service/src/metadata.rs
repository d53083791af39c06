//
// Copyright (c) Pirmin Kalberer. All rights reserved.
// Licensed under the MIT License. See LICENSE file in the project root for full license information.
//

use crate::lookup_service::LookupService;
use serde_json;

type JsonResult = Result<serde_json::Value, serde_json::error::Error>;

impl LookupService {
    /// Indexed sheets for clients
    pub fn get_catalog_metadata(&self) -> JsonResult {
        #[derive(Serialize)]
        struct SheetInfo {
            title: String,
            scale: u32,
            bounds: [f64; 4],
            links: usize,
        }

        let mut sheets: Vec<SheetInfo> = self
            .index
            .nodes()
            .flat_map(|(_, node)| node.maps().iter())
            .map(|map| {
                let ext = &map.extent;
                SheetInfo {
                    title: map.title.clone(),
                    scale: map.scale,
                    bounds: [ext.minx, ext.miny, ext.maxx, ext.maxy],
                    links: map.links.len(),
                }
            })
            .collect();
        sheets.sort_by(|a, b| a.title.cmp(&b.title).then_with(|| a.scale.cmp(&b.scale)));
        let bounds = self
            .index
            .extent()
            .map(|ext| vec![ext.minx, ext.miny, ext.maxx, ext.maxy]);
        Ok(json!({
            "bounds": bounds,
            "maps": self.index.len(),
            "nodes": self.index.node_count(),
            "depth": self.index.depth(),
            "catalogs": self.catalogs.catalogs.iter().map(|c| json!({
                "name": c.name,
                "maps": c.records.len(),
                "rejected": c.rejected,
            })).collect::<Vec<_>>(),
            "sheets": serde_json::to_value(sheets)?,
        }))
    }
}
