//
// Copyright (c) Pirmin Kalberer. All rights reserved.
// Licensed under the MIT License. See LICENSE file in the project root for full license information.
//

//! Map record catalogs

use std::convert::TryFrom;
use std::fs::File;
use std::io::BufReader;
use std::sync::Arc;
use tophat_core::core::config::CatalogCfg;
use tophat_core::core::{ApplicationCfg, Config, MapRecord, MapRecordCfg};

/// Validated records of one catalog file
#[derive(Clone, Debug)]
pub struct Catalog {
    pub name: String,
    /// Source file
    pub path: Option<String>,
    pub records: Vec<Arc<MapRecord>>,
    /// Number of skipped invalid records
    pub rejected: usize,
}

impl Catalog {
    /// Validate catalog entries. Invalid records are logged and skipped.
    pub fn from_records(name: &str, entries: Vec<MapRecordCfg>) -> Catalog {
        let mut records = Vec::with_capacity(entries.len());
        let mut rejected = 0;
        for entry in entries {
            match MapRecord::try_from(entry) {
                Ok(record) => records.push(Arc::new(record)),
                Err(e) => {
                    warn!("Catalog '{}': {}", name, e);
                    rejected += 1;
                }
            }
        }
        Catalog {
            name: name.to_string(),
            path: None,
            records,
            rejected,
        }
    }
    /// Parse a JSON array of map records
    pub fn parse(name: &str, json: &str) -> Result<Catalog, String> {
        let entries: Vec<MapRecordCfg> = serde_json::from_str(json)
            .map_err(|e| format!("Catalog '{}': {}", name, e))?;
        Ok(Catalog::from_records(name, entries))
    }
    pub fn read(name: &str, path: &str) -> Result<Catalog, String> {
        let file = File::open(path)
            .map_err(|e| format!("Could not open catalog '{}' ({}): {}", name, path, e))?;
        let entries: Vec<MapRecordCfg> = serde_json::from_reader(BufReader::new(file))
            .map_err(|e| format!("Catalog '{}' ({}): {}", name, path, e))?;
        let mut catalog = Catalog::from_records(name, entries);
        catalog.path = Some(path.to_string());
        info!(
            "Catalog '{}': {} maps read, {} rejected",
            name,
            catalog.records.len(),
            catalog.rejected
        );
        Ok(catalog)
    }
    fn from_cfg(cfg: &CatalogCfg) -> Result<Catalog, String> {
        let name = cfg.name.clone().unwrap_or_else(|| cfg.path.clone());
        Catalog::read(&name, &cfg.path)
    }
}

/// All configured catalogs, in configuration order
#[derive(Clone, Debug, Default)]
pub struct Catalogs {
    pub catalogs: Vec<Catalog>,
}

impl Catalogs {
    pub fn new() -> Catalogs {
        Catalogs::default()
    }
    pub fn add(&mut self, catalog: Catalog) {
        self.catalogs.push(catalog);
    }
    /// Records of all catalogs, merged in order
    pub fn records(&self) -> Vec<Arc<MapRecord>> {
        self.catalogs
            .iter()
            .flat_map(|c| c.records.iter().cloned())
            .collect()
    }
    pub fn rejected(&self) -> usize {
        self.catalogs.iter().map(|c| c.rejected).sum()
    }
}

impl<'a> Config<'a, ApplicationCfg> for Catalogs {
    fn from_config(config: &ApplicationCfg) -> Result<Self, String> {
        let mut catalogs = Catalogs::new();
        for cfg in &config.catalog {
            catalogs.add(Catalog::from_cfg(cfg)?);
        }
        Ok(catalogs)
    }
    fn gen_config() -> String {
        let toml = r#"
[[catalog]]
# Catalog name (default: path)
name = "topo"
# JSON array of map records
path = "catalog.json"
"#;
        toml.to_string()
    }
    fn gen_runtime_config(&self) -> String {
        let mut config = String::new();
        for catalog in &self.catalogs {
            if let Some(ref path) = catalog.path {
                config.push_str("\n[[catalog]]\n");
                config.push_str(&format!("name = \"{}\"\n", catalog.name));
                config.push_str(&format!(
                    "# {} maps, {} rejected\n",
                    catalog.records.len(),
                    catalog.rejected
                ));
                config.push_str(&format!("path = \"{}\"\n", path));
            }
        }
        config
    }
}
