//
// Copyright (c) Pirmin Kalberer. All rights reserved.
// Licensed under the MIT License. See LICENSE file in the project root for full license information.
//

use regex::Regex;
use serde::Deserialize;
use std;
use std::collections::HashMap;
use std::env;
use std::error::Error;
use std::fs::File;
use std::io::prelude::*;
use tera::{Context, Tera};
use toml::Value;

pub trait Config<'a, C: Deserialize<'a>>
where
    Self: std::marker::Sized,
{
    /// Read configuration
    fn from_config(config: &C) -> Result<Self, String>;
    /// Generate configuration template
    fn gen_config() -> String;
    /// Generate configuration template with runtime information
    fn gen_runtime_config(&self) -> String {
        Self::gen_config()
    }
}

#[derive(Deserialize, Clone, Debug)]
pub struct ApplicationCfg {
    pub service: ServiceCfg,
    #[serde(default)]
    pub catalog: Vec<CatalogCfg>,
    pub index: Option<IndexCfg>,
    pub webserver: WebserverCfg,
}

#[derive(Deserialize, Clone, Debug)]
pub struct ServiceCfg {
    pub lookup: ServiceLookupCfg,
}

#[derive(Deserialize, Clone, Debug)]
pub struct ServiceLookupCfg {
    /// Projection branch applied to every sheet (utm or ups)
    #[serde(default = "default_zone")]
    pub zone: String,
    /// Show a progress bar while building the index
    #[serde(default)]
    pub progress: bool,
}

pub fn default_zone() -> String {
    "utm".to_string()
}

/// Map record catalog (JSON array of map records)
#[derive(Deserialize, Clone, Debug)]
pub struct CatalogCfg {
    pub name: Option<String>,
    pub path: String,
}

#[derive(Deserialize, Clone, Debug)]
pub struct IndexCfg {
    /// Index dump file. Loaded instead of the catalogs if it exists
    pub dump: String,
    /// Rebuild from the catalogs and overwrite an existing dump
    #[serde(default)]
    pub rebuild: bool,
}

#[derive(Deserialize, Clone, Debug)]
pub struct WebserverCfg {
    pub bind: Option<String>,
    pub port: Option<u16>,
    pub threads: Option<u8>,
    // Cache-Control headers set by web server
    // https://developer.mozilla.org/en-US/docs/Web/HTTP/Headers/Cache-Control#Expiration
    pub cache_control_max_age: Option<u32>,
}

pub const DEFAULT_CONFIG: &'static str = r#"
[service.lookup]
zone = "utm"

[[catalog]]
name = "topo"
path = "catalog.json"

[index]
dump = "quadtree.json"

[webserver]
bind = "127.0.0.1"
port = 6767
"#;

/// Load and parse the config file into an config struct.
pub fn read_config<'a, T: Deserialize<'a>>(path: &str) -> Result<T, String> {
    let mut file = match File::open(path) {
        Ok(file) => file,
        Err(_) => {
            return Err("Could not find config file!".to_string());
        }
    };
    let mut config_toml = String::new();
    if let Err(err) = file.read_to_string(&mut config_toml) {
        return Err(format!("Error while reading config: [{}]", err));
    };

    parse_config(config_toml, path)
}

/// Parse the configuration into an config struct.
pub fn parse_config<'a, T: Deserialize<'a>>(config_toml: String, path: &str) -> Result<T, String> {
    // Check for old ${var} expressions
    let re = Regex::new(r"\$\{([[:alnum:]]+)\}").map_err(|e| e.to_string())?;
    if re.is_match(&config_toml) {
        return Err(
            "Replace old environment variable syntax ${VARNAME} with `{{env.VARNAME}}`".to_string(),
        );
    }

    // Parse template
    let mut tera = Tera::default();
    tera.add_raw_template(path, &config_toml)
        .map_err(|e| format!("Template error: {}", e))?;
    let mut context = Context::new();
    let mut env = HashMap::new();
    for (key, value) in env::vars() {
        env.insert(key, value);
    }
    context.insert("env", &env);
    let toml = tera
        .render(path, &context)
        .map_err(|e| match e.source() {
            Some(source) => format!("Template error: {}", source),
            None => format!("Template error: {}", e),
        })?;

    toml.parse::<Value>()
        .and_then(|cfg| cfg.try_into::<T>())
        .map_err(|err| format!("{} - {}", path, err))
}
