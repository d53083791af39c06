//
// Copyright (c) Pirmin Kalberer. All rights reserved.
// Licensed under the MIT License. See LICENSE file in the project root for full license information.
//

use clap::ArgMatches;
use std::process;
use std::str::FromStr;
use tophat_core::core::config::{CatalogCfg, IndexCfg, DEFAULT_CONFIG};
use tophat_core::core::{parse_config, read_config, ApplicationCfg, Config};
use tophat_service::lookup_service::LookupService;

pub fn config_from_args(args: &ArgMatches) -> ApplicationCfg {
    if let Some(cfgpath) = args.value_of("config") {
        info!("Reading configuration from '{}'", cfgpath);
        for argname in vec!["catalog", "index", "zone"] {
            if args.value_of(argname).is_some() {
                warn!("Ignoring argument `{}`", argname);
            }
        }
        read_config(cfgpath).unwrap_or_else(|err| {
            println!("Error reading configuration - {} ", err);
            process::exit(1)
        })
    } else {
        let bind = args.value_of("bind").unwrap_or("127.0.0.1");
        let port = u16::from_str(args.value_of("port").unwrap_or("6767")).unwrap_or_else(|_| {
            println!("Invalid port number");
            process::exit(1)
        });
        let mut config: ApplicationCfg = parse_config(DEFAULT_CONFIG.to_string(), "")
            .unwrap_or_else(|err| {
                println!("Error in default configuration - {} ", err);
                process::exit(1)
            });
        if let Some(paths) = args.values_of("catalog") {
            config.catalog = paths
                .map(|path| CatalogCfg {
                    name: None,
                    path: path.to_string(),
                })
                .collect();
        }
        config.index = args.value_of("index").map(|dump| IndexCfg {
            dump: dump.to_string(),
            rebuild: args.is_present("rebuild"),
        });
        if let Some(zone) = args.value_of("zone") {
            config.service.lookup.zone = zone.to_string();
        }
        config.service.lookup.progress = args.is_present("progress");
        config.webserver.bind = Some(bind.to_string());
        config.webserver.port = Some(port);
        config
    }
}

pub fn service_from_config(config: &ApplicationCfg) -> LookupService {
    LookupService::from_config(config).unwrap_or_else(|err| {
        println!("Error reading configuration - {} ", err);
        process::exit(1)
    })
}

pub fn gen_config(args: &ArgMatches) -> String {
    let toml = r#"
[webserver]
# Bind address. Use 0.0.0.0 to listen on all adresses.
bind = "127.0.0.1"
port = 6767
threads = 4
#cache_control_max_age = 43200
"#;
    let mut config;
    if args.value_of("catalog").is_some() || args.value_of("index").is_some() {
        let service = service_from_config(&config_from_args(args));
        config = service.gen_runtime_config();
    } else {
        config = LookupService::gen_config();
    }
    config.push_str(toml);
    config
}

#[test]
fn test_gen_config() {
    let args = ArgMatches::new();
    let toml = gen_config(&args);
    println!("{}", toml);
    assert_eq!(Some("# tophat configuration"), toml.lines().next());

    let config: ApplicationCfg = parse_config(toml, "").unwrap();
    assert_eq!(config.service.lookup.zone, "utm");
    assert_eq!(config.catalog.len(), 1);
    assert_eq!(config.webserver.port, Some(6767));
    assert_eq!(config.webserver.threads, Some(4));
    assert_eq!(config.webserver.cache_control_max_age, None);
}

#[test]
fn test_runtime_config() {
    use clap::App;

    let args = App::new("test")
        .args_from_usage(
            "--catalog=[FILE]... 'Map catalog'
             --port=[PORT] 'Bind web server to this port'",
        )
        .get_matches_from(vec![
            "",
            "--catalog",
            "../tophat-service/src/test/catalog.json",
            "--port",
            "8080",
        ]);
    let config = config_from_args(&args);
    assert_eq!(config.catalog.len(), 1);
    assert!(config.index.is_none());
    assert_eq!(config.webserver.port, Some(8080));

    let toml = gen_config(&args);
    println!("{}", toml);
    assert!(toml.contains("# 3 maps, 2 rejected"));
    assert!(toml.contains("# Index extent: [-93.00000, 43.00000, -77.00000, 59.00000]"));

    let config: ApplicationCfg = parse_config(toml, "").unwrap();
    assert_eq!(config.catalog[0].path, "../tophat-service/src/test/catalog.json");
}
