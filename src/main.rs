//
// Copyright (c) Pirmin Kalberer. All rights reserved.
// Licensed under the MIT License. See LICENSE file in the project root for full license information.
//

#[macro_use]
extern crate clap;
#[macro_use]
extern crate log;

use clap::{App, AppSettings, ArgMatches, SubCommand};
use dotenv::dotenv;
use env_logger::Builder;
use log::Record;
use std::env;
use std::io::Write;
use std::process;
use time;
use tophat_core::core::config::IndexCfg;
use tophat_webserver as webserver;
use utm_grid::mgrs::{band_letter, zone_number};

fn init_logger(args: &ArgMatches<'_>) {
    let mut builder = Builder::new();
    builder.format(|buf, record: &Record<'_>| {
        let t = time::now();
        writeln!(
            buf,
            "{}.{:03} {} {}",
            time::strftime("%Y-%m-%d %H:%M:%S", &t).unwrap_or_default(),
            t.tm_nsec / 1000_000,
            record.level(),
            record.args()
        )
    });

    let rust_log_env = env::var("RUST_LOG");
    let rust_log = match (args.value_of("loglevel"), rust_log_env.as_ref()) {
        (None, Ok(rust_log)) => rust_log.as_str(),
        (loglevel, _) => match loglevel.unwrap_or("info") {
            "debug" => "debug,actix_server=info",
            loglevel => loglevel,
        },
    };
    builder.parse_filters(rust_log);

    builder.init();
}

fn exit_with(msg: &str) -> ! {
    println!("{}", msg);
    process::exit(1)
}

fn build(args: &ArgMatches<'_>) {
    let mut config = webserver::config_from_args(&args);
    if let Some(output) = args.value_of("output") {
        config.index = Some(IndexCfg {
            dump: output.to_string(),
            rebuild: true,
        });
    }
    match config.index {
        Some(ref mut index) => index.rebuild = true,
        None => exit_with("Either 'output' or an [index] configuration is required"),
    }
    let service = webserver::service_from_config(&config);
    println!(
        "{} maps in {} nodes, depth {}",
        service.index.len(),
        service.index.node_count(),
        service.index.depth()
    );
}

fn parse_points(numlist: &str) -> Vec<(f64, f64)> {
    let coords: Vec<f64> = numlist
        .split(",")
        .map(|v| {
            v.trim()
                .parse()
                .unwrap_or_else(|_| exit_with("Error parsing 'points' as list of float values"))
        })
        .collect();
    if coords.len() % 2 != 0 {
        exit_with("Odd number of values in 'points'");
    }
    coords.chunks(2).map(|pt| (pt[0], pt[1])).collect()
}

fn lookup(args: &ArgMatches<'_>) {
    let config = webserver::config_from_args(&args);
    let service = webserver::service_from_config(&config);
    let points = args
        .value_of("points")
        .map(parse_points)
        .unwrap_or_else(|| exit_with("Missing 'points' list"));
    let json = args.value_of("format") == Some("json");
    for (lon, lat) in points {
        let sheets = match service.lookup(lon, lat) {
            Ok(sheets) => sheets,
            Err(e) => {
                error!("{},{}: {}", lon, lat, e);
                continue;
            }
        };
        if json {
            match serde_json::to_string(&sheets) {
                Ok(line) => println!("{}", line),
                Err(e) => error!("{},{}: {}", lon, lat, e),
            }
        } else {
            println!(
                "Geographic: {:.5}°,{:.5}° / {}{}",
                lon,
                lat,
                zone_number(lon),
                band_letter(lat)
            );
            if sheets.is_empty() {
                println!("  no map sheet");
            }
            for sheet in sheets {
                println!("  {}", sheet.as_text());
            }
        }
    }
}

fn stats(args: &ArgMatches<'_>) {
    let config = webserver::config_from_args(&args);
    let service = webserver::service_from_config(&config);
    if args.is_present("dump") {
        print!("{}", service.index.debug_dump());
    } else {
        print!("{:?}", service.statistics());
    }
}

fn main() {
    dotenv().ok();
    // http://kbknapp.github.io/clap-rs/clap/
    let mut app = App::new("tophat")
        .version(crate_version!())
        .author("Pirmin Kalberer <pka@sourcepole.ch>")
        .about("map sheet coverage lookup with UTM/UPS grid references")
        .subcommand(SubCommand::with_name("serve")
                        .args_from_usage("--catalog=[FILE]... 'Map catalog (JSON)'
                                              --index=[FILE] 'Index dump, loaded if it exists'
                                              --rebuild 'Rebuild index dump from catalogs'
                                              --zone=[utm|ups] 'Projection zone (Default: utm)'
                                              --progress 'Show progress bar while indexing'
                                              --loglevel=[error|warn|info|debug|trace] 'Log level (Default: info)'
                                              -c, --config=[FILE] 'Load from custom config file'
                                              --bind=[IPADDRESS] 'Bind web server to this address (0.0.0.0 for all)'
                                              --port=[PORT] 'Bind web server to this port'")
                        .about("Start web server and serve map sheet lookups"))
        .subcommand(SubCommand::with_name("genconfig")
                        .args_from_usage("--catalog=[FILE]... 'Map catalog (JSON)'
                                              --index=[FILE] 'Index dump, loaded if it exists'
                                              --zone=[utm|ups] 'Projection zone (Default: utm)'
                                              --loglevel=[error|warn|info|debug|trace] 'Log level (Default: info)'")
                        .about("Generate configuration template"))
        .subcommand(SubCommand::with_name("build")
                        .args_from_usage("-c, --config=[FILE] 'Load from custom config file'
                                              --catalog=[FILE]... 'Map catalog (JSON)'
                                              --output=[FILE] 'Index dump file'
                                              --zone=[utm|ups] 'Projection zone (Default: utm)'
                                              --progress 'Show progress bar while indexing'
                                              --loglevel=[error|warn|info|debug|trace] 'Log level (Default: info)'")
                        .about("Build index dump from catalogs"))
        .subcommand(SubCommand::with_name("lookup")
                        .setting(AppSettings::AllowLeadingHyphen)
                        .args_from_usage("-c, --config=[FILE] 'Load from custom config file'
                                              --catalog=[FILE]... 'Map catalog (JSON)'
                                              --index=[FILE] 'Index dump, loaded if it exists'
                                              --zone=[utm|ups] 'Projection zone (Default: utm)'
                                              --format=[text|json] 'Output format (Default: text)'
                                              --loglevel=[error|warn|info|debug|trace] 'Log level (Default: info)'
                                              --points=[lon1,lat1,lon2,lat2,..] 'Lookup points'")
                        .about("Look up map sheets covering points"))
        .subcommand(SubCommand::with_name("stats")
                        .args_from_usage("-c, --config=[FILE] 'Load from custom config file'
                                              --catalog=[FILE]... 'Map catalog (JSON)'
                                              --index=[FILE] 'Index dump, loaded if it exists'
                                              --dump 'Print index tree'
                                              --loglevel=[error|warn|info|debug|trace] 'Log level (Default: info)'")
                        .about("Index statistics"));

    match app.get_matches_from_safe_borrow(env::args()) {
        //app.get_matches() prohibits later call of app.print_help()
        Result::Err(e) => {
            println!("{}", e);
        }
        Result::Ok(matches) => match matches.subcommand() {
            ("serve", Some(sub_m)) => {
                init_logger(sub_m);
                if let Err(e) = webserver::webserver(sub_m) {
                    exit_with(&format!("Can not start server: {}", e));
                }
            }
            ("genconfig", Some(sub_m)) => {
                init_logger(sub_m);
                println!("{}", webserver::gen_config(sub_m));
            }
            ("build", Some(sub_m)) => {
                init_logger(sub_m);
                build(sub_m);
            }
            ("lookup", Some(sub_m)) => {
                init_logger(sub_m);
                lookup(sub_m);
            }
            ("stats", Some(sub_m)) => {
                init_logger(sub_m);
                stats(sub_m);
            }
            _ => {
                let _ = app.print_help();
                println!("");
            }
        },
    }
}
