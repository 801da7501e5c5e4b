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
use std::fs::{self, File};
use std::io::{BufReader, Write};
use std::process;
use tile_grid::Extent;
use time;
use tracker_core::core::config::ApplicationCfg;
use tracker_core::import::read_overlay;
use tracker_core::tracker::{enumerate_grid, read_fixes, replay, Clock, ManualClock, SystemClock};
use tracker_webserver as webserver;

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

fn exit_with(msg: String) -> ! {
    println!("{}", msg);
    process::exit(1)
}

fn session(config: &ApplicationCfg, clock: Box<dyn Clock + Send>) -> webserver::Session {
    webserver::session_from_config(config, clock)
        .unwrap_or_else(|err| exit_with(format!("Error reading configuration - {} ", err)))
}

/// Write to the `output` file or to stdout
fn write_output(args: &ArgMatches<'_>, content: &str) {
    match args.value_of("output") {
        Some(path) => {
            if let Err(e) = fs::write(path, content) {
                exit_with(format!("Error writing '{}' - {}", path, e));
            }
            info!("Written to '{}'", path);
        }
        None => println!("{}", content),
    }
}

fn replay_fixes(args: &ArgMatches<'_>) {
    let config = webserver::config_from_args(args);
    let path = args.value_of("fixes").unwrap_or_default();
    let file =
        File::open(path).unwrap_or_else(|e| exit_with(format!("Error opening '{}' - {}", path, e)));
    let fixes = read_fixes(BufReader::new(file))
        .unwrap_or_else(|e| exit_with(format!("Error reading '{}' - {}", path, e)));
    let clock = ManualClock::new(0);
    let mut tracker = session(&config, Box::new(clock.clone()));
    let summary = replay(&mut tracker, &clock, &fixes);
    println!(
        "{} fixes, {} processed, {} new tiles, {} tiles visited",
        summary.fixes,
        summary.accepted,
        summary.new_tiles,
        tracker.visited().len()
    );
}

fn export(args: &ArgMatches<'_>) {
    let config = webserver::config_from_args(args);
    let tracker = session(&config, Box::new(SystemClock));
    let geojson = tracker.export_visited();
    write_output(args, &geojson.to_string());
}

fn clear(args: &ArgMatches<'_>) {
    let config = webserver::config_from_args(args);
    let mut tracker = session(&config, Box::new(SystemClock));
    tracker.clear_visited();
}

fn grid(args: &ArgMatches<'_>) {
    let config = webserver::config_from_args(args);
    let zoom = args
        .value_of("zoom")
        .map(|s| {
            s.parse::<u8>()
                .unwrap_or_else(|_| exit_with("Error parsing 'zoom' as integer value".to_string()))
        })
        .unwrap_or(config.tracker.zoom);
    let arr: Vec<f64> = args
        .value_of("extent")
        .unwrap_or_default()
        .split(",")
        .map(|v| {
            v.parse().unwrap_or_else(|_| {
                exit_with("Error parsing 'extent' as list of float values".to_string())
            })
        })
        .collect();
    if arr.len() != 4 {
        exit_with("Expected 'extent' as west,south,east,north".to_string());
    }
    let extent = Extent {
        minx: arr[0],
        miny: arr[1],
        maxx: arr[2],
        maxy: arr[3],
    };
    for (id, b) in enumerate_grid(&extent, zoom, config.grid.max_tiles) {
        println!("{}\t{},{},{},{}", id, b.minx, b.miny, b.maxx, b.maxy);
    }
}

fn import(args: &ArgMatches<'_>) {
    let path = args.value_of("file").unwrap_or_default();
    let data = fs::read(path).unwrap_or_else(|e| exit_with(format!("Error reading '{}' - {}", path, e)));
    let geojson = read_overlay(path, &data)
        .unwrap_or_else(|e| exit_with(format!("Could not read the KML/KMZ file. {}", e)));
    write_output(args, &geojson.to_string());
}

fn main() {
    dotenv().ok();
    // http://kbknapp.github.io/clap-rs/clap/
    let mut app = App::new("tile_tracker")
        .version(crate_version!())
        .author("Pirmin Kalberer <pka@sourcepole.ch>")
        .about("tile exploration tracker marking visited slippy-map tiles")
        .subcommand(SubCommand::with_name("serve")
                        .args_from_usage("-c, --config=[FILE] 'Load from custom config file'
                                              --loglevel=[error|warn|info|debug|trace] 'Log level (Default: info)'
                                              --store=[DIR] 'Persist visited tiles in DIR'
                                              --cache=[DIR] 'Use offline cache in DIR'
                                              --bind=[IPADDRESS] 'Bind web server to this address (0.0.0.0 for all)'
                                              --port=[PORT] 'Bind web server to this port'
                                              --openbrowser=[true|false] 'Open tracker URL in browser'")
                        .about("Start web server with map client"))
        .subcommand(SubCommand::with_name("replay")
                        .args_from_usage("-c, --config=[FILE] 'Load from custom config file'
                                              --loglevel=[error|warn|info|debug|trace] 'Log level (Default: info)'
                                              --store=[DIR] 'Persist visited tiles in DIR'
                                              --fixes=<FILE> 'Recorded fixes (JSON lines or lat,lon,accuracy,timestamp)'")
                        .about("Feed a recorded track into the tracker"))
        .subcommand(SubCommand::with_name("export")
                        .args_from_usage("-c, --config=[FILE] 'Load from custom config file'
                                              --loglevel=[error|warn|info|debug|trace] 'Log level (Default: info)'
                                              --store=[DIR] 'Persist visited tiles in DIR'
                                              --output=[FILE] 'Output file (Default: stdout)'")
                        .about("Export visited tiles as GeoJSON"))
        .subcommand(SubCommand::with_name("clear")
                        .args_from_usage("-c, --config=[FILE] 'Load from custom config file'
                                              --loglevel=[error|warn|info|debug|trace] 'Log level (Default: info)'
                                              --store=[DIR] 'Persist visited tiles in DIR'")
                        .about("Remove all visited tiles"))
        .subcommand(SubCommand::with_name("grid")
                        .setting(AppSettings::AllowLeadingHyphen)
                        .args_from_usage("-c, --config=[FILE] 'Load from custom config file'
                                              --loglevel=[error|warn|info|debug|trace] 'Log level (Default: info)'
                                              --extent=<west,south,east,north> 'Viewport extent'
                                              --zoom=[LEVEL] 'Zoom level'")
                        .about("List grid cells of a viewport"))
        .subcommand(SubCommand::with_name("import")
                        .args_from_usage("--loglevel=[error|warn|info|debug|trace] 'Log level (Default: info)'
                                              --file=<FILE> 'KML or KMZ file'
                                              --output=[FILE] 'Output file (Default: stdout)'")
                        .about("Convert a KML/KMZ overlay to GeoJSON"))
        .subcommand(SubCommand::with_name("genconfig")
                        .args_from_usage("--loglevel=[error|warn|info|debug|trace] 'Log level (Default: info)'")
                        .about("Generate configuration template"));

    match app.get_matches_from_safe_borrow(env::args()) {
        //app.get_matches() prohibits later call of app.print_help()
        Result::Err(e) => {
            println!("{}", e);
        }
        Result::Ok(matches) => match matches.subcommand() {
            ("serve", Some(sub_m)) => {
                init_logger(sub_m);
                webserver::webserver(sub_m.clone());
            }
            ("replay", Some(sub_m)) => {
                init_logger(sub_m);
                replay_fixes(sub_m);
            }
            ("export", Some(sub_m)) => {
                init_logger(sub_m);
                export(sub_m);
            }
            ("clear", Some(sub_m)) => {
                init_logger(sub_m);
                clear(sub_m);
            }
            ("grid", Some(sub_m)) => {
                init_logger(sub_m);
                grid(sub_m);
            }
            ("import", Some(sub_m)) => {
                init_logger(sub_m);
                import(sub_m);
            }
            ("genconfig", Some(sub_m)) => {
                init_logger(sub_m);
                println!("{}", webserver::gen_config());
            }
            _ => {
                let _ = app.print_help();
                println!("");
            }
        },
    }
}
