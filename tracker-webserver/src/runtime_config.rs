//
// Copyright (c) Pirmin Kalberer. All rights reserved.
// Licensed under the MIT License. See LICENSE file in the project root for full license information.
//

use crate::core::config::{ApplicationCfg, OfflineCfg, DEFAULT_CONFIG};
use crate::core::{parse_config, read_config, Config};
use crate::offline::OfflineCache;
use crate::store::{StateStorage, VisitedTiles};
use crate::tracker::{Clock, PushedLocation, RenderQueue, Tracker, TrackerSettings};
use clap::ArgMatches;
use std::process;
use std::str::FromStr;

/// Tracker session driven by the web client
pub type Session = Tracker<StateStorage, RenderQueue>;

pub fn config_from_args(args: &ArgMatches) -> ApplicationCfg {
    if let Some(cfgpath) = args.value_of("config") {
        info!("Reading configuration from '{}'", cfgpath);
        for argname in vec!["store", "cache"] {
            if args.value_of(argname).is_some() {
                warn!("Ignoring argument `{}`", argname);
            }
        }
        let config = read_config(cfgpath).unwrap_or_else(|err| {
            println!("Error reading configuration - {} ", err);
            process::exit(1)
        });
        config
    } else {
        let bind = args.value_of("bind").unwrap_or("127.0.0.1");
        let port = u16::from_str(args.value_of("port").unwrap_or("6767")).unwrap_or_else(|_| {
            println!("Invalid port number");
            process::exit(1)
        });
        let mut config: ApplicationCfg = parse_config(DEFAULT_CONFIG.to_string(), "")
            .unwrap_or_else(|err| {
                println!("Error reading configuration - {} ", err);
                process::exit(1)
            });
        config.webserver.bind = Some(bind.to_string());
        config.webserver.port = Some(port);
        if let Some(dir) = args.value_of("store") {
            config.store.dir = Some(dir.to_string());
        }
        if let Some(dir) = args.value_of("cache") {
            config.offline = Some(OfflineCfg::with_dir(dir));
        }
        config
    }
}

/// Tracker with persisted visited tiles and a location stream pushed by the caller
pub fn session_from_config(
    config: &ApplicationCfg,
    clock: Box<dyn Clock + Send>,
) -> Result<Session, String> {
    let settings = TrackerSettings::from_config(config)?;
    let storage = StateStorage::from_config(&config.store)?;
    let visited = VisitedTiles::new(storage, &config.store.key);
    let mut session = Tracker::new(
        settings,
        visited,
        RenderQueue::new(),
        Box::new(PushedLocation::new()),
        clock,
    );
    // clients restore visited tiles from `/api/visited.geojson`
    session.view_mut().drain();
    Ok(session)
}

/// Offline cache of the `[offline]` section. The origin defaults to the web server address.
pub fn offline_cache_from_config(config: &ApplicationCfg) -> Result<Option<OfflineCache>, String> {
    let mut cfg = match config.offline {
        Some(ref cfg) => cfg.clone(),
        None => return Ok(None),
    };
    if cfg.origin.is_none() {
        cfg.origin = Some(format!(
            "http://{}:{}",
            config.webserver.bind.as_deref().unwrap_or("127.0.0.1"),
            config.webserver.port.unwrap_or(6767)
        ));
    }
    OfflineCache::from_config(&cfg).map(Some)
}

pub fn gen_config() -> String {
    let toml = r#"
[webserver]
# Bind address. Use 0.0.0.0 to listen on all adresses.
bind = "127.0.0.1"
port = 6767
threads = 4
#cache_control_max_age = 43200
"#;
    let mut config = "# tile-tracker configuration\n".to_string();
    config.push_str(&TrackerSettings::gen_config());
    config.push_str(&StateStorage::gen_config());
    config.push_str(&OfflineCache::gen_config());
    config.push_str(toml);
    config
}

#[test]
fn test_gen_config() {
    use crate::tracker::SystemClock;

    let toml = gen_config();
    println!("{}", toml);
    assert_eq!(Some("# tile-tracker configuration"), toml.lines().next());

    let config: ApplicationCfg = parse_config(toml, "").unwrap();
    assert_eq!(config.webserver.port, Some(6767));
    assert!(config.offline.is_none());
    let session = session_from_config(&config, Box::new(SystemClock)).unwrap();
    assert_eq!(session.settings().zoom, 17);
    assert_eq!(session.settings().max_grid_tiles, 500);
}

#[test]
fn test_offline_origin() {
    let mut config: ApplicationCfg = parse_config(DEFAULT_CONFIG.to_string(), "").unwrap();
    assert!(offline_cache_from_config(&config).unwrap().is_none());

    config.offline = Some(OfflineCfg::with_dir("/tmp/tile_tracker_origin"));
    let cache = offline_cache_from_config(&config).unwrap().unwrap();
    assert_eq!(
        cache.route(&crate::offline::Request::get("http://127.0.0.1:6767/viewer.js")),
        crate::offline::Route::CacheFirst
    );
}
