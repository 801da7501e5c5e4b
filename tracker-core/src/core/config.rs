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
    #[serde(default)]
    pub tracker: TrackerCfg,
    #[serde(default)]
    pub store: StoreCfg,
    #[serde(default)]
    pub grid: GridCfg,
    pub offline: Option<OfflineCfg>,
    pub webserver: WebserverCfg,
}

#[derive(Deserialize, Clone, Debug)]
pub struct TrackerCfg {
    /// Zoom level of visited tiles
    #[serde(default = "default_zoom")]
    pub zoom: u8,
    /// Minimal time between two processed fixes in milliseconds
    #[serde(default = "default_min_fix_interval")]
    pub min_fix_interval: u64,
    /// Auto-centering pause after an overlay import in milliseconds
    #[serde(default = "default_autocenter_pause")]
    pub autocenter_pause: u64,
    /// Zoom level used when snapping the view to the position
    #[serde(default = "default_zoom")]
    pub snap_zoom: u8,
    #[serde(default)]
    pub toggles: TogglesCfg,
}

#[derive(Deserialize, Clone, Debug)]
pub struct TogglesCfg {
    #[serde(default = "default_true")]
    pub auto_center: bool,
    #[serde(default)]
    pub snap_zoom: bool,
    #[serde(default = "default_true")]
    pub show_trace: bool,
    #[serde(default)]
    pub show_grid: bool,
}

#[derive(Deserialize, Clone, Debug)]
pub struct StoreCfg {
    /// Directory of persisted state (None: keep in memory)
    pub dir: Option<String>,
    /// Storage key of the visited tile list
    #[serde(default = "default_store_key")]
    pub key: String,
}

#[derive(Deserialize, Clone, Debug)]
pub struct GridCfg {
    /// Maximal number of grid cells drawn for one viewport
    #[serde(default = "default_max_tiles")]
    pub max_tiles: usize,
}

#[derive(Deserialize, Clone, Debug)]
pub struct OfflineCfg {
    /// Base directory of the cache partitions
    pub dir: String,
    /// Origin of the application shell, e.g. http://127.0.0.1:6767
    pub origin: Option<String>,
    #[serde(default = "default_shell_cache")]
    pub shell_cache: String,
    #[serde(default = "default_dynamic_cache")]
    pub dynamic_cache: String,
    /// Application shell resources (relative to origin)
    #[serde(default = "default_shell")]
    pub shell: Vec<String>,
    /// Host name suffixes served stale-while-revalidate
    #[serde(default = "default_allowed_hosts")]
    pub allowed_hosts: Vec<String>,
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

pub fn default_zoom() -> u8 {
    17
}

pub fn default_min_fix_interval() -> u64 {
    800
}

pub fn default_autocenter_pause() -> u64 {
    6000
}

fn default_true() -> bool {
    true
}

pub fn default_store_key() -> String {
    "visited_17".to_string()
}

pub fn default_max_tiles() -> usize {
    500
}

pub fn default_shell_cache() -> String {
    "tracker-shell-v1".to_string()
}

pub fn default_dynamic_cache() -> String {
    "tracker-dyn-v1".to_string()
}

pub fn default_shell() -> Vec<String> {
    vec![
        "./",
        "./index.html",
        "./viewer.css",
        "./viewer.js",
        "./manifest.webmanifest",
        "./icon.svg",
    ]
    .into_iter()
    .map(String::from)
    .collect()
}

pub fn default_allowed_hosts() -> Vec<String> {
    vec![
        "openstreetmap.org",
        "tile.openstreetmap.org",
        "unpkg.com",
        "jsdelivr.net",
        "skypack.dev",
    ]
    .into_iter()
    .map(String::from)
    .collect()
}

impl Default for TrackerCfg {
    fn default() -> Self {
        TrackerCfg {
            zoom: default_zoom(),
            min_fix_interval: default_min_fix_interval(),
            autocenter_pause: default_autocenter_pause(),
            snap_zoom: default_zoom(),
            toggles: TogglesCfg::default(),
        }
    }
}

impl Default for TogglesCfg {
    fn default() -> Self {
        TogglesCfg {
            auto_center: true,
            snap_zoom: false,
            show_trace: true,
            show_grid: false,
        }
    }
}

impl Default for StoreCfg {
    fn default() -> Self {
        StoreCfg {
            dir: None,
            key: default_store_key(),
        }
    }
}

impl OfflineCfg {
    /// Default partitions below `dir`
    pub fn with_dir(dir: &str) -> OfflineCfg {
        OfflineCfg {
            dir: dir.to_string(),
            origin: None,
            shell_cache: default_shell_cache(),
            dynamic_cache: default_dynamic_cache(),
            shell: default_shell(),
            allowed_hosts: default_allowed_hosts(),
        }
    }
}

impl Default for GridCfg {
    fn default() -> Self {
        GridCfg {
            max_tiles: default_max_tiles(),
        }
    }
}

pub const DEFAULT_CONFIG: &'static str = r#"
[tracker]
zoom = 17

[store]
key = "visited_17"

[grid]
max_tiles = 500

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
    let toml = tera.render(path, &context).map_err(|e| match e.source() {
        Some(source) => format!("Template error: {}", source),
        None => format!("Template error: {}", e),
    })?;

    toml.parse::<Value>()
        .and_then(|cfg| cfg.try_into::<T>())
        .map_err(|err| format!("{} - {}", path, err))
}
