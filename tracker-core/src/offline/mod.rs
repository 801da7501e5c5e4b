//
// Copyright (c) Pirmin Kalberer. All rights reserved.
// Licensed under the MIT License. See LICENSE file in the project root for full license information.
//

mod partition;
mod policy;


pub use self::partition::{list_partitions, Partition};
pub use self::policy::{
    cache_path, is_allowed_host, Fetch, OfflineCache, Request, Response, Route,
};
use crate::core::config::OfflineCfg;
use crate::core::Config;
use url::Url;

impl<'a> Config<'a, OfflineCfg> for OfflineCache {
    fn from_config(config: &OfflineCfg) -> Result<Self, String> {
        if config.dir.is_empty() {
            return Err("Empty offline cache directory".to_string());
        }
        if config.shell_cache == config.dynamic_cache {
            return Err("Shell and dynamic cache need different names".to_string());
        }
        let origin = match config.origin {
            Some(ref origin) => Some(
                Url::parse(origin).map_err(|e| format!("Invalid origin `{}`: {}", origin, e))?,
            ),
            None => None,
        };
        Ok(OfflineCache {
            origin,
            shell: Partition::new(&config.dir, &config.shell_cache),
            dynamic: Partition::new(&config.dir, &config.dynamic_cache),
            shell_resources: config.shell.clone(),
            allowed_hosts: config.allowed_hosts.clone(),
        })
    }
    fn gen_config() -> String {
        let toml = r#"
#[offline]
# Cache partitions for offline use
#dir = "/tmp/tile-tracker-cache"
# Application origin, defaults to the web server address
#origin = "http://127.0.0.1:6767"
#shell_cache = "tracker-shell-v1"
#dynamic_cache = "tracker-dyn-v1"
#allowed_hosts = ["openstreetmap.org", "unpkg.com", "jsdelivr.net", "skypack.dev"]
"#;
        toml.to_string()
    }
}
