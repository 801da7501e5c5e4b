//
// Copyright (c) Pirmin Kalberer. All rights reserved.
// Licensed under the MIT License. See LICENSE file in the project root for full license information.
//

pub mod filestorage;
pub mod storage;
pub mod visited;

#[cfg(test)]
mod visited_test;

pub use self::filestorage::FileStorage;
pub use self::storage::{MemoryStorage, Storage};
pub use self::visited::VisitedTiles;
use crate::core::config::StoreCfg;
use crate::core::Config;
use std::io;

#[derive(Clone)]
pub enum StateStorage {
    Memory(MemoryStorage),
    File(FileStorage),
}

impl Storage for StateStorage {
    fn info(&self) -> String {
        match self {
            &StateStorage::Memory(ref storage) => storage.info(),
            &StateStorage::File(ref storage) => storage.info(),
        }
    }
    fn read(&self, key: &str) -> Option<String> {
        match self {
            &StateStorage::Memory(ref storage) => storage.read(key),
            &StateStorage::File(ref storage) => storage.read(key),
        }
    }
    fn write(&self, key: &str, value: &str) -> Result<(), io::Error> {
        match self {
            &StateStorage::Memory(ref storage) => storage.write(key, value),
            &StateStorage::File(ref storage) => storage.write(key, value),
        }
    }
}

impl<'a> Config<'a, StoreCfg> for StateStorage {
    fn from_config(config: &StoreCfg) -> Result<Self, String> {
        match config.dir {
            Some(ref dir) if dir.is_empty() => Err("Empty store directory".to_string()),
            Some(ref dir) => Ok(StateStorage::File(FileStorage {
                basepath: dir.clone(),
            })),
            None => Ok(StateStorage::Memory(MemoryStorage::new())),
        }
    }
    fn gen_config() -> String {
        let toml = r#"
[store]
# Directory of persisted state. Visited tiles are kept in memory when unset.
#dir = "/var/lib/tile-tracker"
key = "visited_17"
"#;
        toml.to_string()
    }
}
