//
// Copyright (c) Pirmin Kalberer. All rights reserved.
// Licensed under the MIT License. See LICENSE file in the project root for full license information.
//

use std::collections::HashMap;
use std::io;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

/// Key/value storage of persisted state
pub trait Storage {
    fn info(&self) -> String;
    /// Stored value, None if missing or unreadable
    fn read(&self, key: &str) -> Option<String>;
    /// Replace stored value
    fn write(&self, key: &str, value: &str) -> Result<(), io::Error>;
}

/// In-memory storage. Clones share their entries.
#[derive(Clone, Default)]
pub struct MemoryStorage {
    entries: Arc<Mutex<HashMap<String, String>>>,
    writes: Arc<AtomicUsize>,
}

impl MemoryStorage {
    pub fn new() -> MemoryStorage {
        MemoryStorage::default()
    }
    /// Number of write operations so far
    pub fn write_count(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }
    fn entries(&self) -> MutexGuard<'_, HashMap<String, String>> {
        match self.entries.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }
}

impl Storage for MemoryStorage {
    fn info(&self) -> String {
        "In-memory storage".to_string()
    }
    fn read(&self, key: &str) -> Option<String> {
        self.entries().get(key).cloned()
    }
    fn write(&self, key: &str, value: &str) -> Result<(), io::Error> {
        self.writes.fetch_add(1, Ordering::SeqCst);
        self.entries().insert(key.to_string(), value.to_string());
        Ok(())
    }
}
