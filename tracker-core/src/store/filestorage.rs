//
// Copyright (c) Pirmin Kalberer. All rights reserved.
// Licensed under the MIT License. See LICENSE file in the project root for full license information.
//

use crate::store::storage::Storage;
use std::fs::{self, File};
use std::io::{self, Write};
use std::path::Path;

/// One JSON file per key in a base directory
#[derive(Clone)]
pub struct FileStorage {
    pub basepath: String,
}

impl FileStorage {
    fn fullpath(&self, key: &str) -> String {
        format!("{}/{}.json", self.basepath, key)
    }
}

impl Storage for FileStorage {
    fn info(&self) -> String {
        format!("State directory: {}", self.basepath)
    }
    fn read(&self, key: &str) -> Option<String> {
        let fullpath = self.fullpath(key);
        debug!("FileStorage.read {}", fullpath);
        fs::read_to_string(&fullpath).ok()
    }
    fn write(&self, key: &str, value: &str) -> Result<(), io::Error> {
        let fullpath = self.fullpath(key);
        debug!("FileStorage.write {}", fullpath);
        fs::create_dir_all(Path::new(&self.basepath))?;
        // replace atomically
        let tmppath = format!("{}.tmp", fullpath);
        let mut f = File::create(&tmppath)?;
        f.write_all(value.as_bytes())?;
        f.sync_all()?;
        fs::rename(&tmppath, &fullpath)
    }
}
