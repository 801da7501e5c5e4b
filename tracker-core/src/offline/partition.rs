//
// Copyright (c) Pirmin Kalberer. All rights reserved.
// Licensed under the MIT License. See LICENSE file in the project root for full license information.
//

use std::fs::{self, File};
use std::io::{self, Read, Write};
use std::path::Path;

/// Named cache partition stored in a directory below `basepath`
#[derive(Clone, Debug)]
pub struct Partition {
    pub basepath: String,
    pub name: String,
}

impl Partition {
    pub fn new(basepath: &str, name: &str) -> Partition {
        Partition {
            basepath: basepath.to_string(),
            name: name.to_string(),
        }
    }
    pub fn info(&self) -> String {
        format!("Cache partition `{}` in {}", self.name, self.basepath)
    }
    fn fullpath(&self, path: &str) -> String {
        format!("{}/{}/{}", self.basepath, self.name, path)
    }
    pub fn read<F>(&self, path: &str, mut read: F) -> bool
    where
        F: FnMut(&mut dyn Read),
    {
        let fullpath = self.fullpath(path);
        debug!("Partition.read {}", fullpath);
        match File::open(&fullpath) {
            Ok(mut f) => {
                read(&mut f);
                true
            }
            Err(_e) => false,
        }
    }
    pub fn write(&self, path: &str, obj: &[u8]) -> Result<(), io::Error> {
        let fullpath = self.fullpath(path);
        debug!("Partition.write {}", fullpath);
        let p = Path::new(&fullpath);
        if let Some(parent) = p.parent() {
            fs::create_dir_all(parent)?;
        }
        let mut f = File::create(&fullpath)?;
        f.write_all(obj)
    }
    pub fn exists(&self, path: &str) -> bool {
        Path::new(&self.fullpath(path)).exists()
    }
    /// Remove the partition with all entries
    pub fn delete(&self) -> Result<(), io::Error> {
        let dir = format!("{}/{}", self.basepath, self.name);
        match fs::remove_dir_all(&dir) {
            Err(ref e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            result => result,
        }
    }
}

/// Names of all partitions found in `basepath`
pub fn list_partitions(basepath: &str) -> Result<Vec<String>, io::Error> {
    let entries = match fs::read_dir(basepath) {
        Ok(entries) => entries,
        Err(ref e) if e.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
        Err(e) => return Err(e),
    };
    let mut names = Vec::new();
    for entry in entries {
        let entry = entry?;
        if entry.file_type()?.is_dir() {
            names.push(entry.file_name().to_string_lossy().into_owned());
        }
    }
    names.sort();
    Ok(names)
}
