//
// Copyright (c) Pirmin Kalberer. All rights reserved.
// Licensed under the MIT License. See LICENSE file in the project root for full license information.
//

use std::collections::HashMap;

/// Application shell embedded into the binary
pub struct StaticFiles {
    files: HashMap<&'static str, (&'static [u8], &'static str)>,
}

impl StaticFiles {
    pub fn init() -> StaticFiles {
        let mut static_files = StaticFiles {
            files: HashMap::new(),
        };
        static_files.add(
            "index.html",
            include_bytes!("static/index.html"),
            "text/html; charset=utf-8",
        );
        static_files.add(
            "viewer.js",
            include_bytes!("static/viewer.js"),
            "application/javascript",
        );
        static_files.add(
            "viewer.css",
            include_bytes!("static/viewer.css"),
            "text/css",
        );
        static_files.add(
            "manifest.webmanifest",
            include_bytes!("static/manifest.webmanifest"),
            "application/manifest+json",
        );
        static_files.add(
            "icon.svg",
            include_bytes!("static/icon.svg"),
            "image/svg+xml",
        );
        static_files
    }
    fn add(&mut self, name: &'static str, data: &'static [u8], media_type: &'static str) {
        self.files.insert(name, (data, media_type));
    }
    pub fn content(&self, name: &str) -> Option<&(&[u8], &str)> {
        let key = if name == "" { "index.html" } else { name };
        self.files.get(key)
    }
}

#[test]
fn test_shell_files() {
    let files = StaticFiles::init();
    assert_eq!(files.content("").map(|c| c.1), Some("text/html; charset=utf-8"));
    assert!(files.content("viewer.js").is_some());
    assert!(files.content("maputnik.html").is_none());
}
