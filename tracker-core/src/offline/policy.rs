//
// Copyright (c) Pirmin Kalberer. All rights reserved.
// Licensed under the MIT License. See LICENSE file in the project root for full license information.
//

//! Request routing of the installable web application

use crate::offline::partition::{list_partitions, Partition};
use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use std::io::{self, Read};
use url::Url;

#[derive(Clone, PartialEq, Debug)]
pub struct Request {
    pub method: String,
    pub url: String,
}

impl Request {
    pub fn get(url: &str) -> Request {
        Request {
            method: "GET".to_string(),
            url: url.to_string(),
        }
    }
}

#[derive(Clone, PartialEq, Debug)]
pub struct Response {
    pub status: u16,
    pub content_type: Option<String>,
    pub body: Vec<u8>,
}

impl Response {
    pub fn is_success(&self) -> bool {
        self.status >= 200 && self.status < 300
    }
}

/// Network access
pub trait Fetch {
    fn fetch(&self, req: &Request) -> Result<Response, io::Error>;
}

#[derive(PartialEq, Clone, Copy, Debug)]
pub enum Route {
    /// Not handled, forwarded to the network unchanged
    PassThrough,
    /// Application shell: cache, falling back to the network
    CacheFirst,
    /// Allow-listed third-party host: cached copy, network refresh on every request
    StaleWhileRevalidate,
}

pub struct OfflineCache {
    pub(crate) origin: Option<Url>,
    pub(crate) shell: Partition,
    pub(crate) dynamic: Partition,
    pub(crate) shell_resources: Vec<String>,
    pub(crate) allowed_hosts: Vec<String>,
}

fn invalid_input(msg: String) -> io::Error {
    io::Error::new(io::ErrorKind::InvalidInput, msg)
}

/// Characters kept unchanged in cache paths. `+` is free for markers.
const PATH_ENCODE_SET: &AsciiSet = &NON_ALPHANUMERIC.remove(b'.').remove(b'-').remove(b'_');

fn encode(s: &str) -> String {
    utf8_percent_encode(s, PATH_ENCODE_SET).to_string()
}

/// Partition relative storage path of a URL. Distinct URLs get distinct paths.
pub fn cache_path(url: &Url) -> String {
    let mut path = encode(url.host_str().unwrap_or(""));
    if let Some(port) = url.port() {
        path.push_str(&format!("+{}", port));
    }
    for segment in url.path().split('/').skip(1) {
        path.push('/');
        match segment {
            "" => path.push_str("+index"),
            "." => path.push_str("%2E"),
            ".." => path.push_str("%2E%2E"),
            segment => path.push_str(&encode(segment)),
        }
    }
    if let Some(query) = url.query() {
        path.push('+');
        path.push_str(&encode(query));
    }
    path
}

/// HTTP(S) URL with a host equal to an allow-list entry or a subdomain of it
pub fn is_allowed_host(url: &Url, allowed_hosts: &[String]) -> bool {
    if url.scheme() != "http" && url.scheme() != "https" {
        return false;
    }
    match url.host_str() {
        Some(host) => allowed_hosts.iter().any(|h| match host.strip_suffix(h.as_str()) {
            Some("") => true,
            Some(prefix) => prefix.ends_with('.'),
            None => false,
        }),
        None => false,
    }
}

impl OfflineCache {
    pub fn info(&self) -> String {
        format!("{}, {}", self.shell.info(), self.dynamic.info())
    }

    fn is_same_origin(&self, url: &Url) -> bool {
        match self.origin {
            Some(ref origin) => origin.origin() == url.origin(),
            None => false,
        }
    }

    fn is_allowed_host(&self, url: &Url) -> bool {
        is_allowed_host(url, &self.allowed_hosts)
    }

    pub fn route(&self, req: &Request) -> Route {
        if req.method != "GET" {
            return Route::PassThrough;
        }
        let url = match Url::parse(&req.url) {
            Ok(url) => url,
            Err(_) => return Route::PassThrough,
        };
        if self.is_same_origin(&url) {
            Route::CacheFirst
        } else if self.is_allowed_host(&url) {
            Route::StaleWhileRevalidate
        } else {
            Route::PassThrough
        }
    }

    /// Cached response. Unreadable entries are cache misses.
    fn lookup(&self, partition: &Partition, path: &str) -> Option<Response> {
        let mut body = Vec::new();
        let mut result = Ok(0);
        let found = partition.read(&format!("{}.body", path), |f| {
            result = f.read_to_end(&mut body);
        });
        if !found {
            return None;
        }
        if let Err(e) = result {
            warn!("Ignoring unreadable cache entry `{}`: {}", path, e);
            return None;
        }
        let mut content_type = String::new();
        let mut result = Ok(0);
        partition.read(&format!("{}.type", path), |f| {
            result = f.read_to_string(&mut content_type);
        });
        if let Err(e) = result {
            warn!("Ignoring unreadable cache entry `{}`: {}", path, e);
            return None;
        }
        Some(Response {
            status: 200,
            content_type: Some(content_type).filter(|ct| !ct.is_empty()),
            body,
        })
    }

    fn put(&self, partition: &Partition, path: &str, res: &Response) -> Result<(), io::Error> {
        partition.write(&format!("{}.body", path), &res.body)?;
        let content_type = res.content_type.as_ref().map(|ct| ct.as_str()).unwrap_or("");
        partition.write(&format!("{}.type", path), content_type.as_bytes())
    }

    /// Store a response. Failures are logged only.
    fn store(&self, partition: &Partition, path: &str, res: &Response) {
        if !res.is_success() {
            return;
        }
        if let Err(e) = self.put(partition, path, res) {
            warn!("Cache write of `{}` failed: {}", path, e);
        }
    }

    /// Answer a request according to its route
    pub fn handle<F: Fetch + ?Sized>(&self, req: &Request, fetch: &F) -> Result<Response, io::Error> {
        let route = self.route(req);
        if route == Route::PassThrough {
            return fetch.fetch(req);
        }
        let url = Url::parse(&req.url).map_err(|e| invalid_input(e.to_string()))?;
        let path = cache_path(&url);
        match route {
            Route::CacheFirst => {
                if let Some(hit) = self.lookup(&self.shell, &path) {
                    return Ok(hit);
                }
                let res = fetch.fetch(req)?;
                self.store(&self.shell, &path, &res);
                Ok(res)
            }
            Route::StaleWhileRevalidate => {
                let hit = self.lookup(&self.dynamic, &path);
                let fresh = fetch.fetch(req);
                if let Ok(ref res) = fresh {
                    self.store(&self.dynamic, &path, res);
                }
                match (hit, fresh) {
                    (Some(hit), Err(e)) => {
                        debug!("Refresh of {} failed: {}", req.url, e);
                        Ok(hit)
                    }
                    (Some(hit), Ok(_)) => Ok(hit),
                    (None, fresh) => fresh,
                }
            }
            Route::PassThrough => fetch.fetch(req),
        }
    }

    /// Pre-cache all shell resources. Fails if any resource can't be fetched.
    pub fn install<F: Fetch + ?Sized>(&self, fetch: &F) -> Result<usize, io::Error> {
        let origin = self
            .origin
            .as_ref()
            .ok_or_else(|| invalid_input("No origin configured".to_string()))?;
        let mut responses = Vec::new();
        for resource in &self.shell_resources {
            let url = origin
                .join(resource)
                .map_err(|e| invalid_input(format!("{}: {}", resource, e)))?;
            let res = fetch.fetch(&Request::get(url.as_str()))?;
            if !res.is_success() {
                return Err(io::Error::new(
                    io::ErrorKind::Other,
                    format!("{} returned status {}", url, res.status),
                ));
            }
            responses.push((cache_path(&url), res));
        }
        for (path, res) in &responses {
            self.put(&self.shell, path, res)?;
        }
        info!("{} shell resources cached", responses.len());
        Ok(responses.len())
    }

    /// Delete partitions of previous versions. Returns the deleted names.
    pub fn activate(&self) -> Result<Vec<String>, io::Error> {
        let mut deleted = Vec::new();
        for name in list_partitions(&self.shell.basepath)? {
            if name == self.shell.name || name == self.dynamic.name {
                continue;
            }
            info!("Deleting cache partition `{}`", name);
            Partition::new(&self.shell.basepath, &name).delete()?;
            deleted.push(name);
        }
        Ok(deleted)
    }
}
