//
// Copyright (c) Pirmin Kalberer. All rights reserved.
// Licensed under the MIT License. See LICENSE file in the project root for full license information.
//

use crate::offline::{Fetch, Request, Response};
use reqwest::blocking::Client;
use reqwest::header::CONTENT_TYPE;
use reqwest::redirect::Policy;
use reqwest::Method;
use std::io;
use std::str::FromStr;
use std::time::Duration;

/// Network access with a blocking HTTP client. Must not be created or dropped inside the async runtime.
#[derive(Clone)]
pub struct HttpFetch {
    client: Client,
}

fn io_error<E: std::fmt::Display>(e: E) -> io::Error {
    io::Error::new(io::ErrorKind::Other, e.to_string())
}

impl HttpFetch {
    pub fn new() -> Result<HttpFetch, io::Error> {
        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .user_agent(concat!("tile-tracker/", env!("CARGO_PKG_VERSION")))
            // redirects could leave the allowed hosts
            .redirect(Policy::none())
            .build()
            .map_err(io_error)?;
        Ok(HttpFetch { client })
    }
}

impl Fetch for HttpFetch {
    fn fetch(&self, req: &Request) -> Result<Response, io::Error> {
        debug!("{} {}", req.method, req.url);
        let method = Method::from_str(&req.method).map_err(io_error)?;
        let res = self
            .client
            .request(method, &req.url)
            .send()
            .map_err(io_error)?;
        let status = res.status().as_u16();
        let content_type = res
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|ct| ct.to_str().ok())
            .map(String::from);
        let body = res.bytes().map_err(io_error)?.to_vec();
        Ok(Response {
            status,
            content_type,
            body,
        })
    }
}
