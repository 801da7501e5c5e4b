//
// Copyright (c) Pirmin Kalberer. All rights reserved.
// Licensed under the MIT License. See LICENSE file in the project root for full license information.
//

#[macro_use]
extern crate log;
#[macro_use]
extern crate lazy_static;
#[macro_use]
extern crate serde_derive;

use tracker_core::{capability, core, offline, store, tracker};

mod fetch;
mod runtime_config;
pub mod server;
mod static_files;

pub use crate::fetch::HttpFetch;
pub use crate::runtime_config::{
    config_from_args, gen_config, offline_cache_from_config, session_from_config, Session,
};
pub use crate::server::webserver;
