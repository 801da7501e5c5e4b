//
// Copyright (c) Pirmin Kalberer. All rights reserved.
// Licensed under the MIT License. See LICENSE file in the project root for full license information.
//

use crate::capability::{InstallAffordance, InstallOutcome, InstallPrompt};
use crate::core::config::default_allowed_hosts;
use crate::fetch::HttpFetch;
use crate::offline::{is_allowed_host, Fetch, OfflineCache, Request, Route};
use crate::runtime_config::{
    config_from_args, offline_cache_from_config, session_from_config, Session,
};
use crate::static_files::StaticFiles;
use crate::tracker::{LocationError, PositionFix, RenderEvent, SystemClock, Toggles};
use actix_web::http::{header, StatusCode};
use actix_web::{middleware, rt, web, App, HttpRequest, HttpResponse, HttpServer};
use clap::ArgMatches;
use open;
use std::process;
use std::str::FromStr;
use std::sync::{Mutex, MutexGuard};
use tile_grid::Extent;
use url::Url;

lazy_static! {
    static ref STATIC_FILES: StaticFiles = StaticFiles::init();
}

pub const EXPORT_FILE_NAME: &str = "tile-tracker-session.geojson";

/// Shared tracker session
pub type SessionData = web::Data<Mutex<Session>>;

/// Install button state shared by all clients
pub type InstallData = web::Data<Mutex<InstallAffordance>>;

/// Prompt deferred by the browser. Shown by the client on `install_prompt`.
struct ClientPrompt;

impl InstallPrompt for ClientPrompt {
    fn prompt(&mut self) {
        debug!("Requesting install prompt from client");
    }
}

/// Offline cache and network client used by the proxy
pub struct ProxyState {
    pub cache: Option<OfflineCache>,
    pub fetch: Box<dyn Fetch + Send + Sync>,
    /// Hosts forwarded without offline cache
    pub allowed_hosts: Vec<String>,
}

impl ProxyState {
    /// Requests the proxy answers. Everything else is refused.
    fn forwards(&self, req: &Request) -> bool {
        match self.cache {
            Some(ref cache) => cache.route(req) != Route::PassThrough,
            None => match Url::parse(&req.url) {
                Ok(url) => is_allowed_host(&url, &self.allowed_hosts),
                Err(_) => false,
            },
        }
    }
}

#[derive(Deserialize)]
struct LocationErrorMsg {
    code: u16,
    message: Option<String>,
}

#[derive(Deserialize)]
struct ViewportMsg {
    west: f64,
    south: f64,
    east: f64,
    north: f64,
}

#[derive(Deserialize)]
struct VisibilityMsg {
    visible: bool,
}

#[derive(Deserialize)]
struct InstallChoiceMsg {
    outcome: InstallOutcome,
}

#[derive(Deserialize)]
struct ImportParams {
    name: String,
}

#[derive(Deserialize)]
struct ProxyParams {
    url: String,
}

fn lock<T>(data: &Mutex<T>) -> MutexGuard<'_, T> {
    match data.lock() {
        Ok(guard) => guard,
        Err(poisoned) => poisoned.into_inner(),
    }
}

/// Run an operation and respond with the render events it produced
fn with_session<F>(session: &SessionData, op: F) -> HttpResponse
where
    F: FnOnce(&mut Session),
{
    let mut session = lock(session);
    op(&mut session);
    let events: Vec<RenderEvent> = session.view_mut().drain();
    HttpResponse::Ok().json(events)
}

async fn api_start(session: SessionData) -> HttpResponse {
    with_session(&session, |s| s.start())
}

async fn api_stop(session: SessionData) -> HttpResponse {
    with_session(&session, |s| s.stop())
}

async fn api_fix(session: SessionData, fix: web::Json<PositionFix>) -> HttpResponse {
    with_session(&session, |s| {
        s.on_fix(&fix);
    })
}

async fn api_error(session: SessionData, msg: web::Json<LocationErrorMsg>) -> HttpResponse {
    let err = LocationError::from_code(msg.code, msg.message.clone());
    with_session(&session, |s| s.on_location_error(&err))
}

async fn api_viewport(session: SessionData, msg: web::Json<ViewportMsg>) -> HttpResponse {
    let viewport = Extent {
        minx: msg.west,
        miny: msg.south,
        maxx: msg.east,
        maxy: msg.north,
    };
    with_session(&session, |s| s.on_viewport_changed(viewport))
}

async fn api_toggles(session: SessionData, toggles: web::Json<Toggles>) -> HttpResponse {
    with_session(&session, |s| s.set_toggles(*toggles))
}

async fn api_autocenter(session: SessionData) -> HttpResponse {
    with_session(&session, |s| s.toggle_auto_center())
}

async fn api_visibility(session: SessionData, msg: web::Json<VisibilityMsg>) -> HttpResponse {
    with_session(&session, |s| s.on_visibility_change(msg.visible))
}

async fn api_center(session: SessionData) -> HttpResponse {
    with_session(&session, |s| s.center_on_position())
}

async fn api_poll(session: SessionData) -> HttpResponse {
    with_session(&session, |s| s.poll_timers())
}

async fn api_import(
    session: SessionData,
    params: web::Query<ImportParams>,
    body: web::Bytes,
) -> HttpResponse {
    let mut session = lock(&session);
    let result = session.import_overlay(&params.name, &body);
    let events: Vec<RenderEvent> = session.view_mut().drain();
    match result {
        Ok(()) => HttpResponse::Ok().json(events),
        Err(_) => HttpResponse::UnprocessableEntity().json(events),
    }
}

async fn api_install_available(install: InstallData) -> HttpResponse {
    let mut install = lock(&install);
    install.on_prompt_available(Box::new(ClientPrompt));
    HttpResponse::Ok().json(vec![RenderEvent::InstallAvailable {
        available: install.is_available(),
    }])
}

async fn api_install(install: InstallData) -> HttpResponse {
    let mut events = Vec::new();
    if lock(&install).trigger() {
        events.push(RenderEvent::InstallPrompt);
    }
    events.push(RenderEvent::InstallAvailable { available: false });
    HttpResponse::Ok().json(events)
}

async fn api_install_choice(
    install: InstallData,
    msg: web::Json<InstallChoiceMsg>,
) -> HttpResponse {
    lock(&install).on_user_choice(msg.outcome);
    HttpResponse::Ok().json(Vec::<RenderEvent>::new())
}

async fn api_installed(install: InstallData) -> HttpResponse {
    lock(&install).on_installed();
    HttpResponse::Ok().json(vec![RenderEvent::InstallAvailable { available: false }])
}

async fn api_visited(session: SessionData) -> HttpResponse {
    let geojson = lock(&session).export_visited();
    HttpResponse::Ok()
        .content_type("application/geo+json")
        .insert_header((
            header::CONTENT_DISPOSITION,
            format!("attachment; filename=\"{}\"", EXPORT_FILE_NAME),
        ))
        .body(geojson.to_string())
}

async fn api_clear(session: SessionData) -> HttpResponse {
    with_session(&session, |s| s.clear_visited())
}

async fn proxy(state: web::Data<ProxyState>, params: web::Query<ProxyParams>) -> HttpResponse {
    let req = Request::get(&params.url);
    if !state.forwards(&req) {
        info!("Proxy request {} refused", params.url);
        return HttpResponse::Forbidden().finish();
    }
    let result = web::block(move || match state.cache {
        Some(ref cache) => cache.handle(&req, &*state.fetch),
        None => state.fetch.fetch(&req),
    })
    .await;
    match result {
        Ok(Ok(res)) => {
            let mut builder = HttpResponse::build(
                StatusCode::from_u16(res.status).unwrap_or(StatusCode::BAD_GATEWAY),
            );
            if let Some(content_type) = res.content_type {
                builder.content_type(content_type);
            }
            builder.body(res.body)
        }
        Ok(Err(e)) => {
            warn!("Proxy request {} failed: {}", params.url, e);
            HttpResponse::BadGateway().finish()
        }
        Err(e) => {
            warn!("Proxy request {} failed: {}", params.url, e);
            HttpResponse::InternalServerError().finish()
        }
    }
}

async fn static_file(req: HttpRequest, max_age: web::Data<u32>) -> HttpResponse {
    let key = &req.path()[1..];
    if let Some(ref content) = STATIC_FILES.content(key) {
        HttpResponse::Ok()
            .content_type(content.1)
            .insert_header((header::CACHE_CONTROL, format!("max-age={}", max_age.get_ref())))
            .body(content.0)
    } else {
        HttpResponse::NotFound().finish()
    }
}

/// Routes of the tracker API and the application shell
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api")
            .route("/start", web::post().to(api_start))
            .route("/stop", web::post().to(api_stop))
            .route("/fix", web::post().to(api_fix))
            .route("/error", web::post().to(api_error))
            .route("/viewport", web::post().to(api_viewport))
            .route("/toggles", web::post().to(api_toggles))
            .route("/autocenter", web::post().to(api_autocenter))
            .route("/visibility", web::post().to(api_visibility))
            .route("/center", web::post().to(api_center))
            .route("/poll", web::post().to(api_poll))
            .route("/import", web::post().to(api_import))
            .route("/install", web::post().to(api_install))
            .route("/install/available", web::post().to(api_install_available))
            .route("/install/choice", web::post().to(api_install_choice))
            .route("/installed", web::post().to(api_installed))
            .route("/visited.geojson", web::get().to(api_visited))
            .route("/clear", web::post().to(api_clear)),
    )
    .route("/proxy", web::get().to(proxy))
    .route("/{file:.*}", web::get().to(static_file));
}

pub fn webserver(args: ArgMatches<'static>) {
    let config = config_from_args(&args);
    let host = config
        .webserver
        .bind
        .clone()
        .unwrap_or("127.0.0.1".to_string());
    let port = config.webserver.port.unwrap_or(6767);
    let bind_addr = format!("{}:{}", host, port);
    let openbrowser =
        bool::from_str(args.value_of("openbrowser").unwrap_or("true")).unwrap_or(false);
    let threads = config.webserver.threads.unwrap_or(4) as usize;
    let cache_max_age = config.webserver.cache_control_max_age.unwrap_or(300);

    let session = session_from_config(&config, Box::new(SystemClock)).unwrap_or_else(|err| {
        println!("Error reading configuration - {} ", err);
        process::exit(1)
    });
    let cache = offline_cache_from_config(&config).unwrap_or_else(|err| {
        println!("Error reading configuration - {} ", err);
        process::exit(1)
    });
    // created outside of the async runtime
    let fetch = HttpFetch::new().unwrap_or_else(|err| {
        println!("Error initializing HTTP client - {} ", err);
        process::exit(1)
    });
    if let Some(ref cache) = cache {
        info!("{}", cache.info());
        if let Err(e) = cache.activate() {
            warn!("Cleanup of offline cache failed: {}", e);
        }
    }
    let install = cache.is_some();
    let allowed_hosts = config
        .offline
        .as_ref()
        .map(|cfg| cfg.allowed_hosts.clone())
        .unwrap_or_else(default_allowed_hosts);
    let session = web::Data::new(Mutex::new(session));
    let install_data = web::Data::new(Mutex::new(InstallAffordance::new()));
    let proxy_state = web::Data::new(ProxyState {
        cache,
        fetch: Box::new(fetch),
        allowed_hosts,
    });
    let max_age = web::Data::new(cache_max_age);

    let result = rt::System::new().block_on(async move {
        let installer = proxy_state.clone();
        let server = HttpServer::new(move || {
            App::new()
                .app_data(session.clone())
                .app_data(install_data.clone())
                .app_data(proxy_state.clone())
                .app_data(max_age.clone())
                .app_data(web::PayloadConfig::new(16 * 1024 * 1024))
                .wrap(middleware::Logger::default())
                .configure(configure)
        })
        .workers(threads)
        .bind(&bind_addr)?
        .shutdown_timeout(3) // default: 30s
        .run();

        info!("Tile tracker listening on http://{}", bind_addr);
        if install {
            rt::spawn(async move {
                let result = web::block(move || match installer.cache {
                    Some(ref cache) => cache.install(&*installer.fetch),
                    None => Ok(0),
                })
                .await;
                match result {
                    Ok(Ok(_)) => {}
                    Ok(Err(e)) => warn!("Offline shell installation failed: {}", e),
                    Err(e) => warn!("Offline shell installation failed: {}", e),
                }
            });
        }
        if openbrowser {
            let _res = open::that(format!("http://{}:{}", &host, port));
        }
        server.await
    });
    if let Err(e) = result {
        println!("Can not start server on given IP/Port - {}", e);
        process::exit(1)
    }
}
