//! `modview serve` command implementation.
//!
//! Exposes the browser over HTTP for a web front end:
//!
//! - `GET  /api/projects`                       configured projects
//! - `POST /api/projects/refresh`               re-read the projects file
//! - `GET  /api/modules?pid=`                   dependency tree of a project
//! - `GET  /api/info?pid=&modpath=&npmmod=`     package.json of one package
//!
//! Every response is a JSON object with an `ok` flag; failures carry `code`
//! and `error`. Readmes are rendered to HTML.

use super::{open_browser, ErrorResult};
use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use miette::{IntoDiagnostic, Result};
use modview_core::pkg::{pkg_codes, MarkdownRenderer};
use modview_core::{Config, Error, InfoQuery, ModuleBrowser};
use serde::Deserialize;
use serde_json::json;
use std::net::SocketAddr;
use std::sync::Arc;
use tracing::{info, warn};

type AppState = Arc<ModuleBrowser>;

/// Run the HTTP server until interrupted.
pub fn run(config: &Config, host: &str, port: u16) -> Result<()> {
    let browser = Arc::new(open_browser(config, Arc::new(MarkdownRenderer)).into_diagnostic()?);

    let host_ip = if host == "localhost" { "127.0.0.1" } else { host };
    let addr: SocketAddr = format!("{host_ip}:{port}").parse().into_diagnostic()?;

    let runtime = tokio::runtime::Runtime::new().into_diagnostic()?;
    runtime.block_on(async move {
        let listener = tokio::net::TcpListener::bind(addr)
            .await
            .into_diagnostic()?;
        let local = listener.local_addr().into_diagnostic()?;
        info!(addr = %local, projects = browser.store().list().len(), "serving");
        println!("modview serving on http://{local}");
        println!("Press Ctrl+C to stop");

        axum::serve(listener, router(browser))
            .with_graceful_shutdown(shutdown_signal())
            .await
            .into_diagnostic()
    })
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "cannot listen for Ctrl+C");
        std::future::pending::<()>().await;
    }
}

/// Build the API router.
pub fn router(browser: AppState) -> Router {
    Router::new()
        .route("/api/projects", get(list_projects))
        .route("/api/projects/refresh", post(refresh_projects))
        .route("/api/modules", get(module_list))
        .route("/api/info", get(npm_info))
        .with_state(browser)
}

fn status_for(err: &Error) -> StatusCode {
    let (Error::Pkg(pkg) | Error::Lookup { source: pkg, .. }) = err else {
        return StatusCode::INTERNAL_SERVER_ERROR;
    };
    match pkg.code() {
        pkg_codes::PKG_QUERY_INVALID | pkg_codes::PKG_SPEC_INVALID => StatusCode::BAD_REQUEST,
        pkg_codes::PKG_REGISTRY_ERROR => StatusCode::BAD_GATEWAY,
        _ if pkg.is_not_found() || pkg.code() == pkg_codes::PKG_VERSION_NOT_FOUND => {
            StatusCode::NOT_FOUND
        }
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

fn error_response(err: &Error) -> Response {
    warn!(code = err.code(), error = %err, "request failed");
    (status_for(err), Json(ErrorResult::new(err))).into_response()
}

async fn list_projects(State(browser): State<AppState>) -> Response {
    let list = browser.store().list();
    Json(json!({ "ok": true, "projects": list.records() })).into_response()
}

async fn refresh_projects(State(browser): State<AppState>) -> Response {
    let store = Arc::clone(browser.store());
    let refreshed = tokio::task::spawn_blocking(move || store.refresh())
        .await
        .unwrap_or_else(|e| Err(Error::other(format!("refresh task failed: {e}"))));

    match refreshed {
        Ok(list) => Json(json!({ "ok": true, "projects": list.records() })).into_response(),
        Err(e) => error_response(&e),
    }
}

#[derive(Debug, Deserialize)]
struct ModulesQuery {
    pid: Option<String>,
}

async fn module_list(
    State(browser): State<AppState>,
    Query(query): Query<ModulesQuery>,
) -> Response {
    match browser.get_module_list(query.pid.as_deref()).await {
        Ok(modules) => Json(json!({ "ok": true, "modules": modules })).into_response(),
        Err(e) => error_response(&e),
    }
}

async fn npm_info(State(browser): State<AppState>, Query(query): Query<InfoQuery>) -> Response {
    match browser.get_npm_info(&query).await {
        Ok(info) => Json(json!({ "ok": true, "info": info })).into_response(),
        Err(e) => error_response(&e),
    }
}
