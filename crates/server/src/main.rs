use std::{net::SocketAddr, sync::Arc};

use anyhow::Context;
use axum::{
    extract::{Query, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use serde::Serialize;
use shared::{
    domain::CalculationResult,
    error::ErrorBody,
    protocol::{convert_route, fallback_convert_route, workbook_info_route},
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;

mod api;
mod config;
mod workbook;

use api::{ApiContext, ConvertQuery, FallbackQuery, WorkbookInfo};
use config::load_settings;
use workbook::UnavailableWorkbookEngine;

#[derive(Debug, Serialize)]
struct WelcomeResponse {
    message: &'static str,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt().with_env_filter("info").init();

    let settings = load_settings();
    info!(workbook = %settings.workbook_path.display(), "using workbook");
    let ctx = ApiContext {
        workbook_path: settings.workbook_path,
        engine: Arc::new(UnavailableWorkbookEngine),
    };
    let app = build_router(ctx);

    let addr = parse_bind_addr(&settings.server_bind)?;
    info!(%addr, "server listening");
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}

fn parse_bind_addr(bind: &str) -> anyhow::Result<SocketAddr> {
    bind.parse().with_context(|| format!("invalid bind address {bind:?}"))
}

fn build_router(ctx: ApiContext) -> Router {
    Router::new()
        .route("/", get(root))
        .route("/healthz", get(healthz))
        .route(convert_route(), get(http_convert))
        .route(fallback_convert_route(), get(http_fallback_convert))
        .route(workbook_info_route(), get(http_workbook_info))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(Arc::new(ctx))
}

async fn root() -> Json<WelcomeResponse> {
    Json(WelcomeResponse {
        message: "Bienvenue sur l'API de simulation de salaire Portalia",
    })
}

async fn healthz() -> &'static str {
    "ok"
}

async fn http_convert(
    State(ctx): State<Arc<ApiContext>>,
    Query(query): Query<ConvertQuery>,
) -> Result<Json<CalculationResult>, (StatusCode, Json<ErrorBody>)> {
    api::convert(&ctx, query).await.map(Json).map_err(|err| {
        let status = if err.is_client_error() {
            StatusCode::BAD_REQUEST
        } else {
            StatusCode::INTERNAL_SERVER_ERROR
        };
        (status, Json(err.body()))
    })
}

async fn http_fallback_convert(Query(query): Query<FallbackQuery>) -> Json<CalculationResult> {
    Json(api::fallback_convert(query))
}

async fn http_workbook_info(State(ctx): State<Arc<ApiContext>>) -> Json<WorkbookInfo> {
    Json(api::workbook_info(&ctx))
}

#[cfg(test)]
#[path = "tests/main_tests.rs"]
mod tests;
