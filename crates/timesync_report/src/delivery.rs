//! Delivery modes: one-shot export to disk and the HTTP export service.

use std::net::SocketAddr;
use std::path::Path;
use std::sync::Arc;

use axum::extract::State;
use axum::http::{StatusCode, header};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use chrono::{Local, NaiveDateTime};
use serde::Serialize;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::{error, info};

use crate::builder::{build_report_bytes, build_report_file};
use crate::conf::{
    C_EXPORT_ERROR, C_FILE_DOWNLOAD_PREFIX, C_MIME_XLSX, C_ROUTE_EXPORT, C_ROUTE_HEALTH,
    C_SERVICE_NAME, C_STATUS_HEALTHY,
};
use crate::spec::{ReportError, SpecReportContext};

////////////////////////////////////////////////////////////////////////////////
// #region ScriptMode

/// Generate the report once and write it to `path`.
pub async fn run_export(ctx: &SpecReportContext, path: &Path) -> Result<(), ReportError> {
    build_report_file(ctx, path).await?;
    println!("Relatório gerado com sucesso: {}", path.display());
    Ok(())
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region ServiceMode

#[derive(Debug, Serialize)]
struct HealthResponse {
    status: &'static str,
    service: &'static str,
}

#[derive(Debug, Serialize)]
struct ExportErrorResponse {
    error: &'static str,
    details: String,
    traceback: String,
}

/// Build the HTTP router over a shared, read-only report context.
pub fn create_report_router(ctx: Arc<SpecReportContext>) -> Router {
    Router::new()
        .route(C_ROUTE_EXPORT, get(export_report))
        .route(C_ROUTE_HEALTH, get(health_check))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(ctx)
}

/// Bind `host:port` and serve until Ctrl-C.
pub async fn serve(ctx: SpecReportContext, host: &str, port: u16) -> Result<(), ReportError> {
    let router = create_report_router(Arc::new(ctx));
    let listener = tokio::net::TcpListener::bind((host, port)).await?;
    let addr: SocketAddr = listener.local_addr()?;
    info!(%addr, "report export service listening");

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        error!(error = %err, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    info!("shutdown signal received");
}

async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: C_STATUS_HEALTHY,
        service: C_SERVICE_NAME,
    })
}

async fn export_report(State(ctx): State<Arc<SpecReportContext>>) -> Response {
    match build_report_bytes(&ctx).await {
        Ok(v_bytes) => {
            let c_file_name = derive_download_file_name(Local::now().naive_local());
            (
                [
                    (header::CONTENT_TYPE, C_MIME_XLSX.to_string()),
                    (
                        header::CONTENT_DISPOSITION,
                        format!("attachment; filename={c_file_name}"),
                    ),
                ],
                v_bytes,
            )
                .into_response()
        }
        Err(err) => {
            let c_traceback = err.to_chain_text();
            error!(error = %err, traceback = %c_traceback, "report export failed");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ExportErrorResponse {
                    error: C_EXPORT_ERROR,
                    details: err.to_string(),
                    traceback: c_traceback,
                }),
            )
                .into_response()
        }
    }
}

/// `Relatorio_Timesync_<YYYYMMDD_HHMMSS>.xlsx`
pub fn derive_download_file_name(now: NaiveDateTime) -> String {
    format!(
        "{C_FILE_DOWNLOAD_PREFIX}_{}.xlsx",
        now.format("%Y%m%d_%H%M%S")
    )
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
