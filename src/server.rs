//! HTTP surface: the upload page plus a small JSON/binary API.

use crate::config::ServerConfig;
use crate::error::{AnalysisError, AnalysisResult};
use crate::health;
use crate::pipeline::{self, Analysis};
use crate::report::{self, RenderedReport, SVG_CONTENT_TYPE, XLSX_CONTENT_TYPE};
use crate::state::AppState;
use crate::templates::{self, PAGE_TEMPLATE};
use crate::utils::format_percent;
use anyhow::Result;
use axum::{
    Json, Router,
    extract::{DefaultBodyLimit, Multipart, State, multipart::MultipartError},
    http::header,
    response::{Html, IntoResponse, Response},
    routing::{get, post},
};
use serde::Serialize;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::{info, warn};

/// Multipart field carrying the workbook.
pub const UPLOAD_FIELD: &str = "file";

pub fn router(config: Arc<ServerConfig>) -> Router {
    let body_limit = config.max_upload_bytes;
    Router::new()
        .route("/", get(index))
        .route("/analyze", post(analyze_page))
        .route("/api/analyze", post(api_analyze))
        .route("/api/report", post(api_report))
        .route("/api/chart", post(api_chart))
        .route("/health", get(health::liveness_handler))
        .layer(DefaultBodyLimit::max(body_limit))
        .with_state(AppState::new(config))
}

pub async fn run_server(config: ServerConfig) -> Result<()> {
    let config = Arc::new(config);
    let app = router(config.clone());

    let listener = TcpListener::bind(config.http_bind_address).await?;
    let actual_addr = listener.local_addr()?;
    info!(
        bind = %actual_addr,
        max_upload_bytes = config.max_upload_bytes,
        "listening"
    );

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("server stopped");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(error) = tokio::signal::ctrl_c().await {
            warn!(%error, "failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(error) => {
                warn!(%error, "failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("received SIGINT (Ctrl+C), initiating graceful shutdown");
        },
        _ = terminate => {
            info!("received SIGTERM, initiating graceful shutdown");
        },
    }
}

#[derive(Debug, Serialize)]
struct PageView<'a> {
    title: &'a str,
    error: Option<String>,
    result: Option<ResultView>,
}

#[derive(Debug, Serialize)]
struct ResultView {
    message: String,
    within_count: usize,
    breached_count: usize,
    average_hours: String,
    compliance: String,
    chart_svg: String,
    download_uri: String,
    file_name: String,
}

impl ResultView {
    fn new(analysis: &Analysis, rendered: &RenderedReport) -> Self {
        let summary = &analysis.summary;
        Self {
            message: analysis.success_message(),
            within_count: summary.within_count,
            breached_count: summary.breached_count,
            average_hours: format!("{:.2}h", summary.average_elapsed_hours),
            compliance: format_percent(summary.compliance_rate),
            chart_svg: rendered.chart.svg.clone(),
            download_uri: rendered.document.data_uri(),
            file_name: rendered.document.file_name.clone(),
        }
    }
}

fn render_page(
    config: &ServerConfig,
    error: Option<String>,
    result: Option<ResultView>,
) -> AnalysisResult<Html<String>> {
    let view = PageView {
        title: &config.title,
        error,
        result,
    };
    templates::render(PAGE_TEMPLATE, &view)
        .map(Html)
        .map_err(|err| AnalysisError::Document(format!("page template: {err}")))
}

async fn index(State(state): State<AppState>) -> AnalysisResult<Html<String>> {
    render_page(state.config(), None, None)
}

async fn analyze_page(State(state): State<AppState>, multipart: Multipart) -> Response {
    let outcome = match read_upload(multipart).await {
        Ok(bytes) => {
            let file_name = state.report_file_name();
            run_blocking(move || pipeline::generate_report(&bytes, &file_name)).await
        }
        Err(err) => Err(err),
    };

    let page = match outcome {
        Ok((analysis, rendered)) => {
            let view = ResultView::new(&analysis, &rendered);
            render_page(state.config(), None, Some(view)).map(IntoResponse::into_response)
        }
        Err(err) => {
            let status = err.code().status_code();
            info!(error.code = %err.code(), "analysis rejected: {}", err);
            render_page(state.config(), Some(err.to_string()), None)
                .map(|html| (status, html).into_response())
        }
    };
    page.unwrap_or_else(IntoResponse::into_response)
}

async fn api_analyze(multipart: Multipart) -> AnalysisResult<Json<Analysis>> {
    let bytes = read_upload(multipart).await?;
    let analysis = run_blocking(move || pipeline::analyze_bytes(&bytes)).await?;
    Ok(Json(analysis))
}

async fn api_report(State(state): State<AppState>, multipart: Multipart) -> AnalysisResult<Response> {
    let bytes = read_upload(multipart).await?;
    let file_name = state.report_file_name();
    let (_, rendered) =
        run_blocking(move || pipeline::generate_report(&bytes, &file_name)).await?;

    let document = rendered.document;
    let disposition = format!("attachment; filename=\"{}\"", document.file_name);
    let etag = format!("\"{}\"", document.sha256());
    Ok((
        [
            (header::CONTENT_TYPE, XLSX_CONTENT_TYPE.to_string()),
            (header::CONTENT_DISPOSITION, disposition),
            (header::ETAG, etag),
        ],
        document.bytes,
    )
        .into_response())
}

async fn api_chart(multipart: Multipart) -> AnalysisResult<Response> {
    let bytes = read_upload(multipart).await?;
    let svg = run_blocking(move || {
        let analysis = pipeline::analyze_bytes(&bytes)?;
        report::chart::render_chart(&analysis.summary)
    })
    .await?;
    Ok(([(header::CONTENT_TYPE, SVG_CONTENT_TYPE)], svg).into_response())
}

/// Pulls the workbook out of the `file` field. Other fields are ignored.
async fn read_upload(mut multipart: Multipart) -> AnalysisResult<Vec<u8>> {
    while let Some(field) = multipart.next_field().await.map_err(upload_error)? {
        if field.name() != Some(UPLOAD_FIELD) {
            continue;
        }
        let bytes = field.bytes().await.map_err(upload_error)?;
        if bytes.is_empty() {
            return Err(AnalysisError::InvalidRequest(
                "uploaded file is empty".to_string(),
            ));
        }
        return Ok(bytes.to_vec());
    }
    Err(AnalysisError::InvalidRequest(format!(
        "missing multipart field `{UPLOAD_FIELD}`"
    )))
}

fn upload_error(err: MultipartError) -> AnalysisError {
    AnalysisError::InvalidRequest(format!("invalid upload: {}", err.body_text()))
}

/// The pipeline is CPU-bound; keep it off the async workers.
async fn run_blocking<T, F>(task: F) -> AnalysisResult<T>
where
    F: FnOnce() -> AnalysisResult<T> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(task)
        .await
        .map_err(|err| AnalysisError::Document(format!("analysis task failed: {err}")))?
}
