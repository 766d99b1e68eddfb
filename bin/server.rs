// Payroll Register Analyzer - Web Server
// JSON API + static single-page UI

use axum::{
    http::{header, HeaderName, HeaderValue, StatusCode},
    response::{Html, IntoResponse, Json},
    routing::{get, post},
    Router,
};
use serde::{Deserialize, Serialize};
use tower::ServiceBuilder;
use tower_http::cors::CorsLayer;
use tower_http::services::ServeDir;
use tower_http::set_header::SetResponseHeaderLayer;
use tracing::{error, info};

use payroll_analyzer::{
    analyze, bank_rows_csv, parse_document, render, AnalysisResponse, EntityKind, Meta, Person,
};

const CONTENT_SECURITY_POLICY: &str = "default-src 'self'; img-src 'self' data:; \
    style-src 'self' 'unsafe-inline'; script-src 'self' 'unsafe-inline'; \
    base-uri 'none'; frame-ancestors 'none'";

/// POST /api/parse request body
#[derive(Deserialize)]
struct ParseRequest {
    #[serde(rename = "type")]
    kind: EntityKind,
    #[serde(default)]
    text: String,
}

#[derive(Serialize)]
struct ParseResponse {
    meta: Meta,
    people: Vec<Person>,
}

/// POST /api/analyze and /api/export/bank request body
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct AnalyzeRequest {
    #[serde(rename = "type")]
    kind: EntityKind,
    meta: Meta,
    people: Vec<Person>,
    #[serde(default)]
    selected_index: Option<i64>,
    /// Reserved for a future admin-exclusion policy; accepted but unused.
    #[serde(default)]
    admin_index: Option<i64>,
}

// ============================================================================
// API Handlers
// ============================================================================

/// GET /api/health - Health check
async fn health_check() -> impl IntoResponse {
    Json(serde_json::json!({ "status": "ok" }))
}

/// POST /api/parse - Extract metadata and person records from raw text
async fn api_parse(Json(request): Json<ParseRequest>) -> Json<ParseResponse> {
    let (meta, people) = parse_document(&request.text);
    info!(
        kind = request.kind.code(),
        chars = request.text.len(),
        people = people.len(),
        "parsed register text"
    );
    Json(ParseResponse { meta, people })
}

/// POST /api/analyze - Aggregate a person list into the journal entry
async fn api_analyze(Json(request): Json<AnalyzeRequest>) -> Json<AnalysisResponse> {
    info!(
        kind = request.kind.code(),
        people = request.people.len(),
        selected = request.selected_index,
        admin = request.admin_index,
        "running analysis"
    );
    let analysis = analyze(
        request.kind,
        &request.meta,
        &request.people,
        request.selected_index,
    );
    Json(render(&analysis))
}

/// POST /api/export/bank - Bank-transfer rows as a CSV attachment
async fn api_export_bank(Json(request): Json<AnalyzeRequest>) -> impl IntoResponse {
    let analysis = analyze(
        request.kind,
        &request.meta,
        &request.people,
        request.selected_index,
    );
    match bank_rows_csv(&analysis.bank_rows) {
        Ok(bytes) => (
            StatusCode::OK,
            [
                (
                    header::CONTENT_TYPE,
                    HeaderValue::from_static("text/csv; charset=utf-8"),
                ),
                (
                    header::CONTENT_DISPOSITION,
                    HeaderValue::from_static("attachment; filename=\"bank-transfers.csv\""),
                ),
            ],
            bytes,
        )
            .into_response(),
        Err(e) => {
            error!("bank CSV encoding failed: {e}");
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}

/// GET / - Serve index.html
async fn serve_index() -> impl IntoResponse {
    Html(include_str!("../web/index.html"))
}

// ============================================================================
// Main Server
// ============================================================================

fn app() -> Router {
    let api_routes = Router::new()
        .route("/health", get(health_check))
        .route("/parse", post(api_parse))
        .route("/analyze", post(api_analyze))
        .route("/export/bank", post(api_export_bank));

    Router::new()
        .route("/", get(serve_index))
        .nest("/api", api_routes)
        .nest_service("/static", ServeDir::new("web"))
        .layer(
            ServiceBuilder::new()
                .layer(CorsLayer::permissive())
                .layer(SetResponseHeaderLayer::overriding(
                    header::CONTENT_SECURITY_POLICY,
                    HeaderValue::from_static(CONTENT_SECURITY_POLICY),
                ))
                .layer(SetResponseHeaderLayer::overriding(
                    header::X_CONTENT_TYPE_OPTIONS,
                    HeaderValue::from_static("nosniff"),
                ))
                .layer(SetResponseHeaderLayer::overriding(
                    header::X_FRAME_OPTIONS,
                    HeaderValue::from_static("DENY"),
                ))
                .layer(SetResponseHeaderLayer::overriding(
                    header::REFERRER_POLICY,
                    HeaderValue::from_static("no-referrer"),
                ))
                .layer(SetResponseHeaderLayer::overriding(
                    HeaderName::from_static("permissions-policy"),
                    HeaderValue::from_static("geolocation=(), microphone=(), camera=()"),
                )),
        )
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("payroll_server=info,tower_http=info")),
        )
        .init();

    let addr = std::env::var("PAYROLL_ADDR").unwrap_or_else(|_| "0.0.0.0:3000".to_string());
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .expect("Failed to bind to address");

    info!("payroll server listening on http://{addr}");
    info!("API: /api/parse, /api/analyze, /api/export/bank");

    axum::serve(listener, app())
        .await
        .expect("Failed to start server");
}
