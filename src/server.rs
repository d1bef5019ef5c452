use axum::{
    extract::State,
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tracing::warn;

use viralscope::config::AppConfig;
use viralscope::error::AnalysisError;
use viralscope::pipeline::Analyzer;
use viralscope::platforms::{PlatformClient, VkClient, XClient, YouTubeClient};
use viralscope::scoring::ViralityScorer;
use viralscope::session::{Nav, NavError, SessionStore};
use viralscope::trends::{TrendingVideo, TrendsAnalyzer};

use crate::api::{
    AnalysisRequest, AnalysisResponse, ErrorResponse, TrendsNavRequest, TrendsNavResponse,
    TrendsRequest,
};

type ApiError = (StatusCode, Json<ErrorResponse>);

#[derive(Clone)]
struct AppState {
    youtube: Option<YouTubeClient>,
    x: Option<XClient>,
    vk: Option<VkClient>,
    analyzer: Arc<Analyzer>,
    trends: Arc<TrendsAnalyzer>,
    trend_sessions: Arc<SessionStore<TrendingVideo>>,
    trending_pool: u32,
}

pub async fn serve(args: crate::ServeArgs, config: AppConfig) -> Result<(), String> {
    let state = AppState {
        youtube: client_from_env("youtube", YouTubeClient::from_env()),
        x: client_from_env("x", XClient::from_env()),
        vk: client_from_env("vk", VkClient::from_env()),
        analyzer: Arc::new(Analyzer::new(
            ViralityScorer::new(config.scoring.clone()),
            config.search.candidate_pool,
        )),
        trends: Arc::new(TrendsAnalyzer::new(ViralityScorer::new(
            config.scoring.clone(),
        ))),
        trend_sessions: Arc::new(SessionStore::new(config.session.capacity)),
        trending_pool: config.search.trending_pool,
    };

    let app = Router::new()
        .route("/api/health", get(health))
        .route("/calc", post(calc_youtube))
        .route("/calc/vk", post(calc_vk))
        .route("/calc/x", post(calc_x))
        .route("/trends", post(trends_start))
        .route("/trends/nav", post(trends_nav))
        .layer(CorsLayer::permissive())
        .with_state(state);

    let addr: SocketAddr = format!("{}:{}", args.host, args.port)
        .parse()
        .map_err(|err| format!("invalid bind address: {}", err))?;

    tracing::info!(%addr, "listening");
    axum::serve(
        tokio::net::TcpListener::bind(addr)
            .await
            .map_err(|err| format!("failed to bind server: {}", err))?,
        app,
    )
    .await
    .map_err(|err| format!("server error: {}", err))?;

    Ok(())
}

fn client_from_env<T>(
    platform: &str,
    result: Result<T, viralscope::error::PlatformError>,
) -> Option<T> {
    match result {
        Ok(client) => Some(client),
        Err(err) => {
            warn!(platform, error = %err, "platform client not configured");
            None
        }
    }
}

async fn health() -> impl IntoResponse {
    StatusCode::OK
}

async fn calc_youtube(
    State(state): State<AppState>,
    Json(request): Json<AnalysisRequest>,
) -> Result<Json<AnalysisResponse>, ApiError> {
    let client = state.youtube.as_ref().map(|c| c as &dyn PlatformClient);
    run_calc(&state.analyzer, client, request).await
}

async fn calc_vk(
    State(state): State<AppState>,
    Json(request): Json<AnalysisRequest>,
) -> Result<Json<AnalysisResponse>, ApiError> {
    let client = state.vk.as_ref().map(|c| c as &dyn PlatformClient);
    run_calc(&state.analyzer, client, request).await
}

async fn calc_x(
    State(state): State<AppState>,
    Json(request): Json<AnalysisRequest>,
) -> Result<Json<AnalysisResponse>, ApiError> {
    let client = state.x.as_ref().map(|c| c as &dyn PlatformClient);
    run_calc(&state.analyzer, client, request).await
}

async fn run_calc(
    analyzer: &Analyzer,
    client: Option<&dyn PlatformClient>,
    request: AnalysisRequest,
) -> Result<Json<AnalysisResponse>, ApiError> {
    let client = client.ok_or_else(not_configured)?;
    let params = request.into_params().map_err(invalid_request)?;

    let competitors = analyzer
        .run(client, &params)
        .await
        .map_err(analysis_error)?;

    Ok(Json(AnalysisResponse {
        count: competitors.len(),
        competitors,
    }))
}

async fn trends_start(
    State(state): State<AppState>,
    Json(request): Json<TrendsRequest>,
) -> Result<Json<TrendsNavResponse>, ApiError> {
    let client = state.youtube.as_ref().ok_or_else(not_configured)?;
    let max_results = request.max_results.unwrap_or(state.trending_pool);

    let videos = state
        .trends
        .run(client, &request.region.trim().to_uppercase(), max_results)
        .await
        .map_err(analysis_error)?;

    match state.trend_sessions.start(request.user_key, videos) {
        Some(page) => Ok(Json(TrendsNavResponse::page(
            page.position,
            page.total,
            page.item,
        ))),
        None => Err(analysis_error(AnalysisError::NoCandidates)),
    }
}

async fn trends_nav(
    State(state): State<AppState>,
    Json(request): Json<TrendsNavRequest>,
) -> Result<Json<TrendsNavResponse>, ApiError> {
    let sessions = &state.trend_sessions;
    let nav = match request.action.as_str() {
        "next" => sessions.next(request.user_key),
        "prev" => sessions.prev(request.user_key),
        "current" => sessions.current(request.user_key),
        "jump" => {
            let index = request
                .index
                .ok_or_else(|| invalid_request("jump requires an index".to_string()))?;
            return match sessions.jump_to(request.user_key, index) {
                Ok(page) => Ok(Json(TrendsNavResponse::page(
                    page.position,
                    page.total,
                    page.item,
                ))),
                Err(err) => Err(nav_error(err)),
            };
        }
        other => {
            return Err(invalid_request(format!("unknown action: {}", other)));
        }
    };

    match nav {
        Nav::Page(page) => Ok(Json(TrendsNavResponse::page(
            page.position,
            page.total,
            page.item,
        ))),
        Nav::EndOfList => Ok(Json(TrendsNavResponse::status("end_of_list"))),
        Nav::StartOfList => Ok(Json(TrendsNavResponse::status("start_of_list"))),
        Nav::NoSession => Err(nav_error(NavError::NoSession)),
    }
}

fn analysis_error(err: AnalysisError) -> ApiError {
    let status = match err {
        AnalysisError::UpstreamUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
        AnalysisError::NoCandidates | AnalysisError::NoneMatchedFilters => StatusCode::NOT_FOUND,
    };
    (
        status,
        Json(ErrorResponse {
            code: err.code(),
            message: err.to_string(),
        }),
    )
}

fn nav_error(err: NavError) -> ApiError {
    let (status, code) = match err {
        NavError::NoSession => (StatusCode::NOT_FOUND, "no_session"),
        NavError::OutOfRange { .. } => (StatusCode::BAD_REQUEST, "out_of_range"),
        NavError::NoSubItems => (StatusCode::NOT_FOUND, "no_sub_items"),
    };
    (
        status,
        Json(ErrorResponse {
            code,
            message: err.to_string(),
        }),
    )
}

fn not_configured() -> ApiError {
    (
        StatusCode::SERVICE_UNAVAILABLE,
        Json(ErrorResponse {
            code: "upstream_unavailable",
            message: "platform client is not configured".to_string(),
        }),
    )
}

fn invalid_request(message: String) -> ApiError {
    (
        StatusCode::BAD_REQUEST,
        Json(ErrorResponse {
            code: "invalid_request",
            message,
        }),
    )
}
