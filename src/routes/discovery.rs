use actix_web::{web, HttpResponse, Responder};
use validator::Validate;
use crate::core::{DiscoveryEngine, DiscoveryError};
use crate::models::{
    DiscoveryParams, ErrorResponse, FeedQuery, HealthResponse, RefreshRequest, RefreshResponse,
    ViewerProfile,
};
use crate::services::{FeedRegistry, ProfileStore, StoreError, ViewerCache};
use std::sync::Arc;

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn ProfileStore>,
    pub engine: DiscoveryEngine,
    pub viewers: ViewerCache,
    pub feeds: FeedRegistry,
    pub limits: RequestLimits,
}

/// Upper bounds on caller-supplied parameters
#[derive(Debug, Clone, Copy)]
pub struct RequestLimits {
    pub max_radius_km: f64,
    pub max_candidate_cap: usize,
}

/// Configure all discovery routes
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg
        .route("/health", web::get().to(health_check))
        .route("/discovery/refresh", web::post().to(refresh))
        .route("/discovery/feed", web::get().to(get_feed))
        .route("/discovery/viewers/{user_id}/cache", web::delete().to(invalidate_viewer));
}

fn error_response(status: actix_web::http::StatusCode, error: &str, message: String) -> HttpResponse {
    HttpResponse::build(status).json(ErrorResponse {
        error: error.to_string(),
        message,
        status_code: status.as_u16(),
    })
}

/// Health check endpoint
async fn health_check(state: web::Data<AppState>) -> impl Responder {
    let store_healthy = state.store.health_check().await.unwrap_or(false);

    let status = if store_healthy { "healthy" } else { "degraded" };

    HttpResponse::Ok().json(HealthResponse {
        status: status.to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        backend: state.engine.backend_tag().to_string(),
        timestamp: chrono::Utc::now(),
    })
}

/// Viewer from cache, falling back to the store
async fn load_viewer(state: &AppState, user_id: &str) -> Result<ViewerProfile, StoreError> {
    if let Some(viewer) = state.viewers.get(user_id).await {
        return Ok(viewer);
    }

    let viewer = state.store.fetch_viewer(user_id).await?;
    state.viewers.insert(viewer.clone()).await;
    Ok(viewer)
}

/// Resolve request overrides against engine defaults and configured limits
fn resolve_params(state: &AppState, req: &RefreshRequest) -> Result<DiscoveryParams, String> {
    let mut params = state.engine.options().default_params();

    if let Some(radius_km) = req.radius_km {
        if radius_km > state.limits.max_radius_km {
            return Err(format!("radiusKm must be at most {}", state.limits.max_radius_km));
        }
        params.radius_km = radius_km;
    }
    if let Some(limit) = req.limit {
        if limit > state.limits.max_candidate_cap {
            return Err(format!("limit must be at most {}", state.limits.max_candidate_cap));
        }
        params.limit = limit;
    }

    Ok(params)
}

/// Refresh endpoint
///
/// POST /api/v1/discovery/refresh
///
/// Request body:
/// ```json
/// {
///   "userId": "string",
///   "radiusKm": 50,
///   "limit": 200
/// }
/// ```
async fn refresh(
    state: web::Data<AppState>,
    req: web::Json<RefreshRequest>,
) -> impl Responder {
    use actix_web::http::StatusCode;

    if let Err(errors) = req.validate() {
        return error_response(StatusCode::BAD_REQUEST, "Validation failed", errors.to_string());
    }

    let params = match resolve_params(&state, &req) {
        Ok(params) => params,
        Err(message) => return error_response(StatusCode::BAD_REQUEST, "Validation failed", message),
    };

    let request_id = uuid::Uuid::new_v4();
    let user_id = &req.user_id;

    tracing::info!(
        "[{}] Refreshing candidates for user: {}, radius: {}km, limit: {}",
        request_id,
        user_id,
        params.radius_km,
        params.limit
    );

    let viewer = match load_viewer(&state, user_id).await {
        Ok(viewer) => viewer,
        Err(StoreError::NotFound(message)) => {
            return error_response(StatusCode::NOT_FOUND, "Viewer not found", message);
        }
        Err(e) => {
            tracing::error!("[{}] Failed to fetch profile for {}: {}", request_id, user_id, e);
            return error_response(StatusCode::BAD_GATEWAY, "Failed to fetch viewer profile", e.to_string());
        }
    };

    let feed = state.feeds.feed_for(user_id).await;
    let outcome = state.engine.refresh(&feed, &viewer, &params).await;

    match outcome.result {
        Ok(candidates) => {
            tracing::info!(
                "[{}] Returning {} candidates for user {} (generation {}, applied: {})",
                request_id,
                candidates.len(),
                user_id,
                outcome.generation,
                outcome.applied
            );

            HttpResponse::Ok().json(RefreshResponse {
                generation: outcome.generation,
                applied: outcome.applied,
                total_results: candidates.len(),
                candidates,
            })
        }
        Err(e @ DiscoveryError::FetchFailed(_)) => {
            tracing::error!("[{}] Discovery failed for {}: {}", request_id, user_id, e);
            error_response(StatusCode::BAD_GATEWAY, "fetch_failed", e.to_string())
        }
        Err(e @ DiscoveryError::LocationUnknown { .. }) => {
            error_response(StatusCode::UNPROCESSABLE_ENTITY, "location_unknown", e.to_string())
        }
    }
}

/// Current feed for a viewer
///
/// GET /api/v1/discovery/feed?userId={userId}
async fn get_feed(
    state: web::Data<AppState>,
    query: web::Query<FeedQuery>,
) -> impl Responder {
    match state.feeds.existing(&query.user_id).await {
        Some(feed) => HttpResponse::Ok().json(feed.snapshot().await),
        None => error_response(
            actix_web::http::StatusCode::NOT_FOUND,
            "Feed not found",
            format!("No discovery has run for user {}", query.user_id),
        ),
    }
}

/// Drop a cached viewer so the next refresh re-reads preferences
///
/// DELETE /api/v1/discovery/viewers/{userId}/cache
async fn invalidate_viewer(
    state: web::Data<AppState>,
    path: web::Path<String>,
) -> impl Responder {
    state.viewers.invalidate(&path.into_inner()).await;
    HttpResponse::NoContent().finish()
}
