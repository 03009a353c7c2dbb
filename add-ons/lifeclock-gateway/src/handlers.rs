//! Request handlers: report computation, PDF-export contract enforcement,
//! rate-limited checkout, funnel tracking, and the social-proof count.
//!
//! Collaborator failures (store, renderer, checkout upstream) are logged and
//! never abort a computation the user can still see locally. Pipeline input
//! errors surface as 422 so the client sends the user back through the quiz.

use crate::limiter::CheckoutLimiter;
use crate::social_proof::CachedSocialProof;
use crate::store::{ReportStore, StoredReport, TrackedEvent};
use axum::extract::{Json, Path, State};
use axum::http::{header, Method, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::Router;
use chrono::Utc;
use lifeclock_core::{assemble_report, PhaseResult, ReportConfig, ReportError, REVELATION_COUNT};
use serde::Deserialize;
use serde_json::json;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tracing::{debug, error, warn};

pub struct AppState {
    pub store: Arc<ReportStore>,
    pub limiter: CheckoutLimiter,
    pub social_proof: CachedSocialProof,
    pub report_config: ReportConfig,
    pub http: reqwest::Client,
    pub pdf_renderer_url: Option<String>,
    pub checkout_url: Option<String>,
}

pub fn build_app(state: Arc<AppState>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers(Any);

    Router::new()
        .route("/api/v1/health", get(health_get))
        .route("/api/v1/report", post(report_post))
        .route("/api/v1/report/:key", get(report_get))
        .route("/api/v1/export/pdf", post(export_pdf_post))
        .route("/api/v1/checkout", post(checkout_post))
        .route("/api/v1/track", post(track_post))
        .route("/api/v1/social-proof", get(social_proof_get))
        .with_state(state)
        .layer(cors)
}

fn bad_request(msg: &str) -> Response {
    (StatusCode::BAD_REQUEST, Json(json!({ "error": msg }))).into_response()
}

fn bad_gateway(msg: &str) -> Response {
    (StatusCode::BAD_GATEWAY, Json(json!({ "error": msg }))).into_response()
}

fn not_configured(msg: &str) -> Response {
    (StatusCode::SERVICE_UNAVAILABLE, Json(json!({ "error": msg }))).into_response()
}

async fn health_get() -> Response {
    (StatusCode::OK, Json(json!({ "status": "ok" }))).into_response()
}

// ---------------------------------------------------------------------------
// Report computation + persistence
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportRequest {
    pub session_id: String,
    #[serde(default)]
    pub user_name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    pub phases: Vec<PhaseResult>,
}

async fn report_post(
    State(state): State<Arc<AppState>>,
    Json(req): Json<ReportRequest>,
) -> Response {
    let bundle = match assemble_report(&req.phases, &state.report_config) {
        Ok(bundle) => bundle,
        Err(e @ ReportError::InvalidInput(_)) => {
            return (
                StatusCode::UNPROCESSABLE_ENTITY,
                Json(json!({ "error": e.to_string() })),
            )
                .into_response();
        }
        Err(e) => {
            error!("report assembly failed: {}", e);
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({ "error": "report computation failed" })),
            )
                .into_response();
        }
    };

    let key = req
        .email
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_lowercase)
        .unwrap_or_else(|| req.session_id.clone());
    let envelope = StoredReport {
        generated_at_ms: Utc::now().timestamp_millis() as u64,
        user_name: req.user_name.clone(),
        bundle: bundle.clone(),
    };
    // Best effort: the user still gets the report from this response even when
    // the store is down.
    if let Err(e) = state.store.save_report(&key, &envelope) {
        warn!("report persistence failed for {}: {}", key, e);
    }

    (StatusCode::OK, Json(bundle)).into_response()
}

/// Returns the persisted envelope for a returning user, keyed by email or
/// session id.
async fn report_get(State(state): State<Arc<AppState>>, Path(key): Path<String>) -> Response {
    let key = key.trim().to_string();
    let lookup = state.store.load_report(&key).and_then(|found| match found {
        Some(stored) => Ok(Some(stored)),
        None => state.store.load_report(&key.to_lowercase()),
    });
    match lookup {
        Ok(Some(stored)) => (StatusCode::OK, Json(stored)).into_response(),
        Ok(None) => (
            StatusCode::NOT_FOUND,
            Json(json!({ "error": "no report for this key" })),
        )
            .into_response(),
        Err(e) => {
            error!("report load failed for {}: {}", key, e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({ "error": "report lookup failed" })),
            )
                .into_response()
        }
    }
}

// ---------------------------------------------------------------------------
// PDF export gate
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportRequest {
    #[serde(default)]
    pub report_data: serde_json::Value,
    #[serde(default)]
    pub forces: serde_json::Value,
    #[serde(default)]
    pub revelations: serde_json::Value,
    #[serde(default)]
    pub user_name: Option<String>,
}

/// Re-checks the generator's own contract before any byte of PDF moves. A
/// rejection here on pipeline-produced data means a pipeline bug, not a user
/// error.
async fn export_pdf_post(
    State(state): State<Arc<AppState>>,
    Json(req): Json<ExportRequest>,
) -> Response {
    let Some(revelations) = req.revelations.as_array() else {
        return bad_request("revelations must be an array");
    };
    if revelations.len() != REVELATION_COUNT {
        return bad_request(&format!(
            "expected {} revelations, got {}",
            REVELATION_COUNT,
            revelations.len()
        ));
    }
    if !req.forces.is_object() {
        return bad_request("forces must be a plain object");
    }
    let user_name = req.user_name.as_deref().map(str::trim).unwrap_or("");
    if user_name.is_empty() {
        return bad_request("userName is required");
    }

    let Some(ref url) = state.pdf_renderer_url else {
        return not_configured("pdf renderer not configured");
    };
    let payload = json!({
        "reportData": req.report_data,
        "forces": req.forces,
        "revelations": req.revelations,
        "userName": user_name,
    });
    match state.http.post(url).json(&payload).send().await {
        Ok(resp) if resp.status().is_success() => match resp.bytes().await {
            Ok(bytes) => {
                ([(header::CONTENT_TYPE, "application/pdf")], bytes).into_response()
            }
            Err(e) => {
                error!("pdf renderer stream failed: {}", e);
                bad_gateway("pdf renderer stream failed")
            }
        },
        Ok(resp) => {
            warn!("pdf renderer returned {}", resp.status());
            bad_gateway("pdf renderer rejected the request")
        }
        Err(e) => {
            error!("pdf renderer unreachable: {}", e);
            bad_gateway("pdf renderer unreachable")
        }
    }
}

// ---------------------------------------------------------------------------
// Checkout (rate-limited)
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutRequest {
    pub session_id: String,
    #[serde(default)]
    pub email: Option<String>,
}

async fn checkout_post(
    State(state): State<Arc<AppState>>,
    Json(req): Json<CheckoutRequest>,
) -> Response {
    let key = req
        .email
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_lowercase)
        .unwrap_or_else(|| req.session_id.clone());
    if !state.limiter.try_acquire(&key) {
        return (
            StatusCode::TOO_MANY_REQUESTS,
            Json(json!({ "error": "too many checkout attempts; try again shortly" })),
        )
            .into_response();
    }

    let Some(ref url) = state.checkout_url else {
        return not_configured("checkout not configured");
    };
    let payload = json!({ "sessionId": req.session_id, "email": req.email });
    match state.http.post(url).json(&payload).send().await {
        Ok(resp) if resp.status().is_success() => match resp.json::<serde_json::Value>().await {
            Ok(body) => (StatusCode::OK, Json(body)).into_response(),
            Err(e) => {
                error!("checkout upstream returned invalid body: {}", e);
                bad_gateway("checkout session creation failed")
            }
        },
        Ok(resp) => {
            warn!("checkout upstream returned {}", resp.status());
            bad_gateway("checkout session creation failed")
        }
        Err(e) => {
            error!("checkout upstream unreachable: {}", e);
            bad_gateway("checkout session creation failed")
        }
    }
}

// ---------------------------------------------------------------------------
// Funnel tracking + social proof
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrackRequest {
    pub session_id: String,
    pub event: String,
    #[serde(default)]
    pub email: Option<String>,
}

/// Fire-and-forget: the client never sees a tracking failure.
async fn track_post(
    State(state): State<Arc<AppState>>,
    Json(req): Json<TrackRequest>,
) -> StatusCode {
    let Some(event) = TrackedEvent::from_str(&req.event) else {
        debug!("ignoring unknown event kind: {}", req.event);
        return StatusCode::NO_CONTENT;
    };
    match state
        .store
        .record_event(event, &req.session_id, req.email.as_deref())
    {
        Ok(true) => {}
        Ok(false) => debug!("event {} already recorded for this scope", event.as_str()),
        Err(e) => warn!("event append failed ({}): {}", event.as_str(), e),
    }
    StatusCode::NO_CONTENT
}

async fn social_proof_get(State(state): State<Arc<AppState>>) -> Response {
    (
        StatusCode::OK,
        Json(json!({ "count": state.social_proof.get() })),
    )
        .into_response()
}
