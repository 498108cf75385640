/**
 * HTTP API - Inbound surface of the kernel
 *
 * ROLE :
 * Exposes the acquisition over HTTP for the dashboard front-end and the PDF
 * exporter. The caller's bearer token is forwarded untouched to the
 * management API; the kernel never stores it.
 *
 * ROUTES :
 * - GET /health                                  liveness, never guarded
 * - GET /system/health                           counters + memory
 * - GET /dashboard/{subscription_id}             live model (Bearer), or demo
 *                                                model when no token and the
 *                                                fallback is enabled
 * - GET /dashboard/{subscription_id}/synthetic   demo model
 *
 * SECURITY :
 * When `api_key` is configured every route except /health requires a
 * matching `x-api-key` header.
 */

use std::sync::Arc;
use std::time::Instant;

use axum::extract::{Path, Request, State};
use axum::http::{header::AUTHORIZATION, HeaderMap, StatusCode};
use axum::middleware::{self, Next};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use tracing::{info, warn};

use crate::assembler::{acquire_with, validate_credential};
use crate::config::KernelConfig;
use crate::error::AcquireError;
use crate::fetch::ArmClient;
use crate::health::{HealthTracker, KernelHealth};
use crate::model::DashboardModel;
use crate::synthetic::generate_synthetic_model;

#[derive(Clone)]
pub struct AppState {
    pub cfg: Arc<KernelConfig>,
    pub health_tracker: HealthTracker,
    /// Shared connection pool for every per-request [`ArmClient`].
    pub http: reqwest::Client,
}

impl AppState {
    pub fn new(cfg: KernelConfig) -> Result<Self, AcquireError> {
        let http = reqwest::Client::builder()
            .user_agent(cfg.user_agent.clone())
            .build()
            .map_err(|e| AcquireError::Client(e.to_string()))?;
        Ok(Self {
            cfg: Arc::new(cfg),
            health_tracker: HealthTracker::new(),
            http,
        })
    }
}

/// JSON `{ "error": ... }` with a status derived from the failure kind.
pub struct ApiError(AcquireError);

impl From<AcquireError> for ApiError {
    fn from(err: AcquireError) -> Self {
        ApiError(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self.0 {
            AcquireError::MissingCredential => StatusCode::UNAUTHORIZED,
            AcquireError::InvalidSubscription(_) => StatusCode::BAD_REQUEST,
            AcquireError::Client(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };
        (status, Json(serde_json::json!({ "error": self.0.to_string() }))).into_response()
    }
}

async fn require_api_key(State(app): State<AppState>, req: Request, next: Next) -> Result<Response, StatusCode> {
    if req.uri().path() == "/health" {
        return Ok(next.run(req).await);
    }
    let Some(expected) = app.cfg.api_key.as_deref().filter(|k| !k.is_empty()) else {
        return Ok(next.run(req).await);
    };

    let ok = req
        .headers()
        .get("x-api-key")
        .and_then(|v| v.to_str().ok())
        .is_some_and(|v| v == expected);
    if !ok {
        warn!(path = %req.uri().path(), "rejected request without a valid api key");
        return Err(StatusCode::UNAUTHORIZED);
    }
    Ok(next.run(req).await)
}

pub fn build_router(app_state: AppState) -> Router {
    Router::new()
        .route("/health", get(|| async { "ok" }))
        .route("/system/health", get(get_system_health))
        .route("/dashboard/{subscription_id}", get(get_dashboard))
        .route("/dashboard/{subscription_id}/synthetic", get(get_synthetic))
        .layer(middleware::from_fn_with_state(app_state.clone(), require_api_key))
        .with_state(app_state)
}

/// Token of an `Authorization: Bearer <token>` header, possibly blank.
fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    let value = headers.get(AUTHORIZATION)?.to_str().ok()?;
    let (scheme, token) = value.split_once(' ').unwrap_or((value, ""));
    scheme.eq_ignore_ascii_case("bearer").then_some(token.trim())
}

// GET /system/health
async fn get_system_health(State(app): State<AppState>) -> Json<KernelHealth> {
    Json(app.health_tracker.get_health())
}

// GET /dashboard/{subscription_id}
async fn get_dashboard(
    State(app): State<AppState>,
    Path(subscription_id): Path<String>,
    headers: HeaderMap,
) -> Result<Json<DashboardModel>, ApiError> {
    let Some(token) = bearer_token(&headers) else {
        if app.cfg.synthetic_fallback {
            info!(subscription = %subscription_id, "no credential, serving synthetic model");
            app.health_tracker.record_synthetic();
            return Ok(Json(generate_synthetic_model(&subscription_id)));
        }
        app.health_tracker.record_rejection();
        return Err(AcquireError::MissingCredential.into());
    };

    if let Err(e) = validate_credential(token) {
        app.health_tracker.record_rejection();
        return Err(e.into());
    }

    let started = Instant::now();
    let client = ArmClient::with_client(app.http.clone(), app.cfg.management_url.clone(), token);
    match acquire_with(&client, &subscription_id).await {
        Ok(model) => {
            app.health_tracker
                .record_acquisition(&model.subscription_id, started.elapsed());
            Ok(Json(model))
        }
        Err(e) => {
            warn!(subscription = %subscription_id, error = %e, "acquisition rejected");
            app.health_tracker.record_rejection();
            Err(e.into())
        }
    }
}

// GET /dashboard/{subscription_id}/synthetic
async fn get_synthetic(State(app): State<AppState>, Path(subscription_id): Path<String>) -> Json<DashboardModel> {
    app.health_tracker.record_synthetic();
    Json(generate_synthetic_model(&subscription_id))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{json, Value};
    use tokio::net::TcpListener;

    const SUB: &str = "6f1b2c3d-0000-4000-8000-00000000abcd";

    async fn spawn(router: Router) -> String {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        });
        format!("http://{addr}")
    }

    /// Answers the inventory call for a valid token; everything else 404s.
    async fn spawn_fake_arm() -> String {
        let router = Router::new().route(
            "/subscriptions/{sub}/resources",
            get(|headers: HeaderMap| async move {
                if bearer_token(&headers) != Some("live-token") {
                    return (StatusCode::UNAUTHORIZED, Json(json!({ "error": "bad token" })));
                }
                (
                    StatusCode::OK,
                    Json(json!({ "value": [
                        { "id": "1", "name": "vm-01", "type": "Microsoft.Compute/virtualMachines", "location": "eastus", "tags": { "env": "prod" } },
                        { "id": "2", "name": "disk-01", "type": "Microsoft.Compute/disks", "location": "eastus" }
                    ]})),
                )
            }),
        );
        spawn(router).await
    }

    async fn spawn_kernel(cfg: KernelConfig) -> (String, AppState) {
        let state = AppState::new(cfg).unwrap();
        let base = spawn(build_router(state.clone())).await;
        (base, state)
    }

    #[tokio::test]
    async fn test_live_acquisition_forwards_bearer() {
        let arm = spawn_fake_arm().await;
        let (base, state) = spawn_kernel(KernelConfig {
            management_url: arm,
            ..Default::default()
        })
        .await;

        let resp = reqwest::Client::new()
            .get(format!("{base}/dashboard/{}", SUB.to_uppercase()))
            .bearer_auth("live-token")
            .send()
            .await
            .unwrap();
        assert_eq!(resp.status(), 200);
        let body: Value = resp.json().await.unwrap();
        assert_eq!(body["isLiveData"], true);
        assert_eq!(body["subscriptionId"], SUB);
        assert_eq!(body["executiveSummary"]["totalResources"], 2);
        assert_eq!(body["governance"]["zombieAssetCount"], 1);
        assert_eq!(body["monitoring"]["vmCount"], 1);

        let health = state.health_tracker.get_health();
        assert_eq!(health.acquisitions_served, 1);
        assert_eq!(health.last_acquisition.unwrap().subscription_id, SUB);
    }

    #[tokio::test]
    async fn test_missing_token_serves_synthetic_or_401() {
        let (base, _) = spawn_kernel(KernelConfig::default()).await;
        let body: Value = reqwest::get(format!("{base}/dashboard/{SUB}")).await.unwrap().json().await.unwrap();
        assert_eq!(body["isLiveData"], false);

        let (strict, state) = spawn_kernel(KernelConfig {
            synthetic_fallback: false,
            ..Default::default()
        })
        .await;
        let resp = reqwest::get(format!("{strict}/dashboard/{SUB}")).await.unwrap();
        assert_eq!(resp.status(), 401);
        let body: Value = resp.json().await.unwrap();
        assert!(body["error"].as_str().unwrap().contains("sign in"));
        assert_eq!(state.health_tracker.get_health().acquisitions_rejected, 1);
    }

    #[tokio::test]
    async fn test_invalid_subscription_and_blank_token() {
        let (base, _) = spawn_kernel(KernelConfig::default()).await;
        let client = reqwest::Client::new();

        let resp = client
            .get(format!("{base}/dashboard/not-a-guid"))
            .bearer_auth("tok")
            .send()
            .await
            .unwrap();
        assert_eq!(resp.status(), 400);

        let resp = client
            .get(format!("{base}/dashboard/{SUB}"))
            .header("authorization", "Bearer   ")
            .send()
            .await
            .unwrap();
        assert_eq!(resp.status(), 401);
    }

    #[tokio::test]
    async fn test_api_key_guards_everything_but_health() {
        let (base, _) = spawn_kernel(KernelConfig {
            api_key: Some("k3y".into()),
            ..Default::default()
        })
        .await;
        let client = reqwest::Client::new();

        let resp = client.get(format!("{base}/health")).send().await.unwrap();
        assert_eq!(resp.status(), 200);
        assert_eq!(resp.text().await.unwrap(), "ok");

        let resp = client.get(format!("{base}/system/health")).send().await.unwrap();
        assert_eq!(resp.status(), 401);

        let resp = client
            .get(format!("{base}/dashboard/{SUB}/synthetic"))
            .header("x-api-key", "k3y")
            .send()
            .await
            .unwrap();
        assert_eq!(resp.status(), 200);
        let body: Value = resp.json().await.unwrap();
        assert_eq!(body["subscriptionId"], SUB);
    }

    #[test]
    fn test_bearer_token_parsing() {
        let mut headers = HeaderMap::new();
        assert_eq!(bearer_token(&headers), None);
        headers.insert(AUTHORIZATION, "Basic abc".parse().unwrap());
        assert_eq!(bearer_token(&headers), None);
        headers.insert(AUTHORIZATION, "bearer abc".parse().unwrap());
        assert_eq!(bearer_token(&headers), Some("abc"));
        headers.insert(AUTHORIZATION, "Bearer".parse().unwrap());
        assert_eq!(bearer_token(&headers), Some(""));
    }
}
