use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tracing::{debug, error, info, warn};

use crate::db::Database;
use crate::nrr::rate::format_nrr;
use crate::nrr::{solve, MatchRequest, OutcomeRange, SolveError};
use crate::standings::TeamRecord;

#[derive(Clone)]
pub struct AppState {
    pub db: Database,
}

/// Build the Axum router for the standings API.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health_handler))
        .route("/api/nrr/points-table", get(points_table_handler))
        .route("/api/nrr/calculate", post(calculate_handler))
        .layer(CorsLayer::permissive())
        .with_state(Arc::new(state))
}

/// Success envelope: `{"success": true, "data": ...}`.
#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    pub data: T,
}

impl<T> ApiResponse<T> {
    fn ok(data: T) -> Json<Self> {
        Json(ApiResponse {
            success: true,
            data,
        })
    }
}

#[derive(Debug)]
pub enum ApiError {
    InvalidRequest(String),
    Unsatisfiable(String),
    Internal(String),
}

impl ApiError {
    fn parts(&self) -> (StatusCode, &'static str, &str) {
        match self {
            ApiError::InvalidRequest(m) => (StatusCode::BAD_REQUEST, "invalid_request", m),
            ApiError::Unsatisfiable(m) => (StatusCode::UNPROCESSABLE_ENTITY, "unsatisfiable", m),
            ApiError::Internal(m) => (StatusCode::INTERNAL_SERVER_ERROR, "internal", m),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, kind, message) = self.parts();
        let body = serde_json::json!({
            "success": false,
            "error": message,
            "kind": kind,
        });
        (status, Json(body)).into_response()
    }
}

impl From<SolveError> for ApiError {
    fn from(err: SolveError) -> Self {
        match err {
            SolveError::InvalidRequest(_) => ApiError::InvalidRequest(err.to_string()),
            SolveError::Unsatisfiable { .. } => ApiError::Unsatisfiable(err.to_string()),
            SolveError::Internal(_) => ApiError::Internal(err.to_string()),
        }
    }
}

impl From<anyhow::Error> for ApiError {
    fn from(err: anyhow::Error) -> Self {
        ApiError::Internal(format!("{:#}", err))
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::InvalidRequest(rejection.body_text())
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Health {
    pub status: &'static str,
    pub teams: i64,
    pub updated_at: Option<DateTime<Utc>>,
}

/// GET /health
async fn health_handler(State(state): State<Arc<AppState>>) -> Result<Json<Health>, ApiError> {
    Ok(Json(Health {
        status: "ok",
        teams: state.db.standings_count()?,
        updated_at: state.db.last_updated()?,
    }))
}

/// GET /api/nrr/points-table
async fn points_table_handler(
    State(state): State<Arc<AppState>>,
) -> Result<Json<ApiResponse<Vec<TeamRecord>>>, ApiError> {
    let snapshot = state.db.load_snapshot().map_err(|e| {
        error!("Failed to load points table: {:#}", e);
        ApiError::from(e)
    })?;
    Ok(ApiResponse::ok(snapshot.records()))
}

/// POST /api/nrr/calculate
async fn calculate_handler(
    State(state): State<Arc<AppState>>,
    body: Result<Json<MatchRequest>, JsonRejection>,
) -> Result<Json<ApiResponse<OutcomeRange>>, ApiError> {
    let Json(request) = body?;
    let snapshot = state.db.load_snapshot()?;
    match solve(&snapshot, &request) {
        Ok(range) => {
            let (min_nrr, max_nrr) = range.nrr_band();
            info!(
                "Solved {} vs {} ({}, {} runs, position {}): NRR {} to {}",
                request.your_team,
                request.opposition_team,
                request.toss_result,
                request.runs,
                request.desired_position,
                format_nrr(min_nrr),
                format_nrr(max_nrr)
            );
            debug!("{}", range.summary());
            Ok(ApiResponse::ok(range))
        }
        Err(e) => {
            match &e {
                SolveError::Internal(_) => error!("Solver fault for {:?}: {}", request, e),
                _ => warn!(
                    "Rejected {} vs {} ({}): {}",
                    request.your_team,
                    request.opposition_team,
                    e.kind(),
                    e
                ),
            }
            Err(e.into())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::nrr::TossResult;
    use crate::standings::seed::default_table;

    fn seeded_state() -> Arc<AppState> {
        let db = Database::open(":memory:").unwrap();
        db.replace_standings(&default_table().unwrap()).unwrap();
        Arc::new(AppState { db })
    }

    fn request(position: usize) -> MatchRequest {
        MatchRequest {
            your_team: "Rajasthan Royals".into(),
            opposition_team: "Delhi Capitals".into(),
            match_overs: 20,
            desired_position: position,
            toss_result: TossResult::Batting,
            runs: 120,
        }
    }

    async fn error_body(err: ApiError) -> (StatusCode, serde_json::Value) {
        let response = err.into_response();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn points_table_is_ranked() {
        let Json(body) = points_table_handler(State(seeded_state())).await.unwrap();
        assert!(body.success);
        let teams: Vec<&str> = body.data.iter().map(|t| t.team.as_str()).collect();
        assert_eq!(teams[0], "Chennai Super Kings");
        assert_eq!(teams[4], "Mumbai Indians");
    }

    #[tokio::test]
    async fn calculate_returns_range() {
        let Json(body) = calculate_handler(State(seeded_state()), Ok(Json(request(3))))
            .await
            .unwrap();
        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(json["success"], true);
        assert_eq!(json["data"]["scenario"], "batting_first");
        assert_eq!(json["data"]["minRunsToRestrict"], 69);
        assert_eq!(json["data"]["maxRunsToRestrict"], 119);
        assert_eq!(json["data"]["oversToRestrict"], 20.0);
    }

    #[tokio::test]
    async fn unsatisfiable_maps_to_422() {
        let err = calculate_handler(State(seeded_state()), Ok(Json(request(1))))
            .await
            .unwrap_err();
        let (status, body) = error_body(err).await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(body["success"], false);
        assert_eq!(body["kind"], "unsatisfiable");
    }

    #[tokio::test]
    async fn invalid_request_maps_to_400() {
        let mut req = request(3);
        req.opposition_team = req.your_team.clone();
        let err = calculate_handler(State(seeded_state()), Ok(Json(req)))
            .await
            .unwrap_err();
        let (status, body) = error_body(err).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["kind"], "invalid_request");
        assert!(body["error"].as_str().unwrap().contains("cannot be the same"));
    }

    #[tokio::test]
    async fn malformed_body_maps_to_400() {
        use axum::extract::FromRequest;

        let req = axum::http::Request::builder()
            .method("POST")
            .uri("/api/nrr/calculate")
            .header("content-type", "application/json")
            .body(axum::body::Body::from(r#"{"yourTeam":"Rajasthan Royals"}"#))
            .unwrap();
        let body = Json::<MatchRequest>::from_request(req, &()).await;
        assert!(body.is_err());
        let err = calculate_handler(State(seeded_state()), body)
            .await
            .unwrap_err();
        let (status, body) = error_body(err).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["kind"], "invalid_request");
    }

    #[tokio::test]
    async fn corrupt_store_is_internal() {
        let db = Database::open(":memory:").unwrap();
        let mut teams = default_table().unwrap();
        teams[0].points += 1;
        db.replace_standings(&teams).unwrap();
        let err = points_table_handler(State(Arc::new(AppState { db })))
            .await
            .unwrap_err();
        let (status, body) = error_body(err).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["kind"], "internal");
    }

    #[tokio::test]
    async fn health_reports_team_count() {
        let Json(health) = health_handler(State(seeded_state())).await.unwrap();
        assert_eq!(health.teams, 5);
        assert!(health.updated_at.is_some());
    }

    #[test]
    fn router_builds() {
        let db = Database::open(":memory:").unwrap();
        let _ = router(AppState { db });
    }
}
