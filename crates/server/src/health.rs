use axum::{extract::State, http::StatusCode, routing::get, Json, Router};
use chrono::{DateTime, Utc};
use inventario_db::DbPool;
use serde::Serialize;

/// Readiness payload for `/health`. `database` carries the probe result;
/// `detail` is only present when the probe failed.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub database: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
    pub checked_at: DateTime<Utc>,
}

pub fn router(db_pool: DbPool) -> Router {
    Router::new().route("/health", get(health)).with_state(db_pool)
}

pub async fn health(State(pool): State<DbPool>) -> (StatusCode, Json<HealthResponse>) {
    let checked_at = Utc::now();

    match sqlx::query_scalar::<_, i64>("SELECT 1").fetch_one(&pool).await {
        Ok(_) => (
            StatusCode::OK,
            Json(HealthResponse { status: "ready", database: "ready", detail: None, checked_at }),
        ),
        Err(error) => (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(HealthResponse {
                status: "degraded",
                database: "unreachable",
                detail: Some(format!("database probe failed: {error}")),
                checked_at,
            }),
        ),
    }
}
