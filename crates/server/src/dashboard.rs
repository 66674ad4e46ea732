//! Statistics dashboard page.

use axum::{
    extract::State,
    http::StatusCode,
    response::{Html, IntoResponse, Response},
    Extension,
};
use tera::Context;
use tracing::error;

use crate::auth::AuthSession;
use crate::bootstrap::AppState;

/// `GET /dashboard` (also mounted at `/`). Renders the aggregate view of
/// the whole catalog: totals, category breakdowns and the top lists.
pub async fn dashboard_page(
    State(state): State<AppState>,
    Extension(session): Extension<AuthSession>,
) -> Response {
    let stats = match state.service.statistics().await {
        Ok(stats) => stats,
        Err(err) => {
            error!(error = %err, "dashboard statistics failed");
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                Html(format!("<h1>Error</h1><p>{}</p>", err.user_message())),
            )
                .into_response();
        }
    };

    let mut context = Context::new();
    context.insert("stats", &stats);
    context.insert("usuario", &session.user);

    match state.templates.render("dashboard.html", &context) {
        Ok(html) => Html(html).into_response(),
        Err(err) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Html(format!("<h1>Template Error</h1><pre>{err:?}</pre>")),
        )
            .into_response(),
    }
}
