use std::sync::Arc;

use axum::{
    middleware,
    routing::{get, post},
    Router,
};
use inventario_core::config::{AppConfig, ConfigError, LoadOptions};
use inventario_db::{connect_with_settings, migrations, DbPool, SqlProductRepository};
use tera::Tera;
use thiserror::Error;
use tower_http::services::ServeDir;
use tracing::info;

use crate::auth::{self, SessionStore, UserDirectory};
use crate::dashboard;
use crate::health;
use crate::productos;
use crate::service::ProductService;
use crate::templates::init_templates;

/// Shared handler state. Cheap to clone; everything heavy is behind an Arc.
#[derive(Clone)]
pub struct AppState {
    pub service: ProductService,
    pub sessions: Arc<SessionStore>,
    pub users: Arc<UserDirectory>,
    pub templates: Arc<Tera>,
}

pub struct Application {
    pub config: AppConfig,
    pub db_pool: DbPool,
    pub state: AppState,
}

#[derive(Debug, Error)]
pub enum BootstrapError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("database connection failed: {0}")]
    DatabaseConnect(#[source] sqlx::Error),
    #[error("database migration failed: {0}")]
    Migration(#[source] sqlx::migrate::MigrateError),
    #[error("password hashing failed: {0}")]
    PasswordHash(#[source] bcrypt::BcryptError),
}

pub async fn bootstrap(options: LoadOptions) -> Result<Application, BootstrapError> {
    let config = AppConfig::load(options)?;
    bootstrap_with_config(config).await
}

pub async fn bootstrap_with_config(config: AppConfig) -> Result<Application, BootstrapError> {
    info!(event_name = "system.bootstrap.start", "starting application bootstrap");

    let db_pool = connect_with_settings(
        &config.database.url,
        config.database.max_connections,
        config.database.timeout_secs,
    )
    .await
    .map_err(BootstrapError::DatabaseConnect)?;
    info!(event_name = "system.bootstrap.database_connected", "database connection established");

    migrations::run_pending(&db_pool).await.map_err(BootstrapError::Migration)?;
    info!(event_name = "system.bootstrap.migrations_applied", "database migrations applied");

    let users =
        Arc::new(UserDirectory::from_config(&config.auth).map_err(BootstrapError::PasswordHash)?);
    let sessions = Arc::new(SessionStore::new(config.auth.session_ttl_minutes));
    let service = ProductService::new(Arc::new(SqlProductRepository::new(db_pool.clone())));

    let state = AppState { service, sessions, users, templates: init_templates() };

    Ok(Application { config, db_pool, state })
}

/// Assemble the full route tree.
///
/// Read routes sit behind the session guard; write routes additionally
/// require the admin role. Login and the health probe stay public.
pub fn app_router(state: AppState, db_pool: DbPool) -> Router {
    let admin_routes = Router::new()
        .route("/productos/nuevo", get(productos::new_product_page))
        .route("/productos", post(productos::create_product))
        .route("/productos/{id}/editar", get(productos::edit_product_page))
        .route("/productos/{id}", post(productos::update_product))
        .route("/productos/{id}/eliminar", post(productos::delete_product))
        .layer(middleware::from_fn(auth::require_admin));

    let authenticated = Router::new()
        .route("/", get(dashboard::dashboard_page))
        .route("/dashboard", get(dashboard::dashboard_page))
        .route("/productos", get(productos::list_products))
        .route("/logout", post(auth::logout))
        .merge(admin_routes)
        .layer(middleware::from_fn_with_state(state.clone(), auth::require_session));

    Router::new()
        .merge(authenticated)
        .route("/login", get(auth::login_page).post(auth::login_submit))
        .nest_service("/static", ServeDir::new("static"))
        .with_state(state)
        .merge(health::router(db_pool))
}


#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use axum::body::Body;
    use axum::http::{header, Request, StatusCode};
    use inventario_core::config::{ConfigOverrides, LoadOptions};
    use inventario_db::{connect_with_settings, InMemoryProductRepository};
    use tower::ServiceExt;

    use crate::auth::{CurrentUser, Role, SESSION_COOKIE};
    use crate::service::ProductService;

    use super::{app_router, bootstrap, test_support::test_state};

    async fn router_fixture() -> (super::AppState, axum::Router) {
        let state =
            test_state(ProductService::new(Arc::new(InMemoryProductRepository::new())));
        let pool = connect_with_settings("sqlite::memory:", 1, 5).await.expect("pool");
        (state.clone(), app_router(state, pool))
    }

    #[tokio::test]
    async fn anonymous_request_is_redirected_to_login() {
        let (_, router) = router_fixture().await;

        let response = router
            .oneshot(Request::builder().uri("/productos").body(Body::empty()).expect("request"))
            .await
            .expect("response");

        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(
            response.headers().get(header::LOCATION).and_then(|v| v.to_str().ok()),
            Some("/login")
        );
    }

    #[tokio::test]
    async fn read_only_user_cannot_reach_write_routes() {
        let (state, router) = router_fixture().await;
        let token = state
            .sessions
            .create(CurrentUser { username: "user".to_string(), role: Role::User });

        let response = router
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/productos/1/eliminar")
                    .header(header::COOKIE, format!("{SESSION_COOKIE}={token}"))
                    .body(Body::empty())
                    .expect("request"),
            )
            .await
            .expect("response");

        assert_eq!(response.status(), StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn authenticated_user_reaches_the_listing() {
        let (state, router) = router_fixture().await;
        let token = state
            .sessions
            .create(CurrentUser { username: "user".to_string(), role: Role::User });

        let response = router
            .oneshot(
                Request::builder()
                    .uri("/productos")
                    .header(header::COOKIE, format!("{SESSION_COOKIE}={token}"))
                    .body(Body::empty())
                    .expect("request"),
            )
            .await
            .expect("response");

        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn bootstrap_connects_migrates_and_builds_state() {
        let app = bootstrap(LoadOptions {
            overrides: ConfigOverrides {
                database_url: Some("sqlite::memory:?cache=shared".to_string()),
                ..ConfigOverrides::default()
            },
            ..LoadOptions::default()
        })
        .await
        .expect("bootstrap should succeed with in-memory database");

        let (table_count,): (i64,) = sqlx::query_as(
            "SELECT COUNT(*) FROM sqlite_master WHERE type = 'table' AND name = 'productos'",
        )
        .fetch_one(&app.db_pool)
        .await
        .expect("schema lookup");
        assert_eq!(table_count, 1, "bootstrap should create the productos table");

        let products = app.state.service.list_all().await.expect("list");
        assert!(products.is_empty(), "fresh database starts empty");

        app.db_pool.close().await;
    }
}
