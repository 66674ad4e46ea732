//! Session authentication for the web UI.
//!
//! Two fixed accounts come from configuration: `admin` (full access) and
//! `user` (read-only). Passwords are bcrypt-hashed at startup and
//! verified on login; a successful login mints a random session token
//! stored server-side and handed to the browser as an HttpOnly cookie.

use std::collections::HashMap;
use std::sync::RwLock;

use axum::{
    extract::{Request, State},
    http::{header, HeaderMap, StatusCode},
    middleware::Next,
    response::{Html, IntoResponse, Redirect, Response},
    Form,
};
use chrono::{DateTime, Duration, Utc};
use inventario_core::config::AuthConfig;
use secrecy::ExposeSecret;
use serde::{Deserialize, Serialize};
use tera::Context;
use tracing::{info, warn};
use uuid::Uuid;

use crate::bootstrap::AppState;

pub const SESSION_COOKIE: &str = "inventario_session";

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    User,
}

impl Role {
    pub fn is_admin(self) -> bool {
        matches!(self, Role::Admin)
    }
}

#[derive(Clone, Debug, Serialize)]
pub struct CurrentUser {
    pub username: String,
    pub role: Role,
}

/// Session token plus the user it belongs to, inserted into request
/// extensions by [`require_session`].
#[derive(Clone, Debug)]
pub struct AuthSession {
    pub token: String,
    pub user: CurrentUser,
}

// ---------------------------------------------------------------------------
// User directory
// ---------------------------------------------------------------------------

struct UserRecord {
    username: &'static str,
    password_hash: String,
    role: Role,
}

pub struct UserDirectory {
    users: Vec<UserRecord>,
}

impl UserDirectory {
    /// Hash the configured passwords once at startup. Login then only
    /// ever compares against the hashes.
    pub fn from_config(auth: &AuthConfig) -> Result<Self, bcrypt::BcryptError> {
        let users = vec![
            UserRecord {
                username: "admin",
                password_hash: bcrypt::hash(auth.admin_password.expose_secret(), bcrypt::DEFAULT_COST)?,
                role: Role::Admin,
            },
            UserRecord {
                username: "user",
                password_hash: bcrypt::hash(auth.user_password.expose_secret(), bcrypt::DEFAULT_COST)?,
                role: Role::User,
            },
        ];
        Ok(Self { users })
    }

    pub fn verify(&self, username: &str, password: &str) -> Option<Role> {
        let record = self.users.iter().find(|user| user.username == username)?;
        match bcrypt::verify(password, &record.password_hash) {
            Ok(true) => Some(record.role),
            _ => None,
        }
    }
}

// ---------------------------------------------------------------------------
// Session store
// ---------------------------------------------------------------------------

/// One-shot notice rendered on the next page the user sees.
#[derive(Clone, Debug, Serialize)]
pub struct Flash {
    pub message: String,
    pub kind: &'static str,
}

impl Flash {
    pub fn success(message: impl Into<String>) -> Self {
        Self { message: message.into(), kind: "success" }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self { message: message.into(), kind: "error" }
    }
}

struct SessionRecord {
    user: CurrentUser,
    expires_at: DateTime<Utc>,
    flash: Option<Flash>,
}

pub struct SessionStore {
    ttl: Duration,
    sessions: RwLock<HashMap<String, SessionRecord>>,
}

impl SessionStore {
    pub fn new(ttl_minutes: u64) -> Self {
        Self {
            ttl: Duration::minutes(ttl_minutes as i64),
            sessions: RwLock::new(HashMap::new()),
        }
    }

    /// Mint a session token. Each login also sweeps expired records so
    /// sessions whose browser never comes back do not accumulate.
    pub fn create(&self, user: CurrentUser) -> String {
        let token = Uuid::new_v4().simple().to_string();
        let now = Utc::now();
        let record = SessionRecord { user, expires_at: now + self.ttl, flash: None };

        let mut sessions = self.sessions.write().expect("session lock poisoned");
        sessions.retain(|_, existing| existing.expires_at > now);
        sessions.insert(token.clone(), record);
        token
    }

    /// Resolve a token to its user, evicting expired entries on contact.
    pub fn authenticate(&self, token: &str) -> Option<CurrentUser> {
        let mut sessions = self.sessions.write().expect("session lock poisoned");
        match sessions.get(token) {
            Some(record) if record.expires_at > Utc::now() => Some(record.user.clone()),
            Some(_) => {
                sessions.remove(token);
                None
            }
            None => None,
        }
    }

    pub fn destroy(&self, token: &str) {
        self.sessions.write().expect("session lock poisoned").remove(token);
    }

    pub fn put_flash(&self, token: &str, flash: Flash) {
        if let Some(record) = self.sessions.write().expect("session lock poisoned").get_mut(token) {
            record.flash = Some(flash);
        }
    }

    pub fn take_flash(&self, token: &str) -> Option<Flash> {
        self.sessions
            .write()
            .expect("session lock poisoned")
            .get_mut(token)
            .and_then(|record| record.flash.take())
    }
}

// ---------------------------------------------------------------------------
// Cookie helpers
// ---------------------------------------------------------------------------

fn session_token(headers: &HeaderMap) -> Option<String> {
    let cookies = headers.get(header::COOKIE)?.to_str().ok()?;
    cookies.split(';').map(str::trim).find_map(|pair| {
        pair.strip_prefix(SESSION_COOKIE)
            .and_then(|rest| rest.strip_prefix('='))
            .map(str::to_string)
    })
}

fn session_cookie(token: &str) -> String {
    format!("{SESSION_COOKIE}={token}; Path=/; HttpOnly; SameSite=Lax")
}

fn expired_session_cookie() -> String {
    format!("{SESSION_COOKIE}=; Path=/; HttpOnly; SameSite=Lax; Max-Age=0")
}

// ---------------------------------------------------------------------------
// Guards
// ---------------------------------------------------------------------------

/// Redirects anonymous requests to the login page; authenticated
/// requests continue with an [`AuthSession`] extension attached.
pub async fn require_session(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Response {
    let token = session_token(request.headers());
    let user = token.as_deref().and_then(|token| state.sessions.authenticate(token));

    match (token, user) {
        (Some(token), Some(user)) => {
            request.extensions_mut().insert(AuthSession { token, user });
            next.run(request).await
        }
        _ => Redirect::to("/login").into_response(),
    }
}

/// Admin-only routes. Must run inside [`require_session`].
pub async fn require_admin(request: Request, next: Next) -> Response {
    let is_admin = request
        .extensions()
        .get::<AuthSession>()
        .map(|session| session.user.role.is_admin())
        .unwrap_or(false);

    if is_admin {
        next.run(request).await
    } else {
        if let Some(session) = request.extensions().get::<AuthSession>() {
            warn!(
                event_name = "inventory.auth.forbidden",
                username = %session.user.username,
                path = %request.uri().path(),
                "non-admin attempted a write operation"
            );
        }
        (
            StatusCode::FORBIDDEN,
            Html("<h1>403</h1><p>No tiene permisos para realizar esta acción.</p>".to_string()),
        )
            .into_response()
    }
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
pub struct LoginForm {
    pub username: String,
    pub password: String,
}

pub async fn login_page(State(state): State<AppState>, headers: HeaderMap) -> Response {
    // Already signed in? Skip the form.
    if session_token(&headers).is_some_and(|token| state.sessions.authenticate(&token).is_some()) {
        return Redirect::to("/dashboard").into_response();
    }
    render_login(&state, None, StatusCode::OK)
}

pub async fn login_submit(State(state): State<AppState>, Form(form): Form<LoginForm>) -> Response {
    let username = form.username.trim();

    match state.users.verify(username, &form.password) {
        Some(role) => {
            let user = CurrentUser { username: username.to_string(), role };
            let token = state.sessions.create(user);

            info!(
                event_name = "inventory.auth.login",
                username = %username,
                role = ?role,
                "login succeeded"
            );

            (
                [(header::SET_COOKIE, session_cookie(&token))],
                Redirect::to("/dashboard"),
            )
                .into_response()
        }
        None => {
            warn!(event_name = "inventory.auth.login_failed", username = %username, "login rejected");
            render_login(&state, Some("Usuario o contraseña incorrectos"), StatusCode::UNAUTHORIZED)
        }
    }
}

pub async fn logout(State(state): State<AppState>, headers: HeaderMap) -> Response {
    if let Some(token) = session_token(&headers) {
        state.sessions.destroy(&token);
        info!(event_name = "inventory.auth.logout", "session terminated");
    }
    (
        [(header::SET_COOKIE, expired_session_cookie())],
        Redirect::to("/login"),
    )
        .into_response()
}

fn render_login(state: &AppState, error: Option<&str>, status: StatusCode) -> Response {
    let mut context = Context::new();
    context.insert("error", &error);

    match state.templates.render("login.html", &context) {
        Ok(html) => (status, Html(html)).into_response(),
        Err(err) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Html(format!("<h1>Template Error</h1><pre>{err:?}</pre>")),
        )
            .into_response(),
    }
}
