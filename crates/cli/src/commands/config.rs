use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use inventario_core::config::AppConfig;
use inventario_core::config::LoadOptions;
use toml::Value;

pub fn run() -> String {
    let config = match AppConfig::load(LoadOptions::default()) {
        Ok(config) => config,
        Err(error) => return format!("config validation failed: {error}"),
    };

    let config_file_path = detect_config_path();
    let config_file_doc = load_config_file_doc(config_file_path.as_deref());

    let mut lines = vec!["effective config (source precedence: env > file > default):".to_string()];

    let mut push = |key: &str, value: &str, env_key: Option<&str>| {
        lines.push(render_line(
            key,
            value,
            field_source(key, env_key, config_file_doc.as_ref(), config_file_path.as_deref()),
        ));
    };

    push("database.url", &config.database.url, Some("INVENTARIO_DATABASE_URL"));
    push(
        "database.max_connections",
        &config.database.max_connections.to_string(),
        Some("INVENTARIO_DATABASE_MAX_CONNECTIONS"),
    );
    push(
        "database.timeout_secs",
        &config.database.timeout_secs.to_string(),
        Some("INVENTARIO_DATABASE_TIMEOUT_SECS"),
    );

    push("server.bind_address", &config.server.bind_address, Some("INVENTARIO_SERVER_BIND_ADDRESS"));
    push("server.port", &config.server.port.to_string(), Some("INVENTARIO_SERVER_PORT"));
    push(
        "server.graceful_shutdown_secs",
        &config.server.graceful_shutdown_secs.to_string(),
        Some("INVENTARIO_SERVER_GRACEFUL_SHUTDOWN_SECS"),
    );

    // Passwords are never printed, not even partially.
    push("auth.admin_password", "<redacted>", Some("INVENTARIO_AUTH_ADMIN_PASSWORD"));
    push("auth.user_password", "<redacted>", Some("INVENTARIO_AUTH_USER_PASSWORD"));
    push(
        "auth.session_ttl_minutes",
        &config.auth.session_ttl_minutes.to_string(),
        Some("INVENTARIO_AUTH_SESSION_TTL_MINUTES"),
    );

    push("logging.level", &config.logging.level, Some("INVENTARIO_LOGGING_LEVEL"));
    push("logging.format", &format!("{:?}", config.logging.format), Some("INVENTARIO_LOGGING_FORMAT"));

    lines.join("\n")
}

fn detect_config_path() -> Option<PathBuf> {
    let root = PathBuf::from("inventario.toml");
    if root.exists() {
        return Some(root);
    }

    let nested = PathBuf::from("config/inventario.toml");
    if nested.exists() {
        return Some(nested);
    }

    None
}

fn load_config_file_doc(path: Option<&Path>) -> Option<Value> {
    let path = path?;
    let raw = fs::read_to_string(path).ok()?;
    raw.parse::<Value>().ok()
}

fn field_source(
    key_path: &str,
    env_key: Option<&str>,
    config_file_doc: Option<&Value>,
    config_file_path: Option<&Path>,
) -> String {
    if let Some(env_key) = env_key {
        if env::var_os(env_key).is_some() {
            return format!("env ({env_key})");
        }
    }

    if let Some(doc) = config_file_doc {
        if contains_path(doc, key_path) {
            let file_path = config_file_path
                .map(|path| path.display().to_string())
                .unwrap_or_else(|| "config file".to_string());
            return format!("file ({file_path})");
        }
    }

    "default".to_string()
}

fn contains_path(root: &Value, key_path: &str) -> bool {
    let mut current = root;
    for key in key_path.split('.') {
        let Some(next) = current.get(key) else {
            return false;
        };
        current = next;
    }
    true
}

fn render_line(key: &str, value: &str, source: String) -> String {
    format!("- {key} = {value} (source: {source})")
}
