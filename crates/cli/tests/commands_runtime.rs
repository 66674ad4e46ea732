use std::env;
use std::sync::{Mutex, OnceLock};

use inventario_cli::commands::{doctor, migrate, seed};
use serde_json::Value;

#[test]
fn migrate_returns_success_with_valid_env() {
    with_env(&[("INVENTARIO_DATABASE_URL", "sqlite::memory:")], || {
        let result = migrate::run();
        assert_eq!(result.exit_code, 0, "expected successful migrate run");

        let payload = parse_payload(&result.output);
        assert_eq!(payload["command"], "migrate");
        assert_eq!(payload["status"], "ok");
    });
}

#[test]
fn migrate_returns_config_failure_with_invalid_database_url() {
    with_env(&[("INVENTARIO_DATABASE_URL", "postgres://nope")], || {
        let result = migrate::run();
        assert_eq!(result.exit_code, 2, "expected config validation failure code");

        let payload = parse_payload(&result.output);
        assert_eq!(payload["command"], "migrate");
        assert_eq!(payload["status"], "error");
        assert_eq!(payload["error_class"], "config_validation");
    });
}

#[test]
fn seed_loads_demo_catalog_into_fresh_database() {
    with_env(&[("INVENTARIO_DATABASE_URL", "sqlite::memory:?cache=shared")], || {
        let result = seed::run();
        assert_eq!(result.exit_code, 0, "expected seed success");

        let payload = parse_payload(&result.output);
        assert_eq!(payload["command"], "seed");
        assert_eq!(payload["status"], "ok");

        let message = payload["message"].as_str().unwrap_or("");
        assert!(message.contains("productos"), "message should report the catalog size");
    });
}

#[test]
fn doctor_reports_pass_with_valid_env() {
    with_env(&[("INVENTARIO_DATABASE_URL", "sqlite::memory:")], || {
        let output = doctor::run(true);
        let payload: Value =
            serde_json::from_str(&output).expect("doctor --json should emit valid JSON");

        assert_eq!(payload["overall_status"], "pass");
        let checks = payload["checks"].as_array().expect("checks array");
        assert!(checks.iter().any(|check| check["name"] == "database_connectivity"
            && check["status"] == "pass"));
    });
}

#[test]
fn doctor_reports_failure_when_config_invalid() {
    with_env(&[("INVENTARIO_DATABASE_URL", "mysql://nope")], || {
        let output = doctor::run(true);
        let payload: Value =
            serde_json::from_str(&output).expect("doctor --json should emit valid JSON");

        assert_eq!(payload["overall_status"], "fail");
        let checks = payload["checks"].as_array().expect("checks array");
        assert!(checks.iter().any(|check| check["name"] == "config_validation"
            && check["status"] == "fail"));
        assert!(checks.iter().any(|check| check["name"] == "database_connectivity"
            && check["status"] == "skipped"));
    });
}

#[test]
fn doctor_human_output_lists_every_check() {
    with_env(&[("INVENTARIO_DATABASE_URL", "sqlite::memory:")], || {
        let output = doctor::run(false);

        assert!(output.contains("doctor: all readiness checks passed"));
        assert!(output.contains("- [ok] config_validation"));
        assert!(output.contains("- [ok] database_connectivity"));
    });
}

fn parse_payload(output: &str) -> Value {
    serde_json::from_str(output).expect("command output should be valid JSON")
}

fn with_env(vars: &[(&str, &str)], test_fn: impl FnOnce()) {
    static ENV_LOCK: OnceLock<Mutex<()>> = OnceLock::new();
    let _guard =
        ENV_LOCK.get_or_init(|| Mutex::new(())).lock().expect("env mutex should not be poisoned");

    let keys = [
        "INVENTARIO_DATABASE_URL",
        "INVENTARIO_DATABASE_MAX_CONNECTIONS",
        "INVENTARIO_DATABASE_TIMEOUT_SECS",
        "INVENTARIO_SERVER_BIND_ADDRESS",
        "INVENTARIO_SERVER_PORT",
        "INVENTARIO_SERVER_GRACEFUL_SHUTDOWN_SECS",
        "INVENTARIO_AUTH_ADMIN_PASSWORD",
        "INVENTARIO_AUTH_USER_PASSWORD",
        "INVENTARIO_AUTH_SESSION_TTL_MINUTES",
        "INVENTARIO_LOGGING_LEVEL",
        "INVENTARIO_LOGGING_FORMAT",
        "INVENTARIO_LOG_LEVEL",
        "INVENTARIO_LOG_FORMAT",
    ];

    let previous_values: Vec<(&str, Option<String>)> =
        keys.iter().map(|key| (*key, env::var(key).ok())).collect();

    for key in &keys {
        env::remove_var(key);
    }
    for (key, value) in vars {
        env::set_var(key, value);
    }

    test_fn();

    for (key, value) in previous_values {
        if let Some(value) = value {
            env::set_var(key, value);
        } else {
            env::remove_var(key);
        }
    }
}
