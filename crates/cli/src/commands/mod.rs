pub mod config;
pub mod doctor;
pub mod migrate;
pub mod seed;

use std::future::Future;

use serde::Serialize;

use inventario_core::config::{AppConfig, LoadOptions};
use inventario_db::{connect_with_settings, migrations, DbPool};

/// Outcome of one subcommand: a single JSON line for stdout plus the
/// process exit code derived from the failure class.
#[derive(Debug, Clone)]
pub struct CommandResult {
    pub exit_code: u8,
    pub output: String,
}

#[derive(Debug, Serialize)]
struct Outcome<'a> {
    command: &'a str,
    status: &'a str,
    error_class: Option<&'a str>,
    message: String,
}

impl CommandResult {
    pub fn success(command: &str, message: impl Into<String>) -> Self {
        Self::emit(command, "ok", None, message.into(), 0)
    }

    pub fn failure(
        command: &str,
        error_class: &str,
        message: impl Into<String>,
        exit_code: u8,
    ) -> Self {
        Self::emit(command, "error", Some(error_class), message.into(), exit_code)
    }

    fn emit(
        command: &str,
        status: &str,
        error_class: Option<&str>,
        message: String,
        exit_code: u8,
    ) -> Self {
        let outcome = Outcome { command, status, error_class, message };
        let output = serde_json::to_string(&outcome).unwrap_or_else(|error| {
            format!(
                "{{\"command\":\"{command}\",\"status\":\"error\",\"error_class\":\"serialization\",\"message\":\"{}\"}}",
                error.to_string().replace('\\', "\\\\").replace('"', "\\\"")
            )
        });
        Self { exit_code, output }
    }
}

pub(crate) struct Failure {
    pub class: &'static str,
    pub message: String,
    pub code: u8,
}

impl Failure {
    pub fn new(class: &'static str, message: impl Into<String>, code: u8) -> Self {
        Self { class, message: message.into(), code }
    }
}

/// Shared scaffolding for subcommands that need the database: load and
/// validate configuration, build a current-thread runtime, open the pool,
/// then hand the task a pool with migrations already applied.
///
/// Exit codes 2 (config), 3 (runtime), 4 (connectivity), and 5 (migration)
/// are assigned here; tasks supply their own classes and codes beyond that.
pub(crate) fn with_migrated_database<F, Fut>(command: &str, task: F) -> CommandResult
where
    F: FnOnce(DbPool) -> Fut,
    Fut: Future<Output = Result<String, Failure>>,
{
    let config = match AppConfig::load(LoadOptions::default()) {
        Ok(config) => config,
        Err(error) => {
            return CommandResult::failure(
                command,
                "config_validation",
                format!("configuration issue: {error}"),
                2,
            );
        }
    };

    let runtime = match tokio::runtime::Builder::new_current_thread().enable_all().build() {
        Ok(runtime) => runtime,
        Err(error) => {
            return CommandResult::failure(
                command,
                "runtime_init",
                format!("failed to initialize async runtime: {error}"),
                3,
            );
        }
    };

    let outcome = runtime.block_on(async {
        let pool = connect_with_settings(
            &config.database.url,
            config.database.max_connections,
            config.database.timeout_secs,
        )
        .await
        .map_err(|error| Failure::new("db_connectivity", error.to_string(), 4))?;

        migrations::run_pending(&pool)
            .await
            .map_err(|error| Failure::new("migration", error.to_string(), 5))?;

        let result = task(pool.clone()).await;
        pool.close().await;
        result
    });

    match outcome {
        Ok(message) => CommandResult::success(command, message),
        Err(failure) => {
            CommandResult::failure(command, failure.class, failure.message, failure.code)
        }
    }
}
