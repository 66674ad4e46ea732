use crate::commands::{self, CommandResult};
use inventario_db::migrations::MIGRATOR;

pub fn run() -> CommandResult {
    commands::with_migrated_database("migrate", |_pool| async move {
        Ok(format!("applied pending migrations ({} known)", MIGRATOR.iter().count()))
    })
}
