use crate::commands::{self, CommandResult, Failure};
use inventario_db::SeedDataset;

pub fn run() -> CommandResult {
    commands::with_migrated_database("seed", |pool| async move {
        let seed_result = SeedDataset::load(&pool)
            .await
            .map_err(|error| Failure::new("seed_execution", error.to_string(), 5))?;

        let verification = SeedDataset::verify(&pool)
            .await
            .map_err(|error| Failure::new("seed_verification", error.to_string(), 6))?;
        if !verification.all_present {
            return Err(Failure::new(
                "seed_verification",
                verification_message(&verification.checks),
                6,
            ));
        }

        Ok(if seed_result.loaded {
            format!("demo catalog loaded: {} productos", seed_result.product_count)
        } else {
            format!(
                "demo catalog already present ({} productos), nothing to do",
                seed_result.product_count
            )
        })
    })
}

fn verification_message(checks: &[(&'static str, bool)]) -> String {
    let failed: Vec<&str> =
        checks.iter().filter_map(|(code, passed)| (!passed).then_some(*code)).collect();
    if failed.is_empty() {
        "seed data failed to load".to_string()
    } else {
        format!("seed verification failed for codes: {}", failed.join(", "))
    }
}
