//! Migrate command handler

use crate::config::Config;
use crate::db::Store;
use crate::services::bootstrap;

pub async fn cmd_migrate(config: &Config) -> anyhow::Result<()> {
    let store = Store::connect(
        &config.general.database_path,
        config.general.max_db_connections,
        config.general.min_db_connections,
    )
    .await?;

    let report = store.migrate().await?;

    println!("Migrations");
    println!("{:-<50}", "");
    for unit in &report.ran {
        println!("  ran      {unit}");
    }
    for unit in &report.skipped {
        println!("  present  {unit}");
    }
    for column in &report.columns_added {
        println!("  column   {column}");
    }
    println!(
        "{} ran, {} already present, {} column(s) added",
        report.ran.len(),
        report.skipped.len(),
        report.columns_added.len()
    );

    let outcome = bootstrap::reconcile_admin(&store).await?;

    println!();
    match outcome.promoted {
        Some(user_id) => println!(
            "Promoted account {user_id} to admin ({} orphaned movie(s) adopted)",
            outcome.movies_adopted
        ),
        None => println!("Admin account already in place, nothing to reconcile"),
    }

    Ok(())
}
