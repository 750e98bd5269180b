//! 重置桌台: 将 1..=TABLE_COUNT 号桌全部置为空闲
//!
//! ```text
//! TABLE_COUNT=20 cargo run --bin init-tables
//! ```

use pos_server::{Config, db, setup_environment};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    setup_environment();

    let config = Config::from_env()?;
    config.ensure_work_dir_structure()?;

    let db_path = config.database_path();
    let db = db::connect(
        &db_path.to_string_lossy(),
        &config.db_namespace,
        &config.db_name,
    )
    .await?;

    let count = db::seed::reset_tables(&db, config.table_count).await?;
    tracing::info!(count, path = %db_path.display(), "Dining tables reset to free");
    println!("Initialized {} tables", count);

    Ok(())
}
