use std::process::ExitStatus;

use sqlx::PgPool;
use tokio::process::Command;

use crate::settings::Config;

fn check_status(action: &str, status: ExitStatus) -> anyhow::Result<()> {
    if !status.success() {
        anyhow::bail!("sqlx migrate {action} exited with {status}");
    }
    Ok(())
}

/// Needs `sqlx-cli` on the path.
pub async fn db_generate(migration_name: &str) -> anyhow::Result<()> {
    let status = Command::new("sqlx")
        .arg("migrate")
        .arg("add")
        .arg(migration_name)
        .arg("-r")
        .status()
        .await?;
    check_status("add", status)
}

pub async fn db_list(config: &Config) -> anyhow::Result<()> {
    let status = Command::new("sqlx")
        .arg("migrate")
        .arg("info")
        .arg("-D")
        .arg(&config.database_url)
        .status()
        .await?;
    check_status("info", status)
}

/// Applies the migrations embedded at build time, so no `sqlx-cli` is needed.
pub async fn db_migrate(pool: &PgPool) -> anyhow::Result<()> {
    sqlx::migrate!("./migrations").run(pool).await?;
    Ok(())
}

pub async fn db_revert(config: &Config) -> anyhow::Result<()> {
    let status = Command::new("sqlx")
        .arg("migrate")
        .arg("revert")
        .arg("-D")
        .arg(&config.database_url)
        .status()
        .await?;
    check_status("revert", status)
}
