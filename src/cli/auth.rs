use chrono::Local;
use sqlx::PgPool;
use uuid::Uuid;

use crate::{core::security::hash_password, model::user::User, repository};

pub async fn create_user(pool: &PgPool, email: &str, password: &str) -> anyhow::Result<User> {
    let mut tx = pool.begin().await?;

    let hashed_password =
        hash_password(password).map_err(|err| anyhow::anyhow!("hash password: {err}"))?;
    let now = Local::now().fixed_offset();
    let user = User {
        id: Uuid::now_v7(),
        email: email.trim().to_lowercase(),
        password: hashed_password,
        created_date: Some(now),
        updated_date: Some(now),
    };
    if !repository::user::create_user(&mut tx, &user).await? {
        anyhow::bail!("email {} already exists", user.email);
    }
    tx.commit().await?;
    tracing::info!("user {} created from cli", user.id);
    Ok(user)
}
