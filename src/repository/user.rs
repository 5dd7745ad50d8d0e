use sqlx::{Postgres, Transaction};
use uuid::Uuid;

use crate::model::user::{User, TABLE_NAME};

pub async fn get_user_by_id(
    tx: &mut Transaction<'_, Postgres>,
    id: &Uuid,
) -> anyhow::Result<Option<User>> {
    let user: Option<User> =
        sqlx::query_as(format!("SELECT * FROM {} WHERE id = $1", TABLE_NAME).as_str())
            .bind(id)
            .fetch_optional(&mut **tx)
            .await?;
    Ok(user)
}

pub async fn get_user_by_email(
    tx: &mut Transaction<'_, Postgres>,
    email: &str,
) -> anyhow::Result<Option<User>> {
    let user: Option<User> = sqlx::query_as(
        format!("SELECT * FROM {} WHERE lower(email) = lower($1)", TABLE_NAME).as_str(),
    )
    .bind(email.trim())
    .fetch_optional(&mut **tx)
    .await?;
    Ok(user)
}

/// Insert a user. Returns false when the email is already registered.
pub async fn create_user(tx: &mut Transaction<'_, Postgres>, user: &User) -> anyhow::Result<bool> {
    let res = sqlx::query(
        format!(
            r#"INSERT INTO {} (id, email, password, created_date, updated_date)
            VALUES ($1, $2, $3, $4, $5)
            ON CONFLICT (email) DO NOTHING"#,
            TABLE_NAME
        )
        .as_str(),
    )
    .bind(user.id)
    .bind(&user.email)
    .bind(&user.password)
    .bind(user.created_date)
    .bind(user.updated_date)
    .execute(&mut **tx)
    .await?;
    Ok(res.rows_affected() == 1)
}
