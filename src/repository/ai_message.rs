use sqlx::{Postgres, Transaction};
use uuid::Uuid;

use crate::model::ai_message::{AiMessage, TABLE_NAME};

/// Conversation log of `user_id`, oldest first.
pub async fn get_ai_messages(
    tx: &mut Transaction<'_, Postgres>,
    user_id: &Uuid,
) -> anyhow::Result<Vec<AiMessage>> {
    let data: Vec<AiMessage> = sqlx::query_as(
        format!(
            "SELECT * FROM {} WHERE user_id = $1 ORDER BY created_date ASC, id ASC",
            TABLE_NAME
        )
        .as_str(),
    )
    .bind(user_id)
    .fetch_all(&mut **tx)
    .await?;
    Ok(data)
}

/// The last `limit` entries of the conversation log of `user_id`, oldest
/// first.
pub async fn get_recent_ai_messages(
    tx: &mut Transaction<'_, Postgres>,
    user_id: &Uuid,
    limit: u32,
) -> anyhow::Result<Vec<AiMessage>> {
    let mut data: Vec<AiMessage> = sqlx::query_as(
        format!(
            "SELECT * FROM {} WHERE user_id = $1 ORDER BY created_date DESC, id DESC LIMIT $2",
            TABLE_NAME
        )
        .as_str(),
    )
    .bind(user_id)
    .bind(limit as i64)
    .fetch_all(&mut **tx)
    .await?;
    data.reverse();
    Ok(data)
}

pub async fn create_ai_message(
    tx: &mut Transaction<'_, Postgres>,
    message: &AiMessage,
) -> anyhow::Result<()> {
    sqlx::query(
        format!(
            r#"INSERT INTO {} (id, user_id, sender, text, related_profile_ids, created_date)
            VALUES ($1, $2, $3, $4, $5, $6)"#,
            TABLE_NAME
        )
        .as_str(),
    )
    .bind(message.id)
    .bind(message.user_id)
    .bind(&message.sender)
    .bind(&message.text)
    .bind(&message.related_profile_ids)
    .bind(message.created_date)
    .execute(&mut **tx)
    .await?;
    Ok(())
}
