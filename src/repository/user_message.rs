use sqlx::{Postgres, Transaction};
use uuid::Uuid;

use crate::model::user_message::{UserMessage, TABLE_NAME};

/// Messages exchanged between two users, oldest first. With `after`, only
/// messages ordered strictly after that message are returned.
pub async fn get_messages_between(
    tx: &mut Transaction<'_, Postgres>,
    user_a: &Uuid,
    user_b: &Uuid,
    after: Option<&UserMessage>,
) -> anyhow::Result<Vec<UserMessage>> {
    let pair_filter = r#"((sender_id = $1 AND receiver_id = $2)
        OR (sender_id = $2 AND receiver_id = $1))"#;
    let data: Vec<UserMessage> = match after {
        Some(after) => {
            sqlx::query_as(
                format!(
                    r#"SELECT * FROM {} WHERE {}
                    AND (created_date, id) > ($3, $4)
                    ORDER BY created_date ASC, id ASC"#,
                    TABLE_NAME, pair_filter
                )
                .as_str(),
            )
            .bind(user_a)
            .bind(user_b)
            .bind(after.created_date)
            .bind(after.id)
            .fetch_all(&mut **tx)
            .await?
        }
        None => {
            sqlx::query_as(
                format!(
                    "SELECT * FROM {} WHERE {} ORDER BY created_date ASC, id ASC",
                    TABLE_NAME, pair_filter
                )
                .as_str(),
            )
            .bind(user_a)
            .bind(user_b)
            .fetch_all(&mut **tx)
            .await?
        }
    };
    Ok(data)
}

pub async fn get_message_by_id(
    tx: &mut Transaction<'_, Postgres>,
    id: &Uuid,
) -> anyhow::Result<Option<UserMessage>> {
    let message: Option<UserMessage> =
        sqlx::query_as(format!("SELECT * FROM {} WHERE id = $1", TABLE_NAME).as_str())
            .bind(id)
            .fetch_optional(&mut **tx)
            .await?;
    Ok(message)
}

pub async fn create_message(
    tx: &mut Transaction<'_, Postgres>,
    message: &UserMessage,
) -> anyhow::Result<()> {
    sqlx::query(
        format!(
            r#"INSERT INTO {} (id, sender_id, receiver_id, message, is_read, created_date)
            VALUES ($1, $2, $3, $4, $5, $6)"#,
            TABLE_NAME
        )
        .as_str(),
    )
    .bind(message.id)
    .bind(message.sender_id)
    .bind(message.receiver_id)
    .bind(&message.message)
    .bind(message.is_read)
    .bind(message.created_date)
    .execute(&mut **tx)
    .await?;
    Ok(())
}

/// Mark everything `sender_id` sent to `receiver_id` as read. Returns the
/// number of messages changed.
pub async fn mark_messages_read(
    tx: &mut Transaction<'_, Postgres>,
    sender_id: &Uuid,
    receiver_id: &Uuid,
) -> anyhow::Result<u64> {
    let res = sqlx::query(
        format!(
            r#"UPDATE {} SET is_read = TRUE
            WHERE sender_id = $1 AND receiver_id = $2 AND is_read = FALSE"#,
            TABLE_NAME
        )
        .as_str(),
    )
    .bind(sender_id)
    .bind(receiver_id)
    .execute(&mut **tx)
    .await?;
    Ok(res.rows_affected())
}
