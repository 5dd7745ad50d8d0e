use chrono::{DateTime, FixedOffset};
use sqlx::{Postgres, Transaction};
use uuid::Uuid;

use crate::model::{
    connection::{AcceptedConnection, Connection, ConnectionStatus, PendingConnection, TABLE_NAME},
    profile::TABLE_NAME as PROFILE_TABLE_NAME,
};

/// Insert a pending request. Returns false when any record already exists
/// between the two users, in either direction.
pub async fn create_connection(
    tx: &mut Transaction<'_, Postgres>,
    connection: &Connection,
) -> anyhow::Result<bool> {
    let res = sqlx::query(
        format!(
            r#"INSERT INTO {} (id, sender_id, receiver_id, status, created_date, updated_date)
            VALUES ($1, $2, $3, $4, $5, $6)
            ON CONFLICT DO NOTHING"#,
            TABLE_NAME
        )
        .as_str(),
    )
    .bind(connection.id)
    .bind(connection.sender_id)
    .bind(connection.receiver_id)
    .bind(&connection.status)
    .bind(connection.created_date)
    .bind(connection.updated_date)
    .execute(&mut **tx)
    .await?;
    Ok(res.rows_affected() == 1)
}

pub async fn get_connection_by_id(
    tx: &mut Transaction<'_, Postgres>,
    id: &Uuid,
) -> anyhow::Result<Option<Connection>> {
    let connection: Option<Connection> =
        sqlx::query_as(format!("SELECT * FROM {} WHERE id = $1", TABLE_NAME).as_str())
            .bind(id)
            .fetch_optional(&mut **tx)
            .await?;
    Ok(connection)
}

/// Move a pending record to `status`. Returns the updated record, or `None`
/// when the record is no longer pending.
pub async fn respond_connection(
    tx: &mut Transaction<'_, Postgres>,
    id: &Uuid,
    status: ConnectionStatus,
    updated_date: DateTime<FixedOffset>,
) -> anyhow::Result<Option<Connection>> {
    let connection: Option<Connection> = sqlx::query_as(
        format!(
            r#"UPDATE {} SET status = $2, updated_date = $3
            WHERE id = $1 AND status = $4
            RETURNING *"#,
            TABLE_NAME
        )
        .as_str(),
    )
    .bind(id)
    .bind(status.as_str())
    .bind(updated_date)
    .bind(ConnectionStatus::Pending.as_str())
    .fetch_optional(&mut **tx)
    .await?;
    Ok(connection)
}

/// Incoming pending requests of `user_id`, newest first.
pub async fn get_pending_connections(
    tx: &mut Transaction<'_, Postgres>,
    user_id: &Uuid,
) -> anyhow::Result<Vec<PendingConnection>> {
    let data: Vec<PendingConnection> = sqlx::query_as(
        format!(
            r#"SELECT c.id, c.sender_id, c.receiver_id, c.status, c.created_date,
                COALESCE(p.name, 'Unknown User') AS sender_name,
                p.image_url AS sender_image,
                p.id AS sender_profile_id
            FROM {} c
            LEFT JOIN {} p ON p.user_id = c.sender_id
            WHERE c.receiver_id = $1 AND c.status = $2
            ORDER BY c.created_date DESC, c.id DESC"#,
            TABLE_NAME, PROFILE_TABLE_NAME
        )
        .as_str(),
    )
    .bind(user_id)
    .bind(ConnectionStatus::Pending.as_str())
    .fetch_all(&mut **tx)
    .await?;
    Ok(data)
}

/// Accepted connections of `user_id` in both directions, each joined with
/// the profile of the other party.
pub async fn get_accepted_connections(
    tx: &mut Transaction<'_, Postgres>,
    user_id: &Uuid,
) -> anyhow::Result<Vec<AcceptedConnection>> {
    let data: Vec<AcceptedConnection> = sqlx::query_as(
        format!(
            r#"SELECT c.id, c.sender_id, c.receiver_id, c.status, c.created_date,
                CASE WHEN c.sender_id = $1 THEN c.receiver_id ELSE c.sender_id END AS friend_id,
                COALESCE(
                    CASE WHEN c.sender_id = $1 THEN rp.name ELSE sp.name END,
                    'Unknown User'
                ) AS friend_name,
                CASE WHEN c.sender_id = $1 THEN rp.image_url ELSE sp.image_url END AS friend_image,
                CASE WHEN c.sender_id = $1 THEN rp.id ELSE sp.id END AS friend_profile_id
            FROM {0} c
            LEFT JOIN {1} sp ON sp.user_id = c.sender_id
            LEFT JOIN {1} rp ON rp.user_id = c.receiver_id
            WHERE (c.sender_id = $1 OR c.receiver_id = $1) AND c.status = $2
            ORDER BY c.updated_date DESC, c.id DESC"#,
            TABLE_NAME, PROFILE_TABLE_NAME
        )
        .as_str(),
    )
    .bind(user_id)
    .bind(ConnectionStatus::Accepted.as_str())
    .fetch_all(&mut **tx)
    .await?;
    Ok(data)
}

pub async fn get_all_connections(
    tx: &mut Transaction<'_, Postgres>,
    user_id: &Uuid,
) -> anyhow::Result<Vec<Connection>> {
    let data: Vec<Connection> = sqlx::query_as(
        format!(
            r#"SELECT * FROM {}
            WHERE sender_id = $1 OR receiver_id = $1
            ORDER BY created_date DESC, id DESC"#,
            TABLE_NAME
        )
        .as_str(),
    )
    .bind(user_id)
    .fetch_all(&mut **tx)
    .await?;
    Ok(data)
}

/// The record between two users regardless of who sent it.
pub async fn get_connection_between(
    tx: &mut Transaction<'_, Postgres>,
    user_a: &Uuid,
    user_b: &Uuid,
) -> anyhow::Result<Option<Connection>> {
    let connection: Option<Connection> = sqlx::query_as(
        format!(
            r#"SELECT * FROM {}
            WHERE (sender_id = $1 AND receiver_id = $2)
                OR (sender_id = $2 AND receiver_id = $1)
            LIMIT 1"#,
            TABLE_NAME
        )
        .as_str(),
    )
    .bind(user_a)
    .bind(user_b)
    .fetch_optional(&mut **tx)
    .await?;
    Ok(connection)
}

pub async fn is_connected(
    tx: &mut Transaction<'_, Postgres>,
    user_a: &Uuid,
    user_b: &Uuid,
) -> anyhow::Result<bool> {
    let connection = get_connection_between(tx, user_a, user_b).await?;
    Ok(matches!(
        connection.map(|x| x.status()).transpose()?,
        Some(ConnectionStatus::Accepted)
    ))
}
