use chrono::Local;
use sqlx::PgPool;
use uuid::Uuid;

use crate::model::connection::{Connection, ConnectionStatus};

/// Connections need two existing users, so there is no faker struct here.
/// `ext` carries the `(sender_id, receiver_id)` pair.
pub struct ConnectionFactory {
    status: ConnectionStatus,
}

impl Default for ConnectionFactory {
    fn default() -> Self {
        Self::new()
    }
}

impl ConnectionFactory {
    pub fn new() -> Self {
        Self {
            status: ConnectionStatus::Pending,
        }
    }

    pub fn with_status(&mut self, status: ConnectionStatus) {
        self.status = status
    }

    pub async fn generate_one(
        &mut self,
        db: &PgPool,
        ext: (Uuid, Uuid),
    ) -> anyhow::Result<Connection> {
        let now = Local::now().fixed_offset();
        let data = Connection {
            id: Uuid::now_v7(),
            sender_id: ext.0,
            receiver_id: ext.1,
            status: self.status.as_str().to_string(),
            created_date: Some(now),
            updated_date: Some(now),
        };
        sqlx::query(
            r#"
        INSERT INTO public.connection (id, sender_id, receiver_id, status, created_date, updated_date)
        VALUES ($1, $2, $3, $4, $5, $6)"#,
        )
        .bind(data.id)
        .bind(data.sender_id)
        .bind(data.receiver_id)
        .bind(&data.status)
        .bind(data.created_date)
        .bind(data.updated_date)
        .execute(db)
        .await?;
        Ok(data)
    }
}
