use chrono::{DateTime, FixedOffset};
use serde::Deserialize;
use sqlx::FromRow;
use uuid::Uuid;

pub const TABLE_NAME: &str = "public.user_message";

#[derive(Clone, Debug, Deserialize, FromRow)]
pub struct UserMessage {
    pub id: Uuid,
    pub sender_id: Uuid,
    pub receiver_id: Uuid,
    pub message: String,
    pub is_read: bool,
    pub created_date: DateTime<FixedOffset>,
}
