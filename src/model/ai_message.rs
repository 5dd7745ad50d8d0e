use chrono::{DateTime, FixedOffset};
use serde::Deserialize;
use sqlx::FromRow;
use uuid::Uuid;

pub const TABLE_NAME: &str = "public.ai_message";

pub const SENDER_USER: &str = "user";
pub const SENDER_AI: &str = "ai";

#[derive(Clone, Debug, Deserialize, FromRow)]
pub struct AiMessage {
    pub id: Uuid,
    pub user_id: Uuid,
    pub sender: String,
    pub text: String,
    pub related_profile_ids: Vec<String>,
    pub created_date: DateTime<FixedOffset>,
}
