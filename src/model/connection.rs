use std::{fmt, str::FromStr};

use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

pub const TABLE_NAME: &str = "public.connection";

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConnectionStatus {
    Pending,
    Accepted,
    Rejected,
}

impl ConnectionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ConnectionStatus::Pending => "pending",
            ConnectionStatus::Accepted => "accepted",
            ConnectionStatus::Rejected => "rejected",
        }
    }

    /// Accepted and rejected records never change again.
    pub fn is_terminal(&self) -> bool {
        !matches!(self, ConnectionStatus::Pending)
    }
}

impl fmt::Display for ConnectionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ConnectionStatus {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(ConnectionStatus::Pending),
            "accepted" => Ok(ConnectionStatus::Accepted),
            "rejected" => Ok(ConnectionStatus::Rejected),
            other => Err(anyhow::anyhow!("unknown connection status {other}")),
        }
    }
}

#[derive(Clone, Debug, Deserialize, FromRow)]
pub struct Connection {
    pub id: Uuid,
    pub sender_id: Uuid,
    pub receiver_id: Uuid,
    pub status: String,
    pub created_date: Option<DateTime<FixedOffset>>,
    pub updated_date: Option<DateTime<FixedOffset>>,
}

impl Connection {
    pub fn status(&self) -> anyhow::Result<ConnectionStatus> {
        self.status.parse()
    }
}

/// Incoming pending request joined with the sender profile.
#[derive(Clone, Debug, FromRow)]
pub struct PendingConnection {
    pub id: Uuid,
    pub sender_id: Uuid,
    pub receiver_id: Uuid,
    pub status: String,
    pub created_date: Option<DateTime<FixedOffset>>,
    pub sender_name: String,
    pub sender_image: Option<String>,
    pub sender_profile_id: Option<Uuid>,
}

/// Accepted connection joined with whichever side is not the viewer.
#[derive(Clone, Debug, FromRow)]
pub struct AcceptedConnection {
    pub id: Uuid,
    pub sender_id: Uuid,
    pub receiver_id: Uuid,
    pub status: String,
    pub created_date: Option<DateTime<FixedOffset>>,
    pub friend_id: Uuid,
    pub friend_name: String,
    pub friend_image: Option<String>,
    pub friend_profile_id: Option<Uuid>,
}
