use redis::ConnectionLike;
use serde::{Deserialize, Serialize};

use crate::{model::user::User, settings::Config};

#[derive(Debug, Serialize, Deserialize)]
pub struct SessionData {
    pub user_id: String,
    pub refresh_token: String,
}

fn session_key(token: &str) -> String {
    format!("session:{token}")
}

/// Register an access token as a live session for `jwt_exp` minutes.
pub fn add_session<C: ConnectionLike>(
    redis_conn: &mut C,
    user: &User,
    config: &Config,
    token: &str,
    refresh_token: &str,
) -> anyhow::Result<()> {
    let session_data = SessionData {
        user_id: user.id.to_string(),
        refresh_token: refresh_token.to_string(),
    };
    let session_json = serde_json::to_string(&session_data)?;
    redis::Cmd::set_ex(session_key(token), session_json, config.jwt_exp as u64 * 60)
        .exec(redis_conn)?;
    Ok(())
}

pub fn get_session<C: ConnectionLike>(
    redis_conn: &mut C,
    token: &str,
) -> anyhow::Result<Option<SessionData>> {
    let res: Option<String> = redis::cmd("GET").arg(session_key(token)).query(redis_conn)?;
    match res {
        Some(res) => Ok(Some(serde_json::from_str(&res)?)),
        None => Ok(None),
    }
}

/// Drop a session. Returns false when the token had no live session.
pub fn remove_session<C: ConnectionLike>(redis_conn: &mut C, token: &str) -> anyhow::Result<bool> {
    let removed: i64 = redis::cmd("DEL").arg(session_key(token)).query(redis_conn)?;
    Ok(removed > 0)
}
