use std::sync::Arc;

use super::security::{generate_refresh_token_from_user, generate_token_from_user};
use crate::ai::gemini::GeminiClient;
use crate::core::security::hash_password;
use crate::core::session::add_session;
use crate::model::user::User;
use crate::settings::{get_config, Config};
use crate::AppState;
use chrono::Local;
use redis::ConnectionLike;
use sqlx::pool::PoolConnection;
use sqlx::{PgPool, Postgres};
use uuid::Uuid;

pub struct TestUser {
    pub user: User,
    pub token: String,
    pub refresh_token: String,
}

/// Config for route tests: `/api` prefix and no AI provider key, so the
/// matchmaker always answers with its fallback.
pub fn test_config() -> anyhow::Result<Config> {
    let mut config = get_config()?;
    config.prefix = Some("/api".to_string());
    config.gemini_api_key = None;
    Ok(config)
}

pub fn test_app_state(pool: PgPool, config: &Config) -> anyhow::Result<Arc<AppState>> {
    let client = redis::Client::open(config.redis_url.clone())?;
    let redis_pool = r2d2::Pool::builder().build(client)?;
    Ok(Arc::new(AppState {
        db: pool,
        redis_conn: redis_pool,
        config: config.clone(),
        ai: GeminiClient::new(config)?,
    }))
}

pub async fn generate_test_user<C: ConnectionLike>(
    db: &mut PoolConnection<Postgres>,
    redis_conn: &mut C,
    config: Config,
    email: &str,
    password: &str,
) -> anyhow::Result<TestUser> {
    // Prepare user
    let hashed_password = hash_password(password).unwrap();
    let now = Local::now().fixed_offset();
    let user = User {
        id: Uuid::now_v7(),
        email: email.to_lowercase(),
        password: hashed_password,
        created_date: Some(now),
        updated_date: Some(now),
    };

    // create user on db
    sqlx::query(
        r#"
        INSERT INTO public.user (id, email, password, created_date, updated_date)
        VALUES ($1, $2, $3, $4, $5)
        "#,
    )
    .bind(user.id)
    .bind(&user.email)
    .bind(&user.password)
    .bind(user.created_date)
    .bind(user.updated_date)
    .execute(&mut **db)
    .await?;

    // Generate token
    let token = generate_token_from_user(&user, &config)?;
    let refresh_token = generate_refresh_token_from_user(&user, &config)?;
    add_session(redis_conn, &user, &config, &token, &refresh_token)?;

    Ok(TestUser {
        user,
        token,
        refresh_token,
    })
}

#[cfg(test)]
mod tests {
    use sqlx::{Acquire, PgPool};
    use uuid::Uuid;

    use crate::{
        core::{
            security::get_user_from_token, session::get_session, test_utils::generate_test_user,
        },
        settings::get_config,
    };

    #[sqlx::test]
    async fn test_generate_test_user(pool: PgPool) -> anyhow::Result<()> {
        // Given
        let config = get_config()?;
        let client = redis::Client::open(config.redis_url.clone()).unwrap();
        let mut redis_conn = client.get_connection().unwrap();

        // When
        let mut db = pool.acquire().await?;
        let res = generate_test_user(
            &mut db,
            &mut redis_conn,
            config.clone(),
            "TestUser@Mail.com",
            "testpassword",
        )
        .await?;

        // Expect
        // is user exists on db
        let user: Option<(Uuid, String)> =
            sqlx::query_as("SELECT id, email FROM public.user WHERE id = $1")
                .bind(res.user.id)
                .fetch_optional(&mut *db)
                .await?;
        assert_eq!(user.map(|x| x.1), Some("testuser@mail.com".to_string()));

        // is jwt token valid
        let mut tx = db.begin().await?;
        let user_token =
            get_user_from_token(&mut tx, &mut redis_conn, Some(res.token.clone())).await?;
        assert!(user_token.is_some());
        assert_eq!(user_token.unwrap().email, "testuser@mail.com".to_string());

        // is user exists on redis
        let session = get_session(&mut redis_conn, &res.token)?;
        assert!(session.is_some());
        Ok(())
    }
}
