use argon2::{
    password_hash::{rand_core::OsRng, PasswordHasher, SaltString},
    Argon2, PasswordHash, PasswordVerifier,
};
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use poem::Request;
use poem_openapi::{auth::Bearer, SecurityScheme};
use redis::ConnectionLike;
use serde::{Deserialize, Serialize};
use sqlx::{Postgres, Transaction};
use uuid::Uuid;

use crate::{model::user::User, repository::user::get_user_by_id, settings::Config};

use super::session::get_session;

/// password hashing
pub fn hash_password(password: &str) -> Result<String, argon2::password_hash::Error> {
    let salt = SaltString::generate(&mut OsRng);

    // Argon2id v19, default params
    let argon2 = Argon2::default();
    let password_hash = argon2
        .hash_password(password.as_bytes(), &salt)?
        .to_string();

    Ok(password_hash)
}

/// password hash verification
pub fn verify_hash_password(
    password: &str,
    password_hash: &str,
) -> Result<bool, argon2::password_hash::Error> {
    let parsed_hash = PasswordHash::new(password_hash)?;
    let verify = Argon2::default()
        .verify_password(password.as_bytes(), &parsed_hash)
        .is_ok();
    Ok(verify)
}

pub struct Keys {
    pub encoding: EncodingKey,
    pub decoding: DecodingKey,
}

impl Keys {
    fn new(secret: &[u8]) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret),
            decoding: DecodingKey::from_secret(secret),
        }
    }
}

const ACCESS_TOKEN: &str = "access";
const REFRESH_TOKEN: &str = "refresh";

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Claims {
    pub id: String,
    pub email: String,
    pub exp: i64,
    pub type_key: String,
}

impl Claims {
    fn new(user: &User, minutes: u16, type_key: &str) -> Self {
        let exp = (Utc::now() + Duration::minutes(minutes as i64)).timestamp();
        Self {
            id: user.id.to_string(),
            email: user.email.clone(),
            exp,
            type_key: type_key.to_string(),
        }
    }
}

/// Generate token
pub fn encode_token(claims: &Claims, jwt_secret: &str) -> anyhow::Result<String> {
    let keys = Keys::new(jwt_secret.as_bytes());
    let token = encode(&Header::default(), claims, &keys.encoding)?;
    Ok(token)
}

/// Extract payload and validate token
pub fn decode_token(token: &str, jwt_secret: &str) -> anyhow::Result<Claims> {
    let keys = Keys::new(jwt_secret.as_bytes());
    let token_data = decode::<Claims>(token, &keys.decoding, &Validation::default())?;
    Ok(token_data.claims)
}

pub fn generate_token_from_user(user: &User, config: &Config) -> anyhow::Result<String> {
    let claims = Claims::new(user, config.jwt_exp, ACCESS_TOKEN);
    encode_token(&claims, &config.jwt_secret)
}

pub fn generate_refresh_token_from_user(user: &User, config: &Config) -> anyhow::Result<String> {
    let claims = Claims::new(user, config.jwt_refresh_exp, REFRESH_TOKEN);
    encode_token(&claims, &config.jwt_secret)
}

/// Resolve the session user behind an access token. `None` when the token is
/// missing, revoked or expired.
pub async fn get_user_from_token<C: ConnectionLike>(
    tx: &mut Transaction<'_, Postgres>,
    redis_conn: &mut C,
    jwt_token: Option<String>,
) -> anyhow::Result<Option<User>> {
    let Some(jwt_token) = jwt_token else {
        return Ok(None);
    };
    let Some(session) = get_session(redis_conn, &jwt_token)? else {
        return Ok(None);
    };
    let user_id = Uuid::parse_str(&session.user_id)?;
    get_user_by_id(tx, &user_id).await
}

/// Resolve the user behind a refresh token. Invalid or expired tokens and
/// access tokens presented as refresh tokens yield `None`.
pub async fn get_user_from_refresh_token(
    tx: &mut Transaction<'_, Postgres>,
    refresh_token: &str,
    config: &Config,
) -> anyhow::Result<Option<User>> {
    let claims = match decode_token(refresh_token, &config.jwt_secret) {
        Ok(val) => val,
        Err(err) => {
            tracing::debug!("rejecting refresh token: {err}");
            return Ok(None);
        }
    };
    if claims.type_key != REFRESH_TOKEN {
        return Ok(None);
    }
    let user_id = Uuid::parse_str(&claims.id)?;
    get_user_by_id(tx, &user_id).await
}

#[derive(Debug, Serialize, Deserialize)]
pub struct UserApiKey {
    pub token: Option<String>,
}

/// Bearer authorization
#[derive(SecurityScheme)]
#[oai(ty = "bearer", checker = "bearer_checker")]
pub struct BearerAuthorization(pub UserApiKey);

pub async fn bearer_checker(_req: &Request, api_key: Bearer) -> Option<UserApiKey> {
    Some(UserApiKey {
        token: Some(api_key.token),
    })
}
