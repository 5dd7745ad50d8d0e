use poem::{http::StatusCode, test::TestClient};
use serde_json::json;
use sqlx::PgPool;
use uuid::Uuid;

use crate::{
    core::{
        security::{get_user_from_token, hash_password},
        session::get_session,
        test_utils::{generate_test_user, test_app_state, test_config},
    },
    factory::user::UserFactory,
    init_openapi_route,
    model::user::User,
};

#[sqlx::test]
async fn test_signup_then_duplicate(pool: PgPool) -> anyhow::Result<()> {
    // Given
    let config = test_config()?;
    let app_state = test_app_state(pool, &config)?;
    let app = init_openapi_route(app_state.clone(), &config);
    let cli = TestClient::new(app);

    // When signup
    let json_payload = json!({
        "email": "  Priya@Mail.com ",
        "password": "password"
    });
    let resp = cli
        .post("/api/auth/signup")
        .body_json(&json_payload)
        .send()
        .await;

    // Expect signup
    resp.assert_status(StatusCode::CREATED);
    let json = resp.json().await;
    json.value()
        .object()
        .get("message")
        .assert_string("User registered successfully.");
    let user = json.value().object().get("user").object();
    user.get("email").assert_string("priya@mail.com");
    let user_id: String = user.get("id").deserialize();
    let stored: (String,) = sqlx::query_as("SELECT password FROM public.user WHERE id = $1")
        .bind(Uuid::parse_str(&user_id)?)
        .fetch_one(&app_state.db)
        .await?;
    assert_ne!(stored.0, "password".to_string());

    // When signup with the same email in another case
    let json_payload = json!({
        "email": "PRIYA@mail.com",
        "password": "other"
    });
    let resp = cli
        .post("/api/auth/signup")
        .body_json(&json_payload)
        .send()
        .await;

    // Expect duplicate rejected
    resp.assert_status(StatusCode::BAD_REQUEST);
    resp.assert_json(&json!({"message": "Email already exists."}))
        .await;
    Ok(())
}

#[sqlx::test]
async fn test_signup_incomplete(pool: PgPool) -> anyhow::Result<()> {
    // Given
    let config = test_config()?;
    let app_state = test_app_state(pool, &config)?;
    let app = init_openapi_route(app_state.clone(), &config);
    let cli = TestClient::new(app);

    // When
    let json_payload = json!({
        "email": "a@b.com",
        "password": "   "
    });
    let resp = cli
        .post("/api/auth/signup")
        .body_json(&json_payload)
        .send()
        .await;

    // Expect
    resp.assert_status(StatusCode::BAD_REQUEST);
    resp.assert_json(&json!({"message": "Incomplete data."}))
        .await;
    let num_data: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM public.user")
        .fetch_one(&app_state.db)
        .await?;
    assert_eq!(num_data.0, 0);
    Ok(())
}

#[sqlx::test]
async fn test_login_then_logout(pool: PgPool) -> anyhow::Result<()> {
    // Given
    let config = test_config()?;
    let app_state = test_app_state(pool, &config)?;
    let mut user_factory = UserFactory::<Uuid>::new();
    user_factory.modified_one(|data, ext| User {
        id: ext,
        email: "test_user@local.com".to_string(),
        password: hash_password("password").unwrap(),
        created_date: data.created_date,
        updated_date: data.updated_date,
    });
    let user_id = Uuid::now_v7();
    user_factory.generate_one(&app_state.db, user_id).await?;
    let app = init_openapi_route(app_state.clone(), &config);
    let cli = TestClient::new(app);

    // When login
    let json_payload = json!({
        "email": "test_user@local.com",
        "password": "password"
    });
    let resp = cli
        .post("/api/auth/login")
        .body_json(&json_payload)
        .send()
        .await;

    // Expect login
    resp.assert_status_is_ok();
    let json = resp.json().await;
    json.value()
        .object()
        .get("message")
        .assert_string("Login successful.");
    json.value().object().get("token_type").assert_string("Bearer");
    json.value()
        .object()
        .get("exp_in")
        .assert_i64(config.jwt_exp as i64 * 60);
    let token = json.value().object().get_opt("token");
    assert!(token.is_some());
    let token: String = token.unwrap().deserialize();
    let mut tx = app_state.db.begin().await?;
    let mut redis_conn = app_state.redis_conn.get().unwrap();
    let user_in_token = get_user_from_token(&mut tx, &mut redis_conn, Some(token.clone())).await?;
    assert!(user_in_token.is_some());
    assert_eq!(user_in_token.unwrap().id, user_id);
    assert!(get_session(&mut redis_conn, &token)?.is_some());

    // When logout
    let resp = cli
        .post("/api/auth/logout")
        .header("authorization", format!("Bearer {}", token))
        .send()
        .await;

    // Expect logout
    resp.assert_status(StatusCode::NO_CONTENT);
    assert!(get_session(&mut redis_conn, &token)?.is_none());

    // When second logout
    let resp = cli
        .post("/api/auth/logout")
        .header("authorization", format!("Bearer {}", token))
        .send()
        .await;

    // Expect second logout
    resp.assert_status(StatusCode::UNAUTHORIZED);
    Ok(())
}

#[sqlx::test]
async fn test_login_failed(pool: PgPool) -> anyhow::Result<()> {
    // Given
    let config = test_config()?;
    let app_state = test_app_state(pool, &config)?;
    let mut db = app_state.db.acquire().await?;
    let mut redis_conn = app_state.redis_conn.get()?;
    generate_test_user(
        &mut db,
        &mut redis_conn,
        config.clone(),
        "known@local.com",
        "password",
    )
    .await?;
    let app = init_openapi_route(app_state.clone(), &config);
    let cli = TestClient::new(app);

    // When unknown email
    let resp = cli
        .post("/api/auth/login")
        .body_json(&json!({"email": "unknown@local.com", "password": "password"}))
        .send()
        .await;

    // Expect
    resp.assert_status(StatusCode::UNAUTHORIZED);
    resp.assert_json(&json!({"message": "User not found."}))
        .await;

    // When wrong password
    let resp = cli
        .post("/api/auth/login")
        .body_json(&json!({"email": "known@local.com", "password": "wrong"}))
        .send()
        .await;

    // Expect
    resp.assert_status(StatusCode::UNAUTHORIZED);
    resp.assert_json(&json!({"message": "Invalid password."}))
        .await;
    Ok(())
}

#[sqlx::test]
async fn test_refresh_token(pool: PgPool) -> anyhow::Result<()> {
    // Given
    let config = test_config()?;
    let app_state = test_app_state(pool, &config)?;
    let mut db = app_state.db.acquire().await?;
    let mut redis_conn = app_state.redis_conn.get()?;
    let test_user = generate_test_user(
        &mut db,
        &mut redis_conn,
        config.clone(),
        "refresh@local.com",
        "password",
    )
    .await?;
    let app = init_openapi_route(app_state.clone(), &config);
    let cli = TestClient::new(app);

    // When refresh with refresh token
    let resp = cli
        .post("/api/auth/refresh-token")
        .body_json(&json!({"refresh_token": test_user.refresh_token}))
        .send()
        .await;

    // Expect
    resp.assert_status_is_ok();
    let json = resp.json().await;
    let token: String = json.value().object().get("token").deserialize();
    let mut tx = app_state.db.begin().await?;
    let user_in_token = get_user_from_token(&mut tx, &mut redis_conn, Some(token)).await?;
    assert_eq!(user_in_token.map(|x| x.id), Some(test_user.user.id));

    // When refresh with access token
    let resp = cli
        .post("/api/auth/refresh-token")
        .body_json(&json!({"refresh_token": test_user.token}))
        .send()
        .await;

    // Expect
    resp.assert_status(StatusCode::UNAUTHORIZED);
    Ok(())
}

#[sqlx::test]
async fn test_me(pool: PgPool) -> anyhow::Result<()> {
    // Given
    let config = test_config()?;
    let app_state = test_app_state(pool, &config)?;
    let mut db = app_state.db.acquire().await?;
    let mut redis_conn = app_state.redis_conn.get()?;
    let test_user = generate_test_user(
        &mut db,
        &mut redis_conn,
        config.clone(),
        "me@local.com",
        "password",
    )
    .await?;
    let app = init_openapi_route(app_state.clone(), &config);
    let cli = TestClient::new(app);

    // When
    let resp = cli
        .get("/api/auth/me")
        .header("authorization", format!("Bearer {}", test_user.token))
        .send()
        .await;

    // Expect
    resp.assert_status_is_ok();
    let json = resp.json().await;
    json.value()
        .object()
        .get("id")
        .assert_string(&test_user.user.id.to_string());
    json.value().object().get("email").assert_string("me@local.com");
    json.value().object().get("profile_id").assert_null();

    // When bad token
    let resp = cli
        .get("/api/auth/me")
        .header("authorization", "Bearer not-a-token")
        .send()
        .await;

    // Expect
    resp.assert_status(StatusCode::UNAUTHORIZED);
    Ok(())
}
