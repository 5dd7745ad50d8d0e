use poem::{http::StatusCode, test::TestClient};
use serde_json::json;
use sqlx::PgPool;

use crate::{
    ai::matchmaker::{BIO_ERROR_REPLY, FALLBACK_REPLY},
    core::{
        notification::get_notifications,
        test_utils::{generate_test_user, test_app_state, test_config},
    },
    init_openapi_route,
};

#[sqlx::test]
async fn test_ask_without_provider_falls_back(pool: PgPool) -> anyhow::Result<()> {
    // Given
    let config = test_config()?;
    let app_state = test_app_state(pool, &config)?;
    let mut db = app_state.db.acquire().await?;
    let mut redis_conn = app_state.redis_conn.get()?;
    let test_user = generate_test_user(
        &mut db,
        &mut redis_conn,
        config.clone(),
        "asker@local.com",
        "password",
    )
    .await?;
    let app = init_openapi_route(app_state.clone(), &config);
    let cli = TestClient::new(app);

    // When
    let resp = cli
        .post("/api/matchmaker/ask")
        .header("authorization", format!("Bearer {}", test_user.token))
        .body_json(&json!({"message": "Who would suit a doctor from Pune?"}))
        .send()
        .await;

    // Expect
    resp.assert_status_is_ok();
    resp.assert_json(&json!({
        "text": FALLBACK_REPLY,
        "recommended_profile_ids": [],
        "grounding_chunks": []
    }))
    .await;

    // both turns are kept in the history
    let resp = cli
        .get("/api/chat/")
        .header("authorization", format!("Bearer {}", test_user.token))
        .send()
        .await;
    resp.assert_status_is_ok();
    let json = resp.json().await;
    let records = json.value().object().get("records").array();
    records.assert_len(2);
    let question = records.get(0).object();
    question.get("sender").assert_string("user");
    question
        .get("text")
        .assert_string("Who would suit a doctor from Pune?");
    let answer = records.get(1).object();
    answer.get("sender").assert_string("ai");
    answer.get("text").assert_string(FALLBACK_REPLY);

    // no recommendation, no notification
    assert!(get_notifications(&mut redis_conn, &test_user.user.id)?.is_empty());
    Ok(())
}

#[sqlx::test]
async fn test_ask_invalid(pool: PgPool) -> anyhow::Result<()> {
    // Given
    let config = test_config()?;
    let app_state = test_app_state(pool, &config)?;
    let mut db = app_state.db.acquire().await?;
    let mut redis_conn = app_state.redis_conn.get()?;
    let test_user = generate_test_user(
        &mut db,
        &mut redis_conn,
        config.clone(),
        "blank@local.com",
        "password",
    )
    .await?;
    let app = init_openapi_route(app_state.clone(), &config);
    let cli = TestClient::new(app);

    // When blank message
    let resp = cli
        .post("/api/matchmaker/ask")
        .header("authorization", format!("Bearer {}", test_user.token))
        .body_json(&json!({"message": "  "}))
        .send()
        .await;

    // Expect
    resp.assert_status(StatusCode::BAD_REQUEST);
    resp.assert_json(&json!({"message": "Message is required."}))
        .await;

    // When without token
    let resp = cli
        .post("/api/matchmaker/ask")
        .body_json(&json!({"message": "hello"}))
        .send()
        .await;

    // Expect
    resp.assert_status(StatusCode::UNAUTHORIZED);
    let num_data: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM public.ai_message")
        .fetch_one(&app_state.db)
        .await?;
    assert_eq!(num_data.0, 0);
    Ok(())
}

#[sqlx::test]
async fn test_bio_without_provider(pool: PgPool) -> anyhow::Result<()> {
    // Given
    let config = test_config()?;
    let app_state = test_app_state(pool, &config)?;
    let mut db = app_state.db.acquire().await?;
    let mut redis_conn = app_state.redis_conn.get()?;
    let test_user = generate_test_user(
        &mut db,
        &mut redis_conn,
        config.clone(),
        "bio@local.com",
        "password",
    )
    .await?;
    let app = init_openapi_route(app_state.clone(), &config);
    let cli = TestClient::new(app);

    // When
    let resp = cli
        .post("/api/matchmaker/bio")
        .header("authorization", format!("Bearer {}", test_user.token))
        .body_json(&json!({
            "name": "Rohan",
            "profession": "Teacher",
            "hobbies": ["chess", "cycling"]
        }))
        .send()
        .await;

    // Expect
    resp.assert_status_is_ok();
    resp.assert_json(&json!({"bio": BIO_ERROR_REPLY})).await;

    // When name is missing
    let resp = cli
        .post("/api/matchmaker/bio")
        .header("authorization", format!("Bearer {}", test_user.token))
        .body_json(&json!({"name": ""}))
        .send()
        .await;

    // Expect
    resp.assert_status(StatusCode::BAD_REQUEST);
    resp.assert_json(&json!({"message": "Name is required."}))
        .await;
    Ok(())
}
