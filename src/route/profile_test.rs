use poem::{http::StatusCode, test::TestClient};
use serde_json::json;
use sqlx::PgPool;
use uuid::Uuid;

use crate::{
    core::test_utils::{generate_test_user, test_app_state, test_config},
    factory::{profile::ProfileFactory, user::UserFactory},
    init_openapi_route,
    model::profile::Profile,
};

#[sqlx::test]
async fn test_save_profile_then_get(pool: PgPool) -> anyhow::Result<()> {
    // Given
    let config = test_config()?;
    let app_state = test_app_state(pool, &config)?;
    let mut db = app_state.db.acquire().await?;
    let mut redis_conn = app_state.redis_conn.get()?;
    let test_user = generate_test_user(
        &mut db,
        &mut redis_conn,
        config.clone(),
        "ananya@local.com",
        "password",
    )
    .await?;
    let app = init_openapi_route(app_state.clone(), &config);
    let cli = TestClient::new(app);

    // When create
    let json_payload = json!({
        "name": "Ananya Sharma",
        "gender": "female",
        "dob": "1996-04-12",
        "religion": "Hindu",
        "profession": "Architect",
        "hobbies": ["painting", "trekking"],
        "verified": true
    });
    let resp = cli
        .post("/api/profile/")
        .header("authorization", format!("Bearer {}", test_user.token))
        .body_json(&json_payload)
        .send()
        .await;

    // Expect create
    resp.assert_status_is_ok();
    resp.assert_json(&json!({"message": "Profile created successfully."}))
        .await;

    // When get by user
    let resp = cli
        .get("/api/profile/by-user/")
        .query("user_id", &test_user.user.id.to_string())
        .send()
        .await;

    // Expect get by user
    resp.assert_status_is_ok();
    let json = resp.json().await;
    let profile = json.value().object();
    profile.get("name").assert_string("Ananya Sharma");
    profile.get("gender").assert_string("Female");
    profile.get("email").assert_string("ananya@local.com");
    profile.get("dob").assert_string("1996-04-12");
    profile.get("verified").assert_bool(false);
    assert!(profile.get("age").i64() >= 28);
    let profile_id: String = profile.get("id").deserialize();

    // When update after the profile was verified
    sqlx::query("UPDATE public.profile SET verified = true WHERE user_id = $1")
        .bind(test_user.user.id)
        .execute(&app_state.db)
        .await?;
    let json_payload = json!({
        "name": "Ananya S.",
        "gender": "Female",
        "age": 29,
        "verified": false
    });
    let resp = cli
        .post("/api/profile/")
        .header("authorization", format!("Bearer {}", test_user.token))
        .body_json(&json_payload)
        .send()
        .await;

    // Expect update keeps the same record
    resp.assert_status_is_ok();
    resp.assert_json(&json!({"message": "Profile updated successfully."}))
        .await;
    let resp = cli
        .get("/api/profile/detail/")
        .query("id", &profile_id)
        .send()
        .await;
    resp.assert_status_is_ok();
    let json = resp.json().await;
    json.value().object().get("name").assert_string("Ananya S.");
    json.value().object().get("age").assert_i64(29);
    json.value().object().get("verified").assert_bool(true);
    let num_data: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM public.profile")
        .fetch_one(&app_state.db)
        .await?;
    assert_eq!(num_data.0, 1);
    Ok(())
}

#[sqlx::test]
async fn test_save_profile_invalid(pool: PgPool) -> anyhow::Result<()> {
    // Given
    let config = test_config()?;
    let app_state = test_app_state(pool, &config)?;
    let mut db = app_state.db.acquire().await?;
    let mut redis_conn = app_state.redis_conn.get()?;
    let test_user = generate_test_user(
        &mut db,
        &mut redis_conn,
        config.clone(),
        "invalid@local.com",
        "password",
    )
    .await?;
    let app = init_openapi_route(app_state.clone(), &config);
    let cli = TestClient::new(app);

    // When missing gender
    let resp = cli
        .post("/api/profile/")
        .header("authorization", format!("Bearer {}", test_user.token))
        .body_json(&json!({"name": "No Gender", "gender": ""}))
        .send()
        .await;

    // Expect
    resp.assert_status(StatusCode::BAD_REQUEST);
    resp.assert_json(&json!({"message": "Unable to create profile. Data is incomplete."}))
        .await;

    // When unknown gender
    let resp = cli
        .post("/api/profile/")
        .header("authorization", format!("Bearer {}", test_user.token))
        .body_json(&json!({"name": "Someone", "gender": "robot"}))
        .send()
        .await;

    // Expect
    resp.assert_status(StatusCode::BAD_REQUEST);
    resp.assert_json(&json!({"message": "Invalid gender."}))
        .await;

    // When no token
    let resp = cli
        .post("/api/profile/")
        .body_json(&json!({"name": "Someone", "gender": "Male"}))
        .send()
        .await;

    // Expect
    resp.assert_status(StatusCode::UNAUTHORIZED);
    let num_data: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM public.profile")
        .fetch_one(&app_state.db)
        .await?;
    assert_eq!(num_data.0, 0);
    Ok(())
}

#[sqlx::test]
async fn test_get_profile_not_found(pool: PgPool) -> anyhow::Result<()> {
    // Given
    let config = test_config()?;
    let app_state = test_app_state(pool, &config)?;
    let app = init_openapi_route(app_state.clone(), &config);
    let cli = TestClient::new(app);

    // When unknown id
    let resp = cli
        .get("/api/profile/detail/")
        .query("id", &Uuid::now_v7().to_string())
        .send()
        .await;

    // Expect
    resp.assert_status(StatusCode::NOT_FOUND);
    resp.assert_json(&json!({"message": "Profile not found."}))
        .await;

    // When malformed id
    let resp = cli
        .get("/api/profile/detail/")
        .query("id", &"not-a-uuid")
        .send()
        .await;

    // Expect
    resp.assert_status(StatusCode::BAD_REQUEST);

    // When user without profile
    let resp = cli
        .get("/api/profile/by-user/")
        .query("user_id", &Uuid::now_v7().to_string())
        .send()
        .await;

    // Expect
    resp.assert_status(StatusCode::NOT_FOUND);
    Ok(())
}

#[sqlx::test]
async fn test_get_profile_list(pool: PgPool) -> anyhow::Result<()> {
    // Given
    let config = test_config()?;
    let app_state = test_app_state(pool, &config)?;
    let users = UserFactory::new()
        .generate_many(&app_state.db, 4, ())
        .await?;
    let mut profile_factory = ProfileFactory::<(Uuid, String, i32)>::new();
    profile_factory.modified_one(|data, ext| Profile {
        user_id: ext.0,
        gender: ext.1.clone(),
        age: ext.2,
        religion: Some("Hindu".to_string()),
        ..data.clone()
    });
    let seeds = [
        ("Female", 25),
        ("Female", 31),
        ("Male", 27),
        ("Female", 52),
    ];
    let mut profiles = vec![];
    for (user, (gender, age)) in users.iter().zip(seeds) {
        profiles.push(
            profile_factory
                .generate_one(&app_state.db, (user.id, gender.to_string(), age))
                .await?,
        );
    }
    let app = init_openapi_route(app_state.clone(), &config);
    let cli = TestClient::new(app);

    // When male viewer within age range
    let resp = cli
        .get("/api/profile/")
        .query("viewer_gender", &"Male")
        .query("min_age", &24)
        .query("max_age", &40)
        .query("sort_by", &"age_desc")
        .send()
        .await;

    // Expect only matching female profiles, oldest first
    resp.assert_status_is_ok();
    let json = resp.json().await;
    let records = json.value().object().get("records").array();
    records.assert_len(2);
    records
        .get(0)
        .object()
        .get("id")
        .assert_string(&profiles[1].id.to_string());
    records
        .get(1)
        .object()
        .get("id")
        .assert_string(&profiles[0].id.to_string());

    // When excluding an owner with a gender filter
    let resp = cli
        .get("/api/profile/")
        .query("gender", &"female")
        .query("exclude_user_id", &users[0].id.to_string())
        .send()
        .await;

    // Expect insertion order is kept
    resp.assert_status_is_ok();
    let json = resp.json().await;
    let records = json.value().object().get("records").array();
    records.assert_len(2);
    records
        .get(0)
        .object()
        .get("id")
        .assert_string(&profiles[1].id.to_string());

    // When nothing matches
    let resp = cli
        .get("/api/profile/")
        .query("religion", &"Jain")
        .send()
        .await;

    // Expect
    resp.assert_status(StatusCode::NOT_FOUND);
    resp.assert_json(&json!({"message": "No profiles found."}))
        .await;

    // When invalid gender
    let resp = cli.get("/api/profile/").query("gender", &"x").send().await;

    // Expect
    resp.assert_status(StatusCode::BAD_REQUEST);
    Ok(())
}
