use sqlx::PgPool;
use uuid::Uuid;

use crate::{
    core::security::hash_password,
    factory::{profile::ProfileFactory, user::UserFactory},
    model::{profile::Profile, user::User},
};

/// Fill an empty database with demo members, each with a login and a
/// profile. Every demo user shares `password`.
pub async fn seed_demo_profiles(
    pool: &PgPool,
    count: u32,
    password: &str,
) -> anyhow::Result<Vec<(User, Profile)>> {
    let hashed_password =
        hash_password(password).map_err(|err| anyhow::anyhow!("hash password: {err}"))?;

    let mut user_factory = UserFactory::<String>::new();
    user_factory.modified_many(|data, _, ext| User {
        password: ext,
        ..data.clone()
    });
    let users = user_factory
        .generate_many(pool, count, hashed_password)
        .await?;

    let mut profile_factory = ProfileFactory::<Vec<(Uuid, String)>>::new();
    profile_factory.modified_many(|data, idx, ext| Profile {
        user_id: ext[idx].0,
        email: Some(ext[idx].1.clone()),
        // alternate so both sides of the match filter have candidates
        gender: (if idx % 2 == 0 { "Male" } else { "Female" }).to_string(),
        ..data.clone()
    });
    let owners: Vec<(Uuid, String)> = users.iter().map(|x| (x.id, x.email.clone())).collect();
    let profiles = profile_factory.generate_many(pool, count, owners).await?;
    tracing::info!("seeded {} demo profiles", profiles.len());

    Ok(users.into_iter().zip(profiles).collect())
}
