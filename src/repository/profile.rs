use sqlx::{Postgres, Transaction};
use uuid::Uuid;

use crate::{
    core::sqlx_utils::{binds_query_as, query_builder, SqlxBinds},
    model::profile::{Profile, TABLE_NAME},
};

pub async fn get_profile_by_id(
    tx: &mut Transaction<'_, Postgres>,
    id: &Uuid,
) -> anyhow::Result<Option<Profile>> {
    let profile: Option<Profile> =
        sqlx::query_as(format!("SELECT * FROM {} WHERE id = $1", TABLE_NAME).as_str())
            .bind(id)
            .fetch_optional(&mut **tx)
            .await?;
    Ok(profile)
}

pub async fn get_profile_by_user_id(
    tx: &mut Transaction<'_, Postgres>,
    user_id: &Uuid,
) -> anyhow::Result<Option<Profile>> {
    let profile: Option<Profile> =
        sqlx::query_as(format!("SELECT * FROM {} WHERE user_id = $1", TABLE_NAME).as_str())
            .bind(user_id)
            .fetch_optional(&mut **tx)
            .await?;
    Ok(profile)
}

/// Existing profile keyed by owner, falling back to the profile email.
/// An owner match always wins over an email match.
pub async fn get_profile_by_user_or_email(
    tx: &mut Transaction<'_, Postgres>,
    user_id: &Uuid,
    email: Option<&str>,
) -> anyhow::Result<Option<Profile>> {
    let profile: Option<Profile> = sqlx::query_as(
        format!(
            r#"SELECT * FROM {}
            WHERE user_id = $1 OR ($2::text IS NOT NULL AND lower(email) = lower($2))
            ORDER BY (user_id = $1) DESC
            LIMIT 1"#,
            TABLE_NAME
        )
        .as_str(),
    )
    .bind(user_id)
    .bind(email)
    .fetch_optional(&mut **tx)
    .await?;
    Ok(profile)
}

/// Candidate profiles in insertion order.
pub async fn get_all_profile(
    tx: &mut Transaction<'_, Postgres>,
    gender: Option<&str>,
    exclude_user_id: Option<&Uuid>,
) -> anyhow::Result<Vec<Profile>> {
    let mut binds: Vec<SqlxBinds> = vec![];
    let mut filters: Vec<String> = vec![];

    if let Some(gender) = gender {
        binds.push(SqlxBinds::String(gender.to_string()));
        filters.push(format!("gender = ${}", binds.len()));
    }
    if let Some(exclude_user_id) = exclude_user_id {
        binds.push(SqlxBinds::Uuid(*exclude_user_id));
        filters.push(format!("user_id != ${}", binds.len()));
    }

    let stmt = query_builder(None, TABLE_NAME, &filters, &["id ASC"], None);
    let data = binds_query_as::<Profile>(&stmt, binds)
        .fetch_all(&mut **tx)
        .await?;
    Ok(data)
}

pub async fn create_profile(
    tx: &mut Transaction<'_, Postgres>,
    profile: &Profile,
) -> anyhow::Result<()> {
    sqlx::query(
        format!(
            r#"INSERT INTO {} (
                id, user_id, email, name, age, dob, birth_time, gender, religion, caste,
                sub_caste, mother_tongue, profession, location, education, height, income,
                marital_status, bio, hobbies, image_url, gallery, traits, partner_pref,
                father_occupation, mother_occupation, siblings, family_location, family_status,
                verified, created_date, updated_date
            ) VALUES (
                $1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16, $17,
                $18, $19, $20, $21, $22, $23, $24, $25, $26, $27, $28, $29, $30, $31, $32
            )"#,
            TABLE_NAME
        )
        .as_str(),
    )
    .bind(profile.id)
    .bind(profile.user_id)
    .bind(&profile.email)
    .bind(&profile.name)
    .bind(profile.age)
    .bind(profile.dob)
    .bind(&profile.birth_time)
    .bind(&profile.gender)
    .bind(&profile.religion)
    .bind(&profile.caste)
    .bind(&profile.sub_caste)
    .bind(&profile.mother_tongue)
    .bind(&profile.profession)
    .bind(&profile.location)
    .bind(&profile.education)
    .bind(&profile.height)
    .bind(&profile.income)
    .bind(&profile.marital_status)
    .bind(&profile.bio)
    .bind(&profile.hobbies)
    .bind(&profile.image_url)
    .bind(&profile.gallery)
    .bind(&profile.traits)
    .bind(&profile.partner_pref)
    .bind(&profile.father_occupation)
    .bind(&profile.mother_occupation)
    .bind(profile.siblings)
    .bind(&profile.family_location)
    .bind(&profile.family_status)
    .bind(profile.verified)
    .bind(profile.created_date)
    .bind(profile.updated_date)
    .execute(&mut **tx)
    .await?;
    Ok(())
}

/// Overwrite every attribute of the profile row with id `profile.id`.
pub async fn update_profile(
    tx: &mut Transaction<'_, Postgres>,
    profile: &Profile,
) -> anyhow::Result<()> {
    sqlx::query(
        format!(
            r#"UPDATE {} SET
                user_id = $2, email = $3, name = $4, age = $5, dob = $6, birth_time = $7,
                gender = $8, religion = $9, caste = $10, sub_caste = $11, mother_tongue = $12,
                profession = $13, location = $14, education = $15, height = $16, income = $17,
                marital_status = $18, bio = $19, hobbies = $20, image_url = $21, gallery = $22,
                traits = $23, partner_pref = $24, father_occupation = $25,
                mother_occupation = $26, siblings = $27, family_location = $28,
                family_status = $29, verified = $30, updated_date = $31
            WHERE id = $1"#,
            TABLE_NAME
        )
        .as_str(),
    )
    .bind(profile.id)
    .bind(profile.user_id)
    .bind(&profile.email)
    .bind(&profile.name)
    .bind(profile.age)
    .bind(profile.dob)
    .bind(&profile.birth_time)
    .bind(&profile.gender)
    .bind(&profile.religion)
    .bind(&profile.caste)
    .bind(&profile.sub_caste)
    .bind(&profile.mother_tongue)
    .bind(&profile.profession)
    .bind(&profile.location)
    .bind(&profile.education)
    .bind(&profile.height)
    .bind(&profile.income)
    .bind(&profile.marital_status)
    .bind(&profile.bio)
    .bind(&profile.hobbies)
    .bind(&profile.image_url)
    .bind(&profile.gallery)
    .bind(&profile.traits)
    .bind(&profile.partner_pref)
    .bind(&profile.father_occupation)
    .bind(&profile.mother_occupation)
    .bind(profile.siblings)
    .bind(&profile.family_location)
    .bind(&profile.family_status)
    .bind(profile.verified)
    .bind(profile.updated_date)
    .execute(&mut **tx)
    .await?;
    Ok(())
}

/// Profile name of `user_id`, or `fallback` when the user has no profile.
pub async fn get_display_name(
    tx: &mut Transaction<'_, Postgres>,
    user_id: &Uuid,
    fallback: &str,
) -> anyhow::Result<String> {
    let name: Option<(String,)> =
        sqlx::query_as(format!("SELECT name FROM {} WHERE user_id = $1", TABLE_NAME).as_str())
            .bind(user_id)
            .fetch_optional(&mut **tx)
            .await?;
    Ok(name.map(|x| x.0).unwrap_or(fallback.to_string()))
}
