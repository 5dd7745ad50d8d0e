use chrono::{DateTime, FixedOffset, NaiveDate};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

pub const TABLE_NAME: &str = "public.profile";

#[derive(Clone, Debug, Deserialize, Serialize, FromRow, PartialEq)]
pub struct Profile {
    pub id: Uuid,
    pub user_id: Uuid,
    pub email: Option<String>,
    pub name: String,
    pub age: i32,
    pub dob: Option<NaiveDate>,
    pub birth_time: Option<String>,
    pub gender: String,
    pub religion: Option<String>,
    pub caste: Option<String>,
    pub sub_caste: Option<String>,
    pub mother_tongue: Option<String>,
    pub profession: Option<String>,
    pub location: Option<String>,
    pub education: Option<String>,
    pub height: Option<String>,
    pub income: Option<String>,
    pub marital_status: Option<String>,
    pub bio: Option<String>,
    pub hobbies: Vec<String>,
    pub image_url: Option<String>,
    pub gallery: Vec<String>,
    pub traits: Option<String>,
    pub partner_pref: Option<String>,
    pub father_occupation: Option<String>,
    pub mother_occupation: Option<String>,
    pub siblings: Option<i32>,
    pub family_location: Option<String>,
    pub family_status: Option<String>,
    pub verified: bool,
    pub created_date: Option<DateTime<FixedOffset>>,
    pub updated_date: Option<DateTime<FixedOffset>>,
}
