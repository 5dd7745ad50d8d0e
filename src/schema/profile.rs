use poem_openapi::{payload::Json, ApiResponse, Object};
use serde::{Deserialize, Serialize};

use super::common::{
    BadRequestResponse, MessageResponse, NotFoundResponse, RecordsResponse,
    ServiceUnavailableResponse, UnauthorizedResponse,
};
use crate::{
    core::utils::{date_to_string_opt, datetime_to_string_opt},
    model::profile::Profile,
};

#[derive(Object, Deserialize, Serialize, Debug, PartialEq)]
pub struct ProfileDetail {
    pub id: String,
    pub user_id: String,
    pub email: Option<String>,
    pub name: String,
    pub age: i32,
    pub dob: Option<String>,
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
    pub created_date: Option<String>,
    pub updated_date: Option<String>,
}

impl From<Profile> for ProfileDetail {
    fn from(x: Profile) -> Self {
        Self {
            id: x.id.to_string(),
            user_id: x.user_id.to_string(),
            email: x.email,
            name: x.name,
            age: x.age,
            dob: date_to_string_opt(x.dob),
            birth_time: x.birth_time,
            gender: x.gender,
            religion: x.religion,
            caste: x.caste,
            sub_caste: x.sub_caste,
            mother_tongue: x.mother_tongue,
            profession: x.profession,
            location: x.location,
            education: x.education,
            height: x.height,
            income: x.income,
            marital_status: x.marital_status,
            bio: x.bio,
            hobbies: x.hobbies,
            image_url: x.image_url,
            gallery: x.gallery,
            traits: x.traits,
            partner_pref: x.partner_pref,
            father_occupation: x.father_occupation,
            mother_occupation: x.mother_occupation,
            siblings: x.siblings,
            family_location: x.family_location,
            family_status: x.family_status,
            verified: x.verified,
            created_date: datetime_to_string_opt(x.created_date),
            updated_date: datetime_to_string_opt(x.updated_date),
        }
    }
}

#[derive(ApiResponse)]
pub enum ProfileDetailResponses {
    #[oai(status = 200)]
    Ok(Json<ProfileDetail>),

    #[oai(status = 400)]
    BadRequest(Json<BadRequestResponse>),

    #[oai(status = 404)]
    NotFound(Json<NotFoundResponse>),

    #[oai(status = 503)]
    ServiceUnavailable(Json<ServiceUnavailableResponse>),
}

#[derive(ApiResponse)]
pub enum ProfileListResponses {
    #[oai(status = 200)]
    Ok(Json<RecordsResponse<ProfileDetail>>),

    #[oai(status = 400)]
    BadRequest(Json<BadRequestResponse>),

    #[oai(status = 404)]
    NotFound(Json<NotFoundResponse>),

    #[oai(status = 503)]
    ServiceUnavailable(Json<ServiceUnavailableResponse>),
}

/// Upsert payload. Only `name` and `gender` are required.
#[derive(Object, Deserialize, Serialize, Default)]
pub struct ProfileSaveRequest {
    pub email: Option<String>,
    pub name: String,
    pub age: Option<i32>,
    pub dob: Option<String>,
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
    pub hobbies: Option<Vec<String>>,
    pub image_url: Option<String>,
    pub gallery: Option<Vec<String>>,
    pub traits: Option<String>,
    pub partner_pref: Option<String>,
    pub father_occupation: Option<String>,
    pub mother_occupation: Option<String>,
    pub siblings: Option<i32>,
    pub family_location: Option<String>,
    pub family_status: Option<String>,
}

#[derive(ApiResponse)]
pub enum ProfileSaveResponses {
    #[oai(status = 200)]
    Ok(Json<MessageResponse>),

    #[oai(status = 400)]
    BadRequest(Json<BadRequestResponse>),

    #[oai(status = 401)]
    Unauthorized(Json<UnauthorizedResponse>),

    #[oai(status = 503)]
    ServiceUnavailable(Json<ServiceUnavailableResponse>),
}
