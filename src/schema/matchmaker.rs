use poem_openapi::{payload::Json, ApiResponse, Object};
use serde::{Deserialize, Serialize};

use super::common::{BadRequestResponse, ServiceUnavailableResponse, UnauthorizedResponse};
use crate::ai::{gemini::GroundingChunk, matchmaker::MatchmakerReply};

#[derive(Object, Deserialize)]
pub struct MatchmakerAskRequest {
    pub message: String,
}

#[derive(Object, Deserialize, Serialize, Debug, PartialEq)]
pub struct GroundingSource {
    pub uri: Option<String>,
    pub title: Option<String>,
}

impl From<GroundingChunk> for GroundingSource {
    fn from(x: GroundingChunk) -> Self {
        let web = x.web.unwrap_or_default();
        Self {
            uri: web.uri,
            title: web.title,
        }
    }
}

#[derive(Object, Deserialize, Serialize, Debug, PartialEq)]
pub struct MatchmakerAskResponse {
    pub text: String,
    pub recommended_profile_ids: Vec<String>,
    pub grounding_chunks: Vec<GroundingSource>,
}

impl From<MatchmakerReply> for MatchmakerAskResponse {
    fn from(x: MatchmakerReply) -> Self {
        Self {
            text: x.text,
            recommended_profile_ids: x.recommended_profile_ids,
            grounding_chunks: x
                .grounding_chunks
                .into_iter()
                .map(GroundingSource::from)
                .collect(),
        }
    }
}

#[derive(ApiResponse)]
pub enum MatchmakerAskResponses {
    #[oai(status = 200)]
    Ok(Json<MatchmakerAskResponse>),

    #[oai(status = 400)]
    BadRequest(Json<BadRequestResponse>),

    #[oai(status = 401)]
    Unauthorized(Json<UnauthorizedResponse>),

    #[oai(status = 503)]
    ServiceUnavailable(Json<ServiceUnavailableResponse>),
}

#[derive(Object, Deserialize)]
pub struct MatchmakerBioRequest {
    pub name: String,
    pub profession: Option<String>,
    pub hobbies: Option<Vec<String>>,
    pub traits: Option<String>,
    pub partner_pref: Option<String>,
}

#[derive(Object, Deserialize, Serialize)]
pub struct MatchmakerBioResponse {
    pub bio: String,
}

#[derive(ApiResponse)]
pub enum MatchmakerBioResponses {
    #[oai(status = 200)]
    Ok(Json<MatchmakerBioResponse>),

    #[oai(status = 400)]
    BadRequest(Json<BadRequestResponse>),

    #[oai(status = 401)]
    Unauthorized(Json<UnauthorizedResponse>),

    #[oai(status = 503)]
    ServiceUnavailable(Json<ServiceUnavailableResponse>),
}
