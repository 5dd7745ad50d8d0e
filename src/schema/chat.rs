use poem_openapi::{payload::Json, ApiResponse, Object};
use serde::{Deserialize, Serialize};

use super::common::{
    BadRequestResponse, RecordsResponse, ServiceUnavailableResponse, UnauthorizedResponse,
};
use crate::{core::utils::datetime_to_string, model::ai_message::AiMessage};

#[derive(Object, Deserialize, Serialize, Debug, PartialEq)]
pub struct AiChatRecord {
    pub id: String,
    pub sender: String,
    pub text: String,
    pub related_profile_ids: Vec<String>,
    pub timestamp: String,
}

impl From<AiMessage> for AiChatRecord {
    fn from(x: AiMessage) -> Self {
        Self {
            id: x.id.to_string(),
            sender: x.sender,
            text: x.text,
            related_profile_ids: x.related_profile_ids,
            timestamp: datetime_to_string(x.created_date),
        }
    }
}

#[derive(ApiResponse)]
pub enum ChatListResponses {
    #[oai(status = 200)]
    Ok(Json<RecordsResponse<AiChatRecord>>),

    #[oai(status = 401)]
    Unauthorized(Json<UnauthorizedResponse>),

    #[oai(status = 503)]
    ServiceUnavailable(Json<ServiceUnavailableResponse>),
}

#[derive(Object, Deserialize, Serialize)]
pub struct ChatCreateRequest {
    pub sender: String,
    pub text: String,
    pub related_profile_ids: Option<Vec<String>>,
}

#[derive(Object, Deserialize, Serialize)]
pub struct ChatCreateResponse {
    pub message: String,
    pub record: AiChatRecord,
}

#[derive(ApiResponse)]
pub enum ChatCreateResponses {
    #[oai(status = 201)]
    Created(Json<ChatCreateResponse>),

    #[oai(status = 400)]
    BadRequest(Json<BadRequestResponse>),

    #[oai(status = 401)]
    Unauthorized(Json<UnauthorizedResponse>),

    #[oai(status = 503)]
    ServiceUnavailable(Json<ServiceUnavailableResponse>),
}
