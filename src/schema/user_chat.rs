use poem_openapi::{payload::Json, ApiResponse, Object};
use serde::{Deserialize, Serialize};

use super::common::{
    BadRequestResponse, ForbiddenResponse, ServiceUnavailableResponse, UnauthorizedResponse,
};
use crate::{core::utils::datetime_to_string, model::user_message::UserMessage};

#[derive(Object, Deserialize, Serialize, Debug, PartialEq)]
pub struct UserChatMessage {
    pub id: String,
    pub sender_id: String,
    pub receiver_id: String,
    pub message: String,
    pub is_read: bool,
    pub created_date: String,
}

impl From<UserMessage> for UserChatMessage {
    fn from(x: UserMessage) -> Self {
        Self {
            id: x.id.to_string(),
            sender_id: x.sender_id.to_string(),
            receiver_id: x.receiver_id.to_string(),
            message: x.message,
            is_read: x.is_read,
            created_date: datetime_to_string(x.created_date),
        }
    }
}

#[derive(ApiResponse)]
pub enum UserChatListResponses {
    #[oai(status = 200)]
    Ok(Json<Vec<UserChatMessage>>),

    #[oai(status = 400)]
    BadRequest(Json<BadRequestResponse>),

    #[oai(status = 401)]
    Unauthorized(Json<UnauthorizedResponse>),

    #[oai(status = 503)]
    ServiceUnavailable(Json<ServiceUnavailableResponse>),
}

#[derive(Object, Deserialize, Serialize)]
pub struct UserChatSendRequest {
    pub receiver_id: String,
    pub message: String,
}

#[derive(Object, Deserialize, Serialize)]
pub struct UserChatSendResponse {
    pub message: String,
    pub record: UserChatMessage,
}

#[derive(ApiResponse)]
pub enum UserChatSendResponses {
    #[oai(status = 201)]
    Created(Json<UserChatSendResponse>),

    #[oai(status = 400)]
    BadRequest(Json<BadRequestResponse>),

    #[oai(status = 401)]
    Unauthorized(Json<UnauthorizedResponse>),

    #[oai(status = 403)]
    Forbidden(Json<ForbiddenResponse>),

    #[oai(status = 503)]
    ServiceUnavailable(Json<ServiceUnavailableResponse>),
}

#[derive(Object, Deserialize, Serialize)]
pub struct UserChatReadRequest {
    pub friend_id: String,
}

#[derive(Object, Deserialize, Serialize)]
pub struct UserChatReadResponse {
    pub message: String,
    pub updated: u64,
}

#[derive(ApiResponse)]
pub enum UserChatReadResponses {
    #[oai(status = 200)]
    Ok(Json<UserChatReadResponse>),

    #[oai(status = 400)]
    BadRequest(Json<BadRequestResponse>),

    #[oai(status = 401)]
    Unauthorized(Json<UnauthorizedResponse>),

    #[oai(status = 503)]
    ServiceUnavailable(Json<ServiceUnavailableResponse>),
}
