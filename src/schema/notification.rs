use poem_openapi::{payload::Json, ApiResponse, Object};
use serde::{Deserialize, Serialize};

use super::common::{
    BadRequestResponse, NotFoundResponse, ServiceUnavailableResponse, UnauthorizedResponse,
};
use crate::model::notification::Notification;

#[derive(Object, Deserialize, Serialize, Debug, PartialEq)]
pub struct NotificationDetail {
    pub id: String,
    #[oai(rename = "type")]
    #[serde(rename = "type")]
    pub notification_type: String,
    pub title: String,
    pub message: String,
    pub timestamp: i64,
    pub read: bool,
    pub link: Option<String>,
}

impl From<Notification> for NotificationDetail {
    fn from(x: Notification) -> Self {
        Self {
            id: x.id.to_string(),
            notification_type: x.notification_type.as_str().to_string(),
            title: x.title,
            message: x.message,
            timestamp: x.timestamp,
            read: x.read,
            link: x.link,
        }
    }
}

#[derive(Object, Deserialize, Serialize)]
pub struct NotificationListResponse {
    pub unread_count: u32,
    pub records: Vec<NotificationDetail>,
}

#[derive(ApiResponse)]
pub enum NotificationListResponses {
    #[oai(status = 200)]
    Ok(Json<NotificationListResponse>),

    #[oai(status = 401)]
    Unauthorized(Json<UnauthorizedResponse>),

    #[oai(status = 503)]
    ServiceUnavailable(Json<ServiceUnavailableResponse>),
}

#[derive(ApiResponse)]
pub enum NotificationReadResponses {
    #[oai(status = 204)]
    NoContent,

    #[oai(status = 400)]
    BadRequest(Json<BadRequestResponse>),

    #[oai(status = 401)]
    Unauthorized(Json<UnauthorizedResponse>),

    #[oai(status = 404)]
    NotFound(Json<NotFoundResponse>),

    #[oai(status = 503)]
    ServiceUnavailable(Json<ServiceUnavailableResponse>),
}

#[derive(ApiResponse)]
pub enum NotificationUpdateResponses {
    #[oai(status = 204)]
    NoContent,

    #[oai(status = 401)]
    Unauthorized(Json<UnauthorizedResponse>),

    #[oai(status = 503)]
    ServiceUnavailable(Json<ServiceUnavailableResponse>),
}
