use poem_openapi::{payload::Json, ApiResponse, Object};
use serde::{Deserialize, Serialize};

use super::common::{
    BadRequestResponse, ForbiddenResponse, NotFoundResponse, RecordsResponse,
    ServiceUnavailableResponse, UnauthorizedResponse,
};
use crate::{
    core::utils::datetime_to_string_opt,
    model::connection::{AcceptedConnection, Connection, PendingConnection},
};

/// A connection record. Listing by `pending` adds the sender columns,
/// listing by `accepted` adds the counterpart (`friend_*`) columns.
#[derive(Object, Deserialize, Serialize, Debug, Default, PartialEq)]
#[oai(skip_serializing_if_is_none)]
pub struct ConnectionDetail {
    pub id: String,
    pub sender_id: String,
    pub receiver_id: String,
    pub status: String,
    pub created_date: Option<String>,
    pub updated_date: Option<String>,
    pub sender_name: Option<String>,
    pub sender_image: Option<String>,
    pub sender_profile_id: Option<String>,
    pub friend_id: Option<String>,
    pub friend_name: Option<String>,
    pub friend_image: Option<String>,
    pub friend_profile_id: Option<String>,
}

impl From<Connection> for ConnectionDetail {
    fn from(x: Connection) -> Self {
        Self {
            id: x.id.to_string(),
            sender_id: x.sender_id.to_string(),
            receiver_id: x.receiver_id.to_string(),
            status: x.status,
            created_date: datetime_to_string_opt(x.created_date),
            updated_date: datetime_to_string_opt(x.updated_date),
            ..Default::default()
        }
    }
}

impl From<PendingConnection> for ConnectionDetail {
    fn from(x: PendingConnection) -> Self {
        Self {
            id: x.id.to_string(),
            sender_id: x.sender_id.to_string(),
            receiver_id: x.receiver_id.to_string(),
            status: x.status,
            created_date: datetime_to_string_opt(x.created_date),
            sender_name: Some(x.sender_name),
            sender_image: x.sender_image,
            sender_profile_id: x.sender_profile_id.map(|x| x.to_string()),
            ..Default::default()
        }
    }
}

impl From<AcceptedConnection> for ConnectionDetail {
    fn from(x: AcceptedConnection) -> Self {
        Self {
            id: x.id.to_string(),
            sender_id: x.sender_id.to_string(),
            receiver_id: x.receiver_id.to_string(),
            status: x.status,
            created_date: datetime_to_string_opt(x.created_date),
            friend_id: Some(x.friend_id.to_string()),
            friend_name: Some(x.friend_name),
            friend_image: x.friend_image,
            friend_profile_id: x.friend_profile_id.map(|x| x.to_string()),
            ..Default::default()
        }
    }
}

#[derive(Object, Deserialize, Serialize)]
pub struct ConnectionCreateRequest {
    pub receiver_id: String,
}

#[derive(Object, Deserialize, Serialize)]
pub struct ConnectionMessageResponse {
    pub message: String,
    pub connection: ConnectionDetail,
}

#[derive(ApiResponse)]
pub enum ConnectionCreateResponses {
    #[oai(status = 201)]
    Created(Json<ConnectionMessageResponse>),

    #[oai(status = 400)]
    BadRequest(Json<BadRequestResponse>),

    #[oai(status = 401)]
    Unauthorized(Json<UnauthorizedResponse>),

    #[oai(status = 404)]
    NotFound(Json<NotFoundResponse>),

    #[oai(status = 503)]
    ServiceUnavailable(Json<ServiceUnavailableResponse>),
}

#[derive(Object, Deserialize, Serialize)]
pub struct ConnectionRespondRequest {
    pub connection_id: String,
    pub status: String,
}

#[derive(ApiResponse)]
pub enum ConnectionRespondResponses {
    #[oai(status = 200)]
    Ok(Json<ConnectionMessageResponse>),

    #[oai(status = 400)]
    BadRequest(Json<BadRequestResponse>),

    #[oai(status = 401)]
    Unauthorized(Json<UnauthorizedResponse>),

    #[oai(status = 403)]
    Forbidden(Json<ForbiddenResponse>),

    #[oai(status = 404)]
    NotFound(Json<NotFoundResponse>),

    #[oai(status = 503)]
    ServiceUnavailable(Json<ServiceUnavailableResponse>),
}

#[derive(ApiResponse)]
pub enum ConnectionListResponses {
    #[oai(status = 200)]
    Ok(Json<RecordsResponse<ConnectionDetail>>),

    #[oai(status = 400)]
    BadRequest(Json<BadRequestResponse>),

    #[oai(status = 401)]
    Unauthorized(Json<UnauthorizedResponse>),

    #[oai(status = 503)]
    ServiceUnavailable(Json<ServiceUnavailableResponse>),
}

/// Pairwise status. Only `status` is set when no record exists.
#[derive(Object, Deserialize, Serialize, Debug, PartialEq)]
#[oai(skip_serializing_if_is_none)]
pub struct ConnectionCheckResponse {
    pub status: String,
    pub id: Option<String>,
    pub sender_id: Option<String>,
    pub receiver_id: Option<String>,
    pub created_date: Option<String>,
    pub updated_date: Option<String>,
}

impl ConnectionCheckResponse {
    pub fn none() -> Self {
        Self {
            status: "none".to_string(),
            id: None,
            sender_id: None,
            receiver_id: None,
            created_date: None,
            updated_date: None,
        }
    }
}

impl From<Connection> for ConnectionCheckResponse {
    fn from(x: Connection) -> Self {
        Self {
            status: x.status,
            id: Some(x.id.to_string()),
            sender_id: Some(x.sender_id.to_string()),
            receiver_id: Some(x.receiver_id.to_string()),
            created_date: datetime_to_string_opt(x.created_date),
            updated_date: datetime_to_string_opt(x.updated_date),
        }
    }
}

#[derive(ApiResponse)]
pub enum ConnectionCheckResponses {
    #[oai(status = 200)]
    Ok(Json<ConnectionCheckResponse>),

    #[oai(status = 400)]
    BadRequest(Json<BadRequestResponse>),

    #[oai(status = 401)]
    Unauthorized(Json<UnauthorizedResponse>),

    #[oai(status = 403)]
    Forbidden(Json<ForbiddenResponse>),

    #[oai(status = 503)]
    ServiceUnavailable(Json<ServiceUnavailableResponse>),
}
