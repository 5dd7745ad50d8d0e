use poem_openapi::{payload::Json, ApiResponse, Object};
use serde::{Deserialize, Serialize};

use crate::schema::common::{BadRequestResponse, ServiceUnavailableResponse, UnauthorizedResponse};

#[derive(Object, Deserialize, Serialize)]
pub struct AuthUser {
    pub id: String,
    pub email: String,
}

#[derive(Object, Deserialize)]
pub struct SignupRequest {
    pub email: String,
    pub password: String,
}

#[derive(Object, Deserialize, Serialize)]
pub struct SignupResponse {
    pub message: String,
    pub user: AuthUser,
}

#[derive(ApiResponse)]
pub enum SignupResponses {
    #[oai(status = 201)]
    Created(Json<SignupResponse>),

    #[oai(status = 400)]
    BadRequest(Json<BadRequestResponse>),

    #[oai(status = 503)]
    ServiceUnavailable(Json<ServiceUnavailableResponse>),
}

#[derive(Object, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Object, Deserialize, Serialize)]
pub struct LoginResponse {
    pub message: String,
    pub exp: String,
    pub exp_in: i64,
    pub exp_refresh_token: String,
    pub refresh_token: String,
    pub token: String,
    pub token_type: String,
    pub user: AuthUser,
}

#[derive(ApiResponse)]
pub enum LoginResponses {
    #[oai(status = 200)]
    Ok(Json<LoginResponse>),

    #[oai(status = 400)]
    BadRequest(Json<BadRequestResponse>),

    #[oai(status = 401)]
    Unauthorized(Json<UnauthorizedResponse>),

    #[oai(status = 503)]
    ServiceUnavailable(Json<ServiceUnavailableResponse>),
}

#[derive(Object, Deserialize)]
pub struct RefreshTokenRequest {
    pub refresh_token: String,
}

#[derive(Object, Deserialize, Serialize)]
pub struct RefreshTokenResponse {
    pub exp: String,
    pub exp_in: i64,
    pub exp_refresh_token: String,
    pub refresh_token: String,
    pub token: String,
    pub token_type: String,
}

#[derive(ApiResponse)]
pub enum RefreshTokenResponses {
    #[oai(status = 200)]
    Ok(Json<RefreshTokenResponse>),

    #[oai(status = 401)]
    Unauthorized(Json<UnauthorizedResponse>),

    #[oai(status = 503)]
    ServiceUnavailable(Json<ServiceUnavailableResponse>),
}

#[derive(ApiResponse)]
pub enum LogoutResponses {
    #[oai(status = 204)]
    NoContent,

    #[oai(status = 401)]
    Unauthorized(Json<UnauthorizedResponse>),

    #[oai(status = 503)]
    ServiceUnavailable(Json<ServiceUnavailableResponse>),
}

#[derive(Object, Deserialize, Serialize)]
pub struct MeResponse {
    pub id: String,
    pub email: String,
    pub profile_id: Option<String>,
    pub created_date: Option<String>,
}

#[derive(ApiResponse)]
pub enum MeResponses {
    #[oai(status = 200)]
    Ok(Json<MeResponse>),

    #[oai(status = 401)]
    Unauthorized(Json<UnauthorizedResponse>),

    #[oai(status = 503)]
    ServiceUnavailable(Json<ServiceUnavailableResponse>),
}
