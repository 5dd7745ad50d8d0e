use std::sync::Arc;

use chrono::{Duration, Local, Utc};
use poem::web::Data;
use poem_openapi::{payload::Json, OpenApi, Tags};
use uuid::Uuid;

use crate::{
    core::{
        security::{
            generate_refresh_token_from_user, generate_token_from_user, get_user_from_refresh_token,
            get_user_from_token, hash_password, verify_hash_password, BearerAuthorization,
        },
        session::{add_session, remove_session},
        utils::{datetime_to_string, datetime_to_string_opt, is_blank},
    },
    model::user::User,
    repository::{
        profile::get_profile_by_user_id,
        user::{create_user, get_user_by_email},
    },
    schema::{
        auth::{
            AuthUser, LoginRequest, LoginResponse, LoginResponses, LogoutResponses, MeResponse,
            MeResponses, RefreshTokenRequest, RefreshTokenResponse, RefreshTokenResponses,
            SignupRequest, SignupResponse, SignupResponses,
        },
        common::{BadRequestResponse, ServiceUnavailableResponse, UnauthorizedResponse},
    },
    AppState,
};

#[derive(Tags)]
enum ApiAuthTags {
    Auth,
}

pub struct ApiAuth;

#[OpenApi]
impl ApiAuth {
    #[oai(path = "/auth/signup", method = "post", tag = "ApiAuthTags::Auth")]
    async fn auth_signup(
        &self,
        json: Json<SignupRequest>,
        state: Data<&Arc<AppState>>,
    ) -> SignupResponses {
        if is_blank(&json.email) || is_blank(&json.password) {
            return SignupResponses::BadRequest(Json(BadRequestResponse::new("Incomplete data.")));
        }

        // Begin db transaction
        let mut tx = match state.db.begin().await {
            Ok(val) => val,
            Err(err) => {
                return SignupResponses::ServiceUnavailable(Json(ServiceUnavailableResponse::new(
                    "route.auth",
                    "auth_signup",
                    "begin transaction",
                    &err.to_string(),
                )));
            }
        };

        let password = match hash_password(&json.password) {
            Ok(val) => val,
            Err(err) => {
                return SignupResponses::ServiceUnavailable(Json(ServiceUnavailableResponse::new(
                    "route.auth",
                    "auth_signup",
                    "hash password",
                    &err.to_string(),
                )));
            }
        };
        let now = Local::now().fixed_offset();
        let user = User {
            id: Uuid::now_v7(),
            email: json.email.trim().to_lowercase(),
            password,
            created_date: Some(now),
            updated_date: Some(now),
        };
        let is_created = match create_user(&mut tx, &user).await {
            Ok(val) => val,
            Err(err) => {
                return SignupResponses::ServiceUnavailable(Json(ServiceUnavailableResponse::new(
                    "route.auth",
                    "auth_signup",
                    "create user",
                    &err.to_string(),
                )));
            }
        };
        if !is_created {
            return SignupResponses::BadRequest(Json(BadRequestResponse::new(
                "Email already exists.",
            )));
        }

        if let Err(err) = tx.commit().await {
            return SignupResponses::ServiceUnavailable(Json(ServiceUnavailableResponse::new(
                "route.auth",
                "auth_signup",
                "commit transaction",
                &err.to_string(),
            )));
        }
        tracing::info!("user {} registered", user.id);

        SignupResponses::Created(Json(SignupResponse {
            message: "User registered successfully.".to_string(),
            user: AuthUser {
                id: user.id.to_string(),
                email: user.email,
            },
        }))
    }

    #[oai(path = "/auth/login", method = "post", tag = "ApiAuthTags::Auth")]
    async fn auth_login(
        &self,
        json: Json<LoginRequest>,
        state: Data<&Arc<AppState>>,
    ) -> LoginResponses {
        if is_blank(&json.email) || is_blank(&json.password) {
            return LoginResponses::BadRequest(Json(BadRequestResponse::new("Incomplete data.")));
        }

        // Begin db transaction
        let mut tx = match state.db.begin().await {
            Ok(val) => val,
            Err(err) => {
                return LoginResponses::ServiceUnavailable(Json(ServiceUnavailableResponse::new(
                    "route.auth",
                    "auth_login",
                    "begin transaction",
                    &err.to_string(),
                )));
            }
        };

        // get redis conn from pool
        let mut redis_conn = match state.redis_conn.get() {
            Ok(val) => val,
            Err(err) => {
                return LoginResponses::ServiceUnavailable(Json(ServiceUnavailableResponse::new(
                    "route.auth",
                    "auth_login",
                    "get redis pool connection",
                    &err.to_string(),
                )))
            }
        };

        let user = match get_user_by_email(&mut tx, &json.email).await {
            Ok(val) => val,
            Err(err) => {
                return LoginResponses::ServiceUnavailable(Json(ServiceUnavailableResponse::new(
                    "route.auth",
                    "auth_login",
                    "check user on database",
                    &err.to_string(),
                )));
            }
        };
        let Some(user) = user else {
            return LoginResponses::Unauthorized(Json(UnauthorizedResponse::new("User not found.")));
        };

        // validate user password
        let is_valid = match verify_hash_password(&json.password, &user.password) {
            Ok(val) => val,
            Err(err) => {
                return LoginResponses::ServiceUnavailable(Json(ServiceUnavailableResponse::new(
                    "route.auth",
                    "auth_login",
                    "validate user password",
                    &err.to_string(),
                )))
            }
        };
        if !is_valid {
            return LoginResponses::Unauthorized(Json(UnauthorizedResponse::new(
                "Invalid password.",
            )));
        }

        let config = &state.config;
        let token = match generate_token_from_user(&user, config) {
            Ok(val) => val,
            Err(err) => {
                return LoginResponses::ServiceUnavailable(Json(ServiceUnavailableResponse::new(
                    "route.auth",
                    "auth_login",
                    "generate token",
                    &err.to_string(),
                )))
            }
        };
        let refresh_token = match generate_refresh_token_from_user(&user, config) {
            Ok(val) => val,
            Err(err) => {
                return LoginResponses::ServiceUnavailable(Json(ServiceUnavailableResponse::new(
                    "route.auth",
                    "auth_login",
                    "generate refresh token",
                    &err.to_string(),
                )))
            }
        };

        if let Err(err) = add_session(&mut redis_conn, &user, config, &token, &refresh_token) {
            return LoginResponses::ServiceUnavailable(Json(ServiceUnavailableResponse::new(
                "route.auth",
                "auth_login",
                "add_session to redis",
                &err.to_string(),
            )));
        }

        let now = Utc::now().fixed_offset();
        let exp = now + Duration::minutes(config.jwt_exp as i64);
        let exp_refresh_token = now + Duration::minutes(config.jwt_refresh_exp as i64);
        LoginResponses::Ok(Json(LoginResponse {
            message: "Login successful.".to_string(),
            exp: datetime_to_string(exp),
            exp_in: config.jwt_exp as i64 * 60,
            exp_refresh_token: datetime_to_string(exp_refresh_token),
            refresh_token,
            token,
            token_type: "Bearer".to_string(),
            user: AuthUser {
                id: user.id.to_string(),
                email: user.email,
            },
        }))
    }

    #[oai(
        path = "/auth/refresh-token",
        method = "post",
        tag = "ApiAuthTags::Auth"
    )]
    async fn auth_refresh_token(
        &self,
        json: Json<RefreshTokenRequest>,
        state: Data<&Arc<AppState>>,
    ) -> RefreshTokenResponses {
        // Begin db transaction
        let mut tx = match state.db.begin().await {
            Ok(val) => val,
            Err(err) => {
                return RefreshTokenResponses::ServiceUnavailable(Json(
                    ServiceUnavailableResponse::new(
                        "route.auth",
                        "auth_refresh_token",
                        "begin transaction",
                        &err.to_string(),
                    ),
                ));
            }
        };

        // get redis conn from pool
        let mut redis_conn = match state.redis_conn.get() {
            Ok(val) => val,
            Err(err) => {
                return RefreshTokenResponses::ServiceUnavailable(Json(
                    ServiceUnavailableResponse::new(
                        "route.auth",
                        "auth_refresh_token",
                        "get redis pool connection",
                        &err.to_string(),
                    ),
                ))
            }
        };

        let config = &state.config;
        let user = match get_user_from_refresh_token(&mut tx, &json.refresh_token, config).await {
            Ok(val) => val,
            Err(err) => {
                return RefreshTokenResponses::ServiceUnavailable(Json(
                    ServiceUnavailableResponse::new(
                        "route.auth",
                        "auth_refresh_token",
                        "get user from refresh token",
                        &err.to_string(),
                    ),
                ))
            }
        };
        let Some(user) = user else {
            return RefreshTokenResponses::Unauthorized(Json(UnauthorizedResponse::default()));
        };

        let token = match generate_token_from_user(&user, config) {
            Ok(val) => val,
            Err(err) => {
                return RefreshTokenResponses::ServiceUnavailable(Json(
                    ServiceUnavailableResponse::new(
                        "route.auth",
                        "auth_refresh_token",
                        "generate token",
                        &err.to_string(),
                    ),
                ))
            }
        };
        let refresh_token = match generate_refresh_token_from_user(&user, config) {
            Ok(val) => val,
            Err(err) => {
                return RefreshTokenResponses::ServiceUnavailable(Json(
                    ServiceUnavailableResponse::new(
                        "route.auth",
                        "auth_refresh_token",
                        "generate refresh token",
                        &err.to_string(),
                    ),
                ))
            }
        };

        if let Err(err) = add_session(&mut redis_conn, &user, config, &token, &refresh_token) {
            return RefreshTokenResponses::ServiceUnavailable(Json(
                ServiceUnavailableResponse::new(
                    "route.auth",
                    "auth_refresh_token",
                    "add_session to redis",
                    &err.to_string(),
                ),
            ));
        }

        let now = Utc::now().fixed_offset();
        let exp = now + Duration::minutes(config.jwt_exp as i64);
        let exp_refresh_token = now + Duration::minutes(config.jwt_refresh_exp as i64);
        RefreshTokenResponses::Ok(Json(RefreshTokenResponse {
            exp: datetime_to_string(exp),
            exp_in: config.jwt_exp as i64 * 60,
            exp_refresh_token: datetime_to_string(exp_refresh_token),
            refresh_token,
            token,
            token_type: "Bearer".to_string(),
        }))
    }

    #[oai(path = "/auth/logout", method = "post", tag = "ApiAuthTags::Auth")]
    async fn auth_logout(
        &self,
        state: Data<&Arc<AppState>>,
        auth: BearerAuthorization,
    ) -> LogoutResponses {
        // get redis conn from pool
        let mut redis_conn = match state.redis_conn.get() {
            Ok(val) => val,
            Err(err) => {
                return LogoutResponses::ServiceUnavailable(Json(ServiceUnavailableResponse::new(
                    "route.auth",
                    "auth_logout",
                    "get redis pool connection",
                    &err.to_string(),
                )))
            }
        };

        let Some(jwt_token) = auth.0.token else {
            return LogoutResponses::Unauthorized(Json(UnauthorizedResponse::default()));
        };
        match remove_session(&mut redis_conn, &jwt_token) {
            Ok(true) => LogoutResponses::NoContent,
            Ok(false) => LogoutResponses::Unauthorized(Json(UnauthorizedResponse::default())),
            Err(err) => LogoutResponses::ServiceUnavailable(Json(ServiceUnavailableResponse::new(
                "route.auth",
                "auth_logout",
                "remove session",
                &err.to_string(),
            ))),
        }
    }

    #[oai(path = "/auth/me", method = "get", tag = "ApiAuthTags::Auth")]
    async fn auth_me(&self, state: Data<&Arc<AppState>>, auth: BearerAuthorization) -> MeResponses {
        // Begin db transaction
        let mut tx = match state.db.begin().await {
            Ok(val) => val,
            Err(err) => {
                return MeResponses::ServiceUnavailable(Json(ServiceUnavailableResponse::new(
                    "route.auth",
                    "auth_me",
                    "begin transaction",
                    &err.to_string(),
                )));
            }
        };

        // get redis conn from pool
        let mut redis_conn = match state.redis_conn.get() {
            Ok(val) => val,
            Err(err) => {
                return MeResponses::ServiceUnavailable(Json(ServiceUnavailableResponse::new(
                    "route.auth",
                    "auth_me",
                    "get redis pool connection",
                    &err.to_string(),
                )))
            }
        };

        // Validate user token
        let user = match get_user_from_token(&mut tx, &mut redis_conn, auth.0.token).await {
            Ok(val) => val,
            Err(err) => {
                return MeResponses::ServiceUnavailable(Json(ServiceUnavailableResponse::new(
                    "route.auth",
                    "auth_me",
                    "get user from token",
                    &err.to_string(),
                )))
            }
        };
        let Some(user) = user else {
            return MeResponses::Unauthorized(Json(UnauthorizedResponse::default()));
        };

        let profile = match get_profile_by_user_id(&mut tx, &user.id).await {
            Ok(val) => val,
            Err(err) => {
                return MeResponses::ServiceUnavailable(Json(ServiceUnavailableResponse::new(
                    "route.auth",
                    "auth_me",
                    "get profile by user id",
                    &err.to_string(),
                )))
            }
        };

        MeResponses::Ok(Json(MeResponse {
            id: user.id.to_string(),
            email: user.email,
            profile_id: profile.map(|x| x.id.to_string()),
            created_date: datetime_to_string_opt(user.created_date),
        }))
    }
}
