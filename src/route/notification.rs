use std::sync::Arc;

use poem::web::Data;
use poem_openapi::{param::Query, payload::Json, OpenApi, Tags};

use crate::{
    core::{
        notification::{
            clear_notifications, get_notifications, mark_all_notifications_read,
            mark_notification_read, unread_count,
        },
        security::{get_user_from_token, BearerAuthorization},
        utils::parse_uuid,
    },
    schema::{
        common::{
            BadRequestResponse, NotFoundResponse, ServiceUnavailableResponse,
            UnauthorizedResponse,
        },
        notification::{
            NotificationDetail, NotificationListResponse, NotificationListResponses,
            NotificationReadResponses, NotificationUpdateResponses,
        },
    },
    AppState,
};

#[derive(Tags)]
enum ApiNotificationTags {
    Notification,
}

pub struct ApiNotification;

#[OpenApi]
impl ApiNotification {
    #[oai(
        path = "/notification/",
        method = "get",
        tag = "ApiNotificationTags::Notification"
    )]
    async fn get_notification_api(
        &self,
        state: Data<&Arc<AppState>>,
        auth: BearerAuthorization,
    ) -> NotificationListResponses {
        // Begin db transaction
        let mut tx = match state.db.begin().await {
            Ok(val) => val,
            Err(err) => {
                return NotificationListResponses::ServiceUnavailable(Json(
                    ServiceUnavailableResponse::new(
                        "route.notification",
                        "get_notification_api",
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
                return NotificationListResponses::ServiceUnavailable(Json(
                    ServiceUnavailableResponse::new(
                        "route.notification",
                        "get_notification_api",
                        "get redis pool connection",
                        &err.to_string(),
                    ),
                ))
            }
        };

        // Validate user token
        let user = match get_user_from_token(&mut tx, &mut redis_conn, auth.0.token).await {
            Ok(val) => val,
            Err(err) => {
                return NotificationListResponses::ServiceUnavailable(Json(
                    ServiceUnavailableResponse::new(
                        "route.notification",
                        "get_notification_api",
                        "get user from token",
                        &err.to_string(),
                    ),
                ))
            }
        };
        let Some(user) = user else {
            return NotificationListResponses::Unauthorized(Json(UnauthorizedResponse::default()));
        };

        match get_notifications(&mut redis_conn, &user.id) {
            Ok(val) => NotificationListResponses::Ok(Json(NotificationListResponse {
                unread_count: unread_count(&val) as u32,
                records: val.into_iter().map(NotificationDetail::from).collect(),
            })),
            Err(err) => NotificationListResponses::ServiceUnavailable(Json(
                ServiceUnavailableResponse::new(
                    "route.notification",
                    "get_notification_api",
                    "get notifications",
                    &err.to_string(),
                ),
            )),
        }
    }

    #[oai(
        path = "/notification/read/",
        method = "put",
        tag = "ApiNotificationTags::Notification"
    )]
    async fn read_notification_api(
        &self,
        Query(id): Query<Option<String>>,
        state: Data<&Arc<AppState>>,
        auth: BearerAuthorization,
    ) -> NotificationReadResponses {
        let Some(id) = id.as_deref().and_then(parse_uuid) else {
            return NotificationReadResponses::BadRequest(Json(BadRequestResponse::new(
                "Invalid notification id.",
            )));
        };

        // Begin db transaction
        let mut tx = match state.db.begin().await {
            Ok(val) => val,
            Err(err) => {
                return NotificationReadResponses::ServiceUnavailable(Json(
                    ServiceUnavailableResponse::new(
                        "route.notification",
                        "read_notification_api",
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
                return NotificationReadResponses::ServiceUnavailable(Json(
                    ServiceUnavailableResponse::new(
                        "route.notification",
                        "read_notification_api",
                        "get redis pool connection",
                        &err.to_string(),
                    ),
                ))
            }
        };

        // Validate user token
        let user = match get_user_from_token(&mut tx, &mut redis_conn, auth.0.token).await {
            Ok(val) => val,
            Err(err) => {
                return NotificationReadResponses::ServiceUnavailable(Json(
                    ServiceUnavailableResponse::new(
                        "route.notification",
                        "read_notification_api",
                        "get user from token",
                        &err.to_string(),
                    ),
                ))
            }
        };
        let Some(user) = user else {
            return NotificationReadResponses::Unauthorized(Json(UnauthorizedResponse::default()));
        };

        match mark_notification_read(&mut redis_conn, &user.id, &id) {
            Ok(true) => NotificationReadResponses::NoContent,
            Ok(false) => NotificationReadResponses::NotFound(Json(NotFoundResponse::new(
                "Notification not found.",
            ))),
            Err(err) => NotificationReadResponses::ServiceUnavailable(Json(
                ServiceUnavailableResponse::new(
                    "route.notification",
                    "read_notification_api",
                    "mark notification read",
                    &err.to_string(),
                ),
            )),
        }
    }

    #[oai(
        path = "/notification/read-all/",
        method = "put",
        tag = "ApiNotificationTags::Notification"
    )]
    async fn read_all_notification_api(
        &self,
        state: Data<&Arc<AppState>>,
        auth: BearerAuthorization,
    ) -> NotificationUpdateResponses {
        // Begin db transaction
        let mut tx = match state.db.begin().await {
            Ok(val) => val,
            Err(err) => {
                return NotificationUpdateResponses::ServiceUnavailable(Json(
                    ServiceUnavailableResponse::new(
                        "route.notification",
                        "read_all_notification_api",
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
                return NotificationUpdateResponses::ServiceUnavailable(Json(
                    ServiceUnavailableResponse::new(
                        "route.notification",
                        "read_all_notification_api",
                        "get redis pool connection",
                        &err.to_string(),
                    ),
                ))
            }
        };

        // Validate user token
        let user = match get_user_from_token(&mut tx, &mut redis_conn, auth.0.token).await {
            Ok(val) => val,
            Err(err) => {
                return NotificationUpdateResponses::ServiceUnavailable(Json(
                    ServiceUnavailableResponse::new(
                        "route.notification",
                        "read_all_notification_api",
                        "get user from token",
                        &err.to_string(),
                    ),
                ))
            }
        };
        let Some(user) = user else {
            return NotificationUpdateResponses::Unauthorized(Json(
                UnauthorizedResponse::default(),
            ));
        };

        match mark_all_notifications_read(&mut redis_conn, &user.id) {
            Ok(_) => NotificationUpdateResponses::NoContent,
            Err(err) => NotificationUpdateResponses::ServiceUnavailable(Json(
                ServiceUnavailableResponse::new(
                    "route.notification",
                    "read_all_notification_api",
                    "mark all notifications read",
                    &err.to_string(),
                ),
            )),
        }
    }

    #[oai(
        path = "/notification/",
        method = "delete",
        tag = "ApiNotificationTags::Notification"
    )]
    async fn clear_notification_api(
        &self,
        state: Data<&Arc<AppState>>,
        auth: BearerAuthorization,
    ) -> NotificationUpdateResponses {
        // Begin db transaction
        let mut tx = match state.db.begin().await {
            Ok(val) => val,
            Err(err) => {
                return NotificationUpdateResponses::ServiceUnavailable(Json(
                    ServiceUnavailableResponse::new(
                        "route.notification",
                        "clear_notification_api",
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
                return NotificationUpdateResponses::ServiceUnavailable(Json(
                    ServiceUnavailableResponse::new(
                        "route.notification",
                        "clear_notification_api",
                        "get redis pool connection",
                        &err.to_string(),
                    ),
                ))
            }
        };

        // Validate user token
        let user = match get_user_from_token(&mut tx, &mut redis_conn, auth.0.token).await {
            Ok(val) => val,
            Err(err) => {
                return NotificationUpdateResponses::ServiceUnavailable(Json(
                    ServiceUnavailableResponse::new(
                        "route.notification",
                        "clear_notification_api",
                        "get user from token",
                        &err.to_string(),
                    ),
                ))
            }
        };
        let Some(user) = user else {
            return NotificationUpdateResponses::Unauthorized(Json(
                UnauthorizedResponse::default(),
            ));
        };

        match clear_notifications(&mut redis_conn, &user.id) {
            Ok(_) => NotificationUpdateResponses::NoContent,
            Err(err) => NotificationUpdateResponses::ServiceUnavailable(Json(
                ServiceUnavailableResponse::new(
                    "route.notification",
                    "clear_notification_api",
                    "clear notifications",
                    &err.to_string(),
                ),
            )),
        }
    }
}
