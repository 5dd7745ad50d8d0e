use std::sync::Arc;

use chrono::Local;
use poem::web::Data;
use poem_openapi::{param::Query, payload::Json, OpenApi, Tags};
use uuid::Uuid;

use crate::{
    core::{
        notification::notify,
        security::{get_user_from_token, BearerAuthorization},
        utils::{non_blank, parse_uuid},
    },
    model::{
        connection::{Connection, ConnectionStatus},
        notification::{Notification, NotificationType},
    },
    repository::{
        connection::{
            create_connection, get_accepted_connections, get_all_connections,
            get_connection_between, get_connection_by_id, get_pending_connections,
            respond_connection,
        },
        profile::get_display_name,
        user::get_user_by_id,
    },
    schema::{
        common::{
            BadRequestResponse, ForbiddenResponse, NotFoundResponse, RecordsResponse,
            ServiceUnavailableResponse, UnauthorizedResponse,
        },
        connection::{
            ConnectionCheckResponse, ConnectionCheckResponses, ConnectionCreateRequest,
            ConnectionCreateResponses, ConnectionDetail, ConnectionListResponses,
            ConnectionMessageResponse, ConnectionRespondRequest, ConnectionRespondResponses,
        },
    },
    AppState,
};

#[derive(Tags)]
enum ApiConnectionTags {
    Connection,
}

pub struct ApiConnection;

#[OpenApi]
impl ApiConnection {
    #[oai(path = "/connection/", method = "post", tag = "ApiConnectionTags::Connection")]
    async fn create_connection_api(
        &self,
        json: Json<ConnectionCreateRequest>,
        state: Data<&Arc<AppState>>,
        auth: BearerAuthorization,
    ) -> ConnectionCreateResponses {
        let Some(receiver_id) = parse_uuid(&json.receiver_id) else {
            return ConnectionCreateResponses::BadRequest(Json(BadRequestResponse::new(
                "Incomplete data. receiver_id is required.",
            )));
        };

        // Begin db transaction
        let mut tx = match state.db.begin().await {
            Ok(val) => val,
            Err(err) => {
                return ConnectionCreateResponses::ServiceUnavailable(Json(
                    ServiceUnavailableResponse::new(
                        "route.connection",
                        "create_connection_api",
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
                return ConnectionCreateResponses::ServiceUnavailable(Json(
                    ServiceUnavailableResponse::new(
                        "route.connection",
                        "create_connection_api",
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
                return ConnectionCreateResponses::ServiceUnavailable(Json(
                    ServiceUnavailableResponse::new(
                        "route.connection",
                        "create_connection_api",
                        "get user from token",
                        &err.to_string(),
                    ),
                ))
            }
        };
        let Some(user) = user else {
            return ConnectionCreateResponses::Unauthorized(Json(UnauthorizedResponse::default()));
        };
        if user.id == receiver_id {
            return ConnectionCreateResponses::BadRequest(Json(BadRequestResponse::new(
                "You cannot send a connection request to yourself.",
            )));
        }

        match get_user_by_id(&mut tx, &receiver_id).await {
            Ok(Some(_)) => {}
            Ok(None) => {
                return ConnectionCreateResponses::NotFound(Json(NotFoundResponse::new(
                    "User not found.",
                )))
            }
            Err(err) => {
                return ConnectionCreateResponses::ServiceUnavailable(Json(
                    ServiceUnavailableResponse::new(
                        "route.connection",
                        "create_connection_api",
                        "get receiver",
                        &err.to_string(),
                    ),
                ))
            }
        }

        let now = Local::now().fixed_offset();
        let connection = Connection {
            id: Uuid::now_v7(),
            sender_id: user.id,
            receiver_id,
            status: ConnectionStatus::Pending.to_string(),
            created_date: Some(now),
            updated_date: Some(now),
        };
        let is_created = match create_connection(&mut tx, &connection).await {
            Ok(val) => val,
            Err(err) => {
                return ConnectionCreateResponses::ServiceUnavailable(Json(
                    ServiceUnavailableResponse::new(
                        "route.connection",
                        "create_connection_api",
                        "create connection",
                        &err.to_string(),
                    ),
                ))
            }
        };
        if !is_created {
            return ConnectionCreateResponses::BadRequest(Json(BadRequestResponse::new(
                "Connection request already exists.",
            )));
        }

        let sender_name = match get_display_name(&mut tx, &user.id, &user.email).await {
            Ok(val) => val,
            Err(err) => {
                return ConnectionCreateResponses::ServiceUnavailable(Json(
                    ServiceUnavailableResponse::new(
                        "route.connection",
                        "create_connection_api",
                        "get sender name",
                        &err.to_string(),
                    ),
                ))
            }
        };

        if let Err(err) = tx.commit().await {
            return ConnectionCreateResponses::ServiceUnavailable(Json(
                ServiceUnavailableResponse::new(
                    "route.connection",
                    "create_connection_api",
                    "commit transaction",
                    &err.to_string(),
                ),
            ));
        }

        notify(
            &mut redis_conn,
            &state.config,
            &receiver_id,
            Notification::new(
                NotificationType::Connection,
                "New connection request",
                &format!("{sender_name} sent you a connection request."),
                Some("/connections"),
            ),
        );

        ConnectionCreateResponses::Created(Json(ConnectionMessageResponse {
            message: "Connection request sent.".to_string(),
            connection: connection.into(),
        }))
    }

    #[oai(path = "/connection/", method = "put", tag = "ApiConnectionTags::Connection")]
    async fn respond_connection_api(
        &self,
        json: Json<ConnectionRespondRequest>,
        state: Data<&Arc<AppState>>,
        auth: BearerAuthorization,
    ) -> ConnectionRespondResponses {
        let Some(connection_id) = parse_uuid(&json.connection_id) else {
            return ConnectionRespondResponses::BadRequest(Json(BadRequestResponse::new(
                "Incomplete data. connection_id and status are required.",
            )));
        };
        let status = match json.status.trim().parse::<ConnectionStatus>() {
            Ok(val) if val.is_terminal() => val,
            _ => {
                return ConnectionRespondResponses::BadRequest(Json(BadRequestResponse::new(
                    "Invalid status.",
                )))
            }
        };

        // Begin db transaction
        let mut tx = match state.db.begin().await {
            Ok(val) => val,
            Err(err) => {
                return ConnectionRespondResponses::ServiceUnavailable(Json(
                    ServiceUnavailableResponse::new(
                        "route.connection",
                        "respond_connection_api",
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
                return ConnectionRespondResponses::ServiceUnavailable(Json(
                    ServiceUnavailableResponse::new(
                        "route.connection",
                        "respond_connection_api",
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
                return ConnectionRespondResponses::ServiceUnavailable(Json(
                    ServiceUnavailableResponse::new(
                        "route.connection",
                        "respond_connection_api",
                        "get user from token",
                        &err.to_string(),
                    ),
                ))
            }
        };
        let Some(user) = user else {
            return ConnectionRespondResponses::Unauthorized(Json(UnauthorizedResponse::default()));
        };

        let connection = match get_connection_by_id(&mut tx, &connection_id).await {
            Ok(Some(val)) => val,
            Ok(None) => {
                return ConnectionRespondResponses::NotFound(Json(NotFoundResponse::new(
                    "Connection not found.",
                )))
            }
            Err(err) => {
                return ConnectionRespondResponses::ServiceUnavailable(Json(
                    ServiceUnavailableResponse::new(
                        "route.connection",
                        "respond_connection_api",
                        "get connection by id",
                        &err.to_string(),
                    ),
                ))
            }
        };
        if connection.receiver_id != user.id {
            return ConnectionRespondResponses::Forbidden(Json(ForbiddenResponse::new(
                "Only the receiver can respond to this request.",
            )));
        }

        // the update only matches a pending row, a concurrent response loses here
        let now = Local::now().fixed_offset();
        let updated = match respond_connection(&mut tx, &connection.id, status, now).await {
            Ok(val) => val,
            Err(err) => {
                return ConnectionRespondResponses::ServiceUnavailable(Json(
                    ServiceUnavailableResponse::new(
                        "route.connection",
                        "respond_connection_api",
                        "respond connection",
                        &err.to_string(),
                    ),
                ))
            }
        };
        let Some(updated) = updated else {
            return ConnectionRespondResponses::BadRequest(Json(BadRequestResponse::new(
                "Connection request is no longer pending.",
            )));
        };

        let receiver_name = match get_display_name(&mut tx, &user.id, &user.email).await {
            Ok(val) => val,
            Err(err) => {
                return ConnectionRespondResponses::ServiceUnavailable(Json(
                    ServiceUnavailableResponse::new(
                        "route.connection",
                        "respond_connection_api",
                        "get receiver name",
                        &err.to_string(),
                    ),
                ))
            }
        };

        if let Err(err) = tx.commit().await {
            return ConnectionRespondResponses::ServiceUnavailable(Json(
                ServiceUnavailableResponse::new(
                    "route.connection",
                    "respond_connection_api",
                    "commit transaction",
                    &err.to_string(),
                ),
            ));
        }
        tracing::info!("connection {} {}", updated.id, status);

        if status == ConnectionStatus::Accepted {
            notify(
                &mut redis_conn,
                &state.config,
                &updated.sender_id,
                Notification::new(
                    NotificationType::Connection,
                    "Connection accepted",
                    &format!("{receiver_name} accepted your connection request."),
                    Some("/chat"),
                ),
            );
        }

        ConnectionRespondResponses::Ok(Json(ConnectionMessageResponse {
            message: "Connection updated.".to_string(),
            connection: updated.into(),
        }))
    }

    #[oai(path = "/connection/", method = "get", tag = "ApiConnectionTags::Connection")]
    async fn get_connection_list_api(
        &self,
        #[oai(name = "type")] list_type: Query<Option<String>>,
        state: Data<&Arc<AppState>>,
        auth: BearerAuthorization,
    ) -> ConnectionListResponses {
        let list_type = non_blank(list_type.0.as_deref()).unwrap_or("all".to_string());
        if !["pending", "accepted", "all"].contains(&list_type.as_str()) {
            return ConnectionListResponses::BadRequest(Json(BadRequestResponse::new(
                "Invalid type.",
            )));
        }

        // Begin db transaction
        let mut tx = match state.db.begin().await {
            Ok(val) => val,
            Err(err) => {
                return ConnectionListResponses::ServiceUnavailable(Json(
                    ServiceUnavailableResponse::new(
                        "route.connection",
                        "get_connection_list_api",
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
                return ConnectionListResponses::ServiceUnavailable(Json(
                    ServiceUnavailableResponse::new(
                        "route.connection",
                        "get_connection_list_api",
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
                return ConnectionListResponses::ServiceUnavailable(Json(
                    ServiceUnavailableResponse::new(
                        "route.connection",
                        "get_connection_list_api",
                        "get user from token",
                        &err.to_string(),
                    ),
                ))
            }
        };
        let Some(user) = user else {
            return ConnectionListResponses::Unauthorized(Json(UnauthorizedResponse::default()));
        };

        let data: anyhow::Result<Vec<ConnectionDetail>> = match list_type.as_str() {
            "pending" => get_pending_connections(&mut tx, &user.id)
                .await
                .map(|x| x.into_iter().map(ConnectionDetail::from).collect()),
            "accepted" => get_accepted_connections(&mut tx, &user.id)
                .await
                .map(|x| x.into_iter().map(ConnectionDetail::from).collect()),
            _ => get_all_connections(&mut tx, &user.id)
                .await
                .map(|x| x.into_iter().map(ConnectionDetail::from).collect()),
        };
        match data {
            Ok(val) => ConnectionListResponses::Ok(Json(RecordsResponse { records: val })),
            Err(err) => ConnectionListResponses::ServiceUnavailable(Json(
                ServiceUnavailableResponse::new(
                    "route.connection",
                    "get_connection_list_api",
                    &format!("get {list_type} connections"),
                    &err.to_string(),
                ),
            )),
        }
    }

    #[oai(
        path = "/connection/check/",
        method = "get",
        tag = "ApiConnectionTags::Connection"
    )]
    async fn check_connection_api(
        &self,
        Query(sender_id): Query<Option<String>>,
        Query(receiver_id): Query<Option<String>>,
        state: Data<&Arc<AppState>>,
        auth: BearerAuthorization,
    ) -> ConnectionCheckResponses {
        let (Some(sender_id), Some(receiver_id)) = (
            sender_id.as_deref().and_then(parse_uuid),
            receiver_id.as_deref().and_then(parse_uuid),
        ) else {
            return ConnectionCheckResponses::BadRequest(Json(BadRequestResponse::new(
                "sender_id and receiver_id are required.",
            )));
        };

        // Begin db transaction
        let mut tx = match state.db.begin().await {
            Ok(val) => val,
            Err(err) => {
                return ConnectionCheckResponses::ServiceUnavailable(Json(
                    ServiceUnavailableResponse::new(
                        "route.connection",
                        "check_connection_api",
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
                return ConnectionCheckResponses::ServiceUnavailable(Json(
                    ServiceUnavailableResponse::new(
                        "route.connection",
                        "check_connection_api",
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
                return ConnectionCheckResponses::ServiceUnavailable(Json(
                    ServiceUnavailableResponse::new(
                        "route.connection",
                        "check_connection_api",
                        "get user from token",
                        &err.to_string(),
                    ),
                ))
            }
        };
        let Some(user) = user else {
            return ConnectionCheckResponses::Unauthorized(Json(UnauthorizedResponse::default()));
        };
        if user.id != sender_id && user.id != receiver_id {
            return ConnectionCheckResponses::Forbidden(Json(ForbiddenResponse::new(
                "You can only check your own connections.",
            )));
        }

        match get_connection_between(&mut tx, &sender_id, &receiver_id).await {
            Ok(Some(val)) => ConnectionCheckResponses::Ok(Json(val.into())),
            Ok(None) => ConnectionCheckResponses::Ok(Json(ConnectionCheckResponse::none())),
            Err(err) => ConnectionCheckResponses::ServiceUnavailable(Json(
                ServiceUnavailableResponse::new(
                    "route.connection",
                    "check_connection_api",
                    "get connection between",
                    &err.to_string(),
                ),
            )),
        }
    }
}
