use std::sync::Arc;

use chrono::Local;
use poem::web::Data;
use poem_openapi::{param::Query, payload::Json, OpenApi, Tags};
use uuid::Uuid;

use crate::{
    core::{
        notification::notify,
        security::{get_user_from_token, BearerAuthorization},
        utils::{is_blank, non_blank, parse_uuid},
    },
    model::{
        notification::{Notification, NotificationType},
        user_message::UserMessage,
    },
    repository::{
        connection::is_connected,
        profile::get_display_name,
        user_message::{create_message, get_message_by_id, get_messages_between, mark_messages_read},
    },
    schema::{
        common::{
            BadRequestResponse, ForbiddenResponse, ServiceUnavailableResponse,
            UnauthorizedResponse,
        },
        user_chat::{
            UserChatListResponses, UserChatMessage, UserChatReadRequest, UserChatReadResponse,
            UserChatReadResponses, UserChatSendRequest, UserChatSendResponse,
            UserChatSendResponses,
        },
    },
    AppState,
};

const PREVIEW_CHARS: usize = 50;

fn preview(message: &str) -> String {
    let mut chars = message.chars();
    let head: String = chars.by_ref().take(PREVIEW_CHARS).collect();
    if chars.next().is_some() {
        format!("{head}...")
    } else {
        head
    }
}

#[derive(Tags)]
enum ApiUserChatTags {
    UserChat,
}

pub struct ApiUserChat;

#[OpenApi]
impl ApiUserChat {
    /// Messages between the current user and `friend_id`, oldest first.
    /// With `after`, only messages newer than that message id.
    #[oai(path = "/user-chat/", method = "get", tag = "ApiUserChatTags::UserChat")]
    async fn get_user_chat_api(
        &self,
        Query(friend_id): Query<Option<String>>,
        Query(after): Query<Option<String>>,
        state: Data<&Arc<AppState>>,
        auth: BearerAuthorization,
    ) -> UserChatListResponses {
        let Some(friend_id) = friend_id.as_deref().and_then(parse_uuid) else {
            return UserChatListResponses::BadRequest(Json(BadRequestResponse::new(
                "Missing friend_id.",
            )));
        };
        let after = match non_blank(after.as_deref()) {
            Some(val) => match parse_uuid(&val) {
                Some(val) => Some(val),
                None => {
                    return UserChatListResponses::BadRequest(Json(BadRequestResponse::new(
                        "Invalid after id.",
                    )))
                }
            },
            None => None,
        };

        // Begin db transaction
        let mut tx = match state.db.begin().await {
            Ok(val) => val,
            Err(err) => {
                return UserChatListResponses::ServiceUnavailable(Json(
                    ServiceUnavailableResponse::new(
                        "route.user_chat",
                        "get_user_chat_api",
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
                return UserChatListResponses::ServiceUnavailable(Json(
                    ServiceUnavailableResponse::new(
                        "route.user_chat",
                        "get_user_chat_api",
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
                return UserChatListResponses::ServiceUnavailable(Json(
                    ServiceUnavailableResponse::new(
                        "route.user_chat",
                        "get_user_chat_api",
                        "get user from token",
                        &err.to_string(),
                    ),
                ))
            }
        };
        let Some(user) = user else {
            return UserChatListResponses::Unauthorized(Json(UnauthorizedResponse::default()));
        };

        let after = match after {
            Some(after) => match get_message_by_id(&mut tx, &after).await {
                Ok(Some(val))
                    if (val.sender_id == user.id && val.receiver_id == friend_id)
                        || (val.sender_id == friend_id && val.receiver_id == user.id) =>
                {
                    Some(val)
                }
                Ok(_) => {
                    return UserChatListResponses::BadRequest(Json(BadRequestResponse::new(
                        "Invalid after id.",
                    )))
                }
                Err(err) => {
                    return UserChatListResponses::ServiceUnavailable(Json(
                        ServiceUnavailableResponse::new(
                            "route.user_chat",
                            "get_user_chat_api",
                            "get after message",
                            &err.to_string(),
                        ),
                    ))
                }
            },
            None => None,
        };

        match get_messages_between(&mut tx, &user.id, &friend_id, after.as_ref()).await {
            Ok(val) => UserChatListResponses::Ok(Json(
                val.into_iter().map(UserChatMessage::from).collect(),
            )),
            Err(err) => UserChatListResponses::ServiceUnavailable(Json(
                ServiceUnavailableResponse::new(
                    "route.user_chat",
                    "get_user_chat_api",
                    "get messages between",
                    &err.to_string(),
                ),
            )),
        }
    }

    #[oai(path = "/user-chat/", method = "post", tag = "ApiUserChatTags::UserChat")]
    async fn send_user_chat_api(
        &self,
        json: Json<UserChatSendRequest>,
        state: Data<&Arc<AppState>>,
        auth: BearerAuthorization,
    ) -> UserChatSendResponses {
        let receiver_id = parse_uuid(&json.receiver_id);
        let (Some(receiver_id), false) = (receiver_id, is_blank(&json.message)) else {
            return UserChatSendResponses::BadRequest(Json(BadRequestResponse::new(
                "Incomplete data.",
            )));
        };

        // Begin db transaction
        let mut tx = match state.db.begin().await {
            Ok(val) => val,
            Err(err) => {
                return UserChatSendResponses::ServiceUnavailable(Json(
                    ServiceUnavailableResponse::new(
                        "route.user_chat",
                        "send_user_chat_api",
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
                return UserChatSendResponses::ServiceUnavailable(Json(
                    ServiceUnavailableResponse::new(
                        "route.user_chat",
                        "send_user_chat_api",
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
                return UserChatSendResponses::ServiceUnavailable(Json(
                    ServiceUnavailableResponse::new(
                        "route.user_chat",
                        "send_user_chat_api",
                        "get user from token",
                        &err.to_string(),
                    ),
                ))
            }
        };
        let Some(user) = user else {
            return UserChatSendResponses::Unauthorized(Json(UnauthorizedResponse::default()));
        };

        let connected = match is_connected(&mut tx, &user.id, &receiver_id).await {
            Ok(val) => val,
            Err(err) => {
                return UserChatSendResponses::ServiceUnavailable(Json(
                    ServiceUnavailableResponse::new(
                        "route.user_chat",
                        "send_user_chat_api",
                        "check connection",
                        &err.to_string(),
                    ),
                ))
            }
        };
        if !connected {
            return UserChatSendResponses::Forbidden(Json(ForbiddenResponse::new(
                "You can only message accepted connections.",
            )));
        }

        let message = UserMessage {
            id: Uuid::now_v7(),
            sender_id: user.id,
            receiver_id,
            message: json.message.clone(),
            is_read: false,
            created_date: Local::now().fixed_offset(),
        };
        if let Err(err) = create_message(&mut tx, &message).await {
            return UserChatSendResponses::ServiceUnavailable(Json(
                ServiceUnavailableResponse::new(
                    "route.user_chat",
                    "send_user_chat_api",
                    "create message",
                    &err.to_string(),
                ),
            ));
        }

        let sender_name = match get_display_name(&mut tx, &user.id, &user.email).await {
            Ok(val) => val,
            Err(err) => {
                return UserChatSendResponses::ServiceUnavailable(Json(
                    ServiceUnavailableResponse::new(
                        "route.user_chat",
                        "send_user_chat_api",
                        "get sender name",
                        &err.to_string(),
                    ),
                ))
            }
        };

        if let Err(err) = tx.commit().await {
            return UserChatSendResponses::ServiceUnavailable(Json(
                ServiceUnavailableResponse::new(
                    "route.user_chat",
                    "send_user_chat_api",
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
                NotificationType::Message,
                &format!("New message from {sender_name}"),
                &preview(&message.message),
                Some("/chat"),
            ),
        );

        UserChatSendResponses::Created(Json(UserChatSendResponse {
            message: "Message sent.".to_string(),
            record: message.into(),
        }))
    }

    #[oai(
        path = "/user-chat/read/",
        method = "put",
        tag = "ApiUserChatTags::UserChat"
    )]
    async fn read_user_chat_api(
        &self,
        json: Json<UserChatReadRequest>,
        state: Data<&Arc<AppState>>,
        auth: BearerAuthorization,
    ) -> UserChatReadResponses {
        let Some(friend_id) = parse_uuid(&json.friend_id) else {
            return UserChatReadResponses::BadRequest(Json(BadRequestResponse::new(
                "Missing friend_id.",
            )));
        };

        // Begin db transaction
        let mut tx = match state.db.begin().await {
            Ok(val) => val,
            Err(err) => {
                return UserChatReadResponses::ServiceUnavailable(Json(
                    ServiceUnavailableResponse::new(
                        "route.user_chat",
                        "read_user_chat_api",
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
                return UserChatReadResponses::ServiceUnavailable(Json(
                    ServiceUnavailableResponse::new(
                        "route.user_chat",
                        "read_user_chat_api",
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
                return UserChatReadResponses::ServiceUnavailable(Json(
                    ServiceUnavailableResponse::new(
                        "route.user_chat",
                        "read_user_chat_api",
                        "get user from token",
                        &err.to_string(),
                    ),
                ))
            }
        };
        let Some(user) = user else {
            return UserChatReadResponses::Unauthorized(Json(UnauthorizedResponse::default()));
        };

        let updated = match mark_messages_read(&mut tx, &friend_id, &user.id).await {
            Ok(val) => val,
            Err(err) => {
                return UserChatReadResponses::ServiceUnavailable(Json(
                    ServiceUnavailableResponse::new(
                        "route.user_chat",
                        "read_user_chat_api",
                        "mark messages read",
                        &err.to_string(),
                    ),
                ))
            }
        };
        if let Err(err) = tx.commit().await {
            return UserChatReadResponses::ServiceUnavailable(Json(
                ServiceUnavailableResponse::new(
                    "route.user_chat",
                    "read_user_chat_api",
                    "commit transaction",
                    &err.to_string(),
                ),
            ));
        }

        UserChatReadResponses::Ok(Json(UserChatReadResponse {
            message: "Messages marked as read.".to_string(),
            updated,
        }))
    }
}
