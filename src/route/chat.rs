use std::sync::Arc;

use chrono::Local;
use poem::web::Data;
use poem_openapi::{payload::Json, OpenApi, Tags};
use uuid::Uuid;

use crate::{
    core::{
        security::{get_user_from_token, BearerAuthorization},
        utils::is_blank,
    },
    model::ai_message::{AiMessage, SENDER_AI, SENDER_USER},
    repository::ai_message::{create_ai_message, get_ai_messages},
    schema::{
        chat::{
            AiChatRecord, ChatCreateRequest, ChatCreateResponse, ChatCreateResponses,
            ChatListResponses,
        },
        common::{
            BadRequestResponse, RecordsResponse, ServiceUnavailableResponse, UnauthorizedResponse,
        },
    },
    AppState,
};

#[derive(Tags)]
enum ApiChatTags {
    Chat,
}

pub struct ApiChat;

#[OpenApi]
impl ApiChat {
    /// Conversation log between the current user and the AI assistant
    #[oai(path = "/chat/", method = "get", tag = "ApiChatTags::Chat")]
    async fn get_chat_api(
        &self,
        state: Data<&Arc<AppState>>,
        auth: BearerAuthorization,
    ) -> ChatListResponses {
        // Begin db transaction
        let mut tx = match state.db.begin().await {
            Ok(val) => val,
            Err(err) => {
                return ChatListResponses::ServiceUnavailable(Json(
                    ServiceUnavailableResponse::new(
                        "route.chat",
                        "get_chat_api",
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
                return ChatListResponses::ServiceUnavailable(Json(
                    ServiceUnavailableResponse::new(
                        "route.chat",
                        "get_chat_api",
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
                return ChatListResponses::ServiceUnavailable(Json(
                    ServiceUnavailableResponse::new(
                        "route.chat",
                        "get_chat_api",
                        "get user from token",
                        &err.to_string(),
                    ),
                ))
            }
        };
        let Some(user) = user else {
            return ChatListResponses::Unauthorized(Json(UnauthorizedResponse::default()));
        };

        match get_ai_messages(&mut tx, &user.id).await {
            Ok(val) => ChatListResponses::Ok(Json(RecordsResponse {
                records: val.into_iter().map(AiChatRecord::from).collect(),
            })),
            Err(err) => ChatListResponses::ServiceUnavailable(Json(
                ServiceUnavailableResponse::new(
                    "route.chat",
                    "get_chat_api",
                    "get ai messages",
                    &err.to_string(),
                ),
            )),
        }
    }

    #[oai(path = "/chat/", method = "post", tag = "ApiChatTags::Chat")]
    async fn create_chat_api(
        &self,
        json: Json<ChatCreateRequest>,
        state: Data<&Arc<AppState>>,
        auth: BearerAuthorization,
    ) -> ChatCreateResponses {
        if is_blank(&json.sender) || is_blank(&json.text) {
            return ChatCreateResponses::BadRequest(Json(BadRequestResponse::new(
                "Unable to send message. Data is incomplete.",
            )));
        }
        let sender = json.sender.trim();
        if sender != SENDER_USER && sender != SENDER_AI {
            return ChatCreateResponses::BadRequest(Json(BadRequestResponse::new(
                "Invalid sender.",
            )));
        }

        // Begin db transaction
        let mut tx = match state.db.begin().await {
            Ok(val) => val,
            Err(err) => {
                return ChatCreateResponses::ServiceUnavailable(Json(
                    ServiceUnavailableResponse::new(
                        "route.chat",
                        "create_chat_api",
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
                return ChatCreateResponses::ServiceUnavailable(Json(
                    ServiceUnavailableResponse::new(
                        "route.chat",
                        "create_chat_api",
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
                return ChatCreateResponses::ServiceUnavailable(Json(
                    ServiceUnavailableResponse::new(
                        "route.chat",
                        "create_chat_api",
                        "get user from token",
                        &err.to_string(),
                    ),
                ))
            }
        };
        let Some(user) = user else {
            return ChatCreateResponses::Unauthorized(Json(UnauthorizedResponse::default()));
        };

        let message = AiMessage {
            id: Uuid::now_v7(),
            user_id: user.id,
            sender: sender.to_string(),
            text: json.text.clone(),
            related_profile_ids: json.related_profile_ids.clone().unwrap_or_default(),
            created_date: Local::now().fixed_offset(),
        };
        if let Err(err) = create_ai_message(&mut tx, &message).await {
            return ChatCreateResponses::ServiceUnavailable(Json(ServiceUnavailableResponse::new(
                "route.chat",
                "create_chat_api",
                "create ai message",
                &err.to_string(),
            )));
        }
        if let Err(err) = tx.commit().await {
            return ChatCreateResponses::ServiceUnavailable(Json(ServiceUnavailableResponse::new(
                "route.chat",
                "create_chat_api",
                "commit transaction",
                &err.to_string(),
            )));
        }

        ChatCreateResponses::Created(Json(ChatCreateResponse {
            message: "Message sent.".to_string(),
            record: message.into(),
        }))
    }
}
