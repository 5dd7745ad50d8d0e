use std::sync::Arc;

use chrono::Local;
use poem::web::Data;
use poem_openapi::{payload::Json, OpenApi, Tags};
use uuid::Uuid;

use crate::{
    ai::matchmaker::{ask, generate_bio, BioDetails},
    core::{
        notification::notify,
        security::{get_user_from_token, BearerAuthorization},
        utils::{is_blank, non_blank},
    },
    matching::Gender,
    model::{
        ai_message::{AiMessage, SENDER_AI, SENDER_USER},
        notification::{Notification, NotificationType},
    },
    repository::{
        ai_message::{create_ai_message, get_recent_ai_messages},
        profile::{get_all_profile, get_profile_by_user_id},
    },
    schema::{
        common::{BadRequestResponse, ServiceUnavailableResponse, UnauthorizedResponse},
        matchmaker::{
            MatchmakerAskRequest, MatchmakerAskResponses, MatchmakerBioRequest,
            MatchmakerBioResponse, MatchmakerBioResponses,
        },
    },
    AppState,
};

#[derive(Tags)]
enum ApiMatchmakerTags {
    Matchmaker,
}

pub struct ApiMatchmaker;

#[OpenApi]
impl ApiMatchmaker {
    /// Ask the AI matchmaker about the profiles visible to the current user.
    ///
    /// Provider failures are not errors: the reply text degrades to a fixed
    /// apology and no profiles are recommended.
    #[oai(
        path = "/matchmaker/ask",
        method = "post",
        tag = "ApiMatchmakerTags::Matchmaker"
    )]
    async fn matchmaker_ask_api(
        &self,
        json: Json<MatchmakerAskRequest>,
        state: Data<&Arc<AppState>>,
        auth: BearerAuthorization,
    ) -> MatchmakerAskResponses {
        if is_blank(&json.message) {
            return MatchmakerAskResponses::BadRequest(Json(BadRequestResponse::new(
                "Message is required.",
            )));
        }

        // Begin db transaction
        let mut tx = match state.db.begin().await {
            Ok(val) => val,
            Err(err) => {
                return MatchmakerAskResponses::ServiceUnavailable(Json(
                    ServiceUnavailableResponse::new(
                        "route.matchmaker",
                        "matchmaker_ask_api",
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
                return MatchmakerAskResponses::ServiceUnavailable(Json(
                    ServiceUnavailableResponse::new(
                        "route.matchmaker",
                        "matchmaker_ask_api",
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
                return MatchmakerAskResponses::ServiceUnavailable(Json(
                    ServiceUnavailableResponse::new(
                        "route.matchmaker",
                        "matchmaker_ask_api",
                        "get user from token",
                        &err.to_string(),
                    ),
                ))
            }
        };
        let Some(user) = user else {
            return MatchmakerAskResponses::Unauthorized(Json(UnauthorizedResponse::default()));
        };

        let viewer = match get_profile_by_user_id(&mut tx, &user.id).await {
            Ok(val) => val,
            Err(err) => {
                return MatchmakerAskResponses::ServiceUnavailable(Json(
                    ServiceUnavailableResponse::new(
                        "route.matchmaker",
                        "matchmaker_ask_api",
                        "get viewer profile",
                        &err.to_string(),
                    ),
                ))
            }
        };
        let wanted_gender = viewer
            .and_then(|x| x.gender.parse::<Gender>().ok())
            .and_then(|x| x.opposite());
        let candidates = match get_all_profile(
            &mut tx,
            wanted_gender.as_ref().map(Gender::as_str),
            Some(&user.id),
        )
        .await
        {
            Ok(val) => val,
            Err(err) => {
                return MatchmakerAskResponses::ServiceUnavailable(Json(
                    ServiceUnavailableResponse::new(
                        "route.matchmaker",
                        "matchmaker_ask_api",
                        "get candidate profiles",
                        &err.to_string(),
                    ),
                ))
            }
        };
        let history = match get_recent_ai_messages(
            &mut tx,
            &user.id,
            state.config.ai_history_limit,
        )
        .await
        {
            Ok(val) => val,
            Err(err) => {
                return MatchmakerAskResponses::ServiceUnavailable(Json(
                    ServiceUnavailableResponse::new(
                        "route.matchmaker",
                        "matchmaker_ask_api",
                        "get ai messages",
                        &err.to_string(),
                    ),
                ))
            }
        };
        // release the connection while waiting on the provider
        if let Err(err) = tx.commit().await {
            return MatchmakerAskResponses::ServiceUnavailable(Json(
                ServiceUnavailableResponse::new(
                    "route.matchmaker",
                    "matchmaker_ask_api",
                    "commit read transaction",
                    &err.to_string(),
                ),
            ));
        }

        let asked_at = Local::now().fixed_offset();
        let reply = ask(
            &state.ai,
            &candidates,
            &history,
            state.config.ai_history_limit as usize,
            &json.message,
        )
        .await;
        tracing::debug!(
            "matchmaker replied to user {} with {} recommendation(s) from {} candidate(s)",
            user.id,
            reply.recommended_profile_ids.len(),
            candidates.len()
        );

        let mut tx = match state.db.begin().await {
            Ok(val) => val,
            Err(err) => {
                return MatchmakerAskResponses::ServiceUnavailable(Json(
                    ServiceUnavailableResponse::new(
                        "route.matchmaker",
                        "matchmaker_ask_api",
                        "begin write transaction",
                        &err.to_string(),
                    ),
                ));
            }
        };
        let question = AiMessage {
            id: Uuid::now_v7(),
            user_id: user.id,
            sender: SENDER_USER.to_string(),
            text: json.message.clone(),
            related_profile_ids: vec![],
            created_date: asked_at,
        };
        let answer = AiMessage {
            id: Uuid::now_v7(),
            user_id: user.id,
            sender: SENDER_AI.to_string(),
            text: reply.text.clone(),
            related_profile_ids: reply.recommended_profile_ids.clone(),
            created_date: Local::now().fixed_offset(),
        };
        for message in [&question, &answer] {
            if let Err(err) = create_ai_message(&mut tx, message).await {
                return MatchmakerAskResponses::ServiceUnavailable(Json(
                    ServiceUnavailableResponse::new(
                        "route.matchmaker",
                        "matchmaker_ask_api",
                        "create ai message",
                        &err.to_string(),
                    ),
                ));
            }
        }
        if let Err(err) = tx.commit().await {
            return MatchmakerAskResponses::ServiceUnavailable(Json(
                ServiceUnavailableResponse::new(
                    "route.matchmaker",
                    "matchmaker_ask_api",
                    "commit transaction",
                    &err.to_string(),
                ),
            ));
        }

        if !reply.recommended_profile_ids.is_empty() {
            notify(
                &mut redis_conn,
                &state.config,
                &user.id,
                Notification::new(
                    NotificationType::Match,
                    "New match suggestions",
                    &format!(
                        "The matchmaker suggested {} profile(s) for you.",
                        reply.recommended_profile_ids.len()
                    ),
                    Some("/matches"),
                ),
            );
        }

        MatchmakerAskResponses::Ok(Json(reply.into()))
    }

    #[oai(
        path = "/matchmaker/bio",
        method = "post",
        tag = "ApiMatchmakerTags::Matchmaker"
    )]
    async fn matchmaker_bio_api(
        &self,
        json: Json<MatchmakerBioRequest>,
        state: Data<&Arc<AppState>>,
        auth: BearerAuthorization,
    ) -> MatchmakerBioResponses {
        if is_blank(&json.name) {
            return MatchmakerBioResponses::BadRequest(Json(BadRequestResponse::new(
                "Name is required.",
            )));
        }

        // Begin db transaction
        let mut tx = match state.db.begin().await {
            Ok(val) => val,
            Err(err) => {
                return MatchmakerBioResponses::ServiceUnavailable(Json(
                    ServiceUnavailableResponse::new(
                        "route.matchmaker",
                        "matchmaker_bio_api",
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
                return MatchmakerBioResponses::ServiceUnavailable(Json(
                    ServiceUnavailableResponse::new(
                        "route.matchmaker",
                        "matchmaker_bio_api",
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
                return MatchmakerBioResponses::ServiceUnavailable(Json(
                    ServiceUnavailableResponse::new(
                        "route.matchmaker",
                        "matchmaker_bio_api",
                        "get user from token",
                        &err.to_string(),
                    ),
                ))
            }
        };
        if user.is_none() {
            return MatchmakerBioResponses::Unauthorized(Json(UnauthorizedResponse::default()));
        }
        drop(tx);

        let details = BioDetails {
            name: json.name.trim().to_string(),
            profession: non_blank(json.profession.as_deref()),
            hobbies: json.hobbies.clone().unwrap_or_default(),
            traits: non_blank(json.traits.as_deref()),
            partner_pref: non_blank(json.partner_pref.as_deref()),
        };
        let bio = generate_bio(&state.ai, &details).await;
        MatchmakerBioResponses::Ok(Json(MatchmakerBioResponse { bio }))
    }
}
