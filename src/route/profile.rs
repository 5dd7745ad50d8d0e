use std::sync::Arc;

use chrono::Local;
use poem::web::Data;
use poem_openapi::{param::Query, payload::Json, OpenApi, Tags};
use uuid::Uuid;

use crate::{
    core::{
        db::is_unique_violation,
        security::{get_user_from_token, BearerAuthorization},
        utils::{age_on, is_blank, non_blank, parse_date_opt, parse_uuid},
    },
    matching::{filter_profiles, Gender, MatchFilters, SortBy, DEFAULT_MAX_AGE, DEFAULT_MIN_AGE},
    model::profile::Profile,
    repository::profile::{
        create_profile, get_all_profile, get_profile_by_id, get_profile_by_user_id,
        get_profile_by_user_or_email, update_profile,
    },
    schema::{
        common::{
            BadRequestResponse, MessageResponse, NotFoundResponse, RecordsResponse,
            ServiceUnavailableResponse, UnauthorizedResponse,
        },
        profile::{
            ProfileDetail, ProfileDetailResponses, ProfileListResponses, ProfileSaveRequest,
            ProfileSaveResponses,
        },
    },
    AppState,
};

#[derive(Tags)]
enum ApiProfileTags {
    Profile,
}

pub struct ApiProfile;

#[OpenApi]
impl ApiProfile {
    #[oai(path = "/profile/detail/", method = "get", tag = "ApiProfileTags::Profile")]
    async fn get_profile_detail_api(
        &self,
        Query(id): Query<Option<String>>,
        state: Data<&Arc<AppState>>,
    ) -> ProfileDetailResponses {
        let Some(id) = id.as_deref().and_then(parse_uuid) else {
            return ProfileDetailResponses::BadRequest(Json(BadRequestResponse::new(
                "Invalid profile id.",
            )));
        };

        // Begin db transaction
        let mut tx = match state.db.begin().await {
            Ok(val) => val,
            Err(err) => {
                return ProfileDetailResponses::ServiceUnavailable(Json(
                    ServiceUnavailableResponse::new(
                        "route.profile",
                        "get_profile_detail_api",
                        "begin transaction",
                        &err.to_string(),
                    ),
                ));
            }
        };

        match get_profile_by_id(&mut tx, &id).await {
            Ok(Some(profile)) => ProfileDetailResponses::Ok(Json(profile.into())),
            Ok(None) => ProfileDetailResponses::NotFound(Json(NotFoundResponse::new(
                "Profile not found.",
            ))),
            Err(err) => ProfileDetailResponses::ServiceUnavailable(Json(
                ServiceUnavailableResponse::new(
                    "route.profile",
                    "get_profile_detail_api",
                    "get profile by id",
                    &err.to_string(),
                ),
            )),
        }
    }

    #[oai(path = "/profile/by-user/", method = "get", tag = "ApiProfileTags::Profile")]
    async fn get_profile_by_user_api(
        &self,
        Query(user_id): Query<Option<String>>,
        state: Data<&Arc<AppState>>,
    ) -> ProfileDetailResponses {
        let Some(user_id) = user_id.as_deref().and_then(parse_uuid) else {
            return ProfileDetailResponses::BadRequest(Json(BadRequestResponse::new(
                "Invalid user id.",
            )));
        };

        // Begin db transaction
        let mut tx = match state.db.begin().await {
            Ok(val) => val,
            Err(err) => {
                return ProfileDetailResponses::ServiceUnavailable(Json(
                    ServiceUnavailableResponse::new(
                        "route.profile",
                        "get_profile_by_user_api",
                        "begin transaction",
                        &err.to_string(),
                    ),
                ));
            }
        };

        match get_profile_by_user_id(&mut tx, &user_id).await {
            Ok(Some(profile)) => ProfileDetailResponses::Ok(Json(profile.into())),
            Ok(None) => ProfileDetailResponses::NotFound(Json(NotFoundResponse::new(
                "Profile not found.",
            ))),
            Err(err) => ProfileDetailResponses::ServiceUnavailable(Json(
                ServiceUnavailableResponse::new(
                    "route.profile",
                    "get_profile_by_user_api",
                    "get profile by user id",
                    &err.to_string(),
                ),
            )),
        }
    }

    #[allow(clippy::too_many_arguments)]
    #[oai(path = "/profile/", method = "get", tag = "ApiProfileTags::Profile")]
    async fn get_profile_list_api(
        &self,
        Query(gender): Query<Option<String>>,
        Query(exclude_user_id): Query<Option<String>>,
        Query(viewer_gender): Query<Option<String>>,
        Query(religion): Query<Option<String>>,
        Query(caste): Query<Option<String>>,
        Query(sub_caste): Query<Option<String>>,
        Query(mother_tongue): Query<Option<String>>,
        Query(marital_status): Query<Option<String>>,
        Query(min_age): Query<Option<i32>>,
        Query(max_age): Query<Option<i32>>,
        Query(search): Query<Option<String>>,
        Query(sort_by): Query<Option<String>>,
        state: Data<&Arc<AppState>>,
    ) -> ProfileListResponses {
        let gender = match non_blank(gender.as_deref()).map(|x| x.parse::<Gender>()) {
            Some(Ok(val)) => Some(val),
            Some(Err(_)) => {
                return ProfileListResponses::BadRequest(Json(BadRequestResponse::new(
                    "Invalid gender.",
                )))
            }
            None => None,
        };
        let exclude_user_id = match non_blank(exclude_user_id.as_deref()) {
            Some(val) => match parse_uuid(&val) {
                Some(val) => Some(val),
                None => {
                    return ProfileListResponses::BadRequest(Json(BadRequestResponse::new(
                        "Invalid user id.",
                    )))
                }
            },
            None => None,
        };
        let sort_by = match non_blank(sort_by.as_deref()).map(|x| x.parse::<SortBy>()) {
            Some(Ok(val)) => val,
            Some(Err(_)) => {
                return ProfileListResponses::BadRequest(Json(BadRequestResponse::new(
                    "Invalid sort.",
                )))
            }
            None => SortBy::default(),
        };
        // unknown viewer gender means no gender filter
        let viewer_gender = viewer_gender.and_then(|x| x.parse::<Gender>().ok());
        let filters = MatchFilters {
            religion: non_blank(religion.as_deref()),
            caste: non_blank(caste.as_deref()),
            sub_caste: non_blank(sub_caste.as_deref()),
            mother_tongue: non_blank(mother_tongue.as_deref()),
            marital_status: non_blank(marital_status.as_deref()),
            min_age: min_age.unwrap_or(DEFAULT_MIN_AGE),
            max_age: max_age.unwrap_or(DEFAULT_MAX_AGE),
            search: non_blank(search.as_deref()),
        };

        // Begin db transaction
        let mut tx = match state.db.begin().await {
            Ok(val) => val,
            Err(err) => {
                return ProfileListResponses::ServiceUnavailable(Json(
                    ServiceUnavailableResponse::new(
                        "route.profile",
                        "get_profile_list_api",
                        "begin transaction",
                        &err.to_string(),
                    ),
                ));
            }
        };

        let candidates = match get_all_profile(
            &mut tx,
            gender.as_ref().map(Gender::as_str),
            exclude_user_id.as_ref(),
        )
        .await
        {
            Ok(val) => val,
            Err(err) => {
                return ProfileListResponses::ServiceUnavailable(Json(
                    ServiceUnavailableResponse::new(
                        "route.profile",
                        "get_profile_list_api",
                        "get all profile",
                        &err.to_string(),
                    ),
                ))
            }
        };
        tracing::debug!(
            "profile list gender={:?} exclude_user_id={:?} candidates={}",
            gender,
            exclude_user_id,
            candidates.len()
        );

        let profiles = filter_profiles(candidates, viewer_gender, &filters, sort_by);
        if profiles.is_empty() {
            return ProfileListResponses::NotFound(Json(NotFoundResponse::new(
                "No profiles found.",
            )));
        }
        ProfileListResponses::Ok(Json(RecordsResponse {
            records: profiles.into_iter().map(ProfileDetail::from).collect(),
        }))
    }

    #[oai(path = "/profile/", method = "post", tag = "ApiProfileTags::Profile")]
    async fn save_profile_api(
        &self,
        json: Json<ProfileSaveRequest>,
        state: Data<&Arc<AppState>>,
        auth: BearerAuthorization,
    ) -> ProfileSaveResponses {
        if is_blank(&json.name) || is_blank(&json.gender) {
            return ProfileSaveResponses::BadRequest(Json(BadRequestResponse::new(
                "Unable to create profile. Data is incomplete.",
            )));
        }
        let Ok(gender) = json.gender.parse::<Gender>() else {
            return ProfileSaveResponses::BadRequest(Json(BadRequestResponse::new(
                "Invalid gender.",
            )));
        };
        let Ok(dob) = parse_date_opt(json.dob.as_deref()) else {
            return ProfileSaveResponses::BadRequest(Json(BadRequestResponse::new(
                "Invalid date of birth.",
            )));
        };

        // Begin db transaction
        let mut tx = match state.db.begin().await {
            Ok(val) => val,
            Err(err) => {
                return ProfileSaveResponses::ServiceUnavailable(Json(
                    ServiceUnavailableResponse::new(
                        "route.profile",
                        "save_profile_api",
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
                return ProfileSaveResponses::ServiceUnavailable(Json(
                    ServiceUnavailableResponse::new(
                        "route.profile",
                        "save_profile_api",
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
                return ProfileSaveResponses::ServiceUnavailable(Json(
                    ServiceUnavailableResponse::new(
                        "route.profile",
                        "save_profile_api",
                        "get user from token",
                        &err.to_string(),
                    ),
                ))
            }
        };
        let Some(user) = user else {
            return ProfileSaveResponses::Unauthorized(Json(UnauthorizedResponse::default()));
        };

        let email = non_blank(json.email.as_deref()).unwrap_or(user.email.clone());
        let existing = match get_profile_by_user_or_email(&mut tx, &user.id, Some(&email)).await {
            Ok(val) => val,
            Err(err) => {
                return ProfileSaveResponses::ServiceUnavailable(Json(
                    ServiceUnavailableResponse::new(
                        "route.profile",
                        "save_profile_api",
                        "get existing profile",
                        &err.to_string(),
                    ),
                ))
            }
        };
        if let Some(existing) = &existing {
            if existing.user_id != user.id {
                return ProfileSaveResponses::BadRequest(Json(BadRequestResponse::new(
                    "Email is already used by another profile.",
                )));
            }
        }

        let now = Local::now().fixed_offset();
        let age = match (json.age, dob) {
            (Some(age), _) => age,
            (None, Some(dob)) => age_on(dob, now.date_naive()),
            (None, None) => 0,
        };
        let profile = Profile {
            id: existing.as_ref().map(|x| x.id).unwrap_or_else(Uuid::now_v7),
            user_id: user.id,
            email: Some(email),
            name: json.name.trim().to_string(),
            age,
            dob,
            birth_time: non_blank(json.birth_time.as_deref()),
            gender: gender.as_str().to_string(),
            religion: non_blank(json.religion.as_deref()),
            caste: non_blank(json.caste.as_deref()),
            sub_caste: non_blank(json.sub_caste.as_deref()),
            mother_tongue: non_blank(json.mother_tongue.as_deref()),
            profession: non_blank(json.profession.as_deref()),
            location: non_blank(json.location.as_deref()),
            education: non_blank(json.education.as_deref()),
            height: non_blank(json.height.as_deref()),
            income: non_blank(json.income.as_deref()),
            marital_status: non_blank(json.marital_status.as_deref()),
            bio: non_blank(json.bio.as_deref()),
            hobbies: json.hobbies.clone().unwrap_or_default(),
            image_url: non_blank(json.image_url.as_deref()),
            gallery: json.gallery.clone().unwrap_or_default(),
            traits: non_blank(json.traits.as_deref()),
            partner_pref: non_blank(json.partner_pref.as_deref()),
            father_occupation: non_blank(json.father_occupation.as_deref()),
            mother_occupation: non_blank(json.mother_occupation.as_deref()),
            siblings: json.siblings,
            family_location: non_blank(json.family_location.as_deref()),
            family_status: non_blank(json.family_status.as_deref()),
            // only set outside the api
            verified: existing.as_ref().map(|x| x.verified).unwrap_or(false),
            created_date: existing
                .as_ref()
                .map(|x| x.created_date)
                .unwrap_or(Some(now)),
            updated_date: Some(now),
        };

        let action_type = match &existing {
            Some(_) => match update_profile(&mut tx, &profile).await {
                Ok(_) => "updated",
                Err(err) => {
                    return ProfileSaveResponses::ServiceUnavailable(Json(
                        ServiceUnavailableResponse::new(
                            "route.profile",
                            "save_profile_api",
                            "update profile",
                            &err.to_string(),
                        ),
                    ))
                }
            },
            None => match create_profile(&mut tx, &profile).await {
                Ok(_) => "created",
                Err(err) if is_unique_violation(&err) => {
                    return ProfileSaveResponses::BadRequest(Json(BadRequestResponse::new(
                        "Profile already exists.",
                    )))
                }
                Err(err) => {
                    return ProfileSaveResponses::ServiceUnavailable(Json(
                        ServiceUnavailableResponse::new(
                            "route.profile",
                            "save_profile_api",
                            "create profile",
                            &err.to_string(),
                        ),
                    ))
                }
            },
        };

        if let Err(err) = tx.commit().await {
            return ProfileSaveResponses::ServiceUnavailable(Json(
                ServiceUnavailableResponse::new(
                    "route.profile",
                    "save_profile_api",
                    "commit transaction",
                    &err.to_string(),
                ),
            ));
        }
        tracing::info!("profile {} {} for user {}", profile.id, action_type, user.id);

        ProfileSaveResponses::Ok(Json(MessageResponse::new(&format!(
            "Profile {} successfully.",
            action_type
        ))))
    }
}
