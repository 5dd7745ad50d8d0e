use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use serde_json::json;

use super::gemini::{Content, GeminiClient, GenerateContentRequest, GenerationConfig, GroundingChunk};
use crate::model::{
    ai_message::{AiMessage, SENDER_AI},
    profile::Profile,
};

pub const FALLBACK_REPLY: &str = "Sorry, I encountered an error. Please try again.";
pub const BIO_EMPTY_REPLY: &str = "Could not generate bio. Please try again.";
pub const BIO_ERROR_REPLY: &str = "An error occurred while generating the bio.";

const BIO_SYSTEM_INSTRUCTION: &str = "You are an expert profile writer for a matrimony website. \
Your goal is to write a warm, engaging, and professional bio based on the user's details. \
Keep it between 40-60 words. Emphasize values, career, and what they are looking for.";

/// What the assistant sees of each candidate profile.
#[derive(Clone, Debug, Serialize, PartialEq)]
pub struct CandidateSnapshot {
    pub id: String,
    pub name: String,
    pub age: i32,
    pub religion: Option<String>,
    pub caste: Option<String>,
    pub sub_caste: Option<String>,
    pub profession: Option<String>,
    pub location: Option<String>,
    pub bio: Option<String>,
}

impl From<&Profile> for CandidateSnapshot {
    fn from(profile: &Profile) -> Self {
        Self {
            id: profile.id.to_string(),
            name: profile.name.clone(),
            age: profile.age,
            religion: profile.religion.clone(),
            caste: profile.caste.clone(),
            sub_caste: profile.sub_caste.clone(),
            profession: profile.profession.clone(),
            location: profile.location.clone(),
            bio: profile.bio.clone(),
        }
    }
}

/// Structured payload the model is constrained to return.
#[derive(Clone, Debug, Deserialize, PartialEq)]
pub struct MatchmakerOutput {
    pub reply: String,
    #[serde(default, rename = "recommendedIds")]
    pub recommended_ids: Vec<String>,
    #[serde(default)]
    pub reason: Option<String>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct MatchmakerReply {
    pub text: String,
    pub recommended_profile_ids: Vec<String>,
    pub grounding_chunks: Vec<GroundingChunk>,
}

impl MatchmakerReply {
    pub fn fallback() -> Self {
        Self {
            text: FALLBACK_REPLY.to_string(),
            recommended_profile_ids: vec![],
            grounding_chunks: vec![],
        }
    }
}

pub fn response_schema() -> serde_json::Value {
    json!({
        "type": "OBJECT",
        "properties": {
            "reply": {"type": "STRING"},
            "recommendedIds": {"type": "ARRAY", "items": {"type": "STRING"}},
            "reason": {"type": "STRING"}
        },
        "required": ["reply", "recommendedIds"]
    })
}

pub fn build_system_instruction(candidates: &[CandidateSnapshot]) -> serde_json::Result<String> {
    let profiles = serde_json::to_string(candidates)?;
    Ok(format!(
        "You are 'SoulmateBot', a helpful and empathetic matchmaking assistant on SoulmateAI.\n\
You have access to a database of profiles: {profiles}.\n\n\
Your tasks:\n\
1. Answer user queries about dating, relationships, cultural wedding trends, or using the app.\n\
2. Recommend profiles based on user requirements (e.g. \"Find me a doctor in Mumbai\").\n\n\
Always answer with a JSON object: put your message to the user in \"reply\", the ids of \
recommended profiles (only ids from the database above) in \"recommendedIds\", and a brief \
explanation of the recommendations in \"reason\". If the user is just chatting, leave \
\"recommendedIds\" empty. Be polite, respectful, and encouraging."
    ))
}

/// Most recent `limit` log entries as conversation turns, oldest first.
pub fn history_contents(history: &[AiMessage], limit: usize) -> Vec<Content> {
    let start = history.len().saturating_sub(limit);
    history[start..]
        .iter()
        .map(|x| {
            let role = if x.sender == SENDER_AI { "model" } else { "user" };
            Content::text(Some(role), &x.text)
        })
        .collect()
}

pub fn build_ask_request(
    system_instruction: &str,
    history: Vec<Content>,
    message: &str,
) -> GenerateContentRequest {
    let mut contents = history;
    contents.push(Content::text(Some("user"), message));
    GenerateContentRequest {
        system_instruction: Some(Content::text(None, system_instruction)),
        contents,
        generation_config: Some(GenerationConfig {
            temperature: Some(0.7),
            max_output_tokens: None,
            response_mime_type: Some("application/json".to_string()),
            response_schema: Some(response_schema()),
        }),
    }
}

/// Interpret model output. A payload that does not match the contract is
/// shown verbatim with no recommendations; ids outside `candidate_ids` are
/// dropped.
pub fn parse_matchmaker_output(raw: &str, candidate_ids: &HashSet<String>) -> MatchmakerReply {
    let output: MatchmakerOutput = match serde_json::from_str(raw.trim()) {
        Ok(val) => val,
        Err(err) => {
            tracing::warn!("matchmaker output does not match schema: {err}");
            return MatchmakerReply {
                text: raw.trim().to_string(),
                recommended_profile_ids: vec![],
                grounding_chunks: vec![],
            };
        }
    };

    let mut seen: HashSet<&str> = HashSet::new();
    let recommended_profile_ids: Vec<String> = output
        .recommended_ids
        .iter()
        .map(|x| x.trim())
        .filter(|x| candidate_ids.contains(*x) && seen.insert(*x))
        .map(str::to_string)
        .collect();

    let mut text = output.reply.trim().to_string();
    if let Some(reason) = output.reason.as_deref().map(str::trim) {
        if !reason.is_empty() {
            text.push_str("\n\n");
            text.push_str(reason);
        }
    }
    MatchmakerReply {
        text,
        recommended_profile_ids,
        grounding_chunks: vec![],
    }
}

/// Ask the assistant. Never fails: any provider error degrades to
/// [`FALLBACK_REPLY`].
pub async fn ask(
    client: &GeminiClient,
    candidates: &[Profile],
    history: &[AiMessage],
    history_limit: usize,
    message: &str,
) -> MatchmakerReply {
    let snapshots: Vec<CandidateSnapshot> = candidates.iter().map(CandidateSnapshot::from).collect();
    let system_instruction = match build_system_instruction(&snapshots) {
        Ok(val) => val,
        Err(err) => {
            tracing::error!("serialize matchmaker candidates: {err}");
            return MatchmakerReply::fallback();
        }
    };
    let request = build_ask_request(
        &system_instruction,
        history_contents(history, history_limit),
        message,
    );
    let generation = match client.generate(&request).await {
        Ok(val) => val,
        Err(err) => {
            tracing::error!("matchmaker request failed: {err}");
            return MatchmakerReply::fallback();
        }
    };

    let candidate_ids: HashSet<String> = snapshots.into_iter().map(|x| x.id).collect();
    let mut reply = parse_matchmaker_output(&generation.text, &candidate_ids);
    reply.grounding_chunks = generation.grounding_chunks;
    reply
}

#[derive(Clone, Debug, Default)]
pub struct BioDetails {
    pub name: String,
    pub profession: Option<String>,
    pub hobbies: Vec<String>,
    pub traits: Option<String>,
    pub partner_pref: Option<String>,
}

pub fn build_bio_request(details: &BioDetails) -> GenerateContentRequest {
    let prompt = format!(
        "Write a matrimony profile bio for:\n\
Name: {}\n\
Profession: {}\n\
Hobbies: {}\n\
Personality Traits: {}\n\
Looking for: {}\n",
        details.name,
        details.profession.as_deref().unwrap_or(""),
        details.hobbies.join(", "),
        details.traits.as_deref().unwrap_or("Friendly, Ambitious"),
        details
            .partner_pref
            .as_deref()
            .unwrap_or("A supportive partner"),
    );
    GenerateContentRequest {
        system_instruction: Some(Content::text(None, BIO_SYSTEM_INSTRUCTION)),
        contents: vec![Content::text(Some("user"), &prompt)],
        generation_config: Some(GenerationConfig {
            temperature: Some(0.7),
            max_output_tokens: Some(100),
            response_mime_type: None,
            response_schema: None,
        }),
    }
}

pub async fn generate_bio(client: &GeminiClient, details: &BioDetails) -> String {
    match client.generate(&build_bio_request(details)).await {
        Ok(val) => val.text.trim().to_string(),
        Err(super::AiError::EmptyResponse) => BIO_EMPTY_REPLY.to_string(),
        Err(err) => {
            tracing::error!("bio generation failed: {err}");
            BIO_ERROR_REPLY.to_string()
        }
    }
}

#[cfg(test)]
mod tests {
    use chrono::Local;
    use uuid::Uuid;

    use super::*;
    use crate::model::ai_message::SENDER_USER;

    fn ids(values: &[&str]) -> HashSet<String> {
        values.iter().map(|x| x.to_string()).collect()
    }

    fn message(sender: &str, text: &str) -> AiMessage {
        AiMessage {
            id: Uuid::now_v7(),
            user_id: Uuid::now_v7(),
            sender: sender.to_string(),
            text: text.to_string(),
            related_profile_ids: vec![],
            created_date: Local::now().fixed_offset(),
        }
    }

    #[test]
    fn test_parse_output_with_recommendations() {
        let raw = r#"{"reply": "Here are two doctors.", "recommendedIds": ["a", "b", "a", "zzz"], "reason": "Both are doctors in Mumbai."}"#;
        let reply = parse_matchmaker_output(raw, &ids(&["a", "b", "c"]));
        assert_eq!(reply.recommended_profile_ids, vec!["a", "b"]);
        assert_eq!(
            reply.text,
            "Here are two doctors.\n\nBoth are doctors in Mumbai."
        );
    }

    #[test]
    fn test_parse_output_chat_only() {
        let raw = r#"{"reply": "Red and gold are popular this year.", "recommendedIds": []}"#;
        let reply = parse_matchmaker_output(raw, &ids(&["a"]));
        assert!(reply.recommended_profile_ids.is_empty());
        assert_eq!(reply.text, "Red and gold are popular this year.");
    }

    #[test]
    fn test_parse_output_failure_is_swallowed() {
        let raw = "I think profile a would suit you.";
        let reply = parse_matchmaker_output(raw, &ids(&["a"]));
        assert!(reply.recommended_profile_ids.is_empty());
        assert_eq!(reply.text, raw);
    }

    #[test]
    fn test_history_is_bounded_and_mapped() {
        let history: Vec<AiMessage> = (0..15)
            .map(|idx| {
                let sender = if idx % 2 == 0 { SENDER_USER } else { SENDER_AI };
                message(sender, &format!("message {idx}"))
            })
            .collect();
        let contents = history_contents(&history, 10);
        assert_eq!(contents.len(), 10);
        assert_eq!(contents[0], Content::text(Some("model"), "message 5"));
        assert_eq!(contents[9], Content::text(Some("user"), "message 14"));
        assert_eq!(history_contents(&history[..3], 10).len(), 3);
    }

    #[test]
    fn test_build_ask_request() {
        let snapshots = vec![CandidateSnapshot {
            id: "p1".to_string(),
            name: "Asha".to_string(),
            age: 26,
            religion: Some("Hindu".to_string()),
            caste: None,
            sub_caste: None,
            profession: Some("Doctor".to_string()),
            location: Some("Mumbai".to_string()),
            bio: None,
        }];
        let system_instruction = build_system_instruction(&snapshots).unwrap();
        assert!(system_instruction.contains(r#""id":"p1""#));
        assert!(system_instruction.contains(r#""profession":"Doctor""#));

        let request = build_ask_request(
            &system_instruction,
            vec![Content::text(Some("model"), "hi")],
            "find me a doctor",
        );
        assert_eq!(request.contents.len(), 2);
        assert_eq!(
            request.contents[1],
            Content::text(Some("user"), "find me a doctor")
        );
        let value = serde_json::to_value(&request).unwrap();
        assert_eq!(
            value["generationConfig"]["responseMimeType"],
            "application/json"
        );
        assert_eq!(
            value["generationConfig"]["responseSchema"]["required"][0],
            "reply"
        );
    }

    #[test]
    fn test_build_bio_request_defaults() {
        let request = build_bio_request(&BioDetails {
            name: "Ravi".to_string(),
            profession: Some("Architect".to_string()),
            hobbies: vec!["Cricket".to_string(), "Music".to_string()],
            traits: None,
            partner_pref: None,
        });
        let prompt = request.contents[0].parts[0].text.clone().unwrap();
        assert!(prompt.contains("Name: Ravi"));
        assert!(prompt.contains("Hobbies: Cricket, Music"));
        assert!(prompt.contains("Personality Traits: Friendly, Ambitious"));
        assert!(prompt.contains("Looking for: A supportive partner"));
        assert_eq!(
            request.generation_config.unwrap().max_output_tokens,
            Some(100)
        );
    }
}
