use std::time::Duration;

use async_trait::async_trait;
use once_cell::sync::Lazy;
use reqwest::{Client, ClientBuilder, StatusCode};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::error::{AppError, Result};
use crate::quote::Language;

const GEMINI_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta/models";

pub const SYSTEM_INSTRUCTION: &str = "You are a high-precision API that returns JSON data about famous Latin quotations. \
Your only output must be a single valid JSON object that strictly conforms to the provided schema. \
Do not include any conversational text, explanations, apologies or markdown formatting such as ```json.";

// Create a static client to reuse connections
static CLIENT: Lazy<Client> = Lazy::new(|| {
    ClientBuilder::new()
        .connect_timeout(Duration::from_secs(5))
        .pool_max_idle_per_host(10)
        .build()
        .expect("Failed to build HTTP client")
});

/// A generative model that answers a prompt with raw text.
#[async_trait]
pub trait QuoteModel: Send + Sync {
    async fn generate(&self, api_key: &str, prompt: &str) -> Result<String>;
}

pub struct GeminiClient {
    model: String,
    base_url: String,
}

impl GeminiClient {
    pub fn new(model: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            base_url: GEMINI_BASE_URL.to_string(),
        }
    }

    /// Points the client at another deployment of the same API.
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    fn endpoint(&self) -> String {
        format!("{}/{}:generateContent", self.base_url.trim_end_matches('/'), self.model)
    }
}

#[derive(Serialize)]
struct Part {
    text: String,
}

#[derive(Serialize)]
struct Content {
    #[serde(skip_serializing_if = "Option::is_none")]
    role: Option<String>,
    parts: Vec<Part>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    response_mime_type: String,
    response_schema: Value,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentRequest {
    contents: Vec<Content>,
    system_instruction: Content,
    generation_config: GenerationConfig,
}

#[derive(Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
    error: Option<ApiError>,
}

#[derive(Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<CandidatePart>,
}

#[derive(Deserialize)]
struct CandidatePart {
    text: Option<String>,
}

#[derive(Deserialize)]
struct ApiError {
    message: String,
}

#[async_trait]
impl QuoteModel for GeminiClient {
    async fn generate(&self, api_key: &str, prompt: &str) -> Result<String> {
        let body = GenerateContentRequest {
            contents: vec![Content {
                role: Some("user".into()),
                parts: vec![Part { text: prompt.into() }],
            }],
            system_instruction: Content {
                role: None,
                parts: vec![Part { text: SYSTEM_INSTRUCTION.into() }],
            },
            generation_config: GenerationConfig {
                response_mime_type: "application/json".into(),
                response_schema: quote_schema(),
            },
        };

        tracing::debug!(model = %self.model, "Calling Gemini generateContent");
        let res = CLIENT
            .post(self.endpoint())
            .header("x-goog-api-key", api_key)
            .json(&body)
            .send()
            .await?;

        let status = res.status();
        let body = res.text().await?;
        read_reply(status, &body)
    }
}

/// Extracts the generated text, checking the status before trusting the body.
fn read_reply(status: StatusCode, body: &str) -> Result<String> {
    let reply = serde_json::from_str::<GenerateContentResponse>(body);

    if !status.is_success() {
        let message = match reply.ok().and_then(|reply| reply.error) {
            Some(err) => format!("Gemini API error ({}): {}", status, err.message),
            None => format!("Gemini API returned status {}", status),
        };
        return Err(AppError::LlmError(message));
    }

    let reply = reply.map_err(|e| AppError::LlmError(format!("Unreadable Gemini reply: {}", e)))?;
    if let Some(err) = reply.error {
        return Err(AppError::LlmError(format!("Gemini API error ({}): {}", status, err.message)));
    }
    Ok(candidate_text(reply.candidates))
}

/// Concatenates the text parts of the first candidate. No candidate yields an empty string.
fn candidate_text(candidates: Vec<Candidate>) -> String {
    candidates
        .into_iter()
        .next()
        .and_then(|candidate| candidate.content)
        .map(|content| {
            content
                .parts
                .into_iter()
                .filter_map(|part| part.text)
                .collect::<String>()
        })
        .unwrap_or_default()
}

pub fn build_prompt<S: AsRef<str>>(existing_latin: &[S]) -> String {
    let known = existing_latin
        .iter()
        .map(AsRef::as_ref)
        .collect::<Vec<_>>()
        .join("; ");

    let mut result = String::with_capacity(known.len() + 800);
    result.push_str("Generate a JSON object for a new, famous Latin quotation. ");
    result.push_str("The quotation must NOT be in the following list: \"");
    result.push_str(&known);
    result.push_str("\". ");
    result.push_str(
        "The response must contain the original Latin text, the author, its source (e.g. \"Odes, I, 11\") \
and translations into Italian, English, Spanish, French and German. \
The author and source fields must also be translated into all 5 languages. \
Provide a detailed context, a practical application and a usage example for each language inside the 'details' object. \
The 'source' should be the direct citation, not a long description. \
The long description of the origin belongs in the 'context' field.",
    );
    result
}

fn language_map(description: Option<&str>, value: Value) -> Value {
    let properties: serde_json::Map<String, Value> = Language::ALL
        .iter()
        .map(|lang| (lang.code().to_string(), value.clone()))
        .collect();
    let required: Vec<&str> = Language::ALL.iter().map(|lang| lang.code()).collect();

    let mut schema = json!({
        "type": "OBJECT",
        "properties": properties,
        "required": required,
    });
    if let Some(description) = description {
        schema["description"] = json!(description);
    }
    schema
}

/// Response schema handed to the model alongside the prompt.
pub fn quote_schema() -> Value {
    let string = json!({ "type": "STRING" });
    let details = json!({
        "type": "OBJECT",
        "properties": {
            "context": { "type": "STRING" },
            "application": { "type": "STRING" },
            "example": { "type": "STRING" },
        },
        "required": ["context", "application", "example"],
    });

    json!({
        "type": "OBJECT",
        "properties": {
            "latin": { "type": "STRING", "description": "The original quotation in Latin." },
            "author": language_map(Some("The author of the quotation, translated into several languages."), string.clone()),
            "source": language_map(Some("The source of the quotation (e.g. book, speech), translated."), string.clone()),
            "translations": language_map(Some("The translation of the Latin quotation into several languages."), string),
            "details": language_map(Some("Detailed context, practical application and examples for each language."), details),
        },
        "required": ["latin", "author", "source", "translations", "details"],
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prompt_lists_known_quotes() {
        let prompt = build_prompt(&["Alea iacta est.", "Veni, vidi, vici."]);
        assert!(prompt.contains("\"Alea iacta est.; Veni, vidi, vici.\""));
        assert!(prompt.contains("all 5 languages"));
    }

    #[test]
    fn prompt_accepts_an_empty_list() {
        let prompt = build_prompt::<&str>(&[]);
        assert!(prompt.contains("following list: \"\""));
    }

    #[test]
    fn schema_requires_every_language() {
        let schema = quote_schema();
        assert_eq!(
            schema["required"],
            json!(["latin", "author", "source", "translations", "details"])
        );
        for field in ["author", "source", "translations", "details"] {
            assert_eq!(schema["properties"][field]["required"], json!(["it", "en", "es", "fr", "de"]));
        }
        assert_eq!(
            schema["properties"]["details"]["properties"]["de"]["required"],
            json!(["context", "application", "example"])
        );
    }

    #[test]
    fn candidate_text_joins_parts_of_the_first_candidate() {
        let reply: GenerateContentResponse = serde_json::from_value(json!({
            "candidates": [
                { "content": { "parts": [{ "text": "{\"latin\":" }, { "text": "\"Ave\"}" }] } },
                { "content": { "parts": [{ "text": "ignored" }] } }
            ]
        }))
        .unwrap();
        assert_eq!(candidate_text(reply.candidates), "{\"latin\":\"Ave\"}");
    }

    #[test]
    fn missing_candidates_yield_empty_text() {
        let reply: GenerateContentResponse = serde_json::from_value(json!({})).unwrap();
        assert_eq!(candidate_text(reply.candidates), "");
    }

    #[test]
    fn non_json_error_pages_report_the_status() {
        let err = read_reply(StatusCode::BAD_GATEWAY, "<html>Bad Gateway</html>").unwrap_err();
        assert!(matches!(&err, AppError::LlmError(msg) if msg == "Gemini API returned status 502 Bad Gateway"));
    }

    #[test]
    fn upstream_error_message_is_kept() {
        let body = r#"{"error":{"code":403,"message":"API key not valid."}}"#;
        let err = read_reply(StatusCode::FORBIDDEN, body).unwrap_err();
        assert!(matches!(&err, AppError::LlmError(msg) if msg.ends_with("API key not valid.")));
    }

    #[test]
    fn successful_reply_yields_candidate_text() {
        let body = r#"{"candidates":[{"content":{"parts":[{"text":"{}"}]}}]}"#;
        assert_eq!(read_reply(StatusCode::OK, body).unwrap(), "{}");
        assert!(matches!(read_reply(StatusCode::OK, "not json"), Err(AppError::LlmError(_))));
    }

    #[test]
    fn endpoint_includes_model_name() {
        let client = GeminiClient::new("gemini-2.5-flash").with_base_url("http://localhost:9000/models/");
        assert_eq!(client.endpoint(), "http://localhost:9000/models/gemini-2.5-flash:generateContent");
    }
}
