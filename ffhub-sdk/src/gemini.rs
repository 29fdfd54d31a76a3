//! Gemini API client for match strategy tips and payment screenshot checks.
//!
//! Both helpers are advisory. When the API is unreachable or answers with
//! something unusable they return canned text rather than an error, so the
//! registration flow never blocks on the model.

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

pub const DEFAULT_API_BASE: &str = "https://generativelanguage.googleapis.com";
pub const DEFAULT_TEXT_MODEL: &str = "gemini-3-flash-preview";
pub const DEFAULT_IMAGE_MODEL: &str = "gemini-2.5-flash-image";
/// Per-request limit for model calls.
const MODEL_TIMEOUT: std::time::Duration = std::time::Duration::from_secs(60);

/// Shown when strategy generation fails.
pub const FALLBACK_STRATEGY: &str = "• Focus on high-ground advantage.\n\
• Coordinate rotations with your team.\n\
• Keep utility items like Gloo Walls ready.";

/// A request part: plain text or inline binary data.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Part {
    Text(String),
    InlineData(InlineData),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InlineData {
    pub mime_type: String,
    pub data: String,
}

#[derive(Serialize)]
struct Content<'a> {
    parts: &'a [Part],
}

#[derive(Serialize)]
struct GenerateRequest<'a> {
    contents: [Content<'a>; 1],
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<ResponsePart>,
}

#[derive(Debug, Deserialize)]
struct ResponsePart {
    text: Option<String>,
}

/// Model verdict on a payment screenshot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentVerdict {
    pub is_valid: bool,
    pub message: String,
}

impl PaymentVerdict {
    fn manual(message: &str) -> Self {
        Self { is_valid: true, message: message.to_string() }
    }
}

pub struct GeminiClient {
    api_key: String,
    model: String,
    image_model: String,
    api_base: String,
    http: reqwest::Client,
}

impl GeminiClient {
    pub fn new(api_key: String) -> Self {
        Self {
            api_key,
            model: DEFAULT_TEXT_MODEL.to_string(),
            image_model: DEFAULT_IMAGE_MODEL.to_string(),
            api_base: DEFAULT_API_BASE.to_string(),
            http: crate::http_client(MODEL_TIMEOUT),
        }
    }

    pub fn with_model(mut self, model: &str) -> Self {
        self.model = model.to_string();
        self
    }

    pub fn with_image_model(mut self, model: &str) -> Self {
        self.image_model = model.to_string();
        self
    }

    pub fn with_api_base(mut self, base: &str) -> Self {
        self.api_base = base.trim_end_matches('/').to_string();
        self
    }

    /// Single-turn generation; returns the concatenated text of the first candidate.
    pub async fn generate(&self, model: &str, parts: &[Part]) -> Result<String> {
        let url = format!("{}/v1beta/models/{model}:generateContent", self.api_base);
        let body = GenerateRequest { contents: [Content { parts }] };

        let resp = self
            .http
            .post(&url)
            .header("x-goog-api-key", &self.api_key)
            .json(&body)
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            let message = resp.text().await.unwrap_or_default();
            return Err(Error::Api { status: status.as_u16(), message });
        }

        let parsed: GenerateResponse = resp.json().await?;
        let text = parsed
            .candidates
            .into_iter()
            .next()
            .and_then(|c| c.content)
            .map(|c| {
                c.parts
                    .into_iter()
                    .filter_map(|p| p.text)
                    .collect::<Vec<_>>()
                    .join("")
            })
            .unwrap_or_default();
        if text.trim().is_empty() {
            return Err(Error::EmptyResponse);
        }
        Ok(text)
    }

    pub async fn try_match_strategy(&self, map: &str, mode: &str) -> Result<String> {
        let prompt = strategy_prompt(map, mode);
        self.generate(&self.model, &[Part::Text(prompt)]).await
    }

    /// Three short tips for `map` in `mode`, or [`FALLBACK_STRATEGY`].
    pub async fn match_strategy(&self, map: &str, mode: &str) -> String {
        match self.try_match_strategy(map, mode).await {
            Ok(text) => text,
            Err(e) => {
                tracing::error!(error = %e, map, mode, "AI strategy error");
                FALLBACK_STRATEGY.to_string()
            }
        }
    }

    /// Ask the image model whether a screenshot shows a successful UPI payment
    /// of exactly `amount` rupees. `image` may carry a `data:` URL prefix.
    pub async fn verify_payment_screenshot(&self, image: &str, amount: u32) -> PaymentVerdict {
        let parts = [
            Part::InlineData(InlineData {
                mime_type: "image/jpeg".to_string(),
                data: strip_data_url(image).to_string(),
            }),
            Part::Text(format!(
                "Analyze this UPI payment screenshot. Verify if it shows a successful transaction of exactly ₹{amount}. \
Return a JSON object with \"is_valid\" (boolean) and \"message\" (string explanation). \
If it's not a payment screenshot, say so."
            )),
        ];

        let busy = || {
            PaymentVerdict::manual("AI verification service busy. Please proceed with manual verification.")
        };
        match self.generate(&self.image_model, &parts).await {
            Ok(reply) => match parse_verdict(&reply) {
                None => PaymentVerdict::manual("Manual verification required by admin."),
                Some(Ok(verdict)) => verdict,
                Some(Err(e)) => {
                    tracing::error!(error = %e, "Unreadable AI verdict");
                    busy()
                }
            },
            Err(e) => {
                tracing::error!(error = %e, "AI verification error");
                busy()
            }
        }
    }
}

fn strategy_prompt(map: &str, mode: &str) -> String {
    format!(
        "You are an expert Free Fire esports coach. Provide 3 short, punchy, professional pro-tips \
for a tournament match on map: {map} in {mode} mode. Focus on drop locations, rotation strategies, \
and late-game survival. Format as bullet points."
    )
}

fn strip_data_url(image: &str) -> &str {
    match image.split_once(',') {
        Some((prefix, data)) if prefix.starts_with("data:") => data,
        _ => image,
    }
}

/// Pull the outermost `{...}` out of a reply that may be wrapped in prose or
/// a markdown fence. `None` when the reply has no object at all.
fn parse_verdict(reply: &str) -> Option<serde_json::Result<PaymentVerdict>> {
    let start = reply.find('{')?;
    let end = reply.rfind('}')?;
    if end < start {
        return None;
    }
    Some(serde_json::from_str(&reply[start..=end]))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn verdict_from_fenced_reply() {
        let reply = "Here you go:\n```json\n{\"is_valid\": false, \"message\": \"Amount is ₹50\"}\n```";
        let v = parse_verdict(reply).unwrap().unwrap();
        assert!(!v.is_valid);
        assert_eq!(v.message, "Amount is ₹50");
    }

    #[test]
    fn verdict_absent_or_malformed() {
        assert!(parse_verdict("looks fine to me").is_none());
        assert!(parse_verdict("} backwards {").is_none());
        assert!(parse_verdict("{\"is_valid\": \"yes\"}").unwrap().is_err());
        assert!(parse_verdict("{is_valid: true}").unwrap().is_err());
    }

    #[test]
    fn data_url_prefix_is_stripped() {
        assert_eq!(strip_data_url("data:image/jpeg;base64,AAAA"), "AAAA");
        assert_eq!(strip_data_url("AAAA"), "AAAA");
    }

    #[test]
    fn request_parts_use_api_field_names() {
        let parts = [
            Part::InlineData(InlineData { mime_type: "image/jpeg".into(), data: "AA".into() }),
            Part::Text("hi".into()),
        ];
        let body = serde_json::to_value(GenerateRequest {
            contents: [Content { parts: &parts }],
        })
        .unwrap();
        assert_eq!(body["contents"][0]["parts"][0]["inlineData"]["mimeType"], "image/jpeg");
        assert_eq!(body["contents"][0]["parts"][1]["text"], "hi");
    }

    #[test]
    fn prompt_mentions_map_and_mode() {
        let p = strategy_prompt("Bermuda", "Squad");
        assert!(p.contains("map: Bermuda in Squad mode"));
    }
}
