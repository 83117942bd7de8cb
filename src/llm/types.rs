//! Wire types for the Bedrock Messages API.
//!
//! `AnalysisRequest` is the body we send; `ResponseEnvelope` is the subset
//! of the reply we read back. Field names match the JSON exactly.

use serde::{Deserialize, Serialize};

use super::prompts::{ANALYZE_SCREEN_PROMPT, ANTHROPIC_VERSION, MAX_TOKENS};

/// One screen-analysis request. Built once per cycle, never mutated.
#[derive(Debug, Clone, Serialize)]
pub struct AnalysisRequest {
    anthropic_version: String,
    max_tokens: u32,
    messages: Vec<Message>,
}

#[derive(Debug, Clone, Serialize)]
struct Message {
    role: String,
    content: Vec<ContentBlock>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
enum ContentBlock {
    Text { text: String },
    Image { source: ImageSource },
}

#[derive(Debug, Clone, Serialize)]
struct ImageSource {
    #[serde(rename = "type")]
    source_type: String,
    media_type: String,
    data: String,
}

impl AnalysisRequest {
    /// Request asking the model to look at a base64-encoded PNG screenshot.
    pub fn for_screenshot(png_base64: String) -> Self {
        Self {
            anthropic_version: ANTHROPIC_VERSION.to_string(),
            max_tokens: MAX_TOKENS,
            messages: vec![Message {
                role: "user".to_string(),
                content: vec![
                    ContentBlock::Text {
                        text: ANALYZE_SCREEN_PROMPT.to_string(),
                    },
                    ContentBlock::Image {
                        source: ImageSource {
                            source_type: "base64".to_string(),
                            media_type: "image/png".to_string(),
                            data: png_base64,
                        },
                    },
                ],
            }],
        }
    }

    /// Serialized JSON body.
    pub fn to_body(&self) -> Result<Vec<u8>, serde_json::Error> {
        serde_json::to_vec(self)
    }
}

/// The part of the model envelope we care about.
#[derive(Debug, Deserialize)]
pub struct ResponseEnvelope {
    #[serde(default)]
    pub content: Vec<ResponseContent>,
}

#[derive(Debug, Deserialize)]
pub struct ResponseContent {
    #[serde(default)]
    pub text: Option<String>,
}

/// Pull `content[0].text` out of a response body, trimmed.
pub fn extract_text(body: &str) -> Result<String, ParseError> {
    let envelope: ResponseEnvelope =
        serde_json::from_str(body).map_err(|e| ParseError::InvalidJson(e.to_string()))?;

    let first = envelope.content.into_iter().next().ok_or(ParseError::MissingContent)?;
    let text = first.text.ok_or(ParseError::MissingText)?;

    Ok(text.trim().to_string())
}

#[derive(Debug, thiserror::Error)]
pub enum ParseError {
    #[error("Response is not valid JSON: {0}")]
    InvalidJson(String),

    #[error("Response has no content blocks")]
    MissingContent,

    #[error("First content block has no text")]
    MissingText,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::Value;

    #[test]
    fn request_matches_bedrock_body_shape() {
        let request = AnalysisRequest::for_screenshot("aGVsbG8=".to_string());
        let json: Value = serde_json::from_slice(&request.to_body().unwrap()).unwrap();

        assert_eq!(json["anthropic_version"], "bedrock-2023-05-31");
        assert_eq!(json["max_tokens"], 500);
        assert_eq!(json["messages"][0]["role"], "user");

        let content = &json["messages"][0]["content"];
        assert_eq!(content[0]["type"], "text");
        assert_eq!(content[0]["text"], ANALYZE_SCREEN_PROMPT);
        assert_eq!(content[1]["type"], "image");
        assert_eq!(content[1]["source"]["type"], "base64");
        assert_eq!(content[1]["source"]["media_type"], "image/png");
        assert_eq!(content[1]["source"]["data"], "aGVsbG8=");
    }

    #[test]
    fn extracts_first_text_block() {
        let body = r#"{"id":"msg_1","content":[{"type":"text","text":"  You are editing Rust.\n"},{"type":"text","text":"second"}],"stop_reason":"end_turn"}"#;
        assert_eq!(extract_text(body).unwrap(), "You are editing Rust.");
    }

    #[test]
    fn empty_content_is_a_parse_error() {
        assert!(matches!(
            extract_text(r#"{"content":[]}"#),
            Err(ParseError::MissingContent)
        ));
        assert!(matches!(
            extract_text(r#"{"message":"throttled"}"#),
            Err(ParseError::MissingContent)
        ));
    }

    #[test]
    fn block_without_text_is_a_parse_error() {
        assert!(matches!(
            extract_text(r#"{"content":[{"type":"tool_use","id":"x"}]}"#),
            Err(ParseError::MissingText)
        ));
    }

    #[test]
    fn garbage_is_invalid_json() {
        assert!(matches!(
            extract_text("<html>502</html>"),
            Err(ParseError::InvalidJson(_))
        ));
    }
}
