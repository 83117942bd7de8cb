//! What turns an encoded screenshot into text: the real model or the mock.

use crate::imaging::EncodedImage;
use crate::llm::{extract_text, AnalysisRequest, MockAnalyzer, ModelClient};

use super::AnalysisError;

pub enum Analyzer {
    Bedrock(ModelClient),
    Mock(MockAnalyzer),
}

impl Analyzer {
    pub fn name(&self) -> &'static str {
        match self {
            Analyzer::Bedrock(_) => "bedrock",
            Analyzer::Mock(_) => "mock",
        }
    }

    /// Build the request, call the model, pull the text out of the envelope.
    pub async fn analyze(&self, upload: &EncodedImage) -> Result<String, AnalysisError> {
        match self {
            Analyzer::Bedrock(client) => {
                let request = AnalysisRequest::for_screenshot(upload.to_base64());
                let body = request
                    .to_body()
                    .map_err(|e| AnalysisError::Encoding(e.to_string()))?;

                log::info!(
                    "[LLM] Sending {}x{} screenshot ({} bytes of JSON)",
                    upload.width,
                    upload.height,
                    body.len()
                );

                let response = client
                    .invoke_model(body)
                    .await
                    .map_err(|e| AnalysisError::Network(e.to_string()))?;

                extract_text(&response.body_text)
                    .map_err(|e| AnalysisError::ResponseParse(e.to_string()))
            }
            Analyzer::Mock(mock) => {
                log::info!("[LLM] Mock mode — simulating a {:?} round trip", mock.delay);
                tokio::time::sleep(mock.delay).await;
                Ok(mock.respond(upload.source_width, upload.source_height))
            }
        }
    }
}
