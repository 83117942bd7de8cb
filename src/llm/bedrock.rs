//! Bedrock runtime client — one authenticated `InvokeModel` call.
//!
//! The credential strategy is picked once from `AppConfig` and fixed for
//! the life of the client. Both strategies go through the same reqwest
//! transport and return the same `InvokeResponse`.

use reqwest::header::{AUTHORIZATION, CONTENT_TYPE};
use reqwest::StatusCode;
use std::time::{Duration, Instant};

use super::sigv4::{self, SigningRequest, SigningScope};
use crate::config::{AppConfig, ConfigError, StaticCredentials};

const SIGNING_SERVICE: &str = "bedrock";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(120);

/// Which credential strategy a client uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthStrategy {
    /// `Authorization: Bearer <token>`.
    BearerToken,
    /// AWS SigV4 with long-lived access keys.
    SignedRequest,
}

impl AuthStrategy {
    /// Bearer token when one is configured, signed requests otherwise.
    pub fn for_config(config: &AppConfig) -> Self {
        if config.bearer_token.is_some() {
            AuthStrategy::BearerToken
        } else {
            AuthStrategy::SignedRequest
        }
    }
}

enum Auth {
    Bearer(String),
    Signed(StaticCredentials),
}

/// Status and body of a successful call, identical for both strategies.
#[derive(Debug, Clone)]
pub struct InvokeResponse {
    pub status_code: u16,
    pub body_text: String,
}

pub struct ModelClient {
    http: reqwest::Client,
    auth: Auth,
    region: String,
    base_url: String,
    model_id: String,
}

impl ModelClient {
    pub fn new(config: &AppConfig) -> Result<Self, ConfigError> {
        let auth = match AuthStrategy::for_config(config) {
            AuthStrategy::BearerToken => {
                log::info!("[LLM] Using Bedrock API token for authentication");
                Auth::Bearer(config.bearer_token.clone().unwrap_or_default())
            }
            AuthStrategy::SignedRequest => {
                let creds = config
                    .static_credentials
                    .clone()
                    .ok_or(ConfigError::MissingCredentials)?;
                log::info!(
                    "[LLM] Using signed requests for access key {}",
                    creds.access_key_id
                );
                Auth::Signed(creds)
            }
        };

        let http = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| ConfigError::HttpClient(e.to_string()))?;

        Ok(Self {
            http,
            auth,
            region: config.region.clone(),
            base_url: config.base_url(),
            model_id: config.model_id.clone(),
        })
    }

    pub fn strategy(&self) -> AuthStrategy {
        match self.auth {
            Auth::Bearer(_) => AuthStrategy::BearerToken,
            Auth::Signed(_) => AuthStrategy::SignedRequest,
        }
    }

    pub fn model_id(&self) -> &str {
        &self.model_id
    }

    /// `{base}/model/{modelId}/invoke`, with the model ID as one encoded segment.
    pub fn invoke_url(&self) -> String {
        format!(
            "{}/model/{}/invoke",
            self.base_url,
            urlencoding::encode(&self.model_id)
        )
    }

    /// POST `body` to the model. Any status other than 200 is an error.
    pub async fn invoke_model(&self, body: Vec<u8>) -> Result<InvokeResponse, InvokeError> {
        let url = self.invoke_url();
        let start = Instant::now();

        log::info!("[LLM] Model: {}", self.model_id);
        log::debug!("[LLM] POST {} ({} bytes)", url, body.len());

        let mut request = self
            .http
            .post(&url)
            .header(CONTENT_TYPE, "application/json");

        match &self.auth {
            Auth::Bearer(token) => {
                request = request.header(AUTHORIZATION, format!("Bearer {}", token));
            }
            Auth::Signed(creds) => {
                for (name, value) in self.signed_headers(&url, &body, creds)? {
                    request = request.header(name, value);
                }
            }
        }

        let response = request
            .body(body)
            .send()
            .await
            .map_err(|e| InvokeError::Transport(e.to_string()))?;

        let status = response.status();
        let body_text = response
            .text()
            .await
            .map_err(|e| InvokeError::Transport(e.to_string()))?;

        log::info!(
            "[LLM] Bedrock returned {} in {}ms",
            status,
            start.elapsed().as_millis()
        );

        if status != StatusCode::OK {
            log::error!("[LLM] API returned {}: {}", status, body_text);
            return Err(InvokeError::Status {
                status: status.as_u16(),
                body: body_text,
            });
        }

        Ok(InvokeResponse {
            status_code: status.as_u16(),
            body_text,
        })
    }

    fn signed_headers(
        &self,
        url: &str,
        body: &[u8],
        creds: &StaticCredentials,
    ) -> Result<Vec<(&'static str, String)>, InvokeError> {
        let parsed = reqwest::Url::parse(url).map_err(|e| InvokeError::Signing(e.to_string()))?;
        let host = parsed
            .host_str()
            .ok_or_else(|| InvokeError::Signing(format!("No host in URL {}", url)))?;
        let host = match parsed.port() {
            Some(port) => format!("{}:{}", host, port),
            None => host.to_string(),
        };

        let content_sha256 = sigv4::sha256_hex(body);
        let extra = [
            ("content-type", "application/json"),
            ("x-amz-content-sha256", content_sha256.as_str()),
        ];
        let request = SigningRequest {
            method: "POST",
            host: &host,
            path: parsed.path(),
            query: parsed.query().unwrap_or(""),
            headers: &extra,
            payload: body,
        };
        let scope = SigningScope {
            region: &self.region,
            service: SIGNING_SERVICE,
        };

        let mut headers = sigv4::sign(&request, creds, &scope, chrono::Utc::now()).into_headers();
        headers.push(("x-amz-content-sha256", content_sha256));
        Ok(headers)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum InvokeError {
    #[error("HTTP request failed: {0}")]
    Transport(String),

    #[error("API call failed with status {status}: {body}")]
    Status { status: u16, body: String },

    #[error("Request signing failed: {0}")]
    Signing(String),
}
