//! LLM domain — the hosted vision model behind screen analysis.
//!
//! Public API:
//!   - bedrock.rs — `ModelClient`, bearer-token or SigV4-signed InvokeModel
//!   - types.rs   — request body and response envelope
//!   - mock.rs    — offline canned responses
//!
//! Shared:
//!   - sigv4.rs   — AWS request signing
//!   - prompts.rs — model ID, API version, instruction text

mod bedrock;
pub mod mock;
pub mod prompts;
pub mod sigv4;
pub mod types;

pub use bedrock::{AuthStrategy, InvokeError, InvokeResponse, ModelClient};
pub use mock::MockAnalyzer;
pub use types::{extract_text, AnalysisRequest, ParseError};
