//! Fixed request parameters for screen analysis.

/// Bedrock model ID for Claude 3 Sonnet.
pub const MODEL: &str = "anthropic.claude-3-sonnet-20240229-v1:0";

/// Messages API version string Bedrock expects in the body.
pub const ANTHROPIC_VERSION: &str = "bedrock-2023-05-31";

pub const MAX_TOKENS: u32 = 500;

/// Instruction sent alongside every screenshot.
pub const ANALYZE_SCREEN_PROMPT: &str = "I'm showing you my current computer screen. \
Based on what you see, please:\n\n\
1. Briefly describe what you see on the screen\n\
2. Suggest ONE specific way you could help me with what I'm working on\n\
3. Provide a specific, actionable tip or solution\n\n\
Be concise but helpful. Focus on providing practical assistance related to what I'm doing.";
