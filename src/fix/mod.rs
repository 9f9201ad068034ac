//! Fix requester: one-shot chat request asking for a corrected program.

use anyhow::Result;
use async_trait::async_trait;

use crate::{
    config::Config,
    llm::{ChatMessage, ChatOptions, LlmClient, Role},
    printer,
};

/// Built-in fallback when neither the CLI nor the config names a model.
pub const DEFAULT_MODEL: &str = "mistralai/mistral-7b-instruct:free";

const FIX_TEMPERATURE: f32 = 0.3;

/// Source of fix suggestions. `None` means "no fix available" and is
/// never fatal to the pipeline.
#[async_trait]
pub trait SuggestFix {
    async fn request_fix(&self, code: &str, error: &str, model: &str) -> Option<String>;
}

pub struct FixRequester {
    client: LlmClient,
}

impl FixRequester {
    pub fn from_config(cfg: &Config) -> Result<Self> {
        Ok(Self { client: LlmClient::from_config(cfg)? })
    }
}

#[async_trait]
impl SuggestFix for FixRequester {
    async fn request_fix(&self, code: &str, error: &str, model: &str) -> Option<String> {
        printer::step(&format!("Asking {} for a fix...", model));
        let prompt = format!(
            "I ran this code and got an error. Suggest a fix.\n\nCode:\n{}\n\nError:\n{}",
            code, error
        );
        let messages = vec![ChatMessage::new(Role::User, prompt)];
        let opts = ChatOptions { model: model.to_string(), temperature: FIX_TEMPERATURE };

        match self.client.chat(messages, opts).await {
            Ok(text) => Some(text),
            Err(e) => {
                printer::error(&format!("API call failed: {:#}", e));
                None
            }
        }
    }
}
