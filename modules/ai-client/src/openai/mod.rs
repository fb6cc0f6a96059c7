mod client;
pub(crate) mod schema;
pub(crate) mod types;

pub use schema::StructuredOutput;

use anyhow::{anyhow, Result};
use base64::Engine;

use client::OpenAiClient;
use types::{
    ChatRequest, JsonSchemaFormat, ReasoningConfig, ResponseFormat, ResponsesRequest,
    ResponsesTextConfig, ResponsesTextFormat, WireMessage,
};

/// Thin client for OpenAI's chat-completions and responses wire protocols.
#[derive(Clone)]
pub struct OpenAi {
    api_key: String,
    pub(crate) model: String,
    base_url: Option<String>,
}

impl OpenAi {
    pub fn new(api_key: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            model: model.into(),
            base_url: None,
        }
    }

    pub fn from_env(model: impl Into<String>) -> Result<Self> {
        let api_key = std::env::var("OPENAI_API_KEY")
            .map_err(|_| anyhow!("OPENAI_API_KEY environment variable not set"))?;
        Ok(Self::new(api_key, model))
    }

    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = Some(url.into());
        self
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    pub fn api_key(&self) -> &str {
        &self.api_key
    }

    pub(crate) fn client(&self) -> OpenAiClient {
        let client = OpenAiClient::new(&self.api_key);
        if let Some(ref url) = self.base_url {
            client.with_base_url(url)
        } else {
            client
        }
    }

    /// Structured extraction over the chat-completions endpoint, using
    /// strict `json_schema` response formatting.
    pub async fn extract<T: StructuredOutput>(
        &self,
        system_prompt: impl Into<String>,
        user_prompt: impl Into<String>,
    ) -> Result<T> {
        let json = self
            .structured_output(&system_prompt.into(), &user_prompt.into(), T::openai_schema())
            .await?;
        serde_json::from_str(&json).map_err(|e| anyhow!("failed to deserialize response: {e}"))
    }

    /// Structured extraction with a caller-supplied raw JSON schema.
    pub async fn structured_output(
        &self,
        system: &str,
        user: &str,
        schema: serde_json::Value,
    ) -> Result<String> {
        let mut request = ChatRequest::new(&self.model)
            .message(WireMessage::system(system))
            .message(WireMessage::user(user))
            .response_format(ResponseFormat::JsonSchema {
                json_schema: JsonSchemaFormat {
                    name: "structured_response".to_string(),
                    strict: true,
                    schema,
                },
            });
        if !types::uses_max_completion_tokens(&self.model) {
            request = request.temperature(0.0);
        }

        let response = self.client().chat(&request).await?;
        response
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .ok_or_else(|| anyhow!("no response from OpenAI"))
    }

    /// Structured extraction over the Responses endpoint — OpenAI's
    /// reasoning-capable primary tier, used as the first rung of the
    /// analysis cascade before falling back to chat-completions.
    pub async fn responses_structured<T: StructuredOutput>(
        &self,
        input: impl Into<String>,
        reasoning_effort: &str,
    ) -> Result<T> {
        let text = self
            .responses_structured_raw(input, reasoning_effort, T::openai_schema())
            .await?;
        serde_json::from_str(&text).map_err(|e| anyhow!("failed to deserialize response: {e}"))
    }

    /// Same Responses-endpoint call as [`Self::responses_structured`], but
    /// against a caller-supplied raw JSON schema and without deserializing
    /// the result — used by cascades that need to run repair/validation
    /// over the raw text before committing to a typed shape.
    pub async fn responses_structured_raw(
        &self,
        input: impl Into<String>,
        reasoning_effort: &str,
        schema: serde_json::Value,
    ) -> Result<String> {
        let request = ResponsesRequest {
            model: self.model.clone(),
            input: input.into(),
            reasoning: Some(ReasoningConfig {
                effort: reasoning_effort.to_string(),
            }),
            text: Some(ResponsesTextConfig {
                format: Some(ResponsesTextFormat::JsonSchema {
                    name: "structured_response".to_string(),
                    strict: true,
                    schema,
                }),
            }),
        };

        let response = self.client().responses(&request).await?;
        response
            .text()
            .ok_or_else(|| anyhow!("no output_text in OpenAI responses output"))
    }

    /// Minimal capability-probe call against the Responses endpoint: no
    /// schema, low reasoning effort, used once per process to decide
    /// whether the primary tier is reachable at all.
    pub async fn probe_responses(&self) -> Result<()> {
        let request = ResponsesRequest {
            model: self.model.clone(),
            input: "ping".to_string(),
            reasoning: Some(ReasoningConfig {
                effort: "minimal".to_string(),
            }),
            text: None,
        };
        self.client().responses(&request).await?;
        Ok(())
    }

    /// Chat-completions call constrained to `{"type": "json_object"}` —
    /// looser than [`Self::structured_output`]'s strict schema, used by
    /// cascade tiers that want well-formed JSON without committing to one
    /// exact shape up front.
    pub async fn json_object_completion(&self, system: &str, user: &str) -> Result<String> {
        let mut request = ChatRequest::new(&self.model)
            .message(WireMessage::system(system))
            .message(WireMessage::user(user))
            .response_format(ResponseFormat::JsonObject);
        if !types::uses_max_completion_tokens(&self.model) {
            request = request.temperature(0.0);
        }

        let response = self.client().chat(&request).await?;
        response
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .ok_or_else(|| anyhow!("no response from OpenAI"))
    }

    /// Plain chat completion with no response-format constraint.
    pub async fn chat_completion(
        &self,
        system: impl Into<String>,
        user: impl Into<String>,
    ) -> Result<String> {
        let mut request = ChatRequest::new(&self.model)
            .message(WireMessage::system(system))
            .message(WireMessage::user(user));

        if types::uses_max_completion_tokens(&self.model) {
            request = request.max_tokens(4096);
        } else {
            request = request.max_tokens(4096).temperature(0.0);
        }

        let response = self.client().chat(&request).await?;
        response
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .ok_or_else(|| anyhow!("no response from OpenAI"))
    }

    pub async fn complete(&self, prompt: &str) -> Result<String> {
        self.chat_completion("You are a helpful assistant.", prompt)
            .await
    }

    /// Structured extraction over chat-completions with one or more images
    /// attached to the user turn — the multi-screenshot sibling of
    /// [`Self::structured_output`], used by vision analysis prompts that
    /// need several screenshots judged together rather than one at a time.
    pub async fn structured_output_with_images(
        &self,
        system: &str,
        user_text: &str,
        image_data_urls: Vec<String>,
        schema: serde_json::Value,
    ) -> Result<String> {
        let mut request = ChatRequest::new(&self.model)
            .message(WireMessage::system(system))
            .message(WireMessage::user_with_images_detail(user_text, image_data_urls, Some("high")))
            .response_format(ResponseFormat::JsonSchema {
                json_schema: JsonSchemaFormat {
                    name: "structured_response".to_string(),
                    strict: true,
                    schema,
                },
            });
        if !types::uses_max_completion_tokens(&self.model) {
            request = request.temperature(0.0);
        }
        request = request.max_tokens(4096);

        let response = self.client().chat(&request).await?;
        response
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .ok_or_else(|| anyhow!("no response from OpenAI vision"))
    }

    /// Send a single image to vision and return the model's description.
    pub async fn describe_image(
        &self,
        bytes: &[u8],
        mime_type: &str,
        prompt: &str,
    ) -> Result<String> {
        let encoded = base64::engine::general_purpose::STANDARD.encode(bytes);
        let data_url = format!("data:{mime_type};base64,{encoded}");

        let mut request = ChatRequest::new(&self.model)
            .message(WireMessage::user_with_images(prompt, vec![data_url]));
        request = if types::uses_max_completion_tokens(&self.model) {
            request.max_tokens(4096)
        } else {
            request.max_tokens(4096).temperature(0.0)
        };

        let response = self.client().chat(&request).await?;
        response
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .ok_or_else(|| anyhow!("no text response from OpenAI vision"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_openai_new() {
        let ai = OpenAi::new("sk-test", "gpt-4o");
        assert_eq!(ai.model, "gpt-4o");
        assert_eq!(ai.api_key, "sk-test");
    }

    #[test]
    fn test_openai_with_base_url() {
        let ai = OpenAi::new("sk-test", "gpt-4o").with_base_url("https://custom.api.com");
        assert_eq!(ai.base_url, Some("https://custom.api.com".to_string()));
    }
}
