//! Chat-completions client for the generative analysis service

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{debug, error, instrument};
use url::Url;

use crate::common::errors::{PlanError, Result, Source};
use crate::common::traits::AnalysisProvider;
use crate::common::types::AnalysisRequest;
use crate::config::types::OpenAiConfig;
use crate::fetch::ResilientClient;

const SYSTEM_PROMPT: &str = "You are a business analyst writing concise, structured plans.";

/// Chat message
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: String,
    pub content: String,
}

/// Request body for `POST /chat/completions`
#[derive(Debug, Clone, Serialize)]
pub struct ChatCompletionRequest {
    pub model: String,
    pub messages: Vec<ChatMessage>,
    pub max_tokens: u32,
    pub temperature: f32,
}

/// Response body for `POST /chat/completions`
#[derive(Debug, Clone, Deserialize)]
pub struct ChatCompletionResponse {
    #[serde(default)]
    pub choices: Vec<ChatChoice>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ChatChoice {
    #[serde(default)]
    pub message: Option<ChatMessage>,
}

impl ChatCompletionResponse {
    /// Content of the first choice, empty if the service returned none
    pub fn into_text(self) -> String {
        self.choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message)
            .map(|message| message.content)
            .unwrap_or_default()
    }
}

/// Render the analysis prompt
///
/// Asks for the `###` sections the orchestrator parses.
pub fn build_prompt(request: &AnalysisRequest) -> String {
    format!(
        "Analyze a business in the {industry} industry targeting the {market} market \
         with a {model} revenue model.\n\n\
         Respond in Markdown using exactly these sections:\n\
         ### Summary\nOne paragraph executive summary.\n\
         ### SWOT\nOne bullet per strength, weakness, opportunity and threat.\n\
         ### Recommendations\nA numbered list of concrete next steps.\n",
        industry = request.industry,
        market = request.market,
        model = request.revenue_model,
    )
}

/// Client for an OpenAI-compatible chat completions endpoint
#[derive(Debug, Clone)]
pub struct OpenAiAnalysisClient {
    /// Full chat-completions endpoint
    endpoint: Url,
    api_key: Option<String>,
    model: String,
    max_tokens: u32,
    temperature: f32,
    http: ResilientClient,
}

impl OpenAiAnalysisClient {
    /// Create a client from configuration
    pub fn new(config: &OpenAiConfig, http: ResilientClient) -> Result<Self> {
        let base = format!("{}/", config.api_url.trim_end_matches('/'));
        let endpoint = Url::parse(&base)
            .and_then(|url| url.join("chat/completions"))
            .map_err(|e| {
                PlanError::Configuration(format!("invalid OpenAI url '{}': {}", config.api_url, e))
            })?;

        Ok(Self {
            endpoint,
            api_key: config.api_key.clone(),
            model: config.model.clone(),
            max_tokens: config.max_tokens,
            temperature: config.temperature,
            http,
        })
    }

    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }
}

#[async_trait]
impl AnalysisProvider for OpenAiAnalysisClient {
    #[instrument(skip(self), fields(model = %self.model))]
    async fn analyze(&self, request: &AnalysisRequest) -> Result<String> {
        let body = ChatCompletionRequest {
            model: self.model.clone(),
            messages: vec![
                ChatMessage {
                    role: "system".to_string(),
                    content: SYSTEM_PROMPT.to_string(),
                },
                ChatMessage {
                    role: "user".to_string(),
                    content: build_prompt(request),
                },
            ],
            max_tokens: self.max_tokens,
            temperature: self.temperature,
        };

        let response: ChatCompletionResponse = self
            .http
            .send_json(&Source::Analysis, |client| {
                let builder = client.post(self.endpoint.clone()).json(&body);
                match &self.api_key {
                    Some(key) => builder.bearer_auth(key),
                    None => builder,
                }
            })
            .await
            .map_err(|e| {
                error!("analysis request failed: {}", e);
                e
            })?;

        let text = response.into_text();
        debug!(chars = text.len(), "analysis received");
        Ok(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(url: &str) -> OpenAiConfig {
        OpenAiConfig {
            api_url: url.to_string(),
            ..OpenAiConfig::default()
        }
    }

    #[test]
    fn test_endpoint_joins_path() {
        let http = ResilientClient::new().unwrap();
        let client = OpenAiAnalysisClient::new(&config("https://api.openai.com/v1/"), http).unwrap();
        assert_eq!(
            client.endpoint().as_str(),
            "https://api.openai.com/v1/chat/completions"
        );
    }

    #[test]
    fn test_prompt_mentions_request_fields() {
        let prompt = build_prompt(&AnalysisRequest {
            industry: "fintech".to_string(),
            market: "SMB".to_string(),
            revenue_model: "subscription".to_string(),
        });
        assert!(prompt.contains("fintech"));
        assert!(prompt.contains("SMB"));
        assert!(prompt.contains("subscription"));
        assert!(prompt.contains("### SWOT"));
    }

    #[test]
    fn test_empty_choices_yield_empty_text() {
        let response: ChatCompletionResponse = serde_json::from_str(r#"{"choices": []}"#).unwrap();
        assert_eq!(response.into_text(), "");
    }
}
