use reqwest::blocking::Client;
use serde::{Deserialize, Serialize};
use std::sync::mpsc;
use std::time::{Duration, Instant};
use thiserror::Error;

use crate::settings::Settings;
use crate::utils::{Alternative, ResponseAnalysis, TokenRecord, WorkerCommand, WorkerMessage};

const COMPLETIONS_PATH: &str = "/v1/chat/completions";
const MAX_TOKENS: u32 = 500;
const TOP_LOGPROBS: u8 = 5;
const REQUEST_TIMEOUT: Duration = Duration::from_secs(60);

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("no API key configured")]
    Config,
    #[error("request failed: {0}")]
    Transport(String),
    #[error("unexpected response shape: {0}")]
    Parse(String),
}

// Everything a single request needs, resolved from the settings up front so
// the request builder and worker never touch persisted state.
#[derive(Clone, Debug)]
pub struct ApiConfig {
    pub api_key: String,
    pub base_url: String,
    pub model: String,
}

impl ApiConfig {
    pub fn from_settings(settings: &Settings) -> Result<Self, ApiError> {
        let api_key = settings
            .api_key
            .clone()
            .filter(|key| !key.is_empty())
            .ok_or(ApiError::Config)?;

        Ok(Self {
            api_key,
            base_url: settings.api_base_url.clone(),
            model: settings.model.clone(),
        })
    }

    fn endpoint(&self) -> String {
        format!("{}{}", self.base_url, COMPLETIONS_PATH)
    }
}

#[derive(Debug, Serialize)]
pub struct ChatMessage {
    pub role: String,
    pub content: String,
}

#[derive(Debug, Serialize)]
pub struct ChatRequest {
    pub model: String,
    pub messages: Vec<ChatMessage>,
    pub max_tokens: u32,
    pub temperature: f32,
    pub logprobs: bool,
    pub top_logprobs: u8,
}

#[derive(Debug, Deserialize)]
pub struct ChatResponse {
    pub choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
pub struct Choice {
    pub logprobs: Option<ChoiceLogprobs>,
}

#[derive(Debug, Deserialize)]
pub struct ChoiceLogprobs {
    pub content: Option<Vec<TokenLogprob>>,
}

#[derive(Debug, Deserialize)]
pub struct TokenLogprob {
    pub token: String,
    pub logprob: f64,
    #[serde(default)]
    pub top_logprobs: Vec<TopLogprob>,
}

#[derive(Debug, Deserialize)]
pub struct TopLogprob {
    pub token: String,
    pub logprob: f64,
}

pub fn build_request(config: &ApiConfig, prompt: &str) -> ChatRequest {
    ChatRequest {
        model: config.model.clone(),
        messages: vec![ChatMessage {
            role: "user".to_string(),
            content: prompt.to_string(),
        }],
        max_tokens: MAX_TOKENS,
        temperature: 0.0,
        logprobs: true,
        top_logprobs: TOP_LOGPROBS,
    }
}

// Flattens the provider's nested logprob payload into TokenRecords.
// Log-probabilities are capped at 0 so a provider rounding artifact can never
// produce a "more than certain" token. Alternatives keep provider rank order.
pub fn normalize_response(response: ChatResponse) -> Result<Vec<TokenRecord>, ApiError> {
    let choice = response
        .choices
        .into_iter()
        .next()
        .ok_or_else(|| ApiError::Parse("response contains no choices".to_string()))?;

    let content = choice
        .logprobs
        .ok_or_else(|| ApiError::Parse("choice is missing logprobs".to_string()))?
        .content
        .ok_or_else(|| ApiError::Parse("logprobs are missing token content".to_string()))?;

    let tokens = content
        .into_iter()
        .map(|entry| {
            let alternatives = entry
                .top_logprobs
                .into_iter()
                .map(|alt| Alternative {
                    token: alt.token,
                    logprob: alt.logprob.min(0.0),
                })
                .collect();

            TokenRecord::new(entry.token, entry.logprob.min(0.0), alternatives)
        })
        .collect();

    Ok(tokens)
}

pub fn send_chat_request(
    client: &Client,
    config: &ApiConfig,
    prompt: &str,
) -> Result<Vec<TokenRecord>, ApiError> {
    let request = build_request(config, prompt);

    log::info!("POST {}", config.endpoint());

    let response = client
        .post(config.endpoint())
        .header("Content-Type", "application/json")
        .bearer_auth(&config.api_key)
        .json(&request)
        .send()
        .map_err(|e| ApiError::Transport(e.to_string()))?;

    let status = response.status();
    if !status.is_success() {
        let body = response.text().unwrap_or_default();
        return Err(ApiError::Transport(format!("HTTP {}: {}", status, body)));
    }

    let parsed: ChatResponse = response
        .json()
        .map_err(|e| ApiError::Parse(e.to_string()))?;

    normalize_response(parsed)
}

pub fn run_request_worker(
    cmd_rx: mpsc::Receiver<WorkerCommand>,
    msg_tx: mpsc::Sender<WorkerMessage>,
) {
    log::info!("Request worker starting...");

    let client = match Client::builder().timeout(REQUEST_TIMEOUT).build() {
        Ok(client) => client,
        Err(e) => {
            let _ = msg_tx.send(WorkerMessage::Error(format!(
                "Failed to build HTTP client: {}",
                e
            )));
            return;
        }
    };

    loop {
        match cmd_rx.recv() {
            Ok(WorkerCommand::Send { prompt, config }) => {
                let _ = msg_tx.send(WorkerMessage::Started);

                let start_time = Instant::now();

                match send_chat_request(&client, &config, &prompt) {
                    Ok(tokens) => {
                        let elapsed = start_time.elapsed().as_millis() as u64;
                        log::info!("Received {} tokens in {}ms", tokens.len(), elapsed);

                        let _ = msg_tx.send(WorkerMessage::Completed(ResponseAnalysis::new(
                            prompt, tokens, elapsed,
                        )));
                    }
                    Err(e) => {
                        log::warn!("Request failed: {}", e);
                        let _ = msg_tx.send(WorkerMessage::Error(e.to_string()));
                    }
                }
            }
            Ok(WorkerCommand::Shutdown) => {
                log::info!("Worker received shutdown command");
                break;
            }
            Err(_) => {
                log::info!("Worker channel closed, shutting down");
                break;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> ApiConfig {
        ApiConfig {
            api_key: "sk-test".to_string(),
            base_url: "https://api.openai.com".to_string(),
            model: "gpt-4o-mini".to_string(),
        }
    }

    #[test]
    fn test_request_body_shape() {
        let request = build_request(&config(), "hello");
        let body = serde_json::to_value(&request).unwrap();

        assert_eq!(body["model"], "gpt-4o-mini");
        assert_eq!(body["messages"][0]["role"], "user");
        assert_eq!(body["messages"][0]["content"], "hello");
        assert_eq!(body["max_tokens"], 500);
        assert_eq!(body["temperature"], 0.0);
        assert_eq!(body["logprobs"], true);
        assert_eq!(body["top_logprobs"], 5);
    }

    #[test]
    fn test_endpoint_url() {
        assert_eq!(
            config().endpoint(),
            "https://api.openai.com/v1/chat/completions"
        );
    }

    #[test]
    fn test_normalize_well_formed_response() {
        let raw = serde_json::json!({
            "choices": [{
                "logprobs": {
                    "content": [
                        {
                            "token": "Hello",
                            "logprob": -0.1,
                            "top_logprobs": [
                                {"token": "Hello", "logprob": -0.1},
                                {"token": "Hi", "logprob": -2.5}
                            ]
                        },
                        {"token": "!", "logprob": -0.7}
                    ]
                }
            }]
        });

        let response: ChatResponse = serde_json::from_value(raw).unwrap();
        let tokens = normalize_response(response).unwrap();

        assert_eq!(tokens.len(), 2);
        assert_eq!(tokens[0].token, "Hello");
        assert!((tokens[0].logprob + 0.1).abs() < 1e-12);
        assert_eq!(tokens[0].alternatives.len(), 2);
        assert_eq!(tokens[0].alternatives[1].token, "Hi");
        assert!(tokens[1].alternatives.is_empty());
    }

    #[test]
    fn test_empty_choices_is_a_parse_error() {
        let response: ChatResponse =
            serde_json::from_value(serde_json::json!({"choices": []})).unwrap();

        assert!(matches!(
            normalize_response(response),
            Err(ApiError::Parse(_))
        ));
    }

    #[test]
    fn test_error_payload_does_not_deserialize() {
        // Provider error payloads carry no "choices" at all; they fail at
        // deserialization, which the caller reports as a parse error.
        let raw = serde_json::json!({"error": {"message": "invalid key"}});

        assert!(serde_json::from_value::<ChatResponse>(raw).is_err());
    }

    #[test]
    fn test_missing_logprobs_is_a_parse_error() {
        let raw = serde_json::json!({"choices": [{"logprobs": null}]});
        let response: ChatResponse = serde_json::from_value(raw).unwrap();

        assert!(matches!(
            normalize_response(response),
            Err(ApiError::Parse(_))
        ));
    }

    #[test]
    fn test_positive_logprobs_are_clamped_to_zero() {
        let raw = serde_json::json!({
            "choices": [{"logprobs": {"content": [
                {
                    "token": "a",
                    "logprob": 0.3,
                    "top_logprobs": [{"token": "a", "logprob": 0.3}]
                }
            ]}}]
        });

        let response: ChatResponse = serde_json::from_value(raw).unwrap();
        let tokens = normalize_response(response).unwrap();

        assert_eq!(tokens[0].logprob, 0.0);
        assert_eq!(tokens[0].alternatives[0].logprob, 0.0);
    }

    #[test]
    fn test_config_from_settings_requires_a_key() {
        let mut settings = Settings::default();
        assert!(matches!(
            ApiConfig::from_settings(&settings),
            Err(ApiError::Config)
        ));

        settings.api_key = Some(String::new());
        assert!(matches!(
            ApiConfig::from_settings(&settings),
            Err(ApiError::Config)
        ));

        settings.api_key = Some("sk-test".to_string());
        let config = ApiConfig::from_settings(&settings).unwrap();
        assert_eq!(config.api_key, "sk-test");
        assert_eq!(config.base_url, "https://api.openai.com");
    }
}
