//! Text-generation capability.
//!
//! Config-dispatched: `"openai"` calls the chat completions API, `"ollama"`
//! a local Ollama server, and `"disabled"` always fails so callers exercise
//! their fallback path.
//!
//! Retry strategy for HTTP providers:
//! - 429 and 5xx responses, and network errors, retry with exponential
//!   backoff (1s, 2s, 4s, ... capped at 2^5)
//! - other 4xx responses fail immediately

use std::time::Duration;
use tracing::warn;

use crate::config::GenerationConfig;
use crate::error::GenerationError;

/// Generate text for `prompt` using the configured provider.
///
/// Every failure mode (disabled provider, timeout, exhausted retries, empty
/// completion) maps to a [`GenerationError`]; callers are expected to treat
/// any of them as a signal to fall back, not as a run failure.
pub async fn generate_text(
    config: &GenerationConfig,
    prompt: &str,
) -> Result<String, GenerationError> {
    let text = match config.provider.as_str() {
        "openai" => generate_openai(config, prompt).await?,
        "ollama" => generate_ollama(config, prompt).await?,
        _ => return Err(GenerationError::Unavailable),
    };

    if text.trim().is_empty() {
        return Err(GenerationError::Empty);
    }
    Ok(text)
}

fn http_client(config: &GenerationConfig) -> Result<reqwest::Client, GenerationError> {
    reqwest::Client::builder()
        .timeout(Duration::from_secs(config.timeout_secs))
        .build()
        .map_err(|e| GenerationError::Api(e.to_string()))
}

async fn generate_openai(
    config: &GenerationConfig,
    prompt: &str,
) -> Result<String, GenerationError> {
    let api_key = std::env::var("OPENAI_API_KEY")
        .map_err(|_| GenerationError::Api("OPENAI_API_KEY not set".to_string()))?;

    let model = config
        .model
        .as_deref()
        .ok_or_else(|| GenerationError::Api("generation.model required".to_string()))?;

    let client = http_client(config)?;
    let body = serde_json::json!({
        "model": model,
        "messages": [
            {"role": "user", "content": prompt}
        ],
    });

    let mut last_err = None;

    for attempt in 0..=config.max_retries {
        if attempt > 0 {
            let delay = Duration::from_secs(1 << (attempt - 1).min(5));
            tokio::time::sleep(delay).await;
        }

        let resp = client
            .post("https://api.openai.com/v1/chat/completions")
            .header("Authorization", format!("Bearer {}", api_key))
            .header("Content-Type", "application/json")
            .json(&body)
            .send()
            .await;

        match resp {
            Ok(response) => {
                let status = response.status();

                if status.is_success() {
                    let json: serde_json::Value = response
                        .json()
                        .await
                        .map_err(|e| GenerationError::Api(e.to_string()))?;
                    return parse_openai_response(&json);
                }

                if status.as_u16() == 429 || status.is_server_error() {
                    let body_text = response.text().await.unwrap_or_default();
                    warn!(status = %status, attempt, "OpenAI API error, retrying");
                    last_err = Some(GenerationError::Api(format!("{}: {}", status, body_text)));
                    continue;
                }

                let body_text = response.text().await.unwrap_or_default();
                return Err(GenerationError::Api(format!("{}: {}", status, body_text)));
            }
            Err(e) if e.is_timeout() => {
                return Err(GenerationError::Timeout(config.timeout_secs));
            }
            Err(e) => {
                last_err = Some(GenerationError::Api(e.to_string()));
                continue;
            }
        }
    }

    Err(last_err.unwrap_or(GenerationError::Unavailable))
}

fn parse_openai_response(json: &serde_json::Value) -> Result<String, GenerationError> {
    json.get("choices")
        .and_then(|c| c.as_array())
        .and_then(|c| c.first())
        .and_then(|c| c.pointer("/message/content"))
        .and_then(|c| c.as_str())
        .map(|s| s.to_string())
        .ok_or_else(|| GenerationError::Api("missing choices[0].message.content".to_string()))
}

async fn generate_ollama(
    config: &GenerationConfig,
    prompt: &str,
) -> Result<String, GenerationError> {
    let model = config
        .model
        .as_deref()
        .ok_or_else(|| GenerationError::Api("generation.model required".to_string()))?;

    let client = http_client(config)?;
    let endpoint = format!("{}/api/generate", config.base_url.trim_end_matches('/'));
    let body = serde_json::json!({
        "model": model,
        "prompt": prompt,
        "stream": false,
    });

    let mut last_err = None;

    for attempt in 0..=config.max_retries {
        if attempt > 0 {
            let delay = Duration::from_secs(1 << (attempt - 1).min(5));
            tokio::time::sleep(delay).await;
        }

        match client.post(&endpoint).json(&body).send().await {
            Ok(response) => {
                let status = response.status();
                if status.is_success() {
                    let json: serde_json::Value = response
                        .json()
                        .await
                        .map_err(|e| GenerationError::Api(e.to_string()))?;
                    return json
                        .get("response")
                        .and_then(|r| r.as_str())
                        .map(|s| s.to_string())
                        .ok_or_else(|| {
                            GenerationError::Api("missing response field".to_string())
                        });
                }

                if status.as_u16() == 429 || status.is_server_error() {
                    warn!(status = %status, attempt, "Ollama API error, retrying");
                    last_err = Some(GenerationError::Api(status.to_string()));
                    continue;
                }

                let body_text = response.text().await.unwrap_or_default();
                return Err(GenerationError::Api(format!("{}: {}", status, body_text)));
            }
            Err(e) if e.is_timeout() => {
                return Err(GenerationError::Timeout(config.timeout_secs));
            }
            Err(e) => {
                last_err = Some(GenerationError::Api(e.to_string()));
                continue;
            }
        }
    }

    Err(last_err.unwrap_or(GenerationError::Unavailable))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_disabled_provider_is_unavailable() {
        let config = GenerationConfig::default();
        let err = generate_text(&config, "anything").await.unwrap_err();
        assert!(matches!(err, GenerationError::Unavailable));
    }

    #[test]
    fn test_parse_openai_response() {
        let json = serde_json::json!({
            "choices": [
                {"message": {"role": "assistant", "content": "Subject: Hi\n\nBody"}}
            ]
        });
        assert_eq!(
            parse_openai_response(&json).unwrap(),
            "Subject: Hi\n\nBody"
        );

        let bad = serde_json::json!({"choices": []});
        assert!(parse_openai_response(&bad).is_err());
    }
}
