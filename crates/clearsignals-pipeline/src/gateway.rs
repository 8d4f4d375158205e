use std::sync::Arc;
use std::time::Instant;

use clearsignals_llm::{ApiStatusError, ChatClient, ChatOptions, ChatRequest};
use serde_json::Value;

use crate::error::{excerpt, ModelInvocationError, BODY_EXCERPT_CHARS};
use crate::recovery::recover_json;

/// Raw completion text plus the JSON object recovered from it
#[derive(Debug, Clone)]
pub struct Invocation {
    pub raw_text: String,
    pub value: Value,
}

/// Single outbound model call: send, classify failures, recover JSON. No retries.
#[derive(Clone)]
pub struct ModelGateway {
    client: Arc<dyn ChatClient>,
}

impl ModelGateway {
    pub fn new(client: Arc<dyn ChatClient>) -> Self {
        Self { client }
    }

    pub async fn invoke(
        &self,
        model: &str,
        system: &str,
        user: &str,
        max_tokens: u32,
    ) -> Result<Invocation, ModelInvocationError> {
        let request = ChatRequest::prompt(model, system, user)
            .with_options(ChatOptions::new().max_tokens(max_tokens));

        let started = Instant::now();
        let response = self.client.chat(request).await.map_err(classify)?;
        let latency_ms = started.elapsed().as_millis() as u64;

        let usage = response.usage.clone().unwrap_or_default();
        tracing::info!(
            model = %model,
            latency_ms,
            input_tokens = usage.input_tokens,
            output_tokens = usage.output_tokens,
            finish_reason = response.finish_reason.as_deref().unwrap_or("unknown"),
            "model call completed"
        );

        let raw_text = response
            .text()
            .ok_or(ModelInvocationError::EmptyCompletion)?
            .to_string();

        let value = recover_json(&raw_text).map_err(|e| {
            tracing::warn!(model = %model, reason = %e.reason, "model output was not recoverable JSON");
            e
        })?;

        Ok(Invocation { raw_text, value })
    }
}

fn classify(err: anyhow::Error) -> ModelInvocationError {
    match err.downcast_ref::<ApiStatusError>() {
        Some(status) => ModelInvocationError::Status {
            status: status.status,
            body: excerpt(&status.body, BODY_EXCERPT_CHARS),
        },
        None => ModelInvocationError::Request(format!("{:#}", err)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_errors_are_classified_and_truncated() {
        let err: anyhow::Error = ApiStatusError {
            status: 429,
            body: "r".repeat(1000),
        }
        .into();

        match classify(err) {
            ModelInvocationError::Status { status, body } => {
                assert_eq!(status, 429);
                assert_eq!(body.len(), BODY_EXCERPT_CHARS);
            }
            other => panic!("expected status error, got {other:?}"),
        }
    }

    #[test]
    fn test_other_errors_are_request_failures() {
        let err = anyhow::anyhow!("connection reset").context("Failed to send request");
        match classify(err) {
            ModelInvocationError::Request(message) => {
                assert!(message.contains("Failed to send request"));
                assert!(message.contains("connection reset"));
            }
            other => panic!("expected request error, got {other:?}"),
        }
    }
}
