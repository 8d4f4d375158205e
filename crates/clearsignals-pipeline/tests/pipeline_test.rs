use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use clearsignals_llm::{ApiStatusError, ChatClient, ChatRequest, ChatResponse, TokenUsage};
use clearsignals_pipeline::{
    ModelInvocationError, Pipeline, PipelineConfig, PipelineError, PipelineKind,
};

/// Replays canned replies in order and records every request
struct ScriptedClient {
    replies: Mutex<VecDeque<anyhow::Result<String>>>,
    requests: Mutex<Vec<ChatRequest>>,
}

impl ScriptedClient {
    fn new(replies: Vec<anyhow::Result<String>>) -> Arc<Self> {
        Arc::new(Self {
            replies: Mutex::new(replies.into()),
            requests: Mutex::new(Vec::new()),
        })
    }

    fn requests(&self) -> Vec<ChatRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl ChatClient for ScriptedClient {
    async fn chat(&self, request: ChatRequest) -> anyhow::Result<ChatResponse> {
        let model = request.model.clone();
        self.requests.lock().unwrap().push(request);
        let reply = self
            .replies
            .lock()
            .unwrap()
            .pop_front()
            .expect("unexpected model call")?;

        Ok(ChatResponse {
            content: Some(reply),
            model: Some(model),
            usage: Some(TokenUsage {
                input_tokens: 100,
                output_tokens: 50,
                total_tokens: 150,
            }),
            finish_reason: Some("stop".to_string()),
        })
    }
}

fn ok(text: &str) -> anyhow::Result<String> {
    Ok(text.to_string())
}

const STAGE1_TWO_EMAILS: &str = r#"```json
{
  "contact_name": "Keiko Tanaka",
  "company_name": "Tanaka Logistics",
  "rep_name": "Dana Ruiz",
  "emails": [
    {"index": 1, "from": "Dana Ruiz", "date": "Mar 3", "direction": "outbound", "body": "Hi Keiko, following up on the demo."},
    {"index": 2, "from": "Keiko Tanaka", "date": "Mar 5", "direction": "inbound", "body": "We will consider it."}
  ]
}
```"#;

const STAGE2_TWO_ANALYSES: &str = r#"Here is the analysis:
{
  "per_email": [
    {"index": 1, "intent": 5, "win_pct": 45, "signals": [], "summary": "Polite follow-up.",},
    {"index": 2, "intent": 3, "win_pct": 25,
     "signals": [{"type": "cultural", "severity": "red", "description": "Likely a soft no", "quote": "We will consider it."}],
     "summary": "Soft rejection.", "pivotal": "Indirect no"}
  ],
  "final": {
    "signals": [], "ryg": {"r": 1, "y": 1, "g": 0}, "intent": 3, "win_pct": 25,
    "coach": "Ask about their consensus process.", "summary": "Deal is cooling.",
    "next_steps": "Offer a reference call.", "deal_stage": "demo", "next_time": [],
  }
}"#;

const STAGE2_ONE_ANALYSIS: &str = r#"{
  "per_email": [{"index": 1, "intent": 5, "win_pct": 45, "summary": "Polite follow-up."}],
  "final": {"intent": 4, "win_pct": 30, "summary": "Unclear.", "deal_stage": "demo"}
}"#;

const SINGLE_CALL: &str = r#"{
  "contact_name": "Lars", "company_name": "Nordic AB", "rep_name": "Sam",
  "emails": [{"index": 1, "from": "Lars", "direction": "in", "body": "Send pricing please."}],
  "per_email": [{"index": 1, "intent": 6, "win_pct": 55, "summary": "Pricing request."}],
  "final": {"intent": 6, "win_pct": 55, "summary": "Early interest.", "deal_stage": "qualification"}
}"#;

fn pipeline(client: Arc<ScriptedClient>) -> Pipeline {
    Pipeline::builder().chat_client(client).build().unwrap()
}

#[tokio::test]
async fn test_two_stage_complete_run() {
    let client = ScriptedClient::new(vec![ok(STAGE1_TWO_EMAILS), ok(STAGE2_TWO_ANALYSES)]);
    let run = pipeline(client.clone())
        .run("raw pasted thread", Some("opus"))
        .await
        .unwrap();

    assert_eq!(run.pipeline, PipelineKind::TwoStage);
    assert_eq!(run.model, "anthropic/claude-opus-4");
    assert_eq!(run.email_count, 2);
    assert_eq!(run.analysis_count, 2);
    assert!(run.complete);
    assert!(run.stage1_ms.is_some());
    assert!(run.stage2_ms.is_some());
    assert!(run.stage1_error.is_none());
    assert_eq!(run.result.contact_name, "Keiko Tanaka");
    assert_eq!(run.result.messages[1].snippet, "We will consider it.");
    assert_eq!(run.result.final_assessment.summary, "Deal is cooling.");

    let requests = client.requests();
    assert_eq!(requests.len(), 2);
    assert_eq!(requests[0].model, "anthropic/claude-3.5-haiku");
    assert_eq!(requests[0].options.max_tokens, Some(4000));
    assert_eq!(requests[1].model, "anthropic/claude-opus-4");
    assert_eq!(requests[1].options.max_tokens, Some(8000));
    assert!(requests[1].messages[1].content().contains("exactly 2 emails"));
}

#[tokio::test]
async fn test_count_mismatch_is_flagged_not_fatal() {
    let client = ScriptedClient::new(vec![ok(STAGE1_TWO_EMAILS), ok(STAGE2_ONE_ANALYSIS)]);
    let run = pipeline(client).run("raw", None).await.unwrap();

    assert_eq!(run.model, "anthropic/claude-sonnet-4");
    assert_eq!(run.email_count, 2);
    assert_eq!(run.analysis_count, 1);
    assert!(!run.complete);
    assert_eq!(run.result.messages.len(), 2);
    assert_eq!(run.result.per_message.len(), 1);
}

#[tokio::test]
async fn test_unparseable_stage1_falls_back_to_single_call() {
    let client = ScriptedClient::new(vec![ok("I could not find any emails."), ok(SINGLE_CALL)]);
    let run = pipeline(client.clone()).run("raw", Some("gpt4o")).await.unwrap();

    assert_eq!(run.pipeline, PipelineKind::FallbackSingle);
    assert!(run.stage1_error.is_some());
    assert!(run.stage2_ms.is_none());
    assert!(run.complete);
    assert_eq!(run.result.company_name, "Nordic AB");

    let requests = client.requests();
    assert_eq!(requests.len(), 2);
    assert_eq!(requests[1].model, "openai/gpt-4o");
}

#[tokio::test]
async fn test_empty_stage1_falls_back_to_single_call() {
    let client = ScriptedClient::new(vec![ok(r#"{"emails": []}"#), ok(SINGLE_CALL)]);
    let run = pipeline(client).run("raw", None).await.unwrap();

    assert_eq!(run.pipeline, PipelineKind::FallbackSingle);
    assert_eq!(run.email_count, 1);
    assert!(run.stage1_error.is_some());
}

#[tokio::test]
async fn test_stage1_transport_error_falls_back() {
    let client = ScriptedClient::new(vec![Err(anyhow::anyhow!("connection reset")), ok(SINGLE_CALL)]);
    let run = pipeline(client).run("raw", None).await.unwrap();

    assert_eq!(run.pipeline, PipelineKind::FallbackSingle);
    assert!(run.stage1_error.unwrap().contains("connection reset"));
}

#[tokio::test]
async fn test_fallback_failure_is_propagated() {
    let client = ScriptedClient::new(vec![
        ok("no json here"),
        Err(ApiStatusError {
            status: 500,
            body: "upstream exploded".to_string(),
        }
        .into()),
    ]);
    let err = pipeline(client.clone()).run("raw", None).await.unwrap_err();

    match err {
        PipelineError::Model(ModelInvocationError::Status { status, body }) => {
            assert_eq!(status, 500);
            assert_eq!(body, "upstream exploded");
        }
        other => panic!("unexpected error: {other:?}"),
    }
    assert_eq!(client.requests().len(), 2);
}

#[tokio::test]
async fn test_stage2_failure_does_not_fall_back() {
    let client = ScriptedClient::new(vec![ok(STAGE1_TWO_EMAILS), ok(r#"{"per_email": []}"#)]);
    let err = pipeline(client.clone()).run("raw", None).await.unwrap_err();

    assert!(matches!(err, PipelineError::Schema { stage: "stage2", .. }));
    assert_eq!(client.requests().len(), 2);
}

#[tokio::test]
async fn test_disabled_fallback_fails_on_empty_stage1() {
    let client = ScriptedClient::new(vec![ok(r#"{"emails": []}"#)]);
    let pipeline = Pipeline::builder()
        .chat_client(client.clone())
        .config(PipelineConfig::new().with_fallback(false))
        .build()
        .unwrap();

    let err = pipeline.run("raw", None).await.unwrap_err();
    assert!(matches!(err, PipelineError::Schema { stage: "stage1", .. }));
    assert_eq!(client.requests().len(), 1);
}

#[tokio::test]
async fn test_empty_completion_is_an_error() {
    let client = ScriptedClient::new(vec![ok(STAGE1_TWO_EMAILS), ok("   ")]);
    let err = pipeline(client).run("raw", None).await.unwrap_err();

    assert!(matches!(
        err,
        PipelineError::Model(ModelInvocationError::EmptyCompletion)
    ));
}
