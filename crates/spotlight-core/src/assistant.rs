//! Client for a hosted chat-assistant platform (Backboard).
//!
//! Registers the annotation tools with an assistant, talks to it on a
//! thread, and answers the tool calls it makes by running them locally and
//! posting the result back to the thread.

use crate::config::{resolve_env_var, AssistantConfig};
use crate::error::{InferenceError, InputError, Result};
use crate::inference::{error_message_or_body, parse_body};
use crate::tools::{definitions, result_content, ToolCall, ToolExecutor, ToolKind};
use serde_json::{json, Value};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Follow-up asked after `process_video` so the assistant answers in prose.
const SUMMARY_REQUEST: &str =
    "Please provide a clear paragraph about the video description of the main character.";

/// Name, description and system prompt of a created assistant.
#[derive(Debug, Clone)]
pub struct AssistantProfile {
    pub name: String,
    pub description: String,
    pub system_prompt: String,
}

impl Default for AssistantProfile {
    fn default() -> Self {
        Self {
            name: "Video Stats Analyzer".to_string(),
            description: "You are a chatbot that analyzes videos and provides detailed \
                          statistics and information."
                .to_string(),
            system_prompt: "You are a chatbot that analyzes videos and provides detailed \
                            statistics and information about the content."
                .to_string(),
        }
    }
}

/// What a query produced.
#[derive(Debug, Clone, PartialEq)]
pub enum AssistantReply {
    /// The assistant's own words
    Text(String),
    /// A `get_all_stats` result, returned as-is
    Stats(Value),
}

/// Backboard REST client.
pub struct AssistantClient {
    api_key: String,
    endpoint: String,
    llm_provider: String,
    model_name: String,
    timeout: Duration,
    settle: Duration,
    client: reqwest::Client,
}

impl AssistantClient {
    pub fn new(api_key: &str) -> Self {
        Self::with_endpoint(api_key, "https://app.backboard.io/api")
    }

    /// Create with a custom API base.
    pub fn with_endpoint(api_key: &str, endpoint: &str) -> Self {
        let defaults = AssistantConfig::default();
        Self {
            api_key: api_key.to_string(),
            endpoint: endpoint.trim_end_matches('/').to_string(),
            llm_provider: defaults.llm_provider,
            model_name: defaults.model_name,
            timeout: Duration::from_millis(defaults.timeout_ms),
            settle: Duration::from_millis(defaults.settle_ms),
            client: reqwest::Client::new(),
        }
    }

    /// Provider and model the platform answers with.
    pub fn with_model(mut self, llm_provider: &str, model_name: &str) -> Self {
        self.llm_provider = llm_provider.to_string();
        self.model_name = model_name.to_string();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_settle_delay(mut self, settle: Duration) -> Self {
        self.settle = settle;
        self
    }

    /// Build from config, resolving the `${BACKBOARD_API_KEY}` reference.
    pub fn from_config(config: &AssistantConfig) -> std::result::Result<Self, InputError> {
        let api_key = resolve_env_var(&config.api_key).ok_or(InputError::MissingConfig {
            setting: "Backboard API key",
            env_var: "BACKBOARD_API_KEY",
        })?;
        Ok(Self::with_endpoint(&api_key, &config.endpoint)
            .with_model(&config.llm_provider, &config.model_name)
            .with_timeout(Duration::from_millis(config.timeout_ms))
            .with_settle_delay(Duration::from_millis(config.settle_ms)))
    }

    /// Create an assistant that can call every annotation tool. Returns its id.
    pub async fn create_assistant(&self, profile: &AssistantProfile) -> Result<String> {
        let body = json!({
            "name": profile.name,
            "description": profile.description,
            "system_prompt": profile.system_prompt,
            "tools": definitions(),
        });
        let response = self.post_json("/assistants", &body).await?;

        let id = ["id", "assistant_id", "assistantId"]
            .iter()
            .find_map(|key| response.get(*key).and_then(Value::as_str))
            .ok_or_else(|| {
                InferenceError::Decode(format!("assistant response has no id: {response}"))
            })?;
        tracing::info!("Created assistant {id}");
        Ok(id.to_string())
    }

    /// Open a conversation thread on an assistant. Returns the thread id.
    pub async fn create_thread(&self, assistant_id: &str) -> Result<String> {
        let response = self
            .post_json(&format!("/assistants/{assistant_id}/threads"), &json!({}))
            .await?;
        let id = response
            .get("thread_id")
            .and_then(Value::as_str)
            .ok_or_else(|| {
                InferenceError::Decode(format!("thread response has no thread_id: {response}"))
            })?;
        tracing::debug!("Created thread {id} on assistant {assistant_id}");
        Ok(id.to_string())
    }

    /// Store a memory on the assistant.
    pub async fn create_memory(&self, assistant_id: &str, content: &str) -> Result<Value> {
        let body = json!({
            "content": content,
            "metadata": {
                "type": "string",
                "description": "An example of a description of the main character."
            }
        });
        self.post_json(&format!("/assistants/{assistant_id}/memories"), &body)
            .await
    }

    pub async fn memories(&self, assistant_id: &str) -> Result<Value> {
        let resp = self
            .client
            .get(self.url(&format!("/assistants/{assistant_id}/memories")))
            .header("X-API-Key", &self.api_key)
            .timeout(self.timeout)
            .send()
            .await
            .map_err(|e| InferenceError::Transport(format!("Backboard request failed: {e}")))?;
        read_response(resp).await
    }

    /// Post a user message and return the assistant's response document.
    pub async fn send_message(&self, thread_id: &str, content: &str) -> Result<Value> {
        let form = [
            ("content", content),
            ("llm_provider", self.llm_provider.as_str()),
            ("model_name", self.model_name.as_str()),
            ("stream", "false"),
            ("memory", "Auto"),
            ("web_search", "off"),
            ("send_to_llm", "true"),
        ];
        self.post_form(thread_id, &form).await
    }

    /// Post a tool result to the thread as a `tool` message.
    pub async fn submit_tool_result(
        &self,
        thread_id: &str,
        tool_call_id: Option<&str>,
        content: &str,
    ) -> Result<Value> {
        let form = [
            ("role", "tool"),
            ("tool_call_id", tool_call_id.unwrap_or_default()),
            ("content", content),
        ];
        self.post_form(thread_id, &form).await
    }

    /// Send `message` and, when the assistant calls a tool, run it and post
    /// the result back.
    ///
    /// `process_video` ends with the assistant's prose summary of the result;
    /// `get_all_stats` returns the result document itself. When the platform
    /// refuses the tool message, the result is sent as a plain message and
    /// that reply is returned.
    pub async fn query(
        &self,
        thread_id: &str,
        message: &str,
        tools: &dyn ToolExecutor,
    ) -> Result<AssistantReply> {
        let response = self.send_message(thread_id, message).await?;
        let calls = tool_calls(&response)?;

        let Some(call) = calls.first() else {
            return Ok(AssistantReply::Text(message_content(&response)));
        };
        if calls.len() > 1 {
            tracing::warn!(
                "Assistant requested {} tool calls; answering the first",
                calls.len()
            );
        }

        let kind = ToolKind::from_name(&call.name)
            .ok_or_else(|| InputError::UnknownTool(call.name.clone()))?;
        tracing::info!("Assistant called {} with {}", call.name, call.arguments);

        let result = tools.execute(call).await;
        if let Err(e) = &result {
            tracing::warn!("Tool {} failed: {e}", call.name);
        }
        let content = result_content(&result);

        if let Err(e) = self
            .submit_tool_result(thread_id, call.id.as_deref(), &content)
            .await
        {
            tracing::warn!("Tool result rejected ({e}); sending it as a message");
            let fallback = format!("Tool {} executed. Result: {content}", call.name);
            let reply = self.send_message(thread_id, &fallback).await?;
            return Ok(AssistantReply::Text(message_content(&reply)));
        }

        match kind {
            ToolKind::GetAllStats => Ok(AssistantReply::Stats(match result {
                Ok(value) => value,
                Err(e) => json!({ "error": e.to_string() }),
            })),
            ToolKind::ProcessVideo => {
                tokio::time::sleep(self.settle).await;
                match self.send_message(thread_id, SUMMARY_REQUEST).await {
                    Ok(reply) => Ok(AssistantReply::Text(message_content(&reply))),
                    Err(e) => {
                        tracing::warn!("Summary request failed: {e}");
                        Ok(AssistantReply::Text(content))
                    }
                }
            }
        }
    }

    /// Have the assistant process each video and remember what it found.
    ///
    /// Returns how many memories were stored. A video that fails is logged
    /// and skipped.
    pub async fn train(
        &self,
        assistant_id: &str,
        thread_id: &str,
        videos: &[PathBuf],
        tools: &dyn ToolExecutor,
    ) -> Result<usize> {
        let mut stored = 0;
        for video in videos {
            let message = format!(
                "Please process the video at {} and identify the main character.",
                video.display()
            );
            let reply = match self.query(thread_id, &message, tools).await {
                Ok(reply) => reply,
                Err(e) => {
                    tracing::warn!("Skipping {}: {e}", video.display());
                    continue;
                }
            };
            let memory = match reply {
                AssistantReply::Text(text) => text,
                AssistantReply::Stats(value) => value.to_string(),
            };
            self.create_memory(assistant_id, &memory).await?;
            stored += 1;
        }
        Ok(stored)
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.endpoint)
    }

    async fn post_json(&self, path: &str, body: &Value) -> Result<Value> {
        let resp = self
            .client
            .post(self.url(path))
            .header("X-API-Key", &self.api_key)
            .header("Content-Type", "application/json")
            .json(body)
            .timeout(self.timeout)
            .send()
            .await
            .map_err(|e| InferenceError::Transport(format!("Backboard request failed: {e}")))?;
        read_response(resp).await
    }

    async fn post_form(&self, thread_id: &str, form: &[(&str, &str)]) -> Result<Value> {
        let resp = self
            .client
            .post(self.url(&format!("/threads/{thread_id}/messages")))
            .header("X-API-Key", &self.api_key)
            .form(form)
            .timeout(self.timeout)
            .send()
            .await
            .map_err(|e| InferenceError::Transport(format!("Backboard request failed: {e}")))?;
        read_response(resp).await
    }
}

async fn read_response(resp: reqwest::Response) -> Result<Value> {
    let status = resp.status().as_u16();
    let text = resp.text().await.map_err(|e| {
        InferenceError::Transport(format!("Failed to read Backboard response: {e}"))
    })?;
    let body = parse_body(&text);

    if !(200..300).contains(&status) {
        return Err(InferenceError::Provider {
            message: error_message_or_body(&body, status),
            status_code: Some(status),
        }
        .into());
    }
    Ok(body)
}

fn tool_calls(response: &Value) -> Result<Vec<ToolCall>> {
    response
        .get("tool_calls")
        .and_then(Value::as_array)
        .map(|calls| calls.iter().map(ToolCall::from_value).collect())
        .unwrap_or_else(|| Ok(Vec::new()))
}

/// The `content` string of a message response, else the whole document.
fn message_content(response: &Value) -> String {
    match response.get("content") {
        Some(Value::String(text)) => text.clone(),
        _ => response.to_string(),
    }
}

/// Videos in `dir` with the given extension, sorted by path.
pub fn training_videos(dir: &Path, extension: &str) -> std::io::Result<Vec<PathBuf>> {
    let mut videos = Vec::new();
    for entry in std::fs::read_dir(dir)? {
        let path = entry?.path();
        let matches = path
            .extension()
            .and_then(|e| e.to_str())
            .is_some_and(|e| e.eq_ignore_ascii_case(extension));
        if matches && path.is_file() {
            videos.push(path);
        }
    }
    videos.sort();
    Ok(videos)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::SpotlightError;
    use async_trait::async_trait;
    use std::sync::Mutex;
    use wiremock::matchers::{body_partial_json, body_string_contains, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    /// Tool runner answering every call with the same result.
    struct StaticTools {
        result: std::result::Result<Value, String>,
        calls: Mutex<Vec<String>>,
    }

    impl StaticTools {
        fn ok(value: Value) -> Self {
            Self {
                result: Ok(value),
                calls: Mutex::new(Vec::new()),
            }
        }

        fn failing(message: &str) -> Self {
            Self {
                result: Err(message.to_string()),
                calls: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl ToolExecutor for StaticTools {
        async fn execute(&self, call: &ToolCall) -> Result<Value> {
            self.calls.lock().unwrap().push(call.name.clone());
            self.result
                .clone()
                .map_err(|m| InputError::InvalidToolArguments(m).into())
        }
    }

    fn client(server: &MockServer) -> AssistantClient {
        AssistantClient::with_endpoint("bb-key", &server.uri())
            .with_settle_delay(Duration::ZERO)
    }

    fn tool_call_response(name: &str) -> Value {
        json!({
            "content": null,
            "tool_calls": [{
                "id": "call_1",
                "type": "function",
                "function": {"name": name, "arguments": "{\"video_path\": \"clip.mp4\"}"}
            }]
        })
    }

    async fn mount_tool_submission(server: &MockServer, status: u16, expected: u64) {
        Mock::given(method("POST"))
            .and(path("/threads/t1/messages"))
            .and(body_string_contains("role=tool"))
            .and(body_string_contains("tool_call_id=call_1"))
            .respond_with(ResponseTemplate::new(status).set_body_json(json!({"status": "ok"})))
            .expect(expected)
            .mount(server)
            .await;
    }

    #[test]
    fn test_from_config_requires_key() {
        let config = AssistantConfig {
            api_key: "${DEFINITELY_NOT_SET_SPOTLIGHT_321}".to_string(),
            ..AssistantConfig::default()
        };
        assert!(matches!(
            AssistantClient::from_config(&config),
            Err(InputError::MissingConfig { .. })
        ));
    }

    #[test]
    fn test_training_videos_filters_and_sorts() {
        let dir = tempfile::tempdir().unwrap();
        for name in ["b.mov", "a.MOV", "notes.txt"] {
            std::fs::write(dir.path().join(name), b"x").unwrap();
        }
        let videos = training_videos(dir.path(), "mov").unwrap();
        let names: Vec<_> = videos
            .iter()
            .map(|p| p.file_name().unwrap().to_str().unwrap())
            .collect();
        assert_eq!(names, vec!["a.MOV", "b.mov"]);
    }

    #[tokio::test]
    async fn test_create_assistant_registers_tools() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/assistants"))
            .and(header("X-API-Key", "bb-key"))
            .and(body_partial_json(json!({"name": "Video Stats Analyzer"})))
            .respond_with(ResponseTemplate::new(201).set_body_json(json!({"assistant_id": "a1"})))
            .expect(1)
            .mount(&server)
            .await;

        let id = client(&server)
            .create_assistant(&AssistantProfile::default())
            .await
            .unwrap();
        assert_eq!(id, "a1");

        let requests = server.received_requests().await.unwrap();
        let body: Value = serde_json::from_slice(&requests[0].body).unwrap();
        assert_eq!(body["tools"], json!(definitions()));
    }

    #[tokio::test]
    async fn test_create_assistant_without_id_is_decode_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/assistants"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"name": "x"})))
            .mount(&server)
            .await;

        let err = client(&server)
            .create_assistant(&AssistantProfile::default())
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            SpotlightError::Inference(InferenceError::Decode(_))
        ));
    }

    #[tokio::test]
    async fn test_thread_and_memories() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/assistants/a1/threads"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"thread_id": "t1"})))
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/assistants/a1/memories"))
            .and(body_partial_json(json!({"content": "the chef", "metadata": {"type": "string"}})))
            .respond_with(ResponseTemplate::new(201).set_body_json(json!({"memory_id": "m1"})))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/assistants/a1/memories"))
            .and(header("X-API-Key", "bb-key"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({"memories": [{"content": "the chef"}]})),
            )
            .mount(&server)
            .await;

        let client = client(&server);
        assert_eq!(client.create_thread("a1").await.unwrap(), "t1");
        assert_eq!(
            client.create_memory("a1", "the chef").await.unwrap()["memory_id"],
            "m1"
        );
        assert_eq!(
            client.memories("a1").await.unwrap()["memories"][0]["content"],
            "the chef"
        );
    }

    #[tokio::test]
    async fn test_plain_message_reply() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/threads/t1/messages"))
            .and(body_string_contains("llm_provider=google"))
            .and(body_string_contains("model_name=gemini-2.5-flash"))
            .and(body_string_contains("memory=Auto"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"content": "hello"})))
            .expect(1)
            .mount(&server)
            .await;

        let tools = StaticTools::ok(json!({}));
        let reply = client(&server).query("t1", "hi", &tools).await.unwrap();

        assert_eq!(reply, AssistantReply::Text("hello".to_string()));
        assert!(tools.calls.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_get_all_stats_returns_tool_result() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/threads/t1/messages"))
            .and(body_string_contains("send_to_llm=true"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(tool_call_response("get_all_stats")),
            )
            .expect(1)
            .mount(&server)
            .await;
        mount_tool_submission(&server, 200, 1).await;

        let stats = json!({"describe": {"players": 22}});
        let tools = StaticTools::ok(stats.clone());
        let reply = client(&server)
            .query("t1", "all stats please", &tools)
            .await
            .unwrap();

        assert_eq!(reply, AssistantReply::Stats(stats));
        assert_eq!(*tools.calls.lock().unwrap(), vec!["get_all_stats"]);
    }

    #[tokio::test]
    async fn test_process_video_asks_for_summary() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/threads/t1/messages"))
            .and(body_string_contains("content=Process+clip.mp4"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(tool_call_response("process_video")),
            )
            .expect(1)
            .mount(&server)
            .await;
        mount_tool_submission(&server, 200, 1).await;
        Mock::given(method("POST"))
            .and(path("/threads/t1/messages"))
            .and(body_string_contains("content=Please+provide+a+clear+paragraph"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({"content": "The chef is at the stove."})),
            )
            .expect(1)
            .mount(&server)
            .await;

        let tools = StaticTools::ok(json!({"locateMain": "the chef"}));
        let reply = client(&server)
            .query("t1", "Process clip.mp4", &tools)
            .await
            .unwrap();

        assert_eq!(
            reply,
            AssistantReply::Text("The chef is at the stove.".to_string())
        );
    }

    #[tokio::test]
    async fn test_rejected_tool_result_is_sent_as_message() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/threads/t1/messages"))
            .and(body_string_contains("content=Process+clip.mp4"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(tool_call_response("process_video")),
            )
            .mount(&server)
            .await;
        mount_tool_submission(&server, 400, 1).await;
        Mock::given(method("POST"))
            .and(path("/threads/t1/messages"))
            .and(body_string_contains("content=Tool+process_video+executed"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"content": "noted"})))
            .expect(1)
            .mount(&server)
            .await;

        let tools = StaticTools::failing("missing field `video_path`");
        let reply = client(&server)
            .query("t1", "Process clip.mp4", &tools)
            .await
            .unwrap();

        assert_eq!(reply, AssistantReply::Text("noted".to_string()));
    }

    #[tokio::test]
    async fn test_unknown_tool_is_not_submitted() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/threads/t1/messages"))
            .and(body_string_contains("send_to_llm=true"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(tool_call_response("delete_video")),
            )
            .mount(&server)
            .await;
        mount_tool_submission(&server, 200, 0).await;

        let tools = StaticTools::ok(json!({}));
        let err = client(&server).query("t1", "go", &tools).await.unwrap_err();

        assert!(matches!(err, SpotlightError::Input(InputError::UnknownTool(_))));
        assert!(tools.calls.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_http_error_is_provider_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(
                ResponseTemplate::new(401).set_body_json(json!({"error": "Invalid API key"})),
            )
            .mount(&server)
            .await;

        let err = client(&server)
            .query("t1", "hi", &StaticTools::ok(json!({})))
            .await
            .unwrap_err();
        match err {
            SpotlightError::Inference(InferenceError::Provider {
                message,
                status_code,
            }) => {
                assert_eq!(message, "Invalid API key");
                assert_eq!(status_code, Some(401));
            }
            other => panic!("unexpected: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_train_stores_one_memory_per_video() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/threads/t1/messages"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(json!({"content": "the goalkeeper"})),
            )
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/assistants/a1/memories"))
            .and(body_partial_json(json!({"content": "the goalkeeper"})))
            .respond_with(ResponseTemplate::new(201).set_body_json(json!({"memory_id": "m"})))
            .expect(2)
            .mount(&server)
            .await;

        let videos = vec![PathBuf::from("a.mov"), PathBuf::from("b.mov")];
        let stored = client(&server)
            .train("a1", "t1", &videos, &StaticTools::ok(json!({})))
            .await
            .unwrap();
        assert_eq!(stored, 2);
    }
}
