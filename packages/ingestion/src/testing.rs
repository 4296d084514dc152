//! Mock implementations for testing.
//!
//! `MockFetcher` serves canned responses and records every requested URL;
//! `MockAnalyzer` plays back a script of payloads or errors. Both are used
//! by the unit tests here and the integration tests under `tests/`.

use std::collections::VecDeque;
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;

use crate::ai::{AiPayload, AnalysisPrompt, Analyzer};
use crate::error::{ApiError, FetchError, FetchResult, Result};
use crate::fetcher::{ContentFetcher, FetchedText};

enum CannedResponse {
    Text(String),
    Bytes(Vec<u8>),
}

/// Fetcher serving canned responses keyed by URL (exact, then prefix
/// match). URLs with no entry fail with a network error.
#[derive(Default)]
pub struct MockFetcher {
    responses: Vec<(String, CannedResponse)>,
    requests: Mutex<Vec<String>>,
}

impl MockFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Serve a text body for a URL.
    pub fn with_text(mut self, url: impl Into<String>, body: impl Into<String>) -> Self {
        self.responses
            .push((url.into(), CannedResponse::Text(body.into())));
        self
    }

    /// Serve a JSON body for a URL.
    pub fn with_json(self, url: impl Into<String>, value: serde_json::Value) -> Self {
        self.with_text(url, value.to_string())
    }

    /// Serve raw bytes for a URL.
    pub fn with_bytes(mut self, url: impl Into<String>, bytes: Vec<u8>) -> Self {
        self.responses.push((url.into(), CannedResponse::Bytes(bytes)));
        self
    }

    /// Every URL requested so far, in order.
    pub fn requests(&self) -> Vec<String> {
        self.requests.lock().unwrap().clone()
    }

    fn lookup(&self, url: &str) -> Option<&CannedResponse> {
        self.requests.lock().unwrap().push(url.to_string());
        self.responses
            .iter()
            .find(|(key, _)| key == url)
            .or_else(|| self.responses.iter().find(|(key, _)| url.starts_with(key.as_str())))
            .map(|(_, response)| response)
    }

    fn miss(url: &str) -> FetchError {
        FetchError::Network {
            url: url.to_string(),
            message: "no canned response".to_string(),
        }
    }
}

#[async_trait]
impl ContentFetcher for MockFetcher {
    async fn fetch_text(&self, url: &str, _timeout: Duration) -> FetchResult<FetchedText> {
        match self.lookup(url) {
            Some(CannedResponse::Text(body)) => Ok(FetchedText {
                body: body.clone(),
                final_url: url.to_string(),
                content_type: None,
            }),
            Some(CannedResponse::Bytes(bytes)) => Ok(FetchedText {
                body: String::from_utf8_lossy(bytes).into_owned(),
                final_url: url.to_string(),
                content_type: None,
            }),
            None => Err(Self::miss(url)),
        }
    }

    async fn fetch_bytes(&self, url: &str, _timeout: Duration) -> FetchResult<Vec<u8>> {
        match self.lookup(url) {
            Some(CannedResponse::Text(body)) => Ok(body.clone().into_bytes()),
            Some(CannedResponse::Bytes(bytes)) => Ok(bytes.clone()),
            None => Err(Self::miss(url)),
        }
    }
}

/// Analyzer playing back a script of payloads or errors.
///
/// Each `analyze` call pops the next scripted entry; an empty script
/// yields [`AiPayload::None`]. Prompts are recorded for inspection.
pub struct MockAnalyzer {
    script: Mutex<VecDeque<Result<AiPayload>>>,
    prompts: Mutex<Vec<AnalysisPrompt>>,
    embedding: Result<Vec<f32>>,
    embed_calls: Mutex<usize>,
}

impl Default for MockAnalyzer {
    fn default() -> Self {
        Self::new()
    }
}

impl MockAnalyzer {
    pub fn new() -> Self {
        Self {
            script: Mutex::new(VecDeque::new()),
            prompts: Mutex::new(Vec::new()),
            embedding: Ok(vec![0.0; 1536]),
            embed_calls: Mutex::new(0),
        }
    }

    /// Queue a payload for the next `analyze` call.
    pub fn with_payload(self, payload: AiPayload) -> Self {
        self.script.lock().unwrap().push_back(Ok(payload));
        self
    }

    /// Queue a successful tool-call payload from a JSON value.
    pub fn with_tool_call(self, arguments: serde_json::Value) -> Self {
        self.with_payload(AiPayload::ToolCall(arguments))
    }

    /// Queue an error for the next `analyze` call.
    pub fn with_error(self, error: ApiError) -> Self {
        self.script.lock().unwrap().push_back(Err(error));
        self
    }

    /// Set the embedding vector returned by `embed`.
    pub fn with_embedding(mut self, vector: Vec<f32>) -> Self {
        self.embedding = Ok(vector);
        self
    }

    /// Prompts received so far.
    pub fn prompts(&self) -> Vec<AnalysisPrompt> {
        self.prompts.lock().unwrap().clone()
    }

    /// Number of `analyze` calls received.
    pub fn analyze_calls(&self) -> usize {
        self.prompts.lock().unwrap().len()
    }

    /// Number of `embed` calls received.
    pub fn embed_calls(&self) -> usize {
        *self.embed_calls.lock().unwrap()
    }
}

#[async_trait]
impl Analyzer for MockAnalyzer {
    async fn analyze(&self, prompt: &AnalysisPrompt) -> Result<AiPayload> {
        self.prompts.lock().unwrap().push(prompt.clone());
        self.script
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or(Ok(AiPayload::None))
    }

    async fn embed(&self, _text: &str) -> Result<Vec<f32>> {
        *self.embed_calls.lock().unwrap() += 1;
        self.embedding.clone()
    }
}
