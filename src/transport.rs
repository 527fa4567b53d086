use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::future::Future;
use std::pin::Pin;
use tracing::warn;

pub const FAILURE_GLYPH: &str = "❌";

#[derive(Debug, Clone, Serialize)]
pub struct TranslationResult {
    pub success: bool,
    pub translated_text: String,
    pub status_label: String,
}

impl TranslationResult {
    pub fn failure(detail: impl Into<String>) -> Self {
        Self {
            success: false,
            translated_text: String::new(),
            status_label: format!("{} {}", FAILURE_GLYPH, detail.into()),
        }
    }
}

pub type TransportFuture = Pin<Box<dyn Future<Output = TranslationResult> + Send>>;

pub trait Transport: Send + Sync {
    fn translate(&self, text: &str, engine: &str) -> TransportFuture;
}

#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: reqwest::Client,
    endpoint: String,
}

impl HttpTransport {
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            endpoint: endpoint.into(),
        }
    }
}

impl Transport for HttpTransport {
    fn translate(&self, text: &str, engine: &str) -> TransportFuture {
        let client = self.client.clone();
        let endpoint = self.endpoint.clone();
        let text = text.to_string();
        let engine = engine.to_string();
        Box::pin(async move {
            match send_request(&client, &endpoint, &text, &engine).await {
                Ok(result) => result,
                Err(err) => {
                    warn!("translation request failed: {:#}", err);
                    TranslationResult::failure(format!("{:#}", err))
                }
            }
        })
    }
}

async fn send_request(
    client: &reqwest::Client,
    endpoint: &str,
    text: &str,
    engine: &str,
) -> Result<TranslationResult> {
    let response = client
        .post(endpoint)
        .json(&TranslateRequest { text, engine })
        .send()
        .await
        .with_context(|| "failed to reach translation backend")?;

    let status = response.status();
    if !status.is_success() {
        return Ok(TranslationResult::failure(format!(
            "HTTP {}",
            status.as_u16()
        )));
    }

    let body = response
        .text()
        .await
        .with_context(|| "failed to read translation reply")?;
    parse_reply(&body)
}

pub(crate) fn parse_reply(body: &str) -> Result<TranslationResult> {
    let reply: TranslateReply =
        serde_json::from_str(body).with_context(|| "failed to parse translation reply")?;
    Ok(TranslationResult {
        success: true,
        translated_text: reply.translated,
        status_label: reply.status,
    })
}

#[derive(Debug, Serialize)]
struct TranslateRequest<'a> {
    text: &'a str,
    engine: &'a str,
}

#[derive(Debug, Deserialize)]
struct TranslateReply {
    #[serde(default)]
    translated: String,
    #[serde(default)]
    status: String,
}
