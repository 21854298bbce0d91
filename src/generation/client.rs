use crate::core::config::GenerationConfig;
use crate::errors::{RecorderError, Result};
use async_trait::async_trait;
use bytes::Bytes;
use futures::stream::Stream;
use futures::StreamExt;
use reqwest::Client;
use serde::Serialize;
use std::pin::Pin;
use std::time::Duration;
use url::Url;

/// Incremental generated text.
pub type TextStream = Pin<Box<dyn Stream<Item = Result<String>> + Send>>;

/// Service that turns a step descriptor into test code, streamed as text.
#[async_trait]
pub trait GenerationBackend: Send + Sync {
    async fn stream(&self, descriptor: &str) -> Result<TextStream>;
}

#[derive(Debug, Serialize)]
struct GenerationBody<'a> {
    prompt: &'a str,
}

/// Posts the descriptor as `{"prompt": ...}` and reads the plain-text response body.
pub struct HttpGenerationBackend {
    endpoint: Url,
    http_client: Client,
}

impl HttpGenerationBackend {
    pub fn new(config: &GenerationConfig) -> Result<Self> {
        let endpoint = Url::parse(&config.endpoint)?;
        let http_client = Client::builder()
            .timeout(Duration::from_millis(config.timeout_ms))
            .build()?;

        Ok(Self {
            endpoint,
            http_client,
        })
    }

    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }
}

#[async_trait]
impl GenerationBackend for HttpGenerationBackend {
    async fn stream(&self, descriptor: &str) -> Result<TextStream> {
        tracing::debug!(endpoint = %self.endpoint, bytes = descriptor.len(), "posting descriptor");

        let response = self
            .http_client
            .post(self.endpoint.clone())
            .json(&GenerationBody { prompt: descriptor })
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(RecorderError::GenerationStatus { status, body });
        }

        Ok(decode_text_stream(response.bytes_stream()))
    }
}

/// Turns a byte stream into text chunks, holding back bytes of a character that
/// was split across network chunks. Empty chunks are skipped.
pub fn decode_text_stream<S, E>(stream: S) -> TextStream
where
    S: Stream<Item = std::result::Result<Bytes, E>> + Send + 'static,
    E: Into<RecorderError>,
{
    let mut decoder = Utf8Decoder::default();
    Box::pin(
        stream
            .map(move |chunk| chunk.map(|bytes| decoder.push(&bytes)).map_err(Into::into))
            .filter(|item| futures::future::ready(!matches!(item, Ok(text) if text.is_empty()))),
    )
}

#[derive(Debug, Default)]
struct Utf8Decoder {
    pending: Vec<u8>,
}

impl Utf8Decoder {
    fn push(&mut self, bytes: &[u8]) -> String {
        self.pending.extend_from_slice(bytes);
        match std::str::from_utf8(&self.pending) {
            Ok(text) => {
                let text = text.to_string();
                self.pending.clear();
                text
            }
            // Incomplete trailing sequence: emit the valid prefix, keep the rest.
            Err(e) if e.error_len().is_none() => {
                let valid = e.valid_up_to();
                let text = String::from_utf8_lossy(&self.pending[..valid]).into_owned();
                self.pending.drain(..valid);
                text
            }
            Err(_) => {
                let text = String::from_utf8_lossy(&self.pending).into_owned();
                self.pending.clear();
                text
            }
        }
    }
}
