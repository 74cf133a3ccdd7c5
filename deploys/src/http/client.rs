//! HTTP client implementation

use std::time::Duration;

use async_trait::async_trait;
use deploys_protocol::Envelope;
use reqwest::Client;
use secrecy::{ExposeSecret, SecretString};
use serde_json::Value;
use tracing::{debug, error};
use url::Url;

use crate::errors::ControlError;
use crate::http::invoker::Invoker;

/// Credentials sent with every call
#[derive(Debug, Clone)]
pub enum Credentials {
    Bearer(SecretString),
    Basic { user: String, pass: SecretString },
}

/// HTTP client for a remote control plane
pub struct HttpClient {
    client: Client,
    base_url: Url,
    credentials: Option<Credentials>,
}

impl HttpClient {
    /// Create a new HTTP client
    pub fn new(endpoint: &str, credentials: Option<Credentials>) -> Result<Self, ControlError> {
        let mut base_url = Url::parse(endpoint)
            .map_err(|e| ControlError::Config(format!("invalid endpoint '{}': {}", endpoint, e)))?;
        if !base_url.path().ends_with('/') {
            let path = format!("{}/", base_url.path());
            base_url.set_path(&path);
        }

        let client = Client::builder().timeout(Duration::from_secs(30)).build()?;

        Ok(Self {
            client,
            base_url,
            credentials,
        })
    }

    /// Get the base URL
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// URL of one method
    pub fn method_url(&self, method: &str) -> Result<Url, ControlError> {
        self.base_url
            .join(method)
            .map_err(|e| ControlError::Config(format!("invalid method '{}': {}", method, e)))
    }
}

#[async_trait]
impl Invoker for HttpClient {
    async fn invoke(&self, method: &str, body: Value) -> Result<Value, ControlError> {
        let url = self.method_url(method)?;
        debug!("POST {}", url);

        let mut request = self.client.post(url).json(&body);
        request = match &self.credentials {
            Some(Credentials::Bearer(token)) => request.bearer_auth(token.expose_secret()),
            Some(Credentials::Basic { user, pass }) => {
                request.basic_auth(user, Some(pass.expose_secret()))
            }
            None => request,
        };

        let response = request.send().await?;
        let status = response.status();
        let text = response.text().await?;
        decode_response(status.as_u16(), &text)
    }
}

/// Unwrap an envelope. Bodies that are not envelopes (proxy errors, HTML)
/// surface as server errors carrying the status.
pub fn decode_response(status: u16, text: &str) -> Result<Value, ControlError> {
    let envelope: Envelope<Value> = match serde_json::from_str(text) {
        Ok(envelope) => envelope,
        Err(_) => {
            error!("HTTP POST failed: {} - {}", status, text);
            return Err(ControlError::Server(format!("{}: {}", status, text.trim())));
        }
    };

    match envelope.into_result() {
        Ok(result) => Ok(result.unwrap_or(Value::Null)),
        Err(err) => Err(ControlError::from_api(err)),
    }
}
