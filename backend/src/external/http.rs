//! HTTP transport shared by the provider clients
//!
//! Bounded timeout, at most one retry on timeout or connection failure.
//! Every failure leaves this module as a [`TransportCause`].

use std::time::Duration;

use reqwest::Client;
use serde::de::DeserializeOwned;
use shared::{AdvisorError, AdvisorResult, DataProvider, TransportCause};

use crate::config::HttpConfig;
use crate::error::{AppError, AppResult};

const MAX_ATTEMPTS: u32 = 2;

/// JSON-over-HTTP client for one provider
#[derive(Clone)]
pub struct HttpTransport {
    client: Client,
    provider: DataProvider,
    retry_backoff: Duration,
}

impl HttpTransport {
    pub fn new(provider: DataProvider, config: &HttpConfig) -> AppResult<Self> {
        let client = Client::builder()
            .timeout(config.timeout())
            .build()
            .map_err(|e| AppError::HttpClient(e.to_string()))?;
        Ok(Self {
            client,
            provider,
            retry_backoff: config.retry_backoff(),
        })
    }

    pub fn provider(&self) -> DataProvider {
        self.provider
    }

    /// GET `url` with `query` and decode the body as `T`.
    ///
    /// The query is kept out of logs since it may carry an API key.
    pub async fn get_json<T: DeserializeOwned>(
        &self,
        url: &str,
        query: &[(&str, String)],
    ) -> AdvisorResult<T> {
        let mut attempt = 0;
        loop {
            attempt += 1;
            match self.fetch(url, query).await {
                Ok(body) => {
                    return serde_json::from_slice(&body).map_err(|e| {
                        AdvisorError::unavailable(
                            self.provider,
                            TransportCause::MalformedResponse(e.to_string()),
                        )
                    });
                }
                Err(cause) if cause.is_transient() && attempt < MAX_ATTEMPTS => {
                    tracing::warn!(
                        provider = %self.provider,
                        cause = cause.code(),
                        attempt,
                        "Provider request failed, retrying"
                    );
                    tokio::time::sleep(self.retry_backoff).await;
                }
                Err(cause) => {
                    tracing::warn!(
                        provider = %self.provider,
                        cause = cause.code(),
                        attempt,
                        "Provider request failed"
                    );
                    return Err(AdvisorError::unavailable(self.provider, cause));
                }
            }
        }
    }

    async fn fetch(&self, url: &str, query: &[(&str, String)]) -> Result<Vec<u8>, TransportCause> {
        let response = self
            .client
            .get(url)
            .query(query)
            .send()
            .await
            .map_err(classify)?;

        let status = response.status();
        if !status.is_success() {
            return Err(TransportCause::HttpStatus(status.as_u16()));
        }

        response
            .bytes()
            .await
            .map(|b| b.to_vec())
            .map_err(classify)
    }
}

/// Map a reqwest failure onto the transport cause taxonomy
pub fn classify(err: reqwest::Error) -> TransportCause {
    if err.is_timeout() {
        TransportCause::Timeout
    } else if err.is_connect() {
        TransportCause::Connection
    } else if err.is_decode() || err.is_body() {
        TransportCause::MalformedResponse(err.without_url().to_string())
    } else {
        TransportCause::Request(err.without_url().to_string())
    }
}
