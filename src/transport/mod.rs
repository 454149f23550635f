//! HTTP transport for ChatKit requests.
//!
//! The conversation core never talks to the network; it hands a
//! [`ChatKitRequest`] to a [`Transport`] and gets an [`HttpReply`] back.

use std::future::Future;
use std::pin::Pin;

use reqwest::Client;
use reqwest::header::{CONTENT_TYPE, HeaderMap, HeaderName, HeaderValue};
use tracing::debug;
use url::Url;

use crate::common::config::ApiConfig;
use crate::common::errors::{ChatError, ChatResult};
use crate::conversation::exchange::HttpReply;
use crate::conversation::request::ChatKitRequest;
use crate::decoder::ResponseBody;

#[cfg(test)]
pub(crate) mod testing;

/// Header carrying the domain key.
const DOMAIN_KEY_HEADER: &str = "x-domain-key";

/// Boxed future type for transport operations.
pub type TransportFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// Sends ChatKit requests and returns the raw reply.
pub trait Transport: Send + Sync {
    /// Send one request.
    ///
    /// Non-2xx statuses are returned as replies, not errors.
    ///
    /// # Errors
    /// Returns an error if no HTTP reply was received.
    fn send<'a>(&'a self, request: &'a ChatKitRequest) -> TransportFuture<'a, ChatResult<HttpReply>>;
}

/// `reqwest`-backed transport posting to `{base_url}/api/chatkit`.
#[derive(Clone, Debug)]
pub struct HttpTransport {
    client: Client,
    endpoint: Url,
}

impl HttpTransport {
    /// Build a transport from the API config.
    ///
    /// # Errors
    /// Returns an error if the endpoint URL or domain key is invalid, or the
    /// HTTP client cannot be built.
    pub fn new(config: &ApiConfig) -> ChatResult<Self> {
        let endpoint = config.endpoint_url()?;

        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        if let Some(key) = &config.domain_key {
            let value = HeaderValue::from_str(key)
                .map_err(|e| ChatError::InvalidConfig(format!("invalid domain key: {e}")))?;
            headers.insert(HeaderName::from_static(DOMAIN_KEY_HEADER), value);
        }

        let client = Client::builder()
            .default_headers(headers)
            .connect_timeout(config.connect_timeout)
            .timeout(config.request_timeout)
            .build()?;

        Ok(Self { client, endpoint })
    }

    /// Endpoint requests are posted to.
    #[must_use]
    pub const fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    async fn post(&self, request: &ChatKitRequest) -> ChatResult<HttpReply> {
        let payload = serde_json::to_string(request)?;
        debug!(endpoint = %self.endpoint, %payload, "sending ChatKit request");

        let response = self
            .client
            .post(self.endpoint.clone())
            .json(request)
            .send()
            .await?;
        let status = response.status().as_u16();
        let raw = response.text().await?;

        let reply = HttpReply::new(status, ResponseBody::from_raw(raw));
        debug!(status, success = reply.is_success(), has_body = reply.body.is_some(), "ChatKit reply received");
        Ok(reply)
    }
}

impl Transport for HttpTransport {
    fn send<'a>(&'a self, request: &'a ChatKitRequest) -> TransportFuture<'a, ChatResult<HttpReply>> {
        Box::pin(self.post(request))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transport_uses_chatkit_endpoint() {
        let config = ApiConfig::new("wf-1")
            .with_base_url("http://127.0.0.1:8000/")
            .with_domain_key("domain_pk_test");
        let transport = HttpTransport::new(&config).expect("transport");
        assert_eq!(transport.endpoint().as_str(), "http://127.0.0.1:8000/api/chatkit");
    }

    #[test]
    fn test_transport_rejects_invalid_domain_key() {
        let config = ApiConfig::new("wf-1").with_domain_key("bad\nkey");
        assert!(matches!(
            HttpTransport::new(&config),
            Err(ChatError::InvalidConfig(_))
        ));
    }

    #[test]
    fn test_transport_rejects_invalid_base_url() {
        let config = ApiConfig::new("wf-1").with_base_url("not a url");
        assert!(matches!(HttpTransport::new(&config), Err(ChatError::Url(_))));
    }
}
