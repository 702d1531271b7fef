use async_trait::async_trait;
use std::time::Duration;
use tracing::{field::Empty, instrument, Span};
use url::Url;

use crate::contract::model::SearchResult;
use crate::domain::error::DomainError;
use crate::domain::ports::RemoteSearchPort;
use crate::infra::dto::decode_search_payload;

/// Upper bound for a single backend call.
pub const DEFAULT_REMOTE_TIMEOUT: Duration = Duration::from_secs(8);

pub const SEARCH_PATH: [&str; 4] = ["api", "v1", "users", "search"];
pub const LOAD_PATH: [&str; 4] = ["api", "v1", "users", "load"];

/// HTTP adapter implementing the RemoteSearchPort against
/// `GET <base>/api/v1/users/search` and `POST <base>/api/v1/users/load`.
#[derive(Debug, Clone)]
pub struct HttpSearchClient {
    client: reqwest::Client,
    base: Url,
}

impl HttpSearchClient {
    /// Build a client for `base_url` with a fixed per-request timeout.
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, DomainError> {
        let base = Url::parse(base_url.trim())
            .map_err(|e| DomainError::invalid_base_url(base_url, e.to_string()))?;
        if base.cannot_be_a_base() {
            return Err(DomainError::invalid_base_url(base_url, "not a base URL"));
        }
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| DomainError::invalid_base_url(base_url, e.to_string()))?;
        Ok(Self { client, base })
    }

    pub fn base_url(&self) -> &Url {
        &self.base
    }

    fn endpoint(&self, segments: &[&str]) -> Url {
        let mut url = self.base.clone();
        // cannot_be_a_base was rejected in `new`
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }
}

#[async_trait]
impl RemoteSearchPort for HttpSearchClient {
    #[instrument(
        name = "user_search.http.search",
        skip_all,
        fields(base = %self.base, limit = limit, http.status_code = Empty, otel.kind = "client")
    )]
    async fn search_remote(&self, query: &str, limit: usize) -> Result<SearchResult, DomainError> {
        let mut url = self.endpoint(&SEARCH_PATH);
        url.query_pairs_mut()
            .append_pair("q", query)
            .append_pair("limit", &limit.to_string());

        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| DomainError::remote_search(e.to_string()))?;

        let status = response.status();
        Span::current().record("http.status_code", status.as_u16());
        if !status.is_success() {
            return Err(DomainError::remote_search(format!("HTTP {status}")));
        }

        let body = response
            .bytes()
            .await
            .map_err(|e| DomainError::remote_search(e.to_string()))?;

        decode_search_payload(&body)
    }

    #[instrument(
        name = "user_search.http.load",
        skip_all,
        fields(base = %self.base, http.status_code = Empty, otel.kind = "client")
    )]
    async fn load_remote(&self) -> Result<(), DomainError> {
        let url = self.endpoint(&LOAD_PATH);

        let response = self
            .client
            .post(url)
            .header(reqwest::header::CONTENT_LENGTH, 0)
            .send()
            .await
            .map_err(|e| DomainError::remote_load(e.to_string()))?;

        let status = response.status();
        Span::current().record("http.status_code", status.as_u16());
        if !status.is_success() {
            return Err(DomainError::remote_load(format!("HTTP {status}")));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn endpoint_keeps_base_prefix() {
        let c = HttpSearchClient::new("http://host:9000/gateway/", DEFAULT_REMOTE_TIMEOUT).unwrap();
        assert_eq!(
            c.endpoint(&SEARCH_PATH).as_str(),
            "http://host:9000/gateway/api/v1/users/search"
        );

        let c = HttpSearchClient::new("http://host:9000", DEFAULT_REMOTE_TIMEOUT).unwrap();
        assert_eq!(
            c.endpoint(&LOAD_PATH).as_str(),
            "http://host:9000/api/v1/users/load"
        );
    }

    #[test]
    fn rejects_invalid_base() {
        for bad in ["not a url", "mailto:ops@example.com"] {
            let err = HttpSearchClient::new(bad, DEFAULT_REMOTE_TIMEOUT).unwrap_err();
            assert!(matches!(err, DomainError::InvalidBaseUrl { .. }), "{bad}");
        }
    }
}
