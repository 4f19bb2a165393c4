//! Remote quote source over HTTP.

use std::future::Future;
use std::time::Duration;

use reqwest::StatusCode;
use serde::Deserialize;
use serde_json::Value;

use super::{SyncError, SyncResult};
use crate::models::{Quote, QuoteId};
use crate::util::{error_excerpt, is_http_url, normalize_text_option};

/// Category given to every quote ingested from the remote source.
pub const SERVER_CATEGORY: &str = "Server";

/// Default remote endpoint used for both reads and writes.
pub const DEFAULT_REMOTE_URL: &str = "https://jsonplaceholder.typicode.com/posts";

const DEFAULT_HTTP_TIMEOUT_SECS: u64 = 10;

/// A record as returned by the remote source.
///
/// Only the id and a title-like field are consumed; everything else the
/// endpoint sends is ignored.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct RemoteRecord {
    #[serde(default)]
    pub id: Option<QuoteId>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub text: Option<String>,
    #[serde(default)]
    pub body: Option<String>,
}

impl RemoteRecord {
    /// Map into a quote stamped with `fetched_at`.
    ///
    /// Returns `None` for records without an id or any usable text.
    pub fn into_quote(self, fetched_at: i64) -> Option<Quote> {
        let id = self.id?;
        let text = normalize_text_option(self.title)
            .or_else(|| normalize_text_option(self.text))
            .or_else(|| normalize_text_option(self.body))?;

        Some(
            Quote::new(text)
                .with_id(id)
                .with_category(SERVER_CATEGORY)
                .with_updated_at(fetched_at),
        )
    }
}

/// Read/write access to the remote quote source.
pub trait RemoteSource: Send + Sync {
    /// Fetch every record the source currently exposes
    fn fetch_records(&self) -> impl Future<Output = SyncResult<Vec<RemoteRecord>>> + Send;

    /// Send one locally created quote
    fn push_quote(&self, quote: &Quote) -> impl Future<Output = SyncResult<()>> + Send;
}

/// JSON-over-HTTP remote source.
#[derive(Debug, Clone)]
pub struct HttpRemoteSource {
    fetch_url: String,
    push_url: String,
    client: reqwest::Client,
}

impl HttpRemoteSource {
    /// Create a source reading from `fetch_url` and posting to `push_url`.
    pub fn new(fetch_url: impl Into<String>, push_url: impl Into<String>) -> SyncResult<Self> {
        Self::with_timeout(
            fetch_url,
            push_url,
            Duration::from_secs(DEFAULT_HTTP_TIMEOUT_SECS),
        )
    }

    pub fn with_timeout(
        fetch_url: impl Into<String>,
        push_url: impl Into<String>,
        timeout: Duration,
    ) -> SyncResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|error| {
                SyncError::InvalidConfiguration(format!("failed to build HTTP client: {error}"))
            })?;

        Ok(Self {
            fetch_url: normalize_endpoint(fetch_url.into())?,
            push_url: normalize_endpoint(push_url.into())?,
            client,
        })
    }

    pub fn fetch_url(&self) -> &str {
        &self.fetch_url
    }

    pub fn push_url(&self) -> &str {
        &self.push_url
    }
}

impl RemoteSource for HttpRemoteSource {
    async fn fetch_records(&self) -> SyncResult<Vec<RemoteRecord>> {
        let response = self
            .client
            .get(&self.fetch_url)
            .header(reqwest::header::ACCEPT, "application/json")
            .send()
            .await
            .map_err(|error| SyncError::RemoteFetch(format!("request failed: {error}")))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(SyncError::RemoteFetch(parse_api_error(status, &body)));
        }

        let payload = response
            .json::<Value>()
            .await
            .map_err(|error| SyncError::RemoteFetch(format!("invalid response body: {error}")))?;
        decode_records(payload)
    }

    async fn push_quote(&self, quote: &Quote) -> SyncResult<()> {
        let response = self
            .client
            .post(&self.push_url)
            .header(reqwest::header::ACCEPT, "application/json")
            .json(quote)
            .send()
            .await
            .map_err(|error| SyncError::RemotePush(format!("request failed: {error}")))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(SyncError::RemotePush(parse_api_error(status, &body)));
        }

        Ok(())
    }
}

/// Decode a fetch payload, skipping elements that are not record-shaped.
pub fn decode_records(payload: Value) -> SyncResult<Vec<RemoteRecord>> {
    let Value::Array(elements) = payload else {
        return Err(SyncError::RemoteFetch(
            "expected a JSON array of records".to_string(),
        ));
    };

    Ok(elements
        .into_iter()
        .filter_map(|element| match serde_json::from_value::<RemoteRecord>(element) {
            Ok(record) => Some(record),
            Err(error) => {
                tracing::debug!("Skipping remote record: {error}");
                None
            }
        })
        .collect())
}

#[derive(Debug, Deserialize)]
struct RemoteErrorBody {
    error: Option<String>,
    message: Option<String>,
}

fn parse_api_error(status: StatusCode, body: &str) -> String {
    if let Ok(payload) = serde_json::from_str::<RemoteErrorBody>(body) {
        if let Some(message) = payload.message.or(payload.error) {
            return format!("{} ({})", message.trim(), status.as_u16());
        }
    }

    let trimmed = error_excerpt(body);
    if trimmed.is_empty() {
        format!("HTTP {}", status.as_u16())
    } else {
        format!("{} ({})", trimmed, status.as_u16())
    }
}

pub(crate) fn normalize_endpoint(raw: String) -> SyncResult<String> {
    let endpoint = normalize_text_option(Some(raw)).ok_or_else(|| {
        SyncError::InvalidConfiguration("endpoint must not be empty".to_string())
    })?;
    if is_http_url(&endpoint) {
        Ok(endpoint.trim_end_matches('/').to_string())
    } else {
        Err(SyncError::InvalidConfiguration(
            "endpoint must include http:// or https://".to_string(),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn record_maps_title_to_server_quote() {
        let record = RemoteRecord {
            id: Some(QuoteId::Int(4)),
            title: Some(" eum et est occaecati ".to_string()),
            body: Some("ignored".to_string()),
            ..RemoteRecord::default()
        };

        assert_eq!(
            record.into_quote(1_234),
            Some(
                Quote::new("eum et est occaecati")
                    .with_id(4)
                    .with_category("Server")
                    .with_updated_at(1_234)
            )
        );
    }

    #[test]
    fn record_without_id_or_text_is_skipped() {
        let no_id = RemoteRecord {
            title: Some("title".to_string()),
            ..RemoteRecord::default()
        };
        assert_eq!(no_id.into_quote(1), None);

        let no_text = RemoteRecord {
            id: Some(QuoteId::Int(1)),
            title: Some("   ".to_string()),
            ..RemoteRecord::default()
        };
        assert_eq!(no_text.into_quote(1), None);
    }

    #[test]
    fn record_falls_back_to_text_field() {
        let record: RemoteRecord =
            serde_json::from_value(json!({ "id": "q1", "text": "Be curious." })).unwrap();
        let quote = record.into_quote(5).unwrap();
        assert_eq!(quote.text, "Be curious.");
        assert_eq!(quote.id, Some(QuoteId::Text("q1".to_string())));
    }

    #[test]
    fn decode_records_skips_non_objects() {
        let records = decode_records(json!([
            { "userId": 1, "id": 1, "title": "one", "body": "b" },
            42,
            { "id": 2, "title": "two" }
        ]))
        .unwrap();

        assert_eq!(records.len(), 2);
        assert_eq!(records[1].title.as_deref(), Some("two"));
    }

    #[test]
    fn decode_records_rejects_non_array() {
        let error = decode_records(json!({ "id": 1 })).unwrap_err();
        assert!(matches!(error, SyncError::RemoteFetch(_)));
    }

    #[test]
    fn normalize_endpoint_rejects_invalid_values() {
        assert!(normalize_endpoint(String::new()).is_err());
        assert!(normalize_endpoint("api.example.com".to_string()).is_err());
        assert_eq!(
            normalize_endpoint(" https://api.example.com/posts/ ".to_string()).unwrap(),
            "https://api.example.com/posts"
        );
    }

    #[test]
    fn parse_api_error_prefers_message_field() {
        assert_eq!(
            parse_api_error(StatusCode::BAD_GATEWAY, r#"{"message":"upstream down"}"#),
            "upstream down (502)"
        );
        assert_eq!(parse_api_error(StatusCode::NOT_FOUND, ""), "HTTP 404");
    }
}
