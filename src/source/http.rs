//! HTTP エンドポイントのソース

use super::{parse_identity_document, IdentitySnapshot, IdentitySource};
use crate::error::{Result, VcimError};
use reqwest::Client;
use std::future::Future;
use std::pin::Pin;
use std::time::Duration;

const USER_AGENT: &str = "vcim-cli";

/// JSON アイデンティティ文書を HTTP GET で取得するソース
#[derive(Debug, Clone)]
pub struct HttpSource {
    endpoint: String,
    client: Client,
}

impl HttpSource {
    pub fn new(endpoint: impl Into<String>, timeout: Option<Duration>) -> Self {
        let mut builder = Client::builder().user_agent(USER_AGENT);
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }

        Self {
            endpoint: endpoint.into(),
            client: builder.build().unwrap_or_else(|_| Client::new()),
        }
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    async fn fetch(&self) -> Result<IdentitySnapshot> {
        let response = self
            .client
            .get(&self.endpoint)
            .send()
            .await
            .map_err(|e| VcimError::unavailable(self.describe(), e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(VcimError::unavailable(
                self.describe(),
                format!("HTTP {}", status.as_u16()),
            ));
        }

        let body = response.text().await?;
        parse_identity_document(&self.describe(), &body)
    }
}

impl IdentitySource for HttpSource {
    fn describe(&self) -> String {
        self.endpoint.clone()
    }

    fn list_identities(&self) -> Pin<Box<dyn Future<Output = Result<IdentitySnapshot>> + Send + '_>> {
        Box::pin(self.fetch())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_connection_refused_is_unavailable() {
        // 予約済みポート 9 (discard) は通常リッスンされていない
        let source = HttpSource::new("http://127.0.0.1:9/ids.json", Some(Duration::from_secs(2)));

        let err = source.list_identities().await.unwrap_err();
        assert!(matches!(err, VcimError::SourceUnavailable { .. }));
        assert!(err.is_retryable());
    }

    #[test]
    fn test_describe_is_endpoint() {
        let source = HttpSource::new("https://example.org/ids.json", None);
        assert_eq!(source.describe(), "https://example.org/ids.json");
        assert_eq!(source.endpoint(), "https://example.org/ids.json");
    }
}
