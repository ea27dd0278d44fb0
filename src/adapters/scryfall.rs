//! Scryfall HTTP client.
//!
//! One GET per lookup, no retries. Every outcome, including transport
//! failures, comes back as a [`LookupResult`].

use crate::core::normalize::{extract_image_url, first_search_hit};
use crate::domain::model::{CardObject, LookupRequest, LookupResult, RemoteFailure, SearchResponse};
use crate::domain::ports::{CardLookup, ConfigProvider};
use crate::utils::error::Result;
use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT};
use reqwest::{Client, StatusCode};
use std::time::Duration;

pub const DEFAULT_API_BASE: &str = "https://api.scryfall.com";

pub const DEFAULT_USER_AGENT: &str = concat!("card-image-etl/", env!("CARGO_PKG_VERSION"));

pub const DEFAULT_TIMEOUT_SECS: u64 = 10;

#[derive(Debug, Clone)]
pub struct ScryfallConfig {
    pub api_base: String,
    pub timeout: Duration,
    pub user_agent: String,
}

impl Default for ScryfallConfig {
    fn default() -> Self {
        Self {
            api_base: DEFAULT_API_BASE.to_string(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            user_agent: DEFAULT_USER_AGENT.to_string(),
        }
    }
}

impl ScryfallConfig {
    pub fn from_provider<C: ConfigProvider + ?Sized>(config: &C) -> Self {
        Self {
            api_base: config.api_base().to_string(),
            timeout: config.request_timeout(),
            user_agent: config.user_agent().to_string(),
        }
    }
}

pub struct ScryfallClient {
    client: Client,
    api_base: String,
}

impl ScryfallClient {
    pub fn new(config: ScryfallConfig) -> Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));

        let client = Client::builder()
            .user_agent(config.user_agent)
            .default_headers(headers)
            .timeout(config.timeout)
            .build()?;

        Ok(Self {
            client,
            api_base: config.api_base.trim_end_matches('/').to_string(),
        })
    }

    /// 請求對應的完整網址
    pub fn request_url(&self, request: &LookupRequest) -> String {
        match request {
            LookupRequest::ExactLookup {
                set_code,
                collector_number,
            } => format!(
                "{}/cards/{}/{}",
                self.api_base,
                urlencoding::encode(set_code),
                urlencoding::encode(collector_number)
            ),
            LookupRequest::SearchQuery { .. } => format!(
                "{}/cards/search?q={}",
                self.api_base,
                request.encoded_query().unwrap_or_default()
            ),
        }
    }
}

#[async_trait]
impl CardLookup for ScryfallClient {
    async fn lookup(&self, request: &LookupRequest) -> LookupResult {
        let url = self.request_url(request);
        tracing::debug!("Making API request to: {}", url);

        let response = match self.client.get(&url).send().await {
            Ok(response) => response,
            Err(e) => {
                return LookupResult::RemoteError(RemoteFailure::Transport(e.to_string()));
            }
        };

        let status = response.status();
        tracing::debug!("API response status: {}", status);

        // 查無卡片與搜尋零筆，Scryfall 都回 404
        if status == StatusCode::NOT_FOUND {
            return LookupResult::NotFound;
        }
        if !status.is_success() {
            return LookupResult::RemoteError(RemoteFailure::Status(status.as_u16()));
        }

        match request {
            LookupRequest::ExactLookup { .. } => match response.json::<CardObject>().await {
                Ok(card) => extract_image_url(&card),
                Err(e) => LookupResult::RemoteError(RemoteFailure::Transport(format!(
                    "invalid card payload: {}",
                    e
                ))),
            },
            LookupRequest::SearchQuery { .. } => match response.json::<SearchResponse>().await {
                Ok(results) => {
                    tracing::debug!(
                        "Search returned {} cards (total {:?})",
                        results.data.len(),
                        results.total_cards
                    );
                    first_search_hit(&results)
                }
                Err(e) => LookupResult::RemoteError(RemoteFailure::Transport(format!(
                    "invalid search payload: {}",
                    e
                ))),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use httpmock::prelude::*;

    fn client_for(server: &MockServer) -> ScryfallClient {
        ScryfallClient::new(ScryfallConfig {
            api_base: server.base_url(),
            timeout: Duration::from_secs(5),
            user_agent: "card-image-etl-tests".to_string(),
        })
        .unwrap()
    }

    fn search(query: &str) -> LookupRequest {
        LookupRequest::SearchQuery {
            query: query.to_string(),
        }
    }

    #[test]
    fn test_request_urls() {
        let client = ScryfallClient::new(ScryfallConfig {
            api_base: "https://api.scryfall.com/".to_string(),
            ..Default::default()
        })
        .unwrap();

        assert_eq!(
            client.request_url(&search("Lightning Bolt set:lea")),
            "https://api.scryfall.com/cards/search?q=Lightning%20Bolt%20set%3Alea"
        );
        assert_eq!(
            client.request_url(&LookupRequest::ExactLookup {
                set_code: "clb".to_string(),
                collector_number: "123★".to_string(),
            }),
            "https://api.scryfall.com/cards/clb/123%E2%98%85"
        );
    }

    #[tokio::test]
    async fn test_exact_lookup_returns_normal_image() {
        let server = MockServer::start();
        let api_mock = server.mock(|when, then| {
            when.method(GET)
                .path("/cards/clb/123")
                .header("User-Agent", "card-image-etl-tests");
            then.status(200)
                .header("Content-Type", "application/json")
                .json_body(serde_json::json!({
                    "object": "card",
                    "name": "Counterspell",
                    "image_uris": {"normal": "https://cards.scryfall.io/normal/clb-123.jpg"}
                }));
        });

        let request = LookupRequest::ExactLookup {
            set_code: "clb".to_string(),
            collector_number: "123".to_string(),
        };
        let result = client_for(&server).lookup(&request).await;

        api_mock.assert();
        assert_eq!(
            result.image_url(),
            Some("https://cards.scryfall.io/normal/clb-123.jpg")
        );
    }

    #[tokio::test]
    async fn test_search_uses_first_result() {
        let server = MockServer::start();
        let api_mock = server.mock(|when, then| {
            when.method(GET)
                .path("/cards/search")
                .query_param("q", "Lightning Bolt set:lea");
            then.status(200)
                .header("Content-Type", "application/json")
                .json_body(serde_json::json!({
                    "object": "list",
                    "total_cards": 2,
                    "data": [
                        {"image_uris": {"normal": "https://img/first.jpg"}},
                        {"image_uris": {"normal": "https://img/second.jpg"}}
                    ]
                }));
        });

        let result = client_for(&server)
            .lookup(&search("Lightning Bolt set:lea"))
            .await;

        api_mock.assert();
        assert_eq!(result.image_url(), Some("https://img/first.jpg"));
    }

    #[tokio::test]
    async fn test_double_faced_card_from_search() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET).path("/cards/search");
            then.status(200).json_body(serde_json::json!({
                "data": [{
                    "card_faces": [
                        {"image_uris": {"normal": "https://img/front.jpg"}},
                        {"image_uris": {"normal": "https://img/back.jpg"}}
                    ]
                }]
            }));
        });

        let result = client_for(&server)
            .lookup(&search("Delver of Secrets set:isd"))
            .await;
        assert_eq!(result.image_url(), Some("https://img/front.jpg"));
    }

    #[tokio::test]
    async fn test_empty_search_is_not_found() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET).path("/cards/search");
            then.status(200).json_body(serde_json::json!({"data": []}));
        });

        let result = client_for(&server).lookup(&search("Nothing set:xyz")).await;
        assert_eq!(result, LookupResult::NotFound);
    }

    #[tokio::test]
    async fn test_search_404_is_not_found() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET).path("/cards/search");
            then.status(404).json_body(serde_json::json!({
                "object": "error",
                "code": "not_found",
                "status": 404,
                "details": "Your query didn't match any cards."
            }));
        });

        let result = client_for(&server).lookup(&search("Nothing set:xyz")).await;
        assert_eq!(result, LookupResult::NotFound);
    }

    #[tokio::test]
    async fn test_server_error_is_remote_error() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET).path("/cards/search");
            then.status(500);
        });

        let result = client_for(&server).lookup(&search("Opt set:xln")).await;
        assert_eq!(result, LookupResult::RemoteError(RemoteFailure::Status(500)));
    }

    #[tokio::test]
    async fn test_malformed_payload_is_transport_error() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET).path("/cards/m21/1");
            then.status(200).body("<html>not json</html>");
        });

        let request = LookupRequest::ExactLookup {
            set_code: "m21".to_string(),
            collector_number: "1".to_string(),
        };
        let result = client_for(&server).lookup(&request).await;
        assert!(matches!(
            result,
            LookupResult::RemoteError(RemoteFailure::Transport(_))
        ));
    }

    #[tokio::test]
    async fn test_connection_failure_is_transport_error() {
        let client = ScryfallClient::new(ScryfallConfig {
            api_base: "http://127.0.0.1:1".to_string(),
            timeout: Duration::from_secs(2),
            user_agent: "card-image-etl-tests".to_string(),
        })
        .unwrap();

        let result = client.lookup(&search("Opt set:xln")).await;
        assert!(matches!(
            result,
            LookupResult::RemoteError(RemoteFailure::Transport(_))
        ));
    }
}
