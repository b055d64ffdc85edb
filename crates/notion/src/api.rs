//! REST client for the Notion pages endpoint.

use royalty_core::config::NotionConfig;
use serde::{Deserialize, Serialize};

use crate::properties::PayoutProperties;

/// Notion API version pinned for every request.
pub const NOTION_VERSION: &str = "2022-06-28";

/// HTTP client for the Notion API, bound to one target database.
pub struct NotionApi {
    client: reqwest::Client,
    api_url: String,
    token: String,
    database_id: String,
}

/// Page returned by `POST /pages`. Only the fields the sync job uses.
#[derive(Debug, Clone, Deserialize)]
pub struct CreatedPage {
    #[serde(default)]
    pub id: String,
    /// Public URL of the page; empty when the response omits it.
    #[serde(default)]
    pub url: String,
}

/// Errors from the Notion API layer.
#[derive(Debug, thiserror::Error)]
pub enum NotionApiError {
    /// The HTTP request itself failed (network, DNS, TLS, body decode).
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// Notion returned a non-2xx status code.
    #[error("Notion API error ({status}): {body}")]
    Api {
        /// HTTP status code.
        status: u16,
        /// Raw response body for debugging.
        body: String,
    },
}

#[derive(Debug, Serialize)]
struct Parent<'a> {
    database_id: &'a str,
}

#[derive(Debug, Serialize)]
struct CreatePageRequest<'a> {
    parent: Parent<'a>,
    properties: &'a PayoutProperties,
}

impl NotionApi {
    pub fn new(config: &NotionConfig) -> Self {
        Self::with_client(reqwest::Client::new(), config)
    }

    /// Create an API client reusing an existing [`reqwest::Client`].
    pub fn with_client(client: reqwest::Client, config: &NotionConfig) -> Self {
        Self {
            client,
            api_url: config.api_url.clone(),
            token: config.token.clone(),
            database_id: config.database_id.clone(),
        }
    }

    /// Create a page in the configured database.
    ///
    /// Sends `POST /pages` with `{ parent: { database_id }, properties }`.
    pub async fn create_page(
        &self,
        properties: &PayoutProperties,
    ) -> Result<CreatedPage, NotionApiError> {
        let response = self.create_page_request(properties).send().await?;
        let page: CreatedPage = Self::parse_response(response).await?;
        tracing::debug!(page_id = %page.id, url = %page.url, "Notion page created");
        Ok(page)
    }

    fn create_page_request(&self, properties: &PayoutProperties) -> reqwest::RequestBuilder {
        self.client
            .post(format!("{}/pages", self.api_url))
            .bearer_auth(&self.token)
            .header("Notion-Version", NOTION_VERSION)
            .json(&CreatePageRequest {
                parent: Parent {
                    database_id: &self.database_id,
                },
                properties,
            })
    }

    // ---- private helpers ----

    /// Returns the response unchanged on a 2xx status, otherwise a
    /// [`NotionApiError::Api`] with the status and body text.
    async fn ensure_success(
        response: reqwest::Response,
    ) -> Result<reqwest::Response, NotionApiError> {
        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "<unreadable body>".to_string());
            return Err(NotionApiError::Api {
                status: status.as_u16(),
                body,
            });
        }
        Ok(response)
    }

    async fn parse_response<T: serde::de::DeserializeOwned>(
        response: reqwest::Response,
    ) -> Result<T, NotionApiError> {
        let response = Self::ensure_success(response).await?;
        Ok(response.json::<T>().await?)
    }
}
