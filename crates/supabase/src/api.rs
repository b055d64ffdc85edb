//! REST client for the Supabase data API.
//!
//! Wraps the PostgREST endpoints used by the batch jobs (whole-table reads,
//! the queued-payout query and the sync-flag update) using [`reqwest`].
//! Every request authenticates with the service-role key, sent both as the
//! `apikey` header and as a bearer token.

use royalty_core::config::SupabaseConfig;
use royalty_core::error::DecodeError;
use royalty_core::payout::{PayoutId, PAYOUTS_TABLE};
use royalty_core::table::{rows_from_json, TableName, TableRow};
use serde::Serialize;

/// HTTP client for a single Supabase project.
pub struct SupabaseApi {
    client: reqwest::Client,
    base_url: String,
    service_key: String,
}

/// Errors from the Supabase REST layer.
#[derive(Debug, thiserror::Error)]
pub enum SupabaseApiError {
    /// The HTTP request itself failed (network, DNS, TLS, body decode).
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// Supabase returned a non-2xx status code.
    #[error("Supabase API error ({status}): {body}")]
    Api {
        /// HTTP status code.
        status: u16,
        /// Raw response body for debugging.
        body: String,
    },

    /// The response parsed as JSON but did not have the expected shape.
    #[error(transparent)]
    Decode(#[from] DecodeError),
}

/// A PostgREST horizontal filter, rendered as `column=op.value`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Filter {
    column: String,
    op: &'static str,
    value: String,
}

impl Filter {
    /// Equality filter (`column=eq.value`).
    pub fn eq(column: impl Into<String>, value: impl ToString) -> Self {
        Self {
            column: column.into(),
            op: "eq",
            value: value.to_string(),
        }
    }

    fn query_pair(&self) -> (String, String) {
        (self.column.clone(), format!("{}.{}", self.op, self.value))
    }
}

/// Body of the sync-flag update.
#[derive(Debug, Serialize)]
struct MarkSyncedBody<'a> {
    notion_sync: bool,
    notion_page_url: &'a str,
}

impl SupabaseApi {
    /// Create a new API client from validated configuration.
    pub fn new(config: &SupabaseConfig) -> Self {
        Self::with_client(reqwest::Client::new(), config)
    }

    /// Create an API client reusing an existing [`reqwest::Client`]
    /// (e.g. one built with a request timeout).
    pub fn with_client(client: reqwest::Client, config: &SupabaseConfig) -> Self {
        Self {
            client,
            base_url: config.url.clone(),
            service_key: config.service_key.clone(),
        }
    }

    /// Fetch every row of a table and narrow it into [`TableRow`]s.
    pub async fn fetch_table(&self, table: &TableName) -> Result<Vec<TableRow>, SupabaseApiError> {
        let values = self.fetch_rows(table.as_str(), &[]).await?;
        Ok(rows_from_json(table.as_str(), values)?)
    }

    /// Fetch raw rows of `table` matching all `filters`.
    ///
    /// Sends `GET /rest/v1/{table}?{filters}&select=*`. The whole result set
    /// is expected in one response; there is no pagination.
    pub async fn fetch_rows(
        &self,
        table: &str,
        filters: &[Filter],
    ) -> Result<Vec<serde_json::Value>, SupabaseApiError> {
        tracing::debug!(table, filters = filters.len(), "Fetching rows");
        let response = self.select_request(table, filters).send().await?;
        Self::parse_response(response).await
    }

    /// Fetch payouts that are queued and not yet mirrored to Notion.
    ///
    /// Rows are returned undecoded so that one malformed record can be
    /// reported on its own instead of failing the whole queue.
    pub async fn fetch_queued_payouts(&self) -> Result<Vec<serde_json::Value>, SupabaseApiError> {
        self.fetch_rows(PAYOUTS_TABLE, &queued_payout_filters()).await
    }

    /// Flag a payout as synced and store the Notion page URL.
    ///
    /// Sends `PATCH /rest/v1/payouts?id=eq.{id}` with
    /// `Prefer: return=representation`; returns the updated rows.
    pub async fn mark_payout_synced(
        &self,
        id: &PayoutId,
        notion_page_url: &str,
    ) -> Result<Vec<serde_json::Value>, SupabaseApiError> {
        let response = self.mark_synced_request(id, notion_page_url).send().await?;
        let updated: Vec<serde_json::Value> = Self::parse_response(response).await?;
        if updated.is_empty() {
            tracing::warn!(payout_id = %id, "Sync update matched no rows");
        }
        Ok(updated)
    }

    // ---- request builders ----

    fn table_url(&self, table: &str) -> String {
        format!("{}/rest/v1/{}", self.base_url, table)
    }

    fn authorized(&self, builder: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        builder
            .header("apikey", &self.service_key)
            .bearer_auth(&self.service_key)
    }

    fn select_request(&self, table: &str, filters: &[Filter]) -> reqwest::RequestBuilder {
        let mut query: Vec<(String, String)> = filters.iter().map(Filter::query_pair).collect();
        query.push(("select".into(), "*".into()));
        self.authorized(self.client.get(self.table_url(table)))
            .query(&query)
    }

    fn mark_synced_request(&self, id: &PayoutId, notion_page_url: &str) -> reqwest::RequestBuilder {
        let filter = Filter::eq("id", id);
        self.authorized(self.client.patch(self.table_url(PAYOUTS_TABLE)))
            .query(&[filter.query_pair()])
            .header("Prefer", "return=representation")
            .json(&MarkSyncedBody {
                notion_sync: true,
                notion_page_url,
            })
    }

    // ---- private helpers ----

    /// Ensure the response has a success status code. Returns the
    /// response unchanged on success, or a [`SupabaseApiError::Api`]
    /// containing the status and body text on failure.
    async fn ensure_success(
        response: reqwest::Response,
    ) -> Result<reqwest::Response, SupabaseApiError> {
        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "<unreadable body>".to_string());
            return Err(SupabaseApiError::Api {
                status: status.as_u16(),
                body,
            });
        }
        Ok(response)
    }

    /// Parse a successful JSON response body into the expected type.
    async fn parse_response<T: serde::de::DeserializeOwned>(
        response: reqwest::Response,
    ) -> Result<T, SupabaseApiError> {
        let response = Self::ensure_success(response).await?;
        Ok(response.json::<T>().await?)
    }
}

/// Filters selecting payouts still waiting for a Notion page.
pub fn queued_payout_filters() -> [Filter; 2] {
    [
        Filter::eq("status", "queued"),
        Filter::eq("notion_sync", false),
    ]
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;

    use super::*;

    fn api() -> SupabaseApi {
        SupabaseApi::new(&SupabaseConfig {
            url: "https://proj.supabase.co".into(),
            service_key: "service-key".into(),
        })
    }

    #[test]
    fn select_request_shape() {
        let request = api().select_request("offers", &[]).build().unwrap();

        assert_eq!(request.method(), reqwest::Method::GET);
        assert_eq!(
            request.url().as_str(),
            "https://proj.supabase.co/rest/v1/offers?select=*"
        );
        assert_eq!(request.headers()["apikey"], "service-key");
        assert_eq!(request.headers()["authorization"], "Bearer service-key");
    }

    #[test]
    fn queued_filters_precede_select() {
        let request = api()
            .select_request(PAYOUTS_TABLE, &queued_payout_filters())
            .build()
            .unwrap();

        assert_eq!(
            request.url().query(),
            Some("status=eq.queued&notion_sync=eq.false&select=*")
        );
    }

    #[test]
    fn mark_synced_request_shape() {
        let request = api()
            .mark_synced_request(&PayoutId::Int(5), "https://notion.so/page-5")
            .build()
            .unwrap();

        assert_eq!(request.method(), reqwest::Method::PATCH);
        assert_eq!(
            request.url().as_str(),
            "https://proj.supabase.co/rest/v1/payouts?id=eq.5"
        );
        assert_eq!(request.headers()["prefer"], "return=representation");
        assert_eq!(request.headers()["apikey"], "service-key");

        let body = request.body().and_then(|b| b.as_bytes()).unwrap();
        let json: serde_json::Value = serde_json::from_slice(body).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "notion_sync": true,
                "notion_page_url": "https://notion.so/page-5",
            })
        );
    }

    fn response(status: u16, body: &'static str) -> reqwest::Response {
        reqwest::Response::from(
            http::Response::builder()
                .status(status)
                .body(body)
                .unwrap(),
        )
    }

    #[tokio::test]
    async fn unauthorized_response_becomes_api_error() {
        let body = r#"{"message":"Invalid API key"}"#;

        let err = SupabaseApi::parse_response::<Vec<serde_json::Value>>(response(401, body))
            .await
            .unwrap_err();

        assert_matches!(err, SupabaseApiError::Api { status: 401, ref body } if body.contains("Invalid API key"));
    }

    #[tokio::test]
    async fn server_error_keeps_status() {
        let err = SupabaseApi::ensure_success(response(503, "upstream down"))
            .await
            .unwrap_err();

        assert_matches!(err, SupabaseApiError::Api { status: 503, ref body } if body == "upstream down");
    }

    #[tokio::test]
    async fn success_parses_rows() {
        let rows = SupabaseApi::parse_response::<Vec<serde_json::Value>>(response(
            200,
            r#"[{"id":1,"status":"queued"},{"id":"x"}]"#,
        ))
        .await
        .unwrap();

        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0]["status"], "queued");
    }

    #[test]
    fn api_error_display_carries_body() {
        let err = SupabaseApiError::Api {
            status: 401,
            body: r#"{"message":"Invalid API key"}"#.into(),
        };
        assert_eq!(
            err.to_string(),
            r#"Supabase API error (401): {"message":"Invalid API key"}"#
        );
    }
}
