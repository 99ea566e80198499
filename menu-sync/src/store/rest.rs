//! REST order store
//!
//! [`OrderStore`] over a PostgREST-style row API: `select` with `eq`,
//! `gte`, `lte` and `order` predicates on the orders table, scoped to one
//! restaurant. Sorting happens server-side; the demo-row exclusion is
//! applied client-side because the demo marker lives in the id prefix.

use async_trait::async_trait;
use reqwest::header::{AUTHORIZATION, HeaderValue};
use shared::{Order, OrderFilters};

use super::OrderStore;
use crate::error::FetchError;

#[derive(Debug, Clone)]
pub struct RestOrderStore {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
    table: String,
}

impl RestOrderStore {
    /// `base_url` is the REST root, e.g. `https://xyz.example.co/rest/v1`.
    pub fn new(base_url: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key: api_key.into(),
            table: "orders".to_string(),
        }
    }

    pub fn with_table(mut self, table: impl Into<String>) -> Self {
        self.table = table.into();
        self
    }

    fn query_params(restaurant_id: &str, filters: &OrderFilters) -> Vec<(String, String)> {
        let mut params = vec![
            ("select".to_string(), "*".to_string()),
            (
                "restaurant_id".to_string(),
                format!("eq.{restaurant_id}"),
            ),
        ];
        if let Some(status) = filters.status {
            params.push(("status".to_string(), format!("eq.{status}")));
        }
        if let Some(start) = filters.start_date {
            params.push(("created_at".to_string(), format!("gte.{}", start.to_rfc3339())));
        }
        if let Some(end) = filters.end_date {
            params.push(("created_at".to_string(), format!("lte.{}", end.to_rfc3339())));
        }
        params.push((
            "order".to_string(),
            format!("{}.{}", filters.sort_by.column(), filters.sort_direction),
        ));
        params
    }
}

/// Total row count from a `Content-Range` header (`items 0-9/57` → 57).
fn parse_content_range(value: &HeaderValue) -> Option<usize> {
    value.to_str().ok()?.rsplit('/').next()?.parse().ok()
}

#[async_trait]
impl OrderStore for RestOrderStore {
    async fn fetch_orders(
        &self,
        restaurant_id: &str,
        filters: &OrderFilters,
    ) -> Result<(Vec<Order>, usize), FetchError> {
        let url = format!("{}/{}", self.base_url, self.table);
        let response = self
            .client
            .get(&url)
            .header("apikey", &self.api_key)
            .header(AUTHORIZATION, format!("Bearer {}", self.api_key))
            .header("Prefer", "count=exact")
            .query(&Self::query_params(restaurant_id, filters))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(FetchError::Backend(format!(
                "orders fetch returned {status}: {body}"
            )));
        }

        let server_count = response
            .headers()
            .get("content-range")
            .and_then(parse_content_range);

        let body = response.text().await?;
        let mut rows: Vec<Order> = serde_json::from_str(&body)?;
        if filters.exclude_demo {
            rows.retain(|o| !o.is_demo());
        }
        // The server total ignores the client-side demo filter.
        let count = if filters.exclude_demo {
            rows.len()
        } else {
            server_count.unwrap_or(rows.len())
        };
        Ok((rows, count))
    }
}
