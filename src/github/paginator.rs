use reqwest::Client;
use serde::de::DeserializeOwned;

use crate::error::Result;
use crate::github::client::check_status;

pub struct Paginator<'a> {
    client: &'a Client,
}

impl<'a> Paginator<'a> {
    pub fn new(client: &'a Client) -> Self {
        Self { client }
    }

    /// Fetches every page of `base_url`, following `Link: rel="next"`.
    /// `context` names the resource in error messages.
    pub async fn fetch_all<T: DeserializeOwned>(
        &self,
        base_url: &str,
        query: &[(&str, String)],
        per_page: u32,
        context: &str,
    ) -> Result<Vec<T>> {
        let mut all_items = Vec::new();
        let mut page = 1u32;

        loop {
            tracing::debug!("Fetching: {} (page {})", base_url, page);
            let response = self
                .client
                .get(base_url)
                .query(query)
                .query(&[("per_page", per_page), ("page", page)])
                .send()
                .await?;
            let response = check_status(response, context).await?;

            let has_next = response
                .headers()
                .get("link")
                .and_then(|v| v.to_str().ok())
                .map(|v| v.contains("rel=\"next\""))
                .unwrap_or(false);

            let items: Vec<T> = response.json().await?;
            let items_count = items.len();
            all_items.extend(items);

            if !has_next || items_count < per_page as usize {
                break;
            }

            page += 1;
        }

        Ok(all_items)
    }
}
