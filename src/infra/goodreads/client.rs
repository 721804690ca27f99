use anyhow::{Context, Result};
use async_trait::async_trait;
use tracing::debug;

use crate::config::GoodreadsConfig;
use crate::fetch::auth::UrlParam;
use crate::fetch::{BasicClient, HttpClient, fetch_bytes};
use crate::parser::parse_review_page;
use crate::services::review_api::{PER_PAGE, ReviewApi, ReviewPage};

/// Reads users' `read` shelves from the Goodreads v2 review list endpoint.
pub struct GoodreadsClient<C> {
    http: C,
    base_url: String,
}

impl GoodreadsClient<UrlParam<BasicClient>> {
    /// Builds a client that signs every request with the configured key.
    pub fn new(config: &GoodreadsConfig) -> Result<Self> {
        let http = BasicClient::with_timeout(config.timeout).context("building HTTP client")?;
        Ok(Self::with_http(
            UrlParam::new(http, "key", config.api_key.clone()),
            config.base_url.clone(),
        ))
    }
}

impl<C: HttpClient> GoodreadsClient<C> {
    pub fn with_http(http: C, base_url: String) -> Self {
        Self { http, base_url }
    }

    pub fn page_url(&self, user_id: u64, page: u32) -> String {
        format!(
            "{}/review/list/{}.xml?v=2&shelf=read&per_page={}&page={}",
            self.base_url, user_id, PER_PAGE, page
        )
    }
}

#[async_trait]
impl<C: HttpClient> ReviewApi for GoodreadsClient<C> {
    async fn fetch_page(&self, user_id: u64, page: u32) -> Result<ReviewPage> {
        let url = self.page_url(user_id, page);
        debug!(user_id, page, "Requesting review page");

        let bytes = fetch_bytes(&self.http, &url)
            .await
            .with_context(|| format!("requesting review page {page}"))?;
        parse_review_page(&bytes).with_context(|| format!("decoding review page {page}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_page_url() {
        let config = GoodreadsConfig {
            api_key: "secret".into(),
            base_url: "https://www.goodreads.com".into(),
            timeout: Duration::from_secs(5),
        };
        let client = GoodreadsClient::new(&config).unwrap();

        assert_eq!(
            client.page_url(2624891, 3),
            "https://www.goodreads.com/review/list/2624891.xml?v=2&shelf=read&per_page=200&page=3"
        );
    }
}
