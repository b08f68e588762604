use async_trait::async_trait;
use log::{debug, info};
use moka::sync::Cache;
use serde::Deserialize;
use std::time::Duration;

use super::{FdcError, FoodDataProvider, FoodRecord};

pub const DEFAULT_BASE_URL: &str = "https://api.nal.usda.gov/fdc/v1";
const SEARCH_DATA_TYPES: &str = "Foundation,SR Legacy";

#[derive(Debug, Clone)]
pub struct FdcConfig {
    pub api_key: String,
    pub base_url: String,
    /// How long a fetched food detail stays cached. 0 disables the cache.
    pub cache_ttl_secs: u64,
}

impl Default for FdcConfig {
    fn default() -> Self {
        Self {
            api_key: "DEMO_KEY".to_string(),
            base_url: DEFAULT_BASE_URL.to_string(),
            cache_ttl_secs: 86400,
        }
    }
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    foods: Vec<FoodRecord>,
}

/// HTTP client for USDA FoodData Central.
pub struct FdcClient {
    config: FdcConfig,
    http_client: reqwest::Client,
    details_cache: Option<Cache<i64, FoodRecord>>,
}

impl FdcClient {
    pub fn new(config: FdcConfig) -> Self {
        let details_cache = (config.cache_ttl_secs > 0).then(|| {
            Cache::builder()
                .max_capacity(10_000)
                .time_to_live(Duration::from_secs(config.cache_ttl_secs))
                .build()
        });

        Self {
            config,
            http_client: reqwest::Client::new(),
            details_cache,
        }
    }

    async fn get_json<T: for<'de> Deserialize<'de>>(
        &self,
        url: &str,
        params: &[(&str, &str)],
    ) -> Result<T, FdcError> {
        let response = self
            .http_client
            .get(url)
            .query(&[("api_key", self.config.api_key.as_str())])
            .query(params)
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;
        if !status.is_success() {
            return Err(FdcError::Status { status: status.as_u16(), body });
        }

        serde_json::from_str(&body).map_err(|e| FdcError::Decode(e.to_string()))
    }
}

#[async_trait]
impl FoodDataProvider for FdcClient {
    async fn search(&self, query: &str) -> Result<Vec<FoodRecord>, FdcError> {
        let url = format!("{}/foods/search", self.config.base_url);
        let response: SearchResponse = self
            .get_json(&url, &[("query", query), ("dataType", SEARCH_DATA_TYPES)])
            .await?;

        info!("FDC search '{}' returned {} foods", query, response.foods.len());
        Ok(response.foods)
    }

    async fn get_by_id(&self, fdc_id: i64) -> Result<FoodRecord, FdcError> {
        if let Some(cached) = self.details_cache.as_ref().and_then(|c| c.get(&fdc_id)) {
            debug!("FDC food {} served from cache", fdc_id);
            return Ok(cached);
        }

        let url = format!("{}/food/{}", self.config.base_url, fdc_id);
        let food: FoodRecord = self.get_json(&url, &[("format", "full")]).await?;

        if let Some(cache) = &self.details_cache {
            cache.insert(fdc_id, food.clone());
        }
        Ok(food)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn client_for(server: &MockServer, cache_ttl_secs: u64) -> FdcClient {
        FdcClient::new(FdcConfig {
            api_key: "test-key".to_string(),
            base_url: server.uri(),
            cache_ttl_secs,
        })
    }

    #[tokio::test]
    async fn search_sends_key_and_query() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/foods/search"))
            .and(query_param("api_key", "test-key"))
            .and(query_param("query", "chicken breast"))
            .and(query_param("dataType", "Foundation,SR Legacy"))
            .respond_with(ResponseTemplate::new(200).set_body_string(
                r#"{"foods": [{"fdcId": 123456, "description": "Test Food", "foodNutrients": []}]}"#,
            ))
            .expect(1)
            .mount(&server)
            .await;

        let foods = client_for(&server, 0).search("chicken breast").await.unwrap();

        assert_eq!(foods.len(), 1);
        assert_eq!(foods[0].fdc_id, 123456);
        assert_eq!(foods[0].description, "Test Food");
    }

    #[tokio::test]
    async fn search_without_foods_key_is_empty() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/foods/search"))
            .respond_with(ResponseTemplate::new(200).set_body_string("{}"))
            .mount(&server)
            .await;

        assert!(client_for(&server, 0).search("nothing").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn get_by_id_requests_full_format() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/food/123456"))
            .and(query_param("format", "full"))
            .and(query_param("api_key", "test-key"))
            .respond_with(ResponseTemplate::new(200).set_body_string(
                r#"{"fdcId": 123456, "description": "Test Food",
                    "foodNutrients": [{"nutrient": {"id": 1003, "name": "Protein"}, "amount": 10.5}]}"#,
            ))
            .mount(&server)
            .await;

        let food = client_for(&server, 0).get_by_id(123456).await.unwrap();

        assert_eq!(food.fdc_id, 123456);
        assert_eq!(food.nutrients[0].nested_id(), Some(1003));
    }

    #[tokio::test]
    async fn non_success_status_is_an_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/food/1"))
            .respond_with(ResponseTemplate::new(404).set_body_string("no such food"))
            .mount(&server)
            .await;

        match client_for(&server, 0).get_by_id(1).await {
            Err(FdcError::Status { status, body }) => {
                assert_eq!(status, 404);
                assert_eq!(body, "no such food");
            }
            other => panic!("expected status error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn malformed_body_is_a_decode_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/food/2"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>"))
            .mount(&server)
            .await;

        assert!(matches!(client_for(&server, 0).get_by_id(2).await, Err(FdcError::Decode(_))));
    }

    #[tokio::test]
    async fn details_are_cached() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/food/7"))
            .respond_with(ResponseTemplate::new(200).set_body_string(r#"{"fdcId": 7, "description": "Oats"}"#))
            .expect(1)
            .mount(&server)
            .await;

        let client = client_for(&server, 60);
        client.get_by_id(7).await.unwrap();
        let second = client.get_by_id(7).await.unwrap();
        assert_eq!(second.description, "Oats");
    }
}
