use actix_web::{web, HttpResponse};
use serde::Deserialize;
use crate::errors::AppError;
use crate::fdc::FoodDataProvider;
use crate::tracker;

#[derive(Deserialize)]
pub struct SearchQuery {
    query: Option<String>,
}

// GET /v1/food/search?query=
pub async fn search_food(
    provider: web::Data<dyn FoodDataProvider>,
    query: web::Query<SearchQuery>,
) -> Result<HttpResponse, AppError> {
    let foods = tracker::search_foods(&**provider, query.query.as_deref().unwrap_or_default()).await?;
    Ok(HttpResponse::Ok().json(foods))
}

// GET /v1/food/:id
pub async fn get_food(
    provider: web::Data<dyn FoodDataProvider>,
    fdc_id: web::Path<i64>,
) -> Result<HttpResponse, AppError> {
    let food = tracker::food_detail(&**provider, *fdc_id).await?;
    Ok(HttpResponse::Ok().json(food))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fdc::{FdcError, FoodRecord, RawNutrient};
    use crate::handlers::configure;
    use actix_web::{http::StatusCode, test, App};
    use async_trait::async_trait;
    use std::sync::Arc;

    struct Pantry(Vec<FoodRecord>);

    #[async_trait]
    impl FoodDataProvider for Pantry {
        async fn search(&self, _query: &str) -> Result<Vec<FoodRecord>, FdcError> {
            Ok(self.0.clone())
        }

        async fn get_by_id(&self, fdc_id: i64) -> Result<FoodRecord, FdcError> {
            self.0
                .iter()
                .find(|f| f.fdc_id == fdc_id)
                .cloned()
                .ok_or(FdcError::Status { status: 404, body: String::new() })
        }
    }

    fn chicken() -> FoodRecord {
        FoodRecord {
            fdc_id: 171077,
            description: "Chicken, broiler, breast, roasted".to_string(),
            data_type: Some("SR Legacy".to_string()),
            nutrients: vec![
                RawNutrient { id: Some(1003), value: Some(31.0), ..Default::default() },
                RawNutrient { id: Some(1004), value: Some(3.6), ..Default::default() },
                RawNutrient { id: Some(1008), value: Some(165.0), ..Default::default() },
            ],
        }
    }

    fn provider_data() -> web::Data<dyn FoodDataProvider> {
        let provider: Arc<dyn FoodDataProvider> = Arc::new(Pantry(vec![chicken()]));
        web::Data::from(provider)
    }

    #[actix_web::test]
    async fn search_returns_resolved_macros() {
        let app = test::init_service(App::new().app_data(provider_data()).configure(configure)).await;

        let req = test::TestRequest::get().uri("/v1/food/search?query=chicken").to_request();
        let body: serde_json::Value = test::call_and_read_body_json(&app, req).await;

        assert_eq!(body[0]["fdc_id"], 171077);
        assert_eq!(body[0]["macros"]["protein"], 31.0);
        assert_eq!(body[0]["macros"]["calories"], 165.0);
        assert_eq!(body[0]["macros"]["carbohydrate"], 0.0);
    }

    #[actix_web::test]
    async fn search_without_query_is_bad_request() {
        let app = test::init_service(App::new().app_data(provider_data()).configure(configure)).await;

        let req = test::TestRequest::get().uri("/v1/food/search").to_request();
        let resp = test::call_service(&app, req).await;

        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    }

    #[actix_web::test]
    async fn unknown_food_maps_to_bad_gateway() {
        let app = test::init_service(App::new().app_data(provider_data()).configure(configure)).await;

        let req = test::TestRequest::get().uri("/v1/food/1").to_request();
        let resp = test::call_service(&app, req).await;

        assert_eq!(resp.status(), StatusCode::BAD_GATEWAY);
    }

    #[actix_web::test]
    async fn detail_includes_raw_nutrients() {
        let app = test::init_service(App::new().app_data(provider_data()).configure(configure)).await;

        let req = test::TestRequest::get().uri("/v1/food/171077").to_request();
        let body: serde_json::Value = test::call_and_read_body_json(&app, req).await;

        assert_eq!(body["description"], "Chicken, broiler, breast, roasted");
        assert_eq!(body["nutrients"].as_array().map(Vec::len), Some(3));
    }
}
