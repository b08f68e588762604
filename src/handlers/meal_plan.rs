use actix_web::{web, HttpResponse};
use serde::Deserialize;
use validator::Validate;
use uuid::Uuid;
use crate::db;
use crate::errors::AppError;
use crate::fdc::FoodDataProvider;
use crate::handlers::fetch_user;
use crate::models::meal_plan::MealPlanWithItems;
use crate::tracker;
use crate::utils::validation::{validate_meal_slot, validate_payload};

#[derive(Deserialize, Validate)]
pub struct CreatePlanRequest {
    #[validate(length(min = 1, max = 100, message = "Plan name must be between 1 and 100 characters"))]
    name: String,

    #[validate(length(max = 500, message = "Description cannot exceed 500 characters"))]
    #[serde(default)]
    description: String,
}

#[derive(Deserialize, Validate)]
pub struct PlanItemRequest {
    #[validate(range(min = 1, message = "fdc_id must be a positive FoodData Central id"))]
    fdc_id: i64,

    #[validate(range(min = 0.1, max = 10000.0, message = "Quantity must be between 0.1 and 10000 g"))]
    quantity_g: f64,

    slot: String,
}

#[derive(Deserialize)]
pub struct SlotUpdate {
    slot: String,
}

// GET /v1/users/:id/meal-plans
pub async fn list_plans(
    pool: web::Data<sqlx::PgPool>,
    user_id: web::Path<Uuid>,
) -> Result<HttpResponse, AppError> {
    let user = fetch_user(&pool, *user_id).await?;
    let plans = db::meal_plans::list_plans(&pool, user.user_id).await?;
    Ok(HttpResponse::Ok().json(plans))
}

// POST /v1/users/:id/meal-plans
pub async fn create_plan(
    pool: web::Data<sqlx::PgPool>,
    user_id: web::Path<Uuid>,
    payload: web::Json<CreatePlanRequest>,
) -> Result<HttpResponse, AppError> {
    validate_payload(&*payload)?;
    let user = fetch_user(&pool, *user_id).await?;

    let plan = db::meal_plans::create_plan(&pool, user.user_id, payload.name.trim(), payload.description.trim()).await?;
    Ok(HttpResponse::Created().json(MealPlanWithItems { plan, items: Vec::new() }))
}

// POST /v1/meal-plans/:planId/items
pub async fn add_item(
    pool: web::Data<sqlx::PgPool>,
    provider: web::Data<dyn FoodDataProvider>,
    plan_id: web::Path<Uuid>,
    payload: web::Json<PlanItemRequest>,
) -> Result<HttpResponse, AppError> {
    validate_payload(&*payload)?;
    let slot = validate_meal_slot(&payload.slot)?;

    let plan = db::meal_plans::get_plan(&pool, *plan_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Meal plan not found".to_string()))?;

    let item = tracker::add_plan_item(&pool, &**provider, plan.plan_id, payload.fdc_id, payload.quantity_g, slot).await?;
    Ok(HttpResponse::Created().json(item))
}

// PATCH /v1/meal-plan-items/:itemId
pub async fn update_item(
    pool: web::Data<sqlx::PgPool>,
    item_id: web::Path<Uuid>,
    payload: web::Json<SlotUpdate>,
) -> Result<HttpResponse, AppError> {
    let slot = validate_meal_slot(&payload.slot)?;
    let item = db::meal_plans::update_item_slot(&pool, *item_id, slot).await?;
    Ok(HttpResponse::Ok().json(item))
}

// DELETE /v1/meal-plan-items/:itemId
pub async fn delete_item(
    pool: web::Data<sqlx::PgPool>,
    item_id: web::Path<Uuid>,
) -> Result<HttpResponse, AppError> {
    db::meal_plans::delete_item(&pool, *item_id).await?;
    Ok(HttpResponse::Ok().json(serde_json::json!({ "message": "Meal plan item deleted successfully" })))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plan_description_is_optional() {
        let req: CreatePlanRequest = serde_json::from_str(r#"{"name": "Cutting week"}"#).unwrap();
        assert!(req.validate().is_ok());
        assert_eq!(req.description, "");

        let req: CreatePlanRequest = serde_json::from_str(r#"{"name": ""}"#).unwrap();
        assert!(req.validate().is_err());
    }
}
