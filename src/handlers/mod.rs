pub mod food;
pub mod meal;
pub mod meal_plan;
pub mod profile;

use actix_web::web;
use sqlx::PgPool;
use uuid::Uuid;
use crate::db;
use crate::errors::AppError;
use crate::models::user::User;

pub(crate) async fn fetch_user(pool: &PgPool, user_id: Uuid) -> Result<User, AppError> {
    db::users::get_user(pool, user_id)
        .await?
        .ok_or_else(|| AppError::NotFound("User not found".to_string()))
}

/// Mounts every route under `/v1`.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/v1")
            .route("/users", web::get().to(profile::list_users))
            .route("/users", web::post().to(profile::create_user))
            .route("/users/{id}", web::get().to(profile::get_user))
            .route("/users/{id}", web::patch().to(profile::update_profile))
            .route("/users/{id}/health", web::get().to(profile::get_health))
            .route("/users/{id}/targets", web::get().to(profile::get_targets))
            .route("/users/{id}/targets", web::put().to(profile::set_targets))
            .route("/users/{id}/meals", web::post().to(meal::log_meal))
            .route("/users/{id}/meals", web::get().to(meal::get_meals))
            .route("/users/{id}/report", web::get().to(meal::get_report))
            .route("/users/{id}/history", web::get().to(meal::get_history))
            .route("/users/{id}/export", web::get().to(meal::export_csv))
            .route("/users/{id}/meal-plans", web::get().to(meal_plan::list_plans))
            .route("/users/{id}/meal-plans", web::post().to(meal_plan::create_plan))
            .route("/meal-plans/{plan_id}/items", web::post().to(meal_plan::add_item))
            .route("/meal-plan-items/{item_id}", web::patch().to(meal_plan::update_item))
            .route("/meal-plan-items/{item_id}", web::delete().to(meal_plan::delete_item))
            .route("/food/search", web::get().to(food::search_food))
            .route("/food/{id}", web::get().to(food::get_food)),
    );
}
