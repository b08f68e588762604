use actix_web::{web, HttpResponse};
use serde::{Deserialize, Serialize};
use validator::Validate;
use uuid::Uuid;
use chrono::NaiveDate;
use crate::core::aggregate::DayTotals;
use crate::db;
use crate::errors::AppError;
use crate::export::meals_to_csv;
use crate::fdc::FoodDataProvider;
use crate::handlers::fetch_user;
use crate::tracker::{self, history_start, today, MAX_RANGE_DAYS};
use crate::utils::validation::{parse_date_or, validate_meal_type, validate_payload};

const DEFAULT_HISTORY_DAYS: u32 = 7;
const DEFAULT_EXPORT_DAYS: u32 = 30;

#[derive(Deserialize, Validate)]
pub struct LogMealRequest {
    #[validate(range(min = 1, message = "fdc_id must be a positive FoodData Central id"))]
    fdc_id: i64,

    #[validate(range(min = 0.1, max = 10000.0, message = "Quantity must be between 0.1 and 10000 g"))]
    quantity_g: f64,

    #[validate(length(min = 1, message = "Meal type cannot be empty"))]
    meal_type: String,

    /// Defaults to today.
    date: Option<String>,
}

#[derive(Deserialize)]
pub struct DateQuery {
    date: Option<String>,
}

#[derive(Deserialize)]
pub struct RangeQuery {
    days: Option<u32>,
}

impl RangeQuery {
    fn days_or(&self, default: u32) -> Result<u32, AppError> {
        match self.days {
            None => Ok(default),
            Some(days) if (1..=MAX_RANGE_DAYS).contains(&days) => Ok(days),
            Some(_) => Err(AppError::BadRequest(format!("days must be between 1 and {}", MAX_RANGE_DAYS))),
        }
    }
}

#[derive(Serialize)]
struct HistoryResponse {
    start: NaiveDate,
    end: NaiveDate,
    days: Vec<DayTotals>,
}

// POST /v1/users/:id/meals
pub async fn log_meal(
    pool: web::Data<sqlx::PgPool>,
    provider: web::Data<dyn FoodDataProvider>,
    user_id: web::Path<Uuid>,
    payload: web::Json<LogMealRequest>,
) -> Result<HttpResponse, AppError> {
    validate_payload(&*payload)?;
    let meal_type = validate_meal_type(&payload.meal_type)?;
    let date = parse_date_or(payload.date.as_deref(), today())?;
    let user = fetch_user(&pool, *user_id).await?;

    let meal = tracker::log_food(
        &pool,
        &**provider,
        user.user_id,
        payload.fdc_id,
        payload.quantity_g,
        meal_type,
        date,
    )
    .await?;

    Ok(HttpResponse::Created().json(meal))
}

// GET /v1/users/:id/meals?date=YYYY-MM-DD
pub async fn get_meals(
    pool: web::Data<sqlx::PgPool>,
    user_id: web::Path<Uuid>,
    query: web::Query<DateQuery>,
) -> Result<HttpResponse, AppError> {
    let date = parse_date_or(query.date.as_deref(), today())?;
    let user = fetch_user(&pool, *user_id).await?;
    let meals = db::meals::meals_on(&pool, user.user_id, date).await?;
    Ok(HttpResponse::Ok().json(meals))
}

// GET /v1/users/:id/report?date=YYYY-MM-DD
pub async fn get_report(
    pool: web::Data<sqlx::PgPool>,
    user_id: web::Path<Uuid>,
    query: web::Query<DateQuery>,
) -> Result<HttpResponse, AppError> {
    let date = parse_date_or(query.date.as_deref(), today())?;
    let user = fetch_user(&pool, *user_id).await?;
    let report = tracker::daily_report(&pool, &user, date).await?;
    Ok(HttpResponse::Ok().json(report))
}

// GET /v1/users/:id/history?days=7
pub async fn get_history(
    pool: web::Data<sqlx::PgPool>,
    user_id: web::Path<Uuid>,
    query: web::Query<RangeQuery>,
) -> Result<HttpResponse, AppError> {
    let days = query.days_or(DEFAULT_HISTORY_DAYS)?;
    let user = fetch_user(&pool, *user_id).await?;

    let end = today();
    let totals = tracker::history(&pool, user.user_id, days, end).await?;
    Ok(HttpResponse::Ok().json(HistoryResponse {
        start: history_start(days, end),
        end,
        days: totals,
    }))
}

// GET /v1/users/:id/export?days=30
pub async fn export_csv(
    pool: web::Data<sqlx::PgPool>,
    user_id: web::Path<Uuid>,
    query: web::Query<RangeQuery>,
) -> Result<HttpResponse, AppError> {
    let days = query.days_or(DEFAULT_EXPORT_DAYS)?;
    let user = fetch_user(&pool, *user_id).await?;

    let end = today();
    let meals = db::meals::meals_between(&pool, user.user_id, history_start(days, end), end).await?;
    let csv = meals_to_csv(&meals)?;
    let filename = format!("export_{}_{}.csv", user.user_id, end.format("%Y%m%d"));

    Ok(HttpResponse::Ok()
        .content_type("text/csv; charset=utf-8")
        .insert_header(("Content-Disposition", format!("attachment; filename=\"{}\"", filename)))
        .body(csv))
}
