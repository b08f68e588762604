use actix_web::{web, HttpResponse};
use serde::{Deserialize, Serialize};
use validator::Validate;
use uuid::Uuid;
use crate::core::targets::{MacroSplit, MacroTargets};
use crate::db;
use crate::errors::AppError;
use crate::handlers::fetch_user;
use crate::models::user::NewUser;
use crate::tracker;
use crate::utils::validation::{validate_gender, validate_payload};

#[derive(Deserialize, Validate)]
pub struct CreateUserRequest {
    #[validate(length(min = 1, max = 60, message = "Name must be between 1 and 60 characters"))]
    name: String,

    #[validate(range(min = 1, max = 150, message = "Age must be between 1 and 150"))]
    age: i32,

    #[validate(range(min = 1.0, max = 700.0, message = "Weight must be between 1 and 700 kg"))]
    weight_kg: f64,

    #[validate(range(min = 30.0, max = 300.0, message = "Height must be between 30 and 300 cm"))]
    height_cm: f64,

    gender: String,
}

#[derive(Deserialize, Validate)]
pub struct ProfileUpdate {
    #[validate(length(min = 1, max = 60, message = "Name must be between 1 and 60 characters"))]
    name: Option<String>,

    #[validate(range(min = 1, max = 150, message = "Age must be between 1 and 150"))]
    age: Option<i32>,

    #[validate(range(min = 1.0, max = 700.0, message = "Weight must be between 1 and 700 kg"))]
    weight_kg: Option<f64>,

    #[validate(range(min = 30.0, max = 300.0, message = "Height must be between 30 and 300 cm"))]
    height_cm: Option<f64>,

    gender: Option<String>,
}

#[derive(Deserialize, Validate)]
pub struct TargetsRequest {
    #[validate(range(min = 1.0, max = 20000.0, message = "Calories must be between 1 and 20000"))]
    calories: f64,

    #[validate(range(min = 0.0, max = 100.0, message = "Protein share must be between 0 and 100"))]
    protein_pct: f64,

    #[validate(range(min = 0.0, max = 100.0, message = "Carbohydrate share must be between 0 and 100"))]
    carbohydrate_pct: f64,

    #[validate(range(min = 0.0, max = 100.0, message = "Fat share must be between 0 and 100"))]
    fat_pct: f64,

    #[validate(range(min = 0.0, max = 500.0, message = "Fiber must be between 0 and 500 g"))]
    fiber_g: f64,

    /// Rescale the shares to 100% when they don't add up.
    #[serde(default)]
    normalize: bool,
}

#[derive(Serialize)]
struct TargetsResponse {
    targets: Option<MacroTargets>,
    energy_split: Option<MacroSplit>,
}

impl TargetsResponse {
    fn new(targets: Option<MacroTargets>) -> Self {
        TargetsResponse {
            energy_split: targets.and_then(|t| t.energy_split()),
            targets,
        }
    }
}

// GET /v1/users
pub async fn list_users(pool: web::Data<sqlx::PgPool>) -> Result<HttpResponse, AppError> {
    let users = db::users::list_users(&pool).await?;
    Ok(HttpResponse::Ok().json(users))
}

// POST /v1/users
pub async fn create_user(
    pool: web::Data<sqlx::PgPool>,
    payload: web::Json<CreateUserRequest>,
) -> Result<HttpResponse, AppError> {
    validate_payload(&*payload)?;
    let payload = payload.into_inner();
    let gender = validate_gender(&payload.gender)?;

    let user = db::users::create_user(
        &pool,
        &NewUser {
            name: payload.name.trim().to_string(),
            age: payload.age,
            weight_kg: payload.weight_kg,
            height_cm: payload.height_cm,
            gender,
        },
    )
    .await?;

    Ok(HttpResponse::Created().json(user))
}

// GET /v1/users/:id
pub async fn get_user(
    pool: web::Data<sqlx::PgPool>,
    user_id: web::Path<Uuid>,
) -> Result<HttpResponse, AppError> {
    let user = fetch_user(&pool, *user_id).await?;
    Ok(HttpResponse::Ok().json(user))
}

// PATCH /v1/users/:id
pub async fn update_profile(
    pool: web::Data<sqlx::PgPool>,
    user_id: web::Path<Uuid>,
    updates: web::Json<ProfileUpdate>,
) -> Result<HttpResponse, AppError> {
    validate_payload(&*updates)?;
    let updates = updates.into_inner();
    let gender = updates.gender.as_deref().map(validate_gender).transpose()?;

    let mut user = fetch_user(&pool, *user_id).await?;
    if let Some(name) = updates.name {
        user.name = name.trim().to_string();
    }
    if let Some(age) = updates.age {
        user.age = age;
    }
    if let Some(weight_kg) = updates.weight_kg {
        user.weight_kg = weight_kg;
    }
    if let Some(height_cm) = updates.height_cm {
        user.height_cm = height_cm;
    }
    if let Some(gender) = gender {
        user.gender = gender;
    }

    let user = db::users::update_user(&pool, &user).await?;
    Ok(HttpResponse::Ok().json(user))
}

// GET /v1/users/:id/health
pub async fn get_health(
    pool: web::Data<sqlx::PgPool>,
    user_id: web::Path<Uuid>,
) -> Result<HttpResponse, AppError> {
    let user = fetch_user(&pool, *user_id).await?;
    Ok(HttpResponse::Ok().json(user.health()))
}

// GET /v1/users/:id/targets
pub async fn get_targets(
    pool: web::Data<sqlx::PgPool>,
    user_id: web::Path<Uuid>,
) -> Result<HttpResponse, AppError> {
    let user = fetch_user(&pool, *user_id).await?;
    Ok(HttpResponse::Ok().json(TargetsResponse::new(user.active_targets())))
}

// PUT /v1/users/:id/targets
pub async fn set_targets(
    pool: web::Data<sqlx::PgPool>,
    user_id: web::Path<Uuid>,
    payload: web::Json<TargetsRequest>,
) -> Result<HttpResponse, AppError> {
    validate_payload(&*payload)?;
    let user = fetch_user(&pool, *user_id).await?;

    let split = MacroSplit {
        protein_pct: payload.protein_pct,
        carbohydrate_pct: payload.carbohydrate_pct,
        fat_pct: payload.fat_pct,
    };
    let user = tracker::set_targets(&pool, user, payload.calories, split, payload.fiber_g, payload.normalize).await?;

    Ok(HttpResponse::Ok().json(TargetsResponse::new(user.active_targets())))
}
