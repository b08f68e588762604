use chrono::Utc;
use sqlx::types::Json;
use sqlx::PgPool;
use uuid::Uuid;
use crate::core::targets::MacroTargets;
use crate::models::user::{NewUser, User};

const USER_COLUMNS: &str =
    "user_id, name, age, weight_kg, height_cm, gender, targets, created_at, updated_at";

pub async fn create_user(pool: &PgPool, new_user: &NewUser) -> Result<User, sqlx::Error> {
    let now = Utc::now();
    sqlx::query_as::<_, User>(&format!(
        "INSERT INTO users ({USER_COLUMNS}) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $8) RETURNING {USER_COLUMNS}"
    ))
    .bind(Uuid::now_v7())
    .bind(&new_user.name)
    .bind(new_user.age)
    .bind(new_user.weight_kg)
    .bind(new_user.height_cm)
    .bind(new_user.gender)
    .bind(Json(MacroTargets::default()))
    .bind(now)
    .fetch_one(pool)
    .await
}

pub async fn get_user(pool: &PgPool, user_id: Uuid) -> Result<Option<User>, sqlx::Error> {
    sqlx::query_as::<_, User>(&format!("SELECT {USER_COLUMNS} FROM users WHERE user_id = $1"))
        .bind(user_id)
        .fetch_optional(pool)
        .await
}

pub async fn list_users(pool: &PgPool) -> Result<Vec<User>, sqlx::Error> {
    sqlx::query_as::<_, User>(&format!("SELECT {USER_COLUMNS} FROM users ORDER BY created_at"))
        .fetch_all(pool)
        .await
}

/// Writes back every mutable profile field, targets included.
pub async fn update_user(pool: &PgPool, user: &User) -> Result<User, sqlx::Error> {
    sqlx::query_as::<_, User>(&format!(
        "UPDATE users SET name = $1, age = $2, weight_kg = $3, height_cm = $4, gender = $5, targets = $6, updated_at = $7 \
         WHERE user_id = $8 RETURNING {USER_COLUMNS}"
    ))
    .bind(&user.name)
    .bind(user.age)
    .bind(user.weight_kg)
    .bind(user.height_cm)
    .bind(user.gender)
    .bind(Json(user.targets.0))
    .bind(Utc::now())
    .bind(user.user_id)
    .fetch_one(pool)
    .await
}
