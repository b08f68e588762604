use chrono::{NaiveDate, Utc};
use sqlx::PgPool;
use uuid::Uuid;
use crate::core::macros::CanonicalMacros;
use crate::models::meal::{LoggedMeal, MealType};

const MEAL_COLUMNS: &str = "meal_id, user_id, meal_type, meal_date, logged_at, food_id, food_name, quantity_g, \
     protein, carbohydrate, fat, calories, fiber";

pub struct NewMeal<'a> {
    pub user_id: Uuid,
    pub meal_type: MealType,
    pub meal_date: NaiveDate,
    pub food_id: i64,
    pub food_name: &'a str,
    pub quantity_g: f64,
    /// Already scaled to `quantity_g`.
    pub macros: CanonicalMacros,
}

pub async fn insert_meal(pool: &PgPool, meal: &NewMeal<'_>) -> Result<LoggedMeal, sqlx::Error> {
    let m = meal.macros;
    sqlx::query_as::<_, LoggedMeal>(&format!(
        "INSERT INTO meals ({MEAL_COLUMNS}) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13) \
         RETURNING {MEAL_COLUMNS}"
    ))
    .bind(Uuid::now_v7())
    .bind(meal.user_id)
    .bind(meal.meal_type)
    .bind(meal.meal_date)
    .bind(Utc::now())
    .bind(meal.food_id)
    .bind(meal.food_name)
    .bind(meal.quantity_g)
    .bind(m.protein)
    .bind(m.carbohydrate)
    .bind(m.fat)
    .bind(m.calories)
    .bind(m.fiber)
    .fetch_one(pool)
    .await
}

pub async fn meals_on(pool: &PgPool, user_id: Uuid, date: NaiveDate) -> Result<Vec<LoggedMeal>, sqlx::Error> {
    meals_between(pool, user_id, date, date).await
}

/// Meals with `meal_date` in `start..=end`, oldest first.
pub async fn meals_between(
    pool: &PgPool,
    user_id: Uuid,
    start: NaiveDate,
    end: NaiveDate,
) -> Result<Vec<LoggedMeal>, sqlx::Error> {
    sqlx::query_as::<_, LoggedMeal>(&format!(
        "SELECT {MEAL_COLUMNS} FROM meals WHERE user_id = $1 AND meal_date BETWEEN $2 AND $3 \
         ORDER BY meal_date ASC, logged_at ASC"
    ))
    .bind(user_id)
    .bind(start)
    .bind(end)
    .fetch_all(pool)
    .await
}
