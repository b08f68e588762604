use chrono::Utc;
use sqlx::PgPool;
use uuid::Uuid;
use crate::core::macros::CanonicalMacros;
use crate::models::meal_plan::{MealPlan, MealPlanItem, MealPlanWithItems, MealSlot};

const PLAN_COLUMNS: &str = "plan_id, user_id, name, description, created_at";
const ITEM_COLUMNS: &str =
    "item_id, plan_id, slot, food_id, food_name, quantity_g, protein, carbohydrate, fat, calories, fiber";

pub struct NewPlanItem<'a> {
    pub plan_id: Uuid,
    pub slot: MealSlot,
    pub food_id: i64,
    pub food_name: &'a str,
    pub quantity_g: f64,
    pub macros: CanonicalMacros,
}

pub async fn create_plan(
    pool: &PgPool,
    user_id: Uuid,
    name: &str,
    description: &str,
) -> Result<MealPlan, sqlx::Error> {
    sqlx::query_as::<_, MealPlan>(&format!(
        "INSERT INTO meal_plans ({PLAN_COLUMNS}) VALUES ($1, $2, $3, $4, $5) RETURNING {PLAN_COLUMNS}"
    ))
    .bind(Uuid::now_v7())
    .bind(user_id)
    .bind(name)
    .bind(description)
    .bind(Utc::now())
    .fetch_one(pool)
    .await
}

pub async fn get_plan(pool: &PgPool, plan_id: Uuid) -> Result<Option<MealPlan>, sqlx::Error> {
    sqlx::query_as::<_, MealPlan>(&format!("SELECT {PLAN_COLUMNS} FROM meal_plans WHERE plan_id = $1"))
        .bind(plan_id)
        .fetch_optional(pool)
        .await
}

pub async fn list_plans(pool: &PgPool, user_id: Uuid) -> Result<Vec<MealPlanWithItems>, sqlx::Error> {
    let plans = sqlx::query_as::<_, MealPlan>(&format!(
        "SELECT {PLAN_COLUMNS} FROM meal_plans WHERE user_id = $1 ORDER BY created_at"
    ))
    .bind(user_id)
    .fetch_all(pool)
    .await?;

    let mut result = Vec::with_capacity(plans.len());
    for plan in plans {
        let items = list_items(pool, plan.plan_id).await?;
        result.push(MealPlanWithItems { plan, items });
    }
    Ok(result)
}

/// Items in insertion order.
pub async fn list_items(pool: &PgPool, plan_id: Uuid) -> Result<Vec<MealPlanItem>, sqlx::Error> {
    sqlx::query_as::<_, MealPlanItem>(&format!(
        "SELECT {ITEM_COLUMNS} FROM meal_plan_items WHERE plan_id = $1 ORDER BY position"
    ))
    .bind(plan_id)
    .fetch_all(pool)
    .await
}

pub async fn add_item(pool: &PgPool, item: &NewPlanItem<'_>) -> Result<MealPlanItem, sqlx::Error> {
    let m = item.macros;
    sqlx::query_as::<_, MealPlanItem>(&format!(
        "INSERT INTO meal_plan_items ({ITEM_COLUMNS}) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11) \
         RETURNING {ITEM_COLUMNS}"
    ))
    .bind(Uuid::now_v7())
    .bind(item.plan_id)
    .bind(item.slot)
    .bind(item.food_id)
    .bind(item.food_name)
    .bind(item.quantity_g)
    .bind(m.protein)
    .bind(m.carbohydrate)
    .bind(m.fat)
    .bind(m.calories)
    .bind(m.fiber)
    .fetch_one(pool)
    .await
}

/// Moves an item to another slot. `RowNotFound` when the id is unknown.
pub async fn update_item_slot(pool: &PgPool, item_id: Uuid, slot: MealSlot) -> Result<MealPlanItem, sqlx::Error> {
    sqlx::query_as::<_, MealPlanItem>(&format!(
        "UPDATE meal_plan_items SET slot = $1 WHERE item_id = $2 RETURNING {ITEM_COLUMNS}"
    ))
    .bind(slot)
    .bind(item_id)
    .fetch_one(pool)
    .await
}

/// `RowNotFound` when the id is unknown.
pub async fn delete_item(pool: &PgPool, item_id: Uuid) -> Result<(), sqlx::Error> {
    let result = sqlx::query("DELETE FROM meal_plan_items WHERE item_id = $1")
        .bind(item_id)
        .execute(pool)
        .await?;

    if result.rows_affected() == 0 {
        return Err(sqlx::Error::RowNotFound);
    }
    Ok(())
}
