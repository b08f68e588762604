//! The flows shared by the HTTP handlers and the CLI: fetch a food, resolve
//! and scale it, persist it, and read it back as reports.

use chrono::{Duration, Local, NaiveDate};
use log::{info, warn};
use serde::Serialize;
use sqlx::types::Json;
use sqlx::PgPool;
use uuid::Uuid;
use crate::core::aggregate::{daily_totals, range_totals, DayTotals};
use crate::core::macros::{scale, CanonicalMacros};
use crate::core::nutrients::resolve;
use crate::core::targets::{compare, derive_targets, MacroSplit, MacroTargets, TargetComparison};
use crate::db;
use crate::db::meal_plans::NewPlanItem;
use crate::db::meals::NewMeal;
use crate::errors::AppError;
use crate::fdc::{FoodDataProvider, FoodRecord, RawNutrient};
use crate::models::meal::{LoggedMeal, MealType};
use crate::models::meal_plan::{MealPlanItem, MealSlot};
use crate::models::user::User;

/// Search results that get nutrient detail looked up and returned.
pub const SEARCH_RESULT_LIMIT: usize = 10;

/// Longest history or export window, in days.
pub const MAX_RANGE_DAYS: u32 = 366;

/// The calendar day meals are booked on. Server-local, for every user.
pub fn today() -> NaiveDate {
    Local::now().date_naive()
}

#[derive(Serialize, Debug, Clone)]
pub struct FoodSummary {
    pub fdc_id: i64,
    pub description: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data_type: Option<String>,
    /// Per 100 g.
    pub macros: CanonicalMacros,
    pub nutrients: Vec<RawNutrient>,
}

impl From<FoodRecord> for FoodSummary {
    fn from(record: FoodRecord) -> Self {
        let macros = resolve(&record);
        FoodSummary {
            fdc_id: record.fdc_id,
            description: record.description,
            data_type: record.data_type,
            macros,
            nutrients: record.nutrients,
        }
    }
}

#[derive(Serialize, Debug, Clone)]
pub struct DailyReport {
    pub date: NaiveDate,
    pub meals: Vec<LoggedMeal>,
    pub totals: CanonicalMacros,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub targets: Option<MacroTargets>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub comparison: Option<TargetComparison>,
}

impl DailyReport {
    pub fn build(date: NaiveDate, meals: Vec<LoggedMeal>, targets: Option<MacroTargets>) -> Self {
        let totals = daily_totals(&meals);
        let comparison = targets.as_ref().map(|t| compare(&totals, t));
        DailyReport { date, meals, totals, targets, comparison }
    }
}

fn check_quantity(grams: f64) -> Result<(), AppError> {
    if !grams.is_finite() || grams <= 0.0 {
        return Err(AppError::BadRequest("Quantity must be a positive number of grams".to_string()));
    }
    Ok(())
}

/// Looks up foods and resolves their macros. Hits without nutrient detail
/// are fetched individually; hits that still resolve to nothing are dropped.
pub async fn search_foods(provider: &dyn FoodDataProvider, query: &str) -> Result<Vec<FoodSummary>, AppError> {
    let query = query.trim();
    if query.is_empty() {
        return Err(AppError::BadRequest("Search query is required".to_string()));
    }

    let hits = provider.search(query).await?;
    let mut foods = Vec::new();
    for hit in hits.into_iter().take(SEARCH_RESULT_LIMIT) {
        let record = if hit.nutrients.is_empty() {
            match provider.get_by_id(hit.fdc_id).await {
                Ok(detail) => detail,
                Err(err) => {
                    warn!("Could not fetch detail for FDC food {}: {}", hit.fdc_id, err);
                    hit
                }
            }
        } else {
            hit
        };

        let summary = FoodSummary::from(record);
        if !summary.macros.has_no_energy_data() {
            foods.push(summary);
        }
    }
    Ok(foods)
}

pub async fn food_detail(provider: &dyn FoodDataProvider, fdc_id: i64) -> Result<FoodSummary, AppError> {
    let summary = FoodSummary::from(provider.get_by_id(fdc_id).await?);
    info!(
        "Food {} '{}': protein {:.2}, carbohydrate {:.2}, fat {:.2}, calories {:.2}, fiber {:.2}",
        summary.fdc_id,
        summary.description,
        summary.macros.protein,
        summary.macros.carbohydrate,
        summary.macros.fat,
        summary.macros.calories,
        summary.macros.fiber
    );
    Ok(summary)
}

/// Fetches a food, scales it to `grams` and books it on `date`.
///
/// An all-zero resolution is still stored; it is logged so the caller can
/// warn the user.
pub async fn log_food(
    pool: &PgPool,
    provider: &dyn FoodDataProvider,
    user_id: Uuid,
    fdc_id: i64,
    grams: f64,
    meal_type: MealType,
    date: NaiveDate,
) -> Result<LoggedMeal, AppError> {
    check_quantity(grams)?;
    let food = provider.get_by_id(fdc_id).await?;
    let eaten = scale(resolve(&food), grams);
    if eaten.has_no_energy_data() {
        warn!("Logging '{}' ({}g) with no nutritional values", food.description, grams);
    }

    let meal = db::meals::insert_meal(
        pool,
        &NewMeal {
            user_id,
            meal_type,
            meal_date: date,
            food_id: fdc_id,
            food_name: &food.description,
            quantity_g: grams,
            macros: eaten,
        },
    )
    .await?;

    info!("User {} logged {}g of '{}' for {}", user_id, grams, meal.food_name, meal.meal_type);
    Ok(meal)
}

pub async fn daily_report(pool: &PgPool, user: &User, date: NaiveDate) -> Result<DailyReport, AppError> {
    let meals = db::meals::meals_on(pool, user.user_id, date).await?;
    Ok(DailyReport::build(date, meals, user.active_targets()))
}

/// Day totals for the `days` days ending on `end`, newest first, empty days
/// left out.
pub async fn history(pool: &PgPool, user_id: Uuid, days: u32, end: NaiveDate) -> Result<Vec<DayTotals>, AppError> {
    let start = history_start(days, end);
    let meals = db::meals::meals_between(pool, user_id, start, end).await?;
    Ok(range_totals(&meals, start, end))
}

/// First day of a `days`-long window ending on `end`. Saturates at the
/// earliest representable date.
pub fn history_start(days: u32, end: NaiveDate) -> NaiveDate {
    end.checked_sub_signed(Duration::days(i64::from(days.max(1)) - 1))
        .unwrap_or(NaiveDate::MIN)
}

/// Derives gram targets and saves them on the user. A split that is off by
/// more than a point is refused unless `normalize` is set.
pub async fn set_targets(
    pool: &PgPool,
    mut user: User,
    calorie_goal: f64,
    split: MacroSplit,
    fiber_g: f64,
    normalize: bool,
) -> Result<User, AppError> {
    let targets = targets_from_request(calorie_goal, split, fiber_g, normalize)?;
    user.targets = Json(targets);
    Ok(db::users::update_user(pool, &user).await?)
}

pub fn targets_from_request(
    calorie_goal: f64,
    split: MacroSplit,
    fiber_g: f64,
    normalize: bool,
) -> Result<MacroTargets, AppError> {
    let split = if split.needs_normalization() {
        if !normalize {
            return Err(AppError::BadRequest(format!(
                "Macro percentages add up to {:.0}% instead of 100%",
                split.total()
            )));
        }
        if split.total() <= 0.0 {
            return Err(AppError::BadRequest("Macro percentages cannot all be zero".to_string()));
        }
        split.normalized()
    } else {
        split
    };
    Ok(derive_targets(calorie_goal, split, fiber_g))
}

pub async fn add_plan_item(
    pool: &PgPool,
    provider: &dyn FoodDataProvider,
    plan_id: Uuid,
    fdc_id: i64,
    grams: f64,
    slot: MealSlot,
) -> Result<MealPlanItem, AppError> {
    check_quantity(grams)?;
    let food = provider.get_by_id(fdc_id).await?;
    let macros = scale(resolve(&food), grams);

    let item = db::meal_plans::add_item(
        pool,
        &NewPlanItem {
            plan_id,
            slot,
            food_id: fdc_id,
            food_name: &food.description,
            quantity_g: grams,
            macros,
        },
    )
    .await?;

    info!("Added '{}' to plan {} at {}", item.food_name, plan_id, item.slot);
    Ok(item)
}
