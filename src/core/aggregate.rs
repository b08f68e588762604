use chrono::NaiveDate;
use serde::Serialize;
use std::collections::BTreeMap;

use crate::core::macros::CanonicalMacros;
use crate::models::meal::LoggedMeal;

#[derive(Serialize, Debug, Clone, Copy, PartialEq)]
pub struct DayTotals {
    pub date: NaiveDate,
    #[serde(flatten)]
    pub totals: CanonicalMacros,
}

// Summing in a fixed order keeps the result bit-identical however the
// meals were ordered on the way in.
fn ordered_sum(mut values: Vec<f64>) -> f64 {
    values.sort_by(f64::total_cmp);
    values.into_iter().fold(0.0, |acc, v| acc + v)
}

/// Field-wise sum of the already scaled macros of `meals`.
pub fn daily_totals<'a, I>(meals: I) -> CanonicalMacros
where
    I: IntoIterator<Item = &'a LoggedMeal>,
{
    let mut fields: [Vec<f64>; 5] = Default::default();
    for meal in meals {
        let m = &meal.macros;
        fields[0].push(m.protein);
        fields[1].push(m.carbohydrate);
        fields[2].push(m.fat);
        fields[3].push(m.calories);
        fields[4].push(m.fiber);
    }
    let [protein, carbohydrate, fat, calories, fiber] = fields.map(ordered_sum);
    CanonicalMacros { protein, carbohydrate, fat, calories, fiber }
}

/// Per-day totals for every day in `start..=end`, newest first.
///
/// Days without meals, and days whose meals add up to zero calories, are
/// left out.
pub fn range_totals(meals: &[LoggedMeal], start: NaiveDate, end: NaiveDate) -> Vec<DayTotals> {
    let mut by_day: BTreeMap<NaiveDate, Vec<&LoggedMeal>> = BTreeMap::new();
    for meal in meals.iter().filter(|m| m.meal_date >= start && m.meal_date <= end) {
        by_day.entry(meal.meal_date).or_default().push(meal);
    }

    by_day
        .into_iter()
        .rev()
        .map(|(date, day_meals)| DayTotals { date, totals: daily_totals(day_meals) })
        .filter(|day| day.totals.calories > 0.0)
        .collect()
}
