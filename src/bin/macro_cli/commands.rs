use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use std::sync::Arc;
use chrono::NaiveDate;
use log::info;
use sqlx::PgPool;
use uuid::Uuid;
use macro_tracker::core::health::Gender;
use macro_tracker::core::macros::CanonicalMacros;
use macro_tracker::core::targets::{MacroSplit, MacroTargets, TargetComparison};
use macro_tracker::db;
use macro_tracker::errors::AppError;
use macro_tracker::export::{write_export, ExportError};
use macro_tracker::fdc::FoodDataProvider;
use macro_tracker::models::meal::MealType;
use macro_tracker::models::meal_plan::MealSlot;
use macro_tracker::models::user::{NewUser, User};
use macro_tracker::tracker::{self, history_start, today, MAX_RANGE_DAYS};

use crate::prompt::Prompt;

pub const DEFAULT_HISTORY_DAYS: u32 = 7;
const EXPORT_DAYS: u32 = 30;

pub const HELP: &str = "\
Available commands:
- search <food name>: look up foods
- add <fdcId> <grams> <meal type>: log a food (breakfast, lunch, dinner, snack)
- report: today's totals against your targets
- plan: manage meal plans
- health: BMI and estimated body fat
- goals [set]: show or set nutrition targets
- history [days]: daily totals for the last days (default 7)
- profile: edit your details
- export: write the last 30 days to CSV
- exit: quit";

#[derive(Debug, thiserror::Error)]
pub enum CliError {
    #[error("{0}")]
    App(#[from] AppError),

    #[error(transparent)]
    Io(#[from] io::Error),

    #[error("{0}")]
    Export(#[from] ExportError),
}

impl From<sqlx::Error> for CliError {
    fn from(err: sqlx::Error) -> Self {
        CliError::App(err.into())
    }
}

#[derive(Debug, PartialEq)]
pub enum Command {
    Search(String),
    Add { fdc_id: i64, grams: f64, meal_type: MealType },
    Report,
    Plan,
    Health,
    Goals { set: bool },
    History(u32),
    Profile,
    Export,
    Help,
    Exit,
}

/// Parses one input line. Blank lines give `Ok(None)`; malformed commands
/// give the usage text to show.
pub fn parse_command(line: &str) -> Result<Option<Command>, String> {
    let args: Vec<&str> = line.split_whitespace().collect();
    let Some((&name, rest)) = args.split_first() else {
        return Ok(None);
    };

    let command = match name {
        "search" => {
            if rest.is_empty() {
                return Err("Usage: search <food name>".to_string());
            }
            Command::Search(rest.join(" "))
        }
        "add" => {
            let usage = "Usage: add <fdcId> <grams> <meal type>\nMeal types: breakfast, lunch, dinner, snack";
            let [fdc_id, grams, meal_type] = rest else {
                return Err(usage.to_string());
            };
            let fdc_id = fdc_id
                .parse::<i64>()
                .ok()
                .filter(|id| *id > 0)
                .ok_or_else(|| "Invalid food id".to_string())?;
            let grams = grams
                .parse::<f64>()
                .ok()
                .filter(|g| g.is_finite() && *g > 0.0)
                .ok_or_else(|| "Invalid quantity".to_string())?;
            let meal_type = meal_type
                .parse::<MealType>()
                .map_err(|_| "Invalid meal type. Use breakfast, lunch, dinner or snack".to_string())?;
            Command::Add { fdc_id, grams, meal_type }
        }
        "report" => Command::Report,
        "plan" => Command::Plan,
        "health" => Command::Health,
        "goals" => match rest {
            [] => Command::Goals { set: false },
            ["set"] => Command::Goals { set: true },
            _ => return Err("Usage: goals [set]".to_string()),
        },
        "history" => {
            let days = rest
                .first()
                .and_then(|d| d.parse::<u32>().ok())
                .filter(|d| *d > 0)
                .unwrap_or(DEFAULT_HISTORY_DAYS);
            if days > MAX_RANGE_DAYS {
                return Err(format!("Usage: history [days], at most {} days", MAX_RANGE_DAYS));
            }
            Command::History(days)
        }
        "profile" => Command::Profile,
        "export" => Command::Export,
        "help" => Command::Help,
        "exit" | "quit" => Command::Exit,
        other => return Err(format!("Unknown command '{}'. Type 'help' for the list.", other)),
    };
    Ok(Some(command))
}

fn percent(pct: Option<f64>) -> String {
    pct.map(|p| format!("{:.0}%", p)).unwrap_or_else(|| "n/a".to_string())
}

pub fn format_totals(totals: &CanonicalMacros) -> String {
    format!(
        "{:.0} kcal, P:{:.1}g, C:{:.1}g, F:{:.1}g, Fiber:{:.1}g",
        totals.calories, totals.protein, totals.carbohydrate, totals.fat, totals.fiber
    )
}

pub fn format_comparison(totals: &CanonicalMacros, targets: &MacroTargets, cmp: &TargetComparison) -> Vec<String> {
    vec![
        format!("- Calories: {:.0}/{:.0} kcal ({})", totals.calories, targets.calories, percent(cmp.calories)),
        format!("- Protein: {:.1}/{:.1}g ({})", totals.protein, targets.protein_g, percent(cmp.protein)),
        format!("- Carbohydrate: {:.1}/{:.1}g ({})", totals.carbohydrate, targets.carbohydrate_g, percent(cmp.carbohydrate)),
        format!("- Fat: {:.1}/{:.1}g ({})", totals.fat, targets.fat_g, percent(cmp.fat)),
        format!("- Fiber: {:.1}/{:.1}g ({})", totals.fiber, targets.fiber_g, percent(cmp.fiber)),
    ]
}

fn date_label(date: NaiveDate) -> String {
    date.format("%d/%m/%Y").to_string()
}

/// Creates a user from answers at the prompt.
pub async fn register<R: BufRead, W: Write>(pool: &PgPool, prompt: &mut Prompt<R, W>) -> Result<User, CliError> {
    let name = loop {
        let name = prompt.line("Name: ")?;
        if !name.is_empty() {
            break name;
        }
    };
    let age = prompt.number("Age: ", |a: &i32| (1..=150).contains(a))?;
    let weight_kg = prompt.number("Weight (kg): ", |w: &f64| *w > 0.0 && *w <= 700.0)?;
    let height_cm = prompt.number("Height (cm): ", |h: &f64| *h > 0.0 && *h <= 300.0)?;
    let gender = prompt.number::<Gender, _>("Gender (male/female): ", |_| true)?;

    let user = db::users::create_user(pool, &NewUser { name, age, weight_kg, height_cm, gender }).await?;
    println!("Account created. Your id is: {}", user.user_id);
    Ok(user)
}

/// Loads `user_id` when given and known, otherwise asks for one or registers a
/// new account.
pub async fn sign_in<R: BufRead, W: Write>(
    pool: &PgPool,
    prompt: &mut Prompt<R, W>,
    user_id: Option<Uuid>,
) -> Result<User, CliError> {
    let user_id = match user_id {
        Some(id) => Some(id),
        None => prompt
            .optional::<Uuid, _>("Enter your user id (blank to create an account): ", |_| true)?,
    };

    if let Some(id) = user_id {
        match db::users::get_user(pool, id).await? {
            Some(user) => {
                println!("Welcome back, {}!", user.name);
                return Ok(user);
            }
            None => println!("User not found. Creating a new account..."),
        }
    }
    register(pool, prompt).await
}

pub struct Session {
    pub pool: PgPool,
    pub provider: Arc<dyn FoodDataProvider>,
    pub user: User,
    pub export_dir: PathBuf,
}

impl Session {
    pub async fn search(&self, query: &str) -> Result<(), CliError> {
        let foods = tracker::search_foods(&*self.provider, query).await?;
        if foods.is_empty() {
            println!("No foods found.");
            return Ok(());
        }

        println!("\nSearch results (per 100 g):");
        for food in &foods {
            println!("- {}: {} ({})", food.fdc_id, food.description, format_totals(&food.macros));
        }
        Ok(())
    }

    pub async fn add(&self, fdc_id: i64, grams: f64, meal_type: MealType) -> Result<(), CliError> {
        let meal = tracker::log_food(&self.pool, &*self.provider, self.user.user_id, fdc_id, grams, meal_type, today()).await?;
        if meal.macros.has_no_energy_data() {
            println!("Warning: no nutritional values were found for this food.");
        }
        println!("Added {:.0}g of {} to {}: {}", grams, meal.food_name, meal_type, format_totals(&meal.macros));
        Ok(())
    }

    pub async fn report(&self) -> Result<(), CliError> {
        let report = tracker::daily_report(&self.pool, &self.user, today()).await?;

        println!("\nNutrition report for {}:", date_label(report.date));
        println!("\nMeals:");
        for meal in &report.meals {
            println!("- {}: {} ({:.0}g)", meal.meal_type, meal.food_name, meal.quantity_g);
        }
        println!("\nDaily totals: {}", format_totals(&report.totals));

        if let (Some(targets), Some(cmp)) = (&report.targets, &report.comparison) {
            println!("\nAgainst your targets:");
            for line in format_comparison(&report.totals, targets, cmp) {
                println!("{}", line);
            }
        }
        Ok(())
    }

    pub fn health(&self) {
        let health = self.user.health();
        println!("\nHealth:");
        println!("- Weight: {:.1} kg", health.weight_kg);
        println!("- Height: {:.1} cm", health.height_cm);
        println!("- BMI: {:.1} ({})", health.bmi, health.category);
        println!("- Estimated body fat: {:.1}%", health.body_fat_pct);
    }

    pub fn show_goals(&self) {
        println!("\nYour nutrition targets:");
        let Some(targets) = self.user.active_targets() else {
            println!("No targets set. Use 'goals set' to define them.");
            return;
        };

        let split = targets.energy_split().unwrap_or_default();
        println!("- Calories: {:.0} kcal", targets.calories);
        println!("- Protein: {:.1}g ({:.0}%)", targets.protein_g, split.protein_pct);
        println!("- Carbohydrate: {:.1}g ({:.0}%)", targets.carbohydrate_g, split.carbohydrate_pct);
        println!("- Fat: {:.1}g ({:.0}%)", targets.fat_g, split.fat_pct);
        println!("- Fiber: {:.1}g", targets.fiber_g);
    }

    pub async fn set_goals<R: BufRead, W: Write>(&mut self, prompt: &mut Prompt<R, W>) -> Result<(), CliError> {
        let pct = |p: &f64| (0.0..=100.0).contains(p);

        println!("\nSetting nutrition targets:");
        let calories = prompt.number("Daily calories: ", |c: &f64| *c > 0.0 && c.is_finite())?;
        let split = MacroSplit {
            protein_pct: prompt.number("Protein share (e.g. 30 for 30%): ", pct)?,
            carbohydrate_pct: prompt.number("Carbohydrate share (e.g. 40 for 40%): ", pct)?,
            fat_pct: prompt.number("Fat share (e.g. 30 for 30%): ", pct)?,
        };

        let mut normalize = false;
        if split.needs_normalization() {
            println!("Warning: the shares add up to {:.0}% instead of 100%", split.total());
            normalize = prompt.confirm("Adjust them automatically?")?;
            if !normalize {
                println!("Targets not saved.");
                return Ok(());
            }
            let adjusted = split.normalized();
            println!(
                "Adjusted shares: protein {:.0}%, carbohydrate {:.0}%, fat {:.0}%",
                adjusted.protein_pct, adjusted.carbohydrate_pct, adjusted.fat_pct
            );
        }
        let fiber_g = prompt.number("Fiber target (g): ", |f: &f64| *f >= 0.0 && f.is_finite())?;

        self.user = tracker::set_targets(&self.pool, self.user.clone(), calories, split, fiber_g, normalize).await?;
        println!("Nutrition targets updated.");
        Ok(())
    }

    pub async fn history(&self, days: u32) -> Result<(), CliError> {
        let end = today();
        let totals = tracker::history(&self.pool, self.user.user_id, days, end).await?;

        println!(
            "\nNutrition history from {} to {}:\n",
            date_label(history_start(days, end)),
            date_label(end)
        );
        for day in &totals {
            println!("- {}: {}", date_label(day.date), format_totals(&day.totals));
        }
        Ok(())
    }

    pub async fn profile<R: BufRead, W: Write>(&mut self, prompt: &mut Prompt<R, W>) -> Result<(), CliError> {
        let mut user = self.user.clone();

        println!("\nEditing profile (leave blank to keep the current value):");
        let name = prompt.line(&format!("Name [{}]: ", user.name))?;
        if !name.is_empty() {
            user.name = name;
        }
        if let Some(age) = prompt.optional(&format!("Age [{}]: ", user.age), |a: &i32| (1..=150).contains(a))? {
            user.age = age;
        }
        if let Some(weight) = prompt.optional(&format!("Weight [{:.1} kg]: ", user.weight_kg), |w: &f64| *w > 0.0 && *w <= 700.0)? {
            user.weight_kg = weight;
        }
        if let Some(height) = prompt.optional(&format!("Height [{:.1} cm]: ", user.height_cm), |h: &f64| *h > 0.0 && *h <= 300.0)? {
            user.height_cm = height;
        }
        if let Some(gender) = prompt.optional::<Gender, _>(&format!("Gender [{}]: ", user.gender), |_| true)? {
            user.gender = gender;
        }

        self.user = db::users::update_user(&self.pool, &user).await?;
        println!("Profile updated.");
        Ok(())
    }

    pub async fn export(&self) -> Result<(), CliError> {
        let end = today();
        let meals = db::meals::meals_between(&self.pool, self.user.user_id, history_start(EXPORT_DAYS, end), end).await?;
        let path = write_export(&self.export_dir, self.user.user_id, end, &meals)?;

        info!("Exported {} meals for user {}", meals.len(), self.user.user_id);
        println!("Data exported to: {}", path.display());
        Ok(())
    }

    pub async fn plan<R: BufRead, W: Write>(&self, prompt: &mut Prompt<R, W>) -> Result<(), CliError> {
        println!("\nMeal plans");
        println!("1. Create a meal plan");
        println!("2. List meal plans");
        println!("3. Add a food to a meal plan");

        match prompt.line("Choose an option (1-3): ")?.as_str() {
            "1" => self.create_plan(prompt).await,
            "2" => self.list_plans().await,
            "3" => self.add_to_plan(prompt).await,
            _ => {
                println!("Invalid option.");
                Ok(())
            }
        }
    }

    async fn create_plan<R: BufRead, W: Write>(&self, prompt: &mut Prompt<R, W>) -> Result<(), CliError> {
        let name = prompt.line("Plan name: ")?;
        if name.is_empty() {
            println!("A plan needs a name.");
            return Ok(());
        }
        let description = prompt.line("Description: ")?;

        let plan = db::meal_plans::create_plan(&self.pool, self.user.user_id, &name, &description).await?;
        println!("Meal plan '{}' created.", plan.name);
        Ok(())
    }

    async fn list_plans(&self) -> Result<(), CliError> {
        let plans = db::meal_plans::list_plans(&self.pool, self.user.user_id).await?;
        if plans.is_empty() {
            println!("No meal plans yet.");
            return Ok(());
        }

        println!("\nMeal plans:");
        for (i, entry) in plans.iter().enumerate() {
            println!("\n{}. {}", i + 1, entry.plan.name);
            println!("   Description: {}", entry.plan.description);
            if !entry.items.is_empty() {
                println!("   Meals:");
                for item in &entry.items {
                    println!("   - {}: {} ({:.0}g)", item.slot, item.food_name, item.quantity_g);
                }
            }
        }
        Ok(())
    }

    async fn add_to_plan<R: BufRead, W: Write>(&self, prompt: &mut Prompt<R, W>) -> Result<(), CliError> {
        let plans = db::meal_plans::list_plans(&self.pool, self.user.user_id).await?;
        if plans.is_empty() {
            println!("No meal plans yet. Create one first.");
            return Ok(());
        }

        println!("\nChoose a meal plan:");
        for (i, entry) in plans.iter().enumerate() {
            println!("{}. {}", i + 1, entry.plan.name);
        }
        let choice = prompt.number("Plan number: ", |n: &usize| (1..=plans.len()).contains(n))?;
        let plan = &plans[choice - 1].plan;

        println!("\nMeal slots:");
        for (i, slot) in MealSlot::ALL.iter().enumerate() {
            println!("{}. {}", i + 1, slot);
        }
        let slot_choice = prompt.number("Choose a slot (1-5): ", |n: &usize| (1..=MealSlot::ALL.len()).contains(n))?;
        let slot = MealSlot::ALL[slot_choice - 1];

        let query = prompt.line("\nSearch for a food: ")?;
        let foods = tracker::search_foods(&*self.provider, &query).await?;
        if foods.is_empty() {
            println!("No foods found.");
            return Ok(());
        }
        println!("\nSearch results:");
        for (i, food) in foods.iter().enumerate() {
            println!("{}. {}", i + 1, food.description);
        }
        let food_choice = prompt.number("Choose a food (number): ", |n: &usize| (1..=foods.len()).contains(n))?;
        let food = &foods[food_choice - 1];
        let grams = prompt.number("Quantity (g): ", |g: &f64| *g > 0.0 && g.is_finite())?;

        tracker::add_plan_item(&self.pool, &*self.provider, plan.plan_id, food.fdc_id, grams, slot).await?;
        println!("\nAdded {} to meal plan '{}'.", food.description, plan.name);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_add_with_meal_type_alias() {
        let cmd = parse_command("add 171077 150 dejeuner").unwrap();
        assert_eq!(
            cmd,
            Some(Command::Add { fdc_id: 171077, grams: 150.0, meal_type: MealType::Lunch })
        );
    }

    #[test]
    fn add_rejects_bad_arguments() {
        assert!(parse_command("add 171077 150").is_err());
        assert!(parse_command("add abc 150 lunch").is_err());
        assert!(parse_command("add 171077 -3 lunch").is_err());
        assert!(parse_command("add 171077 150 brunch").is_err());
    }

    #[test]
    fn search_joins_words() {
        assert_eq!(
            parse_command("search  chicken   breast ").unwrap(),
            Some(Command::Search("chicken breast".to_string()))
        );
        assert!(parse_command("search").is_err());
    }

    #[test]
    fn history_falls_back_to_a_week() {
        assert_eq!(parse_command("history").unwrap(), Some(Command::History(7)));
        assert_eq!(parse_command("history 30").unwrap(), Some(Command::History(30)));
        assert_eq!(parse_command("history 0").unwrap(), Some(Command::History(7)));
        assert_eq!(parse_command("history x").unwrap(), Some(Command::History(7)));
    }

    #[test]
    fn history_beyond_a_year_is_refused() {
        assert_eq!(parse_command("history 366").unwrap(), Some(Command::History(366)));
        assert!(parse_command("history 367").is_err());
        assert!(parse_command("history 4000000000").is_err());
    }

    #[test]
    fn goals_set_and_blank_lines() {
        assert_eq!(parse_command("goals").unwrap(), Some(Command::Goals { set: false }));
        assert_eq!(parse_command("goals set").unwrap(), Some(Command::Goals { set: true }));
        assert!(parse_command("goals show").is_err());
        assert!(parse_command("goals set now").is_err());
        assert_eq!(parse_command("   ").unwrap(), None);
        assert!(parse_command("dance").is_err());
    }

    #[test]
    fn comparison_marks_missing_targets() {
        let totals = CanonicalMacros { protein: 75.0, carbohydrate: 0.0, fat: 0.0, calories: 1000.0, fiber: 0.0 };
        let targets = MacroTargets { calories: 2000.0, protein_g: 150.0, carbohydrate_g: 200.0, fat_g: 66.7, fiber_g: 0.0 };
        let cmp = macro_tracker::core::targets::compare(&totals, &targets);

        let lines = format_comparison(&totals, &targets, &cmp);
        assert_eq!(lines[0], "- Calories: 1000/2000 kcal (50%)");
        assert_eq!(lines[1], "- Protein: 75.0/150.0g (50%)");
        assert_eq!(lines[4], "- Fiber: 0.0/0.0g (n/a)");
    }
}
