//! PostgreSQL persistence for users, logged meals and meal plans.

pub mod meal_plans;
pub mod meals;
pub mod users;

use log::info;
use sqlx::postgres::{PgPool, PgPoolOptions};

pub async fn connect(database_url: &str) -> Result<PgPool, sqlx::Error> {
    let pool = PgPoolOptions::new()
        .max_connections(10)
        .connect(database_url)
        .await?;

    sqlx::migrate!("./migrations").run(&pool).await?;
    info!("Database ready, migrations applied");

    Ok(pool)
}
