use actix_web::{web, App, HttpServer};
use actix_web::middleware::Logger;
use actix_web_prom::PrometheusMetricsBuilder;
use dotenv::dotenv;
use env_logger::Env;
use log::{error, info};
use std::collections::HashMap;
use std::io;
use std::sync::Arc;
use macro_tracker::config::Config;
use macro_tracker::db;
use macro_tracker::fdc::{FdcClient, FoodDataProvider};
use macro_tracker::handlers;

#[actix_web::main]
async fn main() -> io::Result<()> {
    dotenv().ok();
    env_logger::Builder::from_env(Env::default().default_filter_or("info")).init();

    let config = match Config::from_env() {
        Ok(config) => config,
        Err(err) => {
            error!("Invalid configuration: {}", err);
            std::process::exit(1);
        }
    };

    // Connect and migrate
    let pool = db::connect(&config.database_url).await.map_err(|err| {
        error!("Failed to connect to the database: {}", err);
        io::Error::other(err)
    })?;

    let provider: Arc<dyn FoodDataProvider> = Arc::new(FdcClient::new(config.fdc.clone()));
    let provider = web::Data::from(provider);

    let mut labels = HashMap::new();
    labels.insert("app".to_string(), "macro_tracker".to_string());
    let prometheus = PrometheusMetricsBuilder::new("api")
        .endpoint("/metrics")
        .const_labels(labels)
        .build()
        .map_err(|err| io::Error::other(err.to_string()))?;

    info!("Starting server at {}", config.bind_address);

    HttpServer::new(move || {
        App::new()
            .wrap(Logger::default())
            .wrap(prometheus.clone())
            .app_data(web::Data::new(pool.clone()))
            .app_data(provider.clone())
            .configure(handlers::configure)
    })
    .workers(num_cpus::get())
    .bind(&config.bind_address)?
    .run()
    .await
}
