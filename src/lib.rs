pub mod config;
pub mod core;
pub mod db;
pub mod errors;
pub mod export;
pub mod fdc;
pub mod handlers;
pub mod models;
pub mod tracker;
pub mod utils;
