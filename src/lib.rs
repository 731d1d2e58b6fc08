#![doc = "The `tasksync` library crate."]
#![doc = ""]
#![doc = "Account management, session tokens and per-user task storage for the"]
#![doc = "tasksync HTTP API, including bulk ingestion of tasks created offline."]
#![doc = "The binary (`main.rs`) only loads configuration and starts the server."]

pub mod auth;
pub mod config;
pub mod db;
pub mod error;
pub mod models;
pub mod routes;
pub mod sync;

pub use crate::error::AppError;
