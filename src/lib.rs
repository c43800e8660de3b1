#![doc = "The `todo_api` library crate."]
#![doc = ""]
#![doc = "This crate contains the domain models, credential handling, persistence gateway,"]
#![doc = "routing configuration, and error handling for the todo API."]
#![doc = "It is used by the main binary (`main.rs`) and by the integration tests."]

pub mod auth;
pub mod config;
pub mod error;
pub mod models;
pub mod routes;
pub mod store;

pub use crate::error::AppError;
