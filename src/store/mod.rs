//! Persistence gateway.
//!
//! Handlers only talk to storage through [`Store`]. Production wiring uses
//! [`PgStore`]; [`MemoryStore`] keeps the same contract in process memory and
//! backs the handler tests.
//!
//! Every todo read or mutation is keyed by both the todo id and the owning
//! user id, so a caller can never reach another user's records through this
//! trait. Operations addressing a single row fail with `AppError::NotFound`
//! when no row matched.

pub mod memory;
pub mod postgres;

use async_trait::async_trait;

use crate::error::AppError;
use crate::models::{NewTodo, NewUser, Todo, User};

pub use memory::MemoryStore;
pub use postgres::PgStore;

#[async_trait]
pub trait Store: Send + Sync {
    /// Fails with `AlreadyExists` if the email is taken.
    async fn insert_user(&self, user: &NewUser) -> Result<User, AppError>;
    async fn get_user_by_id(&self, id: i64) -> Result<User, AppError>;
    async fn get_user_by_email(&self, email: &str) -> Result<User, AppError>;
    async fn update_user(&self, id: i64, user: &NewUser) -> Result<User, AppError>;
    /// Removes the user together with all of their todos.
    async fn delete_user_by_id(&self, id: i64) -> Result<(), AppError>;
    async fn check_email_exists(&self, email: &str) -> Result<bool, AppError>;
    async fn check_user_id_exists(&self, id: i64) -> Result<bool, AppError>;

    async fn insert_todo(&self, user_id: i64, todo: &NewTodo) -> Result<Todo, AppError>;
    async fn get_todo_by_id_and_user_id(&self, id: i64, user_id: i64) -> Result<Todo, AppError>;
    async fn update_todo(&self, id: i64, user_id: i64, todo: &NewTodo) -> Result<Todo, AppError>;
    async fn delete_todo_by_id_and_user_id(&self, id: i64, user_id: i64) -> Result<(), AppError>;
    /// Returns the number of todos removed. Zero is not an error.
    async fn delete_all_todos_by_user_id(&self, user_id: i64) -> Result<u64, AppError>;
    /// Newest first; ties on `created_at` are broken by descending id.
    async fn get_all_todos_by_user_id(&self, user_id: i64) -> Result<Vec<Todo>, AppError>;
}

pub(crate) fn user_not_found(id: i64) -> AppError {
    AppError::NotFound(format!("no user with id {} found", id))
}

pub(crate) fn email_not_found(email: &str) -> AppError {
    AppError::NotFound(format!("no user with email {} found", email))
}

pub fn email_taken(email: &str) -> AppError {
    AppError::AlreadyExists(format!("user with email {} already exists", email))
}

pub(crate) fn todo_not_found(id: i64, user_id: i64) -> AppError {
    AppError::NotFound(format!("no todo with id {} found for user {}", id, user_id))
}
