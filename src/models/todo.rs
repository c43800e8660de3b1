use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use std::fmt;
use std::str::FromStr;
use validator::{Validate, ValidationError};

use crate::error::AppError;

/// Represents the status of a todo.
/// Corresponds to the `todo_status` SQL enum.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, sqlx::Type)]
#[sqlx(type_name = "todo_status", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum TodoStatus {
    /// Not started.
    Todo,
    /// In progress.
    Doing,
    /// Finished.
    Done,
}

impl TodoStatus {
    pub const ALL: [TodoStatus; 3] = [TodoStatus::Todo, TodoStatus::Doing, TodoStatus::Done];

    pub fn as_str(&self) -> &'static str {
        match self {
            TodoStatus::Todo => "todo",
            TodoStatus::Doing => "doing",
            TodoStatus::Done => "done",
        }
    }
}

impl fmt::Display for TodoStatus {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TodoStatus {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        TodoStatus::ALL
            .into_iter()
            .find(|status| status.as_str() == s)
            .ok_or_else(|| {
                AppError::InvalidRequestData(format!(
                    "status must be one of: todo, doing, done (got {:?})",
                    s
                ))
            })
    }
}

fn validate_status(status: &str) -> Result<(), ValidationError> {
    match status.parse::<TodoStatus>() {
        Ok(_) => Ok(()),
        Err(_) => {
            let mut err = ValidationError::new("status");
            err.message = Some("status must be one of: todo, doing, done".into());
            Err(err)
        }
    }
}

/// Payload for creating or updating a todo.
#[derive(Debug, Serialize, Deserialize, Validate)]
pub struct TodoInput {
    #[validate(length(min = 1, message = "title is required"))]
    pub title: String,

    #[validate(length(min = 1, message = "description is required"))]
    pub description: String,

    #[validate(custom = "validate_status")]
    pub status: String,
}

/// Column values for inserting or updating a todo.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewTodo {
    pub title: String,
    pub description: String,
    pub status: TodoStatus,
}

impl TryFrom<TodoInput> for NewTodo {
    type Error = AppError;

    /// Validates the payload and resolves its status.
    fn try_from(input: TodoInput) -> Result<Self, Self::Error> {
        input.validate()?;
        Ok(Self {
            status: input.status.parse()?,
            title: input.title,
            description: input.description,
        })
    }
}

/// Represents a todo entity as stored in the database and returned by the API.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Todo {
    pub id: i64,
    /// Identifier of the owning user. Never changes after creation.
    pub user_id: i64,
    pub title: String,
    pub description: String,
    pub status: TodoStatus,
    pub created_at: DateTime<Utc>,
}
