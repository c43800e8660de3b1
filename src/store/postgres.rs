use async_trait::async_trait;
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;

use super::{email_not_found, email_taken, todo_not_found, user_not_found, Store};
use crate::config::DatabaseConfig;
use crate::error::AppError;
use crate::models::{NewTodo, NewUser, Todo, User};

const UNIQUE_VIOLATION: &str = "23505";

const USER_COLUMNS: &str = "id, name, email, password, joined_at";
const TODO_COLUMNS: &str = "id, user_id, title, description, status, created_at";

/// PostgreSQL-backed [`Store`].
#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    /// Opens a pool with a bounded acquire timeout and a per-connection
    /// `statement_timeout`.
    pub async fn connect(config: &DatabaseConfig) -> Result<Self, AppError> {
        let pool = PgPoolOptions::new()
            .max_connections(config.max_connections)
            .acquire_timeout(config.acquire_timeout())
            .connect_with(config.connect_options())
            .await?;

        log::info!(
            "connected to postgres at {}:{}/{}",
            config.host,
            config.port,
            config.name
        );
        Ok(Self { pool })
    }

    /// Create a store from an existing pool (useful for testing).
    pub fn from_pool(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Run all pending migrations.
    pub async fn migrate(&self) -> Result<(), AppError> {
        sqlx::migrate!("./migrations")
            .run(&self.pool)
            .await
            .map_err(|e| AppError::Internal(format!("migration failed: {}", e)))
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

/// Maps a unique violation on `users.email` to `AlreadyExists`; anything else
/// stays a database error.
fn map_user_write_error(error: sqlx::Error, email: &str) -> AppError {
    match &error {
        sqlx::Error::Database(db) if db.code().as_deref() == Some(UNIQUE_VIOLATION) => {
            email_taken(email)
        }
        _ => AppError::Database(error),
    }
}

#[async_trait]
impl Store for PgStore {
    async fn insert_user(&self, user: &NewUser) -> Result<User, AppError> {
        let sql = format!(
            "INSERT INTO users (name, email, password) VALUES ($1, $2, $3) RETURNING {}",
            USER_COLUMNS
        );
        sqlx::query_as::<_, User>(&sql)
            .bind(&user.name)
            .bind(&user.email)
            .bind(&user.password)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| map_user_write_error(e, &user.email))
    }

    async fn get_user_by_id(&self, id: i64) -> Result<User, AppError> {
        let sql = format!("SELECT {} FROM users WHERE id = $1", USER_COLUMNS);
        sqlx::query_as::<_, User>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| user_not_found(id))
    }

    async fn get_user_by_email(&self, email: &str) -> Result<User, AppError> {
        let sql = format!("SELECT {} FROM users WHERE email = $1", USER_COLUMNS);
        sqlx::query_as::<_, User>(&sql)
            .bind(email)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| email_not_found(email))
    }

    async fn update_user(&self, id: i64, user: &NewUser) -> Result<User, AppError> {
        let sql = format!(
            "UPDATE users SET name = $1, email = $2, password = $3 WHERE id = $4 RETURNING {}",
            USER_COLUMNS
        );
        sqlx::query_as::<_, User>(&sql)
            .bind(&user.name)
            .bind(&user.email)
            .bind(&user.password)
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| map_user_write_error(e, &user.email))?
            .ok_or_else(|| user_not_found(id))
    }

    async fn delete_user_by_id(&self, id: i64) -> Result<(), AppError> {
        let result = sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(user_not_found(id));
        }
        Ok(())
    }

    async fn check_email_exists(&self, email: &str) -> Result<bool, AppError> {
        let row = sqlx::query_scalar::<_, i64>("SELECT id FROM users WHERE email = $1")
            .bind(email)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.is_some())
    }

    async fn check_user_id_exists(&self, id: i64) -> Result<bool, AppError> {
        let row = sqlx::query_scalar::<_, i64>("SELECT id FROM users WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.is_some())
    }

    async fn insert_todo(&self, user_id: i64, todo: &NewTodo) -> Result<Todo, AppError> {
        let sql = format!(
            "INSERT INTO todos (user_id, title, description, status) VALUES ($1, $2, $3, $4) \
             RETURNING {}",
            TODO_COLUMNS
        );
        let todo = sqlx::query_as::<_, Todo>(&sql)
            .bind(user_id)
            .bind(&todo.title)
            .bind(&todo.description)
            .bind(todo.status)
            .fetch_one(&self.pool)
            .await?;
        Ok(todo)
    }

    async fn get_todo_by_id_and_user_id(&self, id: i64, user_id: i64) -> Result<Todo, AppError> {
        let sql = format!(
            "SELECT {} FROM todos WHERE id = $1 AND user_id = $2",
            TODO_COLUMNS
        );
        sqlx::query_as::<_, Todo>(&sql)
            .bind(id)
            .bind(user_id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| todo_not_found(id, user_id))
    }

    async fn update_todo(&self, id: i64, user_id: i64, todo: &NewTodo) -> Result<Todo, AppError> {
        let sql = format!(
            "UPDATE todos SET title = $1, description = $2, status = $3 \
             WHERE id = $4 AND user_id = $5 RETURNING {}",
            TODO_COLUMNS
        );
        sqlx::query_as::<_, Todo>(&sql)
            .bind(&todo.title)
            .bind(&todo.description)
            .bind(todo.status)
            .bind(id)
            .bind(user_id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| todo_not_found(id, user_id))
    }

    async fn delete_todo_by_id_and_user_id(&self, id: i64, user_id: i64) -> Result<(), AppError> {
        let result = sqlx::query("DELETE FROM todos WHERE id = $1 AND user_id = $2")
            .bind(id)
            .bind(user_id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(todo_not_found(id, user_id));
        }
        Ok(())
    }

    async fn delete_all_todos_by_user_id(&self, user_id: i64) -> Result<u64, AppError> {
        let result = sqlx::query("DELETE FROM todos WHERE user_id = $1")
            .bind(user_id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected())
    }

    async fn get_all_todos_by_user_id(&self, user_id: i64) -> Result<Vec<Todo>, AppError> {
        let sql = format!(
            "SELECT {} FROM todos WHERE user_id = $1 ORDER BY created_at DESC, id DESC",
            TODO_COLUMNS
        );
        let todos = sqlx::query_as::<_, Todo>(&sql)
            .bind(user_id)
            .fetch_all(&self.pool)
            .await?;
        Ok(todos)
    }
}
