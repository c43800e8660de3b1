use std::collections::BTreeMap;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;

use super::{email_not_found, email_taken, todo_not_found, user_not_found, Store};
use crate::error::AppError;
use crate::models::{NewTodo, NewUser, Todo, User};

#[derive(Default)]
struct Tables {
    users: BTreeMap<i64, User>,
    todos: BTreeMap<i64, Todo>,
    last_user_id: i64,
    last_todo_id: i64,
}

impl Tables {
    fn email_owner(&self, email: &str) -> Option<i64> {
        self.users
            .values()
            .find(|user| user.email == email)
            .map(|user| user.id)
    }
}

/// In-process [`Store`] with the same contract as the PostgreSQL store,
/// including email uniqueness and cascading todo removal.
#[derive(Default)]
pub struct MemoryStore {
    tables: RwLock<Tables>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl Store for MemoryStore {
    async fn insert_user(&self, user: &NewUser) -> Result<User, AppError> {
        let mut tables = self.tables.write().await;
        if tables.email_owner(&user.email).is_some() {
            return Err(email_taken(&user.email));
        }

        tables.last_user_id += 1;
        let created = User {
            id: tables.last_user_id,
            name: user.name.clone(),
            email: user.email.clone(),
            password: user.password.clone(),
            joined_at: Utc::now(),
        };
        tables.users.insert(created.id, created.clone());
        Ok(created)
    }

    async fn get_user_by_id(&self, id: i64) -> Result<User, AppError> {
        let tables = self.tables.read().await;
        tables.users.get(&id).cloned().ok_or_else(|| user_not_found(id))
    }

    async fn get_user_by_email(&self, email: &str) -> Result<User, AppError> {
        let tables = self.tables.read().await;
        tables
            .users
            .values()
            .find(|user| user.email == email)
            .cloned()
            .ok_or_else(|| email_not_found(email))
    }

    async fn update_user(&self, id: i64, user: &NewUser) -> Result<User, AppError> {
        let mut tables = self.tables.write().await;
        if matches!(tables.email_owner(&user.email), Some(owner) if owner != id) {
            return Err(email_taken(&user.email));
        }

        let existing = tables.users.get_mut(&id).ok_or_else(|| user_not_found(id))?;
        existing.name = user.name.clone();
        existing.email = user.email.clone();
        existing.password = user.password.clone();
        Ok(existing.clone())
    }

    async fn delete_user_by_id(&self, id: i64) -> Result<(), AppError> {
        let mut tables = self.tables.write().await;
        if tables.users.remove(&id).is_none() {
            return Err(user_not_found(id));
        }
        tables.todos.retain(|_, todo| todo.user_id != id);
        Ok(())
    }

    async fn check_email_exists(&self, email: &str) -> Result<bool, AppError> {
        Ok(self.tables.read().await.email_owner(email).is_some())
    }

    async fn check_user_id_exists(&self, id: i64) -> Result<bool, AppError> {
        Ok(self.tables.read().await.users.contains_key(&id))
    }

    async fn insert_todo(&self, user_id: i64, todo: &NewTodo) -> Result<Todo, AppError> {
        let mut tables = self.tables.write().await;
        // Mirrors the foreign key on todos.user_id.
        if !tables.users.contains_key(&user_id) {
            return Err(user_not_found(user_id));
        }

        tables.last_todo_id += 1;
        let created = Todo {
            id: tables.last_todo_id,
            user_id,
            title: todo.title.clone(),
            description: todo.description.clone(),
            status: todo.status,
            created_at: Utc::now(),
        };
        tables.todos.insert(created.id, created.clone());
        Ok(created)
    }

    async fn get_todo_by_id_and_user_id(&self, id: i64, user_id: i64) -> Result<Todo, AppError> {
        let tables = self.tables.read().await;
        tables
            .todos
            .get(&id)
            .filter(|todo| todo.user_id == user_id)
            .cloned()
            .ok_or_else(|| todo_not_found(id, user_id))
    }

    async fn update_todo(&self, id: i64, user_id: i64, todo: &NewTodo) -> Result<Todo, AppError> {
        let mut tables = self.tables.write().await;
        let existing = tables
            .todos
            .get_mut(&id)
            .filter(|existing| existing.user_id == user_id)
            .ok_or_else(|| todo_not_found(id, user_id))?;

        existing.title = todo.title.clone();
        existing.description = todo.description.clone();
        existing.status = todo.status;
        Ok(existing.clone())
    }

    async fn delete_todo_by_id_and_user_id(&self, id: i64, user_id: i64) -> Result<(), AppError> {
        let mut tables = self.tables.write().await;
        let owned = tables
            .todos
            .get(&id)
            .is_some_and(|todo| todo.user_id == user_id);
        if !owned {
            return Err(todo_not_found(id, user_id));
        }
        tables.todos.remove(&id);
        Ok(())
    }

    async fn delete_all_todos_by_user_id(&self, user_id: i64) -> Result<u64, AppError> {
        let mut tables = self.tables.write().await;
        let before = tables.todos.len();
        tables.todos.retain(|_, todo| todo.user_id != user_id);
        Ok((before - tables.todos.len()) as u64)
    }

    async fn get_all_todos_by_user_id(&self, user_id: i64) -> Result<Vec<Todo>, AppError> {
        let tables = self.tables.read().await;
        let mut todos: Vec<Todo> = tables
            .todos
            .values()
            .filter(|todo| todo.user_id == user_id)
            .cloned()
            .collect();
        todos.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
        Ok(todos)
    }
}
