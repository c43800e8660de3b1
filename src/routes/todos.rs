//! Todo handlers. The `/todos` scope is wrapped in `ActiveUserGuard`, so
//! every caller reaching them still has an account.

use crate::{
    auth::AuthenticatedUserId,
    error::AppError,
    models::{NewTodo, TodoInput},
    store::Store,
};
use actix_web::{delete, get, post, put, web, HttpResponse, Responder};

/// Retrieves a list of todos for the authenticated user.
///
/// Todos are ordered by creation date in descending order.
///
/// ## Responses:
/// - `200 OK`: Returns a JSON array of `Todo` objects.
/// - `401 Unauthorized`: If the request lacks a valid authentication token.
/// - `403 Forbidden`: If the token's user no longer exists.
#[get("")]
pub async fn get_todos(
    store: web::Data<dyn Store>,
    caller: AuthenticatedUserId,
) -> Result<impl Responder, AppError> {
    let user_id = caller.0;
    let todos = store.get_all_todos_by_user_id(user_id).await?;
    Ok(HttpResponse::Ok().json(todos))
}

/// Creates a new todo for the authenticated user.
///
/// ## Request Body:
/// - `title`: non-empty.
/// - `description`: non-empty.
/// - `status`: one of `todo`, `doing`, `done`.
///
/// ## Responses:
/// - `201 Created`: Returns the newly created `Todo` object as JSON.
/// - `400 Bad Request`: If the input data is invalid.
/// - `401 Unauthorized`: If the request lacks a valid authentication token.
/// - `403 Forbidden`: If the token's user no longer exists.
#[post("")]
pub async fn create_todo(
    store: web::Data<dyn Store>,
    todo_data: web::Json<TodoInput>,
    caller: AuthenticatedUserId,
) -> Result<impl Responder, AppError> {
    let user_id = caller.0;
    let todo = NewTodo::try_from(todo_data.into_inner())?;

    let created = store.insert_todo(user_id, &todo).await?;
    Ok(HttpResponse::Created().json(created))
}

/// Deletes every todo owned by the authenticated user.
#[delete("")]
pub async fn delete_todos(
    store: web::Data<dyn Store>,
    caller: AuthenticatedUserId,
) -> Result<impl Responder, AppError> {
    let user_id = caller.0;
    let removed = store.delete_all_todos_by_user_id(user_id).await?;
    log::debug!("removed {} todos for user {}", removed, user_id);

    Ok(HttpResponse::NoContent().finish())
}

/// Retrieves a specific todo by its ID.
///
/// ## Responses:
/// - `200 OK`: Returns the `Todo` object as JSON if found and owned by the user.
/// - `404 Not Found`: If the todo does not exist or is not owned by the authenticated user.
#[get("/{id}")]
pub async fn get_todo(
    store: web::Data<dyn Store>,
    todo_id: web::Path<i64>,
    caller: AuthenticatedUserId,
) -> Result<impl Responder, AppError> {
    let user_id = caller.0;
    let todo = store
        .get_todo_by_id_and_user_id(todo_id.into_inner(), user_id)
        .await?;
    Ok(HttpResponse::Ok().json(todo))
}

/// Updates an existing todo.
///
/// Only the owner of the todo can update it.
///
/// ## Responses:
/// - `200 OK`: Returns the updated `Todo` object as JSON.
/// - `400 Bad Request`: If the input data is invalid.
/// - `404 Not Found`: If the todo does not exist or is not owned by the authenticated user.
#[put("/{id}")]
pub async fn update_todo(
    store: web::Data<dyn Store>,
    todo_id: web::Path<i64>,
    todo_data: web::Json<TodoInput>,
    caller: AuthenticatedUserId,
) -> Result<impl Responder, AppError> {
    let user_id = caller.0;
    let todo = NewTodo::try_from(todo_data.into_inner())?;

    let updated = store
        .update_todo(todo_id.into_inner(), user_id, &todo)
        .await?;
    Ok(HttpResponse::Ok().json(updated))
}

/// Deletes a todo by its ID.
///
/// ## Responses:
/// - `204 No Content`: On successful deletion.
/// - `404 Not Found`: If the todo does not exist or is not owned by the authenticated user.
#[delete("/{id}")]
pub async fn delete_todo(
    store: web::Data<dyn Store>,
    todo_id: web::Path<i64>,
    caller: AuthenticatedUserId,
) -> Result<impl Responder, AppError> {
    let user_id = caller.0;
    store
        .delete_todo_by_id_and_user_id(todo_id.into_inner(), user_id)
        .await?;

    Ok(HttpResponse::NoContent().finish())
}
