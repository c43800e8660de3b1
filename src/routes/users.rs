use crate::{
    auth::{AuthenticatedUserId, PasswordCipher},
    error::AppError,
    models::{NewUser, UserInput},
    store::{email_taken, Store},
};
use actix_web::{delete, get, put, web, HttpResponse, Responder};
use validator::Validate;

/// Retrieves the caller's own account.
///
/// ## Responses:
/// - `200 OK`: the `User` as JSON.
/// - `403 Forbidden`: `{id}` is not the caller.
/// - `404 Not Found`: the account no longer exists.
#[get("/{id}")]
pub async fn get_user(
    store: web::Data<dyn Store>,
    user_id: web::Path<i64>,
    caller: AuthenticatedUserId,
) -> Result<impl Responder, AppError> {
    let id = caller.ensure_is(user_id.into_inner())?;
    let user = store.get_user_by_id(id).await?;
    Ok(HttpResponse::Ok().json(user))
}

/// Replaces the caller's name, email and password.
///
/// ## Responses:
/// - `200 OK`: the updated `User` as JSON.
/// - `400 Bad Request`: invalid payload, or the email belongs to another user.
/// - `403 Forbidden`: `{id}` is not the caller.
/// - `404 Not Found`: the account no longer exists.
#[put("/{id}")]
pub async fn update_user(
    store: web::Data<dyn Store>,
    cipher: web::Data<PasswordCipher>,
    user_id: web::Path<i64>,
    user_data: web::Json<UserInput>,
    caller: AuthenticatedUserId,
) -> Result<impl Responder, AppError> {
    user_data.validate()?;
    let id = caller.ensure_is(user_id.into_inner())?;
    let input = user_data.into_inner();

    match store.get_user_by_email(&input.email).await {
        Ok(owner) if owner.id != id => {
            return Err(email_taken(&input.email));
        }
        Ok(_) | Err(AppError::NotFound(_)) => {}
        Err(e) => return Err(e),
    }

    let user = store
        .update_user(
            id,
            &NewUser {
                password: cipher.encrypt(&input.password)?,
                name: input.name,
                email: input.email,
            },
        )
        .await?;

    Ok(HttpResponse::Ok().json(user))
}

/// Deletes the caller's account and, with it, all of their todos.
///
/// ## Responses:
/// - `204 No Content`: on successful deletion.
/// - `403 Forbidden`: `{id}` is not the caller.
/// - `404 Not Found`: the account no longer exists.
#[delete("/{id}")]
pub async fn delete_user(
    store: web::Data<dyn Store>,
    user_id: web::Path<i64>,
    caller: AuthenticatedUserId,
) -> Result<impl Responder, AppError> {
    let id = caller.ensure_is(user_id.into_inner())?;
    store.delete_user_by_id(id).await?;
    log::info!("deleted user {}", id);

    Ok(HttpResponse::NoContent().finish())
}
