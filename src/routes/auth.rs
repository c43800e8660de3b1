use crate::{
    auth::{AuthResponse, LoginRequest, PasswordCipher, TokenService},
    error::AppError,
    models::{NewUser, UserInput},
    store::{email_taken, Store},
};
use actix_web::{post, web, HttpResponse, Responder};
use validator::Validate;

/// Register a new user
///
/// Creates a new user account and returns an authentication token.
///
/// ## Responses:
/// - `201 Created`: `{token, user}`.
/// - `400 Bad Request`: invalid payload, or the email is already registered.
#[post("/register")]
pub async fn register(
    store: web::Data<dyn Store>,
    cipher: web::Data<PasswordCipher>,
    tokens: web::Data<TokenService>,
    register_data: web::Json<UserInput>,
) -> Result<impl Responder, AppError> {
    // Validate input
    register_data.validate()?;
    let input = register_data.into_inner();

    // Check if email already exists
    if store.check_email_exists(&input.email).await? {
        return Err(email_taken(&input.email));
    }

    let user = store
        .insert_user(&NewUser {
            password: cipher.encrypt(&input.password)?,
            name: input.name,
            email: input.email,
        })
        .await?;

    let token = tokens.issue(user.id)?;
    log::info!("registered user {}", user.id);

    Ok(HttpResponse::Created().json(AuthResponse { token, user }))
}

/// Login user
///
/// Authenticates a user and returns an authentication token.
/// A wrong password is reported as not found, like an unknown email.
#[post("/login")]
pub async fn login(
    store: web::Data<dyn Store>,
    cipher: web::Data<PasswordCipher>,
    tokens: web::Data<TokenService>,
    login_data: web::Json<LoginRequest>,
) -> Result<impl Responder, AppError> {
    login_data.validate()?;

    let user = store.get_user_by_email(&login_data.email).await?;
    if cipher.decrypt(&user.password)? != login_data.password {
        return Err(AppError::NotFound("invalid password".into()));
    }

    let token = tokens.issue(user.id)?;
    Ok(HttpResponse::Ok().json(AuthResponse { token, user }))
}
