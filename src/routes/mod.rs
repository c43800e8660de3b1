pub mod auth;
pub mod health;
pub mod todos;
pub mod users;

use actix_web::{error, web, HttpRequest};

use crate::auth::{ActiveUserGuard, AuthMiddleware};
use crate::error::AppError;

pub const INVALID_JSON_MSG: &str = "invalid JSON request data";

fn json_error(err: error::JsonPayloadError, req: &HttpRequest) -> actix_web::Error {
    log::debug!("bad JSON body on {} {}: {}", req.method(), req.path(), err);
    AppError::InvalidRequestData(INVALID_JSON_MSG.into()).into()
}

fn path_error(err: error::PathError, _req: &HttpRequest) -> actix_web::Error {
    AppError::InvalidRequestData(format!("invalid path parameter: {}", err)).into()
}

/// Registers every route. Expects `Data<dyn Store>`, `Data<PasswordCipher>`
/// and `Data<TokenService>` to be present on the app.
pub fn config(cfg: &mut web::ServiceConfig) {
    cfg.app_data(web::JsonConfig::default().error_handler(json_error))
        .app_data(web::PathConfig::default().error_handler(path_error))
        .service(health::health)
        .service(auth::register)
        .service(auth::login)
        .service(
            web::scope("/users")
                .wrap(AuthMiddleware)
                .service(users::get_user)
                .service(users::update_user)
                .service(users::delete_user),
        )
        .service(
            // ActiveUserGuard is wrapped first so it runs after AuthMiddleware.
            web::scope("/todos")
                .wrap(ActiveUserGuard)
                .wrap(AuthMiddleware)
                .service(todos::get_todos)
                .service(todos::create_todo)
                .service(todos::delete_todos)
                .service(todos::get_todo)
                .service(todos::update_todo)
                .service(todos::delete_todo),
        );
}
