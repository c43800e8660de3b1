#![allow(dead_code)]

use std::sync::Arc;

use actix_web::body::{to_bytes, MessageBody};
use actix_web::dev::{Service, ServiceResponse};
use actix_web::http::{header, StatusCode};
use actix_web::middleware::Logger;
use actix_web::{test, web, App};
use serde_json::{json, Value};

use todo_api::auth::{AuthResponse, PasswordCipher, TokenService};
use todo_api::routes;
use todo_api::store::{MemoryStore, Store};

pub const SECRET: &str = "integration-secret";

// Helper struct to hold auth details
pub struct TestUser {
    pub id: i64,
    pub token: String,
}

impl TestUser {
    pub fn bearer(&self) -> (header::HeaderName, String) {
        (header::AUTHORIZATION, format!("Bearer {}", self.token))
    }
}

pub fn tokens() -> TokenService {
    TokenService::new(SECRET, 1)
}

pub fn app_data(store: Arc<MemoryStore>) -> (web::Data<dyn Store>, web::Data<PasswordCipher>, web::Data<TokenService>) {
    (
        web::Data::from(store as Arc<dyn Store>),
        web::Data::new(PasswordCipher::new(SECRET)),
        web::Data::new(tokens()),
    )
}

pub async fn init_app(
    store: Arc<MemoryStore>,
) -> impl Service<
    actix_http::Request,
    Response = ServiceResponse<impl MessageBody>,
    Error = actix_web::Error,
> {
    let (store, cipher, tokens) = app_data(store);
    test::init_service(
        App::new()
            .app_data(store)
            .app_data(cipher)
            .app_data(tokens)
            .wrap(Logger::default())
            .configure(routes::config),
    )
    .await
}

/// Sends a request and returns status and body, whether the response came
/// from a handler or from a middleware error.
pub async fn send(
    app: &impl Service<
        actix_http::Request,
        Response = ServiceResponse<impl MessageBody>,
        Error = actix_web::Error,
    >,
    req: actix_http::Request,
) -> (StatusCode, web::Bytes) {
    match test::try_call_service(app, req).await {
        Ok(resp) => {
            let status = resp.status();
            (status, test::read_body(resp).await)
        }
        Err(err) => {
            let resp = err.error_response();
            let status = resp.status();
            let body = to_bytes(resp.into_body())
                .await
                .unwrap_or_else(|_| web::Bytes::new());
            (status, body)
        }
    }
}

pub fn json_body(body: &web::Bytes) -> Value {
    serde_json::from_slice(body).unwrap_or_else(|e| {
        panic!(
            "response is not JSON ({}): {:?}",
            e,
            String::from_utf8_lossy(body)
        )
    })
}

/// Asserts the uniform error envelope and returns its message.
pub fn assert_envelope(status: StatusCode, body: &web::Bytes, expected: StatusCode) -> String {
    assert_eq!(
        status,
        expected,
        "Expected {}, got {}. Body: {:?}",
        expected,
        status,
        String::from_utf8_lossy(body)
    );
    let envelope = json_body(body);
    assert_eq!(envelope["statusCode"], json!(expected.as_u16()));
    envelope["msg"].as_str().unwrap_or_default().to_string()
}

pub async fn register_user(
    app: &impl Service<
        actix_http::Request,
        Response = ServiceResponse<impl MessageBody>,
        Error = actix_web::Error,
    >,
    name: &str,
    email: &str,
    password: &str,
) -> Result<TestUser, String> {
    let req = test::TestRequest::post()
        .uri("/register")
        .set_json(json!({
            "name": name,
            "email": email,
            "password": password
        }))
        .to_request();
    let (status, body) = send(app, req).await;

    if status != StatusCode::CREATED {
        return Err(format!(
            "Failed to register user. Status: {}. Body: {}",
            status,
            String::from_utf8_lossy(&body)
        ));
    }
    let auth_response: AuthResponse = serde_json::from_slice(&body)
        .map_err(|e| format!("Failed to parse registration response: {}", e))?;

    Ok(TestUser {
        id: auth_response.user.id,
        token: auth_response.token,
    })
}
