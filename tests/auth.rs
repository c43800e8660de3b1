mod common;

use std::sync::Arc;

use actix_web::http::{header, StatusCode};
use actix_web::test;
use chrono::{Duration, Utc};
use pretty_assertions::assert_eq;
use serde_json::json;

use common::{assert_envelope, init_app, json_body, register_user, send};
use todo_api::auth::AuthResponse;
use todo_api::store::MemoryStore;

#[actix_rt::test]
async fn test_register_and_login_flow() {
    let app = init_app(Arc::new(MemoryStore::new())).await;

    let register_payload = json!({
        "name": "Integration User",
        "email": "integration@example.com",
        "password": "Password123!"
    });
    let req = test::TestRequest::post()
        .uri("/register")
        .set_json(&register_payload)
        .to_request();
    let (status, body) = send(&app, req).await;
    assert_eq!(
        status,
        StatusCode::CREATED,
        "Registration failed. Body: {:?}",
        String::from_utf8_lossy(&body)
    );

    let registered = json_body(&body);
    assert!(registered["token"].as_str().is_some_and(|t| !t.is_empty()));
    assert_eq!(registered["user"]["name"], "Integration User");
    assert_eq!(registered["user"]["email"], "integration@example.com");
    assert!(registered["user"]["joinedAt"].is_string());
    assert!(registered["user"].get("password").is_none());

    // Try to register the same user again (should fail)
    let req_conflict = test::TestRequest::post()
        .uri("/register")
        .set_json(&register_payload)
        .to_request();
    let (status, body) = send(&app, req_conflict).await;
    let msg = assert_envelope(status, &body, StatusCode::BAD_REQUEST);
    assert_eq!(msg, "user with email integration@example.com already exists");

    // Login with the registered user
    let req_login = test::TestRequest::post()
        .uri("/login")
        .set_json(json!({
            "email": "integration@example.com",
            "password": "Password123!"
        }))
        .to_request();
    let (status, body) = send(&app, req_login).await;
    assert_eq!(
        status,
        StatusCode::OK,
        "Login failed. Body: {:?}",
        String::from_utf8_lossy(&body)
    );

    let login_response: AuthResponse =
        serde_json::from_slice(&body).expect("Failed to parse login response JSON");
    assert_eq!(login_response.user.id, registered["user"]["id"].as_i64().unwrap());

    // The issued token opens the protected routes
    let req_todos = test::TestRequest::get()
        .uri("/todos")
        .insert_header((
            header::AUTHORIZATION,
            format!("Bearer {}", login_response.token),
        ))
        .to_request();
    let (status, body) = send(&app, req_todos).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json_body(&body), json!([]));
}

#[actix_rt::test]
async fn test_invalid_registration_inputs() {
    let app = init_app(Arc::new(MemoryStore::new())).await;

    let test_cases = vec![
        (
            json!({ "email": "test@example.com", "password": "Password123!" }),
            "missing name",
        ),
        (
            json!({ "name": "Test", "password": "Password123!" }),
            "missing email",
        ),
        (
            json!({ "name": "Test", "email": "test@example.com" }),
            "missing password",
        ),
        (
            json!({ "name": "", "email": "test@example.com", "password": "Password123!" }),
            "empty name",
        ),
        (
            json!({ "name": "Test", "email": "invalid-email", "password": "Password123!" }),
            "invalid email format",
        ),
        (
            json!({ "name": "Test", "email": "test@example.com", "password": "1234567" }),
            "password too short",
        ),
        (
            json!({ "name": "Test", "email": "test@example.com", "password": "p".repeat(131) }),
            "password too long",
        ),
    ];

    for (payload, description) in test_cases {
        let req = test::TestRequest::post()
            .uri("/register")
            .set_json(&payload)
            .to_request();
        let (status, body) = send(&app, req).await;
        assert_eq!(
            status,
            StatusCode::BAD_REQUEST,
            "Test case failed: {}. Body: {:?}",
            description,
            String::from_utf8_lossy(&body)
        );
    }
}

#[actix_rt::test]
async fn test_malformed_json_is_invalid_request_data() {
    let app = init_app(Arc::new(MemoryStore::new())).await;

    let req = test::TestRequest::post()
        .uri("/register")
        .insert_header((header::CONTENT_TYPE, "application/json"))
        .set_payload("{\"name\": \"Test\",")
        .to_request();
    let (status, body) = send(&app, req).await;

    let msg = assert_envelope(status, &body, StatusCode::BAD_REQUEST);
    assert_eq!(msg, "invalid JSON request data");

    // Missing fields get the same fixed message, without serde's detail
    let req = test::TestRequest::post()
        .uri("/register")
        .set_json(json!({ "name": "Test" }))
        .to_request();
    let (status, body) = send(&app, req).await;
    assert_eq!(
        assert_envelope(status, &body, StatusCode::BAD_REQUEST),
        "invalid JSON request data"
    );
}

#[actix_rt::test]
async fn test_invalid_login_inputs() {
    let app = init_app(Arc::new(MemoryStore::new())).await;

    let valid_user_email = "login_test_user@example.com";
    let valid_user_password = "Password123!";
    register_user(&app, "Login Tester", valid_user_email, valid_user_password)
        .await
        .expect("Setup: Failed to register test user");

    let test_cases = vec![
        (
            json!({ "password": "Password123!" }),
            StatusCode::BAD_REQUEST,
            "missing email",
        ),
        (
            json!({ "email": valid_user_email }),
            StatusCode::BAD_REQUEST,
            "missing password",
        ),
        (
            json!({ "email": "invalid-email", "password": "Password123!" }),
            StatusCode::BAD_REQUEST,
            "invalid email format",
        ),
        (
            json!({ "email": valid_user_email, "password": "123" }),
            StatusCode::BAD_REQUEST,
            "password too short",
        ),
        // Failed logins are reported as not found
        (
            json!({ "email": valid_user_email, "password": "WrongPassword123!" }),
            StatusCode::NOT_FOUND,
            "incorrect password",
        ),
        (
            json!({ "email": "nonexistent@example.com", "password": "Password123!" }),
            StatusCode::NOT_FOUND,
            "non-existent user",
        ),
    ];

    for (payload, expected_status, description) in test_cases {
        let req = test::TestRequest::post()
            .uri("/login")
            .set_json(&payload)
            .to_request();
        let (status, body) = send(&app, req).await;
        assert_eq!(
            status,
            expected_status,
            "Test case failed: {}. Body: {:?}",
            description,
            String::from_utf8_lossy(&body)
        );
    }

    let req = test::TestRequest::post()
        .uri("/login")
        .set_json(json!({ "email": valid_user_email, "password": "WrongPassword123!" }))
        .to_request();
    let (status, body) = send(&app, req).await;
    assert_eq!(
        assert_envelope(status, &body, StatusCode::NOT_FOUND),
        "invalid password"
    );
}

#[actix_rt::test]
async fn test_protected_routes_require_token() {
    let app = init_app(Arc::new(MemoryStore::new())).await;

    let requests = vec![
        test::TestRequest::get().uri("/todos"),
        test::TestRequest::delete().uri("/todos"),
        test::TestRequest::get().uri("/todos/1"),
        test::TestRequest::get().uri("/users/1"),
        test::TestRequest::delete().uri("/users/1"),
    ];

    for req in requests {
        let (status, body) = send(&app, req.to_request()).await;
        assert_eq!(assert_envelope(status, &body, StatusCode::UNAUTHORIZED), "Missing token");
    }

    let req = test::TestRequest::get()
        .uri("/todos")
        .insert_header((header::AUTHORIZATION, "Basic dXNlcjpwYXNz"))
        .to_request();
    let (status, body) = send(&app, req).await;
    assert_eq!(
        assert_envelope(status, &body, StatusCode::UNAUTHORIZED),
        "Malformed authorization header"
    );
}

#[actix_rt::test]
async fn test_expired_and_forged_tokens_are_rejected() {
    let app = init_app(Arc::new(MemoryStore::new())).await;
    let user = register_user(&app, "Token Tester", "token@example.com", "Password123!")
        .await
        .unwrap();

    let expired = common::tokens()
        .issue_until(user.id, Utc::now() - Duration::hours(1))
        .unwrap();
    let forged = todo_api::auth::TokenService::new("some-other-secret", 1)
        .issue(user.id)
        .unwrap();

    for token in [expired, forged] {
        let req = test::TestRequest::get()
            .uri("/todos")
            .insert_header((header::AUTHORIZATION, format!("Bearer {}", token)))
            .to_request();
        let (status, body) = send(&app, req).await;
        assert_eq!(assert_envelope(status, &body, StatusCode::UNAUTHORIZED), "invalid token");
    }
}

#[actix_rt::test]
async fn test_health_is_public() {
    let app = init_app(Arc::new(MemoryStore::new())).await;

    let req = test::TestRequest::get().uri("/health").to_request();
    let (status, body) = send(&app, req).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json_body(&body)["status"], "ok");
}
