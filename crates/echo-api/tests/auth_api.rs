mod common;

use axum::http::{Method, StatusCode};
use common::{TestApp, PASSWORD};
use serde_json::json;

const NEW_PASSWORD: &str = "Marmalade-Lighthouse-77?";

#[tokio::test]
async fn test_register_creates_workspace() {
    let app = TestApp::new();

    let (status, body) = app
        .call(
            Method::POST,
            "/api/auth/register",
            None,
            Some(json!({ "name": "Ana", "email": "Ana@Acme.test", "password": PASSWORD, "company": "Acme Corp" })),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["success"], true);
    assert_eq!(body["data"]["token_type"], "Bearer");
    assert_eq!(body["data"]["user"]["email"], "ana@acme.test");
    assert_eq!(body["data"]["user"]["role"], "admin");
    assert_eq!(body["data"]["tenant"]["slug"], "acme-corp");

    // Same company name, different person: new tenant with a suffixed slug
    let (status, body) = app
        .call(
            Method::POST,
            "/auth/register",
            None,
            Some(json!({ "display_name": "Bo", "email": "bo@acme.test", "password": PASSWORD, "company": "Acme Corp" })),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["data"]["tenant"]["slug"], "acme-corp-2");

    let (status, body) = app
        .call(
            Method::POST,
            "/api/auth/register",
            None,
            Some(json!({ "name": "Ana", "email": "ana@acme.test", "password": PASSWORD })),
        )
        .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["success"], false);

    let (status, body) = app
        .call(
            Method::POST,
            "/api/auth/register",
            None,
            Some(json!({ "name": "Cy", "email": "cy@acme.test", "password": "password" })),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], "WEAK_PASSWORD");
}

#[tokio::test]
async fn test_login_and_me() {
    let app = TestApp::new();
    let account = app.register("Ana", "ana@acme.test", "Acme").await;

    let (status, body) = app
        .call(
            Method::POST,
            "/api/auth/login",
            None,
            Some(json!({ "email": "ANA@acme.test", "password": PASSWORD })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["user"]["id"], account.user_id.to_string());
    assert!(!body["data"]["user"]["last_login"].is_null());

    let (wrong_status, wrong) = app
        .call(
            Method::POST,
            "/api/auth/login",
            None,
            Some(json!({ "email": "ana@acme.test", "password": "Nope-nope-123" })),
        )
        .await;
    let (unknown_status, unknown) = app
        .call(
            Method::POST,
            "/api/auth/login",
            None,
            Some(json!({ "email": "nobody@acme.test", "password": PASSWORD })),
        )
        .await;
    assert_eq!(wrong_status, StatusCode::UNAUTHORIZED);
    assert_eq!(unknown_status, StatusCode::UNAUTHORIZED);
    assert_eq!(wrong["error"]["message"], unknown["error"]["message"]);
    assert_eq!(wrong["error"]["code"], "INVALID_CREDENTIALS");

    let (status, body) = app.call(Method::GET, "/api/auth/me", Some(&account.token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["user"]["name"], "Ana");
    assert_eq!(body["data"]["tenant"]["id"], account.tenant_id.to_string());

    let (status, _) = app.call(Method::GET, "/api/auth/me", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_refresh_token_flow() {
    let app = TestApp::new();
    let account = app.register("Ana", "ana@acme.test", "Acme").await;

    let (status, body) = app
        .call(
            Method::POST,
            "/api/auth/refresh",
            None,
            Some(json!({ "refresh_token": account.refresh_token })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    let access = body["data"]["access_token"].as_str().unwrap().to_string();

    let (status, _) = app.call(Method::GET, "/api/goals", Some(&access), None).await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = app
        .call(Method::POST, "/api/auth/refresh", None, Some(json!({ "refresh_token": account.token })))
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    // A refresh token is not accepted as a bearer token
    let (status, _) = app.call(Method::GET, "/api/goals", Some(&account.refresh_token), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_change_password() {
    let app = TestApp::new();
    let account = app.register("Ana", "ana@acme.test", "Acme").await;

    let (status, _) = app
        .call(
            Method::POST,
            "/api/auth/change-password",
            Some(&account.token),
            Some(json!({ "current_password": "wrong-current-pw", "new_password": NEW_PASSWORD })),
        )
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = app
        .call(
            Method::POST,
            "/api/auth/change-password",
            Some(&account.token),
            Some(json!({ "current_password": PASSWORD, "new_password": NEW_PASSWORD })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = app
        .call(
            Method::POST,
            "/api/auth/login",
            None,
            Some(json!({ "email": "ana@acme.test", "password": NEW_PASSWORD })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn test_password_reset_is_single_use() {
    let app = TestApp::new();
    app.register("Ana", "ana@acme.test", "Acme").await;

    let (status, body) = app
        .call(
            Method::POST,
            "/api/auth/forgot-password",
            None,
            Some(json!({ "email": "nobody@acme.test" })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["data"]["reset_token"].is_null());

    let (status, body) = app
        .call(
            Method::POST,
            "/api/auth/forgot-password",
            None,
            Some(json!({ "email": "ana@acme.test" })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    let token = body["data"]["reset_token"].as_str().unwrap().to_string();
    assert_eq!(token.len(), 64);

    let (status, _) = app
        .call(
            Method::POST,
            "/api/auth/reset-password",
            None,
            Some(json!({ "token": token, "new_password": NEW_PASSWORD })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = app
        .call(
            Method::POST,
            "/api/auth/reset-password",
            None,
            Some(json!({ "token": token, "password": "Another-Strong-Pass-9" })),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], "INVALID_RESET_TOKEN");

    let (status, _) = app
        .call(
            Method::POST,
            "/api/auth/login",
            None,
            Some(json!({ "email": "ana@acme.test", "password": NEW_PASSWORD })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn test_reset_token_hidden_outside_development() {
    let app = TestApp::with_config(|config| config.app.env = "production".to_string());
    app.register("Ana", "ana@acme.test", "Acme").await;

    let (status, body) = app
        .call(
            Method::POST,
            "/api/auth/forgot-password",
            None,
            Some(json!({ "email": "ana@acme.test" })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["data"]["reset_token"].is_null());
}

#[tokio::test]
async fn test_auth_rate_limit() {
    let app = TestApp::with_config(|config| config.auth.rate_limit_per_minute = 2);
    let login = json!({ "email": "nobody@acme.test", "password": PASSWORD });

    for _ in 0..2 {
        let (status, _) = app.call(Method::POST, "/api/auth/login", None, Some(login.clone())).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }

    let (status, body) = app.call(Method::POST, "/api/auth/login", None, Some(login)).await;
    assert_eq!(status, StatusCode::TOO_MANY_REQUESTS);
    assert_eq!(body["error"]["code"], "TOO_MANY_REQUESTS");

    // Entity routes are not limited
    let (status, _) = app.call(Method::GET, "/api/health", None, None).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn test_malformed_json_is_bad_request() {
    let app = TestApp::new();
    let request = axum::http::Request::builder()
        .method(Method::POST)
        .uri("/api/auth/login")
        .header("content-type", "application/json")
        .body(axum::body::Body::from("{not json"))
        .unwrap();

    let (status, body) = app.send(request).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], "INVALID_BODY");
}
