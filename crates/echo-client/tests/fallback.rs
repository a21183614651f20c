use echo_client::{ClientError, EchoClient, Registration};
use serde_json::{json, Value};
use uuid::Uuid;
use wiremock::matchers::{body_partial_json, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Nothing listens on port 1.
const DEAD_URL: &str = "http://127.0.0.1:1";

fn goal_json(title: &str) -> Value {
    json!({
        "id": Uuid::new_v4(),
        "tenant_id": Uuid::new_v4(),
        "title": title,
        "status": "active",
        "created_at": "2026-01-05T10:00:00Z"
    })
}

#[tokio::test]
async fn test_falls_back_after_transport_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/goals"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([goal_json("Expand to EU")])))
        .expect(1)
        .mount(&server)
        .await;

    let client = EchoClient::new([DEAD_URL.to_string(), server.uri()]).unwrap();
    let listing = client.goals().list(&[]).await.unwrap();

    assert_eq!(listing.items.len(), 1);
    assert_eq!(listing.items[0].title, "Expand to EU");
}

#[tokio::test]
async fn test_falls_back_after_server_error() {
    let broken = MockServer::start().await;
    let healthy = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/goals"))
        .respond_with(ResponseTemplate::new(503))
        .expect(1)
        .mount(&broken)
        .await;
    Mock::given(method("GET"))
        .and(path("/goals"))
        .and(query_param("status", "active"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": [goal_json("A"), goal_json("B")],
            "total": 7,
            "page": 1,
            "per_page": 2
        })))
        .expect(1)
        .mount(&healthy)
        .await;

    let client = EchoClient::new([broken.uri(), healthy.uri()]).unwrap();
    let listing = client
        .goals()
        .list(&[("status", "active".to_string())])
        .await
        .unwrap();

    assert_eq!(listing.items.len(), 2);
    assert_eq!(listing.total, 7);
}

#[tokio::test]
async fn test_client_errors_do_not_fall_back() {
    let first = MockServer::start().await;
    let second = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/goals"))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({
            "success": false,
            "error": { "code": "VALIDATION_ERROR", "message": "Invalid goal status 'someday'" },
            "timestamp": "2026-01-05T10:00:00Z"
        })))
        .expect(1)
        .mount(&first)
        .await;
    Mock::given(method("POST"))
        .and(path("/goals"))
        .respond_with(ResponseTemplate::new(201).set_body_json(goal_json("never")))
        .expect(0)
        .mount(&second)
        .await;

    let client = EchoClient::new([first.uri(), second.uri()]).unwrap();
    let err = client
        .goals()
        .create(&json!({ "title": "x", "status": "someday" }))
        .await
        .unwrap_err();

    match err {
        ClientError::Api { status, code, .. } => {
            assert_eq!(status, 400);
            assert_eq!(code, "VALIDATION_ERROR");
        }
        other => panic!("unexpected error: {:?}", other),
    }
}

#[tokio::test]
async fn test_last_error_returned_when_every_url_fails() {
    let broken = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(502).set_body_string("bad gateway"))
        .mount(&broken)
        .await;

    let client = EchoClient::new([DEAD_URL.to_string(), broken.uri()]).unwrap();
    let err = client.ideas().list(&[]).await.unwrap_err();

    match err {
        ClientError::Server { status, url, body } => {
            assert_eq!(status, 502);
            assert!(url.starts_with(&broken.uri()));
            assert_eq!(body, "bad gateway");
        }
        other => panic!("unexpected error: {:?}", other),
    }
}

#[tokio::test]
async fn test_delete_of_missing_row_succeeds() {
    let server = MockServer::start().await;
    let id = Uuid::new_v4();
    Mock::given(method("DELETE"))
        .and(path(format!("/customers/{}", id)))
        .respond_with(ResponseTemplate::new(404).set_body_json(json!({
            "success": false,
            "error": { "code": "NOT_FOUND", "message": "customer not found" }
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = EchoClient::new([server.uri()]).unwrap();
    client.customers().delete(&id).await.unwrap();

    let err = client.customers().get(&id).await.unwrap_err();
    assert!(err.is_not_found());
}

#[tokio::test]
async fn test_credentials_and_tenant_are_injected() {
    let server = MockServer::start().await;
    let tenant_id = Uuid::new_v4();
    let id = Uuid::new_v4();

    Mock::given(method("GET"))
        .and(path(format!("/goals/{}", id)))
        .and(header("authorization", "Bearer token-123"))
        .and(header("x-tenant-id", tenant_id.to_string().as_str()))
        .and(header("cookie", format!("tenant_id={}", tenant_id).as_str()))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": true,
            "data": goal_json("Wrapped")
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = EchoClient::new([server.uri()])
        .unwrap()
        .with_token("token-123")
        .with_tenant(tenant_id);
    let goal = client.goals().get(&id).await.unwrap();
    assert_eq!(goal.title, "Wrapped");
}

#[tokio::test]
async fn test_register_keeps_session() {
    let server = MockServer::start().await;
    let tenant_id = Uuid::new_v4();
    let user_id = Uuid::new_v4();
    let session = json!({
        "success": true,
        "data": {
            "access_token": "access-abc",
            "refresh_token": "refresh-abc",
            "token_type": "Bearer",
            "expires_in": 3600,
            "user": {
                "id": user_id,
                "tenant_id": tenant_id,
                "name": "Ana",
                "email": "ana@acme.test",
                "role": "admin"
            },
            "tenant": { "id": tenant_id, "name": "Acme", "slug": "acme" }
        }
    });

    Mock::given(method("POST"))
        .and(path("/auth/register"))
        .and(body_partial_json(json!({ "email": "ana@acme.test", "company": "Acme" })))
        .respond_with(ResponseTemplate::new(201).set_body_json(session.clone()))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/auth/me"))
        .and(header("authorization", "Bearer access-abc"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": true,
            "data": { "user": session["data"]["user"], "tenant": session["data"]["tenant"] }
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = EchoClient::new([server.uri()]).unwrap();
    let registered = client
        .register(&Registration {
            name: "Ana",
            email: "ana@acme.test",
            password: "Tangerine-Viaduct-42!",
            company: Some("Acme"),
        })
        .await
        .unwrap();
    assert_eq!(registered.tenant.slug, "acme");
    assert_eq!(client.tenant_id(), Some(tenant_id));

    let me = client.me().await.unwrap();
    assert_eq!(me.user.id, user_id);
}
