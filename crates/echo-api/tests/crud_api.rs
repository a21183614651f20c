mod common;

use std::collections::HashSet;
use std::sync::Arc;

use axum::http::{header, Method, StatusCode};
use common::{request, TestApp};
use serde_json::json;

#[tokio::test]
async fn test_goal_lifecycle() {
    let app = TestApp::new();
    let acme = app.register("Ana", "ana@acme.test", "Acme").await;
    let token = Some(acme.token.as_str());

    let (status, created) = app
        .call(
            Method::POST,
            "/api/goals",
            token,
            Some(json!({ "title": "Expand to EU", "description": "Open two offices" })),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(created["status"], "planned");
    assert_eq!(created["tenant_id"], acme.tenant_id.to_string());
    let id = created["id"].as_str().unwrap().to_string();

    let (status, fetched) = app.call(Method::GET, &format!("/api/goals/{}", id), token, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(fetched["title"], "Expand to EU");

    let (status, updated) = app
        .call(
            Method::PUT,
            &format!("/api/goals/{}", id),
            token,
            Some(json!({ "status": "completed" })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["status"], "completed");
    assert_eq!(updated["title"], "Expand to EU");
    assert_eq!(updated["description"], "Open two offices");

    let (status, page) = app.call(Method::GET, "/api/goals", token, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(page["total"], 1);
    assert_eq!(page["page"], 1);
    assert_eq!(page["per_page"], 20);
    assert_eq!(page["data"][0]["id"], id.as_str());

    let (status, _) = app.call(Method::DELETE, &format!("/api/goals/{}", id), token, None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, body) = app.call(Method::GET, &format!("/api/goals/{}", id), token, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["success"], false);
    assert_eq!(body["error"]["code"], "NOT_FOUND");

    let (status, _) = app.call(Method::DELETE, &format!("/api/goals/{}", id), token, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_patch_clears_nullable_field() {
    let app = TestApp::new();
    let acme = app.register("Ana", "ana@acme.test", "Acme").await;
    let token = Some(acme.token.as_str());

    let (_, created) = app
        .call(
            Method::POST,
            "/goals",
            token,
            Some(json!({ "title": "Retention", "description": "Reduce churn" })),
        )
        .await;
    let id = created["id"].as_str().unwrap();

    let (status, updated) = app
        .call(
            Method::PATCH,
            &format!("/goals/{}", id),
            token,
            Some(json!({ "description": null })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert!(updated["description"].is_null());
    assert_eq!(updated["title"], "Retention");
}

#[tokio::test]
async fn test_tenants_are_isolated() {
    let app = TestApp::new();
    let acme = app.register("Ana", "ana@acme.test", "Acme").await;
    let globex = app.register("Gil", "gil@globex.test", "Globex").await;

    let (_, goal) = app
        .call(Method::POST, "/api/goals", Some(&acme.token), Some(json!({ "title": "Acme only" })))
        .await;
    let id = goal["id"].as_str().unwrap();

    let (status, page) = app.call(Method::GET, "/api/goals", Some(&globex.token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(page["total"], 0);
    assert_eq!(page["data"].as_array().unwrap().len(), 0);

    let uri = format!("/api/goals/{}", id);
    let (status, _) = app.call(Method::GET, &uri, Some(&globex.token), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = app
        .call(Method::PUT, &uri, Some(&globex.token), Some(json!({ "title": "Stolen" })))
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = app.call(Method::DELETE, &uri, Some(&globex.token), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (_, still_there) = app.call(Method::GET, &uri, Some(&acme.token), None).await;
    assert_eq!(still_there["title"], "Acme only");
}

#[tokio::test]
async fn test_invalid_labels_are_bad_requests() {
    let app = TestApp::new();
    let acme = app.register("Ana", "ana@acme.test", "Acme").await;
    let token = Some(acme.token.as_str());

    let cases = [
        ("/api/goals", json!({ "title": "x", "status": "someday" })),
        ("/api/feedback", json!({ "title": "x", "sentiment": "furious" })),
        ("/api/ideas", json!({ "title": "x", "priority": "asap" })),
        ("/api/ideas", json!({ "title": "x", "effort": "huge" })),
        ("/api/initiatives", json!({ "title": "x", "status": "paused" })),
    ];
    for (uri, body) in cases {
        let (status, _) = app.call(Method::POST, uri, token, Some(body.clone())).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "{} accepted {}", uri, body);
    }

    let (status, body) = app.call(Method::GET, "/api/ideas?status=shipped", token, None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], "VALIDATION_ERROR");

    let (status, _) = app.call(Method::GET, "/api/goals?sort=password", token, None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = app.call(Method::GET, "/api/goals/not-a-uuid", token, None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = app.call(Method::POST, "/api/goals", token, Some(json!({ "title": "" }))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_cross_tenant_reference_rejected() {
    let app = TestApp::new();
    let acme = app.register("Ana", "ana@acme.test", "Acme").await;
    let globex = app.register("Gil", "gil@globex.test", "Globex").await;

    let (_, goal) = app
        .call(Method::POST, "/api/goals", Some(&acme.token), Some(json!({ "title": "Acme goal" })))
        .await;

    let (status, body) = app
        .call(
            Method::POST,
            "/api/initiatives",
            Some(&globex.token),
            Some(json!({ "title": "Borrowed", "goal_id": goal["id"] })),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], "INVALID_REFERENCE");

    let (status, initiative) = app
        .call(
            Method::POST,
            "/api/initiatives",
            Some(&acme.token),
            Some(json!({ "title": "Owned", "goal_id": goal["id"] })),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(initiative["goal_id"], goal["id"]);
}

#[tokio::test]
async fn test_tenant_resolution() {
    let app = TestApp::new();
    let acme = app.register("Ana", "ana@acme.test", "Acme").await;
    let globex = app.register("Gil", "gil@globex.test", "Globex").await;

    let (status, body) = app.call(Method::GET, "/api/goals", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["success"], false);

    let mut mismatch = request(Method::GET, "/api/goals", Some(&acme.token), None);
    mismatch
        .headers_mut()
        .insert("x-tenant-id", globex.tenant_id.to_string().parse().unwrap());
    let (status, _) = app.send(mismatch).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let mut cookie_mismatch = request(Method::GET, "/api/goals", Some(&acme.token), None);
    cookie_mismatch.headers_mut().insert(
        header::COOKIE,
        format!("tenant_id={}", globex.tenant_id).parse().unwrap(),
    );
    let (status, _) = app.send(cookie_mismatch).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let mut matching = request(Method::GET, "/api/goals", Some(&acme.token), None);
    matching
        .headers_mut()
        .insert("x-tenant-id", acme.tenant_id.to_string().parse().unwrap());
    let (status, _) = app.send(matching).await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = app.call(Method::GET, "/api/goals", Some("not.a.jwt"), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_header_mode_without_auth() {
    let app = TestApp::with_config(|config| config.auth.require_auth = false);
    let acme = app.register("Ana", "ana@acme.test", "Acme").await;

    let mut by_header = request(Method::POST, "/api/customers", None, Some(json!({ "name": "Initech" })));
    by_header
        .headers_mut()
        .insert("x-tenant-id", acme.tenant_id.to_string().parse().unwrap());
    let (status, customer) = app.send(by_header).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(customer["tenant_id"], acme.tenant_id.to_string());

    let mut by_cookie = request(Method::GET, "/api/customers", None, None);
    by_cookie.headers_mut().insert(
        header::COOKIE,
        format!("theme=dark; tenant_id={}", acme.tenant_id).parse().unwrap(),
    );
    let (status, page) = app.send(by_cookie).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(page["total"], 1);

    let (status, _) = app.call(Method::GET, "/api/customers", None, None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let mut malformed = request(Method::GET, "/api/customers", None, None);
    malformed.headers_mut().insert("x-tenant-id", "acme".parse().unwrap());
    let (status, _) = app.send(malformed).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let mut unknown = request(Method::GET, "/api/customers", None, None);
    unknown
        .headers_mut()
        .insert("x-tenant-id", uuid::Uuid::new_v4().to_string().parse().unwrap());
    let (status, _) = app.send(unknown).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_feedback_content_and_customer_counts() {
    let app = TestApp::new();
    let acme = app.register("Ana", "ana@acme.test", "Acme").await;
    let token = Some(acme.token.as_str());

    let (_, customer) = app
        .call(Method::POST, "/api/customers", token, Some(json!({ "name": "Initech", "revenue": "$120k ARR" })))
        .await;
    let customer_id = customer["id"].as_str().unwrap().to_string();

    let (status, feedback) = app
        .call(
            Method::POST,
            "/api/feedback",
            token,
            Some(json!({ "content": "Export is slow", "sentiment": "negative", "customer_id": customer_id })),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(feedback["title"], "Export is slow");
    assert_eq!(feedback["content"], "Export is slow");

    let (status, idea) = app
        .call(
            Method::POST,
            "/api/ideas",
            token,
            Some(json!({ "title": "Async export", "priority": "high", "customer_ids": [customer_id] })),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(idea["effort"], "m");
    assert_eq!(idea["customer_ids"][0], customer_id.as_str());

    let (_, customer) = app
        .call(Method::GET, &format!("/api/customers/{}", customer_id), token, None)
        .await;
    assert_eq!(customer["idea_count"], 1);
    assert_eq!(customer["feedback_count"], 1);

    let (_, filtered) = app
        .call(Method::GET, &format!("/api/feedback?customer_id={}&sentiment=negative", customer_id), token, None)
        .await;
    assert_eq!(filtered["total"], 1);

    let (_, searched) = app.call(Method::GET, "/api/ideas?search=ASYNC", token, None).await;
    assert_eq!(searched["total"], 1);
}

#[tokio::test]
async fn test_dashboard_summary() {
    let app = TestApp::new();
    let acme = app.register("Ana", "ana@acme.test", "Acme").await;
    let token = Some(acme.token.as_str());

    app.call(Method::POST, "/api/goals", token, Some(json!({ "title": "G", "status": "active" }))).await;
    app.call(Method::POST, "/api/feedback", token, Some(json!({ "title": "Love it", "sentiment": "positive" }))).await;
    app.call(Method::POST, "/api/customers", token, Some(json!({ "name": "Initech" }))).await;

    let (status, body) = app.call(Method::GET, "/api/dashboard", token, None).await;
    assert_eq!(status, StatusCode::OK);
    let data = &body["data"];
    assert_eq!(data["goals_by_status"]["active"], 1);
    assert_eq!(data["goals_by_status"]["completed"], 0);
    assert_eq!(data["feedback_by_sentiment"]["positive"], 1);
    assert_eq!(data["customer_count"], 1);
    assert_eq!(data["recent_feedback"][0]["title"], "Love it");
}

#[tokio::test]
async fn test_concurrent_creates_get_distinct_ids() {
    let app = Arc::new(TestApp::new());
    let acme = app.register("Ana", "ana@acme.test", "Acme").await;

    let mut tasks = tokio::task::JoinSet::new();
    for i in 0..24 {
        let app = app.clone();
        let token = acme.token.clone();
        tasks.spawn(async move {
            let (status, body) = app
                .call(Method::POST, "/api/ideas", Some(&token), Some(json!({ "title": format!("Idea {}", i) })))
                .await;
            assert_eq!(status, StatusCode::CREATED);
            body["id"].as_str().unwrap().to_string()
        });
    }

    let mut ids = HashSet::new();
    while let Some(id) = tasks.join_next().await {
        ids.insert(id.unwrap());
    }
    assert_eq!(ids.len(), 24);

    let (_, page) = app.call(Method::GET, "/api/ideas?per_page=100", Some(&acme.token), None).await;
    assert_eq!(page["total"], 24);
}

#[tokio::test]
async fn test_unknown_route_and_health() {
    let app = TestApp::new();

    let (status, body) = app.call(Method::GET, "/api/nope", None, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"]["code"], "NOT_FOUND");

    let (status, body) = app.call(Method::GET, "/health", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");

    let (status, body) = app.call(Method::GET, "/api/health/ready", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ready");
}

#[tokio::test]
async fn test_idea_priority_sorts_by_importance() {
    let app = TestApp::new();
    let acme = app.register("Ana", "ana@acme.test", "Acme").await;
    let token = Some(acme.token.as_str());

    for (title, priority) in [("Dark mode", "low"), ("SSO", "urgent"), ("CSV export", "medium"), ("Audit log", "high")] {
        let (status, _) = app
            .call(
                Method::POST,
                "/api/ideas",
                token,
                Some(json!({ "title": title, "priority": priority })),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED);
    }

    let priorities = |page: &serde_json::Value| -> Vec<String> {
        page["data"]
            .as_array()
            .unwrap()
            .iter()
            .map(|idea| idea["priority"].as_str().unwrap().to_string())
            .collect()
    };

    let (status, page) = app
        .call(Method::GET, "/api/ideas?sort=priority&order=desc", token, None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(priorities(&page), ["urgent", "high", "medium", "low"]);

    let (status, page) = app
        .call(Method::GET, "/api/ideas?sort=priority&order=asc", token, None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(priorities(&page), ["low", "medium", "high", "urgent"]);
}

#[tokio::test]
async fn test_missing_sort_values_come_last() {
    let app = TestApp::new();
    let acme = app.register("Ana", "ana@acme.test", "Acme").await;
    let token = Some(acme.token.as_str());

    for (title, target_date) in [
        ("Someday", None),
        ("Q1 launch", Some("2026-03-31")),
        ("Q4 launch", Some("2026-12-31")),
    ] {
        let (status, _) = app
            .call(
                Method::POST,
                "/api/goals",
                token,
                Some(json!({ "title": title, "target_date": target_date })),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED);
    }

    let titles = |page: &serde_json::Value| -> Vec<String> {
        page["data"]
            .as_array()
            .unwrap()
            .iter()
            .map(|goal| goal["title"].as_str().unwrap().to_string())
            .collect()
    };

    let (status, page) = app
        .call(Method::GET, "/api/goals?sort=target_date&order=asc", token, None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(titles(&page), ["Q1 launch", "Q4 launch", "Someday"]);

    let (status, page) = app
        .call(Method::GET, "/api/goals?sort=target_date&order=desc", token, None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(titles(&page), ["Q4 launch", "Q1 launch", "Someday"]);
}

#[tokio::test]
async fn test_feedback_title_length_limit() {
    let app = TestApp::new();
    let acme = app.register("Ana", "ana@acme.test", "Acme").await;

    let (status, body) = app
        .call(
            Method::POST,
            "/api/feedback",
            Some(&acme.token),
            Some(json!({ "content": "x".repeat(201) })),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], "VALIDATION_ERROR");
}

#[tokio::test]
async fn test_token_of_inactive_or_unknown_user_is_refused() {
    let app = TestApp::new();
    let acme = app.register("Ana", "ana@acme.test", "Acme").await;

    let (status, _) = app.call(Method::GET, "/api/goals", Some(&acme.token), None).await;
    assert_eq!(status, StatusCode::OK);

    // Signed with the server's secret, but the user does not exist
    let jwt = echo_security::JwtService::new(&app.state.config.jwt.secret, 3600, 86400);
    let ghost = jwt
        .generate_access_token(&uuid::Uuid::new_v4(), &acme.tenant_id, "admin")
        .unwrap();
    let (status, body) = app.call(Method::GET, "/api/goals", Some(&ghost), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"]["code"], "INVALID_TOKEN");

    let mut user = app.state.repos.users.find_by_id(&acme.user_id).await.unwrap().unwrap();
    user.is_active = false;
    app.state.repos.users.update(&user).await.unwrap();

    for uri in ["/api/goals", "/api/dashboard"] {
        let (status, body) = app.call(Method::GET, uri, Some(&acme.token), None).await;
        assert_eq!(status, StatusCode::FORBIDDEN);
        assert_eq!(body["error"]["code"], "ACCOUNT_INACTIVE");
    }
}
